//! Bind-time failures: nothing executes against a malformed declaration.

use pointbridge::{
    BindingError, Boundary, BoundaryConfig, NativeTable, PointLayout, declared_point_layout,
};

unsafe extern "C" fn swapped_fields() -> PointLayout {
    let declared = declared_point_layout();
    PointLayout {
        x_offset: declared.y_offset,
        y_offset: declared.x_offset,
        ..declared
    }
}

unsafe extern "C" fn wide_fields() -> PointLayout {
    PointLayout {
        size: 16,
        align: 8,
        x_offset: 0,
        x_size: 8,
        y_offset: 8,
        y_size: 8,
    }
}

#[test]
fn test_linked_layout_binds() {
    let boundary = Boundary::new(BoundaryConfig::default()).unwrap();
    assert_eq!(boundary.layout(), declared_point_layout());
}

#[test]
fn test_missing_releaser_fails_at_bind_time() {
    let table = NativeTable {
        free_point_pointer: None,
        ..NativeTable::linked()
    };
    let err = Boundary::bind(&table, BoundaryConfig::default()).unwrap_err();
    assert_eq!(
        err.as_binding(),
        Some(&BindingError::MissingSymbol {
            symbol: "pt_free_point_pointer"
        })
    );
}

#[test]
fn test_missing_text_function_fails_at_bind_time() {
    let table = NativeTable {
        add_one_to_string: None,
        ..NativeTable::linked()
    };
    let err = Boundary::bind(&table, BoundaryConfig::default()).unwrap_err();
    assert!(matches!(
        err.as_binding(),
        Some(BindingError::MissingSymbol {
            symbol: "pt_add_one_to_string"
        })
    ));
}

#[test]
fn test_swapped_fields_fail_at_bind_time() {
    let table = NativeTable {
        point_layout: Some(swapped_fields),
        ..NativeTable::linked()
    };
    let err = Boundary::bind(&table, BoundaryConfig::default()).unwrap_err();
    assert_eq!(
        err.as_binding(),
        Some(&BindingError::ShapeMismatch {
            shape: "Point",
            attribute: "x offset",
            declared: 0,
            native: 4,
        })
    );
}

#[test]
fn test_wider_native_integers_fail_at_bind_time() {
    let table = NativeTable {
        point_layout: Some(wide_fields),
        ..NativeTable::linked()
    };
    let err = Boundary::bind(&table, BoundaryConfig::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Binding error: shape `Point` disagrees on size: declared 8, native 16"
    );
}
