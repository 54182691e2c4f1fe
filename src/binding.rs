//! Bind-time validation of the native function table.
//!
//! A [`BoundTable`] only exists once every symbol is present and the native
//! layer's self-reported `Point` layout equals the host declaration.

use crate::errors::BindingError;
use crate::native::{
    GetPointFn, GetPointPointerFn, LayoutFn, NativeTable, PeekFn, PointConstRefFn, PointMutRefFn,
    PointValueFn, RuntimeFn, RuntimeNewFn, TextFn, TranscriptLenFn, TranscriptReadFn,
};
use crate::shape::{PointLayout, verify_point_layout};

/// A function table that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct BoundTable {
    pub(crate) runtime_with_counter: RuntimeNewFn,
    pub(crate) runtime_destroy: RuntimeFn,
    pub(crate) point_layout: LayoutFn,
    pub(crate) counter_peek: PeekFn,
    pub(crate) show_point: PointValueFn,
    pub(crate) show_point_ref: PointConstRefFn,
    pub(crate) move_point: PointValueFn,
    pub(crate) move_point_ref: PointMutRefFn,
    pub(crate) get_point: GetPointFn,
    pub(crate) get_point_pointer: GetPointPointerFn,
    pub(crate) free_point_pointer: PointMutRefFn,
    pub(crate) add_one_to_string: TextFn,
    pub(crate) transcript_len: TranscriptLenFn,
    pub(crate) transcript_read: TranscriptReadFn,
    pub(crate) transcript_clear: RuntimeFn,
}

macro_rules! require {
    ($table:expr, $field:ident, $symbol:literal) => {
        $table
            .$field
            .ok_or(BindingError::MissingSymbol { symbol: $symbol })?
    };
}

impl BoundTable {
    pub fn bind(table: &NativeTable) -> Result<Self, BindingError> {
        let bound = Self {
            runtime_with_counter: require!(table, runtime_with_counter, "pt_runtime_with_counter"),
            runtime_destroy: require!(table, runtime_destroy, "pt_runtime_destroy"),
            point_layout: require!(table, point_layout, "pt_point_layout"),
            counter_peek: require!(table, counter_peek, "pt_counter_peek"),
            show_point: require!(table, show_point, "pt_show_point"),
            show_point_ref: require!(table, show_point_ref, "pt_show_point_ref"),
            move_point: require!(table, move_point, "pt_move_point"),
            move_point_ref: require!(table, move_point_ref, "pt_move_point_ref"),
            get_point: require!(table, get_point, "pt_get_point"),
            get_point_pointer: require!(table, get_point_pointer, "pt_get_point_pointer"),
            free_point_pointer: require!(table, free_point_pointer, "pt_free_point_pointer"),
            add_one_to_string: require!(table, add_one_to_string, "pt_add_one_to_string"),
            transcript_len: require!(table, transcript_len, "pt_transcript_len"),
            transcript_read: require!(table, transcript_read, "pt_transcript_read"),
            transcript_clear: require!(table, transcript_clear, "pt_transcript_clear"),
        };

        verify_point_layout(bound.native_layout())?;
        Ok(bound)
    }

    /// Layout reported by the native layer.
    pub fn native_layout(&self) -> PointLayout {
        // SAFETY: pt_point_layout takes no arguments and touches no state.
        unsafe { (self.point_layout)() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::declared_point_layout;

    unsafe extern "C" fn padded_layout() -> PointLayout {
        PointLayout {
            size: 12,
            ..declared_point_layout()
        }
    }

    #[test]
    fn test_linked_table_binds() {
        let bound = BoundTable::bind(&NativeTable::linked()).unwrap();
        assert_eq!(bound.native_layout(), declared_point_layout());
    }

    #[test]
    fn test_missing_symbol() {
        let table = NativeTable {
            free_point_pointer: None,
            ..NativeTable::linked()
        };
        assert_eq!(
            BoundTable::bind(&table).unwrap_err(),
            BindingError::MissingSymbol {
                symbol: "pt_free_point_pointer"
            }
        );
    }

    #[test]
    fn test_empty_table_reports_first_symbol() {
        assert_eq!(
            BoundTable::bind(&NativeTable::default()).unwrap_err(),
            BindingError::MissingSymbol {
                symbol: "pt_runtime_with_counter"
            }
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let table = NativeTable {
            point_layout: Some(padded_layout),
            ..NativeTable::linked()
        };
        assert_eq!(
            BoundTable::bind(&table).unwrap_err(),
            BindingError::ShapeMismatch {
                shape: "Point",
                attribute: "size",
                declared: 8,
                native: 12,
            }
        );
    }
}
