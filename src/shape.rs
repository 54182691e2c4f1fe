//! Host-side shape declarations.
//!
//! The host never borrows the native crate's types for the signatures it
//! calls through. It declares its own `#[repr(C)]` mirrors here and proves
//! them equal to the native definitions twice:
//!
//! - at compile time, against the native crate this binary links
//!   (`const` assertions below), and
//! - at bind time, against the layout the loaded library reports about
//!   itself through `pt_point_layout` ([`verify_point_layout`]).
//!
//! A mismatch in either place means the boundary is never constructed.

use core::fmt;
use core::mem::{align_of, offset_of, size_of};

use crate::errors::BindingError;

/// A coordinate pair as the host sees it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Mirror of the native layout report. All values are in bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointLayout {
    pub size: u32,
    pub align: u32,
    pub x_offset: u32,
    pub x_size: u32,
    pub y_offset: u32,
    pub y_size: u32,
}

/// One field of a declared shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

/// Static description of a type that crosses the boundary by value or by
/// reference.
pub trait ShapeDeclaration: Copy {
    const NAME: &'static str;
    const SIZE: usize;
    const ALIGN: usize;
    const FIELDS: &'static [FieldShape];
}

impl ShapeDeclaration for Point {
    const NAME: &'static str = "Point";
    const SIZE: usize = size_of::<Point>();
    const ALIGN: usize = align_of::<Point>();
    const FIELDS: &'static [FieldShape] = &[
        FieldShape {
            name: "x",
            offset: offset_of!(Point, x),
            size: size_of::<i32>(),
        },
        FieldShape {
            name: "y",
            offset: offset_of!(Point, y),
            size: size_of::<i32>(),
        },
    ];
}

// Host mirrors must match the linked native crate bit for bit.
const _: () = {
    assert!(size_of::<Point>() == size_of::<point_native::Point>());
    assert!(align_of::<Point>() == align_of::<point_native::Point>());
    assert!(offset_of!(Point, x) == offset_of!(point_native::Point, x));
    assert!(offset_of!(Point, y) == offset_of!(point_native::Point, y));
    assert!(size_of::<PointLayout>() == size_of::<point_native::PointLayout>());
    assert!(align_of::<PointLayout>() == align_of::<point_native::PointLayout>());
};

// Two i32 fields and no padding.
const _: () = {
    assert!(<Point as ShapeDeclaration>::FIELDS.len() == 2);
    assert!(<Point as ShapeDeclaration>::SIZE == 2 * size_of::<i32>());
};

/// The layout the host declares for [`Point`].
pub const fn declared_point_layout() -> PointLayout {
    let fields = <Point as ShapeDeclaration>::FIELDS;
    PointLayout {
        size: <Point as ShapeDeclaration>::SIZE as u32,
        align: <Point as ShapeDeclaration>::ALIGN as u32,
        x_offset: fields[0].offset as u32,
        x_size: fields[0].size as u32,
        y_offset: fields[1].offset as u32,
        y_size: fields[1].size as u32,
    }
}

/// Compare a native layout report with the host declaration.
///
/// Reports the first attribute that disagrees.
pub fn verify_point_layout(native: PointLayout) -> Result<(), BindingError> {
    let declared = declared_point_layout();
    let attributes = [
        ("size", declared.size, native.size),
        ("align", declared.align, native.align),
        ("x offset", declared.x_offset, native.x_offset),
        ("x size", declared.x_size, native.x_size),
        ("y offset", declared.y_offset, native.y_offset),
        ("y size", declared.y_size, native.y_size),
    ];

    match attributes
        .into_iter()
        .find(|(_, declared, native)| declared != native)
    {
        Some((attribute, declared, native)) => Err(BindingError::ShapeMismatch {
            shape: <Point as ShapeDeclaration>::NAME,
            attribute,
            declared,
            native,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_layout_matches_linked_native() {
        let native = point_native::pt_point_layout();
        let declared = declared_point_layout();
        assert_eq!(declared.size, native.size);
        assert_eq!(declared.align, native.align);
        assert_eq!(declared.x_offset, native.x_offset);
        assert_eq!(declared.y_offset, native.y_offset);
    }

    #[test]
    fn test_verify_accepts_declared_layout() {
        assert_eq!(verify_point_layout(declared_point_layout()), Ok(()));
    }

    #[test]
    fn test_verify_reports_first_mismatch() {
        let swapped = PointLayout {
            x_offset: 4,
            y_offset: 0,
            ..declared_point_layout()
        };
        assert_eq!(
            verify_point_layout(swapped),
            Err(BindingError::ShapeMismatch {
                shape: "Point",
                attribute: "x offset",
                declared: 0,
                native: 4,
            })
        );
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(-1, 2).to_string(), "(-1, 2)");
    }
}
