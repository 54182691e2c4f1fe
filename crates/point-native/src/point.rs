//! The `Point` record and its self-reported layout.
//!
//! `Point` is the only struct that crosses the boundary. Its layout is part of
//! the ABI: two `i32` fields, `x` then `y`, no padding. Hosts compare their own
//! declaration against [`pt_point_layout`] before making any call.

use core::fmt;
use core::mem::{align_of, offset_of, size_of};

/// A coordinate pair. No identity beyond its field values.
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

    /// Both fields advanced by one, wrapping at `i32::MAX`.
    pub const fn incremented(self) -> Self {
        Self {
            x: self.x.wrapping_add(1),
            y: self.y.wrapping_add(1),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// In-memory shape of [`Point`] as compiled into this library.
///
/// All values are in bytes.
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

impl PointLayout {
    /// Layout of this build's [`Point`].
    pub const fn of_point() -> Self {
        Self {
            size: size_of::<Point>() as u32,
            align: align_of::<Point>() as u32,
            x_offset: offset_of!(Point, x) as u32,
            x_size: size_of::<i32>() as u32,
            y_offset: offset_of!(Point, y) as u32,
            y_size: size_of::<i32>() as u32,
        }
    }
}

const _: () = assert!(size_of::<Point>() == 8);
const _: () = assert!(offset_of!(Point, x) == 0);
const _: () = assert!(offset_of!(Point, y) == 4);

/// Report the layout of [`Point`] as compiled into this library.
///
/// Signature: `() -> PointLayout`
#[unsafe(no_mangle)]
pub extern "C" fn pt_point_layout() -> PointLayout {
    PointLayout::of_point()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_has_no_padding() {
        let layout = pt_point_layout();
        assert_eq!(layout.size, layout.x_size + layout.y_size);
        assert_eq!(layout.x_offset, 0);
        assert_eq!(layout.y_offset, layout.x_size);
        assert_eq!(layout.align, 4);
    }

    #[test]
    fn test_display_matches_transcript_format() {
        assert_eq!(Point::new(3, -4).to_string(), "(3, -4)");
    }

    #[test]
    fn test_incremented_wraps() {
        let p = Point::new(i32::MAX, 0).incremented();
        assert_eq!(p, Point::new(i32::MIN, 1));
    }
}
