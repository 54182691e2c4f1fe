//! Native value layer.
//!
//! Defines [`Point`] and the C ABI functions that operate on it:
//! - Pass by value (`pt_show_point`, `pt_move_point`)
//! - Pass by reference (`pt_show_point_ref`, `pt_move_point_ref`)
//! - Return by value (`pt_get_point`)
//! - Return by reference with ownership transfer (`pt_get_point_pointer`,
//!   released by `pt_free_point_pointer`)
//! - In-place byte mutation (`pt_add_one_to_string`)
//!
//! Nothing here knows about the host. Pointers are trusted: apart from null
//! checks, no liveness or ownership validation happens on this side.

mod point;
mod runtime;

pub use point::{Point, PointLayout, pt_point_layout};
pub use runtime::{
    PointRuntime, TRANSCRIPT_LIMIT, pt_counter_peek, pt_runtime_destroy, pt_runtime_new,
    pt_runtime_with_counter, pt_transcript_clear, pt_transcript_len, pt_transcript_read,
};

use core::ffi::c_char;

// =============================================================================
// Display
// =============================================================================

/// Display a point passed by value.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_show_point(runtime: *mut PointRuntime, point: Point) {
    if let Some(runtime) = unsafe { runtime.as_ref() } {
        runtime.display(format_args!("Point in native is {point}"));
    }
}

/// Display a point passed by reference.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer. `point` must be null or
/// point to a live, initialized `Point`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_show_point_ref(runtime: *mut PointRuntime, point: *const Point) {
    let (Some(runtime), Some(point)) = (unsafe { runtime.as_ref() }, unsafe { point.as_ref() })
    else {
        return;
    };
    runtime.display(format_args!("Point in native is {point}"));
}

// =============================================================================
// Mutation
// =============================================================================

/// Increment a point passed by value.
///
/// Only the callee's copy changes; the caller's storage is never touched.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_move_point(runtime: *mut PointRuntime, mut point: Point) {
    let Some(runtime) = (unsafe { runtime.as_ref() }) else {
        return;
    };
    runtime.display(format_args!("Point in native is {point}"));
    point = point.incremented();
    runtime.display(format_args!("Point in native is {point}"));
}

/// Increment a point through a reference. The caller's storage changes.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer. `point` must be null or
/// point to a live `Point` that nothing else is accessing for the duration
/// of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_move_point_ref(runtime: *mut PointRuntime, point: *mut Point) {
    let (Some(runtime), Some(point)) = (unsafe { runtime.as_ref() }, unsafe { point.as_mut() })
    else {
        return;
    };
    runtime.display(format_args!("Point in native is {point}"));
    *point = point.incremented();
    runtime.display(format_args!("New point in native is {point}"));
}

// =============================================================================
// Allocation
// =============================================================================

/// Return a fresh point by value, consuming two counter ticks.
///
/// Returns `(0, 0)` without ticking for a null runtime.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_get_point(runtime: *mut PointRuntime) -> Point {
    let Some(runtime) = (unsafe { runtime.as_ref() }) else {
        return Point::default();
    };
    let point = runtime.next_point();
    runtime.display(format_args!("Returning Point {point}"));
    point
}

/// Allocate a fresh point and transfer ownership to the caller.
///
/// The caller must eventually pass the pointer to [`pt_free_point_pointer`]
/// on the same runtime, exactly once. Returns null for a null runtime.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_get_point_pointer(runtime: *mut PointRuntime) -> *mut Point {
    let Some(runtime) = (unsafe { runtime.as_ref() }) else {
        return core::ptr::null_mut();
    };
    let point = Box::new(runtime.next_point());
    runtime.display(format_args!("Returning Point {point}"));
    Box::into_raw(point)
}

/// Release a point allocated by [`pt_get_point_pointer`].
///
/// # Safety
///
/// `point` must have been returned by [`pt_get_point_pointer`] and not freed
/// since. Freeing twice, or freeing any other pointer, is undefined behavior.
/// Null is a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_free_point_pointer(runtime: *mut PointRuntime, point: *mut Point) {
    if point.is_null() {
        return;
    }
    let point = unsafe { Box::from_raw(point) };
    if let Some(runtime) = unsafe { runtime.as_ref() } {
        runtime.display(format_args!("Freeing Point {point}"));
    }
}

// =============================================================================
// Byte buffers
// =============================================================================

/// Increment every byte of a NUL-terminated buffer in place.
///
/// Bytes wrap: `0xFF` becomes `0x00`. The walk continues past it, but the
/// new NUL then ends every later walk over the same buffer at that byte.
///
/// # Safety
///
/// `text` must be null or point to writable storage containing a NUL byte
/// within its allocation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_add_one_to_string(text: *mut c_char) {
    if text.is_null() {
        return;
    }
    let mut cursor = text.cast::<u8>();
    unsafe {
        while *cursor != 0 {
            *cursor = (*cursor).wrapping_add(1);
            cursor = cursor.add(1);
        }
    }
}
