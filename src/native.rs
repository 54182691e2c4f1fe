//! Signature declarations for the native value layer.
//!
//! Every symbol the boundary calls is declared here with the host's own
//! [`Point`]/[`PointLayout`] mirrors. [`NativeTable`] collects them as
//! function pointers so a binding can be validated (and, in tests, tampered
//! with) before any call executes.

use core::ffi::c_char;

use crate::shape::{Point, PointLayout};

/// Opaque native runtime (counter + transcript), owned by the native layer.
#[repr(C)]
pub struct NativeRuntime {
    _opaque: [u8; 0],
}

unsafe extern "C" {
    fn pt_runtime_with_counter(start: i32) -> *mut NativeRuntime;
    fn pt_runtime_destroy(runtime: *mut NativeRuntime);
    fn pt_point_layout() -> PointLayout;
    fn pt_counter_peek(runtime: *mut NativeRuntime) -> i32;

    fn pt_show_point(runtime: *mut NativeRuntime, point: Point);
    fn pt_show_point_ref(runtime: *mut NativeRuntime, point: *const Point);
    fn pt_move_point(runtime: *mut NativeRuntime, point: Point);
    fn pt_move_point_ref(runtime: *mut NativeRuntime, point: *mut Point);
    fn pt_get_point(runtime: *mut NativeRuntime) -> Point;
    fn pt_get_point_pointer(runtime: *mut NativeRuntime) -> *mut Point;
    fn pt_free_point_pointer(runtime: *mut NativeRuntime, point: *mut Point);
    fn pt_add_one_to_string(text: *mut c_char);

    fn pt_transcript_len(runtime: *mut NativeRuntime) -> usize;
    fn pt_transcript_read(
        runtime: *mut NativeRuntime,
        index: usize,
        buffer: *mut u8,
        capacity: usize,
    ) -> isize;
    fn pt_transcript_clear(runtime: *mut NativeRuntime);
}

pub type RuntimeNewFn = unsafe extern "C" fn(i32) -> *mut NativeRuntime;
pub type RuntimeFn = unsafe extern "C" fn(*mut NativeRuntime);
pub type LayoutFn = unsafe extern "C" fn() -> PointLayout;
pub type PeekFn = unsafe extern "C" fn(*mut NativeRuntime) -> i32;
pub type PointValueFn = unsafe extern "C" fn(*mut NativeRuntime, Point);
pub type PointConstRefFn = unsafe extern "C" fn(*mut NativeRuntime, *const Point);
pub type PointMutRefFn = unsafe extern "C" fn(*mut NativeRuntime, *mut Point);
pub type GetPointFn = unsafe extern "C" fn(*mut NativeRuntime) -> Point;
pub type GetPointPointerFn = unsafe extern "C" fn(*mut NativeRuntime) -> *mut Point;
pub type TextFn = unsafe extern "C" fn(*mut c_char);
pub type TranscriptLenFn = unsafe extern "C" fn(*mut NativeRuntime) -> usize;
pub type TranscriptReadFn = unsafe extern "C" fn(*mut NativeRuntime, usize, *mut u8, usize) -> isize;

/// Unvalidated function table. A `None` entry is a missing symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTable {
    pub runtime_with_counter: Option<RuntimeNewFn>,
    pub runtime_destroy: Option<RuntimeFn>,
    pub point_layout: Option<LayoutFn>,
    pub counter_peek: Option<PeekFn>,
    pub show_point: Option<PointValueFn>,
    pub show_point_ref: Option<PointConstRefFn>,
    pub move_point: Option<PointValueFn>,
    pub move_point_ref: Option<PointMutRefFn>,
    pub get_point: Option<GetPointFn>,
    pub get_point_pointer: Option<GetPointPointerFn>,
    pub free_point_pointer: Option<PointMutRefFn>,
    pub add_one_to_string: Option<TextFn>,
    pub transcript_len: Option<TranscriptLenFn>,
    pub transcript_read: Option<TranscriptReadFn>,
    pub transcript_clear: Option<RuntimeFn>,
}

impl NativeTable {
    /// Table for the native layer linked into this binary.
    pub fn linked() -> Self {
        Self {
            runtime_with_counter: Some(pt_runtime_with_counter),
            runtime_destroy: Some(pt_runtime_destroy),
            point_layout: Some(pt_point_layout),
            counter_peek: Some(pt_counter_peek),
            show_point: Some(pt_show_point),
            show_point_ref: Some(pt_show_point_ref),
            move_point: Some(pt_move_point),
            move_point_ref: Some(pt_move_point_ref),
            get_point: Some(pt_get_point),
            get_point_pointer: Some(pt_get_point_pointer),
            free_point_pointer: Some(pt_free_point_pointer),
            add_one_to_string: Some(pt_add_one_to_string),
            transcript_len: Some(pt_transcript_len),
            transcript_read: Some(pt_transcript_read),
            transcript_clear: Some(pt_transcript_clear),
        }
    }
}
