//! Per-instance native state: the coordinate counter and the display transcript.
//!
//! Every [`PointRuntime`] owns its own counter, so independent hosts (and
//! tests) observe independent deterministic sequences.
//!
//! The runtime provides no internal synchronization. It uses `Cell`/`RefCell`
//! and is `!Sync`; a multi-threaded host must serialize every call that
//! passes the same runtime pointer.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::collections::VecDeque;

use crate::point::Point;

/// Display lines retained per runtime. Older lines are dropped first.
pub const TRANSCRIPT_LIMIT: usize = 1024;

/// Native-side state shared by every operation that needs a counter or
/// produces display output.
#[derive(Debug, Default)]
pub struct PointRuntime {
    counter: Cell<i32>,
    transcript: RefCell<VecDeque<String>>,
}

impl PointRuntime {
    pub fn new() -> Self {
        Self::with_counter(0)
    }

    pub fn with_counter(start: i32) -> Self {
        Self {
            counter: Cell::new(start),
            transcript: RefCell::new(VecDeque::new()),
        }
    }

    /// Next counter value. Saturates at `i32::MAX`: once there, every tick
    /// yields `i32::MAX` again.
    pub fn tick(&self) -> i32 {
        let value = self.counter.get();
        self.counter.set(value.saturating_add(1));
        value
    }

    /// The value the next [`tick`](Self::tick) will return.
    pub fn peek(&self) -> i32 {
        self.counter.get()
    }

    /// Consume two ticks, `x` first.
    pub fn next_point(&self) -> Point {
        let x = self.tick();
        let y = self.tick();
        Point::new(x, y)
    }

    /// Record one line of display output, dropping the oldest line once
    /// [`TRANSCRIPT_LIMIT`] are held.
    pub fn display(&self, line: fmt::Arguments<'_>) {
        let line = line.to_string();
        tracing::debug!(target: "point_native", "{line}");
        let mut transcript = self.transcript.borrow_mut();
        if transcript.len() == TRANSCRIPT_LIMIT {
            transcript.pop_front();
        }
        transcript.push_back(line);
    }

    pub fn transcript(&self) -> Vec<String> {
        self.transcript.borrow().iter().cloned().collect()
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript.borrow().len()
    }

    pub(crate) fn with_line<T>(&self, index: usize, f: impl FnOnce(&str) -> T) -> Option<T> {
        self.transcript.borrow().get(index).map(|line| f(line))
    }

    pub fn clear_transcript(&self) {
        self.transcript.borrow_mut().clear();
    }
}

// =============================================================================
// Runtime lifecycle
// =============================================================================

/// Create a runtime whose counter starts at zero.
///
/// The caller owns the returned pointer and must pass it to
/// [`pt_runtime_destroy`] exactly once.
#[unsafe(no_mangle)]
pub extern "C" fn pt_runtime_new() -> *mut PointRuntime {
    Box::into_raw(Box::new(PointRuntime::new()))
}

/// Create a runtime whose counter starts at `start`.
#[unsafe(no_mangle)]
pub extern "C" fn pt_runtime_with_counter(start: i32) -> *mut PointRuntime {
    Box::into_raw(Box::new(PointRuntime::with_counter(start)))
}

/// Destroy a runtime.
///
/// # Safety
///
/// `runtime` must come from [`pt_runtime_new`] or [`pt_runtime_with_counter`]
/// and must not have been destroyed yet. Null is a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_runtime_destroy(runtime: *mut PointRuntime) {
    if !runtime.is_null() {
        unsafe {
            drop(Box::from_raw(runtime));
        }
    }
}

/// Peek at the next counter value without consuming it.
///
/// Returns `i32::MIN` for a null runtime.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_counter_peek(runtime: *mut PointRuntime) -> i32 {
    match unsafe { runtime.as_ref() } {
        Some(runtime) => runtime.peek(),
        None => i32::MIN,
    }
}

// =============================================================================
// Transcript access
// =============================================================================

/// Number of display lines recorded so far.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_transcript_len(runtime: *mut PointRuntime) -> usize {
    match unsafe { runtime.as_ref() } {
        Some(runtime) => runtime.transcript_len(),
        None => 0,
    }
}

/// Copy display line `index` into a caller-owned buffer.
///
/// Returns the full byte length of the line (which may exceed `capacity`;
/// only `min(len, capacity)` bytes are written, no terminator), or `-1` if
/// the runtime is null or `index` is out of range. Passing `capacity == 0`
/// queries the length without writing.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer. When `capacity > 0`,
/// `buffer` must be valid for `capacity` bytes of writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_transcript_read(
    runtime: *mut PointRuntime,
    index: usize,
    buffer: *mut u8,
    capacity: usize,
) -> isize {
    let Some(runtime) = (unsafe { runtime.as_ref() }) else {
        return -1;
    };

    runtime
        .with_line(index, |line| {
            let bytes = line.as_bytes();
            let count = bytes.len().min(capacity);
            if count > 0 && !buffer.is_null() {
                unsafe { core::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, count) };
            }
            bytes.len() as isize
        })
        .unwrap_or(-1)
}

/// Drop every recorded display line.
///
/// # Safety
///
/// `runtime` must be null or a live runtime pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pt_transcript_clear(runtime: *mut PointRuntime) {
    if let Some(runtime) = unsafe { runtime.as_ref() } {
        runtime.clear_transcript();
    }
}
