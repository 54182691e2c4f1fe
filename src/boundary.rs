//! The marshalling boundary.
//!
//! [`Boundary`] owns one native runtime and the allocation ledger. Every
//! native call runs while holding the session lock, and every ledger change
//! happens under that same lock, so release obligations are created and
//! discharged in step with the calls that cause them. The native layer has
//! no synchronization of its own; this lock is the only mutual-exclusion
//! domain around its counter.

use core::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::binding::BoundTable;
use crate::buffer::{Classify, Crossing, MutableByteBuffer, TextArg};
use crate::config::{BoundaryConfig, LeakPolicy};
use crate::errors::{
    BindingError, BridgeErrorKind, BridgeResult, ClassificationError, OwnershipViolation,
};
use crate::ledger::{AllocationLedger, AllocationState, LedgerStats, NativePtr, PointHandle};
use crate::native::{NativeRuntime, NativeTable};
use crate::owned::{OwnedPoint, PointScope};
use crate::shape::{Point, PointLayout};

struct Session {
    table: BoundTable,
    runtime: NonNull<NativeRuntime>,
}

// SAFETY: the runtime pointer is only passed to native calls made while the
// session mutex is held, so the `!Sync` native state is never shared.
unsafe impl Send for Session {}

impl Session {
    fn runtime(&self) -> *mut NativeRuntime {
        self.runtime.as_ptr()
    }

    /// Refuse a counter-consuming call that could not return strictly
    /// increasing values.
    fn ensure_two_ticks(&self) -> BridgeResult<()> {
        // SAFETY: the runtime is live for the session's lifetime.
        let next = unsafe { (self.table.counter_peek)(self.runtime()) };
        if next == i32::MAX {
            return Err(BridgeErrorKind::CounterExhausted { next }.into());
        }
        Ok(())
    }

    fn read_transcript(&self) -> Vec<String> {
        // SAFETY: live runtime. Each read gets either no buffer
        // (capacity 0) or `bytes`, which is exactly `len` bytes long.
        let count = unsafe { (self.table.transcript_len)(self.runtime()) };
        let mut lines = Vec::with_capacity(count);
        for index in 0..count {
            let len =
                unsafe { (self.table.transcript_read)(self.runtime(), index, ptr::null_mut(), 0) };
            let Ok(len) = usize::try_from(len) else {
                break;
            };
            let mut bytes = vec![0u8; len];
            unsafe {
                (self.table.transcript_read)(self.runtime(), index, bytes.as_mut_ptr(), bytes.len())
            };
            lines.push(String::from_utf8_lossy(&bytes).into_owned());
        }
        lines
    }

    fn clear_transcript(&self) {
        // SAFETY: live runtime.
        unsafe { (self.table.transcript_clear)(self.runtime()) }
    }
}

pub struct Boundary {
    session: Mutex<Session>,
    ledger: AllocationLedger,
    config: BoundaryConfig,
    settled: AtomicBool,
}

impl Boundary {
    /// Bind against the native layer linked into this binary.
    pub fn new(config: BoundaryConfig) -> BridgeResult<Self> {
        Self::bind(&NativeTable::linked(), config)
    }

    /// Validate `table` and create a native runtime.
    ///
    /// Fails with a binding error before any point operation runs if a
    /// symbol is missing or the native `Point` layout disagrees with the
    /// host declaration.
    pub fn bind(table: &NativeTable, config: BoundaryConfig) -> BridgeResult<Self> {
        let table = BoundTable::bind(table)?;
        // SAFETY: takes a plain integer and returns an owned pointer or null.
        let runtime = unsafe { (table.runtime_with_counter)(config.counter_start) };
        let runtime = NonNull::new(runtime).ok_or(BindingError::RuntimeUnavailable)?;
        tracing::debug!(counter_start = config.counter_start, "boundary bound");

        Ok(Self {
            session: Mutex::new(Session { table, runtime }),
            ledger: AllocationLedger::new(),
            config,
            settled: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    fn call<T>(&self, op: &'static str, crossing: Crossing, f: impl FnOnce(&Session) -> T) -> T {
        let session = self.session.lock();
        tracing::debug!(op, %crossing, "native call");
        f(&session)
    }

    fn resolve(&self, handle: PointHandle) -> BridgeResult<NativePtr> {
        self.ledger.resolve(handle).map_err(|violation| {
            tracing::warn!(%handle, "{violation}");
            violation.into()
        })
    }

    pub fn layout(&self) -> PointLayout {
        // SAFETY: no arguments, no state.
        self.call("point_layout", Crossing::ByValue, |s| unsafe {
            (s.table.point_layout)()
        })
    }

    // =========================================================================
    // By value and by reference
    // =========================================================================

    pub fn show(&self, point: Point) {
        // SAFETY: live runtime; `point` is passed by value.
        self.call("show_point", Point::CROSSING, |s| unsafe {
            (s.table.show_point)(s.runtime(), point)
        })
    }

    pub fn show_ref(&self, point: &Point) {
        // SAFETY: `point` is a live shared borrow for the whole call.
        self.call("show_point_ref", <&Point>::CROSSING, |s| unsafe {
            (s.table.show_point_ref)(s.runtime(), ptr::from_ref(point))
        })
    }

    /// The native side increments its own copy. `point` is `Copy`; the
    /// caller's value cannot change.
    pub fn move_point(&self, point: Point) {
        // SAFETY: live runtime; `point` is passed by value.
        self.call("move_point", Point::CROSSING, |s| unsafe {
            (s.table.move_point)(s.runtime(), point)
        })
    }

    /// Increment both fields of the caller's storage through the native layer.
    pub fn move_ref(&self, point: &mut Point) {
        // SAFETY: `point` is an exclusive borrow for the whole call.
        self.call("move_point_ref", <&mut Point>::CROSSING, |s| unsafe {
            (s.table.move_point_ref)(s.runtime(), ptr::from_mut(point))
        })
    }

    /// Next point from the native counter, returned by value.
    pub fn get_point(&self) -> BridgeResult<Point> {
        self.call("get_point", Point::CROSSING, |s| {
            s.ensure_two_ticks()?;
            // SAFETY: live runtime, counter checked above.
            Ok(unsafe { (s.table.get_point)(s.runtime()) })
        })
    }

    // =========================================================================
    // Owned native allocations
    // =========================================================================

    /// Allocate a native point owned by the returned guard.
    pub fn acquire_point(&self) -> BridgeResult<OwnedPoint<'_>> {
        let handle = self.allocate_point_pointer()?;
        Ok(OwnedPoint::new(self, handle))
    }

    /// Run `f` with a native point that is released when `f` returns or
    /// unwinds.
    pub fn with_point_pointer<T>(&self, f: impl FnOnce(&OwnedPoint<'_>) -> T) -> BridgeResult<T> {
        let owned = self.acquire_point()?;
        let value = f(&owned);
        owned.release()?;
        Ok(value)
    }

    /// Allocate a native point and record the release obligation.
    ///
    /// The caller must pass the handle to [`release`](Self::release) exactly
    /// once. Prefer [`acquire_point`](Self::acquire_point).
    pub fn allocate_point_pointer(&self) -> BridgeResult<PointHandle> {
        self.call("get_point_pointer", PointHandle::CROSSING, |s| {
            s.ensure_two_ticks()?;
            // SAFETY: live runtime. Ownership of the result is recorded
            // below before the lock is released.
            let raw = unsafe { (s.table.get_point_pointer)(s.runtime()) };
            let address = NonNull::new(raw).ok_or(BridgeErrorKind::AllocationFailed)?;
            let handle = self.ledger.record(address);
            tracing::debug!(%handle, "release obligation recorded");
            Ok(handle)
        })
    }

    pub fn read(&self, handle: PointHandle) -> BridgeResult<Point> {
        self.call("read", PointHandle::CROSSING, |_| {
            let address = self.resolve(handle)?;
            // SAFETY: `resolve` only returns addresses still allocated, and
            // the session lock excludes a concurrent release.
            Ok(unsafe { address.as_ptr().read() })
        })
    }

    pub fn write(&self, handle: PointHandle, point: Point) -> BridgeResult<()> {
        self.call("write", PointHandle::CROSSING, |_| {
            let address = self.resolve(handle)?;
            // SAFETY: as in `read`.
            unsafe { address.as_ptr().write(point) };
            Ok(())
        })
    }

    pub fn show_handle(&self, handle: PointHandle) -> BridgeResult<()> {
        self.call("show_point_ref", PointHandle::CROSSING, |s| {
            let address = self.resolve(handle)?;
            // SAFETY: live allocation, session lock held.
            unsafe { (s.table.show_point_ref)(s.runtime(), address.as_ptr()) };
            Ok(())
        })
    }

    pub fn move_handle(&self, handle: PointHandle) -> BridgeResult<()> {
        self.call("move_point_ref", PointHandle::CROSSING, |s| {
            let address = self.resolve(handle)?;
            // SAFETY: live allocation, session lock held.
            unsafe { (s.table.move_point_ref)(s.runtime(), address.as_ptr()) };
            Ok(())
        })
    }

    /// Discharge the release obligation for `handle` through the native
    /// releaser. Returns the value the storage held.
    pub fn release(&self, handle: PointHandle) -> BridgeResult<Point> {
        self.call("free_point_pointer", PointHandle::CROSSING, |s| {
            let address = self.ledger.discharge(handle).map_err(|violation| {
                tracing::warn!(%handle, "{violation}");
                violation
            })?;
            // SAFETY: `discharge` succeeds once per allocation, so this is the
            // only read-then-free of `address`, and it goes to the releaser
            // of the runtime that allocated it.
            let last = unsafe { address.as_ptr().read() };
            unsafe { (s.table.free_point_pointer)(s.runtime(), address.as_ptr()) };
            tracing::debug!(%handle, "release obligation discharged");
            Ok(last)
        })
    }

    pub fn state(&self, handle: PointHandle) -> Option<AllocationState> {
        self.ledger.state(handle)
    }

    pub fn outstanding(&self) -> Vec<PointHandle> {
        self.ledger.outstanding()
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats()
    }

    /// Run `f` as an owning scope for raw handles.
    ///
    /// Handles allocated through the [`PointScope`] and still outstanding
    /// when `f` returns are a leak: they are reported, handled per the
    /// [`LeakPolicy`], and surface as [`OwnershipViolation::Leaked`] unless
    /// `f` already failed. Allocations made by other callers of this
    /// boundary while `f` runs are left alone.
    pub fn scope<T>(&self, f: impl FnOnce(&PointScope<'_>) -> BridgeResult<T>) -> BridgeResult<T> {
        let scope = PointScope::new(self);
        let result = f(&scope);
        let leaked = scope.leaked();

        if leaked.is_empty() {
            return result;
        }
        self.handle_leak(&leaked);
        result.and(Err(OwnershipViolation::Leaked { handles: leaked }.into()))
    }

    fn handle_leak(&self, handles: &[PointHandle]) {
        tracing::error!(
            count = handles.len(),
            policy = ?self.config.leak_policy,
            "release obligations outstanding at scope exit: {handles:?}"
        );
        if self.config.leak_policy == LeakPolicy::Reclaim {
            for &handle in handles {
                if let Err(err) = self.release(handle) {
                    tracing::error!(%handle, "reclaiming leaked allocation failed: {err}");
                }
            }
        }
    }

    fn settle(&self) -> BridgeResult<()> {
        if self.settled.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let handles = self.ledger.outstanding();
        if handles.is_empty() {
            return Ok(());
        }
        self.handle_leak(&handles);
        Err(OwnershipViolation::Leaked { handles }.into())
    }

    /// Shut the boundary down, reporting any allocation never released.
    pub fn close(self) -> BridgeResult<()> {
        self.settle()
    }

    // =========================================================================
    // Byte buffers
    // =========================================================================

    /// Increment every byte of `text` in place.
    ///
    /// Only a [`MutableByteBuffer`] is accepted. Immutable text is rejected
    /// before the native layer is called.
    pub fn add_one_to_string<'t>(&self, text: impl Into<TextArg<'t>>) -> BridgeResult<()> {
        let text = text.into();
        let crossing = text.crossing();
        let buffer = match text {
            TextArg::Buffer(buffer) => buffer,
            TextArg::Immutable(_) => {
                tracing::warn!(%crossing, "rejected in-place mutation of immutable text");
                return Err(ClassificationError::ImmutableText.into());
            }
        };

        if let Some(offset) = buffer.as_bytes().iter().position(|&b| b == 0) {
            tracing::warn!(offset, "rejected buffer with a NUL inside its payload");
            return Err(ClassificationError::InteriorNul { offset }.into());
        }

        // SAFETY: the payload holds no NUL and is followed by the buffer's
        // terminator, so the native walk stays inside the exclusive borrow.
        self.call("add_one_to_string", crossing, |s| unsafe {
            (s.table.add_one_to_string)(buffer.as_mut_ptr())
        });
        Ok(())
    }

    /// Copy `text` into a fresh buffer and mutate the copy.
    pub fn mutated_copy(&self, text: &str) -> BridgeResult<MutableByteBuffer> {
        let mut buffer = MutableByteBuffer::from_text(text)?;
        self.add_one_to_string(&mut buffer)?;
        Ok(buffer)
    }

    // =========================================================================
    // Transcript
    // =========================================================================

    /// Display lines the native layer still retains, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.call("transcript_read", Crossing::MutableByteBuffer, Session::read_transcript)
    }

    /// Read and clear the transcript in one step. No line produced by
    /// another caller can fall between the read and the clear.
    pub fn take_transcript(&self) -> Vec<String> {
        self.call("transcript_take", Crossing::MutableByteBuffer, |s| {
            let lines = s.read_transcript();
            s.clear_transcript();
            lines
        })
    }

    pub fn clear_transcript(&self) {
        self.call("transcript_clear", Crossing::ByReference, Session::clear_transcript)
    }
}

impl Drop for Boundary {
    fn drop(&mut self) {
        // Leaks are reported inside settle.
        let _ = self.settle();
        let session = self.session.get_mut();
        // SAFETY: `&mut self` proves no call is in flight; the runtime is
        // destroyed exactly once, here.
        unsafe { (session.table.runtime_destroy)(session.runtime()) };
    }
}

impl std::fmt::Debug for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boundary")
            .field("config", &self.config)
            .field("stats", &self.ledger.stats())
            .finish_non_exhaustive()
    }
}
