//! Allocation ledger: release obligations for native allocations.
//!
//! Every pointer returned by `pt_get_point_pointer` is recorded here under a
//! fresh [`PointHandle`]. Host code only ever sees the handle, never the
//! address. An allocation moves from [`AllocationState::Allocated`] to
//! [`AllocationState::Released`] exactly once.
//!
//! Handle ids come from a monotonic counter and are never reused. Native
//! addresses can be (the allocator is free to hand the same block out again),
//! which is why the ledger is keyed on the id rather than the address. The
//! entry is removed on release: any issued id missing from the table has been
//! released, so the table only ever holds outstanding allocations.

use core::fmt;
use core::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::errors::OwnershipViolation;
use crate::shape::Point;

/// An opaque reference to a native allocation.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointHandle(u64);

/// Never issued by a ledger.
pub const POINT_HANDLE_INVALID: PointHandle = PointHandle(0);

impl PointHandle {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    Allocated,
    Released,
}

/// Address of a native allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NativePtr(NonNull<Point>);

// SAFETY: the ledger only stores the address. It is dereferenced exclusively
// by the boundary while it holds the session lock.
unsafe impl Send for NativePtr {}
unsafe impl Sync for NativePtr {}

impl NativePtr {
    pub(crate) fn as_ptr(self) -> *mut Point {
        self.0.as_ptr()
    }
}

/// Counters over the lifetime of a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub allocated: u64,
    pub released: u64,
    pub peak_outstanding: u64,
}

impl LedgerStats {
    pub fn outstanding(&self) -> u64 {
        self.allocated - self.released
    }
}

pub struct AllocationLedger {
    entries: DashMap<u64, NativePtr>,
    counter: AtomicU64,
    stats: Mutex<LedgerStats>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            counter: AtomicU64::new(1), // 0 is POINT_HANDLE_INVALID
            stats: Mutex::new(LedgerStats::default()),
        }
    }

    /// Record a new release obligation.
    pub(crate) fn record(&self, address: NonNull<Point>) -> PointHandle {
        let id = self.counter.fetch_add(1, Ordering::AcqRel);
        self.entries.insert(id, NativePtr(address));

        let mut stats = self.stats.lock();
        stats.allocated += 1;
        stats.peak_outstanding = stats.peak_outstanding.max(stats.outstanding());

        PointHandle(id)
    }

    /// Whether this ledger ever issued `handle`.
    fn issued(&self, handle: PointHandle) -> bool {
        handle != POINT_HANDLE_INVALID && handle.0 < self.counter.load(Ordering::Acquire)
    }

    /// Address of a live allocation.
    pub(crate) fn resolve(&self, handle: PointHandle) -> Result<NativePtr, OwnershipViolation> {
        match self.entries.get(&handle.0) {
            Some(address) => Ok(*address),
            None if self.issued(handle) => Err(OwnershipViolation::UseAfterRelease { handle }),
            None => Err(OwnershipViolation::UnknownHandle { handle }),
        }
    }

    /// Discharge an obligation. The caller must free the returned address
    /// through the native releaser before dropping the session lock.
    pub(crate) fn discharge(&self, handle: PointHandle) -> Result<NativePtr, OwnershipViolation> {
        match self.entries.remove(&handle.0) {
            Some((_, address)) => {
                self.stats.lock().released += 1;
                Ok(address)
            }
            None if self.issued(handle) => Err(OwnershipViolation::DoubleRelease { handle }),
            None => Err(OwnershipViolation::UnknownHandle { handle }),
        }
    }

    pub fn state(&self, handle: PointHandle) -> Option<AllocationState> {
        if self.entries.contains_key(&handle.0) {
            Some(AllocationState::Allocated)
        } else if self.issued(handle) {
            Some(AllocationState::Released)
        } else {
            None
        }
    }

    /// Handles whose obligation has not been discharged, in issue order.
    pub fn outstanding(&self) -> Vec<PointHandle> {
        let mut handles: Vec<PointHandle> = self
            .entries
            .iter()
            .map(|entry| PointHandle(*entry.key()))
            .collect();
        handles.sort();
        handles
    }

    /// Number of entries held, which is the number of outstanding allocations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> LedgerStats {
        *self.stats.lock()
    }
}

impl Default for AllocationLedger {
    fn default() -> Self {
        Self::new()
    }
}
