//! Scoped ownership of a native allocation.
//!
//! [`OwnedPoint`] is the structural form of the release obligation: the
//! allocation is released when the guard goes out of scope, on every exit
//! path (normal return, `?`, early return, unwinding). [`OwnedPoint::release`]
//! consumes the guard, so a second release through it does not type-check.
//!
//! [`PointScope`] covers raw handles: it remembers every handle allocated
//! through it so [`Boundary::scope`] can hold exactly those to account.

use core::ops::Deref;

use parking_lot::Mutex;

use crate::boundary::Boundary;
use crate::errors::BridgeResult;
use crate::ledger::{AllocationState, PointHandle};
use crate::shape::Point;

/// A native `Point` allocation owned by the current scope.
#[must_use = "dropping an OwnedPoint releases the native allocation immediately"]
pub struct OwnedPoint<'b> {
    boundary: &'b Boundary,
    handle: PointHandle,
    armed: bool,
}

impl<'b> OwnedPoint<'b> {
    pub(crate) fn new(boundary: &'b Boundary, handle: PointHandle) -> Self {
        Self {
            boundary,
            handle,
            armed: true,
        }
    }

    /// The ledger handle. Releasing it through [`Boundary::release`] while
    /// the guard is alive is detected as a double release when the guard
    /// drops.
    pub fn handle(&self) -> PointHandle {
        self.handle
    }

    /// Read the native storage.
    pub fn get(&self) -> BridgeResult<Point> {
        self.boundary.read(self.handle)
    }

    /// Overwrite the native storage.
    pub fn set(&self, point: Point) -> BridgeResult<()> {
        self.boundary.write(self.handle, point)
    }

    /// `showRef` on the native storage.
    pub fn show(&self) -> BridgeResult<()> {
        self.boundary.show_handle(self.handle)
    }

    /// `moveRef` on the native storage.
    pub fn move_ref(&self) -> BridgeResult<()> {
        self.boundary.move_handle(self.handle)
    }

    /// Release now and return the last value the storage held.
    pub fn release(mut self) -> BridgeResult<Point> {
        self.armed = false;
        self.boundary.release(self.handle)
    }
}

impl Drop for OwnedPoint<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.boundary.release(self.handle) {
            tracing::error!(handle = %self.handle, "scoped release failed: {err}");
        }
    }
}

impl std::fmt::Debug for OwnedPoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedPoint")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// The owning region of a [`Boundary::scope`] call.
///
/// Dereferences to the [`Boundary`]. Only handles from
/// [`PointScope::allocate_point_pointer`] belong to the scope; allocations
/// other threads make on the same boundary meanwhile are not its business.
pub struct PointScope<'b> {
    boundary: &'b Boundary,
    issued: Mutex<Vec<PointHandle>>,
}

impl<'b> PointScope<'b> {
    pub(crate) fn new(boundary: &'b Boundary) -> Self {
        Self {
            boundary,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Allocate a native point whose release obligation this scope owns.
    pub fn allocate_point_pointer(&self) -> BridgeResult<PointHandle> {
        let handle = self.boundary.allocate_point_pointer()?;
        self.issued.lock().push(handle);
        Ok(handle)
    }

    /// Handles allocated through this scope that are still outstanding.
    pub(crate) fn leaked(&self) -> Vec<PointHandle> {
        self.issued
            .lock()
            .iter()
            .copied()
            .filter(|&handle| self.boundary.state(handle) == Some(AllocationState::Allocated))
            .collect()
    }
}

impl Deref for PointScope<'_> {
    type Target = Boundary;

    fn deref(&self) -> &Boundary {
        self.boundary
    }
}

impl std::fmt::Debug for PointScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointScope")
            .field("issued", &*self.issued.lock())
            .finish_non_exhaustive()
    }
}
