//! Marshalling boundary for the native `Point` layer.
//!
//! Every value that crosses into `point-native` is classified first
//! ([`Crossing`]):
//! - `Point` by value: the callee gets a copy ([`Boundary::show`], [`Boundary::move_point`])
//! - `&Point` / `&mut Point`: host storage, visible mutation ([`Boundary::move_ref`])
//! - native allocations: scoped [`OwnedPoint`] guards or ledger-tracked [`PointHandle`]s
//! - [`MutableByteBuffer`]: holder-owned bytes the callee may rewrite
//! - `&str`: immutable, rejected by mutating operations
//!
//! Signatures and the `Point` layout are checked statically and again when
//! a [`Boundary`] is bound, before any call executes.

// Pulls in the native symbols declared in `native`.
extern crate point_native;

pub mod binding;
pub mod boundary;
pub mod buffer;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod native;
pub mod owned;
pub mod shape;

pub use binding::BoundTable;
pub use boundary::Boundary;
pub use buffer::{Classify, Crossing, MutableByteBuffer, TextArg};
pub use config::{BoundaryConfig, LeakPolicy};
pub use errors::{
    BindingError, BridgeError, BridgeErrorKind, BridgeResult, ClassificationError,
    OwnershipViolation,
};
pub use ledger::{AllocationState, LedgerStats, POINT_HANDLE_INVALID, PointHandle};
pub use native::NativeTable;
pub use owned::{OwnedPoint, PointScope};
pub use shape::{Point, PointLayout, ShapeDeclaration, declared_point_layout};
