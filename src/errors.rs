//! Error types for the marshalling boundary

use derive_more::{Display, Error, From};

use crate::ledger::PointHandle;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Display, Debug)]
#[display("{kind}")]
pub struct BridgeError {
    kind: Box<BridgeErrorKind>,
}

impl<E> From<E> for BridgeError
where
    BridgeErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        BridgeError {
            kind: Box::new(BridgeErrorKind::from(error)),
        }
    }
}

impl BridgeError {
    pub fn kind(&self) -> &BridgeErrorKind {
        &self.kind
    }

    pub fn as_binding(&self) -> Option<&BindingError> {
        match &*self.kind {
            BridgeErrorKind::Binding(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_ownership(&self) -> Option<&OwnershipViolation> {
        match &*self.kind {
            BridgeErrorKind::Ownership(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_classification(&self) -> Option<&ClassificationError> {
        match &*self.kind {
            BridgeErrorKind::Classification(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Display, Debug, From)]
pub enum BridgeErrorKind {
    #[display("Binding error: {_0}")]
    Binding(BindingError),

    #[display("Ownership violation: {_0}")]
    Ownership(OwnershipViolation),

    #[display("Classification error: {_0}")]
    Classification(ClassificationError),

    #[display("Native counter exhausted at {next}; no room for two more ticks")]
    #[from(skip)]
    CounterExhausted { next: i32 },

    #[display("Native allocation failed")]
    #[from(skip)]
    AllocationFailed,
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            BridgeErrorKind::Binding(e) => Some(e),
            BridgeErrorKind::Ownership(e) => Some(e),
            BridgeErrorKind::Classification(e) => Some(e),
            _ => None,
        }
    }
}

/// Signature or shape problems, found before any call executes.
#[derive(Display, Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[display("native symbol `{symbol}` is missing from the function table")]
    MissingSymbol { symbol: &'static str },

    #[display("shape `{shape}` disagrees on {attribute}: declared {declared}, native {native}")]
    ShapeMismatch {
        shape: &'static str,
        attribute: &'static str,
        declared: u32,
        native: u32,
    },

    #[display("native runtime could not be created")]
    RuntimeUnavailable,
}

/// Misuse of a native allocation's release obligation.
#[derive(Display, Debug, Error, Clone, PartialEq, Eq)]
pub enum OwnershipViolation {
    #[display("allocation {handle} released twice")]
    DoubleRelease { handle: PointHandle },

    #[display("allocation {handle} used after release")]
    UseAfterRelease { handle: PointHandle },

    #[display("allocation {handle} was not issued by this boundary")]
    UnknownHandle { handle: PointHandle },

    #[display("{} allocation(s) outstanding at scope exit: {handles:?}", handles.len())]
    Leaked { handles: Vec<PointHandle> },
}

/// A value routed to an operation its crossing class does not support.
#[derive(Display, Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[display("immutable text cannot be mutated in place; copy it into a MutableByteBuffer")]
    ImmutableText,

    #[display("text contains a NUL byte at offset {offset}")]
    InteriorNul { offset: usize },

    #[display("buffer capacity {capacity} is below the {required} bytes the text needs")]
    InsufficientCapacity { required: usize, capacity: usize },
}
