//! Crossing classification and the mutable byte buffer.
//!
//! Host text (`&str`) has no storage the native side may write to. Text that
//! a native callee should rewrite in place is first copied into a
//! [`MutableByteBuffer`]; the source string is never the call's storage.

use core::ffi::c_char;
use core::fmt;
use std::borrow::Cow;

use crate::errors::ClassificationError;
use crate::ledger::PointHandle;
use crate::owned::OwnedPoint;
use crate::shape::Point;

/// How a value crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crossing {
    /// Bits copied into the callee; callee mutations stay local.
    ByValue,
    /// Borrowed storage; callee mutations are visible to the holder.
    ByReference,
    /// Native storage with a release obligation.
    OwnedNativeAllocation,
    /// Holder-owned bytes the callee may rewrite in place.
    MutableByteBuffer,
    /// Host text with no writable storage.
    ImmutableText,
}

impl fmt::Display for Crossing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Crossing::ByValue => "by-value",
            Crossing::ByReference => "by-reference",
            Crossing::OwnedNativeAllocation => "owned-native-allocation",
            Crossing::MutableByteBuffer => "mutable-byte-buffer",
            Crossing::ImmutableText => "immutable-text",
        };
        f.write_str(name)
    }
}

/// Static crossing class of a host type.
pub trait Classify {
    const CROSSING: Crossing;
}

impl Classify for Point {
    const CROSSING: Crossing = Crossing::ByValue;
}

impl Classify for &Point {
    const CROSSING: Crossing = Crossing::ByReference;
}

impl Classify for &mut Point {
    const CROSSING: Crossing = Crossing::ByReference;
}

impl Classify for PointHandle {
    const CROSSING: Crossing = Crossing::OwnedNativeAllocation;
}

impl Classify for OwnedPoint<'_> {
    const CROSSING: Crossing = Crossing::OwnedNativeAllocation;
}

impl Classify for MutableByteBuffer {
    const CROSSING: Crossing = Crossing::MutableByteBuffer;
}

impl Classify for &str {
    const CROSSING: Crossing = Crossing::ImmutableText;
}

/// Fixed-capacity, NUL-terminated, holder-owned bytes.
///
/// The storage is a boxed slice, so its address does not move for the
/// lifetime of the buffer. The payload occupies the first `len` bytes and is
/// followed by at least one NUL; any extra capacity is zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableByteBuffer {
    storage: Box<[u8]>,
    len: usize,
}

impl MutableByteBuffer {
    /// Copy `text` into a buffer of exactly `text.len() + 1` bytes.
    pub fn from_text(text: &str) -> Result<Self, ClassificationError> {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClassificationError> {
        Self::with_capacity(bytes, bytes.len() + 1)
    }

    /// Copy `bytes` into a zero-filled buffer of `capacity` bytes.
    ///
    /// `capacity` must leave room for the terminator.
    pub fn with_capacity(bytes: &[u8], capacity: usize) -> Result<Self, ClassificationError> {
        if let Some(offset) = bytes.iter().position(|&b| b == 0) {
            return Err(ClassificationError::InteriorNul { offset });
        }
        let required = bytes.len() + 1;
        if capacity < required {
            return Err(ClassificationError::InsufficientCapacity { required, capacity });
        }

        let mut storage = vec![0u8; capacity].into_boxed_slice();
        storage[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            storage,
            len: bytes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// The payload region, excluding the terminator and spare capacity.
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Bytes past the payload. All zero unless a callee wrote beyond the
    /// terminator.
    pub fn spare(&self) -> &[u8] {
        &self.storage[self.len..]
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut c_char {
        self.storage.as_mut_ptr().cast()
    }
}

/// Argument to an in-place text mutation.
#[derive(Debug)]
pub enum TextArg<'a> {
    Immutable(&'a str),
    Buffer(&'a mut MutableByteBuffer),
}

impl TextArg<'_> {
    pub fn crossing(&self) -> Crossing {
        match self {
            TextArg::Immutable(_) => <&str as Classify>::CROSSING,
            TextArg::Buffer(_) => <MutableByteBuffer as Classify>::CROSSING,
        }
    }
}

impl<'a> From<&'a str> for TextArg<'a> {
    fn from(text: &'a str) -> Self {
        TextArg::Immutable(text)
    }
}

impl<'a> From<&'a String> for TextArg<'a> {
    fn from(text: &'a String) -> Self {
        TextArg::Immutable(text.as_str())
    }
}

impl<'a> From<&'a mut MutableByteBuffer> for TextArg<'a> {
    fn from(buffer: &'a mut MutableByteBuffer) -> Self {
        TextArg::Buffer(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_copies_and_terminates() {
        let source = "staring string";
        let buffer = MutableByteBuffer::from_text(source).unwrap();
        assert_eq!(buffer.len(), 14);
        assert_eq!(buffer.capacity(), 15);
        assert_eq!(buffer.as_bytes(), source.as_bytes());
        assert_eq!(buffer.spare(), &[0]);
        assert_ne!(buffer.as_bytes().as_ptr(), source.as_ptr());
    }

    #[test]
    fn test_extra_capacity_is_zero_filled() {
        let buffer = MutableByteBuffer::with_capacity(b"ab", 6).unwrap();
        assert_eq!(buffer.as_bytes(), b"ab");
        assert_eq!(buffer.spare(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_interior_nul() {
        assert_eq!(
            MutableByteBuffer::from_bytes(b"a\0b"),
            Err(ClassificationError::InteriorNul { offset: 1 })
        );
    }

    #[test]
    fn test_rejects_missing_room_for_terminator() {
        assert_eq!(
            MutableByteBuffer::with_capacity(b"abc", 3),
            Err(ClassificationError::InsufficientCapacity {
                required: 4,
                capacity: 3,
            })
        );
    }

    #[test]
    fn test_empty_text() {
        let buffer = MutableByteBuffer::from_text("").unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 1);
    }

    #[test]
    fn test_text_arg_classification() {
        let mut buffer = MutableByteBuffer::from_text("x").unwrap();
        assert_eq!(TextArg::from("x").crossing(), Crossing::ImmutableText);
        assert_eq!(
            TextArg::from(&mut buffer).crossing(),
            Crossing::MutableByteBuffer
        );
        assert_eq!(<Point as Classify>::CROSSING.to_string(), "by-value");
    }
}
