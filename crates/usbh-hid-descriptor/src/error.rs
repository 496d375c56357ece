//! Descriptor parsing errors.

/// Errors produced by the strict descriptor parsers.
///
/// The lenient HID descriptor scan in [`crate::hid`] never fails; it reports a
/// miss through [`crate::HidDescriptorLookup::NotFound`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// Not enough bytes for the fixed layout.
    #[error("descriptor truncated: need {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// `bDescriptorType` did not match the layout being parsed.
    #[error("unexpected descriptor type: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedType {
        /// Expected type code
        expected: u8,
        /// Type code found
        actual: u8,
    },

    /// `bLength` is zero, too small, or runs past the end of the blob.
    #[error("invalid descriptor length {length} at offset {offset}")]
    InvalidLength {
        /// Byte offset of the descriptor within the blob
        offset: usize,
        /// Offending `bLength`
        length: u8,
    },
}

/// Result alias for descriptor parsing.
pub type DescriptorResult<T> = Result<T, DescriptorError>;
