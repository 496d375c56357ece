//! HID class descriptor extraction from a configuration blob.
//!
//! Composite devices expose one HID descriptor per HID interface, each placed
//! after its interface descriptor. The scan tracks the most recent interface
//! number and captures the first HID descriptor whose owning interface
//! matches the filter.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::DescriptorIter;
use crate::constants::{descriptor_len, descriptor_type};
use crate::error::{DescriptorError, DescriptorResult};
use crate::reader::ByteReader;

/// HID class descriptor (HID 1.11 §6.2.1) with its first class descriptor
/// entry.
///
/// A zeroed value doubles as "no HID descriptor found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct HidDescriptor {
    /// `bLength`
    pub length: u8,
    /// `bDescriptorType`, 0x21
    pub descriptor_type: u8,
    /// `bcdHID`, e.g. 0x0111
    pub bcd_hid: u16,
    /// `bCountryCode`
    pub country_code: u8,
    /// `bNumDescriptors`
    pub num_descriptors: u8,
    /// `bDescriptorType` of the first class descriptor, normally 0x22
    pub report_descriptor_type: u8,
    /// `wDescriptorLength` of the first class descriptor
    pub report_descriptor_length: u16,
}

impl HidDescriptor {
    /// Size of the fixed layout.
    pub const LEN: usize = descriptor_len::HID;

    /// Parse the fixed 9-byte layout.
    ///
    /// # Errors
    ///
    /// Fails on fewer than 9 bytes or when `bDescriptorType` is not HID.
    pub fn from_bytes(bytes: &[u8]) -> DescriptorResult<Self> {
        let mut r = ByteReader::new(bytes);
        let length = r.read_u8()?;
        let kind = r.read_u8()?;
        if kind != descriptor_type::HID {
            return Err(DescriptorError::UnexpectedType {
                expected: descriptor_type::HID,
                actual: kind,
            });
        }
        Ok(Self {
            length,
            descriptor_type: kind,
            bcd_hid: r.read_u16_le()?,
            country_code: r.read_u8()?,
            num_descriptors: r.read_u8()?,
            report_descriptor_type: r.read_u8()?,
            report_descriptor_length: r.read_u16_le()?,
        })
    }

    /// `true` when a report descriptor of nonzero length is advertised.
    pub fn is_present(&self) -> bool {
        self.report_descriptor_length != 0
    }
}

/// Which interface's HID descriptor to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum InterfaceFilter {
    /// First HID descriptor in the blob
    #[default]
    Any,
    /// HID descriptor following the interface with this `bInterfaceNumber`
    Number(u8),
}

impl InterfaceFilter {
    fn accepts(self, current: Option<u8>) -> bool {
        match self {
            Self::Any => true,
            Self::Number(n) => current == Some(n),
        }
    }
}

impl From<u8> for InterfaceFilter {
    fn from(number: u8) -> Self {
        Self::Number(number)
    }
}

/// Outcome of a HID descriptor scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidDescriptorLookup {
    /// A matching HID descriptor was found.
    Found {
        /// Interface the descriptor followed, `None` if it preceded every
        /// interface descriptor
        interface: Option<u8>,
        /// Parsed fields
        descriptor: HidDescriptor,
    },
    /// The chain ended without a match.
    NotFound,
}

impl HidDescriptorLookup {
    /// The descriptor, or a zeroed one on a miss.
    pub fn descriptor_or_default(self) -> HidDescriptor {
        match self {
            Self::Found { descriptor, .. } => descriptor,
            Self::NotFound => HidDescriptor::default(),
        }
    }

    /// `true` for [`HidDescriptorLookup::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Scan a configuration blob for the HID descriptor of `filter`.
///
/// HID descriptors shorter than the fixed layout are skipped. Never fails;
/// truncated or malformed chains simply end the scan.
pub fn find_hid_descriptor(config: &[u8], filter: impl Into<InterfaceFilter>) -> HidDescriptorLookup {
    let filter = filter.into();
    let mut current: Option<u8> = None;

    for desc in DescriptorIter::new(config) {
        match desc.descriptor_type {
            descriptor_type::INTERFACE => {
                current = desc.bytes.get(2).copied();
                trace!(offset = desc.offset, interface = ?current, "Interface descriptor");
            }
            descriptor_type::HID => {
                let descriptor = match HidDescriptor::from_bytes(desc.bytes) {
                    Ok(d) => d,
                    Err(e) => {
                        debug!(offset = desc.offset, error = %e, "Skipping malformed HID descriptor");
                        continue;
                    }
                };
                if filter.accepts(current) {
                    return HidDescriptorLookup::Found {
                        interface: current,
                        descriptor,
                    };
                }
            }
            _ => {}
        }
    }

    HidDescriptorLookup::NotFound
}

/// Scan a configuration blob for the HID descriptor of `filter`, returning a
/// zeroed descriptor when nothing matches.
///
/// Callers treat a zero `report_descriptor_length` as "not found".
pub fn parse_hid_descriptor(config: &[u8], filter: impl Into<InterfaceFilter>) -> HidDescriptor {
    find_hid_descriptor(config, filter).descriptor_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_field_offsets() -> DescriptorResult<()> {
        let raw = [0x09, 0x21, 0x10, 0x01, 0x21, 0x01, 0x22, 0x3F, 0x01];
        let d = HidDescriptor::from_bytes(&raw)?;

        assert_eq!(d.length, 9);
        assert_eq!(d.descriptor_type, 0x21);
        assert_eq!(d.bcd_hid, 0x0110);
        assert_eq!(d.country_code, 0x21);
        assert_eq!(d.num_descriptors, 1);
        assert_eq!(d.report_descriptor_type, 0x22);
        assert_eq!(d.report_descriptor_length, 0x013F);
        assert!(d.is_present());
        Ok(())
    }

    #[test]
    fn test_from_bytes_rejects_short() {
        let raw = [0x06, 0x21, 0x10, 0x01, 0x00, 0x01];
        assert!(matches!(
            HidDescriptor::from_bytes(&raw),
            Err(DescriptorError::Truncated { .. })
        ));
    }

    #[test]
    fn test_default_is_not_present() {
        assert!(!HidDescriptor::default().is_present());
    }

    #[test]
    fn test_empty_blob_not_found() {
        assert_eq!(find_hid_descriptor(&[], InterfaceFilter::Any), HidDescriptorLookup::NotFound);
        assert_eq!(parse_hid_descriptor(&[], 0), HidDescriptor::default());
    }
}
