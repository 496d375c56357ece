//! Configuration descriptor walking and typed interface/endpoint views.
//!
//! A configuration descriptor blob is a 9-byte header followed by a chain of
//! `[bLength, bDescriptorType, ...]` descriptors up to `wTotalLength`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{ENDPOINT_DIR_IN, descriptor_len, descriptor_type};
use crate::error::{DescriptorError, DescriptorResult};
use crate::reader::ByteReader;

/// The fixed 9-byte configuration descriptor header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationHeader {
    /// `bLength`
    pub length: u8,
    /// `bDescriptorType`
    pub descriptor_type: u8,
    /// `wTotalLength`
    pub total_length: u16,
    /// `bNumInterfaces`
    pub num_interfaces: u8,
    /// `bConfigurationValue`
    pub configuration_value: u8,
    /// `iConfiguration`
    pub configuration_index: u8,
    /// `bmAttributes`
    pub attributes: u8,
    /// `bMaxPower` (2 mA units)
    pub max_power: u8,
}

impl ConfigurationHeader {
    /// Parse the header at the start of a configuration blob.
    ///
    /// # Errors
    ///
    /// Fails if fewer than 9 bytes are present or the type is not
    /// CONFIGURATION.
    pub fn from_bytes(bytes: &[u8]) -> DescriptorResult<Self> {
        let mut r = ByteReader::new(bytes);
        let length = r.read_u8()?;
        let descriptor_type = r.read_u8()?;
        if descriptor_type != descriptor_type::CONFIGURATION {
            return Err(DescriptorError::UnexpectedType {
                expected: descriptor_type::CONFIGURATION,
                actual: descriptor_type,
            });
        }
        Ok(Self {
            length,
            descriptor_type,
            total_length: r.read_u16_le()?,
            num_interfaces: r.read_u8()?,
            configuration_value: r.read_u8()?,
            configuration_index: r.read_u8()?,
            attributes: r.read_u8()?,
            max_power: r.read_u8()?,
        })
    }
}

/// Endpoint transfer type from `bmAttributes[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferType {
    /// Control
    Control,
    /// Isochronous
    Isochronous,
    /// Bulk
    Bulk,
    /// Interrupt
    Interrupt,
}

impl TransferType {
    /// Decode from `bmAttributes`.
    pub fn from_attributes(attributes: u8) -> Self {
        match attributes & 0x03 {
            0 => Self::Control,
            1 => Self::Isochronous,
            2 => Self::Bulk,
            _ => Self::Interrupt,
        }
    }
}

/// Standard 9-byte interface descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// `bLength`
    pub length: u8,
    /// `bDescriptorType`
    pub descriptor_type: u8,
    /// `bInterfaceNumber`
    pub interface_number: u8,
    /// `bAlternateSetting`
    pub alternate_setting: u8,
    /// `bNumEndpoints`
    pub num_endpoints: u8,
    /// `bInterfaceClass`
    pub interface_class: u8,
    /// `bInterfaceSubClass`
    pub interface_subclass: u8,
    /// `bInterfaceProtocol`
    pub interface_protocol: u8,
    /// `iInterface`
    pub interface_index: u8,
}

impl InterfaceDescriptor {
    /// Parse an interface descriptor.
    ///
    /// # Errors
    ///
    /// Fails if fewer than 9 bytes are present or the type is not INTERFACE.
    pub fn from_bytes(bytes: &[u8]) -> DescriptorResult<Self> {
        let mut r = ByteReader::new(bytes);
        let length = r.read_u8()?;
        let descriptor_type = r.read_u8()?;
        if descriptor_type != descriptor_type::INTERFACE {
            return Err(DescriptorError::UnexpectedType {
                expected: descriptor_type::INTERFACE,
                actual: descriptor_type,
            });
        }
        Ok(Self {
            length,
            descriptor_type,
            interface_number: r.read_u8()?,
            alternate_setting: r.read_u8()?,
            num_endpoints: r.read_u8()?,
            interface_class: r.read_u8()?,
            interface_subclass: r.read_u8()?,
            interface_protocol: r.read_u8()?,
            interface_index: r.read_u8()?,
        })
    }
}

/// Standard 7-byte endpoint descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// `bLength`
    pub length: u8,
    /// `bDescriptorType`
    pub descriptor_type: u8,
    /// `bEndpointAddress`
    pub address: u8,
    /// `bmAttributes`
    pub attributes: u8,
    /// `wMaxPacketSize`
    pub max_packet_size: u16,
    /// `bInterval`
    pub interval: u8,
}

impl EndpointDescriptor {
    /// Parse an endpoint descriptor.
    ///
    /// # Errors
    ///
    /// Fails if fewer than 7 bytes are present or the type is not ENDPOINT.
    pub fn from_bytes(bytes: &[u8]) -> DescriptorResult<Self> {
        let mut r = ByteReader::new(bytes);
        let length = r.read_u8()?;
        let descriptor_type = r.read_u8()?;
        if descriptor_type != descriptor_type::ENDPOINT {
            return Err(DescriptorError::UnexpectedType {
                expected: descriptor_type::ENDPOINT,
                actual: descriptor_type,
            });
        }
        Ok(Self {
            length,
            descriptor_type,
            address: r.read_u8()?,
            attributes: r.read_u8()?,
            max_packet_size: r.read_u16_le()?,
            interval: r.read_u8()?,
        })
    }

    /// `true` for device-to-host endpoints.
    pub fn is_in(&self) -> bool {
        self.address & ENDPOINT_DIR_IN != 0
    }

    /// Endpoint number without the direction bit.
    pub fn number(&self) -> u8 {
        self.address & 0x0F
    }

    /// Transfer type from `bmAttributes`.
    pub fn transfer_type(&self) -> TransferType {
        TransferType::from_attributes(self.attributes)
    }
}

/// One descriptor in the chain, borrowed from the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDescriptor<'a> {
    /// Offset of `bLength` within the configuration blob
    pub offset: usize,
    /// `bDescriptorType`
    pub descriptor_type: u8,
    /// The full descriptor, `bLength` bytes
    pub bytes: &'a [u8],
}

/// Iterator over the descriptors following the configuration header.
///
/// Bounded by both `wTotalLength` and the blob length. Stops at the first
/// descriptor whose `bLength` is below 2 or runs past the bound.
#[derive(Debug, Clone)]
pub struct DescriptorIter<'a> {
    blob: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> DescriptorIter<'a> {
    /// Walk the chain of a configuration blob.
    ///
    /// Yields nothing when `wTotalLength` does not exceed the header.
    pub fn new(config: &'a [u8]) -> Self {
        let total = match (config.get(2), config.get(3)) {
            (Some(lo), Some(hi)) => usize::from(u16::from_le_bytes([*lo, *hi])),
            _ => 0,
        };
        let limit = if total > descriptor_len::CONFIGURATION {
            total.min(config.len())
        } else {
            0
        };
        Self {
            blob: config,
            offset: descriptor_len::CONFIGURATION,
            limit,
        }
    }
}

impl<'a> Iterator for DescriptorIter<'a> {
    type Item = RawDescriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.limit {
            return None;
        }
        let length = *self.blob.get(self.offset)?;
        let end = self.offset.saturating_add(usize::from(length));
        if length < 2 || end > self.limit {
            debug!(
                offset = self.offset,
                length, "Descriptor chain ends on malformed bLength"
            );
            self.offset = self.limit;
            return None;
        }
        let bytes = self.blob.get(self.offset..end)?;
        let descriptor_type = *bytes.get(1)?;
        let item = RawDescriptor {
            offset: self.offset,
            descriptor_type,
            bytes,
        };
        self.offset = end;
        Some(item)
    }
}

/// An interface descriptor with the endpoint descriptors that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interface {
    /// The interface descriptor
    pub descriptor: InterfaceDescriptor,
    /// Endpoint descriptors in declaration order
    pub endpoints: Vec<EndpointDescriptor>,
}

/// Parsed view of a whole configuration descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Header fields
    pub header: ConfigurationHeader,
    /// Interfaces (including alternate settings) in declaration order
    pub interfaces: Vec<Interface>,
}

impl Configuration {
    /// Parse a configuration blob into interfaces and endpoints.
    ///
    /// Class-specific descriptors (HID, report, vendor) are skipped; use
    /// [`crate::find_hid_descriptor`] for those. Endpoints that appear before
    /// any interface are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the header is malformed or an interface/endpoint descriptor
    /// is shorter than its fixed layout.
    pub fn parse(config: &[u8]) -> DescriptorResult<Self> {
        let header = ConfigurationHeader::from_bytes(config)?;
        let mut interfaces: Vec<Interface> = Vec::new();

        for desc in DescriptorIter::new(config) {
            match desc.descriptor_type {
                descriptor_type::INTERFACE => {
                    interfaces.push(Interface {
                        descriptor: InterfaceDescriptor::from_bytes(desc.bytes)?,
                        endpoints: Vec::new(),
                    });
                }
                descriptor_type::ENDPOINT => {
                    let endpoint = EndpointDescriptor::from_bytes(desc.bytes)?;
                    if let Some(current) = interfaces.last_mut() {
                        current.endpoints.push(endpoint);
                    }
                }
                _ => {}
            }
        }

        Ok(Self { header, interfaces })
    }

    /// Interface at position `index` in declaration order.
    pub fn interface(&self, index: usize) -> Option<&Interface> {
        self.interfaces.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUSE_CONFIG: [u8; 34] = [
        0x09, 0x02, 0x22, 0x00, 0x01, 0x01, 0x00, 0xA0, 0x32, // configuration
        0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x01, 0x02, 0x00, // interface 0
        0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x34, 0x00, // HID
        0x07, 0x05, 0x81, 0x03, 0x08, 0x00, 0x01, // endpoint 0x81
    ];

    #[test]
    fn test_parse_boot_mouse_configuration() -> DescriptorResult<()> {
        let config = Configuration::parse(&MOUSE_CONFIG)?;

        assert_eq!(config.header.total_length, 34);
        assert_eq!(config.interfaces.len(), 1);

        let iface = &config.interfaces[0];
        assert_eq!(iface.descriptor.interface_class, 0x03);
        assert_eq!(iface.descriptor.interface_protocol, 0x02);
        assert_eq!(iface.endpoints.len(), 1);
        assert!(iface.endpoints[0].is_in());
        assert_eq!(iface.endpoints[0].max_packet_size, 8);
        assert_eq!(iface.endpoints[0].transfer_type(), TransferType::Interrupt);
        Ok(())
    }

    #[test]
    fn test_iter_stops_on_zero_length() {
        let mut blob = MOUSE_CONFIG;
        blob[18] = 0x00;
        let types: Vec<u8> = DescriptorIter::new(&blob)
            .map(|d| d.descriptor_type)
            .collect();
        assert_eq!(types, vec![descriptor_type::INTERFACE]);
    }

    #[test]
    fn test_iter_bounded_by_total_length() {
        let mut blob = MOUSE_CONFIG;
        blob[2] = 18;
        let count = DescriptorIter::new(&blob).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_iter_empty_when_total_is_header_only() {
        let mut blob = MOUSE_CONFIG;
        blob[2] = 9;
        assert_eq!(DescriptorIter::new(&blob).count(), 0);
    }

    #[test]
    fn test_header_rejects_wrong_type() {
        let blob = [0x09, 0x04, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            ConfigurationHeader::from_bytes(&blob),
            Err(DescriptorError::UnexpectedType {
                expected: 0x02,
                actual: 0x04
            })
        );
    }
}
