//! Borrowing little-endian cursor over descriptor bytes.

use crate::error::{DescriptorError, DescriptorResult};

/// Sequential reader over a borrowed byte slice.
///
/// Reads past the end return [`DescriptorError::Truncated`] and leave the
/// cursor where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            position: 0,
        }
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Truncated`] at end of data.
    pub fn read_u8(&mut self) -> DescriptorResult<u8> {
        let value = self.peek_u8()?;
        self.position = self.position.saturating_add(1);
        Ok(value)
    }

    /// Read a little-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Truncated`] if fewer than two bytes remain.
    pub fn read_u16_le(&mut self) -> DescriptorResult<u16> {
        let bytes = self.read_bytes(2)?;
        match bytes {
            [lo, hi] => Ok(u16::from_le_bytes([*lo, *hi])),
            _ => Err(self.truncated(2)),
        }
    }

    /// Borrow the next `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Truncated`] if fewer than `count` bytes
    /// remain.
    pub fn read_bytes(&mut self, count: usize) -> DescriptorResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(count)
            .ok_or_else(|| self.truncated(count))?;
        let bytes = self
            .buffer
            .get(self.position..end)
            .ok_or_else(|| self.truncated(count))?;
        self.position = end;
        Ok(bytes)
    }

    /// Look at the next byte without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Truncated`] at end of data.
    pub fn peek_u8(&self) -> DescriptorResult<u8> {
        self.buffer
            .get(self.position)
            .copied()
            .ok_or_else(|| self.truncated(1))
    }

    /// Advance the cursor, clamped to the end of data.
    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.buffer.len());
    }

    fn truncated(&self, wanted: usize) -> DescriptorError {
        DescriptorError::Truncated {
            expected: self.position.saturating_add(wanted),
            actual: self.buffer.len(),
        }
    }
}
