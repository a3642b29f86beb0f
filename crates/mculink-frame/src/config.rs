use std::time::Duration;

use tracing::warn;

use crate::error::{FrameError, Result};

/// Default length field width in bytes.
pub const DEFAULT_LENGTH_FIELD_SIZE: usize = 2;

/// Default minimum declared payload length.
pub const DEFAULT_MIN_PAYLOAD: u32 = 1;

/// Default maximum declared payload length.
pub const DEFAULT_MAX_PAYLOAD: u32 = 4096;

/// Byte order of the length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Network order. Most MCU protocols use this.
    #[default]
    BigEndian,
    LittleEndian,
}

/// Configuration for the frame codec.
///
/// The length field location and bounds are private so that the invariants
/// hold at all times: the field is 1, 2 or 4 bytes wide and
/// `min_payload_len <= max_payload_len <= field maximum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    length_field_offset: usize,
    length_field_size: usize,
    min_payload_len: u32,
    max_payload_len: u32,
    byte_order: ByteOrder,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            length_field_offset: 0,
            length_field_size: DEFAULT_LENGTH_FIELD_SIZE,
            min_payload_len: DEFAULT_MIN_PAYLOAD,
            max_payload_len: DEFAULT_MAX_PAYLOAD,
            byte_order: ByteOrder::BigEndian,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl FrameConfig {
    /// Reconfigure the length field and bounds in one step.
    ///
    /// A `field_size` other than 1, 2 or 4 keeps the previous width, and a
    /// `max_len` of 0 keeps the previous maximum. Bounds above what the field
    /// can represent are clamped to the field maximum.
    /// Must happen before the config is handed to a reader or writer.
    pub fn configure(
        &mut self,
        offset: usize,
        field_size: usize,
        min_len: u32,
        max_len: u32,
        byte_order: ByteOrder,
    ) {
        self.length_field_offset = offset;
        self.set_field_size(field_size);
        self.set_bounds(min_len, max_len);
        self.byte_order = byte_order;
        self.clamp_bounds();
    }

    /// Builder: length field position and width.
    pub fn with_length_field(mut self, offset: usize, field_size: usize) -> Self {
        self.length_field_offset = offset;
        self.set_field_size(field_size);
        self.clamp_bounds();
        self
    }

    /// Builder: inclusive bounds on the declared length.
    pub fn with_bounds(mut self, min_len: u32, max_len: u32) -> Self {
        self.set_bounds(min_len, max_len);
        self.clamp_bounds();
        self
    }

    /// Builder: length field byte order.
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Byte position of the length field within the header.
    pub fn length_field_offset(&self) -> usize {
        self.length_field_offset
    }

    /// Width of the length field in bytes (1, 2 or 4).
    pub fn length_field_size(&self) -> usize {
        self.length_field_size
    }

    /// Smallest accepted declared length.
    pub fn min_payload_len(&self) -> u32 {
        self.min_payload_len
    }

    /// Largest accepted declared length.
    pub fn max_payload_len(&self) -> u32 {
        self.max_payload_len
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Bytes read before the payload: prefix plus length field.
    pub fn header_len(&self) -> usize {
        self.length_field_offset + self.length_field_size
    }

    /// Largest value the length field can carry.
    pub fn field_max(&self) -> u32 {
        field_max(self.length_field_size)
    }

    /// Check a length against the configured bounds.
    pub fn check_len(&self, len: u64) -> Result<()> {
        if len > u64::from(self.max_payload_len) {
            return Err(FrameError::FrameTooLong {
                len,
                max: self.max_payload_len,
            });
        }
        if len < u64::from(self.min_payload_len) {
            return Err(FrameError::FrameTooShort {
                len,
                min: self.min_payload_len,
            });
        }
        Ok(())
    }

    fn set_field_size(&mut self, field_size: usize) {
        match field_size {
            1 | 2 | 4 => self.length_field_size = field_size,
            other => warn!(
                requested = other,
                kept = self.length_field_size,
                "unsupported length field size, keeping previous"
            ),
        }
    }

    fn set_bounds(&mut self, min_len: u32, max_len: u32) {
        self.min_payload_len = min_len;
        if max_len == 0 {
            warn!(kept = self.max_payload_len, "zero max length, keeping previous");
        } else {
            self.max_payload_len = max_len;
        }
    }

    fn clamp_bounds(&mut self) {
        let max = self.field_max();
        self.min_payload_len = self.min_payload_len.min(max);
        self.max_payload_len = self.max_payload_len.min(max);
        if self.min_payload_len > self.max_payload_len {
            warn!(
                min = self.min_payload_len,
                max = self.max_payload_len,
                "min length above max length, lowering min"
            );
            self.min_payload_len = self.max_payload_len;
        }
    }
}

fn field_max(field_size: usize) -> u32 {
    match field_size {
        1 => u32::from(u8::MAX),
        2 => u32::from(u16::MAX),
        _ => u32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_common_mcu_framing() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.length_field_offset(), 0);
        assert_eq!(cfg.length_field_size(), 2);
        assert_eq!(cfg.min_payload_len(), 1);
        assert_eq!(cfg.max_payload_len(), 4096);
        assert_eq!(cfg.byte_order(), ByteOrder::BigEndian);
        assert_eq!(cfg.header_len(), 2);
    }

    #[test]
    fn configure_rejects_unsupported_field_size() {
        let mut cfg = FrameConfig::default();
        cfg.configure(3, 3, 1, 100, ByteOrder::LittleEndian);

        assert_eq!(cfg.length_field_size(), 2);
        assert_eq!(cfg.length_field_offset(), 3);
        assert_eq!(cfg.byte_order(), ByteOrder::LittleEndian);
        assert_eq!(cfg.header_len(), 5);
    }

    #[test]
    fn configure_clamps_bounds_to_field_width() {
        let mut cfg = FrameConfig::default();
        cfg.configure(0, 1, 300, 70_000, ByteOrder::BigEndian);

        assert_eq!(cfg.min_payload_len(), 255);
        assert_eq!(cfg.max_payload_len(), 255);

        cfg.configure(0, 2, 1, 70_000, ByteOrder::BigEndian);
        assert_eq!(cfg.max_payload_len(), u32::from(u16::MAX));

        cfg.configure(0, 4, 1, u32::MAX, ByteOrder::BigEndian);
        assert_eq!(cfg.max_payload_len(), u32::MAX);
    }

    #[test]
    fn zero_max_keeps_previous_max() {
        let mut cfg = FrameConfig::default().with_bounds(1, 64);
        cfg.configure(0, 2, 0, 0, ByteOrder::BigEndian);

        assert_eq!(cfg.max_payload_len(), 64);
        assert_eq!(cfg.min_payload_len(), 0);
        assert!(cfg.check_len(3).is_ok());
        assert!(cfg.check_len(0).is_ok());

        let cfg = FrameConfig::default().with_bounds(2, 0);
        assert_eq!(cfg.max_payload_len(), DEFAULT_MAX_PAYLOAD);
        assert_eq!(cfg.min_payload_len(), 2);
    }

    #[test]
    fn min_is_lowered_when_above_max() {
        let cfg = FrameConfig::default().with_bounds(50, 10);
        assert_eq!(cfg.min_payload_len(), 10);
        assert_eq!(cfg.max_payload_len(), 10);
    }

    #[test]
    fn narrowing_the_field_reclamps_existing_bounds() {
        let cfg = FrameConfig::default()
            .with_bounds(1, 4096)
            .with_length_field(2, 1);
        assert_eq!(cfg.max_payload_len(), 255);
        assert_eq!(cfg.header_len(), 3);
    }

    #[test]
    fn check_len_boundaries() {
        let cfg = FrameConfig::default().with_bounds(1, 10);

        assert!(matches!(
            cfg.check_len(0),
            Err(FrameError::FrameTooShort { len: 0, min: 1 })
        ));
        assert!(cfg.check_len(1).is_ok());
        assert!(cfg.check_len(10).is_ok());
        assert!(matches!(
            cfg.check_len(11),
            Err(FrameError::FrameTooLong { len: 11, max: 10 })
        ));
    }
}
