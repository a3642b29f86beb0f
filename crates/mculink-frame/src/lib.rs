//! Configurable length-field framing for MCU telemetry byte streams.
//!
//! Devices send frames shaped as:
//! - `offset` bytes of arbitrary prefix (command bytes, addresses, ...)
//! - a 1, 2 or 4 byte length field, big- or little-endian
//! - `length` bytes of payload
//!
//! A [`RawFrame`] keeps the prefix and length field in front of the payload,
//! so downstream classification can match on header bytes too. Writing never
//! adds a length prefix: the caller supplies an already-shaped frame.

pub mod codec;
pub mod config;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::McuCodec;
pub use codec::{decode_frame, encode_frame, encode_header, RawFrame};
pub use config::{
    ByteOrder, FrameConfig, DEFAULT_LENGTH_FIELD_SIZE, DEFAULT_MAX_PAYLOAD, DEFAULT_MIN_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
