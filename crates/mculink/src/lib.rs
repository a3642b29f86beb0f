//! Length-field framing and byte-mask routing for MCU telemetry links.
//!
//! Microcontrollers push binary frames over a byte connection. mculink cuts
//! the stream into frames using a configurable length field, then classifies
//! each frame against per-message byte masks and hands every match to its
//! handler queue.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP byte connection and listener
//! - [`frame`]: length-field framing (`FrameReader`, `FrameWriter`, async `McuCodec`)
//! - [`router`]: mask classification and dispatch (`RouterBuilder`, `MaskRouter`)

/// Re-export transport types.
pub mod transport {
    pub use mculink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mculink_frame::*;
}

/// Re-export router types.
pub mod router {
    pub use mculink_router::*;
}
