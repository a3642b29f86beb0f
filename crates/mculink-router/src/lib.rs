//! Byte-mask classification and fire-and-forget dispatch of MCU frames.
//!
//! Each registered message kind carries one or more [`ProtocolMask`]s. A
//! frame is compared against the leading bytes of every mask (`0x00` is a
//! wildcard) and every match is wrapped into the caller's typed message and
//! enqueued on the kind's [`DispatchTarget`].
//!
//! Registration happens on a [`RouterBuilder`]; [`RouterBuilder::build`]
//! freezes the table into an immutable [`MaskRouter`] that connection
//! threads share without locking.

pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod mask;
pub mod message;
pub mod processor;
pub mod router;

pub use descriptor::MessageDescriptor;
pub use dispatch::{DispatchTarget, Envelope};
pub use error::{DispatchError, Result, RouterError};
pub use mask::ProtocolMask;
pub use message::{message_id, McuMessage, MessageId};
pub use processor::Processor;
pub use router::{MaskRouter, RouterBuilder};
