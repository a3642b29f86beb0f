use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

/// Identity of a registered message kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(Arc<str>);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl Borrow<str> for MessageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for MessageId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for MessageId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message kind that wraps the raw frame it was matched on.
///
/// Implementors conventionally keep the frame in a `data` field and leave
/// field-level decoding to the handler:
///
/// ```
/// use bytes::Bytes;
/// use mculink_router::McuMessage;
///
/// pub struct Heartbeat {
///     pub data: Bytes,
/// }
///
/// impl McuMessage for Heartbeat {
///     fn from_frame(data: Bytes) -> Self {
///         Self { data }
///     }
/// }
/// ```
pub trait McuMessage: Sized {
    fn from_frame(frame: Bytes) -> Self;
}

/// Id derived from a type: its name without module path or generics.
///
/// `crate::meter::Reading` and `crate::valve::Reading` both map to
/// `"Reading"` and therefore collide in one router.
pub fn message_id<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
