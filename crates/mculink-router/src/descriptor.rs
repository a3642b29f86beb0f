use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::dispatch::DispatchTarget;
use crate::mask::ProtocolMask;
use crate::message::MessageId;

pub(crate) type BuildFn<M> = Arc<dyn Fn(Bytes) -> M + Send + Sync>;

/// Binding between a message id, its masks and its dispatch target.
pub struct MessageDescriptor<M, C> {
    pub(crate) id: MessageId,
    pub(crate) masks: Vec<ProtocolMask>,
    pub(crate) build: BuildFn<M>,
    pub(crate) target: Option<Arc<dyn DispatchTarget<M, C>>>,
}

impl<M, C> MessageDescriptor<M, C> {
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Alternative masks, in registration order.
    pub fn masks(&self) -> &[ProtocolMask] {
        &self.masks
    }

    /// Whether a dispatch target has been bound.
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    /// Masks of this descriptor that `frame` satisfies.
    pub fn matching_masks<'a>(
        &'a self,
        frame: &'a [u8],
    ) -> impl Iterator<Item = &'a ProtocolMask> {
        self.masks.iter().filter(move |mask| mask.matches(frame))
    }

    /// Wrap a frame into this descriptor's typed message.
    pub fn build(&self, frame: Bytes) -> M {
        (self.build)(frame)
    }
}

impl<M, C> fmt::Debug for MessageDescriptor<M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("id", &self.id)
            .field("masks", &self.masks)
            .field("bound", &self.is_bound())
            .finish()
    }
}
