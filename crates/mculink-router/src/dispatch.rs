use std::sync::mpsc;

use crate::error::DispatchError;
use crate::message::MessageId;

/// A routed message on its way to a handler.
#[derive(Debug, Clone)]
pub struct Envelope<M, C> {
    /// Id of the descriptor whose mask matched.
    pub id: MessageId,
    /// The typed message built from the frame.
    pub message: M,
    /// Caller context passed to `route`, typically the connection handle.
    pub context: C,
}

/// Where matched messages are sent.
///
/// `dispatch` must not block: it enqueues and returns. Handlers run
/// elsewhere.
pub trait DispatchTarget<M, C>: Send + Sync {
    fn dispatch(&self, envelope: Envelope<M, C>) -> Result<(), DispatchError>;
}

impl<M: Send, C: Send> DispatchTarget<M, C> for mpsc::Sender<Envelope<M, C>> {
    fn dispatch(&self, envelope: Envelope<M, C>) -> Result<(), DispatchError> {
        self.send(envelope).map_err(|_| DispatchError::Disconnected)
    }
}

impl<M: Send, C: Send> DispatchTarget<M, C> for mpsc::SyncSender<Envelope<M, C>> {
    fn dispatch(&self, envelope: Envelope<M, C>) -> Result<(), DispatchError> {
        self.try_send(envelope).map_err(|err| match err {
            mpsc::TrySendError::Full(_) => DispatchError::Full,
            mpsc::TrySendError::Disconnected(_) => DispatchError::Disconnected,
        })
    }
}

#[cfg(feature = "async")]
impl<M: Send, C: Send> DispatchTarget<M, C> for tokio::sync::mpsc::UnboundedSender<Envelope<M, C>> {
    fn dispatch(&self, envelope: Envelope<M, C>) -> Result<(), DispatchError> {
        self.send(envelope).map_err(|_| DispatchError::Disconnected)
    }
}

#[cfg(feature = "async")]
impl<M: Send, C: Send> DispatchTarget<M, C> for tokio::sync::mpsc::Sender<Envelope<M, C>> {
    fn dispatch(&self, envelope: Envelope<M, C>) -> Result<(), DispatchError> {
        use tokio::sync::mpsc::error::TrySendError;

        self.try_send(envelope).map_err(|err| match err {
            TrySendError::Full(_) => DispatchError::Full,
            TrySendError::Closed(_) => DispatchError::Disconnected,
        })
    }
}
