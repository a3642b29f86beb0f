use crate::message::MessageId;

/// Errors raised while configuring or using the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A message kind was registered without a name.
    #[error("unnamed mcu message")]
    UnnamedMessage,

    /// The derived message id is already in the table.
    #[error("message {0} is already registered")]
    DuplicateMessage(MessageId),

    /// A dispatch target was bound to an id that was never registered.
    #[error("message {0} not registered")]
    NotRegistered(String),

    /// The input handed to `route` or `marshal` carries no bytes.
    #[error("mcu input data is empty")]
    InvalidInput,
}

/// Errors a dispatch target reports when it cannot take an envelope.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The receiving side has gone away.
    #[error("dispatch target disconnected")]
    Disconnected,

    /// The target queue is at capacity.
    #[error("dispatch target full")]
    Full,
}

pub type Result<T> = std::result::Result<T, RouterError>;
