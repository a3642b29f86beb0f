/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The length exceeds the configured maximum.
    #[error("message too long ({len} bytes, max {max})")]
    FrameTooLong { len: u64, max: u32 },

    /// The length is below the configured minimum.
    #[error("message too short ({len} bytes, min {min})")]
    FrameTooShort { len: u64, min: u32 },

    /// The header prefix handed to the encoder does not cover the length field offset.
    #[error("header prefix must be {expected} bytes, got {actual}")]
    HeaderPrefixMismatch { expected: usize, actual: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed between frames.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether the stream position can no longer be trusted.
    ///
    /// A length outside the configured bounds leaves the reader somewhere
    /// inside an unknown frame; the only safe recovery is to drop the
    /// connection.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            FrameError::FrameTooLong { .. } | FrameError::FrameTooShort { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
