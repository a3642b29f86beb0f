use bytes::Bytes;

/// A byte pattern compared against the leading bytes of a frame.
///
/// `0x00` at a position is a wildcard. Any other value must equal the frame
/// byte at the same position. The comparison covers the shorter of mask and
/// frame, and the first differing non-wildcard byte rules the mask out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolMask {
    pattern: Bytes,
}

impl ProtocolMask {
    pub fn new(pattern: impl Into<Bytes>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pattern
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Whether `frame` satisfies every non-wildcard byte of this mask.
    pub fn matches(&self, frame: &[u8]) -> bool {
        self.pattern
            .iter()
            .zip(frame)
            .all(|(&want, &got)| want == 0 || want == got)
    }
}

impl From<Bytes> for ProtocolMask {
    fn from(pattern: Bytes) -> Self {
        Self::new(pattern)
    }
}

impl From<Vec<u8>> for ProtocolMask {
    fn from(pattern: Vec<u8>) -> Self {
        Self::new(pattern)
    }
}

impl From<&[u8]> for ProtocolMask {
    fn from(pattern: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(pattern))
    }
}

impl<const N: usize> From<[u8; N]> for ProtocolMask {
    fn from(pattern: [u8; N]) -> Self {
        Self::new(pattern.to_vec())
    }
}
