//! Partition addressing for the outbound feed.

use bytes::Bytes;
use std::fmt;
use std::ops::Deref;

/// Index of one partition of the outbound feed
pub type PartitionId = u32;

/// Routing key handed to the publisher alongside a payload.
///
/// Backed by [`Bytes`], so cloning only bumps a reference count.
/// Used for routing only, never as an identity.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct PartitionKey(Bytes);

impl PartitionKey {
    /// Create a key from raw bytes
    #[inline]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying buffer
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for PartitionKey {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for PartitionKey {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for PartitionKey {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for PartitionKey {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl From<Bytes> for PartitionKey {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

impl fmt::Debug for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartitionKey({})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
