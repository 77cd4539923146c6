//! WorkItem - Frontier output
//!
//! A pending crawl request as handed out by the frontier.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Job tag attached to every request before it is encoded
pub type JobId = u64;

/// Opaque unique identifier of a request.
///
/// Serialized as a lowercase hex string.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(Bytes);

impl Fingerprint {
    /// Create a fingerprint from raw bytes
    #[inline]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Parse a hex-encoded fingerprint
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(Bytes::from(hex::decode(s)?)))
    }

    /// Raw fingerprint bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Cheap clone of the underlying buffer
    #[inline]
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }

    /// Hex rendering (used in logs and text codecs)
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Precomputed domain information attached by the frontier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMetadata {
    /// Hostname
    #[serde(default)]
    pub name: Option<String>,

    /// Network location (host[:port])
    #[serde(default)]
    pub netloc: Option<String>,

    /// URL scheme
    #[serde(default)]
    pub scheme: Option<String>,
}

impl DomainMetadata {
    /// Metadata carrying only a hostname
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// One pending crawl target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Target URL
    pub url: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// Unique request identifier
    pub fingerprint: Fingerprint,

    /// Request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request cookies
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,

    /// Precomputed domain metadata (avoids re-parsing the URL)
    #[serde(default)]
    pub domain: Option<DomainMetadata>,

    /// Free-form request metadata
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,

    /// Job tag, set right before encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl WorkItem {
    /// Create a GET request with no metadata
    pub fn new(url: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            fingerprint,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            domain: None,
            meta: BTreeMap::new(),
            job_id: None,
        }
    }

    /// Attach precomputed domain metadata
    pub fn with_domain(mut self, domain: DomainMetadata) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Precomputed hostname, if the frontier supplied one
    pub fn domain_name(&self) -> Option<&str> {
        self.domain.as_ref().and_then(|d| d.name.as_deref())
    }

    /// Tag the request with a job id
    pub fn tag_job(&mut self, job_id: JobId) {
        self.job_id = Some(job_id);
    }
}
