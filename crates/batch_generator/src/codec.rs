//! Request encoders for the outbound feed

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use contracts::{CodecKind, ContractError, DomainMetadata, Encoder, Fingerprint, JobId, WorkItem};
use serde::Serialize;

/// Wire form of a request
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: &'a str,
    pub method: &'a str,
    pub fingerprint: &'a Fingerprint,
    pub headers: &'a BTreeMap<String, String>,
    pub cookies: &'a BTreeMap<String, String>,
    pub domain: Option<&'a DomainMetadata>,
    pub meta: &'a BTreeMap<String, serde_json::Value>,
    pub job_id: JobId,
}

impl<'a> RequestEnvelope<'a> {
    /// Borrow `item` as an envelope
    ///
    /// # Errors
    /// Rejects requests without a URL, method or job tag.
    pub fn from_item(item: &'a WorkItem) -> Result<Self, ContractError> {
        if item.url.trim().is_empty() {
            return Err(ContractError::encoding("request url is empty"));
        }
        if item.method.trim().is_empty() {
            return Err(ContractError::encoding("request method is empty"));
        }
        let job_id = item
            .job_id
            .ok_or_else(|| ContractError::encoding("request is not tagged with a job id"))?;

        Ok(Self {
            kind: "request",
            url: &item.url,
            method: &item.method,
            fingerprint: &item.fingerprint,
            headers: &item.headers,
            cookies: &item.cookies,
            domain: item.domain.as_ref(),
            meta: &item.meta,
            job_id,
        })
    }
}

/// JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn name(&self) -> &str {
        "json"
    }

    fn encode(&self, item: &WorkItem) -> Result<Bytes, ContractError> {
        let envelope = RequestEnvelope::from_item(item)?;
        serde_json::to_vec(&envelope)
            .map(Bytes::from)
            .map_err(|e| ContractError::encoding(format!("JSON encode error: {e}")))
    }
}

/// Compact binary codec
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeEncoder;

impl Encoder for BincodeEncoder {
    fn name(&self) -> &str {
        "bincode"
    }

    fn encode(&self, item: &WorkItem) -> Result<Bytes, ContractError> {
        let envelope = RequestEnvelope::from_item(item)?;
        bincode::serialize(&envelope)
            .map(Bytes::from)
            .map_err(|e| ContractError::encoding(format!("bincode encode error: {e}")))
    }
}

/// Encoder for the configured codec
pub fn encoder_for(kind: CodecKind) -> Arc<dyn Encoder> {
    match kind {
        CodecKind::Json => Arc::new(JsonEncoder),
        CodecKind::Bincode => Arc::new(BincodeEncoder),
    }
}
