//! Payload types for the SharePoint REST API in `odata=verbose` mode.
//!
//! # Design
//! Items are opaque: the list schema lives on the server, so an item is a
//! plain JSON object (`Fields`). Only the envelopes this crate unwraps get
//! real structs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name to value mapping of a single list item.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Numeric SharePoint item id, as used in `items({id})`.
pub type ItemId = u64;

/// `ListItemEntityTypeFullName` of a list, e.g. `SP.Data.TasksListItem`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(pub String);

impl EntityType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        EntityType(s.to_string())
    }
}

/// Verbose envelope: every payload sits under `d`.
#[derive(Debug, Clone, Deserialize)]
pub struct Verbose<T> {
    pub d: T,
}

/// Collection payload: `{"results": [...]}` inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet<T> {
    pub results: Vec<T>,
}

/// The list-description fields requested by the metadata lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ListInfo {
    #[serde(rename = "ListItemEntityTypeFullName")]
    pub entity_type: EntityType,
}

/// `/_api/contextinfo` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextInfoEnvelope {
    #[serde(rename = "GetContextWebInformation")]
    pub info: ContextInfo,
}

/// Request digest and its lifetime, as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextInfo {
    #[serde(rename = "FormDigestValue")]
    pub form_digest_value: String,
    #[serde(rename = "FormDigestTimeoutSeconds", default)]
    pub form_digest_timeout_seconds: u64,
}
