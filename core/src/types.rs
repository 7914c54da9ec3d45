use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    /// RFC 3339 timestamp as reported by the service
    pub last_modified: Option<String>,
}

/// One page of a bucket listing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub objects: Vec<ObjectSummary>,
    pub truncated: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub key: String,
    pub e_tag: Option<String>,
    pub strategy: String,
    pub parts: usize,
}
