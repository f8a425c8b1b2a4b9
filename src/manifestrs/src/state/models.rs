// manifestrs/src/state/models.rs

use crate::constants::SIDECAR_SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// On-disk form of the change detector's hash cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashCacheFile {
    pub version: String,

    /// Key: component id
    #[serde(default)]
    pub components: BTreeMap<String, ComponentHashEntry>,

    /// Entry point must be regenerated on the next pass
    #[serde(default)]
    pub entry_point_stale: bool,

    pub updated_at: DateTime<Utc>,
}

/// Cached hash of one component at the last successful pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHashEntry {
    pub id: String,
    pub display_name: String,
    pub hash: String,

    /// Whether the component had no parent when cached
    pub is_root: bool,

    pub cached_at: DateTime<Utc>,
}

/// On-disk form of the user-edit set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEditsFile {
    pub version: String,

    /// Key: project-relative file path
    #[serde(default)]
    pub edits: BTreeMap<PathBuf, UserEditInfo>,

    pub updated_at: DateTime<Utc>,
}

/// A generated file the user has modified by hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEditInfo {
    pub filepath: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,

    pub detected_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl HashCacheFile {
    pub fn new(components: BTreeMap<String, ComponentHashEntry>, entry_point_stale: bool) -> Self {
        Self {
            version: SIDECAR_SCHEMA_VERSION.to_string(),
            components,
            entry_point_stale,
            updated_at: Utc::now(),
        }
    }
}

impl UserEditsFile {
    pub fn new(edits: BTreeMap<PathBuf, UserEditInfo>) -> Self {
        Self {
            version: SIDECAR_SCHEMA_VERSION.to_string(),
            edits,
            updated_at: Utc::now(),
        }
    }
}
