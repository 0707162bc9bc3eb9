//! Module manifest schema.
//!
//! Defines the wire format modules submit when they self-register, and the
//! change events pushed to subscribed shells.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};

/// How the shell should present a module in its navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavHint {
    /// Navigation label shown to the user.
    pub label: String,
    /// Icon identifier.
    pub icon: String,
    /// Sort order; lower sorts first.
    #[serde(default = "default_nav_order")]
    pub order: i64,
}

fn default_nav_order() -> i64 {
    99
}

/// A registered module manifest.
///
/// One record per module id; re-registering an id replaces the prior record
/// wholesale (last writer wins, no merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    /// Unique module identifier.
    pub id: String,
    /// Display name for the shell UI.
    pub display_name: String,
    /// Module version string.
    pub version: String,
    /// URL of the module's remote entry bundle.
    pub remote_entry: String,
    /// URL path prefixes the module claims.
    pub routes: Vec<String>,
    /// Optional navigation hint.
    #[serde(default)]
    pub nav: Option<NavHint>,
    /// Capability names this module provides.
    #[serde(default)]
    pub provides: Vec<String>,
    /// Capability names this module consumes.
    #[serde(default)]
    pub consumes: Vec<String>,
}

impl ModuleRecord {
    /// Validate required fields.
    ///
    /// The registry stores manifests as-is; only identity fields are checked.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(RegistryError::Validation {
                field: "id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.display_name.is_empty() {
            return Err(RegistryError::Validation {
                field: "displayName".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Reference to a module by id, used in removal events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    pub id: String,
}

/// A registry change notification.
///
/// Wire shape: `{"type": "added", "module": {..record..}}` or
/// `{"type": "removed", "module": {"id": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "module", rename_all = "lowercase")]
pub enum ChangeEvent {
    Added(ModuleRecord),
    Removed(ModuleRef),
}

impl ChangeEvent {
    pub fn added(record: ModuleRecord) -> Self {
        ChangeEvent::Added(record)
    }

    pub fn removed(id: impl Into<String>) -> Self {
        ChangeEvent::Removed(ModuleRef { id: id.into() })
    }
}
