//! Service descriptors.
//!
//! Every packaged unit carries at least one `service.json` describing one
//! service: the registry name, the entry-point identifier its package
//! resolves to a constructor, and optional metadata. Keys the loader does
//! not interpret are preserved verbatim and handed to the service as its
//! configuration.

use std::fs;
use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LoaderError, Result};

/// Well-known descriptor filename searched for inside a package.
pub const DESCRIPTOR_FILE_NAME: &str = "service.json";

/// Parsed form of one `service.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Unique registry name.
    pub name: String,
    /// Identifier resolved against the package and builtin factories.
    pub entry_point: String,
    /// Overrides the root's default-enablement policy when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    /// Optional version surfaced in listings and logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    /// Optional human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Uninterpreted keys, passed through as service configuration.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceDescriptor {
    /// Reads and validates one descriptor file.
    ///
    /// Anything short of a well-formed document with non-empty `name` and
    /// `entry_point` is [`LoaderError::InvalidFormat`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| LoaderError::from_io(e, path))?;
        Self::from_json(&raw).map_err(|err| match err {
            LoaderError::InvalidFormat(msg) => {
                LoaderError::InvalidFormat(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parses a descriptor from raw JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        let descriptor: ServiceDescriptor =
            serde_json::from_str(raw).map_err(|e| LoaderError::InvalidFormat(e.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LoaderError::InvalidFormat(
                "descriptor field 'name' is empty".to_string(),
            ));
        }
        if self.entry_point.trim().is_empty() {
            return Err(LoaderError::InvalidFormat(
                "descriptor field 'entry_point' is empty".to_string(),
            ));
        }
        Ok(())
    }
}
