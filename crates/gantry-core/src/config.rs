//! Loader configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a root's packages come from, deciding default enablement.
///
/// Local roots are curated by the deployment, so their services run unless
/// a descriptor opts out. Remote roots are mounted from elsewhere, so
/// their services stay disabled unless a descriptor opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    Local,
    Remote,
}

impl RootKind {
    /// Enable flag applied when a descriptor does not state its own.
    pub fn default_enabled(self) -> bool {
        matches!(self, RootKind::Local)
    }
}

/// One configured package root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    pub path: PathBuf,
    pub kind: RootKind,
}

impl RootConfig {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: RootKind::Local,
        }
    }

    pub fn remote(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: RootKind::Remote,
        }
    }
}

/// What registration does when a descriptor name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateNamePolicy {
    /// Last-loaded wins; the displaced handle is disabled and dropped.
    /// With roots scanned in order this lets a later root override an
    /// earlier one.
    #[default]
    ReplaceExisting,
    /// First-loaded wins; later duplicates are rejected and dropped.
    KeepExisting,
}

/// Loader configuration, embeddable in a host's own settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Roots scanned in order on every load and reload.
    #[serde(default)]
    pub roots: Vec<RootConfig>,
    /// Duplicate-name handling across all roots.
    #[serde(default)]
    pub on_duplicate: DuplicateNamePolicy,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a local root, created at bootstrap if missing.
    pub fn with_local_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(RootConfig::local(path));
        self
    }

    /// Appends a remote root, scanned but never created.
    pub fn with_remote_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(RootConfig::remote(path));
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateNamePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }
}
