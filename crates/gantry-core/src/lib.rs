//! Discovery, isolation, and lifecycle for Gantry service extensions.
//!
//! Flow: [`discovery`] scans configured roots for `.svc` packages and
//! parses their descriptors; [`loader`] resolves each descriptor's entry
//! point inside the package's [`isolation`] scope and produces a
//! [`handle::ServiceHandle`]; [`registry`] keys live handles by name;
//! [`manager::ServiceManager`] drives the whole thing and [`command`]
//! exposes it to a host's command layer.

pub mod command;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod handle;
pub mod isolation;
pub mod loader;
pub mod manager;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use command::{CommandOutcome, ManagementCommand, PERMISSION_LIST, PERMISSION_MANAGE};
pub use config::{DuplicateNamePolicy, LoaderConfig, RootConfig, RootKind};
pub use descriptor::{ServiceDescriptor, DESCRIPTOR_FILE_NAME};
pub use discovery::{discover_root, DiscoveredService, DESCRIPTOR_SEARCH_DEPTH, PACKAGE_EXTENSION};
pub use error::{LoaderError, Result};
pub use handle::{ServiceHandle, ServiceState};
pub use isolation::{BuiltinFactories, PackageContext};
pub use loader::load_service;
pub use manager::{LoadReport, ServiceEvent, ServiceManager};
pub use registry::{InsertOutcome, ServiceRegistry};

/// The SDK services compile against, re-exported for hosts.
pub use gantry_service_sdk as sdk;

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::command::{CommandOutcome, ManagementCommand};
    pub use crate::config::{DuplicateNamePolicy, LoaderConfig, RootConfig, RootKind};
    pub use crate::descriptor::ServiceDescriptor;
    pub use crate::error::{LoaderError, Result};
    pub use crate::handle::{ServiceHandle, ServiceState};
    pub use crate::isolation::BuiltinFactories;
    pub use crate::manager::{LoadReport, ServiceEvent, ServiceManager};

    pub use gantry_service_sdk::prelude::*;
}
