//! Gantry Service SDK
//!
//! Everything a service extension compiles against: the [`Service`]
//! lifecycle contract, the host capability surface, resolved
//! configuration, datastore settings, and the dynamic registration ABI.
//!
//! # Quick start
//!
//! ```
//! use gantry_service_sdk::prelude::*;
//!
//! #[derive(Default)]
//! struct Announcer;
//!
//! impl Service for Announcer {
//!     fn on_enable(&mut self, ctx: &ServiceContext) -> ServiceResult<()> {
//!         ctx.broadcast("announcer is up");
//!         Ok(())
//!     }
//! }
//! ```
//!
//! A package built as a dynamic library additionally exports its entry
//! points with [`export_services!`]; services compiled into the host are
//! registered with the host's builtin factory table instead.

pub mod abi;
pub mod context;
pub mod datastore;
pub mod error;
pub mod host;
#[macro_use]
pub mod macros;
pub mod service;

pub use abi::{
    EntryPointDef, ServiceConstructor, ServiceRegistration, ServiceRegistrationFn,
    SERVICE_ABI_VERSION, SERVICE_ENTRY_SYMBOL,
};
pub use context::{ServiceConfig, ServiceContext};
pub use datastore::{
    DatastoreCatalog, Endpoint, KeyValueSettings, RelationalSettings, WideColumnSettings,
};
pub use error::{ServiceError, ServiceResult};
pub use host::{CommandHandler, EventSubscriber, HostContext, HostError, HostEvent, Responder};
pub use service::Service;

/// Common imports for service authors.
pub mod prelude {
    pub use crate::context::{ServiceConfig, ServiceContext};
    pub use crate::error::{ServiceError, ServiceResult};
    pub use crate::host::{
        CommandHandler, EventSubscriber, HostContext, HostError, HostEvent, Responder,
    };
    pub use crate::service::Service;
    pub use serde_json::Value;
}
