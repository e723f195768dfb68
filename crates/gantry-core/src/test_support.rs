//! Fixtures shared by the in-crate unit tests.

use std::path::Path;
use std::sync::Arc;

use gantry_service_sdk::host::{CommandHandler, EventSubscriber, HostContext, HostError};
use gantry_service_sdk::{ServiceConfig, ServiceContext};

use crate::isolation::{BuiltinFactories, PackageContext};

/// Host that swallows everything.
pub(crate) struct NullHost;

impl HostContext for NullHost {
    fn broadcast(&self, _message: &str) {}

    fn register_command(
        &self,
        _label: &str,
        _handler: Arc<dyn CommandHandler>,
    ) -> Result<(), HostError> {
        Ok(())
    }

    fn register_event_subscriber(&self, _subscriber: Arc<dyn EventSubscriber>) {}

    fn unregister_event_subscriber(&self, _subscriber: &Arc<dyn EventSubscriber>) {}
}

/// Opens `dir` as a package with no builtin factories.
pub(crate) fn empty_package(dir: &Path) -> Arc<PackageContext> {
    package_over(dir, BuiltinFactories::new())
}

/// Opens `dir` as a package over the given factory table.
pub(crate) fn package_over(dir: &Path, builtin: BuiltinFactories) -> Arc<PackageContext> {
    Arc::new(PackageContext::open(dir, Arc::new(builtin)).unwrap())
}

/// Context wired to a [`NullHost`] with default config.
pub(crate) fn null_context(name: &str) -> ServiceContext {
    ServiceContext::new(name, Arc::new(NullHost), ServiceConfig::default())
}
