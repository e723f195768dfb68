//! Turns a discovered descriptor into a live, registered-ready handle.

use std::sync::Arc;

use gantry_service_sdk::host::HostContext;
use gantry_service_sdk::{ServiceConfig, ServiceContext};
use tracing::info;

use crate::config::RootKind;
use crate::descriptor::ServiceDescriptor;
use crate::error::Result;
use crate::handle::ServiceHandle;
use crate::isolation::PackageContext;

/// Instantiates the service named by `descriptor` out of `package` and
/// runs its load hook.
///
/// The handle comes back in the loaded state regardless of the resolved
/// enable flag; enabling is a separate step. Instantiation failures and
/// unresolvable entry points surface as errors, a failing load hook does
/// not (it is logged by the handle and the service stays usable).
pub fn load_service(
    descriptor: &ServiceDescriptor,
    package: &Arc<PackageContext>,
    root_kind: RootKind,
    host: &Arc<dyn HostContext>,
) -> Result<ServiceHandle> {
    let instance = package.instantiate(&descriptor.entry_point)?;

    let enabled = descriptor.enable.unwrap_or(root_kind.default_enabled());
    let config = ServiceConfig::new(enabled, descriptor.extra.clone());
    let context = ServiceContext::new(&descriptor.name, Arc::clone(host), config);

    let mut handle = ServiceHandle::new(
        descriptor.name.clone(),
        enabled,
        instance,
        context,
        descriptor.version.clone(),
        descriptor.description.clone(),
        Arc::clone(package),
    );
    handle.run_load_hook();

    info!(
        service = %descriptor.name,
        entry_point = %descriptor.entry_point,
        package = %package.root().display(),
        "service loaded"
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::handle::ServiceState;
    use crate::isolation::BuiltinFactories;
    use crate::test_support::{package_over, NullHost};
    use gantry_service_sdk::{Service, ServiceResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        loads: Arc<AtomicUsize>,
    }

    impl Service for Recorder {
        fn on_load(&mut self, ctx: &ServiceContext) -> ServiceResult<()> {
            assert_eq!(ctx.config().get_str("greeting"), Some("hello"));
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn descriptor(json: serde_json::Value) -> ServiceDescriptor {
        ServiceDescriptor::from_json(&json.to_string()).unwrap()
    }

    fn package_with(loads: &Arc<AtomicUsize>, dir: &std::path::Path) -> Arc<PackageContext> {
        let loads = Arc::clone(loads);
        let builtin = BuiltinFactories::new().with("recorder", move || {
            Box::new(Recorder {
                loads: Arc::clone(&loads),
            })
        });
        package_over(dir, builtin)
    }

    #[test]
    fn test_load_runs_hook_with_injected_config() {
        let dir = tempfile::tempdir().unwrap();
        let loads = Arc::new(AtomicUsize::new(0));
        let package = package_with(&loads, dir.path());
        let host: Arc<dyn HostContext> = Arc::new(NullHost);

        let desc = descriptor(json!({
            "name": "rec",
            "entry_point": "recorder",
            "greeting": "hello"
        }));
        let handle = load_service(&desc, &package, RootKind::Local, &host).unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), ServiceState::Loaded);
        assert!(handle.enabled_by_policy());
    }

    #[test]
    fn test_descriptor_enable_overrides_root_default() {
        let dir = tempfile::tempdir().unwrap();
        let loads = Arc::new(AtomicUsize::new(0));
        let package = package_with(&loads, dir.path());
        let host: Arc<dyn HostContext> = Arc::new(NullHost);

        let desc = descriptor(json!({
            "name": "rec",
            "entry_point": "recorder",
            "enable": true,
            "greeting": "hello"
        }));
        let handle = load_service(&desc, &package, RootKind::Remote, &host).unwrap();
        assert!(handle.enabled_by_policy());

        let desc = descriptor(json!({
            "name": "rec",
            "entry_point": "recorder",
            "enable": false,
            "greeting": "hello"
        }));
        let handle = load_service(&desc, &package, RootKind::Local, &host).unwrap();
        assert!(!handle.enabled_by_policy());
    }

    #[test]
    fn test_remote_root_defaults_to_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let loads = Arc::new(AtomicUsize::new(0));
        let package = package_with(&loads, dir.path());
        let host: Arc<dyn HostContext> = Arc::new(NullHost);

        let desc = descriptor(json!({
            "name": "rec",
            "entry_point": "recorder",
            "greeting": "hello"
        }));
        let handle = load_service(&desc, &package, RootKind::Remote, &host).unwrap();
        assert!(!handle.enabled_by_policy());
    }

    #[test]
    fn test_unknown_entry_point_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loads = Arc::new(AtomicUsize::new(0));
        let package = package_with(&loads, dir.path());
        let host: Arc<dyn HostContext> = Arc::new(NullHost);

        let desc = descriptor(json!({ "name": "rec", "entry_point": "missing" }));
        let err = load_service(&desc, &package, RootKind::Local, &host).unwrap_err();
        assert!(matches!(err, LoaderError::EntryPointNotFound(_)));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }
}
