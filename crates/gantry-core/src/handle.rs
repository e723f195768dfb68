//! Live service handles and their state machine.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gantry_service_sdk::{Service, ServiceContext, ServiceResult};
use semver::Version;

use crate::error::LoaderError;
use crate::isolation::{panic_message, PackageContext};

/// Where a handle is in its lifecycle.
///
/// A handle is constructed in `Loaded` and then moves between `Enabled`
/// and `Disabled`; it never returns to `Loaded`. The pre-load state has no
/// variant: a service that is not loaded has no handle and no registry
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Loaded,
    Enabled,
    Disabled,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Loaded => write!(f, "loaded"),
            ServiceState::Enabled => write!(f, "enabled"),
            ServiceState::Disabled => write!(f, "disabled"),
        }
    }
}

/// One registered service: instance, context, package scope, state.
pub struct ServiceHandle {
    name: String,
    state: ServiceState,
    enabled_by_policy: bool,
    instance: Box<dyn Service>,
    context: ServiceContext,
    version: Option<Version>,
    description: Option<String>,
    package_root: PathBuf,
    loaded_at: DateTime<Utc>,
    // Keeps the package's libraries loaded while the instance lives.
    _package: Arc<PackageContext>,
}

impl ServiceHandle {
    pub(crate) fn new(
        name: String,
        enabled_by_policy: bool,
        instance: Box<dyn Service>,
        context: ServiceContext,
        version: Option<Version>,
        description: Option<String>,
        package: Arc<PackageContext>,
    ) -> Self {
        Self {
            name,
            state: ServiceState::Loaded,
            enabled_by_policy,
            instance,
            context,
            version,
            description,
            package_root: package.root().to_path_buf(),
            loaded_at: Utc::now(),
            _package: package,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == ServiceState::Enabled
    }

    /// Effective enable flag resolved at load time: the descriptor's
    /// `enable` if present, otherwise the root's default.
    pub fn enabled_by_policy(&self) -> bool {
        self.enabled_by_policy
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Runs the load hook once, right after construction.
    pub(crate) fn run_load_hook(&mut self) {
        self.run_hook("on_load", |service, ctx| service.on_load(ctx));
    }

    /// Conditional enable: transitions and runs the hook only when the
    /// resolved flag allows it; otherwise the handle settles in
    /// `Disabled` without the hook running. Already-enabled handles are
    /// left alone.
    pub fn try_enable(&mut self) -> ServiceState {
        if self.state == ServiceState::Enabled {
            return self.state;
        }
        if self.enabled_by_policy {
            self.run_hook("on_enable", |service, ctx| service.on_enable(ctx));
            self.state = ServiceState::Enabled;
            tracing::info!(service = %self.name, "service enabled");
        } else {
            self.state = ServiceState::Disabled;
            tracing::debug!(service = %self.name, "service held disabled by policy");
        }
        self.state
    }

    /// Forced enable: always transitions and always runs the hook,
    /// whatever the resolved flag or current state say. Re-running on an
    /// enabled handle re-fires the hook.
    pub fn do_enable(&mut self) {
        self.run_hook("on_enable", |service, ctx| service.on_enable(ctx));
        self.state = ServiceState::Enabled;
        tracing::info!(service = %self.name, "service enabled");
    }

    /// Disable: always succeeds; runs the hook and settles in `Disabled`.
    pub fn do_disable(&mut self) {
        self.run_hook("on_disable", |service, ctx| service.on_disable(ctx));
        self.state = ServiceState::Disabled;
        tracing::info!(service = %self.name, "service disabled");
    }

    /// Runs one hook under a panic guard. Failures are logged as
    /// [`LoaderError::HookFailure`]; they never roll back or block the
    /// transition.
    fn run_hook(
        &mut self,
        hook: &'static str,
        run: impl FnOnce(&mut Box<dyn Service>, &ServiceContext) -> ServiceResult<()>,
    ) {
        let outcome = catch_unwind(AssertUnwindSafe(|| run(&mut self.instance, &self.context)));
        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => LoaderError::HookFailure {
                service: self.name.clone(),
                hook,
                reason: err.to_string(),
            },
            Err(payload) => LoaderError::HookFailure {
                service: self.name.clone(),
                hook,
                reason: panic_message(&payload),
            },
        };
        tracing::warn!(service = %self.name, hook, error = %failure, "lifecycle hook failed");
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("enabled_by_policy", &self.enabled_by_policy)
            .field("version", &self.version)
            .field("package_root", &self.package_root)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}
