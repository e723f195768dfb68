//! Orchestrates discovery, loading, and lifecycle over every configured
//! root.
//!
//! The manager owns the registry and drives bulk operations in
//! registered-name order. Bulk passes keep going past per-service
//! failures; the only fatal condition anywhere is a local root that
//! cannot be created at construction time.

use std::fs;
use std::sync::Arc;

use gantry_service_sdk::host::HostContext;
use tracing::{info, warn};

use crate::config::{LoaderConfig, RootKind};
use crate::discovery::{discover_root, DiscoveredService};
use crate::error::{LoaderError, Result};
use crate::handle::{ServiceHandle, ServiceState};
use crate::isolation::BuiltinFactories;
use crate::loader::load_service;
use crate::registry::{InsertOutcome, ServiceRegistry};

/// Registry change notification, delivered synchronously from the
/// operation that caused it.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    Loaded { name: String },
    Enabled { name: String },
    Disabled { name: String },
    Replaced { name: String },
    Removed { name: String },
    LoadFailed { descriptor: String, error: String },
}

type EventCallback = Box<dyn Fn(ServiceEvent) + Send + Sync>;

/// Outcome of one load pass across all roots.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names registered by this pass, in encounter order.
    pub loaded: Vec<String>,
    /// Per-service failures the pass carried on past.
    pub errors: Vec<LoaderError>,
    /// Roots that could not be scanned at all.
    pub skipped_roots: usize,
}

impl LoadReport {
    /// True when every root was scanned and every descriptor loaded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.skipped_roots == 0
    }
}

/// Facade over discovery, loading, and the registry.
pub struct ServiceManager {
    config: LoaderConfig,
    builtin: Arc<BuiltinFactories>,
    host: Arc<dyn HostContext>,
    registry: ServiceRegistry,
    on_event: Option<EventCallback>,
}

impl ServiceManager {
    /// Builds a manager over `config`, creating any local roots that do
    /// not exist yet. A local root that cannot be created is the one
    /// error that aborts construction; remote roots are taken as-is.
    pub fn new(
        config: LoaderConfig,
        builtin: Arc<BuiltinFactories>,
        host: Arc<dyn HostContext>,
    ) -> Result<Self> {
        for root in &config.roots {
            if root.kind == RootKind::Local && !root.path.exists() {
                fs::create_dir_all(&root.path)
                    .map_err(|e| LoaderError::from_io(e, &root.path))?;
                info!(root = %root.path.display(), "created local service root");
            }
        }
        Ok(Self {
            config,
            builtin,
            host,
            registry: ServiceRegistry::new(),
            on_event: None,
        })
    }

    /// Installs a callback observing registry changes.
    pub fn with_event_callback(
        mut self,
        callback: impl Fn(ServiceEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_event = Some(Box::new(callback));
        self
    }

    fn emit(&self, event: ServiceEvent) {
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }

    /// Scans every root and loads each discovered service.
    ///
    /// Nothing is enabled here. Unreadable roots are skipped with a
    /// warning, failed descriptors are recorded in the report, and the
    /// pass always runs to the end.
    pub fn load_all(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        let roots = self.config.roots.clone();
        for root in &roots {
            let candidates = match discover_root(root, &self.builtin) {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!(root = %root.path.display(), error = %err, "skipping service root");
                    report.skipped_roots += 1;
                    continue;
                }
            };
            for candidate in candidates {
                self.load_one(candidate, root.kind, &mut report);
            }
        }
        info!(
            loaded = report.loaded.len(),
            failed = report.errors.len(),
            skipped_roots = report.skipped_roots,
            "service load pass complete"
        );
        report
    }

    fn load_one(
        &mut self,
        candidate: DiscoveredService,
        root_kind: RootKind,
        report: &mut LoadReport,
    ) {
        let DiscoveredService {
            descriptor,
            package,
            descriptor_path,
        } = candidate;
        match load_service(&descriptor, &package, root_kind, &self.host) {
            Ok(handle) => {
                let name = handle.name().to_string();
                match self.registry.insert(handle, self.config.on_duplicate) {
                    InsertOutcome::Inserted => {
                        report.loaded.push(name.clone());
                        self.emit(ServiceEvent::Loaded { name });
                    }
                    InsertOutcome::Replaced(mut displaced) => {
                        if displaced.is_enabled() {
                            displaced.do_disable();
                        }
                        warn!(
                            service = %name,
                            "duplicate name; replaced previously loaded service"
                        );
                        report.loaded.push(name.clone());
                        self.emit(ServiceEvent::Replaced { name: name.clone() });
                        self.emit(ServiceEvent::Loaded { name });
                    }
                    InsertOutcome::Rejected(_) => {
                        warn!(
                            service = %name,
                            "duplicate name; keeping previously loaded service"
                        );
                    }
                }
            }
            Err(err) => {
                warn!(
                    descriptor = %descriptor_path.display(),
                    error = %err,
                    "failed to load service"
                );
                self.emit(ServiceEvent::LoadFailed {
                    descriptor: descriptor.name.clone(),
                    error: err.to_string(),
                });
                report.errors.push(err);
            }
        }
    }

    /// Conditionally enables every registered service, in name order.
    /// Returns how many actually transitioned to enabled.
    pub fn enable_all(&mut self) -> usize {
        let mut newly_enabled = 0;
        for name in self.registry.names() {
            let transitioned = match self.registry.get_mut(&name) {
                Some(handle) => {
                    let was_enabled = handle.is_enabled();
                    handle.try_enable() == ServiceState::Enabled && !was_enabled
                }
                None => false,
            };
            if transitioned {
                newly_enabled += 1;
                self.emit(ServiceEvent::Enabled { name });
            }
        }
        newly_enabled
    }

    /// Disables every registered service, in name order.
    pub fn disable_all(&mut self) -> usize {
        let mut disabled = 0;
        for name in self.registry.names() {
            let found = match self.registry.get_mut(&name) {
                Some(handle) => {
                    handle.do_disable();
                    true
                }
                None => false,
            };
            if found {
                disabled += 1;
                self.emit(ServiceEvent::Disabled { name });
            }
        }
        disabled
    }

    /// Forcibly enables one service. Returns false when the name is not
    /// registered.
    pub fn enable(&mut self, name: &str) -> bool {
        let found = match self.registry.get_mut(name) {
            Some(handle) => {
                handle.do_enable();
                true
            }
            None => false,
        };
        if found {
            self.emit(ServiceEvent::Enabled {
                name: name.to_string(),
            });
        }
        found
    }

    /// Disables one service. Returns false when the name is not
    /// registered.
    pub fn disable(&mut self, name: &str) -> bool {
        let found = match self.registry.get_mut(name) {
            Some(handle) => {
                handle.do_disable();
                true
            }
            None => false,
        };
        if found {
            self.emit(ServiceEvent::Disabled {
                name: name.to_string(),
            });
        }
        found
    }

    /// Disables and removes every service. Package libraries stay mapped
    /// until the last handle referencing them is gone.
    pub fn unload_all(&mut self) -> usize {
        self.disable_all();
        let removed = self.registry.clear();
        let count = removed.len();
        for handle in &removed {
            self.emit(ServiceEvent::Removed {
                name: handle.name().to_string(),
            });
        }
        count
    }

    /// Full reload: unload everything, rescan every root, enable what
    /// policy allows. Not transactional; services drop out mid-way and
    /// the report says what came back.
    pub fn reload(&mut self) -> LoadReport {
        info!("reloading services");
        self.unload_all();
        let report = self.load_all();
        self.enable_all();
        report
    }

    /// Disables everything in name order. Handles stay registered; the
    /// host drops the manager afterwards.
    pub fn shutdown(&mut self) {
        info!(services = self.registry.len(), "shutting down services");
        self.disable_all();
    }

    pub fn get(&self, name: &str) -> Option<&ServiceHandle> {
        self.registry.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Registered handles in name order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceHandle> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl std::fmt::Debug for ServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceManager")
            .field("config", &self.config)
            .field("services", &self.registry.len())
            .field("builtin_factories", &self.builtin.len())
            .finish()
    }
}
