//! Entry-point resolution scopes.
//!
//! Descriptor entry points resolve through explicit factory tables, never
//! through reflective type lookup. Two layers exist: a host-wide
//! [`BuiltinFactories`] table for services compiled into the embedding
//! process, and a per-package [`PackageContext`] that loads the dynamic
//! libraries found in one package and keeps them alive for as long as any
//! instance from that package exists. Package-local entry points shadow
//! builtin ones; everything else falls back to the builtin table.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gantry_service_sdk::abi::{
    ServiceConstructor, ServiceRegistrationFn, SERVICE_ABI_VERSION, SERVICE_ENTRY_SYMBOL,
};
use gantry_service_sdk::Service;
use libloading::Library;

use crate::error::{LoaderError, Result};

type BuiltinConstructor = Arc<dyn Fn() -> Box<dyn Service> + Send + Sync>;

/// Host-registered constructors for services compiled into the process.
///
/// Plays the part of the host's own loading scope: every package context
/// falls back to this table for entry points its libraries do not export.
#[derive(Clone, Default)]
pub struct BuiltinFactories {
    factories: HashMap<String, BuiltinConstructor>,
}

impl BuiltinFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `construct` under `entry_point`, replacing any previous
    /// registration with the same identifier.
    pub fn register<F>(&mut self, entry_point: impl Into<String>, construct: F)
    where
        F: Fn() -> Box<dyn Service> + Send + Sync + 'static,
    {
        self.factories
            .insert(entry_point.into(), Arc::new(construct));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, entry_point: impl Into<String>, construct: F) -> Self
    where
        F: Fn() -> Box<dyn Service> + Send + Sync + 'static,
    {
        self.register(entry_point, construct);
        self
    }

    pub fn contains(&self, entry_point: &str) -> bool {
        self.factories.contains_key(entry_point)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn get(&self, entry_point: &str) -> Option<&BuiltinConstructor> {
        self.factories.get(entry_point)
    }
}

impl fmt::Debug for BuiltinFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFactories")
            .field("entry_points", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolution scope for one package root.
///
/// Owns every library loaded from the package. Handles keep an `Arc` to
/// their context, so instances never outlive the code they came from.
pub struct PackageContext {
    root: PathBuf,
    exported: HashMap<String, ServiceConstructor>,
    builtin: Arc<BuiltinFactories>,
    // Entries in `exported` point into these libraries; keep them loaded.
    _libraries: Vec<Library>,
}

impl PackageContext {
    /// Builds the scope for `root`, loading every dynamic library sitting
    /// directly under it.
    ///
    /// A library that cannot be opened, exports no registration, or was
    /// built against another ABI version is logged and skipped; the rest
    /// of the package and the builtin fallback still apply.
    pub fn open(root: &Path, builtin: Arc<BuiltinFactories>) -> Result<Self> {
        let mut context = Self {
            root: root.to_path_buf(),
            exported: HashMap::new(),
            builtin,
            _libraries: Vec::new(),
        };

        let entries = std::fs::read_dir(root).map_err(|e| LoaderError::from_io(e, root))?;
        let mut libraries: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_dynamic_library(path))
            .collect();
        libraries.sort();

        for library in libraries {
            if let Err(err) = context.incorporate(&library) {
                tracing::warn!(
                    package = %root.display(),
                    library = %library.display(),
                    error = %err,
                    "skipping package library"
                );
            }
        }

        Ok(context)
    }

    /// Loads one library and merges its exported entry points.
    fn incorporate(&mut self, path: &Path) -> Result<()> {
        // SAFETY: opening a library runs its initializers. Packages are
        // trusted input; the ABI check below rejects tables from another
        // contract revision before anything in them is used.
        let library = unsafe { Library::new(path) }
            .map_err(|e| LoaderError::InvalidFormat(format!("{}: {}", path.display(), e)))?;

        let registration = {
            let entry: libloading::Symbol<ServiceRegistrationFn> =
                unsafe { library.get(SERVICE_ENTRY_SYMBOL.as_bytes()) }.map_err(|e| {
                    LoaderError::InvalidFormat(format!(
                        "{}: missing {} export: {}",
                        path.display(),
                        SERVICE_ENTRY_SYMBOL,
                        e
                    ))
                })?;
            let registration_fn: ServiceRegistrationFn = *entry;
            let table = registration_fn();
            if table.is_null() {
                return Err(LoaderError::InvalidFormat(format!(
                    "{}: registration returned null",
                    path.display()
                )));
            }
            // SAFETY: non-null table exported under the versioned
            // contract; it points at a static inside `library`, which
            // `self` keeps alive below.
            unsafe { &*table }
        };

        if registration.abi_version != SERVICE_ABI_VERSION {
            return Err(LoaderError::InvalidFormat(format!(
                "{}: ABI version {} (host speaks {})",
                path.display(),
                registration.abi_version,
                SERVICE_ABI_VERSION
            )));
        }

        for def in registration.entry_points {
            if self
                .exported
                .insert(def.name.to_string(), def.construct)
                .is_some()
            {
                tracing::warn!(
                    package = %self.root.display(),
                    entry_point = def.name,
                    "entry point exported twice within package; later library wins"
                );
            }
        }

        self._libraries.push(library);
        Ok(())
    }

    /// The package root this context resolves for.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True if `entry_point` resolves in this scope.
    pub fn resolves(&self, entry_point: &str) -> bool {
        self.exported.contains_key(entry_point) || self.builtin.contains(entry_point)
    }

    /// Entry points exported by the package's own libraries.
    pub fn exported_entry_points(&self) -> impl Iterator<Item = &str> {
        self.exported.keys().map(String::as_str)
    }

    /// Resolves `entry_point` and constructs a fresh instance.
    ///
    /// Package exports shadow builtin factories. A constructor that
    /// panics is contained and reported as
    /// [`LoaderError::InstantiationFailed`].
    pub fn instantiate(&self, entry_point: &str) -> Result<Box<dyn Service>> {
        let outcome = if let Some(construct) = self.exported.get(entry_point) {
            let construct = *construct;
            catch_unwind(AssertUnwindSafe(construct))
        } else if let Some(construct) = self.builtin.get(entry_point) {
            let construct = Arc::clone(construct);
            catch_unwind(AssertUnwindSafe(move || construct()))
        } else {
            return Err(LoaderError::EntryPointNotFound(format!(
                "{} (package {})",
                entry_point,
                self.root.display()
            )));
        };

        outcome.map_err(|payload| LoaderError::InstantiationFailed {
            entry_point: entry_point.to_string(),
            reason: panic_message(&payload),
        })
    }
}

impl fmt::Debug for PackageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageContext")
            .field("root", &self.root)
            .field("exported", &self.exported.keys().collect::<Vec<_>>())
            .field("libraries", &self._libraries.len())
            .finish()
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Dynamic-library extension accepted inside packages.
fn is_dynamic_library(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("so") | Some("dylib") | Some("dll")
    )
}
