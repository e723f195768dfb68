//! Finds packaged services under configured roots.
//!
//! A root either is a single `.svc` package directory or contains any
//! number of them. Each package carries one or more `service.json`
//! descriptors somewhere inside; every descriptor found in a package
//! resolves against that package's isolation context.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::RootConfig;
use crate::descriptor::{ServiceDescriptor, DESCRIPTOR_FILE_NAME};
use crate::error::{LoaderError, Result};
use crate::isolation::{BuiltinFactories, PackageContext};

/// Directory extension marking a service package.
pub const PACKAGE_EXTENSION: &str = "svc";

/// How deep inside a package the descriptor search goes.
pub const DESCRIPTOR_SEARCH_DEPTH: usize = 4;

/// A descriptor found on disk, paired with the package scope it loads in.
///
/// Descriptors from the same package share one [`PackageContext`].
#[derive(Debug)]
pub struct DiscoveredService {
    pub descriptor: ServiceDescriptor,
    pub package: Arc<PackageContext>,
    pub descriptor_path: PathBuf,
}

/// Scans one root for service descriptors.
///
/// A missing or unreadable root is reported as an error and scans no
/// packages; callers treat that as skipping the root, not as a fatal
/// condition. Within a readable root, packages that fail to open and
/// descriptors that fail to parse are logged and skipped so one broken
/// package cannot suppress its siblings.
pub fn discover_root(
    root: &RootConfig,
    builtin: &Arc<BuiltinFactories>,
) -> Result<Vec<DiscoveredService>> {
    let metadata = fs::metadata(&root.path).map_err(|e| LoaderError::from_io(e, &root.path))?;
    if !metadata.is_dir() {
        return Err(LoaderError::InvalidFormat(format!(
            "root {} is not a directory",
            root.path.display()
        )));
    }

    let packages = if is_package_dir(&root.path) {
        vec![root.path.clone()]
    } else {
        list_packages(&root.path)?
    };

    let mut found = Vec::new();
    for package_root in &packages {
        match scan_package(package_root, builtin) {
            Ok(mut services) => found.append(&mut services),
            Err(err) => {
                warn!(
                    package = %package_root.display(),
                    error = %err,
                    "skipping unreadable package"
                );
            }
        }
    }
    debug!(
        root = %root.path.display(),
        packages = packages.len(),
        descriptors = found.len(),
        "root scan complete"
    );
    Ok(found)
}

/// `.svc` directories directly under `root`, in name order.
fn list_packages(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| LoaderError::from_io(e, root))?;
    let mut packages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoaderError::from_io(e, root))?;
        let path = entry.path();
        if path.is_dir() && is_package_dir(&path) {
            packages.push(path);
        }
    }
    packages.sort();
    Ok(packages)
}

/// Opens one package and collects every descriptor inside it.
fn scan_package(
    package_root: &Path,
    builtin: &Arc<BuiltinFactories>,
) -> Result<Vec<DiscoveredService>> {
    let package = Arc::new(PackageContext::open(package_root, Arc::clone(builtin))?);

    let mut found = Vec::new();
    let walk = WalkDir::new(package_root)
        .max_depth(DESCRIPTOR_SEARCH_DEPTH)
        .sort_by_file_name();
    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    package = %package_root.display(),
                    error = %err,
                    "unreadable package entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != DESCRIPTOR_FILE_NAME {
            continue;
        }
        match ServiceDescriptor::from_file(entry.path()) {
            Ok(descriptor) => {
                debug!(
                    service = %descriptor.name,
                    descriptor = %entry.path().display(),
                    "descriptor found"
                );
                found.push(DiscoveredService {
                    descriptor,
                    package: Arc::clone(&package),
                    descriptor_path: entry.path().to_path_buf(),
                });
            }
            Err(err) => {
                warn!(
                    descriptor = %entry.path().display(),
                    error = %err,
                    "skipping invalid descriptor"
                );
            }
        }
    }
    Ok(found)
}

fn is_package_dir(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == PACKAGE_EXTENSION)
}
