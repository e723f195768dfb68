//! Discovery and loading across real package roots.
//!
//! Covers:
//! - Re-discovery stability over an unchanged root
//! - Fault isolation between packages sharing a root
//! - Root-level failures skipping the root instead of aborting the pass
//! - Package layout rules (`.svc` suffix, nested descriptors)

use std::fs;
use std::path::Path;
use std::sync::Arc;

use gantry_core::{
    discover_root, BuiltinFactories, LoaderConfig, LoaderError, RootConfig, ServiceManager,
    ServiceState,
};
use gantry_service_sdk::host::{CommandHandler, EventSubscriber, HostContext, HostError};
use gantry_service_sdk::Service;
use serde_json::json;

struct SilentHost;

impl HostContext for SilentHost {
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

struct Inert;

impl Service for Inert {}

fn factories() -> Arc<BuiltinFactories> {
    Arc::new(BuiltinFactories::new().with("inert", || Box::new(Inert)))
}

fn write_package(root: &Path, package: &str, descriptor: serde_json::Value) {
    let dir = root.join(format!("{package}.svc"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("service.json"), descriptor.to_string()).unwrap();
}

#[test]
fn test_rediscovery_is_stable() {
    let root = tempfile::tempdir().unwrap();
    write_package(
        root.path(),
        "alpha",
        json!({ "name": "alpha", "entry_point": "inert" }),
    );
    write_package(
        root.path(),
        "beta",
        json!({ "name": "beta", "entry_point": "inert" }),
    );

    let config = RootConfig::local(root.path());
    let builtin = factories();

    let first: Vec<String> = discover_root(&config, &builtin)
        .unwrap()
        .into_iter()
        .map(|d| d.descriptor.name)
        .collect();
    let second: Vec<String> = discover_root(&config, &builtin)
        .unwrap()
        .into_iter()
        .map(|d| d.descriptor.name)
        .collect();

    assert_eq!(first, ["alpha", "beta"]);
    assert_eq!(first, second);
}

#[test]
fn test_nested_descriptor_is_found() {
    let root = tempfile::tempdir().unwrap();
    let nested = root.path().join("deep.svc").join("conf");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("service.json"),
        json!({ "name": "deep", "entry_point": "inert" }).to_string(),
    )
    .unwrap();

    let found = discover_root(&RootConfig::local(root.path()), &factories()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].descriptor.name, "deep");
}

#[test]
fn test_broken_package_isolated_from_siblings() {
    let root = tempfile::tempdir().unwrap();
    write_package(
        root.path(),
        "broken",
        json!({ "name": "broken", "entry_point": "no_such_entry" }),
    );
    write_package(
        root.path(),
        "healthy",
        json!({ "name": "healthy", "entry_point": "inert" }),
    );

    let config = LoaderConfig::new().with_local_root(root.path());
    let mut manager = ServiceManager::new(config, factories(), Arc::new(SilentHost)).unwrap();

    let report = manager.load_all();
    assert_eq!(report.loaded, ["healthy"]);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors[0],
        LoaderError::EntryPointNotFound(_)
    ));
    assert!(manager.contains("healthy"));
    assert!(!manager.contains("broken"));
}

#[test]
fn test_invalid_descriptor_skipped_with_siblings_intact() {
    let root = tempfile::tempdir().unwrap();
    let bad = root.path().join("bad.svc");
    fs::create_dir_all(&bad).unwrap();
    // Missing entry_point, rejected at parse time.
    fs::write(
        bad.join("service.json"),
        json!({ "name": "bad" }).to_string(),
    )
    .unwrap();
    write_package(
        root.path(),
        "good",
        json!({ "name": "good", "entry_point": "inert" }),
    );

    let found = discover_root(&RootConfig::local(root.path()), &factories()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].descriptor.name, "good");
}

#[test]
fn test_missing_root_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present");
    let absent = dir.path().join("absent");
    fs::create_dir_all(&present).unwrap();
    write_package(
        &present,
        "svc",
        json!({ "name": "svc", "entry_point": "inert" }),
    );

    let config = LoaderConfig::new()
        .with_remote_root(&absent)
        .with_local_root(&present);
    let mut manager = ServiceManager::new(config, factories(), Arc::new(SilentHost)).unwrap();

    let report = manager.load_all();
    assert_eq!(report.skipped_roots, 1);
    assert_eq!(report.loaded, ["svc"]);
}

#[test]
fn test_root_that_is_a_file_is_invalid_format() {
    let dir = tempfile::tempdir().unwrap();
    let file_root = dir.path().join("not_a_dir");
    fs::write(&file_root, "junk").unwrap();

    let err = discover_root(&RootConfig::local(&file_root), &factories()).unwrap_err();
    assert!(matches!(err, LoaderError::InvalidFormat(_)));
}

#[test]
fn test_enable_true_descriptor_ends_enabled() {
    let root = tempfile::tempdir().unwrap();
    write_package(
        root.path(),
        "alpha",
        json!({ "name": "alpha", "entry_point": "inert", "enable": true }),
    );

    let config = LoaderConfig::new().with_local_root(root.path());
    let mut manager = ServiceManager::new(config, factories(), Arc::new(SilentHost)).unwrap();
    manager.load_all();
    manager.enable_all();

    assert_eq!(
        manager.get("alpha").map(|h| h.state()),
        Some(ServiceState::Enabled)
    );
}
