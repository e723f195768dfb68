//! Minimal host embedding the service manager.
//!
//! Sets up one local root with a single packaged service, loads and
//! enables it, then drives the management surface the way a host command
//! layer would. Run with `cargo run --example embedded_host`.

use std::sync::Arc;

use gantry_core::prelude::*;
use parking_lot::Mutex;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Host that prints everything it is asked to do.
#[derive(Default)]
struct StdoutHost {
    subscribers: Mutex<Vec<Arc<dyn EventSubscriber>>>,
}

impl HostContext for StdoutHost {
    fn broadcast(&self, message: &str) {
        println!("[broadcast] {message}");
    }

    fn register_command(
        &self,
        label: &str,
        _handler: Arc<dyn CommandHandler>,
    ) -> std::result::Result<(), HostError> {
        println!("[host] command registered: {label}");
        Ok(())
    }

    fn register_event_subscriber(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.lock().push(subscriber);
    }

    fn unregister_event_subscriber(&self, subscriber: &Arc<dyn EventSubscriber>) {
        self.subscribers
            .lock()
            .retain(|s| !Arc::ptr_eq(s, subscriber));
    }
}

/// Service that greets over the host's broadcast channel.
#[derive(Default)]
struct Announcer;

impl Service for Announcer {
    fn on_enable(&mut self, ctx: &ServiceContext) -> ServiceResult<()> {
        let greeting = ctx
            .config()
            .get_str("greeting")
            .unwrap_or("announcer online")
            .to_string();
        ctx.broadcast(&greeting);
        Ok(())
    }

    fn on_disable(&mut self, ctx: &ServiceContext) -> ServiceResult<()> {
        ctx.broadcast("announcer signing off");
        Ok(())
    }
}

/// Responder printing replies as a console would.
struct Console;

impl Responder for Console {
    fn send(&mut self, line: String) {
        println!("> {line}");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // One local root with one packaged service.
    let root = tempfile::tempdir()?;
    let package = root.path().join("announcer.svc");
    std::fs::create_dir_all(&package)?;
    std::fs::write(
        package.join("service.json"),
        json!({
            "name": "announcer",
            "entry_point": "announcer",
            "version": "1.0.0",
            "greeting": "hello from the announcer service"
        })
        .to_string(),
    )?;

    let builtin = Arc::new(BuiltinFactories::new().with("announcer", || {
        Box::new(Announcer::default())
    }));
    let config = LoaderConfig::new().with_local_root(root.path());

    let mut manager = ServiceManager::new(config, builtin, Arc::new(StdoutHost::default()))?
        .with_event_callback(|event| println!("[event] {event:?}"));

    manager.load_all();
    manager.enable_all();

    // What a host command layer would do with "services ..." input.
    let mut console = Console;
    for args in [
        vec!["list"],
        vec!["disable", "announcer"],
        vec!["enable", "announcer"],
        vec!["reload"],
        vec!["list"],
    ] {
        println!("$ services {}", args.join(" "));
        if ManagementCommand::new(&mut manager).dispatch(&args, &mut console)
            == CommandOutcome::Unhandled
        {
            println!("> usage: services list|enable <name>|disable <name>|reload");
        }
    }

    manager.shutdown();
    Ok(())
}
