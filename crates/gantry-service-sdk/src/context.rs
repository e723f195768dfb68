//! Per-service view of the host.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::host::{CommandHandler, HostContext};

/// Resolved configuration handed to a service.
///
/// Carries the effective enable flag (descriptor override or root default,
/// resolved at load time) plus every descriptor key the loader does not
/// interpret itself.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    enabled: bool,
    extra: Map<String, Value>,
}

impl ServiceConfig {
    pub fn new(enabled: bool, extra: Map<String, Value>) -> Self {
        Self { enabled, extra }
    }

    /// Effective enable flag after policy resolution.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Raw descriptor value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.extra.get(key).and_then(Value::as_i64)
    }

    /// All uninterpreted descriptor keys.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Everything a service can reach on its host.
///
/// Built by the loader before any lifecycle hook runs and passed to every
/// hook by reference, so capabilities and configuration are always in
/// place by the time service code executes.
#[derive(Clone)]
pub struct ServiceContext {
    name: String,
    host: Arc<dyn HostContext>,
    config: ServiceConfig,
}

impl ServiceContext {
    pub fn new(name: impl Into<String>, host: Arc<dyn HostContext>, config: ServiceConfig) -> Self {
        Self {
            name: name.into(),
            host,
            config,
        }
    }

    /// The name this service is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct handle to the host capability surface.
    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Host-wide announcement.
    pub fn broadcast(&self, message: &str) {
        self.host.broadcast(message);
    }

    /// Registers `handler` under `label` with the host's command layer.
    ///
    /// A refusal is logged against this service and otherwise ignored, so
    /// a host without a command table never aborts a load.
    pub fn register_command(&self, label: &str, handler: Arc<dyn CommandHandler>) {
        if let Err(err) = self.host.register_command(label, handler) {
            tracing::warn!(service = %self.name, label, error = %err, "command registration refused");
        }
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{EventSubscriber, HostError, Responder};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        broadcasts: Mutex<Vec<String>>,
        reject_commands: bool,
    }

    impl HostContext for RecordingHost {
        fn broadcast(&self, message: &str) {
            self.broadcasts.lock().push(message.to_string());
        }

        fn register_command(
            &self,
            label: &str,
            _handler: Arc<dyn CommandHandler>,
        ) -> Result<(), HostError> {
            if self.reject_commands {
                Err(HostError::CommandRejected(label.to_string()))
            } else {
                Ok(())
            }
        }

        fn register_event_subscriber(&self, _subscriber: Arc<dyn EventSubscriber>) {}

        fn unregister_event_subscriber(&self, _subscriber: &Arc<dyn EventSubscriber>) {}
    }

    struct NoopHandler;

    impl CommandHandler for NoopHandler {
        fn handle(&self, _args: &[String], _reply: &mut dyn Responder) {}
    }

    fn config_with(key: &str, value: Value) -> ServiceConfig {
        let mut extra = Map::new();
        extra.insert(key.to_string(), value);
        ServiceConfig::new(true, extra)
    }

    #[test]
    fn test_typed_getters() {
        let config = config_with("threshold", Value::from(12));
        assert_eq!(config.get_i64("threshold"), Some(12));
        assert_eq!(config.get_str("threshold"), None);
        assert_eq!(config.get("missing"), None);
        assert!(config.enabled());
    }

    #[test]
    fn test_broadcast_reaches_host() {
        let host = Arc::new(RecordingHost::default());
        let ctx = ServiceContext::new("greeter", host.clone(), ServiceConfig::default());
        ctx.broadcast("hello");
        assert_eq!(host.broadcasts.lock().as_slice(), ["hello".to_string()]);
    }

    #[test]
    fn test_rejected_command_registration_is_swallowed() {
        let host = Arc::new(RecordingHost {
            reject_commands: true,
            ..Default::default()
        });
        let ctx = ServiceContext::new("greeter", host, ServiceConfig::default());
        // Refusal is logged, not raised.
        ctx.register_command("greet", Arc::new(NoopHandler));
    }
}
