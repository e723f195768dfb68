//! Host capability surface.
//!
//! The embedding host implements [`HostContext`] once and hands it to the
//! loader; every service reaches the same object through its
//! [`ServiceContext`](crate::context::ServiceContext). The loader itself
//! uses none of these capabilities, it only wires them through.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::datastore::DatastoreCatalog;

/// An event flowing across the host's bus.
///
/// Opaque to the loader: a topic for routing plus an arbitrary JSON
/// payload whose schema is between the host and the subscribing services.
#[derive(Debug, Clone)]
pub struct HostEvent {
    pub topic: String,
    pub payload: Value,
}

impl HostEvent {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

/// Raised when the host refuses a capability registration.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host has no command layer, or the label is already taken.
    #[error("Command registration refused: {0}")]
    CommandRejected(String),

    /// The host cannot accept the subscriber.
    #[error("Subscriber registration refused: {0}")]
    SubscriberRejected(String),
}

/// Receives reply lines from command execution.
///
/// Implemented by whatever the host uses to talk back to an operator;
/// tests collect the lines into a buffer.
pub trait Responder {
    fn send(&mut self, line: String);
}

/// Handles invocations of a command registered by a service.
pub trait CommandHandler: Send + Sync {
    /// Executes the command, sending reply lines through `reply`.
    fn handle(&self, args: &[String], reply: &mut dyn Responder);
}

/// Receives host events while registered.
pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: &HostEvent);
}

/// The capability surface a host exposes to loaded services.
///
/// Subscriber deregistration is explicit and identity-based: the host
/// compares `Arc`s by pointer, so a service keeps the `Arc` it registered
/// and passes the same one back from its disable hook. Nothing is torn
/// down automatically on disable.
pub trait HostContext: Send + Sync {
    /// Announces `message` to everything attached to the host.
    fn broadcast(&self, message: &str);

    /// Exposes `handler` under `label` in the host's command layer.
    fn register_command(
        &self,
        label: &str,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), HostError>;

    /// Attaches `subscriber` to the host's event bus.
    fn register_event_subscriber(&self, subscriber: Arc<dyn EventSubscriber>);

    /// Detaches a previously registered subscriber. Unknown subscribers
    /// are ignored.
    fn unregister_event_subscriber(&self, subscriber: &Arc<dyn EventSubscriber>);

    /// Datastore endpoints the deployment provides, if any.
    fn datastores(&self) -> &DatastoreCatalog {
        DatastoreCatalog::empty()
    }
}
