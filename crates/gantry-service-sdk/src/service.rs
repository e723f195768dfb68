//! The service contract.

use std::fmt;

use crate::context::ServiceContext;
use crate::error::ServiceResult;

/// A loadable service extension.
///
/// Implementations are produced by a zero-argument constructor named by
/// their package descriptor's `entry_point` and then driven through the
/// host's state machine: loaded once, enabled and disabled any number of
/// times, disabled for good at shutdown.
///
/// Every hook defaults to a no-op so a service implements only what it
/// needs. Each hook receives the same [`ServiceContext`]; a service that
/// registers capabilities in [`on_enable`](Service::on_enable) removes
/// them itself in [`on_disable`](Service::on_disable).
pub trait Service: Send {
    /// Runs once, right after construction, before the service can be
    /// enabled. The handle ends up loaded whether or not this succeeds.
    fn on_load(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        Ok(())
    }

    /// Runs on every transition into the enabled state.
    fn on_enable(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        Ok(())
    }

    /// Runs on every transition into the disabled state.
    fn on_disable(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        Ok(())
    }
}

impl fmt::Debug for dyn Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Service")
    }
}
