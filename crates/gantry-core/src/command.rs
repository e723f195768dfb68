//! Textual management surface: `list`, `enable <name>`,
//! `disable <name>`, `reload`.
//!
//! The host's command layer parses its own command line, checks the
//! permission node, and hands the remaining arguments here. Replies go
//! through the caller's [`Responder`]; internal failures are logged
//! server-side and never leak into replies.

use gantry_service_sdk::host::Responder;
use tracing::debug;

use crate::manager::ServiceManager;

/// Permission node gating `list`.
pub const PERMISSION_LIST: &str = "gantry.services.list";

/// Permission node gating `enable`, `disable`, and `reload`.
pub const PERMISSION_MANAGE: &str = "gantry.services.manage";

/// Whether a dispatch consumed the sub-command.
///
/// `Unhandled` means the sub-command was not recognized; the host shows
/// its own usage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Handled,
    Unhandled,
}

/// Borrows the manager for the duration of one command dispatch.
pub struct ManagementCommand<'a> {
    manager: &'a mut ServiceManager,
}

impl<'a> ManagementCommand<'a> {
    pub fn new(manager: &'a mut ServiceManager) -> Self {
        Self { manager }
    }

    /// Dispatches one sub-command. `args` is the command line after the
    /// host's own command label, already split.
    pub fn dispatch(&mut self, args: &[&str], reply: &mut dyn Responder) -> CommandOutcome {
        debug!(?args, "management dispatch");
        match args {
            ["list"] => self.list(reply),
            ["enable", name] => self.enable(name, reply),
            ["disable", name] => self.disable(name, reply),
            ["reload"] => self.reload(reply),
            _ => return CommandOutcome::Unhandled,
        }
        CommandOutcome::Handled
    }

    fn list(&self, reply: &mut dyn Responder) {
        reply.send(format!("Services ({}):", self.manager.len()));
        for handle in self.manager.services() {
            let line = match handle.version() {
                Some(version) => {
                    format!("  {} {}: {}", handle.name(), version, handle.state())
                }
                None => format!("  {}: {}", handle.name(), handle.state()),
            };
            reply.send(line);
        }
    }

    fn enable(&mut self, name: &str, reply: &mut dyn Responder) {
        if self.manager.enable(name) {
            reply.send(format!("Enabled service {name}"));
        } else {
            reply.send(format!("No such service: {name}"));
        }
    }

    fn disable(&mut self, name: &str, reply: &mut dyn Responder) {
        if self.manager.disable(name) {
            reply.send(format!("Disabled service {name}"));
        } else {
            reply.send(format!("No such service: {name}"));
        }
    }

    fn reload(&mut self, reply: &mut dyn Responder) {
        reply.send("Disabling loaded services".to_string());
        self.manager.unload_all();
        reply.send("Loading services".to_string());
        let report = self.manager.load_all();
        reply.send("Enabling loaded services".to_string());
        self.manager.enable_all();
        reply.send(format!(
            "Reload complete: {} loaded, {} failed",
            report.loaded.len(),
            report.errors.len()
        ));
    }
}
