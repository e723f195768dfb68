//! Dynamic registration ABI.
//!
//! A service package built as a dynamic library exposes its entry points
//! through a single exported function returning a [`ServiceRegistration`]
//! table. The table crosses the library boundary as plain Rust data
//! (string slices and function pointers), so packages must be produced by
//! the same toolchain as the host that loads them. [`SERVICE_ABI_VERSION`]
//! is bumped on any breaking change to the types in this module; loaders
//! refuse tables built against another version.

use crate::service::Service;

/// Version of the registration contract below.
pub const SERVICE_ABI_VERSION: u32 = 1;

/// Name of the exported registration function.
pub const SERVICE_ENTRY_SYMBOL: &str = "gantry_service_registration";

/// Signature of the exported registration function. A null return marks
/// the library unusable.
pub type ServiceRegistrationFn = fn() -> *const ServiceRegistration;

/// Zero-argument constructor for one service implementation.
pub type ServiceConstructor = fn() -> Box<dyn Service>;

/// One entry-point identifier and its constructor.
#[derive(Clone, Copy)]
pub struct EntryPointDef {
    /// Identifier matched against descriptor `entry_point` fields.
    pub name: &'static str,
    /// Builds a fresh instance.
    pub construct: ServiceConstructor,
}

impl std::fmt::Debug for EntryPointDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPointDef")
            .field("name", &self.name)
            .finish()
    }
}

/// The table a package exports, one per library.
#[derive(Debug)]
pub struct ServiceRegistration {
    pub abi_version: u32,
    pub entry_points: &'static [EntryPointDef],
}

impl ServiceRegistration {
    /// Looks up one entry point by identifier.
    pub fn find(&self, name: &str) -> Option<&EntryPointDef> {
        self.entry_points.iter().find(|def| def.name == name)
    }
}
