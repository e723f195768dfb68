//! Macros for declaring dynamic service packages.

/// Exports the registration table of a dynamic service package.
///
/// Takes `("entry-point-name", constructor)` pairs where each constructor
/// is a `fn() -> Box<dyn Service>`. Expands to the well-known
/// `gantry_service_registration` export the loader resolves, stamped with
/// the current [`SERVICE_ABI_VERSION`](crate::abi::SERVICE_ABI_VERSION).
/// Invoke it exactly once per library.
///
/// ```ignore
/// use gantry_service_sdk::prelude::*;
///
/// #[derive(Default)]
/// struct Greeter;
///
/// impl Service for Greeter {}
///
/// fn make_greeter() -> Box<dyn Service> {
///     Box::new(Greeter::default())
/// }
///
/// gantry_service_sdk::export_services![("greeter", make_greeter)];
/// ```
#[macro_export]
macro_rules! export_services {
    ($(($name:expr, $ctor:expr)),+ $(,)?) => {
        #[no_mangle]
        pub extern "Rust" fn gantry_service_registration(
        ) -> *const $crate::abi::ServiceRegistration {
            static REGISTRATION: $crate::abi::ServiceRegistration =
                $crate::abi::ServiceRegistration {
                    abi_version: $crate::abi::SERVICE_ABI_VERSION,
                    entry_points: &[$($crate::abi::EntryPointDef {
                        name: $name,
                        construct: $ctor,
                    }),+],
                };
            &REGISTRATION
        }
    };
}
