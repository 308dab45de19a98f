//! The trait native types implement to enter the registry.

use classdb_core::{Instance, Name, RegistrationError};
use classdb_registry::Registry;

/// A native type that can be registered as a class.
///
/// [`initialize_class`](Registrable::initialize_class) runs while the
/// facade's writer lock is held, so it must use the `Registry` it is handed
/// (the non-locking entry points) and never call back into
/// [`ClassDb`](crate::ClassDb). The class itself is added by the facade
/// before the hook runs; the hook binds members.
pub trait Registrable: Instance + Sized {
    fn class_name() -> Name;

    /// Parent class; `Name::none()` for a hierarchy root. The parent must be
    /// registered first.
    fn parent_class_name() -> Name {
        Name::none()
    }

    /// Bind methods, properties, signals, constants and enums.
    fn initialize_class(registry: &mut Registry) -> Result<(), RegistrationError>;

    /// Produce a fresh instance. Installed as the class constructor by
    /// [`ClassDb::register_class`](crate::ClassDb::register_class).
    fn construct() -> Box<dyn Instance>;

    /// Constructor variant installed by
    /// [`ClassDb::register_custom_instance_class`](crate::ClassDb::register_custom_instance_class),
    /// for types whose instances carry externally supplied state. Defaults
    /// to [`construct`](Registrable::construct).
    fn construct_custom() -> Box<dyn Instance> {
        Self::construct()
    }
}
