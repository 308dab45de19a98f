//! Class registry: entries, registration, queries, dispatch, fingerprint,
//! reflection.
//!
//! The [`Registry`] here is single-threaded on purpose: the `classdb` facade
//! crate owns the process-wide reader-writer lock and releases it before
//! running constructors or accessors. Embedders that never share a registry
//! across threads can use this crate directly.

pub mod class_entry;
pub mod dispatch;
pub mod fingerprint;
pub mod members;
pub mod reflect;
pub mod registry;

pub use class_entry::{ClassEntry, ClassId, Constructor, PropertySetGet};
pub use dispatch::{invoke_getter, invoke_setter};
pub use fingerprint::VERSION_FULL_CONFIG;
pub use reflect::{
    BuiltinTypeReflection, ClassReflection, ConstantReflection, EnumReflection,
    IndexedPropertyReflection, MethodReflection, PropertyReflection, ReflectError,
    ReflectionData, GLOBAL_SCOPE_CLASS,
};
pub use registry::Registry;
