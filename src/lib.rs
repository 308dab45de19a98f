//! Class registry with reflective dispatch.
//!
//! `classdb` keeps a process-wide table of classes: their inheritance
//! chain, bound methods, accessor-backed properties, signals, constants and
//! enums. On top of the table it provides dynamic dispatch (`instance`,
//! `set_property`, `get_property`), a lazily filled default-value cache, a
//! deterministic 64-bit fingerprint of the exposed API surface, and a
//! reflection emitter for binding generators.
//!
//! The crate is split in three:
//!
//! - [`classdb_core`] — leaf types: [`Name`], [`Value`], descriptors,
//!   [`MethodBinding`], the [`Instance`] trait, errors.
//! - [`classdb_registry`] — the single-threaded [`Registry`] holding the
//!   class table and implementing queries, dispatch, fingerprint and
//!   reflection.
//! - this crate — the locked [`ClassDb`] facade, the [`Registrable`]
//!   registration trait, and the process global.
//!
//! ```
//! use classdb::{ClassDb, Instance, MethodBinding, Name, PropertyDescriptor,
//!               Registrable, RegistrationError, Registry, TypeTag, Value};
//! use std::any::Any;
//!
//! struct Counter { count: i64 }
//!
//! impl Instance for Counter {
//!     fn class_name(&self) -> Name { Name::new("Counter") }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn as_any_mut(&mut self) -> &mut dyn Any { self }
//! }
//!
//! impl Registrable for Counter {
//!     fn class_name() -> Name { Name::new("Counter") }
//!     fn initialize_class(registry: &mut Registry) -> Result<(), RegistrationError> {
//!         registry.bind_method(
//!             MethodBinding::new("Counter", "increment", |inst, args| {
//!                 let c = inst.as_any_mut().downcast_mut::<Counter>().unwrap();
//!                 if let Value::Int(by) = args[0] { c.count += by; }
//!                 Ok(Value::Int(c.count))
//!             })
//!             .with_argument(PropertyDescriptor::new(TypeTag::Int, "by")),
//!             vec![Value::Int(1)],
//!         )?;
//!         Ok(())
//!     }
//!     fn construct() -> Box<dyn Instance> { Box::new(Counter { count: 0 }) }
//! }
//!
//! let db = ClassDb::new();
//! db.register_class::<Counter>().unwrap();
//! let mut obj = db.instance(&Name::new("Counter")).unwrap();
//! let binding = db.get_method(&Name::new("Counter"), &Name::new("increment")).unwrap();
//! assert_eq!(binding.invoke(obj.as_mut(), &[]).unwrap(), Value::Int(1));
//! ```

pub mod class_db;
pub mod registrable;

pub use class_db::ClassDb;
pub use registrable::Registrable;

pub use classdb_core::{
    Aabb, ApiTier, Basis, CallError, CallErrorKind, Color, EnumDescriptor, Instance,
    MethodBinding, MethodFlags, MethodInfo, Name, ObjectRef, Plane, PropertyDescriptor,
    PropertyHint, PropertyUsage, Quat, Rect2, RegistrationError, SignalInfo, Transform2d,
    Transform3d, TypeTag, Value, Vector2, Vector3,
};
pub use classdb_registry::{
    ClassReflection, ConstantReflection, EnumReflection, IndexedPropertyReflection,
    MethodReflection, PropertyReflection, ReflectError, ReflectionData, Registry,
};
