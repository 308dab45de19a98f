//! Leaf types shared by the class registry.
//!
//! This crate carries no registry state of its own: interned names, the
//! dynamic [`Value`] type, member descriptors, type-erased method bindings,
//! the [`Instance`] trait objects dispatch into, and the error types. The
//! registry and its facade build on these.

pub mod api;
pub mod call_error;
pub mod error;
pub mod flags;
pub mod hashing;
pub mod info;
pub mod instance;
pub mod math;
pub mod method;
pub mod name;
pub mod type_tag;
pub mod value;

pub use api::ApiTier;
pub use call_error::{CallError, CallErrorKind};
pub use error::RegistrationError;
pub use flags::{MethodFlags, PropertyHint, PropertyUsage};
pub use hashing::{fold64, hash_str64};
pub use info::{EnumDescriptor, MethodInfo, PropertyDescriptor, SignalInfo};
pub use instance::Instance;
pub use math::{Aabb, Basis, Color, Plane, Quat, Rect2, Transform2d, Transform3d, Vector2, Vector3};
pub use method::{MethodBinding, MethodEntry};
pub use name::Name;
pub use type_tag::TypeTag;
pub use value::{ObjectRef, Value};
