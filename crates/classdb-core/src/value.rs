//! The dynamic value type carried across reflective calls.
//!
//! [`Value`] has exactly one variant per [`TypeTag`]. It is the argument and
//! return currency of every bound method, the payload of the default-value
//! cache, and a fingerprint input, so its hash must be stable across
//! processes.

use ordered_float::OrderedFloat;

use crate::hashing::{canon_f32_bits, canon_f64_bits, fold64, hash_bytes64, hash_str64};
use crate::math::{Aabb, Basis, Color, Plane, Quat, Rect2, Transform2d, Transform3d, Vector2, Vector3};
use crate::name::Name;
use crate::type_tag::TypeTag;
use crate::call_error::CallError;

/// Reference to a live object: its registered class plus an opaque id.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    pub class: Name,
    pub id: u64,
}

impl ObjectRef {
    pub fn new(class: impl Into<Name>, id: u64) -> Self {
        Self {
            class: class.into(),
            id,
        }
    }

    /// The null object reference.
    pub fn null() -> Self {
        Self {
            class: Name::none(),
            id: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.id == 0
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Name(Name),
    Path(String),
    Vector2(Vector2),
    Vector3(Vector3),
    Rect2(Rect2),
    Transform2d(Transform2d),
    Transform3d(Transform3d),
    Plane(Plane),
    Quat(Quat),
    Aabb(Aabb),
    Basis(Basis),
    Color(Color),
    Object(ObjectRef),
    ResourceId(u64),
    /// Association list; key order is preserved and significant for hashing.
    Dictionary(Vec<(Value, Value)>),
    Array(Vec<Value>),
    ByteArray(Vec<u8>),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    StringArray(Vec<String>),
    Vector2Array(Vec<Vector2>),
    Vector3Array(Vec<Vector3>),
    ColorArray(Vec<Color>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Nil => TypeTag::Nil,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::Name(_) => TypeTag::Name,
            Value::Path(_) => TypeTag::Path,
            Value::Vector2(_) => TypeTag::Vector2,
            Value::Vector3(_) => TypeTag::Vector3,
            Value::Rect2(_) => TypeTag::Rect2,
            Value::Transform2d(_) => TypeTag::Transform2d,
            Value::Transform3d(_) => TypeTag::Transform3d,
            Value::Plane(_) => TypeTag::Plane,
            Value::Quat(_) => TypeTag::Quat,
            Value::Aabb(_) => TypeTag::Aabb,
            Value::Basis(_) => TypeTag::Basis,
            Value::Color(_) => TypeTag::Color,
            Value::Object(_) => TypeTag::Object,
            Value::ResourceId(_) => TypeTag::ResourceId,
            Value::Dictionary(_) => TypeTag::Dictionary,
            Value::Array(_) => TypeTag::Array,
            Value::ByteArray(_) => TypeTag::ByteArray,
            Value::IntArray(_) => TypeTag::IntArray,
            Value::FloatArray(_) => TypeTag::FloatArray,
            Value::StringArray(_) => TypeTag::StringArray,
            Value::Vector2Array(_) => TypeTag::Vector2Array,
            Value::Vector3Array(_) => TypeTag::Vector3Array,
            Value::ColorArray(_) => TypeTag::ColorArray,
        }
    }

    /// Stable 64-bit hash, domain-separated by type tag. Equal values hash
    /// equal (NaNs collapse, negative zero collapses); the result feeds the
    /// API fingerprint through default-argument folds.
    pub fn hash(&self) -> u64 {
        let acc = fold64(0, u8::from(self.type_tag()) as u64);
        match self {
            Value::Nil => acc,
            Value::Bool(b) => fold64(acc, *b as u64),
            Value::Int(i) => fold64(acc, *i as u64),
            Value::Float(f) => fold64(acc, canon_f64_bits(*f)),
            Value::Str(s) | Value::Path(s) => fold64(acc, hash_str64(s)),
            Value::Name(n) => fold64(acc, n.hash64()),
            Value::Vector2(v) => v.fold_hash(acc),
            Value::Vector3(v) => v.fold_hash(acc),
            Value::Rect2(v) => v.fold_hash(acc),
            Value::Transform2d(v) => v.fold_hash(acc),
            Value::Transform3d(v) => v.fold_hash(acc),
            Value::Plane(v) => v.fold_hash(acc),
            Value::Quat(v) => v.fold_hash(acc),
            Value::Aabb(v) => v.fold_hash(acc),
            Value::Basis(v) => v.fold_hash(acc),
            Value::Color(v) => v.fold_hash(acc),
            Value::Object(o) => fold64(fold64(acc, o.class.hash64()), o.id),
            Value::ResourceId(id) => fold64(acc, *id),
            Value::Dictionary(pairs) => {
                let acc = fold64(acc, pairs.len() as u64);
                pairs.iter().fold(acc, |acc, (k, v)| {
                    fold64(fold64(acc, k.hash()), v.hash())
                })
            }
            Value::Array(items) => {
                let acc = fold64(acc, items.len() as u64);
                items.iter().fold(acc, |acc, v| fold64(acc, v.hash()))
            }
            Value::ByteArray(bytes) => fold64(acc, hash_bytes64(bytes)),
            Value::IntArray(items) => {
                let acc = fold64(acc, items.len() as u64);
                items.iter().fold(acc, |acc, v| fold64(acc, *v as i64 as u64))
            }
            Value::FloatArray(items) => {
                let acc = fold64(acc, items.len() as u64);
                items
                    .iter()
                    .fold(acc, |acc, v| fold64(acc, canon_f32_bits(*v) as u64))
            }
            Value::StringArray(items) => {
                let acc = fold64(acc, items.len() as u64);
                items.iter().fold(acc, |acc, s| fold64(acc, hash_str64(s)))
            }
            Value::Vector2Array(items) => {
                let acc = fold64(acc, items.len() as u64);
                items.iter().fold(acc, |acc, v| v.fold_hash(acc))
            }
            Value::Vector3Array(items) => {
                let acc = fold64(acc, items.len() as u64);
                items.iter().fold(acc, |acc, v| v.fold_hash(acc))
            }
            Value::ColorArray(items) => {
                let acc = fold64(acc, items.len() as u64);
                items.iter().fold(acc, |acc, v| v.fold_hash(acc))
            }
        }
    }

    /// Whether a value of type `from` is accepted where `to` is declared,
    /// without lossy coercion. Every type accepts itself; numeric types
    /// accept each other; the string-like types accept `Str` and vice versa;
    /// `Object` accepts `Nil` as the null reference.
    pub fn can_convert_strict(from: TypeTag, to: TypeTag) -> bool {
        if from == to {
            return true;
        }
        matches!(
            (from, to),
            (TypeTag::Int, TypeTag::Float)
                | (TypeTag::Float, TypeTag::Int)
                | (TypeTag::Name, TypeTag::Str)
                | (TypeTag::Path, TypeTag::Str)
                | (TypeTag::Str, TypeTag::Name)
                | (TypeTag::Str, TypeTag::Path)
                | (TypeTag::Nil, TypeTag::Object)
        )
    }

    /// The default value of a type: zeroes, empty containers, identity
    /// transforms, the null object.
    pub fn default_for(tag: TypeTag) -> Value {
        match tag {
            TypeTag::Nil => Value::Nil,
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Int => Value::Int(0),
            TypeTag::Float => Value::Float(0.0),
            TypeTag::Str => Value::Str(String::new()),
            TypeTag::Name => Value::Name(Name::none()),
            TypeTag::Path => Value::Path(String::new()),
            TypeTag::Vector2 => Value::Vector2(Vector2::default()),
            TypeTag::Vector3 => Value::Vector3(Vector3::default()),
            TypeTag::Rect2 => Value::Rect2(Rect2::default()),
            TypeTag::Transform2d => Value::Transform2d(Transform2d::default()),
            TypeTag::Transform3d => Value::Transform3d(Transform3d::default()),
            TypeTag::Plane => Value::Plane(Plane::default()),
            TypeTag::Quat => Value::Quat(Quat::default()),
            TypeTag::Aabb => Value::Aabb(Aabb::default()),
            TypeTag::Basis => Value::Basis(Basis::default()),
            TypeTag::Color => Value::Color(Color::default()),
            TypeTag::Object => Value::Object(ObjectRef::null()),
            TypeTag::ResourceId => Value::ResourceId(0),
            TypeTag::Dictionary => Value::Dictionary(Vec::new()),
            TypeTag::Array => Value::Array(Vec::new()),
            TypeTag::ByteArray => Value::ByteArray(Vec::new()),
            TypeTag::IntArray => Value::IntArray(Vec::new()),
            TypeTag::FloatArray => Value::FloatArray(Vec::new()),
            TypeTag::StringArray => Value::StringArray(Vec::new()),
            TypeTag::Vector2Array => Value::Vector2Array(Vec::new()),
            TypeTag::Vector3Array => Value::Vector3Array(Vec::new()),
            TypeTag::ColorArray => Value::ColorArray(Vec::new()),
        }
    }

    /// Convert to `tag` under the strict rules. `None` when the conversion
    /// is not permitted.
    pub fn convert_to(&self, tag: TypeTag) -> Option<Value> {
        if self.type_tag() == tag {
            return Some(self.clone());
        }
        match (self, tag) {
            (Value::Int(i), TypeTag::Float) => Some(Value::Float(*i as f64)),
            (Value::Float(f), TypeTag::Int) => Some(Value::Int(*f as i64)),
            (Value::Name(n), TypeTag::Str) => Some(Value::Str(n.as_str().to_owned())),
            (Value::Path(p), TypeTag::Str) => Some(Value::Str(p.clone())),
            (Value::Str(s), TypeTag::Name) => Some(Value::Name(Name::new(s))),
            (Value::Str(s), TypeTag::Path) => Some(Value::Path(s.clone())),
            (Value::Nil, TypeTag::Object) => Some(Value::Object(ObjectRef::null())),
            _ => None,
        }
    }

    /// Build a value of `tag` from positional arguments: zero arguments
    /// yields the type's default, one convertible argument converts.
    pub fn construct(tag: TypeTag, args: &[Value]) -> Result<Value, CallError> {
        match args {
            [] => Ok(Value::default_for(tag)),
            [arg] => arg
                .convert_to(tag)
                .ok_or_else(|| CallError::invalid_argument(0, tag)),
            _ => Err(CallError::too_many_arguments()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Total float equality: NaN == NaN, so cache lookups and
            // hash/equality agree.
            (Value::Float(a), Value::Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Name(a), Value::Name(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Vector2(a), Value::Vector2(b)) => a == b,
            (Value::Vector3(a), Value::Vector3(b)) => a == b,
            (Value::Rect2(a), Value::Rect2(b)) => a == b,
            (Value::Transform2d(a), Value::Transform2d(b)) => a == b,
            (Value::Transform3d(a), Value::Transform3d(b)) => a == b,
            (Value::Plane(a), Value::Plane(b)) => a == b,
            (Value::Quat(a), Value::Quat(b)) => a == b,
            (Value::Aabb(a), Value::Aabb(b)) => a == b,
            (Value::Basis(a), Value::Basis(b)) => a == b,
            (Value::Color(a), Value::Color(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::ResourceId(a), Value::ResourceId(b)) => a == b,
            (Value::Dictionary(a), Value::Dictionary(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::ByteArray(a), Value::ByteArray(b)) => a == b,
            (Value::IntArray(a), Value::IntArray(b)) => a == b,
            (Value::FloatArray(a), Value::FloatArray(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| OrderedFloat(*x) == OrderedFloat(*y))
            }
            (Value::StringArray(a), Value::StringArray(b)) => a == b,
            (Value::Vector2Array(a), Value::Vector2Array(b)) => a == b,
            (Value::Vector3Array(a), Value::Vector3Array(b)) => a == b,
            (Value::ColorArray(a), Value::ColorArray(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Name> for Value {
    fn from(v: Name) -> Self {
        Value::Name(v)
    }
}

impl From<Vector2> for Value {
    fn from(v: Vector2) -> Self {
        Value::Vector2(v)
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Value::Vector3(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}
