//! The closed set of value types the registry can describe.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Discriminant of a [`Value`](crate::Value) variant.
///
/// The numeric representation is part of the API fingerprint, so variants
/// must never be reordered or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TypeTag {
    #[default]
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Str = 4,
    Name = 5,
    Path = 6,
    Vector2 = 7,
    Vector3 = 8,
    Rect2 = 9,
    Transform2d = 10,
    Transform3d = 11,
    Plane = 12,
    Quat = 13,
    Aabb = 14,
    Basis = 15,
    Color = 16,
    Object = 17,
    ResourceId = 18,
    Dictionary = 19,
    Array = 20,
    ByteArray = 21,
    IntArray = 22,
    FloatArray = 23,
    StringArray = 24,
    Vector2Array = 25,
    Vector3Array = 26,
    ColorArray = 27,
}

impl TypeTag {
    /// Canonical display name, as it appears in reflection output.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Nil => "Nil",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "String",
            TypeTag::Name => "Name",
            TypeTag::Path => "Path",
            TypeTag::Vector2 => "Vector2",
            TypeTag::Vector3 => "Vector3",
            TypeTag::Rect2 => "Rect2",
            TypeTag::Transform2d => "Transform2D",
            TypeTag::Transform3d => "Transform3D",
            TypeTag::Plane => "Plane",
            TypeTag::Quat => "Quat",
            TypeTag::Aabb => "AABB",
            TypeTag::Basis => "Basis",
            TypeTag::Color => "Color",
            TypeTag::Object => "Object",
            TypeTag::ResourceId => "RID",
            TypeTag::Dictionary => "Dictionary",
            TypeTag::Array => "Array",
            TypeTag::ByteArray => "ByteArray",
            TypeTag::IntArray => "IntArray",
            TypeTag::FloatArray => "FloatArray",
            TypeTag::StringArray => "StringArray",
            TypeTag::Vector2Array => "Vector2Array",
            TypeTag::Vector3Array => "Vector3Array",
            TypeTag::ColorArray => "ColorArray",
        }
    }
}
