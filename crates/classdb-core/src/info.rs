//! Reflective member descriptors.
//!
//! These records are what queries hand back to callers: they describe
//! properties, methods, signals and enums without exposing any registry
//! internals.

use crate::flags::{MethodFlags, PropertyHint, PropertyUsage};
use crate::name::Name;
use crate::type_tag::TypeTag;
use crate::value::Value;

/// Description of a property, a method argument, or a return slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: Name,
    pub type_tag: TypeTag,
    /// For `Object`-typed slots, the required class.
    pub class_name: Name,
    pub hint: PropertyHint,
    pub hint_string: String,
    pub usage: PropertyUsage,
    /// Set on ARRAY framing markers: how many elements the array frames.
    pub element_count: Option<u32>,
}

impl PropertyDescriptor {
    pub fn new(type_tag: TypeTag, name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            type_tag,
            class_name: Name::none(),
            hint: PropertyHint::None,
            hint_string: String::new(),
            usage: PropertyUsage::DEFAULT,
            element_count: None,
        }
    }

    /// An unnamed Nil slot: the descriptor of a `void` return.
    pub fn nil() -> Self {
        Self::new(TypeTag::Nil, Name::none())
    }

    /// A Nil slot that accepts any value.
    pub fn variant(name: impl Into<Name>) -> Self {
        let mut p = Self::new(TypeTag::Nil, name);
        p.usage |= PropertyUsage::NIL_IS_VARIANT;
        p
    }

    /// An `Object` slot restricted to `class`.
    pub fn object(name: impl Into<Name>, class: impl Into<Name>) -> Self {
        let mut p = Self::new(TypeTag::Object, name);
        p.class_name = class.into();
        p
    }

    /// A group framing marker. Properties that follow and share `prefix`
    /// are presented under `label`.
    pub fn group(label: impl Into<Name>, prefix: impl Into<String>) -> Self {
        let mut p = Self::new(TypeTag::Nil, label);
        p.hint_string = prefix.into();
        p.usage = PropertyUsage::GROUP;
        p
    }

    /// An array framing marker covering `count` elements.
    pub fn array(label: impl Into<Name>, prefix: impl Into<String>, count: u32) -> Self {
        let mut p = Self::new(TypeTag::Nil, label);
        p.hint_string = prefix.into();
        p.usage = PropertyUsage::ARRAY;
        p.element_count = Some(count);
        p
    }

    pub fn with_hint(mut self, hint: PropertyHint, hint_string: impl Into<String>) -> Self {
        self.hint = hint;
        self.hint_string = hint_string.into();
        self
    }

    pub fn with_usage(mut self, usage: PropertyUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_class_name(mut self, class: impl Into<Name>) -> Self {
        self.class_name = class.into();
        self
    }

    /// True for GROUP/ARRAY markers, which frame the list rather than
    /// describe a real property.
    pub fn is_framing_marker(&self) -> bool {
        self.usage
            .intersects(PropertyUsage::GROUP | PropertyUsage::ARRAY)
    }
}

/// Description of a callable member. Signals reuse this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: Name,
    pub return_val: PropertyDescriptor,
    pub arguments: Vec<PropertyDescriptor>,
    /// Defaults for the trailing arguments, left to right.
    pub default_arguments: Vec<Value>,
    pub flags: MethodFlags,
    pub id: u32,
}

impl MethodInfo {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            return_val: PropertyDescriptor::nil(),
            arguments: Vec::new(),
            default_arguments: Vec::new(),
            flags: MethodFlags::DEFAULT,
            id: 0,
        }
    }

    pub fn with_return(mut self, return_val: PropertyDescriptor) -> Self {
        self.return_val = return_val;
        self
    }

    pub fn with_argument(mut self, arg: PropertyDescriptor) -> Self {
        self.arguments.push(arg);
        self
    }

    pub fn with_arguments(mut self, args: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        self.arguments.extend(args);
        self
    }

    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A signal declaration: a name plus the argument list it is emitted with.
pub type SignalInfo = MethodInfo;

/// A named integer enumeration registered on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Underlying integer type name, e.g. "int".
    pub underlying_type: Name,
    /// Constant names in registration order. Values live in the class
    /// constant table.
    pub enumerators: Vec<Name>,
}

impl EnumDescriptor {
    pub fn new(underlying_type: impl Into<Name>) -> Self {
        Self {
            underlying_type: underlying_type.into(),
            enumerators: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_marker_is_framing() {
        let g = PropertyDescriptor::group("Margins", "margin_");
        assert!(g.is_framing_marker());
        assert_eq!(g.hint_string, "margin_");
        assert!(!PropertyDescriptor::new(TypeTag::Int, "depth").is_framing_marker());
    }

    #[test]
    fn array_marker_carries_element_count() {
        let a = PropertyDescriptor::array("Items", "item_", 4);
        assert!(a.is_framing_marker());
        assert_eq!(a.element_count, Some(4));
    }

    #[test]
    fn method_info_builder() {
        let m = MethodInfo::new("travel")
            .with_return(PropertyDescriptor::new(TypeTag::Bool, Name::none()))
            .with_argument(PropertyDescriptor::new(TypeTag::Vector2, "target"))
            .with_flags(MethodFlags::CONST);
        assert_eq!(m.arguments.len(), 1);
        assert_eq!(m.return_val.type_tag, TypeTag::Bool);
        assert!(m.flags.contains(MethodFlags::CONST));
    }
}
