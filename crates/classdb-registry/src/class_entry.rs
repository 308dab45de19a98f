//! Per-class registry record.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use classdb_core::{
    ApiTier, EnumDescriptor, Instance, MethodBinding, MethodInfo, Name, PropertyDescriptor,
    SignalInfo, TypeTag,
};

/// Index of a class in the registry arena. Stable for the life of the
/// registry; classes are never removed individually.
pub type ClassId = u32;

/// Factory for instances of a registered class.
pub type Constructor = Arc<dyn Fn() -> Box<dyn Instance> + Send + Sync>;

/// Accessor pair backing one reflected property.
///
/// Bindings are resolved once, at property registration, so dispatch never
/// walks the method tables. `index` >= 0 means the accessors take a leading
/// index argument (one backing method serving several properties).
#[derive(Debug, Clone)]
pub struct PropertySetGet {
    pub setter: Name,
    pub getter: Name,
    pub setter_binding: Option<Arc<MethodBinding>>,
    pub getter_binding: Option<Arc<MethodBinding>>,
    pub index: i32,
    pub type_tag: TypeTag,
}

/// Everything the registry knows about one class.
///
/// Member maps are paired with declaration-order vectors: lookups go through
/// the map, list queries and the fingerprint's property fold walk the order
/// vectors.
pub struct ClassEntry {
    pub name: Name,
    /// Parent class name; `Name::none()` at a hierarchy root.
    pub inherits: Name,
    /// Arena index of the parent entry.
    pub parent: Option<ClassId>,
    pub api: ApiTier,
    /// Whether the class participates in reflection and the fingerprint.
    pub exposed: bool,
    /// Disabled classes cannot be instantiated.
    pub disabled: bool,
    /// Namespace entries hold constants and enums but no instances.
    pub is_namespace: bool,
    pub constructor: Option<Constructor>,

    pub methods: FxHashMap<Name, Arc<MethodBinding>>,
    pub method_order: Vec<Name>,
    /// Declared-for-override signatures; these have no native entry point.
    pub virtual_methods: Vec<MethodInfo>,

    pub constants: FxHashMap<Name, i64>,
    pub constant_order: Vec<Name>,
    /// Enum name -> descriptor; constant values live in `constants`.
    pub enums: FxHashMap<Name, EnumDescriptor>,
    pub enum_order: Vec<Name>,

    pub signals: FxHashMap<Name, SignalInfo>,
    pub signal_order: Vec<Name>,

    /// Reflected properties in declaration order, framing markers included.
    pub property_list: Vec<PropertyDescriptor>,
    pub property_setget: FxHashMap<Name, PropertySetGet>,
    /// Methods consumed as property accessors, for the
    /// `exclude_from_properties` method-list filter.
    pub methods_in_properties: FxHashSet<Name>,

    /// Source header annotation carried into reflection output.
    pub usage_header: String,
}

impl ClassEntry {
    pub fn new(name: Name, inherits: Name, parent: Option<ClassId>, api: ApiTier) -> Self {
        Self {
            name,
            inherits,
            parent,
            api,
            exposed: false,
            disabled: false,
            is_namespace: false,
            constructor: None,
            methods: FxHashMap::default(),
            method_order: Vec::new(),
            virtual_methods: Vec::new(),
            constants: FxHashMap::default(),
            constant_order: Vec::new(),
            enums: FxHashMap::default(),
            enum_order: Vec::new(),
            signals: FxHashMap::default(),
            signal_order: Vec::new(),
            property_list: Vec::new(),
            property_setget: FxHashMap::default(),
            methods_in_properties: FxHashSet::default(),
            usage_header: String::new(),
        }
    }

    pub fn can_instantiate(&self) -> bool {
        !self.disabled && !self.is_namespace && self.constructor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_cannot_instantiate() {
        let e = ClassEntry::new(Name::new("Thing"), Name::none(), None, ApiTier::Core);
        assert!(!e.can_instantiate());
        assert!(e.methods.is_empty());
    }

    #[test]
    fn constructor_enables_instantiation() {
        let mut e = ClassEntry::new(Name::new("Thing"), Name::none(), None, ApiTier::Core);
        e.constructor = Some(Arc::new(|| -> Box<dyn Instance> {
            unreachable!("not constructed in this test")
        }));
        assert!(e.can_instantiate());
        e.disabled = true;
        assert!(!e.can_instantiate());
    }
}
