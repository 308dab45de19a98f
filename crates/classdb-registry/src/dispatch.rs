//! Reflective queries and dynamic dispatch.
//!
//! Every lookup here walks the inheritance chain from the queried class to
//! its root: members declared on the class shadow nothing and ancestors are
//! reached in order. List queries return the queried class's members first,
//! then each ancestor's, preserving declaration order within a class.

use std::sync::Arc;

use classdb_core::{
    ApiTier, CallError, Instance, MethodBinding, MethodInfo, Name, PropertyDescriptor,
    SignalInfo, TypeTag, Value,
};

use crate::class_entry::{Constructor, PropertySetGet};
use crate::registry::Registry;

/// Run the setter described by an accessor record. Standalone so callers can
/// resolve under a registry lock, release it, then invoke. Virtual accessors
/// have no cached binding and dispatch through the instance's call hook.
pub fn invoke_setter(
    psg: &PropertySetGet,
    obj: &mut dyn Instance,
    value: Value,
) -> Result<(), CallError> {
    if psg.setter.is_none() {
        return Err(CallError::invalid_method());
    }
    let args = if psg.index >= 0 {
        vec![Value::Int(psg.index as i64), value]
    } else {
        vec![value]
    };
    let result = match &psg.setter_binding {
        Some(binding) => binding.invoke(obj, &args),
        None => obj.call(&psg.setter, &args),
    };
    result.map(|_| ())
}

/// Run the getter described by an accessor record. See [`invoke_setter`].
pub fn invoke_getter(psg: &PropertySetGet, obj: &mut dyn Instance) -> Result<Value, CallError> {
    if psg.getter.is_none() {
        return Err(CallError::invalid_method());
    }
    let args = if psg.index >= 0 {
        vec![Value::Int(psg.index as i64)]
    } else {
        Vec::new()
    };
    match &psg.getter_binding {
        Some(binding) => binding.invoke(obj, &args),
        None => obj.call(&psg.getter, &args),
    }
}

impl Registry {
    // === Methods ===

    /// Find a bound method on `class` or any ancestor.
    pub fn get_method(&self, class: &Name, method: &Name) -> Option<Arc<MethodBinding>> {
        self.chain(class)
            .find_map(|e| e.methods.get(method).cloned())
    }

    pub fn has_method(&self, class: &Name, method: &Name, no_inheritance: bool) -> bool {
        if no_inheritance {
            self.find(class)
                .is_some_and(|e| e.methods.contains_key(method))
        } else {
            self.get_method(class, method).is_some()
        }
    }

    /// Signatures of every reachable method: bound methods in declaration
    /// order, then virtual declarations, per class — the same ordering the
    /// reflection emitter uses. With `exclude_from_properties`, methods
    /// consumed as property accessors are omitted.
    pub fn get_method_list(
        &self,
        class: &Name,
        no_inheritance: bool,
        exclude_from_properties: bool,
    ) -> Vec<MethodInfo> {
        let mut out = Vec::new();
        for entry in self.chain(class) {
            for name in &entry.method_order {
                if exclude_from_properties && entry.methods_in_properties.contains(name) {
                    continue;
                }
                if let Some(binding) = entry.methods.get(name) {
                    out.push(binding.method_info());
                }
            }
            out.extend(entry.virtual_methods.iter().cloned());
            if no_inheritance {
                break;
            }
        }
        out
    }

    /// Signatures declared for overriding, chain-wide unless
    /// `no_inheritance`.
    pub fn get_virtual_methods(&self, class: &Name, no_inheritance: bool) -> Vec<MethodInfo> {
        let mut out = Vec::new();
        for entry in self.chain(class) {
            out.extend(entry.virtual_methods.iter().cloned());
            if no_inheritance {
                break;
            }
        }
        out
    }

    /// Virtual declaration lookup, used when a property accessor has no
    /// bound entry point.
    pub(crate) fn find_virtual_method(&self, class: &Name, method: &Name) -> Option<MethodInfo> {
        self.chain(class).find_map(|e| {
            e.virtual_methods
                .iter()
                .find(|m| m.name == *method)
                .cloned()
        })
    }

    // === Constants and enums ===

    pub fn get_integer_constant(&self, class: &Name, name: &Name) -> Option<i64> {
        self.chain(class)
            .find_map(|e| e.constants.get(name).copied())
    }

    pub fn has_integer_constant(&self, class: &Name, name: &Name) -> bool {
        self.get_integer_constant(class, name).is_some()
    }

    pub fn get_integer_constant_list(&self, class: &Name, no_inheritance: bool) -> Vec<Name> {
        let mut out = Vec::new();
        for entry in self.chain(class) {
            out.extend(entry.constant_order.iter().cloned());
            if no_inheritance {
                break;
            }
        }
        out
    }

    /// The enum a constant belongs to, if any.
    pub fn get_integer_constant_enum(
        &self,
        class: &Name,
        constant: &Name,
        no_inheritance: bool,
    ) -> Option<Name> {
        for entry in self.chain(class) {
            for (enum_name, desc) in &entry.enums {
                if desc.enumerators.contains(constant) {
                    return Some(enum_name.clone());
                }
            }
            if no_inheritance {
                break;
            }
        }
        None
    }

    pub fn get_enum_list(&self, class: &Name, no_inheritance: bool) -> Vec<Name> {
        let mut out = Vec::new();
        for entry in self.chain(class) {
            out.extend(entry.enum_order.iter().cloned());
            if no_inheritance {
                break;
            }
        }
        out
    }

    /// Constant names of an enum, in registration order. The first class in
    /// the chain that declares the enum provides them.
    pub fn get_enum_constants(
        &self,
        class: &Name,
        enum_name: &Name,
        no_inheritance: bool,
    ) -> Vec<Name> {
        for entry in self.chain(class) {
            if let Some(desc) = entry.enums.get(enum_name) {
                return desc.enumerators.clone();
            }
            if no_inheritance {
                break;
            }
        }
        Vec::new()
    }

    // === Signals ===

    pub fn has_signal(&self, class: &Name, signal: &Name) -> bool {
        self.chain(class).any(|e| e.signals.contains_key(signal))
    }

    pub fn get_signal(&self, class: &Name, signal: &Name) -> Option<SignalInfo> {
        self.chain(class)
            .find_map(|e| e.signals.get(signal).cloned())
    }

    pub fn get_signal_list(&self, class: &Name, no_inheritance: bool) -> Vec<SignalInfo> {
        let mut out = Vec::new();
        for entry in self.chain(class) {
            for name in &entry.signal_order {
                if let Some(sig) = entry.signals.get(name) {
                    out.push(sig.clone());
                }
            }
            if no_inheritance {
                break;
            }
        }
        out
    }

    // === Properties ===

    /// Reflected properties, framing markers included, declaration order per
    /// class. A validator instance may adjust each descriptor before it is
    /// returned.
    pub fn get_property_list(
        &self,
        class: &Name,
        no_inheritance: bool,
        validator: Option<&dyn Instance>,
    ) -> Vec<PropertyDescriptor> {
        let mut out = Vec::new();
        for entry in self.chain(class) {
            for prop in &entry.property_list {
                let mut prop = prop.clone();
                if let Some(obj) = validator {
                    obj.validate_property(&mut prop);
                }
                out.push(prop);
            }
            if no_inheritance {
                break;
            }
        }
        out
    }

    pub fn has_property(&self, class: &Name, property: &Name) -> bool {
        self.property_accessors(class, property).is_some()
    }

    /// Accessor record for a property, resolved through the chain. The
    /// returned record carries cheap `Arc` clones of the cached bindings, so
    /// callers can invoke accessors after releasing any registry lock.
    pub fn property_accessors(&self, class: &Name, property: &Name) -> Option<PropertySetGet> {
        self.chain(class)
            .find_map(|e| e.property_setget.get(property).cloned())
    }

    pub fn get_property_type(&self, class: &Name, property: &Name) -> Option<TypeTag> {
        self.property_accessors(class, property).map(|p| p.type_tag)
    }

    /// Index the accessors are called with, for indexed properties.
    pub fn get_property_index(&self, class: &Name, property: &Name) -> Option<i32> {
        self.property_accessors(class, property)
            .map(|p| p.index)
            .filter(|i| *i >= 0)
    }

    pub fn get_property_setter(&self, class: &Name, property: &Name) -> Option<Name> {
        self.property_accessors(class, property)
            .map(|p| p.setter)
            .filter(|s| !s.is_none())
    }

    pub fn get_property_getter(&self, class: &Name, property: &Name) -> Option<Name> {
        self.property_accessors(class, property)
            .map(|p| p.getter)
            .filter(|g| !g.is_none())
    }

    /// Write a property through its setter. `None` when no class in the
    /// chain declares the property; `Some(Err(..))` when it exists but the
    /// write failed (read-only, or the setter rejected the value).
    pub fn set_property(
        &self,
        obj: &mut dyn Instance,
        property: &Name,
        value: Value,
    ) -> Option<Result<(), CallError>> {
        let class = obj.class_name();
        let psg = self.property_accessors(&class, property)?;
        Some(invoke_setter(&psg, obj, value))
    }

    /// Read a property through its getter, falling back to the integer
    /// constant tables. `None` when the name is neither a property nor a
    /// constant anywhere in the chain; `Some(Err(..))` when the property
    /// exists but is write-only or its getter failed. The most derived
    /// declaration answers, mirroring `set_property`.
    pub fn get_property(
        &self,
        obj: &mut dyn Instance,
        property: &Name,
    ) -> Option<Result<Value, CallError>> {
        let class = obj.class_name();
        for entry in self.chain(&class) {
            if let Some(psg) = entry.property_setget.get(property) {
                return Some(invoke_getter(psg, obj));
            }
            if let Some(v) = entry.constants.get(property) {
                return Some(Ok(Value::Int(*v)));
            }
        }
        None
    }

    // === Instantiation ===

    /// Whether `instance` would succeed for `class`. Editor-tier classes
    /// are only instantiable when `editor_hint` is set.
    pub fn can_instance(&self, class: &Name, editor_hint: bool) -> bool {
        self.find(class).is_some_and(|e| {
            e.can_instantiate() && (e.api != ApiTier::Editor || editor_hint)
        })
    }

    /// Resolve the constructor for `class`, consulting the compatibility
    /// remap when the name is not registered or its entry cannot produce
    /// instances (disabled, namespace, or constructor-less). Callers invoke
    /// the returned constructor after releasing any registry lock, so
    /// construction can re-enter the registry.
    pub fn resolve_constructor(&self, class: &Name, editor_hint: bool) -> Option<Constructor> {
        let mut entry = self.find(class);
        if entry.map_or(true, |e| !e.can_instantiate()) {
            if let Some(target) = self.compat.get(class) {
                entry = self.find(target);
            }
        }
        let entry = entry?;
        if !entry.can_instantiate() {
            return None;
        }
        if entry.api == ApiTier::Editor && !editor_hint {
            return None;
        }
        entry.constructor.clone()
    }

    /// Construct an instance directly. Single-threaded convenience; the
    /// locked facade resolves and constructs in two steps instead.
    pub fn instance(&self, class: &Name, editor_hint: bool) -> Option<Box<dyn Instance>> {
        self.resolve_constructor(class, editor_hint)
            .map(|ctor| ctor())
    }

    // === Default-value cache ===

    pub fn is_defaults_cached(&self, class: &Name) -> bool {
        self.defaults_cached.contains(class)
    }

    pub fn mark_defaults_cached(&mut self, class: Name) {
        self.defaults_cached.insert(class);
    }

    pub fn cached_default_property_value(&self, class: &Name, property: &Name) -> Option<Value> {
        self.defaults.get(class)?.get(property).cloned()
    }
}
