//! Member registration: methods, properties, signals, constants, enums.
//!
//! All of these run during startup registration, under the facade's write
//! lock. Failures are hard errors; a half-registered member is never left
//! behind.

use std::sync::Arc;

use classdb_core::{
    EnumDescriptor, MethodBinding, MethodFlags, MethodInfo, Name, PropertyDescriptor,
    RegistrationError, SignalInfo, Value,
};

use crate::class_entry::PropertySetGet;
use crate::registry::Registry;

/// Strip a leading "Class." qualifier from an enum name, so constants can be
/// registered with their fully qualified source name.
fn unqualified_enum_name(name: &Name) -> Name {
    match name.as_str().split_once('.') {
        Some((_, tail)) => Name::new(tail),
        None => name.clone(),
    }
}

impl Registry {
    // === Methods ===

    /// Bind a native method on the class named by the binding, with default
    /// values for its trailing `defaults.len()` parameters (given left to
    /// right). The class must already be registered.
    pub fn bind_method(
        &mut self,
        mut binding: MethodBinding,
        defaults: Vec<Value>,
    ) -> Result<Arc<MethodBinding>, RegistrationError> {
        let class = binding.instance_class().clone();
        let method = binding.name().clone();
        if defaults.len() > binding.argument_count() {
            return Err(RegistrationError::TooManyDefaults {
                class,
                method,
                defaults: defaults.len(),
                arity: binding.argument_count(),
            });
        }
        binding.set_default_arguments(defaults);

        let entry = self.require_mut(&class)?;
        if entry.methods.contains_key(&method) {
            return Err(RegistrationError::DuplicateMethod { class, method });
        }
        let binding = Arc::new(binding);
        entry.methods.insert(method.clone(), Arc::clone(&binding));
        entry.method_order.push(method);
        Ok(binding)
    }

    /// Bind a method that accepts any number of arguments. The VARARG flag
    /// is forced on; arity and type checks are skipped at call time.
    pub fn bind_vararg_method(
        &mut self,
        binding: MethodBinding,
    ) -> Result<Arc<MethodBinding>, RegistrationError> {
        let flags = binding.flags() | MethodFlags::VARARG;
        self.bind_method(binding.with_flags(flags), Vec::new())
    }

    /// Declare a signature for subclasses to override. Virtual methods have
    /// no entry point and are listed separately from bound methods.
    pub fn add_virtual_method(
        &mut self,
        class: &Name,
        mut info: MethodInfo,
    ) -> Result<(), RegistrationError> {
        info.flags |= MethodFlags::VIRTUAL;
        self.require_mut(class)?.virtual_methods.push(info);
        Ok(())
    }

    /// Replace the flags of an already-bound method. Accessor caches made
    /// before this call keep dispatching through the old flags, so flag
    /// changes belong before property registration.
    pub fn set_method_flags(
        &mut self,
        class: &Name,
        method: &Name,
        flags: MethodFlags,
    ) -> Result<(), RegistrationError> {
        let entry = self.require_mut(class)?;
        let Some(existing) = entry.methods.get(method) else {
            return Err(RegistrationError::UnknownMethod {
                class: class.clone(),
                method: method.clone(),
            });
        };
        let mut updated = MethodBinding::clone(existing);
        updated.set_flags(flags);
        let updated = Arc::new(updated);
        entry.methods.insert(method.clone(), Arc::clone(&updated));
        for psg in entry.property_setget.values_mut() {
            if psg.setter == *method {
                psg.setter_binding = Some(Arc::clone(&updated));
            }
            if psg.getter == *method {
                psg.getter_binding = Some(Arc::clone(&updated));
            }
        }
        Ok(())
    }

    // === Signals ===

    /// Declare a signal. The name must be free on the class and on every
    /// ancestor; a collision reports which ancestor owns it.
    pub fn add_signal(&mut self, class: &Name, signal: SignalInfo) -> Result<(), RegistrationError> {
        self.require(class)?;
        if let Some(owner) = self
            .chain(class)
            .find(|e| e.signals.contains_key(&signal.name))
        {
            return Err(RegistrationError::DuplicateSignal {
                class: class.clone(),
                signal: signal.name.clone(),
                owner: owner.name.clone(),
            });
        }
        let entry = self.require_mut(class)?;
        entry.signal_order.push(signal.name.clone());
        entry.signals.insert(signal.name.clone(), signal);
        Ok(())
    }

    // === Properties ===

    /// Open a named group in the class's property list. Properties that
    /// follow and share `prefix` present under the group.
    pub fn add_property_group(
        &mut self,
        class: &Name,
        label: impl Into<Name>,
        prefix: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        self.require_mut(class)?
            .property_list
            .push(PropertyDescriptor::group(label, prefix));
        Ok(())
    }

    /// Open a fixed-size array frame of `count` elements in the class's
    /// property list.
    pub fn add_property_array(
        &mut self,
        class: &Name,
        label: impl Into<Name>,
        prefix: impl Into<String>,
        count: u32,
    ) -> Result<(), RegistrationError> {
        self.require_mut(class)?
            .property_list
            .push(PropertyDescriptor::array(label, prefix, count));
        Ok(())
    }

    /// Register a reflected property backed by accessor methods.
    ///
    /// Accessors may live on the class or any ancestor. Bound accessors are
    /// resolved and cached now, so dispatch never searches the method
    /// tables; an accessor that is only a virtual declaration is accepted
    /// too and dispatches through the instance's `call` hook instead. An
    /// empty setter name makes the property read-only; an empty getter makes
    /// it write-only. `index` >= 0 selects indexed accessors, which take the
    /// index as a leading argument.
    pub fn add_property(
        &mut self,
        class: &Name,
        property: PropertyDescriptor,
        setter: Name,
        getter: Name,
        index: i32,
    ) -> Result<(), RegistrationError> {
        let entry = self.require(class)?;
        if entry.property_setget.contains_key(&property.name) {
            return Err(RegistrationError::DuplicateProperty {
                class: class.clone(),
                property: property.name.clone(),
            });
        }

        let accessor_args = if index >= 0 { 1 } else { 0 };

        let setter_binding = if setter.is_none() {
            None
        } else {
            match self.get_method(class, &setter) {
                Some(binding) => {
                    let expected = 1 + accessor_args;
                    if binding.argument_count() != expected {
                        return Err(RegistrationError::SetterArity {
                            class: class.clone(),
                            property: property.name.clone(),
                            setter: setter.clone(),
                            found: binding.argument_count(),
                            expected,
                        });
                    }
                    Some(binding)
                }
                None => {
                    if self.find_virtual_method(class, &setter).is_none() {
                        return Err(RegistrationError::MissingSetter {
                            class: class.clone(),
                            property: property.name.clone(),
                            setter: setter.clone(),
                        });
                    }
                    None
                }
            }
        };

        let getter_binding = if getter.is_none() {
            None
        } else {
            match self.get_method(class, &getter) {
                Some(binding) => {
                    let expected = accessor_args;
                    if binding.argument_count() != expected {
                        return Err(RegistrationError::GetterArity {
                            class: class.clone(),
                            property: property.name.clone(),
                            getter: getter.clone(),
                            found: binding.argument_count(),
                            expected,
                        });
                    }
                    Some(binding)
                }
                None => {
                    if self.find_virtual_method(class, &getter).is_none() {
                        return Err(RegistrationError::MissingGetter {
                            class: class.clone(),
                            property: property.name.clone(),
                            getter: getter.clone(),
                        });
                    }
                    None
                }
            }
        };

        let psg = PropertySetGet {
            setter: setter.clone(),
            getter: getter.clone(),
            setter_binding,
            getter_binding,
            index,
            type_tag: property.type_tag,
        };

        let entry = self.require_mut(class)?;
        if !setter.is_none() {
            entry.methods_in_properties.insert(setter);
        }
        if !getter.is_none() {
            entry.methods_in_properties.insert(getter);
        }
        entry.property_setget.insert(property.name.clone(), psg);
        entry.property_list.push(property);
        Ok(())
    }

    /// Seed the default-value cache directly, bypassing instantiation. Used
    /// for properties whose getter cannot run outside a full engine.
    pub fn set_property_default_value(
        &mut self,
        class: &Name,
        property: Name,
        value: Value,
    ) -> Result<(), RegistrationError> {
        self.require(class)?;
        self.defaults
            .entry(class.clone())
            .or_default()
            .insert(property, value);
        Ok(())
    }

    // === Constants and enums ===

    /// Register an integer constant. A non-empty `enum_name` files it under
    /// that enum as well; "Class.Enum" qualifiers are stripped.
    pub fn bind_integer_constant(
        &mut self,
        class: &Name,
        enum_name: &Name,
        name: Name,
        value: i64,
    ) -> Result<(), RegistrationError> {
        let entry = self.require_mut(class)?;
        if entry.constants.contains_key(&name) {
            return Err(RegistrationError::DuplicateConstant {
                class: class.clone(),
                constant: name,
            });
        }
        entry.constants.insert(name.clone(), value);
        entry.constant_order.push(name.clone());

        if !enum_name.is_none() {
            let enum_name = unqualified_enum_name(enum_name);
            if !entry.enums.contains_key(&enum_name) {
                entry.enum_order.push(enum_name.clone());
                entry
                    .enums
                    .insert(enum_name.clone(), EnumDescriptor::new("int"));
            }
            if let Some(desc) = entry.enums.get_mut(&enum_name) {
                desc.enumerators.push(name);
            }
        }
        Ok(())
    }

    /// Pre-declare an enum with an explicit underlying type, before any of
    /// its constants are bound.
    pub fn register_enum_type(
        &mut self,
        class: &Name,
        enum_name: &Name,
        underlying: Name,
    ) -> Result<(), RegistrationError> {
        let enum_name = unqualified_enum_name(enum_name);
        let entry = self.require_mut(class)?;
        if entry.enums.contains_key(&enum_name) {
            return Err(RegistrationError::DuplicateEnum {
                class: class.clone(),
                enum_name,
            });
        }
        entry.enum_order.push(enum_name.clone());
        entry
            .enums
            .insert(enum_name, EnumDescriptor::new(underlying));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdb_core::{ApiTier, Instance, TypeTag};
    use std::any::Any;

    fn n(s: &str) -> Name {
        Name::new(s)
    }

    struct Widget {
        width: i64,
    }

    impl Instance for Widget {
        fn class_name(&self) -> Name {
            n("Widget")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn width_accessors(reg: &mut Registry) {
        reg.bind_method(
            MethodBinding::new("Widget", "set_width", |inst, args| {
                let w = inst.as_any_mut().downcast_mut::<Widget>().unwrap();
                if let Value::Int(v) = args[0] {
                    w.width = v;
                }
                Ok(Value::Nil)
            })
            .with_argument(PropertyDescriptor::new(TypeTag::Int, "width")),
            Vec::new(),
        )
        .unwrap();
        reg.bind_method(
            MethodBinding::new("Widget", "get_width", |inst, _| {
                let w = inst.as_any_mut().downcast_mut::<Widget>().unwrap();
                Ok(Value::Int(w.width))
            })
            .with_return(PropertyDescriptor::new(TypeTag::Int, Name::none())),
            Vec::new(),
        )
        .unwrap();
    }

    fn widget_registry() -> Registry {
        let mut reg = Registry::new();
        reg.add_class(n("Widget"), Name::none(), ApiTier::Core).unwrap();
        reg
    }

    #[test]
    fn bind_method_rejects_unknown_class() {
        let mut reg = Registry::new();
        let err = reg
            .bind_method(
                MethodBinding::new("Ghost", "boo", |_, _| Ok(Value::Nil)),
                Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err, RegistrationError::UnknownClass(n("Ghost")));
    }

    #[test]
    fn bind_method_rejects_duplicates() {
        let mut reg = widget_registry();
        width_accessors(&mut reg);
        let err = reg
            .bind_method(
                MethodBinding::new("Widget", "get_width", |_, _| Ok(Value::Nil)),
                Vec::new(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateMethod {
                class: n("Widget"),
                method: n("get_width"),
            }
        );
    }

    #[test]
    fn bind_method_rejects_excess_defaults() {
        let mut reg = widget_registry();
        let err = reg
            .bind_method(
                MethodBinding::new("Widget", "nop", |_, _| Ok(Value::Nil)),
                vec![Value::Int(1)],
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::TooManyDefaults { .. }));
    }

    #[test]
    fn vararg_binding_forces_flag() {
        let mut reg = widget_registry();
        let b = reg
            .bind_vararg_method(MethodBinding::new("Widget", "emit", |_, args| {
                Ok(Value::Int(args.len() as i64))
            }))
            .unwrap();
        assert!(b.is_vararg());
    }

    #[test]
    fn add_property_resolves_and_caches_accessors() {
        let mut reg = widget_registry();
        width_accessors(&mut reg);
        reg.add_property(
            &n("Widget"),
            PropertyDescriptor::new(TypeTag::Int, "width"),
            n("set_width"),
            n("get_width"),
            -1,
        )
        .unwrap();
        let entry = reg.find(&n("Widget")).unwrap();
        let psg = entry.property_setget.get(&n("width")).unwrap();
        assert!(psg.setter_binding.is_some());
        assert!(psg.getter_binding.is_some());
        assert!(entry.methods_in_properties.contains(&n("set_width")));
    }

    #[test]
    fn add_property_checks_accessor_arity() {
        let mut reg = widget_registry();
        width_accessors(&mut reg);
        // Indexed accessors need one extra leading argument.
        let err = reg
            .add_property(
                &n("Widget"),
                PropertyDescriptor::new(TypeTag::Int, "margin_left"),
                n("set_width"),
                n("get_width"),
                0,
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::SetterArity { expected: 2, .. }));
    }

    #[test]
    fn add_property_rejects_missing_accessor() {
        let mut reg = widget_registry();
        let err = reg
            .add_property(
                &n("Widget"),
                PropertyDescriptor::new(TypeTag::Int, "width"),
                n("set_width"),
                Name::none(),
                -1,
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingSetter { .. }));
    }

    #[test]
    fn signal_collision_reports_owning_ancestor() {
        let mut reg = Registry::new();
        reg.add_class(n("Base"), Name::none(), ApiTier::Core).unwrap();
        reg.add_class(n("Derived"), n("Base"), ApiTier::Core).unwrap();
        reg.add_signal(&n("Base"), SignalInfo::new("changed")).unwrap();
        let err = reg
            .add_signal(&n("Derived"), SignalInfo::new("changed"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateSignal {
                class: n("Derived"),
                signal: n("changed"),
                owner: n("Base"),
            }
        );
    }

    #[test]
    fn integer_constants_group_into_enums() {
        let mut reg = widget_registry();
        reg.bind_integer_constant(&n("Widget"), &n("Widget.Mode"), n("MODE_FAST"), 0)
            .unwrap();
        reg.bind_integer_constant(&n("Widget"), &n("Mode"), n("MODE_SLOW"), 1)
            .unwrap();
        reg.bind_integer_constant(&n("Widget"), &Name::none(), n("MAX_DEPTH"), 8)
            .unwrap();

        let entry = reg.find(&n("Widget")).unwrap();
        let desc = entry.enums.get(&n("Mode")).unwrap();
        assert_eq!(desc.enumerators, vec![n("MODE_FAST"), n("MODE_SLOW")]);
        assert_eq!(entry.constants.get(&n("MAX_DEPTH")), Some(&8));
        assert_eq!(
            entry.constant_order,
            vec![n("MODE_FAST"), n("MODE_SLOW"), n("MAX_DEPTH")]
        );
    }

    #[test]
    fn duplicate_constant_is_rejected() {
        let mut reg = widget_registry();
        reg.bind_integer_constant(&n("Widget"), &Name::none(), n("MAX"), 1)
            .unwrap();
        let err = reg
            .bind_integer_constant(&n("Widget"), &Name::none(), n("MAX"), 2)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateConstant { .. }));
    }

    #[test]
    fn enum_type_registration_sets_underlying_type() {
        let mut reg = widget_registry();
        reg.register_enum_type(&n("Widget"), &n("Widget.Mode"), n("u8"))
            .unwrap();
        reg.bind_integer_constant(&n("Widget"), &n("Mode"), n("MODE_FAST"), 0)
            .unwrap();
        let entry = reg.find(&n("Widget")).unwrap();
        assert_eq!(entry.enums.get(&n("Mode")).unwrap().underlying_type, n("u8"));
        let err = reg
            .register_enum_type(&n("Widget"), &n("Mode"), n("u8"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateEnum { .. }));
    }
}
