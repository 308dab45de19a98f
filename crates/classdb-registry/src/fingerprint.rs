//! 64-bit API fingerprint.
//!
//! The hash digests the exposed surface of one API tier so binding
//! generators can detect drift. Determinism rules: classes and their sorted
//! members are visited in byte-wise name order, never in hash-map order, and
//! every mixing step goes through the single [`fold64`] primitive. The only
//! thing the hash may depend on is the registered surface plus the version
//! string below.

use classdb_core::{fold64, hash_str64, ApiTier, Name};

use crate::registry::Registry;

/// Version string seeding the fingerprint. Bump on any change to the hash
/// algorithm itself.
pub const VERSION_FULL_CONFIG: &str = "classdb-0.1.0.official";

impl Registry {
    /// Deterministic 64-bit hash of the exposed surface of `tier`.
    pub fn api_hash(&self, tier: ApiTier) -> u64 {
        let mut acc = fold64(0, hash_str64(VERSION_FULL_CONFIG));

        let mut class_names: Vec<&Name> = self.entries.iter().map(|e| &e.name).collect();
        class_names.sort();

        for class_name in class_names {
            let Some(entry) = self.find(class_name) else {
                continue;
            };
            if entry.api != tier || !entry.exposed {
                continue;
            }

            acc = fold64(acc, entry.name.hash64());
            acc = fold64(acc, entry.inherits.hash64());

            // Methods, sorted; leading-underscore names are internals and
            // stay out of the surface.
            let mut method_names: Vec<&Name> = entry
                .methods
                .keys()
                .filter(|m| !m.as_str().starts_with('_'))
                .collect();
            method_names.sort();
            for method_name in method_names {
                let binding = &entry.methods[method_name];
                acc = fold64(acc, method_name.hash64());
                acc = fold64(acc, binding.argument_count() as u64);
                acc = fold64(acc, u8::from(binding.argument_type(-1)) as u64);
                for (i, arg) in binding.arguments().iter().enumerate() {
                    acc = fold64(acc, u8::from(arg.type_tag) as u64);
                    acc = fold64(acc, i as u64);
                    acc = fold64(acc, arg.hint as u64);
                    acc = fold64(acc, hash_str64(&arg.hint_string));
                }
                acc = fold64(acc, binding.default_argument_count() as u64);
                for default in binding.default_arguments() {
                    acc = fold64(acc, default.hash());
                }
                acc = fold64(acc, binding.flags().bits() as u64);
            }

            // Constants, sorted.
            let mut constant_names: Vec<&Name> = entry.constants.keys().collect();
            constant_names.sort();
            for constant in constant_names {
                acc = fold64(acc, constant.hash64());
                acc = fold64(acc, entry.constants[constant] as u64);
            }

            // Signals, sorted.
            let mut signal_names: Vec<&Name> = entry.signals.keys().collect();
            signal_names.sort();
            for signal_name in signal_names {
                let signal = &entry.signals[signal_name];
                acc = fold64(acc, signal_name.hash64());
                for arg in &signal.arguments {
                    acc = fold64(acc, u8::from(arg.type_tag) as u64);
                }
            }

            // Accessor-backed properties, sorted by property name.
            let mut property_names: Vec<&Name> = entry.property_setget.keys().collect();
            property_names.sort();
            for property in property_names {
                let psg = &entry.property_setget[property];
                acc = fold64(acc, property.hash64());
                acc = fold64(acc, psg.setter.hash64());
                acc = fold64(acc, psg.getter.hash64());
            }

            // The reflected property list, in declaration order.
            for prop in &entry.property_list {
                acc = fold64(acc, prop.name.hash64());
                acc = fold64(acc, u8::from(prop.type_tag) as u64);
                acc = fold64(acc, prop.hint as u64);
                acc = fold64(acc, hash_str64(&prop.hint_string));
                acc = fold64(acc, prop.usage.bits() as u64);
            }
        }

        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdb_core::{
        MethodBinding, PropertyDescriptor, PropertyHint, SignalInfo, TypeTag, Value,
    };

    fn n(s: &str) -> Name {
        Name::new(s)
    }

    fn nop(class: &str, method: &str) -> MethodBinding {
        MethodBinding::new(class, method, |_, _| Ok(Value::Nil))
    }

    /// Register the same surface, permuting member registration order (and
    /// the position of an unrelated root class) when `flipped`. Parents
    /// always precede children.
    fn populate(reg: &mut Registry, flipped: bool) {
        if !flipped {
            reg.add_class(n("Zed"), Name::none(), ApiTier::Core).unwrap();
            reg.set_class_exposed(&n("Zed"), true).unwrap();
        }
        reg.add_class(n("Alpha"), Name::none(), ApiTier::Core).unwrap();
        reg.add_class(n("Beta"), n("Alpha"), ApiTier::Core).unwrap();
        reg.set_class_exposed(&n("Alpha"), true).unwrap();
        reg.set_class_exposed(&n("Beta"), true).unwrap();

        let mut methods = [("run", "Alpha"), ("walk", "Beta")];
        if flipped {
            methods.reverse();
        }
        for (method, class) in methods {
            reg.bind_method(
                nop(class, method).with_argument(
                    PropertyDescriptor::new(TypeTag::Float, "speed")
                        .with_hint(PropertyHint::Range, "0,10"),
                ),
                vec![Value::Float(1.0)],
            )
            .unwrap();
        }
        reg.bind_integer_constant(&n("Alpha"), &Name::none(), n("LIMIT"), 99)
            .unwrap();
        reg.add_signal(&n("Alpha"), SignalInfo::new("moved")).unwrap();
        if flipped {
            reg.add_class(n("Zed"), Name::none(), ApiTier::Core).unwrap();
            reg.set_class_exposed(&n("Zed"), true).unwrap();
        }
    }

    #[test]
    fn registration_order_does_not_change_the_hash() {
        let mut a = Registry::new();
        populate(&mut a, false);
        let mut b = Registry::new();
        populate(&mut b, true);
        assert_eq!(a.api_hash(ApiTier::Core), b.api_hash(ApiTier::Core));
    }

    #[test]
    fn surface_changes_change_the_hash() {
        let mut a = Registry::new();
        populate(&mut a, false);
        let base = a.api_hash(ApiTier::Core);

        // Constant value change.
        let mut b = Registry::new();
        populate(&mut b, false);
        b.find_mut(&n("Alpha")).unwrap().constants.insert(n("LIMIT"), 100);
        assert_ne!(base, b.api_hash(ApiTier::Core));

        // Extra method.
        let mut c = Registry::new();
        populate(&mut c, false);
        c.bind_method(nop("Alpha", "jump"), Vec::new()).unwrap();
        assert_ne!(base, c.api_hash(ApiTier::Core));

        // Signal argument type.
        let mut d = Registry::new();
        populate(&mut d, false);
        d.find_mut(&n("Alpha"))
            .unwrap()
            .signals
            .get_mut(&n("moved"))
            .unwrap()
            .arguments
            .push(PropertyDescriptor::new(TypeTag::Vector2, "delta"));
        assert_ne!(base, d.api_hash(ApiTier::Core));
    }

    #[test]
    fn unexposed_and_internal_members_are_invisible() {
        let mut a = Registry::new();
        populate(&mut a, false);
        let base = a.api_hash(ApiTier::Core);

        // Unexposed class.
        let mut b = Registry::new();
        populate(&mut b, false);
        b.add_class(n("Hidden"), Name::none(), ApiTier::Core).unwrap();
        assert_eq!(base, b.api_hash(ApiTier::Core));

        // Leading-underscore method.
        let mut c = Registry::new();
        populate(&mut c, false);
        c.bind_method(nop("Alpha", "_internal_step"), Vec::new()).unwrap();
        assert_eq!(base, c.api_hash(ApiTier::Core));
    }

    #[test]
    fn tiers_hash_independently() {
        let mut reg = Registry::new();
        populate(&mut reg, false);
        let core = reg.api_hash(ApiTier::Core);

        reg.set_current_api(ApiTier::Editor);
        reg.add_class(n("Inspector"), Name::none(), ApiTier::Editor).unwrap();
        reg.set_class_exposed(&n("Inspector"), true).unwrap();

        assert_eq!(core, reg.api_hash(ApiTier::Core));
        assert_ne!(reg.api_hash(ApiTier::Editor), reg.api_hash(ApiTier::Core));
    }

    #[test]
    fn default_argument_values_are_folded() {
        let mut a = Registry::new();
        a.add_class(n("Solo"), Name::none(), ApiTier::Core).unwrap();
        a.set_class_exposed(&n("Solo"), true).unwrap();
        a.bind_method(
            nop("Solo", "act").with_argument(PropertyDescriptor::new(TypeTag::Int, "n")),
            vec![Value::Int(1)],
        )
        .unwrap();

        let mut b = Registry::new();
        b.add_class(n("Solo"), Name::none(), ApiTier::Core).unwrap();
        b.set_class_exposed(&n("Solo"), true).unwrap();
        b.bind_method(
            nop("Solo", "act").with_argument(PropertyDescriptor::new(TypeTag::Int, "n")),
            vec![Value::Int(2)],
        )
        .unwrap();

        assert_ne!(a.api_hash(ApiTier::Core), b.api_hash(ApiTier::Core));
    }
}
