//! Reflection emitter: a binding-generator view of one API tier.
//!
//! The emitter snapshots every exposed, enabled class of the requested tier
//! into plain records, plus a fixed table of opaque built-in types (core
//! tier only) and the global constants harvested from the `@` pseudo-class.
//! Any failure aborts the whole emit; partial output is never produced.

use rustc_hash::FxHashSet;
use thiserror::Error;

use classdb_core::{
    ApiTier, EnumDescriptor, MethodFlags, MethodInfo, Name, PropertyDescriptor, PropertyUsage,
    SignalInfo, TypeTag,
};

use crate::class_entry::ClassEntry;
use crate::registry::Registry;

/// Name of the pseudo-class holding global constants and enums.
pub const GLOBAL_SCOPE_CLASS: &str = "@";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    #[error("class '{0}' disappeared during reflection")]
    UnknownClass(Name),

    #[error("enum constant '{class}.{enum_name}.{constant}' has no registered value")]
    MissingEnumConstant {
        class: Name,
        enum_name: Name,
        constant: Name,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantReflection {
    pub name: Name,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumReflection {
    pub name: Name,
    pub underlying_type: Name,
    pub enumerators: Vec<ConstantReflection>,
}

/// Synthetic entry for a type the registry treats as opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinTypeReflection {
    pub name: &'static str,
    pub header: &'static str,
    pub enums: Vec<EnumReflection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyReflection {
    pub descriptor: PropertyDescriptor,
    pub setter: Name,
    pub getter: Name,
    /// Group label deduced from the nearest preceding GROUP marker whose
    /// prefix matches.
    pub group: Option<Name>,
}

/// Sibling properties sharing indexed accessors, merged into one record.
/// `children` carries each sibling's trailing path component and its index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPropertyReflection {
    pub prefix: Name,
    pub type_tag: TypeTag,
    pub setter: Name,
    pub getter: Name,
    pub children: Vec<(Name, i32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodReflection {
    pub info: MethodInfo,
    pub is_vararg: bool,
    pub is_virtual: bool,
    /// The method is consumed as a property accessor.
    pub implements_property: bool,
    /// Leading-underscore accessor: present in the surface only through the
    /// property it backs.
    pub is_internal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassReflection {
    pub name: Name,
    pub base: Name,
    pub api: ApiTier,
    pub is_singleton: bool,
    pub is_instantiable: bool,
    pub is_refcounted: bool,
    pub is_namespace: bool,
    pub header: String,
    pub properties: Vec<PropertyReflection>,
    pub indexed_properties: Vec<IndexedPropertyReflection>,
    pub methods: Vec<MethodReflection>,
    pub signals: Vec<SignalInfo>,
    pub enums: Vec<EnumReflection>,
    /// Constants not filed under any enum.
    pub constants: Vec<ConstantReflection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionData {
    pub api: ApiTier,
    pub builtin_types: Vec<BuiltinTypeReflection>,
    pub classes: Vec<ClassReflection>,
    pub global_constants: Vec<ConstantReflection>,
    pub global_enums: Vec<EnumReflection>,
}

/// Opaque built-in types with their source-header annotations. Emitted for
/// the core tier only.
const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("String", "core/string/ustring.h"),
    ("Name", "core/string/string_name.h"),
    ("Path", "core/string/node_path.h"),
    ("Vector2", "core/math/vector2.h"),
    ("Rect2", "core/math/rect2.h"),
    ("Vector3", "core/math/vector3.h"),
    ("Transform2D", "core/math/transform_2d.h"),
    ("Plane", "core/math/plane.h"),
    ("Quat", "core/math/quat.h"),
    ("AABB", "core/math/aabb.h"),
    ("Basis", "core/math/basis.h"),
    ("Transform3D", "core/math/transform_3d.h"),
    ("Color", "core/math/color.h"),
    ("RID", "core/templates/rid.h"),
    ("Dictionary", "core/variant/dictionary.h"),
    ("Array", "core/variant/array.h"),
];

fn builtin_types() -> Vec<BuiltinTypeReflection> {
    BUILTIN_TYPES
        .iter()
        .map(|(name, header)| {
            let enums = if *name == "Vector3" {
                // Synthetic axis enum attached to the 3-component vector.
                vec![EnumReflection {
                    name: Name::new("Axis"),
                    underlying_type: Name::new("int"),
                    enumerators: vec![
                        ConstantReflection { name: Name::new("X"), value: 0 },
                        ConstantReflection { name: Name::new("Y"), value: 1 },
                        ConstantReflection { name: Name::new("Z"), value: 2 },
                    ],
                }]
            } else {
                Vec::new()
            };
            BuiltinTypeReflection { name, header, enums }
        })
        .collect()
}

fn reflect_enums(entry: &ClassEntry) -> Result<Vec<EnumReflection>, ReflectError> {
    let mut out = Vec::new();
    for enum_name in &entry.enum_order {
        let Some(desc) = entry.enums.get(enum_name) else {
            continue;
        };
        out.push(reflect_enum(entry, enum_name, desc)?);
    }
    Ok(out)
}

fn reflect_enum(
    entry: &ClassEntry,
    enum_name: &Name,
    desc: &EnumDescriptor,
) -> Result<EnumReflection, ReflectError> {
    let mut enumerators = Vec::with_capacity(desc.enumerators.len());
    for constant in &desc.enumerators {
        let value = entry.constants.get(constant).copied().ok_or_else(|| {
            ReflectError::MissingEnumConstant {
                class: entry.name.clone(),
                enum_name: enum_name.clone(),
                constant: constant.clone(),
            }
        })?;
        enumerators.push(ConstantReflection {
            name: constant.clone(),
            value,
        });
    }
    Ok(EnumReflection {
        name: enum_name.clone(),
        underlying_type: desc.underlying_type.clone(),
        enumerators,
    })
}

/// Constants that are not enumerators of any enum, in registration order.
fn reflect_loose_constants(entry: &ClassEntry) -> Vec<ConstantReflection> {
    let in_enums: FxHashSet<&Name> = entry
        .enums
        .values()
        .flat_map(|d| d.enumerators.iter())
        .collect();
    entry
        .constant_order
        .iter()
        .filter(|name| !in_enums.contains(name))
        .filter_map(|name| {
            entry.constants.get(name).map(|value| ConstantReflection {
                name: name.clone(),
                value: *value,
            })
        })
        .collect()
}

impl Registry {
    /// Snapshot the exposed surface of `tier`. `singletons` marks which
    /// classes have a registered singleton; `extra_constants` is appended to
    /// the global constant table in positional order.
    pub fn emit_reflection(
        &self,
        tier: ApiTier,
        singletons: &FxHashSet<Name>,
        extra_constants: &[(Name, i64)],
    ) -> Result<ReflectionData, ReflectError> {
        let builtin_types = if tier == ApiTier::Core {
            builtin_types()
        } else {
            Vec::new()
        };

        let global_scope = Name::new(GLOBAL_SCOPE_CLASS);
        let refcounted_root = Name::new("RefCounted");

        let mut classes = Vec::new();
        for class_name in self.get_class_list() {
            if class_name == global_scope {
                continue;
            }
            let entry = self
                .find(&class_name)
                .ok_or_else(|| ReflectError::UnknownClass(class_name.clone()))?;
            if entry.api != tier || !entry.exposed || entry.disabled {
                continue;
            }
            classes.push(self.reflect_class(entry, singletons, &refcounted_root)?);
        }

        let mut global_constants = Vec::new();
        let mut global_enums = Vec::new();
        if let Some(globals) = self.find(&global_scope) {
            global_constants = reflect_loose_constants(globals);
            global_enums = reflect_enums(globals)?;
        }
        global_constants.extend(
            extra_constants
                .iter()
                .map(|(name, value)| ConstantReflection {
                    name: name.clone(),
                    value: *value,
                }),
        );

        Ok(ReflectionData {
            api: tier,
            builtin_types,
            classes,
            global_constants,
            global_enums,
        })
    }

    fn reflect_class(
        &self,
        entry: &ClassEntry,
        singletons: &FxHashSet<Name>,
        refcounted_root: &Name,
    ) -> Result<ClassReflection, ReflectError> {
        // Properties: walk the declaration-order list, tracking the active
        // group frame and collecting indexed siblings for merging.
        let mut properties = Vec::new();
        let mut indexed: Vec<IndexedPropertyReflection> = Vec::new();
        let mut current_group: Option<(Name, String)> = None;

        for prop in &entry.property_list {
            if prop.usage.contains(PropertyUsage::GROUP) {
                current_group = Some((prop.name.clone(), prop.hint_string.clone()));
                continue;
            }
            if prop.usage.contains(PropertyUsage::ARRAY) {
                // Array frames keep their marker in the plain list; the
                // element properties follow it.
                properties.push(PropertyReflection {
                    descriptor: prop.clone(),
                    setter: Name::none(),
                    getter: Name::none(),
                    group: None,
                });
                continue;
            }

            let psg = entry.property_setget.get(&prop.name);
            let (setter, getter, index) = match psg {
                Some(p) => (p.setter.clone(), p.getter.clone(), p.index),
                None => (Name::none(), Name::none(), -1),
            };

            // Indexed siblings named "prefix/child" merge into one record.
            if index >= 0 {
                if let Some((prefix, child)) = prop.name.as_str().split_once('/') {
                    let prefix = Name::new(prefix);
                    let child = Name::new(child);
                    if let Some(existing) = indexed.iter_mut().find(|r| {
                        r.prefix == prefix && r.setter == setter && r.getter == getter
                    }) {
                        existing.children.push((child, index));
                    } else {
                        indexed.push(IndexedPropertyReflection {
                            prefix,
                            type_tag: prop.type_tag,
                            setter: setter.clone(),
                            getter: getter.clone(),
                            children: vec![(child, index)],
                        });
                    }
                    continue;
                }
            }

            let group = match &current_group {
                Some((label, prefix))
                    if prefix.is_empty() || prop.name.as_str().starts_with(prefix.as_str()) =>
                {
                    Some(label.clone())
                }
                _ => None,
            };
            properties.push(PropertyReflection {
                descriptor: prop.clone(),
                setter,
                getter,
                group,
            });
        }

        // Methods: bound first in declaration order, then virtual
        // declarations.
        let mut methods = Vec::new();
        for method_name in &entry.method_order {
            let Some(binding) = entry.methods.get(method_name) else {
                continue;
            };
            let implements_property = entry.methods_in_properties.contains(method_name);
            methods.push(MethodReflection {
                info: binding.method_info(),
                is_vararg: binding.is_vararg(),
                is_virtual: false,
                implements_property,
                is_internal: method_name.as_str().starts_with('_') && implements_property,
            });
        }
        for info in &entry.virtual_methods {
            methods.push(MethodReflection {
                info: info.clone(),
                is_vararg: info.flags.contains(MethodFlags::VARARG),
                is_virtual: true,
                implements_property: false,
                is_internal: false,
            });
        }

        let signals = entry
            .signal_order
            .iter()
            .filter_map(|name| entry.signals.get(name).cloned())
            .collect();

        Ok(ClassReflection {
            name: entry.name.clone(),
            base: entry.inherits.clone(),
            api: entry.api,
            is_singleton: singletons.contains(&entry.name),
            is_instantiable: entry.can_instantiate(),
            is_refcounted: self.is_parent_class(&entry.name, refcounted_root),
            is_namespace: entry.is_namespace,
            header: entry.usage_header.clone(),
            properties,
            indexed_properties: indexed,
            methods,
            signals,
            enums: reflect_enums(entry)?,
            constants: reflect_loose_constants(entry),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdb_core::{MethodBinding, Value};

    fn n(s: &str) -> Name {
        Name::new(s)
    }

    fn nop(class: &str, method: &str) -> MethodBinding {
        MethodBinding::new(class, method, |_, _| Ok(Value::Nil))
    }

    fn int_arg(name: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(TypeTag::Int, name)
    }

    fn emitter_registry() -> Registry {
        let mut reg = Registry::new();
        reg.add_class(n("Control"), Name::none(), ApiTier::Core).unwrap();
        reg.set_class_exposed(&n("Control"), true).unwrap();

        reg.bind_method(nop("Control", "set_margin").with_arguments([
            int_arg("margin"),
            int_arg("value"),
        ]), Vec::new())
        .unwrap();
        reg.bind_method(
            nop("Control", "get_margin")
                .with_argument(int_arg("margin"))
                .with_return(PropertyDescriptor::new(TypeTag::Int, Name::none())),
            Vec::new(),
        )
        .unwrap();
        for (i, side) in ["left", "right"].iter().enumerate() {
            reg.add_property(
                &n("Control"),
                int_arg(&format!("margin/{side}")),
                n("set_margin"),
                n("get_margin"),
                i as i32,
            )
            .unwrap();
        }

        reg.bind_method(nop("Control", "set_depth").with_argument(int_arg("depth")), Vec::new())
            .unwrap();
        reg.bind_method(
            nop("Control", "get_depth")
                .with_return(PropertyDescriptor::new(TypeTag::Int, Name::none())),
            Vec::new(),
        )
        .unwrap();
        reg.add_property_group(&n("Control"), "Layout", "layout_").unwrap();
        reg.add_property(
            &n("Control"),
            int_arg("layout_depth"),
            n("set_depth"),
            n("get_depth"),
            -1,
        )
        .unwrap();

        reg.bind_integer_constant(&n("Control"), &n("Anchor"), n("ANCHOR_BEGIN"), 0)
            .unwrap();
        reg.bind_integer_constant(&n("Control"), &n("Anchor"), n("ANCHOR_END"), 1)
            .unwrap();
        reg.bind_integer_constant(&n("Control"), &Name::none(), n("NOTIFICATION_RESIZED"), 40)
            .unwrap();
        reg.add_signal(&n("Control"), SignalInfo::new("resized")).unwrap();
        reg
    }

    #[test]
    fn core_tier_carries_builtin_types_with_axis_enum() {
        let reg = emitter_registry();
        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &[])
            .unwrap();
        assert!(!data.builtin_types.is_empty());
        let vec3 = data
            .builtin_types
            .iter()
            .find(|b| b.name == "Vector3")
            .unwrap();
        assert_eq!(vec3.header, "core/math/vector3.h");
        assert_eq!(vec3.enums[0].name, n("Axis"));
        assert_eq!(vec3.enums[0].enumerators.len(), 3);

        let editor = reg
            .emit_reflection(ApiTier::Editor, &FxHashSet::default(), &[])
            .unwrap();
        assert!(editor.builtin_types.is_empty());
    }

    #[test]
    fn indexed_siblings_merge_into_one_record() {
        let reg = emitter_registry();
        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &[])
            .unwrap();
        let control = &data.classes[0];
        assert_eq!(control.indexed_properties.len(), 1);
        let merged = &control.indexed_properties[0];
        assert_eq!(merged.prefix, n("margin"));
        assert_eq!(merged.children, vec![(n("left"), 0), (n("right"), 1)]);
        // Merged siblings are not duplicated in the plain list.
        assert!(!control
            .properties
            .iter()
            .any(|p| p.descriptor.name.as_str().starts_with("margin/")));
    }

    #[test]
    fn groups_attach_to_prefixed_properties() {
        let reg = emitter_registry();
        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &[])
            .unwrap();
        let control = &data.classes[0];
        let depth = control
            .properties
            .iter()
            .find(|p| p.descriptor.name == n("layout_depth"))
            .unwrap();
        assert_eq!(depth.group, Some(n("Layout")));
        assert_eq!(depth.setter, n("set_depth"));
    }

    #[test]
    fn accessors_are_marked_on_methods() {
        let reg = emitter_registry();
        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &[])
            .unwrap();
        let control = &data.classes[0];
        let set_margin = control
            .methods
            .iter()
            .find(|m| m.info.name == n("set_margin"))
            .unwrap();
        assert!(set_margin.implements_property);
        assert!(!set_margin.is_internal);
    }

    #[test]
    fn enums_split_from_loose_constants() {
        let reg = emitter_registry();
        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &[])
            .unwrap();
        let control = &data.classes[0];
        assert_eq!(control.enums.len(), 1);
        assert_eq!(control.enums[0].name, n("Anchor"));
        assert_eq!(control.enums[0].enumerators[1].value, 1);
        assert_eq!(control.constants.len(), 1);
        assert_eq!(control.constants[0].name, n("NOTIFICATION_RESIZED"));
    }

    #[test]
    fn globals_harvested_from_pseudo_class_and_extra_table() {
        let mut reg = emitter_registry();
        reg.add_namespace(n("@"), "core/global_constants.h").unwrap();
        reg.bind_integer_constant(&n("@"), &Name::none(), n("OK"), 0).unwrap();
        reg.bind_integer_constant(&n("@"), &Name::none(), n("FAILED"), 1).unwrap();

        let extra = [(n("SPKEY"), 1 << 24)];
        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &extra)
            .unwrap();
        let names: Vec<&str> = data
            .global_constants
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["OK", "FAILED", "SPKEY"]);
        // The pseudo-class is not emitted as a class.
        assert!(!data.classes.iter().any(|c| c.name == n("@")));
    }

    #[test]
    fn unexposed_disabled_and_other_tier_classes_are_skipped() {
        let mut reg = emitter_registry();
        reg.add_class(n("Hidden"), Name::none(), ApiTier::Core).unwrap();
        reg.add_class(n("Broken"), Name::none(), ApiTier::Core).unwrap();
        reg.set_class_exposed(&n("Broken"), true).unwrap();
        reg.set_class_enabled(&n("Broken"), false).unwrap();
        reg.add_class(n("Dock"), Name::none(), ApiTier::Editor).unwrap();
        reg.set_class_exposed(&n("Dock"), true).unwrap();

        let data = reg
            .emit_reflection(ApiTier::Core, &FxHashSet::default(), &[])
            .unwrap();
        let names: Vec<&Name> = data.classes.iter().map(|c| &c.name).collect();
        assert_eq!(names, [&n("Control")]);
    }

    #[test]
    fn singleton_flag_comes_from_the_caller() {
        let reg = emitter_registry();
        let mut singles = FxHashSet::default();
        singles.insert(n("Control"));
        let data = reg.emit_reflection(ApiTier::Core, &singles, &[]).unwrap();
        assert!(data.classes[0].is_singleton);
    }
}
