//! Process-wide, reader-writer-locked registry facade.
//!
//! One lock protects the whole registry. Registration takes the writer lock
//! exactly once per class: `register_class::<T>()` acquires it, then runs
//! `T::initialize_class` against the non-locking `Registry` entry points, so
//! registration hooks never re-enter the lock. Dispatch paths resolve under
//! the reader lock and release it before running external code
//! (constructors, accessors, the call hook), which keeps re-entrant use of
//! the facade from inside that code safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};

use classdb_core::{
    ApiTier, CallError, Instance, MethodBinding, MethodFlags, MethodInfo, Name,
    PropertyDescriptor, PropertyUsage, RegistrationError, SignalInfo, TypeTag, Value,
};
use classdb_registry::{
    invoke_getter, invoke_setter, Constructor, ReflectError, ReflectionData, Registry,
};

use crate::registrable::Registrable;

pub struct ClassDb {
    registry: RwLock<Registry>,
    /// External singleton instances, consulted by the default-value cache
    /// before constructing a transient object.
    singletons: Mutex<FxHashMap<Name, Box<dyn Instance + Send>>>,
    /// Tooling predicate gating editor-tier instantiation.
    editor_hint: AtomicBool,
}

static GLOBAL: Lazy<ClassDb> = Lazy::new(ClassDb::new);

impl Default for ClassDb {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassDb {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            singletons: Mutex::new(FxHashMap::default()),
            editor_hint: AtomicBool::new(false),
        }
    }

    /// The process-scoped instance.
    pub fn global() -> &'static ClassDb {
        &GLOBAL
    }

    // === Tooling predicate ===

    pub fn set_editor_hint(&self, hint: bool) {
        self.editor_hint.store(hint, Ordering::SeqCst);
    }

    pub fn editor_hint(&self) -> bool {
        self.editor_hint.load(Ordering::SeqCst)
    }

    // === API tier ===

    pub fn set_current_api(&self, api: ApiTier) {
        self.registry.write().set_current_api(api);
    }

    pub fn current_api(&self) -> ApiTier {
        self.registry.read().current_api()
    }

    // === Class registration ===

    /// Register `T` as an instantiable, exposed class at the current API
    /// tier. The parent named by `T::parent_class_name()` must already be
    /// registered.
    pub fn register_class<T: Registrable>(&self) -> Result<(), RegistrationError> {
        let ctor: Constructor = Arc::new(T::construct);
        self.register_with::<T>(Some(ctor))
    }

    /// Register `T` as exposed but not instantiable: it exists so
    /// descendants can inherit its members.
    pub fn register_virtual_class<T: Registrable>(&self) -> Result<(), RegistrationError> {
        self.register_with::<T>(None)
    }

    /// Register `T` with its custom-state constructor.
    pub fn register_custom_instance_class<T: Registrable>(&self) -> Result<(), RegistrationError> {
        let ctor: Constructor = Arc::new(T::construct_custom);
        self.register_with::<T>(Some(ctor))
    }

    fn register_with<T: Registrable>(
        &self,
        constructor: Option<Constructor>,
    ) -> Result<(), RegistrationError> {
        let class = <T as Registrable>::class_name();
        let mut reg = self.registry.write();
        let api = reg.current_api();
        reg.add_class(class.clone(), T::parent_class_name(), api)?;
        T::initialize_class(&mut reg)?;
        reg.set_class_exposed(&class, true)?;
        reg.set_class_constructor(&class, constructor)?;
        Ok(())
    }

    pub fn add_namespace(
        &self,
        name: Name,
        header: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        self.registry.write().add_namespace(name, header)?;
        Ok(())
    }

    pub fn set_class_enabled(&self, class: &Name, enabled: bool) -> Result<(), RegistrationError> {
        self.registry.write().set_class_enabled(class, enabled)
    }

    // === Member registration ===
    //
    // Locked wrappers over the registry entry points, for members bound
    // outside an `initialize_class` hook.

    pub fn bind_method(
        &self,
        binding: MethodBinding,
        defaults: Vec<Value>,
    ) -> Result<Arc<MethodBinding>, RegistrationError> {
        self.registry.write().bind_method(binding, defaults)
    }

    pub fn bind_vararg_method(
        &self,
        binding: MethodBinding,
    ) -> Result<Arc<MethodBinding>, RegistrationError> {
        self.registry.write().bind_vararg_method(binding)
    }

    pub fn add_virtual_method(
        &self,
        class: &Name,
        info: MethodInfo,
    ) -> Result<(), RegistrationError> {
        self.registry.write().add_virtual_method(class, info)
    }

    pub fn set_method_flags(
        &self,
        class: &Name,
        method: &Name,
        flags: MethodFlags,
    ) -> Result<(), RegistrationError> {
        self.registry.write().set_method_flags(class, method, flags)
    }

    pub fn add_signal(&self, class: &Name, signal: SignalInfo) -> Result<(), RegistrationError> {
        self.registry.write().add_signal(class, signal)
    }

    pub fn add_property(
        &self,
        class: &Name,
        property: PropertyDescriptor,
        setter: Name,
        getter: Name,
    ) -> Result<(), RegistrationError> {
        self.registry
            .write()
            .add_property(class, property, setter, getter, -1)
    }

    pub fn add_property_indexed(
        &self,
        class: &Name,
        property: PropertyDescriptor,
        setter: Name,
        getter: Name,
        index: i32,
    ) -> Result<(), RegistrationError> {
        self.registry
            .write()
            .add_property(class, property, setter, getter, index)
    }

    pub fn add_property_group(
        &self,
        class: &Name,
        label: impl Into<Name>,
        prefix: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        self.registry.write().add_property_group(class, label, prefix)
    }

    pub fn add_property_array(
        &self,
        class: &Name,
        label: impl Into<Name>,
        prefix: impl Into<String>,
        count: u32,
    ) -> Result<(), RegistrationError> {
        self.registry
            .write()
            .add_property_array(class, label, prefix, count)
    }

    pub fn bind_integer_constant(
        &self,
        class: &Name,
        enum_name: &Name,
        name: Name,
        value: i64,
    ) -> Result<(), RegistrationError> {
        self.registry
            .write()
            .bind_integer_constant(class, enum_name, name, value)
    }

    pub fn register_enum_type(
        &self,
        class: &Name,
        enum_name: &Name,
        underlying: Name,
    ) -> Result<(), RegistrationError> {
        self.registry
            .write()
            .register_enum_type(class, enum_name, underlying)
    }

    pub fn set_property_default_value(
        &self,
        class: &Name,
        property: Name,
        value: Value,
    ) -> Result<(), RegistrationError> {
        self.registry
            .write()
            .set_property_default_value(class, property, value)
    }

    pub fn add_compatibility_class(&self, old_name: Name, new_name: Name) {
        self.registry.write().add_compatibility_class(old_name, new_name);
    }

    pub fn add_resource_base_extension(&self, extension: Name, class: Name) {
        self.registry
            .write()
            .add_resource_base_extension(extension, class);
    }

    // === Class queries ===

    pub fn class_exists(&self, class: &Name) -> bool {
        self.registry.read().class_exists(class)
    }

    pub fn is_parent_class(&self, class: &Name, inherits: &Name) -> bool {
        self.registry.read().is_parent_class(class, inherits)
    }

    pub fn get_parent_class(&self, class: &Name) -> Option<Name> {
        self.registry.read().get_parent_class(class)
    }

    pub fn get_parent_class_nocheck(&self, class: &Name) -> Name {
        self.registry.read().get_parent_class_nocheck(class)
    }

    pub fn get_class_list(&self) -> Vec<Name> {
        self.registry.read().get_class_list()
    }

    pub fn get_inheriters_from_class(&self, class: &Name) -> Vec<Name> {
        self.registry.read().get_inheriters_from_class(class)
    }

    pub fn get_direct_inheriters_from_class(&self, class: &Name) -> Vec<Name> {
        self.registry.read().get_direct_inheriters_from_class(class)
    }

    pub fn get_api_type(&self, class: &Name) -> Option<ApiTier> {
        self.registry.read().get_api_type(class)
    }

    pub fn is_class_enabled(&self, class: &Name) -> bool {
        self.registry.read().is_class_enabled(class)
    }

    pub fn is_class_exposed(&self, class: &Name) -> bool {
        self.registry.read().is_class_exposed(class)
    }

    pub fn get_compatibility_remapped_class(&self, class: &Name) -> Name {
        self.registry.read().get_compatibility_remapped_class(class)
    }

    pub fn get_resource_base_extensions(&self) -> Vec<Name> {
        self.registry.read().get_resource_base_extensions()
    }

    pub fn get_extensions_for_type(&self, class: &Name) -> Vec<Name> {
        self.registry.read().get_extensions_for_type(class)
    }

    // === Member queries ===

    pub fn get_method(&self, class: &Name, method: &Name) -> Option<Arc<MethodBinding>> {
        self.registry.read().get_method(class, method)
    }

    pub fn has_method(&self, class: &Name, method: &Name, no_inheritance: bool) -> bool {
        self.registry.read().has_method(class, method, no_inheritance)
    }

    pub fn get_method_list(
        &self,
        class: &Name,
        no_inheritance: bool,
        exclude_from_properties: bool,
    ) -> Vec<MethodInfo> {
        self.registry
            .read()
            .get_method_list(class, no_inheritance, exclude_from_properties)
    }

    pub fn get_virtual_methods(&self, class: &Name, no_inheritance: bool) -> Vec<MethodInfo> {
        self.registry.read().get_virtual_methods(class, no_inheritance)
    }

    pub fn get_property_list(
        &self,
        class: &Name,
        no_inheritance: bool,
        validator: Option<&dyn Instance>,
    ) -> Vec<PropertyDescriptor> {
        self.registry
            .read()
            .get_property_list(class, no_inheritance, validator)
    }

    pub fn has_property(&self, class: &Name, property: &Name) -> bool {
        self.registry.read().has_property(class, property)
    }

    pub fn get_property_type(&self, class: &Name, property: &Name) -> Option<TypeTag> {
        self.registry.read().get_property_type(class, property)
    }

    pub fn get_property_setter(&self, class: &Name, property: &Name) -> Option<Name> {
        self.registry.read().get_property_setter(class, property)
    }

    pub fn get_property_getter(&self, class: &Name, property: &Name) -> Option<Name> {
        self.registry.read().get_property_getter(class, property)
    }

    pub fn get_property_index(&self, class: &Name, property: &Name) -> Option<i32> {
        self.registry.read().get_property_index(class, property)
    }

    pub fn has_signal(&self, class: &Name, signal: &Name) -> bool {
        self.registry.read().has_signal(class, signal)
    }

    pub fn get_signal(&self, class: &Name, signal: &Name) -> Option<SignalInfo> {
        self.registry.read().get_signal(class, signal)
    }

    pub fn get_signal_list(&self, class: &Name, no_inheritance: bool) -> Vec<SignalInfo> {
        self.registry.read().get_signal_list(class, no_inheritance)
    }

    pub fn get_integer_constant(&self, class: &Name, name: &Name) -> Option<i64> {
        self.registry.read().get_integer_constant(class, name)
    }

    pub fn get_integer_constant_list(&self, class: &Name, no_inheritance: bool) -> Vec<Name> {
        self.registry
            .read()
            .get_integer_constant_list(class, no_inheritance)
    }

    pub fn get_integer_constant_enum(
        &self,
        class: &Name,
        constant: &Name,
        no_inheritance: bool,
    ) -> Option<Name> {
        self.registry
            .read()
            .get_integer_constant_enum(class, constant, no_inheritance)
    }

    pub fn get_enum_list(&self, class: &Name, no_inheritance: bool) -> Vec<Name> {
        self.registry.read().get_enum_list(class, no_inheritance)
    }

    pub fn get_enum_constants(
        &self,
        class: &Name,
        enum_name: &Name,
        no_inheritance: bool,
    ) -> Vec<Name> {
        self.registry
            .read()
            .get_enum_constants(class, enum_name, no_inheritance)
    }

    // === Instantiation ===

    pub fn can_instance(&self, class: &Name) -> bool {
        self.registry.read().can_instance(class, self.editor_hint())
    }

    /// Construct an instance of `class` (following the compatibility remap).
    /// The constructor runs after the registry lock is released, so it may
    /// call back into the facade.
    pub fn instance(&self, class: &Name) -> Option<Box<dyn Instance>> {
        let constructor = self
            .registry
            .read()
            .resolve_constructor(class, self.editor_hint())?;
        Some(constructor())
    }

    // === Property dispatch ===

    /// Write a property on a live object. `None` when no class in the
    /// object's chain declares the property. The setter runs after the
    /// registry lock is released.
    pub fn set_property(
        &self,
        obj: &mut dyn Instance,
        property: &Name,
        value: Value,
    ) -> Option<Result<(), CallError>> {
        let psg = self
            .registry
            .read()
            .property_accessors(&obj.class_name(), property)?;
        Some(invoke_setter(&psg, obj, value))
    }

    /// Read a property on a live object, falling back to the integer
    /// constant tables. A declared property is always handled, even
    /// write-only (`Some(Err(..))`). The getter runs after the registry lock
    /// is released.
    pub fn get_property(
        &self,
        obj: &mut dyn Instance,
        property: &Name,
    ) -> Option<Result<Value, CallError>> {
        let class = obj.class_name();
        let psg = self.registry.read().property_accessors(&class, property);
        if let Some(psg) = psg {
            return Some(invoke_getter(&psg, obj));
        }
        self.registry
            .read()
            .get_integer_constant(&class, property)
            .map(|v| Ok(Value::Int(v)))
    }

    // === Default-value cache ===

    /// The default value of `class.property`: what a freshly constructed
    /// instance reports through the property's getter.
    ///
    /// The first query for a class fills its cache: the registered singleton
    /// is used when present, otherwise a transient instance is constructed
    /// and dropped. Getters run outside the registry lock. Classes that can
    /// provide no instance cache as empty rather than retrying.
    pub fn class_get_default_property_value(
        &self,
        class: &Name,
        property: &Name,
    ) -> Option<Value> {
        {
            let reg = self.registry.read();
            if reg.is_defaults_cached(class) {
                return reg.cached_default_property_value(class, property);
            }
        }

        let props = self.registry.read().get_property_list(class, false, None);
        let mut collected = Vec::new();
        // Take the singleton out of the store so its getters run with no
        // lock held; they may re-enter the facade.
        let singleton = self.singletons.lock().remove(class);
        if let Some(mut obj) = singleton {
            self.collect_defaults(obj.as_mut(), &props, &mut collected);
            self.singletons.lock().insert(class.clone(), obj);
        } else if let Some(mut obj) = self.instance(class) {
            self.collect_defaults(obj.as_mut(), &props, &mut collected);
        }

        {
            let mut reg = self.registry.write();
            if !reg.is_defaults_cached(class) {
                for (name, value) in collected {
                    // Explicitly seeded defaults win over observed ones.
                    if reg.cached_default_property_value(class, &name).is_none() {
                        let _ = reg.set_property_default_value(class, name, value);
                    }
                }
                reg.mark_defaults_cached(class.clone());
            }
        }

        self.registry
            .read()
            .cached_default_property_value(class, property)
    }

    fn collect_defaults(
        &self,
        obj: &mut dyn Instance,
        props: &[PropertyDescriptor],
        out: &mut Vec<(Name, Value)>,
    ) {
        let class = obj.class_name();
        for prop in props {
            if prop.is_framing_marker() {
                continue;
            }
            if !prop
                .usage
                .intersects(PropertyUsage::STORAGE | PropertyUsage::EDITOR)
            {
                continue;
            }
            let psg = self.registry.read().property_accessors(&class, &prop.name);
            let Some(psg) = psg else {
                continue;
            };
            if psg.getter.is_none() {
                continue;
            }
            if let Ok(value) = invoke_getter(&psg, obj) {
                out.push((prop.name.clone(), value));
            }
        }
    }

    /// Drop the default-value cache; it refills lazily.
    pub fn cleanup_defaults(&self) {
        self.registry.write().cleanup_defaults();
    }

    // === Singletons ===

    /// Register a process-wide instance for `class`. The default-value
    /// cache reads through it instead of constructing a transient object.
    pub fn register_singleton(&self, class: Name, instance: Box<dyn Instance + Send>) {
        self.singletons.lock().insert(class, instance);
    }

    pub fn has_singleton(&self, class: &Name) -> bool {
        self.singletons.lock().contains_key(class)
    }

    // === Fingerprint and reflection ===

    pub fn api_hash(&self, tier: ApiTier) -> u64 {
        self.registry.read().api_hash(tier)
    }

    pub fn emit_reflection(
        &self,
        tier: ApiTier,
        extra_constants: &[(Name, i64)],
    ) -> Result<ReflectionData, ReflectError> {
        let singleton_names: FxHashSet<Name> =
            self.singletons.lock().keys().cloned().collect();
        self.registry
            .read()
            .emit_reflection(tier, &singleton_names, extra_constants)
    }

    // === Teardown ===

    /// Drop every registered class and singleton.
    pub fn cleanup(&self) {
        self.registry.write().cleanup();
        self.singletons.lock().clear();
    }
}
