//! The class registry: arena of entries plus the name index.
//!
//! `Registry` is deliberately not thread-safe. The facade crate wraps one
//! registry in a reader-writer lock; keeping the lock outside means
//! registration helpers can call each other freely without re-entrant
//! locking. All methods take `&self`/`&mut self` accordingly.
//!
//! Class-level operations and queries live here; member registration is in
//! [`members`](crate::members), dispatch and list queries in
//! [`dispatch`](crate::dispatch).

use rustc_hash::{FxHashMap, FxHashSet};

use classdb_core::{ApiTier, Name, RegistrationError, Value};

use crate::class_entry::{ClassEntry, ClassId};

#[derive(Default)]
pub struct Registry {
    pub(crate) entries: Vec<ClassEntry>,
    pub(crate) index: FxHashMap<Name, ClassId>,
    /// Renamed classes: old name -> current name. One level deep; remaps
    /// are not chained.
    pub(crate) compat: FxHashMap<Name, Name>,
    pub(crate) extensions: FxHashMap<Name, Name>,
    pub(crate) extension_order: Vec<Name>,
    pub(crate) current_api: ApiTier,
    /// Per-class default property values, filled lazily.
    pub(crate) defaults: FxHashMap<Name, FxHashMap<Name, Value>>,
    pub(crate) defaults_cached: FxHashSet<Name>,
}

/// Ancestor walk over the arena, starting at a class and ending at the
/// hierarchy root.
pub(crate) struct ChainIter<'a> {
    registry: &'a Registry,
    next: Option<ClassId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a ClassEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let entry = &self.registry.entries[id as usize];
        self.next = entry.parent;
        Some(entry)
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // === Arena access ===

    pub(crate) fn class_id(&self, name: &Name) -> Option<ClassId> {
        self.index.get(name).copied()
    }

    pub(crate) fn find(&self, name: &Name) -> Option<&ClassEntry> {
        self.class_id(name).map(|id| &self.entries[id as usize])
    }

    pub(crate) fn find_mut(&mut self, name: &Name) -> Option<&mut ClassEntry> {
        let id = self.class_id(name)?;
        Some(&mut self.entries[id as usize])
    }

    pub(crate) fn require(&self, name: &Name) -> Result<&ClassEntry, RegistrationError> {
        self.find(name)
            .ok_or_else(|| RegistrationError::UnknownClass(name.clone()))
    }

    pub(crate) fn require_mut(
        &mut self,
        name: &Name,
    ) -> Result<&mut ClassEntry, RegistrationError> {
        let id = self
            .class_id(name)
            .ok_or_else(|| RegistrationError::UnknownClass(name.clone()))?;
        Ok(&mut self.entries[id as usize])
    }

    /// Walk from `name` up to the root. Empty iterator when the class is
    /// unknown.
    pub(crate) fn chain(&self, name: &Name) -> ChainIter<'_> {
        ChainIter {
            registry: self,
            next: self.class_id(name),
        }
    }

    // === API tier ===

    pub fn current_api(&self) -> ApiTier {
        self.current_api
    }

    /// Tier stamped onto classes registered from now on.
    pub fn set_current_api(&mut self, api: ApiTier) {
        self.current_api = api;
    }

    // === Class registration ===

    /// Register a class under `name`, inheriting `inherits` (pass
    /// `Name::none()` for a hierarchy root). The parent must already be
    /// registered.
    pub fn add_class(
        &mut self,
        name: Name,
        inherits: Name,
        api: ApiTier,
    ) -> Result<ClassId, RegistrationError> {
        if self.index.contains_key(&name) {
            return Err(RegistrationError::DuplicateClass(name));
        }
        let parent = if inherits.is_none() {
            None
        } else {
            match self.class_id(&inherits) {
                Some(id) => Some(id),
                None => {
                    return Err(RegistrationError::UnknownParent {
                        class: name,
                        parent: inherits,
                    });
                }
            }
        };
        let id = self.entries.len() as ClassId;
        self.entries
            .push(ClassEntry::new(name.clone(), inherits, parent, api));
        self.index.insert(name, id);
        Ok(id)
    }

    /// Register a namespace: a rootless entry that can hold constants and
    /// enums but never instances.
    pub fn add_namespace(
        &mut self,
        name: Name,
        header: impl Into<String>,
    ) -> Result<ClassId, RegistrationError> {
        let id = self.add_class(name, Name::none(), self.current_api)?;
        let entry = &mut self.entries[id as usize];
        entry.is_namespace = true;
        entry.exposed = true;
        entry.usage_header = header.into();
        Ok(id)
    }

    /// Install (or clear) the factory used by `instance()` for this class.
    pub fn set_class_constructor(
        &mut self,
        name: &Name,
        constructor: Option<crate::class_entry::Constructor>,
    ) -> Result<(), RegistrationError> {
        self.require_mut(name)?.constructor = constructor;
        Ok(())
    }

    pub fn set_class_exposed(&mut self, name: &Name, exposed: bool) -> Result<(), RegistrationError> {
        self.require_mut(name)?.exposed = exposed;
        Ok(())
    }

    pub fn set_class_enabled(&mut self, name: &Name, enabled: bool) -> Result<(), RegistrationError> {
        self.require_mut(name)?.disabled = !enabled;
        Ok(())
    }

    // === Class queries ===

    pub fn class_exists(&self, name: &Name) -> bool {
        self.index.contains_key(name)
    }

    /// Direct parent of `name`. `Some(Name::none())` at a hierarchy root,
    /// `None` when the class is unknown.
    pub fn get_parent_class(&self, name: &Name) -> Option<Name> {
        self.find(name).map(|e| e.inherits.clone())
    }

    /// Like [`get_parent_class`](Self::get_parent_class) but collapses the
    /// unknown-class case to the empty name, for callers that have already
    /// checked existence.
    pub fn get_parent_class_nocheck(&self, name: &Name) -> Name {
        self.find(name)
            .map(|e| e.inherits.clone())
            .unwrap_or_default()
    }

    /// True when `class` is `inherits` or descends from it.
    pub fn is_parent_class(&self, class: &Name, inherits: &Name) -> bool {
        self.chain(class).any(|e| e.name == *inherits)
    }

    /// All registered class names, sorted byte-wise for determinism.
    pub fn get_class_list(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    /// All classes that descend from `name`, itself excluded, sorted.
    pub fn get_inheriters_from_class(&self, name: &Name) -> Vec<Name> {
        let mut out: Vec<Name> = self
            .entries
            .iter()
            .filter(|e| e.name != *name && self.is_parent_class(&e.name, name))
            .map(|e| e.name.clone())
            .collect();
        out.sort();
        out
    }

    /// Classes whose direct parent is `name`, sorted.
    pub fn get_direct_inheriters_from_class(&self, name: &Name) -> Vec<Name> {
        let mut out: Vec<Name> = self
            .entries
            .iter()
            .filter(|e| e.inherits == *name)
            .map(|e| e.name.clone())
            .collect();
        out.sort();
        out
    }

    pub fn get_api_type(&self, name: &Name) -> Option<ApiTier> {
        self.find(name).map(|e| e.api)
    }

    pub fn is_class_exposed(&self, name: &Name) -> bool {
        self.find(name).is_some_and(|e| e.exposed)
    }

    /// Whether the class can be used at all. When the primary entry is
    /// missing or has no constructor, the compatibility remap is consulted
    /// before giving up.
    pub fn is_class_enabled(&self, name: &Name) -> bool {
        let direct = self.find(name);
        let entry = match direct {
            Some(e) if e.constructor.is_some() => Some(e),
            _ => self
                .compat
                .get(name)
                .and_then(|target| self.find(target))
                .or(direct),
        };
        entry.is_some_and(|e| !e.disabled)
    }

    // === Compatibility remaps ===

    /// Record that `old_name` is now `new_name`. Lookup is a single hop;
    /// remaps do not chain.
    pub fn add_compatibility_class(&mut self, old_name: Name, new_name: Name) {
        self.compat.insert(old_name, new_name);
    }

    /// Resolve `name` through the remap. Returns `name` itself when it is
    /// registered or has no remap entry.
    pub fn get_compatibility_remapped_class(&self, name: &Name) -> Name {
        if self.class_exists(name) {
            return name.clone();
        }
        self.compat.get(name).cloned().unwrap_or_else(|| name.clone())
    }

    // === Resource extensions ===

    /// Associate a file extension with a resource class. First registration
    /// of an extension wins.
    pub fn add_resource_base_extension(&mut self, extension: Name, class: Name) {
        if self.extensions.contains_key(&extension) {
            return;
        }
        self.extensions.insert(extension.clone(), class);
        self.extension_order.push(extension);
    }

    /// All registered extensions, in registration order.
    pub fn get_resource_base_extensions(&self) -> Vec<Name> {
        self.extension_order.clone()
    }

    /// Extensions whose registered class is `class` or an ancestor of it.
    pub fn get_extensions_for_type(&self, class: &Name) -> Vec<Name> {
        self.extension_order
            .iter()
            .filter(|ext| {
                self.extensions
                    .get(*ext)
                    .is_some_and(|base| self.is_parent_class(class, base))
            })
            .cloned()
            .collect()
    }

    // === Teardown ===

    /// Drop every class, remap, extension and cached default.
    pub fn cleanup(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.compat.clear();
        self.extensions.clear();
        self.extension_order.clear();
        self.cleanup_defaults();
    }

    /// Drop only the default-value cache; it will refill lazily.
    pub fn cleanup_defaults(&mut self) {
        self.defaults.clear();
        self.defaults_cached.clear();
    }
}
