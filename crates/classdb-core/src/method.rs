//! Type-erased bound methods.
//!
//! A [`MethodBinding`] wraps a native entry point together with the
//! signature the registry advertises for it. The entry point is an `Arc`'d
//! closure so bindings can be shared between the method table and cached
//! property accessors without cloning the callable.

use std::fmt;
use std::sync::Arc;

use crate::call_error::CallError;
use crate::flags::MethodFlags;
use crate::info::{MethodInfo, PropertyDescriptor};
use crate::instance::Instance;
use crate::name::Name;
use crate::type_tag::TypeTag;
use crate::value::Value;

/// The native entry point of a bound method.
pub type MethodEntry =
    Arc<dyn Fn(&mut dyn Instance, &[Value]) -> Result<Value, CallError> + Send + Sync>;

#[derive(Clone)]
pub struct MethodBinding {
    name: Name,
    instance_class: Name,
    return_val: PropertyDescriptor,
    arguments: Vec<PropertyDescriptor>,
    /// Defaults for the trailing arguments, left to right. `defaults[j]`
    /// belongs to declared argument `arity - defaults.len() + j`.
    default_arguments: Vec<Value>,
    flags: MethodFlags,
    id: u32,
    entry: MethodEntry,
}

impl MethodBinding {
    pub fn new<F>(instance_class: impl Into<Name>, name: impl Into<Name>, entry: F) -> Self
    where
        F: Fn(&mut dyn Instance, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            instance_class: instance_class.into(),
            return_val: PropertyDescriptor::nil(),
            arguments: Vec::new(),
            default_arguments: Vec::new(),
            flags: MethodFlags::DEFAULT,
            id: 0,
            entry: Arc::new(entry),
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

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    // === Accessors ===

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn instance_class(&self) -> &Name {
        &self.instance_class
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Type of argument `index`; `-1` gives the return type. Out-of-range
    /// indices read as Nil.
    pub fn argument_type(&self, index: i32) -> TypeTag {
        if index < 0 {
            return self.return_val.type_tag;
        }
        self.arguments
            .get(index as usize)
            .map_or(TypeTag::Nil, |a| a.type_tag)
    }

    pub fn argument_info(&self, index: usize) -> Option<&PropertyDescriptor> {
        self.arguments.get(index)
    }

    pub fn arguments(&self) -> &[PropertyDescriptor] {
        &self.arguments
    }

    pub fn return_info(&self) -> &PropertyDescriptor {
        &self.return_val
    }

    pub fn default_argument_count(&self) -> usize {
        self.default_arguments.len()
    }

    /// Index of the first argument that may be omitted.
    pub fn required_argument_count(&self) -> usize {
        self.arguments.len() - self.default_arguments.len()
    }

    pub fn has_default_argument(&self, index: usize) -> bool {
        index >= self.required_argument_count() && index < self.arguments.len()
    }

    pub fn default_argument(&self, index: usize) -> Option<&Value> {
        if !self.has_default_argument(index) {
            return None;
        }
        self.default_arguments
            .get(index - self.required_argument_count())
    }

    pub fn default_arguments(&self) -> &[Value] {
        &self.default_arguments
    }

    pub fn set_default_arguments(&mut self, defaults: Vec<Value>) {
        self.default_arguments = defaults;
    }

    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: MethodFlags) {
        self.flags = flags;
    }

    pub fn is_const(&self) -> bool {
        self.flags.contains(MethodFlags::CONST)
    }

    pub fn is_vararg(&self) -> bool {
        self.flags.contains(MethodFlags::VARARG)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Snapshot of the advertised signature.
    pub fn method_info(&self) -> MethodInfo {
        MethodInfo {
            name: self.name.clone(),
            return_val: self.return_val.clone(),
            arguments: self.arguments.clone(),
            default_arguments: self.default_arguments.clone(),
            flags: self.flags,
            id: self.id,
        }
    }

    /// Validate arity and argument types, splice defaults for omitted
    /// trailing arguments, and run the entry point.
    ///
    /// Vararg bindings skip all checks; the entry point sees the arguments
    /// exactly as passed. Nil-typed declared arguments accept any value.
    pub fn invoke(
        &self,
        instance: &mut dyn Instance,
        args: &[Value],
    ) -> Result<Value, CallError> {
        if self.is_vararg() {
            return (self.entry)(instance, args);
        }

        let declared = self.arguments.len();
        if args.len() > declared {
            return Err(CallError::too_many_arguments());
        }
        let required = self.required_argument_count();
        if args.len() < required {
            return Err(CallError::too_few_arguments());
        }

        let mut call_args = Vec::with_capacity(declared);
        for (i, arg) in args.iter().enumerate() {
            let slot = &self.arguments[i];
            if slot.type_tag == TypeTag::Nil {
                call_args.push(arg.clone());
                continue;
            }
            match arg.convert_to(slot.type_tag) {
                Some(converted) => call_args.push(converted),
                None => return Err(CallError::invalid_argument(i as i32, slot.type_tag)),
            }
        }
        for i in args.len()..declared {
            call_args.push(self.default_arguments[i - required].clone());
        }

        (self.entry)(instance, &call_args)
    }
}

impl fmt::Debug for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBinding")
            .field("name", &self.name)
            .field("instance_class", &self.instance_class)
            .field("arguments", &self.arguments.len())
            .field("defaults", &self.default_arguments.len())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    struct Counter {
        total: i64,
    }

    impl Instance for Counter {
        fn class_name(&self) -> Name {
            Name::new("Counter")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn add_binding() -> MethodBinding {
        MethodBinding::new("Counter", "add", |inst, args| {
            let counter = inst
                .as_any_mut()
                .downcast_mut::<Counter>()
                .ok_or_else(CallError::invalid_method)?;
            if let Value::Int(n) = args[0] {
                counter.total += n;
            }
            Ok(Value::Int(counter.total))
        })
        .with_return(PropertyDescriptor::new(TypeTag::Int, Name::none()))
        .with_argument(PropertyDescriptor::new(TypeTag::Int, "amount"))
    }

    #[test]
    fn invoke_runs_the_entry_point() {
        let binding = add_binding();
        let mut c = Counter { total: 1 };
        let out = binding.invoke(&mut c, &[Value::Int(4)]).unwrap();
        assert_eq!(out, Value::Int(5));
        assert_eq!(c.total, 5);
    }

    #[test]
    fn invoke_checks_arity() {
        let binding = add_binding();
        let mut c = Counter { total: 0 };
        assert_eq!(
            binding.invoke(&mut c, &[]).unwrap_err(),
            CallError::too_few_arguments()
        );
        assert_eq!(
            binding
                .invoke(&mut c, &[Value::Int(1), Value::Int(2)])
                .unwrap_err(),
            CallError::too_many_arguments()
        );
    }

    #[test]
    fn invoke_rejects_wrong_types() {
        let binding = add_binding();
        let mut c = Counter { total: 0 };
        let err = binding.invoke(&mut c, &[Value::Bool(true)]).unwrap_err();
        assert_eq!(err, CallError::invalid_argument(0, TypeTag::Int));
    }

    #[test]
    fn invoke_strict_converts_arguments() {
        let binding = add_binding();
        let mut c = Counter { total: 0 };
        // Float narrows to the declared int slot.
        let out = binding.invoke(&mut c, &[Value::Float(3.0)]).unwrap();
        assert_eq!(out, Value::Int(3));
    }

    #[test]
    fn defaults_splice_for_omitted_trailing_arguments() {
        let mut binding = MethodBinding::new("Counter", "scale", |inst, args| {
            let counter = inst.as_any_mut().downcast_mut::<Counter>().unwrap();
            let (a, b) = match (&args[0], &args[1]) {
                (Value::Int(a), Value::Int(b)) => (*a, *b),
                _ => return Err(CallError::invalid_method()),
            };
            counter.total = a * b;
            Ok(Value::Int(counter.total))
        })
        .with_argument(PropertyDescriptor::new(TypeTag::Int, "a"))
        .with_argument(PropertyDescriptor::new(TypeTag::Int, "b"));
        binding.set_default_arguments(vec![Value::Int(10)]);

        assert!(binding.has_default_argument(1));
        assert!(!binding.has_default_argument(0));
        assert_eq!(binding.default_argument(1), Some(&Value::Int(10)));

        let mut c = Counter { total: 0 };
        assert_eq!(binding.invoke(&mut c, &[Value::Int(3)]).unwrap(), Value::Int(30));
        assert_eq!(
            binding
                .invoke(&mut c, &[Value::Int(3), Value::Int(2)])
                .unwrap(),
            Value::Int(6)
        );
    }

    #[test]
    fn vararg_skips_validation() {
        let binding = MethodBinding::new("Counter", "emit", |_, args| {
            Ok(Value::Int(args.len() as i64))
        })
        .with_flags(MethodFlags::VARARG);
        let mut c = Counter { total: 0 };
        let out = binding
            .invoke(&mut c, &[Value::Nil, Value::Bool(true), Value::Int(7)])
            .unwrap();
        assert_eq!(out, Value::Int(3));
    }

    #[test]
    fn argument_type_minus_one_is_return() {
        let binding = add_binding();
        assert_eq!(binding.argument_type(-1), TypeTag::Int);
        assert_eq!(binding.argument_type(0), TypeTag::Int);
        assert_eq!(binding.argument_type(5), TypeTag::Nil);
    }
}
