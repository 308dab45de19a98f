//! The object side of reflective dispatch.

use std::any::Any;

use crate::call_error::CallError;
use crate::info::PropertyDescriptor;
use crate::name::Name;
use crate::value::Value;

/// A live object that the registry can dispatch into.
///
/// Bound method entry points downcast the receiver through
/// [`as_any_mut`](Instance::as_any_mut) to reach the concrete type. The
/// [`call`](Instance::call) hook gives script-backed objects a way to expose
/// members the registry does not know about; the default knows none.
pub trait Instance: Any {
    /// The registered class of this object.
    fn class_name(&self) -> Name;

    /// Dynamic call fallback. The default knows no methods.
    fn call(&mut self, method: &Name, args: &[Value]) -> Result<Value, CallError> {
        let _ = (method, args);
        Err(CallError::invalid_method())
    }

    /// Per-instance adjustment of a reflected property (usage bits, hint
    /// narrowing). The default leaves the descriptor untouched.
    fn validate_property(&self, property: &mut PropertyDescriptor) {
        let _ = property;
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        hits: u32,
    }

    impl Instance for Dummy {
        fn class_name(&self) -> Name {
            Name::new("Dummy")
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn default_call_is_invalid_method() {
        let mut d = Dummy { hits: 0 };
        let err = d.call(&Name::new("missing"), &[]).unwrap_err();
        assert_eq!(err, CallError::invalid_method());
    }

    #[test]
    fn downcasting_reaches_the_concrete_type() {
        let mut d = Dummy { hits: 0 };
        let obj: &mut dyn Instance = &mut d;
        obj.as_any_mut().downcast_mut::<Dummy>().unwrap().hits += 1;
        assert_eq!(d.hits, 1);
    }
}
