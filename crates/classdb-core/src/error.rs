//! Registration-time errors.
//!
//! Everything that can go wrong while populating the registry is reported
//! through [`RegistrationError`]. Dispatch-time failures use
//! [`CallError`](crate::CallError) instead; the two never mix.

use thiserror::Error;

use crate::name::Name;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("class '{0}' is already registered")]
    DuplicateClass(Name),

    #[error("parent class '{parent}' of '{class}' is not registered")]
    UnknownParent { class: Name, parent: Name },

    #[error("class '{0}' is not registered")]
    UnknownClass(Name),

    #[error("method '{class}::{method}' is already bound")]
    DuplicateMethod { class: Name, method: Name },

    #[error("method '{class}::{method}' is not bound")]
    UnknownMethod { class: Name, method: Name },

    #[error("method '{class}::{method}' declares {defaults} default arguments for {arity} parameters")]
    TooManyDefaults {
        class: Name,
        method: Name,
        defaults: usize,
        arity: usize,
    },

    #[error("signal '{signal}' already exists on '{class}' (declared on '{owner}')")]
    DuplicateSignal {
        class: Name,
        signal: Name,
        /// The class in the inheritance chain that already declares it.
        owner: Name,
    },

    #[error("property '{property}' already exists on '{class}'")]
    DuplicateProperty { class: Name, property: Name },

    #[error("constant '{constant}' already exists on '{class}'")]
    DuplicateConstant { class: Name, constant: Name },

    #[error("enum '{enum_name}' already exists on '{class}'")]
    DuplicateEnum { class: Name, enum_name: Name },

    #[error("setter '{setter}' for property '{class}::{property}' is not a method of the class or its ancestors")]
    MissingSetter {
        class: Name,
        property: Name,
        setter: Name,
    },

    #[error("getter '{getter}' for property '{class}::{property}' is not a method of the class or its ancestors")]
    MissingGetter {
        class: Name,
        property: Name,
        getter: Name,
    },

    #[error("setter '{setter}' for property '{class}::{property}' takes {found} arguments, expected {expected}")]
    SetterArity {
        class: Name,
        property: Name,
        setter: Name,
        found: usize,
        expected: usize,
    },

    #[error("getter '{getter}' for property '{class}::{property}' takes {found} arguments, expected {expected}")]
    GetterArity {
        class: Name,
        property: Name,
        getter: Name,
        found: usize,
        expected: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = RegistrationError::DuplicateMethod {
            class: Name::new("Node"),
            method: Name::new("get_name"),
        };
        assert_eq!(err.to_string(), "method 'Node::get_name' is already bound");

        let err = RegistrationError::UnknownParent {
            class: Name::new("Sprite"),
            parent: Name::new("Node2D"),
        };
        assert!(err.to_string().contains("Node2D"));
        assert!(err.to_string().contains("Sprite"));
    }
}
