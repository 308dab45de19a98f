//! Structured failure record for reflective calls.
//!
//! Dispatch never panics and never allocates an error chain: a failed call
//! produces one flat [`CallError`] describing what was wrong with the call
//! site, mirroring how scripting front ends report it to the user.

use std::fmt;

use crate::type_tag::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// No method of that name is reachable on the target class.
    InvalidMethod,
    /// An argument had the wrong type; `argument` and `expected` say which.
    InvalidArgument,
    TooFewArguments,
    TooManyArguments,
    /// The receiver was null.
    InstanceIsNull,
}

/// Why a reflective call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallError {
    pub kind: CallErrorKind,
    /// Index of the offending argument, or -1 when not argument-related.
    pub argument: i32,
    /// Type the offending argument should have had.
    pub expected: TypeTag,
}

impl CallError {
    pub fn invalid_method() -> Self {
        Self {
            kind: CallErrorKind::InvalidMethod,
            argument: -1,
            expected: TypeTag::Nil,
        }
    }

    pub fn invalid_argument(argument: i32, expected: TypeTag) -> Self {
        Self {
            kind: CallErrorKind::InvalidArgument,
            argument,
            expected,
        }
    }

    pub fn too_few_arguments() -> Self {
        Self {
            kind: CallErrorKind::TooFewArguments,
            argument: -1,
            expected: TypeTag::Nil,
        }
    }

    pub fn too_many_arguments() -> Self {
        Self {
            kind: CallErrorKind::TooManyArguments,
            argument: -1,
            expected: TypeTag::Nil,
        }
    }

    pub fn instance_is_null() -> Self {
        Self {
            kind: CallErrorKind::InstanceIsNull,
            argument: -1,
            expected: TypeTag::Nil,
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CallErrorKind::InvalidMethod => write!(f, "invalid method"),
            CallErrorKind::InvalidArgument => write!(
                f,
                "invalid type for argument {} (expected {})",
                self.argument,
                self.expected.name()
            ),
            CallErrorKind::TooFewArguments => write!(f, "too few arguments"),
            CallErrorKind::TooManyArguments => write!(f, "too many arguments"),
            CallErrorKind::InstanceIsNull => write!(f, "instance is null"),
        }
    }
}

impl std::error::Error for CallError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_fill_fields() {
        let e = CallError::invalid_argument(2, TypeTag::Float);
        assert_eq!(e.kind, CallErrorKind::InvalidArgument);
        assert_eq!(e.argument, 2);
        assert_eq!(e.expected, TypeTag::Float);

        let e = CallError::invalid_method();
        assert_eq!(e.argument, -1);
    }

    #[test]
    fn display_names_the_argument() {
        let msg = CallError::invalid_argument(1, TypeTag::Int).to_string();
        assert!(msg.contains("argument 1"));
        assert!(msg.contains("int"));
    }
}
