//! Bit flags and hint tags attached to reflected members.

use bitflags::bitflags;

bitflags! {
    /// How a property participates in storage, editing and reflection.
    ///
    /// The raw bits are folded into the API fingerprint; existing bit
    /// positions must never change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyUsage: u32 {
        /// Persisted when the owning object is serialized.
        const STORAGE = 1 << 0;
        /// Shown in editing tooling.
        const EDITOR = 1 << 1;
        /// Implementation detail, hidden from reflection consumers.
        const INTERNAL = 1 << 2;
        /// A Nil-typed slot that actually accepts any value.
        const NIL_IS_VARIANT = 1 << 3;
        /// The hint string names a registered enum.
        const CLASS_IS_ENUM = 1 << 4;
        /// Framing marker: opens a named property group.
        const GROUP = 1 << 5;
        /// Framing marker: opens a fixed-size property array.
        const ARRAY = 1 << 6;
        /// Eligible for animation keying.
        const KEYABLE = 1 << 7;
    }
}

impl PropertyUsage {
    /// Stored and editable: the usage given to ordinary properties.
    pub const DEFAULT: Self = Self::STORAGE.union(Self::EDITOR);
}

impl Default for PropertyUsage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

bitflags! {
    /// Qualifiers on a bound method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u32 {
        const NORMAL = 1 << 0;
        /// Only callable when tooling is active.
        const EDITOR = 1 << 1;
        /// Does not mutate the receiver.
        const CONST = 1 << 2;
        /// Declared for overriding; has no native entry point.
        const VIRTUAL = 1 << 3;
        /// Accepts any number of trailing arguments; arity checks are skipped.
        const VARARG = 1 << 4;
    }
}

impl MethodFlags {
    pub const DEFAULT: Self = Self::NORMAL;
}

impl Default for MethodFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Editor hint attached to a property descriptor. The numeric value is part
/// of the API fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PropertyHint {
    #[default]
    None = 0,
    /// hint_string is "min,max" or "min,max,step".
    Range = 1,
    /// hint_string is a comma-separated list of labels.
    Enum = 2,
    /// hint_string is a comma-separated list of flag labels.
    Flags = 3,
    /// hint_string is a file-dialog filter.
    File = 4,
    Dir = 5,
    /// hint_string names an acceptable resource class.
    ResourceType = 6,
    MultilineText = 7,
    ColorNoAlpha = 8,
}
