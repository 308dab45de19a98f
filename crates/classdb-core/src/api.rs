//! API tier a class belongs to.

/// Which build tier exposes a class.
///
/// The tier partitions the fingerprint: core and editor surfaces are hashed
/// independently so a tooling-only change does not invalidate the runtime
/// API hash. The numeric value is folded into the fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ApiTier {
    /// Always available.
    #[default]
    Core = 0,
    /// Only present when tooling is active.
    Editor = 1,
    /// Registered but not part of any public surface.
    None = 2,
}

impl ApiTier {
    pub fn name(self) -> &'static str {
        match self {
            ApiTier::Core => "core",
            ApiTier::Editor => "editor",
            ApiTier::None => "none",
        }
    }
}
