//! Shared error classification for world-core.
//!
//! Domain errors live next to the code that raises them (`CapabilityError` in
//! [`crate::ops`], `ActionError` in [`crate::action`], `WorldError` in
//! [`crate::engine`]). This module only carries what they have in common.

/// How a caller is expected to react to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The world is fine; retrying later or elsewhere may succeed.
    ///
    /// Examples: no free spawn cell, storage full
    Recoverable,

    /// The input was rejected and must change before it is retried.
    ///
    /// Examples: action component outside `[0, 1]`, unknown actor id
    Validation,

    /// Internal bookkeeping disagrees with itself.
    Internal,

    /// Misconfiguration the simulation cannot continue from.
    ///
    /// Examples: unknown capability name in a terrain file
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// True for severities that point at a bug or broken configuration.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Uniform classification implemented by every world-core error enum.
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for the variant, used by logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
