use crate::error::{ErrorSeverity, SimError};
use crate::state::EntityId;

/// Rejection of an action before any of its effects are applied.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("action component {index} is {value}, expected a finite value in [0, 1]")]
    ComponentOutOfRange { index: usize, value: f64 },

    #[error("signal {signal} is outside the vocabulary of {vocabulary_size} symbols")]
    SignalOutOfRange { signal: u16, vocabulary_size: u32 },

    #[error("actor {actor} not found")]
    ActorNotFound { actor: EntityId },
}

impl SimError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ComponentOutOfRange { .. } => "ACTION_COMPONENT_OUT_OF_RANGE",
            Self::SignalOutOfRange { .. } => "ACTION_SIGNAL_OUT_OF_RANGE",
            Self::ActorNotFound { .. } => "ACTION_ACTOR_NOT_FOUND",
        }
    }
}
