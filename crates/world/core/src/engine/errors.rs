//! Errors raised by world bookkeeping: spawning, lookups, storage.

use crate::error::{ErrorSeverity, SimError};
use crate::state::{EntityId, Position};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldError {
    #[error("no available location found after {attempts} attempts")]
    NoAvailableLocation { attempts: u32 },

    #[error("position {position} is outside the world")]
    OutOfBounds { position: Position },

    #[error("cannot spawn at {position}: cell is not traversable")]
    SpawnBlocked { position: Position },

    #[error("actor {id} not found")]
    ActorNotFound { id: EntityId },

    #[error("object {id} not found")]
    ObjectNotFound { id: EntityId },

    #[error("entity {id} is neither a live actor nor a live object")]
    EntityNotFound { id: EntityId },

    #[error("storage of actor {actor} is full ({capacity} slots)")]
    StorageFull { actor: EntityId, capacity: usize },
}

impl SimError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoAvailableLocation { .. } | Self::StorageFull { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::OutOfBounds { .. } | Self::SpawnBlocked { .. } => ErrorSeverity::Validation,
            Self::ActorNotFound { .. } | Self::ObjectNotFound { .. } => ErrorSeverity::Validation,
            Self::EntityNotFound { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoAvailableLocation { .. } => "WORLD_NO_AVAILABLE_LOCATION",
            Self::OutOfBounds { .. } => "WORLD_OUT_OF_BOUNDS",
            Self::SpawnBlocked { .. } => "WORLD_SPAWN_BLOCKED",
            Self::ActorNotFound { .. } => "WORLD_ACTOR_NOT_FOUND",
            Self::ObjectNotFound { .. } => "WORLD_OBJECT_NOT_FOUND",
            Self::EntityNotFound { .. } => "WORLD_ENTITY_NOT_FOUND",
            Self::StorageFull { .. } => "WORLD_STORAGE_FULL",
        }
    }
}
