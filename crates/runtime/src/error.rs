//! Error types surfaced by the runtime API.
//!
//! Wraps world, action, content and persistence failures so callers can
//! bubble them up with `?`.
use std::io;

use thiserror::Error;
use world_core::{ActionError, EntityId, ErrorSeverity, SimError, WorldError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("failed to load content: {0}")]
    Content(String),

    #[error("i/o failure on {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed json")]
    Json(#[from] serde_json::Error),

    #[error("no agent bound to actor {id}")]
    UnknownAgent { id: EntityId },

    #[error("agent {id} is already registered")]
    DuplicateAgent { id: EntityId },

    #[error("algorithm failure: {0}")]
    Algorithm(String),

    #[error("environment is closed")]
    Closed,
}

impl RuntimeError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl SimError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::World(error) => error.severity(),
            Self::Action(error) => error.severity(),
            Self::UnknownAgent { .. } | Self::DuplicateAgent { .. } => ErrorSeverity::Validation,
            Self::Io { .. } | Self::Json(_) | Self::Content(_) => ErrorSeverity::Fatal,
            Self::Algorithm(_) => ErrorSeverity::Internal,
            Self::Closed => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::World(error) => error.error_code(),
            Self::Action(error) => error.error_code(),
            Self::Content(_) => "RUNTIME_CONTENT",
            Self::Io { .. } => "RUNTIME_IO",
            Self::Json(_) => "RUNTIME_JSON",
            Self::UnknownAgent { .. } => "RUNTIME_UNKNOWN_AGENT",
            Self::DuplicateAgent { .. } => "RUNTIME_DUPLICATE_AGENT",
            Self::Algorithm(_) => "RUNTIME_ALGORITHM",
            Self::Closed => "RUNTIME_CLOSED",
        }
    }
}
