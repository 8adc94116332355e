//! Error taxonomy
//!
//! Only `ConfigurationError` halts anything (loading of a single level).
//! Everything else is recovered where it happens and logged.

use thiserror::Error;

use crate::sim::EntityId;

/// Malformed level data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("level has no player entity")]
    MissingPlayer,

    #[error("level has {0} player entities, expected exactly one")]
    DuplicatePlayer(usize),

    #[error("level has no goal entity")]
    MissingGoal,

    #[error("level has {0} goal entities, expected exactly one")]
    DuplicateGoal(usize),

    #[error("invalid shape for '{label}': {reason}")]
    InvalidShape { label: String, reason: String },

    #[error("level {0} does not exist")]
    UnknownLevel(u32),
}

/// Errors surfaced by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A mutator was called on an entity whose body/visual is gone
    #[error("entity {entity} has no live body ({operation})")]
    BackendUnavailable {
        entity: EntityId,
        operation: &'static str,
    },

    /// A cosmetic resource referenced by an effect is absent
    #[error("asset '{0}' is missing")]
    AssetMissing(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Whether the caller may log and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::BackendUnavailable { .. } | SimError::AssetMissing(_)
        )
    }
}
