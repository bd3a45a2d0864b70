use thiserror::Error;

/// Errors surfaced by the engine facade.
///
/// Out-of-order clicks are not errors: they are the normal way a game ends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `start` was given something other than a positive integer
    #[error("invalid target count: {0:?}")]
    InvalidCount(String),

    /// Engine configuration that cannot produce a playable board
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
