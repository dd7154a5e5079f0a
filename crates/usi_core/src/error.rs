use thiserror::Error;

/// Failures reported by a [`RulesEngine`](crate::RulesEngine) backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid sfen: {0}")]
    InvalidSfen(String),
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("rules backend failure: {0}")]
    Backend(String),
}

/// Failures reported by a [`MoveOracle`](crate::MoveOracle) backend.
///
/// A malformed answer is *not* an error (it is `Ok(None)`); these are
/// infrastructure failures only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle timed out after {0} ms")]
    Timeout(u64),
}

/// Errors from establishing or mutating the current position.
///
/// All of these are scoped to the command that caused them; the session
/// reports them with `info string` and keeps running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("invalid position specification: {0}")]
    InvalidSpecification(String),
    #[error("illegal move {mv} at index {index} of the move list")]
    IllegalReplayMove { index: usize, mv: String },
    #[error("no position")]
    NoPosition,
    #[error("illegal move {0}")]
    IllegalMove(String),
    #[error(transparent)]
    Rules(#[from] RulesError),
}
