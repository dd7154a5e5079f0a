//! USI move-decision core for ShogiLLM
//!
//! This crate owns the parts of the engine with real control flow:
//! - [`PositionManager`]: the authoritative game state built from `position` commands
//! - [`DecisionPolicy`]: tactical solver vs. move oracle vs. fallback arbitration
//! - [`Session`]: the USI command loop and its lifecycle state machine
//!
//! Shogi rules and the language model are *not* implemented here. They are
//! reached through the [`RulesEngine`] and [`MoveOracle`] traits so that any
//! backend (or a deterministic test stand-in) can be plugged in.

pub mod error;
pub mod options;
pub mod policy;
pub mod position;
pub mod session;
pub mod types;
pub mod usi;

pub use error::*;
pub use options::*;
pub use policy::*;
pub use position::*;
pub use session::*;
pub use types::*;
pub use usi::*;

#[cfg(test)]
mod test_support;

// =============================================================================
// Capability traits: implemented by rules backends and move oracles
// =============================================================================

/// Shogi rules backend.
///
/// Boards are opaque to the core: the backend decides how a position is
/// stored and only has to hand back its SFEN and side to move. Move notation
/// is USI (`7g7f`, `8h2b+`, `P*5e`) and is exchanged verbatim.
pub trait RulesEngine {
    /// Backend-specific board representation.
    type Board: Clone + std::fmt::Debug;

    /// The standard initial position (`position startpos`).
    fn start_position(&mut self) -> Result<Self::Board, RulesError>;

    /// Parse a 4-field SFEN string.
    fn parse_position(&mut self, sfen: &str) -> Result<Self::Board, RulesError>;

    /// Serialize a board back to SFEN.
    fn serialize(&self, board: &Self::Board) -> String;

    /// Side whose turn it is on `board`.
    fn side_to_move(&self, board: &Self::Board) -> Side;

    /// Legal moves in the backend's own enumeration order.
    ///
    /// The order matters: fallbacks pick the first entry, so a backend must
    /// return the same order for the same board every time.
    fn legal_moves(&mut self, board: &Self::Board) -> Result<Vec<String>, RulesError>;

    /// Play `mv` on a copy of `board`.
    fn apply_move(&mut self, board: &Self::Board, mv: &str) -> Result<Self::Board, RulesError>;

    /// Search for a forced mate of at most `horizon` plies.
    ///
    /// `Ok(None)` only means no mate exists *within the horizon*.
    fn find_forced_mate(
        &mut self,
        board: &Self::Board,
        horizon: u32,
    ) -> Result<Option<String>, RulesError>;
}

/// Probabilistic move predictor (the language model).
pub trait MoveOracle {
    /// Predict a move for the position given as SFEN.
    ///
    /// # Returns
    /// * `Ok(Some(_))` - a well-formed prediction (the move is *not* yet validated)
    /// * `Ok(None)` - the model answered, but the answer was malformed
    /// * `Err(_)` - the backend itself failed (unavailable, timed out, ...)
    fn predict(&mut self, sfen: &str) -> Result<Option<OraclePrediction>, OracleError>;

    /// Optional: Set a USI option. Returns true if the option was recognized.
    fn set_option(&mut self, _name: &str, _value: &str) -> bool {
        false
    }
}
