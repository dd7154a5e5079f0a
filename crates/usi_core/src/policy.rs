//! Move decision policy.
//!
//! Arbitrates between the tactical solver, the move oracle and a fallback,
//! in strict priority order:
//! 1. No legal moves: resign
//! 2. Forced mate within the horizon: play it, the oracle is never asked
//! 3. Oracle prediction, validated against the legal-move set
//! 4. Fallback: first legal move in the rules backend's enumeration order

use std::fmt;

use tracing::{debug, warn};

use crate::{MoveOracle, Position, RulesEngine, Side};

/// Default forced-mate search horizon in plies.
pub const DEFAULT_MATE_HORIZON: u32 = 5;

/// Centipawn-like units per unit of oracle confidence.
pub const SCORE_SCALE: f32 = 200.0;

pub const DIAG_MATE_FOUND: &str = "mate found";
pub const DIAG_MALFORMED: &str = "output format is invalid";
pub const DIAG_ILLEGAL: &str = "illegal move";

/// Which decision path produced the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    TacticalForcedWin,
    OracleValidated,
    FallbackIllegalOracleMove,
    FallbackMalformedOracle,
    Resign,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::TacticalForcedWin => "tactical",
            Provenance::OracleValidated => "oracle",
            Provenance::FallbackIllegalOracleMove => "fallback-illegal",
            Provenance::FallbackMalformedOracle => "fallback-malformed",
            Provenance::Resign => "resign",
        };
        f.write_str(s)
    }
}

/// Outcome of one `go` command.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    /// Move to play (None only for [`Provenance::Resign`])
    pub best_move: Option<String>,
    pub provenance: Provenance,
    /// Score from the side to move's point of view (oracle path only)
    pub score: Option<i32>,
    pub diagnostic: Option<String>,
}

impl Decision {
    fn resign() -> Self {
        Self {
            best_move: None,
            provenance: Provenance::Resign,
            score: None,
            diagnostic: None,
        }
    }

    fn fallback(first_legal: &str, provenance: Provenance, diagnostic: &str) -> Self {
        Self {
            best_move: Some(first_legal.to_string()),
            provenance,
            score: None,
            diagnostic: Some(diagnostic.to_string()),
        }
    }
}

/// Tunable policy constants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Forced-mate search horizon in plies
    pub mate_horizon: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mate_horizon: DEFAULT_MATE_HORIZON,
        }
    }
}

/// Convert the oracle's confidence into a score for the side to move.
///
/// The oracle's sign is fixed to [`Side::First`]; a positive result here
/// always means an advantage for whoever is about to move.
pub fn turn_relative_score(confidence: f32, side_to_move: Side) -> i32 {
    let raw = (confidence * SCORE_SCALE).round() as i32;
    match side_to_move {
        Side::First => raw,
        Side::Second => -raw,
    }
}

#[derive(Clone, Debug, Default)]
pub struct DecisionPolicy {
    config: PolicyConfig,
}

impl DecisionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn set_mate_horizon(&mut self, plies: u32) {
        self.config.mate_horizon = plies;
    }

    /// Choose a move for `position`.
    ///
    /// Never mutates the position. Backend failures are absorbed here: a
    /// failed legal-move enumeration counts as no legal moves, a failed mate
    /// search as no mate, and a failed oracle call as malformed output.
    pub fn decide<R, O>(
        &self,
        rules: &mut R,
        oracle: &mut O,
        position: &Position<R::Board>,
    ) -> Decision
    where
        R: RulesEngine,
        O: MoveOracle + ?Sized,
    {
        let board = position.board();

        let legal = rules.legal_moves(board).unwrap_or_else(|e| {
            warn!(error = %e, "Legal move enumeration failed");
            Vec::new()
        });
        let Some(first_legal) = legal.first() else {
            return Decision::resign();
        };

        match rules.find_forced_mate(board, self.config.mate_horizon) {
            Ok(Some(mv)) => {
                debug!(%mv, horizon = self.config.mate_horizon, "Forced mate found");
                return Decision {
                    best_move: Some(mv),
                    provenance: Provenance::TacticalForcedWin,
                    score: None,
                    diagnostic: Some(DIAG_MATE_FOUND.to_string()),
                };
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Mate search failed, treating as no mate"),
        }

        let sfen = rules.serialize(board);
        let prediction = match oracle.predict(&sfen) {
            Ok(Some(prediction)) => prediction,
            Ok(None) => {
                debug!(%sfen, "Oracle output malformed");
                return Decision::fallback(
                    first_legal,
                    Provenance::FallbackMalformedOracle,
                    DIAG_MALFORMED,
                );
            }
            Err(e) => {
                warn!(error = %e, "Oracle call failed, treating as malformed output");
                return Decision::fallback(
                    first_legal,
                    Provenance::FallbackMalformedOracle,
                    DIAG_MALFORMED,
                );
            }
        };

        if !legal.contains(&prediction.candidate) {
            debug!(candidate = %prediction.candidate, "Oracle suggested an illegal move");
            return Decision::fallback(
                first_legal,
                Provenance::FallbackIllegalOracleMove,
                DIAG_ILLEGAL,
            );
        }

        let score = turn_relative_score(prediction.confidence, position.side_to_move());
        Decision {
            diagnostic: Some(format!(
                "pred={} winner={} confidence={:.4}",
                prediction.candidate, prediction.winner, prediction.confidence
            )),
            best_move: Some(prediction.candidate),
            provenance: Provenance::OracleValidated,
            score: Some(score),
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod policy_tests;
