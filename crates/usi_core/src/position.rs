//! Authoritative game state for the current session.
//!
//! A [`Position`] is always the result of replaying its move list from the
//! specification it was established with. [`PositionManager::establish`] is
//! all-or-nothing: a bad SFEN or an illegal move anywhere in the list leaves
//! the previous position in place.

use tracing::debug;

use crate::{PositionError, RulesEngine, RulesError, Side, SFEN_FIELDS};

/// Where a position starts from, before any moves are replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PositionSpec {
    /// `position startpos`
    StartPos,
    /// `position sfen <board> <turn> <hands> <move number>`
    Sfen(String),
}

/// A parsed `position` command: a starting point plus moves to replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionCommand {
    pub spec: PositionSpec,
    pub moves: Vec<String>,
}

impl PositionCommand {
    pub fn startpos() -> Self {
        Self {
            spec: PositionSpec::StartPos,
            moves: Vec::new(),
        }
    }

    pub fn sfen(sfen: impl Into<String>) -> Self {
        Self {
            spec: PositionSpec::Sfen(sfen.into()),
            moves: Vec::new(),
        }
    }

    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Clone, Debug)]
pub struct Position<B> {
    board: B,
    side_to_move: Side,
    origin: PositionSpec,
    moves: Vec<String>,
}

impl<B> Position<B> {
    /// Backend board for this position.
    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// The specification this position was established from.
    pub fn origin(&self) -> &PositionSpec {
        &self.origin
    }

    /// Moves applied since the position was established, oldest first.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }
}

/// Owns the session's single current [`Position`].
#[derive(Debug)]
pub struct PositionManager<B> {
    current: Option<Position<B>>,
}

impl<B> Default for PositionManager<B> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<B: Clone> PositionManager<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current position with the one described by `cmd`.
    ///
    /// # Errors
    /// * `InvalidSpecification` - the SFEN is rejected by the rules backend
    /// * `IllegalReplayMove` - a listed move is illegal when its turn comes
    ///
    /// On error the previous position is left exactly as it was.
    pub fn establish<R>(
        &mut self,
        rules: &mut R,
        cmd: &PositionCommand,
    ) -> Result<&Position<B>, PositionError>
    where
        R: RulesEngine<Board = B>,
    {
        let mut board = match &cmd.spec {
            PositionSpec::StartPos => rules.start_position()?,
            PositionSpec::Sfen(sfen) => {
                if sfen.split_whitespace().count() != SFEN_FIELDS {
                    return Err(PositionError::InvalidSpecification(format!(
                        "expected {SFEN_FIELDS} sfen fields in '{sfen}'"
                    )));
                }
                rules.parse_position(sfen).map_err(|e| match e {
                    RulesError::InvalidSfen(reason) => PositionError::InvalidSpecification(reason),
                    other => PositionError::Rules(other),
                })?
            }
        };

        for (index, mv) in cmd.moves.iter().enumerate() {
            board = play(rules, &board, mv).map_err(|e| match e {
                PositionError::IllegalMove(mv) => PositionError::IllegalReplayMove { index, mv },
                other => other,
            })?;
        }

        let side_to_move = rules.side_to_move(&board);
        debug!(
            moves = cmd.moves.len(),
            side = %side_to_move,
            "Position established"
        );

        Ok(&*self.current.insert(Position {
            board,
            side_to_move,
            origin: cmd.spec.clone(),
            moves: cmd.moves.clone(),
        }))
    }

    /// Read-only view of the current position.
    pub fn current(&self) -> Result<&Position<B>, PositionError> {
        self.current.as_ref().ok_or(PositionError::NoPosition)
    }

    /// Play one legal move on the current position.
    pub fn apply<R>(&mut self, rules: &mut R, mv: &str) -> Result<(), PositionError>
    where
        R: RulesEngine<Board = B>,
    {
        let position = self.current.as_mut().ok_or(PositionError::NoPosition)?;
        let board = play(rules, &position.board, mv)?;
        position.side_to_move = rules.side_to_move(&board);
        position.board = board;
        position.moves.push(mv.to_string());
        Ok(())
    }

    /// SFEN of the current position, as the rules backend writes it.
    pub fn serialized<R>(&self, rules: &R) -> Result<String, PositionError>
    where
        R: RulesEngine<Board = B>,
    {
        Ok(rules.serialize(self.current()?.board()))
    }
}

/// Validate `mv` against the legal-move set, then apply it.
fn play<R: RulesEngine>(
    rules: &mut R,
    board: &R::Board,
    mv: &str,
) -> Result<R::Board, PositionError> {
    let legal = rules.legal_moves(board)?;
    if !legal.iter().any(|m| m == mv) {
        return Err(PositionError::IllegalMove(mv.to_string()));
    }
    rules.apply_move(board, mv).map_err(|e| match e {
        RulesError::IllegalMove(mv) => PositionError::IllegalMove(mv),
        other => PositionError::Rules(other),
    })
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
