use std::fmt;

/// SFEN of the standard shogi starting position.
pub const STARTPOS_SFEN: &str =
    "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// Number of whitespace-separated fields in an SFEN string.
pub const SFEN_FIELDS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Sente, moves first. `b` in SFEN, `B` as a predicted winner.
    First,
    /// Gote. `w` in SFEN, `W` as a predicted winner.
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Parse the turn field of an SFEN (`b` / `w`).
    pub fn from_sfen_turn(field: &str) -> Option<Side> {
        match field {
            "b" => Some(Side::First),
            "w" => Some(Side::Second),
            _ => None,
        }
    }

    pub fn sfen_turn(self) -> char {
        match self {
            Side::First => 'b',
            Side::Second => 'w',
        }
    }

    /// Parse the winner symbol emitted by the oracle (`B` / `W`).
    pub fn from_winner_symbol(symbol: &str) -> Option<Side> {
        match symbol {
            "B" => Some(Side::First),
            "W" => Some(Side::Second),
            _ => None,
        }
    }

    pub fn winner_symbol(self) -> char {
        match self {
            Side::First => 'B',
            Side::Second => 'W',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.winner_symbol())
    }
}

/// A well-formed answer from the move oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OraclePrediction {
    /// Candidate move in USI notation (not yet checked for legality)
    pub candidate: String,
    /// Side the model expects to win
    pub winner: Side,
    /// Signed confidence. Always relative to [`Side::First`]:
    /// positive favours First, negative favours Second.
    pub confidence: f32,
}

impl OraclePrediction {
    pub fn new(candidate: impl Into<String>, winner: Side, confidence: f32) -> Self {
        Self {
            candidate: candidate.into(),
            winner,
            confidence,
        }
    }
}
