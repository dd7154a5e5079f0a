//! Deterministic stand-ins for the rules backend and the move oracle.

use crate::{MoveOracle, OracleError, OraclePrediction, RulesEngine, RulesError, Side};

/// A countdown game: players alternately take 1-3 stones, encoded as a
/// 4-field "sfen" `<stones> <b|w> - <ply>`. Moves are `take1`..`take3`.
///
/// Legal moves and mate answers can be overridden to script the policy.
#[derive(Debug, Default)]
pub struct CountdownRules {
    pub legal_override: Option<Vec<String>>,
    pub mate: Option<String>,
    pub fail_legal: bool,
    pub fail_mate: bool,
    pub mate_horizons: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub stones: u32,
    pub side: Side,
    pub ply: u32,
}

impl CountdownRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legal(mut self, moves: &[&str]) -> Self {
        self.legal_override = Some(moves.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn with_mate(mut self, mv: &str) -> Self {
        self.mate = Some(mv.to_string());
        self
    }

    pub fn board(stones: u32, side: Side) -> Countdown {
        Countdown { stones, side, ply: 1 }
    }
}

impl RulesEngine for CountdownRules {
    type Board = Countdown;

    fn start_position(&mut self) -> Result<Countdown, RulesError> {
        Ok(Countdown {
            stones: 10,
            side: Side::First,
            ply: 1,
        })
    }

    fn parse_position(&mut self, sfen: &str) -> Result<Countdown, RulesError> {
        let fields: Vec<&str> = sfen.split_whitespace().collect();
        let invalid = || RulesError::InvalidSfen(sfen.to_string());
        if fields.len() != 4 || fields[2] != "-" {
            return Err(invalid());
        }
        Ok(Countdown {
            stones: fields[0].parse().map_err(|_| invalid())?,
            side: Side::from_sfen_turn(fields[1]).ok_or_else(invalid)?,
            ply: fields[3].parse().map_err(|_| invalid())?,
        })
    }

    fn serialize(&self, board: &Countdown) -> String {
        format!("{} {} - {}", board.stones, board.side.sfen_turn(), board.ply)
    }

    fn side_to_move(&self, board: &Countdown) -> Side {
        board.side
    }

    fn legal_moves(&mut self, board: &Countdown) -> Result<Vec<String>, RulesError> {
        if self.fail_legal {
            return Err(RulesError::Backend("legal moves unavailable".into()));
        }
        if let Some(moves) = &self.legal_override {
            return Ok(moves.clone());
        }
        Ok((1..=board.stones.min(3)).map(|k| format!("take{k}")).collect())
    }

    fn apply_move(&mut self, board: &Countdown, mv: &str) -> Result<Countdown, RulesError> {
        let take: u32 = mv
            .strip_prefix("take")
            .and_then(|k| k.parse().ok())
            .filter(|k| (1..=3).contains(k) && *k <= board.stones)
            .ok_or_else(|| RulesError::IllegalMove(mv.to_string()))?;
        Ok(Countdown {
            stones: board.stones - take,
            side: board.side.other(),
            ply: board.ply + 1,
        })
    }

    fn find_forced_mate(
        &mut self,
        _board: &Countdown,
        horizon: u32,
    ) -> Result<Option<String>, RulesError> {
        self.mate_horizons.push(horizon);
        if self.fail_mate {
            return Err(RulesError::Backend("mate search crashed".into()));
        }
        Ok(self.mate.clone())
    }
}

/// Oracle that always gives the same answer and records what it was asked.
#[derive(Debug)]
pub struct ScriptedOracle {
    pub response: Result<Option<OraclePrediction>, OracleError>,
    pub queries: Vec<String>,
    pub options: Vec<(String, String)>,
}

impl ScriptedOracle {
    pub fn predicting(candidate: &str, winner: Side, confidence: f32) -> Self {
        Self::with_response(Ok(Some(OraclePrediction::new(candidate, winner, confidence))))
    }

    pub fn malformed() -> Self {
        Self::with_response(Ok(None))
    }

    pub fn failing() -> Self {
        Self::with_response(Err(OracleError::Unavailable("backend down".into())))
    }

    fn with_response(response: Result<Option<OraclePrediction>, OracleError>) -> Self {
        Self {
            response,
            queries: Vec::new(),
            options: Vec::new(),
        }
    }
}

impl MoveOracle for ScriptedOracle {
    fn predict(&mut self, sfen: &str) -> Result<Option<OraclePrediction>, OracleError> {
        self.queries.push(sfen.to_string());
        self.response.clone()
    }

    fn set_option(&mut self, name: &str, value: &str) -> bool {
        self.options.push((name.to_string(), value.to_string()));
        name == "MaxNewTokens"
    }
}
