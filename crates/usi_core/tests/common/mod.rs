//! Stand-ins for the rules backend and the oracle, shared by the
//! integration tests.

use usi_core::{MoveOracle, OracleError, OraclePrediction, RulesEngine, RulesError, Side};

/// Rules stub with a fixed legal-move list that never runs out.
///
/// The board is just the side to move plus the moves played, serialized as
/// `<moves or -> <b|w> - <ply>`.
pub struct StubRules {
    pub legal: Vec<String>,
    pub start_side: Side,
    pub mate: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StubBoard {
    pub side: Side,
    pub moves: Vec<String>,
}

impl StubRules {
    pub fn new(legal: &[&str], start_side: Side) -> Self {
        Self {
            legal: legal.iter().map(|m| m.to_string()).collect(),
            start_side,
            mate: None,
        }
    }
}

impl RulesEngine for StubRules {
    type Board = StubBoard;

    fn start_position(&mut self) -> Result<StubBoard, RulesError> {
        Ok(StubBoard {
            side: self.start_side,
            moves: Vec::new(),
        })
    }

    fn parse_position(&mut self, sfen: &str) -> Result<StubBoard, RulesError> {
        let fields: Vec<&str> = sfen.split_whitespace().collect();
        let invalid = || RulesError::InvalidSfen(sfen.to_string());
        if fields.len() != 4 {
            return Err(invalid());
        }
        let moves = match fields[0] {
            "-" => Vec::new(),
            list => list.split(',').map(str::to_string).collect(),
        };
        Ok(StubBoard {
            side: Side::from_sfen_turn(fields[1]).ok_or_else(invalid)?,
            moves,
        })
    }

    fn serialize(&self, board: &StubBoard) -> String {
        let moves = if board.moves.is_empty() {
            "-".to_string()
        } else {
            board.moves.join(",")
        };
        format!(
            "{} {} - {}",
            moves,
            board.side.sfen_turn(),
            board.moves.len() + 1
        )
    }

    fn side_to_move(&self, board: &StubBoard) -> Side {
        board.side
    }

    fn legal_moves(&mut self, _board: &StubBoard) -> Result<Vec<String>, RulesError> {
        Ok(self.legal.clone())
    }

    fn apply_move(&mut self, board: &StubBoard, mv: &str) -> Result<StubBoard, RulesError> {
        let mut next = board.clone();
        next.side = board.side.other();
        next.moves.push(mv.to_string());
        Ok(next)
    }

    fn find_forced_mate(
        &mut self,
        _board: &StubBoard,
        _horizon: u32,
    ) -> Result<Option<String>, RulesError> {
        Ok(self.mate.clone())
    }
}

/// Oracle stub with a canned answer; counts how often it is asked.
pub struct StubOracle {
    pub answer: Option<OraclePrediction>,
    pub calls: usize,
}

impl StubOracle {
    pub fn new(answer: Option<OraclePrediction>) -> Self {
        Self { answer, calls: 0 }
    }
}

impl MoveOracle for StubOracle {
    fn predict(&mut self, _sfen: &str) -> Result<Option<OraclePrediction>, OracleError> {
        self.calls += 1;
        Ok(self.answer.clone())
    }
}

/// Feed `script` through `session` and return the output lines.
pub fn run_script<R: RulesEngine, O: MoveOracle>(
    session: &mut usi_core::Session<R, O>,
    script: &[&str],
) -> Vec<String> {
    let input = script.join("\n");
    let mut out = Vec::new();
    session.run(input.as_bytes(), &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
