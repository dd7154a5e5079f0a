//! Shogi rules through a helper process.
//!
//! Request/reply shapes (one JSON object per line):
//! ```text
//! {"op":"parse","sfen":S}                  -> {"ok":true,"sfen":S,"turn":"b"}
//! {"op":"legal_moves","sfen":S}            -> {"ok":true,"moves":["7g7f",...]}
//! {"op":"apply","sfen":S,"move":M}         -> {"ok":true,"sfen":S2,"turn":"w"}
//! {"op":"mate","sfen":S,"ply":5}           -> {"ok":true,"move":"G*5b"} / {"ok":true,"move":null}
//! any failure                              -> {"ok":false,"error":"..."}
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use usi_core::{RulesEngine, RulesError, Side, STARTPOS_SFEN};

use crate::{BridgeError, JsonLineProcess, ProcessConfig};

/// Board as known to the bridge: the helper's canonical SFEN plus its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeBoard {
    pub sfen: String,
    pub turn: Side,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum RulesRequest<'a> {
    Parse {
        sfen: &'a str,
    },
    LegalMoves {
        sfen: &'a str,
    },
    Apply {
        sfen: &'a str,
        #[serde(rename = "move")]
        mv: &'a str,
    },
    Mate {
        sfen: &'a str,
        ply: u32,
    },
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RulesReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    sfen: Option<String>,
    #[serde(default)]
    turn: Option<String>,
    #[serde(default)]
    moves: Option<Vec<String>>,
    #[serde(default, rename = "move")]
    mv: Option<String>,
}

impl RulesReply {
    fn error_text(&self) -> String {
        self.error.clone().unwrap_or_else(|| "unspecified error".to_string())
    }

    /// Board carried by a `parse` / `apply` reply.
    fn into_board(self) -> Result<BridgeBoard, RulesError> {
        let sfen = self
            .sfen
            .ok_or_else(|| RulesError::Backend("reply without sfen".into()))?;
        let turn = self
            .turn
            .as_deref()
            .and_then(Side::from_sfen_turn)
            .ok_or_else(|| RulesError::Backend(format!("reply without valid turn for '{sfen}'")))?;
        Ok(BridgeBoard { sfen, turn })
    }
}

/// [`RulesEngine`] backed by a rules helper process (for example a small
/// script around an existing shogi library).
pub struct BridgeRules {
    process: JsonLineProcess,
}

impl BridgeRules {
    pub fn new(config: ProcessConfig) -> Self {
        Self::with_process(JsonLineProcess::new(config))
    }

    pub fn with_process(process: JsonLineProcess) -> Self {
        Self { process }
    }

    /// Spawn the rules helper now instead of on the first `position`.
    pub fn start(&mut self) -> Result<(), BridgeError> {
        self.process.start()
    }

    fn call(&mut self, request: &RulesRequest<'_>) -> Result<RulesReply, RulesError> {
        self.process
            .request(request)
            .map_err(|e| RulesError::Backend(e.to_string()))
    }
}

impl RulesEngine for BridgeRules {
    type Board = BridgeBoard;

    fn start_position(&mut self) -> Result<BridgeBoard, RulesError> {
        self.parse_position(STARTPOS_SFEN)
    }

    fn parse_position(&mut self, sfen: &str) -> Result<BridgeBoard, RulesError> {
        let reply = self.call(&RulesRequest::Parse { sfen })?;
        if !reply.ok {
            return Err(RulesError::InvalidSfen(reply.error_text()));
        }
        reply.into_board()
    }

    fn serialize(&self, board: &BridgeBoard) -> String {
        board.sfen.clone()
    }

    fn side_to_move(&self, board: &BridgeBoard) -> Side {
        board.turn
    }

    fn legal_moves(&mut self, board: &BridgeBoard) -> Result<Vec<String>, RulesError> {
        let reply = self.call(&RulesRequest::LegalMoves { sfen: &board.sfen })?;
        if !reply.ok {
            return Err(RulesError::Backend(reply.error_text()));
        }
        reply
            .moves
            .ok_or_else(|| RulesError::Backend("reply without moves".into()))
    }

    fn apply_move(&mut self, board: &BridgeBoard, mv: &str) -> Result<BridgeBoard, RulesError> {
        let reply = self.call(&RulesRequest::Apply {
            sfen: &board.sfen,
            mv,
        })?;
        if !reply.ok {
            debug!(%mv, error = %reply.error_text(), "Helper rejected move");
            return Err(RulesError::IllegalMove(mv.to_string()));
        }
        reply.into_board()
    }

    fn find_forced_mate(
        &mut self,
        board: &BridgeBoard,
        horizon: u32,
    ) -> Result<Option<String>, RulesError> {
        let reply = self.call(&RulesRequest::Mate {
            sfen: &board.sfen,
            ply: horizon,
        })?;
        if !reply.ok {
            return Err(RulesError::Backend(reply.error_text()));
        }
        Ok(reply.mv)
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod rules_tests;
