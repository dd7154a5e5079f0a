use crate::{Decision, PositionCommand, PositionError, PositionSpec, Provenance, SFEN_FIELDS};

/// Keyword sent in place of a move when the engine gives up.
pub const RESIGN: &str = "resign";

/// Parse the arguments of a `position` command (everything after `position`).
///
/// Supports:
/// - `startpos [moves m1 m2 ...]`
/// - `sfen <board> <turn> <hands> <move number> [moves m1 m2 ...]`
pub fn parse_position_args(args: &[&str]) -> Result<PositionCommand, PositionError> {
    let invalid = |reason: &str| PositionError::InvalidSpecification(reason.to_string());

    let (spec, rest) = match args.first().copied() {
        Some("startpos") => (PositionSpec::StartPos, &args[1..]),
        Some("sfen") => {
            let fields: Vec<&str> = args[1..]
                .iter()
                .copied()
                .take_while(|&t| t != "moves")
                .collect();
            if fields.len() != SFEN_FIELDS {
                return Err(invalid(&format!(
                    "expected {SFEN_FIELDS} sfen fields, got {}",
                    fields.len()
                )));
            }
            (PositionSpec::Sfen(fields.join(" ")), &args[1 + SFEN_FIELDS..])
        }
        Some(other) => return Err(invalid(&format!("unknown position kind '{other}'"))),
        None => return Err(invalid("missing position kind")),
    };

    let moves = match rest.split_first() {
        None => Vec::new(),
        Some((&"moves", moves)) => moves.iter().map(|m| m.to_string()).collect(),
        Some((token, _)) => return Err(invalid(&format!("unexpected token '{token}'"))),
    };

    Ok(PositionCommand { spec, moves })
}

/// Parse `setoption name <name> [value <value>]`.
///
/// Names and values may contain spaces. A missing value (button options)
/// yields an empty string.
pub fn parse_setoption_args(args: &[&str]) -> Option<(String, String)> {
    let (&first, rest) = args.split_first()?;
    if first != "name" {
        return None;
    }
    let value_at = rest.iter().position(|&t| t == "value");
    let (name, value) = match value_at {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, &[][..]),
    };
    if name.is_empty() {
        return None;
    }
    Some((name.join(" "), value.join(" ")))
}

/// `bestmove` line for a move, or the resignation keyword.
pub fn bestmove_line(mv: Option<&str>) -> String {
    format!("bestmove {}", mv.unwrap_or(RESIGN))
}

/// Response lines for a decision: `info` lines first, then exactly one
/// `bestmove` line.
pub fn decision_lines(decision: &Decision) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    match decision.provenance {
        Provenance::OracleValidated => {
            if let (Some(score), Some(mv)) = (decision.score, decision.best_move.as_deref()) {
                lines.push(format!("info depth 0 score cp {score} pv {mv}"));
            }
        }
        Provenance::TacticalForcedWin
        | Provenance::FallbackMalformedOracle
        | Provenance::FallbackIllegalOracleMove => {
            if let Some(diag) = &decision.diagnostic {
                lines.push(format!("info string {diag}"));
            }
        }
        Provenance::Resign => {}
    }
    lines.push(bestmove_line(decision.best_move.as_deref()));
    lines
}

#[cfg(test)]
#[path = "usi_tests.rs"]
mod usi_tests;
