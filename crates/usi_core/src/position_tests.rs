use super::*;
use crate::test_support::{Countdown, CountdownRules};

#[test]
fn test_current_without_position() {
    let positions: PositionManager<Countdown> = PositionManager::new();
    assert_eq!(positions.current().unwrap_err(), PositionError::NoPosition);
}

#[test]
fn test_establish_startpos_replays_moves() {
    let mut rules = CountdownRules::new();
    let mut positions = PositionManager::new();

    let cmd = PositionCommand::startpos().with_moves(["take1", "take3"]);
    let pos = positions.establish(&mut rules, &cmd).unwrap();

    assert_eq!(pos.board().stones, 6);
    assert_eq!(pos.side_to_move(), Side::First);
    assert_eq!(pos.moves(), ["take1", "take3"]);
    assert_eq!(pos.origin(), &PositionSpec::StartPos);
}

#[test]
fn test_roundtrip_startpos_moves_matches_sfen() {
    let mut rules = CountdownRules::new();

    let mut via_moves = PositionManager::new();
    via_moves
        .establish(
            &mut rules,
            &PositionCommand::startpos().with_moves(["take1", "take2", "take2"]),
        )
        .unwrap();
    let replayed = via_moves.serialized(&rules).unwrap();

    let mut via_sfen = PositionManager::new();
    via_sfen
        .establish(&mut rules, &PositionCommand::sfen(replayed.clone()))
        .unwrap();

    assert_eq!(replayed, "5 w - 4");
    assert_eq!(via_sfen.serialized(&rules).unwrap(), replayed);
}

#[test]
fn test_invalid_sfen_keeps_previous_position() {
    let mut rules = CountdownRules::new();
    let mut positions = PositionManager::new();
    positions
        .establish(&mut rules, &PositionCommand::sfen("8 w - 3"))
        .unwrap();

    let err = positions
        .establish(&mut rules, &PositionCommand::sfen("eight w - 3"))
        .unwrap_err();
    assert!(matches!(err, PositionError::InvalidSpecification(_)));

    let err = positions
        .establish(&mut rules, &PositionCommand::sfen("8 w -"))
        .unwrap_err();
    assert!(matches!(err, PositionError::InvalidSpecification(_)));

    assert_eq!(positions.serialized(&rules).unwrap(), "8 w - 3");
}

#[test]
fn test_illegal_replay_move_is_all_or_nothing() {
    let mut rules = CountdownRules::new();
    let mut positions = PositionManager::new();
    positions
        .establish(&mut rules, &PositionCommand::startpos())
        .unwrap();

    let cmd = PositionCommand::sfen("4 b - 1").with_moves(["take3", "take2"]);
    let err = positions.establish(&mut rules, &cmd).unwrap_err();

    assert_eq!(
        err,
        PositionError::IllegalReplayMove {
            index: 1,
            mv: "take2".to_string()
        }
    );
    assert_eq!(positions.serialized(&rules).unwrap(), "10 b - 1");
    assert!(positions.current().unwrap().moves().is_empty());
}

#[test]
fn test_apply_legal_and_illegal() {
    let mut rules = CountdownRules::new();
    let mut positions = PositionManager::new();
    positions
        .establish(&mut rules, &PositionCommand::sfen("2 b - 7"))
        .unwrap();

    assert_eq!(
        positions.apply(&mut rules, "take3").unwrap_err(),
        PositionError::IllegalMove("take3".to_string())
    );

    positions.apply(&mut rules, "take2").unwrap();
    let pos = positions.current().unwrap();
    assert_eq!(pos.board().stones, 0);
    assert_eq!(pos.side_to_move(), Side::Second);
    assert_eq!(pos.moves(), ["take2"]);
}

#[test]
fn test_apply_without_position() {
    let mut rules = CountdownRules::new();
    let mut positions = PositionManager::new();
    assert_eq!(
        positions.apply(&mut rules, "take1").unwrap_err(),
        PositionError::NoPosition
    );
}

#[test]
fn test_rules_backend_failure_is_surfaced() {
    let mut rules = CountdownRules {
        fail_legal: true,
        ..CountdownRules::new()
    };
    let mut positions = PositionManager::new();

    let err = positions
        .establish(&mut rules, &PositionCommand::startpos().with_moves(["take1"]))
        .unwrap_err();
    assert!(matches!(err, PositionError::Rules(RulesError::Backend(_))));
    assert_eq!(positions.current().unwrap_err(), PositionError::NoPosition);
}
