//! Shapes on the wire: the JSON the backend speaks must decode into the
//! domain types without loss, and unknown statuses must stay harmless.

use sea_battle::domain::{BackendStatus, MoveOutcome, StatusSnapshot};
use sea_battle::{Board, Cell};

#[test]
fn test_status_decodes_lowercase() {
    let snap: StatusSnapshot =
        serde_json::from_str(r#"{"status":"battle","current_turn":"user-1"}"#).unwrap();
    assert_eq!(snap.status, BackendStatus::Battle);
    assert_eq!(snap.current_turn.as_deref(), Some("user-1"));
    assert_eq!(snap.last_move, None);
}

#[test]
fn test_backend_internal_status_decodes_to_unknown() {
    // statuses this client does not know must not be decode errors
    let snap: StatusSnapshot =
        serde_json::from_str(r#"{"status":"awaiting_review"}"#).unwrap();
    assert_eq!(snap.status, BackendStatus::Unknown);
}

#[test]
fn test_move_outcome_optional_fields_default() {
    let outcome: MoveOutcome = serde_json::from_str(r#"{"hit":false}"#).unwrap();
    assert!(!outcome.hit);
    assert!(!outcome.sunk);
    assert!(!outcome.game_over);
    assert_eq!(outcome.prize, None);

    let outcome: MoveOutcome = serde_json::from_str(
        r#"{"hit":true,"sunk":true,"game_over":true,"prize":250}"#,
    )
    .unwrap();
    assert_eq!(outcome.prize, Some(250));
}

#[test]
fn test_last_move_carries_coordinate() {
    let snap: StatusSnapshot = serde_json::from_str(
        r#"{"status":"battle","current_turn":"me","last_move":{"x":4,"y":7,"hit":true,"sunk":true}}"#,
    )
    .unwrap();
    let mv = snap.last_move.unwrap();
    assert_eq!((mv.x, mv.y), (4, 7));
    assert!(mv.hit && mv.sunk && !mv.game_over);
}

#[test]
fn test_board_snapshot_serializes_as_nested_arrays() {
    let mut board = Board::new();
    board.set(1, 0, Cell::Ship).unwrap();
    let json = serde_json::to_value(board.snapshot()).unwrap();
    assert_eq!(json[0][1], 2);
    assert_eq!(json[0][0], 0);
    assert_eq!(json.as_array().unwrap().len(), 10);
}
