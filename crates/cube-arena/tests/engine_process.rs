//! End-to-end tests against small shell-script engines.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cube_arena::engine_client::{
    EngineClient, EngineError, EngineTimeouts, EngineValidationError, MoveEngine,
};
use cube_arena::game_runner::{GameRunner, Winner};
use cube_arena::manager::TournamentManager;
use cube_arena::tournament_config::{OutputFormat, TournamentConfig};
use cube_arena::weight_matrix::WeightMatrix;
use cube_core::{Board, Mark, Side, Weights};
use cube_protocol::{MoveRequest, ProtocolError};
use tempfile::TempDir;

/// Fills the first empty cell and reports game over once `end_at` marks are down.
fn filler_script(end_at: usize) -> String {
    format!(
        r#"#!/bin/sh
if [ "$1" = "--help" ]; then
    echo "usage: engine -t h|m BOARD -w WEIGHTS -q"
    exit 0
fi
mark=X
[ "$2" = "m" ] && mark=O
board="$3"
idx=$(printf '%s' "$board" | awk '{{ print index($0, ".") }}')
new=$(printf '%s' "$board" | awk -v i="$idx" -v m="$mark" '{{ print substr($0, 1, i - 1) m substr($0, i + 1) }}')
marks=$(( $(printf '%s' "$new" | tr -cd 'XO' | wc -c) ))
if [ "$marks" -ge {end_at} ]; then
    printf '%s game_over\n%s\n' "$idx" "$new"
else
    printf '%s %s\n' "$idx" "$new"
fi
"#
    )
}

fn write_engine(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn client(path: &Path) -> EngineClient {
    let timeouts = EngineTimeouts {
        help: Duration::from_secs(5),
        per_move: Duration::from_secs(5),
    };
    EngineClient::new(path, timeouts).unwrap()
}

fn matrix(label: &str) -> WeightMatrix {
    WeightMatrix::from_values(label, &[0; 25]).unwrap()
}

fn request(side: Side, board: &str) -> MoveRequest {
    MoveRequest::new(side, board.parse().unwrap(), Weights::new(&[0; 25]).unwrap())
}

#[tokio::test]
async fn test_validate_accepts_well_behaved_engine() {
    let dir = tempfile::tempdir().unwrap();
    let engine = client(&write_engine(&dir, "filler", &filler_script(64)));

    engine.validate().await.unwrap();
    // Stateless: a second check gives the same answer.
    engine.validate().await.unwrap();
}

#[tokio::test]
async fn test_move_request_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let engine = client(&write_engine(&dir, "filler", &filler_script(64)));

    let reply = engine
        .request_move(&request(Side::Second, &format!("{:.<64}", "X")))
        .await
        .unwrap();
    assert_eq!(reply.move_number, 2);
    assert!(!reply.game_over);
    assert_eq!(reply.board.count(Mark::O), 1);
}

#[tokio::test]
async fn test_full_game_through_process() {
    let dir = tempfile::tempdir().unwrap();
    let runner = GameRunner::new(client(&write_engine(&dir, "filler", &filler_script(7))));

    let result = runner
        .play_game(&matrix("first"), &matrix("second"))
        .await
        .unwrap();
    assert_eq!(result.move_count(), 7);
    assert_eq!(result.winner(), Winner::Player1);
    assert_eq!(result.winner_label(), Some("first"));
    assert_eq!(result.final_board().count(Mark::X), 4);
    assert_eq!(result.final_board().count(Mark::O), 3);
}

#[tokio::test]
async fn test_garbage_reply_is_protocol_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = "#!/bin/sh\necho 'not_a_number somegarbage'\n";
    let engine = client(&write_engine(&dir, "garbage", script));

    let err = engine
        .request_move(&request(Side::First, &Board::empty().to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Protocol(ProtocolError::InvalidMoveNumber(ref token)) if token == "not_a_number"
    ));
}

#[tokio::test]
async fn test_slow_engine_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_engine(&dir, "sleepy", "#!/bin/sh\nsleep 5\n");
    let timeouts = EngineTimeouts {
        help: Duration::from_millis(200),
        per_move: Duration::from_millis(200),
    };
    let engine = EngineClient::new(&path, timeouts).unwrap();

    let err = engine
        .request_move(&request(Side::First, &Board::empty().to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Timeout(d) if d == Duration::from_millis(200)));

    assert!(matches!(
        engine.validate().await,
        Err(EngineValidationError::HelpUnavailable(EngineError::Timeout(_)))
    ));
}

#[tokio::test]
async fn test_failing_exit_status_reported() {
    let dir = tempfile::tempdir().unwrap();
    let engine = client(&write_engine(&dir, "crash", "#!/bin/sh\necho boom >&2\nexit 3\n"));

    let err = engine
        .request_move(&request(Side::First, &Board::empty().to_string()))
        .await
        .unwrap_err();
    match err {
        EngineError::ExitStatus { code, stderr } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "boom");
        }
        other => panic!("Expected ExitStatus, got {:?}", other),
    }

    assert!(matches!(
        engine.validate().await,
        Err(EngineValidationError::HelpFailed(Some(3)))
    ));
}

#[tokio::test]
async fn test_validate_rejects_engine_that_does_not_move() {
    let dir = tempfile::tempdir().unwrap();
    let empty = Board::empty().to_string();
    let script = format!("#!/bin/sh\n[ \"$1\" = \"--help\" ] && exit 1\necho \"1 {}\"\n", empty);
    let engine = client(&write_engine(&dir, "lazy", &script));

    assert!(matches!(
        engine.validate().await,
        Err(EngineValidationError::MoveFailed(EngineError::Protocol(
            ProtocolError::MoveNotApplied { move_number: 1, .. }
        )))
    ));
}

#[tokio::test]
async fn test_tournament_with_process_engine() {
    let dir = tempfile::tempdir().unwrap();
    let runner = GameRunner::new(client(&write_engine(&dir, "filler", &filler_script(4))));
    let config = TournamentConfig::new(
        vec![matrix("a"), matrix("b"), matrix("c")],
        1,
        false,
        vec![OutputFormat::Json],
        None,
    )
    .unwrap();

    let mut manager = TournamentManager::new(config, runner);
    let report = manager.run().await.unwrap();
    assert_eq!(report.total_games_played(), 6);
    // Four moves: the second mover always wins.
    assert!(report
        .games()
        .iter()
        .all(|g| g.winner() == Winner::Player2 && g.move_count() == 4));
    assert!((report.overall_first_player_advantage() + 0.5).abs() < 1e-9);
}
