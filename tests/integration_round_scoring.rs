use assert_matches::assert_matches;
use guessr::score::{FileScoreStore, ScoreStore, Scoreboard};
use guessr::{update_if_better, Direction, GameError, Proximity, SessionState};

/// End-to-end: rounds feed the scoreboard the same way both front ends do.

#[test]
fn first_win_establishes_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("highscore.json");
    let mut board = Scoreboard::load(Box::new(FileScoreStore::with_path(&path)));
    assert!(board.best().is_none());

    let mut round = SessionState::with_secret(1, 100, None, 60).unwrap();
    for guess in [10, 80, 60] {
        round.submit_guess(guess).unwrap();
    }
    round.submit_guess(61).unwrap_err();
    let candidate = round.winning_record().unwrap();
    let (record, did_update) = update_if_better(board.best(), candidate.clone());
    assert!(did_update);
    assert_eq!(record.best_attempts, 3);

    let outcome = board.record(candidate);
    assert!(outcome.did_update && outcome.persisted);
    assert_eq!(FileScoreStore::with_path(&path).load().unwrap().best_attempts, 3);
}

#[test]
fn slower_win_does_not_replace_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("highscore.json");
    let store = FileScoreStore::with_path(&path);

    let mut quick = SessionState::with_secret(1, 100, None, 5).unwrap();
    for guess in [1, 3, 5] {
        quick.submit_guess(guess).unwrap();
    }
    assert!(store.save(&quick.winning_record().unwrap()));
    let before = std::fs::read_to_string(&path).unwrap();

    let mut board = Scoreboard::load(Box::new(FileScoreStore::with_path(&path)));
    let mut slow = SessionState::with_secret(1, 100, Some(10), 5).unwrap();
    for guess in [100, 50, 25, 12, 5] {
        slow.submit_guess(guess).unwrap();
    }
    let outcome = board.record(slow.winning_record().unwrap());
    assert!(!outcome.did_update);
    assert_eq!(outcome.best.best_attempts, 3);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn corrupt_record_file_does_not_stop_play() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("highscore.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let mut board = Scoreboard::load(Box::new(FileScoreStore::with_path(&path)));
    assert!(board.best().is_none());

    let mut round = SessionState::with_secret(1, 100, Some(5), 50).unwrap();
    let outcome = round.submit_guess(50).unwrap();
    assert_eq!(outcome.direction, Direction::Exact);
    assert_eq!(outcome.proximity, Proximity::Exact);

    // the corrupt file gets replaced by a valid record
    assert!(board.record(round.winning_record().unwrap()).persisted);
    assert_eq!(FileScoreStore::with_path(&path).load().unwrap().best_attempts, 1);
}

#[test]
fn exhausted_round_has_no_record() {
    let mut round = SessionState::with_secret(1, 100, Some(5), 7).unwrap();
    for guess in [100, 90, 80, 70, 60] {
        round.submit_guess(guess).unwrap();
    }
    assert!(round.winning_record().is_none());
    assert_matches!(round.submit_guess(7), Err(GameError::RoundOver));
}
