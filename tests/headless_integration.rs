use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use guessr::app::{App, AppState};
use guessr::config::Config;
use guessr::difficulty::Difficulty;
use guessr::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};
use guessr::score::{FileScoreStore, ScoreStore, Scoreboard};

fn key(c: char) -> GameEvent {
    GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn enter() -> GameEvent {
    GameEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

// Headless integration using the internal runtime + App without a TTY
// Verifies that a full round completes via Runner/TestEventSource.
#[test]
fn headless_round_is_won_and_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("highscore.json");
    let scoreboard = Scoreboard::load(Box::new(FileScoreStore::with_path(&path)));
    let mut app = App::new(Config::default(), scoreboard).with_secret(Some(42));

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // Producer: pick hard, start, guess 50 then 42, then quit
    for ev in [key('3'), key('n'), key('5'), key('0'), enter(), key('4'), key('2'), enter()] {
        tx.send(ev).unwrap();
    }
    tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
        .unwrap();
    tx.send(key('y')).unwrap();

    let mut ticks = 0;
    for _ in 0..200u32 {
        match runner.step() {
            GameEvent::Tick => {
                ticks += 1;
                app.on_tick();
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => app.on_key(key),
            GameEvent::Closed => break,
        }
        if app.should_quit {
            break;
        }
    }

    assert!(app.should_quit);
    assert_eq!(app.state, AppState::Finished);
    assert_eq!(app.difficulty(), Difficulty::Hard);
    assert_eq!(ticks, 0, "queued keys should be consumed before any tick");

    let round = app.round.as_ref().unwrap();
    assert!(round.is_won());
    assert_eq!(round.attempts_used(), 2);

    let saved = FileScoreStore::with_path(&path).load().unwrap();
    assert_eq!(saved.best_attempts, 2);
}

#[test]
fn headless_ticks_refresh_timer_only() {
    let dir = tempfile::tempdir().unwrap();
    let scoreboard = Scoreboard::load(Box::new(FileScoreStore::with_path(
        dir.path().join("highscore.json"),
    )));
    let mut app = App::new(Config::default(), scoreboard).with_secret(Some(42));
    app.new_round().unwrap();

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(10)),
    );

    for _ in 0..5u32 {
        if let GameEvent::Tick = runner.step() {
            app.on_tick();
        }
    }

    let round = app.round.as_ref().unwrap();
    assert_eq!(round.attempts_used(), 0);
    assert!(!round.is_over());
    assert!(app.elapsed_display >= Duration::from_millis(30));
}
