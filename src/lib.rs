// Library surface for headless/integration tests and reuse.
// Both front ends (console and TUI) drive the same round engine and scoreboard.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod console;
pub mod difficulty;
pub mod error;
pub mod logging;
pub mod proximity;
pub mod runtime;
pub mod score;
pub mod session;
pub mod ui;

pub use error::GameError;
pub use proximity::{classify, Direction, Proximity};
pub use score::{update_if_better, ScoreRecord};
pub use session::{start_round, GuessOutcome, SessionState};

/// Interval between elapsed-time refreshes in the TUI
pub const TICK_RATE_MS: u64 = 100;
