use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::difficulty::Difficulty;
use crate::error::GameError;
use crate::score::Scoreboard;
use crate::session::{parse_guess, SessionState};

/// Longest guess the input field accepts, sign included
const MAX_INPUT_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Playing,
    Finished,
}

/// What a confirmed Esc/Ctrl+C does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitScope {
    Round,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Warning,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub tone: Tone,
}

impl Message {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// State of the terminal UI. Rendering lives in `ui`.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub state: AppState,
    pub round: Option<SessionState>,
    pub input: String,
    pub message: Message,
    pub record_note: Option<String>,
    pub confirm_quit: Option<QuitScope>,
    pub should_quit: bool,
    /// Elapsed time shown on screen, refreshed by ticks
    pub elapsed_display: Duration,
    scoreboard: Scoreboard,
    fixed_secret: Option<i64>,
}

impl App {
    pub fn new(config: Config, scoreboard: Scoreboard) -> Self {
        let message = Message::new(
            format!(
                "Pick a difficulty and press n to guess a number between {} and {}.",
                config.min, config.max
            ),
            Tone::Info,
        );
        Self {
            config,
            state: AppState::Menu,
            round: None,
            input: String::new(),
            message,
            record_note: None,
            confirm_quit: None,
            should_quit: false,
            elapsed_display: Duration::ZERO,
            scoreboard,
            fixed_secret: None,
        }
    }

    /// Every round uses this secret instead of a random one
    pub fn with_secret(mut self, secret: Option<i64>) -> Self {
        self.fixed_secret = secret;
        self
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    pub fn new_round(&mut self) -> Result<(), GameError> {
        let Config {
            difficulty,
            min,
            max,
        } = self.config;
        let round = match self.fixed_secret {
            Some(secret) => {
                SessionState::with_secret(min, max, difficulty.attempt_limit(), secret)?
            }
            None => SessionState::start(min, max, difficulty.attempt_limit())?,
        };
        let limit = match round.attempt_limit() {
            Some(limit) => format!("You have {limit} attempts."),
            None => "Unlimited attempts.".to_string(),
        };
        self.message = Message::new(
            format!("I picked a number between {min} and {max}. {limit} Good luck!"),
            Tone::Info,
        );
        self.round = Some(round);
        self.input.clear();
        self.record_note = None;
        self.elapsed_display = Duration::ZERO;
        self.state = AppState::Playing;
        Ok(())
    }

    pub fn push_char(&mut self, c: char) {
        let accepted = c.is_ascii_digit() || (c == '-' && self.input.is_empty());
        if accepted && self.input.len() < MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Submit the contents of the input field as a guess.
    pub fn submit(&mut self) {
        let Some(round) = self.round.as_mut().filter(|r| !r.is_over()) else {
            self.message = Message::new("Press n to start a new round first.", Tone::Warning);
            return;
        };

        let guess = match parse_guess(&self.input) {
            Ok(guess) => guess,
            Err(e) => {
                let range = round.range();
                self.message = Message::new(
                    format!("{e}. Enter a number between {} and {}.", range.start(), range.end()),
                    Tone::Warning,
                );
                self.input.clear();
                return;
            }
        };
        self.input.clear();

        let outcome = match round.submit_guess(guess) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.message = Message::new(e.to_string(), Tone::Warning);
                return;
            }
        };
        self.elapsed_display = round.elapsed();

        if outcome.is_won {
            let seconds = round.elapsed().as_secs_f64();
            self.message = Message::new(
                format!(
                    "Congratulations! {guess} is right. {} attempt{} in {seconds:.1} s.",
                    outcome.attempts_used,
                    if outcome.attempts_used == 1 { "" } else { "s" },
                ),
                Tone::Success,
            );
            if let Some(candidate) = round.winning_record() {
                let recorded = self.scoreboard.record(candidate);
                self.record_note = Some(if recorded.did_update {
                    "New record!".to_string()
                } else {
                    format!("Best so far: {}", recorded.best.summary())
                });
            }
            self.state = AppState::Finished;
        } else if outcome.is_exhausted {
            let secret = round.reveal().unwrap_or_default();
            self.message = Message::new(
                format!("Out of attempts. The number was {secret}."),
                Tone::Failure,
            );
            self.state = AppState::Finished;
        } else {
            let remaining = round
                .attempts_remaining()
                .map(|r| format!(" {r} left."))
                .unwrap_or_default();
            self.message = Message::new(
                format!("{guess}: {}{remaining}", outcome.hint()),
                Tone::Info,
            );
        }
    }

    /// Refresh the elapsed-time label. Never touches the round itself.
    pub fn on_tick(&mut self) {
        if let Some(round) = self.round.as_ref() {
            self.elapsed_display = round.elapsed();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');

        if let Some(scope) = self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm(scope),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.confirm_quit = None,
                // second ctrl+c quits outright
                _ if ctrl_c => self.should_quit = true,
                _ => {}
            }
            return;
        }

        if ctrl_c || key.code == KeyCode::Esc {
            self.confirm_quit = Some(if self.state == AppState::Playing {
                QuitScope::Round
            } else {
                QuitScope::App
            });
            return;
        }

        match self.state {
            AppState::Playing => match key.code {
                KeyCode::Char(c) => self.push_char(c),
                KeyCode::Backspace => self.backspace(),
                KeyCode::Enter => self.submit(),
                _ => {}
            },
            AppState::Menu | AppState::Finished => match key.code {
                KeyCode::Char(c @ '1'..='3') => {
                    if let Some(d) = Difficulty::from_menu_key(c) {
                        self.set_difficulty(d);
                    }
                }
                KeyCode::Left | KeyCode::Up => self.set_difficulty(self.difficulty().previous()),
                KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                    self.set_difficulty(self.difficulty().next())
                }
                KeyCode::Char('n') | KeyCode::Enter => {
                    if let Err(e) = self.new_round() {
                        self.message = Message::new(e.to_string(), Tone::Failure);
                    }
                }
                KeyCode::Char('q') => self.confirm_quit = Some(QuitScope::App),
                _ => {}
            },
        }
    }

    fn confirm(&mut self, scope: QuitScope) {
        self.confirm_quit = None;
        match scope {
            QuitScope::App => self.should_quit = true,
            QuitScope::Round => {
                tracing::info!("round abandoned");
                self.round = None;
                self.input.clear();
                self.state = AppState::Menu;
                self.message = Message::new("Round abandoned. Back to the menu.", Tone::Info);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{FileScoreStore, ScoreStore};
    use tempfile::{tempdir, TempDir};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_secret(secret: i64, difficulty: Difficulty) -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let store = FileScoreStore::with_path(dir.path().join("highscore.json"));
        let config = Config {
            difficulty,
            ..Config::default()
        };
        let app = App::new(config, Scoreboard::load(Box::new(store))).with_secret(Some(secret));
        (app, dir)
    }

    fn type_guess(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        app.on_key(key(KeyCode::Enter));
    }

    #[test]
    fn starts_in_menu() {
        let (app, _dir) = app_with_secret(42, Difficulty::Normal);
        assert_eq!(app.state, AppState::Menu);
        assert!(app.round.is_none());
    }

    #[test]
    fn menu_keys_pick_difficulty() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Normal);
        app.on_key(key(KeyCode::Char('3')));
        assert_eq!(app.difficulty(), Difficulty::Hard);
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.difficulty(), Difficulty::Easy);
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn win_records_score() {
        let (mut app, dir) = app_with_secret(42, Difficulty::Normal);
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Playing);

        type_guess(&mut app, "50");
        assert_eq!(app.message.text, "50: Too high. Somewhat far. 9 left.");
        type_guess(&mut app, "42");

        assert_eq!(app.state, AppState::Finished);
        assert_eq!(app.message.tone, Tone::Success);
        assert_eq!(app.record_note.as_deref(), Some("New record!"));
        let saved = FileScoreStore::with_path(dir.path().join("highscore.json"))
            .load()
            .unwrap();
        assert_eq!(saved.best_attempts, 2);
    }

    #[test]
    fn exhaustion_reveals_secret() {
        let (mut app, _dir) = app_with_secret(7, Difficulty::Hard);
        app.on_key(key(KeyCode::Enter));
        for guess in ["1", "2", "3", "4", "5"] {
            type_guess(&mut app, guess);
        }
        assert_eq!(app.state, AppState::Finished);
        assert_eq!(app.message.tone, Tone::Failure);
        assert!(app.message.text.contains("was 7"));
        assert!(app.scoreboard().best().is_none());
    }

    #[test]
    fn bad_input_does_not_cost_attempts() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Hard);
        app.new_round().unwrap();
        type_guess(&mut app, "101");
        assert_eq!(app.message.tone, Tone::Warning);
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.message.tone, Tone::Warning);
        assert_eq!(app.round.as_ref().unwrap().attempts_used(), 0);
    }

    #[test]
    fn input_field_only_takes_numbers() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Easy);
        app.new_round().unwrap();
        for c in ['-', 'a', '1', '-', '2', ' '] {
            app.push_char(c);
        }
        assert_eq!(app.input, "-12");
        app.on_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "-1");
    }

    #[test]
    fn submit_without_round_asks_to_start() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Easy);
        app.submit();
        assert_eq!(app.message.tone, Tone::Warning);
        assert!(app.round.is_none());
    }

    #[test]
    fn ticks_only_refresh_display() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Normal);
        app.new_round().unwrap();
        type_guess(&mut app, "10");
        for _ in 0..5 {
            app.on_tick();
        }
        let round = app.round.as_ref().unwrap();
        assert_eq!(round.attempts_used(), 1);
        assert!(!round.is_over());
    }

    #[test]
    fn esc_while_playing_abandons_round_after_confirm() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Normal);
        app.new_round().unwrap();
        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.confirm_quit, Some(QuitScope::Round));
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.confirm_quit, None);
        assert_eq!(app.state, AppState::Playing);

        app.on_key(key(KeyCode::Esc));
        app.on_key(key(KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.round.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn ctrl_c_in_menu_quits_after_confirm() {
        let (mut app, _dir) = app_with_secret(42, Difficulty::Normal);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.on_key(ctrl_c);
        assert_eq!(app.confirm_quit, Some(QuitScope::App));
        assert!(!app.should_quit);
        app.on_key(key(KeyCode::Char('y')));
        assert!(app.should_quit);
    }

    #[test]
    fn invalid_range_is_reported() {
        let dir = tempdir().unwrap();
        let store = FileScoreStore::with_path(dir.path().join("highscore.json"));
        let config = Config {
            difficulty: Difficulty::Easy,
            min: 10,
            max: 1,
        };
        let mut app = App::new(config, Scoreboard::load(Box::new(store)));
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Menu);
        assert_eq!(app.message.tone, Tone::Failure);
    }
}
