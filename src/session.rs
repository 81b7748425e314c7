use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::{GameError, Result};
use crate::proximity::{Direction, Proximity};
use crate::score::ScoreRecord;

pub const DEFAULT_MIN: i64 = 1;
pub const DEFAULT_MAX: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    Won,
    Exhausted,
}

/// Result of one accepted guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    pub guess: i64,
    pub direction: Direction,
    pub proximity: Proximity,
    pub attempts_used: u32,
    pub is_won: bool,
    pub is_exhausted: bool,
}

impl GuessOutcome {
    /// One-line feedback, e.g. "Too high. Close, keep going."
    pub fn hint(&self) -> String {
        if self.is_won {
            Direction::Exact.hint().to_string()
        } else {
            format!("{} {}", self.direction.hint(), self.proximity.hint())
        }
    }
}

/// State of a single round: the secret, the attempts spent and the clock.
///
/// Only [`SessionState::submit_guess`] mutates it. The secret stays hidden
/// until the round is over.
#[derive(Debug, Clone)]
pub struct SessionState {
    secret: i64,
    min: i64,
    max: i64,
    attempts_used: u32,
    attempt_limit: Option<u32>,
    started_at: Instant,
    finished_after: Option<Duration>,
    status: RoundStatus,
}

/// Start a round with a secret drawn uniformly from `min..=max`.
pub fn start_round(min: i64, max: i64, attempt_limit: Option<u32>) -> Result<SessionState> {
    SessionState::start(min, max, attempt_limit)
}

/// Trim and parse a player's guess.
pub fn parse_guess(text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GameError::EmptyInput);
    }
    text.parse::<i64>().map_err(|_| GameError::NotANumber(text.to_string()))
}

fn validate(min: i64, max: i64, attempt_limit: Option<u32>) -> Result<()> {
    if min > max {
        return Err(GameError::InvalidRange { min, max });
    }
    if attempt_limit == Some(0) {
        return Err(GameError::InvalidAttemptLimit);
    }
    Ok(())
}

impl SessionState {
    pub fn start(min: i64, max: i64, attempt_limit: Option<u32>) -> Result<Self> {
        Self::start_with_rng(min, max, attempt_limit, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        min: i64,
        max: i64,
        attempt_limit: Option<u32>,
        rng: &mut R,
    ) -> Result<Self> {
        validate(min, max, attempt_limit)?;
        let secret = rng.gen_range(min..=max);
        Ok(Self::new_unchecked(secret, min, max, attempt_limit))
    }

    /// Start a round around a known secret. Used for scripted play and tests.
    pub fn with_secret(
        min: i64,
        max: i64,
        attempt_limit: Option<u32>,
        secret: i64,
    ) -> Result<Self> {
        validate(min, max, attempt_limit)?;
        if !(min..=max).contains(&secret) {
            return Err(GameError::OutOfRange {
                guess: secret,
                min,
                max,
            });
        }
        Ok(Self::new_unchecked(secret, min, max, attempt_limit))
    }

    fn new_unchecked(secret: i64, min: i64, max: i64, attempt_limit: Option<u32>) -> Self {
        tracing::info!(min, max, ?attempt_limit, "round started");
        Self {
            secret,
            min,
            max,
            attempts_used: 0,
            attempt_limit,
            started_at: Instant::now(),
            finished_after: None,
            status: RoundStatus::InProgress,
        }
    }

    pub fn submit_guess(&mut self, guess: i64) -> Result<GuessOutcome> {
        if self.is_over() {
            return Err(GameError::RoundOver);
        }
        if !self.range().contains(&guess) {
            return Err(GameError::OutOfRange {
                guess,
                min: self.min,
                max: self.max,
            });
        }

        self.attempts_used += 1;
        let direction = Direction::of(guess, self.secret);
        let proximity = Proximity::classify(guess, self.secret);
        let is_won = guess == self.secret;
        let is_exhausted = !is_won && self.attempt_limit == Some(self.attempts_used);

        if is_won {
            self.finish(RoundStatus::Won);
        } else if is_exhausted {
            self.finish(RoundStatus::Exhausted);
        }

        tracing::debug!(guess, attempts = self.attempts_used, %proximity, "guess submitted");

        Ok(GuessOutcome {
            guess,
            direction,
            proximity,
            attempts_used: self.attempts_used,
            is_won,
            is_exhausted,
        })
    }

    fn finish(&mut self, status: RoundStatus) {
        let elapsed = self.started_at.elapsed();
        self.finished_after = Some(elapsed);
        self.status = status;
        tracing::info!(
            ?status,
            attempts = self.attempts_used,
            seconds = elapsed.as_secs_f64(),
            "round finished"
        );
    }

    pub fn range(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn attempt_limit(&self) -> Option<u32> {
        self.attempt_limit
    }

    pub fn attempts_remaining(&self) -> Option<u32> {
        self.attempt_limit.map(|limit| limit.saturating_sub(self.attempts_used))
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != RoundStatus::InProgress
    }

    pub fn is_won(&self) -> bool {
        self.status == RoundStatus::Won
    }

    /// Time since the round started, frozen once it is over.
    pub fn elapsed(&self) -> Duration {
        self.finished_after.unwrap_or_else(|| self.started_at.elapsed())
    }

    /// The secret, available only once the round is over.
    pub fn reveal(&self) -> Option<i64> {
        self.is_over().then_some(self.secret)
    }

    /// Candidate score record for a won round.
    pub fn winning_record(&self) -> Option<ScoreRecord> {
        self.is_won().then(|| ScoreRecord::new(self.attempts_used, self.elapsed()))
    }
}
