use thiserror::Error;

/// Errors raised by the round engine and the shared input validation.
///
/// Everything except `InvalidRange` and `InvalidAttemptLimit` is recoverable
/// by reprompting the player.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },
    #[error("an attempt limit must allow at least one guess")]
    InvalidAttemptLimit,
    #[error("{guess} is outside the range {min} to {max}")]
    OutOfRange { guess: i64, min: i64, max: i64 },
    #[error("the round is already over")]
    RoundOver,
    #[error("no guess entered")]
    EmptyInput,
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
