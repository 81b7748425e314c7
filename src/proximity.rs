use std::cmp::Ordering;

/// Qualitative distance between a guess and the secret.
///
/// Variants are declared from closest to farthest so the derived `Ord`
/// follows distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display)]
pub enum Proximity {
    Exact,
    VeryClose,
    Close,
    Far,
    VeryFar,
}

impl Proximity {
    pub fn classify(guess: i64, secret: i64) -> Self {
        match guess.abs_diff(secret) {
            0 => Proximity::Exact,
            1..=2 => Proximity::VeryClose,
            3..=7 => Proximity::Close,
            8..=20 => Proximity::Far,
            _ => Proximity::VeryFar,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Proximity::Exact => "Exactly right!",
            Proximity::VeryClose => "Very close!",
            Proximity::Close => "Close, keep going.",
            Proximity::Far => "Somewhat far.",
            Proximity::VeryFar => "Very far.",
        }
    }
}

/// Shorthand for [`Proximity::classify`].
pub fn classify(guess: i64, secret: i64) -> Proximity {
    Proximity::classify(guess, secret)
}

/// Where the guess sits relative to the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Direction {
    Below,
    Above,
    Exact,
}

impl Direction {
    pub fn of(guess: i64, secret: i64) -> Self {
        match guess.cmp(&secret) {
            Ordering::Less => Direction::Below,
            Ordering::Greater => Direction::Above,
            Ordering::Equal => Direction::Exact,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Direction::Below => "Too low.",
            Direction::Above => "Too high.",
            Direction::Exact => "That's it!",
        }
    }
}
