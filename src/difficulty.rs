use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Attempt-limit presets offered in both front ends
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// `None` means unlimited
    pub fn attempt_limit(&self) -> Option<u32> {
        match self {
            Difficulty::Easy => None,
            Difficulty::Normal => Some(10),
            Difficulty::Hard => Some(5),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (unlimited attempts)",
            Difficulty::Normal => "Normal (10 attempts)",
            Difficulty::Hard => "Hard (5 attempts)",
        }
    }

    /// Menu key: "1", "2" or "3"
    pub fn menu_key(&self) -> char {
        match self {
            Difficulty::Easy => '1',
            Difficulty::Normal => '2',
            Difficulty::Hard => '3',
        }
    }

    pub fn from_menu_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.menu_key() == key)
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Normal => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Normal,
        }
    }
}
