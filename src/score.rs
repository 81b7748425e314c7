use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::app_dirs::AppDirs;

/// Best result ever recorded on this host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreRecord {
    pub best_attempts: u32,
    pub best_duration_seconds: f64,
    pub saved_at: DateTime<Local>,
}

impl ScoreRecord {
    pub fn new(attempts: u32, duration: Duration) -> Self {
        Self {
            best_attempts: attempts,
            best_duration_seconds: (duration.as_secs_f64() * 100.0).round() / 100.0,
            saved_at: Local::now(),
        }
    }

    fn check(self) -> Result<Self, ScoreError> {
        if self.best_attempts == 0 {
            return Err(ScoreError::Invalid("best_attempts must be positive".into()));
        }
        if !self.best_duration_seconds.is_finite() || self.best_duration_seconds < 0.0 {
            return Err(ScoreError::Invalid(format!(
                "best_duration_seconds out of range: {}",
                self.best_duration_seconds
            )));
        }
        Ok(self)
    }

    /// e.g. "3 attempts in 12.50 s"
    pub fn summary(&self) -> String {
        format!(
            "{} attempt{} in {:.2} s",
            self.best_attempts,
            if self.best_attempts == 1 { "" } else { "s" },
            self.best_duration_seconds
        )
    }
}

/// Decide whether `candidate` replaces `current`.
///
/// Only strictly fewer attempts win; duration never breaks a tie.
#[must_use]
pub fn update_if_better(
    current: Option<&ScoreRecord>,
    candidate: ScoreRecord,
) -> (ScoreRecord, bool) {
    match current {
        Some(current) if candidate.best_attempts >= current.best_attempts => {
            (current.clone(), false)
        }
        _ => (candidate, true),
    }
}

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("score file holds an invalid record: {0}")]
    Invalid(String),
}

/// Persistence for the single best-score record.
///
/// `load` and `save` never fail: problems are logged and degrade to
/// "no record" and "not saved".
pub trait ScoreStore {
    /// Missing file is `Ok(None)`.
    fn try_load(&self) -> Result<Option<ScoreRecord>, ScoreError>;
    fn try_save(&self, record: &ScoreRecord) -> Result<(), ScoreError>;

    fn load(&self) -> Option<ScoreRecord> {
        self.try_load().unwrap_or_else(|e| {
            tracing::warn!("ignoring score record: {e}");
            None
        })
    }

    /// Returns whether the record reached the store.
    fn save(&self, record: &ScoreRecord) -> bool {
        match self.try_save(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("could not save score record: {e}");
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::highscore_path().unwrap_or_else(|| PathBuf::from("guessr_highscore.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for FileScoreStore {
    fn try_load(&self) -> Result<Option<ScoreRecord>, ScoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice::<ScoreRecord>(&bytes)?;
        record.check().map(Some)
    }

    fn try_save(&self, record: &ScoreRecord) -> Result<(), ScoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(record)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub did_update: bool,
    /// False when the record changed in memory but could not be written.
    pub persisted: bool,
    pub best: ScoreRecord,
}

/// The store plus the best record known to this process.
///
/// Loaded once at startup; the in-memory record stays authoritative even
/// when saving fails.
pub struct Scoreboard {
    store: Box<dyn ScoreStore>,
    best: Option<ScoreRecord>,
}

impl Scoreboard {
    pub fn load(store: Box<dyn ScoreStore>) -> Self {
        let best = store.load();
        Self { store, best }
    }

    pub fn best(&self) -> Option<&ScoreRecord> {
        self.best.as_ref()
    }

    pub fn record(&mut self, candidate: ScoreRecord) -> RecordOutcome {
        let (best, did_update) = update_if_better(self.best.as_ref(), candidate);
        let persisted = did_update && self.store.save(&best);
        if did_update {
            tracing::info!(attempts = best.best_attempts, persisted, "new best score");
            self.best = Some(best.clone());
        }
        RecordOutcome {
            did_update,
            persisted,
            best,
        }
    }
}

impl std::fmt::Debug for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoreboard").field("best", &self.best).finish()
    }
}
