use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SCORES_FILE: &str = "scores.json";

/// Best score seen for each literal text.
pub type ScoreMap = HashMap<String, u32>;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to serialize scores: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How the score file looked when it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Missing,
    Unreadable(String),
    Corrupt(String),
}

/// Result of comparing a round against the stored best for its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighscoreOutcome {
    FirstPlay,
    NewHighscore { previous: u32 },
    NotBeaten { best: u32 },
}

/// Persisted score map, owned by the session.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scores {
    map: ScoreMap,
}

impl Scores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: ScoreMap) -> Self {
        Self { map }
    }

    pub fn best(&self, text: &str) -> Option<u32> {
        self.map.get(text).copied()
    }

    /// Record a round's score. Only strictly greater scores replace the best.
    pub fn record(&mut self, text: &str, score: u32) -> HighscoreOutcome {
        match self.map.get_mut(text) {
            None => {
                self.map.insert(text.to_string(), score);
                HighscoreOutcome::FirstPlay
            }
            Some(best) if score > *best => {
                let previous = *best;
                *best = score;
                HighscoreOutcome::NewHighscore { previous }
            }
            Some(best) => HighscoreOutcome::NotBeaten { best: *best },
        }
    }

    /// Entries ordered by score descending, then text.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> =
            self.map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_map(&self) -> &ScoreMap {
        &self.map
    }
}

pub trait ScoreStore {
    fn load(&self) -> (Scores, LoadOutcome);
    fn save(&self, scores: &Scores) -> Result<(), ScoreError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for &S {
    fn load(&self) -> (Scores, LoadOutcome) {
        (**self).load()
    }

    fn save(&self, scores: &Scores) -> Result<(), ScoreError> {
        (**self).save(scores)
    }
}

/// JSON object of text to score, kept in a single local file.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_SCORES_FILE)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> ScoreError {
        ScoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> (Scores, LoadOutcome) {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no score file yet");
                return (Scores::new(), LoadOutcome::Missing);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "score file unreadable");
                return (Scores::new(), LoadOutcome::Unreadable(e.to_string()));
            }
        };

        match serde_json::from_slice::<Scores>(&bytes) {
            Ok(scores) => {
                debug!(path = %self.path.display(), entries = scores.len(), "scores loaded");
                let n = scores.len();
                (scores, LoadOutcome::Loaded(n))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "score file is corrupt");
                (Scores::new(), LoadOutcome::Corrupt(e.to_string()))
            }
        }
    }

    fn save(&self, scores: &Scores) -> Result<(), ScoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;

        let temp_file = NamedTempFile::new_in(parent).map_err(|e| self.io_err(e))?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer(&mut writer, scores)?;
            writer.flush().map_err(|e| self.io_err(e))?;
        }
        set_owner_rw(temp_file.path()).map_err(|e| self.io_err(e))?;

        temp_file
            .persist(&self.path)
            .map_err(|e| self.io_err(e.error))?;

        debug!(path = %self.path.display(), entries = scores.len(), "scores saved");
        Ok(())
    }
}

#[cfg(unix)]
fn set_owner_rw(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_owner_rw(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Keeps every save in memory; lets a session run without touching disk.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    initial: Scores,
    saved: std::sync::Mutex<Vec<Scores>>,
    fail_saves: bool,
}

impl MemoryScoreStore {
    pub fn new(initial: Scores) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Every snapshot passed to `save`, in order.
    pub fn saved(&self) -> Vec<Scores> {
        self.saved
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> (Scores, LoadOutcome) {
        let n = self.initial.len();
        (self.initial.clone(), LoadOutcome::Loaded(n))
    }

    fn save(&self, scores: &Scores) -> Result<(), ScoreError> {
        if self.fail_saves {
            return Err(ScoreError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "read-only store"),
            });
        }
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(scores.clone());
        }
        Ok(())
    }
}
