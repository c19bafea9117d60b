use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

static TEXTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/texts");

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("built-in corpus {0} not found")]
    NotFound(String),

    #[error("failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid corpus json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("corpus {0} has no texts")]
    Empty(String),
}

/// Corpora shipped inside the binary.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinCorpus {
    #[default]
    GoTour,
    Proverbs,
}

impl BuiltinCorpus {
    pub fn load(&self) -> Result<Corpus, CorpusError> {
        Corpus::builtin(&self.to_string())
    }
}

/// On-disk shape of an embedded corpus file.
#[derive(Deserialize)]
struct CorpusFile {
    name: String,
    texts: Vec<String>,
}

/// The fixed, ordered list of texts offered for typing. Never empty.
#[derive(Deserialize, Clone, Debug)]
#[serde(try_from = "CorpusFile")]
pub struct Corpus {
    pub name: String,
    texts: Vec<String>,
}

impl TryFrom<CorpusFile> for Corpus {
    type Error = CorpusError;

    fn try_from(file: CorpusFile) -> Result<Self, Self::Error> {
        Corpus {
            name: file.name,
            texts: file.texts,
        }
        .validated()
    }
}

impl Corpus {
    /// Load one of the embedded corpora by file stem.
    pub fn builtin(name: &str) -> Result<Self, CorpusError> {
        let file = TEXTS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| CorpusError::NotFound(name.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| CorpusError::NotFound(name.to_string()))?;

        Ok(serde_json::from_str(contents)?)
    }

    /// Read a custom corpus, one text per line. Blank lines are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());

        Self::from_lines(name, &contents)
    }

    pub fn from_lines(name: impl Into<String>, contents: &str) -> Result<Self, CorpusError> {
        let texts: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Corpus {
            name: name.into(),
            texts,
        }
        .validated()
    }

    fn validated(self) -> Result<Self, CorpusError> {
        if self.texts.is_empty() {
            return Err(CorpusError::Empty(self.name));
        }
        debug!(corpus = %self.name, texts = self.texts.len(), "corpus loaded");
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.texts.get(idx).map(String::as_str)
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }
}
