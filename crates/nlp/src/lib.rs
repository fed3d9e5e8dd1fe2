mod analyzer;
mod entities;
mod lemmatize;
mod lexicon;
mod parser;
mod tagger;
mod tokenize;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use analyzer::LexiconAnalyzer;
pub use lexicon::{GazetteerEntry, LexEntry, Lexicon};
pub use tagger::Pos;
pub use tokenize::{join_tokens, tokenize};

/// Language-analysis provider consumed by the classifier.
///
/// Implementations are loaded once and shared read-only between concurrent
/// requests.
pub trait TextAnalyzer: Send + Sync {
    fn model_name(&self) -> &str;
    fn analyze(&self, text: &str) -> Result<Analysis, AnalysisError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedToken {
    pub text: String,
    pub pos: Pos,
    pub lemma: String,
    pub dep: String,
    pub head: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
    /// Token range `start..end` in [`Analysis::tokens`].
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub tokens: Vec<AnalyzedToken>,
    pub entities: Vec<Entity>,
}

impl Analysis {
    pub fn pos_tags(&self) -> Vec<&'static str> {
        self.tokens.iter().map(|token| token.pos.as_str()).collect()
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model directory not found: {0}")]
    ModelDirMissing(PathBuf),
    #[error("failed reading model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model entry at {path}:{line}: {reason}")]
    MalformedEntry {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("failed walking model directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("analysis failed: {0}")]
    Failed(String),
}
