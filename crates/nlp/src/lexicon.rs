use std::collections::HashMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::tagger::Pos;
use crate::tokenize::tokenize;
use crate::AnalysisError;

const BUILTIN_LEXICON: &str = include_str!("../data/fr_core.lex");
const BUILTIN_GAZETTEER: &str = include_str!("../data/fr_core.gaz");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexEntry {
    pub lemma: String,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerEntry {
    pub tokens: Vec<String>,
    pub label: String,
}

/// Word forms and known entities the analyzer relies on.
///
/// The built-in French tables are always present; a model directory adds to
/// them (and overrides individual forms) with `*.lex` and `*.gaz` files.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashMap<String, LexEntry>,
    gazetteer: Vec<GazetteerEntry>,
}

impl Lexicon {
    pub fn builtin() -> Result<Self, AnalysisError> {
        let mut lexicon = Self::default();
        lexicon.merge_lexicon(Path::new("<builtin>/fr_core.lex"), BUILTIN_LEXICON)?;
        lexicon.merge_gazetteer(Path::new("<builtin>/fr_core.gaz"), BUILTIN_GAZETTEER)?;
        Ok(lexicon)
    }

    pub fn load(model_dir: Option<&Path>) -> Result<Self, AnalysisError> {
        let mut lexicon = Self::builtin()?;
        if let Some(dir) = model_dir {
            lexicon.merge_dir(dir)?;
        }
        Ok(lexicon)
    }

    pub fn lookup(&self, form: &str) -> Option<&LexEntry> {
        self.words.get(&normalize_form(form))
    }

    /// Entries ordered longest first.
    pub fn gazetteer(&self) -> &[GazetteerEntry] {
        &self.gazetteer
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn merge_dir(&mut self, root: &Path) -> Result<(), AnalysisError> {
        if !root.is_dir() {
            return Err(AnalysisError::ModelDirMissing(root.to_path_buf()));
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let extension = path.extension().and_then(|ext| ext.to_str());
            if !matches!(extension, Some("lex") | Some("gaz")) {
                continue;
            }

            let raw = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            match extension {
                Some("lex") => self.merge_lexicon(path, &raw)?,
                _ => self.merge_gazetteer(path, &raw)?,
            }
            tracing::debug!(path = %path.display(), "merged model file");
        }

        Ok(())
    }

    fn merge_lexicon(&mut self, path: &Path, raw: &str) -> Result<(), AnalysisError> {
        for (line_no, fields) in data_lines(raw) {
            let [form, lemma, pos] = fields.as_slice() else {
                return Err(malformed(path, line_no, "expected `form lemma POS`"));
            };
            let pos = Pos::parse(pos)
                .ok_or_else(|| malformed(path, line_no, &format!("unknown POS tag `{pos}`")))?;
            self.words.insert(
                normalize_form(form),
                LexEntry {
                    lemma: normalize_form(lemma),
                    pos,
                },
            );
        }
        Ok(())
    }

    fn merge_gazetteer(&mut self, path: &Path, raw: &str) -> Result<(), AnalysisError> {
        for (line_no, fields) in data_lines(raw) {
            let Some((label, words)) = fields.split_last().filter(|(_, words)| !words.is_empty())
            else {
                return Err(malformed(path, line_no, "expected `entity text LABEL`"));
            };
            if !label.chars().all(|ch| ch.is_ascii_uppercase() || ch == '_') {
                return Err(malformed(
                    path,
                    line_no,
                    &format!("entity label `{label}` must be upper case"),
                ));
            }

            let tokens = tokenize(&normalize_form(&words.join(" ")));
            self.gazetteer.retain(|existing| existing.tokens != tokens);
            self.gazetteer.push(GazetteerEntry {
                tokens,
                label: (*label).to_string(),
            });
        }
        self.gazetteer
            .sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));
        Ok(())
    }
}

pub(crate) fn normalize_form(form: &str) -> String {
    form.to_lowercase().replace('’', "'")
}

fn data_lines(raw: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    raw.lines().enumerate().filter_map(|(idx, line)| {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            None
        } else {
            Some((idx + 1, line.split_whitespace().collect()))
        }
    })
}

fn malformed(path: &Path, line: usize, reason: &str) -> AnalysisError {
    AnalysisError::MalformedEntry {
        path: path.to_path_buf(),
        line,
        reason: reason.to_string(),
    }
}
