use serde::Serialize;

use crate::lexicon::{normalize_form, Lexicon};

/// Universal POS tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Pos {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ADJ" => Some(Self::Adj),
            "ADP" => Some(Self::Adp),
            "ADV" => Some(Self::Adv),
            "AUX" => Some(Self::Aux),
            "CCONJ" => Some(Self::Cconj),
            "DET" => Some(Self::Det),
            "INTJ" => Some(Self::Intj),
            "NOUN" => Some(Self::Noun),
            "NUM" => Some(Self::Num),
            "PART" => Some(Self::Part),
            "PRON" => Some(Self::Pron),
            "PROPN" => Some(Self::Propn),
            "PUNCT" => Some(Self::Punct),
            "SCONJ" => Some(Self::Sconj),
            "SYM" => Some(Self::Sym),
            "VERB" => Some(Self::Verb),
            "X" => Some(Self::X),
            _ => None,
        }
    }

    pub fn is_nominal(self) -> bool {
        matches!(self, Self::Noun | Self::Propn)
    }
}

const SUBJECT_CLITICS: &[&str] = &[
    "je", "j'", "tu", "il", "elle", "on", "nous", "vous", "ils", "elles",
];
const OBJECT_CLITICS: &[&str] = &[
    "me", "m'", "te", "t'", "se", "s'", "le", "la", "les", "l'", "lui", "leur", "y", "en",
    "nous", "vous",
];
const ARTICLE_CLITICS: &[&str] = &["le", "la", "les", "l'"];
const SYMBOLS: &[char] = &['€', '$', '%', '+', '=', '<', '>', '&', '@', '#', '*', '/', '§', '°'];

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "isme", "iste", "ité", "age", "eur", "ance", "ence", "ure", "ude",
    "ette", "esse", "ème",
];
const ADJ_SUFFIXES: &[&str] = &[
    "able", "ible", "eux", "euse", "ique", "if", "ive", "aire", "elle", "ienne", "ant", "ent",
];

/// Assigns a part-of-speech tag to every token of one sentence.
pub fn tag(tokens: &[String], lexicon: &Lexicon) -> Vec<Pos> {
    let initial = tokens
        .iter()
        .map(|token| initial_tag(token, lexicon))
        .collect::<Vec<_>>();
    let forms = tokens.iter().map(|token| normalize_form(token)).collect::<Vec<_>>();
    let mut tags = initial.iter().map(|(pos, _)| *pos).collect::<Vec<_>>();

    for index in 0..tags.len() {
        let known = initial[index].1;
        let prev = index.checked_sub(1);

        if !known {
            if let Some(prev) = prev {
                if tags[prev] == Pos::Det && tags[index] == Pos::Verb {
                    tags[index] = Pos::Noun;
                }
                let after_subject = SUBJECT_CLITICS.contains(&forms[prev].as_str())
                    || forms[prev] == "ne"
                    || forms[prev] == "n'";
                let after_object = OBJECT_CLITICS.contains(&forms[prev].as_str())
                    && prev
                        .checked_sub(1)
                        .map(|before| SUBJECT_CLITICS.contains(&forms[before].as_str()))
                        .unwrap_or(false);
                if after_subject || after_object {
                    tags[index] = Pos::Verb;
                }
            }
        }
    }

    // Articles directly in front of a verb are object pronouns ("je la vois").
    for index in 0..tags.len().saturating_sub(1) {
        if tags[index] == Pos::Det
            && ARTICLE_CLITICS.contains(&forms[index].as_str())
            && matches!(tags[index + 1], Pos::Verb | Pos::Aux)
        {
            tags[index] = Pos::Pron;
        }
    }

    tags
}

/// Lexicon tag when the form is known, otherwise a guess from its shape and
/// suffix. The flag is `false` for guesses.
fn initial_tag(token: &str, lexicon: &Lexicon) -> (Pos, bool) {
    if let Some(entry) = lexicon.lookup(token) {
        return (entry.pos, true);
    }
    if token.starts_with('-') && token.chars().any(char::is_alphabetic) {
        return (Pos::Pron, true);
    }
    if let Some(pos) = shape_tag(token) {
        return (pos, true);
    }
    (guess_from_suffix(&normalize_form(token)), false)
}

fn shape_tag(token: &str) -> Option<Pos> {
    if !token.chars().any(char::is_alphanumeric) {
        return if token.chars().all(|ch| SYMBOLS.contains(&ch)) {
            Some(Pos::Sym)
        } else {
            Some(Pos::Punct)
        };
    }
    if token.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        return Some(Pos::Num);
    }
    None
}

fn guess_from_suffix(word: &str) -> Pos {
    if word.chars().count() > 5 && word.ends_with("ment") {
        return Pos::Adv;
    }
    if ["é", "ée", "és", "ées", "er", "ir", "ez", "ier"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
        && word.chars().count() > 3
    {
        return Pos::Verb;
    }

    let stem = word
        .strip_suffix('s')
        .or_else(|| word.strip_suffix('x'))
        .unwrap_or(word);
    if NOUN_SUFFIXES.iter().any(|suffix| stem.ends_with(suffix)) {
        return Pos::Noun;
    }
    if ADJ_SUFFIXES.iter().any(|suffix| stem.ends_with(suffix)) {
        return Pos::Adj;
    }
    Pos::Noun
}
