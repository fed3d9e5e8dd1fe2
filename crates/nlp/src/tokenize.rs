use once_cell::sync::Lazy;
use regex::Regex;

static ELISION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:jusqu|lorsqu|puisqu|quoiqu|qu|[cdjlmnst])['’]").expect("valid elision regex")
});

/// Hyphenated words kept as a single token.
const COMPOUNDS: &[&str] = &[
    "aujourd'hui",
    "peut-être",
    "c'est-à-dire",
    "quelqu'un",
    "quelqu'une",
    "d'accord",
    "rendez-vous",
    "week-end",
    "après-midi",
    "au-delà",
    "au-dessus",
    "au-dessous",
    "là-bas",
    "celui-ci",
    "celle-ci",
    "ceux-ci",
    "celles-ci",
    "celui-là",
    "celle-là",
    "vis-à-vis",
    "grand-chose",
    "presqu'île",
];

/// Subject and object clitics attached after a verb. Longest forms first so
/// `-t-il` wins over `-il`.
const INVERTED_CLITICS: &[&str] = &[
    "-t-elles", "-t-elle", "-t-ils", "-t-il", "-t-on", "-elles", "-elle", "-nous", "-vous",
    "-leur", "-ils", "-moi", "-toi", "-lui", "-les", "-il", "-on", "-je", "-tu", "-le", "-la",
    "-ce", "-en", "-y",
];

/// Splits French text into tokens the way the tagger expects them: elided
/// articles and pronouns (`l'`, `qu'`) and inverted clitics (`-je`) become
/// their own tokens, punctuation is detached.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in input.split_whitespace() {
        split_chunk(chunk, &mut tokens);
    }
    tokens
}

/// Rebuilds surface text from tokens, gluing elisions and clitics back on.
pub fn join_tokens(tokens: &[String]) -> String {
    let mut joined = String::new();
    for token in tokens {
        let glue = joined.is_empty() || joined.ends_with('\'') || joined.ends_with('’');
        if !glue && !token.starts_with('-') {
            joined.push(' ');
        }
        joined.push_str(token);
    }
    joined
}

fn split_chunk(chunk: &str, out: &mut Vec<String>) {
    let Some(start) = chunk
        .char_indices()
        .find(|(_, ch)| ch.is_alphanumeric())
        .map(|(idx, _)| idx)
    else {
        out.extend(punctuation_tokens(chunk));
        return;
    };
    let end = chunk
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_alphanumeric())
        .map(|(idx, ch)| idx + ch.len_utf8())
        .unwrap_or(chunk.len());

    out.extend(punctuation_tokens(&chunk[..start]));
    split_word(&chunk[start..end], out);
    out.extend(punctuation_tokens(&chunk[end..]));
}

fn split_word(word: &str, out: &mut Vec<String>) {
    if is_compound(word) {
        out.push(word.to_string());
        return;
    }

    let mut rest = word;
    while let Some(found) = ELISION.find(&rest.to_lowercase()) {
        let cut = found.end();
        if cut >= rest.len() || !rest.is_char_boundary(cut) {
            break;
        }
        out.push(rest[..cut].to_string());
        rest = &rest[cut..];
        if is_compound(rest) {
            out.push(rest.to_string());
            return;
        }
    }

    let mut clitics = Vec::new();
    let mut stem = rest;
    'peel: loop {
        let lowered = stem.to_lowercase();
        for clitic in INVERTED_CLITICS {
            if lowered.len() > clitic.len() && lowered.ends_with(clitic) {
                let cut = stem.len() - clitic.len();
                if !stem.is_char_boundary(cut) {
                    break 'peel;
                }
                clitics.push(stem[cut..].to_string());
                stem = &stem[..cut];
                continue 'peel;
            }
        }
        break;
    }

    out.push(stem.to_string());
    out.extend(clitics.into_iter().rev());
}

fn is_compound(word: &str) -> bool {
    let normalized = word.to_lowercase().replace('’', "'");
    COMPOUNDS.contains(&normalized.as_str())
}

// Runs of one character ("...", "!!") stay together.
fn punctuation_tokens(run: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for ch in run.chars() {
        match tokens.last_mut() {
            Some(last) if last.ends_with(ch) => last.push(ch),
            _ => tokens.push(ch.to_string()),
        }
    }
    tokens
}
