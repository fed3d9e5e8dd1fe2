use crate::lexicon::{normalize_form, Lexicon};
use crate::tokenize::join_tokens;

const TITLES: &[&str] = &["monsieur", "madame", "mademoiselle", "mme", "mlle", "maître"];
const MAX_NAME_TOKENS: usize = 2;

/// Entity span over token indices `start..end` of one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Finds gazetteer entities (longest match first) and personal names
/// introduced by a civility title. Spans never overlap.
pub fn recognize(tokens: &[String], lexicon: &Lexicon) -> Vec<EntitySpan> {
    let forms = tokens.iter().map(|token| normalize_form(token)).collect::<Vec<_>>();
    let mut spans = Vec::new();
    let mut index = 0;

    while index < forms.len() {
        if let Some(span) = gazetteer_match(tokens, &forms, index, lexicon) {
            index = span.end;
            spans.push(span);
            continue;
        }
        if let Some(span) = titled_name(tokens, &forms, index, lexicon) {
            index = span.end;
            spans.push(span);
            continue;
        }
        index += 1;
    }

    spans
}

fn gazetteer_match(
    tokens: &[String],
    forms: &[String],
    start: usize,
    lexicon: &Lexicon,
) -> Option<EntitySpan> {
    lexicon
        .gazetteer()
        .iter()
        .find(|entry| {
            !entry.tokens.is_empty()
                && forms
                    .get(start..start + entry.tokens.len())
                    .is_some_and(|window| window == entry.tokens.as_slice())
        })
        .map(|entry| {
            let end = start + entry.tokens.len();
            EntitySpan {
                text: join_tokens(&tokens[start..end]),
                label: entry.label.clone(),
                start,
                end,
            }
        })
}

fn titled_name(
    tokens: &[String],
    forms: &[String],
    index: usize,
    lexicon: &Lexicon,
) -> Option<EntitySpan> {
    // "m." is split by the tokenizer into "m" and "."
    let (title_end, is_title) = match forms.get(index).map(String::as_str) {
        Some("m") if forms.get(index + 1).map(String::as_str) == Some(".") => (index + 2, true),
        Some(form) => (index + 1, TITLES.contains(&form)),
        None => (index + 1, false),
    };
    if !is_title {
        return None;
    }

    let name_len = forms[title_end.min(forms.len())..]
        .iter()
        .take(MAX_NAME_TOKENS)
        .take_while(|form| {
            form.chars().all(|ch| ch.is_alphabetic() || ch == '-') && lexicon.lookup(form).is_none()
        })
        .count();
    if name_len == 0 {
        return None;
    }

    let end = title_end + name_len;
    Some(EntitySpan {
        text: join_tokens(&tokens[title_end..end]),
        label: "PER".to_string(),
        start: title_end,
        end,
    })
}
