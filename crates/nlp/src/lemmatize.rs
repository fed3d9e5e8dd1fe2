use crate::lexicon::{normalize_form, Lexicon};
use crate::tagger::Pos;

pub fn lemmatize(token: &str, pos: Pos, lexicon: &Lexicon) -> String {
    if let Some(entry) = lexicon.lookup(token) {
        return entry.lemma.clone();
    }

    let form = normalize_form(token);
    if let Some(clitic) = form.strip_prefix("-t-").or_else(|| form.strip_prefix('-')) {
        return lexicon
            .lookup(clitic)
            .map(|entry| entry.lemma.clone())
            .unwrap_or_else(|| clitic.to_string());
    }

    match pos {
        Pos::Noun | Pos::Adj => singular(&form),
        Pos::Verb => infinitive(&form),
        _ => form,
    }
}

fn singular(form: &str) -> String {
    if form.chars().count() <= 3 {
        return form.to_string();
    }
    if let Some(stem) = form.strip_suffix("eaux") {
        return format!("{stem}eau");
    }
    if let Some(stem) = form.strip_suffix("aux") {
        return format!("{stem}al");
    }
    form.strip_suffix('s')
        .or_else(|| form.strip_suffix('x'))
        .unwrap_or(form)
        .to_string()
}

const FIRST_GROUP_ENDINGS: &[&str] = &[
    "aient", "erons", "erez", "ées", "ons", "ent", "ais", "ait", "ant", "és", "ée", "ez", "é",
    "es", "e",
];

fn infinitive(form: &str) -> String {
    if form.ends_with("er") || form.ends_with("ir") || form.ends_with("re") {
        return form.to_string();
    }
    for ending in FIRST_GROUP_ENDINGS {
        if let Some(stem) = form.strip_suffix(ending) {
            if stem.chars().count() >= 2 {
                return format!("{stem}er");
            }
        }
    }
    form.to_string()
}
