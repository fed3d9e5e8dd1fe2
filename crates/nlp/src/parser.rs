use crate::tagger::Pos;

/// Head attachment for one token; `head` indexes the same sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub relation: &'static str,
    pub head: usize,
}

const SUBJECT_LEMMAS: &[&str] = &[
    "je", "tu", "il", "elle", "on", "nous", "vous", "ce", "cela", "ceci", "qui",
];
const REFLEXIVE_LEMMAS: &[&str] = &["se"];

/// Attaches every token of one sentence to a head with a Universal
/// Dependencies relation. The root attaches to itself.
pub fn parse(tokens: &[String], tags: &[Pos], lemmas: &[String]) -> Vec<Dependency> {
    if tags.is_empty() {
        return Vec::new();
    }
    let root = find_root(tags);
    let sentence = Sentence {
        tokens,
        tags,
        lemmas,
        root,
        next_nominal: next_matching(tags, Pos::is_nominal),
        next_case_target: next_matching(tags, |pos| {
            pos.is_nominal() || matches!(pos, Pos::Pron | Pos::Num | Pos::Verb)
        }),
        next_verb: next_matching(tags, |pos| pos == Pos::Verb),
        next_finite: next_matching(tags, |pos| matches!(pos, Pos::Verb | Pos::Aux)),
        next_non_punct: next_matching(tags, |pos| pos != Pos::Punct),
        prev_clause_word: prev_outside(tags, &[Pos::Adv, Pos::Pron, Pos::Part]),
        prev_nominal_head: prev_outside(tags, &[Pos::Det, Pos::Adj, Pos::Num]),
    };

    (0..tags.len())
        .map(|index| {
            if index == root {
                Dependency {
                    relation: "ROOT",
                    head: root,
                }
            } else {
                sentence.attach(index)
            }
        })
        .collect()
}

fn find_root(tags: &[Pos]) -> usize {
    tags.iter()
        .position(|pos| *pos == Pos::Verb)
        .or_else(|| tags.iter().position(|pos| *pos == Pos::Aux))
        .or_else(|| {
            tags.iter().position(|pos| {
                !matches!(pos, Pos::Punct | Pos::Det | Pos::Adp | Pos::Cconj | Pos::Sconj)
            })
        })
        .unwrap_or(0)
}

/// `next[i]` is the first index after `i` whose tag satisfies `predicate`.
fn next_matching(tags: &[Pos], predicate: impl Fn(Pos) -> bool) -> Vec<Option<usize>> {
    let mut next = vec![None; tags.len()];
    let mut found = None;
    for index in (0..tags.len()).rev() {
        next[index] = found;
        if predicate(tags[index]) {
            found = Some(index);
        }
    }
    next
}

/// `prev[i]` is the last index before `i` whose tag is not in `skip`.
fn prev_outside(tags: &[Pos], skip: &[Pos]) -> Vec<Option<usize>> {
    let mut prev = vec![None; tags.len()];
    let mut found = None;
    for (index, pos) in tags.iter().enumerate() {
        prev[index] = found;
        if !skip.contains(pos) {
            found = Some(index);
        }
    }
    prev
}

// Neighbour lookups are precomputed once per sentence so attachment stays
// linear in sentence length.
struct Sentence<'a> {
    tokens: &'a [String],
    tags: &'a [Pos],
    lemmas: &'a [String],
    root: usize,
    next_nominal: Vec<Option<usize>>,
    next_case_target: Vec<Option<usize>>,
    next_verb: Vec<Option<usize>>,
    next_finite: Vec<Option<usize>>,
    next_non_punct: Vec<Option<usize>>,
    prev_clause_word: Vec<Option<usize>>,
    prev_nominal_head: Vec<Option<usize>>,
}

impl Sentence<'_> {
    fn attach(&self, index: usize) -> Dependency {
        let root = self.root;
        let (relation, head) = match self.tags[index] {
            Pos::Punct => ("punct", root),
            Pos::Det => ("det", self.next_nominal[index].unwrap_or(root)),
            Pos::Num => match self.next_nominal[index] {
                Some(noun) if noun <= index + 2 => ("nummod", noun),
                _ => self.argument_of_root(index),
            },
            Pos::Adp => ("case", self.next_case_target[index].unwrap_or(root)),
            Pos::Aux => match self.next_verb[index] {
                Some(verb) => ("aux", verb),
                None if self.lemmas[index] == "être" => ("cop", root),
                None => ("aux", root),
            },
            Pos::Verb => self.verb_relation(index),
            Pos::Pron => self.pronoun_relation(index),
            Pos::Noun | Pos::Propn => self.nominal_relation(index),
            Pos::Adj => self.adjective_relation(index),
            Pos::Adv | Pos::Part => match self.tags.get(index + 1) {
                Some(Pos::Adj) | Some(Pos::Adv) => ("advmod", index + 1),
                _ => ("advmod", root),
            },
            Pos::Cconj => ("cc", self.next_non_punct[index].unwrap_or(root)),
            Pos::Sconj => ("mark", self.next_finite[index].unwrap_or(root)),
            Pos::Intj => ("discourse", root),
            Pos::Sym | Pos::X => ("dep", root),
        };
        Dependency { relation, head }
    }

    fn verb_relation(&self, index: usize) -> (&'static str, usize) {
        match self.prev_clause_word[index] {
            Some(prev) if self.tags[prev] == Pos::Cconj => ("conj", self.root),
            Some(prev) if self.tags[prev] == Pos::Sconj => ("ccomp", self.root),
            _ => ("xcomp", self.root),
        }
    }

    fn pronoun_relation(&self, index: usize) -> (&'static str, usize) {
        let lemma = self.lemmas[index].as_str();
        let inverted = self.tokens[index].starts_with('-');
        if REFLEXIVE_LEMMAS.contains(&lemma) {
            return ("expl", self.root);
        }
        if index > 0 && self.tags[index - 1] == Pos::Adp {
            return ("obl", self.root);
        }
        if SUBJECT_LEMMAS.contains(&lemma) && (index < self.root || inverted) {
            return ("nsubj", self.root);
        }
        ("obj", self.root)
    }

    fn nominal_relation(&self, index: usize) -> (&'static str, usize) {
        if let Some(prev) = self.prev_nominal_head[index] {
            if self.tags[prev] == Pos::Adp {
                return match self.prev_nominal_head[prev] {
                    Some(governor) if self.tags[governor].is_nominal() => ("nmod", governor),
                    _ => ("obl", self.root),
                };
            }
            if self.tags[prev].is_nominal() && prev + 1 == index {
                return ("flat", prev);
            }
        }
        self.argument_of_root(index)
    }

    fn adjective_relation(&self, index: usize) -> (&'static str, usize) {
        if index > 0 && self.tags[index - 1].is_nominal() {
            return ("amod", index - 1);
        }
        match self.tags.get(index + 1) {
            Some(pos) if pos.is_nominal() => ("amod", index + 1),
            _ => ("dep", self.root),
        }
    }

    fn argument_of_root(&self, index: usize) -> (&'static str, usize) {
        if index < self.root {
            ("nsubj", self.root)
        } else {
            ("obj", self.root)
        }
    }
}
