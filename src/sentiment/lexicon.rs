//! Word valence lexicon
//!
//! Single-word entries of the AFINN-165 word list, integer valences in
//! [-5, 5]. The table ships with the crate as `data/afinn-165.txt`, one
//! `word score` pair per line, and is parsed once on first lookup.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

const AFINN_165: &str = include_str!("../../data/afinn-165.txt");

const NEGATORS: &[&str] = &[
    "aren't", "arent", "can't", "cannot", "cant", "couldn't", "couldnt", "didn't", "didnt",
    "doesn't", "doesnt", "don't", "dont", "hasn't", "hasnt", "haven't", "havent", "isn't",
    "isnt", "neither", "never", "no", "nor", "not", "shouldn't", "shouldnt", "wasn't",
    "wasnt", "weren't", "werent", "won't", "wont", "wouldn't", "wouldnt",
];

static LEXICON: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| parse_table(AFINN_165));

static NEGATOR_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| NEGATORS.iter().copied().collect());

/// Parses `word score` lines, skipping blanks and lines that do not parse
fn parse_table(table: &str) -> HashMap<&str, i32> {
    table
        .lines()
        .filter_map(|line| {
            let (word, score) = line.trim().rsplit_once(char::is_whitespace)?;
            let score = score.parse().ok()?;
            Some((word.trim(), score))
        })
        .filter(|(word, _)| !word.is_empty())
        .collect()
}

/// Valence of a lower-cased token, if it carries one
pub fn valence(token: &str) -> Option<i32> {
    LEXICON.get(token).copied()
}

/// Whether a lower-cased token flips the valence of the token after it
pub fn is_negator(token: &str) -> bool {
    NEGATOR_SET.contains(token)
}
