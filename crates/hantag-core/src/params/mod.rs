//! Trained model parameters: transitions, word dictionaries and context
//! feature tables.
//!
//! Transitions and feature tables are immutable after construction. Word
//! dictionaries live in a `Lexicon` behind an `RwLock` so that
//! `add_user_dictionary` can be called on a shared store; a decode takes
//! one read guard for its whole duration (one writer, many readers).

mod feature;
mod io;
#[cfg(test)]
mod tests;

pub use feature::{Feature, PairTable, TrigramFeatures, TripleTable};

use std::collections::{BTreeMap, HashMap};
use std::io as stdio;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tags;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] stdio::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid magic bytes (expected HTPM)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("model has no dictionary")]
    EmptyDictionary,

    #[error("{0} tag does not exist in model")]
    UnknownTag(String),
}

/// A fixed stem/ending analysis for a whole surface span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preanalyzed {
    pub stem: String,
    pub ending: String,
    pub stem_tag: String,
    pub ending_tag: String,
}

/// tag -> word -> weight
pub type WordTable = HashMap<String, f64>;

/// The mutable part of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Ordered by tag so node generation is deterministic.
    words: BTreeMap<String, WordTable>,
    preanalyzed: HashMap<String, Vec<Preanalyzed>>,
    max_word_len: usize,
}

impl Lexicon {
    pub fn weight(&self, tag: &str, word: &str) -> Option<f64> {
        self.words.get(tag).and_then(|w| w.get(word)).copied()
    }

    pub fn contains(&self, tag: &str, word: &str) -> bool {
        self.words.get(tag).is_some_and(|w| w.contains_key(word))
    }

    /// Every `(tag, weight)` whose dictionary holds `word`, in tag order.
    pub fn tags_of<'a>(&'a self, word: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.words
            .iter()
            .filter_map(move |(tag, table)| table.get(word).map(|&w| (tag.as_str(), w)))
    }

    pub fn preanalyzed(&self, surface: &str) -> Option<&[Preanalyzed]> {
        self.preanalyzed.get(surface).map(Vec::as_slice)
    }

    /// Longest candidate span, in characters.
    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.words.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// No tag tables and no pre-analyzed entries: nothing to build a
    /// lattice from.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.preanalyzed.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words.values().map(HashMap::len).sum()
    }

    fn longest_entry(&self) -> usize {
        let words = self
            .words
            .values()
            .flat_map(|t| t.keys())
            .map(|w| w.chars().count());
        let surfaces = self.preanalyzed.keys().map(|s| s.chars().count());
        words.chain(surfaces).max().unwrap_or(0).max(1)
    }
}

/// Counts for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub tags: usize,
    pub words: usize,
    pub preanalyzed: usize,
    pub transitions: usize,
    pub context_features: usize,
    pub max_word_len: usize,
}

pub struct ParameterStore {
    /// from -> to -> weight
    transitions: HashMap<String, HashMap<String, f64>>,
    features: TrigramFeatures,
    lexicon: RwLock<Lexicon>,
    unknown_penalty: Option<f64>,
}

impl ParameterStore {
    pub fn builder() -> ParameterStoreBuilder {
        ParameterStoreBuilder::default()
    }

    /// Transition weight, 0 for unseen pairs.
    pub fn transition(&self, from: &str, to: &str) -> f64 {
        self.transitions
            .get(from)
            .and_then(|m| m.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn features(&self) -> &TrigramFeatures {
        &self.features
    }

    /// Read access to the word dictionaries. Hold the guard for the whole
    /// decode so a concurrent `add_user_dictionary` cannot interleave.
    pub fn lexicon(&self) -> RwLockReadGuard<'_, Lexicon> {
        self.lexicon.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Word weight, 0 for unseen words.
    pub fn word_weight(&self, tag: &str, word: &str) -> f64 {
        self.lexicon().weight(tag, word).unwrap_or(0.0)
    }

    pub fn max_word_len(&self) -> usize {
        self.lexicon().max_word_len()
    }

    /// Model-provided penalty for unknown spans, if the model carries one.
    pub fn unknown_penalty(&self) -> Option<f64> {
        self.unknown_penalty
    }

    /// Add or overwrite words in an existing tag's dictionary.
    ///
    /// Fails with `UnknownTag` when the tag is not part of the model; new
    /// tag categories can only come from the model itself.
    pub fn add_user_dictionary<I, S>(&self, tag: &str, words: I) -> Result<usize, ModelError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut lexicon = self.lexicon.write().unwrap_or_else(PoisonError::into_inner);
        let lexicon = &mut *lexicon;
        let table = lexicon
            .words
            .get_mut(tag)
            .ok_or_else(|| ModelError::UnknownTag(tag.to_string()))?;
        let mut added = 0;
        for (word, weight) in words {
            let word = word.into();
            lexicon.max_word_len = lexicon.max_word_len.max(word.chars().count());
            table.insert(word, weight);
            added += 1;
        }
        debug!(tag, added, max_word_len = lexicon.max_word_len, "user dictionary");
        Ok(added)
    }

    pub fn stats(&self) -> ModelStats {
        let lexicon = self.lexicon();
        ModelStats {
            tags: lexicon.words.len(),
            words: lexicon.word_count(),
            preanalyzed: lexicon.preanalyzed.values().map(Vec::len).sum(),
            transitions: self.transitions.values().map(HashMap::len).sum(),
            context_features: self.features.len(),
            max_word_len: lexicon.max_word_len,
        }
    }
}

/// Programmatic construction of a `ParameterStore`.
#[derive(Debug, Default)]
pub struct ParameterStoreBuilder {
    transitions: HashMap<String, HashMap<String, f64>>,
    features: TrigramFeatures,
    lexicon: Lexicon,
    max_word_len: Option<usize>,
    unknown_penalty: Option<f64>,
}

impl ParameterStoreBuilder {
    pub fn transition(mut self, from: &str, to: &str, weight: f64) -> Self {
        self.transitions
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), weight);
        self
    }

    /// Declare a tag with an empty dictionary.
    pub fn tag(mut self, tag: &str) -> Self {
        self.lexicon.words.entry(tag.to_string()).or_default();
        self
    }

    pub fn word(mut self, tag: &str, word: &str, weight: f64) -> Self {
        self.lexicon
            .words
            .entry(tag.to_string())
            .or_default()
            .insert(word.to_string(), weight);
        self
    }

    /// Add a classified state feature. `Feature::Word` goes to the tag's
    /// dictionary, everything else to the context tables.
    pub fn feature(mut self, tag: &str, feature: Feature, weight: f64) -> Self {
        if let Some(Feature::Word(word)) = self.features.insert(tag, feature, weight) {
            return self.word(tag, &word, weight);
        }
        self
    }

    pub fn preanalyzed(mut self, surface: &str, analysis: Preanalyzed) -> Self {
        self.lexicon
            .preanalyzed
            .entry(surface.to_string())
            .or_default()
            .push(analysis);
        self
    }

    pub fn max_word_len(mut self, n: usize) -> Self {
        self.max_word_len = Some(n);
        self
    }

    pub fn unknown_penalty(mut self, penalty: f64) -> Self {
        self.unknown_penalty = Some(penalty);
        self
    }

    pub fn build(self) -> Result<ParameterStore, ModelError> {
        let mut lexicon = self.lexicon;
        if lexicon.is_empty() {
            return Err(ModelError::EmptyDictionary);
        }
        // Tags seen only in transitions still count as model tags.
        for (from, to_map) in &self.transitions {
            for tag in std::iter::once(from).chain(to_map.keys()) {
                if !is_sentinel(tag) {
                    lexicon.words.entry(tag.clone()).or_default();
                }
            }
        }
        lexicon.max_word_len = match self.max_word_len {
            Some(n) => n.max(1),
            None => lexicon.longest_entry(),
        };
        debug!(
            tags = lexicon.words.len(),
            words = lexicon.word_count(),
            max_word_len = lexicon.max_word_len,
            "parameter store built"
        );
        Ok(ParameterStore {
            transitions: self.transitions,
            features: self.features,
            lexicon: RwLock::new(lexicon),
            unknown_penalty: self.unknown_penalty,
        })
    }
}

fn is_sentinel(tag: &str) -> bool {
    tag == tags::BOS || tag == tags::EOS
}
