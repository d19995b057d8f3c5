//! Typed trigram-range feature tables.
//!
//! The trained model names its state features with templates such as
//! `x[-1:0]=먹-어` or `x[0:1]=먹-어, y[1]=Eomi`. They are classified once at
//! load time into `Feature` variants and stored in nested maps keyed by
//! tag, then by the surfaces in template order, so lookups during decoding
//! borrow `&str` keys and never allocate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A state feature attached to a tag, classified by template.
///
/// Naming: digits are relative positions, `X` the morpheme surfaces
/// observed, `Y` the tag observed. `Previous` features look left of the
/// tagged morpheme, `Successive` ones right, `Bothside` both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    /// `x[0]=w`: the word itself (dictionary weight).
    Word(String),
    /// `x[-1:0]=p-w`
    Previous1X0 { prev: String, word: String },
    /// `x[0]=w, y[-1]=t`
    PreviousX01Y { word: String, prev_tag: String },
    /// `x[0:1]=w-n`
    SuccessiveX01 { word: String, next: String },
    /// `x[0:1]=w-n, y[1]=t`
    SuccessiveX01Y1 {
        word: String,
        next: String,
        next_tag: String,
    },
    /// `x[-1,1]=p-n`
    Bothside1X1 { prev: String, next: String },
    /// `x[-1:1]=p-w-n`
    Bothside1X01 {
        prev: String,
        word: String,
        next: String,
    },
}

impl Feature {
    /// Classify a raw feature string. Returns `None` for templates the
    /// decoder has no use for (e.g. `x[-1:0]=a-b, y[-1]=t`).
    pub fn parse(raw: &str) -> Option<Feature> {
        let (x_part, y_part) = match raw.split_once(", ") {
            Some((x, y)) => (x, Some(y)),
            None => (raw, None),
        };
        let (x_key, x_value) = x_part.split_once('=')?;
        let y = match y_part {
            Some(y) => Some(y.split_once('=')?),
            None => None,
        };

        let feature = match (x_key, y) {
            ("x[0]", None) => Feature::Word(x_value.to_string()),
            ("x[0]", Some(("y[-1]", tag))) => Feature::PreviousX01Y {
                word: x_value.to_string(),
                prev_tag: tag.to_string(),
            },
            ("x[-1:0]", None) => {
                let [prev, word] = split_words(x_value)?;
                Feature::Previous1X0 { prev, word }
            }
            ("x[0:1]", None) => {
                let [word, next] = split_words(x_value)?;
                Feature::SuccessiveX01 { word, next }
            }
            ("x[0:1]", Some(("y[1]", tag))) => {
                let [word, next] = split_words(x_value)?;
                Feature::SuccessiveX01Y1 {
                    word,
                    next,
                    next_tag: tag.to_string(),
                }
            }
            ("x[-1,1]", None) => {
                let [prev, next] = split_words(x_value)?;
                Feature::Bothside1X1 { prev, next }
            }
            ("x[-1:1]", None) => {
                let [prev, word, next] = split_words(x_value)?;
                Feature::Bothside1X01 { prev, word, next }
            }
            _ => return None,
        };
        Some(feature)
    }
}

fn split_words<const N: usize>(value: &str) -> Option<[String; N]> {
    let parts: Vec<String> = value.split('-').map(str::to_string).collect();
    parts.try_into().ok()
}

/// tag -> a -> b -> weight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairTable(HashMap<String, HashMap<String, HashMap<String, f64>>>);

impl PairTable {
    pub fn insert(&mut self, tag: &str, a: String, b: String, weight: f64) {
        self.0
            .entry(tag.to_string())
            .or_default()
            .entry(a)
            .or_default()
            .insert(b, weight);
    }

    pub fn get(&self, tag: &str, a: &str, b: &str) -> f64 {
        self.0
            .get(tag)
            .and_then(|m| m.get(a))
            .and_then(|m| m.get(b))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.values().flat_map(|m| m.values()).map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// tag -> a -> b -> c -> weight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripleTable(HashMap<String, HashMap<String, PairMap>>);

type PairMap = HashMap<String, HashMap<String, f64>>;

impl TripleTable {
    pub fn insert(&mut self, tag: &str, a: String, b: String, c: String, weight: f64) {
        self.0
            .entry(tag.to_string())
            .or_default()
            .entry(a)
            .or_default()
            .entry(b)
            .or_default()
            .insert(c, weight);
    }

    pub fn get(&self, tag: &str, a: &str, b: &str, c: &str) -> f64 {
        self.0
            .get(tag)
            .and_then(|m| m.get(a))
            .and_then(|m| m.get(b))
            .and_then(|m| m.get(c))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0
            .values()
            .flat_map(|m| m.values())
            .flat_map(|m| m.values())
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The six context feature tables consulted by beam search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrigramFeatures {
    pub previous_1x0: PairTable,
    pub previous_x0_1y: PairTable,
    pub successive_x01: PairTable,
    pub successive_x01_y1: TripleTable,
    pub bothside_1x1: PairTable,
    pub bothside_1x01: TripleTable,
}

impl TrigramFeatures {
    /// Store a context feature. `Feature::Word` is not a context feature
    /// and is returned unchanged so the caller can route it to the lexicon.
    pub fn insert(&mut self, tag: &str, feature: Feature, weight: f64) -> Option<Feature> {
        match feature {
            Feature::Word(_) => return Some(feature),
            Feature::Previous1X0 { prev, word } => {
                self.previous_1x0.insert(tag, prev, word, weight)
            }
            Feature::PreviousX01Y { word, prev_tag } => {
                self.previous_x0_1y.insert(tag, word, prev_tag, weight)
            }
            Feature::SuccessiveX01 { word, next } => {
                self.successive_x01.insert(tag, word, next, weight)
            }
            Feature::SuccessiveX01Y1 {
                word,
                next,
                next_tag,
            } => self
                .successive_x01_y1
                .insert(tag, word, next, next_tag, weight),
            Feature::Bothside1X1 { prev, next } => {
                self.bothside_1x1.insert(tag, prev, next, weight)
            }
            Feature::Bothside1X01 { prev, word, next } => {
                self.bothside_1x01.insert(tag, prev, word, next, weight)
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.previous_1x0.len()
            + self.previous_x0_1y.len()
            + self.successive_x01.len()
            + self.successive_x01_y1.len()
            + self.bothside_1x1.len()
            + self.bothside_1x01.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
