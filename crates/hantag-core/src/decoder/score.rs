use serde::Serialize;

use crate::params::ParameterStore;
use crate::settings::{BeamSettings, ExactSettings};
use crate::tags;

use super::lattice::MorphemeNode;

/// What a path looks like just before `next` is appended.
#[derive(Clone, Copy)]
pub(crate) struct History<'a> {
    pub prev: &'a MorphemeNode,
    /// The node before `prev`; `None` when `prev` is BOS or the search
    /// does not track it.
    pub prev2: Option<&'a MorphemeNode>,
}

impl<'a> History<'a> {
    pub fn edge(prev: &'a MorphemeNode) -> Self {
        Self { prev, prev2: None }
    }
}

/// Trait for scoring a step of a lattice path. Higher is better.
pub(crate) trait PathScorer: Send + Sync {
    fn score(&self, history: History<'_>, next: &MorphemeNode) -> f64;
}

fn is_noun(node: &MorphemeNode) -> bool {
    node.first_tag == tags::NOUN
}

/// Breakdown of one exact-search edge score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeScore {
    pub transition: f64,
    pub from_emission: f64,
    pub to_emission: f64,
    pub structural: f64,
}

impl EdgeScore {
    pub fn total(&self) -> f64 {
        self.transition + self.from_emission + self.to_emission + self.structural
    }
}

/// Edge-local scoring for exact search: transition plus both endpoint
/// emissions plus a length/category adjustment of the target.
pub(crate) struct EdgeScorer<'a> {
    params: &'a ParameterStore,
    settings: &'a ExactSettings,
}

impl<'a> EdgeScorer<'a> {
    pub fn new(params: &'a ParameterStore, settings: &'a ExactSettings) -> Self {
        Self { params, settings }
    }

    /// One-character first morphemes are penalized (nouns more so);
    /// longer nouns get a bonus.
    fn structural(&self, to: &MorphemeNode) -> f64 {
        if to.is_sentinel() {
            return 0.0;
        }
        let noun = if is_noun(to) { 1.0 } else { 0.0 };
        if to.first_morph.chars().count() == 1 {
            self.settings.single_syllable_penalty * (1.0 + self.settings.noun_preference * noun)
        } else {
            self.settings.noun_preference * noun
        }
    }

    pub fn breakdown(&self, from: &MorphemeNode, to: &MorphemeNode) -> EdgeScore {
        EdgeScore {
            transition: self.params.transition(&from.last_tag, &to.first_tag),
            from_emission: from.emission,
            to_emission: to.emission,
            structural: self.structural(to),
        }
    }
}

impl PathScorer for EdgeScorer<'_> {
    fn score(&self, history: History<'_>, next: &MorphemeNode) -> f64 {
        self.breakdown(history.prev, next).total()
    }
}

/// Trigram-context scoring for beam search.
pub(crate) struct TrigramScorer<'a> {
    params: &'a ParameterStore,
    settings: &'a BeamSettings,
}

impl<'a> TrigramScorer<'a> {
    pub fn new(params: &'a ParameterStore, settings: &'a BeamSettings) -> Self {
        Self { params, settings }
    }

    /// Span-length adjustments. Sentinels have length 0 and get none.
    fn structural(&self, next: &MorphemeNode) -> f64 {
        let s = self.settings;
        let len = next.len();
        let noun = is_noun(next);
        let mut score = 0.0;
        if len == 1 {
            let scale = if noun { 1.0 + s.noun_preference } else { 1.0 };
            score += s.single_syllable_penalty * scale;
        }
        if noun && len > 1 {
            score += s.noun_preference;
        }
        if noun && len > 0 {
            score += s.longer_noun_preference * (len - 1) as f64;
        }
        score
    }

    /// The CRF part of the score: transition, emission and the six
    /// context features around the `prev -> next` boundary.
    pub fn model_score(&self, history: History<'_>, next: &MorphemeNode) -> f64 {
        let prev = history.prev;
        let f = self.params.features();
        let mut score = self.params.transition(&prev.last_tag, &next.first_tag)
            + next.emission
            + f.previous_1x0
                .get(&next.first_tag, &prev.last_morph, &next.first_morph)
            + f.previous_x0_1y
                .get(&next.first_tag, &next.first_morph, &prev.last_tag)
            + f.successive_x01
                .get(&prev.last_tag, &prev.last_morph, &next.first_morph)
            + f.successive_x01_y1.get(
                &prev.last_tag,
                &prev.last_morph,
                &next.first_morph,
                &next.first_tag,
            );
        if let Some(prev2) = history.prev2 {
            score += f
                .bothside_1x1
                .get(&prev.first_tag, &prev2.last_morph, &next.first_morph)
                + f.bothside_1x01.get(
                    &prev.first_tag,
                    &prev2.last_morph,
                    &prev.first_morph,
                    &next.first_morph,
                );
        }
        score
    }
}

impl PathScorer for TrigramScorer<'_> {
    fn score(&self, history: History<'_>, next: &MorphemeNode) -> f64 {
        self.structural(next) + self.model_score(history, next)
    }
}
