//! The tagging façade: lattice, search and output post-processing over a
//! shared `ParameterStore`.

use serde::Serialize;
use tracing::debug_span;

use crate::decoder::{self, Explanation, MorphemeNode, Search, Span};
use crate::params::{ModelError, ParameterStore};
use crate::settings::{settings, Settings};

/// One decoded analysis of a sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Analysis {
    /// `(morpheme, tag)` pairs, compounds expanded.
    Morphemes(Vec<(String, String)>),
    /// The raw lattice nodes of the path.
    Spans(Vec<Span>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagResult {
    pub analysis: Analysis,
    pub score: f64,
}

impl TagResult {
    pub fn morphemes(&self) -> Option<&[(String, String)]> {
        match &self.analysis {
            Analysis::Morphemes(m) => Some(m),
            Analysis::Spans(_) => None,
        }
    }

    pub fn spans(&self) -> Option<&[Span]> {
        match &self.analysis {
            Analysis::Spans(s) => Some(s),
            Analysis::Morphemes(_) => None,
        }
    }
}

/// A Korean morpheme tagger.
///
/// `Tagger` is `Send + Sync`; `tag` takes `&self`, so one tagger can serve
/// many threads. `add_user_dictionary` also takes `&self` and is
/// serialized against running decodes by the store's lock.
pub struct Tagger {
    params: ParameterStore,
    settings: Settings,
    search: Search,
}

impl Tagger {
    /// Exact (single best path) tagger with the global settings.
    pub fn new(params: ParameterStore) -> Self {
        Self::with_search(params, Search::Exact)
    }

    /// Beam tagger returning up to `beam.beam_size` analyses.
    pub fn beam(params: ParameterStore) -> Self {
        let k = settings().beam.beam_size;
        Self::with_search(params, Search::Beam(k))
    }

    pub fn with_search(params: ParameterStore, search: Search) -> Self {
        let settings = resolve(settings().clone(), &params);
        Self {
            params,
            settings,
            search,
        }
    }

    /// Replace the tuning constants. A beam tagger takes its width from
    /// the new `beam.beam_size`.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        if let Search::Beam(_) = self.search {
            self.search = Search::Beam(settings.beam.beam_size);
        }
        self.settings = resolve(settings, &self.params);
        self
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn search(&self) -> Search {
        self.search
    }

    /// Tag a sentence.
    ///
    /// Returns one result for an exact tagger and up to `k` (best first)
    /// for a beam tagger. With `flatten`, each result is a list of
    /// `(morpheme, tag)` pairs; otherwise the path's lattice spans.
    pub fn tag(&self, sentence: &str, flatten: bool) -> Vec<TagResult> {
        let _span = debug_span!("tag", search = ?self.search, flatten).entered();
        let (lattice, paths) = decoder::decode(&self.params, &self.settings, sentence, self.search);
        paths
            .into_iter()
            .map(|path| {
                let nodes = path.nodes.iter().map(|&i| &lattice.nodes[i]);
                TagResult {
                    analysis: analysis(nodes, flatten),
                    score: path.score,
                }
            })
            .collect()
    }

    /// Reference CRF score of an already tagged sentence.
    pub fn evaluate<M, T>(&self, tagged: &[(M, T)]) -> f64
    where
        M: AsRef<str>,
        T: AsRef<str>,
    {
        decoder::evaluate(&self.params, &self.settings.beam, tagged)
    }

    /// Add or overwrite words of an existing tag. See
    /// [`ParameterStore::add_user_dictionary`].
    pub fn add_user_dictionary<I, S>(&self, tag: &str, words: I) -> Result<usize, ModelError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.params.add_user_dictionary(tag, words)
    }

    /// Lattice and exact-search score breakdown for one sentence.
    pub fn explain(&self, sentence: &str) -> Explanation {
        decoder::explain(&self.params, &self.settings, sentence)
    }
}

/// A model-provided unknown penalty overrides the configured one.
fn resolve(mut settings: Settings, params: &ParameterStore) -> Settings {
    if let Some(p) = params.unknown_penalty() {
        settings.lattice.unknown_penalty = p;
    }
    settings
}

fn analysis<'a, I>(nodes: I, flatten: bool) -> Analysis
where
    I: IntoIterator<Item = &'a MorphemeNode>,
{
    if flatten {
        Analysis::Morphemes(decoder::flatten(nodes))
    } else {
        Analysis::Spans(decoder::spans(nodes))
    }
}
