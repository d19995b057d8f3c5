//! Morpheme lattice construction and path search.
//!
//! Builds a lattice of candidate morphemes (simple dictionary words,
//! lemmatized stem+ending pairs, noun+josa pairs and unknown fillers) over
//! the sentence's characters, then searches it either exactly with
//! edge-local scores or approximately with a trigram-context beam.

mod beam;
mod evaluate;
pub mod explain;
mod ford;
mod lattice;
mod postprocess;
mod score;
pub(crate) mod testutil;


use crate::params::ParameterStore;
use crate::settings::Settings;

use score::{EdgeScorer, TrigramScorer};

pub use explain::{ExplainEdge, ExplainNode, Explanation};
pub use lattice::{build_lattice, Edge, Lattice, MorphemeNode, BOS_INDEX, EOS_INDEX};
pub use postprocess::Span;
pub use score::EdgeScore;

pub(crate) use evaluate::evaluate;
pub(crate) use explain::explain;
pub(crate) use postprocess::{flatten, spans};

/// Search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// Single best path under edge-local scores.
    Exact,
    /// Up to `k` paths under trigram-context scores.
    Beam(usize),
}

/// A complete path through a lattice, as node indices from BOS to EOS.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredPath {
    pub nodes: Vec<usize>,
    pub score: f64,
}

/// Build the lattice for `sentence` and search it.
///
/// The lexicon read guard is held while the lattice is built, so a
/// concurrent `add_user_dictionary` either fully precedes or fully
/// follows this decode.
pub(crate) fn decode(
    params: &ParameterStore,
    settings: &Settings,
    sentence: &str,
    search: Search,
) -> (Lattice, Vec<ScoredPath>) {
    let lattice = {
        let lexicon = params.lexicon();
        build_lattice(&lexicon, sentence, &settings.lattice)
    };
    let paths = match search {
        Search::Exact => {
            let scorer = EdgeScorer::new(params, &settings.exact);
            ford::best_path(&lattice, &scorer).into_iter().collect()
        }
        Search::Beam(k) => {
            let scorer = TrigramScorer::new(params, &settings.beam);
            beam::beam_search(&lattice, &scorer, k)
        }
    };
    (lattice, paths)
}
