use tracing::debug;

use crate::params::ParameterStore;
use crate::settings::BeamSettings;

use super::lattice::MorphemeNode;
use super::score::{History, TrigramScorer};

/// Reference CRF score of an already tagged sentence.
///
/// Each `(morpheme, tag)` becomes a simple node weighted by its dictionary
/// entry (0 if absent); the score sums transitions (BOS and EOS included),
/// emissions and the trigram context features along that fixed path.
/// Structural preferences are decoder heuristics and are not part of it.
pub(crate) fn evaluate<M, T>(params: &ParameterStore, settings: &BeamSettings, tagged: &[(M, T)]) -> f64
where
    M: AsRef<str>,
    T: AsRef<str>,
{
    let mut nodes = Vec::with_capacity(tagged.len() + 2);
    nodes.push(MorphemeNode::bos());
    {
        let lexicon = params.lexicon();
        let mut offset = 0;
        for (morph, tag) in tagged {
            let (morph, tag) = (morph.as_ref(), tag.as_ref());
            let end = offset + morph.chars().count();
            let weight = lexicon.weight(tag, morph).unwrap_or(0.0);
            nodes.push(MorphemeNode::simple(morph, tag, offset, end, weight));
            offset = end;
        }
        nodes.push(MorphemeNode::eos(offset));
    }

    let scorer = TrigramScorer::new(params, settings);
    let score = (1..nodes.len())
        .map(|i| {
            let history = History {
                prev: &nodes[i - 1],
                prev2: i.checked_sub(2).map(|j| &nodes[j]),
            };
            scorer.model_score(history, &nodes[i])
        })
        .sum();
    debug!(morphemes = tagged.len(), score);
    score
}
