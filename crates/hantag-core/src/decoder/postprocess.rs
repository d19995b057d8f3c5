use serde::Serialize;

use super::lattice::MorphemeNode;

/// One node of a decoded path, unflattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub label: String,
    pub begin: usize,
    pub end: usize,
    /// The node's emission score.
    pub score: f64,
}

/// Expand nodes into `(morpheme, tag)` pairs: two for a compound, one
/// otherwise. Sentinels are dropped, and so is an empty compound half.
pub(crate) fn flatten<'a, I>(nodes: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a MorphemeNode>,
{
    let mut out = Vec::new();
    for node in nodes.into_iter().filter(|n| !n.is_sentinel()) {
        if node.is_compound {
            for (morph, tag) in [
                (&node.first_morph, &node.first_tag),
                (&node.last_morph, &node.last_tag),
            ] {
                if !morph.is_empty() {
                    out.push((morph.clone(), tag.clone()));
                }
            }
        } else {
            out.push((node.first_morph.clone(), node.first_tag.clone()));
        }
    }
    out
}

pub(crate) fn spans<'a, I>(nodes: I) -> Vec<Span>
where
    I: IntoIterator<Item = &'a MorphemeNode>,
{
    nodes
        .into_iter()
        .filter(|n| !n.is_sentinel())
        .map(|n| Span {
            label: n.label.clone(),
            begin: n.begin,
            end: n.end,
            score: n.emission,
        })
        .collect()
}
