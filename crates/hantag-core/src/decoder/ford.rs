use tracing::{debug, debug_span};

use super::lattice::{Lattice, BOS_INDEX, EOS_INDEX};
use super::score::{History, PathScorer};
use super::ScoredPath;

/// Exact best-path search by edge relaxation.
///
/// Edges are visited in `(from.begin, to.end)` order, which settles every
/// node before its outgoing edges are relaxed. A node's best score only
/// changes on a strict improvement, so among equal-scoring predecessors
/// the first relaxed one wins.
///
/// Returns the node sequence from BOS to EOS inclusive, or `None` if EOS
/// is unreachable.
pub(crate) fn best_path(lattice: &Lattice, scorer: &dyn PathScorer) -> Option<ScoredPath> {
    let node_count = lattice.nodes.len();
    let _span = debug_span!("best_path", node_count, edge_count = lattice.edges.len()).entered();

    let mut best: Vec<Option<f64>> = vec![None; node_count];
    let mut back: Vec<Option<usize>> = vec![None; node_count];
    best[BOS_INDEX] = Some(0.0);

    for edge in &lattice.edges {
        let Some(from_score) = best[edge.from] else {
            continue;
        };
        let history = History::edge(&lattice.nodes[edge.from]);
        let candidate = from_score + scorer.score(history, &lattice.nodes[edge.to]);
        if best[edge.to].map_or(true, |cur| candidate > cur) {
            best[edge.to] = Some(candidate);
            back[edge.to] = Some(edge.from);
        }
    }

    let score = best[EOS_INDEX]?;
    let mut nodes = vec![EOS_INDEX];
    let mut cur = EOS_INDEX;
    while let Some(prev) = back[cur] {
        nodes.push(prev);
        cur = prev;
    }
    nodes.reverse();
    debug_assert_eq!(nodes.first(), Some(&BOS_INDEX));

    debug!(path_len = nodes.len(), score);
    Some(ScoredPath { nodes, score })
}
