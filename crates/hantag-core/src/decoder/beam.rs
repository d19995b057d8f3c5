use tracing::{debug, debug_span};

use super::lattice::{Lattice, BOS_INDEX, EOS_INDEX};
use super::score::{History, PathScorer};
use super::ScoredPath;

/// One partial path: the node it ends in plus a back-pointer into the
/// arena, so sibling hypotheses share their common prefix.
#[derive(Clone, Copy)]
struct BeamEntry {
    node: usize,
    parent: Option<usize>,
    score: f64,
}

/// Arena of every hypothesis that survived pruning.
struct Hypotheses<'l> {
    lattice: &'l Lattice,
    entries: Vec<BeamEntry>,
}

impl<'l> Hypotheses<'l> {
    fn push(&mut self, entry: BeamEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    fn history(&self, id: usize) -> History<'l> {
        let lattice = self.lattice;
        let entry = &self.entries[id];
        History {
            prev: &lattice.nodes[entry.node],
            prev2: entry.parent.map(|p| &lattice.nodes[self.entries[p].node]),
        }
    }

    fn backtrace(&self, id: usize) -> Vec<usize> {
        let mut nodes = Vec::new();
        let mut cur = Some(id);
        while let Some(i) = cur {
            nodes.push(self.entries[i].node);
            cur = self.entries[i].parent;
        }
        nodes.reverse();
        nodes
    }
}

/// Stable descending sort, then keep the best `k`. Equal scores keep
/// their generation order.
fn prune(candidates: &mut Vec<BeamEntry>, k: usize) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(k);
}

/// Approximate k-best search with trigram context.
///
/// `beams[e]` holds the best `k` partial paths covering `[0, e)`. For each
/// end offset, nodes ending there are grouped by begin offset (ascending);
/// every hypothesis in `beams[begin]` is extended by every node of the
/// group, then the pooled candidates are pruned. Finally every hypothesis
/// in `beams[n]` is closed with EOS.
///
/// Returns at most `k` complete paths (BOS to EOS inclusive), best first.
pub(crate) fn beam_search(lattice: &Lattice, scorer: &dyn PathScorer, k: usize) -> Vec<ScoredPath> {
    let n = lattice.char_count();
    let _span = debug_span!("beam_search", k, char_count = n).entered();
    if k == 0 {
        return Vec::new();
    }

    let mut arena = Hypotheses {
        lattice,
        entries: Vec::new(),
    };
    let mut beams: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
    beams[0].push(arena.push(BeamEntry {
        node: BOS_INDEX,
        parent: None,
        score: 0.0,
    }));

    for end in 1..=n {
        let mut ending_here = lattice.nodes_by_end[end].clone();
        ending_here.sort_by_key(|&i| lattice.nodes[i].begin);

        let mut candidates = Vec::new();
        for group in ending_here.chunk_by(|&a, &b| lattice.nodes[a].begin == lattice.nodes[b].begin) {
            let begin = lattice.nodes[group[0]].begin;
            for &id in &beams[begin] {
                let history = arena.history(id);
                let base = arena.entries[id].score;
                for &node in group {
                    candidates.push(BeamEntry {
                        node,
                        parent: Some(id),
                        score: base + scorer.score(history, &lattice.nodes[node]),
                    });
                }
            }
        }
        prune(&mut candidates, k);
        beams[end] = candidates.into_iter().map(|c| arena.push(c)).collect();
    }

    let eos = &lattice.nodes[EOS_INDEX];
    let mut finals: Vec<BeamEntry> = beams[n]
        .iter()
        .map(|&id| BeamEntry {
            node: EOS_INDEX,
            parent: Some(id),
            score: arena.entries[id].score + scorer.score(arena.history(id), eos),
        })
        .collect();
    prune(&mut finals, k);

    let results: Vec<ScoredPath> = finals
        .into_iter()
        .map(|entry| {
            let score = entry.score;
            let id = arena.push(entry);
            ScoredPath {
                nodes: arena.backtrace(id),
                score,
            }
        })
        .collect();

    debug!(
        hypotheses = arena.entries.len(),
        result_count = results.len(),
        best_score = results.first().map(|p| p.score)
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::lattice::build_lattice;
    use crate::decoder::score::TrigramScorer;
    use crate::decoder::testutil::{beam_settings, labels, lattice_settings, scenario_store};

    #[test]
    fn test_beam_scenario() {
        let store = scenario_store();
        let settings = beam_settings();
        let lattice = build_lattice(&store.lexicon(), "이것은예문입니다", &lattice_settings());
        let paths = beam_search(&lattice, &TrigramScorer::new(&store, &settings), 5);
        assert!(!paths.is_empty() && paths.len() <= 5);
        assert_eq!(
            labels(&lattice, &paths[0].nodes),
            vec![
                "BOS/BOS",
                "이것/Noun",
                "은/Josa",
                "예문/Noun",
                "이/Adjective + ㅂ니다/Eomi",
                "EOS/EOS"
            ]
        );
        assert!((paths[0].score - 7.6).abs() < 1e-9);
        assert!(paths.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_beam_paths_are_complete() {
        let store = scenario_store();
        let settings = beam_settings();
        let lattice = build_lattice(&store.lexicon(), "이것은 예문입니다", &lattice_settings());
        for path in beam_search(&lattice, &TrigramScorer::new(&store, &settings), 3) {
            assert_eq!(path.nodes.first(), Some(&BOS_INDEX));
            assert_eq!(path.nodes.last(), Some(&EOS_INDEX));
            for pair in path.nodes.windows(2) {
                assert_eq!(lattice.nodes[pair[0]].end, lattice.nodes[pair[1]].begin);
            }
        }
    }

    #[test]
    fn test_beam_width_one() {
        let store = scenario_store();
        let settings = beam_settings();
        let lattice = build_lattice(&store.lexicon(), "예문", &lattice_settings());
        let paths = beam_search(&lattice, &TrigramScorer::new(&store, &settings), 1);
        assert_eq!(paths.len(), 1);
        assert_eq!(labels(&lattice, &paths[0].nodes)[1], "예문/Noun");
    }

    #[test]
    fn test_beam_empty_sentence() {
        let store = scenario_store();
        let settings = beam_settings();
        let lattice = build_lattice(&store.lexicon(), "", &lattice_settings());
        let paths = beam_search(&lattice, &TrigramScorer::new(&store, &settings), 5);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].nodes, vec![BOS_INDEX, EOS_INDEX]);
    }

    #[test]
    fn test_beam_zero_width() {
        let store = scenario_store();
        let settings = beam_settings();
        let lattice = build_lattice(&store.lexicon(), "예문", &lattice_settings());
        assert!(beam_search(&lattice, &TrigramScorer::new(&store, &settings), 0).is_empty());
    }
}
