use serde::Serialize;

use crate::params::ParameterStore;
use crate::settings::Settings;

use super::ford::best_path;
use super::lattice::{build_lattice, MorphemeNode};
use super::score::{EdgeScore, EdgeScorer};

/// Full diagnostic result for a single sentence under exact search.
#[derive(Debug, Serialize)]
pub struct Explanation {
    pub sentence: String,
    pub char_count: usize,
    pub nodes: Vec<ExplainNode>,
    pub edges: Vec<ExplainEdge>,
    /// Node indices of the best path, BOS and EOS included.
    pub best_path: Vec<usize>,
    pub best_score: Option<f64>,
}

/// A lattice node for diagnostic display.
#[derive(Debug, Serialize)]
pub struct ExplainNode {
    pub index: usize,
    pub label: String,
    pub begin: usize,
    pub end: usize,
    pub emission: f64,
    pub is_compound: bool,
    pub is_unknown: bool,
}

impl ExplainNode {
    fn new(index: usize, n: &MorphemeNode) -> Self {
        Self {
            index,
            label: n.label.clone(),
            begin: n.begin,
            end: n.end,
            emission: n.emission,
            is_compound: n.is_compound,
            is_unknown: n.is_unknown,
        }
    }
}

/// An edge with its exact-search score broken down.
#[derive(Debug, Serialize)]
pub struct ExplainEdge {
    pub from: usize,
    pub to: usize,
    #[serde(flatten)]
    pub score: EdgeScore,
    pub total: f64,
    pub on_best_path: bool,
}

pub(crate) fn explain(params: &ParameterStore, settings: &Settings, sentence: &str) -> Explanation {
    let lexicon = params.lexicon();
    let lattice = build_lattice(&lexicon, sentence, &settings.lattice);
    drop(lexicon);

    let scorer = EdgeScorer::new(params, &settings.exact);
    let best = best_path(&lattice, &scorer);
    let best_nodes = best.as_ref().map(|p| p.nodes.as_slice()).unwrap_or(&[]);
    let on_path = |from: usize, to: usize| {
        best_nodes
            .windows(2)
            .any(|w| w[0] == from && w[1] == to)
    };

    let nodes = lattice
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| ExplainNode::new(i, n))
        .collect();
    let edges = lattice
        .edges
        .iter()
        .map(|e| {
            let score = scorer.breakdown(&lattice.nodes[e.from], &lattice.nodes[e.to]);
            ExplainEdge {
                from: e.from,
                to: e.to,
                total: score.total(),
                score,
                on_best_path: on_path(e.from, e.to),
            }
        })
        .collect();

    Explanation {
        sentence: sentence.to_string(),
        char_count: lattice.char_count(),
        nodes,
        edges,
        best_path: best_nodes.to_vec(),
        best_score: best.as_ref().map(|p| p.score),
    }
}

impl Explanation {
    /// Labels along the best path, sentinels excluded.
    pub fn best_labels(&self) -> Vec<&str> {
        self.best_path
            .iter()
            .map(|&i| &self.nodes[i])
            .filter(|n| n.begin != n.end)
            .map(|n| n.label.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::lattice::{BOS_INDEX, EOS_INDEX};
    use crate::decoder::testutil::{default_settings, scenario_store};

    #[test]
    fn test_explain_scenario() {
        let store = scenario_store();
        let ex = explain(&store, &default_settings(), "이것은 예문입니다");
        assert_eq!(ex.char_count, 8);
        assert_eq!(
            ex.best_labels(),
            vec!["이것/Noun", "은/Josa", "예문/Noun", "이/Adjective + ㅂ니다/Eomi"]
        );
        assert_eq!(ex.best_path.first(), Some(&BOS_INDEX));
        assert_eq!(ex.best_path.last(), Some(&EOS_INDEX));
        assert_eq!(
            ex.edges.iter().filter(|e| e.on_best_path).count(),
            ex.best_path.len() - 1
        );
        let on_path_total: f64 = ex.edges.iter().filter(|e| e.on_best_path).map(|e| e.total).sum();
        assert!((on_path_total - ex.best_score.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_explain_serializes() {
        let store = scenario_store();
        let ex = explain(&store, &default_settings(), "예문");
        let json = serde_json::to_value(&ex).unwrap();
        assert_eq!(json["sentence"], "예문");
        let edge = &json["edges"][0];
        assert!(edge.get("transition").is_some());
        assert!(edge.get("structural").is_some());
        assert!(edge.get("total").is_some());
    }
}
