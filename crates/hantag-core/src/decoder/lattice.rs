use serde::Serialize;
use tracing::{debug, debug_span};

use crate::lemmatizer::lemma_candidates;
use crate::params::Lexicon;
use crate::settings::LatticeSettings;
use crate::tags;

/// Index of the synthetic start node in `Lattice::nodes`.
pub const BOS_INDEX: usize = 0;
/// Index of the synthetic end node in `Lattice::nodes`.
pub const EOS_INDEX: usize = 1;

/// A candidate morpheme (or stem+ending / noun+josa pair) in the lattice.
///
/// Offsets are char indices into the sentence with whitespace removed,
/// `begin` inclusive and `end` exclusive. A simple node has identical
/// first and last halves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphemeNode {
    /// `word/Tag`, or `stem/Tag + ending/Tag` for a compound.
    pub label: String,
    pub first_morph: String,
    pub last_morph: String,
    pub first_tag: String,
    pub last_tag: String,
    pub begin: usize,
    pub end: usize,
    /// Sum of the dictionary weights of the node's morphemes.
    pub emission: f64,
    pub is_compound: bool,
    pub is_unknown: bool,
}

impl MorphemeNode {
    pub fn simple(word: &str, tag: &str, begin: usize, end: usize, emission: f64) -> Self {
        Self {
            label: format!("{word}/{tag}"),
            first_morph: word.to_string(),
            last_morph: word.to_string(),
            first_tag: tag.to_string(),
            last_tag: tag.to_string(),
            begin,
            end,
            emission,
            is_compound: false,
            is_unknown: false,
        }
    }

    pub fn compound(
        (stem, stem_tag): (&str, &str),
        (ending, ending_tag): (&str, &str),
        begin: usize,
        end: usize,
        emission: f64,
    ) -> Self {
        Self {
            label: format!("{stem}/{stem_tag} + {ending}/{ending_tag}"),
            first_morph: stem.to_string(),
            last_morph: ending.to_string(),
            first_tag: stem_tag.to_string(),
            last_tag: ending_tag.to_string(),
            begin,
            end,
            emission,
            is_compound: true,
            is_unknown: false,
        }
    }

    /// A node for a span no dictionary covers.
    pub fn unknown(word: &str, tag: &str, begin: usize, end: usize, penalty: f64) -> Self {
        Self {
            is_unknown: true,
            ..Self::simple(word, tag, begin, end, penalty)
        }
    }

    pub fn bos() -> Self {
        Self::simple(tags::BOS, tags::BOS, 0, 0, 0.0)
    }

    pub fn eos(char_count: usize) -> Self {
        Self::simple(tags::EOS, tags::EOS, char_count, char_count, 0.0)
    }

    pub fn is_sentinel(&self) -> bool {
        self.begin == self.end
    }

    /// Span length in characters.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// A legal adjacency: `nodes[from].end == nodes[to].begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

/// All candidate segmentations of one sentence.
pub struct Lattice {
    /// The sentence with whitespace removed.
    pub chars: Vec<char>,
    /// All nodes; `BOS_INDEX` and `EOS_INDEX` are the sentinels.
    pub nodes: Vec<MorphemeNode>,
    /// nodes_by_start[i] = indices of nodes that start at position i (EOS at `char_count`)
    pub nodes_by_start: Vec<Vec<usize>>,
    /// nodes_by_end[i] = indices of nodes that end at position i (BOS at 0)
    pub nodes_by_end: Vec<Vec<usize>>,
    /// Sorted by `(from.begin, to.end)`; ties keep generation order.
    pub edges: Vec<Edge>,
}

impl Lattice {
    pub fn char_count(&self) -> usize {
        self.chars.len()
    }
}

/// Collects nodes while remembering which spans are already covered.
struct NodeSink {
    nodes: Vec<MorphemeNode>,
}

impl NodeSink {
    fn push(&mut self, node: MorphemeNode) {
        self.nodes.push(node);
    }

    /// Push a compound unless an identical one already covers the span.
    fn push_compound(&mut self, node: MorphemeNode, span_start: usize) {
        let dup = self.nodes[span_start..]
            .iter()
            .any(|n| n.is_compound && n.end == node.end && n.label == node.label);
        if !dup {
            self.nodes.push(node);
        }
    }
}

/// Build the lattice for `sentence`.
///
/// Candidate spans of up to `max_word_len` characters are looked up inside
/// each eojeol: every tag whose dictionary holds the span yields a simple
/// node, and every split of the span the lemmatizer can map onto
/// dictionary entries yields a compound node. Offsets no candidate starts
/// at are bridged with an unknown filler running to the next offset that
/// has candidates, so EOS is always reachable from BOS.
pub fn build_lattice(lexicon: &Lexicon, sentence: &str, opts: &LatticeSettings) -> Lattice {
    let chars: Vec<char> = sentence.chars().filter(|c| !c.is_whitespace()).collect();
    let char_count = chars.len();
    let _span = debug_span!("build_lattice", char_count).entered();
    let max_len = lexicon.max_word_len().max(1);

    let mut sink = NodeSink {
        nodes: vec![MorphemeNode::bos(), MorphemeNode::eos(char_count)],
    };

    let mut offset = 0;
    for eojeol in sentence.split_whitespace() {
        let len = eojeol.chars().count();
        for b in offset..offset + len {
            let eojeol_end = offset + len;
            for e in (b + 1)..=(b + max_len).min(eojeol_end) {
                let surface: String = chars[b..e].iter().collect();
                add_simple_nodes(&mut sink, lexicon, &surface, b, e, opts);
                add_compound_nodes(&mut sink, lexicon, &surface, b, e, max_len);
            }
        }
        offset += len;
    }

    add_unknown_fillers(&mut sink, &chars, opts.unknown_penalty);

    let nodes = sink.nodes;
    let mut nodes_by_start: Vec<Vec<usize>> = vec![Vec::new(); char_count + 1];
    let mut nodes_by_end: Vec<Vec<usize>> = vec![Vec::new(); char_count + 1];
    nodes_by_end[0].push(BOS_INDEX);
    nodes_by_start[char_count].push(EOS_INDEX);
    for (idx, node) in nodes.iter().enumerate().skip(2) {
        nodes_by_start[node.begin].push(idx);
        nodes_by_end[node.end].push(idx);
    }

    let mut edges = Vec::new();
    for pos in 0..=char_count {
        for &from in &nodes_by_end[pos] {
            for &to in &nodes_by_start[pos] {
                debug_assert_eq!(nodes[from].end, nodes[to].begin);
                edges.push(Edge { from, to });
            }
        }
    }
    edges.sort_by_key(|e| (nodes[e.from].begin, nodes[e.to].end));

    debug!(node_count = nodes.len(), edge_count = edges.len());
    Lattice {
        chars,
        nodes,
        nodes_by_start,
        nodes_by_end,
        edges,
    }
}

fn add_simple_nodes(
    sink: &mut NodeSink,
    lexicon: &Lexicon,
    surface: &str,
    b: usize,
    e: usize,
    opts: &LatticeSettings,
) {
    let before = sink.nodes.len();
    for (tag, weight) in lexicon.tags_of(surface) {
        sink.push(MorphemeNode::simple(surface, tag, b, e, weight));
    }
    if opts.guess_unknown && sink.nodes.len() == before {
        for tag in &opts.guess_tags {
            sink.push(MorphemeNode::unknown(surface, tag, b, e, opts.unknown_penalty));
        }
    }
}

/// Stem+ending and noun+josa nodes for one span. Pre-analyzed entries for
/// the exact surface replace rule-derived ones.
fn add_compound_nodes(
    sink: &mut NodeSink,
    lexicon: &Lexicon,
    surface: &str,
    b: usize,
    e: usize,
    max_len: usize,
) {
    let span_start = sink.nodes.len();
    if let Some(entries) = lexicon.preanalyzed(surface) {
        for p in entries {
            let emission = lexicon.weight(&p.stem_tag, &p.stem).unwrap_or(0.0)
                + lexicon.weight(&p.ending_tag, &p.ending).unwrap_or(0.0);
            sink.push_compound(
                MorphemeNode::compound(
                    (&p.stem, &p.stem_tag),
                    (&p.ending, &p.ending_tag),
                    b,
                    e,
                    emission,
                ),
                span_start,
            );
        }
        return;
    }

    let char_len = e - b;
    let noun_josa = char_len > 1 && !lexicon.contains(tags::NOUN, surface);
    let boundaries: Vec<usize> = surface
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(surface.len()))
        .collect();

    for split in 1..=max_len.min(char_len) {
        let (l, r) = surface.split_at(boundaries[split]);
        for (stem, ending) in lemma_candidates(l, r) {
            for stem_tag in tags::PREDICATES {
                if let (Some(sw), Some(ew)) = (
                    lexicon.weight(stem_tag, &stem),
                    lexicon.weight(tags::EOMI, &ending),
                ) {
                    sink.push_compound(
                        MorphemeNode::compound(
                            (&stem, stem_tag),
                            (&ending, tags::EOMI),
                            b,
                            e,
                            sw + ew,
                        ),
                        span_start,
                    );
                }
            }
            if noun_josa {
                if let (Some(nw), Some(jw)) = (
                    lexicon.weight(tags::NOUN, &stem),
                    lexicon.weight(tags::JOSA, &ending),
                ) {
                    sink.push_compound(
                        MorphemeNode::compound(
                            (&stem, tags::NOUN),
                            (&ending, tags::JOSA),
                            b,
                            e,
                            nw + jw,
                        ),
                        span_start,
                    );
                }
            }
        }
    }
}

/// Bridge every reachable offset that no candidate starts at.
///
/// An offset is reachable when it is 0 or some candidate ends there. The
/// filler runs to the next offset with candidates (or the sentence end),
/// so fillers never end at an offset that itself needs bridging.
fn add_unknown_fillers(sink: &mut NodeSink, chars: &[char], penalty: f64) {
    let n = chars.len();
    let mut has_start = vec![false; n + 1];
    let mut has_end = vec![false; n + 1];
    has_start[n] = true;
    has_end[0] = true;
    for node in sink.nodes.iter().skip(2) {
        has_start[node.begin] = true;
        has_end[node.end] = true;
    }

    for b in 0..n {
        if has_start[b] || !has_end[b] {
            continue;
        }
        let e = (b + 1..=n).find(|&i| has_start[i]).unwrap_or(n);
        let word: String = chars[b..e].iter().collect();
        sink.push(MorphemeNode::unknown(&word, tags::UNKNOWN, b, e, penalty));
    }
}
