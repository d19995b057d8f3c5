use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use hantag_core::{Analysis, Explanation, Search, TagResult, Tagger};

use super::model_ops::open_model;
use crate::user_dict::load_user_dict;

/// `--beam K`: a zero-width beam keeps no hypotheses, so it is refused.
pub fn parse_beam_width(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("beam width must be at least 1".to_string()),
        Ok(k) => Ok(k),
        Err(e) => Err(e.to_string()),
    }
}

pub fn build_tagger(model_file: &str, beam: Option<usize>, user_dict: Option<&str>) -> Tagger {
    let search = match beam {
        Some(k) => Search::Beam(k),
        None => Search::Exact,
    };
    let tagger = Tagger::with_search(open_model(model_file), search);
    if let Some(path) = user_dict {
        die!(
            load_user_dict(&tagger, Path::new(path)),
            "Error loading user dictionary {path}: {}"
        );
    }
    tagger
}

/// `morph/Tag morph/Tag ...`, the corpus line format.
pub fn format_morphemes(morphemes: &[(String, String)]) -> String {
    morphemes
        .iter()
        .map(|(m, t)| format!("{m}/{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_results(results: &[TagResult]) -> String {
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let body = match &r.analysis {
            Analysis::Morphemes(m) => format_morphemes(m),
            Analysis::Spans(spans) => spans
                .iter()
                .map(|s| format!("[{},{}] {}", s.begin, s.end, s.label))
                .collect::<Vec<_>>()
                .join(" | "),
        };
        if results.len() == 1 {
            out.push_str(&format!("{body}\t{:.4}\n", r.score));
        } else {
            out.push_str(&format!("#{:>2}: {body}\t{:.4}\n", i + 1, r.score));
        }
    }
    out
}

pub fn tag_cmd(
    model_file: &str,
    sentence: &str,
    beam: Option<usize>,
    detail: bool,
    json: bool,
    user_dict: Option<&str>,
) {
    let tagger = build_tagger(model_file, beam, user_dict);
    let results = tagger.tag(sentence, !detail);
    if json {
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&results), "JSON error: {}")
        );
    } else {
        print!("{}", format_results(&results));
    }
}

#[derive(Serialize)]
struct BatchLine<'a> {
    sentence: &'a str,
    results: Vec<TagResult>,
}

/// Tag one sentence per input line, writing one JSON object per line.
pub fn batch_cmd(model_file: &str, input_file: &str, output_file: &str, beam: Option<usize>) {
    let tagger = build_tagger(model_file, beam, None);
    let input = die!(
        fs::File::open(input_file),
        "Error opening input file {input_file}: {}"
    );
    let output = die!(
        fs::File::create(output_file),
        "Error creating output file {output_file}: {}"
    );
    let mut writer = BufWriter::new(output);

    let mut count = 0usize;
    for line in BufReader::new(input).lines() {
        let line = die!(line, "Error reading input: {}");
        let sentence = line.trim();
        if sentence.is_empty() || sentence.starts_with('#') {
            continue;
        }
        let entry = BatchLine {
            sentence,
            results: tagger.tag(sentence, true),
        };
        let json = die!(serde_json::to_string(&entry), "JSON error: {}");
        die!(writeln!(writer, "{json}"), "Error writing output: {}");
        count += 1;
    }
    die!(writer.flush(), "Error writing output: {}");
    info!(count, output_file, "batch finished");
    eprintln!("Tagged {count} sentences -> {output_file}");
}

/// Parse `word/Tag word/Tag ...`. The tag is everything after the last
/// `/`, so words may contain slashes.
pub fn parse_tagged(line: &str) -> Result<Vec<(String, String)>, String> {
    line.split_whitespace()
        .map(|token| match token.rsplit_once('/') {
            Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                Ok((word.to_string(), tag.to_string()))
            }
            _ => Err(format!("expected word/Tag, got '{token}'")),
        })
        .collect()
}

pub fn evaluate_cmd(model_file: &str, tagged: &str) {
    let tagger = build_tagger(model_file, None, None);
    let pairs = die!(parse_tagged(tagged), "Error parsing tagged sentence: {}");
    println!("{:.4}", tagger.evaluate(&pairs));
}

pub fn explain_cmd(model_file: &str, sentence: &str, json: bool) {
    let tagger = build_tagger(model_file, None, None);
    let explanation = tagger.explain(sentence);
    if json {
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&explanation), "JSON error: {}")
        );
    } else {
        print!("{}", format_explain(&explanation));
    }
}

fn pad(label: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(label);
    if w < width {
        format!("{label}{}", " ".repeat(width - w))
    } else {
        label.to_string()
    }
}

/// Format an explanation as human-readable text.
pub fn format_explain(ex: &Explanation) -> String {
    const LABEL_WIDTH: usize = 28;
    let mut out = String::new();

    out.push_str(&format!(
        "=== Lattice for \"{}\" ({} chars, {} nodes, {} edges) ===\n",
        ex.sentence,
        ex.char_count,
        ex.nodes.len(),
        ex.edges.len(),
    ));
    for pos in 0..ex.char_count {
        let here: Vec<_> = ex
            .nodes
            .iter()
            .filter(|n| n.begin == pos && n.begin != n.end)
            .collect();
        if here.is_empty() {
            continue;
        }
        out.push_str(&format!("  Position {pos}:\n"));
        for n in here {
            let mark = if n.is_unknown {
                " unk"
            } else if n.is_compound {
                " cmp"
            } else {
                ""
            };
            out.push_str(&format!(
                "    #{:<3} [{},{}] {} emission={:<8.4}{mark}\n",
                n.index,
                n.begin,
                n.end,
                pad(&n.label, LABEL_WIDTH),
                n.emission,
            ));
        }
    }

    let Some(best) = ex.best_score else {
        out.push_str("\nNo path found.\n");
        return out;
    };
    out.push_str(&format!("\n=== Best path (score={best:.4}) ===\n"));
    for edge in ex.edges.iter().filter(|e| e.on_best_path) {
        let label = &ex.nodes[edge.to].label;
        out.push_str(&format!(
            "    {} trans={:<+8.4} from={:<+8.4} to={:<+8.4} struct={:<+8.4} -> {:+.4}\n",
            pad(label, LABEL_WIDTH),
            edge.score.transition,
            edge.score.from_emission,
            edge.score.to_emission,
            edge.score.structural,
            edge.total,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hantag_core::ParameterStore;

    fn tagger() -> Tagger {
        let params = ParameterStore::builder()
            .word("Noun", "예문", 1.5)
            .word("Josa", "은", 1.0)
            .transition("Noun", "Josa", 1.0)
            .build()
            .unwrap();
        Tagger::new(params)
    }

    #[test]
    fn parse_tagged_tokens() {
        assert_eq!(
            parse_tagged("예문/Noun 은/Josa").unwrap(),
            vec![
                ("예문".to_string(), "Noun".to_string()),
                ("은".to_string(), "Josa".to_string())
            ]
        );
        assert_eq!(
            parse_tagged("1/2/Number").unwrap(),
            vec![("1/2".to_string(), "Number".to_string())]
        );
        assert!(parse_tagged("예문").is_err());
        assert!(parse_tagged("/Noun").is_err());
        assert!(parse_tagged("").unwrap().is_empty());
    }

    #[test]
    fn beam_width_must_be_positive() {
        assert_eq!(parse_beam_width("3"), Ok(3));
        assert!(parse_beam_width("0").is_err());
        assert!(parse_beam_width("-1").is_err());
        assert!(parse_beam_width("wide").is_err());
    }

    #[test]
    fn results_text() {
        let results = tagger().tag("예문은", true);
        assert_eq!(format_results(&results), "예문/Noun 은/Josa\t5.3500\n");
    }

    #[test]
    fn results_text_spans() {
        let results = tagger().tag("예문은", false);
        let text = format_results(&results);
        assert!(text.starts_with("[0,2] 예문/Noun | [2,3] 은/Josa\t"));
    }

    #[test]
    fn explain_text_aligns_labels() {
        let text = format_explain(&tagger().explain("예문은"));
        assert!(text.starts_with("=== Lattice for \"예문은\" (3 chars,"));
        assert!(text.contains("  Position 0:\n"));
        assert!(text.contains("=== Best path"));
        // "예문/Noun" is 9 columns wide, padded to 28
        assert!(text.contains(&format!("예문/Noun{} trans=", " ".repeat(19))));
    }

    #[test]
    fn explain_text_without_path() {
        let ex = Explanation {
            sentence: String::new(),
            char_count: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
            best_path: Vec::new(),
            best_score: None,
        };
        assert!(format_explain(&ex).ends_with("No path found.\n"));
    }
}
