use std::path::Path;

use hantag_core::{ModelStats, ParameterStore};

pub fn open_model(model_file: &str) -> ParameterStore {
    die!(
        ParameterStore::open_any(Path::new(model_file)),
        "Error opening model {model_file}: {}"
    )
}

/// Compile a JSON weight file into the binary model format.
pub fn compile_cmd(input_file: &str, output_file: &str) {
    let params = die!(
        ParameterStore::open_json(Path::new(input_file)),
        "Error reading JSON model: {}"
    );
    die!(
        params.save(Path::new(output_file)),
        "Error writing compiled model: {}"
    );
    let stats = params.stats();
    eprintln!(
        "Compiled {} words across {} tags, {} context features -> {}",
        stats.words, stats.tags, stats.context_features, output_file
    );
}

pub fn info_cmd(model_file: &str, json: bool) {
    let stats = open_model(model_file).stats();
    if json {
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&stats), "JSON error: {}")
        );
    } else {
        print!("{}", format_stats(model_file, &stats));
    }
}

pub fn format_stats(model_file: &str, stats: &ModelStats) -> String {
    format!(
        "Model: {model_file}\n  tags:             {}\n  words:            {}\n  pre-analyzed:     {}\n  transitions:      {}\n  context features: {}\n  max word length:  {}\n",
        stats.tags,
        stats.words,
        stats.preanalyzed,
        stats.transitions,
        stats.context_features,
        stats.max_word_len,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_JSON: &str = r#"{
        "transitions": {"Noun -> Josa": 1.0},
        "state_features": {"x[0]=예문 -> Noun": 1.5, "x[0]=은 -> Josa": 1.0},
        "idx2feature": [],
        "features": {}
    }"#;

    #[test]
    fn compile_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("model.json");
        let bin = dir.path().join("model.bin");
        std::fs::write(&json, MODEL_JSON).unwrap();

        compile_cmd(json.to_str().unwrap(), bin.to_str().unwrap());
        let stats = open_model(bin.to_str().unwrap()).stats();
        assert_eq!(stats.words, 2);
        assert_eq!(stats.transitions, 1);
        assert_eq!(stats, open_model(json.to_str().unwrap()).stats());
    }

    #[test]
    fn stats_text() {
        let params = ParameterStore::builder()
            .word("Noun", "예문", 1.0)
            .build()
            .unwrap();
        let text = format_stats("m.bin", &params.stats());
        assert!(text.starts_with("Model: m.bin\n"));
        assert!(text.contains("words:            1"));
        assert!(text.contains("max word length:  2"));
    }
}
