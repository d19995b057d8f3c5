//! User dictionary files: one `tag<TAB>word<TAB>weight` entry per line.
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

use hantag_core::{ModelError, Tagger};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum UserDictError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Entries grouped by tag, tags in first-seen order.
pub type UserEntries = Vec<(String, Vec<(String, f64)>)>;

pub fn parse_user_dict(content: &str) -> Result<UserEntries, UserDictError> {
    let mut out: UserEntries = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parse_err = |reason: String| UserDictError::Parse {
            line: i + 1,
            reason,
        };
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let &[tag, word, weight] = fields.as_slice() else {
            return Err(parse_err(format!(
                "expected 3 tab-separated fields, got {}",
                fields.len()
            )));
        };
        if tag.is_empty() || word.is_empty() {
            return Err(parse_err("empty tag or word".to_string()));
        }
        let weight: f64 = weight
            .parse()
            .map_err(|e| parse_err(format!("bad weight '{weight}': {e}")))?;

        match out.iter_mut().find(|(t, _)| t == tag) {
            Some((_, words)) => words.push((word.to_string(), weight)),
            None => out.push((tag.to_string(), vec![(word.to_string(), weight)])),
        }
    }
    Ok(out)
}

/// Read a user dictionary file into `tagger`. Returns the number of words
/// added. Fails on the first tag the model does not know.
pub fn load_user_dict(tagger: &Tagger, path: &Path) -> Result<usize, UserDictError> {
    let entries = parse_user_dict(&fs::read_to_string(path)?)?;
    let mut added = 0;
    for (tag, words) in entries {
        added += tagger.add_user_dictionary(&tag, words)?;
    }
    info!(path = %path.display(), added, "user dictionary loaded");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hantag_core::ParameterStore;

    fn tagger() -> Tagger {
        let params = ParameterStore::builder()
            .word("Noun", "예문", 1.0)
            .word("Josa", "은", 1.0)
            .build()
            .unwrap();
        Tagger::new(params)
    }

    #[test]
    fn parse_groups_by_tag() {
        let content = "# comment\nNoun\t신조어\t5.0\n\nJosa\t는\t1\nNoun\t밈\t2.5\n";
        let entries = parse_user_dict(content).unwrap();
        assert_eq!(
            entries,
            vec![
                (
                    "Noun".to_string(),
                    vec![("신조어".to_string(), 5.0), ("밈".to_string(), 2.5)]
                ),
                ("Josa".to_string(), vec![("는".to_string(), 1.0)]),
            ]
        );
    }

    #[test]
    fn parse_rejects_bad_lines() {
        assert!(matches!(
            parse_user_dict("Noun\t신조어\n"),
            Err(UserDictError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_user_dict("Noun\t신조어\t5\nNoun\t밈\tabc\n"),
            Err(UserDictError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_user_dict("\t신조어\t5\n"),
            Err(UserDictError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn load_into_tagger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.tsv");
        fs::write(&path, "Noun\t신조어\t5.0\n").unwrap();

        let t = tagger();
        assert_eq!(load_user_dict(&t, &path).unwrap(), 1);
        let result = t.tag("신조어", true);
        assert_eq!(
            result[0].morphemes().unwrap(),
            &[("신조어".to_string(), "Noun".to_string())]
        );
    }

    #[test]
    fn load_unknown_tag_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.tsv");
        fs::write(&path, "Interjection\t와\t1.0\n").unwrap();
        assert!(matches!(
            load_user_dict(&tagger(), &path),
            Err(UserDictError::Model(ModelError::UnknownTag(_)))
        ));
    }
}
