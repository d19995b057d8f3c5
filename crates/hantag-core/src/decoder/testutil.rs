#![cfg(test)]

use crate::params::{Feature, ParameterStore, Preanalyzed};
use crate::settings::{parse_settings_toml, BeamSettings, ExactSettings, LatticeSettings, Settings};

use super::lattice::Lattice;

/// Shared test model for decoder tests.
///
/// Covers "이것은 예문입니다": 이것/Noun + 은/Josa, 예문/Noun, and 입니다
/// which only resolves through the lemmatizer (입 + 니다 -> 이 + ㅂ니다).
/// 갔다 has a pre-analyzed entry that differs from what the rules give.
pub fn scenario_store() -> ParameterStore {
    ParameterStore::builder()
        .word("Noun", "이것", 1.0)
        .word("Noun", "예문", 1.5)
        .word("Josa", "은", 1.0)
        .word("Adjective", "이", 0.5)
        .word("Verb", "입", 0.2)
        .word("Verb", "가", 0.8)
        .word("Eomi", "ㅂ니다", 1.0)
        .word("Eomi", "다", 0.5)
        .word("Eomi", "았다", 1.0)
        .word("Eomi", "ㅆ다", 0.3)
        .transition("Noun", "Josa", 1.0)
        .transition("Josa", "Noun", 0.5)
        .transition("Adjective", "Eomi", 1.0)
        .transition("Verb", "Eomi", 1.0)
        .preanalyzed(
            "갔다",
            Preanalyzed {
                stem: "가".to_string(),
                ending: "았다".to_string(),
                stem_tag: "Verb".to_string(),
                ending_tag: "Eomi".to_string(),
            },
        )
        .build()
        .unwrap()
}

/// Noun/Josa model with context features on every table, including the
/// two that look two nodes back. 과 is both a noun and a josa, and
/// 학교/사과 compete with their single-syllable splits.
pub fn context_store() -> ParameterStore {
    let features = [
        ("x[-1,1]=학교-사과", "Josa", 0.8),
        ("x[-1:1]=학교-는-사과", "Josa", 1.2),
        ("x[-1:0]=학교-는", "Josa", 0.3),
        ("x[0]=과, y[-1]=Noun", "Josa", 0.4),
        ("x[0:1]=학-교", "Noun", 0.6),
        ("x[0:1]=사과-를, y[1]=Josa", "Noun", 0.2),
    ];
    let mut builder = ParameterStore::builder()
        .word("Noun", "학교", 2.0)
        .word("Noun", "학", 0.3)
        .word("Noun", "교", 0.4)
        .word("Noun", "사과", 1.5)
        .word("Noun", "사", 0.2)
        .word("Noun", "과", 0.6)
        .word("Josa", "는", 1.0)
        .word("Josa", "를", 1.0)
        .word("Josa", "과", 0.7)
        .word("Josa", "도", 0.5)
        .transition("BOS", "Noun", 0.3)
        .transition("Noun", "Josa", 1.0)
        .transition("Josa", "Noun", 0.5)
        .transition("Josa", "EOS", 0.4);
    for (raw, tag, weight) in features {
        builder = builder.feature(tag, Feature::parse(raw).unwrap(), weight);
    }
    builder.build().unwrap()
}

/// The embedded defaults.
pub fn default_settings() -> Settings {
    parse_settings_toml(crate::settings::default_toml()).unwrap()
}

pub fn exact_settings() -> ExactSettings {
    default_settings().exact
}

pub fn beam_settings() -> BeamSettings {
    default_settings().beam
}

pub fn lattice_settings() -> LatticeSettings {
    default_settings().lattice
}

pub fn labels(lattice: &Lattice, path: &[usize]) -> Vec<String> {
    path.iter().map(|&i| lattice.nodes[i].label.clone()).collect()
}
