//! Tuning constants for the decoder: the structural preferences of exact
//! and beam search, the default beam width and the unknown-span policy.
//!
//! The process-wide values come from `default_settings.toml` unless a
//! replacement TOML is installed with `init_custom` before the first
//! `settings()` call. A `Tagger` copies them at construction;
//! `Tagger::with_settings` overrides one tagger only.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Install a validated replacement for the embedded defaults.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Process-wide settings, parsed on first use.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub exact: ExactSettings,
    pub beam: BeamSettings,
    pub lattice: LatticeSettings,
}

/// Structural adjustments for exact (edge-local) search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExactSettings {
    /// Added when the target node's first morpheme is one character long.
    pub single_syllable_penalty: f64,
    /// Added for multi-character nouns; also scales the single-syllable
    /// penalty up for one-character nouns.
    pub noun_preference: f64,
}

/// Structural adjustments and width for beam (trigram) search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BeamSettings {
    pub single_syllable_penalty: f64,
    pub noun_preference: f64,
    /// Per extra character of a noun span.
    pub longer_noun_preference: f64,
    pub beam_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatticeSettings {
    /// Emission score of unknown fillers and guessed nodes.
    pub unknown_penalty: f64,
    /// Emit guessed-tag nodes for substrings no dictionary covers.
    pub guess_unknown: bool,
    #[serde(default)]
    pub guess_tags: Vec<String>,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check {
        ($section:ident . $field:ident, $ok:expr, $reason:literal) => {
            let v = s.$section.$field;
            if !v.is_finite() || !$ok(v) {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: $reason.to_string(),
                });
            }
        };
    }
    let non_positive = |v: f64| v <= 0.0;
    let non_negative = |v: f64| v >= 0.0;

    check!(exact.single_syllable_penalty, non_positive, "must be non-positive");
    check!(exact.noun_preference, non_negative, "must be non-negative");
    check!(beam.single_syllable_penalty, non_positive, "must be non-positive");
    check!(beam.noun_preference, non_negative, "must be non-negative");
    check!(beam.longer_noun_preference, non_negative, "must be non-negative");
    check!(lattice.unknown_penalty, non_positive, "must be non-positive");

    if s.beam.beam_size == 0 {
        return Err(SettingsError::InvalidValue {
            field: "beam.beam_size".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if s.lattice.guess_unknown && s.lattice.guess_tags.is_empty() {
        return Err(SettingsError::InvalidValue {
            field: "lattice.guess_tags".to_string(),
            reason: "must not be empty when guess_unknown is set".to_string(),
        });
    }
    Ok(())
}
