//! Korean morphological tagging with a trained linear-chain CRF.
//!
//! A sentence is turned into a lattice of candidate morphemes (dictionary
//! words, lemmatized stem+ending pairs, noun+josa pairs and unknown
//! fillers) which is then searched exactly or with a trigram beam.
//!
//! ```no_run
//! use hantag_core::{ParameterStore, Tagger};
//!
//! let params = ParameterStore::open_any("model.json".as_ref()).unwrap();
//! let tagger = Tagger::new(params);
//! for result in tagger.tag("이것은 예문입니다", true) {
//!     println!("{:?} {}", result.morphemes(), result.score);
//! }
//! ```

pub mod decoder;
pub mod jamo;
pub mod lemmatizer;
pub mod params;
pub mod settings;
pub mod tagger;
pub mod tags;

pub use decoder::{Explanation, Search, Span};
pub use params::{ModelError, ModelStats, ParameterStore};
pub use settings::{Settings, SettingsError};
pub use tagger::{Analysis, TagResult, Tagger};
