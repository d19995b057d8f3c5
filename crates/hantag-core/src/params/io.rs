use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use super::{Feature, Lexicon, ModelError, ParameterStore, Preanalyzed, TrigramFeatures};

const MAGIC: &[u8; 4] = b"HTPM";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 5;

/// Separator between the two halves of a transition or state-feature key.
const KEY_MARKER: &str = " -> ";

/// The trained weight file. `idx2feature` and `features` carry training
/// bookkeeping only and are skipped.
#[derive(Deserialize)]
struct RawModel {
    transitions: HashMap<String, f64>,
    state_features: HashMap<String, f64>,
    #[serde(default)]
    preanalyzed_eojeols: HashMap<String, Vec<(String, String, String, String)>>,
    #[serde(default)]
    max_word_len: Option<usize>,
    #[serde(default)]
    unknown_penalty: Option<f64>,
}

/// Borrowed view used to write the compiled form.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    transitions: &'a HashMap<String, HashMap<String, f64>>,
    features: &'a TrigramFeatures,
    lexicon: &'a Lexicon,
    unknown_penalty: Option<f64>,
}

#[derive(Deserialize)]
struct Snapshot {
    transitions: HashMap<String, HashMap<String, f64>>,
    features: TrigramFeatures,
    lexicon: Lexicon,
    unknown_penalty: Option<f64>,
}

impl ParameterStore {
    /// Load a trained model from its JSON weight file.
    ///
    /// Transition keys are `"from -> to"`, state feature keys
    /// `"<feature> -> <tag>"`. Word features (`x[0]=w`) become dictionary
    /// entries when their weight is positive; context features go to the
    /// trigram tables; unsupported templates are dropped.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, ModelError> {
        let _span = debug_span!("load_json_model").entered();
        let raw: RawModel = serde_json::from_reader(reader)?;

        let mut builder = ParameterStore::builder();
        for (key, weight) in &raw.transitions {
            let (from, to) = split_key(key)?;
            builder = builder.transition(from, to, *weight);
        }

        let mut skipped = 0usize;
        for (key, &weight) in &raw.state_features {
            let (raw_feature, tag) = split_key(key)?;
            match Feature::parse(raw_feature) {
                Some(Feature::Word(word)) => {
                    if weight > 0.0 {
                        builder = builder.word(tag, &word, weight);
                    }
                }
                Some(feature) => builder = builder.feature(tag, feature, weight),
                None => skipped += 1,
            }
        }

        for (surface, analyses) in raw.preanalyzed_eojeols {
            for (stem, ending, stem_tag, ending_tag) in analyses {
                builder = builder.preanalyzed(
                    &surface,
                    Preanalyzed {
                        stem,
                        ending,
                        stem_tag,
                        ending_tag,
                    },
                );
            }
        }
        if let Some(n) = raw.max_word_len {
            builder = builder.max_word_len(n);
        }
        if let Some(p) = raw.unknown_penalty {
            builder = builder.unknown_penalty(p);
        }
        debug!(
            transitions = raw.transitions.len(),
            state_features = raw.state_features.len(),
            skipped,
            "model parsed"
        );
        builder.build()
    }

    pub fn open_json(path: &Path) -> Result<Self, ModelError> {
        Self::from_json(BufReader::new(File::open(path)?))
    }

    /// Serialize to the compiled binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let lexicon = self.lexicon();
        let snapshot = SnapshotRef {
            transitions: &self.transitions,
            features: &self.features,
            lexicon: &*lexicon,
            unknown_penalty: self.unknown_penalty,
        };
        let body = bincode::serialize(&snapshot).map_err(ModelError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Parse the compiled binary form.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ModelError> {
        if data.len() < HEADER_SIZE || &data[..4] != MAGIC {
            return Err(ModelError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(ModelError::UnsupportedVersion(data[4]));
        }
        let snapshot: Snapshot =
            bincode::deserialize(&data[HEADER_SIZE..]).map_err(ModelError::Deserialize)?;
        if snapshot.lexicon.is_empty() {
            return Err(ModelError::EmptyDictionary);
        }
        Ok(Self {
            transitions: snapshot.transitions,
            features: snapshot.features,
            lexicon: RwLock::new(snapshot.lexicon),
            unknown_penalty: snapshot.unknown_penalty,
        })
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, ModelError> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Open either form, sniffing the magic bytes.
    pub fn open_any(path: &Path) -> Result<Self, ModelError> {
        let data = fs::read(path)?;
        if data.starts_with(MAGIC) {
            Self::from_bytes(&data)
        } else {
            Self::from_json(data.as_slice())
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str), ModelError> {
    key.rsplit_once(KEY_MARKER)
        .ok_or_else(|| ModelError::Parse(format!("missing '{KEY_MARKER}' in key '{key}'")))
}
