//! Tag names the decoder treats specially.
//!
//! Every other tag is opaque: it only needs to appear in the model's
//! transition table or word dictionaries.

pub const NOUN: &str = "Noun";
pub const JOSA: &str = "Josa";
pub const VERB: &str = "Verb";
pub const ADJECTIVE: &str = "Adjective";
pub const EOMI: &str = "Eomi";

/// Sentence start sentinel.
pub const BOS: &str = "BOS";
/// Sentence end sentinel.
pub const EOS: &str = "EOS";
/// Filler for spans no dictionary covers.
pub const UNKNOWN: &str = "Unk";

/// Stem tags that combine with an `Eomi` ending into a compound node.
pub const PREDICATES: [&str; 2] = [VERB, ADJECTIVE];
