use super::*;

const MODEL_JSON: &str = r#"{
    "transitions": {
        "BOS -> Noun": 0.5,
        "Noun -> Josa": 1.25,
        "Josa -> Verb": 0.75,
        "Verb -> Eomi": 1.0,
        "Eomi -> EOS": 0.5,
        "Adverb -> Verb": 0.1
    },
    "state_features": {
        "x[0]=학교 -> Noun": 2.0,
        "x[0]=에 -> Josa": 1.5,
        "x[0]=가 -> Verb": 1.0,
        "x[0]=았다 -> Eomi": 1.2,
        "x[0]=나쁜말 -> Noun": -0.5,
        "x[-1:0]=학교-에 -> Josa": 0.3,
        "x[0]=에, y[-1]=Noun -> Josa": 0.2,
        "x[0:1]=가-았다 -> Verb": 0.4,
        "x[0:1]=가-았다, y[1]=Eomi -> Verb": 0.6,
        "x[-1,1]=에-았다 -> Verb": 0.1,
        "x[-1:1]=에-가-았다 -> Verb": 0.7,
        "x[-1:0]=학교-에, y[-1]=Noun -> Josa": 9.0
    },
    "idx2feature": ["x[0]=학교"],
    "features": {"x[0]=학교": [0, 12]},
    "preanalyzed_eojeols": {
        "갔다": [["가", "았다", "Verb", "Eomi"]]
    }
}"#;

fn load() -> ParameterStore {
    ParameterStore::from_json(MODEL_JSON.as_bytes()).unwrap()
}

#[test]
fn json_transitions_default_to_zero() {
    let p = load();
    assert_eq!(p.transition("Noun", "Josa"), 1.25);
    assert_eq!(p.transition("BOS", "Noun"), 0.5);
    assert_eq!(p.transition("Josa", "Noun"), 0.0);
    assert_eq!(p.transition("Nope", "Noun"), 0.0);
}

#[test]
fn json_word_features_become_dictionary() {
    let p = load();
    assert_eq!(p.word_weight("Noun", "학교"), 2.0);
    assert_eq!(p.word_weight("Eomi", "았다"), 1.2);
    // non-positive word weights are not dictionary entries
    assert!(!p.lexicon().contains("Noun", "나쁜말"));
    assert_eq!(p.word_weight("Noun", "없는말"), 0.0);
}

#[test]
fn json_context_features_are_classified() {
    let p = load();
    let f = p.features();
    assert_eq!(f.previous_1x0.get("Josa", "학교", "에"), 0.3);
    assert_eq!(f.previous_x0_1y.get("Josa", "에", "Noun"), 0.2);
    assert_eq!(f.successive_x01.get("Verb", "가", "았다"), 0.4);
    assert_eq!(f.successive_x01_y1.get("Verb", "가", "았다", "Eomi"), 0.6);
    assert_eq!(f.bothside_1x1.get("Verb", "에", "았다"), 0.1);
    assert_eq!(f.bothside_1x01.get("Verb", "에", "가", "았다"), 0.7);
    // the y[-1] variant of x[-1:0] is not used by the decoder
    assert_eq!(f.len(), 6);
}

#[test]
fn json_preanalyzed_and_max_len() {
    let p = load();
    let lexicon = p.lexicon();
    let entries = lexicon.preanalyzed("갔다").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].stem, "가");
    assert_eq!(entries[0].ending_tag, "Eomi");
    assert_eq!(lexicon.max_word_len(), 2);
}

#[test]
fn transition_only_tags_are_model_tags() {
    let p = load();
    assert!(p.lexicon().has_tag("Adverb"));
    assert!(!p.lexicon().has_tag("BOS"));
    assert!(!p.lexicon().has_tag("EOS"));
}

#[test]
fn json_rejects_malformed_key() {
    let json = r#"{"transitions": {"Noun Josa": 1.0}, "state_features": {}}"#;
    assert!(matches!(
        ParameterStore::from_json(json.as_bytes()),
        Err(ModelError::Parse(_))
    ));
}

#[test]
fn json_rejects_invalid_json() {
    assert!(matches!(
        ParameterStore::from_json("{".as_bytes()),
        Err(ModelError::Json(_))
    ));
}

#[test]
fn empty_model_is_rejected() {
    let json = r#"{"transitions": {}, "state_features": {}}"#;
    assert!(matches!(
        ParameterStore::from_json(json.as_bytes()),
        Err(ModelError::EmptyDictionary)
    ));
    assert!(matches!(
        ParameterStore::builder().build(),
        Err(ModelError::EmptyDictionary)
    ));
}

#[test]
fn declared_empty_tag_is_enough() {
    let p = ParameterStore::builder().tag("Noun").build().unwrap();
    assert_eq!(p.max_word_len(), 1);
    assert_eq!(p.stats().words, 0);
}

#[test]
fn builder_feature_routes_words() {
    let p = ParameterStore::builder()
        .feature("Noun", Feature::Word("사과".to_string()), 1.5)
        .feature("Noun", Feature::parse("x[-1:0]=빨간-사과").unwrap(), 0.25)
        .build()
        .unwrap();
    assert_eq!(p.word_weight("Noun", "사과"), 1.5);
    assert_eq!(p.features().previous_1x0.get("Noun", "빨간", "사과"), 0.25);
}

#[test]
fn explicit_max_word_len_wins() {
    let p = ParameterStore::builder()
        .word("Noun", "대한민국", 1.0)
        .max_word_len(2)
        .build()
        .unwrap();
    assert_eq!(p.max_word_len(), 2);
}

#[test]
fn add_user_dictionary_known_tag() {
    let p = load();
    let added = p
        .add_user_dictionary("Noun", [("신조어", 5.0), ("학교", 3.0)])
        .unwrap();
    assert_eq!(added, 2);
    assert_eq!(p.word_weight("Noun", "신조어"), 5.0);
    assert_eq!(p.word_weight("Noun", "학교"), 3.0);
    assert_eq!(p.max_word_len(), 3);
}

#[test]
fn add_user_dictionary_unknown_tag() {
    let p = load();
    let err = p
        .add_user_dictionary("Interjection", [("와", 1.0)])
        .unwrap_err();
    assert!(matches!(err, ModelError::UnknownTag(ref t) if t == "Interjection"));
    assert!(!p.lexicon().has_tag("Interjection"));
}

#[test]
fn binary_round_trip() {
    let p = load();
    p.add_user_dictionary("Noun", [("신조어", 5.0)]).unwrap();
    let bytes = p.to_bytes().unwrap();
    assert_eq!(&bytes[..4], b"HTPM");

    let q = ParameterStore::from_bytes(&bytes).unwrap();
    assert_eq!(q.transition("Noun", "Josa"), 1.25);
    assert_eq!(q.word_weight("Noun", "신조어"), 5.0);
    assert_eq!(q.features(), p.features());
    assert_eq!(q.stats(), p.stats());
}

#[test]
fn binary_round_trip_preanalyzed_only() {
    let p = ParameterStore::builder()
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
        .unwrap();
    let q = ParameterStore::from_bytes(&p.to_bytes().unwrap()).unwrap();
    assert_eq!(q.stats(), p.stats());
    assert_eq!(q.lexicon().preanalyzed("갔다").map(<[_]>::len), Some(1));
}

#[test]
fn binary_rejects_bad_header() {
    assert!(matches!(
        ParameterStore::from_bytes(b"NOPE\x01"),
        Err(ModelError::InvalidMagic)
    ));
    assert!(matches!(
        ParameterStore::from_bytes(b"HT"),
        Err(ModelError::InvalidMagic)
    ));
    assert!(matches!(
        ParameterStore::from_bytes(b"HTPM\x09"),
        Err(ModelError::UnsupportedVersion(9))
    ));
    assert!(matches!(
        ParameterStore::from_bytes(b"HTPM\x01\xff"),
        Err(ModelError::Deserialize(_))
    ));
}

#[test]
fn save_and_open_any() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("model.bin");
    let json = dir.path().join("model.json");
    load().save(&bin).unwrap();
    std::fs::write(&json, MODEL_JSON).unwrap();

    let a = ParameterStore::open(&bin).unwrap();
    let b = ParameterStore::open_any(&bin).unwrap();
    let c = ParameterStore::open_any(&json).unwrap();
    assert_eq!(a.stats(), b.stats());
    assert_eq!(b.stats(), c.stats());
    assert!(!bin.with_extension("tmp").exists());
}

#[test]
fn open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ParameterStore::open(&dir.path().join("missing.bin")),
        Err(ModelError::Io(_))
    ));
}
