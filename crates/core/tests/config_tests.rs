use docimpact_core::Config;

#[test]
fn default_config_has_expected_values() {
    let cfg = Config::default();
    assert_eq!(cfg.pipeline.merkle_tree_chunk_size, 1024);
    assert_eq!(cfg.pipeline.minhash_num_perm, 128);
    assert_eq!(cfg.pipeline.similarity_threshold, 0.7);
    assert!(!cfg.pipeline.verbose);
    assert_eq!(cfg.logging.level, "info");
    assert!(!cfg.logging.json);
}

#[test]
fn from_file_parses_valid_toml() {
    let toml = r#"
        [pipeline]
        min_community_size = 5
        similarity_threshold = 0.9
        rewrite_confidence_floor = 0.5

        [logging]
        level = "debug"
        json = true
    "#;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docimpact.toml");
    std::fs::write(&path, toml).unwrap();

    let cfg = Config::from_file(&path).expect("parsed");

    assert_eq!(cfg.pipeline.min_community_size, 5);
    assert_eq!(cfg.pipeline.similarity_threshold, 0.9);
    assert_eq!(cfg.pipeline.rewrite_confidence_floor, 0.5);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
    // Untouched fields keep their defaults.
    assert_eq!(cfg.pipeline.minhash_num_perm, 128);
}

#[test]
fn from_file_invalid_toml_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docimpact.toml");
    std::fs::write(&path, "not = [valid").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.is_fatal());
}
