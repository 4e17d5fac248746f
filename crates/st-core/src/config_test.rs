use super::*;
use tempfile::tempdir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.scripts.dir, "migrations");
    assert_eq!(config.scripts.extension, "json");
    assert_eq!(config.scripts.naming, NamingRule::Lenient);
    assert_eq!(config.scripts.ordering, OrderingRule::Lexical);
    assert_eq!(config.store.base_url(), "http://localhost:9200");
    assert_eq!(config.store.index, "strata");
    assert!(config.store.credentials().is_none());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
scripts:
  dir: db/migrations
  extension: ndjson
  naming: strict
  ordering: numeric
store:
  protocol: https
  host: search.internal
  port: 9243
  index: .ledger
  username: elastic
  password: changeme
  accept_invalid_certs: true
  timeout_secs: 10
  health_timeout: 2m
targets:
  prod:
    store:
      host: search.prod
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.scripts.naming, NamingRule::Strict);
    assert_eq!(config.scripts.ordering, OrderingRule::Numeric);
    assert_eq!(config.store.base_url(), "https://search.internal:9243");
    assert_eq!(config.store.credentials(), Some(("elastic", "changeme")));
    assert!(config.store.accept_invalid_certs);
    assert_eq!(
        config.scripts_dir_absolute(Path::new("/srv/app")),
        PathBuf::from("/srv/app/db/migrations")
    );
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("scripts:\n  folder: x\n");
    assert!(result.is_err());
}

#[test]
fn test_credentials_require_both_parts() {
    let store = StoreConfig {
        username: Some("elastic".to_string()),
        password: Some(String::new()),
        ..StoreConfig::default()
    };
    assert!(store.credentials().is_none());
}

#[test]
fn test_validate_rejects_bad_health_timeout() {
    let config: Config = serde_yaml::from_str("store:\n  health_timeout: soon\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("health_timeout"));
}

#[test]
fn test_validate_rejects_bad_target_store() {
    let yaml = r#"
targets:
  staging:
    store:
      port: 0
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("targets.staging.store"));
}

#[test]
fn test_get_store_config_with_target() {
    let yaml = r#"
store:
  host: localhost
targets:
  prod:
    store:
      host: search.prod
      index: .prod-ledger
  bare: {}
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.get_store_config(None).unwrap().host, "localhost");

    let prod = config.get_store_config(Some("prod")).unwrap();
    assert_eq!(prod.host, "search.prod");
    assert_eq!(prod.index, ".prod-ledger");

    let bare = config.get_store_config(Some("bare")).unwrap();
    assert_eq!(bare.host, "localhost");

    let err = config.get_store_config(Some("qa")).unwrap_err();
    assert!(matches!(err, CoreError::UnknownTarget { .. }));
    assert!(err.to_string().contains("bare, prod"));
}

#[test]
fn test_load_from_dir() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("strata.yaml"), "scripts:\n  dir: scripts\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.scripts.dir, "scripts");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}
