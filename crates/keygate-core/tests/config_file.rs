//! Loading configuration from disk

use assert_matches::assert_matches;
use keygate_core::{AuthConfig, ConfigError};
use std::io::Write;

#[test]
fn file_then_env_then_validate() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[ucan]
audience = "did:web:api.example"
max_chain_depth = 4

[server]
bind = "127.0.0.1:9000"
"#
    )
    .unwrap();

    let mut config = AuthConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.ucan.audience, "did:web:api.example");
    assert_eq!(config.ucan.max_chain_depth, 4);

    config
        .merge_with_vars(|key| (key == "APP_BIND").then(|| "0.0.0.0:7000".to_string()))
        .unwrap();
    assert_eq!(config.server.bind, "0.0.0.0:7000");
    assert!(config.validate().is_ok());
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert_matches!(
        AuthConfig::load_from_file(&path),
        Err(ConfigError::Io { path: p, .. }) if p == path
    );
}

#[test]
fn wrong_types_are_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[session]\naccess_ttl_ms = \"fifteen minutes\"").unwrap();
    assert_matches!(
        AuthConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(_))
    );
}
