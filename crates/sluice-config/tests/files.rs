//! Loading configuration from files on disk.

use std::io::Write;

use sluice_config::{ConfigError, ConfigLoader, LogFormat};
use tempfile::{Builder, NamedTempFile};

fn file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_complete_toml_file() {
    let file = file_with(
        ".toml",
        r#"
        [service]
        name = "blog"

        [server]
        http_addr = "127.0.0.1:3000"
        shutdown_timeout_secs = 5
        max_body_bytes = 2048

        [negotiation]
        default_accept = "application/json"

        [security]
        realm = "blog"

        [logging]
        level = "debug"
        format = "pretty"
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .without_env()
        .load()
        .unwrap();

    assert_eq!(config.service.name, "blog");
    assert_eq!(config.server.shutdown_timeout_secs, 5);
    assert_eq!(config.negotiation.default_accept, "application/json");
    assert_eq!(config.security.realm, "blog");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.socket_addr().unwrap().port(), 3000);
}

#[test]
fn test_json_file() {
    let file = file_with(".json", r#"{"server": {"max_body_bytes": 10}}"#);
    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load_unvalidated();
    assert_eq!(config.server.max_body_bytes, 10);
}

#[test]
fn test_unknown_extension() {
    let file = file_with(".yaml", "server: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_invalid_toml() {
    let file = file_with(".toml", "[server\nhttp_addr = ");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError { format: "toml", .. })));
}

#[test]
fn test_dotenv_overrides_file() {
    let file = file_with(".toml", "[security]\nrealm = \"from-file\"");
    let dotenv = file_with(
        ".env",
        "SLUICE__SECURITY__REALM=from-dotenv\nUNRELATED=1\nSLUICE__SERVER__MAX_BODY_BYTES=64\n",
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_dotenv_file(dotenv.path())
        .unwrap()
        .without_env()
        .load()
        .unwrap();

    assert_eq!(config.security.realm, "from-dotenv");
    assert_eq!(config.server.max_body_bytes, 64);
}

#[test]
fn test_dotenv_with_custom_prefix() {
    let dotenv = file_with(".env", "BLOG__SERVICE__NAME=blog\nSLUICE__SERVICE__NAME=ignored\n");
    let config = ConfigLoader::new()
        .with_env_prefix("blog")
        .with_dotenv_file(dotenv.path())
        .unwrap()
        .without_env()
        .load()
        .unwrap();
    assert_eq!(config.service.name, "blog");
}

#[test]
fn test_validation_runs_after_layers() {
    let dotenv = file_with(".env", "SLUICE__SERVER__HTTP_ADDR=nowhere\n");
    let result = ConfigLoader::new()
        .with_dotenv_file(dotenv.path())
        .unwrap()
        .without_env()
        .load();
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}
