//! Integration tests for backend configuration loading

use cubrid_backend::config::{BackendConfig, FrameworkVersion};
use cubrid_backend::connection::{connection_url, ConnectParams};
use std::io::Write;

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host: 10.0.0.5
port: "30000"
name: demodb
user: dba
password: "p@ss"
framework_version: "1.9"
"#
    )
    .unwrap();

    let config = BackendConfig::from_file(file.path()).unwrap();
    assert_eq!(config.framework_version, FrameworkVersion::new(1, 9));
    assert_eq!(connection_url(&config), "CUBRID:10.0.0.5:30000:demodb:::");

    let params = ConnectParams::from_config(&config);
    assert_eq!(params.user, "dba");
    assert_eq!(params.password.expose_secret(), "p@ss");
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BackendConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("cannot read"));
}

#[test]
fn test_minimal_document() {
    let config = BackendConfig::from_yaml_str("name: demodb").unwrap();
    assert_eq!(connection_url(&config), "CUBRID:localhost:demodb:::");
    assert_eq!(config.user, "public");
    assert_eq!(config.framework_version, FrameworkVersion::default());
}

#[test]
fn test_empty_port_is_omitted() {
    let config = BackendConfig::from_yaml_str("name: demodb\nport: \"\"").unwrap();
    assert_eq!(connection_url(&config), "CUBRID:localhost:demodb:::");
}

#[test]
fn test_unnamed_database() {
    let config = BackendConfig::default().with_port("33000");
    assert_eq!(connection_url(&config), "CUBRID:localhost:33000:::");
}

#[test]
fn test_malformed_yaml() {
    assert!(BackendConfig::from_yaml_str("name: [unclosed").is_err());
    assert!(BackendConfig::from_yaml_str("use_tz: maybe").is_err());
}
