use super::*;
use std::io::Write;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) {
    let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
    f.write_all(content.as_bytes()).unwrap();
}

#[test]
fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let config = load_project_config(dir.path());
    assert_eq!(config, ProjectConfig::default());
    assert_eq!(config.audit.toggle_variable, "use_ecs");
    assert!(config.audit.validate);
    assert_eq!(config.audit.validate_timeout_secs, 60);
    assert_eq!(config.verify.target, TargetKind::Localstack);
}

#[test]
fn test_load_toml() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        CONFIG_FILE,
        r#"
[audit]
toggle_variable = "enable_containers"
validate = false

[verify]
target = "aws"
region = "eu-west-1"
query_timeout_secs = 30

[expectations.subnets]
minimum = 4

[expectations.instances]
exact = 3
"#,
    );
    let config = load_project_config(dir.path());
    assert_eq!(config.audit.toggle_variable, "enable_containers");
    assert!(!config.audit.validate);
    assert_eq!(config.audit.validate_timeout_secs, 60);
    assert_eq!(config.verify.target, TargetKind::Aws);
    assert_eq!(config.verify.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.verify.query_timeout_secs, Some(30));
    assert_eq!(config.expectations["subnets"].minimum, Some(4));
    assert_eq!(config.expectations["instances"].exact, Some(3));
}

#[test]
fn test_load_json() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        JSON_CONFIG_FILE,
        r#"{"verify": {"endpoint": "http://localstack:4566", "unsupported": []}}"#,
    );
    let config = load_project_config(dir.path());
    assert_eq!(config.verify.endpoint.as_deref(), Some("http://localstack:4566"));
    assert_eq!(config.unsupported_kinds(), Some(vec![]));
}

#[test]
fn test_toml_preferred_over_json() {
    let dir = TempDir::new().unwrap();
    write(&dir, CONFIG_FILE, "[audit]\ntoggle_variable = \"from_toml\"\n");
    write(&dir, JSON_CONFIG_FILE, r#"{"audit": {"toggle_variable": "from_json"}}"#);
    assert_eq!(load_project_config(dir.path()).audit.toggle_variable, "from_toml");
}

#[test]
fn test_invalid_toml_falls_through() {
    let dir = TempDir::new().unwrap();
    write(&dir, CONFIG_FILE, "[audit\nthis is not toml");
    write(&dir, JSON_CONFIG_FILE, r#"{"audit": {"validate": false}}"#);
    assert!(!load_project_config(dir.path()).audit.validate);

    let only_bad = TempDir::new().unwrap();
    write(&only_bad, CONFIG_FILE, "[verify]\ntarget = \"mars\"\n");
    assert_eq!(load_project_config(only_bad.path()), ProjectConfig::default());
}

#[test]
fn test_load_config_file_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(load_config_file(&missing), Err(ConfigError::Io { .. })));

    write(&dir, "settings.yaml", "audit: {}");
    assert!(matches!(
        load_config_file(&dir.path().join("settings.yaml")),
        Err(ConfigError::UnknownFormat(_))
    ));

    write(&dir, "broken.json", "{");
    let err = load_config_file(&dir.path().join("broken.json")).unwrap_err();
    assert!(err.to_string().contains("invalid JSON"));
}

#[test]
fn test_unknown_kinds_are_dropped() {
    let config: ProjectConfig = toml::from_str(
        r#"
[verify]
unsupported = ["db-instances", "lambdas"]

[expectations.security_groups]
minimum = 3

[expectations.buckets]
minimum = 1
"#,
    )
    .unwrap();
    assert_eq!(config.unsupported_kinds(), Some(vec![ResourceKind::DbInstances]));
    let overrides = config.expectation_overrides();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].0, ResourceKind::SecurityGroups);
    assert_eq!(overrides[0].1.minimum, Some(3));
}
