//! Integration tests for YAML parsing

mod common;

use common::{create_test_config, create_test_config_in_subdir};
use git_dist::config::{
    find_config_file_from, parse_config, parse_config_file, validate_config, ConfigKey, Value,
};
use git_dist::error::{ConfigError, GitDistError};
use std::collections::BTreeMap;
use std::time::Duration;

#[test]
fn test_parse_complete_config() {
    let yaml = r#"
name: site
usage: Publish the site
timeout: 120

options:
  url: git@example.com:me/site.git
  branch: gh-pages
  dir: dist
  config:
    user.name: Release Bot
    user.email: bot@example.com

targets:
  release:
    usage: Release the built site
    options:
      message: "Release ${site.tag}"
      paths: [index.html, assets]

  docs:
    usage: Publish the documentation
    description: Builds go to the docs branch of the same remote
    timeout: 30
    options:
      branch: docs
      empty: yes
"#;

    let config = parse_config(yaml, None).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.task_name(), "site");
    assert_eq!(config.usage, Some("Publish the site".to_string()));
    assert_eq!(config.targets.len(), 2);

    let release = config.target_options("release").unwrap();
    assert_eq!(
        release.get(&ConfigKey::Message),
        Some(&Value::Text("Release ${site.tag}".to_string()))
    );
    assert_eq!(
        release.get(&ConfigKey::Paths),
        Some(&Value::List(vec!["index.html".to_string(), "assets".to_string()]))
    );

    let mut entries = BTreeMap::new();
    entries.insert("user.name".to_string(), Some("Release Bot".to_string()));
    entries.insert("user.email".to_string(), Some("bot@example.com".to_string()));
    assert_eq!(release.get(&ConfigKey::Config), Some(&Value::Entries(entries)));

    let docs = config.target_options("docs").unwrap();
    assert_eq!(docs.get(&ConfigKey::Branch), Some(&Value::Text("docs".to_string())));
    assert_eq!(docs.get(&ConfigKey::Empty), Some(&Value::Flag(true)));

    assert_eq!(config.timeout_for("release"), Some(Duration::from_secs(120)));
    assert_eq!(config.timeout_for("docs"), Some(Duration::from_secs(30)));
}

#[test]
fn test_parse_config_from_file() {
    let (_dir, config_path) = create_test_config(
        r#"
targets:
  release:
    options:
      dir: dist
"#,
    );

    let config = parse_config_file(&config_path).unwrap();
    validate_config(&config).unwrap();
    assert!(config.target("release").is_ok());
}

#[test]
fn test_find_config_from_subdir() {
    let (_dir, config_path, sub_dir) = create_test_config_in_subdir("targets:\n  release: {}\n");

    let found = find_config_file_from(sub_dir).unwrap();
    assert_eq!(found, config_path);
}

#[test]
fn test_invalid_yaml() {
    let result = parse_config("targets: [release", None);
    assert!(matches!(result, Err(GitDistError::Yaml(_))));
}

#[test]
fn test_flag_with_text_value_is_rejected() {
    let config = parse_config("targets:\n  release:\n    options:\n      empty: maybe\n", None).unwrap();

    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { key, .. }) if key == "empty"
    ));
}

#[test]
fn test_null_config_entry_is_kept() {
    let yaml = r#"
targets:
  release:
    options:
      config:
        user.signingkey:
"#;
    let config = parse_config(yaml, None).unwrap();
    let options = config.target_options("release").unwrap();

    let mut entries = BTreeMap::new();
    entries.insert("user.signingkey".to_string(), None);
    assert_eq!(options.get(&ConfigKey::Config), Some(&Value::Entries(entries)));
}
