//! Weaver configuration loaded from disk

mod common;

use common::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use weavegraph_ir::config::ConfigError;
use weavegraph_ir::features::declarations::DeclarationData;
use weavegraph_ir::features::templates::TemplateMember;
use weavegraph_ir::shared::models::{DiagnosticKind, TypeRef};
use weavegraph_ir::{OverrideStrategy, WeaverConfig};

fn write_yaml(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file.flush().expect("flush config");
    file
}

#[test]
fn test_load_from_file() {
    let file = write_yaml(
        "version: 1\nreturn_value_name: result\nmax_pull_depth: 2\ndefer_contracts_to_layer_end: false\n",
    );
    let config = WeaverConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(
        config,
        WeaverConfig::default()
            .with_return_value_name("result")
            .with_max_pull_depth(2)
            .with_deferred_contracts(false)
    );
}

#[test]
fn test_exported_yaml_loads_back() {
    let config = WeaverConfig::default()
        .with_warnings_as_errors(true)
        .with_max_pull_depth(8);
    let file = write_yaml(&config.to_yaml().unwrap());

    assert_eq!(WeaverConfig::from_yaml_file(file.path()).unwrap(), config);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WeaverConfig::from_yaml_file(dir.path().join("weaver.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_invalid_files_are_rejected() {
    let cases = [
        ("return_value_name: result\n", "Missing 'version'"),
        ("version: 3\n", "Unsupported configuration version 3"),
        ("version: 1\nmax_pull_depth: 0\n", "max_pull_depth"),
        ("version: 1\nreturn_value_name: \"1st\"\n", "return_value_name"),
        ("version: 1\nunknown: true\n", "YAML parsing error"),
    ];
    for (content, expected) in cases {
        let file = write_yaml(content);
        let err = WeaverConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "{:?}: {}",
            content,
            err
        );
    }
}

#[test]
fn test_loaded_depth_limits_pull() {
    let file = write_yaml("version: 1\nmax_pull_depth: 1\n");
    let config = WeaverConfig::from_yaml_file(file.path()).unwrap();

    let chain = fixture_constructor_chain();
    let a = chain.types[0].clone();
    let result = weave_with(
        config,
        &chain.model,
        vec![aspect("Logging", 0, move |f| {
            f.introduce_pulled_member(
                &a,
                TemplateMember::new(DeclarationData::field("_logger", TypeRef::string())),
                OverrideStrategy::Fail,
            )?;
            Ok(())
        })],
    );
    assert!(matches!(
        single_diagnostic(&result),
        DiagnosticKind::PullDepthExceeded { max_depth: 1, .. }
    ));
}
