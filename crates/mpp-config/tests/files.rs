//! Loading tables from disk.

use std::path::PathBuf;

use mpp_config::{ConfigError, DiagTable, FieldTable};

fn scratch(name: &str, text: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mpp-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn field_table_from_file() {
    let path = scratch(
        "field_table.yaml",
        "field_table:\n- field_type: tracer\n  modlist:\n  - model_type: land_mod\n    varlist:\n    - variable: co2\n      units: ppmv\n",
    );
    let t = FieldTable::from_path(&path).unwrap();
    assert_eq!(t.tracer_count("land_mod"), 1);
    assert_eq!(t.find("land_mod", "co2").unwrap().units(), "ppmv");
}

#[test]
fn diag_table_from_file() {
    let path = scratch(
        "diag_table.yaml",
        "title: t\nbase_date: [1, 1, 1, 0, 0, 0]\ndiag_files: []\n",
    );
    let t = DiagTable::from_path(&path).unwrap();
    assert!(t.files.is_empty());
}

#[test]
fn missing_file_is_io_error() {
    let err = FieldTable::from_path("/no/such/field_table.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
}

#[test]
fn malformed_yaml_is_reported() {
    let err = FieldTable::from_yaml_str("field_table: [\n").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml { .. }), "{err}");
}
