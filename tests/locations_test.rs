// ABOUTME: Integration tests for file-backed named locations
// ABOUTME: Prefixed namespaces, later-file overrides, numeric strings and rejected entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::fs;
use std::path::Path;

use carbon_aware::errors::ProviderError;
use carbon_aware::locations::{LocationFile, LocationSource};
use carbon_aware::providers::LocationResolver;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> LocationFile {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    LocationFile { prefix: None, path }
}

#[test]
fn test_files_load_in_order_with_prefixes() {
    common::init_test_logging();
    let dir = TempDir::new().unwrap();
    let azure = LocationFile {
        prefix: Some("azure".to_owned()),
        ..write(
            dir.path(),
            "azure.json",
            r#"{ "eastus": { "name": "eastus", "latitude": "37.3719", "longitude": "-79.8164" } }"#,
        )
    };
    let zones = write(dir.path(), "zones.json", r#"{ "germany": { "name": "DE" } }"#);

    let source = LocationSource::from_files(&[azure, zones], "-").unwrap();

    assert_eq!(source.len(), 2);
    let eastus = source.resolve("Azure-EastUS").unwrap();
    let coordinates = eastus.coordinates().unwrap();
    assert!((coordinates.longitude + 79.8164).abs() < 1e-9);

    let germany = source.resolve("GERMANY").unwrap();
    assert_eq!(germany.name.as_deref(), Some("DE"));
    assert!(germany.coordinates().is_none());
}

#[test]
fn test_later_files_override_earlier_keys() {
    let dir = TempDir::new().unwrap();
    let first = write(dir.path(), "a.json", r#"{ "hq": { "name": "FR" } }"#);
    let second = write(dir.path(), "b.json", r#"{ "HQ": { "name": "DE" } }"#);

    let source = LocationSource::from_files(&[first, second], "-").unwrap();

    assert_eq!(source.len(), 1);
    assert_eq!(source.resolve("hq").unwrap().name.as_deref(), Some("DE"));
}

#[test]
fn test_unknown_location_is_reported() {
    let source = LocationSource::new();
    let error = source.resolve("atlantis").unwrap_err();
    assert!(matches!(error, ProviderError::UnknownLocation { location } if location == "atlantis"));
}

#[test]
fn test_entry_without_name_or_coordinates_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "bad.json", r#"{ "nowhere": { "latitude": 10.0 } }"#);

    let error = LocationSource::from_files(&[file], "-").unwrap_err();

    assert!(matches!(error, ProviderError::Configuration { .. }));
    assert!(error.to_string().contains("nowhere"));
    assert!(error.to_string().contains("bad.json"));
}

#[test]
fn test_missing_file_and_invalid_json_are_configuration_errors() {
    let dir = TempDir::new().unwrap();
    let missing = LocationFile {
        prefix: None,
        path: dir.path().join("missing.json"),
    };
    assert!(matches!(
        LocationSource::from_files(&[missing], "-"),
        Err(ProviderError::Configuration { .. })
    ));

    let broken = write(dir.path(), "broken.json", "[1, 2, 3]");
    assert!(matches!(
        LocationSource::from_files(&[broken], "-"),
        Err(ProviderError::Configuration { .. })
    ));
}

#[test]
fn test_empty_delimiter_falls_back_to_default() {
    let mut source = LocationSource::new();
    source
        .load_json(r#"{ "west": { "name": "US-CAL-CISO" } }"#, Some("aws"), "")
        .unwrap();

    assert!(source.resolve("aws-west").is_ok());
}
