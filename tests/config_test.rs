//! Configuration files on disk.

use std::fs;

use bankstmt::{Error, ExtractConfig, Pipeline, TextFragment};
use rust_decimal::Decimal;

#[test]
fn test_config_file_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bankstmt.json");

    let config = ExtractConfig::new()
        .with_designations(["LOYER BUREAU", "ICCN"])
        .with_max_magnitude(Decimal::new(500_000, 0));
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = ExtractConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ExtractConfig::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bankstmt.json");
    fs::write(
        &path,
        r#"{
            "designations": ["LOYER BUREAU"],
            "credit_keywords": ["remise"],
            "limits": { "min_designation_len": 5 }
        }"#,
    )
    .unwrap();
    let config = ExtractConfig::from_json_file(&path).unwrap();
    let pipeline = Pipeline::new(&config).unwrap();

    // Single amount column: direction comes from the narrative.
    let fragments = vec![
        TextFragment::new("01-03-2024", 40.0, 700.0),
        TextFragment::new("LOYER BUREAU MARS", 120.0, 700.0),
        TextFragment::new("1,500.00", 300.0, 700.0),
        TextFragment::new("02-03-2024", 40.0, 680.0),
        TextFragment::new("Remise LOYER BUREAU", 120.0, 680.0),
        TextFragment::new("200.00", 300.0, 680.0),
    ];
    let result = pipeline.extract_fragments(&fragments);

    assert_eq!(result.len(), 2);
    assert_eq!(result.records[0].amount(), Decimal::new(-150_000, 2));
    assert_eq!(result.records[1].amount(), Decimal::new(20_000, 2));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bankstmt.json");
    fs::write(&path, r#"{ "designations": ["  "] }"#).unwrap();
    assert!(matches!(
        ExtractConfig::from_json_file(&path),
        Err(Error::Config(_))
    ));
}
