// Integration tests for the front-end request/response layer
#![cfg(unix)]

mod common;

use tempfile::TempDir;
use wpd_convert::api::{convert_request, ConvertOptions, DestType, NOTHING_FOUND};

#[tokio::test]
async fn test_convert_request_from_json_options() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    common::touch(src.path(), "sub/a.wpd");
    common::touch(src.path(), "b.wpd");

    let json = format!(
        r#"{{"recursive": true, "destType": "custom", "destPath": "{}", "preserve": true}}"#,
        dest.path().display()
    );
    let opts: ConvertOptions = serde_json::from_str(&json).unwrap();

    let converter = common::converting(tools.path());
    let response = convert_request(&src.path().to_string_lossy(), &opts, &converter).await;

    assert!(response.success);
    assert_eq!(response.stats.total, 2);
    assert_eq!(response.stats.successful, 2);
    assert!(dest.path().join("sub/a.docx").exists());
    assert!(response.log.iter().any(|line| line == "sub/a.wpd ✓"));
}

#[tokio::test]
async fn test_convert_request_nothing_found() {
    let src = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    common::touch(src.path(), "readme.txt");

    let converter = common::converting(tools.path());
    let opts = ConvertOptions::default();
    let response = convert_request(&src.path().to_string_lossy(), &opts, &converter).await;

    assert!(!response.success);
    assert_eq!(response.message, NOTHING_FOUND);
    assert_eq!(response.stats.total, 0);
}

#[tokio::test]
async fn test_convert_request_reports_failures() {
    let src = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    common::touch(src.path(), "good.wpd");
    common::touch(src.path(), "broken.wpd");

    let opts = ConvertOptions { dest_type: DestType::Converted, ..Default::default() };
    let converter = common::converting(tools.path());
    let response = convert_request(&src.path().to_string_lossy(), &opts, &converter).await;

    assert!(!response.success);
    assert_eq!(response.stats.failed, 1);
    assert_eq!(response.stats.successful, 1);
    assert!(src.path().join("Converted/good.docx").exists());
    assert!(response.log.iter().any(|line| line.starts_with("broken.wpd ✗")));
}

#[tokio::test]
async fn test_convert_request_requires_source() {
    let tools = TempDir::new().unwrap();
    let converter = common::converting(tools.path());
    let response = convert_request("  ", &ConvertOptions::default(), &converter).await;

    assert!(!response.success);
    assert_eq!(response.stats.total, 0);
}
