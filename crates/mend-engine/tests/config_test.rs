use mend_engine::config::{ConfigLoader, MendConfig};
use std::io::Write;

#[tokio::test]
async fn test_load_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "healing:\n  enabled: false\n  compact_max_chars: 512\nmodel:\n  base_url: http://localhost:11434/v1\n  model: llama3\n"
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path()).await.unwrap();
    assert!(!config.healing.enabled);
    assert_eq!(config.healing.compact_max_chars, 512);
    assert_eq!(config.model.base_url, "http://localhost:11434/v1");
    assert_eq!(config.model.model, "llama3");
    // untouched fields keep their defaults
    assert_eq!(config.healing.rate_max_calls, 10);
}

#[tokio::test]
async fn test_load_from_missing_file_errors() {
    let result = ConfigLoader::load_from(std::path::Path::new("/nonexistent/mend.yaml")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_document_is_all_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{}}").unwrap();

    let config: MendConfig = ConfigLoader::load_from(file.path()).await.unwrap();
    assert!(config.healing.enabled);
    assert!(config.healing.redact_full_page);
}
