//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use luma_core::test_utils::MockGeminiServer;
use luma_core::{AssistantConfig, BackendKind};
use tempfile::TempDir;

use crate::commands::{self, truncate};

const SNAPSHOT: &str = include_str!("../../../samples/dashboard.json");

/// Write the sample snapshot into a temp dir, returning (dir, path)
fn setup_snapshot() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    (dir, path)
}

fn mock_config() -> AssistantConfig {
    AssistantConfig {
        backend: BackendKind::Mock,
        ..Default::default()
    }
}

// ========== Helper Tests ==========

#[test]
fn test_truncate_counts_chars() {
    assert_eq!(truncate("Mercado", 10), "Mercado");
    assert_eq!(truncate("Eletrônicos e acessórios", 10), "Eletrôn...");
}

#[test]
fn test_parse_month_year() {
    assert_eq!(commands::parse_month_year("03/2024").unwrap(), (3, 2024));
    assert!(commands::parse_month_year("13/2024").is_err());
    assert!(commands::parse_month_year("2024-03").is_err());
    assert!(commands::parse_month_year("ab/2024").is_err());
}

#[test]
fn test_previous_month_wraps_year() {
    assert_eq!(commands::previous_month(1, 2024), (12, 2023));
    assert_eq!(commands::previous_month(7, 2024), (6, 2024));
}

#[test]
fn test_parse_date_is_day_first() {
    let date = commands::parse_date("05/11/2024").unwrap();
    assert_eq!(date.to_string(), "2024-11-05");
    assert!(commands::parse_date("31/02/2024").is_err());
}

#[test]
fn test_most_recent_orders_by_date() {
    let (_dir, path) = setup_snapshot();
    let store = commands::load_store(&path).unwrap();
    let records = commands::store_records(&store);

    let recent = commands::most_recent(&records, 2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].amount, Some(95.3));
    assert_eq!(commands::latest_month(&records), Some((5, 2024)));
}

// ========== Dashboard Command Tests ==========

#[test]
fn test_load_store_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::load_store(&dir.path().join("missing.json"));
    assert!(result.is_err());
}

#[test]
fn test_load_store_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(commands::load_store(&path).is_err());
}

#[test]
fn test_cmd_context() {
    let (_dir, path) = setup_snapshot();
    assert!(commands::cmd_context(&path).is_ok());
}

#[test]
fn test_cmd_insights() {
    let (_dir, path) = setup_snapshot();
    assert!(commands::cmd_insights(&path, None).is_ok());
    assert!(commands::cmd_insights(&path, Some("03/2024")).is_ok());
    assert!(commands::cmd_insights(&path, Some("01/1999")).is_ok());
    assert!(commands::cmd_insights(&path, Some("march")).is_err());
}

#[test]
fn test_cmd_client() {
    let (_dir, path) = setup_snapshot();
    assert!(commands::cmd_client(&path, "ana").is_ok());
    assert!(commands::cmd_client(&path, "nobody").is_ok());
}

#[test]
fn test_cmd_transactions_filters() {
    let (_dir, path) = setup_snapshot();
    assert!(commands::cmd_transactions(&path, None, None, None, None, 20).is_ok());
    assert!(commands::cmd_transactions(
        &path,
        Some("01/03/2024"),
        Some("31/03/2024"),
        Some(100.0),
        None,
        5
    )
    .is_ok());
    assert!(
        commands::cmd_transactions(&path, Some("2024-03-01"), Some("31/03/2024"), None, None, 5)
            .is_err()
    );
}

// ========== Config Tests ==========

#[test]
fn test_load_config_with_model_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assistant.toml");
    std::fs::write(&path, "[chat]\nhistory_limit = 6\n").unwrap();

    let config = commands::load_config(Some(&path), Some("gemini-1.5-flash")).unwrap();
    assert_eq!(config.chat.history_limit, 6);
    assert_eq!(config.gemini.model, "gemini-1.5-flash");
}

#[test]
fn test_build_client_requires_backend() {
    let config = AssistantConfig::default();
    assert!(commands::build_client(&config).is_err());
    assert!(commands::build_client(&mock_config()).is_ok());
}

// ========== Assistant Command Tests ==========

#[tokio::test]
async fn test_cmd_ask_with_mock() {
    let (_dir, path) = setup_snapshot();
    let config = mock_config();
    assert!(commands::cmd_ask(&path, &config, "Quanto gastei?", false)
        .await
        .is_ok());
    assert!(commands::cmd_ask(&path, &config, "Oi", true).await.is_ok());
}

#[tokio::test]
async fn test_assistant_commands_with_mock() {
    let (_dir, path) = setup_snapshot();
    let config = mock_config();

    assert!(commands::cmd_analyze(&path, &config).await.is_ok());
    assert!(commands::cmd_report(&path, &config, 3, 2024).await.is_ok());
    assert!(commands::cmd_compare(&path, &config, "05/2024", None)
        .await
        .is_ok());
    assert!(commands::cmd_unusual(&path, &config, 5).await.is_ok());
    assert!(commands::cmd_predict(&path, &config).await.is_ok());
    assert!(commands::cmd_explain(&path, &config, 3).await.is_ok());
    assert!(
        commands::cmd_suggest(&path, &config, Some(r#"{"renda": 5000}"#), None)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_assistant_command_errors() {
    let (_dir, path) = setup_snapshot();
    let config = mock_config();

    assert!(commands::cmd_explain(&path, &config, 999).await.is_err());
    assert!(commands::cmd_report(&path, &config, 0, 2024).await.is_err());
    assert!(commands::cmd_compare(&path, &config, "2024", None)
        .await
        .is_err());
    assert!(commands::cmd_suggest(&path, &config, Some("{oops"), None)
        .await
        .is_err());
}

#[tokio::test]
async fn test_cmd_ask_against_mock_gemini() {
    let (_dir, path) = setup_snapshot();
    let server = MockGeminiServer::with_reply("Seu maior gasto foi R$ 850,00.").await;

    let mut config = AssistantConfig::default();
    config.gemini.host = server.url();
    config.gemini.api_key = Some("test-key".to_string());

    assert!(commands::cmd_ask(&path, &config, "Qual o maior gasto?", false)
        .await
        .is_ok());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let prompt = requests[0]["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("CONTEXTO DO DASHBOARD:"));
}

#[tokio::test]
async fn test_cmd_health() {
    assert!(commands::cmd_health(&mock_config()).await.is_ok());
    assert!(commands::cmd_health(&AssistantConfig::default()).await.is_ok());
}
