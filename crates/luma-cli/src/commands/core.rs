//! Shared utilities for command implementations
//!
//! This module contains:
//! - `load_store` - Load a dashboard snapshot into a store
//! - `load_config` - Resolve the assistant config
//! - `build_assistant` - Wire client, gateway and store together
//! - Date/month argument parsing

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use luma_core::insights::{records_from_transactions, SpendingRecord};
use luma_core::{
    AIClient, AssistantConfig, ChatGateway, DashboardSnapshot, DashboardStore, InsightAssistant,
    TransactionDate,
};

/// Load a dashboard snapshot file into a new store
pub fn load_store(data_path: &Path) -> Result<DashboardStore> {
    let content = fs::read_to_string(data_path)
        .with_context(|| format!("Failed to read snapshot {}", data_path.display()))?;
    let snapshot: DashboardSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Invalid snapshot JSON in {}", data_path.display()))?;

    tracing::debug!(
        path = %data_path.display(),
        transactions = snapshot.transactions.len(),
        clients = snapshot.clients.len(),
        "Loaded dashboard snapshot"
    );

    Ok(DashboardStore::from_snapshot(snapshot))
}

/// Spending records for every transaction in the store
pub fn store_records(store: &DashboardStore) -> Vec<SpendingRecord> {
    records_from_transactions(&store.transactions())
}

/// Resolve the assistant config (explicit path, data dir override, or built-in)
pub fn load_config(config_path: Option<&Path>, model: Option<&str>) -> Result<AssistantConfig> {
    let mut config = match config_path {
        Some(path) => AssistantConfig::load_from(path),
        None => AssistantConfig::load(),
    }
    .context("Failed to load assistant config")?;

    if let Some(model) = model {
        config.gemini.model = model.to_string();
    }
    Ok(config)
}

/// Build the AI client for the configured backend
pub fn build_client(config: &AssistantConfig) -> Result<AIClient> {
    AIClient::from_config(config).context(
        "No AI backend available. Set GEMINI_API_KEY, or AI_BACKEND=mock to run offline",
    )
}

/// Build an assistant whose chat defaults to the store's dashboard context
pub fn build_assistant(config: &AssistantConfig, store: DashboardStore) -> Result<InsightAssistant> {
    let client = build_client(config)?;
    let gateway = ChatGateway::new(client, config).with_store(Arc::new(store));
    Ok(InsightAssistant::new(gateway))
}

/// Parse a `DD/MM/YYYY` argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    TransactionDate::parse(s)
        .date()
        .with_context(|| format!("Invalid date '{}' (use DD/MM/YYYY)", s))
}

/// Parse a `MM/YYYY` argument into (month, year)
pub fn parse_month_year(s: &str) -> Result<(u32, i32)> {
    let Some((month, year)) = s.split_once('/') else {
        bail!("Invalid month '{}' (use MM/YYYY)", s);
    };
    let month: u32 = month
        .trim()
        .parse()
        .with_context(|| format!("Invalid month '{}' (use MM/YYYY)", s))?;
    let year: i32 = year
        .trim()
        .parse()
        .with_context(|| format!("Invalid year '{}' (use MM/YYYY)", s))?;
    if !(1..=12).contains(&month) {
        bail!("Month must be between 1 and 12, got {}", month);
    }
    Ok((month, year))
}

/// The month before (month, year)
pub fn previous_month(month: u32, year: i32) -> (u32, i32) {
    if month == 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    }
}

/// Most recent records first; undated records last
pub fn most_recent(records: &[SpendingRecord], count: usize) -> Vec<SpendingRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    sorted.truncate(count);
    sorted
}

/// (month, year) of the latest dated record, if any
pub fn latest_month(records: &[SpendingRecord]) -> Option<(u32, i32)> {
    records
        .iter()
        .filter_map(|r| r.occurred_at)
        .max()
        .map(|d| (d.month(), d.year()))
}
