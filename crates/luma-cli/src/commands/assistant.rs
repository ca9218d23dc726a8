//! Assistant command implementations
//!
//! Every command loads the snapshot, builds an `InsightAssistant` for the
//! configured backend and prints Luma's reply.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use luma_core::insights::{self, month_name, SpendingRecord};
use luma_core::{AssistantConfig, ChatGateway};
use serde_json::Value;

use super::core::{
    build_assistant, build_client, load_store, most_recent, parse_month_year, previous_month,
    store_records,
};

fn print_reply(title: &str, reply: &str) {
    println!();
    println!("💬 {}", title);
    println!("   ─────────────────────────────");
    for line in reply.lines() {
        println!("   {}", line);
    }
    println!();
}

/// Send a free-form message (with the dashboard context unless disabled)
pub async fn cmd_ask(
    data_path: &Path,
    config: &AssistantConfig,
    message: &str,
    no_context: bool,
) -> Result<()> {
    let store = load_store(data_path)?;
    let mut gateway = ChatGateway::new(build_client(config)?, config);
    if !no_context {
        gateway = gateway.with_store(Arc::new(store));
    }

    let reply = gateway
        .send_message(message, None)
        .await
        .context("Luma could not answer")?;

    print_reply("Luma", &reply.content);
    Ok(())
}

pub async fn cmd_analyze(data_path: &Path, config: &AssistantConfig) -> Result<()> {
    let store = load_store(data_path)?;
    let records = store_records(&store);
    let assistant = build_assistant(config, store)?;

    let reply = assistant
        .analyze_transactions(&records)
        .await
        .context("Analysis failed")?;

    print_reply(
        &format!("Analysis of {} transactions", records.len()),
        &reply,
    );
    Ok(())
}

pub async fn cmd_report(
    data_path: &Path,
    config: &AssistantConfig,
    month: u32,
    year: i32,
) -> Result<()> {
    let store = load_store(data_path)?;
    let records = store_records(&store);
    let assistant = build_assistant(config, store)?;

    let reply = assistant
        .generate_monthly_report(&records, month, year)
        .await
        .context("Report generation failed")?;

    print_reply(&format!("Report: {} {}", month_name(month), year), &reply);
    Ok(())
}

pub async fn cmd_compare(
    data_path: &Path,
    config: &AssistantConfig,
    current: &str,
    previous: Option<&str>,
) -> Result<()> {
    let (month, year) = parse_month_year(current)?;
    let (prev_month, prev_year) = match previous {
        Some(p) => parse_month_year(p)?,
        None => previous_month(month, year),
    };

    let store = load_store(data_path)?;
    let records = store_records(&store);
    let current_records = insights::filter_by_month(&records, month, year);
    let previous_records = insights::filter_by_month(&records, prev_month, prev_year);

    let change = insights::calculate_changes(&current_records, &previous_records);
    println!();
    println!(
        "📈 {} {} vs {} {}: R$ {:+.2} ({:+.1}%, {})",
        month_name(month),
        year,
        month_name(prev_month),
        prev_year,
        change.absolute,
        change.percent,
        change.direction
    );

    let assistant = build_assistant(config, store)?;
    let reply = assistant
        .compare_periods(&current_records, &previous_records)
        .await
        .context("Comparison failed")?;

    print_reply("Comparison", &reply);
    Ok(())
}

pub async fn cmd_unusual(data_path: &Path, config: &AssistantConfig, recent: usize) -> Result<()> {
    let store = load_store(data_path)?;
    let records = store_records(&store);
    let averages = insights::calculate_averages(&records);
    let recent_records = most_recent(&records, recent);

    let flagged = insights::detect_unusual_transactions(&recent_records, &averages);
    println!();
    println!(
        "🔎 {} of the {} most recent transactions look unusual",
        flagged.len(),
        recent_records.len()
    );
    for record in &flagged {
        println!(
            "   ⚠️  R$ {:.2} in {} (avg R$ {:.2})",
            record.amount_or_zero(),
            record.category_label(),
            averages.get(record.category_label()).copied().unwrap_or(0.0)
        );
    }

    let assistant = build_assistant(config, store)?;
    let reply = assistant
        .check_unusual_spending(&recent_records, &averages)
        .await
        .context("Unusual spending check failed")?;

    print_reply("Spending check", &reply);
    Ok(())
}

pub async fn cmd_predict(data_path: &Path, config: &AssistantConfig) -> Result<()> {
    let store = load_store(data_path)?;
    let records = store_records(&store);
    let assistant = build_assistant(config, store)?;

    let reply = assistant
        .predict_future_spending(&records)
        .await
        .context("Forecast failed")?;

    print_reply("Next month forecast", &reply);
    Ok(())
}

pub async fn cmd_suggest(
    data_path: &Path,
    config: &AssistantConfig,
    profile: Option<&str>,
    goals: Option<&str>,
) -> Result<()> {
    let profile: Value = match profile {
        Some(json) => serde_json::from_str(json).context("--profile must be valid JSON")?,
        None => Value::Object(Default::default()),
    };
    let goals: Option<Value> = goals
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--goals must be valid JSON")?;

    let store = load_store(data_path)?;
    let records = most_recent(&store_records(&store), usize::MAX);
    let assistant = build_assistant(config, store)?;

    let reply = assistant
        .personalized_suggestions(&records, profile, goals)
        .await
        .context("Suggestions failed")?;

    print_reply("Suggestions", &reply);
    Ok(())
}

pub async fn cmd_explain(data_path: &Path, config: &AssistantConfig, id: i64) -> Result<()> {
    let store = load_store(data_path)?;
    let transaction = store
        .transactions()
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .with_context(|| format!("Transaction #{} not found", id))?;

    let record = SpendingRecord::from(&transaction);

    let assistant = build_assistant(config, store)?;
    let reply = assistant
        .explain_transaction(&record)
        .await
        .context("Explanation failed")?;

    print_reply(
        &format!(
            "Transaction #{} ({} - R$ {:.2})",
            transaction.id, transaction.name, transaction.amount
        ),
        &reply,
    );
    Ok(())
}
