//! Dashboard command implementations (no AI required)

use std::path::Path;

use anyhow::Result;
use luma_core::context::format_dashboard_context;
use luma_core::insights::{self, month_name, SpendingRecord};
use luma_core::Transaction;

use super::core::{latest_month, load_store, parse_date, parse_month_year, store_records};
use super::truncate;

const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// Print the dashboard context exactly as the assistant receives it
pub fn cmd_context(data_path: &Path) -> Result<()> {
    let store = load_store(data_path)?;
    println!("{}", format_dashboard_context(&store));
    Ok(())
}

pub fn cmd_insights(data_path: &Path, month: Option<&str>) -> Result<()> {
    let store = load_store(data_path)?;
    let all = store_records(&store);

    let (records, label) = match month {
        Some(m) => {
            let (month, year) = parse_month_year(m)?;
            (
                insights::filter_by_month(&all, month, year),
                format!("{} {}", month_name(month), year),
            )
        }
        None => (all.clone(), "All transactions".to_string()),
    };

    println!();
    println!("📊 Insights: {}", label);
    println!("   ─────────────────────────────");

    if records.is_empty() {
        println!("   No transactions in this period.");
        return Ok(());
    }

    println!("   Transactions:  {}", records.len());
    println!("   Total:         R$ {:.2}", insights::calculate_total(&records));
    if let Some(period) = insights::period(&records) {
        println!(
            "   Period:        {} → {}",
            period.start.format("%d/%m/%Y"),
            period.end.format("%d/%m/%Y")
        );
    }

    print_categories(&records);
    print_weekdays(&records);
    print_recurring(&records);

    if month.is_none() {
        if let Some((month, year)) = latest_month(&all) {
            let summary = insights::monthly_summary(&all, month, year);
            println!();
            println!("🗓️  Latest month ({} {})", month_name(month), year);
            println!("   ─────────────────────────────");
            println!(
                "   {} transactions, R$ {:.2} total, R$ {:.2} average",
                summary.count, summary.total, summary.average
            );
        }
    }

    Ok(())
}

fn print_categories(records: &[SpendingRecord]) {
    let averages = insights::calculate_averages(records);

    println!();
    println!("🏷️  By category");
    println!("   ─────────────────────────────");
    for (category, summary) in insights::group_by_category(records) {
        println!(
            "   {:<20} {:>3}x  R$ {:>10.2}  (avg R$ {:.2})",
            truncate(&category, 20),
            summary.count,
            summary.total,
            averages.get(&category).copied().unwrap_or(0.0)
        );
    }
}

fn print_weekdays(records: &[SpendingRecord]) {
    let pattern = insights::analyze_spending_pattern(records);

    println!();
    println!("📅 By weekday");
    println!("   ─────────────────────────────");
    for (day, total) in WEEKDAYS.iter().zip(pattern.by_weekday) {
        if total > 0.0 {
            println!("   {:<5} R$ {:.2}", day, total);
        }
    }
}

fn print_recurring(records: &[SpendingRecord]) {
    let patterns = insights::identify_patterns(records);
    if patterns.recurring_transactions.is_empty() {
        return;
    }

    println!();
    println!("🔁 Recurring");
    println!("   ─────────────────────────────");
    for pattern in &patterns.recurring_transactions {
        println!(
            "   {:<30} R$ {:.2} × {}",
            truncate(&pattern.description, 30),
            pattern.amount,
            pattern.occurrences
        );
    }
}

pub fn cmd_client(data_path: &Path, name: &str) -> Result<()> {
    let store = load_store(data_path)?;

    let Some(client) = store.find_client_by_name(name) else {
        println!("No client matching '{}'.", name);
        return Ok(());
    };

    let stats = store.client_stats(client.id);

    println!();
    println!("👤 {} (#{})", client.name, client.id);
    println!("   ─────────────────────────────");
    println!("   Email:          {}", client.email);
    println!("   Phone:          {}", client.phone);
    println!("   Cards:          {}", client.cards.len());
    println!("   Avg purchase:   R$ {:.2}", client.average_purchase);
    println!();
    println!("   Transactions:   {}", stats.total_transactions);
    println!("   Total:          R$ {:.2}", stats.total_amount);
    println!("   Average:        R$ {:.2}", stats.average_amount);
    println!("   Largest:        R$ {:.2}", stats.max_transaction);
    println!("   Smallest:       R$ {:.2}", stats.min_transaction);

    if !stats.transactions.is_empty() {
        println!();
        print_transactions(&stats.transactions, 10);
    }

    Ok(())
}

pub fn cmd_transactions(
    data_path: &Path,
    from: Option<&str>,
    to: Option<&str>,
    min: Option<f64>,
    max: Option<f64>,
    limit: usize,
) -> Result<()> {
    let store = load_store(data_path)?;

    let mut transactions = match (from, to) {
        (Some(from), Some(to)) => store.transactions_by_date(parse_date(from)?, parse_date(to)?),
        _ => store.transactions().as_ref().clone(),
    };

    if min.is_some() || max.is_some() {
        let in_range = store.transactions_by_value_range(
            min.unwrap_or(f64::NEG_INFINITY),
            max.unwrap_or(f64::INFINITY),
        );
        transactions.retain(|t| in_range.iter().any(|r| r.id == t.id));
    }

    if transactions.is_empty() {
        println!("No transactions match.");
        return Ok(());
    }

    println!();
    println!("💳 Transactions ({})", transactions.len());
    println!("   ─────────────────────────────");
    print_transactions(&transactions, limit);

    Ok(())
}

fn print_transactions(transactions: &[Transaction], limit: usize) {
    for t in transactions.iter().take(limit) {
        println!(
            "   {:>4}  {:<10}  {:<20}  R$ {:>10.2}  {}",
            t.id,
            t.date,
            truncate(&t.name, 20),
            t.amount,
            t.category.as_deref().unwrap_or(insights::DEFAULT_CATEGORY)
        );
    }
    if transactions.len() > limit {
        println!("   ... and {} more", transactions.len() - limit);
    }
}
