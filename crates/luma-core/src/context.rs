//! Assistant context
//!
//! Builds what the assistant needs to ground its replies in dashboard data:
//! - the fixed-format dashboard summary sent with every chat message
//! - typed request contexts built from insight aggregates
//!
//! Both end up as a [`ContextPayload`] attached to the outbound request.

use serde::Serialize;

use crate::error::Result;
use crate::insights::{
    self, CategoryAverages, CategoryBreakdown, MonthlySummary, PatternSummary, Period,
    PeriodChange, SpendingPattern, SpendingRecord,
};
use crate::models::{Client, DashboardStats, Transaction};
use crate::store::DashboardStore;

/// Clients listed in the dashboard summary
pub const MAX_CONTEXT_CLIENTS: usize = 5;

/// Transactions listed in the dashboard summary
pub const MAX_CONTEXT_TRANSACTIONS: usize = 10;

/// Records sent with a transaction analysis request
pub const ANALYSIS_SAMPLE_SIZE: usize = 10;

/// Records sent with a suggestions request
pub const SUGGESTIONS_SAMPLE_SIZE: usize = 20;

// =============================================================================
// Dashboard summary
// =============================================================================

/// Render the dashboard summary for the store's current snapshot
pub fn format_dashboard_context(store: &DashboardStore) -> String {
    render_context(&store.stats(), &store.clients(), &store.transactions())
}

/// Render the dashboard summary
///
/// Lists general stats, at most 5 clients with their transaction counts and
/// at most 10 transactions, in list order.
pub fn render_context(
    stats: &DashboardStats,
    clients: &[Client],
    transactions: &[Transaction],
) -> String {
    let client_lines = clients
        .iter()
        .take(MAX_CONTEXT_CLIENTS)
        .map(|c| {
            format!(
                "- {} ({}): {} transações",
                c.name,
                c.email,
                c.transactions.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let transaction_lines = transactions
        .iter()
        .take(MAX_CONTEXT_TRANSACTIONS)
        .enumerate()
        .map(|(i, t)| format!("{}. {} - R$ {:.2} em {}", i + 1, t.name, t.amount, t.date))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "CONTEXTO DO DASHBOARD:\n\
         \n\
         📊 ESTATÍSTICAS GERAIS:\n\
         - Transação mais recente: R$ {:.2}\n\
         - Maior transação: R$ {:.2}\n\
         - Valor total de transações: R$ {:.2}\n\
         - Total de transações: {}\n\
         \n\
         👥 CLIENTES CADASTRADOS: {}\n\
         {}\n\
         \n\
         💳 ÚLTIMAS 10 TRANSAÇÕES:\n\
         {}",
        stats.most_recent,
        stats.largest,
        stats.total_amount,
        stats.total_count,
        clients.len(),
        client_lines,
        transaction_lines,
    )
    .trim()
    .to_string()
}

// =============================================================================
// Payload
// =============================================================================

/// Context attached to an assistant request
#[derive(Debug, Clone, PartialEq)]
pub enum ContextPayload {
    /// Pre-rendered text, such as the dashboard summary
    Text(String),
    /// Structured data, sent as pretty JSON
    Json(serde_json::Value),
}

impl ContextPayload {
    /// Serialize a typed context
    pub fn json<T: Serialize>(context: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(context)?))
    }

    /// Text form placed in the prompt
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<String> for ContextPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// =============================================================================
// Request contexts
// =============================================================================

/// Context for a general transaction analysis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAnalysisContext {
    pub total_transactions: usize,
    /// First 10 records
    pub transactions: Vec<SpendingRecord>,
    pub total_amount: f64,
    pub categories: CategoryBreakdown,
    pub period: Option<Period>,
}

impl TransactionAnalysisContext {
    pub fn new(records: &[SpendingRecord]) -> Self {
        Self {
            total_transactions: records.len(),
            transactions: records.iter().take(ANALYSIS_SAMPLE_SIZE).cloned().collect(),
            total_amount: insights::calculate_total(records),
            categories: insights::group_by_category(records),
            period: insights::period(records),
        }
    }
}

/// Context for a monthly report
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReportContext {
    pub month: &'static str,
    pub year: i32,
    pub transactions: Vec<SpendingRecord>,
    pub summary: MonthlySummary,
}

impl MonthlyReportContext {
    /// `month` is 1-based
    pub fn new(records: &[SpendingRecord], month: u32, year: i32) -> Self {
        Self {
            month: insights::month_name(month),
            year,
            transactions: insights::filter_by_month(records, month, year),
            summary: insights::monthly_summary(records, month, year),
        }
    }
}

/// Context for personalized optimization suggestions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsContext {
    /// First 20 records
    pub recent_transactions: Vec<SpendingRecord>,
    pub spending_pattern: SpendingPattern,
    pub user_profile: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_goals: Option<serde_json::Value>,
}

impl SuggestionsContext {
    pub fn new(
        records: &[SpendingRecord],
        profile: serde_json::Value,
        goals: Option<serde_json::Value>,
    ) -> Self {
        Self {
            recent_transactions: records.iter().take(SUGGESTIONS_SAMPLE_SIZE).cloned().collect(),
            spending_pattern: insights::analyze_spending_pattern(records),
            user_profile: profile,
            financial_goals: goals,
        }
    }
}

/// Totals for one side of a period comparison
#[derive(Debug, Clone, Serialize)]
pub struct PeriodTotals {
    pub total: f64,
    pub categories: CategoryBreakdown,
    pub count: usize,
}

impl PeriodTotals {
    pub fn new(records: &[SpendingRecord]) -> Self {
        Self {
            total: insights::calculate_total(records),
            categories: insights::group_by_category(records),
            count: records.len(),
        }
    }
}

/// Context for comparing two periods
#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparisonContext {
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub changes: PeriodChange,
}

impl PeriodComparisonContext {
    pub fn new(current: &[SpendingRecord], previous: &[SpendingRecord]) -> Self {
        Self {
            current: PeriodTotals::new(current),
            previous: PeriodTotals::new(previous),
            changes: insights::calculate_changes(current, previous),
        }
    }
}

/// Context for a next-month spending forecast
#[derive(Debug, Clone, Serialize)]
pub struct ForecastContext {
    pub historical: Vec<SpendingRecord>,
    pub patterns: PatternSummary,
    pub averages: CategoryAverages,
}

impl ForecastContext {
    pub fn new(records: &[SpendingRecord]) -> Self {
        Self {
            historical: records.to_vec(),
            patterns: insights::identify_patterns(records),
            averages: insights::calculate_averages(records),
        }
    }
}

/// Context when some recent records look unusual
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusualSpendingContext {
    pub unusual_transactions: Vec<SpendingRecord>,
    pub normal_pattern: CategoryAverages,
}

/// Context when nothing stands out
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingCheckContext {
    pub recent_transactions: Vec<SpendingRecord>,
    pub historical_average: CategoryAverages,
}

/// Context for explaining one transaction
#[derive(Debug, Clone, Serialize)]
pub struct TransactionExplanationContext {
    pub transaction: SpendingRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionDate;

    fn tx(id: i64, name: &str, amount: f64, date: &str) -> Transaction {
        Transaction {
            id,
            client_id: 1,
            name: name.to_string(),
            phone: String::new(),
            email: String::new(),
            amount,
            date: TransactionDate::parse(date),
            card_number: None,
            cvv: None,
            card_type: None,
            expiry: None,
            category: None,
            description: None,
        }
    }

    fn client(id: i64, name: &str, tx_refs: usize) -> Client {
        Client {
            id,
            name: name.to_string(),
            email: format!("c{}@example.com", id),
            phone: String::new(),
            average_purchase: 0.0,
            cards: vec![],
            transactions: vec![serde_json::json!({}); tx_refs],
        }
    }

    #[test]
    fn test_render_context_layout() {
        let stats = DashboardStats {
            most_recent: 25.0,
            largest: 1200.5,
            total_amount: 3000.0,
            total_count: 2,
        };
        let clients = vec![client(1, "Maria", 2)];
        let transactions = vec![
            tx(1, "Maria", 25.0, "10/01/2024"),
            tx(2, "Maria", 1200.5, "09/01/2024"),
        ];

        let text = render_context(&stats, &clients, &transactions);

        assert!(text.starts_with("CONTEXTO DO DASHBOARD:"));
        assert!(text.contains("- Transação mais recente: R$ 25.00"));
        assert!(text.contains("- Maior transação: R$ 1200.50"));
        assert!(text.contains("- Valor total de transações: R$ 3000.00"));
        assert!(text.contains("- Total de transações: 2"));
        assert!(text.contains("👥 CLIENTES CADASTRADOS: 1"));
        assert!(text.contains("- Maria (c1@example.com): 2 transações"));
        assert!(text.contains("1. Maria - R$ 25.00 em 10/01/2024"));
        assert!(text.ends_with("2. Maria - R$ 1200.50 em 09/01/2024"));
    }

    #[test]
    fn test_render_context_truncates_lists() {
        let clients: Vec<Client> = (1..=8).map(|i| client(i, &format!("Cliente {}", i), 0)).collect();
        let transactions: Vec<Transaction> = (1..=25)
            .map(|i| tx(i, &format!("Titular {}", i), i as f64, "01/01/2024"))
            .collect();

        let text = render_context(&DashboardStats::default(), &clients, &transactions);

        assert!(text.contains("👥 CLIENTES CADASTRADOS: 8"));
        let client_lines = text.lines().filter(|l| l.starts_with("- Cliente")).count();
        let tx_lines = text.lines().filter(|l| l.contains(". Titular")).count();
        assert_eq!(client_lines, MAX_CONTEXT_CLIENTS);
        assert_eq!(tx_lines, MAX_CONTEXT_TRANSACTIONS);
        assert!(text.contains("Cliente 5 "));
        assert!(!text.contains("Cliente 6 "));
        assert!(text.contains("10. Titular 10 - "));
        assert!(!text.contains("Titular 11 "));
    }

    #[test]
    fn test_render_context_is_deterministic() {
        let transactions = vec![tx(1, "A", 1.0, "01/01/2024")];
        let a = render_context(&DashboardStats::default(), &[], &transactions);
        let b = render_context(&DashboardStats::default(), &[], &transactions);
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_dashboard_context_reads_store() {
        let store = DashboardStore::new();
        store.update_transactions(vec![tx(1, "Bruno", 10.0, "02/02/2024")]);
        let text = format_dashboard_context(&store);
        assert!(text.contains("1. Bruno - R$ 10.00 em 02/02/2024"));
    }

    #[test]
    fn test_payload_render() {
        let text = ContextPayload::Text("abc".into());
        assert_eq!(text.render(), "abc");

        let comparison = PeriodComparisonContext::new(&[], &[SpendingRecord::new(100.0)]);
        let payload = ContextPayload::json(&comparison).unwrap();
        let rendered = payload.render();
        assert!(rendered.contains("\"direction\": \"decrease\""));
        assert!(rendered.contains("\"absolute\": -100.0"));
    }

    #[test]
    fn test_analysis_context_samples_first_ten() {
        let records: Vec<SpendingRecord> = (0..15).map(|i| SpendingRecord::new(i as f64)).collect();
        let ctx = TransactionAnalysisContext::new(&records);
        assert_eq!(ctx.total_transactions, 15);
        assert_eq!(ctx.transactions.len(), 10);
        assert_eq!(ctx.total_amount, 105.0);
        assert!(ctx.period.is_none());

        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("totalTransactions").is_some());
    }

    #[test]
    fn test_monthly_report_context_month_name() {
        let ctx = MonthlyReportContext::new(&[], 3, 2024);
        assert_eq!(ctx.month, "Março");
        assert_eq!(ctx.summary.count, 0);
    }
}
