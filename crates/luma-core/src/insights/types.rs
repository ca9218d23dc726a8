//! Input and output types for the insight aggregator

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Label used when a record carries no category
pub const DEFAULT_CATEGORY: &str = "Outros";

/// A spending record as seen by the aggregator
///
/// Every field is optional: aggregation treats a missing amount as 0 and a
/// missing category as [`DEFAULT_CATEGORY`]. Records without a timestamp are
/// left out of period, month and weekday/hour views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingRecord {
    #[serde(rename = "valor", default)]
    pub amount: Option<f64>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "data", default)]
    pub occurred_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SpendingRecord {
    pub fn new(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn at(mut self, occurred_at: NaiveDateTime) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Dated at midnight
    pub fn on(self, date: NaiveDate) -> Self {
        self.at(date.and_time(NaiveTime::MIN))
    }

    /// Amount, 0 when missing
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Category, or the default label
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

impl From<&Transaction> for SpendingRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: Some(tx.amount),
            category: tx.category.clone(),
            description: tx.description.clone(),
            occurred_at: tx.date.date().map(|d| d.and_time(NaiveTime::MIN)),
            status: None,
        }
    }
}

/// Convert a transaction slice into aggregator input
pub fn records_from_transactions(transactions: &[Transaction]) -> Vec<SpendingRecord> {
    transactions.iter().map(SpendingRecord::from).collect()
}

/// Count and total for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub count: usize,
    pub total: f64,
}

/// Category label -> summary, sorted by label
pub type CategoryBreakdown = BTreeMap<String, CategorySummary>;

/// Category label -> mean amount
pub type CategoryAverages = BTreeMap<String, f64>;

/// Earliest and latest timestamps in a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Spending histograms
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendingPattern {
    /// Total amount per weekday, 0 = Sunday .. 6 = Saturday
    pub by_weekday: [f64; 7],
    /// Transaction count per hour of day
    pub by_hour: [u32; 24],
}

impl Default for SpendingPattern {
    fn default() -> Self {
        Self {
            by_weekday: [0.0; 7],
            by_hour: [0; 24],
        }
    }
}

/// Direction of a change between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Increase,
    /// Also reported for a zero delta
    Decrease,
}

impl ChangeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeDirection::Increase => "increase",
            ChangeDirection::Decrease => "decrease",
        }
    }
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChangeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(ChangeDirection::Increase),
            "decrease" => Ok(ChangeDirection::Decrease),
            _ => Err(format!("Unknown change direction: {}", s)),
        }
    }
}

/// Change in total spending between two periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodChange {
    pub absolute: f64,
    /// 0 when the previous total is 0
    pub percent: f64,
    pub direction: ChangeDirection,
}

/// A description/amount pair seen more than twice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringPattern {
    /// Composite key, `"{description}_{amount}"`
    pub pattern: String,
    pub description: String,
    pub amount: f64,
    pub occurrences: usize,
}

/// Output of recurring-pattern detection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternSummary {
    pub recurring_transactions: Vec<RecurringPattern>,
}

/// One month's totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub total: f64,
    pub count: usize,
    pub categories: CategoryBreakdown,
    /// 0 when the month has no records
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionDate;

    #[test]
    fn test_change_direction_strings() {
        assert_eq!(ChangeDirection::Increase.to_string(), "increase");
        assert_eq!(
            "decrease".parse::<ChangeDirection>().unwrap(),
            ChangeDirection::Decrease
        );
        assert!("sideways".parse::<ChangeDirection>().is_err());
    }

    #[test]
    fn test_record_from_transaction() {
        let tx = Transaction {
            id: 1,
            client_id: 2,
            name: "Ana".into(),
            phone: String::new(),
            email: String::new(),
            amount: 42.0,
            date: TransactionDate::parse("03/04/2024"),
            card_number: None,
            cvv: None,
            card_type: None,
            expiry: None,
            category: Some("Mercado".into()),
            description: Some("Feira".into()),
        };

        let record = SpendingRecord::from(&tx);
        assert_eq!(record.amount, Some(42.0));
        assert_eq!(record.category_label(), "Mercado");
        assert_eq!(
            record.occurred_at.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
    }

    #[test]
    fn test_record_defaults() {
        let record = SpendingRecord::default();
        assert_eq!(record.amount_or_zero(), 0.0);
        assert_eq!(record.category_label(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_record_deserializes_dashboard_fields() {
        let record: SpendingRecord = serde_json::from_str(
            r#"{"valor": 12.5, "categoria": "Lazer", "data": "2024-05-04T20:15:00"}"#,
        )
        .unwrap();
        assert_eq!(record.amount, Some(12.5));
        assert_eq!(record.category.as_deref(), Some("Lazer"));
        assert!(record.description.is_none());
        assert!(record.occurred_at.is_some());
    }
}
