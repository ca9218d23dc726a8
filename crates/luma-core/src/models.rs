//! Domain models for Luma
//!
//! Field names on the wire follow the dashboard API (`nome`, `valor`,
//! `dataTransacao`, ...). Rust names are English.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A transaction date as shown on the dashboard (`DD/MM/YYYY`)
///
/// The raw text is kept for display. The parsed date is captured once, at
/// ingestion, and is `None` when the text is not a valid calendar date.
/// Invalid dates never match a date comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionDate {
    raw: String,
    parsed: Option<NaiveDate>,
}

impl TransactionDate {
    /// Display/parse format used by the dashboard
    pub const FORMAT: &'static str = "%d/%m/%Y";

    /// Parse a `DD/MM/YYYY` string. Never fails.
    pub fn parse(raw: &str) -> Self {
        let parsed = NaiveDate::parse_from_str(raw.trim(), Self::FORMAT).ok();
        Self {
            raw: raw.to_string(),
            parsed,
        }
    }

    /// Build from an already valid date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            raw: date.format(Self::FORMAT).to_string(),
            parsed: Some(date),
        }
    }

    /// The text as received
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed calendar date, if the text was valid
    pub fn date(&self) -> Option<NaiveDate> {
        self.parsed
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Inclusive range check. Always false for an invalid date.
    pub fn is_within(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.parsed.is_some_and(|d| d >= start && d <= end)
    }
}

impl fmt::Display for TransactionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.raw)
    }
}

impl From<NaiveDate> for TransactionDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl Serialize for TransactionDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A single recorded monetary movement tied to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Owning client (soft reference, not enforced)
    #[serde(rename = "idCliente")]
    pub client_id: i64,
    /// Holder name
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// Amount in BRL, non-negative by caller contract
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "dataTransacao")]
    pub date: TransactionDate,
    #[serde(rename = "nCartao", default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(rename = "tpCartao", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(rename = "vencimento", default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Free-text classification label
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An account holder with associated transactions and payment instruments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "valorMedioCompra", default)]
    pub average_purchase: f64,
    /// Card references as returned by the dashboard API
    #[serde(rename = "cartoes", default)]
    pub cards: Vec<serde_json::Value>,
    /// Transaction references as returned by the dashboard API
    #[serde(rename = "transacoes", default)]
    pub transactions: Vec<serde_json::Value>,
}

/// Aggregate dashboard snapshot, replaced wholesale on every update
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Amount of the most recent transaction
    #[serde(rename = "transRecente")]
    pub most_recent: f64,
    /// Largest transaction amount
    #[serde(rename = "maiorTransacao")]
    pub largest: f64,
    /// Sum of all transaction amounts
    #[serde(rename = "totalTransacoes")]
    pub total_amount: f64,
    /// Number of transactions
    #[serde(rename = "totalTransacoesFeitas")]
    pub total_count: u64,
}

/// Per-client statistics over the current transaction snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientStats {
    pub total_transactions: usize,
    pub total_amount: f64,
    /// 0 when the client has no transactions
    pub average_amount: f64,
    pub max_transaction: f64,
    pub min_transaction: f64,
    pub transactions: Vec<Transaction>,
}

impl ClientStats {
    /// Compute statistics over a client's transactions
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let count = transactions.len();
        let total: f64 = transactions.iter().map(|t| t.amount).sum();

        let (max, min) = if count == 0 {
            (0.0, 0.0)
        } else {
            transactions.iter().fold((f64::MIN, f64::MAX), |(max, min), t| {
                (max.max(t.amount), min.min(t.amount))
            })
        };

        Self {
            total_transactions: count,
            total_amount: total,
            average_amount: if count > 0 { total / count as f64 } else { 0.0 },
            max_transaction: max,
            min_transaction: min,
            transactions,
        }
    }
}

/// The `{transactions, clients, stats}` triple held by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub stats: DashboardStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: f64) -> Transaction {
        Transaction {
            id: 1,
            client_id: 1,
            name: "Ana".into(),
            phone: String::new(),
            email: String::new(),
            amount,
            date: TransactionDate::parse("10/03/2024"),
            card_number: None,
            cvv: None,
            card_type: None,
            expiry: None,
            category: None,
            description: None,
        }
    }

    #[test]
    fn test_transaction_date_parses_day_first() {
        let date = TransactionDate::parse("05/11/2024");
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 11, 5));
        assert_eq!(date.as_str(), "05/11/2024");
    }

    #[test]
    fn test_transaction_date_invalid_never_matches() {
        let date = TransactionDate::parse("31/02/2024");
        assert!(!date.is_valid());

        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2100, 1, 1).unwrap();
        assert!(!date.is_within(start, end));

        assert!(!TransactionDate::parse("2024-02-10").is_valid());
        assert!(!TransactionDate::parse("").is_valid());
    }

    #[test]
    fn test_transaction_date_roundtrip_keeps_raw_text() {
        let date = TransactionDate::from_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(date.to_string(), "02/01/2024");
    }

    #[test]
    fn test_transaction_deserializes_dashboard_fields() {
        let json = r#"{
            "id": 7,
            "nome": "Carlos Lima",
            "telefone": "11999990000",
            "email": "carlos@example.com",
            "valor": 150.5,
            "dataTransacao": "15/01/2024",
            "nCartao": "4111111111111111",
            "tpCartao": "credito",
            "idCliente": 3
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, 7);
        assert_eq!(tx.client_id, 3);
        assert_eq!(tx.name, "Carlos Lima");
        assert_eq!(tx.amount, 150.5);
        assert_eq!(tx.date.date(), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(tx.card_type.as_deref(), Some("credito"));
        assert!(tx.cvv.is_none());
        assert!(tx.category.is_none());
    }

    #[test]
    fn test_malformed_date_does_not_fail_deserialization() {
        let json = r#"{"id":1,"nome":"X","valor":1.0,"dataTransacao":"ontem","idCliente":1}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(!tx.date.is_valid());
        assert_eq!(tx.date.as_str(), "ontem");
    }

    #[test]
    fn test_client_stats_empty() {
        let stats = ClientStats::from_transactions(vec![]);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.total_amount, 0.0);
        assert_eq!(stats.average_amount, 0.0);
        assert_eq!(stats.max_transaction, 0.0);
        assert_eq!(stats.min_transaction, 0.0);
    }

    #[test]
    fn test_client_stats_values() {
        let stats = ClientStats::from_transactions(vec![tx(10.0), tx(30.0), tx(20.0)]);
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.total_amount, 60.0);
        assert_eq!(stats.average_amount, 20.0);
        assert_eq!(stats.max_transaction, 30.0);
        assert_eq!(stats.min_transaction, 10.0);
    }

    #[test]
    fn test_stats_wire_names() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"transRecente":10,"maiorTransacao":99.9,"totalTransacoes":500,"totalTransacoesFeitas":12}"#,
        )
        .unwrap();
        assert_eq!(stats.most_recent, 10.0);
        assert_eq!(stats.largest, 99.9);
        assert_eq!(stats.total_amount, 500.0);
        assert_eq!(stats.total_count, 12);
    }
}
