//! Dashboard store
//!
//! Holds the current transactions, clients and stats snapshots. Every update
//! replaces a snapshot wholesale and is broadcast to all current subscribers,
//! including the caller's own subscriptions. No validation is performed: the
//! caller supplies already-validated data.
//!
//! ```rust,ignore
//! let store = DashboardStore::new();
//! let sub = store.subscribe_transactions(|txs| println!("{} transactions", txs.len()));
//! store.update_transactions(loaded);
//! let context = luma_core::context::format_dashboard_context(&store);
//! sub.unsubscribe();
//! ```

mod subject;

pub use subject::{Subject, Subscription};

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{Client, ClientStats, DashboardSnapshot, DashboardStats, Transaction};

/// Current dashboard data with change notification
#[derive(Default)]
pub struct DashboardStore {
    transactions: Subject<Vec<Transaction>>,
    clients: Subject<Vec<Client>>,
    stats: Subject<DashboardStats>,
}

impl DashboardStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a snapshot
    pub fn from_snapshot(snapshot: DashboardSnapshot) -> Self {
        let store = Self::new();
        store.load_snapshot(snapshot);
        store
    }

    // ========== Updates ==========

    /// Replace the transaction list and notify subscribers
    pub fn update_transactions(&self, transactions: Vec<Transaction>) -> Arc<Vec<Transaction>> {
        let malformed = transactions.iter().filter(|t| !t.date.is_valid()).count();
        if malformed > 0 {
            warn!(
                malformed,
                "Transactions with unparseable dates will never match date filters"
            );
        }
        debug!(count = transactions.len(), "Updating transactions");
        self.transactions.next(transactions)
    }

    /// Replace the client list and notify subscribers
    pub fn update_clients(&self, clients: Vec<Client>) -> Arc<Vec<Client>> {
        debug!(count = clients.len(), "Updating clients");
        self.clients.next(clients)
    }

    /// Replace the aggregate stats and notify subscribers
    pub fn update_stats(&self, stats: DashboardStats) -> Arc<DashboardStats> {
        debug!(total_count = stats.total_count, "Updating stats");
        self.stats.next(stats)
    }

    /// Replace all three snapshots (fires all three broadcasts)
    pub fn load_snapshot(&self, snapshot: DashboardSnapshot) {
        self.update_transactions(snapshot.transactions);
        self.update_clients(snapshot.clients);
        self.update_stats(snapshot.stats);
    }

    // ========== Reads ==========

    pub fn transactions(&self) -> Arc<Vec<Transaction>> {
        self.transactions.get()
    }

    pub fn clients(&self) -> Arc<Vec<Client>> {
        self.clients.get()
    }

    pub fn stats(&self) -> DashboardStats {
        *self.stats.get()
    }

    /// Owned copy of the current snapshots
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            transactions: self.transactions().as_ref().clone(),
            clients: self.clients().as_ref().clone(),
            stats: self.stats(),
        }
    }

    // ========== Subscriptions ==========

    pub fn subscribe_transactions<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<Vec<Transaction>>) + Send + Sync + 'static,
    {
        self.transactions.subscribe(listener)
    }

    pub fn subscribe_clients<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<Vec<Client>>) + Send + Sync + 'static,
    {
        self.clients.subscribe(listener)
    }

    pub fn subscribe_stats<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<DashboardStats>) + Send + Sync + 'static,
    {
        self.stats.subscribe(listener)
    }

    // ========== Queries ==========

    /// First client whose name contains `query`, ignoring case
    pub fn find_client_by_name(&self, query: &str) -> Option<Client> {
        let query = query.to_lowercase();
        self.clients()
            .iter()
            .find(|c| c.name.to_lowercase().contains(&query))
            .cloned()
    }

    pub fn transactions_by_client(&self, client_id: i64) -> Vec<Transaction> {
        self.filter_transactions(|t| t.client_id == client_id)
    }

    /// Transactions with `min <= amount <= max`
    pub fn transactions_by_value_range(&self, min: f64, max: f64) -> Vec<Transaction> {
        self.filter_transactions(|t| t.amount >= min && t.amount <= max)
    }

    /// Transactions dated within `start..=end`. Unparseable dates never match.
    pub fn transactions_by_date(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        self.filter_transactions(|t| t.date.is_within(start, end))
    }

    /// Count, sum, average, max and min over a client's transactions
    pub fn client_stats(&self, client_id: i64) -> ClientStats {
        ClientStats::from_transactions(self.transactions_by_client(client_id))
    }

    fn filter_transactions<P>(&self, predicate: P) -> Vec<Transaction>
    where
        P: Fn(&Transaction) -> bool,
    {
        self.transactions()
            .iter()
            .filter(|t| predicate(t))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionDate;
    use std::sync::Mutex;

    fn tx(id: i64, client_id: i64, amount: f64, date: &str) -> Transaction {
        Transaction {
            id,
            client_id,
            name: format!("Holder {}", client_id),
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

    fn client(id: i64, name: &str) -> Client {
        Client {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", id),
            phone: String::new(),
            average_purchase: 0.0,
            cards: vec![],
            transactions: vec![],
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> DashboardStore {
        let store = DashboardStore::new();
        store.update_transactions(vec![
            tx(1, 1, 50.0, "01/01/2024"),
            tx(2, 1, 150.0, "15/01/2024"),
            tx(3, 2, 300.0, "10/02/2024"),
            tx(4, 2, 20.0, "not a date"),
        ]);
        store.update_clients(vec![
            client(1, "Maria Souza"),
            client(2, "João Pereira"),
            client(3, "Mariana Alves"),
        ]);
        store
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = DashboardStore::new();
        assert!(store.transactions().is_empty());
        assert!(store.clients().is_empty());
        assert_eq!(store.stats(), DashboardStats::default());
    }

    #[test]
    fn test_update_broadcasts_to_every_subscriber() {
        let store = DashboardStore::new();
        let first = Arc::new(Mutex::new(None));
        let second = Arc::new(Mutex::new(None));

        let slot = first.clone();
        let _a = store.subscribe_transactions(move |t| *slot.lock().unwrap() = Some(t.clone()));
        let slot = second.clone();
        let _b = store.subscribe_transactions(move |t| *slot.lock().unwrap() = Some(t.clone()));

        let published = store.update_transactions(vec![tx(1, 1, 10.0, "01/01/2024")]);

        let a = first.lock().unwrap().clone().unwrap();
        let b = second.lock().unwrap().clone().unwrap();
        assert!(Arc::ptr_eq(&a, &published));
        assert!(Arc::ptr_eq(&b, &published));
        assert!(Arc::ptr_eq(&store.transactions(), &published));
    }

    #[test]
    fn test_stats_and_clients_broadcast() {
        let store = DashboardStore::new();
        let seen_stats = Arc::new(Mutex::new(Vec::new()));
        let sink = seen_stats.clone();
        let _s = store.subscribe_stats(move |s| sink.lock().unwrap().push(s.total_count));
        let seen_clients = Arc::new(Mutex::new(Vec::new()));
        let sink = seen_clients.clone();
        let _c = store.subscribe_clients(move |c| sink.lock().unwrap().push(c.len()));

        store.update_stats(DashboardStats {
            total_count: 4,
            ..Default::default()
        });
        store.update_clients(vec![client(1, "A"), client(2, "B")]);

        assert_eq!(*seen_stats.lock().unwrap(), vec![0, 4]);
        assert_eq!(*seen_clients.lock().unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_find_client_by_name_case_insensitive_first_match() {
        let store = seeded();
        assert_eq!(store.find_client_by_name("MARIA").unwrap().id, 1);
        assert_eq!(store.find_client_by_name("pereira").unwrap().id, 2);
        assert!(store.find_client_by_name("Zélia").is_none());
    }

    #[test]
    fn test_transactions_by_client() {
        let store = seeded();
        let ids: Vec<i64> = store.transactions_by_client(2).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert!(store.transactions_by_client(99).is_empty());
    }

    #[test]
    fn test_transactions_by_value_range_inclusive() {
        let store = seeded();
        let ids: Vec<i64> = store
            .transactions_by_value_range(50.0, 150.0)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_transactions_by_date_skips_malformed() {
        let store = seeded();
        let ids: Vec<i64> = store
            .transactions_by_date(ymd(2024, 1, 1), ymd(2024, 1, 31))
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);

        let all = store.transactions_by_date(ymd(1900, 1, 1), ymd(2999, 1, 1));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_client_stats() {
        let store = seeded();
        let stats = store.client_stats(1);
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_amount, 200.0);
        assert_eq!(stats.average_amount, 100.0);
        assert_eq!(stats.max_transaction, 150.0);
        assert_eq!(stats.min_transaction, 50.0);
    }

    #[test]
    fn test_client_stats_without_transactions() {
        let store = seeded();
        let stats = store.client_stats(3);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.total_amount, 0.0);
        assert_eq!(stats.average_amount, 0.0);
        assert_eq!(stats.max_transaction, 0.0);
        assert_eq!(stats.min_transaction, 0.0);
        assert!(stats.transactions.is_empty());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = seeded();
        store.update_stats(DashboardStats {
            most_recent: 20.0,
            largest: 300.0,
            total_amount: 520.0,
            total_count: 4,
        });

        let copy = DashboardStore::from_snapshot(store.snapshot());
        assert_eq!(copy.snapshot(), store.snapshot());
    }
}
