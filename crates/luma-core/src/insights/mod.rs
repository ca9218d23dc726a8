//! Insight Aggregator - derived views over spending records
//!
//! Stateless helpers that summarize transactions before they are handed to
//! the assistant. Nothing here reads the dashboard store; callers pass the
//! records in (see [`records_from_transactions`]).
//!
//! ## Views
//!
//! - **Totals** - [`calculate_total`], [`calculate_changes`]
//! - **Grouping** - [`group_by_category`], [`calculate_averages`], [`monthly_summary`]
//! - **Time** - [`period`], [`filter_by_month`], [`analyze_spending_pattern`]
//! - **Patterns** - [`identify_patterns`], [`detect_unusual_transactions`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luma_core::insights::{self, records_from_transactions};
//!
//! let records = records_from_transactions(&store.transactions());
//! let by_category = insights::group_by_category(&records);
//! let averages = insights::calculate_averages(&records);
//! let unusual = insights::detect_unusual_transactions(&records[..10], &averages);
//! ```

pub mod aggregate;
pub mod types;

pub use aggregate::{
    analyze_spending_pattern, calculate_averages, calculate_changes, calculate_total,
    detect_unusual_transactions, filter_by_month, group_by_category, identify_patterns,
    month_name, monthly_summary, period, RECURRING_MIN_REPEATS, UNUSUAL_THRESHOLD,
};
pub use types::{
    records_from_transactions, CategoryAverages, CategoryBreakdown, CategorySummary,
    ChangeDirection, MonthlySummary, PatternSummary, Period, PeriodChange, RecurringPattern,
    SpendingPattern, SpendingRecord, DEFAULT_CATEGORY,
};
