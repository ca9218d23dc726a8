//! Pure aggregation over spending records
//!
//! Every function here is total: empty input gives zero, empty or `None`
//! results, never an error.

use std::collections::HashMap;

use chrono::{Datelike, Timelike};

use super::types::{
    CategoryAverages, CategoryBreakdown, CategorySummary, ChangeDirection, MonthlySummary,
    PatternSummary, Period, PeriodChange, RecurringPattern, SpendingPattern, SpendingRecord,
};

/// A record is unusual above this multiple of its category average
pub const UNUSUAL_THRESHOLD: f64 = 1.5;

/// A description/amount pair is recurring once it occurs more than this
pub const RECURRING_MIN_REPEATS: usize = 2;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Sum of amounts, missing amounts count as 0
pub fn calculate_total(records: &[SpendingRecord]) -> f64 {
    records.iter().map(SpendingRecord::amount_or_zero).sum()
}

/// Count and total per category
pub fn group_by_category(records: &[SpendingRecord]) -> CategoryBreakdown {
    let mut grouped = CategoryBreakdown::new();
    for record in records {
        let entry = grouped
            .entry(record.category_label().to_string())
            .or_insert_with(CategorySummary::default);
        entry.count += 1;
        entry.total += record.amount_or_zero();
    }
    grouped
}

/// Earliest and latest timestamps, `None` if nothing is dated
pub fn period(records: &[SpendingRecord]) -> Option<Period> {
    let mut dates = records.iter().filter_map(|r| r.occurred_at);
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(start, end), d| (start.min(d), end.max(d)));
    Some(Period { start, end })
}

/// Records dated in the given month (1 = January) and year
pub fn filter_by_month(records: &[SpendingRecord], month: u32, year: i32) -> Vec<SpendingRecord> {
    records
        .iter()
        .filter(|r| {
            r.occurred_at
                .is_some_and(|d| d.month() == month && d.year() == year)
        })
        .cloned()
        .collect()
}

/// Total, count, categories and average for one month
pub fn monthly_summary(records: &[SpendingRecord], month: u32, year: i32) -> MonthlySummary {
    let filtered = filter_by_month(records, month, year);
    let total = calculate_total(&filtered);
    let count = filtered.len();
    MonthlySummary {
        total,
        count,
        categories: group_by_category(&filtered),
        average: if count > 0 { total / count as f64 } else { 0.0 },
    }
}

/// Amount per weekday and count per hour of day
pub fn analyze_spending_pattern(records: &[SpendingRecord]) -> SpendingPattern {
    let mut pattern = SpendingPattern::default();
    for record in records {
        let Some(at) = record.occurred_at else {
            continue;
        };
        pattern.by_weekday[at.weekday().num_days_from_sunday() as usize] +=
            record.amount_or_zero();
        pattern.by_hour[at.hour() as usize] += 1;
    }
    pattern
}

/// Change in total between two periods
///
/// Direction follows the percentage, so an empty previous period (percent 0)
/// reports a decrease even when the current period has spending.
pub fn calculate_changes(current: &[SpendingRecord], previous: &[SpendingRecord]) -> PeriodChange {
    let current_total = calculate_total(current);
    let previous_total = calculate_total(previous);
    let absolute = current_total - previous_total;

    let percent = if previous_total > 0.0 {
        absolute / previous_total * 100.0
    } else {
        0.0
    };

    PeriodChange {
        absolute,
        percent,
        direction: if percent > 0.0 {
            ChangeDirection::Increase
        } else {
            ChangeDirection::Decrease
        },
    }
}

/// Description/amount pairs occurring more than twice, in first-seen order
pub fn identify_patterns(records: &[SpendingRecord]) -> PatternSummary {
    let mut order: Vec<RecurringPattern> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let description = record.description.clone().unwrap_or_default();
        let amount = record.amount_or_zero();
        let key = format!("{}_{}", description, amount);

        match index.get(&key) {
            Some(&i) => order[i].occurrences += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push(RecurringPattern {
                    pattern: key,
                    description,
                    amount,
                    occurrences: 1,
                });
            }
        }
    }

    PatternSummary {
        recurring_transactions: order
            .into_iter()
            .filter(|p| p.occurrences > RECURRING_MIN_REPEATS)
            .collect(),
    }
}

/// Mean amount per category
pub fn calculate_averages(records: &[SpendingRecord]) -> CategoryAverages {
    group_by_category(records)
        .into_iter()
        .map(|(category, summary)| (category, summary.total / summary.count as f64))
        .collect()
}

/// Records whose amount exceeds 1.5x their category average
///
/// A category with no average counts as 0, so any positive amount in it is
/// flagged. Records without an amount are never flagged.
pub fn detect_unusual_transactions(
    recent: &[SpendingRecord],
    averages: &CategoryAverages,
) -> Vec<SpendingRecord> {
    recent
        .iter()
        .filter(|r| {
            let average = averages.get(r.category_label()).copied().unwrap_or(0.0);
            r.amount.is_some_and(|amount| amount > average * UNUSUAL_THRESHOLD)
        })
        .cloned()
        .collect()
}

/// Portuguese month name for 1..=12
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Mês desconhecido")
}
