//! Derivation of the visible statement from the store and the filter state.

use chrono::{Datelike, Utc};
use chrono_tz::Tz;

use crate::{EngineError, LedgerStore, ResultEngine, TransactionRecord};

/// Transient filter state: one calendar month plus free-text search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    month: u32,
    year: i32,
    search: String,
}

impl Filter {
    pub fn new(month: u32, year: i32) -> ResultEngine<Self> {
        validate_month(month)?;
        Ok(Self {
            month,
            year,
            search: String::new(),
        })
    }

    /// Current month and year as seen from the `tz` time zone.
    pub fn current(tz: Tz) -> Self {
        let today = Utc::now().with_timezone(&tz).date_naive();
        Self {
            month: today.month(),
            year: today.year(),
            search: String::new(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_period(&mut self, month: u32, year: i32) -> ResultEngine<()> {
        validate_month(month)?;
        self.month = month;
        self.year = year;
        Ok(())
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.set_search(search);
        self
    }

    /// Month/year match only; search text is ignored.
    pub fn matches_period(&self, record: &TransactionRecord) -> bool {
        record.in_period(self.month, self.year)
    }

    /// Month/year match and, when search text is set, a case-insensitive
    /// substring match on the description.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if !self.matches_period(record) {
            return false;
        }
        let needle = self.search.trim();
        needle.is_empty()
            || record
                .description
                .to_lowercase()
                .contains(&needle.to_lowercase())
    }
}

fn validate_month(month: u32) -> ResultEngine<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidPeriod(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    Ok(())
}

/// The visible statement: records matching `filter`, in canonical order.
pub fn view<'a>(store: &'a LedgerStore, filter: &Filter) -> Vec<&'a TransactionRecord> {
    let visible: Vec<&TransactionRecord> = store
        .records()
        .iter()
        .filter(|record| filter.matches(record))
        .collect();
    tracing::debug!(
        "view {:02}/{} search={:?}: {} of {} records",
        filter.month,
        filter.year,
        filter.search,
        visible.len(),
        store.len()
    );
    visible
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Money, RecordId, TransactionKind};

    fn store() -> LedgerStore {
        let record = |id: i64, y: i32, m: u32, d: u32, description: &str| TransactionRecord {
            id: RecordId(id),
            description: description.to_string(),
            amount: Money::new(100),
            kind: TransactionKind::Inflow,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        };
        let mut store = LedgerStore::new();
        store.replace_all(vec![
            record(1, 2025, 1, 5, "Groceries"),
            record(2, 2025, 1, 10, "Salary"),
            record(3, 2025, 2, 1, "groceries again"),
            record(4, 2024, 1, 20, "Old groceries"),
        ]);
        store
    }

    fn ids(records: &[&TransactionRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn filters_by_month_and_year() {
        let store = store();
        let filter = Filter::new(1, 2025).unwrap();
        assert_eq!(ids(&view(&store, &filter)), vec![2, 1]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = store();
        let filter = Filter::new(1, 2025).unwrap().with_search("GROC");
        assert_eq!(ids(&view(&store, &filter)), vec![1]);

        let filter = Filter::new(1, 2025).unwrap().with_search("   ");
        assert_eq!(ids(&view(&store, &filter)), vec![2, 1]);
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(Filter::new(0, 2025).is_err());
        assert!(Filter::new(13, 2025).is_err());
        let mut filter = Filter::new(12, 2025).unwrap();
        assert!(filter.set_period(13, 2025).is_err());
        assert_eq!(filter.month(), 12);
    }

    #[test]
    fn current_period_is_valid() {
        let filter = Filter::current(chrono_tz::America::Sao_Paulo);
        assert!((1..=12).contains(&filter.month()));
        assert!(filter.search().is_empty());
    }
}
