//! Transaction records and their canonical ordering.
//!
//! A [`TransactionRecord`] is one dated income/expense entry as stored by the
//! remote datastore. The id is assigned by the backend and never changes.

use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// Opaque, backend-assigned record identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Inflow,
    Outflow,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }

    /// Aggregation sign: `+1` for inflows, `-1` for outflows.
    pub fn sign(self) -> i64 {
        match self {
            Self::Inflow => 1,
            Self::Outflow => -1,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inflow" | "entrada" => Ok(Self::Inflow),
            "outflow" | "saida" | "saída" => Ok(Self::Outflow),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: RecordId,
    pub description: String,
    /// Non-negative magnitude; the sign comes from `kind`.
    pub amount: Money,
    pub kind: TransactionKind,
    pub date: NaiveDate,
}

impl TransactionRecord {
    pub fn signed_amount(&self) -> Money {
        Money::new(self.amount.cents() * self.kind.sign())
    }

    /// Whether the record falls in the given calendar month.
    pub fn in_period(&self, month: u32, year: i32) -> bool {
        use chrono::Datelike;
        self.date.month() == month && self.date.year() == year
    }
}

/// Date descending, then id descending.
pub fn canonical_cmp(a: &TransactionRecord, b: &TransactionRecord) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

/// Keeps only the calendar date of an ISO date or timestamp.
///
/// Accepts `2025-01-05`, `2025-01-05T10:00:00Z` and `2025-01-05 10:00:00`.
pub fn normalize_date(input: &str) -> ResultEngine<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| EngineError::InvalidDate(format!("{input:?}: {err}")))
}

/// Insert payload: a record the backend has not assigned an id to yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub description: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub date: NaiveDate,
}

impl NewRecord {
    /// Builds an insert payload from raw form input.
    ///
    /// The amount never fails (see [`Money::parse_lenient`]); the date is
    /// required.
    pub fn from_form(
        description: &str,
        amount: &str,
        kind: TransactionKind,
        date: &str,
    ) -> ResultEngine<Self> {
        Ok(Self {
            description: description.trim().to_string(),
            amount: Money::parse_lenient(amount),
            kind,
            date: normalize_date(date)?,
        })
    }
}

/// Partial update of a record. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub kind: Option<TransactionKind>,
    pub date: Option<NaiveDate>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.date.is_none()
    }

    /// Merges the patch into `record`. Returns `true` when the date changed,
    /// i.e. the record may have to move in canonical order.
    pub fn apply_to(&self, record: &mut TransactionRecord) -> bool {
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        match self.date {
            Some(date) if date != record.date => {
                record.date = date;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, date: &str) -> TransactionRecord {
        TransactionRecord {
            id: RecordId(id),
            description: String::new(),
            amount: Money::new(100),
            kind: TransactionKind::Inflow,
            date: normalize_date(date).unwrap(),
        }
    }

    #[test]
    fn canonical_order_is_date_then_id_descending() {
        let mut records = vec![
            record(1, "2025-01-05"),
            record(3, "2025-01-10"),
            record(2, "2025-01-10"),
            record(4, "2024-12-31"),
        ];
        records.sort_by(canonical_cmp);
        let ids: Vec<i64> = records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn normalize_date_strips_time() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(normalize_date("2025-01-05").unwrap(), expected);
        assert_eq!(normalize_date("2025-01-05T23:59:00+00:00").unwrap(), expected);
        assert_eq!(normalize_date(" 2025-01-05 10:00:00 ").unwrap(), expected);
        assert!(normalize_date("05/01/2025").is_err());
        assert!(normalize_date("").is_err());
    }

    #[test]
    fn kind_parses_legacy_labels() {
        assert_eq!(TransactionKind::try_from("entrada").unwrap(), TransactionKind::Inflow);
        assert_eq!(TransactionKind::try_from("Saida").unwrap(), TransactionKind::Outflow);
        assert_eq!(TransactionKind::try_from("outflow").unwrap(), TransactionKind::Outflow);
        assert!(TransactionKind::try_from("transfer").is_err());
    }

    #[test]
    fn signed_amount_follows_kind() {
        let mut r = record(1, "2025-01-05");
        assert_eq!(r.signed_amount(), Money::new(100));
        r.kind = TransactionKind::Outflow;
        assert_eq!(r.signed_amount(), Money::new(-100));
    }

    #[test]
    fn patch_reports_date_moves() {
        let mut r = record(1, "2025-01-05");
        let same_day = RecordPatch {
            description: Some("rent".to_string()),
            date: Some(r.date),
            ..RecordPatch::default()
        };
        assert!(!same_day.apply_to(&mut r));
        assert_eq!(r.description, "rent");

        let moved = RecordPatch {
            date: NaiveDate::from_ymd_opt(2025, 2, 1),
            ..RecordPatch::default()
        };
        assert!(moved.apply_to(&mut r));
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }

    #[test]
    fn form_amount_is_lenient() {
        let new = NewRecord::from_form(" lunch ", "abc", TransactionKind::Outflow, "2025-03-01")
            .unwrap();
        assert_eq!(new.amount, Money::ZERO);
        assert_eq!(new.description, "lunch");
        assert!(NewRecord::from_form("x", "1", TransactionKind::Outflow, "").is_err());
    }
}
