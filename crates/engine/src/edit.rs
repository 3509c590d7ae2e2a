//! Inline edit state machine.
//!
//! ```text
//!          start(id)                 start(other) discards the draft
//!   Idle ───────────► Editing(id) ◄──────────────┐
//!    ▲                  │   │  └─────────────────┘
//!    │ cancel / commit  │   │ mutate(field), failed commit
//!    └──────────────────┘   └──► stays Editing(id)
//! ```
//!
//! At most one edit exists at a time, and a draft cannot exist without the id
//! it belongs to.

use crate::{
    EngineError, Money, RecordId, RecordPatch, ResultEngine, TransactionKind,
    TransactionRecord, record::normalize_date,
};

/// Working copy of a record's editable fields, kept as raw input text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draft {
    pub description: String,
    pub amount: String,
    pub kind: TransactionKind,
    pub date: String,
}

impl Draft {
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            description: record.description.clone(),
            amount: record.amount.to_plain_string(),
            kind: record.kind,
            date: record.date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Builds the update payload. An unparsable amount becomes `0`; an
    /// unparsable date is rejected.
    pub fn to_patch(&self) -> ResultEngine<RecordPatch> {
        Ok(RecordPatch {
            description: Some(self.description.clone()),
            amount: Some(Money::parse_lenient(&self.amount)),
            kind: Some(self.kind),
            date: Some(normalize_date(&self.date)?),
        })
    }
}

/// One field change applied to the active draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftField {
    Description(String),
    Amount(String),
    Kind(TransactionKind),
    Date(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { id: RecordId, draft: Draft },
}

impl EditSession {
    /// Enters `Editing` for `record`, seeding the draft from it. Any previous
    /// draft is dropped.
    pub fn start(&mut self, record: &TransactionRecord) {
        if let Self::Editing { id, .. } = self
            && *id != record.id
        {
            tracing::debug!("discarding draft for record {id}");
        }
        *self = Self::Editing {
            id: record.id,
            draft: Draft::from_record(record),
        };
    }

    /// Back to `Idle`. Returns whether a draft was discarded.
    pub fn cancel(&mut self) -> bool {
        let was_editing = self.is_editing();
        *self = Self::Idle;
        was_editing
    }

    pub fn mutate(&mut self, field: DraftField) -> ResultEngine<()> {
        let Self::Editing { draft, .. } = self else {
            return Err(EngineError::NoActiveEdit);
        };
        match field {
            DraftField::Description(value) => draft.description = value,
            DraftField::Amount(value) => draft.amount = value,
            DraftField::Kind(value) => draft.kind = value,
            DraftField::Date(value) => draft.date = value,
        }
        Ok(())
    }

    /// Checks that `id` is the record being edited and builds its patch.
    /// The session itself is left as is.
    pub fn patch_for(&self, id: RecordId) -> ResultEngine<RecordPatch> {
        match self {
            Self::Idle => Err(EngineError::NoActiveEdit),
            Self::Editing { id: active, .. } if *active != id => Err(EngineError::EditMismatch {
                active: active.to_string(),
                requested: id.to_string(),
            }),
            Self::Editing { draft, .. } => draft.to_patch(),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn active_id(&self) -> Option<RecordId> {
        match self {
            Self::Idle => None,
            Self::Editing { id, .. } => Some(*id),
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Self::Idle => None,
            Self::Editing { draft, .. } => Some(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(id: i64) -> TransactionRecord {
        TransactionRecord {
            id: RecordId(id),
            description: "Rent".to_string(),
            amount: Money::new(150_000),
            kind: TransactionKind::Outflow,
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        }
    }

    #[test]
    fn start_seeds_draft_from_record() {
        let mut session = EditSession::default();
        session.start(&record(1));
        let draft = session.draft().unwrap();
        assert_eq!(draft.amount, "1500.00");
        assert_eq!(draft.date, "2025-01-05");
        assert_eq!(draft.kind, TransactionKind::Outflow);
        assert_eq!(session.active_id(), Some(RecordId(1)));
    }

    #[test]
    fn starting_another_edit_discards_draft() {
        let mut session = EditSession::default();
        session.start(&record(1));
        session
            .mutate(DraftField::Description("typed".to_string()))
            .unwrap();
        session.start(&record(2));
        assert_eq!(session.active_id(), Some(RecordId(2)));
        assert_eq!(session.draft().unwrap().description, "Rent");
    }

    #[test]
    fn mutate_requires_active_edit() {
        let mut session = EditSession::Idle;
        assert_eq!(
            session.mutate(DraftField::Amount("1".to_string())),
            Err(EngineError::NoActiveEdit)
        );
    }

    #[test]
    fn cancel_discards_without_side_effects() {
        let mut session = EditSession::default();
        assert!(!session.cancel());
        session.start(&record(1));
        assert!(session.cancel());
        assert_eq!(session, EditSession::Idle);
    }

    #[test]
    fn patch_for_checks_active_id() {
        let mut session = EditSession::default();
        assert_eq!(session.patch_for(RecordId(1)), Err(EngineError::NoActiveEdit));

        session.start(&record(1));
        assert!(matches!(
            session.patch_for(RecordId(2)),
            Err(EngineError::EditMismatch { .. })
        ));

        session.mutate(DraftField::Amount("twelve".to_string())).unwrap();
        session.mutate(DraftField::Kind(TransactionKind::Inflow)).unwrap();
        let patch = session.patch_for(RecordId(1)).unwrap();
        assert_eq!(patch.amount, Some(Money::ZERO));
        assert_eq!(patch.kind, Some(TransactionKind::Inflow));
    }

    #[test]
    fn bad_draft_date_is_rejected() {
        let mut session = EditSession::default();
        session.start(&record(1));
        session.mutate(DraftField::Date("not a date".to_string())).unwrap();
        assert!(matches!(
            session.patch_for(RecordId(1)),
            Err(EngineError::InvalidDate(_))
        ));
    }
}
