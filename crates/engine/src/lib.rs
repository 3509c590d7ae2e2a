//! Ledger state engine of the finance tracker.
//!
//! The engine caches transaction records fetched through a [`LedgerGateway`],
//! derives the filtered statement and its balances, and drives multi-selection,
//! inline editing and report exports. It performs no I/O of its own: the
//! gateway is injected into [`Ledger::new`].
//!
//! ```rust,ignore
//! let mut ledger = Ledger::new(gateway, Filter::new(1, 2025)?);
//! ledger.reload().await?;
//! for record in ledger.view() {
//!     println!("{} {}", record.date, record.description);
//! }
//! println!("month: {}  overall: {}", ledger.scoped_sum(), ledger.global_sum());
//! ```

pub use balance::Balances;
pub use currency::Currency;
pub use edit::{Draft, DraftField, EditSession};
pub use error::EngineError;
pub use export::{
    DISPLAY_DATE_FORMAT, ExportFile, ExportFormat, ReportExporter, ReportLayout, ReportRow,
};
pub use filter::Filter;
pub use gateway::LedgerGateway;
pub use ledger::{Ledger, ReloadOutcome, ReloadToken};
pub use money::Money;
pub use record::{
    NewRecord, RecordId, RecordPatch, TransactionKind, TransactionRecord, canonical_cmp,
    normalize_date,
};
pub use selection::Selection;
pub use session::{EntitlementProvider, SessionProvider, UserId};
pub use store::LedgerStore;

pub mod balance;
mod currency;
mod edit;
mod error;
mod export;
pub mod filter;
mod gateway;
mod ledger;
mod money;
mod record;
mod selection;
mod session;
mod store;

pub type ResultEngine<T> = Result<T, EngineError>;
