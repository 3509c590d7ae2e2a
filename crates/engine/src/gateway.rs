//! Seam between the ledger and the remote datastore.

use std::future::Future;

use crate::{NewRecord, RecordId, RecordPatch, ResultEngine, TransactionRecord};

/// Backend calls consumed by [`Ledger`](crate::Ledger).
///
/// Every call is single-shot: no retry, no cancellation. A failure must be
/// reported as [`EngineError::OperationFailed`](crate::EngineError::OperationFailed)
/// and callers treat it as a remote no-op. Implementations are scoped to one
/// user identity at construction time.
pub trait LedgerGateway {
    /// All records visible to the scoped user.
    fn fetch_all(&self) -> impl Future<Output = ResultEngine<Vec<TransactionRecord>>> + Send;

    fn insert(&self, record: &NewRecord) -> impl Future<Output = ResultEngine<()>> + Send;

    fn update(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> impl Future<Output = ResultEngine<()>> + Send;

    fn delete_one(&self, id: RecordId) -> impl Future<Output = ResultEngine<()>> + Send;

    fn delete_many(&self, ids: &[RecordId]) -> impl Future<Output = ResultEngine<()>> + Send;
}
