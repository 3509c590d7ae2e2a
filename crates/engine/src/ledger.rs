//! The ledger engine: store, filter, selection and edit session wired to an
//! injected gateway.
//!
//! Every operation that talks to the gateway follows the same policy: on
//! failure the message lands in the error slot, the error is returned, and
//! store, selection and edit session are left exactly as they were. A failed
//! [`Ledger::commit_edit`] also keeps its draft, so it can be retried.

use crate::{
    Balances, Currency, DraftField, EditSession, EngineError, ExportFile, Filter, LedgerGateway,
    LedgerStore, Money, NewRecord, RecordId, ReportExporter, ResultEngine, Selection,
    TransactionRecord, balance, filter,
};

/// Identifies one issued reload request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReloadToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The response replaced the store.
    Applied,
    /// A newer request or a local mutation superseded this one; the response
    /// was dropped.
    Stale,
}

#[derive(Debug)]
pub struct Ledger<G> {
    gateway: G,
    store: LedgerStore,
    filter: Filter,
    edit: EditSession,
    exporter: ReportExporter,
    generation: u64,
    pending: usize,
    error: Option<String>,
}

impl<G: LedgerGateway> Ledger<G> {
    pub fn new(gateway: G, filter: Filter) -> Self {
        Self {
            gateway,
            store: LedgerStore::new(),
            filter,
            edit: EditSession::Idle,
            exporter: ReportExporter::default(),
            generation: 0,
            pending: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.exporter = ReportExporter::new(currency);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        self.store.selection()
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn currency(&self) -> Currency {
        self.exporter.currency()
    }

    /// `true` while a reload, insert, delete or commit is waiting on the
    /// gateway.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// Message of the last failed gateway call, if not yet cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn surface(&mut self, err: EngineError) -> EngineError {
        tracing::warn!("{err}");
        self.error = Some(err.to_string());
        err
    }

    fn settle(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    fn is_visible(&self, id: RecordId) -> bool {
        self.store
            .get(id)
            .is_some_and(|record| self.filter.matches(record))
    }

    /// Selection and edits only act on rows of the visible statement.
    fn ensure_visible(&self, id: RecordId) -> ResultEngine<()> {
        if !self.store.contains(id) {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        if !self.is_visible(id) {
            return Err(EngineError::NotVisible(id.to_string()));
        }
        Ok(())
    }

    /// Drops selected ids and the open edit that the filter no longer shows.
    fn retain_visible(&mut self) {
        let hidden: Vec<RecordId> = self
            .store
            .selection()
            .iter()
            .copied()
            .filter(|id| !self.is_visible(*id))
            .collect();
        if !hidden.is_empty() {
            tracing::debug!("unselecting {} hidden record(s)", hidden.len());
            let next = self.store.selection().without(&hidden);
            self.store.set_selection(next);
        }
        if let Some(id) = self.edit.active_id()
            && !self.is_visible(id)
        {
            tracing::debug!("record {id} left the view, closing its edit");
            self.edit.cancel();
        }
    }

    /// Invalidates every reload issued so far.
    fn advance_generation(&mut self) {
        self.generation += 1;
    }

    // Reload

    /// Issues a reload request. Only the response to the most recently issued
    /// token is applied by [`finish_reload`](Self::finish_reload).
    pub fn begin_reload(&mut self) -> ReloadToken {
        self.advance_generation();
        self.pending += 1;
        tracing::debug!("reload #{} issued", self.generation);
        ReloadToken(self.generation)
    }

    /// Applies a fetch response if `token` is still the latest request.
    ///
    /// A stale response is dropped whether it succeeded or failed.
    pub fn finish_reload(
        &mut self,
        token: ReloadToken,
        result: ResultEngine<Vec<TransactionRecord>>,
    ) -> ResultEngine<ReloadOutcome> {
        self.settle();
        if token.0 != self.generation {
            tracing::warn!(
                "dropping stale reload #{} (latest is #{})",
                token.0,
                self.generation
            );
            return Ok(ReloadOutcome::Stale);
        }

        let records = result.map_err(|err| self.surface(err))?;
        tracing::debug!("reload #{} applied: {} records", token.0, records.len());
        self.store.replace_all(records);
        if let Some(id) = self.edit.active_id()
            && !self.store.contains(id)
        {
            tracing::debug!("record {id} vanished, closing its edit");
            self.edit.cancel();
        }
        self.error = None;
        Ok(ReloadOutcome::Applied)
    }

    /// Fetches every record and replaces the store. Clears the selection.
    pub async fn reload(&mut self) -> ResultEngine<ReloadOutcome> {
        let token = self.begin_reload();
        let result = self.gateway.fetch_all().await;
        self.finish_reload(token, result)
    }

    // Mutations

    /// Inserts a record, then reloads since the backend assigns the id.
    pub async fn insert(&mut self, record: NewRecord) -> ResultEngine<()> {
        self.pending += 1;
        let result = self.gateway.insert(&record).await;
        self.settle();
        result.map_err(|err| self.surface(err))?;

        tracing::info!("inserted {} record dated {}", record.kind, record.date);
        self.reload().await?;
        Ok(())
    }

    pub async fn delete_one(&mut self, id: RecordId) -> ResultEngine<()> {
        if !self.store.contains(id) {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }

        self.pending += 1;
        let result = self.gateway.delete_one(id).await;
        self.settle();
        result.map_err(|err| self.surface(err))?;

        self.store.apply_delete(id);
        if self.edit.active_id() == Some(id) {
            self.edit.cancel();
        }
        self.advance_generation();
        self.error = None;
        tracing::info!("deleted record {id}");
        Ok(())
    }

    // Selection

    /// Flips selection of `id`, which must be in the visible statement.
    /// Returns whether it is selected afterwards.
    pub fn toggle_selection(&mut self, id: RecordId) -> ResultEngine<bool> {
        self.ensure_visible(id)?;
        let next = self.store.selection().toggled(id);
        let selected = next.contains(id);
        self.store.set_selection(next);
        Ok(selected)
    }

    pub fn clear_selection(&mut self) {
        self.store.set_selection(Selection::new());
    }

    /// Deletes every selected record in one gateway call and returns how
    /// many were removed. An empty selection is a no-op that never reaches
    /// the gateway.
    pub async fn bulk_delete(&mut self) -> ResultEngine<usize> {
        let ids = self.store.selection().ids();
        if ids.is_empty() {
            tracing::debug!("bulk delete with empty selection ignored");
            return Ok(0);
        }

        self.pending += 1;
        let result = self.gateway.delete_many(&ids).await;
        self.settle();
        result.map_err(|err| self.surface(err))?;

        let removed = self.store.apply_delete_many(&ids);
        self.clear_selection();
        if let Some(active) = self.edit.active_id()
            && ids.contains(&active)
        {
            self.edit.cancel();
        }
        self.advance_generation();
        self.error = None;
        tracing::info!("bulk deleted {removed} record(s)");
        Ok(removed)
    }

    // Edit session

    /// Opens an inline edit on a visible record, replacing any edit in
    /// progress.
    pub fn start_edit(&mut self, id: RecordId) -> ResultEngine<()> {
        self.ensure_visible(id)?;
        let record = self
            .store
            .get(id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        self.edit.start(record);
        Ok(())
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.edit.cancel()
    }

    pub fn mutate_draft(&mut self, field: DraftField) -> ResultEngine<()> {
        self.edit.mutate(field)
    }

    /// Sends the draft of `id` to the gateway.
    ///
    /// On success the store takes the patch and the session goes back to
    /// `Idle`; a record whose date moved triggers a full reload. On failure
    /// the session stays `Editing` with the draft intact.
    pub async fn commit_edit(&mut self, id: RecordId) -> ResultEngine<()> {
        let patch = self.edit.patch_for(id)?;

        self.pending += 1;
        let result = self.gateway.update(id, &patch).await;
        self.settle();
        result.map_err(|err| self.surface(err))?;

        self.edit.cancel();
        self.advance_generation();
        self.error = None;
        tracing::info!("updated record {id}");

        let in_place = matches!(self.store.apply_update(id, &patch), Ok(false));
        if !in_place {
            self.reload().await?;
        }
        Ok(())
    }

    // Derived views

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Changing the filter unselects rows it hides and closes an edit on a
    /// hidden row.
    pub fn set_period(&mut self, month: u32, year: i32) -> ResultEngine<()> {
        self.filter.set_period(month, year)?;
        self.retain_visible();
        Ok(())
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.set_search(search);
        self.retain_visible();
    }

    /// Visible statement for the current filter, in canonical order.
    pub fn view(&self) -> Vec<&TransactionRecord> {
        filter::view(&self.store, &self.filter)
    }

    pub fn scoped_sum(&self) -> Money {
        balance::scoped_sum(&self.store, &self.filter)
    }

    pub fn global_sum(&self) -> Money {
        balance::global_sum(&self.store)
    }

    pub fn balances(&self) -> Balances {
        Balances::compute(&self.store, &self.filter)
    }

    // Exports

    pub fn export_csv(&self) -> ResultEngine<ExportFile> {
        self.exporter.csv(&self.view(), &self.filter)
    }

    pub fn export_pdf(&self) -> ResultEngine<ExportFile> {
        self.exporter.pdf(&self.view(), &self.filter)
    }
}
