//! Signed sums over the store.
//!
//! Both sums are recomputed from the store on every call. There is no running
//! total to keep in sync with partial updates.

use crate::{Filter, LedgerStore, Money};

/// Signed sum of records in the filter's month/year, search text ignored.
pub fn scoped_sum(store: &LedgerStore, filter: &Filter) -> Money {
    store
        .records()
        .iter()
        .filter(|record| filter.matches_period(record))
        .map(|record| record.signed_amount())
        .sum()
}

/// Signed sum of every record in the store.
pub fn global_sum(store: &LedgerStore) -> Money {
    store
        .records()
        .iter()
        .map(|record| record.signed_amount())
        .sum()
}

/// Both sums at once, for callers that render them together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Balances {
    pub scoped: Money,
    pub global: Money,
}

impl Balances {
    pub fn compute(store: &LedgerStore, filter: &Filter) -> Self {
        Self {
            scoped: scoped_sum(store, filter),
            global: global_sum(store),
        }
    }
}
