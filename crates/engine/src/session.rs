//! Collaborators the ledger relies on but does not implement: who the user is
//! and whether they may mutate their ledger.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};

/// Stable, opaque user identity used to scope every gateway query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait SessionProvider {
    fn current_user(&self) -> Option<UserId>;

    fn sign_out(&mut self);
}

/// Subscription check. A `false` answer blocks every mutating operation;
/// the gate lives with the caller, not in the ledger.
pub trait EntitlementProvider {
    fn is_active(&self, user: &UserId) -> impl Future<Output = bool> + Send;
}
