//! Explicit request context.
//!
//! Every ledger call receives the business it operates on and the actor
//! performing it. Nothing in the ledger reads these from ambient state.

use serde::{Deserialize, Serialize};

use crate::types::{BusinessId, UserId};

/// Tenant and actor for a single ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerContext {
    /// The business whose books are read or written.
    pub business_id: BusinessId,
    /// The user (or system actor) performing the operation.
    pub actor_id: UserId,
}

impl LedgerContext {
    /// Creates a context for the given business and actor.
    #[must_use]
    pub const fn new(business_id: BusinessId, actor_id: UserId) -> Self {
        Self {
            business_id,
            actor_id,
        }
    }
}
