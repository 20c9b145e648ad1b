//! Core dependencies for domain actions (traits for testability).
//!
//! Central dependency container handed to every domain action. All external
//! collaborators sit behind trait objects so tests can swap them out.

use std::sync::Arc;

use crate::storage::BaseStore;

use super::traits::{BaseIdentityService, BaseNotificationService, BaseReceiptStore};

/// Dependencies accessible to domain actions.
#[derive(Clone)]
pub struct CoreDeps {
    /// Persistence port (records, indexed lookups, atomic guarded insert).
    pub store: Arc<dyn BaseStore>,
    /// Notification sink for registration lifecycle events.
    pub notifier: Arc<dyn BaseNotificationService>,
    /// Payment-receipt artifact storage.
    pub receipts: Arc<dyn BaseReceiptStore>,
    /// Resolves opaque authenticated user ids to roster identities.
    pub identity: Arc<dyn BaseIdentityService>,
}

impl CoreDeps {
    pub fn new(
        store: Arc<dyn BaseStore>,
        notifier: Arc<dyn BaseNotificationService>,
        receipts: Arc<dyn BaseReceiptStore>,
        identity: Arc<dyn BaseIdentityService>,
    ) -> Self {
        Self {
            store,
            notifier,
            receipts,
            identity,
        }
    }
}
