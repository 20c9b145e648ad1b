// TestDependencies - mock implementations for testing
//
// Provides recording/static doubles for every infrastructure trait plus a
// ready-made CoreDeps wired to the in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use super::{
    BaseIdentityService, BaseNotificationService, BaseReceiptStore, CoreDeps, ResolvedIdentity,
};
use crate::domains::registration::events::RegistrationEvent;
use crate::storage::MemoryStore;

// =============================================================================
// Recording Notifier
// =============================================================================

/// Captures every event handed to it; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<RegistrationEvent>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `notify` call fail.
    pub fn fail_deliveries(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<RegistrationEvent> {
        self.sent.lock().unwrap().clone()
    }

    /// Wire kinds of everything sent, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(|e| e.kind()).collect()
    }
}

#[async_trait]
impl BaseNotificationService for RecordingNotifier {
    async fn notify(&self, event: &RegistrationEvent) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(anyhow::anyhow!("notification channel down"));
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Receipt Store
// =============================================================================

/// Records deletions; individual references can be made to fail.
#[derive(Default)]
pub struct MockReceiptStore {
    deleted: Mutex<Vec<String>>,
    failing: Mutex<Vec<String>>,
}

impl MockReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deletion of one reference fail.
    pub fn fail_for(&self, reference: &str) {
        self.failing.lock().unwrap().push(reference.to_string());
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseReceiptStore for MockReceiptStore {
    async fn delete_receipt(&self, reference: &str) -> Result<()> {
        if self.failing.lock().unwrap().iter().any(|r| r == reference) {
            return Err(anyhow::anyhow!("artifact store refused: {}", reference));
        }
        self.deleted.lock().unwrap().push(reference.to_string());
        Ok(())
    }
}

// =============================================================================
// Static Identity Service
// =============================================================================

/// Resolves from a fixed map; unknown users resolve to no linkage.
#[derive(Default)]
pub struct StaticIdentityService {
    identities: Mutex<HashMap<String, ResolvedIdentity>>,
}

impl StaticIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: &str, identity: ResolvedIdentity) {
        self.identities
            .lock()
            .unwrap()
            .insert(user_id.to_string(), identity);
    }
}

#[async_trait]
impl BaseIdentityService for StaticIdentityService {
    async fn resolve(&self, user_id: &str) -> Result<Option<ResolvedIdentity>> {
        Ok(self.identities.lock().unwrap().get(user_id).cloned())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Everything a test needs: CoreDeps over the in-memory store plus handles
/// to the doubles for assertions.
pub struct TestDependencies {
    pub deps: CoreDeps,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub receipts: Arc<MockReceiptStore>,
    pub identity: Arc<StaticIdentityService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let receipts = Arc::new(MockReceiptStore::new());
        let identity = Arc::new(StaticIdentityService::new());

        let deps = CoreDeps::new(
            store.clone(),
            notifier.clone(),
            receipts.clone(),
            identity.clone(),
        );

        Self {
            deps,
            store,
            notifier,
            receipts,
            identity,
        }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
