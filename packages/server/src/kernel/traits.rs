// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Business rules
// (admission, review, quorum) live in domain functions that use these.
//
// Naming convention: Base* for trait names.

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::registration::events::RegistrationEvent;
use crate::domains::roster::EntityCategory;

// =============================================================================
// Notification Sink (Infrastructure - email/push delivery owned elsewhere)
// =============================================================================

#[async_trait]
pub trait BaseNotificationService: Send + Sync {
    /// Deliver a registration lifecycle event to the participant/organizers.
    ///
    /// Fire-and-forget from the domain's point of view: callers log failures
    /// and move on, the triggering state change is never rolled back.
    async fn notify(&self, event: &RegistrationEvent) -> Result<()>;
}

// =============================================================================
// Receipt Store (Infrastructure - payment receipt artifacts)
// =============================================================================

#[async_trait]
pub trait BaseReceiptStore: Send + Sync {
    /// Delete the stored payment-receipt artifact behind a reference.
    ///
    /// Called when a registration is hard-deleted. Failures are collected
    /// and reported, never fatal to the deletion itself.
    async fn delete_receipt(&self, reference: &str) -> Result<()>;
}

// =============================================================================
// Identity Resolution (Infrastructure - who is this authenticated user?)
// =============================================================================

/// What the identity provider knows about an authenticated user, in roster
/// terms. `None` fields mean the user is an ad-hoc ("other") participant.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub external_id: Option<String>,
    pub category: Option<EntityCategory>,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait BaseIdentityService: Send + Sync {
    /// Resolve an opaque authenticated user id to its roster linkage.
    ///
    /// `Ok(None)` means the user is valid but has no canonical entity; the
    /// core never authenticates anyone itself.
    async fn resolve(&self, user_id: &str) -> Result<Option<ResolvedIdentity>>;
}
