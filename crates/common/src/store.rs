//! Ledger Cache Store Abstraction
//!
//! Defines the [`LedgerStore`] trait, the contract between the
//! moderation engine and the off-chain record store (the relational
//! backend-as-a-service). The store holds campaign records, moderation
//! metadata and the append-only admin-action audit log.
//!
//! ## Write discipline
//!
//! Only two mutations exist: [`LedgerStore::update_campaign_moderation`]
//! (a single-record moderation write) and
//! [`LedgerStore::append_audit_entry`] (append-only, never updated or
//! deleted). Nothing else in the engine mutates campaign status — the
//! orchestrator is the sole writer, and it writes only after the state
//! machine has validated the transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CampaignRecord, CampaignStatus};

// ════════════════════════════════════════════════════════════════════════════
// STORE ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Errors from the record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given id.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The write did not reach the store or was rejected by it.
    #[error("store write failed: {0}")]
    WriteFailed(String),
}

// ════════════════════════════════════════════════════════════════════════════
// MODERATION UPDATE
// ════════════════════════════════════════════════════════════════════════════

/// A single moderation write against one campaign record.
///
/// `None` fields are left untouched. Setting `is_frozen` to
/// `Some(false)` also clears `freeze_reason`, `frozen_at` and
/// `frozen_by` — an unfrozen campaign carries no stale freeze metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationUpdate {
    /// New lifecycle status, if the command changes it.
    pub status: Option<CampaignStatus>,
    /// New frozen flag, if the command changes it.
    pub is_frozen: Option<bool>,
    /// Rejection reason (reject command only).
    pub rejection_reason: Option<String>,
    /// Freeze reason (freeze/ban commands only).
    pub freeze_reason: Option<String>,
    /// Admin performing the action.
    pub actor_id: String,
    /// Unix seconds at which the action was finalized.
    pub timestamp: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// AUDIT LOG
// ════════════════════════════════════════════════════════════════════════════

/// Closed set of auditable admin actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ApproveCampaign,
    RejectCampaign,
    FreezeCampaign,
    UnfreezeCampaign,
    EndCampaign,
    BanOrganization,
}

/// One append-only audit row.
///
/// The sole durable evidence that an admin action occurred and why.
/// When the action involved a chain write, `details` carries the
/// transaction hash and block number (see `givechain-proto`'s audit
/// detail schema); such a row is only ever inserted after the
/// transaction confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Admin that performed the action.
    pub actor_id: String,
    /// What was done.
    pub action: AuditAction,
    /// Kind of the target record ("campaign" or "organization").
    pub target_type: String,
    /// Record id of the target.
    pub target_id: String,
    /// Structured action details (reason, tx hash, block number, ...).
    pub details: serde_json::Value,
    /// Unix seconds at which the row was appended.
    pub recorded_at: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// CAMPAIGN FILTER
// ════════════════════════════════════════════════════════════════════════════

/// Filter for campaign listings. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignFilter {
    /// Restrict to one lifecycle status.
    pub status: Option<CampaignStatus>,
    /// Restrict to one organization's campaigns.
    pub org_id: Option<String>,
}

impl CampaignFilter {
    /// Filter matching all campaigns.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether `record` passes this filter.
    #[must_use]
    pub fn matches(&self, record: &CampaignRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(org_id) = &self.org_id {
            if &record.org_id != org_id {
                return false;
            }
        }
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LEDGER STORE TRAIT
// ════════════════════════════════════════════════════════════════════════════

/// Off-chain persistence collaborator.
///
/// Object-safe; callers hold `Arc<dyn LedgerStore>` and tests swap in
/// [`crate::mock_store::MockLedgerStore`]. Implementations must be
/// `Send + Sync` and must not panic.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetches one campaign record by id.
    ///
    /// ## Errors
    ///
    /// [`StoreError::NotFound`] if no record exists.
    async fn get_campaign(&self, id: &str) -> Result<CampaignRecord, StoreError>;

    /// Lists campaign records matching `filter`, in store order.
    async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
    ) -> Result<Vec<CampaignRecord>, StoreError>;

    /// Applies a moderation update to one campaign record as a single
    /// write.
    ///
    /// ## Errors
    ///
    /// - [`StoreError::NotFound`] if the campaign does not exist.
    /// - [`StoreError::WriteFailed`] if the store rejected the write.
    async fn update_campaign_moderation(
        &self,
        id: &str,
        update: ModerationUpdate,
    ) -> Result<(), StoreError>;

    /// Appends one audit row. Append-only: the trait offers no update
    /// or delete for audit entries.
    ///
    /// ## Errors
    ///
    /// [`StoreError::WriteFailed`] if the row did not persist.
    async fn append_audit_entry(&self, entry: AuditEntry) -> Result<(), StoreError>;

    /// Lists audit rows for one target id, oldest first.
    async fn list_audit_entries(
        &self,
        target_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError>;
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, org: &str, status: CampaignStatus) -> CampaignRecord {
        CampaignRecord {
            id: id.to_string(),
            org_id: org.to_string(),
            title: "t".to_string(),
            contract_address: None,
            status,
            is_frozen: false,
            target_fiat_cents: 0,
            target_wei: 0,
            rejection_reason: None,
            freeze_reason: None,
            frozen_at: None,
            frozen_by: None,
            approved_at: None,
            approved_by: None,
            created_at: 0,
        }
    }

    #[test]
    fn filter_all_matches_everything() {
        let f = CampaignFilter::all();
        assert!(f.matches(&record("a", "o1", CampaignStatus::Draft)));
        assert!(f.matches(&record("b", "o2", CampaignStatus::Frozen)));
    }

    #[test]
    fn filter_by_status_and_org() {
        let f = CampaignFilter {
            status: Some(CampaignStatus::Active),
            org_id: Some("o1".to_string()),
        };
        assert!(f.matches(&record("a", "o1", CampaignStatus::Active)));
        assert!(!f.matches(&record("a", "o2", CampaignStatus::Active)));
        assert!(!f.matches(&record("a", "o1", CampaignStatus::Frozen)));
    }

    #[test]
    fn audit_action_serde_snake_case() {
        let json = serde_json::to_string(&AuditAction::BanOrganization).expect("serialize");
        assert_eq!(json, "\"ban_organization\"");
        let back: AuditAction =
            serde_json::from_str("\"freeze_campaign\"").expect("deserialize");
        assert_eq!(back, AuditAction::FreezeCampaign);
    }
}
