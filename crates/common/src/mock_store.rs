//! In-memory ledger store for tests.
//!
//! [`MockLedgerStore`] implements [`LedgerStore`] over `parking_lot`
//! maps. Besides the store semantics themselves, it exposes the hooks
//! property tests need: write-call counters (to assert that rejected
//! commands touched nothing) and one-shot failure injection for the
//! moderation and audit writes (to exercise the partial-failure
//! window).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::store::{
    AuditEntry, CampaignFilter, LedgerStore, ModerationUpdate, StoreError,
};
use crate::types::CampaignRecord;

// ════════════════════════════════════════════════════════════════════════════
// MOCK LEDGER STORE
// ════════════════════════════════════════════════════════════════════════════

/// In-memory [`LedgerStore`] with failure injection and call counters.
#[derive(Default)]
pub struct MockLedgerStore {
    /// Campaign records keyed by id. Insertion order is tracked
    /// separately so listings are deterministic.
    campaigns: RwLock<HashMap<String, CampaignRecord>>,
    /// Insertion order of campaign ids.
    order: RwLock<Vec<String>>,
    /// Append-only audit log.
    audit_log: RwLock<Vec<AuditEntry>>,
    /// Error message for the next moderation update, if set.
    next_update_error: Mutex<Option<String>>,
    /// Error message for the next audit append, if set.
    next_audit_error: Mutex<Option<String>>,
    /// Moderation updates attempted (including injected failures).
    update_calls: AtomicU64,
    /// Audit appends attempted (including injected failures).
    audit_calls: AtomicU64,
    /// Reads served (gets and listings).
    read_calls: AtomicU64,
}

impl MockLedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one campaign record.
    pub fn insert_campaign(&self, record: CampaignRecord) {
        let id = record.id.clone();
        if self.campaigns.write().insert(id.clone(), record).is_none() {
            self.order.write().push(id);
        }
    }

    /// Makes the next moderation update fail with `WriteFailed(msg)`.
    pub fn fail_next_update(&self, msg: &str) {
        *self.next_update_error.lock() = Some(msg.to_string());
    }

    /// Makes the next audit append fail with `WriteFailed(msg)`.
    pub fn fail_next_audit(&self, msg: &str) {
        *self.next_audit_error.lock() = Some(msg.to_string());
    }

    /// Moderation updates attempted so far.
    #[must_use]
    pub fn update_call_count(&self) -> u64 {
        self.update_calls.load(Ordering::Relaxed)
    }

    /// Audit appends attempted so far.
    #[must_use]
    pub fn audit_call_count(&self) -> u64 {
        self.audit_calls.load(Ordering::Relaxed)
    }

    /// Total write calls (updates plus audit appends).
    #[must_use]
    pub fn write_call_count(&self) -> u64 {
        self.update_call_count() + self.audit_call_count()
    }

    /// Reads served so far (gets and listings).
    #[must_use]
    pub fn read_call_count(&self) -> u64 {
        self.read_calls.load(Ordering::Relaxed)
    }

    /// Snapshot of the audit log, oldest first.
    #[must_use]
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit_log.read().clone()
    }

    /// Current state of one campaign, if present.
    #[must_use]
    pub fn campaign(&self, id: &str) -> Option<CampaignRecord> {
        self.campaigns.read().get(id).cloned()
    }
}

#[async_trait]
impl LedgerStore for MockLedgerStore {
    async fn get_campaign(&self, id: &str) -> Result<CampaignRecord, StoreError> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        self.campaigns
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
    ) -> Result<Vec<CampaignRecord>, StoreError> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        let campaigns = self.campaigns.read();
        Ok(self
            .order
            .read()
            .iter()
            .filter_map(|id| campaigns.get(id))
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn update_campaign_moderation(
        &self,
        id: &str,
        update: ModerationUpdate,
    ) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(msg) = self.next_update_error.lock().take() {
            return Err(StoreError::WriteFailed(msg));
        }

        let mut campaigns = self.campaigns.write();
        let record = campaigns
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(status) = update.status {
            record.status = status;
            match status {
                crate::types::CampaignStatus::Active => {
                    if record.approved_at.is_none() {
                        record.approved_at = Some(update.timestamp);
                        record.approved_by = Some(update.actor_id.clone());
                    }
                }
                crate::types::CampaignStatus::Rejected => {
                    record.rejection_reason = update.rejection_reason.clone();
                }
                _ => {}
            }
        }

        if let Some(frozen) = update.is_frozen {
            record.is_frozen = frozen;
            if frozen {
                record.freeze_reason = update.freeze_reason.clone();
                record.frozen_at = Some(update.timestamp);
                record.frozen_by = Some(update.actor_id.clone());
            } else {
                // Unfreezing clears stale freeze metadata.
                record.freeze_reason = None;
                record.frozen_at = None;
                record.frozen_by = None;
            }
        }

        Ok(())
    }

    async fn append_audit_entry(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.audit_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(msg) = self.next_audit_error.lock().take() {
            return Err(StoreError::WriteFailed(msg));
        }

        self.audit_log.write().push(entry);
        Ok(())
    }

    async fn list_audit_entries(
        &self,
        target_id: &str,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .audit_log
            .read()
            .iter()
            .filter(|e| e.target_id == target_id)
            .cloned()
            .collect())
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<MockLedgerStore>();
    }
    let _ = check;
};

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
