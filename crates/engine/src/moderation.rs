//! # Moderation Orchestrator
//!
//! Executes admin moderation commands against both ledgers in a fixed
//! order: validate with the state machine, write to the chain (freeze
//! and unfreeze only), persist the moderation update to the record
//! store, then append the audit row.
//!
//! ## Ordering invariant
//!
//! The chain write always precedes the store write. A failure before
//! the chain confirms leaves both ledgers untouched and the command is
//! safe to retry from scratch. A store failure *after* the chain
//! confirmed opens the partial-failure window: the money ledger has
//! moved and the metadata ledger has not. That outcome is surfaced as
//! [`ModerationError::PartialFailure`] carrying the confirmed
//! transaction hash — the orchestrator never unwinds a mined
//! transaction, and the retry path heals the store via the idempotent
//! skip in the pre-submit summary read.
//!
//! ```text
//!   validate ──▶ submit ──▶ confirm ──▶ persist ──▶ audit
//!      │            │          │           │          │
//!      ▼            ▼          ▼           ▼          ▼
//!   refused      nothing    nothing     partial    applied,
//!   (no writes)  written    written     failure    unaudited
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use givechain_common::chain::{ChainError, ChainGateway, TxReceipt};
use givechain_common::store::{
    AuditAction, AuditEntry, CampaignFilter, LedgerStore, ModerationUpdate, StoreError,
};
use givechain_common::types::{
    hex_tx_hash, AdminIdentity, CampaignRecord, CampaignStatus, TxHash,
};
use givechain_proto::{AffectedCampaign, AuditDetails};

use crate::state_machine::{
    validate_reason, validate_transition, ModerationCommand, TransitionError,
};

// ════════════════════════════════════════════════════════════════════════════
// MODERATION ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Errors from command execution.
///
/// Every variant except [`Self::PartialFailure`] and
/// [`Self::AuditWriteFailed`] guarantees that neither ledger was
/// modified by the failed command.
#[derive(Debug)]
pub enum ModerationError {
    /// No campaign record with the given id.
    CampaignNotFound(String),
    /// The state machine refused the command.
    Transition(TransitionError),
    /// The command needs a chain write but the campaign has no deployed
    /// contract.
    MissingContract(String),
    /// The chain write failed before or at confirmation. Includes
    /// mined-but-reverted transactions, which leave the contract
    /// unchanged.
    Chain(ChainError),
    /// A record store operation failed before any chain write.
    Store(StoreError),
    /// The chain write confirmed but the record store update did not
    /// land. The ledgers diverge until the command is retried or the
    /// consistency checker flags the campaign.
    PartialFailure {
        tx_hash: TxHash,
        block_number: u64,
        source: StoreError,
    },
    /// The moderation update persisted but the audit row did not.
    /// `tx_hash` is present when the command involved a chain write.
    AuditWriteFailed {
        tx_hash: Option<TxHash>,
        source: StoreError,
    },
}

impl fmt::Display for ModerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CampaignNotFound(id) => write!(f, "campaign not found: {}", id),
            Self::Transition(err) => write!(f, "{}", err),
            Self::MissingContract(id) => {
                write!(f, "campaign {} has no deployed contract", id)
            }
            Self::Chain(err) => write!(f, "chain write failed: {}", err),
            Self::Store(err) => write!(f, "record store operation failed: {}", err),
            Self::PartialFailure {
                tx_hash,
                block_number,
                source,
            } => write!(
                f,
                "transaction {} confirmed in block {} but the record store update \
                 failed ({}); ledgers diverge until the command is retried",
                hex_tx_hash(tx_hash),
                block_number,
                source
            ),
            Self::AuditWriteFailed { tx_hash, source } => match tx_hash {
                Some(hash) => write!(
                    f,
                    "moderation applied (tx {}) but the audit append failed: {}",
                    hex_tx_hash(hash),
                    source
                ),
                None => write!(f, "moderation applied but the audit append failed: {}", source),
            },
        }
    }
}

impl std::error::Error for ModerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            Self::Chain(err) => Some(err),
            Self::Store(err)
            | Self::PartialFailure { source: err, .. }
            | Self::AuditWriteFailed { source: err, .. } => Some(err),
            Self::CampaignNotFound(_) | Self::MissingContract(_) => None,
        }
    }
}

impl From<TransitionError> for ModerationError {
    fn from(err: TransitionError) -> Self {
        Self::Transition(err)
    }
}

impl From<ChainError> for ModerationError {
    fn from(err: ChainError) -> Self {
        Self::Chain(err)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// OUTCOMES
// ════════════════════════════════════════════════════════════════════════════

/// Result of one completed moderation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationOutcome {
    /// Campaign the command was applied to.
    pub campaign_id: String,
    /// Status the campaign now holds.
    pub new_status: CampaignStatus,
    /// Receipt of the chain write, when one was submitted. `None` for
    /// commands without a chain write and for freezes skipped because
    /// the contract was already at the target flag.
    pub receipt: Option<TxReceipt>,
}

/// One campaign an organization ban could not freeze.
#[derive(Debug)]
pub struct BanFailure {
    pub campaign_id: String,
    pub error: ModerationError,
}

/// Result of an organization ban.
///
/// A ban is best-effort across the organization's campaigns: one
/// campaign failing does not stop the others. Callers inspect
/// `failures` and retry those campaigns individually.
#[derive(Debug)]
pub struct BanOutcome {
    pub org_id: String,
    /// Campaigns frozen by this ban, in store order.
    pub frozen: Vec<ModerationOutcome>,
    /// Campaigns that should have been frozen but failed.
    pub failures: Vec<BanFailure>,
}

// ════════════════════════════════════════════════════════════════════════════
// ORCHESTRATOR
// ════════════════════════════════════════════════════════════════════════════

/// Sole writer of campaign moderation state.
///
/// Holds both collaborators behind trait objects; production wires the
/// JSON-RPC gateway and the relational store, tests wire the mocks.
pub struct ModerationOrchestrator {
    chain: Arc<dyn ChainGateway>,
    store: Arc<dyn LedgerStore>,
}

impl ModerationOrchestrator {
    #[must_use]
    pub fn new(chain: Arc<dyn ChainGateway>, store: Arc<dyn LedgerStore>) -> Self {
        Self { chain, store }
    }

    /// Executes one moderation command against one campaign.
    ///
    /// `timestamp` is the Unix-second instant the caller attributes the
    /// action to; the engine never reads a clock itself.
    ///
    /// [`ModerationCommand::Ban`] fans out to the whole owning
    /// organization via [`Self::ban_organization`]; the returned
    /// outcome is the named campaign's share of that ban.
    ///
    /// ## Errors
    ///
    /// See [`ModerationError`]. Only `PartialFailure` and
    /// `AuditWriteFailed` leave anything behind.
    pub async fn execute(
        &self,
        admin: &AdminIdentity,
        campaign_id: &str,
        command: ModerationCommand,
        timestamp: u64,
    ) -> Result<ModerationOutcome, ModerationError> {
        debug!(
            admin = %admin.id,
            campaign = campaign_id,
            command = command.name(),
            "moderation command received"
        );

        // A blank reason needs no record state to refuse; no
        // collaborator is called for it.
        validate_reason(&command)?;

        // ── Step 1: load the record ──
        let record = self.fetch(campaign_id).await?;

        if let ModerationCommand::Ban { reason } = &command {
            // The named campaign must itself be freezable before the
            // ban fans out to its organization.
            validate_transition(record.status, record.is_frozen, &command)?;
            let outcome = self
                .ban_organization(admin, &record.org_id, reason, timestamp)
                .await?;
            if let Some(own) = outcome
                .frozen
                .into_iter()
                .find(|o| o.campaign_id == campaign_id)
            {
                return Ok(own);
            }
            if let Some(failure) = outcome
                .failures
                .into_iter()
                .find(|f| f.campaign_id == campaign_id)
            {
                return Err(failure.error);
            }
            return Err(ModerationError::CampaignNotFound(campaign_id.to_string()));
        }

        // ── Steps 2-5: validate, chain write, persist ──
        let outcome = self
            .moderate_record(admin, &record, &command, timestamp)
            .await?;

        // ── Step 6: audit ──
        let details = AuditDetails {
            reason: command.reason().map(str::to_string),
            tx_hash: outcome.receipt.map(|r| hex_tx_hash(&r.hash)),
            block_number: outcome.receipt.map(|r| r.block_number),
            affected_campaigns: None,
        };
        self.append_audit(
            admin,
            audit_action(&command),
            "campaign",
            campaign_id,
            details,
            outcome.receipt.map(|r| r.hash),
            timestamp,
        )
        .await?;

        info!(
            admin = %admin.id,
            campaign = campaign_id,
            command = command.name(),
            new_status = %outcome.new_status,
            "moderation command completed"
        );
        Ok(outcome)
    }

    /// Bans an organization by freezing every one of its campaigns that
    /// is currently fundraising.
    ///
    /// Campaigns not in a freezable state are left alone. Per-campaign
    /// failures are collected, not fatal. Exactly one audit row is
    /// appended for the ban, listing the campaigns actually frozen.
    ///
    /// ## Errors
    ///
    /// - [`ModerationError::Transition`] if `reason` is blank.
    /// - [`ModerationError::Store`] if the campaign listing fails.
    /// - [`ModerationError::AuditWriteFailed`] if the ban row did not
    ///   persist (the per-campaign freezes already applied stand).
    pub async fn ban_organization(
        &self,
        admin: &AdminIdentity,
        org_id: &str,
        reason: &str,
        timestamp: u64,
    ) -> Result<BanOutcome, ModerationError> {
        let command = ModerationCommand::Ban {
            reason: reason.to_string(),
        };
        validate_reason(&command)?;
        debug!(admin = %admin.id, org = org_id, "organization ban requested");

        let candidates = self
            .store
            .list_campaigns(&CampaignFilter {
                status: None,
                org_id: Some(org_id.to_string()),
            })
            .await
            .map_err(ModerationError::Store)?;
        let mut frozen = Vec::new();
        let mut failures = Vec::new();

        // Sequential on purpose: each freeze is a signed wallet
        // transaction, and wallets sign one at a time.
        for record in &candidates {
            if validate_transition(record.status, record.is_frozen, &command).is_err() {
                continue;
            }
            match self
                .moderate_record(admin, record, &command, timestamp)
                .await
            {
                Ok(outcome) => frozen.push(outcome),
                Err(error) => {
                    warn!(
                        campaign = %record.id,
                        error = %error,
                        "ban: campaign freeze failed, continuing with the rest"
                    );
                    failures.push(BanFailure {
                        campaign_id: record.id.clone(),
                        error,
                    });
                }
            }
        }

        // The ban row is the only durable trace of these freezes, so
        // each mined transaction leaves its hash and block here.
        let affected = frozen
            .iter()
            .map(|outcome| AffectedCampaign {
                campaign_id: outcome.campaign_id.clone(),
                tx_hash: outcome.receipt.map(|r| hex_tx_hash(&r.hash)),
                block_number: outcome.receipt.map(|r| r.block_number),
            })
            .collect();
        let details = AuditDetails {
            affected_campaigns: Some(affected),
            ..AuditDetails::with_reason(reason)
        };
        self.append_audit(
            admin,
            AuditAction::BanOrganization,
            "organization",
            org_id,
            details,
            None,
            timestamp,
        )
        .await?;

        info!(
            admin = %admin.id,
            org = org_id,
            frozen = frozen.len(),
            failed = failures.len(),
            "organization ban completed"
        );
        Ok(BanOutcome {
            org_id: org_id.to_string(),
            frozen,
            failures,
        })
    }

    async fn fetch(&self, id: &str) -> Result<CampaignRecord, ModerationError> {
        self.store.get_campaign(id).await.map_err(|err| match err {
            StoreError::NotFound(id) => ModerationError::CampaignNotFound(id),
            other => ModerationError::Store(other),
        })
    }

    /// Validate, perform the chain write if the command needs one, and
    /// persist the moderation update. No audit here; the callers own
    /// the audit row (per command, or one per organization ban).
    async fn moderate_record(
        &self,
        admin: &AdminIdentity,
        record: &CampaignRecord,
        command: &ModerationCommand,
        timestamp: u64,
    ) -> Result<ModerationOutcome, ModerationError> {
        let new_status = validate_transition(record.status, record.is_frozen, command)?;

        let receipt = match command {
            ModerationCommand::Freeze { .. } | ModerationCommand::Ban { .. } => {
                self.chain_write(record, true, admin).await?
            }
            ModerationCommand::Unfreeze => self.chain_write(record, false, admin).await?,
            ModerationCommand::Approve
            | ModerationCommand::Reject { .. }
            | ModerationCommand::End => None,
        };

        let update = ModerationUpdate {
            status: Some(new_status),
            is_frozen: match command {
                ModerationCommand::Freeze { .. } | ModerationCommand::Ban { .. } => Some(true),
                ModerationCommand::Unfreeze => Some(false),
                _ => None,
            },
            rejection_reason: match command {
                ModerationCommand::Reject { reason } => Some(reason.clone()),
                _ => None,
            },
            freeze_reason: match command {
                ModerationCommand::Freeze { reason } | ModerationCommand::Ban { reason } => {
                    Some(reason.clone())
                }
                _ => None,
            },
            actor_id: admin.id.clone(),
            timestamp,
        };

        if let Err(source) = self
            .store
            .update_campaign_moderation(&record.id, update)
            .await
        {
            return Err(match receipt {
                Some(receipt) => {
                    warn!(
                        campaign = %record.id,
                        tx = %hex_tx_hash(&receipt.hash),
                        error = %source,
                        "chain write confirmed but record store update failed"
                    );
                    ModerationError::PartialFailure {
                        tx_hash: receipt.hash,
                        block_number: receipt.block_number,
                        source,
                    }
                }
                None => match source {
                    StoreError::NotFound(id) => ModerationError::CampaignNotFound(id),
                    other => ModerationError::Store(other),
                },
            });
        }

        Ok(ModerationOutcome {
            campaign_id: record.id.clone(),
            new_status,
            receipt,
        })
    }

    /// Submit a freeze or unfreeze transaction and await its receipt.
    ///
    /// Returns `Ok(None)` without submitting when the contract already
    /// holds the target flag — this is what makes retrying a partially
    /// failed command idempotent on the chain side.
    async fn chain_write(
        &self,
        record: &CampaignRecord,
        freeze: bool,
        admin: &AdminIdentity,
    ) -> Result<Option<TxReceipt>, ModerationError> {
        let contract = record
            .contract_address
            .ok_or_else(|| ModerationError::MissingContract(record.id.clone()))?;

        // Advisory pre-read. A failed read is not fatal; the submit
        // itself is the authoritative failure point.
        match self.chain.read_summary(contract).await {
            Ok(summary) if summary.frozen == freeze => {
                debug!(
                    campaign = %record.id,
                    freeze,
                    "contract already at target frozen flag, skipping transaction"
                );
                return Ok(None);
            }
            Ok(_) => {}
            Err(err) => {
                debug!(
                    campaign = %record.id,
                    error = %err,
                    "pre-submit summary read failed, submitting anyway"
                );
            }
        }

        let pending = if freeze {
            self.chain.submit_freeze(contract, &admin.signer).await?
        } else {
            self.chain.submit_unfreeze(contract, &admin.signer).await?
        };
        let receipt = self.chain.await_confirmation(pending).await?;

        if !receipt.success {
            return Err(ModerationError::Chain(ChainError::Reverted(receipt.hash)));
        }
        Ok(Some(receipt))
    }

    async fn append_audit(
        &self,
        admin: &AdminIdentity,
        action: AuditAction,
        target_type: &str,
        target_id: &str,
        details: AuditDetails,
        tx_hash: Option<TxHash>,
        timestamp: u64,
    ) -> Result<(), ModerationError> {
        let details = serde_json::to_value(&details).map_err(|err| {
            ModerationError::AuditWriteFailed {
                tx_hash,
                source: StoreError::WriteFailed(err.to_string()),
            }
        })?;
        let entry = AuditEntry {
            actor_id: admin.id.clone(),
            action,
            target_type: target_type.to_string(),
            target_id: target_id.to_string(),
            details,
            recorded_at: timestamp,
        };
        self.store.append_audit_entry(entry).await.map_err(|source| {
            warn!(
                target = target_id,
                error = %source,
                "moderation applied but audit append failed"
            );
            ModerationError::AuditWriteFailed { tx_hash, source }
        })
    }
}

fn audit_action(command: &ModerationCommand) -> AuditAction {
    match command {
        ModerationCommand::Approve => AuditAction::ApproveCampaign,
        ModerationCommand::Reject { .. } => AuditAction::RejectCampaign,
        ModerationCommand::Freeze { .. } => AuditAction::FreezeCampaign,
        ModerationCommand::Unfreeze => AuditAction::UnfreezeCampaign,
        ModerationCommand::End => AuditAction::EndCampaign,
        ModerationCommand::Ban { .. } => AuditAction::BanOrganization,
    }
}

// Held behind Arc by request handlers.
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<ModerationOrchestrator>();
    }
    let _ = check;
};

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
