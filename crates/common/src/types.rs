//! Core domain types shared across the givechain workspace.
//!
//! A campaign lives in two ledgers at once: the relational record store
//! holds its metadata and moderation state, while a per-campaign smart
//! contract holds the money. The types here describe both halves plus
//! the identities that act on them.
//!
//! Addresses and transaction hashes are fixed-size byte arrays
//! (`[u8; 20]` / `[u8; 32]`), rendered as `0x`-prefixed hex only at the
//! edges via [`hex_address`] / [`hex_tx_hash`].

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// ADDRESS HELPERS
// ════════════════════════════════════════════════════════════════════════════

/// 20-byte contract or wallet address on the Ethereum-compatible chain.
pub type Address = [u8; 20];

/// 32-byte transaction hash.
pub type TxHash = [u8; 32];

/// Renders an address as `0x`-prefixed lowercase hex.
#[must_use]
pub fn hex_address(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr))
}

/// Renders a transaction hash as `0x`-prefixed lowercase hex.
#[must_use]
pub fn hex_tx_hash(hash: &TxHash) -> String {
    format!("0x{}", hex::encode(hash))
}

// ════════════════════════════════════════════════════════════════════════════
// CAMPAIGN STATUS
// ════════════════════════════════════════════════════════════════════════════

/// Authoritative off-chain lifecycle status of a campaign.
///
/// Exactly one field in the record store carries this value, and only
/// the moderation orchestrator may change it. The derived `is_frozen`
/// flag on [`CampaignRecord`] tracks the contract's on-chain frozen
/// flag and must stay consistent with it outside the bounded
/// confirmation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Being drafted by the organization, not yet submitted.
    Draft,
    /// Submitted, awaiting admin approval.
    PendingApproval,
    /// Approved and accepting donations.
    Active,
    /// Fundraising finished (deadline passed or ended by an admin).
    Ended,
    /// Suspended by an admin; the contract rejects donations/withdrawals.
    Frozen,
    /// Rejected by an admin. Terminal for this submission; a new draft
    /// starts a fresh cycle.
    Rejected,
}

impl CampaignStatus {
    /// `true` for statuses from which fundraising can never resume.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CampaignStatus::Ended | CampaignStatus::Rejected)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::PendingApproval => "pending_approval",
            CampaignStatus::Active => "active",
            CampaignStatus::Ended => "ended",
            CampaignStatus::Frozen => "frozen",
            CampaignStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CAMPAIGN RECORD
// ════════════════════════════════════════════════════════════════════════════

/// Off-chain campaign record as held by the ledger cache store.
///
/// Financial snapshot fields are deliberately absent: collected amount,
/// balance and donor counts are caches recomputed from the chain on
/// read, never persisted as authoritative. The record carries only what
/// the chain cannot know — identity, moderation state, and targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Stable record id assigned by the store.
    pub id: String,
    /// Owning organization's record id.
    pub org_id: String,
    /// Display title.
    pub title: String,
    /// Address of the funds-holding contract. Assigned once at
    /// deployment, never reassigned; `None` until deployment.
    pub contract_address: Option<Address>,
    /// Authoritative lifecycle status.
    pub status: CampaignStatus,
    /// Cached mirror of the contract's frozen flag.
    pub is_frozen: bool,
    /// Fundraising target in fiat cents (display only).
    pub target_fiat_cents: u64,
    /// Fundraising target in native-currency wei.
    pub target_wei: u128,
    /// Reason recorded when the campaign was rejected.
    pub rejection_reason: Option<String>,
    /// Reason recorded when the campaign was last frozen.
    pub freeze_reason: Option<String>,
    /// Unix seconds of the last freeze, if any.
    pub frozen_at: Option<u64>,
    /// Admin id that performed the last freeze.
    pub frozen_by: Option<String>,
    /// Unix seconds of approval, if approved.
    pub approved_at: Option<u64>,
    /// Admin id that approved the campaign.
    pub approved_by: Option<String>,
    /// Unix seconds of record creation.
    pub created_at: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// ON-CHAIN READ MODELS
// ════════════════════════════════════════════════════════════════════════════

/// A single donation as recorded by the campaign contract.
///
/// Immutable once mined; ordering is block order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Donor wallet address.
    pub donor: Address,
    /// Donated amount in wei.
    pub amount_wei: u128,
    /// Optional donor message.
    pub message: Option<String>,
    /// Block timestamp, Unix seconds.
    pub timestamp: u64,
}

/// A single withdrawal as recorded by the campaign contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    /// Recipient wallet address.
    pub recipient: Address,
    /// Withdrawn amount in wei.
    pub amount_wei: u128,
    /// Stated purpose of the withdrawal.
    pub description: String,
    /// Block timestamp, Unix seconds.
    pub timestamp: u64,
    /// Whether the contract marks the withdrawal completed.
    pub completed: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// ADMIN IDENTITY
// ════════════════════════════════════════════════════════════════════════════

/// Opaque handle to a wallet capable of signing and submitting
/// transactions. Resolving and unlocking the wallet belongs to the auth
/// layer; the engine only forwards the handle to the chain gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    /// Wallet address the transactions will be sent from.
    pub address: Address,
}

/// Resolved admin identity, passed explicitly into every moderation
/// call. There is no ambient "current admin" anywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    /// Admin record id, written into moderation metadata and audit rows.
    pub id: String,
    /// The admin's signing capability for chain writes.
    pub signer: Signer,
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
