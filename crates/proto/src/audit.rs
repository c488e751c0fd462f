//! # Audit Detail Schema
//!
//! [`AuditDetails`] is the structured payload stored in the `details`
//! column of an audit log entry. Every field is optional; each
//! moderation action fills in the subset that applies (a reject carries
//! a reason and no transaction hash, a freeze carries both, a ban lists
//! the campaigns it froze with their individual freeze transactions).
//!
//! The audit log is the only durable evidence of an admin action, so
//! any action that mined a transaction must leave that transaction's
//! hash and block here — including each per-campaign freeze inside an
//! organization ban.
//!
//! Serialization omits unset fields so the stored JSON stays minimal
//! and stable across actions.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// AFFECTED CAMPAIGN
// ════════════════════════════════════════════════════════════════════════════

/// One campaign touched by an organization-level action, with the
/// chain write that froze it.
///
/// `tx_hash`/`block_number` are absent when no transaction was needed
/// (the contract was already at the target flag).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedCampaign {
    /// Off-chain campaign record id.
    pub campaign_id: String,

    /// Confirmed freeze transaction hash, `0x`-prefixed hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    /// Block in which the freeze confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

// ════════════════════════════════════════════════════════════════════════════
// AUDIT DETAILS
// ════════════════════════════════════════════════════════════════════════════

/// Structured detail payload of one audit log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDetails {
    /// Human-readable reason supplied by the moderator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Confirmed chain transaction hash, `0x`-prefixed hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    /// Block in which the transaction confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,

    /// Campaigns affected by an organization-level action, each with
    /// its own chain-write evidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_campaigns: Option<Vec<AffectedCampaign>>,
}

impl AuditDetails {
    /// Details carrying only a moderator reason.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        AuditDetails {
            reason: Some(reason.into()),
            ..AuditDetails::default()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════
