//! # Consistency Report Schema
//!
//! Defines the report produced by the auditing reconciliation pass that
//! compares each campaign's off-chain frozen flag against the live
//! frozen flag of its contract.
//!
//! ## Design
//!
//! - [`ConsistencyReport`] is the top-level container for one pass.
//! - [`FrozenMismatch`] represents one detected on/off-chain divergence.
//! - [`SkippedCampaign`] records a campaign whose chain read failed and
//!   therefore could not be checked — a skip is not a pass.
//!
//! The report is evidence, not a repair plan: the checker never
//! auto-corrects, because the intended value of a diverged flag is
//! ambiguous without the audit trail.
//!
//! ## Serialization Guarantee
//!
//! Plain serde derives; same input produces the same output, and
//! serialize → deserialize round-trips losslessly. Addresses are
//! `0x`-prefixed hex strings so reports stay readable in logs and
//! dashboards.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// FROZEN MISMATCH
// ════════════════════════════════════════════════════════════════════════════

/// One campaign whose cached frozen flag disagrees with its contract.
///
/// This is exactly the divergence the moderation protocol's
/// partial-failure window can produce: the chain write confirmed but
/// the record store write did not land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenMismatch {
    /// Off-chain campaign record id.
    pub campaign_id: String,
    /// Contract address, `0x`-prefixed hex.
    pub contract_address: String,
    /// Frozen flag reported by the contract.
    pub onchain_frozen: bool,
    /// Frozen flag cached in the record store.
    pub offchain_frozen: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// SKIPPED CAMPAIGN
// ════════════════════════════════════════════════════════════════════════════

/// A campaign the pass could not check because its chain read failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCampaign {
    /// Off-chain campaign record id.
    pub campaign_id: String,
    /// Contract address, `0x`-prefixed hex.
    pub contract_address: String,
    /// Human-readable read failure.
    pub reason: String,
}

// ════════════════════════════════════════════════════════════════════════════
// CONSISTENCY REPORT
// ════════════════════════════════════════════════════════════════════════════

/// Result of one frozen-flag consistency pass over all campaigns with
/// a deployed contract.
///
/// `is_consistent` covers only the campaigns actually checked; a report
/// with skips and no mismatches is consistent-as-far-as-observable, and
/// callers that need certainty must re-run once the skipped contracts
/// are reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Unix seconds at which the pass ran.
    pub checked_at: u64,
    /// Number of campaigns whose contracts were successfully read.
    pub campaigns_checked: usize,
    /// Divergences found.
    pub mismatches: Vec<FrozenMismatch>,
    /// Campaigns that could not be checked.
    pub skipped: Vec<SkippedCampaign>,
    /// `true` when `mismatches` is empty.
    pub is_consistent: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ConsistencyReport {
        ConsistencyReport {
            checked_at: 1_704_067_200,
            campaigns_checked: 3,
            mismatches: vec![FrozenMismatch {
                campaign_id: "camp-7".to_string(),
                contract_address: "0xc1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1".to_string(),
                onchain_frozen: true,
                offchain_frozen: false,
            }],
            skipped: vec![SkippedCampaign {
                campaign_id: "camp-9".to_string(),
                contract_address: "0xc9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9".to_string(),
                reason: "chain unreachable: connection refused".to_string(),
            }],
            is_consistent: false,
        }
    }

    #[test]
    fn report_serde_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).expect("serialize");
        let back: ConsistencyReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(report, back);
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = serde_json::to_string(&sample_report()).expect("serialize");
        let b = serde_json::to_string(&sample_report()).expect("serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn mismatch_fields_survive_json() {
        let json = serde_json::to_value(sample_report()).expect("serialize");
        assert_eq!(json["mismatches"][0]["onchain_frozen"], true);
        assert_eq!(json["mismatches"][0]["offchain_frozen"], false);
        assert_eq!(json["is_consistent"], false);
    }
}
