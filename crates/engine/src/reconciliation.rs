//! # Reconciliation Reader
//!
//! Read-side composition of the two ledgers. Every public view of a
//! campaign's finances is computed here by pairing the off-chain record
//! with a live read of its contract; nothing financial is ever served
//! from the record store alone.
//!
//! ## Partial results
//!
//! Batch reads are best-effort: one unreachable contract must not blank
//! out the whole listing. Each batch type therefore carries the
//! campaigns that resolved alongside typed [`ReadFailure`] entries for
//! those that did not, and callers render both.
//!
//! Per-contract reads run concurrently under an individual timeout;
//! a slow contract costs one timeout, not the batch.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use givechain_common::chain::{ChainError, ChainGateway, ChainSummary};
use givechain_common::config::EngineConfig;
use givechain_common::store::{CampaignFilter, LedgerStore, StoreError};
use givechain_common::types::{
    hex_address, Address, CampaignRecord, CampaignStatus, DonationRecord, WithdrawalRecord,
};
use givechain_proto::{ConsistencyReport, FrozenMismatch, SkippedCampaign};

// ════════════════════════════════════════════════════════════════════════════
// CONFIG & ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Reader tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Timeout applied to each individual contract read, in
    /// milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            read_timeout_ms: 5_000,
        }
    }
}

impl From<&EngineConfig> for ReaderConfig {
    fn from(config: &EngineConfig) -> Self {
        ReaderConfig {
            read_timeout_ms: config.read_timeout_ms,
        }
    }
}

/// Errors from single-campaign reads. Batch reads do not fail on
/// individual contracts; they report [`ReadFailure`] entries instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("record store read failed: {0}")]
    Store(#[from] StoreError),

    #[error("chain read failed: {0}")]
    Chain(#[from] ChainError),

    #[error("campaign {0} has no deployed contract")]
    NoContract(String),
}

// ════════════════════════════════════════════════════════════════════════════
// BATCH TYPES
// ════════════════════════════════════════════════════════════════════════════

/// One campaign's merged view: the authoritative record plus the live
/// financial summary, when readable. `onchain` is `None` both for
/// undeployed campaigns and for failed reads; the latter also appear in
/// the batch's failure list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCampaign {
    pub record: CampaignRecord,
    pub onchain: Option<ChainSummary>,
}

/// A contract read that did not resolve within the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    pub campaign_id: String,
    /// `0x`-prefixed hex.
    pub contract_address: String,
    pub reason: String,
}

/// Result of a batch campaign listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBatch {
    /// Every matching campaign, in store order.
    pub campaigns: Vec<MergedCampaign>,
    /// Contract reads that failed or timed out.
    pub failures: Vec<ReadFailure>,
}

/// One event in the platform-wide transaction feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Donation(DonationRecord),
    Withdrawal(WithdrawalRecord),
}

/// A feed entry tagged with its campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub campaign_id: String,
    /// Block timestamp, Unix seconds. Duplicated from the event for
    /// sorting.
    pub timestamp: u64,
    pub event: FeedEvent,
}

/// Platform-wide transaction feed, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedBatch {
    pub items: Vec<FeedItem>,
    pub failures: Vec<ReadFailure>,
}

/// Aggregate platform statistics over all readable contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformTotals {
    pub campaigns: usize,
    pub active_campaigns: usize,
    pub collected_wei: u128,
    pub balance_wei: u128,
    pub donation_count: u64,
    /// Contracts excluded from the sums because their read failed.
    pub failed_reads: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// READER
// ════════════════════════════════════════════════════════════════════════════

/// Read-only composition of the record store and the chain. Never
/// writes to either ledger.
pub struct ReconciliationReader {
    chain: Arc<dyn ChainGateway>,
    store: Arc<dyn LedgerStore>,
    config: ReaderConfig,
}

impl ReconciliationReader {
    #[must_use]
    pub fn new(
        chain: Arc<dyn ChainGateway>,
        store: Arc<dyn LedgerStore>,
        config: ReaderConfig,
    ) -> Self {
        Self {
            chain,
            store,
            config,
        }
    }

    /// Lists campaigns matching `filter` with their live summaries.
    ///
    /// ## Errors
    ///
    /// [`ReconcileError::Store`] if the listing itself fails. Contract
    /// read failures are returned inside the batch, not as an error.
    pub async fn merged_campaigns(
        &self,
        filter: &CampaignFilter,
    ) -> Result<MergedBatch, ReconcileError> {
        let records = self.store.list_campaigns(filter).await?;

        let reads = join_all(records.iter().map(|record| {
            let contract = record.contract_address;
            async move {
                match contract {
                    Some(contract) => Some(self.read_summary_bounded(contract).await),
                    None => None,
                }
            }
        }))
        .await;

        let mut campaigns = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        for (record, read) in records.into_iter().zip(reads) {
            let onchain = match read {
                None => None,
                Some(Ok(summary)) => Some(summary),
                Some(Err(err)) => {
                    failures.push(ReadFailure {
                        campaign_id: record.id.clone(),
                        contract_address: address_of(&record),
                        reason: err.to_string(),
                    });
                    None
                }
            };
            campaigns.push(MergedCampaign { record, onchain });
        }

        Ok(MergedBatch {
            campaigns,
            failures,
        })
    }

    /// Donation log of one campaign, newest first.
    ///
    /// ## Errors
    ///
    /// - [`ReconcileError::Store`] / [`ReconcileError::NoContract`] on
    ///   the record side.
    /// - [`ReconcileError::Chain`] if the log read fails or times out.
    pub async fn campaign_donations(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<DonationRecord>, ReconcileError> {
        let contract = self.deployed_contract(campaign_id).await?;
        let mut log = self
            .bounded(self.chain.read_donations(contract))
            .await?;
        // Contracts report block order; readers want newest first.
        log.reverse();
        Ok(log)
    }

    /// Withdrawal log of one campaign, newest first.
    pub async fn campaign_withdrawals(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<WithdrawalRecord>, ReconcileError> {
        let contract = self.deployed_contract(campaign_id).await?;
        let mut log = self
            .bounded(self.chain.read_withdrawals(contract))
            .await?;
        log.reverse();
        Ok(log)
    }

    /// Platform-wide donation and withdrawal feed across every deployed
    /// campaign, newest first. Campaigns whose logs cannot be read are
    /// reported as failures and skipped.
    pub async fn transaction_feed(&self) -> Result<FeedBatch, ReconcileError> {
        let records = self.store.list_campaigns(&CampaignFilter::all()).await?;

        let reads = join_all(records.iter().filter_map(|record| {
            let contract = record.contract_address?;
            let campaign_id = record.id.clone();
            Some(async move {
                let logs = async {
                    let donations = self.bounded(self.chain.read_donations(contract)).await?;
                    let withdrawals =
                        self.bounded(self.chain.read_withdrawals(contract)).await?;
                    Ok::<_, ChainError>((donations, withdrawals))
                }
                .await;
                (campaign_id, contract, logs)
            })
        }))
        .await;

        let mut items = Vec::new();
        let mut failures = Vec::new();
        for (campaign_id, contract, logs) in reads {
            match logs {
                Ok((donations, withdrawals)) => {
                    items.extend(donations.into_iter().map(|d| FeedItem {
                        campaign_id: campaign_id.clone(),
                        timestamp: d.timestamp,
                        event: FeedEvent::Donation(d),
                    }));
                    items.extend(withdrawals.into_iter().map(|w| FeedItem {
                        campaign_id: campaign_id.clone(),
                        timestamp: w.timestamp,
                        event: FeedEvent::Withdrawal(w),
                    }));
                }
                Err(err) => failures.push(ReadFailure {
                    campaign_id,
                    contract_address: hex_address(&contract),
                    reason: err.to_string(),
                }),
            }
        }

        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(FeedBatch { items, failures })
    }

    /// Aggregate statistics over all campaigns. Sums cover readable
    /// contracts only; `failed_reads` says how many were excluded.
    pub async fn platform_totals(&self) -> Result<PlatformTotals, ReconcileError> {
        let batch = self.merged_campaigns(&CampaignFilter::all()).await?;

        let mut totals = PlatformTotals {
            campaigns: batch.campaigns.len(),
            failed_reads: batch.failures.len(),
            ..PlatformTotals::default()
        };
        for merged in &batch.campaigns {
            if merged.record.status == CampaignStatus::Active {
                totals.active_campaigns += 1;
            }
            if let Some(summary) = &merged.onchain {
                totals.collected_wei += summary.collected_wei;
                totals.balance_wei += summary.balance_wei;
                totals.donation_count += summary.donation_count;
            }
        }
        Ok(totals)
    }

    /// Compares every deployed campaign's cached frozen flag against
    /// its contract and reports divergences.
    ///
    /// Report-only: flagged campaigns are repaired by an admin retrying
    /// the moderation command, never by this pass. Unreadable contracts
    /// are reported as skipped, and a skip is not a pass.
    pub async fn check_consistency(
        &self,
        checked_at: u64,
    ) -> Result<ConsistencyReport, ReconcileError> {
        debug!("frozen-flag consistency pass starting");
        let batch = self.merged_campaigns(&CampaignFilter::all()).await?;

        let mut campaigns_checked = 0;
        let mut mismatches = Vec::new();
        for merged in &batch.campaigns {
            let summary = match &merged.onchain {
                Some(summary) => summary,
                None => continue,
            };
            campaigns_checked += 1;
            if summary.frozen != merged.record.is_frozen {
                warn!(
                    campaign = %merged.record.id,
                    onchain = summary.frozen,
                    offchain = merged.record.is_frozen,
                    "frozen flag diverged between ledgers"
                );
                mismatches.push(FrozenMismatch {
                    campaign_id: merged.record.id.clone(),
                    contract_address: address_of(&merged.record),
                    onchain_frozen: summary.frozen,
                    offchain_frozen: merged.record.is_frozen,
                });
            }
        }

        let skipped = batch
            .failures
            .into_iter()
            .map(|f| SkippedCampaign {
                campaign_id: f.campaign_id,
                contract_address: f.contract_address,
                reason: f.reason,
            })
            .collect();

        let is_consistent = mismatches.is_empty();
        Ok(ConsistencyReport {
            checked_at,
            campaigns_checked,
            mismatches,
            skipped,
            is_consistent,
        })
    }

    async fn deployed_contract(&self, campaign_id: &str) -> Result<Address, ReconcileError> {
        let record = self.store.get_campaign(campaign_id).await?;
        record
            .contract_address
            .ok_or_else(|| ReconcileError::NoContract(campaign_id.to_string()))
    }

    async fn read_summary_bounded(
        &self,
        contract: Address,
    ) -> Result<ChainSummary, ChainError> {
        self.bounded(self.chain.read_summary(contract)).await
    }

    /// Applies the per-read timeout; an elapsed timer becomes
    /// [`ChainError::Timeout`].
    async fn bounded<T>(
        &self,
        read: impl std::future::Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ChainError> {
        match tokio::time::timeout(Duration::from_millis(self.config.read_timeout_ms), read)
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout),
        }
    }
}

fn address_of(record: &CampaignRecord) -> String {
    record
        .contract_address
        .as_ref()
        .map(hex_address)
        .unwrap_or_default()
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use givechain_common::mock_chain::MockChainGateway;
    use givechain_common::mock_store::MockLedgerStore;

    fn record(
        id: &str,
        status: CampaignStatus,
        frozen: bool,
        contract: Option<Address>,
    ) -> CampaignRecord {
        CampaignRecord {
            id: id.to_string(),
            org_id: "o1".to_string(),
            title: "t".to_string(),
            contract_address: contract,
            status,
            is_frozen: frozen,
            target_fiat_cents: 0,
            target_wei: 1_000,
            rejection_reason: None,
            freeze_reason: None,
            frozen_at: None,
            frozen_by: None,
            approved_at: None,
            approved_by: None,
            created_at: 0,
        }
    }

    fn summary(collected: u128, frozen: bool) -> ChainSummary {
        ChainSummary {
            target_wei: 1_000,
            collected_wei: collected,
            balance_wei: collected,
            deadline: 2_000_000_000,
            active: true,
            frozen,
            donation_count: 2,
            donor_count: 2,
        }
    }

    fn donation(amount: u128, timestamp: u64) -> DonationRecord {
        DonationRecord {
            donor: [0xD0; 20],
            amount_wei: amount,
            message: None,
            timestamp,
        }
    }

    fn withdrawal(amount: u128, timestamp: u64) -> WithdrawalRecord {
        WithdrawalRecord {
            recipient: [0xE0; 20],
            amount_wei: amount,
            description: "supplies".to_string(),
            timestamp,
            completed: true,
        }
    }

    fn setup() -> (Arc<MockChainGateway>, Arc<MockLedgerStore>, ReconciliationReader) {
        let chain = Arc::new(MockChainGateway::new());
        let store = Arc::new(MockLedgerStore::new());
        let reader =
            ReconciliationReader::new(chain.clone(), store.clone(), ReaderConfig::default());
        (chain, store, reader)
    }

    #[tokio::test]
    async fn merged_batch_pairs_records_with_summaries() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        store.insert_campaign(record("c2", CampaignStatus::Draft, false, None));
        chain.set_summary([0xC1; 20], summary(250, false));

        let batch = reader
            .merged_campaigns(&CampaignFilter::all())
            .await
            .expect("batch");

        assert_eq!(batch.campaigns.len(), 2);
        assert!(batch.failures.is_empty());
        assert_eq!(
            batch.campaigns[0].onchain.as_ref().map(|s| s.collected_wei),
            Some(250)
        );
        // Undeployed campaign: no summary, no failure.
        assert!(batch.campaigns[1].onchain.is_none());
    }

    #[tokio::test]
    async fn unreachable_contract_is_a_typed_failure_not_an_error() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        store.insert_campaign(record("c2", CampaignStatus::Active, false, Some([0xC2; 20])));
        chain.set_summary([0xC1; 20], summary(100, false));
        chain.set_summary([0xC2; 20], summary(200, false));
        chain.set_unreachable([0xC2; 20], true);

        let batch = reader
            .merged_campaigns(&CampaignFilter::all())
            .await
            .expect("partial batch still resolves");

        assert_eq!(batch.campaigns.len(), 2);
        assert!(batch.campaigns[0].onchain.is_some());
        assert!(batch.campaigns[1].onchain.is_none());
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].campaign_id, "c2");
        assert!(batch.failures[0].reason.contains("unreachable"));
    }

    #[tokio::test]
    async fn slow_contract_times_out_without_stalling_the_batch() {
        let chain = Arc::new(MockChainGateway::new());
        let store = Arc::new(MockLedgerStore::new());
        let reader = ReconciliationReader::new(
            chain.clone(),
            store.clone(),
            ReaderConfig { read_timeout_ms: 20 },
        );
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        store.insert_campaign(record("c2", CampaignStatus::Active, false, Some([0xC2; 20])));
        chain.set_summary([0xC1; 20], summary(100, false));
        chain.set_summary([0xC2; 20], summary(200, false));
        chain.set_read_delay([0xC2; 20], Duration::from_millis(500));

        let batch = reader
            .merged_campaigns(&CampaignFilter::all())
            .await
            .expect("batch");

        // The fast contract resolves; the slow one costs one timeout.
        assert!(batch.campaigns[0].onchain.is_some());
        assert!(batch.campaigns[1].onchain.is_none());
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].campaign_id, "c2");
        assert!(batch.failures[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn donations_come_back_newest_first() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        chain.set_donations(
            [0xC1; 20],
            vec![donation(10, 100), donation(20, 200), donation(30, 300)],
        );

        let log = reader.campaign_donations("c1").await.expect("log");
        let stamps: Vec<u64> = log.iter().map(|d| d.timestamp).collect();
        assert_eq!(stamps, vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn undeployed_campaign_has_no_logs() {
        let (_, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::PendingApproval, false, None));

        let err = reader.campaign_donations("c1").await.unwrap_err();
        assert!(matches!(err, ReconcileError::NoContract(ref id) if id == "c1"));
    }

    #[tokio::test]
    async fn feed_merges_campaigns_and_sorts_newest_first() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        store.insert_campaign(record("c2", CampaignStatus::Active, false, Some([0xC2; 20])));
        chain.set_donations([0xC1; 20], vec![donation(10, 100), donation(30, 400)]);
        chain.set_withdrawals([0xC1; 20], vec![withdrawal(5, 300)]);
        chain.set_donations([0xC2; 20], vec![donation(20, 200)]);

        let feed = reader.transaction_feed().await.expect("feed");

        assert!(feed.failures.is_empty());
        let stamps: Vec<u64> = feed.items.iter().map(|i| i.timestamp).collect();
        assert_eq!(stamps, vec![400, 300, 200, 100]);
        assert!(matches!(feed.items[1].event, FeedEvent::Withdrawal(_)));
        assert_eq!(feed.items[2].campaign_id, "c2");
    }

    #[tokio::test]
    async fn feed_skips_unreadable_campaigns() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        store.insert_campaign(record("c2", CampaignStatus::Active, false, Some([0xC2; 20])));
        chain.set_donations([0xC1; 20], vec![donation(10, 100)]);
        chain.set_unreachable([0xC2; 20], true);

        let feed = reader.transaction_feed().await.expect("feed");

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.failures.len(), 1);
        assert_eq!(feed.failures[0].campaign_id, "c2");
    }

    #[tokio::test]
    async fn platform_totals_sum_readable_contracts_only() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        store.insert_campaign(record("c2", CampaignStatus::Ended, false, Some([0xC2; 20])));
        store.insert_campaign(record("c3", CampaignStatus::Active, false, Some([0xC3; 20])));
        chain.set_summary([0xC1; 20], summary(100, false));
        chain.set_summary([0xC2; 20], summary(400, false));
        chain.set_summary([0xC3; 20], summary(900, false));
        chain.set_unreachable([0xC3; 20], true);

        let totals = reader.platform_totals().await.expect("totals");

        assert_eq!(totals.campaigns, 3);
        assert_eq!(totals.active_campaigns, 2);
        assert_eq!(totals.collected_wei, 500);
        assert_eq!(totals.donation_count, 4);
        assert_eq!(totals.failed_reads, 1);
    }

    #[tokio::test]
    async fn consistency_pass_reports_divergence_and_skips() {
        let (chain, store, reader) = setup();
        // Diverged: contract frozen, record not.
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        chain.set_summary([0xC1; 20], summary(100, true));
        // Consistent.
        store.insert_campaign(record("c2", CampaignStatus::Frozen, true, Some([0xC2; 20])));
        chain.set_summary([0xC2; 20], summary(200, true));
        // Unreadable.
        store.insert_campaign(record("c3", CampaignStatus::Active, false, Some([0xC3; 20])));
        chain.set_unreachable([0xC3; 20], true);
        // Undeployed: not part of the pass at all.
        store.insert_campaign(record("c4", CampaignStatus::Draft, false, None));

        let report = reader.check_consistency(1_700_001_000).await.expect("report");

        assert_eq!(report.checked_at, 1_700_001_000);
        assert_eq!(report.campaigns_checked, 2);
        assert!(!report.is_consistent);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].campaign_id, "c1");
        assert!(report.mismatches[0].onchain_frozen);
        assert!(!report.mismatches[0].offchain_frozen);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].campaign_id, "c3");
    }

    #[tokio::test]
    async fn consistency_pass_is_clean_when_ledgers_agree() {
        let (chain, store, reader) = setup();
        store.insert_campaign(record("c1", CampaignStatus::Active, false, Some([0xC1; 20])));
        chain.set_summary([0xC1; 20], summary(100, false));

        let report = reader.check_consistency(1_700_001_000).await.expect("report");
        assert!(report.is_consistent);
        assert!(report.mismatches.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(report.campaigns_checked, 1);
    }

    #[test]
    fn reader_config_from_engine_config() {
        let mut engine = EngineConfig::default();
        engine.read_timeout_ms = 1_234;
        let reader = ReaderConfig::from(&engine);
        assert_eq!(reader.read_timeout_ms, 1_234);
    }
}
