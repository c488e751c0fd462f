//! Mock chain gateway for tests.
//!
//! An in-memory [`ChainGateway`] with scripted behavior: per-contract
//! summaries and logs are seeded by the test, failures and read delays
//! are injected per contract or per operation, and confirmations are
//! served from a FIFO queue so a test can script reverts and delayed
//! outcomes.
//!
//! The mock additionally maintains the frozen flag of seeded summaries:
//! when a freeze or unfreeze transaction confirms successfully, the
//! contract's summary is updated — this is what lets consistency-check
//! tests observe a live on/off-chain mismatch after a simulated partial
//! failure.
//!
//! ## Thread safety
//!
//! All state sits behind `parking_lot` locks and atomics; the mock is
//! `Send + Sync` and safe behind `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::chain::{ChainError, ChainGateway, ChainSummary, PendingTx, TxReceipt};
use crate::types::{Address, DonationRecord, Signer, TxHash, WithdrawalRecord};

// ════════════════════════════════════════════════════════════════════════════
// MOCK CHAIN GATEWAY
// ════════════════════════════════════════════════════════════════════════════

/// Scripted in-memory chain.
#[derive(Default)]
pub struct MockChainGateway {
    /// Seeded summaries keyed by contract address.
    summaries: RwLock<HashMap<Address, ChainSummary>>,
    /// Seeded donation logs.
    donations: RwLock<HashMap<Address, Vec<DonationRecord>>>,
    /// Seeded withdrawal logs.
    withdrawals: RwLock<HashMap<Address, Vec<WithdrawalRecord>>>,
    /// Contracts whose reads fail with `ChainError::Unreachable`.
    unreachable: RwLock<HashSet<Address>>,
    /// Artificial latency applied to reads, per contract.
    read_delays: RwLock<HashMap<Address, Duration>>,
    /// Error returned by the next submit call, if set.
    next_submit_error: Mutex<Option<ChainError>>,
    /// Scripted confirmation outcomes, consumed FIFO. When empty,
    /// confirmations succeed with the pending hash and an
    /// auto-incremented block number.
    confirmations: Mutex<Vec<Result<TxReceipt, ChainError>>>,
    /// Pending writes by tx hash: (contract, frozen flag to apply).
    pending_writes: Mutex<HashMap<TxHash, (Address, bool)>>,
    /// Log of submitted writes: (contract, `true` for freeze).
    submitted: Mutex<Vec<(Address, bool)>>,
    /// Nonce for generated tx hashes and default block numbers.
    nonce: AtomicU64,
    /// Count of submit calls that reached the network.
    write_calls: AtomicU64,
    /// Count of read calls, including those that failed.
    read_calls: AtomicU64,
}

impl MockChainGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds (or replaces) the summary for a contract.
    pub fn set_summary(&self, contract: Address, summary: ChainSummary) {
        self.summaries.write().insert(contract, summary);
    }

    /// Seeds the donation log for a contract.
    pub fn set_donations(&self, contract: Address, log: Vec<DonationRecord>) {
        self.donations.write().insert(contract, log);
    }

    /// Seeds the withdrawal log for a contract.
    pub fn set_withdrawals(&self, contract: Address, log: Vec<WithdrawalRecord>) {
        self.withdrawals.write().insert(contract, log);
    }

    /// Makes every read against `contract` fail with
    /// [`ChainError::Unreachable`] until cleared.
    pub fn set_unreachable(&self, contract: Address, unreachable: bool) {
        if unreachable {
            self.unreachable.write().insert(contract);
        } else {
            self.unreachable.write().remove(&contract);
        }
    }

    /// Delays every read against `contract` by `delay`, so timeout
    /// handling can be exercised.
    pub fn set_read_delay(&self, contract: Address, delay: Duration) {
        self.read_delays.write().insert(contract, delay);
    }

    /// Makes the next submit call fail with `error`.
    pub fn fail_next_submit(&self, error: ChainError) {
        *self.next_submit_error.lock() = Some(error);
    }

    /// Pushes a scripted confirmation outcome (FIFO).
    pub fn push_confirmation(&self, outcome: Result<TxReceipt, ChainError>) {
        self.confirmations.lock().push(outcome);
    }

    /// Number of submit calls that reached the network.
    #[must_use]
    pub fn write_call_count(&self) -> u64 {
        self.write_calls.load(Ordering::Relaxed)
    }

    /// Number of read calls received, including failed ones.
    #[must_use]
    pub fn read_call_count(&self) -> u64 {
        self.read_calls.load(Ordering::Relaxed)
    }

    /// Log of submitted writes as (contract, is_freeze) pairs.
    #[must_use]
    pub fn submitted_writes(&self) -> Vec<(Address, bool)> {
        self.submitted.lock().clone()
    }

    /// Current frozen flag of a seeded summary, if present.
    #[must_use]
    pub fn frozen_flag(&self, contract: Address) -> Option<bool> {
        self.summaries.read().get(&contract).map(|s| s.frozen)
    }

    fn next_hash(&self) -> TxHash {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed) + 1;
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&nonce.to_be_bytes());
        hash
    }

    fn submit(
        &self,
        contract: Address,
        _signer: &Signer,
        freeze: bool,
    ) -> Result<PendingTx, ChainError> {
        if let Some(err) = self.next_submit_error.lock().take() {
            return Err(err);
        }
        if self.unreachable.read().contains(&contract) {
            return Err(ChainError::Unreachable("mock: contract unreachable".to_string()));
        }

        self.write_calls.fetch_add(1, Ordering::Relaxed);
        self.submitted.lock().push((contract, freeze));

        let hash = self.next_hash();
        self.pending_writes.lock().insert(hash, (contract, freeze));

        Ok(PendingTx {
            hash,
            submitted_at: 0,
        })
    }

    /// Common front half of every read: count it, apply the scripted
    /// latency, then fail if the contract is marked unreachable.
    async fn serve_read(&self, contract: &Address) -> Result<(), ChainError> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        let delay = self.read_delays.read().get(contract).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.read().contains(contract) {
            return Err(ChainError::Unreachable("mock: contract unreachable".to_string()));
        }
        Ok(())
    }

    fn apply_frozen(&self, hash: &TxHash) {
        if let Some((contract, frozen)) = self.pending_writes.lock().remove(hash) {
            if let Some(summary) = self.summaries.write().get_mut(&contract) {
                summary.frozen = frozen;
            }
        }
    }
}

#[async_trait]
impl ChainGateway for MockChainGateway {
    async fn read_summary(&self, contract: Address) -> Result<ChainSummary, ChainError> {
        self.serve_read(&contract).await?;
        self.summaries
            .read()
            .get(&contract)
            .cloned()
            .ok_or(ChainError::ContractNotFound(contract))
    }

    async fn read_donations(
        &self,
        contract: Address,
    ) -> Result<Vec<DonationRecord>, ChainError> {
        self.serve_read(&contract).await?;
        Ok(self.donations.read().get(&contract).cloned().unwrap_or_default())
    }

    async fn read_withdrawals(
        &self,
        contract: Address,
    ) -> Result<Vec<WithdrawalRecord>, ChainError> {
        self.serve_read(&contract).await?;
        Ok(self.withdrawals.read().get(&contract).cloned().unwrap_or_default())
    }

    async fn submit_freeze(
        &self,
        contract: Address,
        signer: &Signer,
    ) -> Result<PendingTx, ChainError> {
        self.submit(contract, signer, true)
    }

    async fn submit_unfreeze(
        &self,
        contract: Address,
        signer: &Signer,
    ) -> Result<PendingTx, ChainError> {
        self.submit(contract, signer, false)
    }

    async fn await_confirmation(&self, pending: PendingTx) -> Result<TxReceipt, ChainError> {
        let scripted = {
            let mut queue = self.confirmations.lock();
            if queue.is_empty() {
                None
            } else {
                // FIFO: consume from the front.
                Some(queue.remove(0))
            }
        };

        match scripted {
            Some(Ok(receipt)) => {
                if receipt.success {
                    self.apply_frozen(&pending.hash);
                } else {
                    self.pending_writes.lock().remove(&pending.hash);
                }
                Ok(receipt)
            }
            Some(Err(err)) => {
                self.pending_writes.lock().remove(&pending.hash);
                Err(err)
            }
            None => {
                self.apply_frozen(&pending.hash);
                Ok(TxReceipt {
                    hash: pending.hash,
                    block_number: self.nonce.load(Ordering::Relaxed),
                    success: true,
                })
            }
        }
    }
}

// Shared across async tasks in reader tests.
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<MockChainGateway>();
    }
    let _ = check;
};

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(frozen: bool) -> ChainSummary {
        ChainSummary {
            target_wei: 1_000,
            collected_wei: 250,
            balance_wei: 250,
            deadline: 2_000_000_000,
            active: true,
            frozen,
            donation_count: 3,
            donor_count: 2,
        }
    }

    fn signer() -> Signer {
        Signer { address: [0xAD; 20] }
    }

    #[tokio::test]
    async fn summary_read_and_not_found() {
        let chain = MockChainGateway::new();
        chain.set_summary([0xC1; 20], summary(false));

        let ok = chain.read_summary([0xC1; 20]).await;
        assert!(ok.is_ok());

        let missing = chain.read_summary([0xC2; 20]).await;
        assert_eq!(missing, Err(ChainError::ContractNotFound([0xC2; 20])));
    }

    #[tokio::test]
    async fn unreachable_contract_fails_reads() {
        let chain = MockChainGateway::new();
        chain.set_summary([0xC1; 20], summary(false));
        chain.set_unreachable([0xC1; 20], true);

        assert!(matches!(
            chain.read_summary([0xC1; 20]).await,
            Err(ChainError::Unreachable(_))
        ));

        chain.set_unreachable([0xC1; 20], false);
        assert!(chain.read_summary([0xC1; 20]).await.is_ok());
    }

    #[tokio::test]
    async fn confirmed_freeze_flips_summary_flag() {
        let chain = MockChainGateway::new();
        chain.set_summary([0xC1; 20], summary(false));

        let pending = chain
            .submit_freeze([0xC1; 20], &signer())
            .await
            .expect("submit");
        let receipt = chain.await_confirmation(pending).await.expect("confirm");

        assert!(receipt.success);
        assert_eq!(chain.frozen_flag([0xC1; 20]), Some(true));
        assert_eq!(chain.write_call_count(), 1);
        assert_eq!(chain.submitted_writes(), vec![([0xC1; 20], true)]);
    }

    #[tokio::test]
    async fn scripted_revert_leaves_flag_unchanged() {
        let chain = MockChainGateway::new();
        chain.set_summary([0xC1; 20], summary(false));
        chain.push_confirmation(Ok(TxReceipt {
            hash: [0x71; 32],
            block_number: 1000,
            success: false,
        }));

        let pending = chain
            .submit_freeze([0xC1; 20], &signer())
            .await
            .expect("submit");
        let receipt = chain.await_confirmation(pending).await.expect("confirm");

        assert!(!receipt.success);
        assert_eq!(chain.frozen_flag([0xC1; 20]), Some(false));
    }

    #[tokio::test]
    async fn next_submit_error_consumed_once() {
        let chain = MockChainGateway::new();
        chain.set_summary([0xC1; 20], summary(false));
        chain.fail_next_submit(ChainError::UserRejected);

        let first = chain.submit_freeze([0xC1; 20], &signer()).await;
        assert_eq!(first, Err(ChainError::UserRejected));
        assert_eq!(chain.write_call_count(), 0);

        let second = chain.submit_freeze([0xC1; 20], &signer()).await;
        assert!(second.is_ok());
        assert_eq!(chain.write_call_count(), 1);
    }
}
