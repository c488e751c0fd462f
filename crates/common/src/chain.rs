//! Chain Gateway Abstraction
//!
//! Defines the [`ChainGateway`] trait, the contract between the
//! moderation engine and the per-campaign smart contracts on the
//! Ethereum-compatible chain. The engine never speaks a wire protocol
//! itself; it consumes read calls (summary, donation and withdrawal
//! logs) and write calls (freeze, unfreeze) through this trait.
//!
//! ## Write semantics
//!
//! A write is a two-step, user-attended operation: `submit_*` hands the
//! transaction to the signer's wallet and returns a [`PendingTx`] once
//! the network has accepted it; [`ChainGateway::await_confirmation`]
//! blocks until the transaction is mined and yields a [`TxReceipt`].
//! Once submitted, a transaction cannot be cancelled — only awaited.
//!
//! ## Contract for implementors
//!
//! - Thread-safe (`Send + Sync`), usable behind `Arc<dyn ChainGateway>`.
//! - No internal retry; retry policy belongs to callers.
//! - Must not panic; every failure maps to a [`ChainError`] variant.
//! - Reads are side-effect free and safe to issue concurrently.

use std::fmt;

use async_trait::async_trait;

use crate::types::{Address, DonationRecord, Signer, TxHash, WithdrawalRecord};

// ════════════════════════════════════════════════════════════════════════════
// SUMMARY
// ════════════════════════════════════════════════════════════════════════════

/// Aggregate financial and lifecycle state reported by a campaign
/// contract in a single read.
///
/// These values are the on-chain source of truth for money; the
/// off-chain record store never persists them authoritatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSummary {
    /// Fundraising target in wei, as configured at deployment.
    pub target_wei: u128,
    /// Total donated so far in wei.
    pub collected_wei: u128,
    /// Current withdrawable balance in wei.
    pub balance_wei: u128,
    /// Fundraising deadline, Unix seconds.
    pub deadline: u64,
    /// Whether the contract still accepts donations.
    pub active: bool,
    /// The contract's frozen flag.
    pub frozen: bool,
    /// Number of donations received.
    pub donation_count: u64,
    /// Number of distinct donor addresses.
    pub donor_count: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// PENDING TRANSACTION & RECEIPT
// ════════════════════════════════════════════════════════════════════════════

/// A submitted, not-yet-mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    /// Hash assigned at submission time.
    pub hash: TxHash,
    /// Unix seconds at which the wallet reported submission.
    pub submitted_at: u64,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub hash: TxHash,
    /// Block the transaction was mined in.
    pub block_number: u64,
    /// `false` if the transaction reverted on-chain.
    pub success: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// CHAIN ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Errors from chain reads and writes.
///
/// None of these imply any persistent side effect on the engine's side:
/// a failed write leaves both ledgers in their prior state and the
/// whole command is safe to retry from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// RPC endpoint unreachable or network-level failure.
    Unreachable(String),
    /// No contract code at the given address.
    ContractNotFound(Address),
    /// The signer's wallet declined to sign the transaction.
    UserRejected,
    /// The signer's account cannot cover gas for the write.
    InsufficientFunds,
    /// The transaction was mined but reverted.
    Reverted(TxHash),
    /// The operation did not complete within the caller's deadline.
    Timeout,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "chain unreachable: {}", msg),
            Self::ContractNotFound(addr) => {
                write!(f, "no contract at {}", crate::types::hex_address(addr))
            }
            Self::UserRejected => write!(f, "signature rejected by wallet"),
            Self::InsufficientFunds => write!(f, "insufficient funds for gas"),
            Self::Reverted(hash) => {
                write!(f, "transaction {} reverted", crate::types::hex_tx_hash(hash))
            }
            Self::Timeout => write!(f, "chain operation timed out"),
        }
    }
}

impl std::error::Error for ChainError {}

// ════════════════════════════════════════════════════════════════════════════
// CHAIN GATEWAY TRAIT
// ════════════════════════════════════════════════════════════════════════════

/// Read and write access to per-campaign contracts.
///
/// Object-safe so callers hold `Arc<dyn ChainGateway>` and tests swap
/// in [`crate::mock_chain::MockChainGateway`].
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Reads the aggregate summary of one campaign contract.
    ///
    /// ## Errors
    ///
    /// - [`ChainError::Unreachable`] on RPC failure.
    /// - [`ChainError::ContractNotFound`] if no contract exists at
    ///   `contract`.
    async fn read_summary(&self, contract: Address) -> Result<ChainSummary, ChainError>;

    /// Reads the full donation log of one contract, in block order.
    async fn read_donations(
        &self,
        contract: Address,
    ) -> Result<Vec<DonationRecord>, ChainError>;

    /// Reads the full withdrawal log of one contract, in block order.
    async fn read_withdrawals(
        &self,
        contract: Address,
    ) -> Result<Vec<WithdrawalRecord>, ChainError>;

    /// Submits a freeze transaction against `contract` using the
    /// caller's signer. Returns once the network has accepted the
    /// transaction; confirmation is a separate await.
    ///
    /// ## Errors
    ///
    /// - [`ChainError::UserRejected`] if the wallet declines to sign.
    /// - [`ChainError::InsufficientFunds`] if gas cannot be covered.
    /// - [`ChainError::Unreachable`] on network failure.
    async fn submit_freeze(
        &self,
        contract: Address,
        signer: &Signer,
    ) -> Result<PendingTx, ChainError>;

    /// Submits an unfreeze transaction. Same semantics as
    /// [`ChainGateway::submit_freeze`].
    async fn submit_unfreeze(
        &self,
        contract: Address,
        signer: &Signer,
    ) -> Result<PendingTx, ChainError>;

    /// Blocks until `pending` is mined and returns its receipt.
    ///
    /// A mined-but-reverted transaction is returned as a receipt with
    /// `success == false`, not as an error; callers decide how to
    /// surface reverts.
    ///
    /// ## Errors
    ///
    /// - [`ChainError::Unreachable`] if the RPC connection drops.
    /// - [`ChainError::Timeout`] if the node gives up waiting.
    async fn await_confirmation(&self, pending: PendingTx) -> Result<TxReceipt, ChainError>;
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert!(ChainError::Unreachable("conn refused".into())
            .to_string()
            .contains("conn refused"));
        assert!(ChainError::ContractNotFound([0xC1; 20])
            .to_string()
            .contains("0xc1"));
        assert!(ChainError::UserRejected.to_string().contains("rejected"));
        assert!(ChainError::InsufficientFunds
            .to_string()
            .contains("insufficient"));
        assert!(ChainError::Reverted([0xAB; 32]).to_string().contains("reverted"));
        assert!(ChainError::Timeout.to_string().contains("timed out"));
    }

    #[test]
    fn receipt_carries_revert_flag() {
        let receipt = TxReceipt {
            hash: [0x01; 32],
            block_number: 1000,
            success: false,
        };
        assert!(!receipt.success);
        assert_eq!(receipt.block_number, 1000);
    }
}
