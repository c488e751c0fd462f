//! # Givechain Common Crate
//!
//! Shared domain types and collaborator contracts for the givechain
//! moderation engine.
//!
//! ## Modules
//! - `types`: campaign records, statuses, on-chain read models, identities
//! - `chain`: `ChainGateway` trait — per-campaign contract reads/writes
//! - `store`: `LedgerStore` trait — off-chain records and audit log
//! - `mock_chain`: scripted in-memory chain for tests
//! - `mock_store`: in-memory ledger store for tests
//! - `config`: engine configuration
//!
//! ## Dual-Ledger Architecture
//! ```text
//! ┌──────────────────┐          ┌──────────────────┐
//! │   ChainGateway   │          │    LedgerStore   │
//! │  (money: truth)  │          │ (metadata: truth)│
//! └────────┬─────────┘          └────────┬─────────┘
//!          │                             │
//!     ┌────┴─────┐                  ┌────┴─────┐
//!     │          │                  │          │
//! ┌───▼────┐ ┌───▼──────┐      ┌────▼────┐ ┌───▼───────┐
//! │JSON-RPC│ │MockChain │      │  BaaS   │ │MockLedger │
//! │ client │ │ Gateway  │      │ client  │ │  Store    │
//! └────────┘ └──────────┘      └─────────┘ └───────────┘
//! ```
//!
//! The production JSON-RPC and BaaS clients live in the deployment
//! layer; this workspace ships the traits and the mocks the engine
//! tests run against.

pub mod chain;
pub mod config;
pub mod mock_chain;
pub mod mock_store;
pub mod store;
pub mod types;

pub use chain::{ChainError, ChainGateway, ChainSummary, PendingTx, TxReceipt};
pub use mock_chain::MockChainGateway;
pub use mock_store::MockLedgerStore;
pub use store::{
    AuditAction, AuditEntry, CampaignFilter, LedgerStore, ModerationUpdate, StoreError,
};
pub use types::{
    AdminIdentity, Address, CampaignRecord, CampaignStatus, DonationRecord, Signer,
    TxHash, WithdrawalRecord,
};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
