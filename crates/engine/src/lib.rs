//! # Givechain Engine Crate
//!
//! Campaign lifecycle and dual-ledger consistency engine: the pure
//! state machine, the moderation orchestrator that writes to both
//! ledgers in a fixed order, and the reconciliation reader that
//! composes them on the way out.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        givechain engine                        │
//! └────────────────────────────────────────────────────────────────┘
//!
//!        admin command                       public read
//!              │                                  │
//!              ▼                                  ▼
//!   ┌─────────────────────┐          ┌──────────────────────────┐
//!   │ ModerationOrchestr. │          │   ReconciliationReader   │
//!   │ validate ▶ chain ▶  │          │  record + live summary,  │
//!   │ persist ▶ audit     │          │  feeds, consistency pass │
//!   └─────┬─────────┬─────┘          └──────┬────────────┬──────┘
//!         │         │                       │            │
//!         ▼         ▼                       ▼            ▼
//!   ┌──────────┐ ┌─────────────┐     ┌──────────┐ ┌─────────────┐
//!   │ChainGate │ │ LedgerStore │     │ChainGate │ │ LedgerStore │
//!   │way (tx)  │ │ (metadata)  │     │way (read)│ │ (records)   │
//!   └──────────┘ └─────────────┘     └──────────┘ └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state_machine`]: pure command validation against the lifecycle
//! - [`moderation`]: the sole writer of moderation state, implementing
//!   the chain-before-store protocol and its partial-failure semantics
//! - [`reconciliation`]: best-effort merged reads and the report-only
//!   frozen-flag consistency pass

pub mod moderation;
pub mod reconciliation;
pub mod state_machine;

pub use moderation::{
    BanFailure, BanOutcome, ModerationError, ModerationOrchestrator, ModerationOutcome,
};
pub use reconciliation::{
    FeedBatch, FeedEvent, FeedItem, MergedBatch, MergedCampaign, PlatformTotals,
    ReadFailure, ReaderConfig, ReconcileError, ReconciliationReader,
};
pub use state_machine::{
    validate_reason, validate_transition, ModerationCommand, TransitionError,
};
