//! # Givechain Proto Crate
//!
//! Serializable schemas shared between the moderation engine and its
//! consumers: the consistency report emitted by the reconciliation
//! checker, and the structured detail payload attached to audit log
//! entries.
//!
//! ## Modules
//!
//! - [`consistency`]: [`ConsistencyReport`] and related types for the
//!   frozen-flag consistency pass
//! - [`audit`]: [`AuditDetails`], the JSON detail payload of an audit
//!   log entry
//!
//! This crate is a data contract, not behavior: plain serde structs
//! with no dependency on the engine or its collaborator traits, so
//! dashboards and external tooling can consume the reports without
//! pulling in the engine stack.

pub mod audit;
pub mod consistency;

pub use audit::{AffectedCampaign, AuditDetails};
pub use consistency::{ConsistencyReport, FrozenMismatch, SkippedCampaign};
