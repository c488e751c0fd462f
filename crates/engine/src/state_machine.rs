//! # Campaign State Machine
//!
//! Pure validation of moderation commands against the campaign
//! lifecycle. Given the current status, the frozen flag and a command,
//! [`validate_transition`] either names the resulting status or
//! explains why the command is not allowed.
//!
//! ## Design
//!
//! This module is deliberately free of I/O, clocks and collaborators:
//! same inputs, same answer, every time. The orchestrator consults it
//! before touching either ledger, so an invalid command is rejected
//! with zero writes anywhere.
//!
//! ## Lifecycle
//!
//! ```text
//!  draft ──▶ pending_approval ──▶ active ◀──▶ frozen
//!                   │                │           │
//!                   ▼                ▼           ▼
//!               rejected           ended ◀───────┘
//! ```
//!
//! `rejected` and `ended` are terminal; no command leads out of them.
//! `frozen` is a moderation hold, not an end state — the campaign
//! returns to `active` on unfreeze or is closed out with `end`.

use std::fmt;

use givechain_common::types::CampaignStatus;

// ════════════════════════════════════════════════════════════════════════════
// MODERATION COMMAND
// ════════════════════════════════════════════════════════════════════════════

/// Closed set of admin moderation commands.
///
/// Commands that suspend fundraising (`Freeze`, `Ban`) or close a
/// submission (`Reject`) must carry a non-empty human-readable reason;
/// the reason ends up in moderation metadata and the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationCommand {
    /// Approve a submitted campaign for fundraising.
    Approve,
    /// Reject a submitted campaign.
    Reject { reason: String },
    /// Suspend an active campaign, on chain and off.
    Freeze { reason: String },
    /// Lift a suspension.
    Unfreeze,
    /// Close fundraising for good.
    End,
    /// Ban the owning organization, freezing every active campaign it
    /// runs. Validates per campaign exactly like [`Self::Freeze`].
    Ban { reason: String },
}

impl ModerationCommand {
    /// Lowercase command name for messages and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::Freeze { .. } => "freeze",
            Self::Unfreeze => "unfreeze",
            Self::End => "end",
            Self::Ban { .. } => "ban",
        }
    }

    /// The moderator-supplied reason, if this command carries one.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Reject { reason } | Self::Freeze { reason } | Self::Ban { reason } => {
                Some(reason.as_str())
            }
            Self::Approve | Self::Unfreeze | Self::End => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TRANSITION ERROR
// ════════════════════════════════════════════════════════════════════════════

/// Why a command was refused. Purely diagnostic; refusal never has side
/// effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The command does not apply to the campaign's current state.
    InvalidTransition {
        status: CampaignStatus,
        is_frozen: bool,
        command: &'static str,
    },
    /// The command requires a reason and none (or a blank one) was
    /// given.
    MissingReason { command: &'static str },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition {
                status,
                is_frozen,
                command,
            } => write!(
                f,
                "cannot {} a campaign in status {}{}",
                command,
                status,
                if *is_frozen { " (frozen)" } else { "" }
            ),
            Self::MissingReason { command } => {
                write!(f, "{} requires a non-empty reason", command)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

// ════════════════════════════════════════════════════════════════════════════
// TRANSITION VALIDATION
// ════════════════════════════════════════════════════════════════════════════

/// Checks only the reason requirement of `command`.
///
/// Needs no record state, so callers can refuse a blank reason before
/// loading anything. [`validate_transition`] runs this first.
///
/// ## Errors
///
/// [`TransitionError::MissingReason`] if a reason-bearing command
/// carries a blank reason.
pub fn validate_reason(command: &ModerationCommand) -> Result<(), TransitionError> {
    if let Some(reason) = command.reason() {
        if reason.trim().is_empty() {
            return Err(TransitionError::MissingReason {
                command: command.name(),
            });
        }
    }
    Ok(())
}

/// Validates `command` against the current campaign state and returns
/// the status the campaign will hold once the command completes.
///
/// The transition table:
///
/// | command       | requires                       | resulting status |
/// |---------------|--------------------------------|------------------|
/// | approve       | `pending_approval`, not frozen | `active`         |
/// | reject        | `pending_approval`, reason     | `rejected`       |
/// | freeze / ban  | `active`, not frozen, reason   | `frozen`         |
/// | unfreeze      | `frozen`                       | `active`         |
/// | end           | `active` or `frozen`           | `ended`          |
///
/// Everything else is [`TransitionError::InvalidTransition`]. Reason
/// checks run first, so a blank-reason freeze on an ended campaign
/// reports the missing reason.
///
/// ## Errors
///
/// - [`TransitionError::MissingReason`] if a reason-bearing command
///   carries a blank reason.
/// - [`TransitionError::InvalidTransition`] otherwise.
pub fn validate_transition(
    status: CampaignStatus,
    is_frozen: bool,
    command: &ModerationCommand,
) -> Result<CampaignStatus, TransitionError> {
    validate_reason(command)?;

    let refused = || TransitionError::InvalidTransition {
        status,
        is_frozen,
        command: command.name(),
    };

    match command {
        ModerationCommand::Approve => {
            if status == CampaignStatus::PendingApproval && !is_frozen {
                Ok(CampaignStatus::Active)
            } else {
                Err(refused())
            }
        }
        ModerationCommand::Reject { .. } => {
            if status == CampaignStatus::PendingApproval {
                Ok(CampaignStatus::Rejected)
            } else {
                Err(refused())
            }
        }
        ModerationCommand::Freeze { .. } | ModerationCommand::Ban { .. } => {
            if status == CampaignStatus::Active && !is_frozen {
                Ok(CampaignStatus::Frozen)
            } else {
                Err(refused())
            }
        }
        ModerationCommand::Unfreeze => {
            if status == CampaignStatus::Frozen {
                Ok(CampaignStatus::Active)
            } else {
                Err(refused())
            }
        }
        ModerationCommand::End => {
            if matches!(status, CampaignStatus::Active | CampaignStatus::Frozen) {
                Ok(CampaignStatus::Ended)
            } else {
                Err(refused())
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use CampaignStatus::*;

    const ALL_STATUSES: [CampaignStatus; 6] =
        [Draft, PendingApproval, Active, Ended, Frozen, Rejected];

    fn commands() -> Vec<ModerationCommand> {
        vec![
            ModerationCommand::Approve,
            ModerationCommand::Reject {
                reason: "incomplete documents".to_string(),
            },
            ModerationCommand::Freeze {
                reason: "fraud investigation".to_string(),
            },
            ModerationCommand::Unfreeze,
            ModerationCommand::End,
            ModerationCommand::Ban {
                reason: "organization banned".to_string(),
            },
        ]
    }

    /// The expected result for every (status, frozen, command) cell,
    /// `None` meaning the command is refused.
    fn expected(
        status: CampaignStatus,
        is_frozen: bool,
        command: &ModerationCommand,
    ) -> Option<CampaignStatus> {
        match command {
            ModerationCommand::Approve => {
                (status == PendingApproval && !is_frozen).then_some(Active)
            }
            ModerationCommand::Reject { .. } => {
                (status == PendingApproval).then_some(Rejected)
            }
            ModerationCommand::Freeze { .. } | ModerationCommand::Ban { .. } => {
                (status == Active && !is_frozen).then_some(Frozen)
            }
            ModerationCommand::Unfreeze => (status == Frozen).then_some(Active),
            ModerationCommand::End => {
                matches!(status, Active | Frozen).then_some(Ended)
            }
        }
    }

    #[test]
    fn full_transition_table() {
        for status in ALL_STATUSES {
            for is_frozen in [false, true] {
                for command in commands() {
                    let got = validate_transition(status, is_frozen, &command);
                    match expected(status, is_frozen, &command) {
                        Some(next) => assert_eq!(
                            got,
                            Ok(next),
                            "{} on {}/frozen={}",
                            command.name(),
                            status,
                            is_frozen
                        ),
                        None => assert_eq!(
                            got,
                            Err(TransitionError::InvalidTransition {
                                status,
                                is_frozen,
                                command: command.name(),
                            }),
                            "{} on {}/frozen={}",
                            command.name(),
                            status,
                            is_frozen
                        ),
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_states_refuse_every_command() {
        for status in [Ended, Rejected] {
            for command in commands() {
                assert!(
                    validate_transition(status, false, &command).is_err(),
                    "{} must be refused on {}",
                    command.name(),
                    status
                );
            }
        }
    }

    #[test]
    fn blank_reason_is_refused_before_state_check() {
        for command in [
            ModerationCommand::Reject {
                reason: "   ".to_string(),
            },
            ModerationCommand::Freeze {
                reason: String::new(),
            },
            ModerationCommand::Ban {
                reason: "\t".to_string(),
            },
        ] {
            let err = validate_transition(Ended, false, &command).unwrap_err();
            assert_eq!(
                err,
                TransitionError::MissingReason {
                    command: command.name()
                }
            );
        }
    }

    #[test]
    fn reason_check_is_independent_of_state() {
        assert!(validate_reason(&ModerationCommand::Unfreeze).is_ok());
        assert!(validate_reason(&ModerationCommand::Freeze {
            reason: "fraud".to_string()
        })
        .is_ok());
        assert_eq!(
            validate_reason(&ModerationCommand::Ban {
                reason: " ".to_string()
            }),
            Err(TransitionError::MissingReason { command: "ban" })
        );
    }

    #[test]
    fn validation_is_deterministic() {
        let cmd = ModerationCommand::Freeze {
            reason: "r".to_string(),
        };
        let a = validate_transition(Active, false, &cmd);
        let b = validate_transition(Active, false, &cmd);
        assert_eq!(a, b);
        assert_eq!(a, Ok(Frozen));
    }

    #[test]
    fn error_display_names_state_and_command() {
        let err = TransitionError::InvalidTransition {
            status: Frozen,
            is_frozen: true,
            command: "approve",
        };
        let msg = err.to_string();
        assert!(msg.contains("approve"));
        assert!(msg.contains("frozen"));
    }
}
