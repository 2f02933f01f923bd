//! # Thread Lifecycle State Machine
//!
//! ## States
//!
//! | State | Code | Join | Post / like |
//! |---|---|---|---|
//! | `NotStarted` | 0 | if `JoinPolicy::while_not_started` | no |
//! | *(reserved)* | 1 | n/a | n/a |
//! | `Paused` | 2 | if `JoinPolicy::while_paused` | no |
//! | `Active` | 3 | yes | yes |
//! | `Ended` | 4 | no | no |
//!
//! Code 1 is kept unused so the numeric encoding matches the one clients
//! already decode (`Paused = 2`, `Active = 3`, `Ended = 4`).
//!
//! `Ended` is absorbing: every transition out of it fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use zkt_core::{ThreadId, ThreadsError};

// ─── Thread Status ───────────────────────────────────────────────────

/// Lifecycle state of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadStatus {
    /// Created, accepting enrollment, not yet open for discussion.
    NotStarted,
    /// Temporarily closed for discussion.
    Paused,
    /// Open for discussion.
    Active,
    /// Permanently closed (terminal).
    Ended,
}

impl ThreadStatus {
    /// Numeric code of this status.
    pub fn code(&self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::Paused => 2,
            Self::Active => 3,
            Self::Ended => 4,
        }
    }

    /// Decode a numeric status. Code 1 is reserved and decodes to `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NotStarted),
            2 => Some(Self::Paused),
            3 => Some(Self::Active),
            4 => Some(Self::Ended),
            _ => None,
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Paused => "PAUSED",
            Self::Active => "ACTIVE",
            Self::Ended => "ENDED",
        };
        f.write_str(s)
    }
}

// ─── Join Policy ─────────────────────────────────────────────────────

/// Which non-active states accept new members.
///
/// `Active` always accepts joins and `Ended` never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinPolicy {
    /// Allow pre-launch enrollment.
    pub while_not_started: bool,
    /// Allow enrollment while discussion is paused.
    pub while_paused: bool,
}

impl Default for JoinPolicy {
    fn default() -> Self {
        Self {
            while_not_started: true,
            while_paused: false,
        }
    }
}

impl JoinPolicy {
    /// Whether a thread in `status` accepts a join.
    pub fn permits(&self, status: ThreadStatus) -> bool {
        match status {
            ThreadStatus::NotStarted => self.while_not_started,
            ThreadStatus::Paused => self.while_paused,
            ThreadStatus::Active => true,
            ThreadStatus::Ended => false,
        }
    }

    fn requirement(&self) -> &'static str {
        match (self.while_not_started, self.while_paused) {
            (true, true) => "Not Started, Active or Paused",
            (true, false) => "Not Started or Active",
            (false, true) => "Active or Paused",
            (false, false) => "Active",
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from lifecycle checks and transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Requested state change is not valid from the current state.
    #[error("invalid transition {from} -> {to}: state should be {requirement}")]
    InvalidTransition {
        /// Current state.
        from: ThreadStatus,
        /// Attempted target state.
        to: ThreadStatus,
        /// Precondition that failed.
        requirement: &'static str,
    },

    /// The current state does not permit this action.
    #[error("{action} not permitted in {state}: state should be {requirement}")]
    ActionNotPermitted {
        /// Current state.
        state: ThreadStatus,
        /// Rejected action, e.g. `"join"`.
        action: &'static str,
        /// Precondition that failed.
        requirement: &'static str,
    },
}

impl LifecycleError {
    /// Attach the thread id and lift into the protocol error.
    pub fn into_threads_error(self, thread_id: ThreadId) -> ThreadsError {
        match self {
            Self::InvalidTransition {
                from,
                to,
                requirement,
            } => ThreadsError::InvalidTransition {
                thread_id,
                from: from.to_string(),
                attempted: to.to_string(),
                requirement: requirement.to_string(),
            },
            Self::ActionNotPermitted {
                state,
                action,
                requirement,
            } => ThreadsError::InvalidTransition {
                thread_id,
                from: state.to_string(),
                attempted: action.to_string(),
                requirement: requirement.to_string(),
            },
        }
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// One applied state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before.
    pub from_state: ThreadStatus,
    /// State after.
    pub to_state: ThreadStatus,
    /// Protocol sequence number of the operation that applied it.
    pub sequence: u64,
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// A thread's lifecycle state and its transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadLifecycle {
    /// Current state.
    pub status: ThreadStatus,
    /// Ordered log of applied transitions.
    pub transitions: Vec<TransitionRecord>,
}

impl Default for ThreadLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadLifecycle {
    /// A freshly created thread.
    pub fn new() -> Self {
        Self {
            status: ThreadStatus::NotStarted,
            transitions: Vec::new(),
        }
    }

    /// NOT_STARTED → ACTIVE.
    pub fn start(&mut self, sequence: u64) -> Result<ThreadStatus, LifecycleError> {
        self.require(&[ThreadStatus::NotStarted], ThreadStatus::Active, "Not Started")?;
        Ok(self.do_transition(ThreadStatus::Active, sequence))
    }

    /// ACTIVE → PAUSED.
    pub fn pause(&mut self, sequence: u64) -> Result<ThreadStatus, LifecycleError> {
        self.require(&[ThreadStatus::Active], ThreadStatus::Paused, "Active")?;
        Ok(self.do_transition(ThreadStatus::Paused, sequence))
    }

    /// PAUSED → ACTIVE.
    pub fn resume(&mut self, sequence: u64) -> Result<ThreadStatus, LifecycleError> {
        self.require(&[ThreadStatus::Paused], ThreadStatus::Active, "Paused")?;
        Ok(self.do_transition(ThreadStatus::Active, sequence))
    }

    /// ACTIVE or PAUSED → ENDED.
    pub fn end(&mut self, sequence: u64) -> Result<ThreadStatus, LifecycleError> {
        self.require(
            &[ThreadStatus::Active, ThreadStatus::Paused],
            ThreadStatus::Ended,
            "Active or Paused",
        )?;
        Ok(self.do_transition(ThreadStatus::Ended, sequence))
    }

    /// Check that posting and liking are open.
    pub fn ensure_active(&self, action: &'static str) -> Result<(), LifecycleError> {
        if self.status != ThreadStatus::Active {
            return Err(LifecycleError::ActionNotPermitted {
                state: self.status,
                action,
                requirement: "Active",
            });
        }
        Ok(())
    }

    /// Check that `policy` allows joining in the current state.
    pub fn ensure_joinable(&self, policy: &JoinPolicy) -> Result<(), LifecycleError> {
        if !policy.permits(self.status) {
            return Err(LifecycleError::ActionNotPermitted {
                state: self.status,
                action: "join",
                requirement: policy.requirement(),
            });
        }
        Ok(())
    }

    /// Check that the transition log replays to `status` through legal
    /// transitions, with strictly increasing sequence numbers no greater
    /// than `last_sequence`. Returns the first problem found.
    pub fn validate_history(&self, last_sequence: u64) -> Result<(), String> {
        let mut replayed = Self::new();
        let mut previous = 0;
        for (i, record) in self.transitions.iter().enumerate() {
            if record.sequence <= previous || record.sequence > last_sequence {
                return Err(format!(
                    "transition {i} has sequence {} (previous {previous}, last {last_sequence})",
                    record.sequence
                ));
            }
            if record.from_state != replayed.status {
                return Err(format!(
                    "transition {i} starts from {} but the thread was {}",
                    record.from_state, replayed.status
                ));
            }
            let applied = match record.to_state {
                ThreadStatus::Active if record.from_state == ThreadStatus::Paused => {
                    replayed.resume(record.sequence)
                }
                ThreadStatus::Active => replayed.start(record.sequence),
                ThreadStatus::Paused => replayed.pause(record.sequence),
                ThreadStatus::Ended => replayed.end(record.sequence),
                ThreadStatus::NotStarted => Err(LifecycleError::InvalidTransition {
                    from: record.from_state,
                    to: record.to_state,
                    requirement: "never",
                }),
            };
            applied.map_err(|e| format!("transition {i}: {e}"))?;
            previous = record.sequence;
        }
        if replayed.status != self.status {
            return Err(format!(
                "status {} contradicts its history, which ends at {}",
                self.status, replayed.status
            ));
        }
        Ok(())
    }

    fn require(
        &self,
        allowed: &[ThreadStatus],
        to: ThreadStatus,
        requirement: &'static str,
    ) -> Result<(), LifecycleError> {
        if !allowed.contains(&self.status) {
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to,
                requirement,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: ThreadStatus, sequence: u64) -> ThreadStatus {
        self.transitions.push(TransitionRecord {
            from_state: self.status,
            to_state: to,
            sequence,
        });
        self.status = to;
        to
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
