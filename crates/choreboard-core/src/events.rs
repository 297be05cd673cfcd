use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentDecision;
use crate::celebration::{CelebrationKind, DisplayToken};

/// Every state change in the system produces an Event.
/// The presenter receives them as they happen; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An item was accepted into the backlog.
    CelebrationQueued {
        kind: CelebrationKind,
        backlog_len: usize,
        at: DateTime<Utc>,
    },
    /// An item was promoted into the current slot and is visible.
    CelebrationShown {
        token: DisplayToken,
        kind: CelebrationKind,
        title: String,
        display_ms: u64,
        at: DateTime<Utc>,
    },
    /// Display time elapsed; the overlay is playing its exit animation.
    CelebrationHiding {
        token: DisplayToken,
        at: DateTime<Utc>,
    },
    /// The current slot was emptied.
    CelebrationCleared {
        token: DisplayToken,
        reason: ClearReason,
        at: DateTime<Utc>,
    },
    /// A task assignment prompt became current.
    AssignmentPrompted {
        task_id: String,
        assigned_by: Option<String>,
        at: DateTime<Utc>,
    },
    /// The user accepted or declined an assignment.
    AssignmentAnswered {
        task_id: String,
        decision: AssignmentDecision,
        at: DateTime<Utc>,
    },
    /// The user closed the prompt without choosing.
    AssignmentDismissed {
        task_id: String,
        at: DateTime<Utc>,
    },
    /// The current prompt's task stopped being eligible (completed or
    /// reassigned elsewhere) before the user acted on it.
    AssignmentWithdrawn {
        task_id: String,
        at: DateTime<Utc>,
    },
}

/// Why a celebration left the current slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// Display and exit timers ran out.
    Expired,
    /// The presenter reported an early dismissal.
    Completed,
}

impl Event {
    /// Short machine name, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            Event::CelebrationQueued { .. } => "celebration_queued",
            Event::CelebrationShown { .. } => "celebration_shown",
            Event::CelebrationHiding { .. } => "celebration_hiding",
            Event::CelebrationCleared { .. } => "celebration_cleared",
            Event::AssignmentPrompted { .. } => "assignment_prompted",
            Event::AssignmentAnswered { .. } => "assignment_answered",
            Event::AssignmentDismissed { .. } => "assignment_dismissed",
            Event::AssignmentWithdrawn { .. } => "assignment_withdrawn",
        }
    }
}
