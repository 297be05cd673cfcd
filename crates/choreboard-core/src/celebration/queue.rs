//! Celebration queue state machine.
//!
//! The queue owns a FIFO backlog and a single "current" slot. It performs no
//! I/O and starts no timers itself: every mutation returns a [`Transition`]
//! listing the events it produced and, at most, one timer the caller must arm.
//! When that timer elapses the caller feeds it back through
//! [`CelebrationQueue::fire`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle --promote--> Showing(visible) --display timer--> Showing(hiding)
//!   ^                    |                                   |
//!   |                complete_current                    exit timer
//!   +--------------------+-----------------------------------+
//! ```
//!
//! Leaving `Showing` always re-runs promotion, so a non-empty backlog goes
//! straight back to `Showing` with the next item.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::item::{CelebrationItem, CelebrationKind, DisplayToken};
use crate::error::ValidationError;
use crate::events::{ClearReason, Event};

/// Which of the two per-display timers elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// Visible period is over; start the exit animation.
    Display,
    /// Exit grace period is over; free the slot.
    Exit,
}

/// A timer the caller must start on the queue's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: DisplayToken,
    pub phase: TimerPhase,
    pub after: Duration,
}

/// Result of one queue mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub events: Vec<Event>,
    /// Timer to arm. Any previously armed timer is stale from now on.
    pub arm: Option<TimerRequest>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.events.is_empty() && self.arm.is_none()
    }

    fn merge(&mut self, next: Transition) {
        self.events.extend(next.events);
        if next.arm.is_some() {
            self.arm = next.arm;
        }
    }
}

/// How long each kind of celebration stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelebrationTimings {
    pub badge_display: Duration,
    pub goal_display: Duration,
    pub milestone_display: Duration,
    /// Time between hiding an overlay and freeing the slot.
    pub exit_grace: Duration,
    /// Safety-net re-evaluation interval for drivers. `None` disables it.
    pub idle_check: Option<Duration>,
}

impl Default for CelebrationTimings {
    fn default() -> Self {
        Self {
            badge_display: Duration::from_millis(2000),
            goal_display: Duration::from_millis(2000),
            milestone_display: Duration::from_millis(5000),
            exit_grace: Duration::from_millis(300),
            idle_check: Some(Duration::from_millis(100)),
        }
    }
}

impl CelebrationTimings {
    pub fn display_for(&self, kind: CelebrationKind) -> Duration {
        match kind {
            CelebrationKind::Badge => self.badge_display,
            CelebrationKind::Goal => self.goal_display,
            CelebrationKind::Milestone => self.milestone_display,
        }
    }
}

/// The item occupying the current slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelebrationState {
    pub token: DisplayToken,
    pub item: CelebrationItem,
    /// `false` once the display timer fired and the exit animation runs.
    pub visible: bool,
    pub shown_at: DateTime<Utc>,
}

/// FIFO celebration queue with a single display slot.
#[derive(Debug, Clone)]
pub struct CelebrationQueue {
    timings: CelebrationTimings,
    backlog: VecDeque<CelebrationItem>,
    current: Option<CelebrationState>,
    next_token: u64,
}

impl Default for CelebrationQueue {
    fn default() -> Self {
        Self::new(CelebrationTimings::default())
    }
}

impl CelebrationQueue {
    pub fn new(timings: CelebrationTimings) -> Self {
        Self {
            timings,
            backlog: VecDeque::new(),
            current: None,
            next_token: 1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&CelebrationState> {
        self.current.as_ref()
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Items waiting behind the current one, in display order.
    pub fn backlog(&self) -> impl Iterator<Item = &CelebrationItem> {
        self.backlog.iter()
    }

    /// Nothing showing and nothing waiting.
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.backlog.is_empty()
    }

    pub fn timings(&self) -> &CelebrationTimings {
        &self.timings
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append an item to the backlog and promote it if the slot is free.
    ///
    /// # Errors
    /// Returns the item's validation error; the queue is left untouched.
    pub fn enqueue(&mut self, item: CelebrationItem) -> Result<Transition, ValidationError> {
        item.validate()?;
        let kind = item.kind();
        self.backlog.push_back(item);
        debug!(%kind, backlog_len = self.backlog.len(), "celebration queued");

        let mut transition = Transition {
            events: vec![Event::CelebrationQueued {
                kind,
                backlog_len: self.backlog.len(),
                at: Utc::now(),
            }],
            arm: None,
        };
        transition.merge(self.reevaluate());
        Ok(transition)
    }

    /// Dismiss the current item right away (e.g. the user tapped it).
    ///
    /// Does nothing when the slot is empty. Timers armed for the dismissed
    /// item become stale.
    pub fn complete_current(&mut self) -> Transition {
        let Some(state) = self.current.take() else {
            trace!("complete_current with empty slot ignored");
            return Transition::default();
        };
        debug!(token = %state.token, "celebration completed early");

        let mut transition = Transition {
            events: vec![Event::CelebrationCleared {
                token: state.token,
                reason: ClearReason::Completed,
                at: Utc::now(),
            }],
            arm: None,
        };
        transition.merge(self.reevaluate());
        transition
    }

    /// Promote the head of the backlog if the slot is empty.
    pub fn reevaluate(&mut self) -> Transition {
        if self.current.is_some() {
            return Transition::default();
        }
        let Some(item) = self.backlog.pop_front() else {
            return Transition::default();
        };

        let token = DisplayToken::new(self.next_token);
        self.next_token += 1;
        let kind = item.kind();
        let shown_for = self.timings.display_for(kind);
        let display_ms = shown_for.as_millis() as u64;
        let title = item.title().to_string();
        debug!(%token, %kind, display_ms, "celebration promoted");

        self.current = Some(CelebrationState {
            token,
            item,
            visible: true,
            shown_at: Utc::now(),
        });

        Transition {
            events: vec![Event::CelebrationShown {
                token,
                kind,
                title,
                display_ms,
                at: Utc::now(),
            }],
            arm: Some(TimerRequest {
                token,
                phase: TimerPhase::Display,
                after: shown_for,
            }),
        }
    }

    /// Handle an elapsed timer.
    ///
    /// A timer only acts on the display it was armed for: a token that is not
    /// current, or a phase that does not match the current visibility, is
    /// ignored.
    pub fn fire(&mut self, token: DisplayToken, phase: TimerPhase) -> Transition {
        let Some(state) = self.current.as_mut() else {
            trace!(%token, ?phase, "timer fired with empty slot");
            return Transition::default();
        };
        if state.token != token {
            trace!(%token, current = %state.token, ?phase, "stale timer ignored");
            return Transition::default();
        }

        match phase {
            TimerPhase::Display => {
                if !state.visible {
                    return Transition::default();
                }
                state.visible = false;
                debug!(%token, "celebration hiding");
                Transition {
                    events: vec![Event::CelebrationHiding {
                        token,
                        at: Utc::now(),
                    }],
                    arm: Some(TimerRequest {
                        token,
                        phase: TimerPhase::Exit,
                        after: self.timings.exit_grace,
                    }),
                }
            }
            TimerPhase::Exit => {
                if state.visible {
                    return Transition::default();
                }
                self.current = None;
                debug!(%token, "celebration expired");
                let mut transition = Transition {
                    events: vec![Event::CelebrationCleared {
                        token,
                        reason: ClearReason::Expired,
                        at: Utc::now(),
                    }],
                    arm: None,
                };
                transition.merge(self.reevaluate());
                transition
            }
        }
    }
}
