//! Assignment prompt sequencer.
//!
//! When someone hands a chore to the current user, the app asks once whether
//! they accept it. The sequencer decides which assignment is being asked about
//! right now. It shows one prompt at a time, in task-list order, and never asks
//! about the same task twice.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --refresh (eligible non-empty)--> Showing(visible)
//! Showing(visible) --begin_exit--> Showing(hiding)
//! Showing --respond / dismiss / withdrawn--> Idle (or Showing the next task)
//! ```

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::seen::SeenStore;
use super::task::{ChoreTask, TaskProvider};
use crate::events::Event;

/// The user's answer to an assignment prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentDecision {
    Accepted,
    Declined,
}

impl From<bool> for AssignmentDecision {
    fn from(accepted: bool) -> Self {
        if accepted {
            AssignmentDecision::Accepted
        } else {
            AssignmentDecision::Declined
        }
    }
}

/// The prompt currently in front of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentPrompt {
    pub task: ChoreTask,
    /// `false` while the prompt animates out. It stays current until
    /// answered, dismissed or withdrawn.
    pub visible: bool,
}

/// Sequences accept/decline prompts for chores assigned to one user.
pub struct AssignmentPromptSequencer<P, S> {
    provider: P,
    store: S,
    user_id: String,
    eligible: Vec<ChoreTask>,
    /// Ids marked during this session, consulted before the store.
    session_seen: HashSet<String>,
    /// Marked ids whose store write failed; retried on later calls.
    unpersisted: HashSet<String>,
    current: Option<AssignmentPrompt>,
}

impl<P: TaskProvider, S: SeenStore> AssignmentPromptSequencer<P, S> {
    /// Create an idle sequencer. Call [`refresh`](Self::refresh) to load tasks.
    pub fn new(provider: P, store: S, user_id: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            user_id: user_id.into(),
            eligible: Vec::new(),
            session_seen: HashSet::new(),
            unpersisted: HashSet::new(),
            current: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Assignments still waiting for an answer, in task-list order.
    pub fn eligible_tasks(&self) -> &[ChoreTask] {
        &self.eligible
    }

    pub fn current(&self) -> Option<&AssignmentPrompt> {
        self.current.as_ref()
    }

    pub fn seen_store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Recompute eligibility from the provider. Call whenever the task list
    /// changes.
    pub fn refresh(&mut self) -> Vec<Event> {
        self.retry_unpersisted();
        let tasks = self.provider.tasks();
        let eligible: Vec<ChoreTask> = tasks
            .into_iter()
            .filter(|task| task.is_assignment_for(&self.user_id) && !self.is_seen(&task.id))
            .collect();
        self.eligible = eligible;
        debug!(user = %self.user_id, eligible = self.eligible.len(), "assignment eligibility refreshed");

        let mut events = Vec::new();
        if let Some(prompt) = self.current.as_mut() {
            match self.eligible.iter().find(|t| t.id == prompt.task.id) {
                Some(fresh) => prompt.task = fresh.clone(),
                None => {
                    let task_id = prompt.task.id.clone();
                    debug!(%task_id, "assignment prompt withdrawn");
                    self.current = None;
                    events.push(Event::AssignmentWithdrawn {
                        task_id,
                        at: Utc::now(),
                    });
                }
            }
        }
        events.extend(self.promote());
        events
    }

    /// Record an accept/decline answer and move on to the next assignment.
    ///
    /// Unknown or already-answered task ids are ignored.
    pub fn respond(&mut self, task_id: &str, accepted: bool) -> Vec<Event> {
        let decision = AssignmentDecision::from(accepted);
        self.finish(task_id, |task_id| Event::AssignmentAnswered {
            task_id,
            decision,
            at: Utc::now(),
        })
    }

    /// Close a prompt without an answer. Bookkeeping matches
    /// [`respond`](Self::respond).
    pub fn dismiss_without_response(&mut self, task_id: &str) -> Vec<Event> {
        self.finish(task_id, |task_id| Event::AssignmentDismissed {
            task_id,
            at: Utc::now(),
        })
    }

    /// Start the exit animation of the current prompt.
    ///
    /// Returns `false` if `task_id` is not the visible current prompt.
    pub fn begin_exit(&mut self, task_id: &str) -> bool {
        match self.current.as_mut() {
            Some(prompt) if prompt.task.id == task_id && prompt.visible => {
                prompt.visible = false;
                true
            }
            _ => false,
        }
    }

    /// Mark a task as seen. Idempotent.
    ///
    /// A store failure is logged; the task still stays suppressed for the
    /// rest of this session and the write is retried by the next
    /// `mark_seen` or [`refresh`](Self::refresh).
    pub fn mark_seen(&mut self, task_id: &str) {
        let first = self.session_seen.insert(task_id.to_string());
        if !first && !self.unpersisted.contains(task_id) {
            return;
        }
        self.persist(task_id);
    }

    fn persist(&mut self, task_id: &str) {
        match self.store.mark_seen(task_id) {
            Ok(()) => {
                self.unpersisted.remove(task_id);
            }
            Err(e) => {
                warn!(task_id, error = %e, "failed to persist assignment seen marker");
                self.unpersisted.insert(task_id.to_string());
            }
        }
    }

    fn retry_unpersisted(&mut self) {
        let pending: Vec<String> = self.unpersisted.iter().cloned().collect();
        for task_id in pending {
            self.persist(&task_id);
        }
    }

    fn is_seen(&self, task_id: &str) -> bool {
        if self.session_seen.contains(task_id) {
            return true;
        }
        match self.store.is_seen(task_id) {
            Ok(seen) => seen,
            Err(e) => {
                warn!(task_id, error = %e, "failed to read assignment seen marker");
                false
            }
        }
    }

    fn finish<F>(&mut self, task_id: &str, event: F) -> Vec<Event>
    where
        F: FnOnce(String) -> Event,
    {
        let Some(pos) = self.eligible.iter().position(|t| t.id == task_id) else {
            debug!(task_id, "ignoring prompt action for task that is not pending");
            return Vec::new();
        };
        let task = self.eligible.remove(pos);
        self.mark_seen(&task.id);

        if self
            .current
            .as_ref()
            .is_some_and(|prompt| prompt.task.id == task.id)
        {
            self.current = None;
        }

        let mut events = vec![event(task.id)];
        events.extend(self.promote());
        events
    }

    fn promote(&mut self) -> Option<Event> {
        if self.current.is_some() {
            return None;
        }
        let task = self.eligible.first()?.clone();
        debug!(task_id = %task.id, "assignment prompt shown");
        let event = Event::AssignmentPrompted {
            task_id: task.id.clone(),
            assigned_by: task.assigned_by.clone(),
            at: Utc::now(),
        };
        self.current = Some(AssignmentPrompt {
            task,
            visible: true,
        });
        Some(event)
    }
}
