//! Chore tasks as seen by the prompt sequencer, and where they come from.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chore as mirrored from the family's shared task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreTask {
    pub id: String,
    pub title: String,
    /// Member the chore is assigned to.
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Member who made the assignment.
    #[serde(default)]
    pub assigned_by: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
}

impl ChoreTask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            assigned_to: None,
            assigned_by: None,
            completed: false,
            points: 0,
            due_at: None,
        }
    }

    pub fn assigned(mut self, to: impl Into<String>, by: impl Into<String>) -> Self {
        self.assigned_to = Some(to.into());
        self.assigned_by = Some(by.into());
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// True when someone else handed this open chore to `user_id`.
    ///
    /// Seen markers are not considered here.
    pub fn is_assignment_for(&self, user_id: &str) -> bool {
        let Some(to) = self.assigned_to.as_deref() else {
            return false;
        };
        let Some(by) = self.assigned_by.as_deref() else {
            return false;
        };
        to == user_id && by != to && !self.completed
    }
}

/// Source of the live task list.
///
/// Implementations return a snapshot in the list's own order; the sequencer
/// never re-sorts it.
pub trait TaskProvider {
    fn tasks(&self) -> Vec<ChoreTask>;
}

impl TaskProvider for Vec<ChoreTask> {
    fn tasks(&self) -> Vec<ChoreTask> {
        self.clone()
    }
}

impl<P: TaskProvider + ?Sized> TaskProvider for &P {
    fn tasks(&self) -> Vec<ChoreTask> {
        (**self).tasks()
    }
}

/// Task list shared between the code that syncs it and a sequencer.
#[derive(Debug, Clone, Default)]
pub struct SharedTaskList {
    inner: Arc<Mutex<Vec<ChoreTask>>>,
}

impl SharedTaskList {
    pub fn new(tasks: Vec<ChoreTask>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tasks)),
        }
    }

    /// Replace the whole list, e.g. after a backend sync.
    pub fn replace(&self, tasks: Vec<ChoreTask>) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = tasks;
    }

    /// Edit the list in place.
    pub fn update<F: FnOnce(&mut Vec<ChoreTask>)>(&self, f: F) {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl TaskProvider for SharedTaskList {
    fn tasks(&self) -> Vec<ChoreTask> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
