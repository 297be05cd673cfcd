use std::collections::HashSet;

use crate::error::Result;

/// Durable per-task "already prompted" markers.
///
/// Marking is monotonic. There is no operation to un-mark a task.
pub trait SeenStore {
    fn is_seen(&self, task_id: &str) -> Result<bool>;

    /// Mark a task as seen. Repeating the call has no further effect.
    fn mark_seen(&mut self, task_id: &str) -> Result<()>;
}

impl<S: SeenStore + ?Sized> SeenStore for &mut S {
    fn is_seen(&self, task_id: &str) -> Result<bool> {
        (**self).is_seen(task_id)
    }

    fn mark_seen(&mut self, task_id: &str) -> Result<()> {
        (**self).mark_seen(task_id)
    }
}

/// In-process store, for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemorySeenStore {
    seen: HashSet<String>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seen<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            seen: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl SeenStore for MemorySeenStore {
    fn is_seen(&self, task_id: &str) -> Result<bool> {
        Ok(self.seen.contains(task_id))
    }

    fn mark_seen(&mut self, task_id: &str) -> Result<()> {
        self.seen.insert(task_id.to_string());
        Ok(())
    }
}
