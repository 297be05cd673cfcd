//! Accept/decline prompts for chores assigned by another family member.

mod seen;
mod sequencer;
mod task;

pub use seen::{MemorySeenStore, SeenStore};
pub use sequencer::{AssignmentDecision, AssignmentPrompt, AssignmentPromptSequencer};
pub use task::{ChoreTask, SharedTaskList, TaskProvider};
