//! # Choreboard Core Library
//!
//! This library provides the sequencing logic behind the Choreboard family
//! chore tracker. The UI, backend transport and push notifications live
//! elsewhere; this crate decides what overlay or prompt the user sees next.
//!
//! ## Architecture
//!
//! - **Celebrations**: a FIFO queue with one display slot and timed
//!   auto-dismissal for badge, goal and milestone overlays, plus a tokio
//!   driver that owns its timers
//! - **Assignments**: a sequencer that asks about chores assigned by another
//!   family member one at a time, never twice
//! - **Storage**: SQLite key-value state and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`CelebrationQueue`]: Celebration state machine
//! - [`CelebrationDriver`]: Async runner for the queue
//! - [`AssignmentPromptSequencer`]: Assignment prompt state machine
//! - [`Database`]: Per-device persistence
//! - [`Config`]: Application configuration management

pub mod assignment;
pub mod celebration;
pub mod error;
pub mod events;
pub mod storage;

pub use assignment::{
    AssignmentDecision, AssignmentPrompt, AssignmentPromptSequencer, ChoreTask, MemorySeenStore,
    SeenStore, SharedTaskList, TaskProvider,
};
pub use celebration::{
    BadgeRecord, CelebrationDriver, CelebrationHandle, CelebrationItem, CelebrationKind,
    CelebrationPresenter, CelebrationQueue, CelebrationState, CelebrationTimings, DisplayToken,
    GoalRecord, MilestoneRecord, TimerPhase, TimerRequest, Transition, WeakCelebrationHandle,
};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{ClearReason, Event};
pub use storage::{Config, Database, SqliteSeenStore};
