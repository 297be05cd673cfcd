//! Celebration overlays: badge unlocks, goal completions and milestones.
//!
//! [`CelebrationQueue`] is the synchronous sequencing core and
//! [`CelebrationDriver`] runs it on tokio with real timers.

mod driver;
mod item;
mod queue;

pub use driver::{CelebrationDriver, CelebrationHandle, CelebrationPresenter, WeakCelebrationHandle};
pub use item::{BadgeRecord, CelebrationItem, CelebrationKind, DisplayToken, GoalRecord, MilestoneRecord};
pub use queue::{
    CelebrationQueue, CelebrationState, CelebrationTimings, TimerPhase, TimerRequest, Transition,
};
