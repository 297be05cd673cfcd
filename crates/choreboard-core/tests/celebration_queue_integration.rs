//! Integration tests for the celebration queue.
//!
//! Drives the queue the way the async driver does, firing timers by hand, and
//! checks the sequencing guarantees over arbitrary operation sequences.

use choreboard_core::{
    BadgeRecord, CelebrationItem, CelebrationQueue, ClearReason, DisplayToken, Event, GoalRecord,
    TimerPhase, TimerRequest, Transition,
};
use proptest::prelude::*;

fn badge(name: &str) -> CelebrationItem {
    CelebrationItem::Badge(BadgeRecord {
        id: format!("badge-{name}"),
        name: name.to_string(),
        description: String::new(),
        icon: None,
        earned_at: None,
    })
}

/// Follows the event stream and checks it against the queue's own state.
#[derive(Default)]
struct Tracker {
    armed: Vec<TimerRequest>,
    open: Option<DisplayToken>,
    shown: Vec<String>,
    cleared: Vec<(DisplayToken, ClearReason)>,
}

impl Tracker {
    fn record(&mut self, queue: &CelebrationQueue, t: Transition) -> Result<(), TestCaseError> {
        for event in &t.events {
            match event {
                Event::CelebrationShown { token, title, .. } => {
                    prop_assert!(self.open.is_none(), "second item shown while {:?} open", self.open);
                    self.open = Some(*token);
                    self.shown.push(title.clone());
                }
                Event::CelebrationCleared { token, reason, .. } => {
                    prop_assert_eq!(self.open, Some(*token));
                    self.open = None;
                    self.cleared.push((*token, *reason));
                }
                _ => {}
            }
        }
        if let Some(request) = t.arm {
            self.armed.push(request);
        }
        prop_assert_eq!(queue.current().map(|c| c.token), self.open);
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Enqueue,
    Complete,
    Fire(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Enqueue),
        1 => Just(Op::Complete),
        4 => any::<usize>().prop_map(Op::Fire),
    ]
}

proptest! {
    #[test]
    fn items_show_one_at_a_time_in_fifo_order(ops in prop::collection::vec(op(), 1..60)) {
        let mut queue = CelebrationQueue::default();
        let mut tracker = Tracker::default();
        let mut enqueued: Vec<String> = Vec::new();

        for op in ops {
            let t = match op {
                Op::Enqueue => {
                    let name = format!("b{}", enqueued.len());
                    enqueued.push(name.clone());
                    queue.enqueue(badge(&name)).unwrap()
                }
                Op::Complete => queue.complete_current(),
                Op::Fire(i) => {
                    if tracker.armed.is_empty() {
                        continue;
                    }
                    // Old requests stay in the list, so stale timers get fired too.
                    let request = tracker.armed.remove(i % tracker.armed.len());
                    queue.fire(request.token, request.phase)
                }
            };
            tracker.record(&queue, t)?;
        }

        while !tracker.armed.is_empty() {
            let request = tracker.armed.remove(0);
            let t = queue.fire(request.token, request.phase);
            tracker.record(&queue, t)?;
        }

        prop_assert!(queue.is_idle());
        prop_assert_eq!(&tracker.shown, &enqueued);
        prop_assert_eq!(tracker.cleared.len(), enqueued.len());
    }
}

#[test]
fn full_cycle_emits_shown_hiding_cleared_then_next() {
    let mut queue = CelebrationQueue::default();
    let t = queue.enqueue(badge("first")).unwrap();
    queue.enqueue(badge("second")).unwrap();
    let display = t.arm.unwrap();
    assert_eq!(display.phase, TimerPhase::Display);

    let hide = queue.fire(display.token, display.phase);
    assert!(matches!(&hide.events[..], [Event::CelebrationHiding { .. }]));
    let exit = hide.arm.unwrap();

    let next = queue.fire(exit.token, exit.phase);
    let names: Vec<&str> = next.events.iter().map(Event::name).collect();
    assert_eq!(names, ["celebration_cleared", "celebration_shown"]);
    assert_eq!(queue.current().unwrap().item.title(), "second");
}

#[test]
fn manual_completion_then_stale_timers_leave_new_item_alone() {
    let mut queue = CelebrationQueue::default();
    let first_display = queue.enqueue(badge("first")).unwrap().arm.unwrap();
    queue.enqueue(badge("second")).unwrap();

    let hide = queue.fire(first_display.token, first_display.phase);
    let first_exit = hide.arm.unwrap();

    // The user taps during the exit animation.
    let t = queue.complete_current();
    let second_display = t.arm.unwrap();

    assert!(queue.fire(first_exit.token, first_exit.phase).is_noop());
    assert!(queue.fire(first_display.token, first_display.phase).is_noop());
    let current = queue.current().unwrap();
    assert_eq!(current.token, second_display.token);
    assert_eq!(current.item.title(), "second");
    assert!(current.visible);
}

#[test]
fn rejected_item_does_not_disturb_order() {
    let mut queue = CelebrationQueue::default();
    queue.enqueue(badge("first")).unwrap();
    let bad = CelebrationItem::Goal(GoalRecord {
        id: String::new(),
        title: "Clean room".into(),
        target_points: 10,
        reward: None,
    });
    assert!(queue.enqueue(bad).is_err());
    queue.enqueue(badge("second")).unwrap();

    let titles: Vec<&str> = queue.backlog().map(CelebrationItem::title).collect();
    assert_eq!(titles, ["second"]);
}

#[test]
fn duplicate_items_are_each_shown() {
    let mut queue = CelebrationQueue::default();
    queue.enqueue(badge("same")).unwrap();
    queue.enqueue(badge("same")).unwrap();
    assert_eq!(queue.backlog_len(), 1);
    queue.complete_current();
    assert_eq!(queue.current().unwrap().item.title(), "same");
    queue.complete_current();
    assert!(queue.is_idle());
}
