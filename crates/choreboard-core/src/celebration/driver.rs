//! Async driver for the celebration queue.
//!
//! The driver is a single tokio task that owns a [`CelebrationQueue`], the
//! presenter, and the one outstanding timer. Producers talk to it through
//! cloneable [`CelebrationHandle`]s. A presenter reports taps through a
//! [`WeakCelebrationHandle`], which does not keep the driver alive.
//!
//! When the last strong handle is dropped the driver stops. Anything still
//! in the backlog is discarded, and the presenter gets a final
//! `present(None)` if a celebration was on screen.
//!
//! ## Usage
//!
//! ```ignore
//! let (handle, join) = CelebrationDriver::spawn(timings, presenter);
//! handle.enqueue(item)?;
//! handle.wait_idle().await?;
//! drop(handle);
//! join.await?;
//! ```

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::item::{CelebrationItem, DisplayToken};
use super::queue::{CelebrationQueue, CelebrationState, CelebrationTimings, TimerPhase, TimerRequest, Transition};
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Renders the current celebration.
///
/// `present` is called with the slot's state after every change: `Some` with
/// `visible == true` when an item appears, `visible == false` when its exit
/// animation should start, and `None` once the slot is empty. To report an
/// early dismissal, keep a [`WeakCelebrationHandle`] from
/// [`CelebrationHandle::downgrade`] and call
/// [`WeakCelebrationHandle::complete_current`]. Holding a strong handle here
/// keeps the driver running forever.
pub trait CelebrationPresenter: Send + 'static {
    fn present(&mut self, state: Option<&CelebrationState>);

    fn on_event(&mut self, _event: &Event) {}
}

enum Command {
    Enqueue(CelebrationItem),
    CompleteCurrent,
    WaitIdle(oneshot::Sender<()>),
}

/// Sending side of a running [`CelebrationDriver`].
#[derive(Debug, Clone)]
pub struct CelebrationHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Enqueue(item) => f.debug_tuple("Enqueue").field(&item.kind()).finish(),
            Command::CompleteCurrent => f.write_str("CompleteCurrent"),
            Command::WaitIdle(_) => f.write_str("WaitIdle"),
        }
    }
}

impl CelebrationHandle {
    /// Submit an item for display.
    ///
    /// # Errors
    /// Malformed items are rejected here, before reaching the driver.
    /// Returns [`CoreError::DriverStopped`] if the driver has exited.
    pub fn enqueue(&self, item: CelebrationItem) -> Result<()> {
        item.validate()?;
        self.send(Command::Enqueue(item))
    }

    /// Dismiss whatever is showing. Harmless when nothing is.
    pub fn complete_current(&self) -> Result<()> {
        self.send(Command::CompleteCurrent)
    }

    /// Resolve once nothing is showing and the backlog is empty.
    pub async fn wait_idle(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::WaitIdle(tx))?;
        rx.await.map_err(|_| CoreError::DriverStopped)
    }

    /// A handle that does not count towards keeping the driver alive.
    pub fn downgrade(&self) -> WeakCelebrationHandle {
        WeakCelebrationHandle {
            tx: self.tx.downgrade(),
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| CoreError::DriverStopped)
    }
}

/// Non-owning handle for presenters.
#[derive(Debug, Clone)]
pub struct WeakCelebrationHandle {
    tx: mpsc::WeakUnboundedSender<Command>,
}

impl WeakCelebrationHandle {
    /// The strong handle, if any producer still holds one.
    pub fn upgrade(&self) -> Option<CelebrationHandle> {
        self.tx.upgrade().map(|tx| CelebrationHandle { tx })
    }

    /// Dismiss whatever is showing.
    ///
    /// # Errors
    /// Returns [`CoreError::DriverStopped`] once every strong handle is gone.
    pub fn complete_current(&self) -> Result<()> {
        self.upgrade()
            .ok_or(CoreError::DriverStopped)?
            .complete_current()
    }
}

/// Owns the queue and turns its timer requests into tokio sleeps.
pub struct CelebrationDriver<P> {
    queue: CelebrationQueue,
    presenter: P,
    commands: mpsc::UnboundedReceiver<Command>,
    timer_tx: mpsc::UnboundedSender<(DisplayToken, TimerPhase)>,
    timer_rx: mpsc::UnboundedReceiver<(DisplayToken, TimerPhase)>,
    armed: Option<JoinHandle<()>>,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl<P: CelebrationPresenter> CelebrationDriver<P> {
    pub fn new(timings: CelebrationTimings, presenter: P) -> (Self, CelebrationHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let driver = Self {
            queue: CelebrationQueue::new(timings),
            presenter,
            commands,
            timer_tx,
            timer_rx,
            armed: None,
            idle_waiters: Vec::new(),
        };
        (driver, CelebrationHandle { tx })
    }

    /// Build a driver and run it on the current tokio runtime.
    pub fn spawn(timings: CelebrationTimings, presenter: P) -> (CelebrationHandle, JoinHandle<()>) {
        let (driver, handle) = Self::new(timings, presenter);
        (handle, tokio::spawn(driver.run()))
    }

    /// Process commands and timers until every handle is dropped.
    pub async fn run(mut self) {
        let mut idle_check = self
            .queue
            .timings()
            .idle_check
            .filter(|period| !period.is_zero())
            .map(|period| {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                interval
            });

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some((token, phase)) = self.timer_rx.recv() => {
                    let transition = self.queue.fire(token, phase);
                    self.apply(transition);
                }
                _ = next_idle_check(&mut idle_check) => {
                    let transition = self.queue.reevaluate();
                    self.apply(transition);
                }
            }
        }

        self.cancel_timer();
        if self.queue.current().is_some() {
            self.presenter.present(None);
        }
        debug!(discarded = self.queue.backlog_len(), "celebration driver stopped");
    }

    fn handle_command(&mut self, command: Command) {
        trace!(?command, "celebration command");
        match command {
            Command::Enqueue(item) => match self.queue.enqueue(item) {
                Ok(transition) => self.apply(transition),
                Err(e) => debug!(error = %e, "rejected celebration item"),
            },
            Command::CompleteCurrent => {
                let transition = self.queue.complete_current();
                self.apply(transition);
            }
            Command::WaitIdle(waiter) => {
                if self.queue.is_idle() {
                    let _ = waiter.send(());
                } else {
                    self.idle_waiters.push(waiter);
                }
            }
        }
    }

    fn apply(&mut self, transition: Transition) {
        if transition.is_noop() {
            return;
        }
        if transition
            .events
            .iter()
            .any(|e| matches!(e, Event::CelebrationCleared { .. }))
        {
            self.cancel_timer();
        }
        if let Some(request) = transition.arm {
            self.arm(request);
        }

        for event in &transition.events {
            self.presenter.on_event(event);
        }
        self.presenter.present(self.queue.current());

        if self.queue.is_idle() {
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    fn arm(&mut self, request: TimerRequest) {
        self.cancel_timer();
        let tx = self.timer_tx.clone();
        trace!(token = %request.token, phase = ?request.phase, after_ms = request.after.as_millis() as u64, "timer armed");
        self.armed = Some(tokio::spawn(async move {
            tokio::time::sleep(request.after).await;
            let _ = tx.send((request.token, request.phase));
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.armed.take() {
            timer.abort();
        }
    }
}

async fn next_idle_check(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
