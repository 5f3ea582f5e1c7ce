//! Round-robin scheduler for microprocesses.
//!
//! The scheduler is itself a microprocess. Each call to
//! [`Scheduler::step`] runs one round: every microprocess that was active
//! when the round began is stepped exactly once, in activation order.
//! Those that report [`Step::Continue`] carry over to the next round, those
//! that report [`Step::Done`] (or fail, or panic) are dropped.
//!
//! ```text
//!   activate() ──► pending ──┐
//!                            ▼  (round boundary)
//!                 ┌────── active ──────┐
//!                 │ step each, in order │
//!                 └──┬──────────────┬──┘
//!          Continue  │              │ Done / Err / panic
//!                    ▼              ▼
//!               next round       dropped
//! ```
//!
//! Microprocesses activated from inside a step land in the pending queue
//! and join at the next round boundary, so a round never grows while it is
//! running.

use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::component::AsComponent;
use crate::config::SchedulerConfig;
use crate::error::{Result, RuntimeError};
use crate::link::Link;
use crate::microprocess::{Activation, Context, Microprocess, ProcessId, Step};

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, no round run yet.
    Init,
    /// At least one round has run and more may follow.
    Running,
    /// Round budget exhausted, idle, or explicitly stopped.
    Finished,
}

/// Totals reported by [`Scheduler::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Rounds run.
    pub rounds: u64,
    /// Individual microprocess steps taken across all rounds.
    pub steps: u64,
    /// Microprocesses still active when the run ended.
    pub active: usize,
}

/// The cooperative scheduler.
pub struct Scheduler {
    name: Cow<'static, str>,
    config: SchedulerConfig,
    state: SchedulerState,
    active: Vec<Activation>,
    pending: Vec<Activation>,
    round: u64,
    steps: u64,
}

impl Scheduler {
    /// Create a scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            name: Cow::Borrowed("scheduler"),
            config,
            state: SchedulerState::Init,
            active: Vec::new(),
            pending: Vec::new(),
            round: 0,
            steps: 0,
        }
    }

    /// Create a scheduler, rejecting invalid configurations.
    pub fn try_new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Give the scheduler a name for logs.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Add a microprocess. It is first stepped in the next round to start.
    pub fn activate<P: Microprocess + 'static>(&mut self, process: P) -> ProcessId {
        if self.state == SchedulerState::Finished {
            warn!(
                scheduler = %self.name,
                process = process.name(),
                "activating on a finished scheduler"
            );
        }
        let activation = Activation::new(Box::new(process));
        let id = activation.id;
        debug!(
            scheduler = %self.name,
            process = activation.process.name(),
            %id,
            "activated"
        );
        self.pending.push(activation);
        id
    }

    /// Wire `source`'s outbox to `sink`'s inbox with a new link and activate it.
    pub fn link<T: 'static>(
        &mut self,
        source: &impl AsComponent<T>,
        source_box: &str,
        sink: &impl AsComponent<T>,
        sink_box: &str,
    ) -> ProcessId {
        self.activate(Link::new(source, source_box, sink, sink_box))
    }

    /// Remove a microprocess before its next step.
    ///
    /// Returns `false` if the id is unknown or the microprocess already ended.
    pub fn deactivate(&mut self, id: ProcessId) -> bool {
        for set in [&mut self.active, &mut self.pending] {
            if let Some(pos) = set.iter().position(|a| a.id == id) {
                let removed = set.remove(pos);
                debug!(
                    scheduler = %self.name,
                    process = removed.process.name(),
                    %id,
                    "deactivated"
                );
                return true;
            }
        }
        false
    }

    /// Move straight to [`SchedulerState::Finished`].
    pub fn stop(&mut self) {
        if self.state != SchedulerState::Finished {
            self.finish("stopped");
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SchedulerState::Finished
    }

    /// Number of rounds run so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Number of microprocess steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether `id` is activated and has neither ended nor been deactivated.
    pub fn is_active(&self, id: ProcessId) -> bool {
        self.active
            .iter()
            .chain(self.pending.iter())
            .any(|a| a.id == id)
    }

    /// Ids in the order they will be stepped next round.
    pub fn active_ids(&self) -> Vec<ProcessId> {
        self.active
            .iter()
            .chain(self.pending.iter())
            .map(|a| a.id)
            .collect()
    }

    /// Microprocesses that carried over from the last round.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Microprocesses waiting for the next round boundary to join.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Run one round.
    ///
    /// Returns [`Step::Done`] once the round budget is exhausted, the
    /// scheduler went idle (when configured to exit on idle), or it was
    /// stopped. Stepping a finished scheduler runs nothing.
    pub fn step(&mut self) -> Step {
        match self.state {
            SchedulerState::Finished => {
                warn!(scheduler = %self.name, "stepped a finished scheduler");
                return Step::Done;
            }
            SchedulerState::Init => {
                debug!(
                    scheduler = %self.name,
                    seeded = self.pending.len(),
                    "scheduler running"
                );
                self.state = SchedulerState::Running;
            }
            SchedulerState::Running => {}
        }

        if self.budget_exhausted() {
            self.finish("round budget exhausted");
            return Step::Done;
        }

        self.run_round();

        if self.budget_exhausted() {
            self.finish("round budget exhausted");
            Step::Done
        } else if self.config.exit_when_idle && self.active.is_empty() && self.pending.is_empty() {
            self.finish("idle");
            Step::Done
        } else {
            Step::Continue
        }
    }

    /// Step until done.
    ///
    /// With [`SchedulerConfig::forever`] this only returns after
    /// [`Scheduler::stop`] is called from outside, which a single-threaded
    /// embedding cannot do; use [`Scheduler::step`] in a loop instead.
    pub fn run(&mut self) -> RunSummary {
        while self.step() == Step::Continue {}
        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rounds: self.round,
            steps: self.steps,
            active: self.active.len() + self.pending.len(),
        }
    }

    fn budget_exhausted(&self) -> bool {
        self.config.max_rounds.is_some_and(|max| self.round >= max)
    }

    fn run_round(&mut self) {
        self.round += 1;
        self.active.append(&mut self.pending);

        let current = std::mem::take(&mut self.active);
        let mut next = Vec::with_capacity(current.len());
        trace!(scheduler = %self.name, round = self.round, size = current.len(), "round start");

        for mut activation in current {
            self.steps += 1;
            let mut spawned = Vec::new();
            let outcome = {
                let mut cx = Context::new(activation.id, self.round, &mut spawned);
                step_isolated(&mut activation, &mut cx)
            };
            self.pending.append(&mut spawned);
            match outcome {
                Ok(Step::Continue) => next.push(activation),
                Ok(Step::Done) => debug!(
                    scheduler = %self.name,
                    process = activation.process.name(),
                    id = %activation.id,
                    round = self.round,
                    "terminated"
                ),
                Err(e) => warn!(
                    scheduler = %self.name,
                    id = %activation.id,
                    round = self.round,
                    error = %e,
                    "microprocess failed, discarding"
                ),
            }
        }

        self.active = next;
    }

    fn finish(&mut self, reason: &str) {
        debug!(
            scheduler = %self.name,
            reason,
            rounds = self.round,
            steps = self.steps,
            "scheduler finished"
        );
        self.state = SchedulerState::Finished;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("round", &self.round)
            .field("active", &self.active)
            .field("pending", &self.pending)
            .finish()
    }
}

impl Microprocess for Scheduler {
    fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
        Ok(Scheduler::step(self))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Step one microprocess, turning a panic into an error.
fn step_isolated(activation: &mut Activation, cx: &mut Context<'_>) -> Result<Step> {
    let process = &mut activation.process;
    match panic::catch_unwind(AssertUnwindSafe(|| process.step(cx))) {
        Ok(Ok(step)) => Ok(step),
        Ok(Err(e)) => Err(e),
        Err(payload) => {
            let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = payload.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(RuntimeError::Panicked {
                process: process.name().to_string(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::microprocess::ProcessFn;

    fn counter(name: &'static str, count: Rc<Cell<u64>>) -> impl Microprocess {
        ProcessFn::new(name, move |_cx| {
            count.set(count.get() + 1);
            Ok(Step::Continue)
        })
    }

    #[test]
    fn scheduler_new() {
        let sched = Scheduler::default();
        assert_eq!(sched.state(), SchedulerState::Init);
        assert_eq!(sched.round(), 0);
        assert_eq!(sched.active_count(), 0);
        assert_eq!(sched.config().max_rounds, Some(100));
    }

    #[test]
    fn try_new_validates() {
        assert!(Scheduler::try_new(SchedulerConfig::bounded(0)).is_err());
        assert!(Scheduler::try_new(SchedulerConfig::bounded(1)).is_ok());
    }

    #[test]
    fn first_step_seeds_and_runs() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        let count = Rc::new(Cell::new(0));
        let id = sched.activate(counter("c", count.clone()));
        assert_eq!(sched.pending_count(), 1);
        assert!(sched.is_active(id));

        assert_eq!(sched.step(), Step::Continue);
        assert_eq!(sched.state(), SchedulerState::Running);
        assert_eq!(sched.active_count(), 1);
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn steps_in_activation_order() {
        let mut sched = Scheduler::new(SchedulerConfig::bounded(2));
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let log = log.clone();
            sched.activate(ProcessFn::new(name, move |cx| {
                log.borrow_mut().push((cx.round(), name));
                Ok(Step::Continue)
            }));
        }
        sched.run();
        assert_eq!(
            *log.borrow(),
            vec![(1, "a"), (1, "b"), (1, "c"), (2, "a"), (2, "b"), (2, "c")]
        );
    }

    #[test]
    fn done_is_removed() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        let id = sched.activate(ProcessFn::new("once", |_cx| Ok(Step::Done)));
        sched.step();
        assert!(!sched.is_active(id));
        assert_eq!(sched.active_count(), 0);
    }

    #[test]
    fn error_and_panic_are_isolated() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        let count = Rc::new(Cell::new(0));
        let failing = sched.activate(ProcessFn::new("failing", |_cx| {
            Err(RuntimeError::failed("failing", "bad state"))
        }));
        let panicking = sched.activate(ProcessFn::new("panicking", |_cx| -> Result<Step> {
            panic!("boom")
        }));
        let healthy = sched.activate(counter("healthy", count.clone()));

        assert_eq!(sched.step(), Step::Continue);
        assert!(!sched.is_active(failing));
        assert!(!sched.is_active(panicking));
        assert!(sched.is_active(healthy));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn step_isolated_reports_panic_message() {
        let mut activation = Activation::new(Box::new(ProcessFn::new(
            "panicking",
            |_cx| -> Result<Step> { panic!("exploded at {}", 3) },
        )));
        let mut spawned = Vec::new();
        let mut cx = Context::new(activation.id, 1, &mut spawned);
        let err = step_isolated(&mut activation, &mut cx).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::Panicked {
                process: "panicking".to_string(),
                message: "exploded at 3".to_string(),
            }
        );
    }

    #[test]
    fn spawned_joins_next_round() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        let child_count = Rc::new(Cell::new(0));
        let spawned_id = Rc::new(Cell::new(None));
        {
            let child_count = child_count.clone();
            let spawned_id = spawned_id.clone();
            sched.activate(ProcessFn::new("parent", move |cx| {
                let id = cx.activate(counter("child", child_count.clone()));
                spawned_id.set(Some(id));
                Ok(Step::Done)
            }));
        }

        sched.step();
        assert_eq!(child_count.get(), 0);
        assert_eq!(sched.pending_count(), 1);
        let child = spawned_id.get().unwrap();
        assert!(sched.is_active(child));

        sched.step();
        assert_eq!(child_count.get(), 1);
        assert_eq!(sched.active_ids(), vec![child]);
    }

    #[test]
    fn spawned_count_is_per_step() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            sched.activate(ProcessFn::new("a", move |cx| {
                cx.activate(ProcessFn::new("a-child", |_cx| Ok(Step::Done)));
                seen.borrow_mut().push(("a", cx.spawned_count()));
                Ok(Step::Continue)
            }));
        }
        {
            let seen = seen.clone();
            sched.activate(ProcessFn::new("b", move |cx| {
                seen.borrow_mut().push(("b", cx.spawned_count()));
                Ok(Step::Continue)
            }));
        }

        sched.step();
        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 0)]);
        assert_eq!(sched.pending_count(), 1);
    }

    #[test]
    fn deactivate_cancels() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        let count = Rc::new(Cell::new(0));
        let id = sched.activate(counter("c", count.clone()));
        sched.step();
        assert!(sched.deactivate(id));
        assert!(!sched.deactivate(id));
        sched.step();
        assert_eq!(count.get(), 1);

        let pending = sched.activate(counter("p", count.clone()));
        assert!(sched.deactivate(pending));
        sched.step();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn round_budget() {
        let mut sched = Scheduler::new(SchedulerConfig::bounded(3));
        let count = Rc::new(Cell::new(0));
        sched.activate(counter("c", count.clone()));
        assert_eq!(sched.step(), Step::Continue);
        assert_eq!(sched.step(), Step::Continue);
        assert_eq!(sched.step(), Step::Done);
        assert!(sched.is_finished());
        assert_eq!(sched.step(), Step::Done);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn zero_budget_runs_nothing() {
        let mut sched = Scheduler::new(SchedulerConfig::bounded(0));
        let count = Rc::new(Cell::new(0));
        sched.activate(counter("c", count.clone()));

        let summary = sched.run();
        assert_eq!(count.get(), 0);
        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.steps, 0);
        assert!(sched.is_finished());
    }

    #[test]
    fn exits_when_idle() {
        let mut sched = Scheduler::new(SchedulerConfig::bounded(50));
        let mut left = 3;
        sched.activate(ProcessFn::new("countdown", move |_cx| {
            left -= 1;
            Ok(if left == 0 { Step::Done } else { Step::Continue })
        }));
        let summary = sched.run();
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.active, 0);
    }

    #[test]
    fn forever_mode_survives_idle() {
        let mut sched = Scheduler::new(SchedulerConfig::forever());
        for _ in 0..5 {
            assert_eq!(sched.step(), Step::Continue);
        }
        assert_eq!(sched.round(), 5);
        sched.stop();
        assert_eq!(sched.state(), SchedulerState::Finished);
        assert_eq!(sched.step(), Step::Done);
        assert_eq!(sched.round(), 5);
    }

    #[test]
    fn nested_scheduler() {
        let count = Rc::new(Cell::new(0));
        let mut inner = Scheduler::new(SchedulerConfig::bounded(2)).named("inner");
        inner.activate(counter("c", count.clone()));

        let mut outer = Scheduler::new(SchedulerConfig::bounded(10)).named("outer");
        let inner_id = outer.activate(inner);
        let summary = outer.run();

        assert_eq!(count.get(), 2);
        assert!(!outer.is_active(inner_id));
        assert_eq!(summary.rounds, 2);
    }
}
