//! Microprocess types for the microcosm runtime.
//!
//! A Microprocess is the unit of suspendable work: it runs one logical step
//! at a time and then hands control back to whoever is driving it. There is
//! no hidden continuation machinery; a microprocess that needs to resume
//! "in the middle" of something keeps an explicit state enum and switches
//! on it inside [`Microprocess::step`].

use std::borrow::Cow;
use std::fmt;

use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Work remains; step again in a future round.
    Continue,
    /// The microprocess has permanently finished and must not be stepped again.
    Done,
}

impl Step {
    /// Whether this outcome ends the microprocess.
    pub fn is_done(self) -> bool {
        matches!(self, Step::Done)
    }
}

/// Unique identifier for an activated microprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(Uuid);

impl ProcessId {
    /// Create a new random ProcessId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProcessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A microprocess together with the id it was activated under.
pub(crate) struct Activation {
    pub(crate) id: ProcessId,
    pub(crate) process: Box<dyn Microprocess>,
}

impl Activation {
    pub(crate) fn new(process: Box<dyn Microprocess>) -> Self {
        Self {
            id: ProcessId::new(),
            process,
        }
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("id", &self.id)
            .field("name", &self.process.name())
            .finish()
    }
}

/// Context handed to a microprocess for the duration of one step.
///
/// Anything activated through the context joins the scheduler at the next
/// round boundary, never the round currently running.
pub struct Context<'a> {
    id: ProcessId,
    round: u64,
    spawned: &'a mut Vec<Activation>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(id: ProcessId, round: u64, spawned: &'a mut Vec<Activation>) -> Self {
        Self { id, round, spawned }
    }

    /// Id of the microprocess being stepped.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// The scheduler round this step belongs to, starting at 1.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Activate another microprocess from inside a step.
    pub fn activate<P: Microprocess + 'static>(&mut self, process: P) -> ProcessId {
        let activation = Activation::new(Box::new(process));
        let id = activation.id;
        self.spawned.push(activation);
        id
    }

    /// Number of microprocesses activated during this step.
    pub fn spawned_count(&self) -> usize {
        self.spawned.len()
    }
}

/// The "can be stepped" capability shared by components, links and schedulers.
pub trait Microprocess {
    /// Perform exactly the next unit of work.
    ///
    /// A step must never block: when nothing useful can be done it returns
    /// [`Step::Continue`] as an empty yield. Returning `Err` is treated by
    /// the scheduler exactly like [`Step::Done`].
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step>;

    /// Human-readable name, used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<P: Microprocess + ?Sized> Microprocess for Box<P> {
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step> {
        (**self).step(cx)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Closure-backed microprocess.
///
/// ```
/// use microcosm_runtime::{Microprocess, ProcessFn, Step};
///
/// let mut left = 3;
/// let countdown = ProcessFn::new("countdown", move |_cx| {
///     left -= 1;
///     Ok(if left == 0 { Step::Done } else { Step::Continue })
/// });
/// assert_eq!(countdown.name(), "countdown");
/// ```
pub struct ProcessFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProcessFn<F>
where
    F: FnMut(&mut Context<'_>) -> Result<Step>,
{
    /// Wrap a closure as a named microprocess.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Microprocess for ProcessFn<F>
where
    F: FnMut(&mut Context<'_>) -> Result<Step>,
{
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step> {
        (self.f)(cx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Step a single microprocess until it reports [`Step::Done`].
///
/// Useful for testing a microprocess without a scheduler. Each step is
/// numbered as its own round. Anything the microprocess activates has no
/// scheduler to join and is dropped. Returns the number of steps taken.
pub fn run_to_completion<P: Microprocess + ?Sized>(process: &mut P) -> Result<u64> {
    let id = ProcessId::new();
    let mut steps = 0;
    loop {
        steps += 1;
        let mut spawned = Vec::new();
        let outcome = {
            let mut cx = Context::new(id, steps, &mut spawned);
            process.step(&mut cx)?
        };
        if !spawned.is_empty() {
            warn!(
                process = process.name(),
                count = spawned.len(),
                "dropping microprocesses activated outside a scheduler"
            );
        }
        if outcome.is_done() {
            return Ok(steps);
        }
    }
}
