//! Sample producer and consumer microprocesses.

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;

use microcosm_runtime::{
    AsComponent, Component, Context, Microprocess, Result, RuntimeError, Step, INBOX,
};
use tracing::debug;

/// Sends a fixed payload to its outbox once per step.
pub struct Producer {
    name: String,
    boxes: Component<String>,
    payload: String,
    limit: Option<u64>,
    sent: u64,
}

impl Producer {
    /// A producer that never stops.
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            boxes: Component::new(),
            payload: payload.into(),
            limit: None,
            sent: 0,
        }
    }

    /// Finish after sending `limit` messages.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Microprocess for Producer {
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step> {
        if self.limit.is_some_and(|limit| self.sent >= limit) {
            debug!(producer = %self.name, round = cx.round(), "limit reached");
            return Ok(Step::Done);
        }
        self.boxes.send(self.payload.clone());
        self.sent += 1;
        Ok(Step::Continue)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl AsComponent<String> for Producer {
    fn component(&self) -> &Component<String> {
        &self.boxes
    }
}

/// Takes at most one message per step from its inbox and writes it out as
/// `! <message>`.
pub struct Consumer<W> {
    boxes: Component<String>,
    out: Rc<RefCell<W>>,
    consumed: Rc<Cell<u64>>,
}

impl<W: Write> Consumer<W> {
    pub fn new(out: Rc<RefCell<W>>) -> Self {
        Self {
            boxes: Component::new(),
            out,
            consumed: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter of messages consumed so far.
    pub fn consumed(&self) -> Rc<Cell<u64>> {
        self.consumed.clone()
    }
}

impl<W: Write> Microprocess for Consumer<W> {
    fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
        if !self.boxes.data_ready_in(INBOX) {
            return Ok(Step::Continue);
        }
        let msg = self.boxes.recv()?;
        writeln!(self.out.borrow_mut(), "! {}", msg)
            .map_err(|e| RuntimeError::failed("consumer", e.to_string()))?;
        self.consumed.set(self.consumed.get() + 1);
        Ok(Step::Continue)
    }

    fn name(&self) -> &str {
        "consumer"
    }
}

impl<W> AsComponent<String> for Consumer<W> {
    fn component(&self) -> &Component<String> {
        &self.boxes
    }
}
