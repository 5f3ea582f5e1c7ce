//! # Microcosm Runtime
//!
//! A minimal cooperative dataflow kernel. Independently written units of
//! work, **microprocesses**, run one logical step at a time, hand control
//! back voluntarily, and talk to each other only through named FIFO boxes.
//!
//! ## Core Concepts
//!
//! ### Microprocesses
//!
//! A [`Microprocess`] exposes a single operation, [`Microprocess::step`],
//! which performs exactly the next unit of work and reports
//! [`Step::Continue`] or [`Step::Done`]. Steps never block. A microprocess
//! with nothing to do simply returns `Continue`.
//!
//! ### Components
//!
//! A [`Component`] is a set of named inboxes and outboxes. A component
//! microprocess embeds one and reads its inboxes / writes its outboxes from
//! inside `step`. The defaults are [`INBOX`] and [`OUTBOX`]; any number of
//! extra named boxes may exist.
//!
//! ### Links
//!
//! A [`Link`] (postman) is a microprocess that moves every message waiting
//! in one box into another box each time it runs. It preserves order and
//! never finishes on its own.
//!
//! ### The Scheduler
//!
//! The [`Scheduler`] is a microprocess too. Each step is one round: every
//! active microprocess is stepped once, in activation order, and only those
//! that did not finish carry over.
//!
//! ## Example: Producer and Consumer
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use microcosm_runtime::{
//!     AsComponent, Component, Context, Link, Microprocess, Result, Scheduler, SchedulerConfig,
//!     Step,
//! };
//!
//! struct Producer {
//!     boxes: Component<String>,
//! }
//!
//! impl Microprocess for Producer {
//!     fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
//!         self.boxes.send("hello world!".to_string());
//!         Ok(Step::Continue)
//!     }
//! }
//!
//! impl AsComponent<String> for Producer {
//!     fn component(&self) -> &Component<String> {
//!         &self.boxes
//!     }
//! }
//!
//! struct Consumer {
//!     boxes: Component<String>,
//!     seen: Rc<RefCell<Vec<String>>>,
//! }
//!
//! impl Microprocess for Consumer {
//!     fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
//!         if self.boxes.data_ready() {
//!             self.seen.borrow_mut().push(self.boxes.recv()?);
//!         }
//!         Ok(Step::Continue)
//!     }
//! }
//!
//! impl AsComponent<String> for Consumer {
//!     fn component(&self) -> &Component<String> {
//!         &self.boxes
//!     }
//! }
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let producer = Producer { boxes: Component::new() };
//! let consumer = Consumer { boxes: Component::new(), seen: seen.clone() };
//! let postman = Link::between(&producer, &consumer);
//!
//! let mut scheduler = Scheduler::new(SchedulerConfig::bounded(5));
//! scheduler.activate(producer);
//! scheduler.activate(postman);
//! scheduler.activate(consumer);
//! scheduler.run();
//!
//! assert_eq!(seen.borrow().len(), 5);
//! ```
//!
//! ## Concurrency
//!
//! Everything runs on one thread. Only one step executes at any instant and
//! it runs to completion, so queue operations need no locks. Component
//! handles are `Rc`-based and therefore neither `Send` nor `Sync`.

pub mod component;
pub mod config;
pub mod error;
pub mod link;
pub mod microprocess;
pub mod scheduler;

pub use component::{AsComponent, Component, INBOX, OUTBOX};
pub use config::SchedulerConfig;
pub use error::{Result, RuntimeError};
pub use link::{Endpoint, Link, Side};
pub use microprocess::{run_to_completion, Context, Microprocess, ProcessFn, ProcessId, Step};
pub use scheduler::{RunSummary, Scheduler, SchedulerState};
