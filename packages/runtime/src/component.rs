//! Named inboxes and outboxes.
//!
//! A [`Component`] is the message-queue half of a component microprocess:
//! a set of named FIFO boxes, split into inbound and outbound. The handle is
//! cheap to clone and every clone sees the same boxes, which is how the
//! owning microprocess and the [`Link`](crate::Link)s attached to it share
//! queues without locks. Everything runs on one thread, so each queue
//! operation completes before any other microprocess gets to run.
//!
//! # Example
//!
//! ```
//! use microcosm_runtime::{Component, INBOX, OUTBOX};
//!
//! let producer: Component<&str> = Component::new();
//! producer.send("hello");
//! assert!(producer.data_out_ready());
//!
//! let consumer: Component<&str> = Component::new();
//! consumer.deliver(INBOX, producer.collect().unwrap());
//! assert_eq!(consumer.recv().unwrap(), "hello");
//! assert!(consumer.recv().is_err());
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, RuntimeError};

/// Name of the default inbound box.
pub const INBOX: &str = "inbox";

/// Name of the default outbound box.
pub const OUTBOX: &str = "outbox";

type Boxes<T> = BTreeMap<String, VecDeque<T>>;

struct Postboxes<T> {
    inboxes: Boxes<T>,
    outboxes: Boxes<T>,
}

fn push<T>(boxes: &mut Boxes<T>, name: &str, payload: T) {
    match boxes.get_mut(name) {
        Some(queue) => queue.push_back(payload),
        None => {
            boxes.insert(name.to_string(), VecDeque::from([payload]));
        }
    }
}

fn pop<T>(boxes: &mut Boxes<T>, name: &str) -> Result<T> {
    boxes
        .get_mut(name)
        .and_then(VecDeque::pop_front)
        .ok_or_else(|| RuntimeError::empty_queue(name))
}

fn depth<T>(boxes: &Boxes<T>, name: &str) -> usize {
    boxes.get(name).map_or(0, VecDeque::len)
}

/// Shared handle to a component's named boxes.
///
/// Boxes are unbounded. Sending or delivering to a name that was never
/// declared creates that box; receiving or collecting from it fails with
/// [`RuntimeError::EmptyQueue`] just like an empty declared box.
pub struct Component<T> {
    boxes: Rc<RefCell<Postboxes<T>>>,
}

impl<T> Component<T> {
    /// Create a component with the default `inbox` and `outbox`.
    pub fn new() -> Self {
        Self::with_boxes(&[INBOX], &[OUTBOX])
    }

    /// Create a component with exactly the given inbound and outbound boxes.
    pub fn with_boxes(inboxes: &[&str], outboxes: &[&str]) -> Self {
        let declare = |names: &[&str]| {
            names
                .iter()
                .map(|name| (name.to_string(), VecDeque::new()))
                .collect::<Boxes<T>>()
        };
        Self {
            boxes: Rc::new(RefCell::new(Postboxes {
                inboxes: declare(inboxes),
                outboxes: declare(outboxes),
            })),
        }
    }

    /// Declare an additional inbound box. Existing contents are kept.
    pub fn add_inbox(&self, name: &str) {
        self.boxes
            .borrow_mut()
            .inboxes
            .entry(name.to_string())
            .or_default();
    }

    /// Declare an additional outbound box. Existing contents are kept.
    pub fn add_outbox(&self, name: &str) {
        self.boxes
            .borrow_mut()
            .outboxes
            .entry(name.to_string())
            .or_default();
    }

    /// Append a message to the default outbox.
    pub fn send(&self, payload: T) {
        self.send_to(OUTBOX, payload)
    }

    /// Append a message to the named outbox.
    pub fn send_to(&self, outbox: &str, payload: T) {
        push(&mut self.boxes.borrow_mut().outboxes, outbox, payload)
    }

    /// Remove the oldest message from the default inbox.
    pub fn recv(&self) -> Result<T> {
        self.recv_from(INBOX)
    }

    /// Remove the oldest message from the named inbox.
    pub fn recv_from(&self, inbox: &str) -> Result<T> {
        pop(&mut self.boxes.borrow_mut().inboxes, inbox)
    }

    /// Append a message to the named inbox. Used by links.
    pub fn deliver(&self, inbox: &str, payload: T) {
        push(&mut self.boxes.borrow_mut().inboxes, inbox, payload)
    }

    /// Remove the oldest message from the default outbox.
    pub fn collect(&self) -> Result<T> {
        self.collect_from(OUTBOX)
    }

    /// Remove the oldest message from the named outbox. Used by links.
    pub fn collect_from(&self, outbox: &str) -> Result<T> {
        pop(&mut self.boxes.borrow_mut().outboxes, outbox)
    }

    /// Whether the default inbox holds a message.
    pub fn data_ready(&self) -> bool {
        self.data_ready_in(INBOX)
    }

    /// Whether the named inbox holds a message.
    pub fn data_ready_in(&self, inbox: &str) -> bool {
        self.inbox_len(inbox) > 0
    }

    /// Whether the default outbox holds a message.
    pub fn data_out_ready(&self) -> bool {
        self.data_out_ready_in(OUTBOX)
    }

    /// Whether the named outbox holds a message.
    pub fn data_out_ready_in(&self, outbox: &str) -> bool {
        self.outbox_len(outbox) > 0
    }

    /// Number of messages waiting in the named inbox.
    pub fn inbox_len(&self, inbox: &str) -> usize {
        depth(&self.boxes.borrow().inboxes, inbox)
    }

    /// Number of messages waiting in the named outbox.
    pub fn outbox_len(&self, outbox: &str) -> usize {
        depth(&self.boxes.borrow().outboxes, outbox)
    }

    /// Names of all inbound boxes, sorted.
    pub fn inbox_names(&self) -> Vec<String> {
        self.boxes.borrow().inboxes.keys().cloned().collect()
    }

    /// Names of all outbound boxes, sorted.
    pub fn outbox_names(&self) -> Vec<String> {
        self.boxes.borrow().outboxes.keys().cloned().collect()
    }

    /// Whether two handles refer to the same boxes.
    pub fn ptr_eq(&self, other: &Component<T>) -> bool {
        Rc::ptr_eq(&self.boxes, &other.boxes)
    }
}

impl<T> Default for Component<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Component<T> {
    fn clone(&self) -> Self {
        Self {
            boxes: Rc::clone(&self.boxes),
        }
    }
}

impl<T> fmt::Debug for Component<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let boxes = self.boxes.borrow();
        let depths = |b: &Boxes<T>| {
            b.iter()
                .map(|(name, queue)| (name.clone(), queue.len()))
                .collect::<BTreeMap<_, _>>()
        };
        f.debug_struct("Component")
            .field("inboxes", &depths(&boxes.inboxes))
            .field("outboxes", &depths(&boxes.outboxes))
            .finish()
    }
}

/// Anything that owns a [`Component`] and can be wired with links.
///
/// Implement this on a microprocess that embeds a `Component<T>` so it can
/// be passed straight to [`Link::new`](crate::Link::new).
pub trait AsComponent<T> {
    fn component(&self) -> &Component<T>;
}

impl<T> AsComponent<T> for Component<T> {
    fn component(&self) -> &Component<T> {
        self
    }
}
