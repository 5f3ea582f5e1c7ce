//! Links (postmen) relaying messages between component boxes.
//!
//! A [`Link`] is a microprocess that, every time it is stepped, moves the
//! messages currently waiting in one box into another box. It drains the
//! whole backlog in one step so a message never waits more than one round
//! per hop, and it never finishes on its own: a quiet source may start
//! producing again later. Removing a link is done by deactivating it.
//!
//! Besides the ordinary outbox-to-inbox wiring, a link can pass messages
//! through a parent component: inbox-to-inbox forwards a parent's input to
//! a child, outbox-to-outbox surfaces a child's output as the parent's.

use std::borrow::Cow;
use std::fmt;

use tracing::trace;

use crate::component::{AsComponent, Component, INBOX, OUTBOX};
use crate::error::Result;
use crate::microprocess::{Context, Microprocess, Step};

/// Which half of a component an endpoint addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Inbox,
    Outbox,
}

/// One end of a link: a named box on a component.
pub struct Endpoint<T> {
    component: Component<T>,
    name: String,
    side: Side,
}

impl<T> Endpoint<T> {
    /// An inbound box of `component`.
    pub fn inbox(component: &impl AsComponent<T>, name: &str) -> Self {
        Self {
            component: component.component().clone(),
            name: name.to_string(),
            side: Side::Inbox,
        }
    }

    /// An outbound box of `component`.
    pub fn outbox(component: &impl AsComponent<T>, name: &str) -> Self {
        Self {
            component: component.component().clone(),
            name: name.to_string(),
            side: Side::Outbox,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn component(&self) -> &Component<T> {
        &self.component
    }

    fn len(&self) -> usize {
        match self.side {
            Side::Inbox => self.component.inbox_len(&self.name),
            Side::Outbox => self.component.outbox_len(&self.name),
        }
    }

    fn take(&self) -> Result<T> {
        match self.side {
            Side::Inbox => self.component.recv_from(&self.name),
            Side::Outbox => self.component.collect_from(&self.name),
        }
    }

    fn put(&self, payload: T) {
        match self.side {
            Side::Inbox => self.component.deliver(&self.name, payload),
            Side::Outbox => self.component.send_to(&self.name, payload),
        }
    }
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            name: self.name.clone(),
            side: self.side,
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Inbox => "in",
            Side::Outbox => "out",
        };
        write!(f, "{}:{}", side, self.name)
    }
}

/// A postman moving messages from a source box to a sink box.
pub struct Link<T> {
    name: Cow<'static, str>,
    source: Endpoint<T>,
    sink: Endpoint<T>,
    delivered: u64,
}

impl<T> Link<T> {
    /// Link `source`'s outbox to `sink`'s inbox.
    pub fn new(
        source: &impl AsComponent<T>,
        source_box: &str,
        sink: &impl AsComponent<T>,
        sink_box: &str,
    ) -> Self {
        Self::from_endpoints(
            Endpoint::outbox(source, source_box),
            Endpoint::inbox(sink, sink_box),
        )
    }

    /// Link `source`'s default outbox to `sink`'s default inbox.
    pub fn between(source: &impl AsComponent<T>, sink: &impl AsComponent<T>) -> Self {
        Self::new(source, OUTBOX, sink, INBOX)
    }

    /// Forward a parent's inbox into a child's inbox.
    pub fn passthrough_inbound(
        parent: &impl AsComponent<T>,
        parent_box: &str,
        child: &impl AsComponent<T>,
        child_box: &str,
    ) -> Self {
        Self::from_endpoints(
            Endpoint::inbox(parent, parent_box),
            Endpoint::inbox(child, child_box),
        )
    }

    /// Surface a child's outbox as a parent's outbox.
    pub fn passthrough_outbound(
        child: &impl AsComponent<T>,
        child_box: &str,
        parent: &impl AsComponent<T>,
        parent_box: &str,
    ) -> Self {
        Self::from_endpoints(
            Endpoint::outbox(child, child_box),
            Endpoint::outbox(parent, parent_box),
        )
    }

    /// Link two arbitrary endpoints.
    pub fn from_endpoints(source: Endpoint<T>, sink: Endpoint<T>) -> Self {
        Self {
            name: Cow::Borrowed("postman"),
            source,
            sink,
            delivered: 0,
        }
    }

    /// Give the link a name for logs.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn source(&self) -> &Endpoint<T> {
        &self.source
    }

    pub fn sink(&self) -> &Endpoint<T> {
        &self.sink
    }

    /// Total number of messages this link has moved.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Move every message currently waiting at the source to the sink.
    ///
    /// Only the backlog present when the call starts is moved, so a link
    /// whose source and sink are the same box still returns.
    pub fn relay(&mut self) -> Result<usize> {
        let available = self.source.len();
        for _ in 0..available {
            let payload = self.source.take()?;
            self.sink.put(payload);
        }
        self.delivered += available as u64;
        Ok(available)
    }
}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("sink", &self.sink)
            .field("delivered", &self.delivered)
            .finish()
    }
}

impl<T> Microprocess for Link<T> {
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step> {
        let moved = self.relay()?;
        if moved > 0 {
            trace!(
                link = %self.name,
                round = cx.round(),
                moved,
                source = ?self.source,
                sink = ?self.sink,
                "relayed messages"
            );
        }
        Ok(Step::Continue)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
