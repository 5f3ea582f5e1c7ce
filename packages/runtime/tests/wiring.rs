use std::cell::RefCell;
use std::rc::Rc;

use microcosm_runtime::{
    AsComponent, Component, Context, Endpoint, Link, Microprocess, Result, RuntimeError, Scheduler,
    SchedulerConfig, Step, INBOX, OUTBOX,
};

const GREETING: &str = "hello world!";

struct Producer {
    boxes: Component<String>,
}

impl Producer {
    fn new() -> Self {
        Self {
            boxes: Component::new(),
        }
    }
}

impl Microprocess for Producer {
    fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
        self.boxes.send(GREETING.to_string());
        Ok(Step::Continue)
    }

    fn name(&self) -> &str {
        "producer"
    }
}

impl AsComponent<String> for Producer {
    fn component(&self) -> &Component<String> {
        &self.boxes
    }
}

struct Consumer {
    boxes: Component<String>,
    log: Rc<RefCell<Vec<String>>>,
}

impl Consumer {
    fn new(log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            boxes: Component::new(),
            log,
        }
    }
}

impl Microprocess for Consumer {
    fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
        if self.boxes.data_ready_in(INBOX) {
            let msg = self.boxes.recv()?;
            self.log.borrow_mut().push(msg);
        }
        Ok(Step::Continue)
    }

    fn name(&self) -> &str {
        "consumer"
    }
}

impl AsComponent<String> for Consumer {
    fn component(&self) -> &Component<String> {
        &self.boxes
    }
}

#[test]
fn producer_consumer_five_rounds() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let producer = Producer::new();
    let consumer = Consumer::new(log.clone());
    let postman = Link::new(&producer, OUTBOX, &consumer, INBOX);

    let mut sched = Scheduler::new(SchedulerConfig::bounded(5));
    sched.activate(producer);
    sched.activate(consumer);
    sched.activate(postman);
    let summary = sched.run();

    assert_eq!(summary.rounds, 5);
    let log = log.borrow();
    assert_eq!(log.len(), 4);
    assert!(log.iter().all(|m| m == GREETING));
}

#[test]
fn scheduler_link_helper_and_unlink() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let producer = Producer::new();
    let consumer = Consumer::new(log.clone());
    let outbox = producer.component().clone();

    let mut sched = Scheduler::new(SchedulerConfig::forever());
    let link = sched.link(&producer, OUTBOX, &consumer, INBOX);
    sched.activate(producer);
    sched.activate(consumer);

    // The link runs first, so each round relays what the previous round sent.
    sched.step();
    sched.step();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(outbox.outbox_len(OUTBOX), 1);

    assert!(sched.deactivate(link));
    for _ in 0..5 {
        sched.step();
    }
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(outbox.outbox_len(OUTBOX), 6);
}

#[test]
fn pipeline_of_links_preserves_order() {
    // source -> relay.inbox -> relay.middle -> sink, with no component logic
    // in between. Links are activated out of pipeline order on purpose.
    let source: Component<u32> = Component::new();
    let relay: Component<u32> = Component::new();
    let sink: Component<u32> = Component::new();

    let mut sched = Scheduler::new(SchedulerConfig::forever());
    sched.activate(Link::passthrough_inbound(&relay, INBOX, &relay, "middle"));
    sched.activate(Link::new(&source, OUTBOX, &relay, INBOX));
    sched.activate(Link::from_endpoints(
        Endpoint::inbox(&relay, "middle"),
        Endpoint::inbox(&sink, INBOX),
    ));

    for i in 0..10 {
        source.send(i);
    }
    for _ in 0..4 {
        sched.step();
    }

    let received: Vec<u32> = std::iter::from_fn(|| sink.recv().ok()).collect();
    assert_eq!(received, (0..10).collect::<Vec<_>>());
}

#[test]
fn burst_arrives_in_one_hop() {
    let source: Component<&str> = Component::new();
    let sink: Component<&str> = Component::new();
    let mut sched = Scheduler::new(SchedulerConfig::forever());
    sched.activate(Link::between(&source, &sink));

    source.send("A");
    source.send("B");
    source.send("C");
    sched.step();

    assert_eq!(sink.inbox_len(INBOX), 3);
    assert_eq!(sink.recv().unwrap(), "A");
    assert_eq!(sink.recv().unwrap(), "B");
    assert_eq!(sink.recv().unwrap(), "C");
}

#[test]
fn fifo_and_empty_queue_guard() {
    let c: Component<usize> = Component::new();
    for i in 0..100 {
        c.deliver(INBOX, i);
    }
    for i in 0..100 {
        assert_eq!(c.recv().unwrap(), i);
    }
    assert!(!c.data_ready());
    assert_eq!(c.recv(), Err(RuntimeError::empty_queue(INBOX)));
    assert_eq!(c.inbox_len(INBOX), 0);
}

#[test]
fn component_with_extra_boxes() {
    let c: Component<String> = Component::with_boxes(&[INBOX, "control"], &[OUTBOX, "signal"]);
    let watcher: Component<String> = Component::new();
    let mut sched = Scheduler::new(SchedulerConfig::bounded(1));
    sched.activate(Link::new(&c, "signal", &watcher, "control"));

    c.send_to("signal", "shutdown".to_string());
    c.send("payload".to_string());
    sched.run();

    assert_eq!(watcher.recv_from("control").unwrap(), "shutdown");
    assert_eq!(c.outbox_len(OUTBOX), 1);
}
