//! Producer/consumer example.
//!
//! Three microprocesses share one scheduler:
//!
//! 1. **Producer**: sends "hello world!" to its outbox on every step
//! 2. **Postman**: relays the producer's outbox into the consumer's inbox
//! 3. **Consumer**: prints whatever arrives in its inbox
//!
//! None of them knows about the others; the postman is the only thing that
//! connects them.

use microcosm_runtime::{
    AsComponent, Component, Context, Link, Microprocess, Result, Scheduler, SchedulerConfig, Step,
};

struct Producer {
    boxes: Component<String>,
}

impl Microprocess for Producer {
    fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
        self.boxes.send("hello world!".to_string());
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
}

impl Microprocess for Consumer {
    fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step> {
        if self.boxes.data_ready() {
            let msg = self.boxes.recv()?;
            println!("! {}", msg);
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

fn main() {
    println!("=== Microcosm Producer/Consumer ===\n");

    let producer = Producer {
        boxes: Component::new(),
    };
    let consumer = Consumer {
        boxes: Component::new(),
    };
    let postman = Link::between(&producer, &consumer);

    let mut scheduler = Scheduler::new(SchedulerConfig::bounded(10));
    scheduler.activate(producer);
    scheduler.activate(consumer);
    scheduler.activate(postman);

    let summary = scheduler.run();
    println!(
        "\n=== {} rounds, {} steps, {} still active ===",
        summary.rounds, summary.steps, summary.active
    );
}
