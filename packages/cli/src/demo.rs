//! Wiring and running the producer/consumer system.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use microcosm_runtime::{Link, RunSummary, Scheduler, SchedulerConfig, INBOX, OUTBOX};
use tracing::info;

use crate::error::{CliError, Result};
use crate::sample::{Consumer, Producer};

/// Shape of the demo system.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub config: SchedulerConfig,
    pub producers: usize,
    pub payload: String,
    /// Messages each producer sends before finishing; `None` is unlimited.
    pub limit: Option<u64>,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            config: SchedulerConfig::default(),
            producers: 1,
            payload: "hello world!".to_string(),
            limit: None,
        }
    }
}

/// Outcome of a demo run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoReport {
    pub summary: RunSummary,
    pub consumed: u64,
}

/// Read a [`SchedulerConfig`] from a JSON file.
pub fn load_config(path: &Path) -> Result<SchedulerConfig> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SchedulerConfig =
        serde_json::from_str(&text).map_err(|source| CliError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Build the system, run it to completion and report.
///
/// Producers are activated first, then the consumer, then one postman per
/// producer, so a message sent in round N is relayed in round N and
/// consumed in round N + 1.
pub fn run_demo<W: Write + 'static>(options: &DemoOptions, out: Rc<RefCell<W>>) -> Result<DemoReport> {
    if options.producers == 0 {
        return Err(CliError::Options("at least one producer is required".to_string()));
    }

    let mut scheduler = Scheduler::try_new(options.config.clone())?;
    let consumer = Consumer::new(out);
    let consumed = consumer.consumed();

    let producers: Vec<Producer> = (0..options.producers)
        .map(|i| {
            let producer = Producer::new(format!("producer-{i}"), options.payload.clone());
            match options.limit {
                Some(limit) => producer.with_limit(limit),
                None => producer,
            }
        })
        .collect();
    let postmen: Vec<Link<String>> = producers
        .iter()
        .enumerate()
        .map(|(i, producer)| {
            Link::new(producer, OUTBOX, &consumer, INBOX).named(format!("postman-{i}"))
        })
        .collect();

    for producer in producers {
        scheduler.activate(producer);
    }
    scheduler.activate(consumer);
    for postman in postmen {
        scheduler.activate(postman);
    }

    info!(
        producers = options.producers,
        max_rounds = ?options.config.max_rounds,
        "running demo"
    );
    let summary = scheduler.run();

    Ok(DemoReport {
        summary,
        consumed: consumed.get(),
    })
}
