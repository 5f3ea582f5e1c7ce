use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use microcosm_cli::{load_config, logging, run_demo, DemoOptions};
use microcosm_runtime::SchedulerConfig;

/// Microcosm - producer/consumer system on a cooperative scheduler
#[derive(Parser, Debug)]
#[command(name = "microcosm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of scheduler rounds to run
    #[arg(long, short = 'r', conflicts_with = "forever")]
    rounds: Option<u64>,

    /// Keep running until interrupted
    #[arg(long)]
    forever: bool,

    /// Load scheduler settings from a JSON file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Number of producers feeding the consumer
    #[arg(long, short = 'p', default_value_t = 1)]
    producers: usize,

    /// Messages each producer sends before finishing
    #[arg(long)]
    limit: Option<u64>,

    /// Message payload
    #[arg(long, default_value = "hello world!")]
    payload: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn options(args: &Args) -> microcosm_cli::Result<DemoOptions> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.max_rounds = Some(rounds);
    }
    if args.forever {
        config = SchedulerConfig::forever();
    }
    Ok(DemoOptions {
        config,
        producers: args.producers,
        payload: args.payload.clone(),
        limit: args.limit,
    })
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let result = options(&args).and_then(|options| {
        let stdout = Rc::new(RefCell::new(std::io::stdout()));
        run_demo(&options, stdout)
    });

    match result {
        Ok(report) => {
            println!(
                "{} rounds, {} steps, {} messages consumed",
                report.summary.rounds, report.summary.steps, report.consumed
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
