use std::process;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use multicount::config::Config;
use multicount::pipeline::Pipeline;
use multicount_flow::runner::{SequentialRunner, ThreadedRunner};

fn main() {
    env_logger::init();
    let config = Config::parse();
    if let Err(e) = run(&config) {
        error!("{e:#}");
        eprintln!("multicount: {e:#}");
        process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(config.partitions);
    if let Some(dir) = &config.spill_dir {
        pipeline = pipeline.with_spill_dir(dir.clone());
    }

    let summary = if config.threads <= 1 {
        pipeline.run(&SequentialRunner, &config.input, &config.output)
    } else {
        let runner = ThreadedRunner::new(config.threads).context("building thread pool")?;
        pipeline.run(&runner, &config.input, &config.output)
    }
    .with_context(|| format!("counting {}", config.input.display()))?;

    info!(
        "{} rows, {} tokens, {} groups -> {}",
        summary.rows,
        summary.tokens,
        summary.groups,
        config.output.display()
    );
    Ok(())
}
