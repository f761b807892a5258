/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

#![warn(missing_docs)]

//! Sweep the number of cleaners and report how clean the room ends up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use vacuum_model::{summarize, BatchConfig, BatchRunner};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with a batch configuration. Flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Smallest number of cleaners in the sweep.
    #[arg(long)]
    min_agents: Option<usize>,

    /// Largest number of cleaners in the sweep.
    #[arg(long)]
    max_agents: Option<usize>,

    /// Runs per number of cleaners.
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Hard cap on steps per run.
    #[arg(short, long)]
    max_steps: Option<u64>,

    /// Base seed. Run `i` of the sweep uses `seed + i`.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write every run's record to this file as JSON.
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<BatchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => BatchConfig::default(),
    };

    if cli.min_agents.is_some() || cli.max_agents.is_some() {
        let min = cli
            .min_agents
            .or_else(|| config.agent_counts.first().copied())
            .unwrap_or(1);
        let max = cli
            .max_agents
            .or_else(|| config.agent_counts.last().copied())
            .unwrap_or(min);
        config.agent_counts = (min..=max).collect();
    }
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = load_config(&cli)?;
    info!(
        agent_counts = ?config.agent_counts,
        iterations = config.iterations,
        max_steps = config.max_steps,
        "starting sweep"
    );

    let runner = BatchRunner::new(config)?;
    let records = runner.run_all()?;

    println!("agents  runs  cleaned  mean dirt  mean steps");
    for summary in summarize(&records) {
        println!(
            "{:>6}  {:>4}  {:>7}  {:>9.2}  {:>10.2}",
            summary.agents, summary.runs, summary.cleaned, summary.mean_dirt, summary.mean_steps
        );
    }

    if let Some(path) = &cli.out {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)
            .with_context(|| format!("writing records to {}", path.display()))?;
        info!(path = %path.display(), "wrote records");
    }

    Ok(())
}
