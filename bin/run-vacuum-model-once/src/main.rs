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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use vacuum_model::{dirt_chart, CleaningMode, ModelConfig, Topology, VacuumModel};

// Run a room of vacuum cleaners once, from a fixed seed, and print how much dirt is left after
// every step. With --show-grid the room is drawn after every step as well.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with a model configuration. Flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of cleaners.
    #[arg(short = 'n', long)]
    agents: Option<usize>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// The run stops once the step counter exceeds this.
    #[arg(short, long)]
    max_steps: Option<u64>,

    #[arg(long)]
    dirt_probability: Option<f64>,

    #[arg(long, value_enum)]
    topology: Option<TopologyArg>,

    #[arg(long, value_enum)]
    cleaning: Option<CleaningArg>,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Draw the room after every step.
    #[arg(long)]
    show_grid: bool,

    /// Write the collected metrics to this file as JSON.
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TopologyArg {
    Bounded,
    Toroidal,
}

impl From<TopologyArg> for Topology {
    fn from(topology: TopologyArg) -> Self {
        match topology {
            TopologyArg::Bounded => Topology::Bounded,
            TopologyArg::Toroidal => Topology::Toroidal,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CleaningArg {
    Remove,
    Occlude,
}

impl From<CleaningArg> for CleaningMode {
    fn from(cleaning: CleaningArg) -> Self {
        match cleaning {
            CleaningArg::Remove => CleaningMode::Remove,
            CleaningArg::Occlude => CleaningMode::Occlude,
        }
    }
}

fn load_config(cli: &Cli) -> Result<ModelConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ModelConfig::default(),
    };

    if let Some(agents) = cli.agents {
        config.agents = agents;
    }
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(dirt_probability) = cli.dirt_probability {
        config.dirt_probability = dirt_probability;
    }
    if let Some(topology) = cli.topology {
        config.topology = topology.into();
    }
    if let Some(cleaning) = cli.cleaning {
        config.cleaning = cleaning.into();
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
    info!(?config, seed = cli.seed, "starting run");

    let mut model = VacuumModel::with_seed(config, cli.seed)?;
    println!("{}\n", model.snapshot());

    while model.running() {
        model.step()?;
        if cli.show_grid {
            println!("step {}\n{}\n", model.steps(), model.snapshot());
        }
    }

    if !cli.show_grid {
        println!("{}\n", model.snapshot());
    }
    println!("{}", dirt_chart(model.datacollector().model_vars()));
    info!(
        steps = model.steps(),
        dirt = model.count_dirt(),
        termination = ?model.termination(),
        "run finished"
    );

    if let Some(path) = &cli.metrics_out {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        model
            .datacollector()
            .to_writer(std::io::BufWriter::new(file))
            .with_context(|| format!("writing metrics to {}", path.display()))?;
        info!(path = %path.display(), "wrote metrics");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "run-vacuum-model-once",
            "-n",
            "2",
            "--width",
            "7",
            "--topology",
            "toroidal",
            "--cleaning",
            "occlude",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.agents, 2);
        assert_eq!(config.width, 7);
        assert_eq!(config.height, 5);
        assert_eq!(config.topology, Topology::Toroidal);
        assert_eq!(config.cleaning, CleaningMode::Occlude);
        assert_eq!(cli.seed, 42);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
