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

//! Parameter sweeps over the number of cleaners.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{ModelConfig, TerminationReason, VacuumModel};
use crate::{ConfigurationError, VacuumError};

/// A sweep: the fixed model configuration, the agent counts to try, and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Everything but the agent count. Its `max_steps` still applies.
    pub fixed: ModelConfig,
    /// Agent counts to sweep, in output order.
    pub agent_counts: Vec<usize>,
    /// Runs per agent count.
    pub iterations: usize,
    /// Hard cap on steps per run, applied on top of the model's own termination.
    pub max_steps: u64,
    /// Run `i` of the sweep is seeded with `seed + i`.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            fixed: ModelConfig::default(),
            agent_counts: (1..=9).collect(),
            iterations: 5,
            max_steps: 100,
            seed: 0,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Number of cleaners.
    pub agents: usize,
    /// Iteration index for this agent count.
    pub iteration: usize,
    /// Seed of this run.
    pub seed: u64,
    /// Steps executed.
    pub steps: u64,
    /// Dirt left at the end.
    pub dirt: usize,
    /// `None` when the batch cap stopped a still-running model.
    pub termination: Option<TerminationReason>,
}

/// Averages over the runs of one agent count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of cleaners.
    pub agents: usize,
    /// Runs aggregated.
    pub runs: usize,
    /// Mean dirt left.
    pub mean_dirt: f64,
    /// Mean steps executed.
    pub mean_steps: f64,
    /// Runs that ended with a clean room.
    pub cleaned: usize,
}

/// Runs a [BatchConfig] sweep, each run on its own freshly seeded model.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    /// Validate the sweep up front, so no run fails on configuration halfway through.
    pub fn new(config: BatchConfig) -> Result<Self, VacuumError> {
        if config.iterations == 0 {
            return Err(ConfigurationError::NoIterations.into());
        }
        if config.agent_counts.is_empty() {
            return Err(ConfigurationError::EmptySweep.into());
        }
        for agents in &config.agent_counts {
            config.fixed.clone().with_agents(*agents).validate()?;
        }
        Ok(Self { config })
    }

    /// The sweep being run.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run every `(agent count, iteration)` pair in parallel. Records come back in sweep order.
    pub fn run_all(&self) -> Result<Vec<BatchRecord>, VacuumError> {
        let runs: Vec<(usize, usize)> = self
            .config
            .agent_counts
            .iter()
            .flat_map(|agents| (0..self.config.iterations).map(move |iteration| (*agents, iteration)))
            .collect();
        info!(runs = runs.len(), "starting batch");

        let records = runs
            .par_iter()
            .enumerate()
            .map(|(index, (agents, iteration))| {
                let seed = self.config.seed.wrapping_add(index as u64);
                self.run_one(*agents, *iteration, seed)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(runs = records.len(), "batch finished");
        Ok(records)
    }

    fn run_one(
        &self,
        agents: usize,
        iteration: usize,
        seed: u64,
    ) -> Result<BatchRecord, VacuumError> {
        let config = self.config.fixed.clone().with_agents(agents);
        let mut model = VacuumModel::with_seed(config, seed)?;
        while model.running() && model.steps() < self.config.max_steps {
            model.step()?;
        }
        let record = BatchRecord {
            agents,
            iteration,
            seed,
            steps: model.steps(),
            dirt: model.count_dirt(),
            termination: model.termination(),
        };
        debug!(?record, "batch run finished");
        Ok(record)
    }
}

/// Average the records per agent count, in order of first appearance.
pub fn summarize(records: &[BatchRecord]) -> Vec<BatchSummary> {
    let mut summaries: Vec<BatchSummary> = Vec::new();
    for record in records {
        let index = match summaries
            .iter()
            .position(|summary| summary.agents == record.agents)
        {
            Some(index) => index,
            None => {
                summaries.push(BatchSummary {
                    agents: record.agents,
                    runs: 0,
                    mean_dirt: 0.0,
                    mean_steps: 0.0,
                    cleaned: 0,
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[index];
        summary.runs += 1;
        // running sums for now, divided below.
        summary.mean_dirt += record.dirt as f64;
        summary.mean_steps += record.steps as f64;
        if record.termination == Some(TerminationReason::Clean) {
            summary.cleaned += 1;
        }
    }
    for summary in &mut summaries {
        summary.mean_dirt /= summary.runs as f64;
        summary.mean_steps /= summary.runs as f64;
    }
    summaries
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn small_batch() -> BatchConfig {
        BatchConfig {
            agent_counts: vec![1, 3],
            iterations: 3,
            max_steps: 10,
            seed: 7,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_default_sweep() {
        let config = BatchConfig::default();
        assert_eq!(config.agent_counts, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(config.iterations, 5);
        assert_eq!(config.max_steps, 100);
    }

    #[test]
    fn test_invalid_sweeps_are_rejected() {
        let no_iterations = BatchConfig {
            iterations: 0,
            ..BatchConfig::default()
        };
        assert_eq!(
            BatchRunner::new(no_iterations).unwrap_err(),
            VacuumError::Configuration(ConfigurationError::NoIterations)
        );

        let empty = BatchConfig {
            agent_counts: vec![],
            ..BatchConfig::default()
        };
        assert_eq!(
            BatchRunner::new(empty).unwrap_err(),
            VacuumError::Configuration(ConfigurationError::EmptySweep)
        );

        let zero_agents = BatchConfig {
            agent_counts: vec![2, 0],
            ..BatchConfig::default()
        };
        assert_eq!(
            BatchRunner::new(zero_agents).unwrap_err(),
            VacuumError::Configuration(ConfigurationError::NoAgents)
        );
    }

    #[test]
    fn test_records_come_back_in_sweep_order_with_distinct_seeds() {
        let runner = BatchRunner::new(small_batch()).unwrap();
        let records = runner.run_all().unwrap();

        let order: Vec<(usize, usize, u64)> = records
            .iter()
            .map(|record| (record.agents, record.iteration, record.seed))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, 0, 7),
                (1, 1, 8),
                (1, 2, 9),
                (3, 0, 10),
                (3, 1, 11),
                (3, 2, 12)
            ]
        );
        for record in &records {
            assert!(record.steps <= 10);
            if record.termination == Some(TerminationReason::Clean) {
                assert_eq!(record.dirt, 0);
            }
        }
    }

    #[test]
    fn test_batch_is_reproducible() {
        let first = BatchRunner::new(small_batch()).unwrap().run_all().unwrap();
        let second = BatchRunner::new(small_batch()).unwrap().run_all().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_cap_stops_running_models() {
        let config = BatchConfig {
            fixed: ModelConfig::default()
                .with_dimensions(10, 10)
                .with_dirt_probability(1.0),
            agent_counts: vec![1],
            iterations: 1,
            max_steps: 2,
            seed: 0,
        };
        let records = BatchRunner::new(config).unwrap().run_all().unwrap();
        assert_eq!(records[0].steps, 2);
        assert_eq!(records[0].termination, None);
        assert!(records[0].dirt > 0);
    }

    #[test]
    fn test_summarize() {
        let record = |agents, steps, dirt, termination| BatchRecord {
            agents,
            iteration: 0,
            seed: 0,
            steps,
            dirt,
            termination,
        };
        let records = [
            record(2, 10, 0, Some(TerminationReason::Clean)),
            record(2, 21, 3, Some(TerminationReason::StepLimit)),
            record(1, 21, 6, Some(TerminationReason::StepLimit)),
        ];
        let summaries = summarize(&records);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].agents, 2);
        assert_eq!(summaries[0].runs, 2);
        assert_eq!(summaries[0].cleaned, 1);
        assert_relative_eq!(summaries[0].mean_dirt, 1.5);
        assert_relative_eq!(summaries[0].mean_steps, 15.5);
        assert_eq!(summaries[1].agents, 1);
        assert_relative_eq!(summaries[1].mean_dirt, 6.0);
    }
}
