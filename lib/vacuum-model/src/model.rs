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

//! The model: owns the space, the scheduler and the random source, and runs the step loop.

use rand::{Rng as _, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{CleaningMode, Cleaner, Occupant, Space};
use crate::datacollector::DataCollector;
use crate::grid::{Location, MultiGrid, Topology};
use crate::portrayal::{CellPortrayal, GridSnapshot};
use crate::schedule::RandomActivation;
use crate::{ConfigurationError, Rng, VacuumError};

/// Everything needed to build a model, except the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of cleaners.
    pub agents: usize,
    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,
    /// The model terminates once the step counter exceeds this.
    pub max_steps: u64,
    /// Where every cleaner starts. Never seeded with dirt.
    pub origin: Location,
    /// Chance that any other cell starts with dirt.
    pub dirt_probability: f64,
    /// Edge behavior.
    pub topology: Topology,
    /// What cleaners do to dirt.
    pub cleaning: CleaningMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            agents: 5,
            width: 5,
            height: 5,
            max_steps: 20,
            origin: Location::new(1, 1),
            dirt_probability: 0.5,
            topology: Topology::Bounded,
            cleaning: CleaningMode::Remove,
        }
    }
}

impl ModelConfig {
    /// Set the number of cleaners.
    pub fn with_agents(mut self, agents: usize) -> Self {
        self.agents = agents;
        self
    }

    /// Set the grid size.
    pub fn with_dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the step limit.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the starting cell of the cleaners.
    pub fn with_origin(mut self, origin: Location) -> Self {
        self.origin = origin;
        self
    }

    /// Set the chance of dirt on each non-origin cell.
    pub fn with_dirt_probability(mut self, dirt_probability: f64) -> Self {
        self.dirt_probability = dirt_probability;
        self
    }

    /// Set the edge behavior.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the cleaning mode.
    pub fn with_cleaning(mut self, cleaning: CleaningMode) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// Check the configuration can be run.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.agents == 0 {
            return Err(ConfigurationError::NoAgents);
        }
        if !(0.0..=1.0).contains(&self.dirt_probability) {
            return Err(ConfigurationError::DirtProbability(self.dirt_probability));
        }
        if self.origin.x >= self.width || self.origin.y >= self.height {
            return Err(ConfigurationError::OriginOutOfBounds {
                origin: self.origin,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Lifecycle of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelState {
    /// Building the grid and population.
    Initializing,
    /// Accepting steps.
    Running,
    /// Done. Further steps are rejected.
    Terminated,
}

/// Why a model stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// No dirt left.
    Clean,
    /// The step counter exceeded `max_steps`.
    StepLimit,
}

/// A vacuum-cleaner room.
#[derive(Debug, Clone)]
pub struct VacuumModel {
    config: ModelConfig,
    space: Space,
    schedule: RandomActivation<Cleaner>,
    datacollector: DataCollector,
    state: ModelState,
    termination: Option<TerminationReason>,
    rng: Rng,
}

impl VacuumModel {
    /// Build and initialize a model, drawing all randomness from `rng`.
    ///
    /// Every cleaner starts on the origin. Every other cell independently gets one dirt entity
    /// with the configured probability. The initial metrics are recorded as step 0. A room that
    /// starts clean is terminated straight away.
    pub fn new(config: ModelConfig, rng: Rng) -> Result<Self, VacuumError> {
        config.validate()?;
        let grid = MultiGrid::new(config.width, config.height, config.topology)?;
        let mut model = Self {
            space: Space::new(grid, config.cleaning),
            schedule: RandomActivation::new(),
            datacollector: DataCollector::new(),
            state: ModelState::Initializing,
            termination: None,
            config,
            rng,
        };
        model.initialize()?;
        Ok(model)
    }

    /// Build a model with a fresh generator seeded from `seed`.
    pub fn with_seed(config: ModelConfig, seed: u64) -> Result<Self, VacuumError> {
        Self::new(config, Rng::seed_from_u64(seed))
    }

    fn initialize(&mut self) -> Result<(), VacuumError> {
        let origin = self.config.origin;
        for unique_id in 0..self.config.agents {
            let key = self
                .schedule
                .add_with_key(|key| Cleaner::new(key, unique_id, origin));
            self.space.place_cleaner(key, origin)?;
        }

        let locations: Vec<Location> = self.space.grid().locations().collect();
        for location in locations {
            if location == origin {
                continue;
            }
            if self.rng.gen::<f64>() < self.config.dirt_probability {
                self.space.add_dirt(location)?;
            }
        }

        self.collect();
        let dirt = self.count_dirt();
        debug!(
            agents = self.config.agents,
            width = self.config.width,
            height = self.config.height,
            dirt,
            "initialized model"
        );
        if dirt == 0 {
            self.terminate(TerminationReason::Clean);
        } else {
            self.state = ModelState::Running;
        }
        Ok(())
    }

    fn collect(&mut self) {
        let dirt = self.space.count_dirt();
        self.datacollector.collect(
            self.schedule.steps(),
            dirt,
            self.schedule.agents().map(|(_, cleaner)| cleaner),
        );
    }

    fn terminate(&mut self, reason: TerminationReason) {
        self.state = ModelState::Terminated;
        self.termination = Some(reason);
        info!(
            ?reason,
            steps = self.schedule.steps(),
            dirt = self.count_dirt(),
            "model terminated"
        );
    }

    /// Advance one tick: step every cleaner, record metrics, then check for termination.
    ///
    /// A clean room wins over the step limit when both hold after the same step.
    pub fn step(&mut self) -> Result<ModelState, VacuumError> {
        if self.state != ModelState::Running {
            return Err(VacuumError::NotRunning);
        }

        self.schedule.step(&mut self.space, &mut self.rng)?;
        self.collect();

        let dirt = self.count_dirt();
        debug!(step = self.schedule.steps(), dirt, "model step");
        if dirt == 0 {
            self.terminate(TerminationReason::Clean);
        } else if self.schedule.steps() > self.config.max_steps {
            self.terminate(TerminationReason::StepLimit);
        }
        Ok(self.state)
    }

    /// Step until terminated.
    pub fn run(&mut self) -> Result<&DataCollector, VacuumError> {
        while self.running() {
            self.step()?;
        }
        Ok(&self.datacollector)
    }

    /// Dirty cells left.
    pub fn count_dirt(&self) -> usize {
        self.space.count_dirt()
    }

    /// Whether the model still accepts steps.
    pub fn running(&self) -> bool {
        self.state == ModelState::Running
    }

    /// Lifecycle state.
    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Why the model stopped, once it has.
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Steps executed so far.
    pub fn steps(&self) -> u64 {
        self.schedule.steps()
    }

    /// The configuration the model was built from.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The grid and dirt.
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Cleaners, in creation order.
    pub fn cleaners(&self) -> impl Iterator<Item = &Cleaner> + '_ {
        self.schedule.agents().map(|(_, cleaner)| cleaner)
    }

    /// Metrics collected so far.
    pub fn datacollector(&self) -> &DataCollector {
        &self.datacollector
    }

    /// Give up the collected metrics.
    pub fn into_datacollector(self) -> DataCollector {
        self.datacollector
    }

    /// What every cell looks like right now.
    pub fn snapshot(&self) -> GridSnapshot {
        let grid = self.space.grid();
        let cells = grid
            .iter_cells()
            .map(|(_, occupants)| {
                let mut cell = CellPortrayal::default();
                for occupant in occupants {
                    match occupant {
                        Occupant::Dirt(_) => cell.dirt += 1,
                        Occupant::Cleaner(key) => {
                            cell.cleaners += 1;
                            if self.schedule.get(*key).map_or(false, Cleaner::dirty) {
                                cell.dirty_cleaner = true;
                            }
                        }
                    }
                }
                cell
            })
            .collect();
        GridSnapshot {
            step: self.schedule.steps(),
            width: grid.width(),
            height: grid.height(),
            cells,
        }
    }
}

/// Run a fresh model from `seed` to termination and return its metrics.
pub fn run_model(config: ModelConfig, seed: u64) -> Result<DataCollector, VacuumError> {
    let mut model = VacuumModel::with_seed(config, seed)?;
    model.run()?;
    Ok(model.into_datacollector())
}
