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

//! Multi-agent vacuum-cleaner model.
//!
//! A small grid room starts with dirt scattered at random. A number of cleaner agents start on
//! the same origin cell and wander at random, one Moore-neighborhood step per tick, cleaning the
//! cells they land on. The model runs until the room is clean or a step limit is exceeded, and
//! records the remaining dirt after every step.
//!
//! All randomness flows through a single seeded [Rng] owned by the [VacuumModel], so a run is
//! reproducible from its [ModelConfig] and seed.

pub mod agent;
pub mod batch;
pub mod datacollector;
pub mod grid;
pub mod model;
pub mod portrayal;
pub mod schedule;

pub use agent::{AgentKey, CleaningMode, Cleaner, Dirt, DirtKey, Occupant, Space};
pub use batch::{summarize, BatchConfig, BatchRecord, BatchRunner, BatchSummary};
pub use datacollector::{AgentRecord, DataCollector, ModelRecord};
pub use grid::{Location, MultiGrid, Topology};
pub use model::{run_model, ModelConfig, ModelState, TerminationReason, VacuumModel};
pub use portrayal::{dirt_chart, CellPortrayal, Glyph, GridSnapshot};
pub use schedule::RandomActivation;

/// The single source of randomness for a model run.
pub type Rng = rand_pcg::Pcg64;
/// Occupant sets on the grid.
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// Vacuum model error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VacuumError {
    /// The model or batch was configured with values it cannot run.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A grid operation targeted a cell outside the grid.
    #[error("location {location} is out of bounds for a {width}x{height} grid")]
    OutOfBounds {
        /// The offending location.
        location: Location,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// An entity was moved or removed from a cell it does not occupy.
    #[error("entity is not on location {location}")]
    NotOnCell {
        /// The cell the entity was expected on.
        location: Location,
    },

    /// The model was stepped after it terminated.
    #[error("model is not running")]
    NotRunning,
}

/// Invalid configuration detected before a model or batch starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// Width or height is zero.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A model needs at least one cleaner.
    #[error("at least one cleaner agent is required")]
    NoAgents,

    /// Dirt probability must lie in [0, 1].
    #[error("dirt probability must be within [0, 1], got {0}")]
    DirtProbability(f64),

    /// Cleaners start on the origin, so it must be on the grid.
    #[error("origin {origin} is outside the {width}x{height} grid")]
    OriginOutOfBounds {
        /// Requested origin.
        origin: Location,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// A batch needs at least one run per parameter value.
    #[error("batch iterations must be non-zero")]
    NoIterations,

    /// A batch needs at least one agent count to sweep.
    #[error("batch agent-count sweep is empty")]
    EmptySweep,
}

/// Anything the scheduler can activate once per tick.
///
/// The agent sees the shared space it lives in and the model's random source, and nothing else.
/// It does not know about the scheduler, the other agents, or the step counter.
pub trait Steppable {
    /// The shared state the agent acts on.
    type Space;

    /// Activate the agent for one tick.
    fn step(&mut self, space: &mut Self::Space, rng: &mut Rng) -> Result<(), VacuumError>;
}
