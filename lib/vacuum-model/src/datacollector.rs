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

//! Per-step metrics of a model run.

use serde::{Deserialize, Serialize};

use crate::agent::Cleaner;
use crate::grid::Location;

/// Model-level metrics after a step. Step 0 is the state right after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Step index.
    pub step: u64,
    /// Dirty cells left.
    pub dirt: usize,
}

/// One cleaner's state after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Step index.
    pub step: u64,
    /// Cleaner id.
    pub agent_id: usize,
    /// Cell the cleaner stands on.
    pub location: Location,
    /// Whether the cell the cleaner landed on read as dirty this step.
    pub dirty: bool,
}

/// Model and agent records for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCollector {
    model_vars: Vec<ModelRecord>,
    agent_vars: Vec<AgentRecord>,
}

impl DataCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one step.
    pub fn collect<'a>(
        &mut self,
        step: u64,
        dirt: usize,
        cleaners: impl IntoIterator<Item = &'a Cleaner>,
    ) {
        self.model_vars.push(ModelRecord { step, dirt });
        self.agent_vars
            .extend(cleaners.into_iter().map(|cleaner| AgentRecord {
                step,
                agent_id: cleaner.unique_id(),
                location: cleaner.location(),
                dirty: cleaner.dirty(),
            }));
    }

    /// `(step, dirt)` for every collected step, in order.
    pub fn model_vars(&self) -> &[ModelRecord] {
        &self.model_vars
    }

    /// Every cleaner's state for every collected step, grouped by step.
    pub fn agent_vars(&self) -> &[AgentRecord] {
        &self.agent_vars
    }

    /// Cleaner states for a single step.
    pub fn agent_vars_at(&self, step: u64) -> impl Iterator<Item = &AgentRecord> + '_ {
        self.agent_vars
            .iter()
            .filter(move |record| record.step == step)
    }

    /// The most recent model record.
    pub fn latest(&self) -> Option<&ModelRecord> {
        self.model_vars.last()
    }

    /// Serialize all records as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize all records as JSON into a writer.
    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}
