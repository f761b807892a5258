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

//! Entities of the vacuum world: passive dirt and wandering cleaners.
//!
//! Dirt lives in the [Space] together with the grid. Cleaners live in the scheduler and act on
//! the [Space] during their turn, so a cleaner never needs to borrow itself out of the same
//! collection it mutates.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::grid::{Location, MultiGrid};
use crate::{Rng, Steppable, VacuumError};

new_key_type! {
    /// Key of a cleaner agent in the scheduler.
    pub struct AgentKey;

    /// Key of a dirt entity in the space.
    pub struct DirtKey;
}

/// What the grid stores in each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Occupant {
    /// A dirt entity.
    Dirt(DirtKey),

    /// A cleaner agent.
    Cleaner(AgentKey),
}

/// What happens to dirt when a cleaner lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    /// Dirt on the cell is removed, and only dirt entities count as dirt.
    #[default]
    Remove,

    /// Dirt is never removed, and every occupied cell counts as dirt, including cells that only
    /// hold cleaners.
    Occlude,
}

/// Passive dirt marker. Its location never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dirt {
    location: Location,
}

impl Dirt {
    /// Where the dirt lies.
    pub fn location(&self) -> Location {
        self.location
    }
}

impl Steppable for Dirt {
    type Space = Space;

    fn step(&mut self, _space: &mut Space, _rng: &mut Rng) -> Result<(), VacuumError> {
        Ok(())
    }
}

/// The grid plus the dirt population.
#[derive(Debug, Clone)]
pub struct Space {
    grid: MultiGrid<Occupant>,
    dirt: SlotMap<DirtKey, Dirt>,
    cleaning: CleaningMode,
}

impl Space {
    /// Create a space over an (usually empty) grid.
    pub fn new(grid: MultiGrid<Occupant>, cleaning: CleaningMode) -> Self {
        Self {
            grid,
            dirt: SlotMap::with_key(),
            cleaning,
        }
    }

    /// The grid.
    pub fn grid(&self) -> &MultiGrid<Occupant> {
        &self.grid
    }

    /// How cleaners treat dirt.
    pub fn cleaning(&self) -> CleaningMode {
        self.cleaning
    }

    /// Drop a dirt entity on a cell.
    pub fn add_dirt(&mut self, location: Location) -> Result<DirtKey, VacuumError> {
        // Check the cell first so a failed placement does not leave an orphan in `dirt`.
        self.grid.occupants(location)?;
        let key = self.dirt.insert(Dirt { location });
        self.grid.place(Occupant::Dirt(key), location)?;
        Ok(key)
    }

    /// Put a cleaner on a cell.
    pub fn place_cleaner(&mut self, key: AgentKey, location: Location) -> Result<(), VacuumError> {
        self.grid.place(Occupant::Cleaner(key), location)
    }

    /// All remaining dirt entities.
    pub fn dirt(&self) -> impl Iterator<Item = (DirtKey, &Dirt)> + '_ {
        self.dirt.iter()
    }

    /// Look up a dirt entity. `None` once it has been cleaned.
    pub fn get_dirt(&self, key: DirtKey) -> Option<&Dirt> {
        self.dirt.get(key)
    }

    /// Whether any dirt entity lies on the cell.
    pub fn has_dirt(&self, location: Location) -> Result<bool, VacuumError> {
        Ok(self
            .grid
            .occupants(location)?
            .iter()
            .any(|occupant| matches!(occupant, Occupant::Dirt(_))))
    }

    /// Remove every dirt entity on a cell. Returns how many were removed.
    pub fn clean(&mut self, location: Location) -> Result<usize, VacuumError> {
        let keys: Vec<DirtKey> = self
            .grid
            .occupants(location)?
            .iter()
            .filter_map(|occupant| match occupant {
                Occupant::Dirt(key) => Some(*key),
                Occupant::Cleaner(_) => None,
            })
            .collect();
        for key in &keys {
            self.grid.remove(Occupant::Dirt(*key), location)?;
            self.dirt.remove(*key);
        }
        Ok(keys.len())
    }

    /// Number of dirty cells, as defined by the cleaning mode.
    pub fn count_dirt(&self) -> usize {
        self.grid
            .iter_cells()
            .filter(|(_, occupants)| match self.cleaning {
                CleaningMode::Remove => occupants
                    .iter()
                    .any(|occupant| matches!(occupant, Occupant::Dirt(_))),
                CleaningMode::Occlude => !occupants.is_empty(),
            })
            .count()
    }
}

/// A vacuum cleaner that wanders one random Moore step per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaner {
    key: AgentKey,
    unique_id: usize,
    location: Location,
    dirty: bool,
}

impl Cleaner {
    /// Create a cleaner. It is not on the grid until [Space::place_cleaner] is called.
    pub fn new(key: AgentKey, unique_id: usize, location: Location) -> Self {
        Self {
            key,
            unique_id,
            location,
            dirty: false,
        }
    }

    /// Scheduler key.
    pub fn key(&self) -> AgentKey {
        self.key
    }

    /// Sequential id, `0..N` in creation order.
    pub fn unique_id(&self) -> usize {
        self.unique_id
    }

    /// Current cell.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Whether the cell this cleaner landed on this tick read as dirty. Under
    /// [CleaningMode::Remove] that means it held dirt; under [CleaningMode::Occlude] that it was
    /// occupied at all, which is always the case once the cleaner stands on it.
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    fn random_move(&mut self, space: &mut Space, rng: &mut Rng) -> Result<(), VacuumError> {
        let possible_steps = space.grid.neighbors(self.location, false)?;

        // Only a 1x1 room has nowhere to go.
        let Some(&new_location) = possible_steps.choose(rng) else {
            return Ok(());
        };
        space
            .grid
            .move_entity(Occupant::Cleaner(self.key), self.location, new_location)?;
        trace!(
            agent = self.unique_id,
            from = %self.location,
            to = %new_location,
            "cleaner moved"
        );
        self.location = new_location;
        Ok(())
    }
}

impl Steppable for Cleaner {
    type Space = Space;

    fn step(&mut self, space: &mut Space, rng: &mut Rng) -> Result<(), VacuumError> {
        self.dirty = false;
        self.random_move(space, rng)?;
        match space.cleaning {
            CleaningMode::Remove => {
                self.dirty = space.has_dirt(self.location)?;
                if self.dirty {
                    let cleaned = space.clean(self.location)?;
                    trace!(agent = self.unique_id, location = %self.location, cleaned, "cleaned cell");
                }
            }
            // Anything on the cell, the cleaner itself included, reads as dirt.
            CleaningMode::Occlude => {
                self.dirty = !space.grid.is_empty(self.location)?;
            }
        }
        Ok(())
    }
}
