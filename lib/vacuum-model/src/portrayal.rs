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

//! Read-only views of a model for display.

use serde::{Deserialize, Serialize};

use crate::datacollector::ModelRecord;
use crate::grid::Location;

/// How a cell is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glyph {
    /// Nothing here.
    Empty,
    /// Dirt and no cleaner.
    Dirt,
    /// A cleaner that landed on a clean cell.
    Cleaner,
    /// A cleaner that landed on dirt.
    DirtyCleaner,
}

impl Glyph {
    /// Single character used in text renderings.
    pub fn as_char(&self) -> char {
        match self {
            Glyph::Empty => '.',
            Glyph::Dirt => '*',
            Glyph::Cleaner => 'c',
            Glyph::DirtyCleaner => 'C',
        }
    }
}

/// Contents of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPortrayal {
    /// Dirt entities on the cell.
    pub dirt: usize,
    /// Cleaners on the cell.
    pub cleaners: usize,
    /// At least one of the cleaners landed on dirt this step.
    pub dirty_cleaner: bool,
}

impl CellPortrayal {
    /// Cleaners are drawn over dirt.
    pub fn glyph(&self) -> Glyph {
        if self.dirty_cleaner {
            Glyph::DirtyCleaner
        } else if self.cleaners > 0 {
            Glyph::Cleaner
        } else if self.dirt > 0 {
            Glyph::Dirt
        } else {
            Glyph::Empty
        }
    }
}

/// The whole grid at one step, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Step the snapshot was taken after.
    pub step: u64,
    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,
    /// One entry per cell, row-major.
    pub cells: Vec<CellPortrayal>,
}

impl GridSnapshot {
    /// Contents of a cell, or `None` off the grid.
    pub fn get(&self, location: Location) -> Option<&CellPortrayal> {
        if location.x >= self.width || location.y >= self.height {
            return None;
        }
        self.cells.get(location.y * self.width + location.x)
    }
}

// print out cells, and row and column numbers which start at 0.
impl std::fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity((self.width * 2 + 4) * (self.height + 1));

        s.push_str("  ");
        for col in 0..self.width {
            s.push_str(&format!("{}", col % 10));
            if col < self.width - 1 {
                s.push(' ');
            }
        }
        s.push('\n');

        for row in 0..self.height {
            s.push_str(&format!("{} ", row % 10));
            for col in 0..self.width {
                let glyph = self
                    .get(Location::new(col, row))
                    .map_or(Glyph::Empty, CellPortrayal::glyph);
                s.push(glyph.as_char());
                if col < self.width - 1 {
                    s.push(' ');
                }
            }
            if row < self.height - 1 {
                s.push('\n');
            }
        }
        write!(f, "{}", s)
    }
}

/// Text chart of dirt over time, one bar per record.
pub fn dirt_chart(records: &[ModelRecord]) -> String {
    let step_width = records
        .last()
        .map_or(1, |record| record.step.to_string().len());
    records
        .iter()
        .map(|record| {
            format!(
                "{:>width$} | {} {}",
                record.step,
                "#".repeat(record.dirt),
                record.dirt,
                width = step_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
