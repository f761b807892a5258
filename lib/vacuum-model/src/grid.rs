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

//! A bounded 2D grid where any number of entities may share a cell.

use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, HashSet, VacuumError};

/// A cell on the grid. `(0, 0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Location {
    /// Create a new location.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How the Moore neighborhood behaves at the grid edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Edges are walls. Corner cells have 3 neighbors and edge cells have 5.
    #[default]
    Bounded,

    /// Edges wrap around to the opposite side.
    Toroidal,
}

/// Grid of cells, each holding a set of entity ids.
///
/// Cells are stored row-major, so iteration order is stable: all of row 0 left to right, then
/// row 1, and so on.
#[derive(Debug, Clone)]
pub struct MultiGrid<Id> {
    width: usize,
    height: usize,
    topology: Topology,
    cells: Vec<HashSet<Id>>,
}

impl<Id> MultiGrid<Id>
where
    Id: Copy + Eq + Hash,
{
    /// Create an empty grid.
    pub fn new(width: usize, height: usize, topology: Topology) -> Result<Self, VacuumError> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::ZeroDimension { width, height }.into());
        }
        let cells = (0..width * height).map(|_| HashSet::default()).collect();
        Ok(Self {
            width,
            height,
            topology,
            cells,
        })
    }

    /// Width of the grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Edge behavior of the grid.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Whether the location is on the grid.
    pub fn contains(&self, location: Location) -> bool {
        location.x < self.width && location.y < self.height
    }

    fn index(&self, location: Location) -> Result<usize, VacuumError> {
        if !self.contains(location) {
            return Err(VacuumError::OutOfBounds {
                location,
                width: self.width,
                height: self.height,
            });
        }
        Ok(location.y * self.width + location.x)
    }

    fn location_of(&self, index: usize) -> Location {
        Location::new(index % self.width, index / self.width)
    }

    /// Put an entity on a cell.
    pub fn place(&mut self, id: Id, location: Location) -> Result<(), VacuumError> {
        let index = self.index(location)?;
        self.cells[index].insert(id);
        Ok(())
    }

    /// Relocate an entity. Either both cells change or neither does.
    pub fn move_entity(&mut self, id: Id, from: Location, to: Location) -> Result<(), VacuumError> {
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;
        if !self.cells[from_index].remove(&id) {
            return Err(VacuumError::NotOnCell { location: from });
        }
        self.cells[to_index].insert(id);
        Ok(())
    }

    /// Take an entity off a cell.
    pub fn remove(&mut self, id: Id, location: Location) -> Result<(), VacuumError> {
        let index = self.index(location)?;
        if !self.cells[index].remove(&id) {
            return Err(VacuumError::NotOnCell { location });
        }
        Ok(())
    }

    /// Entities on a cell.
    pub fn occupants(&self, location: Location) -> Result<&HashSet<Id>, VacuumError> {
        let index = self.index(location)?;
        Ok(&self.cells[index])
    }

    /// True iff nothing occupies the cell.
    pub fn is_empty(&self, location: Location) -> Result<bool, VacuumError> {
        Ok(self.occupants(location)?.is_empty())
    }

    /// Moore neighborhood of a cell, in row-major order.
    ///
    /// On a bounded grid this is up to 8 cells, fewer at the edges. On a toroidal grid
    /// coordinates wrap; on grids narrower than 3 cells the wrapped cells are returned once, and
    /// the center is never returned unless `include_center` is set.
    pub fn neighbors(
        &self,
        location: Location,
        include_center: bool,
    ) -> Result<Vec<Location>, VacuumError> {
        self.index(location)?;

        let width = self.width as i64;
        let height = self.height as i64;
        let mut neighbors = Vec::with_capacity(9);
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let x = location.x as i64 + dx;
                let y = location.y as i64 + dy;
                let neighbor = match self.topology {
                    Topology::Bounded => {
                        if x < 0 || y < 0 || x >= width || y >= height {
                            continue;
                        }
                        Location::new(x as usize, y as usize)
                    }
                    Topology::Toroidal => {
                        let wrapped =
                            Location::new(x.rem_euclid(width) as usize, y.rem_euclid(height) as usize);
                        if wrapped == location && !(dx == 0 && dy == 0) {
                            continue;
                        }
                        if neighbors.contains(&wrapped) {
                            continue;
                        }
                        wrapped
                    }
                };
                neighbors.push(neighbor);
            }
        }
        Ok(neighbors)
    }

    /// Every location on the grid, row-major.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.cells.len()).map(|index| self.location_of(index))
    }

    /// Every cell with its occupants, row-major. Call again to restart.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Location, &HashSet<Id>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, occupants)| (self.location_of(index), occupants))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn bounded(width: usize, height: usize) -> MultiGrid<u32> {
        MultiGrid::new(width, height, Topology::Bounded).expect("valid grid")
    }

    #[test]
    fn test_zero_dimension_is_configuration_error() {
        let result = MultiGrid::<u32>::new(0, 5, Topology::Bounded);
        assert_eq!(
            result.unwrap_err(),
            VacuumError::Configuration(ConfigurationError::ZeroDimension {
                width: 0,
                height: 5
            })
        );
    }

    #[test]
    fn test_corner_has_three_neighbors() {
        let grid = bounded(5, 5);
        for corner in [
            Location::new(0, 0),
            Location::new(4, 0),
            Location::new(0, 4),
            Location::new(4, 4),
        ] {
            assert_eq!(grid.neighbors(corner, false).unwrap().len(), 3, "{}", corner);
        }
    }

    #[test]
    fn test_edge_has_five_neighbors() {
        let grid = bounded(5, 5);
        for edge in [
            Location::new(2, 0),
            Location::new(0, 2),
            Location::new(4, 2),
            Location::new(2, 4),
        ] {
            assert_eq!(grid.neighbors(edge, false).unwrap().len(), 5, "{}", edge);
        }
    }

    #[test]
    fn test_neighbors_are_row_major_and_exclude_center() {
        let grid = bounded(5, 5);
        let neighbors = grid.neighbors(Location::new(1, 1), false).unwrap();
        assert_eq!(
            neighbors,
            vec![
                Location::new(0, 0),
                Location::new(1, 0),
                Location::new(2, 0),
                Location::new(0, 1),
                Location::new(2, 1),
                Location::new(0, 2),
                Location::new(1, 2),
                Location::new(2, 2),
            ]
        );
        let with_center = grid.neighbors(Location::new(1, 1), true).unwrap();
        assert_eq!(with_center.len(), 9);
        assert!(with_center.contains(&Location::new(1, 1)));
    }

    #[test]
    fn test_toroidal_corner_wraps() {
        let grid = MultiGrid::<u32>::new(5, 5, Topology::Toroidal).unwrap();
        let neighbors = grid.neighbors(Location::new(0, 0), false).unwrap();
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&Location::new(4, 4)));
        assert!(neighbors.contains(&Location::new(4, 0)));
        assert!(neighbors.contains(&Location::new(0, 4)));
    }

    #[test]
    fn test_toroidal_narrow_grid_has_no_duplicates() {
        let grid = MultiGrid::<u32>::new(2, 1, Topology::Toroidal).unwrap();
        let neighbors = grid.neighbors(Location::new(0, 0), false).unwrap();
        assert_eq!(neighbors, vec![Location::new(1, 0)]);
    }

    #[test]
    fn test_neighbors_of_out_of_bounds_location_is_error() {
        let grid = bounded(3, 3);
        assert_eq!(
            grid.neighbors(Location::new(3, 0), false),
            Err(VacuumError::OutOfBounds {
                location: Location::new(3, 0),
                width: 3,
                height: 3
            })
        );
    }

    #[test]
    fn test_place_out_of_bounds_is_error() {
        let mut grid = bounded(3, 2);
        assert!(matches!(
            grid.place(1, Location::new(0, 2)),
            Err(VacuumError::OutOfBounds { .. })
        ));
        assert!(grid.iter_cells().all(|(_, occupants)| occupants.is_empty()));
    }

    #[test]
    fn test_cells_hold_many_entities() {
        let mut grid = bounded(3, 3);
        let location = Location::new(1, 1);
        grid.place(1, location).unwrap();
        grid.place(2, location).unwrap();
        assert_eq!(grid.occupants(location).unwrap().len(), 2);
        assert!(!grid.is_empty(location).unwrap());
        assert!(grid.is_empty(Location::new(0, 0)).unwrap());
    }

    #[test]
    fn test_move_to_invalid_target_leaves_entity_in_place() {
        let mut grid = bounded(3, 3);
        let from = Location::new(2, 2);
        grid.place(7, from).unwrap();
        assert!(matches!(
            grid.move_entity(7, from, Location::new(3, 2)),
            Err(VacuumError::OutOfBounds { .. })
        ));
        assert!(grid.occupants(from).unwrap().contains(&7));
    }

    #[test]
    fn test_move_from_wrong_cell_is_error() {
        let mut grid = bounded(3, 3);
        grid.place(7, Location::new(0, 0)).unwrap();
        assert_eq!(
            grid.move_entity(7, Location::new(1, 1), Location::new(2, 2)),
            Err(VacuumError::NotOnCell {
                location: Location::new(1, 1)
            })
        );
        assert!(grid.is_empty(Location::new(2, 2)).unwrap());
    }

    #[test]
    fn test_remove() {
        let mut grid = bounded(3, 3);
        let location = Location::new(0, 1);
        grid.place(3, location).unwrap();
        grid.remove(3, location).unwrap();
        assert!(grid.is_empty(location).unwrap());
        assert_eq!(
            grid.remove(3, location),
            Err(VacuumError::NotOnCell { location })
        );
    }

    #[test]
    fn test_iter_cells_is_row_major_and_restartable() {
        let grid = bounded(3, 2);
        let first: Vec<Location> = grid.iter_cells().map(|(location, _)| location).collect();
        let second: Vec<Location> = grid.locations().collect();
        assert_eq!(
            first,
            vec![
                Location::new(0, 0),
                Location::new(1, 0),
                Location::new(2, 0),
                Location::new(0, 1),
                Location::new(1, 1),
                Location::new(2, 1),
            ]
        );
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn test_bounded_neighbors_are_adjacent_and_in_bounds(
            width in 1..12usize,
            height in 1..12usize,
            x in 0..12usize,
            y in 0..12usize,
        ) {
            prop_assume!(x < width && y < height);
            let grid = bounded(width, height);
            let location = Location::new(x, y);
            let neighbors = grid.neighbors(location, false).unwrap();

            prop_assert!(neighbors.len() <= 8);
            for neighbor in &neighbors {
                prop_assert!(grid.contains(*neighbor));
                prop_assert_ne!(*neighbor, location);
                prop_assert!(neighbor.x.abs_diff(x) <= 1 && neighbor.y.abs_diff(y) <= 1);
            }

            let columns = (x.saturating_sub(1)..=(x + 1).min(width - 1)).count();
            let rows = (y.saturating_sub(1)..=(y + 1).min(height - 1)).count();
            prop_assert_eq!(neighbors.len(), columns * rows - 1);
        }

        #[test]
        fn test_toroidal_neighbors_of_wide_grid_are_eight(
            width in 3..12usize,
            height in 3..12usize,
            x in 0..12usize,
            y in 0..12usize,
        ) {
            prop_assume!(x < width && y < height);
            let grid = MultiGrid::<u32>::new(width, height, Topology::Toroidal).unwrap();
            let neighbors = grid.neighbors(Location::new(x, y), false).unwrap();
            prop_assert_eq!(neighbors.len(), 8);
        }
    }
}
