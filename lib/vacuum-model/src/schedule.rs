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

//! Random activation scheduler.

use rand::seq::SliceRandom;
use slotmap::SlotMap;

use crate::agent::AgentKey;
use crate::{Rng, Steppable, VacuumError};

/// Activates every agent exactly once per tick, in a fresh uniformly random order each tick.
#[derive(Debug, Clone)]
pub struct RandomActivation<A> {
    agents: SlotMap<AgentKey, A>,
    steps: u64,
}

impl<A> Default for RandomActivation<A> {
    fn default() -> Self {
        Self {
            agents: SlotMap::with_key(),
            steps: 0,
        }
    }
}

impl<A> RandomActivation<A>
where
    A: Steppable,
{
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent. The agent is built from its own key so it can refer to itself on the grid.
    pub fn add_with_key(&mut self, f: impl FnOnce(AgentKey) -> A) -> AgentKey {
        self.agents.insert_with_key(f)
    }

    /// Look up an agent.
    pub fn get(&self, key: AgentKey) -> Option<&A> {
        self.agents.get(key)
    }

    /// All agents, in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentKey, &A)> + '_ {
        self.agents.iter()
    }

    /// Number of scheduled agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Ticks completed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Run one tick.
    pub fn step(&mut self, space: &mut A::Space, rng: &mut Rng) -> Result<(), VacuumError> {
        let mut order: Vec<AgentKey> = self.agents.keys().collect();
        order.shuffle(rng);
        for key in order {
            if let Some(agent) = self.agents.get_mut(key) {
                agent.step(space, rng)?;
            }
        }
        self.steps += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    // Writes its own key into the shared log when activated.
    struct Recorder {
        key: AgentKey,
    }

    impl Steppable for Recorder {
        type Space = Vec<AgentKey>;

        fn step(&mut self, space: &mut Vec<AgentKey>, _rng: &mut Rng) -> Result<(), VacuumError> {
            space.push(self.key);
            Ok(())
        }
    }

    fn schedule_of(n: usize) -> RandomActivation<Recorder> {
        let mut schedule = RandomActivation::new();
        for _ in 0..n {
            schedule.add_with_key(|key| Recorder { key });
        }
        schedule
    }

    #[test]
    fn test_every_agent_steps_exactly_once_per_tick() {
        let mut schedule = schedule_of(9);
        let mut rng = Rng::seed_from_u64(42);
        let mut expected: Vec<AgentKey> = schedule.agents().map(|(key, _)| key).collect();
        expected.sort();

        for tick in 1..=20 {
            let mut log = Vec::new();
            schedule.step(&mut log, &mut rng).unwrap();
            log.sort();
            assert_eq!(log, expected);
            assert_eq!(schedule.steps(), tick);
        }
    }

    #[test]
    fn test_order_is_reshuffled_between_ticks() {
        let mut schedule = schedule_of(9);
        let mut rng = Rng::seed_from_u64(42);
        let mut orders = Vec::new();
        for _ in 0..10 {
            let mut log = Vec::new();
            schedule.step(&mut log, &mut rng).unwrap();
            orders.push(log);
        }
        // 9! orderings; ten identical draws in a row would mean no shuffling at all.
        assert!(orders.iter().any(|order| *order != orders[0]));
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = schedule_of(5);
        let mut b = schedule_of(5);
        let mut rng_a = Rng::seed_from_u64(3);
        let mut rng_b = Rng::seed_from_u64(3);
        let mut log_a = Vec::new();
        let mut log_b = Vec::new();
        a.step(&mut log_a, &mut rng_a).unwrap();
        b.step(&mut log_b, &mut rng_b).unwrap();
        assert_eq!(log_a, log_b);
    }

    #[test]
    fn test_empty_schedule_still_counts_steps() {
        let mut schedule = schedule_of(0);
        let mut rng = Rng::seed_from_u64(42);
        let mut log = Vec::new();
        schedule.step(&mut log, &mut rng).unwrap();
        assert!(schedule.is_empty());
        assert!(log.is_empty());
        assert_eq!(schedule.steps(), 1);
    }
}
