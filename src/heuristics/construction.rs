use crate::error::{Error, Result};
use crate::heuristics::operators::{evaluate_population, select_elite, swap_mutation};
use crate::instance::CityTable;
use crate::tour::Tour;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Builds the initial population of a run
pub trait SeedingStrategy {
    fn seed_population(
        &self,
        cities: &CityTable,
        population_size: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Tour>>;
    fn name(&self) -> &str;
}

/// Which seeding strategy a run uses
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedingKind {
    #[default]
    UniformRandom,
    NearestNeighbor,
}

impl SeedingKind {
    pub fn strategy(&self) -> Box<dyn SeedingStrategy + Send + Sync> {
        match self {
            SeedingKind::UniformRandom => Box::new(UniformRandomSeeding::new()),
            SeedingKind::NearestNeighbor => Box::new(NearestNeighborSeeding::new()),
        }
    }

    pub fn all() -> [SeedingKind; 2] {
        [SeedingKind::UniformRandom, SeedingKind::NearestNeighbor]
    }
}

impl std::fmt::Display for SeedingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedingKind::UniformRandom => write!(f, "UniformRandom"),
            SeedingKind::NearestNeighbor => write!(f, "NearestNeighbor"),
        }
    }
}

fn check_table(cities: &CityTable) -> Result<()> {
    if cities.len() < 2 {
        return Err(Error::invalid_input(format!(
            "cannot seed tours over {} cities",
            cities.len()
        )));
    }
    Ok(())
}

/// Uniform random seeding
///
/// Every individual is an independent uniformly random permutation
/// (Fisher-Yates shuffle of the identity tour).
#[derive(Debug, Clone, Default)]
pub struct UniformRandomSeeding;

impl UniformRandomSeeding {
    pub fn new() -> Self {
        UniformRandomSeeding
    }
}

impl SeedingStrategy for UniformRandomSeeding {
    fn seed_population(
        &self,
        cities: &CityTable,
        population_size: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Tour>> {
        check_table(cities)?;

        let n = cities.len();
        let population = (0..population_size)
            .map(|_| {
                let mut genes: Vec<usize> = (0..n).collect();
                genes.shuffle(rng);
                Tour::new(genes)
            })
            .collect();

        Ok(population)
    }

    fn name(&self) -> &str {
        "UniformRandom"
    }
}

/// Nearest neighbor tour from a fixed start city.
///
/// Repeatedly steps to the closest unvisited city. Equal distances go to the
/// lowest index.
pub fn nearest_neighbor_tour(cities: &CityTable, start: usize) -> Tour {
    let n = cities.len();
    let mut tour = Vec::with_capacity(n);
    let mut visited = vec![false; n];

    let mut current = start;
    tour.push(current);
    visited[current] = true;

    while tour.len() < n {
        // min_by_key keeps the first of equal minima, i.e. the lowest index
        let next = (0..n)
            .filter(|&c| !visited[c])
            .min_by_key(|&c| OrderedFloat(cities.distance(current, c)));

        match next {
            Some(next) => {
                tour.push(next);
                visited[next] = true;
                current = next;
            }
            None => break,
        }
    }

    Tour::new(tour)
}

/// Greedy nearest neighbor seeding with jitter
///
/// Each individual is a nearest neighbor tour from a uniformly random start
/// city. Greedy tours are good but nearly identical, so afterwards every
/// individual except the best one receives between `min_jitter` and
/// `max_jitter` swap mutations (inclusive, drawn per individual).
#[derive(Debug, Clone)]
pub struct NearestNeighborSeeding {
    pub min_jitter: usize,
    pub max_jitter: usize,
}

impl NearestNeighborSeeding {
    pub fn new() -> Self {
        NearestNeighborSeeding {
            min_jitter: 3,
            max_jitter: 10,
        }
    }

    pub fn with_jitter(min_jitter: usize, max_jitter: usize) -> Self {
        NearestNeighborSeeding {
            min_jitter,
            max_jitter,
        }
    }
}

impl Default for NearestNeighborSeeding {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedingStrategy for NearestNeighborSeeding {
    fn seed_population(
        &self,
        cities: &CityTable,
        population_size: usize,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Tour>> {
        check_table(cities)?;
        if self.min_jitter > self.max_jitter {
            return Err(Error::invalid_config(format!(
                "jitter bounds inverted: {} > {}",
                self.min_jitter, self.max_jitter
            )));
        }

        let n = cities.len();
        let mut population: Vec<Tour> = (0..population_size)
            .map(|_| {
                let start = rng.gen_range(0..n);
                nearest_neighbor_tour(cities, start)
            })
            .collect();

        let scores = evaluate_population(&population, cities);
        let elite = select_elite(&scores);

        for (i, tour) in population.iter_mut().enumerate() {
            if i == elite {
                continue;
            }
            let mutations = rng.gen_range(self.min_jitter..=self.max_jitter);
            for _ in 0..mutations {
                *tour = swap_mutation(tour, rng);
            }
        }

        Ok(population)
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}
