//! Genetic Algorithm for the TSP.
//!
//! This module implements the generational loop of an elitist genetic
//! algorithm without crossover:
//! - one seeding pass (uniform random or greedy nearest neighbor)
//! - per generation: evaluate, keep the single best tour untouched,
//!   swap-mutate every other tour once
//! - a route is rendered each time the elite beats every earlier generation
//!
//! All randomness comes from one `ChaCha8Rng` owned by the algorithm, so a
//! given seed always replays the same run.

use crate::error::{Error, Result};
use crate::heuristics::construction::SeedingKind;
use crate::heuristics::operators::{evaluate_population, select_elite, swap_mutation};
use crate::instance::CityTable;
use crate::output::TourSink;
use crate::solution::Solution;
use crate::statistics::RunStatistics;
use crate::tour::Tour;
use crate::visualization::RouteRenderer;
use indicatif::ProgressBar;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Genetic Algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GAConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations
    pub generations: usize,
    /// Random seed
    pub seed: u64,
    /// How the initial population is built
    pub seeding: SeedingKind,
    /// Check the permutation invariant of every seeded and mutated tour
    pub validate: bool,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            population_size: 20,
            generations: 10_000,
            seed: 23432,
            seeding: SeedingKind::UniformRandom,
            validate: cfg!(debug_assertions),
        }
    }
}

/// What happened during one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOutcome {
    pub generation: usize,
    /// Index of the individual exempted from mutation
    pub elite_index: usize,
    pub elite_fitness: f64,
    /// The elite beat every earlier generation of the run
    pub improved: bool,
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm {
    config: GAConfig,
    cities: CityTable,
    population: Vec<Tour>,
    statistics: RunStatistics,
    best_fitness: f64,
    last_elite: Option<usize>,
    rng: ChaCha8Rng,
    generation: usize,
    progress: Option<ProgressBar>,
}

impl GeneticAlgorithm {
    pub fn new(cities: CityTable, config: GAConfig) -> Result<Self> {
        if config.population_size == 0 {
            return Err(Error::invalid_config("population size must be at least 1"));
        }
        if cities.len() < 2 {
            return Err(Error::invalid_input(format!(
                "at least 2 cities are required, found {}",
                cities.len()
            )));
        }

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let statistics = RunStatistics::with_capacity(config.generations);

        Ok(GeneticAlgorithm {
            config,
            cities,
            population: Vec::new(),
            statistics,
            best_fitness: 0.0,
            last_elite: None,
            rng,
            generation: 0,
            progress: None,
        })
    }

    /// Report generation progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Build the initial population with the configured seeding strategy
    pub fn initialize_population(&mut self) -> Result<()> {
        let strategy = self.config.seeding.strategy();
        let population =
            strategy.seed_population(&self.cities, self.config.population_size, &mut self.rng)?;

        if population.len() != self.config.population_size {
            return Err(Error::invalid_config(format!(
                "{} seeding produced {} tours, expected {}",
                strategy.name(),
                population.len(),
                self.config.population_size
            )));
        }
        if self.config.validate {
            for tour in &population {
                self.cities.validate_tour(tour)?;
            }
        }

        self.population = population;
        self.statistics = RunStatistics::with_capacity(self.config.generations);
        self.best_fitness = 0.0;
        self.last_elite = None;
        self.generation = 0;

        log::info!(
            "[GA] Initialized population: {} tours over {} cities ({} seeding)",
            self.population.len(),
            self.cities.len(),
            strategy.name()
        );

        Ok(())
    }

    /// Run one generation: evaluate, select the elite, record statistics,
    /// render on a new best, then mutate every non-elite tour once
    pub fn evolve_generation<R>(
        &mut self,
        renderer: &mut R,
        output_dir: &Path,
    ) -> Result<GenerationOutcome>
    where
        R: RouteRenderer + ?Sized,
    {
        if self.population.is_empty() {
            return Err(Error::invalid_config("population has not been initialized"));
        }

        let scores = evaluate_population(&self.population, &self.cities);
        let elite = select_elite(&scores);
        let elite_fitness = scores[elite];
        let mean_fitness = scores.iter().sum::<f64>() / scores.len() as f64;

        self.statistics.record(1.0 / elite_fitness, 1.0 / mean_fitness);

        let improved = elite_fitness > self.best_fitness;
        if improved {
            self.best_fitness = elite_fitness;
            log::debug!(
                "[GA] Gen {}  New best length {:.4}",
                self.generation,
                1.0 / elite_fitness
            );
            renderer.render_route(
                &self.population[elite],
                &self.cities,
                self.generation,
                output_dir,
            )?;
        }

        // Every fitness is computed before the first mutation below
        for i in 0..self.population.len() {
            if i == elite {
                continue;
            }
            let child = swap_mutation(&self.population[i], &mut self.rng);
            if self.config.validate {
                self.cities.validate_tour(&child)?;
            }
            self.population[i] = child;
        }

        let outcome = GenerationOutcome {
            generation: self.generation,
            elite_index: elite,
            elite_fitness,
            improved,
        };

        self.last_elite = Some(elite);
        self.generation += 1;

        if let Some(progress) = &self.progress {
            progress.inc(1);
            if improved {
                progress.set_message(format!("best {:.2}", 1.0 / elite_fitness));
            }
        }

        Ok(outcome)
    }

    /// Run the genetic algorithm.
    ///
    /// Seeds, evolves for the configured number of generations, writes the
    /// final elite to `sink` and renders it once more at generation index
    /// `generations`.
    pub fn run<R, W>(
        &mut self,
        renderer: &mut R,
        sink: &mut W,
        output_dir: &Path,
    ) -> Result<Solution>
    where
        R: RouteRenderer + ?Sized,
        W: TourSink + ?Sized,
    {
        let start = std::time::Instant::now();

        self.initialize_population()?;

        while self.generation < self.config.generations {
            self.evolve_generation(renderer, output_dir)?;
        }

        let best = self.elite_tour().clone();
        sink.write_tour(&best)?;
        renderer.render_route(&best, &self.cities, self.config.generations, output_dir)?;

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        let seeding = self.config.seeding.to_string();
        let mut solution = Solution::from_tour(&self.cities, &best, &seeding);
        solution.seed = self.config.seed;
        solution.population_size = self.config.population_size;
        solution.generations = self.generation;
        solution.computation_time = start.elapsed().as_secs_f64();

        log::info!(
            "[GA] Finished {} generations  Best length {:.4}  Elapsed {:.2}s",
            self.generation,
            solution.length,
            solution.computation_time
        );

        Ok(solution)
    }

    /// The elite of the most recent generation.
    ///
    /// Before any generation has run this is the best tour of the seeded
    /// population. Panics if the population was never initialized.
    pub fn elite_tour(&self) -> &Tour {
        let index = match self.last_elite {
            Some(index) => index,
            None => select_elite(&evaluate_population(&self.population, &self.cities)),
        };
        &self.population[index]
    }

    pub fn population(&self) -> &[Tour] {
        &self.population
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    pub fn cities(&self) -> &CityTable {
        &self.cities
    }

    pub fn config(&self) -> &GAConfig {
        &self.config
    }

    /// Get current generation
    pub fn current_generation(&self) -> usize {
        self.generation
    }

    /// Highest fitness seen in any generation so far (0 before the first)
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullSink;
    use crate::visualization::NoRender;

    fn unit_square() -> CityTable {
        CityTable::from_points("square", &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
            .unwrap()
    }

    fn random_table(n: usize, seed: u64) -> CityTable {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        CityTable::from_points("random", &points).unwrap()
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<(usize, Tour)>,
    }

    impl RouteRenderer for RecordingRenderer {
        fn render_route(
            &mut self,
            tour: &Tour,
            _: &CityTable,
            generation: usize,
            _: &Path,
        ) -> Result<()> {
            self.calls.push((generation, tour.clone()));
            Ok(())
        }
    }

    struct FailingRenderer;

    impl RouteRenderer for FailingRenderer {
        fn render_route(&mut self, _: &Tour, _: &CityTable, _: usize, _: &Path) -> Result<()> {
            Err(Error::Render("disk full".to_string()))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        tours: Vec<Tour>,
    }

    impl TourSink for MemorySink {
        fn write_tour(&mut self, tour: &Tour) -> Result<()> {
            self.tours.push(tour.clone());
            Ok(())
        }
    }

    fn config(
        population_size: usize,
        generations: usize,
        seed: u64,
        seeding: SeedingKind,
    ) -> GAConfig {
        GAConfig {
            population_size,
            generations,
            seed,
            seeding,
            validate: true,
        }
    }

    #[test]
    fn test_square_converges_to_perimeter() {
        let mut ga = GeneticAlgorithm::new(
            unit_square(),
            config(20, 50, 42, SeedingKind::UniformRandom),
        )
        .unwrap();

        let solution = ga.run(&mut NoRender, &mut NullSink, Path::new(".")).unwrap();

        assert!((solution.length - 4.0).abs() < 1e-9);
        assert!((ga.best_fitness() - 0.25).abs() < 1e-12);
        assert_eq!(ga.statistics().len(), 50);
        assert_eq!(solution.generations, 50);
        assert!(Tour::from_genes(solution.tour.clone(), 4).is_ok());
    }

    #[test]
    fn test_best_length_never_increases() {
        for seeding in SeedingKind::all() {
            let mut ga =
                GeneticAlgorithm::new(random_table(15, 9), config(15, 300, 5, seeding)).unwrap();
            ga.run(&mut NoRender, &mut NullSink, Path::new(".")).unwrap();

            let best = ga.statistics().best_lengths();
            assert_eq!(best.len(), 300);
            for pair in best.windows(2) {
                assert!(pair[1] <= pair[0], "{:?} best length went up", seeding);
            }
            for record in ga.statistics().records() {
                assert!(record.mean_length >= record.best_length - 1e-9);
            }
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed: u64| {
            let mut ga = GeneticAlgorithm::new(
                random_table(12, 1),
                config(10, 120, seed, SeedingKind::NearestNeighbor),
            )
            .unwrap();
            let solution = ga.run(&mut NoRender, &mut NullSink, Path::new(".")).unwrap();
            (ga.statistics().clone(), solution.tour)
        };

        let (stats_a, tour_a) = run(77);
        let (stats_b, tour_b) = run(77);

        assert_eq!(stats_a, stats_b);
        assert_eq!(tour_a, tour_b);
    }

    #[test]
    fn test_elite_exempt_and_others_swapped_once() {
        let mut ga = GeneticAlgorithm::new(
            random_table(10, 4),
            config(12, 10, 8, SeedingKind::UniformRandom),
        )
        .unwrap();
        ga.initialize_population().unwrap();

        for _ in 0..10 {
            let before = ga.population().to_vec();
            let outcome = ga.evolve_generation(&mut NoRender, Path::new(".")).unwrap();
            let after = ga.population();

            assert_eq!(after[outcome.elite_index], before[outcome.elite_index]);
            for (i, (old, new)) in before.iter().zip(after.iter()).enumerate() {
                assert!(new.is_permutation_of(10));
                if i != outcome.elite_index {
                    assert_eq!(old.differing_positions(new).len(), 2);
                }
            }
        }
    }

    #[test]
    fn test_renders_only_on_new_best_and_at_the_end() {
        let mut renderer = RecordingRenderer::default();
        let mut sink = MemorySink::default();
        let mut ga = GeneticAlgorithm::new(
            random_table(14, 2),
            config(10, 200, 3, SeedingKind::UniformRandom),
        )
        .unwrap();

        let solution = ga.run(&mut renderer, &mut sink, Path::new(".")).unwrap();
        let cities = ga.cities().clone();

        let (last, improvements) = renderer.calls.split_last().unwrap();
        assert_eq!(improvements[0].0, 0);
        for pair in improvements.windows(2) {
            assert!(pair[1].0 > pair[0].0);
            let before = cities.tour_length(pair[0].1.genes());
            let after = cities.tour_length(pair[1].1.genes());
            assert!(after < before);
        }

        assert_eq!(last.0, 200);
        assert_eq!(last.1.genes(), solution.tour.as_slice());
        assert_eq!(sink.tours.len(), 1);
        assert_eq!(sink.tours[0].genes(), solution.tour.as_slice());

        let final_best = ga.statistics().final_best_length().unwrap();
        assert!((final_best - solution.length).abs() < 1e-12);
    }

    #[test]
    fn test_render_failure_aborts_run() {
        let mut ga = GeneticAlgorithm::new(
            unit_square(),
            config(5, 10, 1, SeedingKind::UniformRandom),
        )
        .unwrap();
        let result = ga.run(&mut FailingRenderer, &mut NullSink, Path::new("."));
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[test]
    fn test_two_cities() {
        let cities = CityTable::from_points("pair", &[(0.0, 0.0), (3.0, 4.0)]).unwrap();
        let mut ga =
            GeneticAlgorithm::new(cities, config(4, 20, 0, SeedingKind::NearestNeighbor)).unwrap();

        let solution = ga.run(&mut NoRender, &mut NullSink, Path::new(".")).unwrap();
        assert!((solution.length - 10.0).abs() < 1e-12);
        assert!(Tour::from_genes(solution.tour, 2).is_ok());
    }

    #[test]
    fn test_single_individual_never_changes() {
        let mut ga = GeneticAlgorithm::new(
            random_table(8, 6),
            config(1, 25, 2, SeedingKind::UniformRandom),
        )
        .unwrap();
        ga.initialize_population().unwrap();
        let seeded = ga.population()[0].clone();

        for _ in 0..25 {
            ga.evolve_generation(&mut NoRender, Path::new(".")).unwrap();
        }
        assert_eq!(ga.population()[0], seeded);
    }

    #[test]
    fn test_zero_population_rejected() {
        let result =
            GeneticAlgorithm::new(unit_square(), config(0, 10, 0, SeedingKind::UniformRandom));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_evolve_before_seeding_is_an_error() {
        let config = config(4, 1, 0, SeedingKind::UniformRandom);
        let mut ga = GeneticAlgorithm::new(unit_square(), config).unwrap();
        assert!(ga.evolve_generation(&mut NoRender, Path::new(".")).is_err());
    }

    #[test]
    fn test_zero_generations_returns_seeded_elite() {
        let mut sink = MemorySink::default();
        let mut ga = GeneticAlgorithm::new(
            random_table(9, 3),
            config(6, 0, 4, SeedingKind::NearestNeighbor),
        )
        .unwrap();

        let solution = ga.run(&mut NoRender, &mut sink, Path::new(".")).unwrap();
        assert!(ga.statistics().is_empty());
        assert_eq!(sink.tours.len(), 1);
        assert!(Tour::from_genes(solution.tour, 9).is_ok());
    }
}
