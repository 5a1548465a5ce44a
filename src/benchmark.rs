//! Benchmarking of the seeding strategies.
//!
//! Runs the genetic algorithm several times per seeding strategy with
//! consecutive seeds, collects the final lengths and compares the
//! strategies.

use crate::error::Result;
use crate::heuristics::construction::SeedingKind;
use crate::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use crate::instance::CityTable;
use crate::output::NullSink;
use crate::visualization::NoRender;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;

/// Result of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Seeding strategy name
    pub seeding: String,
    /// Instance name
    pub instance: String,
    /// Run index within the strategy
    pub run: usize,
    pub seed: u64,
    /// Elite length of the seeded population
    pub initial_length: f64,
    /// Elite length after the last generation
    pub final_length: f64,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics for a seeding strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyStatistics {
    pub seeding: String,
    pub num_runs: usize,
    /// Average final length
    pub avg_length: f64,
    pub best_length: f64,
    pub worst_length: f64,
    /// Sample standard deviation of the final length
    pub std_length: f64,
    /// Average elite length of the seeded population
    pub avg_initial_length: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per strategy
    pub runs: usize,
    pub population_size: usize,
    pub generations: usize,
    /// Run `k` uses seed `base_seed + k`
    pub base_seed: u64,
    /// Run in parallel
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let ga = GAConfig::default();
        BenchmarkConfig {
            runs: 5,
            population_size: ga.population_size,
            generations: 2_000,
            base_seed: ga.seed,
            parallel: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunRecord>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    fn run_once(&self, cities: &CityTable, seeding: SeedingKind, run: usize) -> Result<RunRecord> {
        let seed = self.config.base_seed.wrapping_add(run as u64);
        let ga_config = GAConfig {
            population_size: self.config.population_size,
            generations: self.config.generations,
            seed,
            seeding,
            ..Default::default()
        };

        let mut ga = GeneticAlgorithm::new(cities.clone(), ga_config)?;
        let solution = ga.run(&mut NoRender, &mut NullSink, Path::new("."))?;

        let initial_length = ga
            .statistics()
            .records()
            .first()
            .map(|r| r.best_length)
            .unwrap_or(solution.length);

        Ok(RunRecord {
            seeding: seeding.to_string(),
            instance: cities.name.clone(),
            run,
            seed,
            initial_length,
            final_length: solution.length,
            time: solution.computation_time,
        })
    }

    /// Run every configured seed with one seeding strategy
    pub fn run_strategy(&mut self, cities: &CityTable, seeding: SeedingKind) -> Result<()> {
        log::info!(
            "Benchmarking {} seeding on {}: {} runs x {} generations",
            seeding,
            cities.name,
            self.config.runs,
            self.config.generations
        );

        let records: Vec<RunRecord> = if self.config.parallel {
            let this = &*self;
            (0..self.config.runs)
                .into_par_iter()
                .map(|run| this.run_once(cities, seeding, run))
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..self.config.runs)
                .map(|run| self.run_once(cities, seeding, run))
                .collect::<Result<Vec<_>>>()?
        };

        self.results.extend(records);
        Ok(())
    }

    /// Run both seeding strategies
    pub fn run_all(&mut self, cities: &CityTable) -> Result<()> {
        for seeding in SeedingKind::all() {
            self.run_strategy(cities, seeding)?;
        }
        Ok(())
    }

    /// Compute statistics for each strategy, best average first
    pub fn compute_statistics(&self) -> Vec<StrategyStatistics> {
        let mut statistics = Vec::new();

        for seeding in SeedingKind::all() {
            let name = seeding.to_string();
            let runs: Vec<&RunRecord> = self.results.iter().filter(|r| r.seeding == name).collect();
            if runs.is_empty() {
                continue;
            }

            let lengths: Vec<f64> = runs.iter().map(|r| r.final_length).collect();
            let initial: Vec<f64> = runs.iter().map(|r| r.initial_length).collect();
            let times: Vec<f64> = runs.iter().map(|r| r.time).collect();

            let std_length = if lengths.len() > 1 {
                lengths.iter().std_dev()
            } else {
                0.0
            };

            statistics.push(StrategyStatistics {
                seeding: name,
                num_runs: runs.len(),
                avg_length: lengths.iter().mean(),
                best_length: lengths.iter().cloned().fold(f64::INFINITY, f64::min),
                worst_length: lengths.iter().cloned().fold(0.0, f64::max),
                std_length,
                avg_initial_length: initial.iter().mean(),
                avg_time: times.iter().mean(),
                total_time: times.iter().sum::<f64>(),
            });
        }

        statistics.sort_by_key(|s| OrderedFloat(s.avg_length));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("     Seeding Strategy Benchmark\n");
        report.push_str("========================================\n\n");
        report.push_str(&format!(
            "Population {}  Generations {}  Seeds {}..{}\n\n",
            self.config.population_size,
            self.config.generations,
            self.config.base_seed,
            self.config.base_seed.wrapping_add(self.config.runs as u64)
        ));

        report.push_str(&"-".repeat(88));
        report.push('\n');
        report.push_str(&format!(
            "{:<18} {:>6} {:>12} {:>12} {:>12} {:>10} {:>12} {:>10}\n",
            "Seeding", "Runs", "Avg Length", "Best", "Worst", "Std", "Avg Initial", "Avg Time"
        ));
        report.push_str(&"-".repeat(88));
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<18} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>10.2} {:>12.2} {:>10.4}\n",
                stat.seeding,
                stat.num_runs,
                stat.avg_length,
                stat.best_length,
                stat.worst_length,
                stat.std_length,
                stat.avg_initial_length,
                stat.avg_time
            ));
        }

        report.push_str(&"-".repeat(88));
        report.push('\n');

        if let Some(best) = self.results.iter().min_by_key(|r| OrderedFloat(r.final_length)) {
            report.push_str(&format!(
                "\nShortest tour: {:.2} ({} seeding, seed {})\n",
                best.final_length, best.seeding, best.seed
            ));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunRecord] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("ga-tsp-tests-{name}-{nanos}"))
    }

    fn table() -> CityTable {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let points: Vec<(f64, f64)> = (0..10)
            .map(|_| (rng.gen_range(0.0..50.0), rng.gen_range(0.0..50.0)))
            .collect();
        CityTable::from_points("bench", &points).unwrap()
    }

    fn small_config(parallel: bool) -> BenchmarkConfig {
        BenchmarkConfig {
            runs: 3,
            population_size: 8,
            generations: 60,
            base_seed: 100,
            parallel,
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.runs, 5);
        assert_eq!(config.population_size, 20);
    }

    #[test]
    fn test_run_all_covers_both_strategies() {
        let cities = table();
        let mut bench = Benchmark::new(small_config(true));
        bench.run_all(&cities).unwrap();

        assert_eq!(bench.results().len(), 6);
        for record in bench.results() {
            assert!(record.final_length <= record.initial_length);
        }

        let stats = bench.compute_statistics();
        assert_eq!(stats.len(), 2);
        for stat in &stats {
            assert_eq!(stat.num_runs, 3);
            assert!(stat.best_length <= stat.avg_length + 1e-9);
            assert!(stat.avg_length <= stat.worst_length + 1e-9);
            assert!(stat.std_length >= 0.0);
        }
        assert!(stats[0].avg_length <= stats[1].avg_length);

        let report = bench.generate_report();
        assert!(report.contains("UniformRandom"));
        assert!(report.contains("NearestNeighbor"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let cities = table();

        let mut parallel = Benchmark::new(small_config(true));
        parallel.run_strategy(&cities, SeedingKind::NearestNeighbor).unwrap();
        let mut sequential = Benchmark::new(small_config(false));
        sequential.run_strategy(&cities, SeedingKind::NearestNeighbor).unwrap();

        let lengths = |b: &Benchmark| -> Vec<(u64, f64)> {
            b.results().iter().map(|r| (r.seed, r.final_length)).collect()
        };
        assert_eq!(lengths(&parallel), lengths(&sequential));
    }

    #[test]
    fn test_csv_exports() {
        let dir = unique_temp_dir("bench-csv");
        std::fs::create_dir_all(&dir).expect("create temp dir");

        let mut bench = Benchmark::new(BenchmarkConfig {
            runs: 1,
            ..small_config(false)
        });
        bench.run_strategy(&table(), SeedingKind::UniformRandom).unwrap();
        bench.export_to_csv(dir.join("runs.csv")).unwrap();
        bench.export_statistics_csv(dir.join("summary.csv")).unwrap();

        let runs = std::fs::read_to_string(dir.join("runs.csv")).unwrap();
        assert_eq!(runs.lines().count(), 2);
        assert!(runs.starts_with("seeding,instance,run,seed,"));

        let summary = std::fs::read_to_string(dir.join("summary.csv")).unwrap();
        assert!(summary.lines().nth(1).unwrap().starts_with("UniformRandom,1,"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
