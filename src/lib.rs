//! GA TSP Solver Library
//!
//! An elitist genetic algorithm for the symmetric Euclidean Traveling
//! Salesman Problem.
//!
//! # Features
//!
//! - Two seeding strategies (uniform random, greedy nearest neighbor with jitter)
//! - Swap mutation with single-individual elitism
//! - Route and convergence plots (SVG, optional PNG)
//! - Multi-seed benchmarking of the seeding strategies
//!
//! # Example
//!
//! ```no_run
//! use ga_tsp_solver::heuristics::genetic::{GAConfig, GeneticAlgorithm};
//! use ga_tsp_solver::instance::CityTable;
//! use ga_tsp_solver::output::NullSink;
//! use ga_tsp_solver::visualization::NoRender;
//! use std::path::Path;
//!
//! // Load instance
//! let cities = CityTable::from_file("coordinates.txt").unwrap();
//!
//! // Evolve
//! let mut ga = GeneticAlgorithm::new(cities, GAConfig::default()).unwrap();
//! let solution = ga.run(&mut NoRender, &mut NullSink, Path::new(".")).unwrap();
//!
//! println!("Minimum length: {:.2}", solution.length);
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod instance;
pub mod output;
pub mod solution;
pub mod statistics;
pub mod tour;
pub mod visualization;

pub use error::{Error, Result};
pub use instance::CityTable;
pub use solution::Solution;
pub use tour::Tour;
