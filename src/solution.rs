//! Summary of a finished run.

use crate::instance::CityTable;
use crate::tour::Tour;
use serde::{Deserialize, Serialize};

/// Best tour found by a run, with the parameters that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of city indices (closed implicitly)
    pub tour: Vec<usize>,
    /// Closed tour length
    pub length: f64,
    /// Seeding strategy that built the initial population
    pub seeding: String,
    /// Random seed of the run
    pub seed: u64,
    pub population_size: usize,
    /// Number of generations evolved
    pub generations: usize,
    /// Computation time in seconds
    pub computation_time: f64,
    /// RFC 3339 timestamp of when the run finished
    pub finished_at: String,
}

impl Solution {
    /// Create a solution from a tour
    pub fn from_tour(cities: &CityTable, tour: &Tour, seeding: &str) -> Self {
        Solution {
            tour: tour.genes().to_vec(),
            length: cities.tour_length(tour.genes()),
            seeding: seeding.to_string(),
            seed: 0,
            population_size: 0,
            generations: 0,
            computation_time: 0.0,
            finished_at: chrono::Local::now().to_rfc3339(),
        }
    }

    pub fn to_tour(&self) -> Tour {
        Tour::new(self.tour.clone())
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.seeding)?;
        writeln!(f, "  Length: {:.4}", self.length)?;
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(f, "  Population: {}", self.population_size)?;
        writeln!(f, "  Generations: {}", self.generations)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_from_tour() {
        let cities = CityTable::from_points(
            "sq",
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
        )
        .unwrap();
        let sol = Solution::from_tour(&cities, &Tour::new(vec![3, 2, 1, 0]), "UniformRandom");

        assert!((sol.length - 4.0).abs() < 1e-12);
        assert_eq!(sol.to_tour().genes(), &[3, 2, 1, 0]);

        let json = serde_json::to_string(&sol).unwrap();
        assert!(json.contains("\"seeding\":\"UniformRandom\""));
    }
}
