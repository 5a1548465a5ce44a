//! Genetic operators: fitness evaluation, swap mutation and elitism.
//!
//! These are pure functions over tours and the city table. Randomness is
//! always taken from a generator owned by the caller, so a seeded run is
//! reproducible.

use crate::instance::CityTable;
use crate::tour::Tour;
use rand::Rng;

/// Closed-loop Euclidean length of a tour
pub fn tour_length(tour: &Tour, cities: &CityTable) -> f64 {
    debug_assert!(
        tour.is_permutation_of(cities.len()),
        "tour {} is not a permutation of 0..{}",
        tour,
        cities.len()
    );
    cities.tour_length(tour.genes())
}

/// Fitness of a tour: the reciprocal of its closed length. Higher is better.
pub fn fitness(tour: &Tour, cities: &CityTable) -> f64 {
    1.0 / tour_length(tour, cities)
}

/// Score every individual; the result is index-aligned with `population`
pub fn evaluate_population(population: &[Tour], cities: &CityTable) -> Vec<f64> {
    population.iter().map(|tour| fitness(tour, cities)).collect()
}

/// Index of the best-scoring individual.
///
/// Scans left to right with a strict `>` so the first maximum wins ties.
/// Returns 0 for an empty slice.
pub fn select_elite(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Draw two distinct positions in `0..n`.
///
/// The second position is redrawn until it differs from the first.
/// `n` must be at least 2.
pub fn draw_swap_positions<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    assert!(n >= 2, "swap mutation needs at least 2 genes, got {}", n);

    let first = rng.gen_range(0..n);
    let mut second = rng.gen_range(0..n);
    while second == first {
        second = rng.gen_range(0..n);
    }
    (first, second)
}

/// Swap mutation: a copy of `tour` with two distinct random positions exchanged
pub fn swap_mutation<R: Rng + ?Sized>(tour: &Tour, rng: &mut R) -> Tour {
    let (i, j) = draw_swap_positions(tour.len(), rng);
    tour.swapped(i, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn unit_square() -> CityTable {
        CityTable::from_points("square", &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
            .unwrap()
    }

    #[test]
    fn test_fitness_is_reciprocal_of_length() {
        let cities = unit_square();
        let tour = Tour::new(vec![0, 1, 2, 3]);

        assert!((tour_length(&tour, &cities) - 4.0).abs() < 1e-12);
        assert!((fitness(&tour, &cities) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_shorter_tour_scores_higher() {
        let cities = unit_square();
        let perimeter = Tour::new(vec![0, 1, 2, 3]);
        let crossed = Tour::new(vec![0, 2, 1, 3]);

        let scores = evaluate_population(&[crossed.clone(), perimeter.clone()], &cities);
        assert!(scores.iter().all(|&s| s > 0.0));
        assert!(scores[1] > scores[0]);
        assert_eq!(select_elite(&scores), 1);
    }

    #[test]
    fn test_elite_ties_resolve_to_first_occurrence() {
        assert_eq!(select_elite(&[0.1, 0.5, 0.5, 0.2]), 1);
        assert_eq!(select_elite(&[0.3, 0.3, 0.3]), 0);
        assert_eq!(select_elite(&[0.1, 0.2, 0.9]), 2);
        assert_eq!(select_elite(&[]), 0);
    }

    #[test]
    fn test_forced_swap() {
        let tour = Tour::new(vec![0, 1, 2, 3]);
        assert_eq!(tour.swapped(1, 3).genes(), &[0, 3, 2, 1]);
    }

    #[test]
    fn test_swap_mutation_changes_exactly_two_positions() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let parent = Tour::identity(12);

        for _ in 0..200 {
            let child = swap_mutation(&parent, &mut rng);
            assert!(child.is_permutation_of(12));
            assert_eq!(parent.differing_positions(&child).len(), 2);
        }
    }

    #[test]
    fn test_swap_positions_are_distinct_for_two_genes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let (i, j) = draw_swap_positions(2, &mut rng);
            assert_ne!(i, j);
            assert!(i < 2 && j < 2);
        }
    }
}
