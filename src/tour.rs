//! Tour representation for the TSP.
//!
//! A tour is a permutation of city indices `0..n`. It is read as a closed
//! loop: after the last city the salesman returns to the first one.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A candidate solution: the order in which cities are visited
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Wrap a gene sequence without checking it.
    ///
    /// Callers that build tours by construction (seeding, swapping) use this;
    /// everything read from outside goes through [`Tour::from_genes`].
    pub fn new(genes: Vec<usize>) -> Self {
        Tour(genes)
    }

    /// Build a tour and check it is a permutation of `0..n`
    pub fn from_genes(genes: Vec<usize>, n: usize) -> Result<Self> {
        let tour = Tour(genes);
        tour.validate(n)?;
        Ok(tour)
    }

    /// The tour `0, 1, ..., n-1`
    pub fn identity(n: usize) -> Self {
        Tour((0..n).collect())
    }

    pub fn genes(&self) -> &[usize] {
        &self.0
    }

    pub fn into_genes(self) -> Vec<usize> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First city of the tour
    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Last city before the loop closes
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Check the permutation invariant against a table of `n` cities
    pub fn validate(&self, n: usize) -> Result<()> {
        if self.0.len() != n {
            return Err(Error::invalid_tour(
                n,
                format!("expected {} genes, found {}", n, self.0.len()),
            ));
        }

        let mut seen = vec![false; n];
        for (pos, &city) in self.0.iter().enumerate() {
            if city >= n {
                return Err(Error::invalid_tour(
                    n,
                    format!("gene {} at position {} is out of range", city, pos),
                ));
            }
            if seen[city] {
                return Err(Error::invalid_tour(
                    n,
                    format!("gene {} repeated at position {}", city, pos),
                ));
            }
            seen[city] = true;
        }

        Ok(())
    }

    pub fn is_permutation_of(&self, n: usize) -> bool {
        self.validate(n).is_ok()
    }

    /// Copy of this tour with positions `i` and `j` exchanged
    pub fn swapped(&self, i: usize, j: usize) -> Tour {
        let mut genes = self.0.clone();
        genes.swap(i, j);
        Tour(genes)
    }

    /// Exchange positions `i` and `j` in place
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Positions at which two tours of equal length disagree
    pub fn differing_positions(&self, other: &Tour) -> Vec<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(pos, _)| pos)
            .collect()
    }
}

impl AsRef<[usize]> for Tour {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Tour> for Vec<usize> {
    fn from(tour: Tour) -> Self {
        tour.0
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let genes: Vec<String> = self.0.iter().map(|g| g.to_string()).collect();
        write!(f, "[{}]", genes.join(", "))
    }
}
