//! Module for parsing and representing the city table of a TSP run.
//!
//! A city table is an ordered list of 2D points read from a plain text file,
//! one city per line. Distances are Euclidean and precomputed once, since the
//! table never changes during a run.

use crate::error::{Error, Result};
use crate::tour::Tour;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A city position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(x: f64, y: f64) -> Self {
        City { x, y }
    }

    /// Euclidean distance to another city
    #[inline]
    pub fn distance_to(&self, other: &City) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

/// Immutable table of cities shared by every component of a run
///
/// Deserialization goes through [`CityTable::new`], so the distance matrix is
/// rebuilt and every validation applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCityTable")]
pub struct CityTable {
    /// Name of the table (file stem when loaded from disk)
    pub name: String,
    cities: Vec<City>,
    /// Precomputed dense distance matrix: `8 * N^2` bytes, about 800 MB at
    /// N = 10 000
    #[serde(skip)]
    distance_matrix: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawCityTable {
    name: String,
    cities: Vec<City>,
}

impl TryFrom<RawCityTable> for CityTable {
    type Error = Error;

    fn try_from(raw: RawCityTable) -> Result<Self> {
        CityTable::new(raw.name, raw.cities)
    }
}

impl CityTable {
    /// Build a table from a list of cities.
    ///
    /// Rejects fewer than two cities, non-finite coordinates, tables whose
    /// cities all sit on the same point (every tour would have length 0), and
    /// tables whose scale leaves tour lengths or their reciprocals outside
    /// the finite range of `f64`.
    pub fn new(name: impl Into<String>, cities: Vec<City>) -> Result<Self> {
        if cities.len() < 2 {
            return Err(Error::invalid_input(format!(
                "at least 2 cities are required, found {}",
                cities.len()
            )));
        }

        if let Some(pos) = cities.iter().position(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Error::invalid_input(format!(
                "city {} has a non-finite coordinate",
                pos
            )));
        }

        let first = cities[0];
        if cities.iter().all(|c| *c == first) {
            return Err(Error::invalid_input(
                "all cities share the same position, no tour has a positive length",
            ));
        }

        let distance_matrix = Self::compute_distance_matrix(&cities);

        // Every closed tour is at least 2 * max and at most N * max long
        let max_distance = distance_matrix
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, &d| acc.max(d));
        if !(max_distance * cities.len() as f64).is_finite() {
            return Err(Error::invalid_input(
                "coordinates too far apart, tour lengths overflow f64",
            ));
        }
        if max_distance == 0.0 || !(1.0 / (2.0 * max_distance)).is_finite() {
            return Err(Error::invalid_input(
                "coordinates too close together, tour lengths underflow f64",
            ));
        }

        Ok(CityTable {
            name: name.into(),
            cities,
            distance_matrix,
        })
    }

    /// Build a table from `(x, y)` pairs
    pub fn from_points(name: impl Into<String>, points: &[(f64, f64)]) -> Result<Self> {
        let cities = points.iter().map(|&(x, y)| City::new(x, y)).collect();
        Self::new(name, cities)
    }

    /// Parse a city table from a text file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::invalid_input(format!("cannot open {}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "cities".to_string());

        let mut cities = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if let Some(city) = Self::parse_line(&line, index + 1)? {
                cities.push(city);
            }
        }

        Self::new(name, cities)
    }

    /// Parse a city table from an in-memory string (same format as files)
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut cities = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if let Some(city) = Self::parse_line(line, index + 1)? {
                cities.push(city);
            }
        }
        Self::new(name, cities)
    }

    /// Parse one line of a coordinate file.
    ///
    /// Accepted shapes: `[x, y],`, `[x, y]`, `x, y` and `x y`.
    /// Returns `None` for blank lines.
    fn parse_line(line: &str, line_number: usize) -> Result<Option<City>> {
        let cleaned = line.replace(['[', ']'], " ");
        let cleaned = cleaned.trim().trim_end_matches(',').trim();

        if cleaned.is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = cleaned
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() != 2 {
            return Err(Error::invalid_input(format!(
                "line {}: expected 2 coordinates, found {}",
                line_number,
                parts.len()
            )));
        }

        let x: f64 = parts[0].parse().map_err(|_| {
            Error::invalid_input(format!(
                "line {}: invalid x coordinate '{}'",
                line_number, parts[0]
            ))
        })?;
        let y: f64 = parts[1].parse().map_err(|_| {
            Error::invalid_input(format!(
                "line {}: invalid y coordinate '{}'",
                line_number, parts[1]
            ))
        })?;

        Ok(Some(City::new(x, y)))
    }

    /// Compute Euclidean distance matrix
    fn compute_distance_matrix(cities: &[City]) -> Vec<Vec<f64>> {
        let n = cities.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = cities[i].distance_to(&cities[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Number of cities
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, index: usize) -> &City {
        &self.cities[index]
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// Length of the closed loop visiting `order`, including the edge back
    /// from the last city to the first
    pub fn tour_length(&self, order: &[usize]) -> f64 {
        if order.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for pair in order.windows(2) {
            length += self.distance(pair[0], pair[1]);
        }

        length += self.distance(order[order.len() - 1], order[0]);

        length
    }

    /// Coordinate bounds `(min_x, max_x, min_y, max_y)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for city in &self.cities {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        (min_x, max_x, min_y, max_y)
    }

    /// Get statistics about the table
    pub fn statistics(&self) -> TableStatistics {
        let n = self.len();

        let mut total = 0.0;
        let mut count = 0usize;
        let mut max_distance: f64 = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance(i, j);
                total += d;
                count += 1;
                max_distance = max_distance.max(d);
            }
        }
        let avg_distance = total / count as f64;

        let nearest_neighbor =
            crate::heuristics::construction::nearest_neighbor_tour(self, 0);

        TableStatistics {
            name: self.name.clone(),
            num_cities: n,
            bounds: self.bounds(),
            avg_distance,
            max_distance,
            nearest_neighbor_length: self.tour_length(nearest_neighbor.genes()),
        }
    }

    /// Check a tour against this table
    pub fn validate_tour(&self, tour: &Tour) -> Result<()> {
        tour.validate(self.len())
    }
}

/// Statistics about a city table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatistics {
    pub name: String,
    pub num_cities: usize,
    pub bounds: (f64, f64, f64, f64),
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Closed length of the greedy tour starting at city 0
    pub nearest_neighbor_length: f64,
}

impl std::fmt::Display for TableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (min_x, max_x, min_y, max_y) = self.bounds;
        writeln!(f, "City table: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.num_cities)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", min_x, max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", min_y, max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        writeln!(f, "  Nearest neighbor tour (from 0): {:.2}", self.nearest_neighbor_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> CityTable {
        CityTable::from_points("square", &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
            .unwrap()
    }

    #[test]
    fn test_distance_calculation() {
        let table = CityTable::from_points("t", &[(0.0, 0.0), (3.0, 4.0)]).unwrap();

        assert!((table.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((table.distance(1, 0) - 5.0).abs() < 1e-10);
        assert_eq!(table.distance(0, 0), 0.0);
    }

    #[test]
    fn test_closed_tour_length_includes_return_edge() {
        let table = unit_square();

        assert!((table.tour_length(&[0, 1, 2, 3]) - 4.0).abs() < 1e-12);
        let crossed = 2.0 + 2.0 * 2f64.sqrt();
        assert!((table.tour_length(&[0, 2, 1, 3]) - crossed).abs() < 1e-12);
    }

    #[test]
    fn test_two_city_tour_is_twice_the_distance() {
        let table = CityTable::from_points("pair", &[(0.0, 0.0), (3.0, 4.0)]).unwrap();
        assert!((table.tour_length(&[0, 1]) - 10.0).abs() < 1e-12);
        assert!((table.tour_length(&[1, 0]) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_bracketed_lines() {
        let text = "[0.0, 0.0],\n[ 1.5, 2.5 ],\n[3, -4]\n\n";
        let table = CityTable::parse("t", text).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(*table.city(1), City::new(1.5, 2.5));
        assert_eq!(*table.city(2), City::new(3.0, -4.0));
    }

    #[test]
    fn test_parse_plain_lines() {
        let table = CityTable::parse("t", "0 0\n1,1\n 2 , 0 \n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(*table.city(2), City::new(2.0, 0.0));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = CityTable::parse("t", "[0, 0],\n[1, x],\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = CityTable::parse("t", "[0, 0, 1],\n[1, 1]\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_rejects_degenerate_tables() {
        assert!(CityTable::from_points("empty", &[]).is_err());
        assert!(CityTable::from_points("one", &[(1.0, 1.0)]).is_err());
        assert!(CityTable::from_points("same", &[(1.0, 1.0), (1.0, 1.0)]).is_err());
        assert!(CityTable::from_points("nan", &[(0.0, 0.0), (f64::NAN, 1.0)]).is_err());
    }

    #[test]
    fn test_extreme_scales_keep_lengths_finite() {
        let huge = CityTable::from_points("huge", &[(0.0, 0.0), (1e200, 0.0), (1e200, 1e200)])
            .unwrap();
        let length = huge.tour_length(&[0, 1, 2]);
        assert!(length.is_finite() && length > 0.0);
        assert!((1.0 / length).is_finite());

        let tiny = CityTable::from_points("tiny", &[(0.0, 0.0), (1e-200, 0.0), (0.0, 1e-200)])
            .unwrap();
        let length = tiny.tour_length(&[0, 1, 2]);
        assert!(length > 0.0);
        assert!((1.0 / length).is_finite());
    }

    #[test]
    fn test_rejects_scales_outside_f64() {
        // Coordinates are finite, but the distance between them is not
        let spread = CityTable::from_points("spread", &[(-1e308, 0.0), (1e308, 0.0)]);
        assert!(matches!(spread, Err(Error::InvalidInput(_))));

        // Each edge is finite, but a closed tour sums past f64::MAX
        let wide = CityTable::from_points("wide", &[(0.0, 0.0), (1.5e308, 0.0)]);
        assert!(matches!(wide, Err(Error::InvalidInput(_))));

        // Distinct subnormal points: length > 0 but 1 / length overflows
        let close = CityTable::from_points("close", &[(0.0, 0.0), (5e-324, 0.0)]);
        assert!(matches!(close, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_deserialize_rebuilds_distances() {
        let table = CityTable::from_points("tri", &[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)]).unwrap();
        let json = serde_json::to_string(&table).unwrap();

        let back: CityTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "tri");
        assert_eq!(back.cities(), table.cities());
        assert!((back.tour_length(&[0, 1, 2]) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize_validates_cities() {
        let json = r#"{"name":"same","cities":[{"x":1.0,"y":1.0},{"x":1.0,"y":1.0}]}"#;
        assert!(serde_json::from_str::<CityTable>(json).is_err());

        let json = r#"{"name":"one","cities":[{"x":1.0,"y":1.0}]}"#;
        assert!(serde_json::from_str::<CityTable>(json).is_err());
    }

    #[test]
    fn test_bounds_and_statistics() {
        let table = unit_square();
        assert_eq!(table.bounds(), (0.0, 1.0, 0.0, 1.0));

        let stats = table.statistics();
        assert_eq!(stats.num_cities, 4);
        assert!((stats.max_distance - 2f64.sqrt()).abs() < 1e-12);
        assert!((stats.nearest_neighbor_length - 4.0).abs() < 1e-12);
    }
}
