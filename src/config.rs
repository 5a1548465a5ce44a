//! Run configuration loaded from JSON.

use crate::error::{Error, Result};
use crate::heuristics::construction::SeedingKind;
use crate::heuristics::genetic::GAConfig;
use crate::visualization::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a `solve` run needs; missing JSON fields take the defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Coordinate file
    pub cities: Option<PathBuf>,
    /// Base name of the run directory
    pub output_dir: String,
    /// File name of the best tour, inside the run directory
    pub best_tour_file: String,
    pub render: bool,
    pub image_format: ImageFormat,
    pub population_size: usize,
    pub generations: usize,
    pub seed: u64,
    pub seeding: SeedingKind,
    pub validate: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let ga = GAConfig::default();
        RunConfig {
            cities: None,
            output_dir: "Routes".to_string(),
            best_tour_file: "shortest_route.txt".to_string(),
            render: true,
            image_format: ImageFormat::Svg,
            population_size: ga.population_size,
            generations: ga.generations,
            seed: ga.seed,
            seeding: ga.seeding,
            validate: ga.validate,
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: RunConfig = serde_json::from_str(&text)?;
        log::debug!("config: loaded {}", path.as_ref().display());
        Ok(config)
    }

    /// Engine parameters of this run
    pub fn ga_config(&self) -> Result<GAConfig> {
        if self.population_size == 0 {
            return Err(Error::invalid_config("population_size must be at least 1"));
        }
        if self.output_dir.trim().is_empty() {
            return Err(Error::invalid_config("output_dir must not be empty"));
        }
        if self.best_tour_file.trim().is_empty() {
            return Err(Error::invalid_config("best_tour_file must not be empty"));
        }

        Ok(GAConfig {
            population_size: self.population_size,
            generations: self.generations,
            seed: self.seed,
            seeding: self.seeding,
            validate: self.validate,
        })
    }

    pub fn cities_path(&self) -> Result<&Path> {
        self.cities.as_deref().ok_or_else(|| {
            Error::invalid_config("no coordinate file given (--cities or \"cities\")")
        })
    }
}
