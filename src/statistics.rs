//! Per-generation run statistics.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Best and mean tour length observed in one generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Length of the elite tour
    pub best_length: f64,
    /// Reciprocal of the mean fitness of the population
    pub mean_length: f64,
}

/// Append-only history of a run, one record per generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    records: Vec<GenerationRecord>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(generations: usize) -> Self {
        RunStatistics {
            records: Vec::with_capacity(generations),
        }
    }

    pub fn record(&mut self, best_length: f64, mean_length: f64) {
        let generation = self.records.len();
        self.records.push(GenerationRecord {
            generation,
            best_length,
            mean_length,
        });
    }

    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn best_lengths(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.best_length).collect()
    }

    pub fn mean_lengths(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean_length).collect()
    }

    /// Elite length of the last recorded generation
    pub fn final_best_length(&self) -> Option<f64> {
        self.records.last().map(|r| r.best_length)
    }

    /// Export to CSV (`generation,best_length,mean_length`)
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
