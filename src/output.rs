//! Run artifacts on disk: the run directory and the best-tour file.

use crate::error::{Error, Result};
use crate::tour::Tour;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Upper bound on `" (k)"` suffixes tried before giving up
pub const MAX_DIR_ATTEMPTS: usize = 10_000;

/// Create a fresh directory named `base` inside `parent`.
///
/// If `base` is taken, `"base (1)"`, `"base (2)"`, ... are tried in order
/// and the first free name is created and returned.
pub fn create_unique_dir(parent: &Path, base: &str) -> Result<PathBuf> {
    for attempt in 0..MAX_DIR_ATTEMPTS {
        let name = if attempt == 0 {
            base.to_string()
        } else {
            format!("{} ({})", base, attempt)
        };
        let candidate = parent.join(&name);

        if candidate.exists() {
            continue;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => {
                log::debug!("output: created run directory {}", candidate.display());
                return Ok(candidate);
            }
            // Lost a race with another process; try the next suffix
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::OutputDirExhausted {
        base: base.to_string(),
        attempts: MAX_DIR_ATTEMPTS,
    })
}

/// Destination for the final elite tour
pub trait TourSink {
    fn write_tour(&mut self, tour: &Tour) -> Result<()>;
}

/// Writes the tour as a bracketed index list to a text file
#[derive(Debug, Clone)]
pub struct TextFileSink {
    pub path: PathBuf,
}

impl TextFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        TextFileSink { path: path.into() }
    }
}

impl TourSink for TextFileSink {
    fn write_tour(&mut self, tour: &Tour) -> Result<()> {
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{}", tour)?;
        log::info!("output: best tour written to {}", self.path.display());
        Ok(())
    }
}

/// Discards the tour (benchmark runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TourSink for NullSink {
    fn write_tour(&mut self, _tour: &Tour) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("ga-tsp-tests-{name}-{nanos}"))
    }

    #[test]
    fn test_unique_dir_appends_increasing_suffix() {
        let parent = unique_temp_dir("unique-dir");
        fs::create_dir_all(&parent).expect("create temp dir");

        let first = create_unique_dir(&parent, "Run").unwrap();
        let second = create_unique_dir(&parent, "Run").unwrap();
        let third = create_unique_dir(&parent, "Run").unwrap();

        assert_eq!(first, parent.join("Run"));
        assert_eq!(second, parent.join("Run (1)"));
        assert_eq!(third, parent.join("Run (2)"));
        assert!(third.is_dir());

        fs::remove_dir_all(&parent).unwrap();
    }

    #[test]
    fn test_unique_dir_fills_first_gap() {
        let parent = unique_temp_dir("unique-gap");
        fs::create_dir_all(parent.join("Run")).expect("create base");
        fs::create_dir_all(parent.join("Run (2)")).expect("create suffix 2");

        let created = create_unique_dir(&parent, "Run").unwrap();
        assert_eq!(created, parent.join("Run (1)"));

        fs::remove_dir_all(&parent).unwrap();
    }

    #[test]
    fn test_text_file_sink_writes_all_indices() {
        let dir = unique_temp_dir("sink");
        fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("best.txt");

        let mut sink = TextFileSink::new(&path);
        sink.write_tour(&Tour::new(vec![2, 0, 3, 1])).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), "[2, 0, 3, 1]");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let dir = unique_temp_dir("sink-missing");
        let mut sink = TextFileSink::new(dir.join("missing").join("best.txt"));
        assert!(sink.write_tour(&Tour::identity(3)).is_err());
    }
}
