//! Heuristics module for the TSP.
//!
//! This module exports the genetic operators, the seeding strategies and
//! the generational loop built on them.

pub mod construction;
pub mod genetic;
pub mod operators;

pub use construction::*;
pub use genetic::*;
pub use operators::*;
