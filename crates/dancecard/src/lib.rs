//! Dance card tooling around the assignment engine.
//!
//! This crate owns everything the engine deliberately leaves out:
//! - Problem files and the checks the engine relies on
//! - Seeded synthetic problems for trials and benchmarks
//! - CSV export for printing cards
//! - Coverage reports and run records

pub mod export;
pub mod generator;
pub mod problem;
pub mod report;

pub use export::{ExportOptions, export_csv, time_slots_of, write_csv};
pub use generator::{ProblemGenerator, ProblemGeneratorConfig};
pub use problem::{Problem, normalize_time};
pub use report::{CoverageReport, RunRecord};
