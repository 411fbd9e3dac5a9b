//! Normalization of multi-study shoulder kinematics into the ISB convention.
//!
//! This crate provides tools for:
//! - Parsing study records that describe segment frames, Euler sequences and corrections
//! - Deciding whether a record's rotation data can be trusted
//! - Re-expressing every study's joint angles in the ISB frames and sequences
//! - Scoring each output sample with a confidence derived from the deviations found
//!
//! # Example
//!
//! ```no_run
//! use shoulder_kinematics::{core::loaders::load_dataset_csv, processors::normalize_rows, PipelineConfig};
//!
//! let rows = load_dataset_csv("dataset.csv").unwrap();
//! let report = normalize_rows(&rows, &PipelineConfig::default());
//! for row in report.rows() {
//!     println!("{} {} {:.1}", row.joint, row.biomechanical_dof, row.value);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{
    ConfidenceConfig, DataConfig, ExtractionConfig, OutputConfig, PipelineConfig,
    ValidationConfig,
};
pub use crate::core::error::RecordError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
