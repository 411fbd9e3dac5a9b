//! Record-level processing: validation, correction, scoring and expansion.

pub mod batch;
pub mod confidence;
pub mod expander;
pub mod pipeline;
pub mod record;
pub mod validity;

// Re-export key types for convenience
pub use batch::{
    check_rows, normalize_dataset, normalize_rows, BatchReport, ProcessError, RecordCheck,
    Rejection, RejectionRow,
};
pub use expander::{expand, Expansion, OutputRow, Sample};
pub use pipeline::CorrectionPipeline;
pub use record::{RecordStatus, SegmentDefinition, StudyRecord};
pub use validity::{check_record, check_segment, SegmentRisk, Verdict};
