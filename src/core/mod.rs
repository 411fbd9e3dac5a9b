//! Core data types, rotation math and I/O operations.

pub mod corrections;
pub mod enums;
pub mod error;
pub mod frame;
pub mod joint;
pub mod loaders;
pub mod series;
pub mod transforms;
pub mod writers;

pub use enums::{
    Axis, Correction, Direction, EulerSequence, JointType, Origin, Segment, Side, TriState,
};
pub use error::RecordError;
pub use frame::AnatomicalFrame;
pub use joint::{JointDescriptor, TranslationReference};
pub use loaders::{LoaderError, RawRow};
pub use series::{AngleSeries, Series};
pub use writers::{write_csv, WriteError};
