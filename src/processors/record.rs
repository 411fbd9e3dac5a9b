//! One study record: the typed form of a dataset row and its lifecycle.
//!
//! A record is `Parsed` once every cell it uses has been read, `Validated`
//! after the acceptance rules ran, `Ready` once its correction pipeline and
//! confidence are bound, and `Expanded` after its output rows were produced.
//! Any step can move it to `Rejected` instead.

use crate::core::enums::{
    Correction, EulerSequence, JointType, Origin, Segment, Side, TriState,
};
use crate::core::error::{RecordError, Result};
use crate::core::frame::AnatomicalFrame;
use crate::core::joint::{JointDescriptor, TranslationReference};
use crate::core::loaders::RawRow;

use super::validity::Verdict;

/// A segment as declared in one row.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDefinition {
    pub frame: AnatomicalFrame,
    /// Declared corrections, in the order they apply.
    pub corrections: Vec<Correction>,
    pub is_correctable: TriState,
    /// The row's own claim that this frame follows the ISB.
    pub declared_isb: TriState,
}

impl SegmentDefinition {
    /// Reads the `<segment>_*` columns.
    ///
    /// Returns `Ok(None)` when none of the axis and origin cells are filled.
    ///
    /// # Errors
    ///
    /// `InvalidFrame` when only some of them are filled, or when the labels do
    /// not build a direct frame.
    pub fn from_row(row: &RawRow, segment: Segment) -> Result<Option<Self>> {
        let prefix = segment.as_str();
        let cells = [
            row.get(&format!("{prefix}_x")),
            row.get(&format!("{prefix}_y")),
            row.get(&format!("{prefix}_z")),
            row.get(&format!("{prefix}_origin")),
        ];

        let [Some(x), Some(y), Some(z), Some(origin)] = cells else {
            if cells.iter().all(Option::is_none) {
                return Ok(None);
            }
            return Err(RecordError::InvalidFrame {
                segment,
                reason: "axes and origin are only partially provided".to_string(),
            });
        };

        Ok(Some(Self {
            frame: AnatomicalFrame::from_labels(segment, x, y, z, origin)?,
            corrections: Correction::parse_list(
                row.get(&format!("{prefix}_correction_method")),
            )?,
            is_correctable: TriState::parse(row.get(&format!("{prefix}_is_correctable")))?,
            declared_isb: TriState::parse(row.get(&format!("{prefix}_is_isb")))?,
        }))
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        self.frame.segment()
    }
}

/// Where a record stands in the normalization flow.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    Parsed,
    Validated(Verdict),
    Ready { confidence: f64 },
    Expanded { rows: usize },
    Rejected(String),
}

/// A dataset row with every field typed.
#[derive(Debug, Clone)]
pub struct StudyRecord {
    pub index: usize,
    pub article: String,
    pub joint: JointDescriptor,
    /// Parent and child as written in the row.
    pub parent: Segment,
    pub child: Segment,
    segments: [Option<SegmentDefinition>; 4],
    pub thorax_is_global: TriState,
    pub side: Side,
    pub humeral_motion: Option<String>,
    pub shoulder_id: Option<String>,
    pub in_vivo: TriState,
    pub experimental_mean: Option<String>,
    pub folder: Option<String>,
    pub dof_files: [Option<String>; 3],
    pub translation_files: [Option<String>; 3],
    status: RecordStatus,
}

fn owned(cell: Option<&str>) -> Option<String> {
    cell.map(str::to_string)
}

fn required<'a>(row: &'a RawRow, column: &'static str) -> Result<&'a str> {
    row.get(column)
        .ok_or_else(|| RecordError::unknown(column, ""))
}

/// Article label of a row, falling back to the dataset authors, then the row number.
pub(crate) fn article_of(index: usize, row: &RawRow) -> String {
    row.get("article_author_year")
        .or_else(|| row.get("dataset_authors"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("row {index}"))
}

fn segment_slot(segment: Segment) -> usize {
    match segment {
        Segment::Thorax => 0,
        Segment::Clavicle => 1,
        Segment::Scapula => 2,
        Segment::Humerus => 3,
    }
}

impl StudyRecord {
    /// Parses a dataset row.
    ///
    /// # Errors
    ///
    /// Any vocabulary violation, a broken frame, or a joint with neither an
    /// Euler sequence nor a translation reference.
    pub fn from_row(index: usize, row: &RawRow) -> Result<Self> {
        let article = article_of(index, row);

        let joint_type = JointType::parse(required(row, "joint")?)?;
        let euler_sequence = row
            .get("euler_sequence")
            .map(EulerSequence::parse)
            .transpose()?;
        let translation = match (row.get("origin_displacement"), row.get("displacement_cs")) {
            (Some(origin), Some(frame)) => {
                // The displaced landmark usually sits on the child, not on the frame segment.
                Some(TranslationReference {
                    origin: Origin::parse_any(origin)?,
                    frame: Segment::parse(frame)?,
                })
            }
            _ => None,
        };
        let joint = JointDescriptor::new(joint_type, euler_sequence, translation)?;

        let parent = Segment::parse(required(row, "parent")?)?;
        let child = Segment::parse(required(row, "child")?)?;

        let mut segments: [Option<SegmentDefinition>; 4] = Default::default();
        for segment in Segment::ALL {
            segments[segment_slot(segment)] = SegmentDefinition::from_row(row, segment)?;
        }

        Ok(Self {
            index,
            article,
            joint,
            parent,
            child,
            segments,
            thorax_is_global: TriState::parse(row.get("thorax_is_global"))?,
            side: Side::parse(row.get("side"))?,
            humeral_motion: owned(row.get("humeral_motion")),
            shoulder_id: owned(row.get("shoulder_id")),
            in_vivo: TriState::parse(row.get("in_vivo"))?,
            experimental_mean: owned(row.get("experimental_mean")),
            folder: owned(row.get("folder")),
            dof_files: [
                owned(row.get("dof_1st_euler")),
                owned(row.get("dof_2nd_euler")),
                owned(row.get("dof_3rd_euler")),
            ],
            translation_files: [
                owned(row.get("dof_translation_x")),
                owned(row.get("dof_translation_y")),
                owned(row.get("dof_translation_z")),
            ],
            status: RecordStatus::Parsed,
        })
    }

    /// Definition of `segment`, if the row provides one.
    pub fn segment(&self, segment: Segment) -> Option<&SegmentDefinition> {
        self.segments[segment_slot(segment)].as_ref()
    }

    pub fn parent_definition(&self) -> Option<&SegmentDefinition> {
        self.segment(self.parent)
    }

    pub fn child_definition(&self) -> Option<&SegmentDefinition> {
        self.segment(self.child)
    }

    #[inline]
    pub fn status(&self) -> &RecordStatus {
        &self.status
    }

    pub fn mark_validated(&mut self, verdict: Verdict) {
        debug_assert!(matches!(self.status, RecordStatus::Parsed));
        self.status = RecordStatus::Validated(verdict);
    }

    pub fn mark_ready(&mut self, confidence: f64) {
        debug_assert!(matches!(self.status, RecordStatus::Validated(_)));
        self.status = RecordStatus::Ready { confidence };
    }

    pub fn mark_expanded(&mut self, rows: usize) {
        debug_assert!(matches!(self.status, RecordStatus::Ready { .. }));
        self.status = RecordStatus::Expanded { rows };
    }

    pub fn reject(&mut self, reason: impl ToString) {
        self.status = RecordStatus::Rejected(reason.to_string());
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::core::loaders::RawRow;

    /// A clean ISB scapulothoracic row; tests override cells as needed.
    pub fn isb_scapulothoracic_row() -> RawRow {
        RawRow::from_pairs([
            ("article_author_year", "Doe et al. 2020"),
            ("joint", "scapulothoracic"),
            ("euler_sequence", "yxz"),
            ("parent", "thorax"),
            ("child", "scapula"),
            ("side", "right"),
            ("humeral_motion", "frontal elevation"),
            ("shoulder_id", "3"),
            ("in_vivo", "true"),
            ("experimental_mean", "mean"),
            ("folder", "doe"),
            ("dof_1st_euler", "st_1.csv"),
            ("dof_2nd_euler", "st_2.csv"),
            ("dof_3rd_euler", "st_3.csv"),
            ("thorax_x", "+PA"),
            ("thorax_y", "+IS"),
            ("thorax_z", "+ML"),
            ("thorax_origin", "IJ"),
            ("thorax_is_isb", "true"),
            ("scapula_x", "+PA"),
            ("scapula_y", "+IS"),
            ("scapula_z", "+ML"),
            ("scapula_origin", "AA"),
            ("scapula_is_isb", "true"),
        ])
    }
}
