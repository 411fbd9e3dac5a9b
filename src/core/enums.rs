//! Closed vocabularies of the dataset table.
//!
//! Every parser here is the single place where a free-text cell becomes a typed
//! value; anything outside the vocabulary is an `UnknownEnumerationValue`.

use std::fmt;

use nalgebra::Vector3;

use super::error::{RecordError, Result};

/// Uppercase alphanumeric form of a label, so "midpoint IJ-C7" and "MIDPOINT_IJ_C7" agree.
fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Anatomical segment of the shoulder girdle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Thorax,
    Clavicle,
    Scapula,
    Humerus,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Thorax,
        Segment::Clavicle,
        Segment::Scapula,
        Segment::Humerus,
    ];

    pub fn parse(value: &str) -> Result<Self> {
        match normalize_label(value).as_str() {
            "THORAX" => Ok(Segment::Thorax),
            "CLAVICLE" => Ok(Segment::Clavicle),
            "SCAPULA" => Ok(Segment::Scapula),
            "HUMERUS" => Ok(Segment::Humerus),
            _ => Err(RecordError::unknown("segment", value)),
        }
    }

    /// Column prefix used by the dataset table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Thorax => "thorax",
            Segment::Clavicle => "clavicle",
            Segment::Scapula => "scapula",
            Segment::Humerus => "humerus",
        }
    }

    /// Landmarks that may serve as this segment's origin.
    pub fn admissible_origins(&self) -> &'static [Origin] {
        match self {
            Segment::Thorax => &[
                Origin::Ij,
                Origin::Px,
                Origin::C7,
                Origin::T8,
                Origin::T1,
                Origin::MidpointIjC7,
                Origin::MidpointPxT8,
            ],
            Segment::Clavicle => &[Origin::Sc, Origin::Ac, Origin::MidpointScAc],
            Segment::Scapula => &[Origin::Aa, Origin::Ts, Origin::Ac, Origin::Gc, Origin::Ia],
            Segment::Humerus => &[
                Origin::Gh,
                Origin::MidpointEpicondyles,
                Origin::El,
                Origin::Em,
            ],
        }
    }

    /// Landmarks lying on one of the ISB axes of this segment.
    pub fn isb_axis_origins(&self) -> &'static [Origin] {
        match self {
            Segment::Thorax => &[Origin::Ij, Origin::MidpointIjC7, Origin::MidpointPxT8],
            Segment::Clavicle => &[Origin::Sc, Origin::Ac],
            Segment::Scapula => &[Origin::Aa, Origin::Ts],
            Segment::Humerus => &[Origin::Gh, Origin::MidpointEpicondyles],
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shoulder joints described by the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    Glenohumeral,
    Scapulothoracic,
    Acromioclavicular,
    Sternoclavicular,
    Thoracohumeral,
}

impl JointType {
    pub fn parse(value: &str) -> Result<Self> {
        match normalize_label(value).as_str() {
            "GLENOHUMERAL" | "GH" => Ok(JointType::Glenohumeral),
            "SCAPULOTHORACIC" | "ST" => Ok(JointType::Scapulothoracic),
            "ACROMIOCLAVICULAR" | "AC" => Ok(JointType::Acromioclavicular),
            "STERNOCLAVICULAR" | "SC" => Ok(JointType::Sternoclavicular),
            "THORACOHUMERAL" | "HUMEROTHORACIC" | "HT" => Ok(JointType::Thoracohumeral),
            _ => Err(RecordError::unknown("joint", value)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JointType::Glenohumeral => "glenohumeral",
            JointType::Scapulothoracic => "scapulothoracic",
            JointType::Acromioclavicular => "acromioclavicular",
            JointType::Sternoclavicular => "sternoclavicular",
            JointType::Thoracohumeral => "thoracohumeral",
        }
    }

    /// Proximal segment of the joint.
    pub fn parent(&self) -> Segment {
        match self {
            JointType::Glenohumeral => Segment::Scapula,
            JointType::Scapulothoracic => Segment::Thorax,
            JointType::Acromioclavicular => Segment::Clavicle,
            JointType::Sternoclavicular => Segment::Thorax,
            JointType::Thoracohumeral => Segment::Thorax,
        }
    }

    /// Distal segment of the joint.
    pub fn child(&self) -> Segment {
        match self {
            JointType::Glenohumeral => Segment::Humerus,
            JointType::Scapulothoracic => Segment::Scapula,
            JointType::Acromioclavicular => Segment::Scapula,
            JointType::Sternoclavicular => Segment::Clavicle,
            JointType::Thoracohumeral => Segment::Humerus,
        }
    }

    /// Euler sequence recommended by the ISB for this joint.
    pub fn isb_sequence(&self) -> EulerSequence {
        match self {
            JointType::Glenohumeral | JointType::Thoracohumeral => EulerSequence::Yxy,
            JointType::Scapulothoracic
            | JointType::Acromioclavicular
            | JointType::Sternoclavicular => EulerSequence::Yxz,
        }
    }

    /// Clinical names of the three ISB rotation channels.
    pub fn isb_dof_labels(&self) -> [&'static str; 3] {
        match self {
            JointType::Glenohumeral | JointType::Thoracohumeral => {
                ["plane_of_elevation", "elevation", "axial_rotation"]
            }
            JointType::Scapulothoracic | JointType::Acromioclavicular => [
                "protraction_retraction",
                "lateral_medial_rotation",
                "posterior_anterior_tilt",
            ],
            JointType::Sternoclavicular => [
                "protraction_retraction",
                "elevation_depression",
                "axial_rotation",
            ],
        }
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate axis of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub(crate) fn from_index(idx: usize) -> Axis {
        match idx {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c {
            'x' | 'X' => Some(Axis::X),
            'y' | 'Y' => Some(Axis::Y),
            'z' | 'Z' => Some(Axis::Z),
            _ => None,
        }
    }
}

/// The twelve valid Euler sequences (intrinsic rotations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EulerSequence {
    Xyx,
    Xzx,
    Yxy,
    Yzy,
    Zxz,
    Zyz,
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl EulerSequence {
    pub fn parse(value: &str) -> Result<Self> {
        let letters: Vec<Axis> = value.trim().chars().filter_map(Axis::from_letter).collect();
        if letters.len() != 3 || value.trim().chars().count() != 3 {
            return Err(RecordError::unknown("euler sequence", value));
        }
        Self::from_axes([letters[0], letters[1], letters[2]])
            .ok_or_else(|| RecordError::unknown("euler sequence", value))
    }

    /// Builds a sequence from its axes; `None` when two consecutive axes repeat.
    pub fn from_axes(axes: [Axis; 3]) -> Option<Self> {
        use Axis::{X, Y, Z};
        let seq = match axes {
            [X, Y, X] => EulerSequence::Xyx,
            [X, Z, X] => EulerSequence::Xzx,
            [Y, X, Y] => EulerSequence::Yxy,
            [Y, Z, Y] => EulerSequence::Yzy,
            [Z, X, Z] => EulerSequence::Zxz,
            [Z, Y, Z] => EulerSequence::Zyz,
            [X, Y, Z] => EulerSequence::Xyz,
            [X, Z, Y] => EulerSequence::Xzy,
            [Y, X, Z] => EulerSequence::Yxz,
            [Y, Z, X] => EulerSequence::Yzx,
            [Z, X, Y] => EulerSequence::Zxy,
            [Z, Y, X] => EulerSequence::Zyx,
            _ => return None,
        };
        Some(seq)
    }

    pub fn axes(&self) -> [Axis; 3] {
        use Axis::{X, Y, Z};
        match self {
            EulerSequence::Xyx => [X, Y, X],
            EulerSequence::Xzx => [X, Z, X],
            EulerSequence::Yxy => [Y, X, Y],
            EulerSequence::Yzy => [Y, Z, Y],
            EulerSequence::Zxz => [Z, X, Z],
            EulerSequence::Zyz => [Z, Y, Z],
            EulerSequence::Xyz => [X, Y, Z],
            EulerSequence::Xzy => [X, Z, Y],
            EulerSequence::Yxz => [Y, X, Z],
            EulerSequence::Yzx => [Y, Z, X],
            EulerSequence::Zxy => [Z, X, Y],
            EulerSequence::Zyx => [Z, Y, X],
        }
    }

    /// True for sequences whose first and last axes coincide (e.g. `yxy`).
    pub fn is_proper(&self) -> bool {
        let [a, _, c] = self.axes();
        a == c
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EulerSequence::Xyx => "xyx",
            EulerSequence::Xzx => "xzx",
            EulerSequence::Yxy => "yxy",
            EulerSequence::Yzy => "yzy",
            EulerSequence::Zxz => "zxz",
            EulerSequence::Zyz => "zyz",
            EulerSequence::Xyz => "xyz",
            EulerSequence::Xzy => "xzy",
            EulerSequence::Yxz => "yxz",
            EulerSequence::Yzx => "yzx",
            EulerSequence::Zxy => "zxy",
            EulerSequence::Zyx => "zyx",
        }
    }
}

impl fmt::Display for EulerSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anatomical direction an axis can point to.
///
/// The ISB canonical basis is X = +PA (anterior), Y = +IS (superior),
/// Z = +ML (lateral).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PlusPosteroAnterior,
    MinusPosteroAnterior,
    PlusInferoSuperior,
    MinusInferoSuperior,
    PlusMedioLateral,
    MinusMedioLateral,
}

impl Direction {
    pub fn parse(value: &str) -> Result<Self> {
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let (negated, body) = match compact.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, compact.strip_prefix('+').unwrap_or(&compact)),
        };
        let base = match body {
            "PA" => Direction::PlusPosteroAnterior,
            "AP" => Direction::MinusPosteroAnterior,
            "IS" => Direction::PlusInferoSuperior,
            "SI" => Direction::MinusInferoSuperior,
            "ML" => Direction::PlusMedioLateral,
            "LM" => Direction::MinusMedioLateral,
            _ => return Err(RecordError::unknown("axis direction", value)),
        };
        Ok(if negated { base.opposite() } else { base })
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::PlusPosteroAnterior => Direction::MinusPosteroAnterior,
            Direction::MinusPosteroAnterior => Direction::PlusPosteroAnterior,
            Direction::PlusInferoSuperior => Direction::MinusInferoSuperior,
            Direction::MinusInferoSuperior => Direction::PlusInferoSuperior,
            Direction::PlusMedioLateral => Direction::MinusMedioLateral,
            Direction::MinusMedioLateral => Direction::PlusMedioLateral,
        }
    }

    /// The ISB axis this direction is collinear with.
    pub fn isb_axis(&self) -> Axis {
        match self {
            Direction::PlusPosteroAnterior | Direction::MinusPosteroAnterior => Axis::X,
            Direction::PlusInferoSuperior | Direction::MinusInferoSuperior => Axis::Y,
            Direction::PlusMedioLateral | Direction::MinusMedioLateral => Axis::Z,
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            Direction::PlusPosteroAnterior
                | Direction::PlusInferoSuperior
                | Direction::PlusMedioLateral
        )
    }

    /// Unit vector of this direction expressed in the ISB basis.
    pub fn unit_vector(&self) -> Vector3<f64> {
        let v = self.isb_axis().unit();
        if self.is_positive() {
            v
        } else {
            -v
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::PlusPosteroAnterior => "+PA",
            Direction::MinusPosteroAnterior => "-PA",
            Direction::PlusInferoSuperior => "+IS",
            Direction::MinusInferoSuperior => "-IS",
            Direction::PlusMedioLateral => "+ML",
            Direction::MinusMedioLateral => "-ML",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bony landmark used as a frame origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Incisura jugularis (sternal notch).
    Ij,
    /// Processus xiphoideus.
    Px,
    C7,
    T8,
    T1,
    MidpointIjC7,
    MidpointPxT8,
    /// Sternoclavicular joint.
    Sc,
    /// Acromioclavicular joint.
    Ac,
    MidpointScAc,
    /// Angulus acromialis.
    Aa,
    /// Trigonum spinae.
    Ts,
    /// Glenoid center.
    Gc,
    /// Angulus inferior.
    Ia,
    /// Glenohumeral rotation center.
    Gh,
    MidpointEpicondyles,
    El,
    Em,
}

impl Origin {
    /// Parses any landmark label, whatever segment it belongs to.
    pub fn parse_any(value: &str) -> Result<Self> {
        let origin = match normalize_label(value).as_str() {
            "IJ" => Origin::Ij,
            "PX" => Origin::Px,
            "C7" => Origin::C7,
            "T8" => Origin::T8,
            "T1" => Origin::T1,
            "MIDPOINTIJC7" | "MIDIJC7" => Origin::MidpointIjC7,
            "MIDPOINTPXT8" | "MIDPXT8" => Origin::MidpointPxT8,
            "SC" => Origin::Sc,
            "AC" => Origin::Ac,
            "MIDPOINTSCAC" | "MIDSCAC" => Origin::MidpointScAc,
            "AA" => Origin::Aa,
            "TS" => Origin::Ts,
            "GC" => Origin::Gc,
            "IA" | "AI" => Origin::Ia,
            "GH" => Origin::Gh,
            "MIDPOINTEPICONDYLES" | "MIDPOINTEMEL" | "MIDEMEL" => Origin::MidpointEpicondyles,
            "EL" => Origin::El,
            "EM" => Origin::Em,
            _ => return Err(RecordError::unknown("origin", value)),
        };
        Ok(origin)
    }

    /// Parses an origin label and checks it is admissible for `segment`.
    pub fn parse(segment: Segment, value: &str) -> Result<Self> {
        let origin = Origin::parse_any(value)?;
        if !segment.admissible_origins().contains(&origin) {
            return Err(RecordError::unknown("origin", value));
        }
        Ok(origin)
    }
}

/// Named fixed-matrix correction declared for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correction {
    ToIsbRotation,
    ToIsbLikeRotation,
    ScapulaKolzAcToPaRotation,
    ScapulaKolzGlenoidToPaRotation,
}

impl Correction {
    pub fn parse(value: &str) -> Result<Self> {
        match normalize_label(value).as_str() {
            "TOISB" => Ok(Correction::ToIsbRotation),
            "TOISBLIKE" => Ok(Correction::ToIsbLikeRotation),
            "KOLZACTOPA" => Ok(Correction::ScapulaKolzAcToPaRotation),
            "KOLZGCTOPA" | "KOLZGLENOIDTOPA" => Ok(Correction::ScapulaKolzGlenoidToPaRotation),
            _ => Err(RecordError::unknown("correction", value)),
        }
    }

    /// Parses a comma-separated correction cell; a missing cell is no correction.
    pub fn parse_list(cell: Option<&str>) -> Result<Vec<Self>> {
        match cell {
            None => Ok(Vec::new()),
            Some(cell) => cell
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Correction::parse)
                .collect(),
        }
    }

    /// Kolz corrections only make sense on the scapula.
    pub fn is_kolz(&self) -> bool {
        matches!(
            self,
            Correction::ScapulaKolzAcToPaRotation | Correction::ScapulaKolzGlenoidToPaRotation
        )
    }

    pub fn is_to_isb(&self) -> bool {
        matches!(self, Correction::ToIsbRotation | Correction::ToIsbLikeRotation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Correction::ToIsbRotation => "to_isb",
            Correction::ToIsbLikeRotation => "to_isb_like",
            Correction::ScapulaKolzAcToPaRotation => "kolz_AC_to_PA",
            Correction::ScapulaKolzGlenoidToPaRotation => "kolz_GC_to_PA",
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body side the recording was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Right,
    Left,
}

impl Side {
    /// Missing side defaults to right, the side ISB conventions are written for.
    pub fn parse(cell: Option<&str>) -> Result<Self> {
        match cell.map(normalize_label).as_deref() {
            None => Ok(Side::Right),
            Some("RIGHT") | Some("R") => Ok(Side::Right),
            Some("LEFT") | Some("L") => Ok(Side::Left),
            Some(_) => Err(RecordError::unknown("side", cell.unwrap_or_default())),
        }
    }
}

/// Boolean-like metadata cell: `true`, `false`, or not filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    True,
    False,
    #[default]
    Unknown,
}

impl TriState {
    pub fn parse(cell: Option<&str>) -> Result<Self> {
        let Some(raw) = cell else {
            return Ok(TriState::Unknown);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "nan" | "none" | "null" => Ok(TriState::Unknown),
            "true" | "1" | "1.0" | "yes" => Ok(TriState::True),
            "false" | "0" | "0.0" | "no" => Ok(TriState::False),
            _ => Err(RecordError::unknown("boolean", raw)),
        }
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        matches!(self, TriState::True)
    }
}
