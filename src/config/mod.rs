//! Configuration types for the normalization pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A configuration value outside its admissible range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("confidence factor '{name}' must lie in (0, 1], got {value}")]
    ConfidenceFactor { name: &'static str, value: f64 },

    #[error("'{name}' must be strictly positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

/// Where the digitized series files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one sub-folder per study
    #[serde(default = "default_data_root")]
    pub root: PathBuf,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
        }
    }
}

/// Record acceptance rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Require the Kolz / to-ISB corrections the literature calls for
    /// instead of only flagging the segment as risky
    #[serde(default)]
    pub strict_literature_rules: bool,
}

/// Euler re-extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Below this value of |cos θ2| (Tait–Bryan) or |sin θ2| (proper) the
    /// extraction is considered gimbal-locked
    #[serde(default = "default_singularity_tolerance")]
    pub singularity_tolerance: f64,

    /// Remove ±360° jumps from every output channel
    #[serde(default = "default_unwrap")]
    pub unwrap: bool,

    /// Jump size, in degrees, above which a full turn is removed
    #[serde(default = "default_unwrap_discontinuity")]
    pub unwrap_discontinuity_deg: f64,
}

fn default_singularity_tolerance() -> f64 {
    1e-6
}

fn default_unwrap() -> bool {
    true
}

fn default_unwrap_discontinuity() -> f64 {
    180.0
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            singularity_tolerance: default_singularity_tolerance(),
            unwrap: default_unwrap(),
            unwrap_discontinuity_deg: default_unwrap_discontinuity(),
        }
    }
}

/// Multipliers applied to the confidence of a record for each kind of deviation
/// from the ISB recommendations. A compliant segment always weighs 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// ISB-oriented frame whose origin is off the ISB axes (non-scapula)
    #[serde(default = "default_origin_offset")]
    pub origin_offset: f64,

    /// ISB-oriented scapula whose origin is off the ISB axes
    #[serde(default = "default_scapula_origin_offset")]
    pub scapula_origin_offset: f64,

    /// Axes permuted or flipped away from ISB, origin on an ISB axis
    #[serde(default = "default_reoriented")]
    pub reoriented: f64,

    /// Scapula neither ISB-oriented nor with an on-axis origin
    #[serde(default = "default_scapula_non_isb")]
    pub scapula_non_isb: f64,

    /// Other segment neither ISB-oriented nor with an on-axis origin
    #[serde(default = "default_non_isb")]
    pub non_isb: f64,

    /// Thorax taken as the global (laboratory) frame
    #[serde(default = "default_global_thorax")]
    pub global_thorax: f64,

    /// Euler sequence that does not match the ISB one, even after adapting it to the study frames
    #[serde(default = "default_non_isb_sequence")]
    pub non_isb_sequence: f64,
}

fn default_origin_offset() -> f64 {
    1.0
}

fn default_scapula_origin_offset() -> f64 {
    0.75
}

fn default_reoriented() -> f64 {
    0.9
}

fn default_scapula_non_isb() -> f64 {
    0.5
}

fn default_non_isb() -> f64 {
    0.75
}

fn default_global_thorax() -> f64 {
    0.9
}

fn default_non_isb_sequence() -> f64 {
    0.5
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            origin_offset: default_origin_offset(),
            scapula_origin_offset: default_scapula_origin_offset(),
            reoriented: default_reoriented(),
            scapula_non_isb: default_scapula_non_isb(),
            non_isb: default_non_isb(),
            global_thorax: default_global_thorax(),
            non_isb_sequence: default_non_isb_sequence(),
        }
    }
}

impl ConfidenceConfig {
    fn factors(&self) -> [(&'static str, f64); 7] {
        [
            ("origin_offset", self.origin_offset),
            ("scapula_origin_offset", self.scapula_origin_offset),
            ("reoriented", self.reoriented),
            ("scapula_non_isb", self.scapula_non_isb),
            ("non_isb", self.non_isb),
            ("global_thorax", self.global_thorax),
            ("non_isb_sequence", self.non_isb_sequence),
        ]
    }
}

/// Output table options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Emit ISB-normalized angles; when false the study's raw angles are written
    #[serde(default = "default_corrected")]
    pub corrected: bool,
}

fn default_corrected() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            corrected: default_corrected(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub confidence: ConfidenceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checks every numeric setting is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.confidence.factors() {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::ConfidenceFactor { name, value });
            }
        }
        if !(self.extraction.singularity_tolerance > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "singularity_tolerance",
                value: self.extraction.singularity_tolerance,
            });
        }
        if !(self.extraction.unwrap_discontinuity_deg > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "unwrap_discontinuity_deg",
                value: self.extraction.unwrap_discontinuity_deg,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.extraction.unwrap_discontinuity_deg, 180.0);
        assert!(config.extraction.unwrap);
        assert!(config.output.corrected);
        assert!(!config.validation.strict_literature_rules);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: PipelineConfig = serde_yaml::from_str(
            "validation:\n  strict_literature_rules: true\nconfidence:\n  non_isb: 0.6\n",
        )
        .unwrap();
        assert!(config.validation.strict_literature_rules);
        assert_eq!(config.confidence.non_isb, 0.6);
        assert_eq!(config.confidence.scapula_non_isb, 0.5);
        assert_eq!(config.data.root, PathBuf::from("data"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_factors() {
        let mut config = PipelineConfig::default();
        config.confidence.reoriented = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ConfidenceFactor {
                name: "reoriented",
                value: 1.5
            })
        );

        let mut config = PipelineConfig::default();
        config.extraction.singularity_tolerance = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = PipelineConfig::default();
        config.output.corrected = false;
        config.to_yaml(&path).unwrap();

        let loaded = PipelineConfig::from_yaml(&path).unwrap();
        assert!(!loaded.output.corrected);
    }
}
