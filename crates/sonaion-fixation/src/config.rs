use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Detection options.
///
/// Created once per run and never mutated by the detector. Field names are
/// snake_case; the aliases accept the flat legacy keys (`windowtimeInterp`,
/// `cutoffstd`, ...) so existing option files load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Horizontal screen resolution in pixels
    pub xres: f64,
    /// Vertical screen resolution in pixels
    pub yres: f64,
    /// Sentinel marking a missing horizontal position (conventionally `-xres`)
    #[serde(alias = "missingx")]
    pub missing_x: f64,
    /// Sentinel marking a missing vertical position (conventionally `-yres`)
    #[serde(alias = "missingy")]
    pub missing_y: f64,
    /// Sampling frequency in Hz
    pub freq: f64,

    // Steffen interpolation
    /// Gaps must be shorter than this (seconds) to be interpolated
    #[serde(alias = "windowtimeInterp")]
    pub windowtime_interp: f64,
    /// Valid samples required on each side of a gap
    #[serde(alias = "edgeSampInterp")]
    pub edge_samp_interp: usize,
    /// Largest displacement (pixels) across a gap that may be interpolated
    #[serde(alias = "maxdisp")]
    pub max_disp: f64,

    // Two-means clustering
    /// Clustering window length in seconds
    pub windowtime: f64,
    /// Window shift in seconds; 0 means sample by sample
    pub steptime: f64,
    /// Lloyd iteration cap per window before the window is skipped
    #[serde(alias = "maxerrors")]
    pub max_errors: usize,
    /// Decimation factors processed in addition to the full-rate trace
    pub downsamples: Vec<usize>,
    /// Smooth before decimating
    #[serde(alias = "downsampFilter")]
    pub downsamp_filter: bool,
    /// Skipped windows tolerated per run before aborting. Defaults to `max_errors`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_budget: Option<usize>,

    // Fixation determination
    /// Standard deviations above the mean weight used as the fixation cutoff
    #[serde(alias = "cutoffstd")]
    pub cutoff_std: f64,
    /// MAD multiplier for onset/offset refinement
    #[serde(alias = "onoffsetThresh")]
    pub onoffset_thresh: f64,
    /// Largest distance (pixels) between fixations that are merged
    #[serde(alias = "maxMergeDist")]
    pub max_merge_dist: f64,
    /// Largest gap (ms) between fixations that are merged
    #[serde(alias = "maxMergeTime")]
    pub max_merge_time: f64,
    /// Minimum fixation duration (ms) after merging
    #[serde(alias = "minFixDur")]
    pub min_fix_dur: f64,
}

impl Options {
    /// The customary option bundle for a screen of `xres` x `yres` pixels
    /// sampled at `freq` Hz.
    pub fn with_defaults(xres: f64, yres: f64, freq: f64) -> Self {
        Self {
            xres,
            yres,
            missing_x: -xres,
            missing_y: -yres,
            freq,
            windowtime_interp: 0.1,
            edge_samp_interp: 2,
            max_disp: xres * 0.2 * std::f64::consts::SQRT_2,
            windowtime: 0.2,
            steptime: 0.02,
            max_errors: 100,
            downsamples: vec![2, 5, 10],
            downsamp_filter: false,
            error_budget: None,
            cutoff_std: 2.0,
            onoffset_thresh: 3.0,
            max_merge_dist: 40.0,
            max_merge_time: 60.0,
            min_fix_dur: 90.0,
        }
    }

    /// Load options from a file: JSON for `.json`, TOML otherwise.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let options: Options = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let options: Options = serde_json::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Number of skipped clustering windows a run may absorb.
    pub fn error_budget(&self) -> usize {
        self.error_budget.unwrap_or(self.max_errors)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("freq", self.freq), ("xres", self.xres), ("yres", self.yres)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!("{} must be positive", name)));
            }
        }

        if !(self.windowtime.is_finite() && self.windowtime > 0.0) {
            return Err(ConfigError::Validation(
                "windowtime must be positive".to_string(),
            ));
        }
        if !(self.steptime.is_finite() && self.steptime >= 0.0) {
            return Err(ConfigError::Validation(
                "steptime must be >= 0".to_string(),
            ));
        }
        if !(self.windowtime_interp.is_finite() && self.windowtime_interp >= 0.0) {
            return Err(ConfigError::Validation(
                "windowtime_interp must be >= 0".to_string(),
            ));
        }
        if self.edge_samp_interp == 0 {
            return Err(ConfigError::Validation(
                "edge_samp_interp must be at least 1".to_string(),
            ));
        }
        if self.max_errors == 0 {
            return Err(ConfigError::Validation(
                "max_errors must be at least 1".to_string(),
            ));
        }

        for &factor in &self.downsamples {
            if factor == 0 {
                return Err(ConfigError::Validation(
                    "downsample factors must be >= 1".to_string(),
                ));
            }
            if (self.freq / factor as f64).fract() != 0.0 {
                return Err(ConfigError::Validation(format!(
                    "downsample factor {} does not divide the sampling frequency {}",
                    factor, self.freq
                )));
            }
        }
        let coarsest = self.downsamples.iter().copied().max().unwrap_or(1).max(1);
        if (self.windowtime * self.freq / coarsest as f64).round() < 2.0 {
            return Err(ConfigError::Validation(format!(
                "windowtime spans fewer than 2 samples at downsample factor {}",
                coarsest
            )));
        }

        for (name, value) in [
            ("max_disp", self.max_disp),
            ("cutoff_std", self.cutoff_std),
            ("onoffset_thresh", self.onoffset_thresh),
            ("max_merge_dist", self.max_merge_dist),
            ("max_merge_time", self.max_merge_time),
            ("min_fix_dur", self.min_fix_dur),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation(format!("{} must be >= 0", name)));
            }
        }

        Ok(())
    }

    /// Serialize to a TOML string
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
