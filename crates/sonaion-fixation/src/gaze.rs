//! Gaze input and the working trace
//!
//! `GazeTable` is the tabular boundary: one time column plus optional
//! left/right/average eye columns, with missing data encoded by the legacy
//! sentinel values. Past this boundary the sentinel is gone; every stage
//! works on a [`Trace`] whose validity is an explicit mask and whose
//! invalid positions are NaN, so a forgotten mask check cannot quietly
//! treat `-xres` as a real gaze position.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use sonaion_signals::median;

use crate::config::Options;
use crate::error::FixationError;

/// One row of gaze data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeSample {
    /// Timestamp in ms
    pub time: f64,
    pub left: Option<(f64, f64)>,
    pub right: Option<(f64, f64)>,
    pub average: Option<(f64, f64)>,
}

/// x/y columns of one eye channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EyeColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl EyeColumns {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }
}

/// Columnar gaze recording.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeTable {
    /// Sample timestamps in ms, strictly increasing
    pub time: Vec<f64>,
    pub left: Option<EyeColumns>,
    pub right: Option<EyeColumns>,
    pub average: Option<EyeColumns>,
}

impl GazeTable {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn with_left(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.left = Some(EyeColumns::new(x, y));
        self
    }

    pub fn with_right(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.right = Some(EyeColumns::new(x, y));
        self
    }

    pub fn with_average(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.average = Some(EyeColumns::new(x, y));
        self
    }

    /// Build a table from rows. A channel gets a column when at least one
    /// row provides it; rows lacking that channel are stored as NaN, which
    /// reads back as missing.
    pub fn from_samples(samples: &[GazeSample]) -> Self {
        fn column(
            samples: &[GazeSample],
            pick: impl Fn(&GazeSample) -> Option<(f64, f64)>,
        ) -> Option<EyeColumns> {
            if samples.iter().all(|s| pick(s).is_none()) {
                return None;
            }
            let (x, y) = samples
                .iter()
                .map(|s| pick(s).unwrap_or((f64::NAN, f64::NAN)))
                .unzip();
            Some(EyeColumns { x, y })
        }

        Self {
            time: samples.iter().map(|s| s.time).collect(),
            left: column(samples, |s| s.left),
            right: column(samples, |s| s.right),
            average: column(samples, |s| s.average),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn columns(&self) -> impl Iterator<Item = (&'static str, &EyeColumns)> + '_ {
        [("left", &self.left), ("right", &self.right), ("average", &self.average)]
            .into_iter()
            .filter_map(|(name, c)| c.as_ref().map(|c| (name, c)))
    }

    /// Check shape and time axis.
    pub fn validate(&self) -> Result<(), FixationError> {
        check_time_axis(&self.time)?;

        let mut any = false;
        for (name, cols) in self.columns() {
            any = true;
            if cols.x.len() != self.len() || cols.y.len() != self.len() {
                return Err(FixationError::Input(format!(
                    "{} channel has {}/{} values for {} timestamps",
                    name,
                    cols.x.len(),
                    cols.y.len(),
                    self.len()
                )));
            }
        }
        if !any {
            return Err(FixationError::InsufficientData);
        }
        Ok(())
    }

    /// Median sampling period in ms, if there are at least two samples.
    pub fn median_period(&self) -> Option<f64> {
        let diffs: Vec<f64> = self.time.windows(2).map(|w| w[1] - w[0]).collect();
        median(&diffs)
    }

    /// Convert the columns into masked traces, dropping the sentinels.
    pub fn channels(&self, options: &Options) -> ChannelSet {
        let convert =
            |c: &Option<EyeColumns>| c.as_ref().map(|c| Trace::from_columns(c, options));
        ChannelSet {
            left: convert(&self.left),
            right: convert(&self.right),
            average: convert(&self.average),
        }
    }
}

/// Reject empty, non-finite or non-increasing time axes.
pub(crate) fn check_time_axis(time: &[f64]) -> Result<(), FixationError> {
    if time.is_empty() {
        return Err(FixationError::Input("gaze trace has no samples".to_string()));
    }
    if let Some(i) = time.iter().position(|t| !t.is_finite()) {
        return Err(FixationError::Input(format!(
            "timestamp at row {} is not finite",
            i
        )));
    }
    if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
        return Err(FixationError::Input(format!(
            "timestamps not strictly increasing at row {}",
            i + 1
        )));
    }
    Ok(())
}

/// Inclusive `(start, end)` bounds of every run of `true` in `mask`.
pub(crate) fn true_runs(mask: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &m) in mask.iter().enumerate() {
        match (m, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, mask.len() - 1));
    }
    runs
}

/// Per-sample 2D positions with an explicit validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub valid: Vec<bool>,
}

impl Trace {
    /// Build from raw values; invalid samples are stored as NaN.
    pub fn new(x: Vec<f64>, y: Vec<f64>, valid: Vec<bool>) -> Self {
        let mut trace = Self {
            x: Array1::from(x),
            y: Array1::from(y),
            valid,
        };
        trace.clear_invalid();
        trace
    }

    /// Fully valid trace from positions.
    pub fn from_points(x: Vec<f64>, y: Vec<f64>) -> Self {
        let valid = x
            .iter()
            .zip(y.iter())
            .map(|(a, b)| a.is_finite() && b.is_finite())
            .collect();
        Self::new(x, y, valid)
    }

    fn from_columns(columns: &EyeColumns, options: &Options) -> Self {
        let valid = columns
            .x
            .iter()
            .zip(columns.y.iter())
            .map(|(&x, &y)| {
                x.is_finite() && y.is_finite() && x != options.missing_x && y != options.missing_y
            })
            .collect();
        Self::new(columns.x.clone(), columns.y.clone(), valid)
    }

    fn clear_invalid(&mut self) {
        for (i, &ok) in self.valid.iter().enumerate() {
            if !ok {
                self.x[i] = f64::NAN;
                self.y[i] = f64::NAN;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    pub fn is_fully_valid(&self) -> bool {
        self.valid.iter().all(|&v| v)
    }

    pub fn point(&self, i: usize) -> Option<[f64; 2]> {
        self.valid[i].then(|| [self.x[i], self.y[i]])
    }

    /// Mean position of the valid samples in `start..=end`.
    pub fn mean_position(&self, start: usize, end: usize) -> Option<[f64; 2]> {
        let (sx, sy, n) = (start..=end)
            .filter_map(|i| self.point(i))
            .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p[0], sy + p[1], n + 1));
        (n > 0).then(|| [sx / n as f64, sy / n as f64])
    }
}

/// The eye channels of one recording as masked traces.
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    pub left: Option<Trace>,
    pub right: Option<Trace>,
    pub average: Option<Trace>,
}

impl ChannelSet {
    /// True when at least one provided channel has a valid sample.
    pub fn has_valid_data(&self) -> bool {
        [&self.left, &self.right, &self.average]
            .into_iter()
            .flatten()
            .any(|t| t.valid_count() > 0)
    }
}
