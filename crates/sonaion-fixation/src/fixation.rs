//! Fixation records and the output table

use serde::{Deserialize, Serialize};

use crate::candidates::Candidate;
use crate::gaze::Trace;

/// One detected fixation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    /// First sample of the fixation in the working trace
    pub start_index: usize,
    /// Last sample, inclusive
    pub end_index: usize,
    /// ms
    pub start_time: f64,
    /// ms
    pub end_time: f64,
    /// `end_time - start_time`, ms
    pub duration: f64,
    /// Mean position of the valid samples, px
    pub x: f64,
    pub y: f64,
    /// max - min per axis, px
    pub range_x: f64,
    pub range_y: f64,
    /// RMS of sample-to-sample displacement, px
    pub rms: f64,
    /// Share of samples produced by gap interpolation
    pub fraction_interpolated: f64,
}

impl Fixation {
    /// Larger of the two ranges.
    pub fn radius(&self) -> f64 {
        self.range_x.max(self.range_y)
    }
}

#[derive(Debug, Clone)]
pub struct DurationFilter {
    /// ms
    min_fix_dur: f64,
}

impl DurationFilter {
    pub fn new(min_fix_dur: f64) -> Self {
        Self { min_fix_dur }
    }

    /// Keep candidates lasting at least `min_fix_dur`.
    pub fn apply(&self, candidates: &[Candidate], time: &[f64]) -> Vec<Candidate> {
        let kept: Vec<Candidate> = candidates
            .iter()
            .copied()
            .filter(|c| time[c.end] - time[c.start] >= self.min_fix_dur)
            .collect();
        log::debug!(
            "{} of {} candidate(s) last at least {} ms",
            kept.len(),
            candidates.len(),
            self.min_fix_dur
        );
        kept
    }
}

pub struct ResultBuilder;

impl ResultBuilder {
    /// Describe each candidate. Candidates without a valid sample are dropped.
    pub fn build(
        candidates: &[Candidate],
        time: &[f64],
        trace: &Trace,
        interpolated: &[bool],
    ) -> Vec<Fixation> {
        candidates
            .iter()
            .filter_map(|c| Self::describe(c, time, trace, interpolated))
            .collect()
    }

    fn describe(
        candidate: &Candidate,
        time: &[f64],
        trace: &Trace,
        interpolated: &[bool],
    ) -> Option<Fixation> {
        let range = candidate.start..=candidate.end;
        let [x, y] = trace.mean_position(candidate.start, candidate.end)?;

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in range.clone().filter_map(|i| trace.point(i)) {
            min_x = min_x.min(p[0]);
            max_x = max_x.max(p[0]);
            min_y = min_y.min(p[1]);
            max_y = max_y.max(p[1]);
        }

        let steps: Vec<f64> = (candidate.start..candidate.end)
            .filter_map(|i| match (trace.point(i), trace.point(i + 1)) {
                (Some(a), Some(b)) => Some((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)),
                _ => None,
            })
            .collect();
        let rms = if steps.is_empty() {
            0.0
        } else {
            (steps.iter().sum::<f64>() / steps.len() as f64).sqrt()
        };

        let n = candidate.end - candidate.start + 1;
        let filled = range.filter(|&i| interpolated[i]).count();

        Some(Fixation {
            start_index: candidate.start,
            end_index: candidate.end,
            start_time: time[candidate.start],
            end_time: time[candidate.end],
            duration: time[candidate.end] - time[candidate.start],
            x,
            y,
            range_x: max_x - min_x,
            range_y: max_y - min_y,
            rms,
            fraction_interpolated: filled as f64 / n as f64,
        })
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationRow {
    pub x: f64,
    pub y: f64,
    pub x_range: f64,
    pub y_range: f64,
    pub start_t: f64,
    pub end_t: f64,
    pub radius: f64,
}

impl From<&Fixation> for FixationRow {
    fn from(f: &Fixation) -> Self {
        Self {
            x: f.x,
            y: f.y,
            x_range: f.range_x,
            y_range: f.range_y,
            start_t: f.start_time,
            end_t: f.end_time,
            radius: f.radius(),
        }
    }
}

/// Chronological fixation table, one row per fixation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixationTable {
    pub rows: Vec<FixationRow>,
}

impl FixationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&[Fixation]> for FixationTable {
    fn from(fixations: &[Fixation]) -> Self {
        Self {
            rows: fixations.iter().map(FixationRow::from).collect(),
        }
    }
}
