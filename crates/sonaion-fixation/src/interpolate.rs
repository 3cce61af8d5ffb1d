//! Gap interpolation
//!
//! Fills short runs of missing samples (blinks, brief tracker loss) with
//! Steffen monotone cubic interpolation through the valid samples on each
//! side. A gap qualifies only when:
//! - it is shorter than `windowtime_interp`
//! - `edge_samp_interp` valid samples border it on both sides
//! - the eye did not move further than `max_disp` across it
//!
//! Everything else stays missing and is excluded downstream.
//!
//! Eligibility is judged on the input mask, so filling one gap never makes
//! a neighbouring gap eligible.

use serde::{Deserialize, Serialize};
use sonaion_signals::steffen_interpolate;

use crate::config::Options;
use crate::error::FixationError;
use crate::gaze::{check_time_axis, true_runs, Trace};

/// Gap bookkeeping for one interpolated channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationReport {
    pub filled_gaps: usize,
    pub filled_samples: usize,
    /// Gaps short enough and bounded, but moving further than `max_disp`
    pub rejected_gaps: usize,
}

impl InterpolationReport {
    pub(crate) fn absorb(&mut self, other: &InterpolationReport) {
        self.filled_gaps += other.filled_gaps;
        self.filled_samples += other.filled_samples;
        self.rejected_gaps += other.rejected_gaps;
    }
}

/// A channel after gap filling.
#[derive(Debug, Clone)]
pub struct Interpolated {
    pub trace: Trace,
    /// True where the position was produced by interpolation
    pub interpolated: Vec<bool>,
    pub report: InterpolationReport,
}

#[derive(Debug, Clone)]
pub struct GapInterpolator {
    /// Gaps must hold fewer samples than this
    max_gap_samples: f64,
    edge_samples: usize,
    max_disp: f64,
}

impl GapInterpolator {
    pub fn new(max_gap_samples: f64, edge_samples: usize, max_disp: f64) -> Self {
        Self {
            max_gap_samples,
            edge_samples: edge_samples.max(1),
            max_disp,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(
            options.windowtime_interp * options.freq,
            options.edge_samp_interp,
            options.max_disp,
        )
    }

    /// Interpolate every qualifying gap of `trace`, sampled at `time` (ms).
    pub fn interpolate(&self, time: &[f64], trace: &Trace) -> Result<Interpolated, FixationError> {
        check_time_axis(time)?;
        if time.len() != trace.len() {
            return Err(FixationError::Input(format!(
                "{} timestamps for {} samples",
                time.len(),
                trace.len()
            )));
        }

        let n = trace.len();
        let edge = self.edge_samples;
        let mut out = trace.clone();
        let mut interpolated = vec![false; n];
        let mut report = InterpolationReport::default();

        let missing: Vec<bool> = trace.valid.iter().map(|v| !v).collect();
        for (start, end) in true_runs(&missing) {
            let len = end - start + 1;
            if len as f64 >= self.max_gap_samples {
                continue;
            }
            if start < edge || end + edge >= n {
                continue;
            }
            let before = start - edge..start;
            let after = end + 1..end + 1 + edge;
            if !before.clone().chain(after.clone()).all(|i| trace.valid[i]) {
                continue;
            }

            let dx = trace.x[end + 1] - trace.x[start - 1];
            let dy = trace.y[end + 1] - trace.y[start - 1];
            if dx.hypot(dy) > self.max_disp {
                report.rejected_gaps += 1;
                continue;
            }

            let knots: Vec<usize> = before.chain(after).collect();
            let kt: Vec<f64> = knots.iter().map(|&i| time[i]).collect();
            let kx: Vec<f64> = knots.iter().map(|&i| trace.x[i]).collect();
            let ky: Vec<f64> = knots.iter().map(|&i| trace.y[i]).collect();
            let qt = &time[start..=end];

            let xs = steffen_interpolate(&kt, &kx, qt)?;
            let ys = steffen_interpolate(&kt, &ky, qt)?;

            for (k, i) in (start..=end).enumerate() {
                out.x[i] = xs[k];
                out.y[i] = ys[k];
                out.valid[i] = true;
                interpolated[i] = true;
            }
            report.filled_gaps += 1;
            report.filled_samples += len;
        }

        if report.rejected_gaps > 0 {
            log::warn!(
                "{} gap(s) left missing: displacement exceeded {:.1} px",
                report.rejected_gaps,
                self.max_disp
            );
        }
        log::debug!(
            "interpolated {} gap(s), {} sample(s)",
            report.filled_gaps,
            report.filled_samples
        );

        Ok(Interpolated {
            trace: out,
            interpolated,
            report,
        })
    }
}
