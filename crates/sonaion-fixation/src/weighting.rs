//! Windowed two-means weighting
//!
//! Every scale is scanned with a sliding window. Each window's valid
//! samples are split into two clusters; when the split is real (a saccade
//! inside the window) the cluster labels switch between consecutive
//! samples, and the window casts a transition vote shared evenly over its
//! switch points. The vote grows with the distance between the two
//! centroids, `sep / (sep + SEPARATION_SCALE)`, so a saccade outweighs
//! tremor inside a fixation. A window that holds one coherent cluster casts
//! nothing. Summed over windows and scales:
//! - low weight marks fixation-like samples
//! - high weight marks transitions between fixations
//!
//! Coverage counts how many windows saw each original sample, so weights
//! can be normalised locally by the refiner.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use sonaion_signals::{two_means, ClusterError};

use crate::config::Options;
use crate::downsample::Scale;
use crate::error::FixationError;

/// Centroid separation in px at which a window casts half a vote.
pub const SEPARATION_SCALE: f64 = 5.0;

/// Transition votes and window coverage, indexed like the original trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterWeights {
    pub weights: Vec<f64>,
    pub coverage: Vec<u32>,
}

impl ClusterWeights {
    pub fn zeros(n: usize) -> Self {
        Self {
            weights: vec![0.0; n],
            coverage: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Element-wise sum.
    pub fn add(&mut self, other: &ClusterWeights) {
        for (w, o) in self.weights.iter_mut().zip(&other.weights) {
            *w += o;
        }
        for (c, o) in self.coverage.iter_mut().zip(&other.coverage) {
            *c += o;
        }
    }

    /// Weight per covering window, `None` for samples no window saw.
    pub fn local_weight(&self, i: usize) -> Option<f64> {
        let c = self.coverage[i];
        (c > 0).then(|| self.weights[i] / c as f64)
    }
}

/// Window bookkeeping threaded through one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunContext {
    pub windows: usize,
    /// Windows whose clustering did not converge
    pub skipped: usize,
    /// Windows holding a single cluster (or too few samples to split)
    pub coherent: usize,
}

impl RunContext {
    pub fn absorb(&mut self, other: &RunContext) {
        self.windows += other.windows;
        self.skipped += other.skipped;
        self.coherent += other.coherent;
    }

    /// Fail once more windows were skipped than the run may absorb.
    pub fn check_budget(&self, budget: usize) -> Result<(), FixationError> {
        if self.skipped > budget {
            return Err(FixationError::ClusteringNonConvergence {
                skipped: self.skipped,
                budget,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TwoMeansClassifier {
    freq: f64,
    windowtime: f64,
    steptime: f64,
    max_iterations: usize,
    error_budget: usize,
}

impl TwoMeansClassifier {
    pub fn new(
        freq: f64,
        windowtime: f64,
        steptime: f64,
        max_iterations: usize,
        error_budget: usize,
    ) -> Self {
        Self {
            freq,
            windowtime,
            steptime,
            max_iterations,
            error_budget,
        }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(
            options.freq,
            options.windowtime,
            options.steptime,
            options.max_errors,
            options.error_budget(),
        )
    }

    /// Window length and step, in samples of the scale with this factor.
    pub fn geometry(&self, factor: usize) -> (usize, usize) {
        let rate = self.freq / factor as f64;
        let length = ((self.windowtime * rate).round() as usize).max(2);
        let step = if self.steptime == 0.0 {
            1
        } else {
            ((self.steptime * rate).round() as usize).max(1)
        };
        (length, step)
    }

    /// Score every scale and sum the results.
    ///
    /// Per-scale partial sums are reduced in scale order, so the result
    /// does not depend on whether scales ran in parallel.
    pub fn classify(
        &self,
        scales: &[Scale],
        n_original: usize,
    ) -> Result<(ClusterWeights, RunContext), FixationError> {
        #[cfg(feature = "parallel")]
        let partials: Vec<(ClusterWeights, RunContext)> = scales
            .par_iter()
            .map(|scale| self.classify_scale(scale, n_original))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let partials: Vec<(ClusterWeights, RunContext)> = scales
            .iter()
            .map(|scale| self.classify_scale(scale, n_original))
            .collect();

        let mut total = ClusterWeights::zeros(n_original);
        let mut ctx = RunContext::default();
        for (weights, scale_ctx) in &partials {
            total.add(weights);
            ctx.absorb(scale_ctx);
        }

        if ctx.skipped > 0 {
            log::warn!(
                "{} of {} clustering windows skipped (budget {})",
                ctx.skipped,
                ctx.windows,
                self.error_budget
            );
        }
        ctx.check_budget(self.error_budget)?;

        log::debug!(
            "classified {} windows over {} scales, {} coherent",
            ctx.windows,
            scales.len(),
            ctx.coherent
        );
        Ok((total, ctx))
    }

    /// Score one scale into original-index space.
    pub fn classify_scale(&self, scale: &Scale, n_original: usize) -> (ClusterWeights, RunContext) {
        let trace = &scale.trace;
        let (length, step) = self.geometry(scale.factor);
        let mut out = ClusterWeights::zeros(n_original);
        let mut ctx = RunContext::default();

        for start in window_starts(trace.len(), length, step) {
            let end = (start + length).min(trace.len());
            ctx.windows += 1;

            let mut indices = Vec::with_capacity(end - start);
            let mut points = Vec::with_capacity(end - start);
            for i in start..end {
                if let Some(p) = trace.point(i) {
                    indices.push(scale.original_index(i));
                    points.push(p);
                }
            }

            match two_means(&points, self.max_iterations) {
                Ok(clustering) => {
                    let switches = clustering.switches();
                    if switches.is_empty() {
                        ctx.coherent += 1;
                    } else {
                        let sep = clustering.separation();
                        let vote = sep / (sep + SEPARATION_SCALE) / switches.len() as f64;
                        for k in switches {
                            out.weights[indices[k]] += vote;
                        }
                    }
                }
                Err(ClusterError::TooFewPoints(_)) | Err(ClusterError::Coincident) => {
                    ctx.coherent += 1;
                }
                Err(err @ ClusterError::NotConverged { .. }) => {
                    log::trace!(
                        "scale {} window at {}: {}, skipped",
                        scale.factor,
                        start,
                        err
                    );
                    ctx.skipped += 1;
                    continue;
                }
            }

            for &j in &indices {
                out.coverage[j] += 1;
            }
        }

        (out, ctx)
    }
}

/// Start offsets of the windows over `len` samples. A trailing window is
/// aligned to the end when the regular steps leave a tail uncovered.
fn window_starts(len: usize, length: usize, step: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    if len <= length {
        return vec![0];
    }
    let mut starts: Vec<usize> = (0..=len - length).step_by(step).collect();
    if let Some(&last) = starts.last() {
        if last + length < len {
            starts.push(len - length);
        }
    }
    starts
}
