//! The detection pipeline
//!
//! ```text
//! GazeTable -> GapInterpolator (per channel) -> ChannelCombiner
//!           -> MultiScaleDownsampler -> TwoMeansClassifier
//!           -> FixationCandidateExtractor -> BoundaryRefiner -> Merger
//!           -> DurationFilter -> ResultBuilder
//! ```
//!
//! A run is one synchronous batch over a complete recording. It either
//! returns every fixation or an error; nothing partial escapes.

use serde::Serialize;

use crate::candidates::FixationCandidateExtractor;
use crate::combine::{ChannelCombiner, ChannelSource};
use crate::config::Options;
use crate::downsample::MultiScaleDownsampler;
use crate::error::FixationError;
use crate::fixation::{DurationFilter, Fixation, FixationTable, ResultBuilder};
use crate::gaze::{GazeTable, Trace};
use crate::interpolate::{GapInterpolator, Interpolated, InterpolationReport};
use crate::merge::Merger;
use crate::refine::{BoundaryRefiner, RefineInput};
use crate::weighting::TwoMeansClassifier;

/// Relative deviation of the median sampling period from `1000 / freq`
/// above which a warning is logged.
const PERIOD_TOLERANCE: f64 = 0.1;

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub fixations: Vec<Fixation>,
    /// Channel(s) the working trace came from
    pub source: ChannelSource,
    /// Summed transition votes per sample
    pub weights: Vec<f64>,
    /// Number of clustering windows that saw each sample
    pub coverage: Vec<u32>,
    pub cutoff: f64,
    pub local_cutoff: f64,
    pub skipped_windows: usize,
    /// Summed over all provided channels
    pub interpolation: InterpolationReport,
}

impl Detection {
    pub fn to_table(&self) -> FixationTable {
        FixationTable::from(self.fixations.as_slice())
    }
}

/// Stateless fixation detector bound to one validated option set.
#[derive(Debug, Clone)]
pub struct FixationDetector {
    options: Options,
}

impl FixationDetector {
    pub fn new(options: Options) -> Result<Self, FixationError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn detect(&self, table: &GazeTable) -> Result<Detection, FixationError> {
        let opts = &self.options;
        table.validate()?;
        self.check_sampling_period(table);

        let channels = table.channels(opts);
        if !channels.has_valid_data() {
            return Err(FixationError::InsufficientData);
        }

        let interpolator = GapInterpolator::from_options(opts);
        let mut interpolation = InterpolationReport::default();
        let mut fill = |trace: &Option<Trace>| -> Result<Option<Interpolated>, FixationError> {
            trace
                .as_ref()
                .map(|t| -> Result<Interpolated, FixationError> {
                    let out = interpolator.interpolate(&table.time, t)?;
                    interpolation.absorb(&out.report);
                    Ok(out)
                })
                .transpose()
        };
        let left = fill(&channels.left)?;
        let right = fill(&channels.right)?;
        let average = fill(&channels.average)?;

        let combined = ChannelCombiner::combine(left.as_ref(), right.as_ref(), average.as_ref())?;
        let trace = &combined.trace;
        let n = trace.len();

        let scales = MultiScaleDownsampler::from_options(opts).scales(trace);
        let (weights, ctx) = TwoMeansClassifier::from_options(opts).classify(&scales, n)?;

        let set = FixationCandidateExtractor::new(opts.cutoff_std).extract(&weights, &trace.valid);
        let refined = BoundaryRefiner::new(opts.onoffset_thresh).refine(
            &set.candidates,
            &RefineInput {
                time: &table.time,
                trace,
                weights: &weights,
                local_cutoff: set.local_cutoff,
            },
        );
        let merged = Merger::new(opts.max_merge_time, opts.max_merge_dist).merge(
            &refined,
            &table.time,
            trace,
        );
        let kept = DurationFilter::new(opts.min_fix_dur).apply(&merged, &table.time);
        let fixations = ResultBuilder::build(&kept, &table.time, trace, &combined.interpolated);

        log::info!(
            "{} fixation(s) in {} samples ({:?} channel, {} window(s) skipped)",
            fixations.len(),
            n,
            combined.source,
            ctx.skipped
        );

        Ok(Detection {
            fixations,
            source: combined.source,
            weights: weights.weights,
            coverage: weights.coverage,
            cutoff: set.cutoff,
            local_cutoff: set.local_cutoff,
            skipped_windows: ctx.skipped,
            interpolation,
        })
    }

    fn check_sampling_period(&self, table: &GazeTable) {
        let expected = 1000.0 / self.options.freq;
        if let Some(period) = table.median_period() {
            if ((period - expected) / expected).abs() > PERIOD_TOLERANCE {
                log::warn!(
                    "median sample period {:.3} ms does not match {} Hz ({:.3} ms)",
                    period,
                    self.options.freq,
                    expected
                );
            }
        }
    }
}

/// One-shot detection returning the output table.
pub fn detect_fixations(table: &GazeTable, options: &Options) -> Result<FixationTable, FixationError> {
    let detection = FixationDetector::new(options.clone())?.detect(table)?;
    Ok(detection.to_table())
}
