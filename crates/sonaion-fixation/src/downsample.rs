//! Multi-scale decimation of the working trace
//!
//! Scale 1 is the working trace itself and is always present. Every other
//! configured factor yields one decimated copy; decimated sample `i`
//! corresponds to original sample `i * factor`.

use sonaion_signals::{decimate, decimate_mask, masked_moving_average};

use crate::config::Options;
use crate::gaze::Trace;

/// One temporal granularity of the working trace.
#[derive(Debug, Clone)]
pub struct Scale {
    pub factor: usize,
    pub trace: Trace,
}

impl Scale {
    /// Index in the original trace of decimated sample `i`.
    pub fn original_index(&self, i: usize) -> usize {
        i * self.factor
    }
}

#[derive(Debug, Clone)]
pub struct MultiScaleDownsampler {
    factors: Vec<usize>,
    filter: bool,
}

impl MultiScaleDownsampler {
    pub fn new(downsamples: &[usize], filter: bool) -> Self {
        let mut factors = vec![1];
        for &f in downsamples {
            if f > 1 && !factors.contains(&f) {
                factors.push(f);
            }
        }
        Self { factors, filter }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(&options.downsamples, options.downsamp_filter)
    }

    /// Factors processed, scale 1 first.
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    /// Build every scale. The input trace is left untouched.
    pub fn scales(&self, trace: &Trace) -> Vec<Scale> {
        self.factors
            .iter()
            .map(|&factor| Scale {
                factor,
                trace: self.downsample(trace, factor),
            })
            .collect()
    }

    fn downsample(&self, trace: &Trace, factor: usize) -> Trace {
        if factor == 1 {
            return trace.clone();
        }

        let (x, y) = if self.filter {
            let sx = masked_moving_average(trace.x.view(), &trace.valid, factor);
            let sy = masked_moving_average(trace.y.view(), &trace.valid, factor);
            (decimate(sx.view(), factor), decimate(sy.view(), factor))
        } else {
            (decimate(trace.x.view(), factor), decimate(trace.y.view(), factor))
        };
        let valid = decimate_mask(&trace.valid, factor);

        log::debug!(
            "scale {}: {} of {} samples valid",
            factor,
            valid.iter().filter(|&&v| v).count(),
            valid.len()
        );
        Trace::new(x.to_vec(), y.to_vec(), valid)
    }
}
