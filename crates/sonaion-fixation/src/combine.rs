//! Channel combination
//!
//! Reduces the provided eye channels to one working trace:
//! 1. the average channel, when it is provided and fully valid
//! 2. the eye holding strictly more valid samples than the other
//! 3. on a tie, a per-sample merge: mean of both eyes where both are valid,
//!    the single valid eye where only one is, the average channel where
//!    neither eye is, missing where nothing is valid
//!
//! Only provided data is ever selected; nothing is extrapolated here.

use serde::{Deserialize, Serialize};

use crate::error::FixationError;
use crate::gaze::Trace;
use crate::interpolate::Interpolated;

/// Which channel(s) the working trace was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelSource {
    Average,
    Left,
    Right,
    /// Sample-by-sample choice among the provided channels
    PerSample,
}

/// The single working trace handed to the classifier.
#[derive(Debug, Clone)]
pub struct CombinedTrace {
    pub trace: Trace,
    pub interpolated: Vec<bool>,
    pub source: ChannelSource,
}

pub struct ChannelCombiner;

impl ChannelCombiner {
    pub fn combine(
        left: Option<&Interpolated>,
        right: Option<&Interpolated>,
        average: Option<&Interpolated>,
    ) -> Result<CombinedTrace, FixationError> {
        let valid_count = |c: Option<&Interpolated>| c.map_or(0, |c| c.trace.valid_count());
        if valid_count(left) + valid_count(right) + valid_count(average) == 0 {
            return Err(FixationError::InsufficientData);
        }

        if let Some(avg) = average.filter(|a| a.trace.is_fully_valid()) {
            return Ok(Self::take(avg, ChannelSource::Average));
        }

        let (nl, nr) = (valid_count(left), valid_count(right));
        if let Some(l) = left.filter(|_| nl > nr) {
            return Ok(Self::take(l, ChannelSource::Left));
        }
        if let Some(r) = right.filter(|_| nr > nl) {
            return Ok(Self::take(r, ChannelSource::Right));
        }

        let combined = Self::per_sample(left, right, average);
        if combined.trace.valid_count() == 0 {
            return Err(FixationError::InsufficientData);
        }
        Ok(combined)
    }

    fn take(channel: &Interpolated, source: ChannelSource) -> CombinedTrace {
        log::debug!("working trace taken from {:?} channel", source);
        CombinedTrace {
            trace: channel.trace.clone(),
            interpolated: channel.interpolated.clone(),
            source,
        }
    }

    fn per_sample(
        left: Option<&Interpolated>,
        right: Option<&Interpolated>,
        average: Option<&Interpolated>,
    ) -> CombinedTrace {
        let n = [left, right, average]
            .into_iter()
            .flatten()
            .map(|c| c.trace.len())
            .next()
            .unwrap_or(0);

        let at = |c: Option<&Interpolated>, i: usize| {
            c.and_then(|c| c.trace.point(i).map(|p| (p, c.interpolated[i])))
        };

        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut valid = Vec::with_capacity(n);
        let mut interpolated = Vec::with_capacity(n);

        for i in 0..n {
            let picked = match (at(left, i), at(right, i)) {
                (Some((l, li)), Some((r, ri))) => {
                    Some(([(l[0] + r[0]) / 2.0, (l[1] + r[1]) / 2.0], li || ri))
                }
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => at(average, i),
            };
            match picked {
                Some((p, interp)) => {
                    x.push(p[0]);
                    y.push(p[1]);
                    valid.push(true);
                    interpolated.push(interp);
                }
                None => {
                    x.push(f64::NAN);
                    y.push(f64::NAN);
                    valid.push(false);
                    interpolated.push(false);
                }
            }
        }

        log::debug!("working trace combined per sample");
        CombinedTrace {
            trace: Trace::new(x, y, valid),
            interpolated,
            source: ChannelSource::PerSample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::InterpolationReport;

    fn channel(x: Vec<f64>, y: Vec<f64>, valid: Vec<bool>) -> Interpolated {
        let n = valid.len();
        Interpolated {
            trace: Trace::new(x, y, valid),
            interpolated: vec![false; n],
            report: InterpolationReport::default(),
        }
    }

    #[test]
    fn test_prefers_fully_valid_average() {
        let avg = channel(vec![5.0; 3], vec![5.0; 3], vec![true; 3]);
        let left = channel(vec![1.0; 3], vec![1.0; 3], vec![true; 3]);

        let out = ChannelCombiner::combine(Some(&left), None, Some(&avg)).unwrap();
        assert_eq!(out.source, ChannelSource::Average);
        assert_eq!(out.trace.x[0], 5.0);
    }

    #[test]
    fn test_picks_fully_valid_eye_with_more_data() {
        let left = channel(vec![1.0; 4], vec![1.0; 4], vec![true, false, true, true]);
        let right = channel(vec![2.0; 4], vec![2.0; 4], vec![true; 4]);
        let avg = channel(vec![3.0; 4], vec![3.0; 4], vec![false, true, true, true]);

        let out = ChannelCombiner::combine(Some(&left), Some(&right), Some(&avg)).unwrap();
        assert_eq!(out.source, ChannelSource::Right);
        assert!(out.trace.is_fully_valid());
    }

    #[test]
    fn test_eye_with_more_valid_samples_wins_despite_dropouts() {
        let left_valid: Vec<bool> = (0..100).map(|i| i != 30).collect();
        let right_valid: Vec<bool> = (0..100).map(|i| i % 2 == 0).collect();
        let left = channel(vec![100.0; 100], vec![50.0; 100], left_valid);
        let right = channel(vec![110.0; 100], vec![50.0; 100], right_valid);

        let out = ChannelCombiner::combine(Some(&left), Some(&right), None).unwrap();

        assert_eq!(out.source, ChannelSource::Left);
        assert_eq!(out.trace.x[0], 100.0);
        assert_eq!(out.trace.point(30), None);
        assert_eq!(out.trace.valid_count(), 99);
    }

    #[test]
    fn test_single_fully_valid_eye() {
        let left = channel(vec![1.0, 2.0], vec![3.0, 4.0], vec![true, true]);
        let out = ChannelCombiner::combine(Some(&left), None, None).unwrap();
        assert_eq!(out.source, ChannelSource::Left);
    }

    #[test]
    fn test_both_eyes_valid_are_averaged() {
        let left = channel(vec![10.0; 2], vec![20.0; 2], vec![true; 2]);
        let right = channel(vec![20.0; 2], vec![40.0; 2], vec![true; 2]);

        let out = ChannelCombiner::combine(Some(&left), Some(&right), None).unwrap();
        assert_eq!(out.source, ChannelSource::PerSample);
        assert_eq!(out.trace.point(0), Some([15.0, 30.0]));
    }

    #[test]
    fn test_per_sample_fallbacks() {
        let left = channel(vec![10.0; 4], vec![10.0; 4], vec![true, false, false, false]);
        let right = channel(vec![30.0; 4], vec![30.0; 4], vec![false, true, false, false]);
        let avg = channel(vec![50.0; 4], vec![50.0; 4], vec![false, false, true, false]);

        let out = ChannelCombiner::combine(Some(&left), Some(&right), Some(&avg)).unwrap();

        assert_eq!(out.trace.point(0), Some([10.0, 10.0]));
        assert_eq!(out.trace.point(1), Some([30.0, 30.0]));
        assert_eq!(out.trace.point(2), Some([50.0, 50.0]));
        assert_eq!(out.trace.point(3), None);
    }

    #[test]
    fn test_all_missing_is_insufficient() {
        let left = channel(vec![0.0; 3], vec![0.0; 3], vec![false; 3]);
        let right = channel(vec![0.0; 3], vec![0.0; 3], vec![false; 3]);
        assert!(matches!(
            ChannelCombiner::combine(Some(&left), Some(&right), None),
            Err(FixationError::InsufficientData)
        ));
        assert!(matches!(
            ChannelCombiner::combine(None, None, None),
            Err(FixationError::InsufficientData)
        ));
    }
}
