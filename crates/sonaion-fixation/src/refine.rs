//! Onset/offset refinement of fixation candidates
//!
//! Candidate bounds come from windowed scores and are therefore coarse.
//! Two passes fix them up:
//! 1. trim inward while a boundary sample is missing or spatially an
//!    outlier: further from the median position than `onoffset_thresh`
//!    times the median distance to it (the positional MAD)
//! 2. walk outward while the newly included sample still looks like the
//!    same fixation (local weight strictly below the local cutoff, inside
//!    the footprint) and the candidate stays of typical duration
//!
//! Candidates are processed left to right; the walk never enters a sample
//! owned by a neighbour.

use sonaion_signals::{mad, median};

use crate::candidates::Candidate;
use crate::gaze::Trace;
use crate::weighting::ClusterWeights;

/// Spatial extent of one candidate: median position and the accepted
/// distance from it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Footprint {
    center: [f64; 2],
    radius: f64,
}

impl Footprint {
    fn admits(&self, p: [f64; 2]) -> bool {
        (p[0] - self.center[0]).hypot(p[1] - self.center[1]) <= self.radius
    }
}

/// Read-only inputs shared by both passes.
pub struct RefineInput<'a> {
    pub time: &'a [f64],
    pub trace: &'a Trace,
    pub weights: &'a ClusterWeights,
    pub local_cutoff: f64,
}

#[derive(Debug, Clone)]
pub struct BoundaryRefiner {
    onoffset_thresh: f64,
}

impl BoundaryRefiner {
    pub fn new(onoffset_thresh: f64) -> Self {
        Self { onoffset_thresh }
    }

    pub fn refine(&self, candidates: &[Candidate], input: &RefineInput<'_>) -> Vec<Candidate> {
        let trimmed: Vec<(Candidate, Footprint)> = candidates
            .iter()
            .filter_map(|c| self.trim(c, input.trace))
            .collect();
        if trimmed.len() < candidates.len() {
            log::debug!(
                "{} candidate(s) dropped by boundary trim",
                candidates.len() - trimmed.len()
            );
        }

        let durations: Vec<f64> = trimmed
            .iter()
            .map(|(c, _)| input.time[c.end] - input.time[c.start])
            .collect();
        let max_duration = match (median(&durations), mad(&durations)) {
            (Some(m), Some(d)) => m + self.onoffset_thresh * d,
            _ => return Vec::new(),
        };

        let mut out: Vec<Candidate> = Vec::with_capacity(trimmed.len());
        for (k, &(candidate, footprint)) in trimmed.iter().enumerate() {
            let lower = out.last().map_or(0, |prev| prev.end + 1);
            let upper = trimmed
                .get(k + 1)
                .map_or(input.trace.len() - 1, |(next, _)| next.start - 1);
            out.push(self.widen(candidate, footprint, lower, upper, max_duration, input));
        }
        out
    }

    /// Pass 1. `None` when nothing survives.
    fn trim(&self, candidate: &Candidate, trace: &Trace) -> Option<(Candidate, Footprint)> {
        let points: Vec<[f64; 2]> = (candidate.start..=candidate.end)
            .filter_map(|i| trace.point(i))
            .collect();
        let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
        let center = [median(&xs)?, median(&ys)?];
        let distances: Vec<f64> = points
            .iter()
            .map(|p| (p[0] - center[0]).hypot(p[1] - center[1]))
            .collect();
        let footprint = Footprint {
            center,
            radius: self.onoffset_thresh * median(&distances)?,
        };

        let keep = |i: usize| trace.point(i).is_some_and(|p| footprint.admits(p));
        let mut start = candidate.start;
        let mut end = candidate.end;
        while start <= end && !keep(start) {
            start += 1;
        }
        while end > start && !keep(end) {
            end -= 1;
        }
        (start <= end && keep(start)).then_some((Candidate::new(start, end), footprint))
    }

    /// Pass 2, bounded to `lower..=upper`.
    fn widen(
        &self,
        mut candidate: Candidate,
        footprint: Footprint,
        lower: usize,
        upper: usize,
        max_duration: f64,
        input: &RefineInput<'_>,
    ) -> Candidate {
        let accepts = |i: usize| {
            let local_ok = input
                .weights
                .local_weight(i)
                .is_some_and(|w| w < input.local_cutoff);
            local_ok && input.trace.point(i).is_some_and(|p| footprint.admits(p))
        };
        let duration = |s: usize, e: usize| input.time[e] - input.time[s];

        while candidate.start > lower
            && duration(candidate.start - 1, candidate.end) <= max_duration
            && accepts(candidate.start - 1)
        {
            candidate.start -= 1;
        }
        while candidate.end < upper
            && duration(candidate.start, candidate.end + 1) <= max_duration
            && accepts(candidate.end + 1)
        {
            candidate.end += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    fn flat_weights(n: usize) -> ClusterWeights {
        ClusterWeights {
            weights: vec![0.0; n],
            coverage: vec![1; n],
        }
    }

    #[test]
    fn test_trim_drops_outlying_edges() {
        // noisy fixation at (100, 100) with a saccade sample at each end
        let mut x: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        x[0] = 160.0;
        x[19] = 40.0;
        let trace = Trace::from_points(x, vec![100.0; 20]);
        let t = time(20);
        let w = flat_weights(20);
        let input = RefineInput {
            time: &t,
            trace: &trace,
            weights: &w,
            local_cutoff: 0.0,
        };

        let out = BoundaryRefiner::new(3.0).refine(&[Candidate::new(0, 19)], &input);
        assert_eq!(out, vec![Candidate::new(1, 18)]);
    }

    #[test]
    fn test_trim_skips_missing_edges() {
        let mut valid = vec![true; 10];
        valid[0] = false;
        valid[9] = false;
        let trace = Trace::new(vec![5.0; 10], vec![5.0; 10], valid);
        let t = time(10);
        let w = flat_weights(10);
        let input = RefineInput {
            time: &t,
            trace: &trace,
            weights: &w,
            local_cutoff: 0.0,
        };

        let out = BoundaryRefiner::new(3.0).refine(&[Candidate::new(0, 9)], &input);
        assert_eq!(out, vec![Candidate::new(1, 8)]);
    }

    #[test]
    fn test_all_missing_candidate_is_dropped() {
        let trace = Trace::new(vec![0.0; 6], vec![0.0; 6], vec![false; 6]);
        let t = time(6);
        let w = flat_weights(6);
        let input = RefineInput {
            time: &t,
            trace: &trace,
            weights: &w,
            local_cutoff: 0.0,
        };

        assert!(BoundaryRefiner::new(3.0)
            .refine(&[Candidate::new(1, 4)], &input)
            .is_empty());
    }

    #[test]
    fn test_walk_recovers_onset_and_offset() {
        // three fixations at the same place; the middle one was cut short
        let n = 100;
        let trace = Trace::from_points(vec![50.0; n], vec![50.0; n]);
        let t = time(n);
        let mut w = flat_weights(n);
        for i in [10, 11, 40, 41, 70, 71] {
            w.weights[i] = 5.0;
        }
        let input = RefineInput {
            time: &t,
            trace: &trace,
            weights: &w,
            local_cutoff: 1.0,
        };
        let candidates = [
            Candidate::new(12, 39),
            Candidate::new(45, 60),
            Candidate::new(72, 99),
        ];

        // durations 27, 15, 27: median 27, MAD 0
        let out = BoundaryRefiner::new(3.0).refine(&candidates, &input);

        assert_eq!(out[0], Candidate::new(12, 39));
        // onset walks to the vote at 41, offset stops at the duration cap
        assert_eq!(out[1], Candidate::new(42, 69));
        assert_eq!(out[2], Candidate::new(72, 99));
    }

    #[test]
    fn test_walk_stops_at_neighbour() {
        let n = 40;
        let trace = Trace::from_points(vec![1.0; n], vec![1.0; n]);
        let t = time(n);
        let w = flat_weights(n);
        let input = RefineInput {
            time: &t,
            trace: &trace,
            weights: &w,
            local_cutoff: 1.0,
        };
        let candidates = [Candidate::new(0, 5), Candidate::new(20, 30)];

        let out = BoundaryRefiner::new(10.0).refine(&candidates, &input);

        assert_eq!(out[0].start, 0);
        assert!(out[0].end < out[1].start);
        assert_eq!(out[1].end, n - 1);
    }

    #[test]
    fn test_walk_stops_at_local_cutoff() {
        let n = 30;
        let trace = Trace::from_points(vec![50.0; n], vec![50.0; n]);
        let t = time(n);
        let mut w = flat_weights(n);
        w.weights[9] = 1.0;
        let input = RefineInput {
            time: &t,
            trace: &trace,
            weights: &w,
            local_cutoff: 1.0,
        };
        let candidates = [Candidate::new(10, 19), Candidate::new(22, 25)];

        // durations 9, 3: median 6, MAD 3, cap 15
        let out = BoundaryRefiner::new(3.0).refine(&candidates, &input);

        assert_eq!(out, vec![Candidate::new(10, 21), Candidate::new(22, 29)]);
    }
}
