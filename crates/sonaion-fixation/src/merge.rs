//! Merging of neighbouring candidates
//!
//! One left-to-right sweep. A merged candidate is immediately compared with
//! its next neighbour using its new mean position, so chains of close
//! candidates collapse in the same pass.

use crate::candidates::Candidate;
use crate::gaze::Trace;

#[derive(Debug, Clone)]
pub struct Merger {
    /// ms
    max_merge_time: f64,
    /// px
    max_merge_dist: f64,
}

impl Merger {
    pub fn new(max_merge_time: f64, max_merge_dist: f64) -> Self {
        Self {
            max_merge_time,
            max_merge_dist,
        }
    }

    pub fn merge(&self, candidates: &[Candidate], time: &[f64], trace: &Trace) -> Vec<Candidate> {
        let mut iter = candidates.iter().copied();
        let Some(mut current) = iter.next() else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(candidates.len());
        for next in iter {
            if self.should_merge(&current, &next, time, trace) {
                current.end = next.end;
            } else {
                out.push(current);
                current = next;
            }
        }
        out.push(current);

        if out.len() < candidates.len() {
            log::debug!("merged {} candidates into {}", candidates.len(), out.len());
        }
        out
    }

    fn should_merge(&self, current: &Candidate, next: &Candidate, time: &[f64], trace: &Trace) -> bool {
        let gap = time[next.start] - time[current.end];
        if gap > self.max_merge_time {
            return false;
        }
        match (
            trace.mean_position(current.start, current.end),
            trace.mean_position(next.start, next.end),
        ) {
            (Some(a), Some(b)) => (a[0] - b[0]).hypot(a[1] - b[1]) <= self.max_merge_dist,
            _ => false,
        }
    }
}
