//! Fixation candidates from the summed weight series

use sonaion_signals::{mean, std_dev};

use crate::gaze::true_runs;
use crate::weighting::ClusterWeights;

/// Inclusive sample range of the working trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub start: usize,
    pub end: usize,
}

impl Candidate {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub candidates: Vec<Candidate>,
    /// mean + cutoff_std * std of the summed weights
    pub cutoff: f64,
    /// Same statistic over weight per covering window
    pub local_cutoff: f64,
}

#[derive(Debug, Clone)]
pub struct FixationCandidateExtractor {
    cutoff_std: f64,
}

impl FixationCandidateExtractor {
    pub fn new(cutoff_std: f64) -> Self {
        Self { cutoff_std }
    }

    /// Maximal runs of valid, covered samples at or below the cutoff.
    ///
    /// Statistics are taken over those valid, covered samples only. With a
    /// flat weight series the cutoff equals every weight and all eligible
    /// samples form candidates.
    pub fn extract(&self, weights: &ClusterWeights, valid: &[bool]) -> CandidateSet {
        let eligible: Vec<bool> = valid
            .iter()
            .zip(&weights.coverage)
            .map(|(&v, &c)| v && c > 0)
            .collect();

        let indices: Vec<usize> = (0..eligible.len()).filter(|&i| eligible[i]).collect();
        let summed: Vec<f64> = indices.iter().map(|&i| weights.weights[i]).collect();
        let local: Vec<f64> = indices
            .iter()
            .filter_map(|&i| weights.local_weight(i))
            .collect();

        let (cutoff, local_cutoff) = match (self.threshold(&summed), self.threshold(&local)) {
            (Some(c), Some(l)) => (c, l),
            _ => {
                log::debug!("no covered valid samples; no candidates");
                return CandidateSet {
                    candidates: Vec::new(),
                    cutoff: f64::NAN,
                    local_cutoff: f64::NAN,
                };
            }
        };

        let below: Vec<bool> = eligible
            .iter()
            .zip(&weights.weights)
            .map(|(&e, &w)| e && w <= cutoff)
            .collect();
        let candidates: Vec<Candidate> = true_runs(&below)
            .into_iter()
            .map(|(s, e)| Candidate::new(s, e))
            .collect();

        log::debug!(
            "{} candidate(s) at cutoff {:.3} (local {:.3})",
            candidates.len(),
            cutoff,
            local_cutoff
        );
        CandidateSet {
            candidates,
            cutoff,
            local_cutoff,
        }
    }

    fn threshold(&self, values: &[f64]) -> Option<f64> {
        Some(mean(values)? + self.cutoff_std * std_dev(values)?)
    }
}
