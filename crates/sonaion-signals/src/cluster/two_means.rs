//! Deterministic two-means (k = 2) clustering of 2D positions
//!
//! Lloyd's algorithm seeded without randomness: the initial centroids are
//! the two samples lying furthest apart along the principal axis of the
//! point cloud. Identical input therefore always yields identical labels,
//! which keeps downstream event detection bit-reproducible.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("two-means needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("all points coincide; there is only one cluster")]
    Coincident,
    #[error("two-means did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// Result of a converged two-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoMeans {
    /// Cluster label (0 or 1) per input point, in input order
    pub labels: Vec<u8>,
    /// Final centroid of each cluster
    pub centroids: [[f64; 2]; 2],
    /// Number of points in each cluster
    pub counts: [usize; 2],
    /// Lloyd iterations used until the centroids stopped moving
    pub iterations: usize,
}

impl TwoMeans {
    /// Indices `k` where `labels[k] != labels[k + 1]`.
    pub fn switches(&self) -> Vec<usize> {
        self.labels
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1])
            .map(|(k, _)| k)
            .collect()
    }

    /// Euclidean distance between the two centroids.
    pub fn separation(&self) -> f64 {
        let [a, b] = self.centroids;
        (a[0] - b[0]).hypot(a[1] - b[1])
    }
}

fn squared_distance(p: &[f64; 2], c: &[f64; 2]) -> f64 {
    let dx = p[0] - c[0];
    let dy = p[1] - c[1];
    dx * dx + dy * dy
}

/// Indices of the points with minimum and maximum projection onto the
/// principal axis. Ties resolve to the earliest index.
fn principal_extremes(points: &[[f64; 2]]) -> (usize, usize) {
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let my = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p[0] - mx;
        let dy = p[1] - my;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    let (ux, uy) = (theta.cos(), theta.sin());

    let mut lo = (0, f64::INFINITY);
    let mut hi = (0, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        let proj = (p[0] - mx) * ux + (p[1] - my) * uy;
        if proj < lo.1 {
            lo = (i, proj);
        }
        if proj > hi.1 {
            hi = (i, proj);
        }
    }
    (lo.0, hi.0)
}

/// Cluster `points` into two groups.
///
/// Iterates assign-then-update until the centroids no longer move. Fails
/// with [`ClusterError::NotConverged`] when that takes more than
/// `max_iterations` updates, and with [`ClusterError::Coincident`] when
/// the points do not support two non-empty clusters.
pub fn two_means(points: &[[f64; 2]], max_iterations: usize) -> Result<TwoMeans, ClusterError> {
    if points.len() < 2 {
        return Err(ClusterError::TooFewPoints(points.len()));
    }
    if points.iter().all(|p| p == &points[0]) {
        return Err(ClusterError::Coincident);
    }

    let (lo, hi) = principal_extremes(points);
    if points[lo] == points[hi] {
        return Err(ClusterError::Coincident);
    }

    let mut centroids = [points[lo], points[hi]];
    let mut labels = vec![0u8; points.len()];

    for iteration in 1..=max_iterations {
        let mut sums = [[0.0f64; 2]; 2];
        let mut counts = [0usize; 2];

        for (label, p) in labels.iter_mut().zip(points) {
            let k = if squared_distance(p, &centroids[1]) < squared_distance(p, &centroids[0]) {
                1
            } else {
                0
            };
            *label = k as u8;
            sums[k][0] += p[0];
            sums[k][1] += p[1];
            counts[k] += 1;
        }

        if counts[0] == 0 || counts[1] == 0 {
            return Err(ClusterError::Coincident);
        }

        let updated = [
            [sums[0][0] / counts[0] as f64, sums[0][1] / counts[0] as f64],
            [sums[1][0] / counts[1] as f64, sums[1][1] / counts[1] as f64],
        ];

        if updated == centroids {
            return Ok(TwoMeans {
                labels,
                centroids,
                counts,
                iterations: iteration,
            });
        }
        centroids = updated;
    }

    Err(ClusterError::NotConverged {
        iterations: max_iterations,
    })
}
