//! Clustering of 2D sample positions.

mod two_means;

pub use two_means::{two_means, ClusterError, TwoMeans};
