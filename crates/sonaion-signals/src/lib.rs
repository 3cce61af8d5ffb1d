//! # sonaion-signals
//!
//! Numeric building blocks for gaze event detection.
//!
//! This crate provides:
//! - **Interpolation**: Steffen's monotone cubic for filling short data gaps
//! - **Statistics**: mean/std over slices, median and MAD for robust spread
//! - **Clustering**: deterministic two-means on 2D positions
//! - **Decimation**: integer-factor subsampling and masked smoothing
//!
//! ## Example
//!
//! ```ignore
//! use sonaion_signals::{steffen_interpolate, two_means};
//!
//! let filled = steffen_interpolate(&[0.0, 1.0, 4.0, 5.0], &[0.0, 1.0, 4.0, 5.0], &[2.0, 3.0])?;
//!
//! let points = [[0.0, 0.0], [0.1, 0.0], [9.9, 0.0], [10.0, 0.0]];
//! let clustering = two_means(&points, 100)?;
//! assert_eq!(clustering.switches(), vec![1]);
//! ```

pub mod cluster;
pub mod decimate;
pub mod error;
pub mod interp;
pub mod stats;

pub use cluster::{two_means, ClusterError, TwoMeans};
pub use decimate::{decimate, decimate_mask, masked_moving_average};
pub use error::SignalError;
pub use interp::steffen_interpolate;
pub use stats::{mad, mean, median, std_dev};
