//! # sonaion-fixation
//!
//! Fixation detection for eye-tracking recordings by multi-scale two-means
//! clustering.
//!
//! This crate provides:
//! - **Input**: columnar gaze tables with left/right/average channels
//! - **Gap filling**: Steffen interpolation of short tracker dropouts
//! - **Scoring**: windowed two-means transition votes over several scales
//! - **Events**: candidate extraction, onset/offset refinement, merging
//!   and duration filtering into chronological fixations
//!
//! ## Example
//!
//! ```ignore
//! use sonaion_fixation::{FixationDetector, GazeTable, Options};
//!
//! let options = Options::with_defaults(1920.0, 1080.0, 300.0);
//! let table = GazeTable::new(time).with_left(lx, ly).with_right(rx, ry);
//!
//! let detection = FixationDetector::new(options)?.detect(&table)?;
//! for row in detection.to_table().rows {
//!     println!("{:.1},{:.1} from {} to {} ms", row.x, row.y, row.start_t, row.end_t);
//! }
//! ```

pub mod candidates;
pub mod combine;
pub mod config;
pub mod detector;
pub mod downsample;
pub mod error;
pub mod fixation;
pub mod gaze;
pub mod interpolate;
pub mod merge;
pub mod refine;
pub mod weighting;

pub use candidates::{Candidate, CandidateSet, FixationCandidateExtractor};
pub use combine::{ChannelCombiner, ChannelSource, CombinedTrace};
pub use config::{ConfigError, Options};
pub use detector::{detect_fixations, Detection, FixationDetector};
pub use downsample::{MultiScaleDownsampler, Scale};
pub use error::FixationError;
pub use fixation::{DurationFilter, Fixation, FixationRow, FixationTable, ResultBuilder};
pub use gaze::{ChannelSet, EyeColumns, GazeSample, GazeTable, Trace};
pub use interpolate::{GapInterpolator, Interpolated, InterpolationReport};
pub use merge::Merger;
pub use refine::{BoundaryRefiner, RefineInput};
pub use weighting::{ClusterWeights, RunContext, TwoMeansClassifier};

#[cfg(test)]
pub mod tests_config;
#[cfg(test)]
pub mod tests_proptest;
