use sonaion_signals::SignalError;
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal failures of a detection run. No partial fixation list is ever
/// returned alongside one of these.
#[derive(Error, Debug)]
pub enum FixationError {
    #[error("invalid gaze input: {0}")]
    Input(String),
    #[error("no eye channel contains any valid gaze sample")]
    InsufficientData,
    #[error("two-means clustering did not converge in {skipped} windows (budget {budget})")]
    ClusteringNonConvergence { skipped: usize, budget: usize },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("signal processing error: {0}")]
    Signal(#[from] SignalError),
}
