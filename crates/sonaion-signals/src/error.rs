use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("need at least {required} knots, got {got}")]
    TooFewKnots { required: usize, got: usize },
    #[error("knot abscissae must be strictly increasing (violated at index {index})")]
    NonIncreasingKnots { index: usize },
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}
