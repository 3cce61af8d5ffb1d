//! Interpolation for filling short gaps in sampled signals.

mod steffen;

pub use steffen::steffen_interpolate;
