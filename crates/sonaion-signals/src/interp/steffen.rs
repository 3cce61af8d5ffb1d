//! Steffen monotone cubic interpolation
//!
//! Piecewise cubic Hermite interpolation whose knot derivatives are limited
//! so the interpolant never overshoots the data between knots
//! (M. Steffen, "A simple method for monotonic interpolation in one
//! dimension", A&A 239, 1990).
//!
//! Straight-line data is reproduced exactly, which is what makes gap
//! filling in a smoothly moving gaze trace recover the true positions.

use crate::error::SignalError;

/// Sign with `sign(0) == 0`, unlike `f64::signum`.
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Steffen's limited derivative at an end knot.
///
/// `s_near`/`h_near` describe the interval touching the end knot,
/// `s_far`/`h_far` the next one inward.
fn end_derivative(s_near: f64, s_far: f64, h_near: f64, h_far: f64) -> f64 {
    let r = h_near / (h_near + h_far);
    let p = s_near * (1.0 + r) - s_far * r;
    if p * s_near <= 0.0 {
        0.0
    } else if p.abs() > 2.0 * s_near.abs() {
        2.0 * s_near
    } else {
        p
    }
}

/// Knot derivatives for the Hermite segments.
fn derivatives(h: &[f64], s: &[f64]) -> Vec<f64> {
    let n = h.len() + 1;
    let mut yp = vec![0.0; n];

    if n == 2 {
        yp[0] = s[0];
        yp[1] = s[0];
        return yp;
    }

    for i in 1..n - 1 {
        let p = (s[i - 1] * h[i] + s[i] * h[i - 1]) / (h[i - 1] + h[i]);
        yp[i] = (sign(s[i - 1]) + sign(s[i]))
            * s[i - 1].abs().min(s[i].abs()).min(0.5 * p.abs());
    }

    yp[0] = end_derivative(s[0], s[1], h[0], h[1]);
    yp[n - 1] = end_derivative(s[n - 2], s[n - 3], h[n - 2], h[n - 3]);
    yp
}

/// Interpolate `(xk, yk)` at the query abscissae `xq`.
///
/// `xk` must be strictly increasing with at least two knots. Queries
/// outside the knot span are extrapolated with the end segment's cubic.
pub fn steffen_interpolate(xk: &[f64], yk: &[f64], xq: &[f64]) -> Result<Vec<f64>, SignalError> {
    if xk.len() != yk.len() {
        return Err(SignalError::LengthMismatch {
            left: xk.len(),
            right: yk.len(),
        });
    }
    if xk.len() < 2 {
        return Err(SignalError::TooFewKnots {
            required: 2,
            got: xk.len(),
        });
    }
    if let Some(index) = xk.windows(2).position(|w| !(w[1] > w[0])) {
        return Err(SignalError::NonIncreasingKnots { index: index + 1 });
    }

    let h: Vec<f64> = xk.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<f64> = yk
        .windows(2)
        .zip(h.iter())
        .map(|(w, &hi)| (w[1] - w[0]) / hi)
        .collect();
    let yp = derivatives(&h, &s);

    let last_segment = xk.len() - 2;
    let values = xq
        .iter()
        .map(|&x| {
            // Segment k satisfies xk[k] <= x < xk[k + 1], clamped to the ends.
            let k = xk
                .partition_point(|&knot| knot <= x)
                .saturating_sub(1)
                .min(last_segment);
            let hk = h[k];
            let a = (yp[k] + yp[k + 1] - 2.0 * s[k]) / (hk * hk);
            let b = (3.0 * s[k] - 2.0 * yp[k] - yp[k + 1]) / hk;
            let t = x - xk[k];
            ((a * t + b) * t + yp[k]) * t + yk[k]
        })
        .collect();

    Ok(values)
}
