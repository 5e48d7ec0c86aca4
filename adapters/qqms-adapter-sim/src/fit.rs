//! Weighted log-linear fit of an exponential decay.
//!
//! The decay `A(t) = A0 * exp(-t / T)` becomes the straight line
//! `ln A = ln A0 - t / T`. Each sample is weighted by the inverse variance of
//! `ln A`, propagated from the binomial variance of the measured amplitude.

/// One sampled point of a decay curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayPoint {
    /// Delay in seconds.
    pub delay: f64,
    /// Measured decay amplitude.
    pub amplitude: f64,
    /// Variance of `amplitude`.
    pub variance: f64,
}

/// Result of a decay fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayFit {
    /// Time constant in seconds.
    pub tau: f64,
    /// One-sigma uncertainty of `tau`.
    pub std_dev: f64,
    /// Reduced chi-squared, when there are more points than parameters.
    pub reduced_chisq: Option<f64>,
    /// Points that entered the fit.
    pub points_used: usize,
}

/// Fit `points` to an exponential decay.
///
/// Points with non-positive amplitude or non-positive variance carry no
/// information on the log scale and are skipped. Returns `None` when fewer
/// than two usable points remain, when all usable delays coincide, or when
/// the fitted slope does not describe a decay.
pub fn fit_exponential_decay(points: &[DecayPoint]) -> Option<DecayFit> {
    // (x, y, w) with y = ln A and w = A^2 / var(A)
    let samples: Vec<(f64, f64, f64)> = points
        .iter()
        .filter(|p| p.amplitude > 0.0 && p.variance > 0.0 && p.delay.is_finite())
        .map(|p| {
            (
                p.delay,
                p.amplitude.ln(),
                p.amplitude * p.amplitude / p.variance,
            )
        })
        .filter(|(_, y, w)| y.is_finite() && w.is_finite())
        .collect();

    if samples.len() < 2 {
        return None;
    }

    let (mut s, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y, w) in &samples {
        s += w;
        sx += w * x;
        sy += w * y;
        sxx += w * x * x;
        sxy += w * x * y;
    }

    // Relative threshold: coincident delays leave only rounding noise in delta.
    let delta = s * sxx - sx * sx;
    if delta.is_nan() || delta <= 1e-12 * s * sxx {
        return None;
    }

    let slope = (s * sxy - sx * sy) / delta;
    let intercept = (sxx * sy - sx * sxy) / delta;
    if !slope.is_finite() || slope >= 0.0 {
        return None;
    }
    let slope_var = s / delta;

    let tau = -1.0 / slope;
    let std_dev = slope_var.sqrt() / (slope * slope);

    let dof = samples.len().saturating_sub(2);
    let reduced_chisq = (dof > 0).then(|| {
        let chisq: f64 = samples
            .iter()
            .map(|&(x, y, w)| {
                let r = y - intercept - slope * x;
                w * r * r
            })
            .sum();
        chisq / dof as f64
    });

    (tau.is_finite() && std_dev.is_finite()).then_some(DecayFit {
        tau,
        std_dev,
        reduced_chisq,
        points_used: samples.len(),
    })
}
