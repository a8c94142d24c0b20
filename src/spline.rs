//! A small natural cubic spline fit, `y = s(x)`, over points with strictly
//! increasing `x`. Second derivative is zero at both endpoints (the
//! "natural" boundary condition), giving C² smoothness everywhere in
//! between.
//!
//! The teacher repo reaches for small, directly-owned numerical routines
//! (e.g. `klucb.rs`'s bisection search) rather than a heavyweight dependency
//! for a single closed-form computation; this solver follows that lead
//! instead of pulling in a general-purpose spline crate.

#[derive(Debug)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// second derivatives at each knot
    m: Vec<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SplineError {
    #[error("spline needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("spline x values must be strictly increasing, found {prev} then {next} at index {index}")]
    NonMonotoneX { index: usize, prev: f64, next: f64 },
}

impl NaturalCubicSpline {
    /// Fit a natural cubic spline through `points`, which must have
    /// strictly increasing `x` values and at least 2 points.
    pub fn fit(points: &[(f64, f64)]) -> Result<Self, SplineError> {
        let n = points.len();
        if n < 2 {
            return Err(SplineError::TooFewPoints(n));
        }
        for i in 1..n {
            if points[i].0 <= points[i - 1].0 {
                return Err(SplineError::NonMonotoneX {
                    index: i,
                    prev: points[i - 1].0,
                    next: points[i].0,
                });
            }
        }

        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let m = solve_natural_second_derivatives(&xs, &ys);

        Ok(Self { xs, ys, m })
    }

    /// Evaluate the spline at `x`. Behavior outside `[x_min, x_max]` linearly
    /// extrapolates from the nearest boundary segment's cubic, which is
    /// acceptable here because every caller in this crate only evaluates
    /// inside the fitted span.
    pub fn evaluate(&self, x: f64) -> f64 {
        let i = segment_index(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];

        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a.powi(3) - a) * self.m[i] + (b.powi(3) - b) * self.m[i + 1]) * (h * h) / 6.0
    }
}

/// Index of the segment `[xs[i], xs[i+1]]` containing `x`, clamped to the
/// valid range of segments.
fn segment_index(xs: &[f64], x: f64) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // linear walk mirrors the ascending scan used for Frenet -> Cartesian
    let mut i = 0;
    while i + 1 < n - 1 && xs[i + 1] < x {
        i += 1;
    }
    i
}

/// Solve the tridiagonal system for natural-boundary second derivatives at
/// each knot (textbook natural cubic spline algorithm).
fn solve_natural_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut h = vec![0.0; n - 1];
    for i in 0..n - 1 {
        h[i] = xs[i + 1] - xs[i];
    }

    let mut alpha = vec![0.0; n];
    for i in 1..n - 1 {
        alpha[i] = 3.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    let mut l = vec![1.0; n];
    let mut mu = vec![0.0; n];
    let mut z = vec![0.0; n];

    for i in 1..n - 1 {
        l[i] = 2.0 * (xs[i + 1] - xs[i - 1]) - h[i - 1] * mu[i - 1];
        mu[i] = h[i] / l[i];
        z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
    }

    let mut m = vec![0.0; n];
    for i in (0..n - 1).rev() {
        m[i] = z[i] - mu[i] * m[i + 1];
    }
    m
}
