/// Interpolation scheme of a [`Spline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineKind {
    /// Natural cubic spline: C2-continuous, zero second derivative at both ends.
    NaturalCubic,
    /// Piecewise linear interpolation between knots.
    Linear,
}

/// A 1-D interpolant over strictly increasing knots.
///
/// On each interval `[k_i, k_{i+1})` the value is
/// `((a_i * h + b_i) * h + c_i) * h + v_i` with `h = t - k_i`. Outside the
/// knot range the spline continues linearly with the slope of the end
/// segment, so evaluation is total.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    knots: Vec<f64>,
    values: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
}

impl Spline {
    /// Builds a spline through `(knots[i], values[i])`.
    ///
    /// Returns `None` when fewer than two knots are given, the slices differ
    /// in length, a knot is not finite, or the knots are not strictly
    /// increasing.
    #[must_use]
    pub fn new(knots: &[f64], values: &[f64], kind: SplineKind) -> Option<Self> {
        let n = knots.len();
        if n < 2 || values.len() != n {
            return None;
        }
        if knots.iter().any(|k| !k.is_finite()) || knots.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }

        let (a, b, c) = match kind {
            SplineKind::NaturalCubic if n > 2 => natural_cubic_coefficients(knots, values),
            _ => linear_coefficients(knots, values),
        };

        Some(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            a,
            b,
            c,
        })
    }

    /// Returns the knot positions.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Evaluates the spline at `t`.
    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.knots.len();
        let first = self.knots[0];
        let last = self.knots[n - 1];

        if t < first {
            // Linear continuation; b[0] is zero for both schemes.
            let h = t - first;
            return (self.b[0] * h + self.c[0]) * h + self.values[0];
        }
        if t > last {
            let h = t - last;
            return (self.b[n - 1] * h + self.c[n - 1]) * h + self.values[n - 1];
        }

        let idx = self.knots.partition_point(|&k| k <= t).saturating_sub(1);
        let h = t - self.knots[idx];
        ((self.a[idx] * h + self.b[idx]) * h + self.c[idx]) * h + self.values[idx]
    }
}

type Coefficients = (Vec<f64>, Vec<f64>, Vec<f64>);

fn linear_coefficients(knots: &[f64], values: &[f64]) -> Coefficients {
    let n = knots.len();
    let mut c = vec![0.0; n];
    for i in 0..n - 1 {
        c[i] = (values[i + 1] - values[i]) / (knots[i + 1] - knots[i]);
    }
    c[n - 1] = c[n - 2];
    (vec![0.0; n], vec![0.0; n], c)
}

fn natural_cubic_coefficients(knots: &[f64], values: &[f64]) -> Coefficients {
    let n = knots.len();

    // Tridiagonal system for b (half the second derivative). Rows 0 and
    // n-1 pin the natural boundary condition b = 0.
    let mut lower = vec![0.0; n];
    let mut diag = vec![1.0; n];
    let mut upper = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    for i in 1..n - 1 {
        let h_prev = knots[i] - knots[i - 1];
        let h_next = knots[i + 1] - knots[i];
        lower[i] = h_prev / 3.0;
        diag[i] = 2.0 * (h_prev + h_next) / 3.0;
        upper[i] = h_next / 3.0;
        rhs[i] =
            (values[i + 1] - values[i]) / h_next - (values[i] - values[i - 1]) / h_prev;
    }
    let b = solve_tridiagonal(&lower, &diag, &upper, &rhs);

    let mut a = vec![0.0; n];
    let mut c = vec![0.0; n];
    for i in 0..n - 1 {
        let h = knots[i + 1] - knots[i];
        a[i] = (b[i + 1] - b[i]) / (3.0 * h);
        c[i] = (values[i + 1] - values[i]) / h - (2.0 * b[i] + b[i + 1]) * h / 3.0;
    }

    // Slope at the last knot, used for right-hand extrapolation.
    let h = knots[n - 1] - knots[n - 2];
    c[n - 1] = 3.0 * a[n - 2] * h * h + 2.0 * b[n - 2] * h + c[n - 2];
    (a, b, c)
}

/// Thomas algorithm. The system is diagonally dominant for increasing knots,
/// so no pivoting is needed.
fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    c_prime[0] = upper[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - lower[i] * c_prime[i - 1];
        c_prime[i] = upper[i] / denom;
        d_prime[i] = (rhs[i] - lower[i] * d_prime[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    x
}
