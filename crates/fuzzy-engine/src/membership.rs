//! Membership Functions

use serde::{Deserialize, Serialize};

/// Piecewise-linear membership curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MembershipFunction {
    /// Triangle with feet at `a`, `c` and peak at `b`
    Triangular { a: f64, b: f64, c: f64 },
    /// Trapezoid with feet at `a`, `d` and plateau on `[b, c]`
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
}

impl MembershipFunction {
    /// Shorthand for a triangular function
    pub fn triangular(a: f64, b: f64, c: f64) -> Self {
        debug_assert!(a <= b && b <= c, "triangle points must be ordered");
        Self::Triangular { a, b, c }
    }

    /// Shorthand for a trapezoidal function
    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Self {
        debug_assert!(a <= b && b <= c && c <= d, "trapezoid points must be ordered");
        Self::Trapezoidal { a, b, c, d }
    }

    /// Degree of membership of `x`, in [0, 1]
    pub fn membership(&self, x: f64) -> f64 {
        match *self {
            MembershipFunction::Triangular { a, b, c } => trapezoid(x, a, b, b, c),
            MembershipFunction::Trapezoidal { a, b, c, d } => trapezoid(x, a, b, c, d),
        }
    }

    /// Interval where membership is non-zero (closed at shoulders)
    pub fn support(&self) -> (f64, f64) {
        match *self {
            MembershipFunction::Triangular { a, c, .. } => (a, c),
            MembershipFunction::Trapezoidal { a, d, .. } => (a, d),
        }
    }
}

// Shoulders (a == b or c == d) hold the value 1 up to and including the edge.
fn trapezoid(x: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    if x < a || x > d {
        0.0
    } else if x >= b && x <= c {
        1.0
    } else if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    }
}
