//! Defuzzification

use crate::FuzzyError;

/// Centroid of the piecewise-linear curve through `(xs[i], mus[i])`.
///
/// Each segment is integrated exactly as a trapezoid, so the result does not
/// depend on sampling density once the curve's breakpoints are sampled.
/// `xs` must be ascending. Fails with [`FuzzyError::NoActivation`] when the
/// curve has zero area.
pub fn centroid(xs: &[f64], mus: &[f64]) -> Result<f64, FuzzyError> {
    debug_assert_eq!(xs.len(), mus.len());

    if xs.len() == 1 {
        return if mus[0] > 0.0 { Ok(xs[0]) } else { Err(FuzzyError::NoActivation) };
    }

    let mut moment = 0.0;
    let mut area = 0.0;

    for (x, y) in xs.windows(2).zip(mus.windows(2)) {
        let (x1, x2) = (x[0], x[1]);
        let (y1, y2) = (y[0], y[1]);
        let width = x2 - x1;

        if width <= 0.0 || (y1 == 0.0 && y2 == 0.0) {
            continue;
        }

        let segment_area = 0.5 * width * (y1 + y2);
        let segment_centroid = x1 + width * (y1 + 2.0 * y2) / (3.0 * (y1 + y2));

        moment += segment_centroid * segment_area;
        area += segment_area;
    }

    if area <= f64::EPSILON {
        return Err(FuzzyError::NoActivation);
    }

    Ok(moment / area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_centroid() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mus = [0.5; 5];
        assert!((centroid(&xs, &mus).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_centroid() {
        // Right triangle with the vertical edge at x = 0
        let xs = [0.0, 1.5, 3.0];
        let mus = [1.0, 0.5, 0.0];
        assert!((centroid(&xs, &mus).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_triangle() {
        let xs = [2.0, 3.5, 5.0, 6.5, 8.0];
        let mus = [0.0, 0.5, 1.0, 0.5, 0.0];
        assert!((centroid(&xs, &mus).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area() {
        let xs = [0.0, 1.0, 2.0];
        assert_eq!(centroid(&xs, &[0.0; 3]), Err(FuzzyError::NoActivation));
    }
}
