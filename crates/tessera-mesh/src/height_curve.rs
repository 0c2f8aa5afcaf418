//! Piecewise-linear remapping of normalised height samples.

/// Errors returned when building a [`HeightCurve`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeightCurveError {
    /// No keyframes were supplied.
    #[error("height curve needs at least one keyframe")]
    Empty,

    /// Keyframe inputs must be strictly increasing.
    #[error("height curve keyframe {index} at t={t} does not increase")]
    NotIncreasing {
        /// Offending keyframe index.
        index: usize,
        /// Its input value.
        t: f32,
    },

    /// Keyframes must be finite numbers.
    #[error("height curve keyframe {index} is not finite")]
    NonFinite {
        /// Offending keyframe index.
        index: usize,
    },
}

/// Maps a sample in `[0, 1]` to an output height factor.
///
/// Between keyframes the curve interpolates linearly; outside the keyed range
/// it holds the first/last value. Evaluation is read-only, so one curve can be
/// shared by every meshing worker.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
}

impl HeightCurve {
    /// Build a curve from `(t, value)` keyframes sorted by `t`.
    pub fn new(keys: Vec<(f32, f32)>) -> Result<Self, HeightCurveError> {
        if keys.is_empty() {
            return Err(HeightCurveError::Empty);
        }
        if let Some(index) = keys.iter().position(|(t, v)| !t.is_finite() || !v.is_finite()) {
            return Err(HeightCurveError::NonFinite { index });
        }
        for (index, pair) in keys.windows(2).enumerate() {
            if pair[1].0 <= pair[0].0 {
                return Err(HeightCurveError::NotIncreasing {
                    index: index + 1,
                    t: pair[1].0,
                });
            }
        }
        Ok(Self { keys })
    }

    /// The identity curve over `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        if t <= first.0 {
            return first.1;
        }
        let last = self.keys[self.keys.len() - 1];
        if t >= last.0 {
            return last.1;
        }
        // First keyframe strictly past t; keys are sorted and t is inside the range.
        let upper = self.keys.partition_point(|&(kt, _)| kt <= t);
        let (t0, v0) = self.keys[upper - 1];
        let (t1, v1) = self.keys[upper];
        let w = (t - t0) / (t1 - t0);
        v0 + (v1 - v0) * w
    }

    /// Keyframes as supplied.
    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_linear_is_identity() {
        let curve = HeightCurve::linear();
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((curve.evaluate(t) - t).abs() < EPSILON);
        }
    }

    #[test]
    fn test_interpolates_between_keys() {
        let curve = HeightCurve::new(vec![(0.0, 0.0), (0.5, 0.1), (1.0, 1.0)]).unwrap();
        assert!((curve.evaluate(0.25) - 0.05).abs() < EPSILON);
        assert!((curve.evaluate(0.5) - 0.1).abs() < EPSILON);
        assert!((curve.evaluate(0.75) - 0.55).abs() < EPSILON);
    }

    #[test]
    fn test_clamps_outside_range() {
        let curve = HeightCurve::new(vec![(0.2, 0.3), (0.8, 0.9)]).unwrap();
        assert_eq!(curve.evaluate(-1.0), 0.3);
        assert_eq!(curve.evaluate(0.0), 0.3);
        assert_eq!(curve.evaluate(2.0), 0.9);
    }

    #[test]
    fn test_single_key_is_constant() {
        let curve = HeightCurve::new(vec![(0.5, 0.7)]).unwrap();
        assert_eq!(curve.evaluate(0.0), 0.7);
        assert_eq!(curve.evaluate(1.0), 0.7);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(HeightCurve::new(vec![]), Err(HeightCurveError::Empty));
    }

    #[test]
    fn test_rejects_unsorted_keys() {
        let err = HeightCurve::new(vec![(0.0, 0.0), (0.6, 0.5), (0.6, 1.0)]).unwrap_err();
        assert_eq!(err, HeightCurveError::NotIncreasing { index: 2, t: 0.6 });
    }

    #[test]
    fn test_rejects_non_finite_keys() {
        assert_eq!(
            HeightCurve::new(vec![(0.0, 0.0), (f32::NAN, 0.5), (1.0, 1.0)]),
            Err(HeightCurveError::NonFinite { index: 1 })
        );
        assert_eq!(
            HeightCurve::new(vec![(0.0, 0.0), (1.0, f32::INFINITY)]),
            Err(HeightCurveError::NonFinite { index: 1 })
        );
        assert_eq!(
            HeightCurve::new(vec![(f32::NEG_INFINITY, 0.0)]),
            Err(HeightCurveError::NonFinite { index: 0 })
        );
    }
}
