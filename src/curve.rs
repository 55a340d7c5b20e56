//! Piecewise-linear response curves.
//!
//! The motor scales its ground speed by the angle of travel through a
//! [`SpeedCurve`]. Negative angles describe downhill movement.

use serde::{Deserialize, Serialize};

/// A single `(input, output)` sample of a [`SpeedCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Input value, in degrees for slope curves.
    pub at: f32,
    /// Output multiplier at `at`.
    pub value: f32,
}

impl Keyframe {
    /// Creates a keyframe.
    #[must_use]
    pub const fn new(at: f32, value: f32) -> Self {
        Self { at, value }
    }
}

/// Maps a slope angle in degrees to a speed multiplier.
///
/// Keys must be sorted by [`Keyframe::at`]. Inputs outside the key range
/// clamp to the first or last value.
///
/// # Examples
///
/// ```
/// use character_motor::curve::SpeedCurve;
/// let curve = SpeedCurve::default();
/// assert_eq!(curve.evaluate(-30.0), 1.0);
/// assert_eq!(curve.evaluate(45.0), 0.5);
/// assert_eq!(curve.evaluate(120.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedCurve {
    keys: Vec<Keyframe>,
}

impl SpeedCurve {
    /// Builds a curve from keyframes sorted by angle.
    #[must_use]
    pub const fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// A curve that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![Keyframe::new(0.0, value)])
    }

    /// The keyframes backing this curve.
    #[must_use]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Returns `true` when the keys are present, finite and sorted.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.keys.is_empty()
            && self
                .keys
                .iter()
                .all(|k| k.at.is_finite() && k.value.is_finite())
            && self.keys.windows(2).all(|pair| match pair {
                [a, b] => a.at < b.at,
                _ => true,
            })
    }

    /// Samples the curve at `at`. An empty curve evaluates to `1.0`.
    #[must_use]
    pub fn evaluate(&self, at: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 1.0;
        };
        if at <= first.at {
            return first.value;
        }
        if at >= last.at {
            return last.value;
        }
        self.keys
            .windows(2)
            .find_map(|pair| match pair {
                [a, b] if at >= a.at && at <= b.at => {
                    let span = b.at - a.at;
                    let t = if span > 0.0 { (at - a.at) / span } else { 0.0 };
                    Some(a.value + (b.value - a.value) * t)
                }
                _ => None,
            })
            .unwrap_or(last.value)
    }
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self::new(vec![
            Keyframe::new(-90.0, 1.0),
            Keyframe::new(0.0, 1.0),
            Keyframe::new(90.0, 0.0),
        ])
    }
}
