// Frame-to-frame exponential smoothing of landmark sets to suppress detector jitter.

use crate::types::HandLandmark;

/// Per-hand-slot EMA filter over a full landmark set.
///
/// State survives the hand leaving and re-entering the frame; it is reseeded
/// only when the landmark count changes (detector restart). A non-finite
/// reading passes through for its own frame but never enters the stored state.
#[derive(Debug, Clone)]
pub struct LandmarkSmoother {
    alpha: f32,
    previous: Option<Vec<HandLandmark>>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f32) -> Self {
        LandmarkSmoother {
            alpha,
            previous: None,
        }
    }

    /// Last smoothed output, if any frame has been seen.
    pub fn previous(&self) -> Option<&[HandLandmark]> {
        self.previous.as_deref()
    }

    /// Smooth one observation and remember it for the next frame.
    pub fn smooth(&mut self, raw: &[HandLandmark]) -> Vec<HandLandmark> {
        let smoothed = smooth_landmarks(raw, self.previous.as_deref(), self.alpha);
        let state = match self.previous.as_deref() {
            Some(prev) if prev.len() == smoothed.len() => smoothed
                .iter()
                .zip(prev)
                .map(|(out, prev)| HandLandmark {
                    x: finite_or(out.x, prev.x),
                    y: finite_or(out.y, prev.y),
                    z: finite_or(out.z, prev.z),
                })
                .collect(),
            _ => smoothed.clone(),
        };
        self.previous = Some(state);
        smoothed
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// `alpha * raw + (1 - alpha) * previous` per axis.
/// A missing or differently-sized `previous` seeds the filter with `raw`;
/// a non-finite previous axis is reseeded from `raw` alone.
pub fn smooth_landmarks(
    raw: &[HandLandmark],
    previous: Option<&[HandLandmark]>,
    alpha: f32,
) -> Vec<HandLandmark> {
    let previous = match previous {
        Some(prev) if prev.len() == raw.len() => prev,
        _ => return raw.to_vec(),
    };

    raw.iter()
        .zip(previous)
        .map(|(lm, prev)| HandLandmark {
            x: blend(lm.x, prev.x, alpha),
            y: blend(lm.y, prev.y, alpha),
            z: blend(lm.z, prev.z, alpha),
        })
        .collect()
}

fn blend(raw: f32, previous: f32, alpha: f32) -> f32 {
    if previous.is_finite() {
        alpha * raw + (1.0 - alpha) * previous
    } else {
        raw
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hand_at(x: f32, y: f32) -> Vec<HandLandmark> {
        vec![HandLandmark::new(x, y, 0.0); 21]
    }

    #[test]
    fn first_observation_is_unsmoothed() {
        let mut smoother = LandmarkSmoother::new(0.4);
        let out = smoother.smooth(&hand_at(0.3, 0.6));
        assert_eq!(out, hand_at(0.3, 0.6));
    }

    #[test]
    fn second_observation_blends() {
        let mut smoother = LandmarkSmoother::new(0.4);
        smoother.smooth(&hand_at(0.0, 0.0));
        let out = smoother.smooth(&hand_at(1.0, 0.5));
        assert!((out[0].x - 0.4).abs() < 1e-6);
        assert!((out[0].y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn length_change_reseeds() {
        let mut smoother = LandmarkSmoother::new(0.4);
        smoother.smooth(&hand_at(0.0, 0.0));
        let shorter = vec![HandLandmark::new(0.9, 0.9, 0.0); 5];
        let out = smoother.smooth(&shorter);
        assert_eq!(out, shorter);
        assert_eq!(smoother.previous().map(|p| p.len()), Some(5));
    }

    #[test]
    fn reset_forgets_history() {
        let mut smoother = LandmarkSmoother::new(0.4);
        smoother.smooth(&hand_at(0.0, 0.0));
        smoother.reset();
        assert!(smoother.previous().is_none());
        assert_eq!(smoother.smooth(&hand_at(0.7, 0.7)), hand_at(0.7, 0.7));
    }

    #[test]
    fn non_finite_reading_is_not_remembered() {
        let mut smoother = LandmarkSmoother::new(0.4);
        smoother.smooth(&hand_at(0.5, 0.5));

        let mut glitch = hand_at(0.5, 0.5);
        glitch[4].x = f32::NAN;
        let out = smoother.smooth(&glitch);
        assert!(out[4].x.is_nan());
        assert_eq!(smoother.previous().unwrap()[4].x, 0.5);

        let out = smoother.smooth(&hand_at(1.0, 0.5));
        assert!((out[4].x - 0.7).abs() < 1e-6);
    }

    #[test]
    fn non_finite_seed_recovers_on_next_reading() {
        let mut smoother = LandmarkSmoother::new(0.4);
        let mut glitch = hand_at(0.5, 0.5);
        glitch[4].x = f32::NAN;
        smoother.smooth(&glitch);

        let out = smoother.smooth(&hand_at(0.2, 0.5));
        assert_eq!(out[4].x, 0.2);
        assert!((out[0].x - 0.38).abs() < 1e-6);
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn constant_input_converges(
                start_x in 0.0f32..=1.0,
                start_y in 0.0f32..=1.0,
                target_x in 0.0f32..=1.0,
                target_y in 0.0f32..=1.0,
            ) {
                let mut smoother = LandmarkSmoother::new(0.4);
                smoother.smooth(&hand_at(start_x, start_y));
                let target = hand_at(target_x, target_y);
                for _ in 0..60 {
                    smoother.smooth(&target);
                }
                let settled = smoother.previous().unwrap();
                for lm in settled {
                    prop_assert!((lm.x - target_x).abs() < 1e-4);
                    prop_assert!((lm.y - target_y).abs() < 1e-4);
                }
            }

            #[test]
            fn output_stays_between_previous_and_raw(
                prev in 0.0f32..=1.0,
                raw in 0.0f32..=1.0,
            ) {
                let out = smooth_landmarks(&hand_at(raw, raw), Some(&hand_at(prev, prev)), 0.4);
                let (lo, hi) = if prev <= raw { (prev, raw) } else { (raw, prev) };
                prop_assert!(out[0].x >= lo - 1e-6 && out[0].x <= hi + 1e-6);
            }
        }
    }
}
