// Discrete gesture classification from a smoothed landmark set.
// Pinch is judged in canvas pixels, fist in normalized landmark space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::coords::{landmark_to_screen, VideoViewportParams};
use crate::landmarks::{FINGER_TIP_MCP, INDEX_TIP, THUMB_TIP};
use crate::types::{CanvasSize, HandLandmark};

/// Tip-to-MCP distance (normalized units) below which a finger counts as curled.
pub const CURL_THRESHOLD: f32 = 0.08;

/// Curled fingers (of four) needed for a fist.
pub const FIST_MIN_CURLED: usize = 3;

/// Result of a pinch check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchState {
    pub is_pinching: bool,
    /// Midpoint of the projected tips; only present while pinching.
    pub pinch_point: Option<Vec2>,
    /// Tip separation in canvas pixels.
    pub distance: f32,
}

/// Look up a landmark, treating out-of-range and non-finite entries as missing.
fn landmark_at(landmarks: &[HandLandmark], index: usize) -> Option<&HandLandmark> {
    landmarks
        .get(index)
        .filter(|lm| lm.x.is_finite() && lm.y.is_finite())
}

/// Detect a thumb/index pinch. `None` when either tip is missing.
pub fn detect_pinch(
    landmarks: &[HandLandmark],
    viewport: &VideoViewportParams,
    canvas: CanvasSize,
    threshold: f32,
) -> Option<PinchState> {
    let thumb = landmark_at(landmarks, THUMB_TIP)?;
    let index = landmark_at(landmarks, INDEX_TIP)?;

    let thumb_screen = landmark_to_screen(thumb, viewport, canvas);
    let index_screen = landmark_to_screen(index, viewport, canvas);
    let distance = thumb_screen.distance(index_screen);

    if distance < threshold {
        Some(PinchState {
            is_pinching: true,
            pinch_point: Some((thumb_screen + index_screen) / 2.0),
            distance,
        })
    } else {
        Some(PinchState {
            is_pinching: false,
            pinch_point: None,
            distance,
        })
    }
}

/// Count of non-thumb fingers whose tip sits near its MCP joint.
pub fn curled_finger_count(landmarks: &[HandLandmark]) -> usize {
    FINGER_TIP_MCP
        .iter()
        .filter(|&&(tip, mcp)| {
            match (landmark_at(landmarks, tip), landmark_at(landmarks, mcp)) {
                (Some(tip), Some(mcp)) => tip.planar_distance(mcp) < CURL_THRESHOLD,
                _ => false,
            }
        })
        .count()
}

/// Fist when at least three of the four non-thumb fingers are curled.
pub fn detect_fist(landmarks: &[HandLandmark]) -> bool {
    curled_finger_count(landmarks) >= FIST_MIN_CURLED
}
