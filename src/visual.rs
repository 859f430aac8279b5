// Hand overlay geometry handed to the rendering layer: bone segments and marker circles
// in canvas coordinates, plus the emphasis state used while a hand is interacting.

use glam::Vec2;
use serde::Serialize;

use crate::coords::{is_on_screen, landmark_to_screen, VideoViewportParams};
use crate::landmarks::{HAND_CONNECTIONS, MARKER_LANDMARKS, WRIST};
use crate::types::{CanvasSize, EngineConfig, HandLandmark, InteractionSettings};

/// Circle drawn at a wrist or fingertip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub landmark: usize,
    pub center: Vec2,
    pub radius: f32,
    /// Pulse multiplier applied on top of `radius`.
    pub scale: f32,
}

/// Everything the renderer needs to draw one hand.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct HandVisual {
    pub visible: bool,
    pub segments: Vec<[Vec2; 2]>,
    pub markers: Vec<Marker>,
    /// Hand is driving the active grab or scale session.
    pub active: bool,
    pub opacity: f32,
    pub color: &'static str,
}

impl HandVisual {
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Per-frame emphasis for one hand: whether it is engaged, its tint and the pulse clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandEmphasis {
    pub active: bool,
    pub color: &'static str,
    pub elapsed_secs: f64,
}

/// Marker pulse multiplier at `elapsed_secs`; constant when not interacting.
pub fn pulse_scale(active: bool, elapsed_secs: f64, settings: &InteractionSettings) -> f32 {
    if !active {
        return settings.pulse_base_scale;
    }
    let phase = (elapsed_secs as f32 * settings.pulse_speed).sin();
    settings.pulse_base_scale + (1.0 + phase) / 2.0 * settings.pulse_amplitude
}

/// Build overlay geometry for a hand. Hidden when any landmark lies in the cropped margin.
pub fn build_hand_visual(
    landmarks: &[HandLandmark],
    viewport: &VideoViewportParams,
    canvas: CanvasSize,
    emphasis: HandEmphasis,
    config: &EngineConfig,
) -> HandVisual {
    if landmarks.is_empty() || !landmarks.iter().all(|lm| is_on_screen(lm, viewport)) {
        return HandVisual::hidden();
    }

    let points: Vec<Vec2> = landmarks
        .iter()
        .map(|lm| landmark_to_screen(lm, viewport, canvas))
        .collect();

    let segments = HAND_CONNECTIONS
        .iter()
        .filter_map(|&(a, b)| Some([*points.get(a)?, *points.get(b)?]))
        .collect();

    let hand = &config.hand;
    let scale = pulse_scale(emphasis.active, emphasis.elapsed_secs, &config.interaction);
    let markers = MARKER_LANDMARKS
        .iter()
        .filter_map(|&idx| {
            let center = *points.get(idx)?;
            let radius = if idx == WRIST {
                hand.wrist_radius
            } else {
                hand.fingertip_radius
            };
            Some(Marker {
                landmark: idx,
                center,
                radius,
                scale,
            })
        })
        .collect();

    HandVisual {
        visible: true,
        segments,
        markers,
        active: emphasis.active,
        opacity: if emphasis.active {
            hand.grab_opacity
        } else {
            hand.default_opacity
        },
        color: emphasis.color,
    }
}
