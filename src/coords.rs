// Landmark → canvas coordinate mapping under a cover-fit crop of a mirrored camera preview.
// Rule: the preview is shown flipped (selfie view) while landmarks come from the unflipped frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::{CanvasSize, HandLandmark, VideoSize};

/// Region of the native video frame that survives the canvas's cover-fit crop.
/// All fields are in native video pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoViewportParams {
    pub offset_x: f32,
    pub offset_y: f32,
    pub visible_width: f32,
    pub visible_height: f32,
    pub video_natural_width: f32,
    pub video_natural_height: f32,
}

impl VideoViewportParams {
    /// Viewport covering the whole native frame (no crop).
    pub fn full_frame(video: VideoSize) -> Self {
        VideoViewportParams {
            offset_x: 0.0,
            offset_y: 0.0,
            visible_width: video.width,
            visible_height: video.height,
            video_natural_width: video.width,
            video_natural_height: video.height,
        }
    }

    /// Compute the visible region when `video` is scaled to cover `canvas`.
    ///
    /// Returns `None` when either surface has a zero dimension; the frame
    /// should then be skipped. A degenerate crop falls back to the full frame.
    pub fn cover_fit(video: VideoSize, canvas: CanvasSize) -> Option<Self> {
        if video.is_empty() || canvas.is_empty() {
            return None;
        }

        let video_aspect = video.width / video.height;
        let canvas_aspect = canvas.width / canvas.height;

        let params = if video_aspect > canvas_aspect {
            // Video is wider: crop left and right.
            let scale = canvas.height / video.height;
            let cropped = (video.width * scale - canvas.width) / scale;
            VideoViewportParams {
                offset_x: cropped / 2.0,
                offset_y: 0.0,
                visible_width: video.width - cropped,
                visible_height: video.height,
                video_natural_width: video.width,
                video_natural_height: video.height,
            }
        } else {
            // Video is taller: crop top and bottom.
            let scale = canvas.width / video.width;
            let cropped = (video.height * scale - canvas.height) / scale;
            VideoViewportParams {
                offset_x: 0.0,
                offset_y: cropped / 2.0,
                visible_width: video.width,
                visible_height: video.height - cropped,
                video_natural_width: video.width,
                video_natural_height: video.height,
            }
        };

        if params.is_degenerate() {
            return Some(Self::full_frame(video));
        }
        Some(params)
    }

    pub fn is_degenerate(&self) -> bool {
        self.visible_width <= 0.0 || self.visible_height <= 0.0
    }

    /// Landmark position normalized to the visible region, before mirroring.
    /// Values outside `[0, 1]` lie in the cropped-away margin.
    pub fn normalize(&self, landmark: &HandLandmark) -> Vec2 {
        let params = if self.is_degenerate() {
            Self::full_frame(VideoSize::new(self.video_natural_width, self.video_natural_height))
        } else {
            *self
        };

        let native_x = landmark.x * params.video_natural_width;
        let native_y = landmark.y * params.video_natural_height;
        Vec2::new(
            (native_x - params.offset_x) / params.visible_width,
            (native_y - params.offset_y) / params.visible_height,
        )
    }
}

/// Map a normalized landmark to canvas pixels with the origin at the canvas center.
pub fn landmark_to_screen(
    landmark: &HandLandmark,
    viewport: &VideoViewportParams,
    canvas: CanvasSize,
) -> Vec2 {
    let norm = viewport.normalize(landmark);
    Vec2::new(
        (1.0 - norm.x) * canvas.width - canvas.width / 2.0,
        (1.0 - norm.y) * canvas.height - canvas.height / 2.0,
    )
}

/// True when the landmark falls inside the visible (non-cropped) region.
pub fn is_on_screen(landmark: &HandLandmark, viewport: &VideoViewportParams) -> bool {
    let norm = viewport.normalize(landmark);
    (0.0..=1.0).contains(&norm.x) && (0.0..=1.0).contains(&norm.y)
}
