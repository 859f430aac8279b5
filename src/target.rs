// The manipulated model and the screen → world projection, both owned by the rendering side.
// The engine only borrows the model per frame and remembers it by id.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::types::{CameraSettings, CanvasSize};

/// Identity of an attached model. A swapped model gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TargetId(u64);

impl TargetId {
    pub fn new(id: u64) -> Self {
        TargetId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Transform handle of the object gestures act on.
pub trait Manipulable {
    fn target_id(&self) -> TargetId;

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    fn rotation_y(&self) -> f32;
    fn set_rotation_y(&mut self, radians: f32);

    fn uniform_scale(&self) -> f32;
    fn set_uniform_scale(&mut self, scale: f32);

    /// Per-object `(min, max)` scale bounds, if the object defines them.
    fn scale_bounds(&self) -> (Option<f32>, Option<f32>) {
        (None, None)
    }
}

/// Plain model transform, exchanged with JS as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTransform {
    #[serde(skip)]
    pub id: TargetId,
    pub position: Vec3,
    #[serde(default)]
    pub rotation_y: f32,
    pub scale: f32,
    #[serde(default)]
    pub min_scale: Option<f32>,
    #[serde(default)]
    pub max_scale: Option<f32>,
}

impl ModelTransform {
    pub fn new(id: TargetId, position: Vec3, scale: f32) -> Self {
        ModelTransform {
            id,
            position,
            rotation_y: 0.0,
            scale,
            min_scale: None,
            max_scale: None,
        }
    }

    pub fn with_scale_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_scale = Some(min);
        self.max_scale = Some(max);
        self
    }
}

impl Manipulable for ModelTransform {
    fn target_id(&self) -> TargetId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    fn set_rotation_y(&mut self, radians: f32) {
        self.rotation_y = radians;
    }

    fn uniform_scale(&self) -> f32 {
        self.scale
    }

    fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn scale_bounds(&self) -> (Option<f32>, Option<f32>) {
        (self.min_scale, self.max_scale)
    }
}

/// Converts a canvas point (origin at center, y up) to world space.
pub trait ScreenProjector {
    /// World-space point under `point`, placed on the plane `z = depth`.
    fn screen_to_world(&self, point: Vec2, depth: f32) -> Vec3;
}

/// Orthographic camera spanning the canvas one world unit per pixel, looking down -Z.
#[derive(Debug, Clone, Copy)]
pub struct OrthographicProjector {
    canvas: CanvasSize,
    camera: CameraSettings,
}

impl OrthographicProjector {
    pub fn new(canvas: CanvasSize, camera: CameraSettings) -> Self {
        OrthographicProjector { canvas, camera }
    }

    pub fn resize(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    /// Unproject a canvas point at normalized device depth `ndc_z` (-1 near, 1 far).
    pub fn unproject(&self, point: Vec2, ndc_z: f32) -> Vec3 {
        let half_w = self.canvas.width / 2.0;
        let half_h = self.canvas.height / 2.0;
        let ndc = if half_w > 0.0 && half_h > 0.0 {
            Vec2::new(point.x / half_w, point.y / half_h)
        } else {
            Vec2::ZERO
        };

        let near = self.camera.near;
        let far = self.camera.far;
        let view_z = -(ndc_z * (far - near) + far + near) / 2.0;

        Vec3::new(ndc.x * half_w, ndc.y * half_h, self.camera.position_z + view_z)
    }
}

impl ScreenProjector for OrthographicProjector {
    fn screen_to_world(&self, point: Vec2, depth: f32) -> Vec3 {
        let mut world = self.unproject(point, 0.5);
        world.z = depth;
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_maps_pixels_one_to_one() {
        let projector = OrthographicProjector::new(CanvasSize::new(800.0, 600.0), CameraSettings::default());
        let world = projector.screen_to_world(Vec2::new(120.0, -45.0), -1000.0);
        assert!((world.x - 120.0).abs() < 1e-3);
        assert!((world.y + 45.0).abs() < 1e-3);
        assert_eq!(world.z, -1000.0);
    }

    #[test]
    fn ortho_depth_range() {
        let projector = OrthographicProjector::new(CanvasSize::new(800.0, 600.0), CameraSettings::default());
        // Camera at z=100 with near=1, far=2000.
        assert!((projector.unproject(Vec2::ZERO, -1.0).z - 99.0).abs() < 1e-3);
        assert!((projector.unproject(Vec2::ZERO, 1.0).z + 1900.0).abs() < 1e-3);
    }

    #[test]
    fn zero_canvas_projects_to_axis() {
        let projector = OrthographicProjector::new(CanvasSize::new(0.0, 0.0), CameraSettings::default());
        let world = projector.screen_to_world(Vec2::new(10.0, 10.0), 0.0);
        assert_eq!(world, Vec3::ZERO);
    }

    #[test]
    fn model_json_omits_id() {
        let model = ModelTransform::new(TargetId::new(7), Vec3::new(0.0, -270.0, -1000.0), 2000.0)
            .with_scale_bounds(10.0, 5000.0);
        let json = serde_json::to_string(&model).unwrap();
        assert!(!json.contains("\"id\""));
        let back: ModelTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, TargetId::default());
        assert_eq!(back.scale_bounds(), (Some(10.0), Some(5000.0)));
    }
}
