// Strong typing over bare floats. Newtypes for timestamps and pixel sizes, plain data for landmarks.
// Configuration structs are deserialized from the host's JSON with per-field defaults.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of landmarks the detector reports per hand.
pub const LANDMARKS_PER_HAND: usize = 21;

/// Number of tracked hand slots.
pub const HAND_SLOTS: usize = 2;

/// Video timestamp in seconds, as reported by the host video element.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_secs(secs: f64) -> Self {
        Timestamp(secs)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

/// Single normalized landmark from the detector.
/// `x` and `y` are relative to the native video frame, `z` is relative depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct HandLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl HandLandmark {
    /// Stand-in for a `null` detector entry. Fails every finiteness check downstream.
    pub const MISSING: HandLandmark = HandLandmark {
        x: f32::NAN,
        y: f32::NAN,
        z: f32::NAN,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        HandLandmark { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Planar distance in normalized space (depth ignored).
    pub fn planar_distance(&self, other: &HandLandmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Displayed canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        CanvasSize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Native resolution of the camera stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoSize {
    pub width: f32,
    pub height: f32,
}

impl VideoSize {
    pub fn new(width: f32, height: f32) -> Self {
        VideoSize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// One detector result: up to two hands, each either absent or a landmark list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LandmarkFrame {
    pub timestamp: Timestamp,
    /// `null` landmark entries become [`HandLandmark::MISSING`].
    #[serde(default, deserialize_with = "deserialize_hands")]
    pub hands: Vec<Option<Vec<HandLandmark>>>,
}

fn deserialize_hands<'de, D>(deserializer: D) -> Result<Vec<Option<Vec<HandLandmark>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let hands: Vec<Option<Vec<Option<HandLandmark>>>> = Vec::deserialize(deserializer)?;
    Ok(hands
        .into_iter()
        .map(|hand| {
            hand.map(|landmarks| {
                landmarks
                    .into_iter()
                    .map(|lm| lm.unwrap_or(HandLandmark::MISSING))
                    .collect()
            })
        })
        .collect())
}

impl LandmarkFrame {
    pub fn new(timestamp: Timestamp, hands: Vec<Option<Vec<HandLandmark>>>) -> Self {
        LandmarkFrame { timestamp, hands }
    }

    /// Landmarks for a hand slot, `None` when the detector saw no hand there.
    pub fn hand(&self, slot: usize) -> Option<&[HandLandmark]> {
        self.hands
            .get(slot)
            .and_then(|hand| hand.as_deref())
            .filter(|landmarks| !landmarks.is_empty())
    }
}

/// Live geometry of the video element and the canvas it is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayGeometry {
    pub video: VideoSize,
    pub canvas: CanvasSize,
}

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub hand: HandSettings,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub camera: CameraSettings,
}

/// Hand tracking and visualization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandSettings {
    /// Weight of the newest observation in the landmark EMA.
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f32,
    /// Thumb/index tip distance (canvas pixels) below which a hand is pinching.
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
    #[serde(default = "default_fingertip_radius")]
    pub fingertip_radius: f32,
    #[serde(default = "default_wrist_radius")]
    pub wrist_radius: f32,
    #[serde(default = "default_opacity")]
    pub default_opacity: f32,
    #[serde(default = "default_grab_opacity")]
    pub grab_opacity: f32,
}

impl Default for HandSettings {
    fn default() -> Self {
        HandSettings {
            smoothing_factor: default_smoothing_factor(),
            pinch_threshold: default_pinch_threshold(),
            fingertip_radius: default_fingertip_radius(),
            wrist_radius: default_wrist_radius(),
            default_opacity: default_opacity(),
            grab_opacity: default_grab_opacity(),
        }
    }
}

fn default_smoothing_factor() -> f32 {
    0.4
}

fn default_pinch_threshold() -> f32 {
    45.0
}

fn default_fingertip_radius() -> f32 {
    8.0
}

fn default_wrist_radius() -> f32 {
    12.0
}

fn default_opacity() -> f32 {
    0.3
}

fn default_grab_opacity() -> f32 {
    1.0
}

/// Sensitivities and feedback animation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionSettings {
    /// Radians of Y rotation per pixel of horizontal pinch movement.
    #[serde(default = "default_rotate_sensitivity")]
    pub rotate_sensitivity: f32,
    /// Scale units per pixel of change in two-hand pinch distance.
    #[serde(default = "default_scale_sensitivity")]
    pub scale_sensitivity: f32,
    /// Horizontal movement (pixels) ignored by the rotate handler.
    #[serde(default = "default_rotate_deadzone")]
    pub rotate_deadzone: f32,
    #[serde(default = "default_pulse_speed")]
    pub pulse_speed: f32,
    #[serde(default = "default_pulse_amplitude")]
    pub pulse_amplitude: f32,
    #[serde(default = "default_pulse_base_scale")]
    pub pulse_base_scale: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        InteractionSettings {
            rotate_sensitivity: default_rotate_sensitivity(),
            scale_sensitivity: default_scale_sensitivity(),
            rotate_deadzone: default_rotate_deadzone(),
            pulse_speed: default_pulse_speed(),
            pulse_amplitude: default_pulse_amplitude(),
            pulse_base_scale: default_pulse_base_scale(),
        }
    }
}

fn default_rotate_sensitivity() -> f32 {
    0.02
}

fn default_scale_sensitivity() -> f32 {
    0.2
}

fn default_rotate_deadzone() -> f32 {
    0.5
}

fn default_pulse_speed() -> f32 {
    8.0
}

fn default_pulse_amplitude() -> f32 {
    0.5
}

fn default_pulse_base_scale() -> f32 {
    1.0
}

/// Bounds applied to the manipulated model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Used when the model carries no scale bounds of its own.
    #[serde(default = "default_min_scale")]
    pub default_min_scale: f32,
    #[serde(default = "default_max_scale")]
    pub default_max_scale: f32,
    /// Drag clamps the model's world Z into `[min_z, max_z]`.
    #[serde(default = "default_min_z")]
    pub min_z: f32,
    #[serde(default = "default_max_z")]
    pub max_z: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            default_min_scale: default_min_scale(),
            default_max_scale: default_max_scale(),
            min_z: default_min_z(),
            max_z: default_max_z(),
        }
    }
}

fn default_min_scale() -> f32 {
    10.0
}

fn default_max_scale() -> f32 {
    5000.0
}

fn default_min_z() -> f32 {
    -1900.0 // far plane with the default camera
}

fn default_max_z() -> f32 {
    50.0
}

/// Orthographic scene camera used by the default screen-to-world projector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_z")]
    pub position_z: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            near: default_near(),
            far: default_far(),
            position_z: default_camera_z(),
        }
    }
}

fn default_near() -> f32 {
    1.0
}

fn default_far() -> f32 {
    2000.0
}

fn default_camera_z() -> f32 {
    100.0
}
