// handgrip_engine: Rust/WASM gesture interaction engine.
// JS owns the camera, detector, scene and audio; it hands landmarks in once per frame
// and reads back the model transform plus overlay geometry.

mod coords;
mod engine;
mod error;
mod gesture;
pub mod landmarks;
mod mode;
mod smoothing;
mod source;
mod target;
mod types;
mod visual;

use serde::Deserialize;
use tracing::info;
use wasm_bindgen::prelude::*;

pub use coords::{is_on_screen, landmark_to_screen, VideoViewportParams};
pub use engine::{
    scaled_value, FrameReport, FrameStatus, GestureInteractionEngine, Grab, GrabKind, HandState,
    InteractionSession, ScaleSession,
};
pub use error::EngineError;
pub use gesture::{curled_finger_count, detect_fist, detect_pinch, PinchState};
pub use mode::{InteractionMode, InteractionModeController, ModeMetadata, UnknownMode};
pub use smoothing::{smooth_landmarks, LandmarkSmoother};
pub use source::{BufferedLandmarkSource, LandmarkSource};
pub use target::{Manipulable, ModelTransform, OrthographicProjector, ScreenProjector, TargetId};
pub use types::*;
pub use visual::{build_hand_visual, pulse_scale, HandEmphasis, HandVisual, Marker};

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    tracing_wasm::set_as_global_default();
}

/// One frame from JS: detector output plus the live video/canvas sizes.
#[derive(Debug, Deserialize)]
struct FrameInput {
    #[serde(flatten)]
    landmarks: LandmarkFrame,
    video: VideoSize,
    canvas: CanvasSize,
}

/// Main engine interface exposed to JavaScript.
/// One call per animation frame; results come back as a single JSON document.
#[wasm_bindgen]
pub struct Engine {
    gestures: GestureInteractionEngine,
    source: BufferedLandmarkSource,
    projector: OrthographicProjector,
    model: Option<ModelTransform>,
    display: DisplayGeometry,
    next_target_id: u64,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Engine, JsValue> {
        Engine::from_config_json(config_json).map_err(to_js)
    }

    /// Feed one detector result and run the gesture pipeline.
    /// Returns the frame report JSON (status, hand overlays, sound cues).
    pub fn process_frame(&mut self, frame_json: &str) -> Result<String, JsValue> {
        self.process_frame_json(frame_json).map_err(to_js)
    }

    /// The detector threw this frame. Logged; engine state is kept.
    pub fn report_detector_error(&mut self, message: &str) -> Result<String, JsValue> {
        self.source.push_error(message);
        let report = self.tick();
        serde_json::to_string(&report).map_err(|e| to_js(e.into()))
    }

    /// Switch interaction mode by name. Unknown names are ignored (returns false).
    pub fn set_interaction_mode(&mut self, mode: &str) -> bool {
        self.gestures.set_interaction_mode_named(mode)
    }

    pub fn interaction_mode(&self) -> String {
        self.gestures.mode().to_string()
    }

    /// Label, colors and instruction for the active mode.
    pub fn mode_info(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.gestures.mode_metadata()).map_err(|e| to_js(e.into()))
    }

    /// Metadata for every mode, in button order.
    pub fn all_modes_info(&self) -> Result<String, JsValue> {
        let table: Vec<&ModeMetadata> = InteractionMode::ALL.iter().map(|m| m.metadata()).collect();
        serde_json::to_string(&table).map_err(|e| to_js(e.into()))
    }

    /// Attach (or replace) the manipulated model. Any grab on the previous model is released.
    pub fn set_model(&mut self, model_json: &str) -> Result<(), JsValue> {
        self.attach_model_json(model_json).map_err(to_js)
    }

    pub fn remove_model(&mut self) {
        if self.model.take().is_some() {
            info!("model removed");
        }
        self.gestures.detach_target();
    }

    /// Current model transform as JSON, or `null` when no model is attached.
    pub fn model_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.model).map_err(|e| to_js(e.into()))
    }

    pub fn is_hand_interacting(&self, hand_index: usize) -> bool {
        self.gestures.is_hand_interacting(hand_index)
    }

    pub fn set_rotate_sensitivity(&mut self, sensitivity: f32) {
        self.gestures.set_rotate_sensitivity(sensitivity);
    }

    pub fn set_scale_sensitivity(&mut self, sensitivity: f32) {
        self.gestures.set_scale_sensitivity(sensitivity);
    }

    /// Call after restarting the video stream so its timestamps are accepted again.
    pub fn reset_frame_clock(&mut self) {
        self.gestures.reset_frame_clock();
    }
}

impl Engine {
    fn from_config_json(config_json: &str) -> Result<Engine, EngineError> {
        let config: EngineConfig = serde_json::from_str(config_json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        Ok(Engine {
            projector: OrthographicProjector::new(CanvasSize::default(), config.camera),
            gestures: GestureInteractionEngine::new(config),
            source: BufferedLandmarkSource::new(),
            model: None,
            display: DisplayGeometry::default(),
            next_target_id: 0,
        })
    }

    fn process_frame_json(&mut self, frame_json: &str) -> Result<String, EngineError> {
        let input: FrameInput = serde_json::from_str(frame_json)
            .map_err(|e| EngineError::InvalidFrame(e.to_string()))?;

        self.display = DisplayGeometry {
            video: input.video,
            canvas: input.canvas,
        };
        self.source.push(input.landmarks);

        let report = self.tick();
        Ok(serde_json::to_string(&report)?)
    }

    fn attach_model_json(&mut self, model_json: &str) -> Result<(), EngineError> {
        let mut model: ModelTransform = serde_json::from_str(model_json)
            .map_err(|e| EngineError::InvalidFrame(format!("model: {}", e)))?;

        self.next_target_id += 1;
        model.id = TargetId::new(self.next_target_id);
        let defaults = &self.gestures.config().model;
        model.min_scale = model.min_scale.or(Some(defaults.default_min_scale));
        model.max_scale = model.max_scale.or(Some(defaults.default_max_scale));

        info!(target_id = self.next_target_id, "model attached");
        self.gestures.detach_target();
        self.model = Some(model);
        Ok(())
    }

    fn tick(&mut self) -> FrameReport {
        self.projector.resize(self.display.canvas);
        self.gestures.process_frame(
            &mut self.source,
            self.display,
            self.model.as_mut(),
            &self.projector,
        )
    }
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
