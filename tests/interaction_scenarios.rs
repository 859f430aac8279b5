// End-to-end gesture sequences through the public API, using the default orthographic projector.

use glam::{Vec2, Vec3};
use handgrip_engine::landmarks::{INDEX_TIP, THUMB_TIP};
use handgrip_engine::{
    BufferedLandmarkSource, CanvasSize, DisplayGeometry, Engine, EngineConfig, FrameReport,
    FrameStatus, GestureInteractionEngine, HandLandmark, InteractionMode, LandmarkFrame,
    ModelTransform, OrthographicProjector, TargetId, Timestamp, VideoSize,
};

const SIZE: f32 = 1024.0;

/// Square video on a square canvas: no crop, one normalized unit is `SIZE` pixels.
fn display() -> DisplayGeometry {
    DisplayGeometry {
        video: VideoSize::new(SIZE, SIZE),
        canvas: CanvasSize::new(SIZE, SIZE),
    }
}

/// Normalized coordinate that lands on canvas pixel `px` after the mirror.
fn to_norm(px: f32) -> f32 {
    0.5 - px / SIZE
}

/// Hand with its thumb/index midpoint at canvas point `at`.
fn hand(at: Vec2, pinching: bool) -> Vec<HandLandmark> {
    let half_gap = if pinching { 5.0 } else { 50.0 };
    let mut landmarks = vec![HandLandmark::new(to_norm(at.x), to_norm(at.y), 0.0); 21];
    landmarks[THUMB_TIP] = HandLandmark::new(to_norm(at.x - half_gap), to_norm(at.y), 0.0);
    landmarks[INDEX_TIP] = HandLandmark::new(to_norm(at.x + half_gap), to_norm(at.y), 0.0);
    landmarks
}

struct Session {
    engine: GestureInteractionEngine,
    source: BufferedLandmarkSource,
    projector: OrthographicProjector,
    frame: u32,
}

impl Session {
    fn new() -> Self {
        let mut config = EngineConfig::default();
        config.hand.smoothing_factor = 1.0;
        Session {
            projector: OrthographicProjector::new(display().canvas, config.camera),
            engine: GestureInteractionEngine::new(config),
            source: BufferedLandmarkSource::new(),
            frame: 0,
        }
    }

    fn step(&mut self, hands: Vec<Option<Vec<HandLandmark>>>, model: &mut ModelTransform) -> FrameReport {
        self.frame += 1;
        let timestamp = Timestamp::from_secs(self.frame as f64 / 30.0);
        self.source.push(LandmarkFrame::new(timestamp, hands));
        self.engine
            .process_frame(&mut self.source, display(), Some(model), &self.projector)
    }
}

fn model() -> ModelTransform {
    ModelTransform::new(TargetId::new(1), Vec3::new(0.0, 0.0, -1000.0), 2000.0)
        .with_scale_bounds(10.0, 5000.0)
}

fn assert_close(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-2,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[test]
fn drag_follows_pinch_with_offset() {
    let mut session = Session::new();
    let mut model = model();

    session.step(vec![Some(hand(Vec2::new(5.0, 5.0), false))], &mut model);
    session.step(vec![Some(hand(Vec2::new(5.0, 5.0), true))], &mut model);
    assert_eq!(session.engine.grabbing_hand(), Some(0));
    assert_close(model.position, Vec3::new(0.0, 0.0, -1000.0));

    session.step(vec![Some(hand(Vec2::new(15.0, 5.0), true))], &mut model);
    assert_close(model.position, Vec3::new(10.0, 0.0, -1000.0));

    session.step(vec![Some(hand(Vec2::new(15.0, 5.0), false))], &mut model);
    assert_eq!(session.engine.grabbing_hand(), None);

    // Released: moving the open hand leaves the model alone.
    session.step(vec![Some(hand(Vec2::new(200.0, 5.0), false))], &mut model);
    assert_close(model.position, Vec3::new(10.0, 0.0, -1000.0));
}

#[test]
fn rotate_by_horizontal_pinch_motion() {
    let mut session = Session::new();
    let mut model = model();
    session.engine.set_interaction_mode(InteractionMode::Rotate);

    session.step(vec![Some(hand(Vec2::new(100.0, 0.0), true))], &mut model);
    let report = session.step(vec![Some(hand(Vec2::new(103.0, 0.0), true))], &mut model);
    assert!((model.rotation_y + 0.06).abs() < 1e-4);
    assert_eq!(report.sound_cues, vec![0]);
    assert_close(model.position, Vec3::new(0.0, 0.0, -1000.0));
}

#[test]
fn two_hand_scale_then_release() {
    let mut session = Session::new();
    let mut model = model();
    session.engine.set_interaction_mode(InteractionMode::Scale);

    let pair = |gap: f32| {
        vec![
            Some(hand(Vec2::new(-gap / 2.0, 0.0), true)),
            Some(hand(Vec2::new(gap / 2.0, 0.0), true)),
        ]
    };

    session.step(pair(50.0), &mut model);
    session.step(pair(100.0), &mut model);
    assert!((model.scale - 2010.0).abs() < 1e-2);

    let mut open = pair(100.0);
    open[1] = Some(hand(Vec2::new(50.0, 0.0), false));
    let report = session.step(open, &mut model);
    assert!(session.engine.session().scale.is_none());
    assert!(report.sound_cues.is_empty());
    assert!((model.scale - 2010.0).abs() < 1e-2);
}

#[test]
fn switching_mode_mid_drag_drops_the_grab() {
    let mut session = Session::new();
    let mut model = model();

    session.step(vec![Some(hand(Vec2::ZERO, false))], &mut model);
    session.step(vec![Some(hand(Vec2::ZERO, true))], &mut model);
    assert!(session.engine.is_hand_interacting(0));

    assert!(session.engine.set_interaction_mode_named("Scale"));
    assert!(session.engine.session().is_idle());
    assert_eq!(session.engine.mode_metadata().label, "Scale");

    session.step(vec![Some(hand(Vec2::new(80.0, 0.0), true))], &mut model);
    assert_close(model.position, Vec3::new(0.0, 0.0, -1000.0));
}

#[test]
fn fixed_mode_pauses_until_switched_back() {
    let mut session = Session::new();
    let mut model = model();
    session.engine.set_interaction_mode(InteractionMode::Fixed);

    let report = session.step(vec![Some(hand(Vec2::ZERO, true))], &mut model);
    assert_eq!(report.status, FrameStatus::Suspended);
    assert!(report.hands.iter().all(|visual| !visual.visible));

    session.engine.set_interaction_mode(InteractionMode::Drag);
    let report = session.step(vec![Some(hand(Vec2::ZERO, false))], &mut model);
    assert_eq!(report.status, FrameStatus::Processed);
    assert!(report.hands[0].visible);
    assert!(!report.hands[1].visible);
}

#[test]
fn facade_drives_model_from_json() {
    let mut engine = Engine::new(r#"{"hand":{"smoothing_factor":1.0}}"#).unwrap();
    engine
        .set_model(r#"{"position":[0.0,0.0,-1000.0],"scale":2000.0}"#)
        .unwrap();

    let frame = |t: f64, at: Vec2, pinching: bool| {
        serde_json::json!({
            "timestamp": t,
            "hands": [hand(at, pinching)],
            "video": {"width": SIZE, "height": SIZE},
            "canvas": {"width": SIZE, "height": SIZE},
        })
        .to_string()
    };

    engine.process_frame(&frame(0.1, Vec2::new(5.0, 5.0), false)).unwrap();
    engine.process_frame(&frame(0.2, Vec2::new(5.0, 5.0), true)).unwrap();
    assert!(engine.is_hand_interacting(0));
    let report = engine.process_frame(&frame(0.3, Vec2::new(15.0, 5.0), true)).unwrap();
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(report["sound_cues"], serde_json::json!([0]));

    let model: ModelTransform = serde_json::from_str(&engine.model_json().unwrap()).unwrap();
    assert_close(model.position, Vec3::new(10.0, 0.0, -1000.0));

    engine.remove_model();
    assert!(!engine.is_hand_interacting(0));
    assert_eq!(engine.model_json().unwrap(), "null");
}
