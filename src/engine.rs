// Gesture interaction engine: per frame, smooth → detect → mode handler → transform.
// Rule: one grab at a time across both hands; a mode switch or model swap clears every session
// synchronously, so no caller ever observes a half-released grab between frames.

use glam::{Vec2, Vec3};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::coords::{landmark_to_screen, VideoViewportParams};
use crate::gesture::{detect_fist, detect_pinch};
use crate::landmarks::PALM;
use crate::mode::{InteractionMode, InteractionModeController, ModeMetadata};
use crate::smoothing::LandmarkSmoother;
use crate::source::LandmarkSource;
use crate::target::{Manipulable, ScreenProjector, TargetId};
use crate::types::{
    CanvasSize, DisplayGeometry, EngineConfig, HandLandmark, Timestamp, HAND_SLOTS,
};
use crate::visual::{build_hand_visual, HandEmphasis, HandVisual};

/// Tracking state of one hand slot. Slots are fixed by detector order, never re-matched.
#[derive(Debug, Clone)]
pub struct HandState {
    /// Smoothed landmarks, `None` while the hand is not visible.
    pub landmarks: Option<Vec<HandLandmark>>,
    /// Palm position in canvas coordinates (z = overlay layer).
    pub anchor_position: Vec3,
    pub is_pinching: bool,
    /// Last pinch midpoint. Kept (not cleared) across non-pinch frames.
    pub pinch_point_screen: Vec2,
    pub is_fist: bool,
    pub visual: HandVisual,
    smoother: LandmarkSmoother,
}

impl HandState {
    fn new(smoothing_factor: f32) -> Self {
        HandState {
            landmarks: None,
            anchor_position: Vec3::ZERO,
            is_pinching: false,
            pinch_point_screen: Vec2::ZERO,
            is_fist: false,
            visual: HandVisual::hidden(),
            smoother: LandmarkSmoother::new(smoothing_factor),
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.landmarks.is_some()
    }

    fn clear(&mut self) {
        self.landmarks = None;
        self.is_pinching = false;
        self.is_fist = false;
        self.visual = HandVisual::hidden();
    }
}

/// What a single-hand grab is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabKind {
    /// Object follows the pinch point on the plane `z = depth`, keeping `offset`.
    Drag { depth: f32, offset: Vec3 },
    /// Object spins with horizontal pinch movement; `last_x` is the previous pinch x.
    Rotate { last_x: f32 },
}

/// A hand holding the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub hand: usize,
    pub target: TargetId,
    pub kind: GrabKind,
}

/// Two-hand scale baselines captured when both hands start pinching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSession {
    pub target: TargetId,
    pub initial_distance: f32,
    pub initial_scale: f32,
}

/// Transient interaction state. Only one of `grab` / `scale` is ever set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionSession {
    pub grab: Option<Grab>,
    pub scale: Option<ScaleSession>,
}

impl InteractionSession {
    pub fn is_idle(&self) -> bool {
        self.grab.is_none() && self.scale.is_none()
    }

    /// Target referenced by whichever session is active.
    pub fn target(&self) -> Option<TargetId> {
        self.grab
            .map(|grab| grab.target)
            .or_else(|| self.scale.map(|scale| scale.target))
    }

    pub fn clear(&mut self) {
        *self = InteractionSession::default();
    }
}

/// Outcome of one `process_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Processed,
    /// Fixed mode: gestures are suspended and hands hidden.
    Suspended,
    /// Detector had nothing new.
    NoData,
    /// Timestamp not newer than the last processed frame.
    Stale,
    /// Video or canvas has a zero dimension.
    NoViewport,
    /// Detector reported a failure; state is untouched.
    DetectorFailed,
}

/// Per-frame output for the rendering and audio collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub status: FrameStatus,
    pub mode: InteractionMode,
    pub hands: Vec<HandVisual>,
    /// Hand slots that should play the interaction cue this frame.
    pub sound_cues: Vec<usize>,
}

/// The orchestrator. Owns hand and session state; borrows the model per frame.
#[derive(Debug, Clone)]
pub struct GestureInteractionEngine {
    config: EngineConfig,
    modes: InteractionModeController,
    hands: [HandState; HAND_SLOTS],
    session: InteractionSession,
    last_timestamp: Option<Timestamp>,
}

impl GestureInteractionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let alpha = config.hand.smoothing_factor;
        GestureInteractionEngine {
            config,
            modes: InteractionModeController::new(),
            hands: std::array::from_fn(|_| HandState::new(alpha)),
            session: InteractionSession::default(),
            last_timestamp: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> InteractionMode {
        self.modes.current()
    }

    pub fn mode_metadata(&self) -> &'static ModeMetadata {
        self.modes.metadata()
    }

    pub fn hand(&self, slot: usize) -> Option<&HandState> {
        self.hands.get(slot)
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    /// Hand slot holding the drag/rotate grab.
    pub fn grabbing_hand(&self) -> Option<usize> {
        self.session.grab.map(|grab| grab.hand)
    }

    /// Model currently held by a grab or scale session.
    pub fn picked_up_target(&self) -> Option<TargetId> {
        self.session.target()
    }

    pub fn set_rotate_sensitivity(&mut self, sensitivity: f32) {
        self.config.interaction.rotate_sensitivity = sensitivity;
    }

    pub fn set_scale_sensitivity(&mut self, sensitivity: f32) {
        self.config.interaction.scale_sensitivity = sensitivity;
    }

    /// Switch interaction mode, releasing any grab or scale session.
    /// Returns `false` when `mode` is already active.
    pub fn set_interaction_mode(&mut self, mode: InteractionMode) -> bool {
        if !self.modes.switch_to(mode) {
            return false;
        }
        self.session.clear();
        if mode == InteractionMode::Fixed {
            self.hide_all_hands();
        }
        true
    }

    /// Switch by mode name (UI button id or recognized voice command).
    pub fn set_interaction_mode_named(&mut self, name: &str) -> bool {
        match name.parse::<InteractionMode>() {
            Ok(mode) => self.set_interaction_mode(mode),
            Err(err) => {
                warn!("ignoring mode switch request: {}", err);
                false
            }
        }
    }

    /// The model was removed or replaced: drop every session referencing it.
    pub fn detach_target(&mut self) {
        if !self.session.is_idle() {
            info!("target detached, releasing active session");
        }
        self.session.clear();
    }

    /// Forget the last processed timestamp (video stream restarted).
    pub fn reset_frame_clock(&mut self) {
        self.last_timestamp = None;
    }

    /// Whether `slot` is driving the active grab or scale session.
    pub fn is_hand_interacting(&self, slot: usize) -> bool {
        match self.modes.current() {
            InteractionMode::Drag | InteractionMode::Rotate => self.grabbing_hand() == Some(slot),
            InteractionMode::Scale => self.session.scale.is_some() && slot < HAND_SLOTS,
            InteractionMode::Fixed => false,
        }
    }

    /// Run one frame of the gesture pipeline.
    pub fn process_frame<S, T, P>(
        &mut self,
        source: &mut S,
        display: DisplayGeometry,
        mut target: Option<&mut T>,
        projector: &P,
    ) -> FrameReport
    where
        S: LandmarkSource + ?Sized,
        T: Manipulable + ?Sized,
        P: ScreenProjector + ?Sized,
    {
        self.release_if_target_changed(target.as_deref().map(|t| t.target_id()));

        if self.modes.current() == InteractionMode::Fixed {
            // Drain so a result buffered while paused is not replayed later.
            let _ = source.poll_landmarks();
            self.hide_all_hands();
            return self.report(FrameStatus::Suspended, Vec::new());
        }

        let frame = match source.poll_landmarks() {
            Ok(Some(frame)) => frame,
            Ok(None) => return self.report(FrameStatus::NoData, Vec::new()),
            Err(err) => {
                warn!("hand detection failed: {}", err);
                return self.report(FrameStatus::DetectorFailed, Vec::new());
            }
        };

        if let Some(last) = self.last_timestamp {
            if frame.timestamp <= last {
                return self.report(FrameStatus::Stale, Vec::new());
            }
        }
        self.last_timestamp = Some(frame.timestamp);

        let Some(viewport) = VideoViewportParams::cover_fit(display.video, display.canvas) else {
            return self.report(FrameStatus::NoViewport, Vec::new());
        };

        let mut sound_cues = Vec::new();
        for slot in 0..HAND_SLOTS {
            match frame.hand(slot) {
                Some(raw) => {
                    let prev_is_pinching = self.update_hand(slot, raw, &viewport, display.canvas);
                    match self.modes.current() {
                        InteractionMode::Drag => self.handle_drag(
                            slot,
                            prev_is_pinching,
                            target.as_deref_mut(),
                            projector,
                        ),
                        InteractionMode::Rotate => {
                            self.handle_rotate(slot, prev_is_pinching, target.as_deref_mut())
                        }
                        // Scale runs once per frame after both hands are updated.
                        InteractionMode::Scale | InteractionMode::Fixed => {}
                    }
                    self.update_visual(slot, &viewport, display.canvas, frame.timestamp);
                }
                None => self.handle_hand_disappeared(slot),
            }

            if self.hands[slot].is_pinching && self.is_hand_interacting(slot) {
                sound_cues.push(slot);
            }
        }

        if self.modes.current() == InteractionMode::Scale {
            self.handle_scale(target.as_deref_mut());
        }

        self.report(FrameStatus::Processed, sound_cues)
    }

    fn report(&self, status: FrameStatus, sound_cues: Vec<usize>) -> FrameReport {
        FrameReport {
            status,
            mode: self.modes.current(),
            hands: self.hands.iter().map(|hand| hand.visual.clone()).collect(),
            sound_cues,
        }
    }

    fn hide_all_hands(&mut self) {
        for hand in &mut self.hands {
            hand.visual = HandVisual::hidden();
        }
    }

    fn release_if_target_changed(&mut self, current: Option<TargetId>) {
        if let Some(held) = self.session.target() {
            if Some(held) != current {
                debug!(target_id = held.as_u64(), "held target no longer present");
                self.session.clear();
            }
        }
    }

    /// Smooth, anchor and classify one hand. Returns the pinch state before this frame.
    fn update_hand(
        &mut self,
        slot: usize,
        raw: &[HandLandmark],
        viewport: &VideoViewportParams,
        canvas: CanvasSize,
    ) -> bool {
        let threshold = self.config.hand.pinch_threshold;
        let hand = &mut self.hands[slot];

        let smoothed = hand.smoother.smooth(raw);

        if let Some(palm) = smoothed.get(PALM).filter(|palm| palm.is_finite()) {
            let screen = landmark_to_screen(palm, viewport, canvas);
            hand.anchor_position = Vec3::new(screen.x, screen.y, 1.0);
        }

        let prev_is_pinching = hand.is_pinching;
        if let Some(pinch) = detect_pinch(&smoothed, viewport, canvas, threshold) {
            hand.is_pinching = pinch.is_pinching;
            if let Some(point) = pinch.pinch_point {
                hand.pinch_point_screen = point;
            }
        }
        hand.is_fist = detect_fist(&smoothed);
        hand.landmarks = Some(smoothed);

        prev_is_pinching
    }

    fn update_visual(
        &mut self,
        slot: usize,
        viewport: &VideoViewportParams,
        canvas: CanvasSize,
        now: Timestamp,
    ) {
        let emphasis = HandEmphasis {
            active: self.is_hand_interacting(slot),
            color: self.modes.metadata().hand_color,
            elapsed_secs: now.as_secs(),
        };
        let hand = &mut self.hands[slot];
        hand.visual = match hand.landmarks.as_deref() {
            Some(landmarks) => build_hand_visual(landmarks, viewport, canvas, emphasis, &self.config),
            None => HandVisual::hidden(),
        };
    }

    fn release(&mut self, slot: usize) {
        if let Some(grab) = self.session.grab.take() {
            debug!(hand = slot, target_id = grab.target.as_u64(), "grab released");
        }
    }

    fn handle_drag<T, P>(
        &mut self,
        slot: usize,
        prev_is_pinching: bool,
        target: Option<&mut T>,
        projector: &P,
    ) where
        T: Manipulable + ?Sized,
        P: ScreenProjector + ?Sized,
    {
        let is_pinching = self.hands[slot].is_pinching;
        let pinch_point = self.hands[slot].pinch_point_screen;

        if !is_pinching {
            if prev_is_pinching && self.grabbing_hand() == Some(slot) {
                self.release(slot);
            }
            return;
        }

        let Some(target) = target else {
            return;
        };

        let Some(grab) = self.session.grab else {
            if !prev_is_pinching {
                let position = target.position();
                let depth = position.z;
                let mut world = projector.screen_to_world(pinch_point, depth);
                world.z = depth;
                self.session.grab = Some(Grab {
                    hand: slot,
                    target: target.target_id(),
                    kind: GrabKind::Drag {
                        depth,
                        offset: position - world,
                    },
                });
                debug!(hand = slot, depth, "drag grab started");
            }
            return;
        };

        if let GrabKind::Drag { depth, offset } = grab.kind {
            if grab.hand == slot && grab.target == target.target_id() {
                let mut world = projector.screen_to_world(pinch_point, depth);
                world.z = depth;
                let mut position = world + offset;
                position.z = position
                    .z
                    .max(self.config.model.min_z)
                    .min(self.config.model.max_z);
                target.set_position(position);
            }
        }
    }

    fn handle_rotate<T>(&mut self, slot: usize, prev_is_pinching: bool, target: Option<&mut T>)
    where
        T: Manipulable + ?Sized,
    {
        let is_pinching = self.hands[slot].is_pinching;
        let pinch_x = self.hands[slot].pinch_point_screen.x;

        if !is_pinching {
            if prev_is_pinching && self.grabbing_hand() == Some(slot) {
                self.release(slot);
            }
            return;
        }

        let Some(target) = target else {
            return;
        };

        let sensitivity = self.config.interaction.rotate_sensitivity;
        let deadzone = self.config.interaction.rotate_deadzone;

        if self.session.grab.is_none() {
            if !prev_is_pinching {
                self.session.grab = Some(Grab {
                    hand: slot,
                    target: target.target_id(),
                    kind: GrabKind::Rotate { last_x: pinch_x },
                });
                debug!(hand = slot, "rotate grab started");
            }
            return;
        }
        let Some(grab) = self.session.grab.as_mut() else {
            return;
        };

        if grab.hand != slot || grab.target != target.target_id() {
            return;
        }
        if let GrabKind::Rotate { last_x } = &mut grab.kind {
            let delta_x = pinch_x - *last_x;
            if delta_x.abs() > deadzone {
                target.set_rotation_y(target.rotation_y() - delta_x * sensitivity);
            }
            *last_x = pinch_x;
        }
    }

    fn handle_scale<T>(&mut self, target: Option<&mut T>)
    where
        T: Manipulable + ?Sized,
    {
        let [first, second] = &self.hands;
        let both_pinching =
            first.is_tracked() && second.is_tracked() && first.is_pinching && second.is_pinching;

        if !both_pinching {
            if self.session.scale.take().is_some() {
                debug!("scale session ended");
            }
            return;
        }

        let Some(target) = target else {
            return;
        };
        let distance = first.pinch_point_screen.distance(second.pinch_point_screen);

        let current = self.session.scale;
        match current {
            None => {
                self.session.scale = Some(ScaleSession {
                    target: target.target_id(),
                    initial_distance: distance,
                    initial_scale: target.uniform_scale(),
                });
                debug!(distance, "scale session started");
            }
            Some(session) if session.target == target.target_id() => {
                let (min, max) = target.scale_bounds();
                let min = min.unwrap_or(self.config.model.default_min_scale);
                let max = max.unwrap_or(self.config.model.default_max_scale);
                let scale = scaled_value(
                    session.initial_scale,
                    session.initial_distance,
                    distance,
                    self.config.interaction.scale_sensitivity,
                    min,
                    max,
                );
                target.set_uniform_scale(scale);
            }
            Some(_) => {}
        }
    }

    fn handle_hand_disappeared(&mut self, slot: usize) {
        match self.modes.current() {
            InteractionMode::Drag | InteractionMode::Rotate => {
                if self.grabbing_hand() == Some(slot) {
                    self.release(slot);
                }
            }
            InteractionMode::Scale => {
                if self.session.scale.take().is_some() {
                    debug!(hand = slot, "scale session ended, hand lost");
                }
            }
            InteractionMode::Fixed => {}
        }
        self.hands[slot].clear();
    }
}

/// `baseline + (distance - baseline_distance) * sensitivity`, clamped to `[min, max]`.
pub fn scaled_value(
    baseline_scale: f32,
    baseline_distance: f32,
    distance: f32,
    sensitivity: f32,
    min: f32,
    max: f32,
) -> f32 {
    let scale = baseline_scale + (distance - baseline_distance) * sensitivity;
    scale.max(min).min(max)
}
