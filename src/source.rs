// Pull-style landmark delivery. The engine polls once per frame; push-style producers
// (detector callbacks) go through `BufferedLandmarkSource`, which keeps only the newest result.

use crate::error::EngineError;
use crate::types::LandmarkFrame;

/// Something the engine can ask for the latest detector result.
pub trait LandmarkSource {
    /// `Ok(None)` when nothing new is available this frame.
    fn poll_landmarks(&mut self) -> Result<Option<LandmarkFrame>, EngineError>;
}

/// Single-slot buffer between an asynchronous detector and the frame loop.
#[derive(Debug, Default)]
pub struct BufferedLandmarkSource {
    pending: Option<Result<LandmarkFrame, EngineError>>,
}

impl BufferedLandmarkSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a detector result, replacing any unconsumed one.
    pub fn push(&mut self, frame: LandmarkFrame) {
        self.pending = Some(Ok(frame));
    }

    /// Store a detector failure to be reported at the next poll.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.pending = Some(Err(EngineError::Detector(message.into())));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl LandmarkSource for BufferedLandmarkSource {
    fn poll_landmarks(&mut self) -> Result<Option<LandmarkFrame>, EngineError> {
        self.pending.take().transpose()
    }
}
