// Interaction mode: a closed set of modes, each with its UI metadata.
// Modes change only on explicit requests (UI button or voice command), never from gestures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

/// What a pinch does to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// One hand pinches and moves the model.
    #[default]
    Drag,
    /// One hand pinches and sweeps horizontally to spin the model.
    Rotate,
    /// Both hands pinch; their separation sets the model's scale.
    Scale,
    /// Gesture processing suspended.
    Fixed,
}

/// Display metadata the UI collaborator reads for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeMetadata {
    pub mode: InteractionMode,
    pub label: &'static str,
    /// Button background when active.
    pub base_color: &'static str,
    /// Button text color when active.
    pub text_color: &'static str,
    /// Tint for the hand overlay markers.
    pub hand_color: &'static str,
    pub instruction: &'static str,
}

const MODE_TABLE: [ModeMetadata; 4] = [
    ModeMetadata {
        mode: InteractionMode::Drag,
        label: "Drag",
        base_color: "#00FFFF",
        text_color: "#000000",
        hand_color: "#00FFFF",
        instruction: "Pinch your fingers to grab the model and move it",
    },
    ModeMetadata {
        mode: InteractionMode::Rotate,
        label: "Rotate",
        base_color: "#FF00FF",
        text_color: "#FFFFFF",
        hand_color: "#FF00FF",
        instruction: "Pinch and move your hand left or right to rotate",
    },
    ModeMetadata {
        mode: InteractionMode::Scale,
        label: "Scale",
        base_color: "#FFFF00",
        text_color: "#000000",
        hand_color: "#FFFF00",
        instruction: "Pinch with both hands and change their distance to scale",
    },
    ModeMetadata {
        mode: InteractionMode::Fixed,
        label: "Fixed",
        base_color: "#808080",
        text_color: "#FFFFFF",
        hand_color: "#808080",
        instruction: "Fixed mode: gesture tracking is paused",
    },
];

impl InteractionMode {
    pub const ALL: [InteractionMode; 4] = [
        InteractionMode::Drag,
        InteractionMode::Rotate,
        InteractionMode::Scale,
        InteractionMode::Fixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::Fixed => "fixed",
        }
    }

    pub fn metadata(&self) -> &'static ModeMetadata {
        match self {
            Self::Drag => &MODE_TABLE[0],
            Self::Rotate => &MODE_TABLE[1],
            Self::Scale => &MODE_TABLE[2],
            Self::Fixed => &MODE_TABLE[3],
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a mode name is not one of the four known modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown interaction mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for InteractionMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        InteractionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownMode(name.to_string()))
    }
}

/// Tracks the active mode. Starts in `Drag` and has no terminal state.
#[derive(Debug, Clone, Default)]
pub struct InteractionModeController {
    current: InteractionMode,
}

impl InteractionModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> InteractionMode {
        self.current
    }

    pub fn metadata(&self) -> &'static ModeMetadata {
        self.current.metadata()
    }

    /// Switch to `mode`. Returns `false` (and does nothing) if already active.
    pub fn switch_to(&mut self, mode: InteractionMode) -> bool {
        if self.current == mode {
            return false;
        }
        info!(from = %self.current, to = %mode, "interaction mode switched");
        self.current = mode;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_drag() {
        let controller = InteractionModeController::new();
        assert_eq!(controller.current(), InteractionMode::Drag);
        assert_eq!(controller.metadata().base_color, "#00FFFF");
    }

    #[test]
    fn switching_to_current_mode_is_a_noop() {
        let mut controller = InteractionModeController::new();
        assert!(!controller.switch_to(InteractionMode::Drag));
        assert!(controller.switch_to(InteractionMode::Rotate));
        assert!(!controller.switch_to(InteractionMode::Rotate));
        assert_eq!(controller.current(), InteractionMode::Rotate);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Scale".parse::<InteractionMode>(), Ok(InteractionMode::Scale));
        assert_eq!(" fixed ".parse::<InteractionMode>(), Ok(InteractionMode::Fixed));
        assert!("zoom".parse::<InteractionMode>().is_err());
    }

    #[test]
    fn metadata_table_matches_modes() {
        for mode in InteractionMode::ALL {
            assert_eq!(mode.metadata().mode, mode);
            assert_eq!(mode.metadata().label.to_lowercase(), mode.as_str());
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&InteractionMode::Rotate).unwrap(), "\"rotate\"");
    }
}
