//! Pointer events as delivered by the screen host.

use serde::{Deserialize, Serialize};

/// Absolute screen coordinates of one pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The host revoked the gesture.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    #[serde(flatten)]
    pub sample: PointerSample,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            sample: PointerSample::new(x, y),
        }
    }

    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    pub fn cancel() -> Self {
        Self::new(PointerPhase::Cancel, 0.0, 0.0)
    }
}

impl std::str::FromStr for PointerPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "down" => Ok(Self::Down),
            "move" => Ok(Self::Move),
            "up" => Ok(Self::Up),
            "cancel" => Ok(Self::Cancel),
            other => Err(format!("unknown pointer phase: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_line() {
        let ev: PointerEvent = serde_json::from_str(r#"{"phase":"move","x":12.5,"y":40}"#).unwrap();
        assert_eq!(ev, PointerEvent::moved(12.5, 40.0));
    }

    #[test]
    fn phase_from_str_is_case_insensitive() {
        assert_eq!("UP".parse::<PointerPhase>(), Ok(PointerPhase::Up));
        assert!("hover".parse::<PointerPhase>().is_err());
    }
}
