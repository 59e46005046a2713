//! Runs a recorded pointer script through the bubble core without a daemon.
//!
//! One JSON event per line, e.g. `{"phase":"down","x":30,"y":130}`. Blank
//! lines and lines starting with `#` are skipped.

use anyhow::{Result, anyhow};
use serde::Serialize;
use std::io::BufRead;

use bubblectl::{BubbleController, Collaborators, Outcome, PointerEvent, Signal};

use crate::config::Profile;
use crate::screen::VirtualScreen;

#[derive(Debug, Serialize)]
pub struct ReplayStep {
    pub line: usize,
    pub event: PointerEvent,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub signals: Vec<Signal>,
}

pub fn replay<R: BufRead>(reader: R, profile: &Profile) -> Result<Vec<ReplayStep>> {
    let mut screen = VirtualScreen::from_profile(profile);
    let mut controller =
        BubbleController::new(screen.bubble_position(), profile.thresholds.tuning());
    let mut steps = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: PointerEvent = serde_json::from_str(trimmed)
            .map_err(|e| anyhow!("line {}: {e}", idx + 1))?;

        // taps and deletions show up in the outcome, nothing to run here
        let mut volume = || {};
        let mut lifecycle = || {};
        let mut signals: Vec<Signal> = Vec::new();
        let mut c = Collaborators {
            host: &mut screen,
            volume: &mut volume,
            lifecycle: &mut lifecycle,
            feedback: &mut signals,
        };
        let outcome = controller.handle(event, &mut c);
        steps.push(ReplayStep {
            line: idx + 1,
            event,
            outcome,
            signals,
        });
        if outcome == Outcome::Deleted {
            break;
        }
    }
    Ok(steps)
}
