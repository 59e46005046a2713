use anyhow::{Result, anyhow};
use log::error;

use bubblectl::VolumeControl;

use crate::actions::{Action, ActionSink};
use crate::config::Profile;

pub fn dispatch_tap(profile: &Profile, sink: &mut ActionSink) -> Result<()> {
    let binding = profile.actions.tap.trim();
    if binding.is_empty() {
        return Ok(());
    }
    let action = Action::parse(binding)?;
    if matches!(action, Action::Cmd(_)) && !profile.meta.allow_commands {
        return Err(anyhow!("tap action '{binding}' needs allow_commands=true"));
    }
    sink.run(&action)
}

/// The tap binding of the active profile, as seen by the bubble core.
pub struct TapAction<'a> {
    pub profile: &'a Profile,
    pub sink: &'a mut ActionSink,
}

impl VolumeControl for TapAction<'_> {
    fn reveal(&mut self) {
        if let Err(e) = dispatch_tap(self.profile, self.sink) {
            error!("tap action failed: {e}");
        }
    }
}
