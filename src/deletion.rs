use log::info;

use crate::host::{Feedback, Lifecycle, Signal};

/// Removes the overlay after a drop on the trash.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeletionTrigger;

impl DeletionTrigger {
    pub fn fire(&self, feedback: &mut dyn Feedback, lifecycle: &mut dyn Lifecycle) {
        info!("bubble dropped on trash; removing overlay");
        feedback.signal(Signal::Removing);
        lifecycle.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_then_terminates_once() {
        let mut signals: Vec<Signal> = Vec::new();
        let mut terminated = 0;
        DeletionTrigger.fire(&mut signals, &mut || terminated += 1);

        assert_eq!(signals, vec![Signal::Removing]);
        assert_eq!(terminated, 1);
    }
}
