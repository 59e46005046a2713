//! The engine thread. It is the only owner of the bubble state machine; every
//! pointer event, from the touchscreen or from IPC, reaches it through one
//! channel so events are handled strictly one at a time.

use anyhow::Result;
use log::{debug, error, info};
use serde::Serialize;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use bubblectl::{
    BubbleController, BubblePosition, Collaborators, Lifecycle, Outcome, PointerEvent, Signal,
};

use super::dispatch::TapAction;
use super::server::IpcMsg;
use crate::actions::ActionSink;
use crate::config::Profile;
use crate::screen::VirtualScreen;

pub enum EngineMsg {
    Pointer(PointerEvent),
    Profile(Box<Profile>),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStatus {
    pub position: BubblePosition,
    pub dragging: bool,
    pub near_trash: bool,
    pub last_outcome: Option<Outcome>,
    pub removed: bool,
}

/// Asks the daemon to exit once the bubble is thrown away.
struct ShutdownOnDelete {
    tx: Sender<IpcMsg>,
    sent: bool,
}

impl Lifecycle for ShutdownOnDelete {
    fn terminate(&mut self) {
        if std::mem::replace(&mut self.sent, true) {
            return;
        }
        let _ = self.tx.send(IpcMsg::Shutdown);
    }
}

pub struct Engine {
    profile: Profile,
    screen: VirtualScreen,
    controller: BubbleController,
    sink: ActionSink,
    feedback: Sender<Signal>,
    lifecycle: ShutdownOnDelete,
    status: Arc<Mutex<EngineStatus>>,
}

impl Engine {
    pub fn new(
        profile: Profile,
        sink: ActionSink,
        feedback: Sender<Signal>,
        tx_req: Sender<IpcMsg>,
        status: Arc<Mutex<EngineStatus>>,
    ) -> Self {
        let screen = VirtualScreen::from_profile(&profile);
        let controller =
            BubbleController::new(screen.bubble_position(), profile.thresholds.tuning());
        let engine = Self {
            profile,
            screen,
            controller,
            sink,
            feedback,
            lifecycle: ShutdownOnDelete {
                tx: tx_req,
                sent: false,
            },
            status,
        };
        engine.publish(None);
        engine
    }

    /// Handles one event. Returns `false` once the bubble is gone.
    pub fn handle(&mut self, msg: EngineMsg) -> bool {
        match msg {
            EngineMsg::Pointer(event) => {
                let mut tap = TapAction {
                    profile: &self.profile,
                    sink: &mut self.sink,
                };
                let mut c = Collaborators {
                    host: &mut self.screen,
                    volume: &mut tap,
                    lifecycle: &mut self.lifecycle,
                    feedback: &mut self.feedback,
                };
                let outcome = self.controller.handle(event, &mut c);
                if outcome != Outcome::Ignored {
                    debug!("{:?} -> {outcome:?}", event.phase);
                }
                self.publish(Some(outcome));
                outcome != Outcome::Deleted
            }
            EngineMsg::Profile(profile) => {
                self.controller.retune(profile.thresholds.tuning());
                self.screen.apply_profile(&profile);
                self.profile = *profile;
                info!("engine: profile applied");
                true
            }
        }
    }

    fn publish(&self, outcome: Option<Outcome>) {
        let mut st = self.status.lock().unwrap_or_else(|e| e.into_inner());
        st.position = self.controller.position();
        st.dragging = self.controller.is_dragging();
        st.near_trash = matches!(outcome, Some(Outcome::Dragged { near: true, .. }));
        st.removed = outcome == Some(Outcome::Deleted);
        if outcome.is_some_and(|o| o != Outcome::Ignored) {
            st.last_outcome = outcome;
        }
    }

    pub fn run(mut self, rx: Receiver<EngineMsg>) {
        for msg in rx {
            if !self.handle(msg) {
                info!("engine: bubble removed, stopping");
                return;
            }
        }
    }
}

pub struct EngineThread {
    tx: Sender<EngineMsg>,
    _thread: thread::JoinHandle<()>,
}

impl EngineThread {
    pub fn start(
        profile: Profile,
        feedback: Sender<Signal>,
        tx_req: Sender<IpcMsg>,
        status: Arc<Mutex<EngineStatus>>,
    ) -> Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel::<EngineMsg>();
        let handle = thread::Builder::new().name("engine".into()).spawn(move || {
            let engine = Engine::new(profile, ActionSink::new(), feedback, tx_req, status);
            engine.run(rx);
        })?;
        Ok(Self {
            tx,
            _thread: handle,
        })
    }

    pub fn sender(&self) -> Sender<EngineMsg> {
        self.tx.clone()
    }

    pub fn update_profile(&self, profile: Profile) {
        if self.tx.send(EngineMsg::Profile(Box::new(profile))).is_err() {
            error!("engine is gone; profile update dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_profile_text;

    fn engine() -> (Engine, std::sync::mpsc::Receiver<Signal>, std::sync::mpsc::Receiver<IpcMsg>) {
        let mut profile = Profile::parse(default_profile_text()).unwrap();
        // keep tests from spawning anything
        profile.actions.tap = "key:CTRL+EQUAL".into();
        let (tx_sig, rx_sig) = std::sync::mpsc::channel();
        let (tx_req, rx_req) = std::sync::mpsc::channel();
        let status = Arc::new(Mutex::new(EngineStatus::default()));
        let engine = Engine::new(profile, ActionSink::noop(), tx_sig, tx_req, status);
        (engine, rx_sig, rx_req)
    }

    fn ptr(e: PointerEvent) -> EngineMsg {
        EngineMsg::Pointer(e)
    }

    #[test]
    fn drag_updates_status() {
        let (mut engine, rx_sig, _rx_req) = engine();
        assert!(engine.handle(ptr(PointerEvent::down(10.0, 110.0))));
        assert!(engine.handle(ptr(PointerEvent::moved(810.0, 610.0))));
        {
            let st = engine.status.lock().unwrap();
            assert!(st.dragging);
            assert_eq!(st.position, BubblePosition::new(800, 600));
        }
        assert!(engine.handle(ptr(PointerEvent::up(810.0, 610.0))));

        let st = engine.status.lock().unwrap().clone();
        assert!(!st.dragging);
        // 1080 wide screen, 64 px bubble
        assert_eq!(st.position, BubblePosition::new(1016, 600));
        assert_eq!(rx_sig.try_iter().last(), Some(Signal::DragEnded));
    }

    #[test]
    fn drop_on_trash_requests_shutdown() {
        let (mut engine, rx_sig, rx_req) = engine();
        engine.handle(ptr(PointerEvent::down(0.0, 100.0)));
        engine.handle(ptr(PointerEvent::moved(500.0, 2150.0)));
        assert!(engine.status.lock().unwrap().near_trash);
        assert!(!engine.handle(ptr(PointerEvent::up(500.0, 2150.0))));

        assert!(matches!(rx_req.try_recv(), Ok(IpcMsg::Shutdown)));
        assert!(rx_req.try_recv().is_err());
        assert!(rx_sig.try_iter().any(|s| s == Signal::Removing));
        assert!(engine.status.lock().unwrap().removed);
    }

    #[test]
    fn profile_update_retunes() {
        let (mut engine, _rx_sig, _rx_req) = engine();
        let mut profile = engine.profile.clone();
        profile.thresholds.touch_slop = 50.0;
        engine.handle(EngineMsg::Profile(Box::new(profile)));

        engine.handle(ptr(PointerEvent::down(0.0, 0.0)));
        engine.handle(ptr(PointerEvent::up(40.0, 40.0)));
        let st = engine.status.lock().unwrap();
        assert_eq!(st.last_outcome, Some(Outcome::Tapped));
        assert_eq!(st.position, BubblePosition::new(0, 100));
    }
}
