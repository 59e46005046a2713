//! Touchscreen discovery & event stream (evdev 0.13.2 compatible)

use anyhow::{Result, anyhow};
use evdev::{AbsoluteAxisCode, Device, EventType, SynchronizationCode};
use log::{info, warn};
use std::sync::mpsc::Sender;
use std::thread;

use crate::config::{InputConfig, Profile};
use crate::ipc::EngineMsg;
use crate::tracker::TouchTracker;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

pub fn discover_touchscreens() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = std::fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            if p.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with("event"))
            {
                if let Ok(dev) = Device::open(&p) {
                    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
                    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
                        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
                            && a.contains(AbsoluteAxisCode::ABS_MT_TRACKING_ID)
                            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
                            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
                    });
                    if has_abs && has_mt {
                        out.push(DeviceInfo {
                            path: p.display().to_string(),
                            name: dev.name().unwrap_or("unknown").to_string(),
                        });
                    }
                }
            }
        }
    }
    out
}

fn pick_device(input: &InputConfig) -> Result<DeviceInfo> {
    if let Some(path) = &input.device {
        return Ok(DeviceInfo {
            path: path.clone(),
            name: "configured".into(),
        });
    }
    discover_touchscreens()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no touchscreen detected"))
}

pub struct InputThread {
    _thread: thread::JoinHandle<()>,
}

impl InputThread {
    /// Starts reading touches into `tx`. Without a device the daemon still
    /// runs; events can be injected over IPC.
    pub fn start(profile: &Profile, tx: Sender<EngineMsg>) -> Option<Self> {
        let info = match pick_device(&profile.input) {
            Ok(info) => info,
            Err(e) => {
                warn!("{e}; touch input disabled");
                return None;
            }
        };
        let dev = match Device::open(&info.path) {
            Ok(dev) => dev,
            Err(e) => {
                warn!("failed to open {}: {e}; touch input disabled", info.path);
                return None;
            }
        };
        info!("reading touches from {} ({})", info.name, info.path);

        let tracker = TouchTracker::new(&profile.input, profile.screen.width, profile.screen.height);
        let handle = thread::spawn(move || {
            if let Err(e) = read_loop(dev, tracker, tx) {
                warn!("touch input stopped: {e}");
            }
        });
        Some(Self { _thread: handle })
    }
}

fn read_loop(mut dev: Device, mut tracker: TouchTracker, tx: Sender<EngineMsg>) -> Result<()> {
    loop {
        for ev in dev.fetch_events()? {
            let out = if ev.event_type() == EventType::ABSOLUTE {
                match ev.code() {
                    c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => tracker.on_slot(ev.value()),
                    c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                        tracker.on_tracking_id(ev.value())
                    }
                    c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => tracker.on_pos_x(ev.value()),
                    c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => tracker.on_pos_y(ev.value()),
                    _ => {}
                }
                None
            } else if ev.event_type() == EventType::SYNCHRONIZATION {
                match ev.code() {
                    c if c == SynchronizationCode::SYN_REPORT.0 => tracker.on_syn_report(),
                    c if c == SynchronizationCode::SYN_DROPPED.0 => tracker.on_syn_dropped(),
                    _ => None,
                }
            } else {
                None
            };

            if let Some(event) = out {
                // engine gone means the daemon is shutting down
                if tx.send(EngineMsg::Pointer(event)).is_err() {
                    return Ok(());
                }
            }
        }
    }
}
