use anyhow::{Result, anyhow};
use log::{error, info, warn};
use notify::{RecursiveMode, Watcher};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::{
    io::{BufRead, BufReader, Write},
    os::unix::net::{UnixListener, UnixStream},
    sync::mpsc::Sender,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use bubblectl::{PointerEvent, PointerPhase};

use super::pipeline::{EngineMsg, EngineStatus, EngineThread};
use super::runtime::socket_path;
use crate::config::ConfigState;
use crate::feedback::FeedbackThread;
use crate::input::InputThread;

pub enum IpcMsg {
    Reload,
    UseProfile(String),
    Shutdown,
}

pub fn run_daemon() -> Result<()> {
    // socket
    let sock = socket_path()?;
    if sock.exists() {
        let _ = std::fs::remove_file(&sock);
    }
    let listener = UnixListener::bind(&sock)?;
    info!("daemon: listening on {}", sock.display());

    let result = serve(listener);
    let _ = std::fs::remove_file(&sock);
    info!("daemon: stopped");
    result
}

fn serve(listener: UnixListener) -> Result<()> {
    // state
    let mut cfg = ConfigState::load_or_install_default()?;
    info!("daemon: active profile '{}'", cfg.active_name);

    // channels
    let (tx_req, rx_req) = std::sync::mpsc::channel::<IpcMsg>();
    let (tx_sig, rx_sig) = std::sync::mpsc::channel();
    let status = Arc::new(Mutex::new(EngineStatus::default()));

    let _feedback = FeedbackThread::start(rx_sig)?;
    let engine = EngineThread::start(cfg.profile.clone(), tx_sig, tx_req.clone(), status.clone())?;
    let _input = InputThread::start(&cfg.profile, engine.sender());
    let _watcher = watch_profiles(&cfg, tx_req.clone());
    spawn_signal_handler(tx_req.clone())?;

    // accept loop
    listener.set_nonblocking(true)?;
    loop {
        if let Ok((stream, _)) = listener.accept() {
            let ctx = ClientCtx {
                cfg: cfg.clone(),
                status: status.clone(),
                tx_req: tx_req.clone(),
                tx_engine: engine.sender(),
            };
            thread::spawn(move || {
                if let Err(e) = handle_client(stream, ctx) {
                    error!("ipc client error: {e}");
                }
            });
        }

        while let Ok(msg) = rx_req.try_recv() {
            match msg {
                IpcMsg::Reload => {
                    if let Err(e) = cfg.reload() {
                        error!("reload failed, keeping last good profile: {e}");
                    } else {
                        engine.update_profile(cfg.profile.clone());
                        info!("profile reloaded");
                    }
                }
                IpcMsg::UseProfile(name) => {
                    if let Err(e) = cfg.set_active(&name) {
                        error!("use profile failed: {e}");
                    } else {
                        engine.update_profile(cfg.profile.clone());
                        info!("switched active profile to {}", cfg.active_name);
                    }
                }
                IpcMsg::Shutdown => {
                    return Ok(());
                }
            }
        }

        thread::sleep(Duration::from_millis(5));
    }
}

/// Reloads whenever something under the profiles directory changes.
fn watch_profiles(cfg: &ConfigState, tx_req: Sender<IpcMsg>) -> Option<notify::RecommendedWatcher> {
    let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
        Ok(ev) if ev.kind.is_modify() || ev.kind.is_create() => {
            let _ = tx_req.send(IpcMsg::Reload);
        }
        Ok(_) => {}
        Err(e) => warn!("profile watch error: {e}"),
    });
    let mut watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            warn!("cannot watch profiles: {e}");
            return None;
        }
    };
    if let Err(e) = watcher.watch(&cfg.profiles_dir, RecursiveMode::NonRecursive) {
        warn!("cannot watch {}: {e}", cfg.profiles_dir.display());
        return None;
    }
    Some(watcher)
}

fn spawn_signal_handler(tx_req: Sender<IpcMsg>) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("daemon: caught signal {sig}, shutting down");
            let _ = tx_req.send(IpcMsg::Shutdown);
        }
    });
    Ok(())
}

struct ClientCtx {
    cfg: ConfigState,
    status: Arc<Mutex<EngineStatus>>,
    tx_req: Sender<IpcMsg>,
    tx_engine: Sender<EngineMsg>,
}

fn handle_client(mut stream: UnixStream, ctx: ClientCtx) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim().is_empty() {
        return Ok(());
    }
    let req: serde_json::Value = serde_json::from_str(&line)?;
    let resp = match respond(&req, &ctx) {
        Ok(data) => serde_json::json!({"ok": true, "data": data}),
        Err(e) => serde_json::json!({"ok": false, "error": e.to_string()}),
    };
    writeln!(stream, "{resp}")?;
    Ok(())
}

fn respond(req: &serde_json::Value, ctx: &ClientCtx) -> Result<serde_json::Value> {
    let op = req.get("op").and_then(|v| v.as_str()).unwrap_or("");
    let cfg = &ctx.cfg;

    let data = match op {
        "status" => {
            let st = ctx.status.lock().unwrap_or_else(|e| e.into_inner()).clone();
            serde_json::json!({
                "active_profile": cfg.active_name,
                "socket": socket_path()?,
                "bubble": st,
            })
        }
        "reload" => {
            send_req(ctx, IpcMsg::Reload)?;
            serde_json::json!({"active_profile": cfg.active_name})
        }
        "use" => {
            let name = req.get("profile").and_then(|v| v.as_str()).unwrap_or("");
            if name.is_empty() {
                return Err(anyhow!("missing profile name"));
            }
            send_req(ctx, IpcMsg::UseProfile(name.to_string()))?;
            serde_json::json!({"active_profile": name})
        }
        "list" => {
            serde_json::json!({"profiles": cfg.list_profiles(), "active": cfg.active_name})
        }
        "doctor" => cfg.doctor_report(),
        "inject" => {
            let event = parse_injected(req)?;
            ctx.tx_engine
                .send(EngineMsg::Pointer(event))
                .map_err(|_| anyhow!("engine is not running"))?;
            serde_json::json!({"injected": event})
        }
        "shutdown" => {
            send_req(ctx, IpcMsg::Shutdown)?;
            serde_json::json!("shutting down")
        }
        _ => return Err(anyhow!("unknown op: {op}")),
    };
    Ok(data)
}

fn send_req(ctx: &ClientCtx, msg: IpcMsg) -> Result<()> {
    ctx.tx_req
        .send(msg)
        .map_err(|_| anyhow!("daemon is shutting down"))
}

fn parse_injected(req: &serde_json::Value) -> Result<PointerEvent> {
    let phase: PointerPhase = req
        .get("phase")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("inject needs a phase"))?
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let coord = |key: &str| req.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0);
    Ok(PointerEvent::new(phase, coord("x"), coord("y")))
}
