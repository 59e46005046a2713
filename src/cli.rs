use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::{env, fs::File, io::BufReader, process::Command};

use bubblectl::PointerPhase;

use crate::config::ConfigState;
use crate::ipc;
use crate::replay;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // Hidden daemon mode (spawned by `start`)
    if pargs.contains("--daemon") {
        return ipc::run_daemon();
    }

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    // Flags-based help (-h/--help)
    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("start") => {
            let exe = env::current_exe()?;
            let child = Command::new(exe).arg("--daemon").spawn()?;
            println!("bubblectl: started daemon (pid={})", child.id());
            Ok(())
        }

        Some(op @ ("stop" | "status" | "reload" | "list" | "doctor")) => {
            let op = if op == "stop" { "shutdown" } else { op };
            let r = ipc::client_request(serde_json::json!({ "op": op }))?;
            print_response(&r);
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: bubblectl use <profile_name>"))?;
            let r = ipc::client_request(serde_json::json!({"op":"use","profile":name}))?;
            print_response(&r);
            Ok(())
        }

        Some("inject") => {
            // usage:
            //   bubblectl inject down 30 130
            //   bubblectl inject cancel
            let usage = "usage: bubblectl inject <down|move|up|cancel> [x y]";
            let phase: PointerPhase = pargs.free_from_str().map_err(|_| anyhow!(usage))?;
            let (x, y) = if phase == PointerPhase::Cancel {
                (0.0, 0.0)
            } else {
                let x: f64 = pargs.free_from_str().map_err(|_| anyhow!(usage))?;
                let y: f64 = pargs.free_from_str().map_err(|_| anyhow!(usage))?;
                (x, y)
            };
            let r = ipc::client_request(
                serde_json::json!({"op":"inject","phase":phase,"x":x,"y":y}),
            )?;
            print_response(&r);
            Ok(())
        }

        Some("replay") => {
            let path: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: bubblectl replay <script.jsonl>"))?;
            let cfg = ConfigState::load_or_install_default()?;
            let file =
                File::open(&path).map_err(|e| anyhow!("failed to open {path}: {e}"))?;
            for step in replay::replay(BufReader::new(file), &cfg.profile)? {
                println!("{}", serde_json::to_string(&step)?);
            }
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!(
        r#"bubblectl — floating volume bubble daemon

USAGE:
  bubblectl help [command]                 Show general or command-specific help
  bubblectl start                          Start the daemon
  bubblectl stop                           Stop the daemon
  bubblectl status                         Show bubble position and drag state
  bubblectl reload                         Reload active profile
  bubblectl use <name>                     Switch active profile
  bubblectl list                           List profiles
  bubblectl doctor                         Diagnose permissions/devices
  bubblectl inject <phase> [x y]           Send a pointer event to the daemon
  bubblectl replay <script.jsonl>          Run a pointer script offline

TIPS:
  - Profiles: ~/.config/bubblectl/profiles
  - Active profile pointer: ~/.config/bubblectl/active
  - RUST_LOG=debug shows every gesture transition
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "start" => println!("usage: bubblectl start\nStarts the background daemon."),
        "stop" => println!("usage: bubblectl stop\nStops the running daemon."),
        "status" => println!(
            "usage: bubblectl status\nShows active profile, bubble position, dragging and near-trash state."
        ),
        "reload" => println!(
            "usage: bubblectl reload\nReloads the current profile; keeps last good on error."
        ),
        "use" => {
            println!("usage: bubblectl use <name>\nSwitches active profile to <name> and reloads.")
        }
        "list" => println!("usage: bubblectl list\nLists available profiles."),
        "doctor" => println!(
            "usage: bubblectl doctor\nChecks permissions and lists detected touchscreens."
        ),
        "inject" => println!(
            "usage: bubblectl inject <down|move|up|cancel> [x y]\nFeeds one pointer event to the running daemon, in screen pixels."
        ),
        "replay" => println!(
            "usage: bubblectl replay <script.jsonl>\nRuns one JSON pointer event per line through the active profile and prints each outcome."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
