use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use std::process::Command;
use std::thread;

/// What the bubble does when tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Shell command, spawned and not waited on.
    Cmd(String),
    /// Key chord like "CTRL+EQUAL", sent through a virtual keyboard.
    Key(String),
}

impl Action {
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix("cmd:") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Err(anyhow!("cmd: action needs a command"));
            }
            return Ok(Self::Cmd(rest.to_string()));
        }
        if let Some(rest) = s.strip_prefix("key:") {
            let chord = rest.trim();
            for tok in chord.split('+') {
                check_key(tok.trim())?;
            }
            return Ok(Self::Key(chord.to_string()));
        }
        Err(anyhow!("invalid action '{s}' (expected cmd:... or key:...)"))
    }
}

pub struct ActionSink {
    keyboard: Option<Box<LinuxUinput>>,
}

impl ActionSink {
    /// Opens the virtual keyboard, or falls back to commands only.
    pub fn new() -> Self {
        match LinuxUinput::create() {
            Ok(dev) => Self {
                keyboard: Some(Box::new(dev)),
            },
            Err(e) => {
                warn!("uinput not available ({e}); key: actions are disabled");
                Self::noop()
            }
        }
    }

    pub fn noop() -> Self {
        Self { keyboard: None }
    }

    pub fn run(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Cmd(cmd) => spawn_command(cmd),
            Action::Key(chord) => self.key_chord(chord),
        }
    }

    /// Send a chord like "CTRL+EQUAL" or single "TAB"
    pub fn key_chord(&mut self, chord: &str) -> Result<()> {
        let Some(dev) = self.keyboard.as_mut() else {
            debug!("no virtual keyboard; dropping chord {chord}");
            return Ok(());
        };
        let keys = chord
            .split('+')
            .map(|s| map_key(&s.trim().to_ascii_uppercase()))
            .collect::<Result<Vec<_>>>()?;
        // press in order
        for k in &keys {
            dev.key_send(*k, 1)?;
        }
        dev.sync()?;
        // release in reverse
        for k in keys.iter().rev() {
            dev.key_send(*k, 0)?;
        }
        dev.sync()
    }
}

fn spawn_command(cmd: &str) -> Result<()> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .spawn()
        .map_err(|e| anyhow!("failed to spawn '{cmd}': {e}"))?;
    info!("spawned '{cmd}' (pid={})", child.id());
    // reap in the background so the engine never waits on the child
    thread::spawn(move || {
        if let Err(e) = child.wait() {
            warn!("waiting for action command failed: {e}");
        }
    });
    Ok(())
}

fn check_key(tok: &str) -> Result<()> {
    map_key(&tok.to_ascii_uppercase()).map(|_| ())
}

fn map_key(tok: &str) -> Result<uinput::event::keyboard::Key> {
    use uinput::event::keyboard::Key as K;
    let k = match tok {
        "CTRL" | "CONTROL" => K::LeftControl,
        "ALT" => K::LeftAlt,
        "SHIFT" => K::LeftShift,
        "SUPER" | "META" | "WIN" => K::LeftMeta,
        "TAB" => K::Tab,
        "MINUS" | "-" => K::Minus,
        "EQUAL" | "=" => K::Equal,
        other => return Err(anyhow!("unsupported key token: {other}")),
    };
    Ok(k)
}

struct LinuxUinput {
    dev: uinput::device::Device,
}

impl LinuxUinput {
    fn create() -> Result<Self> {
        use uinput::event::keyboard;

        let dev = uinput::default()?
            .name("Bubblectl Virtual Keyboard")?
            .event(keyboard::Key::LeftControl)?
            .event(keyboard::Key::LeftAlt)?
            .event(keyboard::Key::LeftShift)?
            .event(keyboard::Key::LeftMeta)?
            .event(keyboard::Key::Tab)?
            .event(keyboard::Key::Minus)?
            .event(keyboard::Key::Equal)?
            .create()?;

        info!("uinput: created virtual keyboard");
        Ok(Self { dev })
    }

    fn sync(&mut self) -> Result<()> {
        self.dev.synchronize()?;
        Ok(())
    }

    fn key_send(&mut self, key: uinput::event::keyboard::Key, val: i32) -> Result<()> {
        self.dev.send(key, val)?;
        Ok(())
    }
}
