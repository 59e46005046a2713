use anyhow::{Result, anyhow};
use directories::UserDirs;
use log::{info, warn};
use serde::Deserialize;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use bubblectl::Tuning;

use crate::actions::Action;

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
    #[serde(default)]
    pub allow_commands: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Tap/drag boundary, in density-independent pixels.
    #[serde(default = "default_touch_slop")]
    pub touch_slop: f64,
    /// Bubble-to-trash distance below which a drop deletes, in screen pixels.
    #[serde(default = "default_trash_distance")]
    pub trash_distance: f64,
    /// Screen pixels per density-independent pixel.
    #[serde(default = "default_density")]
    pub density: f64,
}

fn default_touch_slop() -> f64 {
    10.0
}
fn default_trash_distance() -> f64 {
    300.0
}
fn default_density() -> f64 {
    1.0
}

impl Thresholds {
    pub fn tuning(&self) -> Tuning {
        Tuning {
            touch_slop: self.touch_slop * self.density,
            trash_distance: self.trash_distance,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenGeometry {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BubbleGeometry {
    #[serde(default)]
    pub x: i32,
    #[serde(default = "default_bubble_y")]
    pub y: i32,
    /// 0 leaves the bubble unmeasured.
    pub size: i32,
}

fn default_bubble_y() -> i32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrashGeometry {
    pub size: i32,
    #[serde(default)]
    pub bottom_margin: i32,
}

/// Raw axis ranges of the touch device, mapped onto the virtual screen.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub device: Option<String>,
    #[serde(default)]
    pub x_min: i32,
    #[serde(default = "default_axis_max")]
    pub x_max: i32,
    #[serde(default)]
    pub y_min: i32,
    #[serde(default = "default_axis_max")]
    pub y_max: i32,
}

fn default_axis_max() -> i32 {
    4096
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device: None,
            x_min: 0,
            x_max: default_axis_max(),
            y_min: 0,
            y_max: default_axis_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Actions {
    #[serde(default)]
    pub tap: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    pub thresholds: Thresholds,
    pub screen: ScreenGeometry,
    pub bubble: BubbleGeometry,
    pub trash: TrashGeometry,
    #[serde(default)]
    pub input: InputConfig,
    pub actions: Actions,
}

impl Profile {
    pub fn parse(txt: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub active_name: String,
    pub profile: Profile,
    pub config_dir: PathBuf,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

pub fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("bubblectl"))
}

pub fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

impl ConfigState {
    pub fn load_or_install_default() -> Result<Self> {
        Self::load_or_install_in(config_dir()?)
    }

    pub fn load_or_install_in(cfgdir: PathBuf) -> Result<Self> {
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            let mut f = fs::File::create(&active_ptr)?;
            f.write_all(b"default")?;
        }

        let mut active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        if active_name.is_empty() {
            warn!("empty active profile pointer; using 'default'");
            active_name = "default".to_string();
        }
        let profile = load_profile(&profdir, &active_name)?;

        Ok(Self {
            active_name,
            profile,
            config_dir: cfgdir,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    /// Re-reads the active profile. On error the current one stays in place.
    pub fn reload(&mut self) -> Result<()> {
        self.profile = load_profile(&self.profiles_dir, &self.active_name)?;
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let p = self.profiles_dir.join(format!("{name}.toml"));
        if !p.exists() {
            return Err(anyhow!("profile not found: {}", p.display()));
        }
        let profile = load_profile(&self.profiles_dir, name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = profile;
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }

    pub fn doctor_report(&self) -> serde_json::Value {
        let uinput_ok = Path::new("/dev/uinput").exists();
        let in_input_group = check_in_input_group();
        let devices: Vec<String> = crate::input::discover_touchscreens()
            .into_iter()
            .map(|d| format!("{} ({})", d.name, d.path))
            .collect();
        serde_json::json!({
            "uinput_present": uinput_ok,
            "input_group_member": in_input_group,
            "config_dir": self.config_dir,
            "profiles_dir": self.profiles_dir,
            "active_profile": self.active_name,
            "profile_name": self.profile.meta.name,
            "configured_device": self.profile.input.device,
            "devices": devices,
            "hints": {
                "udev_rule": "/etc/udev/rules.d/80-uinput.rules",
                "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
            }
        })
    }
}

fn load_profile(profiles_dir: &Path, name: &str) -> Result<Profile> {
    let path = profiles_dir.join(format!("{name}.toml"));
    let txt = fs::read_to_string(&path)
        .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    Profile::parse(&txt).map_err(|e| anyhow!("failed to load {}: {e}", path.display()))
}

fn validate_profile(p: &Profile) -> Result<()> {
    let th = &p.thresholds;
    if !(th.touch_slop > 0.0 && th.trash_distance > 0.0 && th.density > 0.0) {
        return Err(anyhow!(
            "thresholds.touch_slop, trash_distance and density must be positive"
        ));
    }
    if p.screen.width <= 0 || p.screen.height <= 0 {
        return Err(anyhow!("screen dimensions must be positive"));
    }
    if p.bubble.size < 0 || p.trash.size < 0 {
        return Err(anyhow!("bubble and trash sizes cannot be negative"));
    }
    if p.input.x_max <= p.input.x_min || p.input.y_max <= p.input.y_min {
        return Err(anyhow!("input axis ranges must be non-empty"));
    }

    let tap = p.actions.tap.trim();
    if tap.is_empty() {
        return Err(anyhow!("actions.tap is empty"));
    }
    let action = Action::parse(tap)?;
    if matches!(action, Action::Cmd(_)) && !p.meta.allow_commands {
        return Err(anyhow!("actions.tap uses cmd: but allow_commands=false"));
    }
    Ok(())
}

fn check_in_input_group() -> bool {
    if let Ok(s) = fs::read_to_string("/etc/group") {
        let user = whoami::username();
        for line in s.lines() {
            if line.starts_with("input:") {
                if line
                    .split(':')
                    .nth(3)
                    .unwrap_or("")
                    .split(',')
                    .any(|u| u == user)
                {
                    return true;
                }
            }
        }
    }
    false
}
