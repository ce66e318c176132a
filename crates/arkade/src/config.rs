use crate::events::AppEvent;
use crate::mode::Mode;
use crate::smoothing::{SpringParams, Weighting};
use async_channel::Sender;
use directories::ProjectDirs;
use handmark::pose::DEFAULT_TILT_THRESHOLD;
use handmark::{FrameSize, PinchThreshold};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Which preset the layered configuration starts from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    #[strum(to_string = "main", serialize = "performance")]
    Main,
    #[strum(to_string = "onboarding", serialize = "tutorial")]
    Onboarding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Frames are ignored for this long after start while the tracker settles.
    pub warmup_ms: f64,
    /// Hand state is reset after this long without a detection.
    pub timeout_ms: f64,
    pub buffer_size: usize,
    pub weighting: Weighting,
    pub max_hands: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 2000.0,
            timeout_ms: 5000.0,
            buffer_size: 2,
            weighting: Weighting::Exponential,
            max_hands: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PinchConfig {
    pub threshold: PinchThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub gesture_cooldown_ms: f64,
    pub menu_open_delay_ms: f64,
    pub long_press_duration_ms: f64,
    /// Moving-average window of the control channels.
    pub smoothing_frames: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            gesture_cooldown_ms: 500.0,
            menu_open_delay_ms: 300.0,
            long_press_duration_ms: 500.0,
            smoothing_frames: 3,
        }
    }
}

/// What happens to an open menu when the controlling hand disappears.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuLossPolicy {
    #[default]
    Immediate,
    /// Close after `ms` unless a hand comes back first.
    Grace { ms: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub dead_zone_px: f64,
    pub radius_spring: SpringParams,
    pub item_spring: SpringParams,
    pub item_closed_scale: f64,
    pub item_open_scale: f64,
    pub item_hover_scale: f64,
    pub highlight_scale: f64,
    pub highlight_ms: f64,
    /// Delay between consecutive items growing in when the menu opens.
    pub stagger_ms: f64,
    pub release_close_delay_ms: f64,
    pub loss_policy: MenuLossPolicy,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            dead_zone_px: 80.0,
            radius_spring: SpringParams::new(0.3, 0.6),
            item_spring: SpringParams::new(0.3, 0.6),
            item_closed_scale: 0.0,
            item_open_scale: 1.0,
            item_hover_scale: 1.0,
            highlight_scale: 1.0,
            highlight_ms: 0.0,
            stagger_ms: 50.0,
            release_close_delay_ms: 0.0,
            loss_policy: MenuLossPolicy::Immediate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThumbsUpConfig {
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub tilt_threshold_deg: f64,
    pub show_delay_ms: f64,
    pub hide_delay_ms: f64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            tilt_threshold_deg: DEFAULT_TILT_THRESHOLD,
            show_delay_ms: 500.0,
            hide_delay_ms: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub duration_ms: f64,
    /// Hand distance in pixels mapped to 0 before any calibration.
    pub min_distance: f64,
    /// Hand distance in pixels mapped to 127 before any calibration.
    pub max_distance: f64,
    pub min_margin: f64,
    pub max_margin: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3000.0,
            min_distance: 20.0,
            max_distance: 800.0,
            min_margin: 0.8,
            max_margin: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanningConfig {
    /// Slider ends as fractions of the frame width.
    pub slider_start: f64,
    pub slider_end: f64,
    /// Within this many pixels of the slider centre the value snaps to 64.
    pub magnet_px: f64,
}

impl Default for PanningConfig {
    fn default() -> Self {
        Self {
            slider_start: 0.10,
            slider_end: 0.90,
            magnet_px: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
    pub base: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualsConfig {
    pub sphere: SizeRange,
    pub hourglass: SizeRange,
    pub size_spring: SpringParams,
    pub pan_spring: SpringParams,
}

impl Default for VisualsConfig {
    fn default() -> Self {
        Self {
            sphere: SizeRange {
                min: 30.0,
                max: 350.0,
                base: 150.0,
            },
            hourglass: SizeRange {
                min: 30.0,
                max: 250.0,
                base: 100.0,
            },
            size_spring: SpringParams::new(0.03, 0.6),
            pan_spring: SpringParams::new(0.05, 0.7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub initial_mode: Mode,
    pub canvas: FrameSize,
    pub tracking: TrackingConfig,
    pub pinch: PinchConfig,
    pub timing: TimingConfig,
    pub menu: MenuConfig,
    pub thumbs_up: ThumbsUpConfig,
    pub advisory: AdvisoryConfig,
    pub calibration: CalibrationConfig,
    pub panning: PanningConfig,
    pub visuals: VisualsConfig,
}

impl Config {
    pub fn preset(profile: Profile) -> Self {
        match profile {
            Profile::Main => Self::default(),
            Profile::Onboarding => Self {
                tracking: TrackingConfig {
                    buffer_size: 5,
                    weighting: Weighting::Uniform,
                    ..TrackingConfig::default()
                },
                pinch: PinchConfig {
                    threshold: PinchThreshold::Fixed { distance: 0.035 },
                },
                menu: MenuConfig {
                    radius_spring: SpringParams::new(0.2, 0.7),
                    item_spring: SpringParams::new(0.3, 0.95),
                    item_closed_scale: 1.0,
                    item_hover_scale: 1.1,
                    highlight_scale: 1.2,
                    highlight_ms: 150.0,
                    stagger_ms: 0.0,
                    release_close_delay_ms: 200.0,
                    loss_policy: MenuLossPolicy::Grace { ms: 500.0 },
                    ..MenuConfig::default()
                },
                ..Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.tracking.buffer_size == 0 {
            return invalid("tracking.buffer_size must be at least 1".into());
        }
        if self.tracking.max_hands == 0 {
            return invalid("tracking.max_hands must be at least 1".into());
        }
        if self.timing.smoothing_frames == 0 {
            return invalid("timing.smoothing_frames must be at least 1".into());
        }
        if self.canvas.width <= 0.0 || self.canvas.height <= 0.0 {
            return invalid(format!(
                "canvas must have a positive size, got {}x{}",
                self.canvas.width, self.canvas.height
            ));
        }

        let springs = [
            ("menu.radius_spring", self.menu.radius_spring),
            ("menu.item_spring", self.menu.item_spring),
            ("visuals.size_spring", self.visuals.size_spring),
            ("visuals.pan_spring", self.visuals.pan_spring),
        ];
        if let Some((name, params)) = springs.iter().find(|(_, p)| !p.is_valid()) {
            return invalid(format!(
                "{name} needs stiffness and damping in (0, 1), got {}/{}",
                params.stiffness, params.damping
            ));
        }

        if self.calibration.min_distance >= self.calibration.max_distance {
            return invalid(format!(
                "calibration.min_distance ({}) must be below max_distance ({})",
                self.calibration.min_distance, self.calibration.max_distance
            ));
        }
        if self.panning.slider_start >= self.panning.slider_end {
            return invalid("panning.slider_start must be below slider_end".into());
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "arkade", "arkade").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config(profile: Profile) -> Result<Config, ConfigError> {
    load_config_from(profile, &get_config_path()?)
}

/// Preset, then the TOML file at `path` if it exists, then `ARKADE_*`
/// environment variables (`ARKADE_TRACKING__BUFFER_SIZE=4`).
pub fn load_config_from(profile: Profile, path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::Config::try_from(&Config::preset(profile))?)
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(
            config::Environment::with_prefix("ARKADE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_or_default(profile: Profile) -> Config {
    match load_config(profile) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using the {profile} preset, config could not be loaded: {e}");
            Config::preset(profile)
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Whether a watch event in the config directory should trigger a reload.
/// Reads are ignored, as are sibling files such as editor swap files.
fn is_config_event(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", ConfigError::from(e));
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                if is_config_event(&event, &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "arkade-{name}-{}.toml",
            std::process::id()
        ));
        fs_err::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("main".parse::<Profile>().unwrap(), Profile::Main);
        assert_eq!("Onboarding".parse::<Profile>().unwrap(), Profile::Onboarding);
        assert_eq!("tutorial".parse::<Profile>().unwrap(), Profile::Onboarding);
        let parsed: Profile = serde_json::from_str("\"MAIN\"").unwrap();
        assert_eq!(parsed, Profile::Main);
    }

    #[test]
    fn test_presets_are_valid() {
        for profile in [Profile::Main, Profile::Onboarding] {
            Config::preset(profile).validate().unwrap();
        }
    }

    #[test]
    fn test_presets_diverge() {
        let main = Config::preset(Profile::Main);
        let onboarding = Config::preset(Profile::Onboarding);

        assert_eq!(main.tracking.buffer_size, 2);
        assert_eq!(main.tracking.weighting, Weighting::Exponential);
        assert_eq!(main.menu.loss_policy, MenuLossPolicy::Immediate);

        assert_eq!(onboarding.tracking.buffer_size, 5);
        assert_eq!(onboarding.tracking.weighting, Weighting::Uniform);
        assert_eq!(
            onboarding.pinch.threshold,
            PinchThreshold::Fixed { distance: 0.035 }
        );
        assert_eq!(onboarding.menu.loss_policy, MenuLossPolicy::Grace { ms: 500.0 });
        assert_eq!(onboarding.timing, main.timing);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.tracking.buffer_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.menu.radius_spring = SpringParams::new(1.5, 0.6);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("menu.radius_spring"));

        let mut config = Config::default();
        config.calibration.min_distance = 900.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_yields_preset() {
        let path = std::env::temp_dir().join("arkade-does-not-exist.toml");
        let config = load_config_from(Profile::Onboarding, &path).unwrap();
        assert_eq!(config, Config::preset(Profile::Onboarding));
    }

    #[test]
    fn test_file_overrides_preset() {
        let path = temp_config(
            "override",
            r#"
initial_mode = "pan"

[tracking]
buffer_size = 4

[pinch.threshold]
kind = "fixed"
distance = 0.04

[menu.loss_policy]
kind = "grace"
ms = 250
"#,
        );
        let config = load_config_from(Profile::Main, &path).unwrap();
        fs_err::remove_file(&path).unwrap();

        assert_eq!(config.initial_mode, Mode::Panning);
        assert_eq!(config.tracking.buffer_size, 4);
        // untouched keys keep the preset value
        assert_eq!(config.tracking.timeout_ms, 5000.0);
        assert_eq!(config.pinch.threshold, PinchThreshold::Fixed { distance: 0.04 });
        assert_eq!(config.menu.loss_policy, MenuLossPolicy::Grace { ms: 250.0 });
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let path = temp_config("invalid", "[timing]\nsmoothing_frames = 0\n");
        let result = load_config_from(Profile::Main, &path);
        fs_err::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_event_filter() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

        let path = PathBuf::from("/tmp/arkade/config.toml");
        let event = |kind, p: &str| Event::new(kind).add_path(PathBuf::from(p));

        assert!(is_config_event(
            &event(EventKind::Modify(ModifyKind::Any), "/tmp/arkade/config.toml"),
            &path
        ));
        assert!(is_config_event(
            &event(EventKind::Create(CreateKind::File), "/tmp/arkade/config.toml"),
            &path
        ));
        assert!(is_config_event(
            &event(EventKind::Remove(RemoveKind::File), "/tmp/arkade/config.toml"),
            &path
        ));
        assert!(!is_config_event(
            &event(EventKind::Access(AccessKind::Any), "/tmp/arkade/config.toml"),
            &path
        ));
        assert!(!is_config_event(
            &event(EventKind::Modify(ModifyKind::Any), "/tmp/arkade/.config.toml.swp"),
            &path
        ));
    }

    #[test]
    fn test_bundled_default_config_parses() {
        let path = temp_config("bundled", DEFAULT_CONFIG);
        let config = load_config_from(Profile::Main, &path).unwrap();
        fs_err::remove_file(&path).unwrap();
        assert_eq!(config, Config::preset(Profile::Main));
    }
}
