//! Configuration file – reads/writes `~/.trackfuse/config.toml`.
//!
//! Angles are written in degrees because that is how mounting offsets are
//! measured on the robot; they are converted to radians when building the
//! [`FusionConfig`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trackfuse_types::{FusionConfig, FusionError, RigidTransform, UncertaintyVector};

/// Persisted host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Control-loop period in milliseconds.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Number of ticks the simulation runs before exiting.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    #[serde(default)]
    pub fusion: FusionSettings,
}

/// The `[fusion]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Tracker mount relative to the robot reference point.
    #[serde(default)]
    pub offset: OffsetSettings,

    #[serde(default)]
    pub std_devs: StdDevSettings,
}

/// The `[fusion.offset]` table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetSettings {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

/// The `[fusion.std_devs]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StdDevSettings {
    pub x_m: f64,
    pub y_m: f64,
    pub heading_rad: f64,
}

fn default_tick_period_ms() -> u64 {
    20
}
fn default_ticks() -> u64 {
    500
}
fn default_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            ticks: default_ticks(),
            fusion: FusionSettings::default(),
        }
    }
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            offset: OffsetSettings::default(),
            std_devs: StdDevSettings::default(),
        }
    }
}

impl Default for StdDevSettings {
    fn default() -> Self {
        let d = UncertaintyVector::default();
        Self {
            x_m: d.x_m,
            y_m: d.y_m,
            heading_rad: d.heading_rad,
        }
    }
}

impl OffsetSettings {
    pub fn to_transform(&self) -> RigidTransform {
        RigidTransform::from_xyz_rpy(
            self.x_m,
            self.y_m,
            self.z_m,
            self.roll_deg.to_radians(),
            self.pitch_deg.to_radians(),
            self.yaw_deg.to_radians(),
        )
    }

    fn validate(&self) -> Result<(), FusionError> {
        let fields = [
            ("x_m", self.x_m),
            ("y_m", self.y_m),
            ("z_m", self.z_m),
            ("roll_deg", self.roll_deg),
            ("pitch_deg", self.pitch_deg),
            ("yaw_deg", self.yaw_deg),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, v)) => Err(FusionError::Config(format!(
                "offset `{name}` must be finite, got {v}"
            ))),
            None => Ok(()),
        }
    }
}

impl FusionSettings {
    /// Validate and convert into the engine's [`FusionConfig`].
    pub fn to_config(&self) -> Result<FusionConfig, FusionError> {
        self.offset.validate()?;
        let std_devs =
            UncertaintyVector::new(self.std_devs.x_m, self.std_devs.y_m, self.std_devs.heading_rad);
        std_devs.validate()?;
        Ok(FusionConfig::new(self.enabled, self.offset.to_transform(), std_devs))
    }
}

/// Return the path to `~/.trackfuse/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".trackfuse").join("config.toml")
}

/// Load settings from `path`, applying environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Settings>, FusionError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        FusionError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut settings: Settings = toml::from_str(&raw)
        .map_err(|e| FusionError::Config(format!("failed to parse {}: {e}", path.display())))?;
    apply_env_overrides(&mut settings);
    Ok(Some(settings))
}

/// Apply `TRACKFUSE_*` environment variable overrides to `settings`.
///
/// | Variable | Field |
/// |---|---|
/// | `TRACKFUSE_ENABLED` | `fusion.enabled` (`true`/`false`) |
/// | `TRACKFUSE_TICK_PERIOD_MS` | `tick_period_ms` |
/// | `TRACKFUSE_TICKS` | `ticks` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_with(settings, |key| std::env::var(key).ok());
}

/// Same as [`apply_env_overrides`] but reads variables through `lookup`.
pub(crate) fn apply_overrides_with<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("TRACKFUSE_ENABLED")
        && let Ok(enabled) = v.parse::<bool>()
    {
        settings.fusion.enabled = enabled;
    }
    if let Some(v) = lookup("TRACKFUSE_TICK_PERIOD_MS")
        && let Ok(ms) = v.parse::<u64>()
        && ms > 0
    {
        settings.tick_period_ms = ms;
    }
    if let Some(v) = lookup("TRACKFUSE_TICKS")
        && let Ok(n) = v.parse::<u64>()
    {
        settings.ticks = n;
    }
}

/// Write `settings` to `path`, creating the parent directory if necessary.
pub fn save_to(settings: &Settings, path: &Path) -> Result<(), FusionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            FusionError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    let raw = toml::to_string_pretty(settings)
        .map_err(|e| FusionError::Config(format!("failed to serialize settings: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| FusionError::Config(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Settings::default(), &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");

        assert_eq!(loaded.tick_period_ms, 20);
        assert!(loaded.fusion.enabled);
        assert_eq!(loaded.fusion.std_devs, StdDevSettings::default());
    }

    #[test]
    fn config_path_points_to_trackfuse_dir() {
        let p = config_path_for_home("/home/robot");
        assert!(p.to_string_lossy().contains(".trackfuse"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [fusion.offset]
            x_m = 0.3
            yaw_deg = 180.0
            "#,
        )
        .expect("parse");
        assert_eq!(settings.ticks, 500);
        assert!(settings.fusion.enabled);
        assert_eq!(settings.fusion.offset.x_m, 0.3);
        assert_eq!(settings.fusion.offset.z_m, 0.0);

        let config = settings.fusion.to_config().expect("valid");
        assert!((config.robot_to_tracker.translation.x - 0.3).abs() < 1e-12);
        assert!((config.robot_to_tracker.rotation.yaw().abs() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "tick_period_ms = \"fast\"").expect("write");
        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, FusionError::Config(_)));
    }

    #[test]
    fn invalid_std_dev_rejected() {
        let mut fusion = FusionSettings::default();
        fusion.std_devs.heading_rad = -1.0;
        assert!(fusion.to_config().is_err());
    }

    #[test]
    fn non_finite_offset_rejected() {
        let mut fusion = FusionSettings::default();
        fusion.offset.pitch_deg = f64::NAN;
        let err = fusion.to_config().unwrap_err();
        assert!(err.to_string().contains("pitch_deg"));
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn overrides_change_enabled_and_ticks() {
        let mut settings = Settings::default();
        apply_overrides_with(
            &mut settings,
            env(&[("TRACKFUSE_ENABLED", "false"), ("TRACKFUSE_TICKS", "42")]),
        );
        assert!(!settings.fusion.enabled);
        assert_eq!(settings.ticks, 42);
        assert_eq!(settings.tick_period_ms, 20);
    }

    #[test]
    fn overrides_ignore_invalid_period() {
        let mut settings = Settings::default();
        apply_overrides_with(&mut settings, env(&[("TRACKFUSE_TICK_PERIOD_MS", "0")]));
        assert_eq!(settings.tick_period_ms, 20);
        apply_overrides_with(&mut settings, env(&[("TRACKFUSE_TICK_PERIOD_MS", "soon")]));
        assert_eq!(settings.tick_period_ms, 20);
        apply_overrides_with(&mut settings, env(&[("TRACKFUSE_TICK_PERIOD_MS", "50")]));
        assert_eq!(settings.tick_period_ms, 50);
    }

    #[test]
    fn overrides_ignore_unparseable_enabled() {
        let mut settings = Settings::default();
        apply_overrides_with(&mut settings, env(&[("TRACKFUSE_ENABLED", "nope")]));
        assert!(settings.fusion.enabled);
    }
}
