//! Configuration – reads `~/.reactnav/config.toml`.
//!
//! Unlike most settings files this one has no usable defaults for the
//! movement tuning: a missing file, a missing `move_specs` key or a bad
//! environment override is fatal and the binary exits before any cycle runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use reactnav_runtime::{MAX_RATE_HZ, period_for};
use reactnav_types::{Bearings, MoveSpecs, NavError, ScanGeometry, SectorWindow};

/// Everything the binary needs to build a controller and run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub move_specs: MoveSpecs,

    #[serde(default)]
    pub scan: ScanGeometry,

    #[serde(default)]
    pub bearings: Bearings,

    #[serde(default)]
    pub runtime: RuntimeSettings,
}

/// Loop rates and the random seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_rate_hz")]
    pub detection_rate_hz: f64,

    #[serde(default = "default_rate_hz")]
    pub scan_rate_hz: f64,

    /// Seed for the side-picking coin flip; `0` draws from OS entropy.
    #[serde(default)]
    pub rng_seed: u64,
}

fn default_rate_hz() -> f64 {
    10.0
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            detection_rate_hz: default_rate_hz(),
            scan_rate_hz: default_rate_hz(),
            rng_seed: 0,
        }
    }
}

impl Config {
    /// Tuning for a 720-beam, 180° scanner; written by `--init-config`.
    pub fn sample() -> Self {
        Self {
            move_specs: MoveSpecs {
                high_security_distance: 0.5,
                low_security_distance: 0.3,
                wall_follow_distance: 0.6,
                linear_velocity: 0.3,
                angular_velocity: 0.6,
                right_window: SectorWindow::new(0, 240),
                left_window: SectorWindow::new(480, 719),
                center_window: SectorWindow::new(241, 479),
            },
            scan: ScanGeometry::default(),
            bearings: Bearings::default(),
            runtime: RuntimeSettings::default(),
        }
    }

    /// # Errors
    ///
    /// [`NavError::Config`] for invalid movement tuning, or for a rate that
    /// is not positive or exceeds [`MAX_RATE_HZ`].
    pub fn validate(&self) -> Result<(), NavError> {
        self.move_specs.validate()?;
        for (name, rate) in [
            ("detection_rate_hz", self.runtime.detection_rate_hz),
            ("scan_rate_hz", self.runtime.scan_rate_hz),
        ] {
            if period_for(rate).is_none() {
                return Err(NavError::Config(format!(
                    "runtime.{name} must be in (0, {MAX_RATE_HZ}] Hz, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Return the default path `~/.reactnav/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".reactnav").join("config.toml")
}

/// `--config` wins over `REACTNAV_CONFIG`, which wins over the default path.
pub fn resolve_path(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| std::env::var_os("REACTNAV_CONFIG").map(PathBuf::from))
        .unwrap_or_else(config_path)
}

/// Load, override from the environment and validate.
///
/// | Variable | Config field |
/// |---|---|
/// | `REACTNAV_LINEAR_VELOCITY` | `move_specs.linear_velocity` |
/// | `REACTNAV_ANGULAR_VELOCITY` | `move_specs.angular_velocity` |
/// | `REACTNAV_RNG_SEED` | `runtime.rng_seed` |
///
/// # Errors
///
/// [`NavError::Config`] if the file is missing, unreadable, malformed or
/// fails validation, or when a set override does not parse.
pub fn load_from(path: &Path) -> Result<Config, NavError> {
    load_with(path, process_env)
}

pub(crate) fn load_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, NavError> {
    if !path.exists() {
        return Err(NavError::Config(format!(
            "no config at {} (run with --init-config to create one)",
            path.display()
        )));
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        NavError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| NavError::Config(format!("failed to parse config: {e}")))?;
    apply_overrides(&mut cfg, lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

fn apply_overrides(
    cfg: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), NavError> {
    if let Some(v) = parse_override::<f32>(&lookup, "REACTNAV_LINEAR_VELOCITY")? {
        cfg.move_specs.linear_velocity = v;
    }
    if let Some(v) = parse_override::<f32>(&lookup, "REACTNAV_ANGULAR_VELOCITY")? {
        cfg.move_specs.angular_velocity = v;
    }
    if let Some(v) = parse_override::<u64>(&lookup, "REACTNAV_RNG_SEED")? {
        cfg.runtime.rng_seed = v;
    }
    Ok(())
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, NavError> {
    match lookup(name) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| NavError::Config(format!("{name}={v:?} is not a valid value"))),
        None => Ok(None),
    }
}

/// Write `cfg` to `path`, creating parent directories.  Refuses to
/// overwrite an existing file.
pub fn save_new(cfg: &Config, path: &Path) -> Result<(), NavError> {
    if path.exists() {
        return Err(NavError::Config(format!(
            "{} already exists; not overwriting",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| NavError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| NavError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        NavError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[move_specs]
high_security_distance = 0.5
low_security_distance = 0.3
wall_follow_distance = 0.6
linear_velocity = 0.3
angular_velocity = 0.6
right_window = { low = 0, high = 240 }
left_window = { low = 480, high = 719 }
center_window = { low = 241, high = 479 }
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn load(path: &Path) -> Result<Config, NavError> {
        load_with(path, no_env)
    }

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn minimal_file_fills_optional_sections() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let cfg = load(&write(&dir, MINIMAL)).expect("load");
        assert_eq!(cfg, Config::sample());
        assert_eq!(cfg.runtime.scan_rate_hz, 10.0);
        assert_eq!(cfg.bearings.approach_front_deg, 67.5);
    }

    #[test]
    fn optional_sections_are_read() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let body = format!(
            "{MINIMAL}\n[scan]\nangle_increment_deg = 0.5\n\n[runtime]\nrng_seed = 42\nscan_rate_hz = 20.0\n"
        );
        let cfg = load(&write(&dir, &body)).expect("load");
        assert_eq!(cfg.scan.angle_increment_deg, 0.5);
        assert_eq!(cfg.scan.angle_min_deg, -90.0);
        assert_eq!(cfg.runtime.rng_seed, 42);
        assert_eq!(cfg.runtime.scan_rate_hz, 20.0);
        assert_eq!(cfg.runtime.detection_rate_hz, 10.0);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_move_specs_key_is_fatal() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let body = MINIMAL.replace("wall_follow_distance = 0.6\n", "");
        let err = load(&write(&dir, &body)).unwrap_err();
        assert!(matches!(err, NavError::Config(ref m) if m.contains("wall_follow_distance")));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let body = MINIMAL.replace("{ low = 0, high = 240 }", "{ low = 240, high = 0 }");
        assert!(matches!(load(&write(&dir, &body)), Err(NavError::Config(_))));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let mut cfg = Config::sample();
        cfg.runtime.detection_rate_hz = 0.0;
        assert!(matches!(cfg.validate(), Err(NavError::Config(_))));
    }

    #[test]
    fn rate_too_fast_to_tick_is_rejected() {
        let mut cfg = Config::sample();
        cfg.runtime.scan_rate_hz = 1e10;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, NavError::Config(ref m) if m.contains("scan_rate_hz")));

        cfg.runtime.scan_rate_hz = MAX_RATE_HZ;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn save_new_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        save_new(&Config::sample(), &path).expect("save");
        assert_eq!(load(&path).expect("load"), Config::sample());
        assert!(save_new(&Config::sample(), &path).is_err());
    }

    #[test]
    fn config_path_points_to_reactnav_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".reactnav"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn cli_path_wins() {
        let p = resolve_path(Some(PathBuf::from("/tmp/custom.toml")));
        assert_eq!(p, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn env_overrides_replace_fields() {
        let mut cfg = Config::sample();
        let env = |name: &str| match name {
            "REACTNAV_LINEAR_VELOCITY" => Some("0.25".to_string()),
            "REACTNAV_RNG_SEED" => Some(" 7 ".to_string()),
            _ => None,
        };
        apply_overrides(&mut cfg, env).expect("valid overrides");
        assert_eq!(cfg.move_specs.linear_velocity, 0.25);
        assert_eq!(cfg.move_specs.angular_velocity, 0.6);
        assert_eq!(cfg.runtime.rng_seed, 7);
    }

    #[test]
    fn unparsable_override_is_fatal() {
        let mut cfg = Config::sample();
        let env = |name: &str| (name == "REACTNAV_ANGULAR_VELOCITY").then(|| "fast".to_string());
        let err = apply_overrides(&mut cfg, env).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(cfg.move_specs.angular_velocity, 0.6);
    }

    #[test]
    fn negative_override_fails_validation() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write(&dir, MINIMAL);
        let env = |name: &str| (name == "REACTNAV_LINEAR_VELOCITY").then(|| "-1".to_string());
        assert!(matches!(load_with(&path, env), Err(NavError::Config(_))));
    }
}
