//! Configuration Vault – reads/writes `~/.pedtrace/config.toml`.

use pedtrace_pipeline::{Extents, FlipProfile};
use pedtrace_types::TrackError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted recorder configuration stored in `~/.pedtrace/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// TF frame of the robot base.  Accepted for compatibility with
    /// upstream launch files; the recording pipeline does not consume it.
    #[serde(default = "default_robot_frame")]
    pub robot_frame: String,

    /// Width of the local zone around the robot, in metres.
    #[serde(default = "default_local_extent")]
    pub local_width: f64,

    /// Height of the local zone around the robot, in metres.
    #[serde(default = "default_local_extent")]
    pub local_height: f64,

    /// Width of the global scene, in metres.
    #[serde(default = "default_global_extent")]
    pub global_width: f64,

    /// Height of the global scene, in metres.
    #[serde(default = "default_global_extent")]
    pub global_height: f64,

    /// Sampling rate of the recorder loop, in Hz.
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// Flip profile index (1 = identity, 2–4 = quarter rotations).
    #[serde(default = "default_flip")]
    pub flip: u8,

    /// Output path prefix for the dataset file.
    #[serde(default = "default_path")]
    pub path: String,

    /// Target number of dataset rows before the recorder stops.
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_robot_frame() -> String {
    "base_link".to_string()
}
fn default_local_extent() -> f64 {
    12.0
}
fn default_global_extent() -> f64 {
    50.0
}
fn default_rate() -> f64 {
    2.5
}
fn default_flip() -> u8 {
    1
}
fn default_path() -> String {
    "pedsim_pos".to_string()
}
fn default_size() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robot_frame: default_robot_frame(),
            local_width: default_local_extent(),
            local_height: default_local_extent(),
            global_width: default_global_extent(),
            global_height: default_global_extent(),
            rate: default_rate(),
            flip: default_flip(),
            path: default_path(),
            size: default_size(),
        }
    }
}

impl Config {
    /// Check the loaded values against the pipeline's constructors so a bad
    /// vault fails at startup rather than mid-recording.
    pub fn validate(&self) -> Result<(), TrackError> {
        Extents::try_new(self.global_width, self.global_height)?;
        if self.local_width <= 0.0 || !self.local_width.is_finite() {
            return Err(TrackError::InvalidExtent {
                name: "local_width".to_string(),
                value: self.local_width,
            });
        }
        if self.local_height <= 0.0 || !self.local_height.is_finite() {
            return Err(TrackError::InvalidExtent {
                name: "local_height".to_string(),
                value: self.local_height,
            });
        }
        FlipProfile::try_from(self.flip)?;
        Ok(())
    }
}

/// Return the path to `~/.pedtrace/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".pedtrace").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `PEDTRACE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `PEDTRACE_PATH` | `path` |
/// | `PEDTRACE_SIZE` | `size` |
/// | `PEDTRACE_FLIP` | `flip` |
/// | `PEDTRACE_RATE` | `rate` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PEDTRACE_PATH") {
        cfg.path = v;
    }
    if let Ok(v) = std::env::var("PEDTRACE_SIZE")
        && let Ok(size) = v.parse::<u64>() {
            cfg.size = size;
        }
    if let Ok(v) = std::env::var("PEDTRACE_FLIP")
        && let Ok(flip) = v.parse::<u8>() {
            cfg.flip = flip;
        }
    if let Ok(v) = std::env::var("PEDTRACE_RATE")
        && let Ok(rate) = v.parse::<f64>() {
            cfg.rate = rate;
        }
}

/// Save the config to disk, creating `~/.pedtrace/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.rate, 2.5);
        assert_eq!(loaded.size, 100);
        assert_eq!(loaded.path, "pedsim_pos");
    }

    #[test]
    fn config_path_points_to_pedtrace_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".pedtrace"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "size = 500\nflip = 3\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.size, 500);
        assert_eq!(loaded.flip, 3);
        assert_eq!(loaded.global_width, 50.0);
        assert_eq!(loaded.robot_frame, "base_link");
    }

    #[test]
    fn apply_env_overrides_changes_path() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("PEDTRACE_PATH", "/tmp/run_07") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.path, "/tmp/run_07");
        unsafe { std::env::remove_var("PEDTRACE_PATH") };
    }

    #[test]
    fn apply_env_overrides_changes_size() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("PEDTRACE_SIZE", "2500") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.size, 2500);
        unsafe { std::env::remove_var("PEDTRACE_SIZE") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_size() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("PEDTRACE_SIZE", "not-a-count") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.size, default_size());
        unsafe { std::env::remove_var("PEDTRACE_SIZE") };
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_global_extent() {
        let mut cfg = Config::default();
        cfg.global_width = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(TrackError::InvalidExtent { .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_local_extent() {
        let mut cfg = Config::default();
        cfg.local_height = -3.0;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, TrackError::InvalidExtent { ref name, .. } if name == "local_height"));
    }

    #[test]
    fn validate_rejects_out_of_range_flip() {
        let mut cfg = Config::default();
        cfg.flip = 7;
        assert_eq!(cfg.validate(), Err(TrackError::InvalidFlipProfile(7)));
    }
}
