//! Configuration Vault – reads/writes `~/.titros/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted service configuration stored in `~/.titros/config.toml`.
///
/// A missing file is not an error: this is a headless service, so every
/// field has a default and the coordinator starts without any setup step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// TCP port for the WebSocket gateway.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Telemetry publication period in milliseconds.
    #[serde(default = "default_telemetry_period_ms")]
    pub telemetry_period_ms: u64,

    /// Lower bound (inclusive) of the simulated transmittance band.
    #[serde(default = "default_sensor_floor")]
    pub sensor_floor: u16,

    /// Upper bound (exclusive) of the simulated transmittance band.
    #[serde(default = "default_sensor_ceiling")]
    pub sensor_ceiling: u16,
}

fn default_listen_port() -> u16 {
    3000
}
fn default_telemetry_period_ms() -> u64 {
    1000
}
fn default_sensor_floor() -> u16 {
    600
}
fn default_sensor_ceiling() -> u16 {
    800
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            telemetry_period_ms: default_telemetry_period_ms(),
            sensor_floor: default_sensor_floor(),
            sensor_ceiling: default_sensor_ceiling(),
        }
    }
}

/// Return the path to `~/.titros/config.toml`.
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
    PathBuf::from(home).join(".titros").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
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
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `TITROS_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `TITROS_PORT` | `listen_port` |
/// | `TITROS_TELEMETRY_PERIOD_MS` | `telemetry_period_ms` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TITROS_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.listen_port = port;
    }
    if let Ok(v) = std::env::var("TITROS_TELEMETRY_PERIOD_MS")
        && let Ok(period) = v.parse::<u64>()
    {
        cfg.telemetry_period_ms = period;
    }
}

/// Save the config to disk, creating `~/.titros/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Owner-only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
