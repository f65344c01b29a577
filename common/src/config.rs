use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::frame::CaptureRegion;

/// Environment variable naming the optional TOML tunables file.
pub const CONFIG_PATH_VAR: &str = "GIFCAP_CONFIG";

#[derive(Debug, Clone)]
pub struct Config {
    pub region: CaptureRegion,
    pub capture: CaptureConfig,
    pub animation: AnimationConfig,
    pub logging: LoggingConfig,
}

/// Tunables read from the optional TOML file. Every section may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_fps")]
    pub fps: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    /// Display duration of every frame, in hundredths of a second.
    #[serde(default = "default_frame_delay_cs")]
    pub frame_delay_cs: u16,
    /// 0 loops forever.
    #[serde(default)]
    pub loop_count: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_delay_cs: default_frame_delay_cs(),
            loop_count: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl CaptureConfig {
    /// Target time between the starts of two consecutive captures.
    ///
    /// Rates whose period does not fit in a `Duration` are rejected.
    pub fn period(&self) -> Result<Duration, ConfigError> {
        let out_of_range = || ConfigError::OutOfRange {
            key: "capture.fps".into(),
            value: self.fps.to_string(),
            expected: "a positive frame rate with a representable period",
        };
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(out_of_range());
        }
        Duration::try_from_secs_f64(1.0 / self.fps).map_err(|_| out_of_range())
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let settings: Settings =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.capture.period()?;
        Ok(settings)
    }
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// `X`, `Y`, `WIDTH` and `HEIGHT` are required. When `GIFCAP_CONFIG`
    /// is set, the TOML file it names supplies the remaining tunables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let x: i32 = parse_var(&lookup, "X")?;
        let y: i32 = parse_var(&lookup, "Y")?;
        let width: i64 = parse_var(&lookup, "WIDTH")?;
        let height: i64 = parse_var(&lookup, "HEIGHT")?;

        let region = CaptureRegion {
            x,
            y,
            width: dimension("WIDTH", width)?,
            height: dimension("HEIGHT", height)?,
        };

        let settings = match lookup(CONFIG_PATH_VAR) {
            Some(path) if !path.trim().is_empty() => {
                debug!(path = path.trim(), "loading tunables");
                Settings::load(Path::new(path.trim()))?
            }
            _ => Settings::default(),
        };

        Ok(Self {
            region,
            capture: settings.capture,
            animation: settings.animation,
            logging: settings.logging,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(String),
    #[error("environment variable {var} is not an integer: {value:?}")]
    Invalid { var: String, value: String },
    #[error("{key} = {value} is out of range, expected {expected}")]
    OutOfRange {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(var).ok_or_else(|| ConfigError::Missing(var.into()))?;
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var: var.into(),
        value: raw,
    })
}

// GIF logical screens are limited to u16 on both axes.
fn dimension(var: &str, value: i64) -> Result<u16, ConfigError> {
    u16::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigError::OutOfRange {
            key: var.into(),
            value: value.to_string(),
            expected: "1..=65535",
        })
}

// Default value functions
fn default_fps() -> f64 {
    15.0
}
fn default_frame_delay_cs() -> u16 {
    6
}
fn default_log_level() -> String {
    "info".into()
}
