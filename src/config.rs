use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `interface.sdk_path`.
pub const SDK_PATH_ENV: &str = "SKB_SDK_PATH";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub interface: InterfaceConfig,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Ceiling for the post-interruption wait, in seconds.
    #[serde(default = "default_restore_wait_secs")]
    pub restore_wait_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            restore_wait_secs: default_restore_wait_secs(),
        }
    }
}

fn default_restore_wait_secs() -> f64 {
    10.0
}

impl EngineConfig {
    /// The restore wait as a [`Duration`]. Values too large to represent
    /// saturate to [`Duration::MAX`]; [`load_config`] rejects them.
    pub fn restore_wait(&self) -> Duration {
        Duration::try_from_secs_f64(self.restore_wait_secs).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InterfaceConfig {
    #[serde(default = "default_sdk_path")]
    pub sdk_path: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            sdk_path: default_sdk_path(),
        }
    }
}

fn default_sdk_path() -> String {
    "/Applications/Xcode.app/Contents/Developer/Platforms/MacOSX.platform/Developer/SDKs/MacOSX.sdk"
        .to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormatConfig {
    #[serde(default = "default_indent_width")]
    pub indent_width: i64,
    #[serde(default)]
    pub use_tabs: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            use_tabs: false,
        }
    }
}

fn default_indent_width() -> i64 {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load and validate a config file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(sdk) = std::env::var(SDK_PATH_ENV) {
        if !sdk.is_empty() {
            config.interface.sdk_path = sdk;
        }
    }
}

fn validate(config: &Config) -> Result<()> {
    let wait = config.engine.restore_wait_secs;
    if !wait.is_finite() || wait <= 0.0 {
        anyhow::bail!("engine.restore_wait_secs must be a positive number of seconds");
    }
    if Duration::try_from_secs_f64(wait).is_err() {
        anyhow::bail!("engine.restore_wait_secs is too large: {}", wait);
    }

    if config.format.indent_width < 1 {
        anyhow::bail!("format.indent_width must be >= 1");
    }

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!(
            "Unknown logging level: '{}'. Must be trace, debug, info, warn, or error.",
            other
        ),
    }

    Ok(())
}
