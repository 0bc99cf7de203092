use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflow::WorkflowTimings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Simulated step latencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_auth_delay")]
    pub auth_delay_ms: u64,
    #[serde(default = "default_data_delay")]
    pub data_delay_ms: u64,
    #[serde(default = "default_execution_delay")]
    pub execution_delay_ms: u64,
    #[serde(default = "default_completion_delay")]
    pub completion_delay_ms: u64,
    /// How long the response keeps revealing before the run goes idle
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

fn default_auth_delay() -> u64 {
    2000
}

fn default_data_delay() -> u64 {
    3000
}

fn default_execution_delay() -> u64 {
    3000
}

fn default_completion_delay() -> u64 {
    1500
}

fn default_settle() -> u64 {
    3000
}

impl WorkflowConfig {
    pub fn timings(&self) -> WorkflowTimings {
        WorkflowTimings {
            auth: Duration::from_millis(self.auth_delay_ms),
            data: Duration::from_millis(self.data_delay_ms),
            execution: Duration::from_millis(self.execution_delay_ms),
            completion: Duration::from_millis(self.completion_delay_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            auth_delay_ms: default_auth_delay(),
            data_delay_ms: default_data_delay(),
            execution_delay_ms: default_execution_delay(),
            completion_delay_ms: default_completion_delay(),
            settle_ms: default_settle(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Milliseconds between revealed characters
    #[serde(default = "default_reveal_interval")]
    pub interval_ms: u64,
}

fn default_reveal_interval() -> u64 {
    30
}

impl RevealConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_reveal_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Simulated verification time after submitting a code
    #[serde(default = "default_verify_delay")]
    pub verify_delay_ms: u64,
}

fn default_verify_delay() -> u64 {
    1000
}

impl OtpConfig {
    pub fn verify_delay(&self) -> Duration {
        Duration::from_millis(self.verify_delay_ms)
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            verify_delay_ms: default_verify_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,
}

fn default_refresh_rate() -> u64 {
    30
}

fn default_toast_duration() -> u64 {
    3000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
            toast_duration_ms: default_toast_duration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".agentflow".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".agentflow/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so agentflow works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/agentflow/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("agentflow").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with AGENTFLOW_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("AGENTFLOW")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to .agentflow/config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::local_config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create agentflow config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn refresh_rate(&self) -> Duration {
        Duration::from_millis(self.ui.refresh_rate_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_duration_ms)
    }
}
