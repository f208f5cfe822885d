//! Configuration file support.
//!
//! Two kinds of TOML files are read:
//!
//! - a session file ([`ReconConfig`]) describing how to reach the managed
//!   device and how verbose to log;
//! - a task file ([`TaskFile`]) carrying the plugin parameters of one
//!   invocation under a `[params]` table.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, ReconResult};
use crate::fields::FieldValues;

/// How to open a remote shell session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Device host name or address
    #[serde(default)]
    pub host: String,

    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login user
    #[serde(default = "default_username")]
    pub username: String,

    /// SSH client binary
    #[serde(default = "default_ssh_command")]
    pub ssh_command: String,

    /// Extra `-o` options passed to the SSH client
    #[serde(default)]
    pub ssh_options: Vec<String>,

    /// Seconds to wait for the prompt after each command
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Regex matched against the tail of the output to detect the prompt
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Replaces the generated SSH command line when set
    #[serde(default)]
    pub launcher: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Complete session file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_port() -> u16 {
    22
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_ssh_command() -> String {
    "ssh".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_prompt() -> String {
    r"[>#]\s*$".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: default_username(),
            ssh_command: default_ssh_command(),
            ssh_options: Vec::new(),
            command_timeout_secs: default_command_timeout(),
            prompt: default_prompt(),
            launcher: None,
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

impl SessionConfig {
    /// Name of the endpoint used in logs and error messages.
    pub fn endpoint(&self) -> &str {
        if self.host.is_empty() {
            "local"
        } else {
            &self.host
        }
    }

    /// Get command timeout as Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Validate session settings
    pub fn validate(&self) -> ReconResult<()> {
        if self.launcher.is_none() && self.host.is_empty() {
            return Err(ReconError::config("session.host must be set"));
        }
        if self.port == 0 {
            return Err(ReconError::config("session.port must be > 0"));
        }
        if self.command_timeout_secs == 0 {
            return Err(ReconError::config(
                "session.command_timeout_secs must be > 0",
            ));
        }
        regex::Regex::new(&self.prompt).map_err(|e| {
            ReconError::config(format!("session.prompt is not a valid regex: {}", e))
        })?;
        Ok(())
    }
}

impl ReconConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> ReconResult<Self> {
        let path = path.as_ref();
        let content = read(path)?;
        parse(path, &content)
    }

    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> ReconResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => parse(path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                eprintln!(
                    "recon: Config file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ReconError::config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ReconResult<()> {
        self.session.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(ReconError::config("logging.level must not be empty"));
        }
        Ok(())
    }
}

/// Parameters of one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFile {
    /// Plugin the parameters are meant for, if the file names one
    #[serde(default)]
    pub plugin: Option<String>,

    /// Plugin parameters
    #[serde(default)]
    pub params: toml::Table,
}

impl TaskFile {
    /// Load a task file
    pub fn load(path: impl AsRef<Path>) -> ReconResult<Self> {
        let path = path.as_ref();
        let content = read(path)?;
        parse(path, &content)
    }

    /// Flattens the `[params]` table into a field/value list.
    ///
    /// Scalars are rendered as strings; arrays and tables are rejected.
    pub fn field_values(&self) -> ReconResult<FieldValues> {
        self.params
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    other => {
                        return Err(ReconError::validation(
                            key.as_str(),
                            format!("expected a scalar value, got {}", other.type_str()),
                        ))
                    }
                };
                Ok((key.clone(), text))
            })
            .collect()
    }
}

fn read(path: &Path) -> ReconResult<String> {
    fs::read_to_string(path)
        .map_err(|e| ReconError::config(format!("Failed to read {}: {}", path.display(), e)))
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, content: &str) -> ReconResult<T> {
    toml::from_str(content).map_err(|e| {
        ReconError::config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}
