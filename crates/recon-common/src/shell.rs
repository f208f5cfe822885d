//! Remote shell session transport.
//!
//! [`ShellSession`] keeps one `/bin/sh -c <launcher>` process alive for the
//! whole invocation, normally an `ssh -T` client logged into the device.
//! Each command is written to its stdin and stdout is read until the
//! configured prompt pattern matches the tail of the output.
//!
//! # Example
//!
//! ```ignore
//! use recon_common::{config::SessionConfig, shell::ShellSession, CliTransport};
//!
//! let config = SessionConfig { host: "sw1".into(), ..Default::default() };
//! let mut session = ShellSession::open(&config).await?;
//! let reply = session.send("show version").await?;
//! println!("{}", reply.raw_output);
//! ```

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::config::SessionConfig;
use crate::error::{ReconError, ReconResult};
use crate::transport::{CliReply, CliTransport};

/// Path to the shell used to run the launcher.
pub const SH_CMD: &str = "/bin/sh";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes `$`, `` ` ``, `"`, `\`
/// and newline.
///
/// ```
/// use recon_common::shell::shellquote;
///
/// assert_eq!(shellquote("admin@sw1"), "\"admin@sw1\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Builds the shell command line that opens the session.
pub fn launcher(config: &SessionConfig) -> String {
    if let Some(launcher) = &config.launcher {
        return launcher.clone();
    }

    let mut parts = vec![
        shellquote(&config.ssh_command),
        "-T".to_string(),
        "-p".to_string(),
        config.port.to_string(),
    ];
    for option in &config.ssh_options {
        parts.push("-o".to_string());
        parts.push(shellquote(option));
    }
    parts.push(shellquote(&format!("{}@{}", config.username, config.host)));
    parts.join(" ")
}

/// Interactive shell session implementing [`CliTransport`].
///
/// The child process is killed when the session is dropped.
pub struct ShellSession {
    endpoint: String,
    _child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    prompt: Regex,
    timeout: Duration,
}

impl ShellSession {
    /// Spawns the launcher and returns a session ready for commands.
    pub async fn open(config: &SessionConfig) -> ReconResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint().to_string();
        let command_line = launcher(config);
        tracing::debug!(endpoint = %endpoint, launcher = %command_line, "Opening shell session");

        let prompt = Regex::new(&config.prompt)
            .map_err(|e| ReconError::config(format!("invalid prompt pattern: {}", e)))?;

        let mut child = Command::new(SH_CMD)
            .arg("-c")
            .arg(&command_line)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ReconError::transport(
                    endpoint.as_str(),
                    format!("failed to spawn '{}': {}", command_line, e),
                )
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReconError::transport(endpoint.as_str(), "stdin not captured"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReconError::transport(endpoint.as_str(), "stdout not captured"))?;

        // Discard the login banner so each reply lines up with its command
        let timeout = config.command_timeout();
        let banner = match tokio::time::timeout(timeout, read_until_prompt(&mut stdout, &prompt)).await {
            Ok(Ok(banner)) => banner,
            Ok(Err(e)) => {
                return Err(ReconError::transport(
                    endpoint.as_str(),
                    format!("session closed before first prompt: {}", e),
                ))
            }
            Err(_) => {
                return Err(ReconError::transport(
                    endpoint.as_str(),
                    format!("timed out after {}s waiting for first prompt", timeout.as_secs()),
                ))
            }
        };
        tracing::trace!(endpoint = %endpoint, banner = %banner, "Session ready");

        Ok(Self {
            endpoint,
            _child: child,
            stdin,
            stdout,
            prompt,
            timeout,
        })
    }
}

#[async_trait]
impl CliTransport for ShellSession {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&mut self, command: &str) -> ReconResult<CliReply> {
        tracing::debug!(endpoint = %self.endpoint, command = %command, "Sending command");

        let line = format!("{}\n", command);
        let written = async {
            self.stdin.write_all(line.as_bytes()).await?;
            self.stdin.flush().await
        }
        .await;
        written.map_err(|e| {
            ReconError::transport(self.endpoint.as_str(), format!("write failed: {}", e))
        })?;

        let raw_output =
            match tokio::time::timeout(self.timeout, read_until_prompt(&mut self.stdout, &self.prompt))
                .await
            {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(ReconError::transport(
                        self.endpoint.as_str(),
                        format!("read failed: {}", e),
                    ))
                }
                Err(_) => {
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        command = %command,
                        timeout_secs = self.timeout.as_secs(),
                        "Timed out waiting for prompt"
                    );
                    return Err(ReconError::transport(
                        self.endpoint.as_str(),
                        format!(
                            "timed out after {}s waiting for reply to '{}'",
                            self.timeout.as_secs(),
                            command
                        ),
                    ));
                }
            };

        tracing::trace!(endpoint = %self.endpoint, output = %raw_output, "Received reply");
        Ok(CliReply::new(raw_output))
    }
}

async fn read_until_prompt(stdout: &mut ChildStdout, prompt: &Regex) -> std::io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stdout.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "session closed by peer",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if prompt.is_match(&text) {
            return Ok(text.into_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shellquote_special_chars() {
        assert_eq!(shellquote("$HOME"), "\"\\$HOME\"");
        assert_eq!(shellquote("`whoami`"), "\"\\`whoami\\`\"");
        assert_eq!(shellquote("say \"hello\""), "\"say \\\"hello\\\"\"");
        assert_eq!(shellquote("path\\to"), "\"path\\\\to\"");
        assert_eq!(shellquote(""), "\"\"");
    }

    #[test]
    fn test_launcher_builds_ssh_line() {
        let config = SessionConfig {
            host: "sw1".to_string(),
            port: 2222,
            username: "netops".to_string(),
            ssh_options: vec!["StrictHostKeyChecking=no".to_string()],
            ..Default::default()
        };
        assert_eq!(
            launcher(&config),
            "\"ssh\" -T -p 2222 -o \"StrictHostKeyChecking=no\" \"netops@sw1\""
        );
    }

    #[test]
    fn test_launcher_quotes_hostile_host() {
        let config = SessionConfig {
            host: "sw1;rm -rf /".to_string(),
            ..Default::default()
        };
        assert!(launcher(&config).ends_with("\"admin@sw1;rm -rf /\""));
    }

    #[test]
    fn test_launcher_override() {
        let config = SessionConfig {
            launcher: Some("cat".to_string()),
            ..Default::default()
        };
        assert_eq!(launcher(&config), "cat");
    }

    fn echo_session(timeout_secs: u64, prompt: &str, launcher: &str) -> SessionConfig {
        SessionConfig {
            launcher: Some(launcher.to_string()),
            command_timeout_secs: timeout_secs,
            prompt: prompt.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_send_reads_until_prompt() {
        let config = echo_session(5, r"sw1#\s*$", "printf 'sw1#\\n'; cat");
        let mut session = ShellSession::open(&config).await.unwrap();
        assert_eq!(session.endpoint(), "local");

        let reply = session.send("show version sw1#").await.unwrap();
        assert_eq!(reply.raw_output, "show version sw1#\n");

        let reply = session.send("end sw1#").await.unwrap();
        assert_eq!(reply.raw_output, "end sw1#\n");
    }

    #[tokio::test]
    async fn test_login_banner_is_discarded() {
        let config = echo_session(
            5,
            r"sw1#\s*$",
            "printf 'Welcome to sw1\\nsw1#\\n'; sleep 0.3; cat",
        );
        let mut session = ShellSession::open(&config).await.unwrap();

        let reply = session.send("configure terminal sw1#").await.unwrap();
        assert_eq!(reply.raw_output, "configure terminal sw1#\n");

        let reply = session.send("mtu 99999 sw1#").await.unwrap();
        assert_eq!(reply.raw_output, "mtu 99999 sw1#\n");
    }

    #[tokio::test]
    async fn test_open_fails_without_first_prompt() {
        let err = ShellSession::open(&echo_session(1, r"sw1#\s*$", "cat"))
            .await
            .err()
            .unwrap();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("waiting for first prompt"));

        let err = ShellSession::open(&echo_session(5, r"sw1#\s*$", "true"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("session closed before first prompt"));
    }

    #[tokio::test]
    async fn test_send_times_out_without_prompt() {
        let config = echo_session(1, "never-matches#$", "printf 'never-matches#'; cat");
        let mut session = ShellSession::open(&config).await.unwrap();
        let err = session.send("show version").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_config() {
        let err = ShellSession::open(&SessionConfig::default()).await.err().unwrap();
        assert_eq!(err, ReconError::config("session.host must be set"));
    }
}
