use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

use super::{tail_lines, Multiplexer, WindowInfo};
use crate::config::Config;
use crate::error::Error;

/// Format for `list-windows`: index first and pid last, so a name containing
/// the separator still parses.
const WINDOW_FORMAT: &str = "#{window_index}|#{window_name}|#{pane_pid}";

/// Client for interacting with tmux via CLI, scoped to one socket
#[derive(Debug, Clone)]
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
    /// Socket name (`tmux -L`)
    socket: String,
}

impl TmuxClient {
    pub fn new(config: &Config) -> Self {
        Self {
            tmux_path: config.tmux_path.clone(),
            socket: config.socket.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.tmux_path);
        cmd.arg("-L").arg(&self.socket);
        cmd
    }

    /// Run tmux with `args`, failing on spawn errors and non-zero exits.
    async fn run(&self, args: &[&str], operation: &str) -> Result<Output, Error> {
        let output = self.output(args, operation).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(operation, stderr = %stderr.trim(), "tmux command failed");
            return Err(Error::external(operation, stderr));
        }
        Ok(output)
    }

    async fn output(&self, args: &[&str], operation: &str) -> Result<Output, Error> {
        tracing::debug!(socket = %self.socket, ?args, "tmux");
        self.command()
            .args(args)
            .output()
            .await
            .map_err(|e| Error::external(operation, format!("failed to execute tmux: {}", e)))
    }

    /// Names of all sessions on this socket
    pub async fn list_sessions(&self) -> Result<Vec<String>, Error> {
        let output = self
            .output(&["list-sessions", "-F", "#{session_name}"], "list-sessions")
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_no_server(&stderr) {
                return Ok(Vec::new());
            }
            return Err(Error::external("list-sessions", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Get the command to attach to a session (for external execution)
    pub fn attach_command(&self, session: &str) -> Vec<String> {
        vec![
            self.tmux_path.clone(),
            "-L".to_string(),
            self.socket.clone(),
            "attach-session".to_string(),
            "-t".to_string(),
            session.to_string(),
        ]
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[async_trait]
impl Multiplexer for TmuxClient {
    async fn session_exists(&self, session: &str) -> Result<bool, Error> {
        Ok(self.list_sessions().await?.iter().any(|s| s == session))
    }

    async fn create_session(&self, session: &str, dir: &Path) -> Result<(), Error> {
        let dir = dir.to_string_lossy().into_owned();
        self.run(
            &["new-session", "-d", "-s", session, "-c", &dir],
            "new-session",
        )
        .await?;
        tracing::info!(session, dir = %dir, "created tmux session");
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), Error> {
        self.run(&["kill-session", "-t", session], "kill-session")
            .await
            .map(|_| ())
    }

    async fn list_windows(&self, session: &str) -> Result<Vec<WindowInfo>, Error> {
        let output = self
            .run(
                &["list-windows", "-t", session, "-F", WINDOW_FORMAT],
                "list-windows",
            )
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().filter_map(parse_window_line).collect())
    }

    async fn create_window(&self, session: &str, name: &str) -> Result<u32, Error> {
        // "<session>:" selects the next free index in that session
        let target = format!("{}:", session);
        let output = self
            .run(
                &[
                    "new-window",
                    "-d",
                    "-P",
                    "-F",
                    "#{window_index}",
                    "-t",
                    &target,
                    "-n",
                    name,
                ],
                "new-window",
            )
            .await?;

        let printed = String::from_utf8_lossy(&output.stdout);
        printed.trim().parse().map_err(|_| {
            Error::external(
                "new-window",
                format!("unexpected window index {:?}", printed.trim()),
            )
        })
    }

    async fn rename_window(&self, session: &str, index: u32, name: &str) -> Result<(), Error> {
        let target = window_target(session, index);
        self.run(&["rename-window", "-t", &target, name], "rename-window")
            .await
            .map(|_| ())
    }

    async fn kill_window(&self, session: &str, index: u32) -> Result<(), Error> {
        let target = window_target(session, index);
        self.run(&["kill-window", "-t", &target], "kill-window")
            .await
            .map(|_| ())
    }

    async fn send_input(&self, session: &str, index: u32, text: &str) -> Result<(), Error> {
        let target = window_target(session, index);
        if !text.is_empty() {
            // -l = literal mode (no key name interpretation)
            // -- = end of options (handles text starting with -)
            self.run(&["send-keys", "-t", &target, "-l", "--", text], "send-keys")
                .await?;
        }
        self.run(&["send-keys", "-t", &target, "Enter"], "send-keys")
            .await
            .map(|_| ())
    }

    async fn send_interrupt(&self, session: &str, index: u32) -> Result<(), Error> {
        let target = window_target(session, index);
        self.run(&["send-keys", "-t", &target, "C-c"], "send-keys")
            .await
            .map(|_| ())
    }

    async fn capture_output(
        &self,
        session: &str,
        index: u32,
        lines: u32,
    ) -> Result<String, Error> {
        let target = window_target(session, index);
        let start = format!("-{}", lines);
        let output = self
            .run(
                &["capture-pane", "-t", &target, "-p", "-S", &start],
                "capture-pane",
            )
            .await?;
        Ok(tail_lines(&String::from_utf8_lossy(&output.stdout), lines))
    }

    async fn clear_history(&self, session: &str, index: u32) -> Result<(), Error> {
        let target = window_target(session, index);
        self.run(&["clear-history", "-t", &target], "clear-history")
            .await
            .map(|_| ())
    }
}

fn window_target(session: &str, index: u32) -> String {
    format!("{}:{}", session, index)
}

/// Whether a `list-sessions` failure just means nothing runs on the socket
fn is_no_server(stderr: &str) -> bool {
    stderr.contains("no server running")
        || stderr.contains("no sessions")
        || stderr.contains("error connecting to")
}

fn parse_window_line(line: &str) -> Option<WindowInfo> {
    let (index, rest) = line.split_once('|')?;
    let (name, pid) = rest.rsplit_once('|')?;
    Some(WindowInfo {
        index: index.trim().parse().ok()?,
        name: name.to_string(),
        pid: pid.trim().parse().ok(),
    })
}

#[cfg(test)]
impl TmuxClient {
    /// Client on a private per-process socket, or `None` without tmux
    pub(crate) fn for_tests(tag: &str) -> Option<Self> {
        let available = std::process::Command::new("tmux")
            .arg("-V")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        available.then(|| {
            Self::new(&Config {
                tmux_path: "tmux".to_string(),
                socket: format!("claude-tmux-test-{}-{}", tag, std::process::id()),
            })
        })
    }

    pub(crate) async fn kill_server(&self) {
        let _ = self.output(&["kill-server"], "kill-server").await;
    }
}
