mod client;
#[cfg(test)]
mod fake;

pub use client::TmuxClient;
#[cfg(test)]
pub use fake::{FakeMultiplexer, MuxCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Represents a tmux window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Window index, stable only while the window lives
    pub index: u32,
    /// Window name, unique within its session
    pub name: String,
    /// PID of the window's pane process
    pub pid: Option<u32>,
}

/// Session and window primitives of the terminal multiplexer.
///
/// Every call is a single request/response against the multiplexer; nothing
/// is cached between calls.
#[async_trait]
pub trait Multiplexer: Clone + Send + Sync + 'static {
    async fn session_exists(&self, session: &str) -> Result<bool, Error>;

    /// Create a detached session whose initial shell starts in `dir`
    async fn create_session(&self, session: &str, dir: &Path) -> Result<(), Error>;

    async fn kill_session(&self, session: &str) -> Result<(), Error>;

    async fn list_windows(&self, session: &str) -> Result<Vec<WindowInfo>, Error>;

    /// Create a window running a shell, returning its index
    async fn create_window(&self, session: &str, name: &str) -> Result<u32, Error>;

    async fn rename_window(&self, session: &str, index: u32, name: &str) -> Result<(), Error>;

    // Windows are addressed by index: tmux reads names like "1" or "{end}"
    // as target tokens.
    async fn kill_window(&self, session: &str, index: u32) -> Result<(), Error>;

    /// Type `text` literally into the window, then press Enter
    async fn send_input(&self, session: &str, index: u32, text: &str) -> Result<(), Error>;

    /// Send Ctrl-C to the window's foreground process
    async fn send_interrupt(&self, session: &str, index: u32) -> Result<(), Error>;

    /// Up to `lines` most recent lines of the window, oldest first
    async fn capture_output(&self, session: &str, index: u32, lines: u32)
        -> Result<String, Error>;

    async fn clear_history(&self, session: &str, index: u32) -> Result<(), Error>;
}

/// Keep the last `lines` rows of a pane capture, ignoring the blank rows
/// tmux emits for the unused part of the visible pane.
pub fn tail_lines(captured: &str, lines: u32) -> String {
    let rows: Vec<&str> = captured.lines().collect();
    let end = rows
        .iter()
        .rposition(|row| !row.trim().is_empty())
        .map_or(0, |i| i + 1);
    let start = end.saturating_sub(lines as usize);
    rows[start..end].join("\n")
}
