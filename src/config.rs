/// tmux socket reserved for this tool, kept apart from the user's own server
pub const SOCKET_NAME: &str = "claude-dev";

/// Environment variable overriding the tmux binary
pub const TMUX_BIN_ENV: &str = "CLAUDE_TMUX_BIN";

/// Runtime configuration. There are no config files; everything comes from
/// the environment or defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to tmux binary
    pub tmux_path: String,
    /// Socket name passed to `tmux -L`
    pub socket: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tmux_path = lookup(TMUX_BIN_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "tmux".to_string());
        Self {
            tmux_path,
            socket: SOCKET_NAME.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
