use clap::{Parser, Subcommand, ValueEnum};

use crate::window::{DEFAULT_READ_LINES, DEFAULT_WINDOW};

const EXEC_AFTER_HELP: &str = "Everything after the window is passed to the command, flags included. \
                               Give --session before `exec` to choose the session.";

/// Command-line surface
#[derive(Debug, Parser)]
#[command(
    name = "claude-tmux",
    version,
    about = "Session per directory: run and read commands in named tmux windows",
    after_help = "Session ID = hash(current directory). Nested directories reuse the \
                  nearest parent session. Use --session to override auto-detection."
)]
pub struct Cli {
    /// Use an explicit session (overrides auto-detection)
    #[arg(long, global = true, value_name = "NAME")]
    pub session: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    pub output: OutputFormat,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Actions that can be dispatched to the app
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Attach to the session (create if needed)
    Connect,
    /// Create a window, optionally running a command in it
    New {
        window: String,
        #[arg(trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Execute a command (creates the window if needed)
    #[command(
        override_usage = "claude-tmux [--session <NAME>] exec [-w <WINDOW>] [WINDOW] <COMMAND>...",
        after_help = EXEC_AFTER_HELP
    )]
    Exec {
        /// Window to run in; disables guessing the window from the arguments
        #[arg(short, long)]
        window: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
    /// Read output from a window
    Read {
        #[arg(default_value = DEFAULT_WINDOW)]
        window: String,
        /// Number of lines
        #[arg(
            long,
            default_value_t = DEFAULT_READ_LINES,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        lines: u32,
    },
    /// List all windows
    List,
    /// Kill a specific window
    Kill { window: String },
    /// Show session or window status
    Status { window: Option<String> },
    /// Clear window history
    Clear {
        #[arg(default_value = DEFAULT_WINDOW)]
        window: String,
    },
    /// Send Ctrl+C to a window
    #[command(name = "ctrl-c")]
    CtrlC {
        #[arg(default_value = DEFAULT_WINDOW)]
        window: String,
    },
    /// Kill the entire session
    KillSession,
}
