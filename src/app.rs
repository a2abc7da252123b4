use anyhow::Result;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::actions::{Action, OutputFormat};
use crate::heuristics::split_exec_args;
use crate::session::{Resolution, SessionInfo, SessionManager, SessionTarget};
use crate::tmux::Multiplexer;
use crate::window::{CreatedWindow, Executed, WindowList, WindowManager, WindowStatus};

/// Result of one action, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Session is ready; the caller attaches to it
    Attach(Resolution),
    Created(CreatedWindow),
    Executed(Executed),
    Output(String),
    Windows(WindowList),
    KilledWindow(String),
    WindowStatus(WindowStatus),
    SessionStatus {
        resolution: Resolution,
        info: SessionInfo,
    },
    Cleared(String),
    Interrupted(String),
    KilledSession(Resolution),
}

/// Dispatches actions onto the session and window managers.
///
/// The explicit session and working directory are fixed at startup and
/// handed to every operation.
pub struct App<M> {
    sessions: SessionManager<M>,
    windows: WindowManager<M>,
    explicit: Option<String>,
    cwd: PathBuf,
}

impl<M: Multiplexer> App<M> {
    pub fn new(mux: M, explicit: Option<String>, cwd: PathBuf) -> Self {
        Self {
            sessions: SessionManager::new(mux.clone()),
            windows: WindowManager::new(mux),
            explicit,
            cwd,
        }
    }

    fn target(&self) -> SessionTarget<'_> {
        SessionTarget::new(self.explicit.as_deref(), &self.cwd)
    }

    /// Run an action against tmux
    pub async fn handle_action(&self, action: Action) -> Result<Report> {
        let target = self.target();
        let report = match action {
            Action::Connect => Report::Attach(self.sessions.initialize(target).await?),
            Action::New { window, command } => {
                let command = (!command.is_empty()).then(|| command.join(" "));
                Report::Created(
                    self.windows
                        .create(target, &window, command.as_deref())
                        .await?,
                )
            }
            Action::Exec { window, args } => {
                if args.iter().any(|a| a == "--session" || a.starts_with("--session=")) {
                    tracing::warn!(
                        "--session after `exec` is passed to the command; \
                         give it before `exec` to choose the session"
                    );
                }
                let (window, command) = match window {
                    Some(window) => (window, args.join(" ")),
                    None => split_exec_args(&args),
                };
                Report::Executed(self.windows.execute(target, &window, &command).await?)
            }
            Action::Read { window, lines } => {
                Report::Output(self.windows.read(target, &window, lines).await?)
            }
            Action::List => Report::Windows(self.windows.list(target).await?),
            Action::Kill { window } => {
                self.windows.kill(target, &window).await?;
                Report::KilledWindow(window)
            }
            Action::Status {
                window: Some(window),
            } => Report::WindowStatus(self.windows.status(target, &window).await?),
            Action::Status { window: None } => {
                let resolution = self.sessions.find(target).await?;
                let info = self.sessions.inspect(&resolution.session).await?;
                Report::SessionStatus { resolution, info }
            }
            Action::Clear { window } => {
                self.windows.clear(target, &window).await?;
                Report::Cleared(window)
            }
            Action::CtrlC { window } => {
                self.windows.interrupt(target, &window).await?;
                Report::Interrupted(window)
            }
            Action::KillSession => {
                let resolution = self.sessions.find(target).await?;
                self.sessions.kill(&resolution.session).await?;
                Report::KilledSession(resolution)
            }
        };
        Ok(report)
    }
}

impl Report {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.json()?)?),
        }
    }

    fn text(&self) -> String {
        let mut out = String::new();
        match self {
            Report::Attach(res) => {
                if res.created {
                    let _ = writeln!(out, "Created session: {}", res.session);
                }
            }
            Report::Created(created) => {
                let _ = writeln!(
                    out,
                    "Created window \"{}\" (index {}) in session {}",
                    created.window, created.index, created.session
                );
            }
            Report::Executed(executed) => {
                let _ = writeln!(out, "Executed in window \"{}\"", executed.window);
            }
            Report::Output(output) => {
                let _ = writeln!(out, "{}", output);
            }
            Report::Windows(list) => {
                if list.windows.is_empty() {
                    let _ = writeln!(out, "No windows in session");
                    return out;
                }
                let res = &list.resolution;
                let _ = writeln!(out, "Session: {}", res.session);
                let _ = writeln!(out, "Directory: {}", res.directory.display());
                if res.from_parent {
                    let _ = writeln!(out, "(Using parent directory session)");
                }
                let _ = writeln!(out);
                for w in &list.windows {
                    let _ = writeln!(out, "  {}: {} (PID: {})", w.index, w.name, pid(w.pid));
                }
            }
            Report::KilledWindow(window) => {
                let _ = writeln!(out, "Killed window \"{}\"", window);
            }
            Report::WindowStatus(status) => {
                let _ = writeln!(out, "Window: {}", status.window);
                let _ = writeln!(out, "  PID: {}", pid(status.pid));
                let _ = writeln!(out, "  Window Index: {}", status.index);
                let _ = writeln!(out, "  Session: {}", status.session);
                let _ = writeln!(out, "  Directory: {}", status.directory.display());
            }
            Report::SessionStatus { resolution, info } => {
                let _ = writeln!(out, "Session: {}", resolution.session);
                let _ = writeln!(out, "Directory: {}", resolution.directory.display());
                if resolution.from_parent {
                    let _ = writeln!(out, "Using parent directory session");
                }
                let _ = writeln!(out, "Windows: {}", info.windows.len());
            }
            Report::Cleared(window) => {
                let _ = writeln!(out, "Cleared history for window \"{}\"", window);
            }
            Report::Interrupted(window) => {
                let _ = writeln!(out, "Sent Ctrl+C to window \"{}\"", window);
            }
            Report::KilledSession(res) => {
                let _ = writeln!(out, "Killed session: {}", res.session);
                let _ = writeln!(out, "Directory: {}", res.directory.display());
            }
        }
        out
    }

    fn json(&self) -> Result<Value> {
        let mut value = match self {
            Report::Attach(res) | Report::KilledSession(res) => serde_json::to_value(res)?,
            Report::Created(created) => serde_json::to_value(created)?,
            Report::Executed(executed) => serde_json::to_value(executed)?,
            Report::Output(output) => json!({ "output": output }),
            Report::Windows(list) => serde_json::to_value(list)?,
            Report::KilledWindow(window)
            | Report::Cleared(window)
            | Report::Interrupted(window) => json!({ "window": window }),
            Report::WindowStatus(status) => serde_json::to_value(status)?,
            Report::SessionStatus { resolution, info } => json!({
                "session": resolution.session,
                "directory": resolution.directory,
                "from_parent": resolution.from_parent,
                "windows": info.windows,
            }),
        };
        if let Value::Object(map) = &mut value {
            map.insert("success".to_string(), Value::Bool(true));
        }
        Ok(value)
    }
}

fn pid(pid: Option<u32>) -> String {
    pid.map_or_else(|| "unknown".to_string(), |p| p.to_string())
}
