use serde::Serialize;
use std::path::PathBuf;

use crate::error::Error;
use crate::session::{Resolution, SessionResolver, SessionTarget};
use crate::tmux::{Multiplexer, WindowInfo};

/// Window name used when none is given on the command line
pub const DEFAULT_WINDOW: &str = "default";

/// Lines returned by `read` unless asked otherwise
pub const DEFAULT_READ_LINES: u32 = 100;

/// Names tmux gives the initial window of a fresh session, depending on the
/// user's shell. A lone window with one of these names may be adopted.
pub const DEFAULT_SHELL_NAMES: &[&str] = &["bash", "zsh", "sh", "fish"];

/// How `execute` obtained its window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    /// Window already existed
    Reused,
    /// Session's initial shell window was renamed
    Adopted,
    /// New window created
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedWindow {
    pub session: String,
    pub directory: PathBuf,
    pub window: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Executed {
    pub session: String,
    pub window: String,
    pub source: WindowSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowList {
    #[serde(flatten)]
    pub resolution: Resolution,
    pub windows: Vec<WindowInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowStatus {
    pub window: String,
    pub pid: Option<u32>,
    pub index: u32,
    pub session: String,
    pub directory: PathBuf,
}

/// Named windows inside the resolved session
pub struct WindowManager<M> {
    mux: M,
    resolver: SessionResolver<M>,
}

impl<M: Multiplexer> WindowManager<M> {
    pub fn new(mux: M) -> Self {
        Self {
            resolver: SessionResolver::new(mux.clone()),
            mux,
        }
    }

    /// Create `name` running a shell, optionally typing `command` into it
    pub async fn create(
        &self,
        target: SessionTarget<'_>,
        name: &str,
        command: Option<&str>,
    ) -> Result<CreatedWindow, Error> {
        let resolution = self.resolver.resolve(target, true).await?;
        let session = resolution.session.as_str();

        if self.find(session, name).await?.is_some() {
            return Err(Error::WindowAlreadyExists(name.to_string()));
        }

        let index = self
            .mux
            .create_window(session, name)
            .await
            .map_err(|e| e.into_window_creation(name))?;
        tracing::info!(session, window = name, index, "created window");

        if let Some(command) = command {
            self.mux.send_input(session, index, command).await?;
        }

        Ok(CreatedWindow {
            window: name.to_string(),
            index,
            session: resolution.session,
            directory: resolution.directory,
        })
    }

    /// Send `command` to `name`, creating the window (or adopting the
    /// session's initial shell window) first if needed. Returns once the
    /// input is delivered, not when the command finishes.
    pub async fn execute(
        &self,
        target: SessionTarget<'_>,
        name: &str,
        command: &str,
    ) -> Result<Executed, Error> {
        let resolution = self.resolver.resolve(target, true).await?;
        let session = resolution.session.as_str();

        let windows = self.mux.list_windows(session).await?;
        let (index, source) = if let Some(existing) = windows.iter().find(|w| w.name == name) {
            (existing.index, WindowSource::Reused)
        } else if let Some(initial) = adoptable(&windows) {
            self.mux
                .rename_window(session, initial.index, name)
                .await
                .map_err(|e| e.into_window_rename(name))?;
            tracing::info!(session, from = %initial.name, window = name, "adopted initial window");
            (initial.index, WindowSource::Adopted)
        } else {
            let index = self
                .mux
                .create_window(session, name)
                .await
                .map_err(|e| e.into_window_creation(name))?;
            tracing::info!(session, window = name, index, "created window");
            (index, WindowSource::Created)
        };

        self.mux.send_input(session, index, command).await?;
        tracing::debug!(session, window = name, index, ?source, "command sent");

        Ok(Executed {
            session: resolution.session,
            window: name.to_string(),
            source,
        })
    }

    pub async fn kill(&self, target: SessionTarget<'_>, name: &str) -> Result<(), Error> {
        let resolution = self.resolver.resolve(target, false).await?;
        let info = self.require(&resolution.session, name).await?;
        self.mux.kill_window(&resolution.session, info.index).await?;
        tracing::info!(session = %resolution.session, window = name, "killed window");
        Ok(())
    }

    pub async fn list(&self, target: SessionTarget<'_>) -> Result<WindowList, Error> {
        let resolution = self.resolver.resolve(target, false).await?;
        let windows = self.mux.list_windows(&resolution.session).await?;
        Ok(WindowList {
            resolution,
            windows,
        })
    }

    /// Ctrl-C the window's foreground process; the window stays
    pub async fn interrupt(&self, target: SessionTarget<'_>, name: &str) -> Result<(), Error> {
        let resolution = self.resolver.resolve(target, false).await?;
        let info = self.require(&resolution.session, name).await?;
        self.mux.send_interrupt(&resolution.session, info.index).await
    }

    /// Up to `lines` most recent lines of output, oldest first
    pub async fn read(
        &self,
        target: SessionTarget<'_>,
        name: &str,
        lines: u32,
    ) -> Result<String, Error> {
        let resolution = self.resolver.resolve(target, false).await?;
        let info = self.require(&resolution.session, name).await?;
        self.mux
            .capture_output(&resolution.session, info.index, lines)
            .await
    }

    /// Drop the scroll-back; the visible screen is left alone
    pub async fn clear(&self, target: SessionTarget<'_>, name: &str) -> Result<(), Error> {
        let resolution = self.resolver.resolve(target, false).await?;
        let info = self.require(&resolution.session, name).await?;
        self.mux.clear_history(&resolution.session, info.index).await
    }

    pub async fn status(
        &self,
        target: SessionTarget<'_>,
        name: &str,
    ) -> Result<WindowStatus, Error> {
        let resolution = self.resolver.resolve(target, false).await?;
        let info = self.require(&resolution.session, name).await?;
        Ok(WindowStatus {
            window: info.name,
            pid: info.pid,
            index: info.index,
            session: resolution.session,
            directory: resolution.directory,
        })
    }

    async fn find(&self, session: &str, name: &str) -> Result<Option<WindowInfo>, Error> {
        Ok(self
            .mux
            .list_windows(session)
            .await?
            .into_iter()
            .find(|w| w.name == name))
    }

    async fn require(&self, session: &str, name: &str) -> Result<WindowInfo, Error> {
        self.find(session, name)
            .await?
            .ok_or_else(|| Error::WindowNotFound(name.to_string()))
    }
}

/// The session's initial shell window, if it is the only window
fn adoptable(windows: &[WindowInfo]) -> Option<&WindowInfo> {
    match windows {
        [only] if DEFAULT_SHELL_NAMES.contains(&only.name.as_str()) => Some(only),
        _ => None,
    }
}
