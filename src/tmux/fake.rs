//! In-memory multiplexer for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{tail_lines, Multiplexer, WindowInfo};
use crate::error::Error;

/// Recorded multiplexer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCall {
    CreateSession { session: String, dir: PathBuf },
    KillSession { session: String },
    CreateWindow { session: String, name: String },
    RenameWindow { session: String, index: u32, name: String },
    KillWindow { session: String, window: String },
    SendInput { session: String, window: String, text: String },
    SendInterrupt { session: String, window: String },
    ClearHistory { session: String, window: String },
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub info: WindowInfo,
    pub history: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub dir: PathBuf,
    pub windows: Vec<FakeWindow>,
}

#[derive(Default)]
struct FakeState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<MuxCall>,
    next_pid: u32,
    fail_create_session: Option<String>,
    fail_create_window: Option<String>,
    fail_rename_window: Option<String>,
}

/// Fake multiplexer that keeps sessions in memory and records mutating calls
#[derive(Clone, Default)]
pub struct FakeMultiplexer {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pre-existing session holding one shell window named `shell`
    pub fn add_session(&self, session: &str, shell: &str) {
        let mut inner = self.inner.lock();
        let window = new_window(&mut inner, 0, shell);
        inner.sessions.insert(
            session.to_string(),
            FakeSession {
                dir: PathBuf::new(),
                windows: vec![window],
            },
        );
    }

    /// Add a window to an existing session without recording a call
    pub fn add_window(&self, session: &str, name: &str) {
        let mut inner = self.inner.lock();
        let index = inner
            .sessions
            .get(session)
            .map(|s| next_index(&s.windows))
            .unwrap_or(0);
        let window = new_window(&mut inner, index, name);
        if let Some(s) = inner.sessions.get_mut(session) {
            s.windows.push(window);
        }
    }

    /// Make the next session creation fail with `stderr`
    pub fn fail_create_session(&self, stderr: &str) {
        self.inner.lock().fail_create_session = Some(stderr.to_string());
    }

    /// Make the next window creation fail with `stderr`
    pub fn fail_create_window(&self, stderr: &str) {
        self.inner.lock().fail_create_window = Some(stderr.to_string());
    }

    /// Make the next window rename fail with `stderr`
    pub fn fail_rename_window(&self, stderr: &str) {
        self.inner.lock().fail_rename_window = Some(stderr.to_string());
    }

    /// Append lines to a window's output buffer
    pub fn push_output(&self, session: &str, window: &str, lines: &[&str]) {
        let mut inner = self.inner.lock();
        let found = inner
            .sessions
            .get_mut(session)
            .and_then(|s| s.windows.iter_mut().find(|w| w.info.name == window));
        if let Some(w) = found {
            w.history.extend(lines.iter().map(|l| l.to_string()));
        }
    }

    pub fn calls(&self) -> Vec<MuxCall> {
        self.inner.lock().calls.clone()
    }

    pub fn session(&self, session: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(session).cloned()
    }

    pub fn window_names(&self, session: &str) -> Vec<String> {
        self.session(session)
            .map(|s| s.windows.into_iter().map(|w| w.info.name).collect())
            .unwrap_or_default()
    }

    pub fn session_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().sessions.keys().cloned().collect();
        names.sort();
        names
    }
}

fn new_window(state: &mut FakeState, index: u32, name: &str) -> FakeWindow {
    state.next_pid += 1;
    FakeWindow {
        info: WindowInfo {
            index,
            name: name.to_string(),
            pid: Some(1000 + state.next_pid),
        },
        history: Vec::new(),
    }
}

fn next_index(windows: &[FakeWindow]) -> u32 {
    windows.iter().map(|w| w.info.index + 1).max().unwrap_or(0)
}

fn find_window<'a>(
    state: &'a mut FakeState,
    session: &str,
    index: u32,
) -> Option<&'a mut FakeWindow> {
    state
        .sessions
        .get_mut(session)?
        .windows
        .iter_mut()
        .find(|w| w.info.index == index)
}

/// Name of the window at `index` for call records, `#<index>` if absent
fn window_label(state: &FakeState, session: &str, index: u32) -> String {
    state
        .sessions
        .get(session)
        .and_then(|s| s.windows.iter().find(|w| w.info.index == index))
        .map(|w| w.info.name.clone())
        .unwrap_or_else(|| format!("#{}", index))
}

fn missing_session(operation: &str, session: &str) -> Error {
    Error::external(operation, format!("can't find session: {}", session))
}

fn missing_window(operation: &str, session: &str, index: u32) -> Error {
    Error::external(
        operation,
        format!("can't find window: {}:{}", session, index),
    )
}

#[async_trait]
impl Multiplexer for FakeMultiplexer {
    async fn session_exists(&self, session: &str) -> Result<bool, Error> {
        Ok(self.inner.lock().sessions.contains_key(session))
    }

    async fn create_session(&self, session: &str, dir: &Path) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::CreateSession {
            session: session.to_string(),
            dir: dir.to_path_buf(),
        });
        if let Some(stderr) = inner.fail_create_session.take() {
            return Err(Error::external("new-session", stderr));
        }
        if inner.sessions.contains_key(session) {
            return Err(Error::external(
                "new-session",
                format!("duplicate session: {}", session),
            ));
        }
        let window = new_window(&mut inner, 0, "bash");
        inner.sessions.insert(
            session.to_string(),
            FakeSession {
                dir: dir.to_path_buf(),
                windows: vec![window],
            },
        );
        Ok(())
    }

    async fn kill_session(&self, session: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::KillSession {
            session: session.to_string(),
        });
        inner
            .sessions
            .remove(session)
            .map(|_| ())
            .ok_or_else(|| missing_session("kill-session", session))
    }

    async fn list_windows(&self, session: &str) -> Result<Vec<WindowInfo>, Error> {
        self.inner
            .lock()
            .sessions
            .get(session)
            .map(|s| s.windows.iter().map(|w| w.info.clone()).collect())
            .ok_or_else(|| missing_session("list-windows", session))
    }

    async fn create_window(&self, session: &str, name: &str) -> Result<u32, Error> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::CreateWindow {
            session: session.to_string(),
            name: name.to_string(),
        });
        if let Some(stderr) = inner.fail_create_window.take() {
            return Err(Error::external("new-window", stderr));
        }
        let index = match inner.sessions.get(session) {
            Some(s) => next_index(&s.windows),
            None => return Err(missing_session("new-window", session)),
        };
        let window = new_window(&mut inner, index, name);
        if let Some(s) = inner.sessions.get_mut(session) {
            s.windows.push(window);
        }
        Ok(index)
    }

    async fn rename_window(&self, session: &str, index: u32, name: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.calls.push(MuxCall::RenameWindow {
            session: session.to_string(),
            index,
            name: name.to_string(),
        });
        if let Some(stderr) = inner.fail_rename_window.take() {
            return Err(Error::external("rename-window", stderr));
        }
        let window = inner
            .sessions
            .get_mut(session)
            .and_then(|s| s.windows.iter_mut().find(|w| w.info.index == index))
            .ok_or_else(|| missing_window("rename-window", session, index))?;
        window.info.name = name.to_string();
        Ok(())
    }

    async fn kill_window(&self, session: &str, index: u32) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let window = window_label(&inner, session, index);
        inner.calls.push(MuxCall::KillWindow {
            session: session.to_string(),
            window,
        });
        let s = inner
            .sessions
            .get_mut(session)
            .ok_or_else(|| missing_window("kill-window", session, index))?;
        let before = s.windows.len();
        s.windows.retain(|w| w.info.index != index);
        if s.windows.len() == before {
            return Err(missing_window("kill-window", session, index));
        }
        Ok(())
    }

    async fn send_input(&self, session: &str, index: u32, text: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let window = window_label(&inner, session, index);
        inner.calls.push(MuxCall::SendInput {
            session: session.to_string(),
            window,
            text: text.to_string(),
        });
        let w = find_window(&mut inner, session, index)
            .ok_or_else(|| missing_window("send-keys", session, index))?;
        w.history.push(format!("$ {}", text));
        Ok(())
    }

    async fn send_interrupt(&self, session: &str, index: u32) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let window = window_label(&inner, session, index);
        inner.calls.push(MuxCall::SendInterrupt {
            session: session.to_string(),
            window,
        });
        let w = find_window(&mut inner, session, index)
            .ok_or_else(|| missing_window("send-keys", session, index))?;
        w.history.push("^C".to_string());
        Ok(())
    }

    async fn capture_output(
        &self,
        session: &str,
        index: u32,
        lines: u32,
    ) -> Result<String, Error> {
        let mut inner = self.inner.lock();
        let w = find_window(&mut inner, session, index)
            .ok_or_else(|| missing_window("capture-pane", session, index))?;
        Ok(tail_lines(&w.history.join("\n"), lines))
    }

    async fn clear_history(&self, session: &str, index: u32) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        let window = window_label(&inner, session, index);
        inner.calls.push(MuxCall::ClearHistory {
            session: session.to_string(),
            window,
        });
        let w = find_window(&mut inner, session, index)
            .ok_or_else(|| missing_window("clear-history", session, index))?;
        w.history.clear();
        Ok(())
    }
}
