use serde::Serialize;

use super::resolver::{Resolution, SessionResolver, SessionTarget};
use crate::error::Error;
use crate::tmux::{Multiplexer, WindowInfo};

/// Snapshot of a session as tmux currently sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session: String,
    pub exists: bool,
    pub windows: Vec<WindowInfo>,
}

/// Whole-session lifecycle: initialize, kill, inspect
pub struct SessionManager<M> {
    mux: M,
    resolver: SessionResolver<M>,
}

impl<M: Multiplexer> SessionManager<M> {
    pub fn new(mux: M) -> Self {
        Self {
            resolver: SessionResolver::new(mux.clone()),
            mux,
        }
    }

    /// Resolve the session for `target`, creating it if nothing matches
    pub async fn initialize(&self, target: SessionTarget<'_>) -> Result<Resolution, Error> {
        self.resolver.resolve(target, true).await
    }

    /// Resolve without creating
    pub async fn find(&self, target: SessionTarget<'_>) -> Result<Resolution, Error> {
        self.resolver.resolve(target, false).await
    }

    pub async fn kill(&self, session: &str) -> Result<(), Error> {
        if !self.mux.session_exists(session).await? {
            return Err(Error::SessionNotFound);
        }
        self.mux.kill_session(session).await?;
        tracing::info!(session, "killed session");
        Ok(())
    }

    /// Existence plus window list; a missing session is reported, not an error
    pub async fn inspect(&self, session: &str) -> Result<SessionInfo, Error> {
        let exists = self.mux.session_exists(session).await?;
        let windows = if exists {
            self.mux.list_windows(session).await?
        } else {
            Vec::new()
        };
        Ok(SessionInfo {
            session: session.to_string(),
            exists,
            windows,
        })
    }
}
