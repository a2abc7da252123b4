use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::tmux::Multiplexer;

/// Prefix shared by every directory-derived session name
pub const SESSION_PREFIX: &str = "claude-session-";

/// Hex characters of the path digest kept in a session name
const HASH_LEN: usize = 12;

/// Where a session should be looked up from: an explicit name, or else the
/// working directory and its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct SessionTarget<'a> {
    pub explicit: Option<&'a str>,
    pub cwd: &'a Path,
}

impl<'a> SessionTarget<'a> {
    pub fn new(explicit: Option<&'a str>, cwd: &'a Path) -> Self {
        Self { explicit, cwd }
    }
}

/// Outcome of session resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub session: String,
    /// Directory the session belongs to; an ancestor of the working
    /// directory when inherited
    pub directory: PathBuf,
    pub created: bool,
    pub from_parent: bool,
}

/// Truncated SHA-256 of the path bytes
pub fn hash_path(path: &Path) -> String {
    let digest = Sha256::digest(path.as_os_str().as_encoded_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(HASH_LEN);
    hex
}

/// Session name derived from a directory
pub fn session_name_for_path(path: &Path) -> String {
    format!("{}{}", SESSION_PREFIX, hash_path(path))
}

/// Maps an explicit name or a working directory onto a live session
pub struct SessionResolver<M> {
    mux: M,
}

impl<M: Multiplexer> SessionResolver<M> {
    pub fn new(mux: M) -> Self {
        Self { mux }
    }

    /// Resolve a session, in order: explicit name, the working directory's
    /// own session, the nearest ancestor's session, and finally (when
    /// `auto_create` is set) a new session for the working directory.
    pub async fn resolve(
        &self,
        target: SessionTarget<'_>,
        auto_create: bool,
    ) -> Result<Resolution, Error> {
        let cwd = target.cwd;

        if let Some(explicit) = target.explicit {
            if self.mux.session_exists(explicit).await? {
                tracing::debug!(session = explicit, "using explicit session");
                return Ok(found(explicit, cwd, false));
            }
            if !auto_create {
                return Err(Error::SessionNotFound);
            }
            return self.create(explicit, cwd).await;
        }

        let session = session_name_for_path(cwd);
        if self.mux.session_exists(&session).await? {
            tracing::debug!(%session, dir = %cwd.display(), "found session for directory");
            return Ok(found(&session, cwd, false));
        }

        if let Some((ancestor, parent_session)) = self.find_parent_session(cwd).await? {
            tracing::debug!(
                session = %parent_session,
                dir = %ancestor.display(),
                "inherited session from parent directory"
            );
            return Ok(found(&parent_session, ancestor, true));
        }

        if !auto_create {
            return Err(Error::SessionNotFound);
        }
        self.create(&session, cwd).await
    }

    /// Walk up from `dir` (exclusive) towards the root (exclusive) and return
    /// the first ancestor whose derived session exists.
    pub async fn find_parent_session<'p>(
        &self,
        dir: &'p Path,
    ) -> Result<Option<(&'p Path, String)>, Error> {
        for ancestor in dir.ancestors().skip(1) {
            if ancestor.parent().is_none() {
                break;
            }
            let session = session_name_for_path(ancestor);
            if self.mux.session_exists(&session).await? {
                return Ok(Some((ancestor, session)));
            }
        }
        Ok(None)
    }

    async fn create(&self, session: &str, dir: &Path) -> Result<Resolution, Error> {
        self.mux
            .create_session(session, dir)
            .await
            .map_err(|e| e.into_session_creation(session))?;
        Ok(Resolution {
            session: session.to_string(),
            directory: dir.to_path_buf(),
            created: true,
            from_parent: false,
        })
    }
}

fn found(session: &str, dir: &Path, from_parent: bool) -> Resolution {
    Resolution {
        session: session.to_string(),
        directory: dir.to_path_buf(),
        created: false,
        from_parent,
    }
}
