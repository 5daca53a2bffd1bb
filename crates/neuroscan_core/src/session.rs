//! Session marker storage, navigation and the mount-time guard.

use crate::error::{UploadError, UploadResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Views the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Upload,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Upload => "/upload",
        }
    }
}

/// Navigation capability handed to views.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

impl Navigator for Vec<Route> {
    fn navigate(&mut self, route: Route) {
        self.push(route);
    }
}

/// Persisted proof that someone signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub user: String,
    pub signed_in_at: DateTime<Utc>,
}

/// Read/write access to the session marker.
pub trait SessionStore: Send + Sync {
    /// `Ok(false)` when no marker exists; `Err(SessionExpired)` when one
    /// exists but cannot be used.
    fn has_active_session(&self) -> UploadResult<bool>;

    fn sign_in(&self, user: &str) -> UploadResult<()>;

    fn sign_out(&self) -> UploadResult<()>;
}

/// Marker stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory, if one can be determined.
    pub fn in_data_dir() -> Option<Self> {
        crate::config::project_dirs().map(|d| Self::new(d.data_dir().join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_marker(&self) -> UploadResult<Option<SessionMarker>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(UploadError::SessionExpired(e.to_string())),
        };
        let marker: SessionMarker = serde_json::from_str(&raw)
            .map_err(|e| UploadError::SessionExpired(format!("corrupt marker: {e}")))?;
        if marker.user.trim().is_empty() {
            return Err(UploadError::SessionExpired("marker has no user".into()));
        }
        Ok(Some(marker))
    }
}

impl SessionStore for FileSessionStore {
    fn has_active_session(&self) -> UploadResult<bool> {
        Ok(self.read_marker()?.is_some())
    }

    fn sign_in(&self, user: &str) -> UploadResult<()> {
        let marker = SessionMarker {
            user: user.trim().to_string(),
            signed_in_at: Utc::now(),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| UploadError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&marker)
            .map_err(|e| UploadError::io(&self.path, e.into()))?;
        fs::write(&self.path, json).map_err(|e| UploadError::io(&self.path, e))
    }

    fn sign_out(&self) -> UploadResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::io(&self.path, e)),
        }
    }
}

/// In-memory marker, used when no data directory is available and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    user: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    pub fn signed_in(user: &str) -> Self {
        Self {
            user: Arc::new(Mutex::new(Some(user.to_string()))),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn has_active_session(&self) -> UploadResult<bool> {
        Ok(self
            .user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some())
    }

    fn sign_in(&self, user: &str) -> UploadResult<()> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.to_string());
        Ok(())
    }

    fn sign_out(&self) -> UploadResult<()> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Result of the mount-time session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allowed,
    Redirected,
    /// The guard already ran for this mount.
    AlreadyChecked,
}

/// Runs the session check once per mount.
#[derive(Debug, Default)]
pub struct SessionGuard {
    checked: Option<GuardOutcome>,
}

impl SessionGuard {
    pub fn check_on_mount(
        &mut self,
        store: &dyn SessionStore,
        navigator: &mut dyn Navigator,
    ) -> GuardOutcome {
        if self.checked.is_some() {
            return GuardOutcome::AlreadyChecked;
        }
        let active = match store.has_active_session() {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!("Session check failed: {e}");
                false
            }
        };
        let outcome = if active {
            GuardOutcome::Allowed
        } else {
            tracing::info!("No active session, redirecting to {}", Route::Login.path());
            navigator.navigate(Route::Login);
            GuardOutcome::Redirected
        };
        self.checked = Some(outcome);
        outcome
    }

    /// Outcome of the check for this mount, if it ran.
    pub fn outcome(&self) -> Option<GuardOutcome> {
        self.checked
    }
}
