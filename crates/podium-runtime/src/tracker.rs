//! Presentation state tracking.
//!
//! The state is derived from the host on every refresh and never cached
//! across turns: the user can click around Keynote between commands.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use podium_keynote::{PlaybackMode, PlaybackStatus, PresentationBackend};
use podium_models::{PresentationSnapshot, PresentationState};

/// Derives [`PresentationState`] from the backend.
pub struct StateTracker {
    backend: Arc<dyn PresentationBackend>,
    snapshot: RwLock<PresentationSnapshot>,
}

impl StateTracker {
    pub fn new(backend: Arc<dyn PresentationBackend>) -> Self {
        Self {
            backend,
            snapshot: RwLock::new(PresentationSnapshot::default()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn PresentationBackend> {
        &self.backend
    }

    /// Queries the backend and returns the new state.
    pub async fn refresh(&self) -> PresentationState {
        self.refresh_snapshot().await.state
    }

    /// Queries the backend and returns the full snapshot.
    ///
    /// Never fails: a backend error degrades to `NoHost`.
    pub async fn refresh_snapshot(&self) -> PresentationSnapshot {
        let snapshot = self.probe().await;
        let mut current = self.snapshot.write().await;
        if current.state != snapshot.state {
            debug!(from = %current.state, to = %snapshot.state, "Presentation state changed");
        }
        *current = snapshot.clone();
        snapshot
    }

    /// Snapshot from the last refresh.
    pub async fn snapshot(&self) -> PresentationSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Checks host, then document, then playback; stops at the first no.
    async fn probe(&self) -> PresentationSnapshot {
        match self.backend.is_host_running().await {
            Ok(true) => {}
            Ok(false) => return PresentationSnapshot::bare(PresentationState::NoHost),
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Host check failed");
                return PresentationSnapshot::bare(PresentationState::NoHost);
            }
        }

        match self.backend.is_document_open().await {
            Ok(true) => {}
            Ok(false) => return PresentationSnapshot::bare(PresentationState::NoDocument),
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Document check failed");
                return PresentationSnapshot::bare(PresentationState::NoHost);
            }
        }

        match self.backend.playback_status().await {
            Ok(status) => snapshot_from_status(status),
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Playback status failed");
                PresentationSnapshot::bare(PresentationState::NoHost)
            }
        }
    }
}

/// Snapshot for a host with an open document.
pub(crate) fn snapshot_from_status(status: PlaybackStatus) -> PresentationSnapshot {
    PresentationSnapshot {
        state: match status.mode {
            PlaybackMode::Stopped => PresentationState::Ready,
            PlaybackMode::Playing => PresentationState::Playing,
            PlaybackMode::Paused => PresentationState::Paused,
        },
        presentation_name: Some(status.document_name).filter(|n| !n.is_empty()),
        current_slide: status.current_slide,
        total_slides: status.total_slides,
    }
}
