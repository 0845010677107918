//! Session phase tracking.
//!
//! [`PhaseTracker`] follows the session through its negotiation cycle:
//!
//! ```text
//! Uninitialized ──first scene poll──▶ AwaitingSceneSelection
//!        │                                   │
//!        └──────── scene init received ──────┴──▶ AwaitingEpisodeStart
//!                                                      │   ▲
//!                                episode start received│   │end-reset while
//!                                                      ▼   │reset requested
//!                                                    Running
//! ```
//!
//! The tracker only observes. The controller never refuses an operation
//! because of the phase; messages that arrive out of phase are accepted and
//! logged.

use tracing::debug;

use crate::protocol::InboundKind;

/// Where the session is in its negotiation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Just constructed; nothing polled yet.
    Uninitialized,
    /// Polling the world-info channel for a scene selection.
    AwaitingSceneSelection,
    /// Scene chosen; polling for episode bounds.
    AwaitingEpisodeStart,
    /// Episode in progress; control is polled every tick.
    Running,
}

/// Tracks the current [`SessionPhase`].
///
/// # Example
///
/// ```
/// use simlink_server::state_machine::{PhaseTracker, SessionPhase};
///
/// let mut tracker = PhaseTracker::new();
/// tracker.on_scene_poll(false);
/// assert_eq!(tracker.phase(), SessionPhase::AwaitingSceneSelection);
/// tracker.on_scene_poll(true);
/// assert_eq!(tracker.phase(), SessionPhase::AwaitingEpisodeStart);
/// ```
#[derive(Debug)]
pub struct PhaseTracker {
    phase: SessionPhase,
}

impl PhaseTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Record a scene-init poll and its outcome.
    pub fn on_scene_poll(&mut self, received: bool) {
        if received {
            self.note_kind(InboundKind::SceneInit);
            self.phase = SessionPhase::AwaitingEpisodeStart;
        } else if self.phase == SessionPhase::Uninitialized {
            self.phase = SessionPhase::AwaitingSceneSelection;
        }
    }

    /// Record an episode-start poll and its outcome.
    pub fn on_episode_poll(&mut self, received: bool) {
        if received {
            self.note_kind(InboundKind::EpisodeStart);
            self.phase = SessionPhase::Running;
        }
    }

    /// Record a control poll and its outcome.
    pub fn on_control_poll(&self, received: bool) {
        if received {
            self.note_kind(InboundKind::Control);
        }
    }

    /// Record a reset acknowledgment. A requested reset ends the episode.
    pub fn on_end_reset(&mut self, reset_requested: bool) {
        if reset_requested && self.phase == SessionPhase::Running {
            self.phase = SessionPhase::AwaitingEpisodeStart;
        }
    }

    /// Message kinds the current phase waits for.
    pub const fn expected_kinds(&self) -> &'static [InboundKind] {
        match self.phase {
            SessionPhase::Uninitialized | SessionPhase::AwaitingSceneSelection => {
                &[InboundKind::SceneInit]
            }
            SessionPhase::AwaitingEpisodeStart => &[InboundKind::EpisodeStart],
            SessionPhase::Running => &[InboundKind::Control],
        }
    }

    fn note_kind(&self, kind: InboundKind) {
        if !self.expected_kinds().contains(&kind) {
            debug!(phase = ?self.phase, got = kind.name(), "message received out of phase");
        }
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
