//! Session lifecycle state machine
//!
//! Exactly one recruitment session exists per process. Creating a new session
//! supersedes the previous one and cancels its timeout. All mutating
//! operations serialize on a single lock so the size-10 transition is atomic
//! with its completion event; nothing awaits while the lock is held.
//!
//! The auto-close timeout is a spawned task bound to the `SessionId` it was
//! scheduled for. A timer that fires after its session was superseded or
//! closed is a guaranteed no-op.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::tier::Tier;

/// A session closes itself the moment the roster reaches this size.
pub const ROSTER_CAPACITY: usize = 10;

/// Unique identity of one session instance.
///
/// Doubles as the staleness token for the timeout task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One player on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub user_id: u64,
    pub tier: Tier,
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session has been created yet (or the last one was discarded).
    Idle,
    /// Accepting joins and leaves.
    Open,
    /// Roster hit capacity; the session is in the middle of auto-closing.
    Full,
    /// Terminal for this session instance.
    Closed,
}

impl SessionPhase {
    /// Static label for logs and the readiness endpoint.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::Full => "full",
            Self::Closed => "closed",
        }
    }
}

/// Why a session closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Manual,
    Timeout,
    Completed,
}

impl CloseReason {
    /// Static label for the `session_closures_total` metric.
    pub fn label(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Timeout => "timeout",
            Self::Completed => "completed",
        }
    }
}

/// Events emitted to the chat adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Roster reached capacity. Carries the finalized roster in join order.
    Completed {
        session_id: SessionId,
        roster: Vec<Participant>,
    },
    /// Session closed; the adapter disables controls and announces why.
    Closed {
        session_id: SessionId,
        reason: CloseReason,
    },
}

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    pub session_id: SessionId,
    pub roster_size: usize,
    pub remaining: usize,
    /// True when this join filled the final slot.
    pub completed: bool,
}

/// Point-in-time copy of the session, for rendering and health reporting.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub phase: SessionPhase,
    pub roster: Vec<Participant>,
    pub owner: Option<u64>,
}

impl SessionSnapshot {
    pub fn remaining(&self) -> usize {
        ROSTER_CAPACITY.saturating_sub(self.roster.len())
    }
}

#[derive(Debug)]
struct SessionState {
    session_id: Option<SessionId>,
    phase: SessionPhase,
    roster: Vec<Participant>,
    owner: Option<u64>,
    timeout: Option<JoinHandle<()>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: None,
            phase: SessionPhase::Idle,
            roster: Vec::with_capacity(ROSTER_CAPACITY),
            owner: None,
            timeout: None,
        }
    }
}

#[derive(Debug)]
struct ManagerInner {
    state: Mutex<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
    timeout: Duration,
}

/// Handle to the single process-wide session.
///
/// Cheap to clone; all clones share one state.
#[derive(Debug, Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

impl SessionManager {
    /// Create a manager plus the receiving end of its event stream.
    pub fn new(timeout: Duration) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            inner: Arc::new(ManagerInner {
                state: Mutex::new(SessionState::default()),
                events,
                timeout,
            }),
        };
        (manager, rx)
    }

    /// Open a fresh session owned by `owner_id`, discarding any prior one.
    ///
    /// Cancels the previous session's timeout before scheduling the new one,
    /// so a stale timer can never close the wrong session.
    pub async fn create(&self, owner_id: u64) -> SessionId {
        let mut state = self.inner.state.lock().await;

        if let Some(handle) = state.timeout.take() {
            handle.abort();
        }

        let session_id = SessionId::new();
        state.session_id = Some(session_id);
        state.phase = SessionPhase::Open;
        state.roster.clear();
        state.owner = Some(owner_id);
        state.timeout = Some(self.spawn_timeout(session_id));

        info!(
            %session_id,
            owner_id,
            timeout_secs = self.inner.timeout.as_secs(),
            "Recruitment session opened"
        );

        session_id
    }

    /// Add a player to the roster.
    ///
    /// Filling the final slot emits `SessionEvent::Completed` with the full
    /// roster and then closes the session with reason `Completed`, atomically
    /// with the join itself.
    pub async fn join(&self, user_id: u64, tier: Tier) -> Result<JoinOutcome, SessionError> {
        let mut state = self.inner.state.lock().await;

        let session_id = match state.session_id {
            Some(id) if state.phase == SessionPhase::Open => id,
            _ => return Err(SessionError::SessionNotOpen),
        };

        if state.roster.iter().any(|p| p.user_id == user_id) {
            return Err(SessionError::AlreadyJoined { user_id });
        }

        // A seeded roster can already sit at capacity while the phase is
        // still Open; the roster must never grow past ten.
        if state.roster.len() >= ROSTER_CAPACITY {
            return Err(SessionError::SessionNotOpen);
        }

        state.roster.push(Participant { user_id, tier });
        let roster_size = state.roster.len();
        debug!(%session_id, user_id, tier = %tier, roster_size, "Player joined");

        if roster_size >= ROSTER_CAPACITY {
            state.phase = SessionPhase::Full;
            if let Some(handle) = state.timeout.take() {
                handle.abort();
            }
            self.emit(SessionEvent::Completed {
                session_id,
                roster: state.roster.clone(),
            });
            info!(%session_id, "Roster full, closing session");
            self.close_locked(&mut state, session_id, CloseReason::Completed);
            return Ok(JoinOutcome {
                session_id,
                roster_size,
                remaining: 0,
                completed: true,
            });
        }

        Ok(JoinOutcome {
            session_id,
            roster_size,
            remaining: ROSTER_CAPACITY.saturating_sub(roster_size),
            completed: false,
        })
    }

    /// Remove a player from the roster. The session stays open.
    pub async fn leave(&self, user_id: u64) -> Result<(), SessionError> {
        let mut state = self.inner.state.lock().await;

        let Some(position) = state.roster.iter().position(|p| p.user_id == user_id) else {
            return Err(SessionError::NotJoined { user_id });
        };

        state.roster.remove(position);
        debug!(user_id, roster_size = state.roster.len(), "Player left");
        Ok(())
    }

    /// Force-close the open session.
    ///
    /// Only the session owner or a privileged caller may close; the
    /// privileged check itself is delegated to the adapter.
    pub async fn close(
        &self,
        requester_id: u64,
        is_privileged: bool,
    ) -> Result<(), SessionError> {
        let mut state = self.inner.state.lock().await;

        let session_id = match state.session_id {
            Some(id) if state.phase == SessionPhase::Open => id,
            _ => return Err(SessionError::SessionNotOpen),
        };

        if state.owner != Some(requester_id) && !is_privileged {
            return Err(SessionError::Unauthorized {
                user_id: requester_id,
            });
        }

        info!(%session_id, requester_id, "Session closed manually");
        self.close_locked(&mut state, session_id, CloseReason::Manual);
        Ok(())
    }

    /// Replace the roster without touching the lifecycle (test command).
    pub async fn seed_roster(&self, owner_id: u64, players: Vec<Participant>) {
        let mut state = self.inner.state.lock().await;
        warn!(count = players.len(), "Seeding synthetic roster");
        state.roster = players;
        state.owner = Some(owner_id);
    }

    /// Replace the roster and drive the full completion flow (test command).
    ///
    /// Requires an open session, mirroring the interactive path.
    pub async fn force_complete(
        &self,
        players: Vec<Participant>,
    ) -> Result<Vec<Participant>, SessionError> {
        let mut state = self.inner.state.lock().await;

        let session_id = match state.session_id {
            Some(id) if state.phase == SessionPhase::Open => id,
            _ => return Err(SessionError::SessionNotOpen),
        };

        warn!(%session_id, count = players.len(), "Force-completing session with synthetic roster");
        state.roster = players;
        state.roster.sort_by_key(|p| p.tier.rank());
        state.phase = SessionPhase::Full;
        if let Some(handle) = state.timeout.take() {
            handle.abort();
        }
        let roster = state.roster.clone();
        self.emit(SessionEvent::Completed {
            session_id,
            roster: roster.clone(),
        });
        self.close_locked(&mut state, session_id, CloseReason::Completed);
        Ok(roster)
    }

    /// Copy of the current session for rendering and health reporting.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            session_id: state.session_id,
            phase: state.phase,
            roster: state.roster.clone(),
            owner: state.owner,
        }
    }

    /// Timeout expiry path. No-op unless `session_id` is still the live,
    /// open, below-capacity session it was scheduled for.
    async fn expire(&self, session_id: SessionId) {
        let mut state = self.inner.state.lock().await;

        if state.session_id != Some(session_id) || state.phase != SessionPhase::Open {
            debug!(%session_id, "Stale session timeout, ignoring");
            return;
        }
        if state.roster.len() >= ROSTER_CAPACITY {
            // Lost the race with a completing join.
            return;
        }

        warn!(
            %session_id,
            roster_size = state.roster.len(),
            "Session timed out below capacity"
        );
        self.close_locked(&mut state, session_id, CloseReason::Timeout);
    }

    fn spawn_timeout(&self, session_id: SessionId) -> JoinHandle<()> {
        let timeout = self.inner.timeout;
        // Weak so a pending timer never keeps the manager alive on its own.
        let weak: Weak<ManagerInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                SessionManager { inner }.expire(session_id).await;
            }
        })
    }

    /// Shared closure cleanup: drop the timer, wipe roster and owner, mark
    /// the phase terminal, and notify the adapter. Caller holds the lock.
    fn close_locked(&self, state: &mut SessionState, session_id: SessionId, reason: CloseReason) {
        if let Some(handle) = state.timeout.take() {
            handle.abort();
        }
        state.roster.clear();
        state.owner = None;
        state.phase = SessionPhase::Closed;
        self.emit(SessionEvent::Closed { session_id, reason });
    }

    fn emit(&self, event: SessionEvent) {
        if self.inner.events.send(event).is_err() {
            debug!("Session event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (SessionManager, mpsc::UnboundedReceiver<SessionEvent>) {
        SessionManager::new(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn join_without_session_is_rejected() {
        let (manager, _rx) = manager();
        assert_eq!(
            manager.join(1, Tier::Gold).await,
            Err(SessionError::SessionNotOpen)
        );
    }

    #[tokio::test]
    async fn duplicate_join_leaves_roster_unchanged() {
        let (manager, _rx) = manager();
        manager.create(1).await;

        manager.join(7, Tier::Gold).await.unwrap();
        let err = manager.join(7, Tier::Diamond).await.unwrap_err();
        assert_eq!(err, SessionError::AlreadyJoined { user_id: 7 });

        let snapshot = manager.snapshot().await;
        assert_eq!(snapshot.roster.len(), 1);
        assert_eq!(snapshot.roster[0].tier, Tier::Gold);
    }

    #[tokio::test]
    async fn leave_requires_membership() {
        let (manager, _rx) = manager();
        manager.create(1).await;
        assert_eq!(
            manager.leave(9).await,
            Err(SessionError::NotJoined { user_id: 9 })
        );
    }

    #[tokio::test]
    async fn close_requires_owner_or_privilege() {
        let (manager, mut rx) = manager();
        manager.create(1).await;
        manager.join(2, Tier::Silver).await.unwrap();

        let err = manager.close(2, false).await.unwrap_err();
        assert_eq!(err, SessionError::Unauthorized { user_id: 2 });
        assert_eq!(manager.snapshot().await.roster.len(), 1);

        manager.close(2, true).await.unwrap();
        let snapshot = manager.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Closed);
        assert!(snapshot.roster.is_empty());
        assert!(matches!(
            rx.try_recv(),
            Ok(SessionEvent::Closed {
                reason: CloseReason::Manual,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn creating_a_new_session_supersedes_the_old_one() {
        let (manager, _rx) = manager();
        let first = manager.create(1).await;
        manager.join(2, Tier::Iron).await.unwrap();

        let second = manager.create(3).await;
        assert_ne!(first, second);

        let snapshot = manager.snapshot().await;
        assert_eq!(snapshot.session_id, Some(second));
        assert_eq!(snapshot.owner, Some(3));
        assert!(snapshot.roster.is_empty());
    }
}
