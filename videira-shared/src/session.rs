/// Session and profile state tracking
///
/// Single source of truth for "who is signed in and what is their
/// profile." Auth events (sign-in, sign-out, refresh) are fed in over an
/// mpsc channel; the current state is published over a watch channel so
/// any number of observers see the latest value.
///
/// # State model
///
/// Absent profiles are a valid state, not an error: a freshly registered
/// user has a credential before their profile row exists. The state enum
/// makes that explicit instead of overloading an `Option`:
///
/// - `Unauthenticated`: no identity
/// - `AuthenticatedNoProfile`: valid identity, no profile row (yet)
/// - `Authenticated`: identity with its profile loaded
///
/// # Re-entrancy contract
///
/// The tracker never queries the profile store from inside the turn that
/// delivered an auth event. It publishes the identity-only state first,
/// yields back to the scheduler, and performs the profile fetch on the
/// next turn. Callers that emit an event from within their own store
/// callback therefore never observe a nested call back into the store.
///
/// Profile fetch failures are swallowed and logged; the state remains
/// `AuthenticatedNoProfile` rather than surfacing an error.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::profile::Profile;

/// Current session state, replaced wholesale on every change
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No authenticated identity
    Unauthenticated,

    /// Valid identity, profile row absent or not yet loaded
    AuthenticatedNoProfile { user_id: Uuid },

    /// Identity with its profile loaded
    Authenticated { profile: Profile },
}

impl SessionState {
    /// Returns the authenticated user ID, if any
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::AuthenticatedNoProfile { user_id } => Some(*user_id),
            SessionState::Authenticated { profile } => profile.user_id,
        }
    }

    /// Returns the loaded profile, if any
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Authenticated { profile } => Some(profile),
            _ => None,
        }
    }

    /// Checks if any identity is present
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, SessionState::Unauthenticated)
    }
}

/// Auth lifecycle events fed into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A credential was validated at login
    SignedIn { user_id: Uuid },

    /// An access token was refreshed for an existing session
    TokenRefreshed { user_id: Uuid },

    /// The credential was cleared
    SignedOut,
}

/// Profile lookup seam for the tracker
///
/// Implemented for `PgPool` in production; tests substitute an in-memory
/// store to drive the state machine deterministically.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Zero-or-one lookup by user ID
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error>;
}

#[async_trait]
impl ProfileStore for PgPool {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        Profile::find_by_user_id(self, user_id).await
    }
}

/// Tracks session state, driven by auth events
///
/// Owns a background task that consumes events and publishes state.
/// Dropping the tracker (or calling `shutdown`) stops the task.
pub struct SessionTracker {
    events: mpsc::Sender<AuthEvent>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionTracker {
    /// Spawns a tracker over the given profile store
    pub fn spawn<S: ProfileStore>(store: S) -> Self {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(SessionState::Unauthenticated);

        let task = tokio::spawn(run_tracker(store, event_rx, state_tx));

        Self {
            events: event_tx,
            state: state_rx,
            task,
        }
    }

    /// Handle for emitting auth events
    pub fn events(&self) -> mpsc::Sender<AuthEvent> {
        self.events.clone()
    }

    /// Subscribes to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Snapshot of the current state
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Stops the background task
    pub fn shutdown(self) {
        drop(self.events);
        self.task.abort();
    }
}

async fn run_tracker<S: ProfileStore>(
    store: S,
    mut events: mpsc::Receiver<AuthEvent>,
    state: watch::Sender<SessionState>,
) {
    while let Some(event) = events.recv().await {
        match event {
            AuthEvent::SignedIn { user_id } | AuthEvent::TokenRefreshed { user_id } => {
                debug!(%user_id, "auth event: identity established");

                // Publish identity immediately; the profile fetch happens
                // on the next scheduler turn, never inside the turn that
                // delivered the event.
                let _ = state.send(SessionState::AuthenticatedNoProfile { user_id });

                tokio::task::yield_now().await;

                match store.fetch_profile(user_id).await {
                    Ok(Some(profile)) => {
                        let _ = state.send(SessionState::Authenticated { profile });
                    }
                    Ok(None) => {
                        debug!(%user_id, "no profile row for user, staying profile-less");
                    }
                    Err(e) => {
                        // Treated as "no profile", not as a session failure
                        warn!(%user_id, error = %e, "profile fetch failed");
                    }
                }
            }
            AuthEvent::SignedOut => {
                debug!("auth event: signed out");
                let _ = state.send(SessionState::Unauthenticated);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        let user_id = Uuid::new_v4();

        let state = SessionState::Unauthenticated;
        assert!(!state.is_authenticated());
        assert_eq!(state.user_id(), None);
        assert!(state.profile().is_none());

        let state = SessionState::AuthenticatedNoProfile { user_id };
        assert!(state.is_authenticated());
        assert_eq!(state.user_id(), Some(user_id));
        assert!(state.profile().is_none());
    }
}
