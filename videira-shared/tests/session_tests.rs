/// Integration tests for the session tracker
///
/// These tests run against an in-memory profile store, no database
/// required. They drive the tracker through its auth events and assert
/// on the published state transitions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use videira_shared::models::profile::{Profile, Role};
use videira_shared::session::{AuthEvent, ProfileStore, SessionState, SessionTracker};

/// In-memory profile store
///
/// `hold_fetch` parks fetches until `release` is notified, letting tests
/// observe the intermediate identity-only state deterministically (the
/// watch channel coalesces, so an unparked fetch may have already
/// completed by the time the test looks).
#[derive(Default)]
struct MemoryStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    fetch_count: AtomicUsize,
    fail: std::sync::atomic::AtomicBool,
    hold_fetch: std::sync::atomic::AtomicBool,
    release: tokio::sync::Notify,
}

impl MemoryStore {
    fn with_profile(profile: Profile) -> Self {
        let store = Self::default();
        let user_id = profile.user_id.expect("test profile needs a user_id");
        store.profiles.lock().unwrap().insert(user_id, profile);
        store
    }
}

/// Shareable handle to a [`MemoryStore`]
///
/// The trait impl lives on this local wrapper so the tests can hand the
/// tracker one handle and keep another for inspecting fetch counts.
struct StoreHandle(Arc<MemoryStore>);

#[async_trait]
impl ProfileStore for StoreHandle {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        let store = &self.0;
        store.fetch_count.fetch_add(1, Ordering::SeqCst);

        if store.hold_fetch.load(Ordering::SeqCst) {
            store.release.notified().await;
        }

        if store.fail.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }

        Ok(store.profiles.lock().unwrap().get(&user_id).cloned())
    }
}

fn make_profile(user_id: Uuid, role: Role) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        user_id: Some(user_id),
        name: "Ana".to_string(),
        email: None,
        phone: None,
        role,
        discipler_id: None,
        spiritual_stage: None,
        created_at: now,
        updated_at: now,
    }
}

/// Waits until the watch channel reports a state matching the predicate
async fn wait_for_state(
    rx: &mut tokio::sync::watch::Receiver<SessionState>,
    mut pred: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if pred(&rx.borrow()) {
                return rx.borrow().clone();
            }
            rx.changed().await.expect("tracker task ended");
        }
    })
    .await
    .expect("timed out waiting for session state")
}

#[tokio::test]
async fn test_initial_state_is_unauthenticated() {
    let store = Arc::new(MemoryStore::default());
    let tracker = SessionTracker::spawn(StoreHandle(store));

    assert_eq!(tracker.current(), SessionState::Unauthenticated);

    tracker.shutdown();
}

#[tokio::test]
async fn test_sign_in_loads_profile() {
    let user_id = Uuid::new_v4();
    let profile = make_profile(user_id, Role::Discipler);
    let store = Arc::new(MemoryStore::with_profile(profile.clone()));

    let tracker = SessionTracker::spawn(StoreHandle(store.clone()));
    let mut rx = tracker.subscribe();

    tracker
        .events()
        .send(AuthEvent::SignedIn { user_id })
        .await
        .unwrap();

    let state = wait_for_state(&mut rx, |s| s.profile().is_some()).await;

    assert_eq!(state.user_id(), Some(user_id));
    assert_eq!(state.profile().unwrap().id, profile.id);
    assert_eq!(store.fetch_count.load(Ordering::SeqCst), 1);

    tracker.shutdown();
}

#[tokio::test]
async fn test_sign_in_without_profile_row() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::default());

    let tracker = SessionTracker::spawn(StoreHandle(store.clone()));
    let mut rx = tracker.subscribe();

    tracker
        .events()
        .send(AuthEvent::SignedIn { user_id })
        .await
        .unwrap();

    // Profile-less authentication is a valid terminal state, not an error
    let state = wait_for_state(&mut rx, |s| s.is_authenticated()).await;
    assert_eq!(
        state,
        SessionState::AuthenticatedNoProfile { user_id }
    );

    // Give the fetch a chance to complete; state must not regress
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        tracker.current(),
        SessionState::AuthenticatedNoProfile { user_id }
    );
    assert_eq!(store.fetch_count.load(Ordering::SeqCst), 1);

    tracker.shutdown();
}

#[tokio::test]
async fn test_fetch_failure_surfaces_as_no_profile() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::with_profile(make_profile(
        user_id,
        Role::Disciple,
    )));
    store.fail.store(true, Ordering::SeqCst);

    let tracker = SessionTracker::spawn(StoreHandle(store.clone()));
    let mut rx = tracker.subscribe();

    tracker
        .events()
        .send(AuthEvent::SignedIn { user_id })
        .await
        .unwrap();

    let state = wait_for_state(&mut rx, |s| s.is_authenticated()).await;
    assert_eq!(state, SessionState::AuthenticatedNoProfile { user_id });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(tracker.current().profile().is_none());

    tracker.shutdown();
}

#[tokio::test]
async fn test_sign_out_clears_identity_and_profile() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::with_profile(make_profile(
        user_id,
        Role::Master,
    )));

    let tracker = SessionTracker::spawn(StoreHandle(store));
    let mut rx = tracker.subscribe();

    tracker
        .events()
        .send(AuthEvent::SignedIn { user_id })
        .await
        .unwrap();
    wait_for_state(&mut rx, |s| s.profile().is_some()).await;

    tracker.events().send(AuthEvent::SignedOut).await.unwrap();
    let state = wait_for_state(&mut rx, |s| !s.is_authenticated()).await;

    assert_eq!(state, SessionState::Unauthenticated);
    assert_eq!(state.user_id(), None);

    tracker.shutdown();
}

#[tokio::test]
async fn test_profile_fetch_deferred_past_event_delivery() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::with_profile(make_profile(
        user_id,
        Role::Disciple,
    )));
    store.hold_fetch.store(true, Ordering::SeqCst);

    let tracker = SessionTracker::spawn(StoreHandle(store.clone()));
    let mut rx = tracker.subscribe();

    tracker
        .events()
        .send(AuthEvent::SignedIn { user_id })
        .await
        .unwrap();

    // The identity-only state is published before the store call
    // completes: with the fetch parked, the first observable transition
    // carries no profile.
    let first = wait_for_state(&mut rx, |s| s.is_authenticated()).await;
    assert_eq!(first, SessionState::AuthenticatedNoProfile { user_id });

    store.release.notify_one();

    let final_state = wait_for_state(&mut rx, |s| s.profile().is_some()).await;
    assert_eq!(final_state.user_id(), Some(user_id));

    tracker.shutdown();
}

#[tokio::test]
async fn test_token_refresh_reloads_profile() {
    let user_id = Uuid::new_v4();
    let store = Arc::new(MemoryStore::with_profile(make_profile(
        user_id,
        Role::Disciple,
    )));

    let tracker = SessionTracker::spawn(StoreHandle(store.clone()));
    let mut rx = tracker.subscribe();

    tracker
        .events()
        .send(AuthEvent::SignedIn { user_id })
        .await
        .unwrap();
    wait_for_state(&mut rx, |s| s.profile().is_some()).await;

    // Promote the user out of band, then deliver a refresh event and
    // expect the new role to come through.
    {
        let mut profiles = store.profiles.lock().unwrap();
        if let Some(p) = profiles.get_mut(&user_id) {
            p.role = Role::Discipler;
        }
    }

    tracker
        .events()
        .send(AuthEvent::TokenRefreshed { user_id })
        .await
        .unwrap();

    let state = wait_for_state(&mut rx, |s| {
        s.profile().map(|p| p.role == Role::Discipler).unwrap_or(false)
    })
    .await;

    assert_eq!(state.profile().unwrap().role, Role::Discipler);
    assert_eq!(store.fetch_count.load(Ordering::SeqCst), 2);

    tracker.shutdown();
}
