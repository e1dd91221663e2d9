//! Embeddable application state store.
//!
//! Slice-composed state behind a lock, with change subscriptions and
//! versioned JSON snapshot persistence. The embedding frontend subscribes
//! for re-renders, persists [`AppStore::snapshot`] wherever it likes, and
//! feeds it back through [`AppStore::rehydrate`] on the next run; stored
//! fields merge over defaults and a version mismatch discards the
//! snapshot instead of guessing.

pub mod auth;
pub mod main;

use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::constants::Routes;
use crate::domain::guard::{self, GuardOutcome, PagePolicy, RolePolicy};
use crate::domain::{SessionStatus, SessionUser};

pub use auth::AuthSlice;
pub use main::MainSlice;

/// Bump when the persisted shape changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Composed state tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootState {
    pub auth: AuthSlice,
    pub main: MainSlice,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    state: RootState,
}

// Callbacks are Arc-shared so they can be cloned out of the registry and
// invoked with no lock held; a subscriber may then call back into the
// store (subscribe, unsubscribe, another update) without deadlocking.
type Subscriber = Arc<dyn Fn(&RootState) + Send + Sync>;
type HydrationCallback = Arc<dyn Fn(&RootState) + Send + Sync>;

/// Thread-safe application store.
#[derive(Default)]
pub struct AppStore {
    state: RwLock<RootState>,
    subscribers: Mutex<Vec<(u64, Subscriber)>>,
    next_subscriber_id: Mutex<u64>,
    on_rehydrate: Mutex<Option<HydrationCallback>>,
}

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state tree.
    pub fn state(&self) -> RootState {
        self.read_state().clone()
    }

    /// Register a callback fired after every state change.
    pub fn subscribe(&self, subscriber: impl Fn(&RootState) + Send + Sync + 'static) -> SubscriptionId {
        let id = {
            let mut next = self.lock_poisoned(self.next_subscriber_id.lock());
            *next += 1;
            *next
        };
        self.lock_poisoned(self.subscribers.lock())
            .push((id, Arc::new(subscriber)));
        SubscriptionId(id)
    }

    /// Remove a subscription; unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_poisoned(self.subscribers.lock())
            .retain(|(existing, _)| *existing != id.0);
    }

    /// Apply a mutation and notify subscribers.
    pub fn update(&self, mutate: impl FnOnce(&mut RootState)) {
        let state = {
            let mut guard = match self.state.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            mutate(&mut guard);
            guard.clone()
        };
        self.notify(&state);
    }

    /// Record the signed-in identity.
    pub fn set_user(&self, user: SessionUser) {
        self.update(|state| state.auth.user = Some(user));
    }

    /// Clear the signed-in identity.
    pub fn clear_user(&self) {
        self.update(|state| state.auth.user = None);
    }

    /// Register the callback fired once a snapshot has been applied.
    pub fn on_rehydrate(&self, callback: impl Fn(&RootState) + Send + Sync + 'static) {
        *self.lock_poisoned(self.on_rehydrate.lock()) = Some(Arc::new(callback));
    }

    /// Versioned JSON snapshot for persistence.
    pub fn snapshot(&self) -> Value {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            state: self.state(),
        };
        serde_json::to_value(&snapshot).unwrap_or(Value::Null)
    }

    /// Apply a persisted snapshot.
    ///
    /// Stored fields merge over defaults (missing fields keep theirs); a
    /// version mismatch or unreadable snapshot is discarded with a warning.
    /// Either way the hydration flag is set and the callback fires, so the
    /// embedding frontend can stop showing its boot state.
    pub fn rehydrate(&self, raw: Value) {
        let restored = match serde_json::from_value::<Snapshot>(raw) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Some(snapshot.state),
            Ok(snapshot) => {
                warn!(
                    stored = snapshot.version,
                    current = SNAPSHOT_VERSION,
                    "discarding snapshot with mismatched version"
                );
                None
            }
            Err(error) => {
                warn!(%error, "discarding unreadable snapshot");
                None
            }
        };
        self.update(|state| {
            if let Some(restored) = restored {
                state.auth = restored.auth;
            }
            state.main.has_hydrated = true;
        });
        let state = self.state();
        let callback = self.lock_poisoned(self.on_rehydrate.lock()).clone();
        if let Some(callback) = callback {
            callback(&state);
        }
    }

    fn notify(&self, state: &RootState) {
        let subscribers: Vec<Subscriber> = self
            .lock_poisoned(self.subscribers.lock())
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber(state);
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RootState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_poisoned<'a, T>(
        &self,
        result: Result<std::sync::MutexGuard<'a, T>, std::sync::PoisonError<std::sync::MutexGuard<'a, T>>>,
    ) -> std::sync::MutexGuard<'a, T> {
        match result {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Resolve a page policy and keep the store in step with the session:
/// an authenticated resolution records the user, an unauthenticated one
/// clears it, and a loading one leaves the store untouched.
pub fn resolve_guard(
    store: &AppStore,
    policy: &PagePolicy,
    status: &SessionStatus,
    role_policy: &dyn RolePolicy,
    routes: &Routes,
) -> GuardOutcome {
    match status {
        SessionStatus::Authenticated(user) => store.set_user(user.clone()),
        SessionStatus::Unauthenticated => store.clear_user(),
        SessionStatus::Loading => {}
    }
    guard::resolve(policy, status, role_policy, routes)
}
