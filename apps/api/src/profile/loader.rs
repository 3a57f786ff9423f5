//! Profile Location Loader — seeds the address selector from the user's saved profile.
//!
//! `LoaderMachine` is the pure state machine:
//!
//! ```text
//! Idle ──inputs ready──▶ Loading{ticket} ──fetch settled──▶ Loaded(Seeded | Empty | Failed)
//!                              ▲                                   │
//!                              └──────── new (user, revision) ─────┘
//! ```
//!
//! Inputs are ready when a user id is present and every reference table is
//! non-empty. Each distinct `(user_id, revision)` pair triggers at most one
//! fetch. Settle events carry the ticket they were issued with; stale tickets
//! and anything arriving after `teardown` are dropped on the floor.
//!
//! `ProfileLocationLoader` drives the machine against an injected
//! `ProfileStore`, running the fetch on a spawned task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::location::reference::ReferenceData;
use crate::location::selection::SelectionState;
use crate::profile::models::UserProfile;
use crate::profile::store::{ProfileStore, ProfileStoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadKey {
    pub user_id: String,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The profile held a full address and the selection was seeded from it.
    Seeded,
    /// No profile, or a profile without a full address. Not an error.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading { ticket: u64 },
    Loaded(LoadOutcome),
    /// The owner went away; nothing may touch the state any more.
    Detached,
}

/// A fetch the driver must perform, tagged with the ticket to settle it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: u64,
    pub user_id: String,
}

/// What the UI layer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationSnapshot {
    #[serde(flatten)]
    pub selection: SelectionState,
    pub profile_loaded: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct LoaderMachine {
    phase: LoadPhase,
    last_key: Option<LoadKey>,
    next_ticket: u64,
    selection: SelectionState,
    profile_loaded: bool,
    error: Option<String>,
}

impl Default for LoaderMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderMachine {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
            last_key: None,
            next_ticket: 1,
            selection: SelectionState::default(),
            profile_loaded: false,
            error: None,
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// "Inputs ready" event. Returns the fetch to perform, or `None` when the
    /// inputs are not ready or this combination was already fetched.
    pub fn inputs_ready(
        &mut self,
        user_id: Option<&str>,
        reference: &ReferenceData,
    ) -> Option<FetchRequest> {
        if self.phase == LoadPhase::Detached {
            return None;
        }
        let user_id = user_id.filter(|u| !u.is_empty())?;
        if !reference.is_ready() {
            debug!("Reference data not ready; deferring profile load");
            return None;
        }

        let key = LoadKey {
            user_id: user_id.to_string(),
            revision: reference.revision(),
        };
        if self.last_key.as_ref() == Some(&key) {
            return None;
        }

        let user_changed = self
            .last_key
            .as_ref()
            .map_or(false, |prev| prev.user_id != key.user_id);
        if user_changed {
            self.selection = SelectionState::default();
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.last_key = Some(key);
        self.phase = LoadPhase::Loading { ticket };
        self.profile_loaded = false;
        self.error = None;

        Some(FetchRequest {
            ticket,
            user_id: user_id.to_string(),
        })
    }

    /// "Fetch settled" event. Returns `false` when the result was discarded
    /// because the ticket is stale or the machine is detached.
    pub fn fetch_settled(
        &mut self,
        ticket: u64,
        result: Result<Option<UserProfile>, ProfileStoreError>,
    ) -> bool {
        match self.phase {
            LoadPhase::Loading { ticket: current } if current == ticket => {}
            _ => {
                debug!("Discarding profile fetch result for ticket {ticket}");
                return false;
            }
        }

        let outcome = match result {
            Ok(Some(profile)) => match profile.saved_location() {
                Some(location) => {
                    self.selection.set_province(location.province);
                    self.selection.set_amphure(location.district);
                    self.selection.set_tambon(location.subdistrict);
                    if let Some(zip) = location.zip_code {
                        self.selection.set_zip_code(zip);
                    }
                    LoadOutcome::Seeded
                }
                None => LoadOutcome::Empty,
            },
            Ok(None) => LoadOutcome::Empty,
            Err(e) => {
                let message = format!("Failed to load saved location: {e}");
                warn!("{message}");
                self.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        };

        self.profile_loaded = true;
        self.phase = LoadPhase::Loaded(outcome);
        true
    }

    /// The owner is gone. Later events are ignored.
    pub fn teardown(&mut self) {
        self.phase = LoadPhase::Detached;
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        LocationSnapshot {
            selection: self.selection.clone(),
            profile_loaded: self.profile_loaded,
            error: self.error.clone(),
        }
    }
}

/// One user's location-selection session: owns the selection state and
/// loads it from the profile store. Dropping the loader tears it down, so a
/// fetch that settles afterwards is discarded.
pub struct ProfileLocationLoader {
    store: Arc<dyn ProfileStore>,
    machine: Arc<Mutex<LoaderMachine>>,
    /// Highest ticket whose fetch has been applied or discarded.
    settled: Arc<watch::Sender<u64>>,
}

impl ProfileLocationLoader {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            store,
            machine: Arc::new(Mutex::new(LoaderMachine::new())),
            settled: Arc::new(settled),
        }
    }

    /// Feeds the current inputs to the machine and, if a fetch is due, spawns
    /// it. The returned handle completes once the result has been applied
    /// (or discarded).
    pub fn sync(&self, user_id: Option<&str>, reference: &ReferenceData) -> Option<JoinHandle<()>> {
        let request = lock(&self.machine).inputs_ready(user_id, reference)?;
        info!("Loading saved location for user {}", request.user_id);

        let store = Arc::clone(&self.store);
        let machine = Arc::clone(&self.machine);
        let settled = Arc::clone(&self.settled);
        Some(tokio::spawn(async move {
            let FetchRequest { ticket, user_id } = request;
            // A panicking store settles this ticket as a failed fetch.
            let result = tokio::spawn(async move { store.get_profile(&user_id).await })
                .await
                .unwrap_or_else(|e| Err(ProfileStoreError::TaskFailed(e.to_string())));
            lock(&machine).fetch_settled(ticket, result);
            settled.send_modify(|done| *done = (*done).max(ticket));
        }))
    }

    /// Runs `sync`, then waits until the fetch in flight, whether started
    /// here or by an earlier call, has settled.
    pub async fn load(&self, user_id: Option<&str>, reference: &ReferenceData) -> LocationSnapshot {
        // The spawned task runs to completion whether or not its handle is kept.
        drop(self.sync(user_id, reference));

        if let LoadPhase::Loading { ticket } = self.phase() {
            let mut settled = self.settled.subscribe();
            // Only fails if the sender is dropped, and `self` holds it.
            if settled.wait_for(|done| *done >= ticket).await.is_err() {
                warn!("Profile fetch {ticket} was abandoned");
            }
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        lock(&self.machine).snapshot()
    }

    pub fn phase(&self) -> LoadPhase {
        lock(&self.machine).phase().clone()
    }

    pub fn close(&self) {
        lock(&self.machine).teardown();
    }
}

/// Field-level edits from an interactive selector.
#[allow(dead_code)]
impl ProfileLocationLoader {
    pub fn set_province(&self, name: &str) {
        lock(&self.machine).selection_mut().set_province(name);
    }

    pub fn set_amphure(&self, name: &str) {
        lock(&self.machine).selection_mut().set_amphure(name);
    }

    pub fn set_tambon(&self, name: &str) {
        lock(&self.machine).selection_mut().set_tambon(name);
    }

    pub fn set_zip_code(&self, zip: &str) {
        lock(&self.machine).selection_mut().set_zip_code(zip);
    }

    /// Applies `f` to the selection, e.g. a cascading `select_*` call.
    pub fn update_selection<R>(&self, f: impl FnOnce(&mut SelectionState) -> R) -> R {
        f(lock(&self.machine).selection_mut())
    }
}

impl Drop for ProfileLocationLoader {
    fn drop(&mut self) {
        self.close();
    }
}

// The guard is never held across an await, and every mutation leaves the
// machine in a valid phase, so a poisoned lock is still safe to use.
fn lock(machine: &Mutex<LoaderMachine>) -> MutexGuard<'_, LoaderMachine> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}
