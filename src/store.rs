use crate::errors::LoadError;
use crate::ids::IdGenerator;
use crate::models::{numbered_tab_name, AppState, Tab, DEFAULT_TAB_NAME};
use crate::storage::{KeyValueStore, STORAGE_KEY};
use crate::tabs::TabManager;
use tracing::{debug, error, info, warn};

/// Owns the application state and writes it through to storage.
///
/// Reads go through the accessors here; mutations go through
/// [`TabManager`] and [`crate::bars::LifeBarManager`], both of which save
/// before returning.
pub struct Store {
    state: AppState,
    storage: Box<dyn KeyValueStore + Send>,
    ids: Box<dyn IdGenerator + Send>,
}

impl Store {
    /// Restores the stored state, or starts over with a single default tab
    /// when nothing usable is stored. A blob that cannot be read or parsed
    /// is removed before starting over.
    pub fn load<S, G>(storage: S, ids: G) -> Self
    where
        S: KeyValueStore + Send + 'static,
        G: IdGenerator + Send + 'static,
    {
        let mut store = Self {
            state: AppState::default(),
            storage: Box::new(storage),
            ids: Box::new(ids),
        };

        match store.read_snapshot() {
            Ok(Some(state)) if !state.tabs.is_empty() => {
                store.state = state;
                if store.repair() {
                    store.save();
                }
                info!("restored {} tabs from storage", store.state.tabs.len());
            }
            Ok(_) => {
                info!("no stored state, starting with a default tab");
                store.reset();
            }
            Err(err) => {
                error!("failed to load stored state: {err}");
                if let Err(err) = store.storage.remove(STORAGE_KEY) {
                    error!("failed to clear stored state: {err}");
                }
                store.reset();
            }
        }

        store
    }

    /// Writes the full state. Failures are logged and otherwise ignored;
    /// the in-memory state stays authoritative.
    pub fn save(&mut self) {
        let payload = match serde_json::to_string(&self.state) {
            Ok(payload) => payload,
            Err(err) => {
                error!("failed to serialize app state: {err}");
                return;
            }
        };

        match self.storage.set(STORAGE_KEY, &payload) {
            Ok(()) => debug!("saved app state ({} bytes)", payload.len()),
            Err(err) => error!("failed to persist app state: {err}"),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// All tabs in creation order.
    pub fn tabs(&self) -> &[Tab] {
        &self.state.tabs
    }

    pub fn tab(&self, tab_id: &str) -> Option<&Tab> {
        self.state.tab(tab_id)
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.state.active_tab_id.as_deref()
    }

    /// The selected tab, or `None` when nothing is selected or the
    /// selection points at a tab that no longer exists.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id().and_then(|id| self.state.tab(id))
    }

    pub(crate) fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.state.active_tab_id.clone()?;
        self.state.tab_mut(&id)
    }

    pub(crate) fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Draws ids until one is not already used by any tab or bar.
    pub(crate) fn generate_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !id.is_empty() && !self.state.contains_id(&id) {
                return id;
            }
            debug!("generated id {id:?} is already taken, drawing another");
        }
    }

    fn read_snapshot(&self) -> Result<Option<AppState>, LoadError> {
        let Some(raw) = self.storage.get(STORAGE_KEY)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn reset(&mut self) {
        self.state = AppState::default();
        TabManager::new(self).create_tab(DEFAULT_TAB_NAME, true);
    }

    /// Best-effort fixes for a snapshot that parsed but breaks invariants.
    fn repair(&mut self) -> bool {
        let mut repaired = false;

        for (index, tab) in self.state.tabs.iter_mut().enumerate() {
            if tab.name.trim().is_empty() {
                tab.name = numbered_tab_name(index + 1);
                warn!("tab {} had no name, renamed to {}", tab.id, tab.name);
                repaired = true;
            }
            for bar in tab.life_bars.iter_mut() {
                if bar.repair() {
                    warn!("life bar {} in tab {} was out of range, clamped", bar.id, tab.id);
                    repaired = true;
                }
            }
        }

        let active_exists = self
            .state
            .active_tab_id
            .as_deref()
            .is_some_and(|id| self.state.tab(id).is_some());
        if !active_exists {
            let first = self.state.tabs.first().map(|tab| tab.id.clone());
            warn!(
                "active tab {:?} does not exist, selecting {:?}",
                self.state.active_tab_id, first
            );
            self.state.active_tab_id = first;
            repaired = true;
        }

        repaired
    }
}
