use crate::models::{numbered_tab_name, Tab};
use crate::store::Store;
use tracing::{debug, info};

/// Tab lifecycle operations over a [`Store`].
pub struct TabManager<'a> {
    store: &'a mut Store,
}

/// What [`TabManager::delete_tab`] did with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabDeletion {
    Deleted,
    /// The tab is selected and still holds life bars; nothing was removed.
    ConfirmationRequired(DeleteRequest),
    /// Last remaining tab, or no such tab.
    Ignored,
}

/// A deletion waiting on the user. Dropping it cancels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub tab_id: String,
    pub tab_name: String,
}

impl DeleteRequest {
    pub fn confirm(self, tabs: &mut TabManager<'_>) -> bool {
        tabs.execute_delete_tab(&self.tab_id)
    }
}

impl<'a> TabManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Name the quick "new tab" action uses: `Tab <count + 1>`.
    pub fn next_default_name(&self) -> String {
        numbered_tab_name(self.store.tabs().len() + 1)
    }

    /// Appends an empty tab and returns its id. A blank name falls back to
    /// [`Self::next_default_name`].
    pub fn create_tab(&mut self, name: &str, activate: bool) -> String {
        let name = match name.trim() {
            "" => self.next_default_name(),
            trimmed => trimmed.to_string(),
        };
        let id = self.store.generate_id();

        let state = self.store.state_mut();
        state.tabs.push(Tab::new(id.clone(), name));
        if activate {
            state.active_tab_id = Some(id.clone());
        }

        self.store.save();
        info!("created tab {id}");
        id
    }

    pub fn switch_tab(&mut self, tab_id: &str) -> bool {
        if self.store.tab(tab_id).is_none() {
            debug!("switch to unknown tab {tab_id} ignored");
            return false;
        }
        self.store.state_mut().active_tab_id = Some(tab_id.to_string());
        self.store.save();
        true
    }

    pub fn rename_tab(&mut self, tab_id: &str, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return false;
        }
        let Some(tab) = self.store.state_mut().tab_mut(tab_id) else {
            return false;
        };
        tab.name = new_name.to_string();
        self.store.save();
        true
    }

    /// Deletes straight away unless the tab is the selected one and still
    /// has life bars, in which case the caller has to confirm first.
    pub fn delete_tab(&mut self, tab_id: &str) -> TabDeletion {
        if self.store.tabs().len() <= 1 {
            return TabDeletion::Ignored;
        }
        let Some(tab) = self.store.tab(tab_id) else {
            return TabDeletion::Ignored;
        };

        let is_active = self.store.active_tab_id() == Some(tab_id);
        if !is_active || tab.life_bars.is_empty() {
            self.execute_delete_tab(tab_id);
            return TabDeletion::Deleted;
        }

        debug!("tab {tab_id} needs confirmation before deletion");
        TabDeletion::ConfirmationRequired(DeleteRequest {
            tab_id: tab.id.clone(),
            tab_name: tab.name.clone(),
        })
    }

    /// Removes the tab unconditionally, bar the last-tab rule. When the
    /// selected tab goes, the tab now sitting in its slot takes over, or the
    /// new last tab if it was the last one.
    pub fn execute_delete_tab(&mut self, tab_id: &str) -> bool {
        let state = self.store.state_mut();
        if state.tabs.len() <= 1 {
            return false;
        }
        let Some(index) = state.tab_index(tab_id) else {
            return false;
        };

        state.tabs.remove(index);
        if state.active_tab_id.as_deref() == Some(tab_id) {
            let next = index.min(state.tabs.len() - 1);
            state.active_tab_id = Some(state.tabs[next].id.clone());
        }

        self.store.save();
        info!("deleted tab {tab_id}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bars::LifeBarManager;
    use crate::ids::SequentialIds;
    use crate::models::DEFAULT_TAB_NAME;
    use crate::storage::{KeyValueStore, MemoryStorage, STORAGE_KEY};

    /// Store holding tabs named `names`, with ids `id-1`, `id-2`, ...
    fn store_with_tabs(names: &[&str]) -> (Store, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut store = Store::load(storage.clone(), SequentialIds::new("id"));
        let mut tabs = TabManager::new(&mut store);
        tabs.rename_tab("id-1", names[0]);
        for name in &names[1..] {
            tabs.create_tab(name, false);
        }
        (store, storage)
    }

    fn names(store: &Store) -> Vec<&str> {
        store.tabs().iter().map(|tab| tab.name.as_str()).collect()
    }

    #[test]
    fn create_appends_and_optionally_activates() {
        let (mut store, _) = store_with_tabs(&["A"]);
        let mut tabs = TabManager::new(&mut store);

        let quiet = tabs.create_tab("  B  ", false);
        let loud = tabs.create_tab("C", true);
        assert_eq!(quiet, "id-2");
        assert_eq!(names(&store), ["A", "B", "C"]);
        assert_eq!(store.active_tab_id(), Some(loud.as_str()));
    }

    #[test]
    fn blank_names_get_numbered_defaults() {
        let (mut store, _) = store_with_tabs(&[DEFAULT_TAB_NAME]);
        let mut tabs = TabManager::new(&mut store);
        assert_eq!(tabs.next_default_name(), "Tab 2");
        tabs.create_tab("   ", true);
        assert_eq!(names(&store), ["Tab 1", "Tab 2"]);
    }

    #[test]
    fn switch_ignores_unknown_tabs() {
        let (mut store, _) = store_with_tabs(&["A", "B"]);
        let mut tabs = TabManager::new(&mut store);
        assert!(tabs.switch_tab("id-2"));
        assert!(!tabs.switch_tab("missing"));
        assert_eq!(store.active_tab_id(), Some("id-2"));
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let (mut store, storage) = store_with_tabs(&["A"]);
        let mut tabs = TabManager::new(&mut store);
        assert!(tabs.rename_tab("id-1", "  Boss fight "));
        assert!(!tabs.rename_tab("id-1", "   "));
        assert!(!tabs.rename_tab("missing", "X"));
        assert_eq!(names(&store), ["Boss fight"]);

        let raw = storage.get(STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("Boss fight"));
    }

    #[test]
    fn deleting_active_tab_selects_the_one_in_its_slot() {
        let (mut store, _) = store_with_tabs(&["A", "B", "C"]);
        let mut tabs = TabManager::new(&mut store);
        tabs.switch_tab("id-2");

        assert_eq!(tabs.delete_tab("id-2"), TabDeletion::Deleted);
        assert_eq!(names(&store), ["A", "C"]);
        assert_eq!(store.active_tab_id(), Some("id-3"));
    }

    #[test]
    fn deleting_last_active_tab_falls_back_to_new_last() {
        let (mut store, _) = store_with_tabs(&["A", "B", "C"]);
        let mut tabs = TabManager::new(&mut store);
        tabs.switch_tab("id-3");

        assert!(tabs.execute_delete_tab("id-3"));
        assert_eq!(store.active_tab_id(), Some("id-2"));
    }

    #[test]
    fn deleting_inactive_tab_keeps_selection() {
        let (mut store, _) = store_with_tabs(&["A", "B", "C"]);
        LifeBarManager::new(&mut store).create_life_bar("Guard", 10);

        let mut tabs = TabManager::new(&mut store);
        tabs.switch_tab("id-3");
        assert_eq!(tabs.delete_tab("id-1"), TabDeletion::Deleted);
        assert_eq!(names(&store), ["B", "C"]);
        assert_eq!(store.active_tab_id(), Some("id-3"));
    }

    #[test]
    fn active_tab_with_bars_needs_confirmation() {
        let (mut store, _) = store_with_tabs(&["A", "B"]);
        LifeBarManager::new(&mut store).create_life_bar("Troll", 30);

        let mut tabs = TabManager::new(&mut store);
        let request = match tabs.delete_tab("id-1") {
            TabDeletion::ConfirmationRequired(request) => request,
            other => panic!("expected confirmation, got {other:?}"),
        };
        assert_eq!(request.tab_name, "A");
        assert_eq!(tabs.store.tabs().len(), 2);

        assert!(request.confirm(&mut tabs));
        assert_eq!(names(&store), ["B"]);
        assert_eq!(store.active_tab_id(), Some("id-2"));
    }

    #[test]
    fn cancelled_confirmation_changes_nothing() {
        let (mut store, storage) = store_with_tabs(&["A", "B"]);
        LifeBarManager::new(&mut store).create_life_bar("Troll", 30);
        let saved = storage.get(STORAGE_KEY).unwrap();

        let outcome = TabManager::new(&mut store).delete_tab("id-1");
        assert!(matches!(outcome, TabDeletion::ConfirmationRequired(_)));
        drop(outcome);

        assert_eq!(names(&store), ["A", "B"]);
        assert_eq!(storage.get(STORAGE_KEY).unwrap(), saved);
    }

    #[test]
    fn last_tab_is_never_deleted() {
        let (mut store, _) = store_with_tabs(&["Only"]);
        LifeBarManager::new(&mut store).create_life_bar("Hero", 12);

        let mut tabs = TabManager::new(&mut store);
        assert_eq!(tabs.delete_tab("id-1"), TabDeletion::Ignored);
        assert!(!tabs.execute_delete_tab("id-1"));
        assert_eq!(names(&store), ["Only"]);
        assert_eq!(store.active_tab_id(), Some("id-1"));
    }

    #[test]
    fn unknown_tab_delete_is_ignored() {
        let (mut store, _) = store_with_tabs(&["A", "B"]);
        let mut tabs = TabManager::new(&mut store);
        assert_eq!(tabs.delete_tab("nope"), TabDeletion::Ignored);
        assert!(!tabs.execute_delete_tab("nope"));
        assert_eq!(names(&store), ["A", "B"]);
    }
}
