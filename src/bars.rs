use crate::models::{LifeBar, Tab};
use crate::parse::LifeEdit;
use crate::store::Store;
use tracing::{debug, info};

/// Life-bar operations, always scoped to the selected tab. Every call is a
/// no-op when no tab is selected or the bar is not in it.
pub struct LifeBarManager<'a> {
    store: &'a mut Store,
}

impl<'a> LifeBarManager<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    pub fn bar(&self, bar_id: &str) -> Option<&LifeBar> {
        self.store.active_tab()?.bar(bar_id)
    }

    /// Appends a full-health bar and returns its id. `max_life` is floored
    /// to 1; a blank name is refused.
    pub fn create_life_bar(&mut self, name: &str, max_life: i64) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.store.active_tab()?;

        let id = self.store.generate_id();
        let bar = LifeBar::new(id.clone(), name.to_string(), max_life);
        self.store.active_tab_mut()?.life_bars.push(bar);

        self.store.save();
        info!("created life bar {id}");
        Some(id)
    }

    pub fn set_profile_image(&mut self, bar_id: &str, image_data: &str) -> bool {
        self.with_bar(bar_id, |bar| {
            bar.profile_image_base64 = Some(image_data.to_string());
        })
    }

    pub fn clear_profile_image(&mut self, bar_id: &str) -> bool {
        self.with_bar(bar_id, |bar| bar.profile_image_base64 = None)
    }

    /// Heals or damages; damage goes through temporary life first.
    pub fn update_life(&mut self, bar_id: &str, delta: i64) -> bool {
        self.with_bar(bar_id, |bar| bar.apply_life_change(delta))
    }

    /// Grants temporary life, keeping whichever of the old and new amount is
    /// larger. Non-positive amounts do nothing.
    pub fn apply_temp_life(&mut self, bar_id: &str, amount: i64) -> bool {
        if amount <= 0 {
            return false;
        }
        self.with_bar(bar_id, |bar| {
            bar.grant_temp_life(amount);
        })
    }

    /// Carries out an edit submitted through the life input.
    pub fn apply_edit(&mut self, bar_id: &str, edit: LifeEdit) -> bool {
        match edit {
            LifeEdit::Unchanged => false,
            LifeEdit::Change(delta) => self.update_life(bar_id, delta),
            LifeEdit::GrantTemp(amount) => self.apply_temp_life(bar_id, amount),
        }
    }

    pub fn update_max_life(&mut self, bar_id: &str, delta: i64) -> bool {
        self.with_bar(bar_id, |bar| bar.adjust_max_life(delta))
    }

    pub fn rename_life_bar(&mut self, bar_id: &str, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return false;
        }
        self.with_bar(bar_id, |bar| bar.name = new_name.to_string())
    }

    pub fn delete_life_bar(&mut self, bar_id: &str) -> bool {
        let removed = self.with_tab(|tab| {
            let before = tab.life_bars.len();
            tab.life_bars.retain(|bar| bar.id != bar_id);
            tab.life_bars.len() != before
        });
        if removed {
            info!("deleted life bar {bar_id}");
        }
        removed
    }

    /// Moves the dragged bar into the slot the target bar occupies, shifting
    /// the bars from there on by one.
    pub fn reorder(&mut self, dragged_id: &str, target_id: &str) -> bool {
        if dragged_id == target_id {
            return false;
        }
        self.with_tab(|tab| {
            let (Some(from), Some(to)) = (tab.bar_index(dragged_id), tab.bar_index(target_id))
            else {
                return false;
            };
            let dragged = tab.life_bars.remove(from);
            tab.life_bars.insert(to, dragged);
            true
        })
    }

    /// Runs `apply` on the active tab; saves only when it reports a change.
    fn with_tab(&mut self, apply: impl FnOnce(&mut Tab) -> bool) -> bool {
        let Some(tab) = self.store.active_tab_mut() else {
            debug!("no active tab, life bar change ignored");
            return false;
        };
        if !apply(tab) {
            return false;
        }
        self.store.save();
        true
    }

    fn with_bar(&mut self, bar_id: &str, apply: impl FnOnce(&mut LifeBar)) -> bool {
        self.with_tab(|tab| match tab.bar_mut(bar_id) {
            Some(bar) => {
                apply(bar);
                true
            }
            None => {
                debug!("life bar {bar_id} not in active tab");
                false
            }
        })
    }
}
