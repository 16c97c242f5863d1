use serde::{Deserialize, Serialize};

pub const DEFAULT_TAB_NAME: &str = "Tab 1";
pub const DEFAULT_BAR_NAME: &str = "Unnamed";

/// Name given to the `position`-th tab (1-based) when none is supplied.
pub fn numbered_tab_name(position: usize) -> String {
    format!("Tab {position}")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub active_tab_id: Option<String>,
    /// Stored as a JSON object keyed by tab id; creation order is kept.
    #[serde(default, with = "tab_map")]
    pub tabs: Vec<Tab>,
}

impl AppState {
    pub fn tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == tab_id)
    }

    pub fn tab_mut(&mut self, tab_id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == tab_id)
    }

    pub fn tab_index(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == tab_id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.tabs
            .iter()
            .any(|tab| tab.id == id || tab.life_bars.iter().any(|bar| bar.id == id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub life_bars: Vec<LifeBar>,
}

impl Tab {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            life_bars: Vec::new(),
        }
    }

    pub fn bar(&self, bar_id: &str) -> Option<&LifeBar> {
        self.life_bars.iter().find(|bar| bar.id == bar_id)
    }

    pub fn bar_mut(&mut self, bar_id: &str) -> Option<&mut LifeBar> {
        self.life_bars.iter_mut().find(|bar| bar.id == bar_id)
    }

    pub fn bar_index(&self, bar_id: &str) -> Option<usize> {
        self.life_bars.iter().position(|bar| bar.id == bar_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LifeBar {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub max_life: i64,
    #[serde(default)]
    pub current_life: i64,
    #[serde(default)]
    pub temp_life: i64,
    #[serde(default)]
    pub profile_image_base64: Option<String>,
}

/// Colour band of a bar, by share of `max_life` still standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    /// At or below a quarter.
    Critical,
    /// At or below half.
    Wounded,
    Healthy,
}

impl Health {
    pub fn css_class(self) -> &'static str {
        match self {
            Health::Critical => "critical",
            Health::Wounded => "wounded",
            Health::Healthy => "healthy",
        }
    }
}

impl LifeBar {
    pub fn new(id: String, name: String, max_life: i64) -> Self {
        let max_life = max_life.max(1);
        Self {
            id,
            name,
            max_life,
            current_life: max_life,
            temp_life: 0,
            profile_image_base64: None,
        }
    }

    /// Applies healing (`delta >= 0`) or damage (`delta < 0`).
    ///
    /// Damage drains temporary life first; only the overflow reaches
    /// `current_life`. The result is always clamped to `[0, max_life]`.
    pub fn apply_life_change(&mut self, delta: i64) {
        let mut remaining = delta;

        if delta < 0 && self.temp_life > 0 {
            let left = self.temp_life.saturating_add(delta);
            if left < 0 {
                remaining = left;
                self.temp_life = 0;
            } else {
                remaining = 0;
                self.temp_life = left;
            }
        }

        self.current_life = self
            .current_life
            .saturating_add(remaining)
            .clamp(0, self.max_life);
    }

    /// Grants temporary life. The larger of the old and new amounts wins;
    /// grants never stack. Returns `false` for non-positive amounts.
    pub fn grant_temp_life(&mut self, amount: i64) -> bool {
        if amount <= 0 {
            return false;
        }
        self.temp_life = self.temp_life.max(amount);
        true
    }

    /// Moves `max_life` by `delta`, never below 1. `current_life` is only
    /// ever pulled down to fit, never raised.
    pub fn adjust_max_life(&mut self, delta: i64) {
        self.max_life = self.max_life.saturating_add(delta).max(1);
        self.current_life = self.current_life.min(self.max_life);
    }

    pub fn total_life(&self) -> i64 {
        self.current_life.saturating_add(self.temp_life)
    }

    pub fn health(&self) -> Health {
        let current = i128::from(self.current_life);
        let max = i128::from(self.max_life);
        if current * 4 <= max {
            Health::Critical
        } else if current * 2 <= max {
            Health::Wounded
        } else {
            Health::Healthy
        }
    }

    pub fn fill_percent(&self) -> f64 {
        (self.current_life as f64 / self.max_life as f64 * 100.0).min(100.0)
    }

    /// Width of the temporary-life overlay; it only covers the room left
    /// between `current_life` and `max_life`.
    pub fn temp_fill_percent(&self) -> f64 {
        let room = (self.max_life - self.current_life).max(0);
        let shown = self.temp_life.min(room);
        shown as f64 / self.max_life as f64 * 100.0
    }

    /// Pulls values loaded from storage back inside the bar invariants.
    /// Returns `true` if anything had to change.
    pub(crate) fn repair(&mut self) -> bool {
        let before = (self.max_life, self.current_life, self.temp_life);
        self.max_life = self.max_life.max(1);
        self.temp_life = self.temp_life.max(0);
        self.current_life = self.current_life.clamp(0, self.max_life);

        let mut changed = before != (self.max_life, self.current_life, self.temp_life);
        if self.name.trim().is_empty() {
            self.name = DEFAULT_BAR_NAME.to_string();
            changed = true;
        }
        changed
    }
}

mod tab_map {
    use super::Tab;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(tabs: &[Tab], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(tabs.len()))?;
        for tab in tabs {
            map.serialize_entry(&tab.id, tab)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Tab>, D::Error> {
        deserializer.deserialize_map(TabMapVisitor)
    }

    struct TabMapVisitor;

    impl<'de> Visitor<'de> for TabMapVisitor {
        type Value = Vec<Tab>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of tab id to tab")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut tabs: Vec<Tab> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, mut tab)) = access.next_entry::<String, Tab>()? {
                // The key is what lookups use, so it wins over the inner id.
                tab.id = id;
                match tabs.iter_mut().find(|existing| existing.id == tab.id) {
                    Some(existing) => *existing = tab,
                    None => tabs.push(tab),
                }
            }
            Ok(tabs)
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateTabRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub activate: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBarRequest {
    pub name: String,
    #[serde(default)]
    pub max_life: String,
}

#[derive(Debug, Deserialize)]
pub struct LifeEditRequest {
    pub input: String,
    #[serde(default)]
    pub temporary: bool,
}

#[derive(Debug, Deserialize)]
pub struct MaxLifeEditRequest {
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub dragged_id: String,
    pub target_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub active_tab_id: Option<String>,
    pub tabs: Vec<TabSummary>,
    pub life_bars: Vec<LifeBarView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TabSummary {
    pub id: String,
    pub name: String,
    pub bar_count: usize,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LifeBarView {
    pub id: String,
    pub name: String,
    pub max_life: i64,
    pub current_life: i64,
    pub temp_life: i64,
    pub total_life: i64,
    pub has_image: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTabResponse {
    pub outcome: String,
    pub tab_id: String,
    pub tab_name: Option<String>,
    pub state: StateResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(max: i64, current: i64, temp: i64) -> LifeBar {
        LifeBar {
            id: "bar".to_string(),
            name: "Goblin".to_string(),
            max_life: max,
            current_life: current,
            temp_life: temp,
            profile_image_base64: None,
        }
    }

    #[test]
    fn damage_absorbed_entirely_by_temp_life() {
        let mut bar = bar(30, 20, 10);
        bar.apply_life_change(-4);
        assert_eq!(bar.temp_life, 6);
        assert_eq!(bar.current_life, 20);
    }

    #[test]
    fn damage_overflow_reaches_current_life() {
        let mut bar = bar(30, 20, 10);
        bar.apply_life_change(-15);
        assert_eq!(bar.temp_life, 0);
        assert_eq!(bar.current_life, 15);
    }

    #[test]
    fn healing_ignores_temp_life_and_clamps_to_max() {
        let mut bar = bar(30, 25, 4);
        bar.apply_life_change(50);
        assert_eq!(bar.current_life, 30);
        assert_eq!(bar.temp_life, 4);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut bar = bar(10, 3, 0);
        bar.apply_life_change(-40);
        assert_eq!(bar.current_life, 0);
        bar.apply_life_change(i64::MIN);
        assert_eq!(bar.current_life, 0);
    }

    #[test]
    fn temp_life_keeps_the_larger_grant() {
        let mut bar = bar(10, 10, 5);
        assert!(bar.grant_temp_life(3));
        assert_eq!(bar.temp_life, 5);
        assert!(bar.grant_temp_life(8));
        assert_eq!(bar.temp_life, 8);
        assert!(!bar.grant_temp_life(0));
        assert!(!bar.grant_temp_life(-3));
        assert_eq!(bar.temp_life, 8);
    }

    #[test]
    fn shrinking_max_life_pulls_current_down() {
        let mut bar = bar(10, 10, 0);
        bar.adjust_max_life(-7);
        assert_eq!((bar.max_life, bar.current_life), (3, 3));

        let mut bar = self::bar(10, 10, 0);
        bar.adjust_max_life(-100);
        assert_eq!((bar.max_life, bar.current_life), (1, 1));
    }

    #[test]
    fn growing_max_life_leaves_current_alone() {
        let mut bar = bar(10, 6, 0);
        bar.adjust_max_life(5);
        assert_eq!((bar.max_life, bar.current_life), (15, 6));
    }

    #[test]
    fn invariants_hold_over_mixed_sequences() {
        let mut bar = bar(12, 12, 0);
        let steps: [(u8, i64); 12] = [
            (0, -5),
            (1, 9),
            (0, -30),
            (2, -20),
            (0, 7),
            (1, 2),
            (2, 40),
            (0, 100),
            (0, -3),
            (2, -39),
            (1, -4),
            (0, i64::MAX),
        ];
        for (op, value) in steps {
            match op {
                0 => bar.apply_life_change(value),
                1 => {
                    bar.grant_temp_life(value);
                }
                _ => bar.adjust_max_life(value),
            }
            assert!(bar.max_life >= 1);
            assert!(bar.temp_life >= 0);
            assert!((0..=bar.max_life).contains(&bar.current_life));
        }
    }

    #[test]
    fn health_bands_follow_quarter_and_half() {
        assert_eq!(bar(100, 25, 0).health(), Health::Critical);
        assert_eq!(bar(100, 26, 0).health(), Health::Wounded);
        assert_eq!(bar(100, 50, 0).health(), Health::Wounded);
        assert_eq!(bar(100, 51, 0).health(), Health::Healthy);
    }

    #[test]
    fn temp_overlay_only_fills_missing_life() {
        let bar = bar(10, 8, 5);
        assert_eq!(bar.total_life(), 13);
        assert!((bar.fill_percent() - 80.0).abs() < 1e-9);
        assert!((bar.temp_fill_percent() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn repair_restores_invariants() {
        let mut bar = bar(0, 9, -2);
        bar.name = "  ".to_string();
        assert!(bar.repair());
        assert_eq!((bar.max_life, bar.current_life, bar.temp_life), (1, 1, 0));
        assert_eq!(bar.name, DEFAULT_BAR_NAME);
        assert!(!bar.repair());
    }

    #[test]
    fn tabs_serialize_as_ordered_map() {
        let state = AppState {
            active_tab_id: Some("z".to_string()),
            tabs: vec![
                Tab::new("z".to_string(), "Zed".to_string()),
                Tab::new("a".to_string(), "Aye".to_string()),
            ],
        };

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.starts_with(r#"{"activeTabId":"z","tabs":{"z":{"id":"z""#));

        let restored: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn map_key_wins_over_inner_id() {
        let json = r#"{"activeTabId":"k","tabs":{"k":{"id":"other","name":"Keyed","lifeBars":[]}}}"#;
        let state: AppState = serde_json::from_str(json).unwrap();
        assert_eq!(state.tabs[0].id, "k");
    }

    #[test]
    fn life_bar_uses_camel_case_fields() {
        let bar = LifeBar::new("b1".to_string(), "Orc".to_string(), 15);
        let value = serde_json::to_value(&bar).unwrap();
        assert_eq!(value["maxLife"], 15);
        assert_eq!(value["currentLife"], 15);
        assert_eq!(value["tempLife"], 0);
        assert!(value["profileImageBase64"].is_null());
    }
}
