use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::keyboard::layout::KeyboardLayout;
use crate::platform::Platform;

pub const THEME_KEY: &str = "keyviz_theme";
pub const LAYOUT_KEY: &str = "keyviz_keyboard_layout";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// String key-value storage for the two user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub keyboard_layout: KeyboardLayout,
}

impl Preferences {
    pub fn defaults_for(platform: Platform) -> Self {
        Self {
            theme: Theme::default(),
            keyboard_layout: platform.default_layout(),
        }
    }

    /// Read both preferences, falling back to the platform defaults for
    /// anything missing, unparseable, or unreadable. Never fails.
    pub fn load(store: &dyn PreferenceStore, platform: Platform) -> Self {
        let defaults = Self::defaults_for(platform);
        match Self::try_load(store, defaults) {
            Ok(prefs) => prefs,
            Err(e) => {
                log::warn!("could not load preferences: {e}");
                defaults
            }
        }
    }

    fn try_load(store: &dyn PreferenceStore, defaults: Self) -> Result<Self, StoreError> {
        let theme = store
            .get(THEME_KEY)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.theme);
        let keyboard_layout = store
            .get(LAYOUT_KEY)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.keyboard_layout);
        Ok(Self {
            theme,
            keyboard_layout,
        })
    }
}

pub fn save_theme(store: &mut dyn PreferenceStore, theme: Theme) {
    if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
        log::warn!("could not save theme preference: {e}");
    }
}

pub fn save_layout(store: &mut dyn PreferenceStore, layout: KeyboardLayout) {
    if let Err(e) = store.set(LAYOUT_KEY, layout.as_str()) {
        log::warn!("could not save keyboard layout preference: {e}");
    }
}

/// Preferences kept in a small TOML table on disk.
pub struct TomlPreferenceStore {
    path: PathBuf,
}

impl TomlPreferenceStore {
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyviz")
            .join("preferences.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Default for TomlPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_table()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&table)?;
        let tmp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("access denied".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("access denied".to_string()))
        }
    }

    fn make_test_store() -> (TempDir, TomlPreferenceStore) {
        let dir = TempDir::new().unwrap();
        let store = TomlPreferenceStore::with_path(dir.path().join("keyviz").join("preferences.toml"));
        (dir, store)
    }

    #[test]
    fn test_defaults_follow_platform() {
        let store = MemoryPreferenceStore::new();
        let mac = Preferences::load(&store, Platform::Mac);
        assert_eq!(mac.theme, Theme::Light);
        assert_eq!(mac.keyboard_layout, KeyboardLayout::Mac);

        let win = Preferences::load(&store, Platform::Windows);
        assert_eq!(win.keyboard_layout, KeyboardLayout::Windows);
    }

    #[test]
    fn test_stored_layout_overrides_platform() {
        let mut store = MemoryPreferenceStore::new();
        save_layout(&mut store, KeyboardLayout::Windows);
        let prefs = Preferences::load(&store, Platform::Mac);
        assert_eq!(prefs.keyboard_layout, KeyboardLayout::Windows);
    }

    #[test]
    fn test_round_trip_through_file() {
        let (_dir, mut store) = make_test_store();
        save_theme(&mut store, Theme::Dark);
        save_layout(&mut store, KeyboardLayout::Mac);

        let reopened = TomlPreferenceStore::with_path(store.path().to_path_buf());
        let prefs = Preferences::load(&reopened, Platform::Windows);
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.keyboard_layout, KeyboardLayout::Mac);
    }

    #[test]
    fn test_second_write_keeps_other_key() {
        let (_dir, mut store) = make_test_store();
        save_theme(&mut store, Theme::Dark);
        save_layout(&mut store, KeyboardLayout::Mac);
        save_theme(&mut store, Theme::Light);
        assert_eq!(store.get(LAYOUT_KEY).unwrap().as_deref(), Some("mac"));
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_unavailable_storage_falls_back() {
        let prefs = Preferences::load(&BrokenStore, Platform::Mac);
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.keyboard_layout, KeyboardLayout::Mac);

        // Saving into broken storage is logged, not raised
        let mut store = BrokenStore;
        save_theme(&mut store, Theme::Dark);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let mut store = MemoryPreferenceStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        store.set(LAYOUT_KEY, "dvorak").unwrap();
        let prefs = Preferences::load(&store, Platform::Linux);
        assert_eq!(prefs, Preferences::defaults_for(Platform::Linux));
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let (_dir, store) = make_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "this is = = not toml").unwrap();
        let prefs = Preferences::load(&store, Platform::Windows);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::from_dark(true), Theme::Dark);
    }
}
