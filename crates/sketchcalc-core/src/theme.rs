//! Theme selection, palettes and persistence.

use crate::raster::Rgba;
use crate::storage::{Storage, StorageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage key holding the selected theme.
pub const THEME_KEY: &str = "theme";

/// User-selected theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system preference.
    #[default]
    System,
}

/// A theme with `System` resolved to a concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Resolve against the current system preference.
    pub fn resolve(self, system_prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if system_prefers_dark => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored theme name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown theme: {0}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Colors of the application chrome and drawing surface for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePalette {
    /// Page background behind the canvas.
    pub background: Rgba,
    /// Drawing surface fill.
    pub canvas: Rgba,
    /// Text and default ink.
    pub text: Rgba,
    /// Muted accents (toolbar separators, disabled controls).
    pub muted: Rgba,
}

impl ThemePalette {
    pub const DARK: ThemePalette = ThemePalette {
        background: Rgba::opaque(0x1A, 0x1B, 0x1E),
        canvas: Rgba::opaque(0x00, 0x00, 0x00),
        text: Rgba::opaque(0xFF, 0xFF, 0xFF),
        muted: Rgba::opaque(0x2C, 0x2E, 0x33),
    };

    pub const LIGHT: ThemePalette = ThemePalette {
        background: Rgba::opaque(0xF8, 0xF9, 0xFA),
        canvas: Rgba::opaque(0xFF, 0xFF, 0xFF),
        text: Rgba::opaque(0x00, 0x00, 0x00),
        muted: Rgba::opaque(0xE9, 0xEC, 0xEF),
    };

    pub fn for_theme(theme: ResolvedTheme) -> Self {
        match theme {
            ResolvedTheme::Light => Self::LIGHT,
            ResolvedTheme::Dark => Self::DARK,
        }
    }
}

/// The two colors the canvas needs from the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasColors {
    /// Fill used when clearing or repainting the surface.
    pub background: Rgba,
    /// Default ink.
    pub foreground: Rgba,
}

impl CanvasColors {
    pub fn from_palette(palette: &ThemePalette) -> Self {
        Self {
            background: palette.canvas,
            foreground: palette.text,
        }
    }

    pub fn for_theme(theme: ResolvedTheme) -> Self {
        Self::from_palette(&ThemePalette::for_theme(theme))
    }
}

impl Default for CanvasColors {
    fn default() -> Self {
        Self::for_theme(ResolvedTheme::Dark)
    }
}

/// Loads and persists the selected theme through a [`Storage`] backend.
#[derive(Debug)]
pub struct ThemeStore<S: Storage> {
    storage: S,
    theme: Theme,
}

impl<S: Storage> ThemeStore<S> {
    /// Load the persisted theme, falling back to [`Theme::System`].
    ///
    /// A missing, unreadable or unrecognized value is not an error; it is
    /// logged and the default is used.
    pub fn load(storage: S) -> Self {
        let theme = match storage.get(THEME_KEY) {
            Ok(Some(value)) => value.parse::<Theme>().unwrap_or_else(|e| {
                log::warn!("{}, using system theme", e);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("Failed to read theme preference: {}", e);
                Theme::default()
            }
        };
        log::debug!("Loaded theme preference: {}", theme);
        Self { storage, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Change the theme and persist it.
    ///
    /// The in-memory selection changes even if persisting fails.
    pub fn set(&mut self, theme: Theme) -> StorageResult<()> {
        self.theme = theme;
        self.storage.set(THEME_KEY, theme.as_str())
    }

    /// Canvas colors for the current selection.
    pub fn canvas_colors(&self, system_prefers_dark: bool) -> CanvasColors {
        CanvasColors::for_theme(self.theme.resolve(system_prefers_dark))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_theme_parse_and_display() {
        for theme in [Theme::Light, Theme::Dark, Theme::System] {
            assert_eq!(theme.to_string().parse::<Theme>(), Ok(theme));
        }
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_theme_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let theme: Theme = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(theme, Theme::System);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Theme::Light.resolve(true), ResolvedTheme::Light);
        assert_eq!(Theme::Dark.resolve(false), ResolvedTheme::Dark);
        assert_eq!(Theme::System.resolve(true), ResolvedTheme::Dark);
        assert_eq!(Theme::System.resolve(false), ResolvedTheme::Light);
    }

    #[test]
    fn test_canvas_colors_follow_palette() {
        let dark = CanvasColors::for_theme(ResolvedTheme::Dark);
        assert_eq!(dark.background, Rgba::BLACK);
        assert_eq!(dark.foreground, Rgba::WHITE);

        let light = CanvasColors::for_theme(ResolvedTheme::Light);
        assert_eq!(light.background, Rgba::WHITE);
        assert_eq!(light.foreground, Rgba::BLACK);
    }

    #[test]
    fn test_store_defaults_to_system() {
        let store = ThemeStore::load(MemoryStorage::new());
        assert_eq!(store.theme(), Theme::System);
    }

    #[test]
    fn test_store_roundtrip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = ThemeStore::load(storage.clone());
        store.set(Theme::Light).unwrap();
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        let reloaded = ThemeStore::load(storage);
        assert_eq!(reloaded.theme(), Theme::Light);
        assert_eq!(reloaded.canvas_colors(true).background, Rgba::WHITE);
    }

    #[test]
    fn test_store_ignores_invalid_value() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "neon").unwrap();
        let store = ThemeStore::load(storage);
        assert_eq!(store.theme(), Theme::System);
    }
}
