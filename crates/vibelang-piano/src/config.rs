//! Configuration file support for vibe-piano
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/vibe-piano/config.toml`
//! - macOS: `~/Library/Application Support/vibe-piano/config.toml`
//! - Windows: `%APPDATA%\vibe-piano\config.toml`

use crate::error::{Error, Result};
use crate::layout::LayoutConfig;
use crate::piano::PianoConfig;
use crate::shortcuts::{ShortcutKey, BOTTOM_ROW, HOME_ROW, QWERTY_ROW};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Range and input settings
    pub piano: PianoSettings,
    /// Key geometry
    pub layout: LayoutConfig,
    /// UI/Theme configuration
    pub theme: Theme,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "vibe-piano") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG_FILE)?;
        Ok(path)
    }

    /// Build the piano settings this file describes
    pub fn to_piano_config(&self) -> Result<PianoConfig> {
        Ok(PianoConfig {
            start_note: self.piano.start_note.clone(),
            end_note: self.piano.end_note.clone(),
            layout: self.layout.clone(),
            keyboard_shortcuts: self.piano.shortcut_keys()?,
            disabled: self.piano.disabled,
        })
    }
}

const DEFAULT_CONFIG_FILE: &str = r#"# vibe-piano configuration file
# https://github.com/trusch/vibelang

[piano]
# Visible range (inclusive), e.g. "c3", "db4", "f#5"
start_note = "c3"
end_note = "f5"

# Computer keyboard shortcuts: "home", "bottom", "qwerty", "none" or "custom"
shortcuts = "home"

# Custom shortcut slots (only used when shortcuts = "custom").
# One slot per white key, "flat" plays the black key below it.
# custom_shortcuts = [
#   { natural = "a", flat = "q" },
#   { natural = "s", flat = "w" },
# ]

# Ignore all input
disabled = false

[layout]
# Gap between white keys, as a fraction of a white key
white_key_gutter_ratio = 0.02

# White key width / keyboard height
key_width_to_height_ratio = 0.15

[layout.white_key_shape]
width_ratio = 1.0
height_ratio = 1.0
height_down_ratio = 0.98

[layout.black_key_shape]
width_ratio = 0.66
height_ratio = 0.66
height_down_ratio = 0.65

# Offset of each pitch class from C, in white key widths
[layout.note_shapes]
c = 0.0
db = 0.55
d = 1.0
eb = 1.8
e = 2.0
f = 3.0
gb = 3.5
g = 4.0
ab = 4.7
a = 5.0
bb = 5.85
b = 6.0

[theme]
white_key_color = "white"
black_key_color = "black"
pressed_key_color = "cyan"
border_color = "cyan"
label_color = "dark_gray"

# Show note names and shortcuts on keys
show_labels = true

# Show keyboard shortcuts help
show_help = true
"#;

/// Shortcut layout preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutPreset {
    /// Naturals on a s d f ..., flats on q w e r ...
    #[default]
    Home,
    /// Naturals on z x c v ..., flats on a s d f ...
    Bottom,
    /// Naturals on q w e r ..., flats on the number row
    Qwerty,
    /// Keyboard input disabled
    None,
    /// Use custom_shortcuts
    Custom,
}

/// Piano settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PianoSettings {
    /// First note shown
    pub start_note: String,
    /// Last note shown (inclusive)
    pub end_note: String,
    /// Ignore all input
    pub disabled: bool,
    /// Shortcut layout preset
    pub shortcuts: ShortcutPreset,
    /// Custom shortcut slots (only used when shortcuts = "custom")
    pub custom_shortcuts: Option<Vec<ShortcutKey>>,
}

impl Default for PianoSettings {
    fn default() -> Self {
        let defaults = PianoConfig::default();
        Self {
            start_note: defaults.start_note,
            end_note: defaults.end_note,
            disabled: false,
            shortcuts: ShortcutPreset::Home,
            custom_shortcuts: None,
        }
    }
}

impl PianoSettings {
    /// Resolve the preset to shortcut slots
    pub fn shortcut_keys(&self) -> Result<Option<Vec<ShortcutKey>>> {
        let keys = match self.shortcuts {
            ShortcutPreset::Home => HOME_ROW.to_vec(),
            ShortcutPreset::Bottom => BOTTOM_ROW.to_vec(),
            ShortcutPreset::Qwerty => QWERTY_ROW.to_vec(),
            ShortcutPreset::None => return Ok(None),
            ShortcutPreset::Custom => self.custom_shortcuts.clone().ok_or_else(|| {
                Error::Config("shortcuts = \"custom\" requires custom_shortcuts".to_string())
            })?,
        };
        Ok(Some(keys))
    }
}

/// Theme/UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// White key color
    pub white_key_color: String,
    /// Black key color
    pub black_key_color: String,
    /// Pressed key color
    pub pressed_key_color: String,
    /// Border color
    pub border_color: String,
    /// Key label color
    pub label_color: String,
    /// Show note names and shortcuts on keys
    pub show_labels: bool,
    /// Show help text
    pub show_help: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            white_key_color: "white".to_string(),
            black_key_color: "black".to_string(),
            pressed_key_color: "cyan".to_string(),
            border_color: "cyan".to_string(),
            label_color: "dark_gray".to_string(),
            show_labels: true,
            show_help: true,
        }
    }
}

impl Theme {
    /// Parse a color string to ratatui Color
    pub fn parse_color(s: &str) -> ratatui::style::Color {
        use ratatui::style::Color;
        match s.to_lowercase().as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "gray" | "grey" => Color::Gray,
            "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
            "light_blue" | "lightblue" => Color::LightBlue,
            "light_cyan" | "lightcyan" => Color::LightCyan,
            "white" => Color::White,
            other => match parse_hex_color(other) {
                Some(color) => color,
                None => {
                    log::warn!("Unknown color {:?}, using white", s);
                    Color::White
                }
            },
        }
    }

    pub fn white_key(&self) -> ratatui::style::Color {
        Self::parse_color(&self.white_key_color)
    }

    pub fn black_key(&self) -> ratatui::style::Color {
        Self::parse_color(&self.black_key_color)
    }

    pub fn pressed_key(&self) -> ratatui::style::Color {
        Self::parse_color(&self.pressed_key_color)
    }

    pub fn border(&self) -> ratatui::style::Color {
        Self::parse_color(&self.border_color)
    }

    pub fn label(&self) -> ratatui::style::Color {
        Self::parse_color(&self.label_color)
    }
}

/// `#rrggbb` to an RGB color
fn parse_hex_color(s: &str) -> Option<ratatui::style::Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some(ratatui::style::Color::Rgb(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piano::Piano;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.piano.start_note, "c3");
        assert_eq!(config.piano.shortcuts, ShortcutPreset::Home);
        assert!((config.layout.white_key_gutter_ratio - 0.02).abs() < 1e-6);
        assert!(Piano::new(&config.to_piano_config().unwrap()).is_ok());
    }

    #[test]
    fn test_default_file_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_FILE).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.layout, defaults.layout);
        assert_eq!(parsed.piano.start_note, defaults.piano.start_note);
        assert_eq!(parsed.piano.end_note, defaults.piano.end_note);
        assert_eq!(parsed.theme.border_color, defaults.theme.border_color);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.piano.start_note = "a2".to_string();
        config.piano.shortcuts = ShortcutPreset::Custom;
        config.piano.custom_shortcuts = Some(vec![ShortcutKey::new('1', '!')]);
        config.layout.note_shapes.db = 0.6;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.piano.start_note, "a2");
        assert_eq!(loaded.piano.shortcuts, ShortcutPreset::Custom);
        assert_eq!(loaded.layout, config.layout);
        assert_eq!(
            loaded.piano.shortcut_keys().unwrap(),
            Some(vec![ShortcutKey::new('1', '!')])
        );
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [piano]
            end_note = "c4"
            shortcuts = "none"

            [layout.black_key_shape]
            width_ratio = 0.5
            height_ratio = 0.6
            height_down_ratio = 0.58
            "#,
        )
        .unwrap();
        assert_eq!(config.piano.start_note, "c3");
        assert_eq!(config.piano.shortcut_keys().unwrap(), None);
        assert!((config.layout.black_key_shape.width_ratio - 0.5).abs() < 1e-6);
        assert!((config.layout.white_key_shape.height_down_ratio - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_custom_without_keys_fails() {
        let mut config = Config::default();
        config.piano.shortcuts = ShortcutPreset::Custom;
        assert!(matches!(config.to_piano_config(), Err(Error::Config(_))));
    }

    #[test]
    fn test_color_parsing() {
        use ratatui::style::Color;
        assert_eq!(Theme::parse_color("cyan"), Color::Cyan);
        assert_eq!(Theme::parse_color("white"), Color::White);
        assert_eq!(Theme::parse_color("#ff0000"), Color::Rgb(255, 0, 0));
        assert_eq!(Theme::parse_color("#FF8000"), Color::Rgb(255, 128, 0));
        assert_eq!(Theme::parse_color("chartreuse"), Color::White);
        assert_eq!(Theme::parse_color("#12345g"), Color::White);
        assert_eq!(Theme::parse_color("#fff"), Color::White);
    }

    #[test]
    fn test_color_with_multibyte_chars() {
        use ratatui::style::Color;
        // Seven bytes, but the euro sign straddles the channel boundaries
        let config: Config = toml::from_str("[theme]\nborder_color = \"#a€12\"\n").unwrap();
        assert_eq!(config.theme.border(), Color::White);
        assert_eq!(Theme::parse_color("#ééé"), Color::White);
    }

    #[test]
    fn test_partial_note_shapes_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [layout.note_shapes]
            db = 0.4
            "#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("missing field"), "{}", err);
    }

    #[test]
    fn test_full_note_shapes_table() {
        let config: Config = toml::from_str(
            r#"
            [layout.note_shapes]
            c = 0.0
            db = 0.4
            d = 1.0
            eb = 1.8
            e = 2.0
            f = 3.0
            gb = 3.5
            g = 4.0
            ab = 4.7
            a = 5.0
            bb = 5.85
            b = 6.0
            "#,
        )
        .unwrap();
        assert!((config.layout.note_shapes.db - 0.4).abs() < 1e-6);
        assert!((config.layout.note_shapes.eb - 1.8).abs() < 1e-6);
    }
}
