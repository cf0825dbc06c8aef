use serde::Deserialize;

use crate::display::{Shade, DISPLAY_COLUMNS, DISPLAY_ROWS};
use crate::errors::BootError;

/// CSS colours for the two shades of the surface.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub foreground: String,
    pub background: String,
}

impl Palette {
    pub fn css(&self, shade: Shade) -> &str {
        match shade {
            Shade::Foreground => &self.foreground,
            Shade::Background => &self.background,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: "white".to_string(),
            background: "black".to_string(),
        }
    }
}

/// Everything the page may override when calling `bootstrap`.
///
/// Missing fields fall back to the defaults, so `{}` and `undefined` are both
/// valid configurations.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootConfig {
    pub surface_id: String,
    pub selector_id: String,
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
    pub log_level: String,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            surface_id: "display".to_string(),
            selector_id: "rom_selector".to_string(),
            width: DISPLAY_COLUMNS as u32,
            height: DISPLAY_ROWS as u32,
            palette: Palette::default(),
            log_level: "info".to_string(),
        }
    }
}

impl BootConfig {
    pub fn surface_id(mut self, id: &str) -> Self {
        self.surface_id = id.to_string();
        self
    }

    pub fn selector_id(mut self, id: &str) -> Self {
        self.selector_id = id.to_string();
        self
    }

    pub fn foreground(mut self, color: &str) -> Self {
        self.palette.foreground = color.to_string();
        self
    }

    pub fn log_level(&self) -> Result<log::Level, BootError> {
        self.log_level
            .parse()
            .map_err(|_| BootError::Config(format!("unknown log level `{}`", self.log_level)))
    }
}

#[test]
fn test_defaults() {
    let config = BootConfig::default();
    assert_eq!(config.surface_id, "display");
    assert_eq!(config.selector_id, "rom_selector");
    assert_eq!((config.width, config.height), (64, 32));
    assert_eq!(config.palette.css(Shade::Foreground), "white");
    assert_eq!(config.palette.css(Shade::Background), "black");
    assert_eq!(config.log_level(), Ok(log::Level::Info));
}

#[test]
fn test_builder() {
    let config = BootConfig::default()
        .surface_id("screen")
        .selector_id("picker")
        .foreground("#e0f8d0");
    assert_eq!(config.surface_id, "screen");
    assert_eq!(config.selector_id, "picker");
    assert_eq!(config.palette.css(Shade::Foreground), "#e0f8d0");
    assert_eq!(config.palette.background, "black");
}

#[test]
fn test_partial_json() {
    let config: BootConfig = serde_json::from_str(
        r#"{"selectorId": "rom", "palette": {"foreground": "lime"}, "logLevel": "DEBUG"}"#,
    )
    .unwrap();
    assert_eq!(config.selector_id, "rom");
    assert_eq!(config.surface_id, "display");
    assert_eq!(config.palette.foreground, "lime");
    assert_eq!(config.palette.background, "black");
    assert_eq!(config.log_level(), Ok(log::Level::Debug));

    let config: BootConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, BootConfig::default());
}

#[test]
fn test_size_out_of_range() {
    assert!(serde_json::from_str::<BootConfig>(r#"{"width": -1}"#).is_err());
    assert!(serde_json::from_str::<BootConfig>(r#"{"height": 4294967296}"#).is_err());
    let config: BootConfig = serde_json::from_str(r#"{"width": 128, "height": 64}"#).unwrap();
    assert_eq!((config.width, config.height), (128, 64));
}

#[test]
fn test_bad_log_level() {
    let mut config = BootConfig::default();
    config.log_level = "loud".to_string();
    assert_eq!(
        config.log_level(),
        Err(BootError::Config("unknown log level `loud`".to_string()))
    );
}
