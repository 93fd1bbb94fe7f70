use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::viewport::Viewport;
use crate::{Color, Tool};

pub const DEFAULT_VIEWPORT_SIZE: u32 = 500;
pub const DEFAULT_BASE_IMAGE_URL: &str = "https://konvajs.org/assets/lion.png";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Used until the container is first measured.
    pub default_viewport: Viewport,
    pub background: Color,
    pub default_color: Color,
    pub default_tool: Tool,
    /// `None` starts without a base image.
    pub base_image_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_viewport: Viewport::square(DEFAULT_VIEWPORT_SIZE),
            background: Color::WHITE,
            default_color: Color::BLACK,
            default_tool: Tool::Pen,
            base_image_url: Some(DEFAULT_BASE_IMAGE_URL.to_string()),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let json = json.trim();
        if json.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(Config::from_json("  ").unwrap(), Config::default());
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn defaults_match_initial_state() {
        let config = Config::default();
        assert_eq!(config.default_viewport, Viewport::new(500, 500));
        assert_eq!(config.default_tool, Tool::Pen);
        assert_eq!(config.default_color, Color::BLACK);
        assert_eq!(config.base_image_url.as_deref(), Some(DEFAULT_BASE_IMAGE_URL));
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = Config::from_json(
            r##"{"defaultTool": "brush", "defaultColor": "#0f0", "baseImageUrl": null}"##,
        )
        .unwrap();
        assert_eq!(config.default_tool, Tool::Brush);
        assert_eq!(config.default_color, Color::rgb(0, 255, 0));
        assert_eq!(config.base_image_url, None);
        assert_eq!(config.background, Color::WHITE);
    }

    #[test]
    fn viewport_is_read_as_width_and_height() {
        let config = Config::from_json(r#"{"defaultViewport": {"width": 320, "height": 240}}"#).unwrap();
        assert_eq!(config.default_viewport, Viewport::new(320, 240));
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let result = Config::from_json(r#"{"defaultTool": "eraser"}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
