use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDef {
    /// RGB color as [r, g, b]
    Rgb(u8, u8, u8),
    /// Named color
    Named(String),
}

impl From<&ColorDef> for Color {
    fn from(def: &ColorDef) -> Self {
        match def {
            ColorDef::Rgb(r, g, b) => Color::Rgb(*r, *g, *b),
            ColorDef::Named(name) => match name.as_str() {
                "Black" => Color::Black,
                "Red" => Color::Red,
                "Green" => Color::Green,
                "Yellow" => Color::Yellow,
                "Blue" => Color::Blue,
                "Magenta" => Color::Magenta,
                "Cyan" => Color::Cyan,
                "Gray" => Color::Gray,
                "DarkGray" => Color::DarkGray,
                "LightRed" => Color::LightRed,
                "LightGreen" => Color::LightGreen,
                "LightYellow" => Color::LightYellow,
                "LightBlue" => Color::LightBlue,
                "LightMagenta" => Color::LightMagenta,
                "LightCyan" => Color::LightCyan,
                "White" => Color::White,
                // Default/Reset uses the terminal's default color
                "Default" | "Reset" => Color::Reset,
                _ => Color::White, // Default fallback
            },
        }
    }
}

/// Colors used by the inspector, as stored in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Background of the block of rows grouped under the selection.
    #[serde(default = "default_shading_bg")]
    pub shading_bg: ColorDef,

    #[serde(default = "default_selection_bg")]
    pub selection_bg: ColorDef,

    #[serde(default = "default_guide_fg")]
    pub guide_fg: ColorDef,

    #[serde(default = "default_name_fg")]
    pub name_fg: ColorDef,

    #[serde(default = "default_value_fg")]
    pub value_fg: ColorDef,

    #[serde(default = "default_type_fg")]
    pub type_fg: ColorDef,

    #[serde(default = "default_header_fg")]
    pub header_fg: ColorDef,

    #[serde(default = "default_status_fg")]
    pub status_fg: ColorDef,

    #[serde(default = "default_status_bg")]
    pub status_bg: ColorDef,
}

fn default_shading_bg() -> ColorDef {
    ColorDef::Rgb(32, 36, 44)
}

fn default_selection_bg() -> ColorDef {
    ColorDef::Named("DarkGray".to_string())
}

fn default_guide_fg() -> ColorDef {
    ColorDef::Named("DarkGray".to_string())
}

fn default_name_fg() -> ColorDef {
    ColorDef::Named("Cyan".to_string())
}

fn default_value_fg() -> ColorDef {
    ColorDef::Named("White".to_string())
}

fn default_type_fg() -> ColorDef {
    ColorDef::Named("DarkGray".to_string())
}

fn default_header_fg() -> ColorDef {
    ColorDef::Named("Yellow".to_string())
}

fn default_status_fg() -> ColorDef {
    ColorDef::Named("Black".to_string())
}

fn default_status_bg() -> ColorDef {
    ColorDef::Named("Gray".to_string())
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            shading_bg: default_shading_bg(),
            selection_bg: default_selection_bg(),
            guide_fg: default_guide_fg(),
            name_fg: default_name_fg(),
            value_fg: default_value_fg(),
            type_fg: default_type_fg(),
            header_fg: default_header_fg(),
            status_fg: default_status_fg(),
            status_bg: default_status_bg(),
        }
    }
}

/// Resolved colors, ready for styling.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub shading_bg: Color,
    pub selection_bg: Color,
    pub guide_fg: Color,
    pub name_fg: Color,
    pub value_fg: Color,
    pub type_fg: Color,
    pub header_fg: Color,
    pub status_fg: Color,
    pub status_bg: Color,
}

impl From<&ColorConfig> for Theme {
    fn from(config: &ColorConfig) -> Self {
        Self {
            shading_bg: (&config.shading_bg).into(),
            selection_bg: (&config.selection_bg).into(),
            guide_fg: (&config.guide_fg).into(),
            name_fg: (&config.name_fg).into(),
            value_fg: (&config.value_fg).into(),
            type_fg: (&config.type_fg).into(),
            header_fg: (&config.header_fg).into(),
            status_fg: (&config.status_fg).into(),
            status_bg: (&config.status_bg).into(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        (&ColorConfig::default()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_rgb_colors_deserialize() {
        let named: ColorDef = serde_json::from_str("\"Cyan\"").unwrap();
        assert_eq!(Color::from(&named), Color::Cyan);

        let rgb: ColorDef = serde_json::from_str("[10, 20, 30]").unwrap();
        assert_eq!(Color::from(&rgb), Color::Rgb(10, 20, 30));
    }

    #[test]
    fn unknown_names_fall_back_to_white() {
        let def = ColorDef::Named("NoSuchColor".to_string());
        assert_eq!(Color::from(&def), Color::White);
    }
}
