use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::editor::image::EncodedImage;
use crate::editor::tools::ToolId;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex colour regex"));

/// Editable text fields of the tool panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    HairColor,
    HairStyle,
    EyeColor,
    EyeShape,
    ClothingColorTarget,
    ClothingColor,
    SwapTarget,
    PatternTarget,
    PatternPrompt,
    RemovePatternTarget,
}

impl ParamField {
    pub const ALL: [ParamField; 10] = [
        ParamField::HairColor,
        ParamField::HairStyle,
        ParamField::EyeColor,
        ParamField::EyeShape,
        ParamField::ClothingColorTarget,
        ParamField::ClothingColor,
        ParamField::SwapTarget,
        ParamField::PatternTarget,
        ParamField::PatternPrompt,
        ParamField::RemovePatternTarget,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            ParamField::HairColor => "hair-color",
            ParamField::HairStyle => "hair-style",
            ParamField::EyeColor => "eye-color",
            ParamField::EyeShape => "eye-shape",
            ParamField::ClothingColorTarget => "clothing-color-target",
            ParamField::ClothingColor => "clothing-color",
            ParamField::SwapTarget => "swap-target",
            ParamField::PatternTarget => "pattern-target",
            ParamField::PatternPrompt => "pattern-prompt",
            ParamField::RemovePatternTarget => "remove-pattern-target",
        }
    }

    /// Fields shown in the panel while `tool` is active.
    pub const fn for_tool(tool: ToolId) -> &'static [ParamField] {
        match tool {
            ToolId::HairColor => &[ParamField::HairColor],
            ToolId::HairStyle => &[ParamField::HairStyle],
            ToolId::EyeColor => &[ParamField::EyeColor],
            ToolId::EyeShape => &[ParamField::EyeShape],
            ToolId::ClothingColor => &[ParamField::ClothingColorTarget, ParamField::ClothingColor],
            ToolId::ClothingSwap => &[ParamField::SwapTarget],
            ToolId::ClothingPatternAddPrompt => {
                &[ParamField::PatternTarget, ParamField::PatternPrompt]
            }
            ToolId::ClothingPatternAddImage => &[ParamField::PatternTarget],
            ToolId::ClothingPatternRemove => &[ParamField::RemovePatternTarget],
            _ => &[],
        }
    }

    const fn is_color(self) -> bool {
        matches!(
            self,
            ParamField::HairColor | ParamField::EyeColor | ParamField::ClothingColor
        )
    }
}

impl FromStr for ParamField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        ParamField::ALL
            .into_iter()
            .find(|field| field.key() == lowered)
            .ok_or_else(|| format!("unknown field '{}'", value.trim()))
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-tool inputs. Values survive tool switches; only a new session resets
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParams {
    pub hair_color: String,
    pub hair_style: String,
    pub eye_color: String,
    pub eye_shape: String,
    pub clothing_color_target: String,
    pub clothing_color: String,
    pub swap_target: String,
    pub clothing_reference: Option<EncodedImage>,
    pub pattern_target: String,
    pub pattern_prompt: String,
    pub pattern_image: Option<EncodedImage>,
    pub remove_pattern_target: String,
}

impl Default for ToolParams {
    fn default() -> Self {
        Self {
            hair_color: "#ff0000".to_string(),
            hair_style: "liso e sedoso".to_string(),
            eye_color: "#4682b4".to_string(),
            eye_shape: "amendoados".to_string(),
            clothing_color_target: "camisa".to_string(),
            clothing_color: "#00ff00".to_string(),
            swap_target: "calças".to_string(),
            clothing_reference: None,
            pattern_target: "camisa".to_string(),
            pattern_prompt: "listras verticais azuis".to_string(),
            pattern_image: None,
            remove_pattern_target: "camisa".to_string(),
        }
    }
}

impl ToolParams {
    /// Stores a field verbatim. Colours that are not `#rrggbb` are kept as
    /// typed; the model receives whatever the user wrote.
    pub fn set(&mut self, field: ParamField, value: &str) {
        if field.is_color() && !is_hex_color(value) {
            warn!(field = %field, value = value, "colour is not in #rrggbb form");
        }
        let value = value.to_string();
        match field {
            ParamField::HairColor => self.hair_color = value,
            ParamField::HairStyle => self.hair_style = value,
            ParamField::EyeColor => self.eye_color = value,
            ParamField::EyeShape => self.eye_shape = value,
            ParamField::ClothingColorTarget => self.clothing_color_target = value,
            ParamField::ClothingColor => self.clothing_color = value,
            ParamField::SwapTarget => self.swap_target = value,
            ParamField::PatternTarget => self.pattern_target = value,
            ParamField::PatternPrompt => self.pattern_prompt = value,
            ParamField::RemovePatternTarget => self.remove_pattern_target = value,
        }
    }

    pub fn get(&self, field: ParamField) -> &str {
        match field {
            ParamField::HairColor => &self.hair_color,
            ParamField::HairStyle => &self.hair_style,
            ParamField::EyeColor => &self.eye_color,
            ParamField::EyeShape => &self.eye_shape,
            ParamField::ClothingColorTarget => &self.clothing_color_target,
            ParamField::ClothingColor => &self.clothing_color,
            ParamField::SwapTarget => &self.swap_target,
            ParamField::PatternTarget => &self.pattern_target,
            ParamField::PatternPrompt => &self.pattern_prompt,
            ParamField::RemovePatternTarget => &self.remove_pattern_target,
        }
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tool_panel() {
        let params = ToolParams::default();
        assert_eq!(params.get(ParamField::EyeColor), "#4682b4");
        assert_eq!(params.get(ParamField::SwapTarget), "calças");
        assert!(params.clothing_reference.is_none());
        assert!(params.pattern_image.is_none());
    }

    #[test]
    fn set_keeps_non_hex_colours() {
        let mut params = ToolParams::default();
        params.set(ParamField::HairColor, "ruivo acobreado");
        assert_eq!(params.hair_color, "ruivo acobreado");
        params.set("pattern-prompt".parse().unwrap(), "bolinhas");
        assert_eq!(params.pattern_prompt, "bolinhas");
    }

    #[test]
    fn hex_colour_check() {
        assert!(is_hex_color("#00ff00"));
        assert!(is_hex_color(" #ABCDEF "));
        assert!(!is_hex_color("#0f0"));
        assert!(!is_hex_color("green"));
    }

    #[test]
    fn field_keys_parse() {
        for field in ParamField::ALL {
            assert_eq!(field.key().parse::<ParamField>(), Ok(field));
        }
        assert!("nose-size".parse::<ParamField>().is_err());
    }

    #[test]
    fn pattern_tools_share_the_target_field() {
        assert!(ParamField::for_tool(ToolId::ClothingPatternAddPrompt).contains(&ParamField::PatternTarget));
        assert_eq!(ParamField::for_tool(ToolId::ClothingPatternAddImage), &[ParamField::PatternTarget]);
        assert!(ParamField::for_tool(ToolId::Sharpen).is_empty());
    }
}
