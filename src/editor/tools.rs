use std::fmt;
use std::str::FromStr;

/// Accordion sections of the tool panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolGroup {
    Hair,
    Eyes,
    Clothing,
    Filters,
}

impl ToolGroup {
    pub const ALL: [ToolGroup; 4] = [
        ToolGroup::Hair,
        ToolGroup::Eyes,
        ToolGroup::Clothing,
        ToolGroup::Filters,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            ToolGroup::Hair => "hair",
            ToolGroup::Eyes => "eyes",
            ToolGroup::Clothing => "clothing",
            ToolGroup::Filters => "filters",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            ToolGroup::Hair => "Cabelo",
            ToolGroup::Eyes => "Olhos",
            ToolGroup::Clothing => "Roupas",
            ToolGroup::Filters => "Filtros e Melhorias",
        }
    }

    pub fn tools(self) -> impl Iterator<Item = ToolId> {
        ToolId::ALL.into_iter().filter(move |tool| tool.group() == self)
    }
}

impl FromStr for ToolGroup {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        ToolGroup::ALL
            .into_iter()
            .find(|group| group.key() == lowered)
            .ok_or_else(|| format!("unknown section '{}'", value.trim()))
    }
}

impl fmt::Display for ToolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    HairColor,
    HairStyle,
    EyeColor,
    EyeShape,
    ClothingColor,
    ClothingSwap,
    ClothingPatternRemove,
    ClothingPatternAddPrompt,
    ClothingPatternAddImage,
    SkinSmoothing,
    NoiseReduction,
    Sharpen,
    Brightness,
    Contrast,
    AutoEnhance,
}

impl ToolId {
    pub const ALL: [ToolId; 15] = [
        ToolId::HairColor,
        ToolId::HairStyle,
        ToolId::EyeColor,
        ToolId::EyeShape,
        ToolId::ClothingColor,
        ToolId::ClothingSwap,
        ToolId::ClothingPatternRemove,
        ToolId::ClothingPatternAddPrompt,
        ToolId::ClothingPatternAddImage,
        ToolId::SkinSmoothing,
        ToolId::NoiseReduction,
        ToolId::Sharpen,
        ToolId::Brightness,
        ToolId::Contrast,
        ToolId::AutoEnhance,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ToolId::HairColor => "hair-color",
            ToolId::HairStyle => "hair-style",
            ToolId::EyeColor => "eye-color",
            ToolId::EyeShape => "eye-shape",
            ToolId::ClothingColor => "clothing-color",
            ToolId::ClothingSwap => "clothing-swap",
            ToolId::ClothingPatternRemove => "clothing-pattern-remove",
            ToolId::ClothingPatternAddPrompt => "clothing-pattern-add-prompt",
            ToolId::ClothingPatternAddImage => "clothing-pattern-add-image",
            ToolId::SkinSmoothing => "skin-smoothing",
            ToolId::NoiseReduction => "noise-reduction",
            ToolId::Sharpen => "sharpen",
            ToolId::Brightness => "brightness",
            ToolId::Contrast => "contrast",
            ToolId::AutoEnhance => "auto-enhance",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ToolId::HairColor => "Cor do Cabelo",
            ToolId::HairStyle => "Estilo do Cabelo",
            ToolId::EyeColor => "Cor dos Olhos",
            ToolId::EyeShape => "Formato dos Olhos",
            ToolId::ClothingColor => "Cor da Roupa",
            ToolId::ClothingSwap => "Trocar Roupa",
            ToolId::ClothingPatternRemove => "Remover Estampa",
            ToolId::ClothingPatternAddPrompt => "Adicionar Estampa (Texto)",
            ToolId::ClothingPatternAddImage => "Adicionar Estampa (Imagem)",
            ToolId::SkinSmoothing => "Limpeza de Pele",
            ToolId::NoiseReduction => "Redução de Ruído",
            ToolId::Sharpen => "Melhorar Nitidez",
            ToolId::Brightness => "Aumentar Brilho",
            ToolId::Contrast => "Aumentar Contraste",
            ToolId::AutoEnhance => "Melhoria Automática",
        }
    }

    pub const fn group(self) -> ToolGroup {
        match self {
            ToolId::HairColor | ToolId::HairStyle => ToolGroup::Hair,
            ToolId::EyeColor | ToolId::EyeShape => ToolGroup::Eyes,
            ToolId::ClothingColor
            | ToolId::ClothingSwap
            | ToolId::ClothingPatternRemove
            | ToolId::ClothingPatternAddPrompt
            | ToolId::ClothingPatternAddImage => ToolGroup::Clothing,
            ToolId::SkinSmoothing
            | ToolId::NoiseReduction
            | ToolId::Sharpen
            | ToolId::Brightness
            | ToolId::Contrast
            | ToolId::AutoEnhance => ToolGroup::Filters,
        }
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        ToolId::ALL
            .into_iter()
            .find(|tool| tool.as_str() == lowered)
            .ok_or_else(|| format!("unknown tool '{}'", value.trim()))
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_round_trips_through_its_id() {
        for tool in ToolId::ALL {
            assert_eq!(tool.as_str().parse::<ToolId>(), Ok(tool));
        }
        assert!("paint-bucket".parse::<ToolId>().is_err());
    }

    #[test]
    fn sections_partition_the_tools() {
        let counts: Vec<usize> = ToolGroup::ALL
            .into_iter()
            .map(|group| group.tools().count())
            .collect();
        assert_eq!(counts, vec![2, 2, 5, 6]);
        assert_eq!(" Clothing ".parse::<ToolGroup>(), Ok(ToolGroup::Clothing));
    }
}
