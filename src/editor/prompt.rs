use crate::editor::error::EditError;
use crate::editor::image::EncodedImage;
use crate::editor::params::ToolParams;
use crate::editor::tools::ToolId;

const HEADER: &str = "INSTRUÇÃO CRÍTICA E TÉCNICA. SIGA TODAS AS REGRAS RIGOROSAMENTE.";
const DIMENSION_HEADING: &str = "PROIBIDO CORTAR/DISTORCER";
const FALLBACK_GARMENT: &str = "peça de roupa";

const FEMININE_GARMENTS: &[&str] = &[
    "camisa",
    "camiseta",
    "blusa",
    "saia",
    "jaqueta",
    "camisola",
    "calça",
    "bermuda",
    "gravata",
    "sweatshirt",
    "t-shirt",
    "peça",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionRule {
    /// Width and height spelled out.
    Strict,
    /// Strict, plus no resizing or added margins.
    StrictNoMargins,
    Basic,
}

impl DimensionRule {
    fn body(self) -> &'static str {
        match self {
            DimensionRule::Strict => "A imagem final deve ter EXATAMENTE as mesmas dimensões (largura e altura em pixels) da imagem original. Nenhum corte ou distorção é permitido.",
            DimensionRule::StrictNoMargins => "A imagem final deve ter EXATAMENTE as mesmas dimensões (largura e altura em pixels) da imagem original. Nenhum corte, redimensionamento, distorção ou adição de margens é permitido. Preserve 100% da área visível original.",
            DimensionRule::Basic => "A imagem final deve ter EXATAMENTE as mesmas dimensões da imagem original.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub heading: &'static str,
    pub body: String,
}

impl Clause {
    fn new(heading: &'static str, body: impl Into<String>) -> Self {
        Self {
            heading,
            body: body.into(),
        }
    }

    fn with_items(heading: &'static str, lead: &str, items: &[&str]) -> Self {
        let mut body = lead.to_string();
        for item in items {
            body.push_str("\n    - ");
            body.push_str(item);
        }
        Self::new(heading, body)
    }
}

/// Clause set of one tool before numbering. Rendering puts a fixed header
/// first, then the dimension, scope, constraint, preservation and realism
/// clauses; the dimension and preservation clauses are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub dimensions: DimensionRule,
    pub scope: Clause,
    pub constraints: Vec<Clause>,
    pub preservation: Clause,
    pub realism: Option<Clause>,
}

impl PromptTemplate {
    pub fn render(&self) -> String {
        let dimension = Clause::new(DIMENSION_HEADING, self.dimensions.body());
        let clauses = std::iter::once(&dimension)
            .chain(std::iter::once(&self.scope))
            .chain(self.constraints.iter())
            .chain(std::iter::once(&self.preservation))
            .chain(self.realism.iter());

        let mut out = String::from(HEADER);
        for (index, clause) in clauses.enumerate() {
            out.push_str(&format!(
                "\n{}.  **{}:** {}",
                index + 1,
                clause.heading,
                clause.body
            ));
        }
        out
    }
}

/// A garment name with its Portuguese article resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Garment {
    name: String,
    feminine: bool,
    plural: bool,
}

impl Garment {
    pub fn new(name: &str) -> Self {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            FALLBACK_GARMENT
        } else {
            trimmed
        };
        // Agreement follows the head noun: "camisa de flanela", "calças jeans".
        let lowered = name.to_lowercase();
        let head = lowered.split_whitespace().next().unwrap_or(FALLBACK_GARMENT);
        let plural = head.ends_with('s') && !FEMININE_GARMENTS.contains(&head);
        let singular = if plural {
            head.trim_end_matches('s')
        } else {
            head
        };
        let feminine = FEMININE_GARMENTS.contains(&singular);
        Self {
            name: name.to_string(),
            feminine,
            plural,
        }
    }

    fn suffix(&self) -> &'static str {
        match (self.feminine, self.plural) {
            (true, false) => "a",
            (true, true) => "as",
            (false, false) => "o",
            (false, true) => "os",
        }
    }

    /// "da camisa", "do casaco", "das calças".
    pub fn with_de(&self) -> String {
        format!("d{} {}", self.suffix(), self.name)
    }

    /// "na camisa", "no casaco", "nas calças".
    pub fn with_em(&self) -> String {
        format!("n{} {}", self.suffix(), self.name)
    }

    /// Object pronoun after a gerund: "tornando-a".
    pub fn pronoun(&self) -> &'static str {
        self.suffix()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One tool with its fill-in values resolved from the parameter bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    HairColor { color: String },
    HairStyle { style: String },
    EyeColor { color: String },
    EyeShape { shape: String },
    ClothingColor { garment: Garment, color: String },
    ClothingSwap { garment: Garment, reference: EncodedImage },
    PatternRemove { garment: Garment },
    PatternAddPrompt { garment: Garment, pattern: String },
    PatternAddImage { garment: Garment, pattern: EncodedImage },
    SkinSmoothing,
    NoiseReduction,
    Sharpen,
    Brightness,
    Contrast,
    AutoEnhance,
}

const FULL_PRESERVATION_LEAD: &str =
    "TODOS os outros elementos DEVEM permanecer 100% IDÊNTICOS e INALTERADOS. Isto inclui:";
const OTHER_ELEMENTS_IDENTICAL: &str = "TODOS os outros elementos DEVEM permanecer 100% IDÊNTICOS: o rosto, o corpo, a pose, o tom de pele, o fundo, a iluminação e TODAS as outras peças de roupa não mencionadas.";
const PATTERN_REALISM: &str =
    "A estampa deve adaptar-se realisticamente às dobras, sombras e contornos do tecido original.";

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

impl EditOperation {
    /// Resolves the tool's fields. Tools that need a second image fail here,
    /// before anything is sent.
    pub fn from_params(tool: ToolId, params: &ToolParams) -> Result<Self, EditError> {
        let op = match tool {
            ToolId::HairColor => EditOperation::HairColor {
                color: trimmed(&params.hair_color),
            },
            ToolId::HairStyle => EditOperation::HairStyle {
                style: trimmed(&params.hair_style),
            },
            ToolId::EyeColor => EditOperation::EyeColor {
                color: trimmed(&params.eye_color),
            },
            ToolId::EyeShape => EditOperation::EyeShape {
                shape: trimmed(&params.eye_shape),
            },
            ToolId::ClothingColor => EditOperation::ClothingColor {
                garment: Garment::new(&params.clothing_color_target),
                color: trimmed(&params.clothing_color),
            },
            ToolId::ClothingSwap => EditOperation::ClothingSwap {
                garment: Garment::new(&params.swap_target),
                reference: params
                    .clothing_reference
                    .clone()
                    .ok_or(EditError::MissingReferenceImage)?,
            },
            ToolId::ClothingPatternRemove => EditOperation::PatternRemove {
                garment: Garment::new(&params.remove_pattern_target),
            },
            ToolId::ClothingPatternAddPrompt => EditOperation::PatternAddPrompt {
                garment: Garment::new(&params.pattern_target),
                pattern: trimmed(&params.pattern_prompt),
            },
            ToolId::ClothingPatternAddImage => EditOperation::PatternAddImage {
                garment: Garment::new(&params.pattern_target),
                pattern: params
                    .pattern_image
                    .clone()
                    .ok_or(EditError::MissingPatternImage)?,
            },
            ToolId::SkinSmoothing => EditOperation::SkinSmoothing,
            ToolId::NoiseReduction => EditOperation::NoiseReduction,
            ToolId::Sharpen => EditOperation::Sharpen,
            ToolId::Brightness => EditOperation::Brightness,
            ToolId::Contrast => EditOperation::Contrast,
            ToolId::AutoEnhance => EditOperation::AutoEnhance,
        };
        Ok(op)
    }

    /// Images sent after the base image and before the instruction.
    pub fn attachments(&self) -> Vec<EncodedImage> {
        match self {
            EditOperation::ClothingSwap { reference, .. } => vec![reference.clone()],
            EditOperation::PatternAddImage { pattern, .. } => vec![pattern.clone()],
            _ => Vec::new(),
        }
    }

    pub fn template(&self) -> PromptTemplate {
        match self {
            EditOperation::HairColor { color } => PromptTemplate {
                dimensions: DimensionRule::Strict,
                scope: Clause::new(
                    "EDIÇÃO RESTRITA AO CABELO",
                    format!("A única modificação permitida é a cor do cabelo na cabeça. A nova cor é {color}."),
                ),
                constraints: Vec::new(),
                preservation: Clause::with_items(
                    "PRESERVAÇÃO MÁXIMA",
                    FULL_PRESERVATION_LEAD,
                    &[
                        "O rosto, o formato do corpo, a pose e o tom de pele DEVEM ser preservados sem a MÍNIMA alteração.",
                        "A cor das sobrancelhas NÃO PODE ser alterada.",
                        "A textura, o volume e o estilo do cabelo original devem ser mantidos.",
                        "Roupas e fundo devem permanecer intocados.",
                        "A iluminação, sombras e reflexos originais da cena DEVEM ser preservados.",
                    ],
                ),
                realism: Some(Clause::new(
                    "APLICAÇÃO REALISTA",
                    "A nova cor deve ser aplicada de forma natural, respeitando as mechas, luzes e sombras do cabelo original.",
                )),
            },
            EditOperation::HairStyle { style } => PromptTemplate {
                dimensions: DimensionRule::Strict,
                scope: Clause::new(
                    "EDIÇÃO RESTRITA AO ESTILO DO CABELO",
                    format!("A única modificação permitida é o estilo do cabelo na cabeça. O novo estilo é '{style}'."),
                ),
                constraints: Vec::new(),
                preservation: Clause::with_items(
                    "PRESERVAÇÃO MÁXIMA",
                    FULL_PRESERVATION_LEAD,
                    &[
                        "O rosto, o formato do corpo, a pose e o tom de pele DEVEM ser preservados sem a MÍNIMA alteração.",
                        "A COR original do cabelo, a cor das sobrancelhas, roupas e o fundo devem permanecer intocados.",
                        "A iluminação e sombras originais da cena DEVEM ser preservados.",
                    ],
                ),
                realism: Some(Clause::new(
                    "APLICAÇÃO REALISTA",
                    "O novo penteado deve parecer natural na pessoa, respeitando a forma da cabeça e a iluminação.",
                )),
            },
            EditOperation::EyeColor { color } => PromptTemplate {
                dimensions: DimensionRule::Basic,
                scope: Clause::new(
                    "MICRO-EDIÇÃO",
                    format!("A única alteração permitida é a COR da íris dos olhos da pessoa. Altere a cor para {color}."),
                ),
                constraints: Vec::new(),
                preservation: Clause::new(
                    "PRESERVAÇÃO ABSOLUTA",
                    "É PROIBIDO alterar qualquer outra coisa. O formato dos olhos, cílios, pálpebras, o rosto, a pele, o tom de pele, a expressão facial e todos os outros pixels da imagem DEVEM permanecer 100% IDÊNTICOS. Apenas a cor da íris muda.",
                ),
                realism: Some(Clause::new(
                    "APLICAÇÃO REALISTA",
                    "A nova cor deve respeitar a textura natural da íris, os reflexos e as sombras existentes.",
                )),
            },
            EditOperation::EyeShape { shape } => PromptTemplate {
                dimensions: DimensionRule::Basic,
                scope: Clause::new(
                    "MICRO-EDIÇÃO SUTIL",
                    format!("A única alteração permitida é um ajuste SUTIL no FORMATO dos olhos da pessoa para que se assemelhem a '{shape}'."),
                ),
                constraints: Vec::new(),
                preservation: Clause::new(
                    "PRESERVAÇÃO ABSOLUTA",
                    "É PROIBIDO alterar qualquer outra coisa. A COR dos olhos, cílios, pálpebras, o rosto, a pele, o tom de pele, a expressão facial e todos os outros pixels da imagem DEVEM permanecer 100% IDÊNTICOS.",
                ),
                realism: Some(Clause::new(
                    "APLICAÇÃO REALISTA",
                    "A modificação deve ser mínima e fotorrealista.",
                )),
            },
            EditOperation::ClothingColor { garment, color } => PromptTemplate {
                dimensions: DimensionRule::Strict,
                scope: Clause::new(
                    "FOCO DA EDIÇÃO",
                    format!(
                        "A única alteração permitida é a COR {}. Altere a sua cor para {color}.",
                        garment.with_de()
                    ),
                ),
                constraints: Vec::new(),
                preservation: Clause::with_items(
                    "PRESERVAÇÃO MÁXIMA",
                    "TODOS os outros elementos DEVEM permanecer 100% IDÊNTICOS. Isto inclui:",
                    &[
                        "O rosto, o formato do corpo, a pose e o tom de pele DEVEM ser preservados sem NENHUMA alteração.",
                        "A textura original do tecido, as dobras e as sombras DEVEM ser mantidas.",
                        "Todas as outras peças de roupa e o fundo devem permanecer intocados.",
                    ],
                ),
                realism: Some(Clause::new(
                    "APLICAÇÃO REALISTA",
                    "A nova cor deve ser aplicada sobre o tecido de forma natural, respeitando a iluminação e as sombras.",
                )),
            },
            EditOperation::ClothingSwap { garment, .. } => PromptTemplate {
                dimensions: DimensionRule::StrictNoMargins,
                scope: Clause::new(
                    "FOCO DA EDIÇÃO",
                    format!(
                        "Substitua APENAS a peça de roupa '{}' na pessoa da imagem principal. Use a roupa da imagem de referência como modelo visual.",
                        garment.name()
                    ),
                ),
                constraints: vec![Clause::new(
                    "ORDEM DE CAMADAS (Z-ORDER)",
                    "A hierarquia de sobreposição das roupas DEVE ser MANTIDA. Se uma camisa estava por cima da calça, a nova roupa deve ser renderizada por baixo da camisa.",
                )],
                preservation: Clause::new("PRESERVAÇÃO MÁXIMA", OTHER_ELEMENTS_IDENTICAL),
                realism: Some(Clause::new(
                    "APLICAÇÃO REALISTA",
                    "A nova roupa deve ajustar-se de forma realista às dobras, sombras e iluminação da foto original.",
                )),
            },
            EditOperation::PatternRemove { garment } => PromptTemplate {
                dimensions: DimensionRule::Strict,
                scope: Clause::new(
                    "FOCO DA EDIÇÃO",
                    format!(
                        "Remova completamente qualquer estampa, logo ou padrão {}, tornando-{} de cor sólida (baseada na cor principal do tecido).",
                        garment.with_de(),
                        garment.pronoun()
                    ),
                ),
                constraints: Vec::new(),
                preservation: Clause::with_items(
                    "PRESERVAÇÃO MÁXIMA",
                    "TODOS os outros elementos DEVEM permanecer 100% IDÊNTICOS:",
                    &[
                        "O rosto, o corpo, a pose e o tom de pele DEVEM ser preservados sem NENHUMA alteração.",
                        "A textura do tecido, as dobras e as sombras DEVEM ser mantidas.",
                        "Todas as outras peças de roupa e o fundo devem permanecer intocados.",
                    ],
                ),
                realism: None,
            },
            EditOperation::PatternAddPrompt { garment, pattern } => PromptTemplate {
                dimensions: DimensionRule::Strict,
                scope: Clause::new(
                    "FOCO DA EDIÇÃO",
                    format!(
                        "Aplique uma estampa de '{pattern}' APENAS {}.",
                        garment.with_em()
                    ),
                ),
                constraints: Vec::new(),
                preservation: Clause::new("PRESERVAÇÃO MÁXIMA", OTHER_ELEMENTS_IDENTICAL),
                realism: Some(Clause::new("APLICAÇÃO REALISTA", PATTERN_REALISM)),
            },
            EditOperation::PatternAddImage { garment, .. } => PromptTemplate {
                dimensions: DimensionRule::Strict,
                scope: Clause::new(
                    "FOCO DA EDIÇÃO",
                    format!(
                        "Use a imagem de referência fornecida APENAS como uma estampa. Aplique esta estampa APENAS {} da pessoa na imagem original.",
                        garment.with_em()
                    ),
                ),
                constraints: Vec::new(),
                preservation: Clause::new("PRESERVAÇÃO MÁXIMA", OTHER_ELEMENTS_IDENTICAL),
                realism: Some(Clause::new("APLICAÇÃO REALISTA", PATTERN_REALISM)),
            },
            EditOperation::SkinSmoothing => filter_template(
                "Aplique um retoque FOTORREALISTA e SUTIL na pele da(s) pessoa(s) na imagem. Remova pequenas imperfeições como acne ou manchas. O objetivo é suavizar a pele, mas PRESERVAR A TEXTURA NATURAL. A pele não pode parecer plástica ou artificial.",
                None,
                "É PROIBIDO alterar o tom de pele, o formato do rosto, a identidade da pessoa, roupas, fundo ou qualquer outro elemento. Apenas a suavidade da pele é ajustada.",
            ),
            EditOperation::NoiseReduction => filter_template(
                "Aplique um algoritmo de redução de ruído digital (denoise) na imagem inteira. Remova o granulado indesejado, especialmente em áreas de sombra.",
                Some((
                    "PRESERVAÇÃO DE DETALHES",
                    "O processo deve preservar os detalhes finos da imagem. NÃO suavize excessivamente a imagem a ponto de perder nitidez.",
                )),
                "É PROIBIDO alterar cores, a identidade da pessoa, o formato do rosto, roupas, fundo ou qualquer outro elemento. Apenas o ruído digital é removido.",
            ),
            EditOperation::Sharpen => filter_template(
                "Aplique um ajuste de nitidez (sharpening) SUTIL na imagem inteira para melhorar a definição das bordas e detalhes finos.",
                Some((
                    "SEM ARTEFACTOS",
                    "NÃO introduza halos, ruído adicional ou outros artefactos visuais. O efeito deve ser natural.",
                )),
                "É PROIBIDO alterar cores, a identidade da pessoa, o formato do rosto, roupas, fundo ou qualquer outro elemento. Apenas a nitidez é ajustada.",
            ),
            EditOperation::Brightness => filter_template(
                "Aumente o brilho global (exposição) da imagem de forma equilibrada e sutil.",
                Some((
                    "PRESERVAR ALTAS LUZES",
                    "Evite \"estourar\" (clipping) as áreas que já são claras. Os detalhes nas altas luzes devem ser preservados.",
                )),
                "O contraste e a saturação de cor devem ser maioritariamente preservados. NÃO altere a identidade da pessoa, formato do rosto, etc.",
            ),
            EditOperation::Contrast => filter_template(
                "Aumente o contraste da imagem de forma sutil. Torne os pretos um pouco mais profundos e os brancos um pouco mais brilhantes para aumentar a vibração geral.",
                Some((
                    "PRESERVAR DETALHES",
                    "Não perca detalhes nas sombras ou nas altas luzes.",
                )),
                "NÃO sature excessivamente as cores nem altere a identidade da pessoa, formato do rosto, etc.",
            ),
            EditOperation::AutoEnhance => filter_template(
                "Realize uma melhoria automática e fotorrealista na imagem. Analise a foto e aplique um conjunto equilibrado de ajustes (brilho, contraste, balanço de branco, saturação) para melhorar a qualidade geral.",
                Some((
                    "RESULTADO NATURAL",
                    "A melhoria deve ser natural e agradável, como se a foto tivesse sido tirada em melhores condições. NÃO aplique filtros estilísticos ou dramáticos.",
                )),
                "A identidade da pessoa, o conteúdo da cena e todos os elementos devem ser 100% preservados. Apenas a qualidade fotográfica é melhorada.",
            ),
        }
    }
}

fn filter_template(
    scope: &str,
    constraint: Option<(&'static str, &str)>,
    preservation: &str,
) -> PromptTemplate {
    PromptTemplate {
        dimensions: DimensionRule::Basic,
        scope: Clause::new("FOCO DA EDIÇÃO", scope),
        constraints: constraint
            .map(|(heading, body)| vec![Clause::new(heading, body)])
            .unwrap_or_default(),
        preservation: Clause::new("PRESERVAÇÃO MÁXIMA", preservation),
        realism: None,
    }
}

/// Everything the requester needs besides the base image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    pub tool: ToolId,
    pub instruction: String,
    pub attachments: Vec<EncodedImage>,
}

pub fn build_edit_plan(tool: ToolId, params: &ToolParams) -> Result<EditPlan, EditError> {
    let operation = EditOperation::from_params(tool, params)?;
    Ok(EditPlan {
        tool,
        instruction: operation.template().render(),
        attachments: operation.attachments(),
    })
}
