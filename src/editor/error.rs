use reqwest::StatusCode;

const GENERIC_FAILURE_MESSAGE: &str =
    "Falha ao aplicar a edição. Por favor, verifique a sua ligação e tente novamente.";

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" ({reason})"))
        .unwrap_or_default()
}

/// Where a failure originated. Validation failures never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Response,
    Transport,
    Input,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EditError {
    #[error("Por favor, carregue uma imagem de referência para a troca de roupa.")]
    MissingReferenceImage,
    #[error("Por favor, carregue uma imagem de referência para a estampa.")]
    MissingPatternImage,
    #[error("Por favor, selecione uma ferramenta válida.")]
    NoToolSelected,
    #[error("Por favor, carregue uma foto principal antes de aplicar uma edição.")]
    NoBaseImage,
    #[error("A edição foi bem-sucedida, mas o modelo não retornou uma imagem.")]
    NoImageReturned,
    #[error("O modelo não retornou nenhum conteúdo. O prompt pode ter sido bloqueado.{}", blocked_suffix(.reason))]
    Blocked { reason: Option<String> },
    #[error("A imagem devolvida pelo modelo não pôde ser descodificada: {0}")]
    InvalidImagePayload(String),
    #[error("Pedido ao modelo falhou com o estado {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Falha ao ler o ficheiro como URL de dados. ({0})")]
    ImageLoad(String),
}

impl EditError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EditError::MissingReferenceImage
            | EditError::MissingPatternImage
            | EditError::NoToolSelected
            | EditError::NoBaseImage => ErrorCategory::Validation,
            EditError::NoImageReturned
            | EditError::Blocked { .. }
            | EditError::InvalidImagePayload(_) => ErrorCategory::Response,
            EditError::Api { .. } | EditError::Transport(_) => ErrorCategory::Transport,
            EditError::ImageLoad(_) => ErrorCategory::Input,
        }
    }
}

/// The single dismissible error slot shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub title: String,
    pub message: String,
}

impl ErrorBanner {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl From<&EditError> for ErrorBanner {
    fn from(err: &EditError) -> Self {
        let title = match err {
            EditError::MissingReferenceImage => "Falta Imagem de Referência",
            EditError::MissingPatternImage => "Falta Imagem de Estampa",
            EditError::NoToolSelected => "Nenhuma Ferramenta Selecionada",
            EditError::NoBaseImage => "Nenhuma Imagem Carregada",
            EditError::NoImageReturned => "Resposta Incompleta",
            EditError::Blocked { .. } => {
                return ErrorBanner::new(
                    "Pedido Bloqueado",
                    "O seu pedido foi bloqueado por motivos de segurança. Por favor, ajuste a imagem ou o texto e tente novamente.",
                );
            }
            EditError::ImageLoad(_) => "Falha ao Carregar Imagem",
            EditError::InvalidImagePayload(_) | EditError::Api { .. } | EditError::Transport(_) => {
                "Ocorreu um Erro"
            }
        };

        let mut message = match err {
            EditError::Api { message, .. } => message.clone(),
            _ => err.to_string(),
        };
        if message.trim().is_empty() {
            message = GENERIC_FAILURE_MESSAGE.to_string();
        }
        ErrorBanner::new(title, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_their_titles() {
        let banner = ErrorBanner::from(&EditError::MissingReferenceImage);
        assert_eq!(banner.title, "Falta Imagem de Referência");
        assert!(banner.message.contains("troca de roupa"));

        let banner = ErrorBanner::from(&EditError::MissingPatternImage);
        assert_eq!(banner.title, "Falta Imagem de Estampa");

        let banner = ErrorBanner::from(&EditError::NoToolSelected);
        assert_eq!(banner.title, "Nenhuma Ferramenta Selecionada");
        assert_eq!(EditError::NoToolSelected.category(), ErrorCategory::Validation);
    }

    #[test]
    fn blocked_requests_get_a_fixed_message() {
        let err = EditError::Blocked {
            reason: Some("SAFETY".to_string()),
        };
        assert!(err.to_string().contains("SAFETY"));
        let banner = ErrorBanner::from(&err);
        assert_eq!(banner.title, "Pedido Bloqueado");
        assert!(banner.message.starts_with("O seu pedido foi bloqueado"));
        assert_eq!(err.category(), ErrorCategory::Response);
    }

    #[test]
    fn transport_failures_keep_the_underlying_message() {
        let banner = ErrorBanner::from(&EditError::Transport("connection reset".to_string()));
        assert_eq!(banner.title, "Ocorreu um Erro");
        assert_eq!(banner.message, "connection reset");

        let banner = ErrorBanner::from(&EditError::Transport(String::new()));
        assert_eq!(banner.message, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn api_failures_show_the_api_message_alone() {
        let err = EditError::Api {
            status: StatusCode::BAD_REQUEST,
            message: "API key not valid. Please pass a valid API key.".to_string(),
        };
        let banner = ErrorBanner::from(&err);
        assert_eq!(banner.title, "Ocorreu um Erro");
        assert_eq!(banner.message, "API key not valid. Please pass a valid API key.");
        assert!(err.to_string().contains("400"));

        let banner = ErrorBanner::from(&EditError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "  ".to_string(),
        });
        assert_eq!(banner.message, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn incomplete_response_title() {
        let banner = ErrorBanner::from(&EditError::NoImageReturned);
        assert_eq!(banner.title, "Resposta Incompleta");
        assert_eq!(EditError::NoImageReturned.category(), ErrorCategory::Response);
    }
}
