use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailJaCadastrado,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Nível de acesso insuficiente")]
    AcessoNegado,

    #[error("{0} não encontrado(a)")]
    NaoEncontrado(&'static str),

    #[error("Restrição do banco violada: {0}")]
    RestricaoViolada(String),

    #[error("Período obrigatório")]
    PeriodoObrigatorio,

    #[error("Período inválido")]
    PeriodoInvalido,

    #[error("Hierarquia de órgãos cíclica")]
    HierarquiaCiclica,

    // Falhas do banco (rede, query malformada, tabela inexistente...)
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Fonte não encontrada: {0}")]
    FonteNaoEncontrada(String),

    #[error("Erro ao gerar PDF: {0}")]
    Pdf(String),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Erro pronto para ser devolvido ao cliente HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Chave da mensagem nos arquivos de `locales/`.
    pub fn codigo(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "erro.validacao",
            AppError::EmailJaCadastrado => "erro.email_ja_cadastrado",
            AppError::InvalidCredentials => "erro.credenciais_invalidas",
            AppError::InvalidToken => "erro.token_invalido",
            AppError::AcessoNegado => "erro.acesso_negado",
            AppError::NaoEncontrado(_) => "erro.nao_encontrado",
            AppError::RestricaoViolada(_) => "erro.restricao_violada",
            AppError::PeriodoObrigatorio => "erro.periodo_obrigatorio",
            AppError::PeriodoInvalido => "erro.periodo_invalido",
            AppError::HierarquiaCiclica => "erro.hierarquia_ciclica",
            AppError::Pdf(_) | AppError::FonteNaoEncontrada(_) => "erro.pdf",
            AppError::DatabaseError(_)
            | AppError::JwtError(_)
            | AppError::InternalServerError(_) => "erro.interno",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::RestricaoViolada(_)
            | AppError::PeriodoObrigatorio
            | AppError::PeriodoInvalido
            | AppError::HierarquiaCiclica => StatusCode::BAD_REQUEST,
            AppError::EmailJaCadastrado => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AcessoNegado => StatusCode::FORBIDDEN,
            AppError::NaoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::JwtError(_)
            | AppError::FonteNaoEncontrada(_)
            | AppError::Pdf(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzindo a mensagem
    /// para o idioma pedido pelo cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let error = store.traduzir(&locale.0, self.codigo());

        if status.is_server_error() {
            // O detalhe fica só no log, o cliente recebe a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::NaoEncontrado(entidade) => Some(json!({ "entidade": entidade })),
            AppError::RestricaoViolada(restricao) => Some(json!({ "restricao": restricao })),
            _ => None,
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
