// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::common::status::StatusFlow;
use crate::middleware::i18n::Locale;

/// Motivo pelo qual a conclusão da visita foi recusada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpFailure {
    Missing,
    Mismatch,
    Expired,
}

impl OtpFailure {
    pub fn code(&self) -> &'static str {
        match self {
            OtpFailure::Missing => "otp_missing",
            OtpFailure::Mismatch => "otp_mismatch",
            OtpFailure::Expired => "otp_expired",
        }
    }
}

// Erro único da camada de serviço.
// As mensagens em `#[error]` vão para o log; o cliente recebe o texto traduzido.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campo -> código do erro (ex: "budget_max" -> "less_than_min")
    #[error("Erro de validação de campos: {0:?}")]
    FieldValidationError(HashMap<String, String>),

    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Conflito: {0}")]
    Conflict(&'static str),

    #[error("Transição de status inválida em {entity}: {from} -> {to}")]
    InvalidStatusTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("OTP recusado: {0:?}")]
    Otp(OtpFailure),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão negada: {0}")]
    Forbidden(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(&'static str),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Falha ao gerar PDF: {0}")]
    PdfError(String),
}

impl AppError {
    /// Atalho para erros de validação de um único campo.
    pub fn field(field: &str, code: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), code.to_string());
        AppError::FieldValidationError(errors)
    }

    pub fn transition<S: StatusFlow>(entity: &'static str, from: S, to: S) -> Self {
        AppError::InvalidStatusTransition {
            entity,
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::FieldValidationError(_)
            | AppError::InvalidStatusTransition { .. }
            | AppError::Otp(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro interno no formato público, traduzido para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                            store.translate(lang, code)
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (store.translate(lang, "validation_failed"), Some(json!(details)))
            }
            AppError::FieldValidationError(errors) => {
                let details: HashMap<&String, String> = errors
                    .iter()
                    .map(|(field, code)| (field, store.translate(lang, code)))
                    .collect();
                (store.translate(lang, "validation_failed"), Some(json!(details)))
            }
            AppError::NotFound(entity) => {
                let entity_name = store.translate(lang, &format!("entity.{}", entity));
                (store.format(lang, "not_found", &[("entity", entity_name.as_str())]), None)
            }
            AppError::Conflict(code) | AppError::UniqueConstraintViolation(code) => {
                (store.translate(lang, code), None)
            }
            AppError::InvalidStatusTransition { entity, from, to } => {
                let entity_name = store.translate(lang, &format!("entity.{}", entity));
                (
                    store.format(
                        lang,
                        "invalid_transition",
                        &[
                            ("entity", entity_name.as_str()),
                            ("from", from.as_str()),
                            ("to", to.as_str()),
                        ],
                    ),
                    None,
                )
            }
            AppError::Otp(failure) => (store.translate(lang, failure.code()), None),
            AppError::InvalidCredentials => (store.translate(lang, "invalid_credentials"), None),
            AppError::InvalidToken => (store.translate(lang, "invalid_token"), None),
            AppError::Forbidden(permission) => (
                store.format(lang, "forbidden", &[("permission", *permission)]),
                None,
            ),
            // Todos os outros erros viram 500. O detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (store.translate(lang, "internal_error"), None)
            }
        };

        ApiError { status, error, details }
    }
}

// O erro que de fato sai pela API
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn maps_domain_errors_to_http_status() {
        assert_eq!(AppError::NotFound("lead").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("visit_slot_taken").status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Otp(OtpFailure::Mismatch).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Forbidden("leads:write").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn translates_not_found_with_entity_name() {
        let store = I18nStore::new();
        let api = AppError::NotFound("visit").to_api_error(&Locale("pt".into()), &store);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, "Visita não encontrado(a).");

        let api = AppError::NotFound("visit").to_api_error(&en(), &store);
        assert_eq!(api.error, "Visit not found.");
    }

    #[test]
    fn field_errors_are_returned_as_details() {
        let store = I18nStore::new();
        let api = AppError::field("budgetMax", "budget_range").to_api_error(&en(), &store);
        let details = api.details.expect("details");
        assert_eq!(
            details["budgetMax"],
            json!("Maximum budget must be greater than or equal to the minimum.")
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let store = I18nStore::new();
        let api = AppError::PdfError("font missing".into()).to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("font"));
        assert!(api.details.is_none());
    }
}
