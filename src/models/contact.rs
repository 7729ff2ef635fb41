// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::validation::validate_phone;

// Identidade compartilhada entre compradores (leads) e proprietários (captações)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    #[schema(example = "Maria da Silva")]
    pub full_name: String,
    #[schema(example = "+5511987654321")]
    pub phone: String,
    pub email: Option<String>,
    pub alternate_phone: Option<String>,

    // Preferências livres (JSONB): canal preferido, horários, etc.
    pub preferences: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Dados do contato: usado no cadastro direto e embutido em leads/captações
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[validate(length(min = 2, max = 120, message = "invalid_length"))]
    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+55 11 98765-4321")]
    pub phone: String,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub alternate_phone: Option<String>,

    pub preferences: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactPayload {
    #[validate(length(min = 2, max = 120, message = "invalid_length"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub alternate_phone: Option<String>,
    pub preferences: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContactFilter {
    /// Busca por nome, telefone ou e-mail
    pub search: Option<String>,
}
