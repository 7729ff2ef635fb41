// src/models/team.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::validation::validate_phone;

// Mapeia o CREATE TYPE member_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    BuyerAgent,
    ListingAgent,
    FieldAgent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BuyerAgent => "buyer_agent",
            Role::ListingAgent => "listing_agent",
            Role::FieldAgent => "field_agent",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// Representa um membro da equipe vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    #[schema(example = "Ana Souza")]
    pub full_name: String,
    #[schema(example = "ana@imobiliaria.com")]
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    #[schema(example = 120)]
    pub coin_balance: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TeamFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberPayload {
    #[validate(length(min = 2, max = 120, message = "invalid_length"))]
    #[schema(example = "Carlos Lima")]
    pub full_name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "carlos@imobiliaria.com")]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    pub role: Role,

    #[validate(length(min = 8, message = "invalid_length"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberPayload {
    #[validate(length(min = 2, max = 120, message = "invalid_length"))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 6, message = "invalid_length"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "invalid_length"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_label_matches_serde_name() {
        for role in [Role::Admin, Role::BuyerAgent, Role::ListingAgent, Role::FieldAgent] {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, role.as_str());
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let member = TeamMember {
            id: Uuid::new_v4(),
            full_name: "Ana".into(),
            email: "ana@imobiliaria.com".into(),
            phone: None,
            role: Role::FieldAgent,
            password_hash: "$2b$12$hash".into(),
            coin_balance: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "field_agent");
    }
}
