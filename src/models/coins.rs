// src/models/coins.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{activity::EntityKind, team::Role};

// Chaves das regras semeadas na migração
pub const RULE_VISIT_COMPLETED: &str = "visit_completed";
pub const RULE_LISTING_APPROVED: &str = "listing_approved";
pub const RULE_OFFER_ACCEPTED: &str = "offer_accepted";
pub const RULE_LEAD_CONVERTED: &str = "lead_converted";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditRule {
    pub id: Uuid,
    #[schema(example = "visit_completed")]
    pub key: String,
    pub description: String,
    #[schema(example = 10)]
    pub coins: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditLedgerEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub rule_key: Option<String>,
    pub amount: i32,
    pub reason: String,
    pub reference_type: Option<EntityKind>,
    pub reference_id: Option<Uuid>,
    pub balance_after: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub member_id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub coin_balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub member_id: Uuid,
    pub coin_balance: i64,
}

/// Referência que torna um prêmio único (regra + entidade)
#[derive(Debug, Clone, Copy)]
pub struct AwardRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl AwardRef {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustCoinsPayload {
    pub member_id: Uuid,
    /// Pode ser negativo (estorno), mas nunca zero
    #[validate(range(min = -100000, max = 100000, message = "invalid_amount"))]
    pub amount: i32,
    #[validate(length(min = 3, max = 300, message = "invalid_length"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRulePayload {
    #[validate(length(min = 3, max = 60, message = "invalid_length"))]
    #[schema(example = "visit_completed")]
    pub key: String,
    #[validate(length(min = 3, max = 300, message = "invalid_length"))]
    pub description: String,
    #[validate(range(min = 0, max = 10000, message = "invalid_amount"))]
    pub coins: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}
