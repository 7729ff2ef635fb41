// src/models/offer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use validator::Validate;

use crate::{common::validation::validate_price, status_flow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Submitted,
    Countered,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

status_flow!(OfferStatus {
    Submitted => "submitted" => [Countered, Accepted, Rejected, Withdrawn, Expired],
    Countered => "countered" => [Submitted, Accepted, Rejected, Withdrawn, Expired],
    Accepted => "accepted" => [],
    Rejected => "rejected" => [],
    Withdrawn => "withdrawn" => [],
    Expired => "expired" => [],
});

impl OfferStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, OfferStatus::Submitted | OfferStatus::Countered)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub lead_id: Uuid,
    pub buyer_agent_id: Option<Uuid>,
    #[schema(example = "850000.00")]
    pub amount: Decimal,
    pub counter_amount: Option<Decimal>,
    pub conditions: Option<String>,
    pub status: OfferStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Ainda aberta, mas com a validade vencida: deve ir para `expired`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.is_expired(now)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OfferFilter {
    pub status: Option<OfferStatus>,
    pub listing_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub buyer_agent_id: Option<Uuid>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferPayload {
    pub listing_id: Uuid,
    pub lead_id: Uuid,
    /// Padrão: o responsável pelo lead
    pub buyer_agent_id: Option<Uuid>,
    #[validate(custom(function = "validate_price"))]
    #[schema(example = "820000.00")]
    pub amount: Decimal,
    #[validate(length(max = 2000, message = "invalid_length"))]
    pub conditions: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterOfferPayload {
    #[validate(custom(function = "validate_price"))]
    pub counter_amount: Decimal,
}

/// Nova proposta do comprador depois de uma contraproposta
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviseOfferPayload {
    #[validate(custom(function = "validate_price"))]
    pub amount: Decimal,
    #[validate(length(max = 2000, message = "invalid_length"))]
    pub conditions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::status::StatusFlow;
    use chrono::Duration;
    use std::str::FromStr;

    fn offer(expires_at: Option<DateTime<Utc>>) -> Offer {
        Offer {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            buyer_agent_id: None,
            amount: Decimal::from_str("500000.00").unwrap(),
            counter_amount: None,
            conditions: None,
            status: OfferStatus::Submitted,
            expires_at,
            responded_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn buyer_can_revise_a_countered_offer() {
        assert!(OfferStatus::Submitted.can_transition_to(OfferStatus::Countered));
        assert!(OfferStatus::Countered.can_transition_to(OfferStatus::Submitted));
        assert!(OfferStatus::Countered.can_transition_to(OfferStatus::Accepted));
    }

    #[test]
    fn closed_offers_are_terminal() {
        for status in [
            OfferStatus::Accepted,
            OfferStatus::Rejected,
            OfferStatus::Withdrawn,
            OfferStatus::Expired,
        ] {
            assert!(status.is_terminal(), "{:?}", status);
            assert!(!status.is_open());
        }
    }

    #[test]
    fn expiry_is_checked_against_now() {
        let now = Utc::now();
        assert!(offer(Some(now - Duration::hours(1))).is_expired(now));
        assert!(!offer(Some(now + Duration::hours(1))).is_expired(now));
        assert!(!offer(None).is_expired(now));
    }

    #[test]
    fn only_open_offers_past_validity_are_stale() {
        let now = Utc::now();
        let mut past = offer(Some(now - Duration::hours(1)));
        assert!(past.is_stale(now));
        assert!(past.status.can_transition_to(OfferStatus::Expired));

        past.status = OfferStatus::Countered;
        assert!(past.is_stale(now));

        past.status = OfferStatus::Rejected;
        assert!(!past.is_stale(now));
        assert!(!offer(Some(now + Duration::hours(1))).is_stale(now));
    }
}
