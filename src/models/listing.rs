// src/models/listing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use validator::Validate;

use crate::{
    common::validation::validate_price,
    models::property::{Building, Unit, UnitPayload},
    status_flow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    PendingApproval,
    Active,
    UnderOffer,
    Inactive,
    Sold,
    Withdrawn,
}

status_flow!(ListingStatus {
    Draft => "draft" => [PendingApproval, Withdrawn],
    PendingApproval => "pending_approval" => [Active, Draft],
    Active => "active" => [UnderOffer, Inactive, Withdrawn, Sold],
    UnderOffer => "under_offer" => [Active, Sold],
    Inactive => "inactive" => [Active, Withdrawn],
    Sold => "sold" => [],
    Withdrawn => "withdrawn" => [],
});

impl ListingStatus {
    /// Anúncio aceita visitas e propostas?
    pub fn is_available(&self) -> bool {
        matches!(self, ListingStatus::Active | ListingStatus::UnderOffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "media_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    FloorPlan,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub seller_lead_id: Option<Uuid>,
    pub listing_agent_id: Uuid,
    #[schema(example = "Apartamento 3 dormitórios com varanda gourmet")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "890000.00")]
    pub price: Decimal,
    pub price_negotiable: bool,
    pub status: ListingStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub sold_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub kind: MediaKind,
    #[schema(example = "https://cdn.imobiliaria.com/listings/42/sala.jpg")]
    pub url: String,
    pub caption: Option<String>,
    pub position: i32,
    pub is_cover: bool,
    pub created_at: DateTime<Utc>,
}

/// Anúncio completo: unidade, empreendimento e mídias
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub unit: Unit,
    pub building: Building,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub listing_agent_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_bedrooms: Option<i32>,
    pub locality: Option<String>,
    pub search: Option<String>,
}

// Usado na criação transacional (unidade nova + anúncio + mídias)
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub kind: MediaKind,
    pub url: String,
    pub caption: Option<String>,
    pub position: i32,
    pub is_cover: bool,
}

#[derive(Debug, Clone)]
pub struct NewUnit {
    pub building_id: Uuid,
    pub unit_number: String,
    pub floor: Option<i32>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqft: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<super::property::Furnishing>,
    pub attributes: Option<Value>,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    pub kind: MediaKind,
    #[validate(url(message = "invalid_url"))]
    #[schema(example = "https://cdn.imobiliaria.com/fotos/sala.jpg")]
    pub url: String,
    #[validate(length(max = 200, message = "invalid_length"))]
    pub caption: Option<String>,
    pub position: Option<i32>,
    #[serde(default)]
    pub is_cover: bool,
}

/// Unidade nova criada junto com o anúncio
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUnitPayload {
    pub building_id: Uuid,
    #[validate(nested)]
    #[serde(flatten)]
    pub unit: UnitPayload,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingPayload {
    /// Unidade existente. Se ausente, `newUnit` é obrigatório.
    pub unit_id: Option<Uuid>,
    #[validate(nested)]
    pub new_unit: Option<NewUnitPayload>,

    /// Padrão: o próprio usuário
    pub listing_agent_id: Option<Uuid>,

    #[validate(length(min = 5, max = 200, message = "invalid_length"))]
    #[schema(example = "Apartamento 3 quartos com varanda")]
    pub title: String,
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[schema(example = "850000.00")]
    pub price: Decimal,
    #[serde(default)]
    pub price_negotiable: bool,

    #[validate(nested)]
    #[serde(default)]
    pub media: Vec<MediaPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingPayload {
    #[validate(length(min = 5, max = 200, message = "invalid_length"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    pub price_negotiable: Option<bool>,
    pub listing_agent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectListingPayload {
    #[validate(length(max = 500, message = "invalid_length"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingStatusPayload {
    pub status: ListingStatus,
}

impl MediaPayload {
    pub fn to_new_media(&self, fallback_position: i32) -> NewMedia {
        NewMedia {
            kind: self.kind,
            url: self.url.trim().to_string(),
            caption: self.caption.clone(),
            position: self.position.unwrap_or(fallback_position),
            is_cover: self.is_cover,
        }
    }
}

impl NewUnitPayload {
    pub fn to_new_unit(&self) -> NewUnit {
        let unit = &self.unit;
        NewUnit {
            building_id: self.building_id,
            unit_number: unit.unit_number.trim().to_string(),
            floor: unit.floor,
            bedrooms: unit.bedrooms,
            bathrooms: unit.bathrooms,
            area_sqft: unit.area_sqft,
            facing: unit.facing.clone(),
            furnishing: unit.furnishing,
            attributes: unit.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::status::StatusFlow;

    #[test]
    fn catalogue_approval_path() {
        assert!(ListingStatus::Draft.can_transition_to(ListingStatus::PendingApproval));
        assert!(ListingStatus::PendingApproval.can_transition_to(ListingStatus::Active));
        assert!(ListingStatus::PendingApproval.can_transition_to(ListingStatus::Draft));
        assert!(!ListingStatus::Draft.can_transition_to(ListingStatus::Active));
    }

    #[test]
    fn sold_and_withdrawn_are_terminal() {
        assert!(ListingStatus::Sold.is_terminal());
        assert!(ListingStatus::Withdrawn.is_terminal());
        assert!(!ListingStatus::Sold.can_transition_to(ListingStatus::Active));
    }

    #[test]
    fn only_active_or_under_offer_is_available() {
        assert!(ListingStatus::Active.is_available());
        assert!(ListingStatus::UnderOffer.is_available());
        assert!(!ListingStatus::Draft.is_available());
        assert!(!ListingStatus::Sold.is_available());
    }
}
