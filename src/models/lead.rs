// src/models/lead.rs

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
    models::{
        contact::ContactPayload,
        listing::{CreateListingPayload, Listing},
    },
    status_flow,
};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    WalkIn,
    Portal,
    Social,
    Campaign,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    VisitScheduled,
    Negotiating,
    Won,
    Lost,
}

status_flow!(LeadStatus {
    New => "new" => [Contacted, Lost],
    Contacted => "contacted" => [Qualified, Lost],
    Qualified => "qualified" => [VisitScheduled, Negotiating, Lost],
    VisitScheduled => "visit_scheduled" => [Qualified, Negotiating, Lost],
    Negotiating => "negotiating" => [Won, Lost, Qualified],
    Won => "won" => [],
    Lost => "lost" => [New],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "seller_lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SellerLeadStatus {
    New,
    Contacted,
    Evaluation,
    AgreementSigned,
    Listed,
    Lost,
}

status_flow!(SellerLeadStatus {
    New => "new" => [Contacted, Lost],
    Contacted => "contacted" => [Evaluation, Lost],
    Evaluation => "evaluation" => [AgreementSigned, Lost],
    AgreementSigned => "agreement_signed" => [Listed, Lost],
    Listed => "listed" => [],
    Lost => "lost" => [New],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Villa,
    Plot,
    Commercial,
    Other,
}

// --- LEAD (COMPRADOR) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub source: LeadSource,
    pub status: LeadStatus,
    #[schema(example = "350000.00")]
    pub budget_min: Option<Decimal>,
    #[schema(example = "500000.00")]
    pub budget_max: Option<Decimal>,

    // Ex: { "bedrooms": 3, "localities": ["Pinheiros", "Vila Madalena"] }
    pub requirements: Value,

    pub next_follow_up_at: Option<DateTime<Utc>>,
    pub lost_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lead com os dados do contato (usado nas listagens)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lead: Lead,
    pub contact_name: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub assigned_to: Option<Uuid>,
    /// Busca por nome, telefone ou e-mail do contato
    pub search: Option<String>,
}

// --- CAPTAÇÃO (PROPRIETÁRIO) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerLead {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub source: LeadSource,
    pub status: SellerLeadStatus,
    #[schema(example = "Rua Harmonia, 500 - apto 42")]
    pub property_address: String,
    pub locality: Option<String>,
    pub expected_price: Option<Decimal>,
    pub property_type: PropertyType,
    pub details: Value,
    pub lost_reason: Option<String>,
    pub listing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SellerLeadFilter {
    pub status: Option<SellerLeadStatus>,
    pub assigned_to: Option<Uuid>,
    pub search: Option<String>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    /// Contato existente. Se ausente, `contact` é obrigatório.
    pub contact_id: Option<Uuid>,
    #[validate(nested)]
    pub contact: Option<ContactPayload>,

    pub assigned_to: Option<Uuid>,
    pub source: Option<LeadSource>,

    #[validate(custom(function = "validate_price"))]
    pub budget_min: Option<Decimal>,
    #[validate(custom(function = "validate_price"))]
    pub budget_max: Option<Decimal>,

    pub requirements: Option<Value>,
    pub next_follow_up_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    pub source: Option<LeadSource>,
    #[validate(custom(function = "validate_price"))]
    pub budget_min: Option<Decimal>,
    #[validate(custom(function = "validate_price"))]
    pub budget_max: Option<Decimal>,
    pub requirements: Option<Value>,
    pub next_follow_up_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatusPayload {
    pub status: LeadStatus,
    #[validate(length(max = 500, message = "invalid_length"))]
    pub lost_reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadPayload {
    /// `null` remove o responsável
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSellerLeadPayload {
    pub contact_id: Option<Uuid>,
    #[validate(nested)]
    pub contact: Option<ContactPayload>,

    pub assigned_to: Option<Uuid>,
    pub source: Option<LeadSource>,

    #[validate(length(min = 5, max = 300, message = "invalid_length"))]
    pub property_address: String,
    pub locality: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub expected_price: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSellerLeadPayload {
    pub assigned_to: Option<Uuid>,
    #[validate(length(min = 5, max = 300, message = "invalid_length"))]
    pub property_address: Option<String>,
    pub locality: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub expected_price: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerLeadStatusPayload {
    pub status: SellerLeadStatus,
    #[validate(length(max = 500, message = "invalid_length"))]
    pub lost_reason: Option<String>,
}

/// Converte a captação em anúncio (a unidade pode ser existente ou nova)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSellerLeadPayload {
    #[validate(nested)]
    pub listing: CreateListingPayload,
}

/// Resultado da conversão: captação marcada como `listed` + anúncio criado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerLeadConversion {
    pub seller_lead: SellerLead,
    pub listing: Listing,
}

/// `budget_min <= budget_max` quando ambos existem
pub fn budget_in_range(min: Option<Decimal>, max: Option<Decimal>) -> bool {
    match (min, max) {
        (Some(min), Some(max)) => min <= max,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::status::StatusFlow;

    #[test]
    fn lead_moves_forward_through_the_pipeline() {
        assert!(LeadStatus::New.can_transition_to(LeadStatus::Contacted));
        assert!(LeadStatus::Contacted.can_transition_to(LeadStatus::Qualified));
        assert!(LeadStatus::Qualified.can_transition_to(LeadStatus::VisitScheduled));
        assert!(LeadStatus::Negotiating.can_transition_to(LeadStatus::Won));
    }

    #[test]
    fn lead_cannot_skip_stages_or_leave_won() {
        assert!(!LeadStatus::New.can_transition_to(LeadStatus::Won));
        assert!(!LeadStatus::Contacted.can_transition_to(LeadStatus::Negotiating));
        assert!(!LeadStatus::Won.can_transition_to(LeadStatus::Lost));
        assert!(LeadStatus::Won.is_terminal());
        assert!(!LeadStatus::New.can_transition_to(LeadStatus::New));
    }

    #[test]
    fn lost_leads_can_be_reopened() {
        assert!(LeadStatus::Lost.can_transition_to(LeadStatus::New));
        assert!(!LeadStatus::Lost.can_transition_to(LeadStatus::Qualified));
    }

    #[test]
    fn every_open_lead_status_can_be_lost() {
        for status in [
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::Qualified,
            LeadStatus::VisitScheduled,
            LeadStatus::Negotiating,
        ] {
            assert!(status.can_transition_to(LeadStatus::Lost), "{:?}", status);
        }
    }

    #[test]
    fn seller_lead_is_listed_only_after_agreement() {
        assert!(!SellerLeadStatus::Evaluation.can_transition_to(SellerLeadStatus::Listed));
        assert!(SellerLeadStatus::AgreementSigned.can_transition_to(SellerLeadStatus::Listed));
        assert!(SellerLeadStatus::Listed.is_terminal());
    }

    #[test]
    fn budget_range_check() {
        use std::str::FromStr;
        let low = Decimal::from_str("300000").unwrap();
        let high = Decimal::from_str("450000").unwrap();
        assert!(budget_in_range(Some(low), Some(high)));
        assert!(budget_in_range(Some(low), Some(low)));
        assert!(!budget_in_range(Some(high), Some(low)));
        assert!(budget_in_range(None, Some(low)));
    }

    #[test]
    fn nested_contact_is_validated() {
        let payload: CreateLeadPayload = serde_json::from_value(serde_json::json!({
            "contact": { "fullName": "Maria", "phone": "123" },
            "source": "portal"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("contact"));
    }

    #[test]
    fn status_labels_match_serde() {
        let json = serde_json::to_value(LeadStatus::VisitScheduled).unwrap();
        assert_eq!(json, LeadStatus::VisitScheduled.as_str());
        let json = serde_json::to_value(SellerLeadStatus::AgreementSigned).unwrap();
        assert_eq!(json, SellerLeadStatus::AgreementSigned.as_str());
    }
}
