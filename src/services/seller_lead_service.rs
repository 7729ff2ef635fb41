// src/services/seller_lead_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        status::StatusFlow,
    },
    db::{
        seller_lead_repo::{NewSellerLead, SellerLeadChanges},
        ContactRepository, ListingRepository, PropertyRepository, SellerLeadRepository,
    },
    models::{
        activity::EntityKind,
        coins::{AwardRef, RULE_LEAD_CONVERTED},
        lead::{
            ConvertSellerLeadPayload, CreateSellerLeadPayload, LeadSource, PropertyType, SellerLead,
            SellerLeadConversion, SellerLeadFilter, SellerLeadStatus, SellerLeadStatusPayload,
            UpdateSellerLeadPayload,
        },
        team::{Role, TeamMember},
    },
    services::{coin_service::CoinService, contact_service::resolve_contact, listing_service::insert_listing},
};

/// Troca manual de status. `listed` só é alcançado pela conversão.
pub fn check_seller_transition(
    current: SellerLeadStatus,
    next: SellerLeadStatus,
    lost_reason: Option<&str>,
) -> Result<(), AppError> {
    if next == SellerLeadStatus::Listed || !current.can_transition_to(next) {
        return Err(AppError::transition("seller_lead", current, next));
    }
    if next == SellerLeadStatus::Lost && lost_reason.map(str::trim).is_none_or(str::is_empty) {
        return Err(AppError::field("lostReason", "lost_reason_required"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SellerLeadService {
    repo: SellerLeadRepository,
    contact_repo: ContactRepository,
    listing_repo: ListingRepository,
    property_repo: PropertyRepository,
    coin_service: CoinService,
    pool: PgPool,
}

impl SellerLeadService {
    pub fn new(
        repo: SellerLeadRepository,
        contact_repo: ContactRepository,
        listing_repo: ListingRepository,
        property_repo: PropertyRepository,
        coin_service: CoinService,
        pool: PgPool,
    ) -> Self {
        Self { repo, contact_repo, listing_repo, property_repo, coin_service, pool }
    }

    pub async fn create(&self, creator: &TeamMember, payload: &CreateSellerLeadPayload) -> Result<SellerLead, AppError> {
        let assigned_to = payload
            .assigned_to
            .or((creator.role == Role::ListingAgent).then_some(creator.id));

        let mut tx = self.pool.begin().await?;

        let contact = resolve_contact(
            &self.contact_repo,
            &mut *tx,
            payload.contact_id,
            payload.contact.as_ref(),
        )
        .await?;

        let lead = self
            .repo
            .create(
                &mut *tx,
                &NewSellerLead {
                    contact_id: contact.id,
                    assigned_to,
                    source: payload.source.unwrap_or(LeadSource::Other),
                    property_address: payload.property_address.trim().to_string(),
                    locality: payload.locality.clone(),
                    expected_price: payload.expected_price,
                    property_type: payload.property_type.unwrap_or(PropertyType::Apartment),
                    details: payload.details.clone().unwrap_or_else(|| json!({})),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(seller_lead_id = %lead.id, "Captação criada");
        Ok(lead)
    }

    pub async fn list(&self, filter: &SellerLeadFilter, page: &PageParams) -> Result<Paginated<SellerLead>, AppError> {
        let (leads, total) = self.repo.list(&self.pool, filter, page).await?;
        Ok(Paginated::new(leads, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<SellerLead, AppError> {
        found(self.repo.find_by_id(&self.pool, id).await?, "seller_lead")
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateSellerLeadPayload) -> Result<SellerLead, AppError> {
        let changes = SellerLeadChanges {
            assigned_to: payload.assigned_to,
            property_address: payload.property_address.as_deref().map(|a| a.trim().to_string()),
            locality: payload.locality.clone(),
            expected_price: payload.expected_price,
            property_type: payload.property_type,
            details: payload.details.clone(),
        };
        found(self.repo.update(&self.pool, id, &changes).await?, "seller_lead")
    }

    pub async fn change_status(&self, id: Uuid, payload: &SellerLeadStatusPayload) -> Result<SellerLead, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "seller_lead")?;
        check_seller_transition(current.status, payload.status, payload.lost_reason.as_deref())?;

        let lead = found(
            self.repo
                .set_status(&mut *tx, id, payload.status, payload.lost_reason.as_deref().map(str::trim))
                .await?,
            "seller_lead",
        )?;

        tx.commit().await?;
        Ok(lead)
    }

    /// Converte a captação em anúncio numa única transação.
    pub async fn convert(
        &self,
        id: Uuid,
        by: &TeamMember,
        payload: &ConvertSellerLeadPayload,
    ) -> Result<SellerLeadConversion, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "seller_lead")?;
        if current.listing_id.is_some() {
            return Err(AppError::Conflict("seller_lead_already_converted"));
        }
        if !current.status.can_transition_to(SellerLeadStatus::Listed) {
            return Err(AppError::transition("seller_lead", current.status, SellerLeadStatus::Listed));
        }

        let agent_id = payload
            .listing
            .listing_agent_id
            .or(current.assigned_to)
            .unwrap_or(by.id);

        let (listing, _media) = insert_listing(
            &self.listing_repo,
            &self.property_repo,
            &mut *tx,
            agent_id,
            Some(current.id),
            &payload.listing,
        )
        .await?;

        let seller_lead = self.repo.mark_listed(&mut *tx, id, listing.id).await?;

        tx.commit().await?;

        tracing::info!(seller_lead_id = %id, listing_id = %listing.id, "🏠 Captação convertida em anúncio");

        self.coin_service
            .award_best_effort(
                seller_lead.assigned_to,
                RULE_LEAD_CONVERTED,
                AwardRef::new(EntityKind::SellerLead, seller_lead.id),
            )
            .await;

        Ok(SellerLeadConversion { seller_lead, listing })
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.soft_delete(&self.pool, id).await? {
            return Err(AppError::NotFound("seller_lead"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_only_through_conversion() {
        assert!(matches!(
            check_seller_transition(SellerLeadStatus::AgreementSigned, SellerLeadStatus::Listed, None),
            Err(AppError::InvalidStatusTransition { .. })
        ));
        assert!(check_seller_transition(SellerLeadStatus::Evaluation, SellerLeadStatus::AgreementSigned, None).is_ok());
    }

    #[test]
    fn lost_requires_reason() {
        assert!(matches!(
            check_seller_transition(SellerLeadStatus::New, SellerLeadStatus::Lost, None),
            Err(AppError::FieldValidationError(_))
        ));
    }
}
