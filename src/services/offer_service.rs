// src/services/offer_service.rs

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        status::StatusFlow,
    },
    db::{offer_repo::NewOffer, LeadRepository, ListingRepository, OfferRepository},
    models::{
        activity::EntityKind,
        automation::{AutomationContext, AutomationEvent},
        coins::{AwardRef, RULE_OFFER_ACCEPTED},
        lead::LeadStatus,
        listing::ListingStatus,
        notification::{NewNotification, NotificationKind},
        offer::{CreateOfferPayload, Offer, OfferFilter, OfferStatus, ReviseOfferPayload},
    },
    services::{
        automation_service::AutomationService, coin_service::CoinService,
        notification_service::NotificationService,
    },
};

/// Confere se a proposta pode ir para `to` e se ainda está dentro da validade.
pub fn check_offer_transition(offer: &Offer, to: OfferStatus, now: chrono::DateTime<Utc>) -> Result<(), AppError> {
    if !offer.status.can_transition_to(to) {
        return Err(AppError::transition("offer", offer.status, to));
    }
    if to == OfferStatus::Accepted && offer.is_expired(now) {
        return Err(AppError::Conflict("offer_expired"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct OfferService {
    repo: OfferRepository,
    lead_repo: LeadRepository,
    listing_repo: ListingRepository,
    coin_service: CoinService,
    notification_service: NotificationService,
    automation_service: AutomationService,
    pool: PgPool,
}

impl OfferService {
    pub fn new(
        repo: OfferRepository,
        lead_repo: LeadRepository,
        listing_repo: ListingRepository,
        coin_service: CoinService,
        notification_service: NotificationService,
        automation_service: AutomationService,
        pool: PgPool,
    ) -> Self {
        Self { repo, lead_repo, listing_repo, coin_service, notification_service, automation_service, pool }
    }

    pub async fn create(&self, payload: &CreateOfferPayload) -> Result<Offer, AppError> {
        if payload.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(AppError::field("expiresAt", "in_past"));
        }

        let mut tx = self.pool.begin().await?;

        let listing = found(self.listing_repo.find_by_id(&mut *tx, payload.listing_id).await?, "listing")?;
        if !listing.status.is_available() {
            return Err(AppError::Conflict("listing_not_available"));
        }
        let lead = found(self.lead_repo.find_for_update(&mut *tx, payload.lead_id).await?, "lead")?;

        let offer = self
            .repo
            .create(
                &mut *tx,
                &NewOffer {
                    listing_id: listing.id,
                    lead_id: lead.id,
                    buyer_agent_id: payload.buyer_agent_id.or(lead.assigned_to),
                    amount: payload.amount,
                    conditions: payload.conditions.clone(),
                    expires_at: payload.expires_at,
                },
            )
            .await?;

        self.lead_repo
            .advance_status(
                &mut *tx,
                lead.id,
                &[LeadStatus::Qualified, LeadStatus::VisitScheduled],
                LeadStatus::Negotiating,
            )
            .await?;

        self.notify(
            &mut *tx,
            listing.listing_agent_id,
            NotificationKind::OfferReceived,
            "Nova proposta recebida",
            format!("Proposta de {} para {}", offer.amount, listing.title),
            offer.id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(offer_id = %offer.id, listing_id = %listing.id, amount = %offer.amount, "💰 Proposta registrada");

        self.automation_service
            .fire(
                AutomationEvent::OfferReceived,
                AutomationContext::new(EntityKind::Offer, offer.id, Some(listing.listing_agent_id)),
            )
            .await;

        Ok(offer)
    }

    pub async fn list(&self, filter: &OfferFilter, page: &PageParams) -> Result<Paginated<Offer>, AppError> {
        let (offers, total) = self.repo.list(&self.pool, filter, page).await?;
        Ok(Paginated::new(offers, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Offer, AppError> {
        found(self.repo.find_by_id(&self.pool, id).await?, "offer")
    }

    /// Contraproposta do vendedor.
    pub async fn counter(&self, id: Uuid, counter_amount: rust_decimal::Decimal) -> Result<Offer, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "offer")?;
        check_offer_transition(&current, OfferStatus::Countered, Utc::now())?;

        let offer = self
            .repo
            .counter(&mut *tx, id, counter_amount)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        if let Some(agent_id) = offer.buyer_agent_id {
            self.notify(
                &mut *tx,
                agent_id,
                NotificationKind::OfferUpdated,
                "Contraproposta recebida",
                format!("O vendedor contrapropôs {}", counter_amount),
                offer.id,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(offer)
    }

    /// Comprador revisa o valor após a contraproposta.
    pub async fn revise(&self, id: Uuid, payload: &ReviseOfferPayload) -> Result<Offer, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "offer")?;
        check_offer_transition(&current, OfferStatus::Submitted, Utc::now())?;

        let offer = self
            .repo
            .revise(&mut *tx, id, payload.amount, payload.conditions.as_deref())
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        let listing = found(self.listing_repo.find_by_id(&mut *tx, offer.listing_id).await?, "listing")?;
        self.notify(
            &mut *tx,
            listing.listing_agent_id,
            NotificationKind::OfferUpdated,
            "Proposta revisada",
            format!("Novo valor: {}", offer.amount),
            offer.id,
        )
        .await?;

        tx.commit().await?;
        Ok(offer)
    }

    /// Aceite: fecha a proposta, recusa as concorrentes e reserva o anúncio.
    pub async fn accept(&self, id: Uuid) -> Result<Offer, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "offer")?;
        let now = Utc::now();

        // Vencida: registra a expiração antes de recusar o aceite
        if current.is_stale(now) {
            self.repo.close(&mut *tx, id, OfferStatus::Expired).await?;
            tx.commit().await?;
            tracing::info!(offer_id = %id, "Proposta vencida marcada como expirada");
            return Err(AppError::Conflict("offer_expired"));
        }
        check_offer_transition(&current, OfferStatus::Accepted, now)?;

        let listing = found(self.listing_repo.find_for_update(&mut *tx, current.listing_id).await?, "listing")?;
        if !listing.status.is_available() {
            return Err(AppError::Conflict("listing_not_available"));
        }

        let offer = self
            .repo
            .close(&mut *tx, id, OfferStatus::Accepted)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        let rejected = self.repo.reject_other_open(&mut *tx, listing.id, offer.id).await?;

        if listing.status == ListingStatus::Active {
            self.listing_repo
                .set_status(&mut *tx, listing.id, ListingStatus::Active, ListingStatus::UnderOffer)
                .await?
                .ok_or(AppError::Conflict("concurrent_update"))?;
        }

        if let Some(agent_id) = offer.buyer_agent_id {
            self.notify(
                &mut *tx,
                agent_id,
                NotificationKind::OfferUpdated,
                "Proposta aceita",
                format!("{} aceitou a proposta de {}", listing.title, offer.amount),
                offer.id,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            offer_id = %offer.id,
            listing_id = %listing.id,
            rejected_others = rejected.len(),
            "🤝 Proposta aceita"
        );

        self.coin_service
            .award_best_effort(
                offer.buyer_agent_id,
                RULE_OFFER_ACCEPTED,
                AwardRef::new(EntityKind::Offer, offer.id),
            )
            .await;

        Ok(offer)
    }

    pub async fn reject(&self, id: Uuid) -> Result<Offer, AppError> {
        self.close(id, OfferStatus::Rejected).await
    }

    pub async fn withdraw(&self, id: Uuid) -> Result<Offer, AppError> {
        self.close(id, OfferStatus::Withdrawn).await
    }

    async fn close(&self, id: Uuid, to: OfferStatus) -> Result<Offer, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "offer")?;
        check_offer_transition(&current, to, Utc::now())?;

        let offer = self
            .repo
            .close(&mut *tx, id, to)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        if let (OfferStatus::Rejected, Some(agent_id)) = (to, offer.buyer_agent_id) {
            self.notify(
                &mut *tx,
                agent_id,
                NotificationKind::OfferUpdated,
                "Proposta recusada",
                format!("A proposta de {} foi recusada", offer.amount),
                offer.id,
            )
            .await?;
        }

        tx.commit().await?;
        tracing::info!(offer_id = %id, status = to.as_str(), "Proposta encerrada");
        Ok(offer)
    }

    async fn notify(
        &self,
        conn: &mut PgConnection,
        member_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: String,
        offer_id: Uuid,
    ) -> Result<(), AppError> {
        self.notification_service
            .notify(conn, NewNotification::new(member_id, kind, title, body).about(EntityKind::Offer, offer_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn offer(status: OfferStatus, expires_in: Option<Duration>) -> Offer {
        let now = Utc::now();
        Offer {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            buyer_agent_id: None,
            amount: Decimal::new(75_000_000, 2),
            counter_amount: None,
            conditions: None,
            status,
            expires_at: expires_in.map(|d| now + d),
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn expired_offer_cannot_be_accepted() {
        let stale = offer(OfferStatus::Submitted, Some(Duration::hours(-1)));
        assert!(matches!(
            check_offer_transition(&stale, OfferStatus::Accepted, Utc::now()),
            Err(AppError::Conflict("offer_expired"))
        ));
        // Recusar uma proposta vencida continua permitido
        assert!(check_offer_transition(&stale, OfferStatus::Rejected, Utc::now()).is_ok());
    }

    #[test]
    fn closed_offer_rejects_further_moves() {
        let accepted = offer(OfferStatus::Accepted, None);
        assert!(matches!(
            check_offer_transition(&accepted, OfferStatus::Withdrawn, Utc::now()),
            Err(AppError::InvalidStatusTransition { .. })
        ));
        let countered = offer(OfferStatus::Countered, Some(Duration::days(3)));
        assert!(check_offer_transition(&countered, OfferStatus::Accepted, Utc::now()).is_ok());
    }
}
