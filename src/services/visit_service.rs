// src/services/visit_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        status::StatusFlow,
    },
    db::{visit_repo::NewVisit, ContactRepository, LeadRepository, ListingRepository, VisitRepository},
    models::{
        activity::EntityKind,
        automation::{AutomationContext, AutomationEvent},
        coins::{AwardRef, RULE_VISIT_COMPLETED},
        lead::LeadStatus,
        notification::{NewNotification, NotificationKind},
        team::{Role, TeamMember},
        visit::{
            check_otp, slot_taken, CompleteVisitPayload, CreateTourPayload, RescheduleVisitPayload, ScheduleVisitPayload,
            TourDetail, TourFilter, TourStatus, Visit, VisitFilter, VisitStatus, VisitTour,
        },
    },
    services::{
        automation_service::AutomationService,
        coin_service::CoinService,
        notification_service::{NotificationChannel, NotificationService},
    },
};

/// OTP numérico com `length` dígitos (zeros à esquerda são válidos).
pub fn generate_otp(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn ensure_future(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if scheduled_at <= now {
        return Err(AppError::field("scheduledAt", "in_past"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct VisitService {
    repo: VisitRepository,
    lead_repo: LeadRepository,
    listing_repo: ListingRepository,
    contact_repo: ContactRepository,
    coin_service: CoinService,
    notification_service: NotificationService,
    automation_service: AutomationService,
    channel: Arc<dyn NotificationChannel>,
    otp_length: usize,
    otp_ttl_minutes: i64,
    pool: PgPool,
}

impl VisitService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo: VisitRepository,
        lead_repo: LeadRepository,
        listing_repo: ListingRepository,
        contact_repo: ContactRepository,
        coin_service: CoinService,
        notification_service: NotificationService,
        automation_service: AutomationService,
        channel: Arc<dyn NotificationChannel>,
        otp_length: usize,
        otp_ttl_minutes: i64,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            lead_repo,
            listing_repo,
            contact_repo,
            coin_service,
            notification_service,
            automation_service,
            channel,
            otp_length,
            otp_ttl_minutes,
            pool,
        }
    }

    // =========================================================================
    //  AGENDAMENTO
    // =========================================================================

    pub async fn schedule(&self, by: &TeamMember, payload: &ScheduleVisitPayload) -> Result<Visit, AppError> {
        ensure_future(payload.scheduled_at, Utc::now())?;

        let mut tx = self.pool.begin().await?;

        let lead = found(self.lead_repo.find_for_update(&mut *tx, payload.lead_id).await?, "lead")?;
        let listing = found(self.listing_repo.find_by_id(&mut *tx, payload.listing_id).await?, "listing")?;
        if !listing.status.is_available() {
            return Err(AppError::Conflict("listing_not_available"));
        }

        let tour = match payload.tour_id {
            Some(tour_id) => {
                let tour = found(self.repo.find_tour(&mut *tx, tour_id).await?, "tour")?;
                if tour.lead_id != lead.id || tour.status.is_terminal() {
                    return Err(AppError::Conflict("tour_visit_mismatch"));
                }
                Some(tour)
            }
            None => None,
        };

        let field_agent_id = payload
            .field_agent_id
            .or(tour.as_ref().map(|t| t.field_agent_id))
            .or((by.role == Role::FieldAgent).then_some(by.id));

        if let Some(agent_id) = field_agent_id {
            self.ensure_slot_free(&mut *tx, agent_id, payload.scheduled_at, None).await?;
        }

        let visit = self
            .repo
            .create(
                &mut *tx,
                &NewVisit {
                    lead_id: lead.id,
                    listing_id: listing.id,
                    field_agent_id,
                    buyer_agent_id: payload.buyer_agent_id.or(lead.assigned_to),
                    tour_id: tour.as_ref().map(|t| t.id),
                    scheduled_at: payload.scheduled_at,
                },
            )
            .await?;

        self.lead_repo
            .advance_status(&mut *tx, lead.id, &[LeadStatus::Qualified], LeadStatus::VisitScheduled)
            .await?;

        if let Some(agent_id) = field_agent_id.filter(|id| *id != by.id) {
            self.notification_service
                .notify(
                    &mut *tx,
                    NewNotification::new(
                        agent_id,
                        NotificationKind::VisitScheduled,
                        "Nova visita agendada",
                        format!("{} em {}", listing.title, visit.scheduled_at.format("%d/%m/%Y %H:%M")),
                    )
                    .about(EntityKind::Visit, visit.id),
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(visit_id = %visit.id, lead_id = %lead.id, listing_id = %listing.id, "📅 Visita agendada");

        self.automation_service
            .fire(
                AutomationEvent::VisitScheduled,
                AutomationContext::new(EntityKind::Visit, visit.id, visit.field_agent_id),
            )
            .await;

        Ok(visit)
    }

    /// Trava a agenda do corretor e recusa horários a menos de uma janela de outra visita.
    async fn ensure_slot_free(
        &self,
        conn: &mut PgConnection,
        field_agent_id: Uuid,
        scheduled_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<(), AppError> {
        self.repo.lock_agent_schedule(&mut *conn, field_agent_id).await?;
        let nearby = self
            .repo
            .active_times_near(&mut *conn, field_agent_id, scheduled_at, exclude)
            .await?;
        if slot_taken(&nearby, scheduled_at) {
            return Err(AppError::Conflict("visit_slot_taken"));
        }
        Ok(())
    }

    pub async fn list(&self, filter: &VisitFilter, page: &PageParams) -> Result<Paginated<Visit>, AppError> {
        let (visits, total) = self.repo.list(&self.pool, filter, page).await?;
        Ok(Paginated::new(visits, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Visit, AppError> {
        found(self.repo.find_by_id(&self.pool, id).await?, "visit")
    }

    // =========================================================================
    //  CONFIRMAÇÃO / REAGENDAMENTO / CANCELAMENTO
    // =========================================================================

    /// `pending -> confirmed`: gera o OTP e envia ao comprador.
    pub async fn confirm(&self, id: Uuid) -> Result<Visit, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_by_id(&mut *tx, id).await?, "visit")?;
        if !current.status.can_transition_to(VisitStatus::Confirmed) {
            return Err(AppError::transition("visit", current.status, VisitStatus::Confirmed));
        }

        let otp = generate_otp(self.otp_length);
        let visit = self
            .repo
            .confirm(&mut *tx, id, &otp)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        if let Some(agent_id) = visit.buyer_agent_id {
            self.notification_service
                .notify(
                    &mut *tx,
                    NewNotification::new(
                        agent_id,
                        NotificationKind::VisitConfirmed,
                        "Visita confirmada",
                        format!("Visita de {} confirmada", visit.scheduled_at.format("%d/%m/%Y %H:%M")),
                    )
                    .about(EntityKind::Visit, visit.id),
                )
                .await?;
        }

        // Falha no envio desfaz a confirmação
        self.deliver_otp(&mut *tx, &visit, &otp).await?;

        tx.commit().await?;
        tracing::info!(visit_id = %id, "Visita confirmada, OTP enviado");
        Ok(visit)
    }

    /// Gera outro OTP para uma visita confirmada (código expirado ou perdido).
    pub async fn resend_otp(&self, id: Uuid) -> Result<Visit, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_by_id(&mut *tx, id).await?, "visit")?;
        if current.status != VisitStatus::Confirmed {
            return Err(AppError::transition("visit", current.status, VisitStatus::Confirmed));
        }

        let otp = generate_otp(self.otp_length);
        let visit = self
            .repo
            .refresh_otp(&mut *tx, id, &otp)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        self.deliver_otp(&mut *tx, &visit, &otp).await?;

        tx.commit().await?;
        Ok(visit)
    }

    async fn deliver_otp(&self, conn: &mut PgConnection, visit: &Visit, otp: &str) -> Result<(), AppError> {
        let lead = found(self.lead_repo.find_by_id(&mut *conn, visit.lead_id).await?, "lead")?;
        let contact = found(self.contact_repo.find_by_id(&mut *conn, lead.contact_id).await?, "contact")?;

        let message = format!(
            "Olá {}! Sua visita está confirmada para {}. Código de confirmação: {}",
            contact.full_name,
            visit.scheduled_at.format("%d/%m/%Y %H:%M"),
            otp
        );
        self.channel.deliver(&contact.phone, &message).await?;
        Ok(())
    }

    pub async fn reschedule(&self, id: Uuid, payload: &RescheduleVisitPayload) -> Result<Visit, AppError> {
        ensure_future(payload.scheduled_at, Utc::now())?;

        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_by_id(&mut *tx, id).await?, "visit")?;
        if current.status.is_terminal() {
            return Err(AppError::transition("visit", current.status, VisitStatus::Pending));
        }

        if let Some(agent_id) = payload.field_agent_id.or(current.field_agent_id) {
            self.ensure_slot_free(&mut *tx, agent_id, payload.scheduled_at, Some(id)).await?;
        }

        let visit = self
            .repo
            .reschedule(&mut *tx, id, payload.scheduled_at, payload.field_agent_id)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        tx.commit().await?;
        tracing::info!(visit_id = %id, scheduled_at = %visit.scheduled_at, "Visita reagendada");
        Ok(visit)
    }

    pub async fn cancel(&self, id: Uuid, reason: &str) -> Result<Visit, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::field("reason", "reason_required"));
        }

        let current = found(self.repo.find_by_id(&self.pool, id).await?, "visit")?;
        if !current.status.can_transition_to(VisitStatus::Cancelled) {
            return Err(AppError::transition("visit", current.status, VisitStatus::Cancelled));
        }

        let visit = self
            .repo
            .cancel(&self.pool, id, reason)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        tracing::info!(visit_id = %id, "Visita cancelada");
        Ok(visit)
    }

    // =========================================================================
    //  CONCLUSÃO (OTP + GEOLOCALIZAÇÃO)
    // =========================================================================

    pub async fn complete(&self, id: Uuid, payload: &CompleteVisitPayload) -> Result<Visit, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_by_id(&mut *tx, id).await?, "visit")?;
        if current.status != VisitStatus::Confirmed {
            return Err(AppError::transition("visit", current.status, VisitStatus::Completed));
        }

        check_otp(
            current.otp_code.as_deref(),
            current.otp_generated_at,
            &payload.otp,
            self.otp_ttl_minutes,
            Utc::now(),
        )
        .map_err(AppError::Otp)?;

        // UPDATE condicionado a `confirmed`: a segunda conclusão simultânea cai aqui
        let visit = self
            .repo
            .complete(&mut *tx, id, &payload.completion())
            .await?
            .ok_or(AppError::Conflict("visit_already_completed"))?;

        if let Some(agent_id) = visit.buyer_agent_id {
            self.notification_service
                .notify(
                    &mut *tx,
                    NewNotification::new(
                        agent_id,
                        NotificationKind::VisitCompleted,
                        "Visita concluída",
                        visit.feedback.clone().unwrap_or_else(|| "Sem comentários".to_string()),
                    )
                    .about(EntityKind::Visit, visit.id),
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            visit_id = %id,
            lat = visit.completion_latitude,
            lng = visit.completion_longitude,
            "✅ Visita concluída"
        );

        self.coin_service
            .award_best_effort(
                visit.field_agent_id,
                RULE_VISIT_COMPLETED,
                AwardRef::new(EntityKind::Visit, visit.id),
            )
            .await;

        self.automation_service
            .fire(
                AutomationEvent::VisitCompleted,
                AutomationContext::new(
                    EntityKind::Visit,
                    visit.id,
                    visit.buyer_agent_id.or(visit.field_agent_id),
                ),
            )
            .await;

        Ok(visit)
    }

    // =========================================================================
    //  ROTEIROS
    // =========================================================================

    pub async fn create_tour(&self, payload: &CreateTourPayload) -> Result<VisitTour, AppError> {
        found(self.lead_repo.find_by_id(&self.pool, payload.lead_id).await?, "lead")?;

        let tour = self
            .repo
            .create_tour(
                &self.pool,
                payload.lead_id,
                payload.field_agent_id,
                payload.tour_date,
                payload.notes.as_deref(),
            )
            .await?;

        tracing::info!(tour_id = %tour.id, date = %tour.tour_date, "Roteiro criado");
        Ok(tour)
    }

    pub async fn list_tours(&self, filter: &TourFilter) -> Result<Vec<VisitTour>, AppError> {
        self.repo.list_tours(&self.pool, filter.field_agent_id, filter.from_date).await
    }

    pub async fn tour_detail(&self, id: Uuid) -> Result<TourDetail, AppError> {
        let tour = found(self.repo.find_tour(&self.pool, id).await?, "tour")?;
        let visits = self.repo.list_by_tour(&self.pool, id).await?;
        Ok(TourDetail { tour, visits })
    }

    pub async fn attach_visit(&self, tour_id: Uuid, visit_id: Uuid) -> Result<Visit, AppError> {
        let mut tx = self.pool.begin().await?;

        let tour = found(self.repo.find_tour(&mut *tx, tour_id).await?, "tour")?;
        let visit = found(self.repo.find_by_id(&mut *tx, visit_id).await?, "visit")?;

        if visit.lead_id != tour.lead_id || visit.status.is_terminal() || tour.status.is_terminal() {
            return Err(AppError::Conflict("tour_visit_mismatch"));
        }

        let visit = found(self.repo.attach_to_tour(&mut *tx, visit_id, Some(tour_id)).await?, "visit")?;
        tx.commit().await?;
        Ok(visit)
    }

    pub async fn detach_visit(&self, tour_id: Uuid, visit_id: Uuid) -> Result<Visit, AppError> {
        let visit = found(self.repo.find_by_id(&self.pool, visit_id).await?, "visit")?;
        if visit.tour_id != Some(tour_id) {
            return Err(AppError::NotFound("visit"));
        }
        found(self.repo.attach_to_tour(&self.pool, visit_id, None).await?, "visit")
    }

    pub async fn change_tour_status(&self, id: Uuid, to: TourStatus) -> Result<VisitTour, AppError> {
        let current = found(self.repo.find_tour(&self.pool, id).await?, "tour")?;
        if !current.status.can_transition_to(to) {
            return Err(AppError::transition("tour", current.status, to));
        }

        self.repo
            .set_tour_status(&self.pool, id, current.status, to)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn otp_has_requested_length_and_only_digits() {
        for length in [4, 6, 8] {
            let otp = generate_otp(length);
            assert_eq!(otp.len(), length);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn past_schedule_is_rejected() {
        let now = Utc::now();
        assert!(ensure_future(now + Duration::hours(2), now).is_ok());
        let err = ensure_future(now - Duration::minutes(1), now).unwrap_err();
        assert!(matches!(err, AppError::FieldValidationError(ref f) if f["scheduledAt"] == "in_past"));
        assert!(ensure_future(now, now).is_err());
    }
}
