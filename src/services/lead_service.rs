// src/services/lead_service.rs

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
        lead_repo::{LeadChanges, NewLead},
        ContactRepository, LeadRepository,
    },
    models::{
        activity::EntityKind,
        automation::{AutomationContext, AutomationEvent},
        lead::{
            budget_in_range, CreateLeadPayload, Lead, LeadFilter, LeadSource, LeadStatus, LeadStatusPayload,
            LeadSummary, UpdateLeadPayload,
        },
        notification::{NewNotification, NotificationKind},
        team::{Role, TeamMember},
    },
    services::{
        automation_service::AutomationService, contact_service::resolve_contact,
        notification_service::NotificationService,
    },
};

/// Regras de troca manual de status: tabela de transições + motivo de perda.
pub fn check_lead_transition(current: LeadStatus, next: LeadStatus, lost_reason: Option<&str>) -> Result<(), AppError> {
    if !current.can_transition_to(next) {
        return Err(AppError::transition("lead", current, next));
    }
    if next == LeadStatus::Lost && lost_reason.map(str::trim).is_none_or(str::is_empty) {
        return Err(AppError::field("lostReason", "lost_reason_required"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    contact_repo: ContactRepository,
    notification_service: NotificationService,
    automation_service: AutomationService,
    pool: PgPool,
}

impl LeadService {
    pub fn new(
        repo: LeadRepository,
        contact_repo: ContactRepository,
        notification_service: NotificationService,
        automation_service: AutomationService,
        pool: PgPool,
    ) -> Self {
        Self { repo, contact_repo, notification_service, automation_service, pool }
    }

    pub async fn create(&self, creator: &TeamMember, payload: &CreateLeadPayload) -> Result<Lead, AppError> {
        if !budget_in_range(payload.budget_min, payload.budget_max) {
            return Err(AppError::field("budgetMax", "budget_range"));
        }

        // Corretor de compradores cadastrando lead fica como responsável
        let assigned_to = payload
            .assigned_to
            .or((creator.role == Role::BuyerAgent).then_some(creator.id));

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
                &NewLead {
                    contact_id: contact.id,
                    assigned_to,
                    source: payload.source.unwrap_or(LeadSource::Other),
                    budget_min: payload.budget_min,
                    budget_max: payload.budget_max,
                    requirements: payload.requirements.clone().unwrap_or_else(|| json!({})),
                    next_follow_up_at: payload.next_follow_up_at,
                },
            )
            .await?;

        if let Some(member_id) = assigned_to.filter(|id| *id != creator.id) {
            self.notify_assignment(&mut *tx, member_id, &lead, &contact.full_name).await?;
        }

        tx.commit().await?;

        tracing::info!(lead_id = %lead.id, contact_id = %contact.id, "Lead criado");

        self.automation_service
            .fire(
                AutomationEvent::LeadCreated,
                AutomationContext::new(EntityKind::Lead, lead.id, lead.assigned_to),
            )
            .await;

        Ok(lead)
    }

    pub async fn list(&self, filter: &LeadFilter, page: &PageParams) -> Result<Paginated<LeadSummary>, AppError> {
        let (leads, total) = self.repo.list(&self.pool, filter, page).await?;
        Ok(Paginated::new(leads, page, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<LeadSummary, AppError> {
        found(self.repo.find_summary(&self.pool, id).await?, "lead")
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateLeadPayload) -> Result<Lead, AppError> {
        let current = found(self.repo.find_by_id(&self.pool, id).await?, "lead")?;

        // Confere a faixa resultante (novo valor ou o atual)
        let min = payload.budget_min.or(current.budget_min);
        let max = payload.budget_max.or(current.budget_max);
        if !budget_in_range(min, max) {
            return Err(AppError::field("budgetMax", "budget_range"));
        }

        let changes = LeadChanges {
            source: payload.source,
            budget_min: payload.budget_min,
            budget_max: payload.budget_max,
            requirements: payload.requirements.clone(),
            next_follow_up_at: payload.next_follow_up_at,
        };
        found(self.repo.update(&self.pool, id, &changes).await?, "lead")
    }

    pub async fn change_status(&self, id: Uuid, payload: &LeadStatusPayload) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "lead")?;
        check_lead_transition(current.status, payload.status, payload.lost_reason.as_deref())?;

        let lead = found(
            self.repo
                .set_status(&mut *tx, id, payload.status, payload.lost_reason.as_deref().map(str::trim))
                .await?,
            "lead",
        )?;

        tx.commit().await?;

        tracing::info!(
            lead_id = %id,
            from = current.status.as_str(),
            to = lead.status.as_str(),
            "Status do lead alterado"
        );

        self.automation_service
            .fire(
                AutomationEvent::LeadStatusChanged,
                AutomationContext::new(EntityKind::Lead, lead.id, lead.assigned_to),
            )
            .await;

        Ok(lead)
    }

    pub async fn assign(&self, id: Uuid, member_id: Option<Uuid>, by: &TeamMember) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let summary = found(self.repo.find_summary(&mut *tx, id).await?, "lead")?;
        let lead = found(self.repo.assign(&mut *tx, id, member_id).await?, "lead")?;

        if let Some(member_id) = member_id.filter(|m| *m != by.id) {
            self.notify_assignment(&mut *tx, member_id, &lead, &summary.contact_name).await?;
        }

        tx.commit().await?;
        Ok(lead)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.soft_delete(&self.pool, id).await? {
            return Err(AppError::NotFound("lead"));
        }
        Ok(())
    }

    async fn notify_assignment(
        &self,
        conn: &mut sqlx::PgConnection,
        member_id: Uuid,
        lead: &Lead,
        contact_name: &str,
    ) -> Result<(), AppError> {
        self.notification_service
            .notify(
                conn,
                NewNotification::new(
                    member_id,
                    NotificationKind::LeadAssigned,
                    "Novo lead atribuído",
                    format!("Você é o responsável pelo lead de {}", contact_name),
                )
                .about(EntityKind::Lead, lead.id),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_requires_reason() {
        let err = check_lead_transition(LeadStatus::Contacted, LeadStatus::Lost, Some("  ")).unwrap_err();
        assert!(matches!(err, AppError::FieldValidationError(ref f) if f["lostReason"] == "lost_reason_required"));
        assert!(check_lead_transition(LeadStatus::Contacted, LeadStatus::Lost, Some("Comprou com outro")).is_ok());
    }

    #[test]
    fn rejects_transitions_outside_the_table() {
        assert!(matches!(
            check_lead_transition(LeadStatus::New, LeadStatus::Won, None),
            Err(AppError::InvalidStatusTransition { .. })
        ));
        assert!(matches!(
            check_lead_transition(LeadStatus::Qualified, LeadStatus::Qualified, None),
            Err(AppError::InvalidStatusTransition { .. })
        ));
        assert!(check_lead_transition(LeadStatus::Lost, LeadStatus::New, None).is_ok());
    }
}
