// src/services/automation_service.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    db::{ActivityRepository, AutomationRepository, TeamRepository},
    models::{
        activity::{NewTask, TaskPriority},
        automation::{
            config_matches, render_template, AutomationAction, AutomationContext, AutomationEvent,
            AutomationRule, CreateAutomationPayload, CreateTaskConfig, NotifyMemberConfig,
            NotifyRoleConfig, UpdateAutomationPayload,
        },
        notification::{NewNotification, NotificationKind},
        team::Role,
    },
    services::notification_service::NotificationService,
};

/// O que uma regra vai fazer, já com os textos renderizados.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    NotifyMember { member_id: Uuid, title: String, body: String },
    NotifyRole { role: Role, title: String, body: String },
    CreateTask { assigned_to: Uuid, title: String, due_at: Option<DateTime<Utc>> },
}

/// Traduz a regra em ação concreta. `Err` descreve por que a regra não se aplica.
pub fn plan_action(
    rule: &AutomationRule,
    event: AutomationEvent,
    ctx: &AutomationContext,
    now: DateTime<Utc>,
) -> Result<PlannedAction, String> {
    match rule.action {
        AutomationAction::NotifyMember => {
            let cfg: NotifyMemberConfig =
                serde_json::from_value(rule.config.clone()).map_err(|e| e.to_string())?;
            let member_id = cfg
                .member_id
                .or(ctx.primary_member)
                .ok_or_else(|| "nenhum membro para notificar".to_string())?;
            Ok(PlannedAction::NotifyMember {
                member_id,
                title: render_template(&cfg.title, event, ctx),
                body: render_template(&cfg.body, event, ctx),
            })
        }
        AutomationAction::NotifyRole => {
            let cfg: NotifyRoleConfig =
                serde_json::from_value(rule.config.clone()).map_err(|e| e.to_string())?;
            Ok(PlannedAction::NotifyRole {
                role: cfg.role,
                title: render_template(&cfg.title, event, ctx),
                body: render_template(&cfg.body, event, ctx),
            })
        }
        AutomationAction::CreateTask => {
            let cfg: CreateTaskConfig =
                serde_json::from_value(rule.config.clone()).map_err(|e| e.to_string())?;
            let assigned_to = ctx
                .primary_member
                .ok_or_else(|| "evento sem responsável para a tarefa".to_string())?;
            // Regras antigas podem ter prazo fora do limite atual
            let due_at = match cfg.due_in_hours {
                Some(h) => Some(
                    Duration::try_hours(h)
                        .and_then(|d| now.checked_add_signed(d))
                        .ok_or_else(|| format!("prazo inválido: {} horas", h))?,
                ),
                None => None,
            };
            Ok(PlannedAction::CreateTask {
                assigned_to,
                title: render_template(&cfg.title, event, ctx),
                due_at,
            })
        }
    }
}

#[derive(Clone)]
pub struct AutomationService {
    repo: AutomationRepository,
    team_repo: TeamRepository,
    activity_repo: ActivityRepository,
    notification_service: NotificationService,
    pool: PgPool,
}

impl AutomationService {
    pub fn new(
        repo: AutomationRepository,
        team_repo: TeamRepository,
        activity_repo: ActivityRepository,
        notification_service: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self { repo, team_repo, activity_repo, notification_service, pool }
    }

    // =========================================================================
    //  DISPARO
    // =========================================================================

    /// Executa as regras ativas do evento. Nunca falha: cada regra com
    /// problema é registrada em log e ignorada.
    pub async fn fire(&self, event: AutomationEvent, ctx: AutomationContext) {
        let rules = match self.repo.list_active_for_event(&self.pool, event).await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(event = event.as_str(), "Falha ao carregar automações: {}", e);
                return;
            }
        };

        let now = Utc::now();
        for rule in rules {
            let result = match plan_action(&rule, event, &ctx, now) {
                Ok(action) => self.execute(action, &ctx).await,
                Err(reason) => Err(AppError::InternalServerError(anyhow::anyhow!(reason))),
            };

            match result {
                Ok(()) => tracing::debug!(rule_id = %rule.id, event = event.as_str(), "Automação executada"),
                Err(e) => tracing::warn!(
                    rule_id = %rule.id,
                    rule = %rule.name,
                    event = event.as_str(),
                    "Automação ignorada: {}",
                    e
                ),
            }
        }
    }

    async fn execute(&self, action: PlannedAction, ctx: &AutomationContext) -> Result<(), AppError> {
        match action {
            PlannedAction::NotifyMember { member_id, title, body } => {
                self.notification_service
                    .notify(
                        &self.pool,
                        NewNotification::new(member_id, NotificationKind::Automation, title, body)
                            .about(ctx.entity_type, ctx.entity_id),
                    )
                    .await?;
            }
            PlannedAction::NotifyRole { role, title, body } => {
                let members = self.team_repo.list_active_by_role(&self.pool, role).await?;
                for member in members {
                    self.notification_service
                        .notify(
                            &self.pool,
                            NewNotification::new(member.id, NotificationKind::Automation, title.clone(), body.clone())
                                .about(ctx.entity_type, ctx.entity_id),
                        )
                        .await?;
                }
            }
            PlannedAction::CreateTask { assigned_to, title, due_at } => {
                let task = NewTask {
                    title,
                    description: None,
                    assigned_to,
                    created_by: None,
                    entity_type: Some(ctx.entity_type),
                    entity_id: Some(ctx.entity_id),
                    due_at,
                    priority: TaskPriority::Normal,
                };
                self.activity_repo.create_task(&self.pool, &task).await?;
            }
        }
        Ok(())
    }

    // =========================================================================
    //  CRUD DE REGRAS (ADMIN)
    // =========================================================================

    pub async fn create_rule(&self, admin_id: Uuid, payload: &CreateAutomationPayload) -> Result<AutomationRule, AppError> {
        if !config_matches(payload.action, &payload.config) {
            return Err(AppError::field("config", "invalid_config"));
        }

        let rule = self
            .repo
            .create(
                &self.pool,
                payload.name.trim(),
                payload.event,
                payload.action,
                &payload.config,
                payload.is_active,
                admin_id,
            )
            .await?;

        tracing::info!(rule_id = %rule.id, event = rule.event.as_str(), "Automação criada");
        Ok(rule)
    }

    pub async fn list_rules(&self, event: Option<AutomationEvent>) -> Result<Vec<AutomationRule>, AppError> {
        self.repo.list(&self.pool, event).await
    }

    pub async fn get_rule(&self, id: Uuid) -> Result<AutomationRule, AppError> {
        found(self.repo.find_by_id(&self.pool, id).await?, "automation")
    }

    pub async fn update_rule(&self, id: Uuid, payload: &UpdateAutomationPayload) -> Result<AutomationRule, AppError> {
        let current = self.get_rule(id).await?;

        if let Some(config) = &payload.config {
            if !config_matches(current.action, config) {
                return Err(AppError::field("config", "invalid_config"));
            }
        }

        let name = payload.name.as_deref().map(str::trim);
        found(
            self.repo
                .update(&self.pool, id, name, payload.config.as_ref(), payload.is_active)
                .await?,
            "automation",
        )
    }

    pub async fn delete_rule(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("automation"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::EntityKind;
    use serde_json::{json, Value};

    fn rule(action: AutomationAction, config: Value) -> AutomationRule {
        AutomationRule {
            id: Uuid::new_v4(),
            name: "regra".to_string(),
            event: AutomationEvent::OfferReceived,
            action,
            config,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn notify_member_falls_back_to_primary_member() {
        let agent = Uuid::new_v4();
        let offer = Uuid::new_v4();
        let ctx = AutomationContext::new(EntityKind::Offer, offer, Some(agent));
        let r = rule(
            AutomationAction::NotifyMember,
            json!({ "title": "Nova proposta", "body": "Proposta {entityId}" }),
        );

        let planned = plan_action(&r, AutomationEvent::OfferReceived, &ctx, Utc::now()).unwrap();
        assert_eq!(
            planned,
            PlannedAction::NotifyMember {
                member_id: agent,
                title: "Nova proposta".to_string(),
                body: format!("Proposta {}", offer),
            }
        );
    }

    #[test]
    fn notify_member_without_target_is_skipped() {
        let ctx = AutomationContext::new(EntityKind::Lead, Uuid::new_v4(), None);
        let r = rule(AutomationAction::NotifyMember, json!({ "title": "t", "body": "b" }));
        assert!(plan_action(&r, AutomationEvent::LeadCreated, &ctx, Utc::now()).is_err());
    }

    #[test]
    fn create_task_computes_due_date() {
        let now = Utc::now();
        let agent = Uuid::new_v4();
        let ctx = AutomationContext::new(EntityKind::Visit, Uuid::new_v4(), Some(agent));
        let r = rule(
            AutomationAction::CreateTask,
            json!({ "title": "Ligar após {event}", "dueInHours": 24 }),
        );

        match plan_action(&r, AutomationEvent::VisitCompleted, &ctx, now).unwrap() {
            PlannedAction::CreateTask { assigned_to, title, due_at } => {
                assert_eq!(assigned_to, agent);
                assert_eq!(title, "Ligar após visit_completed");
                assert_eq!(due_at, Some(now + Duration::hours(24)));
            }
            other => panic!("ação inesperada: {:?}", other),
        }
    }

    #[test]
    fn out_of_range_deadline_is_skipped_without_panicking() {
        let ctx = AutomationContext::new(EntityKind::Visit, Uuid::new_v4(), Some(Uuid::new_v4()));
        let r = rule(
            AutomationAction::CreateTask,
            json!({ "title": "Ligar", "dueInHours": 9_000_000_000_000_000_i64 }),
        );
        let result = std::panic::catch_unwind(|| {
            plan_action(&r, AutomationEvent::VisitCompleted, &ctx, Utc::now())
        });
        assert!(matches!(result, Ok(Err(_))));
    }

    #[test]
    fn malformed_config_is_reported() {
        let ctx = AutomationContext::new(EntityKind::Lead, Uuid::new_v4(), None);
        let r = rule(AutomationAction::NotifyRole, json!({ "role": "gerente" }));
        assert!(plan_action(&r, AutomationEvent::LeadCreated, &ctx, Utc::now()).is_err());
    }
}
