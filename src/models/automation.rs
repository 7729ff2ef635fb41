// src/models/automation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{activity::EntityKind, team::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "automation_event", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AutomationEvent {
    LeadCreated,
    LeadStatusChanged,
    VisitScheduled,
    VisitCompleted,
    OfferReceived,
    ListingApproved,
}

impl AutomationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationEvent::LeadCreated => "lead_created",
            AutomationEvent::LeadStatusChanged => "lead_status_changed",
            AutomationEvent::VisitScheduled => "visit_scheduled",
            AutomationEvent::VisitCompleted => "visit_completed",
            AutomationEvent::OfferReceived => "offer_received",
            AutomationEvent::ListingApproved => "listing_approved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "automation_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AutomationAction {
    NotifyMember,
    NotifyRole,
    CreateTask,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRule {
    pub id: Uuid,
    #[schema(example = "Avisar gerente quando proposta chegar")]
    pub name: String,
    pub event: AutomationEvent,
    pub action: AutomationAction,
    // Ex: { "role": "admin", "title": "Nova proposta", "body": "Proposta {entityId}" }
    pub config: Value,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Configurações tipadas por ação ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyMemberConfig {
    pub member_id: Option<Uuid>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRoleConfig {
    pub role: Role,
    pub title: String,
    pub body: String,
}

/// Prazo máximo de uma tarefa automática (um ano).
pub const MAX_DUE_IN_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskConfig {
    pub title: String,
    pub due_in_hours: Option<i64>,
}

/// Verifica se o JSON de configuração é compatível com a ação.
pub fn config_matches(action: AutomationAction, config: &Value) -> bool {
    match action {
        AutomationAction::NotifyMember => {
            serde_json::from_value::<NotifyMemberConfig>(config.clone()).is_ok()
        }
        AutomationAction::NotifyRole => {
            serde_json::from_value::<NotifyRoleConfig>(config.clone()).is_ok()
        }
        AutomationAction::CreateTask => serde_json::from_value::<CreateTaskConfig>(config.clone())
            .is_ok_and(|cfg| {
                cfg.due_in_hours
                    .is_none_or(|h| (0..=MAX_DUE_IN_HOURS).contains(&h))
            }),
    }
}

/// Dados do evento disparado
#[derive(Debug, Clone)]
pub struct AutomationContext {
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
    /// Membro principal do evento (responsável pelo lead, corretor de campo...)
    pub primary_member: Option<Uuid>,
}

impl AutomationContext {
    pub fn new(entity_type: EntityKind, entity_id: Uuid, primary_member: Option<Uuid>) -> Self {
        Self { entity_type, entity_id, primary_member }
    }
}

/// Substitui `{entityId}` e `{event}` no texto.
pub fn render_template(template: &str, event: AutomationEvent, ctx: &AutomationContext) -> String {
    template
        .replace("{entityId}", &ctx.entity_id.to_string())
        .replace("{event}", event.as_str())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutomationPayload {
    #[validate(length(min = 3, max = 120, message = "invalid_length"))]
    pub name: String,
    pub event: AutomationEvent,
    pub action: AutomationAction,
    pub config: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutomationPayload {
    #[validate(length(min = 3, max = 120, message = "invalid_length"))]
    pub name: Option<String>,
    pub config: Option<Value>,
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AutomationFilter {
    pub event: Option<AutomationEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_placeholders() {
        let id = Uuid::new_v4();
        let ctx = AutomationContext::new(EntityKind::Offer, id, None);
        let out = render_template("Evento {event} em {entityId}", AutomationEvent::OfferReceived, &ctx);
        assert_eq!(out, format!("Evento offer_received em {}", id));
    }

    #[test]
    fn validates_config_per_action() {
        assert!(config_matches(
            AutomationAction::NotifyRole,
            &json!({ "role": "admin", "title": "t", "body": "b" })
        ));
        assert!(!config_matches(
            AutomationAction::NotifyRole,
            &json!({ "role": "chefe", "title": "t", "body": "b" })
        ));
        assert!(config_matches(AutomationAction::CreateTask, &json!({ "title": "Ligar" })));
        assert!(config_matches(
            AutomationAction::NotifyMember,
            &json!({ "title": "t", "body": "b" })
        ));
        assert!(!config_matches(AutomationAction::CreateTask, &json!({})));
    }

    #[test]
    fn task_deadline_must_be_within_a_year() {
        let due = |h: i64| json!({ "title": "Ligar", "dueInHours": h });
        assert!(config_matches(AutomationAction::CreateTask, &due(0)));
        assert!(config_matches(AutomationAction::CreateTask, &due(MAX_DUE_IN_HOURS)));
        assert!(!config_matches(AutomationAction::CreateTask, &due(-1)));
        assert!(!config_matches(AutomationAction::CreateTask, &due(MAX_DUE_IN_HOURS + 1)));
        assert!(!config_matches(AutomationAction::CreateTask, &due(9_000_000_000_000_000)));
    }
}
