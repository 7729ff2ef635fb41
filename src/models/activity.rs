// src/models/activity.rs
//
// Notas, comunicações e tarefas: tudo que fica "pendurado" em outra entidade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use validator::Validate;

use crate::status_flow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entity_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lead,
    SellerLead,
    Listing,
    Visit,
    Offer,
    Contact,
}

impl EntityKind {
    /// Nome usado nas mensagens de NotFound
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::SellerLead => "seller_lead",
            EntityKind::Listing => "listing",
            EntityKind::Visit => "visit",
            EntityKind::Offer => "offer",
            EntityKind::Contact => "contact",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Lead => "leads",
            EntityKind::SellerLead => "seller_leads",
            EntityKind::Listing => "listings",
            EntityKind::Visit => "visits",
            EntityKind::Offer => "offers",
            EntityKind::Contact => "contacts",
        }
    }

    /// Visitas e propostas não têm soft delete
    pub fn soft_deletes(&self) -> bool {
        !matches!(self, EntityKind::Visit | EntityKind::Offer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "communication_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommunicationChannel {
    Call,
    Whatsapp,
    Email,
    Sms,
    Meeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "communication_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommunicationDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
    Cancelled,
}

status_flow!(TaskStatus {
    Open => "open" => [InProgress, Done, Cancelled],
    InProgress => "in_progress" => [Open, Done, Cancelled],
    Done => "done" => [],
    Cancelled => "cancelled" => [],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
    pub author_id: Uuid,
    #[schema(example = "Cliente prefere andar alto, evitar face oeste.")]
    pub body: String,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: Uuid,
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
    pub member_id: Uuid,
    pub channel: CommunicationChannel,
    pub direction: CommunicationDirection,
    pub summary: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[schema(example = "Ligar para confirmar documentação")]
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub created_by: Option<Uuid>,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entidade "dona" de uma nota ou comunicação (query string)
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EntityRef {
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
    pub priority: Option<TaskPriority>,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
    /// Só tarefas vencidas (due_at < agora, ainda abertas)
    #[serde(default)]
    pub overdue: bool,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub created_by: Option<Uuid>,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotePayload {
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
    #[validate(length(min = 1, max = 5000, message = "invalid_length"))]
    pub body: String,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotePayload {
    #[validate(length(min = 1, max = 5000, message = "invalid_length"))]
    pub body: Option<String>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunicationPayload {
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
    pub channel: CommunicationChannel,
    pub direction: CommunicationDirection,
    #[validate(length(min = 1, max = 2000, message = "invalid_length"))]
    pub summary: String,
    /// Padrão: agora
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 2, max = 200, message = "invalid_length"))]
    pub title: String,
    pub description: Option<String>,
    /// Padrão: o próprio usuário
    pub assigned_to: Option<Uuid>,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    #[validate(length(min = 2, max = 200, message = "invalid_length"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusPayload {
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::status::StatusFlow;

    #[test]
    fn entity_kind_label_matches_serde() {
        for kind in [
            EntityKind::Lead,
            EntityKind::SellerLead,
            EntityKind::Listing,
            EntityKind::Visit,
            EntityKind::Offer,
            EntityKind::Contact,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
    }

    #[test]
    fn only_visits_and_offers_are_hard_rows() {
        assert!(EntityKind::Lead.soft_deletes());
        assert!(!EntityKind::Visit.soft_deletes());
        assert!(!EntityKind::Offer.soft_deletes());
    }

    #[test]
    fn done_tasks_stay_done() {
        assert!(TaskStatus::Open.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Open));
        assert!(TaskStatus::Done.is_terminal());
    }
}
