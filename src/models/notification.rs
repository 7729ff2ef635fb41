// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use crate::models::activity::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LeadAssigned,
    VisitScheduled,
    VisitConfirmed,
    VisitCompleted,
    OfferReceived,
    OfferUpdated,
    ListingApproved,
    ListingRejected,
    TaskAssigned,
    CoinsAwarded,
    Automation,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub member_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notificação a ser criada (interna, nunca vem da API)
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub member_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
}

impl NewNotification {
    pub fn new(member_id: Uuid, kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            member_id,
            kind,
            title: title.into(),
            body: body.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    pub fn about(mut self, entity_type: EntityKind, entity_id: Uuid) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_attaches_entity() {
        let member = Uuid::new_v4();
        let visit = Uuid::new_v4();
        let n = NewNotification::new(member, NotificationKind::VisitConfirmed, "Visita", "Confirmada")
            .about(EntityKind::Visit, visit);
        assert_eq!(n.member_id, member);
        assert_eq!(n.entity_type, Some(EntityKind::Visit));
        assert_eq!(n.entity_id, Some(visit));
    }
}
