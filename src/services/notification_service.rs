// src/services/notification_service.rs

use async_trait::async_trait;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::NotificationRepository,
    models::notification::{NewNotification, Notification},
};

/// Canal externo de entrega (SMS, WhatsApp, e-mail...).
/// Hoje só existe o `LogChannel`; provedores reais entram aqui.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn deliver(&self, recipient: &str, message: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn deliver(&self, recipient: &str, message: &str) -> anyhow::Result<()> {
        tracing::info!(recipient = %recipient, "📨 Mensagem enviada: {}", message);
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    pub async fn notify<'e, E>(&self, executor: E, new: NewNotification) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = self.repo.create(executor, &new).await?;
        tracing::debug!(
            member_id = %notification.member_id,
            kind = ?notification.kind,
            "Notificação criada"
        );
        Ok(notification)
    }

    pub async fn list_mine<'e, A>(
        &self,
        conn: A,
        member_id: Uuid,
        unread_only: bool,
        page: &PageParams,
    ) -> Result<Paginated<Notification>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (items, total) = self.repo.list_for_member(conn, member_id, unread_only, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn unread_count<'e, E>(&self, executor: E, member_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.unread_count(executor, member_id).await
    }

    /// Notificação de outro membro responde 404, nunca 403.
    pub async fn mark_read<'e, E>(&self, executor: E, id: Uuid, member_id: Uuid) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .mark_read(executor, id, member_id)
            .await?
            .ok_or(AppError::NotFound("notification"))
    }

    pub async fn mark_all_read<'e, E>(&self, executor: E, member_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.mark_all_read(executor, member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_channel_always_delivers() {
        let channel: Box<dyn NotificationChannel> = Box::new(LogChannel);
        assert!(channel.deliver("+5511987654321", "Seu código: 123456").await.is_ok());
    }
}
