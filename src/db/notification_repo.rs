// src/db/notification_repo.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::notification::{NewNotification, Notification},
};

#[derive(Clone, Default)]
pub struct NotificationRepository;

impl NotificationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewNotification) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (member_id, kind, title, body, entity_type, entity_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.member_id)
        .bind(new.kind)
        .bind(&new.title)
        .bind(&new.body)
        .bind(new.entity_type)
        .bind(new.entity_id)
        .fetch_one(executor)
        .await?;
        Ok(notification)
    }

    pub async fn list_for_member<'e, A>(
        &self,
        conn: A,
        member_id: Uuid,
        unread_only: bool,
        page: &PageParams,
    ) -> Result<(Vec<Notification>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE member_id = $1 AND (NOT $2 OR read_at IS NULL)",
        )
        .bind(member_id)
        .bind(unread_only)
        .fetch_one(&mut *conn)
        .await?;

        let items = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE member_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(member_id)
        .bind(unread_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;

        Ok((items, total))
    }

    pub async fn unread_count<'e, E>(&self, executor: E, member_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE member_id = $1 AND read_at IS NULL",
        )
        .bind(member_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Marca como lida somente se pertencer ao membro.
    pub async fn mark_read<'e, E>(&self, executor: E, id: Uuid, member_id: Uuid) -> Result<Option<Notification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND member_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(member_id)
        .fetch_optional(executor)
        .await?;
        Ok(notification)
    }

    pub async fn mark_all_read<'e, E>(&self, executor: E, member_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() WHERE member_id = $1 AND read_at IS NULL",
        )
        .bind(member_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
