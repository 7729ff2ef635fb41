// src/db/activity_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::activity::{
        Communication, CommunicationChannel, CommunicationDirection, EntityKind, NewTask, Note, Task,
        TaskFilter, TaskPriority, TaskStatus,
    },
};

#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
}

#[derive(Clone, Default)]
pub struct ActivityRepository;

impl ActivityRepository {
    pub fn new() -> Self {
        Self
    }

    /// A entidade referenciada por uma nota/comunicação existe?
    pub async fn entity_exists<'e, E>(&self, executor: E, kind: EntityKind, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Nome da tabela vem de um enum fechado, nunca do cliente
        let sql = if kind.soft_deletes() {
            format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND deleted_at IS NULL)", kind.table())
        } else {
            format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", kind.table())
        };
        let exists = sqlx::query_scalar::<_, bool>(&sql).bind(id).fetch_one(executor).await?;
        Ok(exists)
    }

    // =========================================================================
    //  NOTAS
    // =========================================================================

    pub async fn create_note<'e, E>(
        &self,
        executor: E,
        entity_type: EntityKind,
        entity_id: Uuid,
        author_id: Uuid,
        body: &str,
        is_pinned: bool,
    ) -> Result<Note, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (entity_type, entity_id, author_id, body, is_pinned)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(author_id)
        .bind(body)
        .bind(is_pinned)
        .fetch_one(executor)
        .await?;
        Ok(note)
    }

    pub async fn find_note<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Note>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(note)
    }

    // Fixadas primeiro, depois as mais recentes
    pub async fn list_notes<'e, E>(&self, executor: E, entity_type: EntityKind, entity_id: Uuid) -> Result<Vec<Note>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT * FROM notes
            WHERE entity_type = $1 AND entity_id = $2 AND deleted_at IS NULL
            ORDER BY is_pinned DESC, created_at DESC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(executor)
        .await?;
        Ok(notes)
    }

    pub async fn update_note<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        body: Option<&str>,
        is_pinned: Option<bool>,
    ) -> Result<Option<Note>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes SET
                body = COALESCE($2, body),
                is_pinned = COALESCE($3, is_pinned),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(body)
        .bind(is_pinned)
        .fetch_optional(executor)
        .await?;
        Ok(note)
    }

    pub async fn soft_delete_note<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE notes SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  COMUNICAÇÕES
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_communication<'e, E>(
        &self,
        executor: E,
        entity_type: EntityKind,
        entity_id: Uuid,
        member_id: Uuid,
        channel: CommunicationChannel,
        direction: CommunicationDirection,
        summary: &str,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<Communication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let communication = sqlx::query_as::<_, Communication>(
            r#"
            INSERT INTO communications (entity_type, entity_id, member_id, channel, direction, summary, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING *
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(member_id)
        .bind(channel)
        .bind(direction)
        .bind(summary)
        .bind(occurred_at)
        .fetch_one(executor)
        .await?;
        Ok(communication)
    }

    pub async fn list_communications<'e, E>(
        &self,
        executor: E,
        entity_type: EntityKind,
        entity_id: Uuid,
    ) -> Result<Vec<Communication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, Communication>(
            r#"
            SELECT * FROM communications
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY occurred_at DESC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn create_task<'e, E>(&self, executor: E, task: &NewTask) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, assigned_to, created_by, entity_type, entity_id, due_at, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&task.title)
        .bind(task.description.as_deref())
        .bind(task.assigned_to)
        .bind(task.created_by)
        .bind(task.entity_type)
        .bind(task.entity_id)
        .bind(task.due_at)
        .bind(task.priority)
        .fetch_one(executor)
        .await?;
        Ok(task)
    }

    pub async fn find_task<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn list_tasks<'e, A>(
        &self,
        conn: A,
        filter: &TaskFilter,
        page: &PageParams,
    ) -> Result<(Vec<Task>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks WHERE deleted_at IS NULL");
        push_task_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM tasks WHERE deleted_at IS NULL");
        push_task_filters(&mut query, filter);
        query
            .push(" ORDER BY due_at ASC NULLS LAST, created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let tasks = query.build_query_as::<Task>().fetch_all(&mut *conn).await?;

        Ok((tasks, total))
    }

    pub async fn update_task<'e, E>(&self, executor: E, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                assigned_to = COALESCE($4, assigned_to),
                due_at = COALESCE($5, due_at),
                priority = COALESCE($6, priority),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.assigned_to)
        .bind(changes.due_at)
        .bind(changes.priority)
        .fetch_optional(executor)
        .await?;
        Ok(task)
    }

    pub async fn set_task_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                status = $3,
                completed_at = CASE WHEN $3 = 'done'::task_status THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await?;
        Ok(task)
    }

    pub async fn soft_delete_task<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE tasks SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_task_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(assigned_to) = filter.assigned_to {
        qb.push(" AND assigned_to = ").push_bind(assigned_to);
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ").push_bind(priority);
    }
    if let Some(entity_type) = filter.entity_type {
        qb.push(" AND entity_type = ").push_bind(entity_type);
    }
    if let Some(entity_id) = filter.entity_id {
        qb.push(" AND entity_id = ").push_bind(entity_id);
    }
    if filter.overdue {
        qb.push(" AND due_at < NOW() AND status IN ('open', 'in_progress')");
    }
}
