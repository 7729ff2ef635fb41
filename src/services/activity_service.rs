// src/services/activity_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        status::StatusFlow,
    },
    db::{activity_repo::TaskChanges, ActivityRepository, LeadRepository},
    models::{
        activity::{
            Communication, CreateCommunicationPayload, CreateNotePayload, CreateTaskPayload, EntityKind, EntityRef,
            NewTask, Note, Task, TaskFilter, TaskPriority, TaskStatus, UpdateNotePayload, UpdateTaskPayload,
        },
        lead::LeadStatus,
        notification::{NewNotification, NotificationKind},
        team::TeamMember,
    },
    services::notification_service::NotificationService,
};

/// Nota só pode ser alterada pelo autor ou por um admin.
pub fn can_moderate_note(note: &Note, member: &TeamMember) -> bool {
    note.author_id == member.id || member.role.is_admin()
}

#[derive(Clone)]
pub struct ActivityService {
    repo: ActivityRepository,
    lead_repo: LeadRepository,
    notification_service: NotificationService,
}

impl ActivityService {
    pub fn new(repo: ActivityRepository, lead_repo: LeadRepository, notification_service: NotificationService) -> Self {
        Self { repo, lead_repo, notification_service }
    }

    async fn ensure_entity<'e, E>(&self, executor: E, kind: EntityKind, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.entity_exists(executor, kind, id).await? {
            return Err(AppError::NotFound(kind.as_str()));
        }
        Ok(())
    }

    // =========================================================================
    //  NOTAS
    // =========================================================================

    pub async fn create_note<'e, A>(&self, conn: A, author: &TeamMember, payload: &CreateNotePayload) -> Result<Note, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        self.ensure_entity(&mut *conn, payload.entity_type, payload.entity_id).await?;

        self.repo
            .create_note(
                &mut *conn,
                payload.entity_type,
                payload.entity_id,
                author.id,
                payload.body.trim(),
                payload.is_pinned,
            )
            .await
    }

    pub async fn list_notes<'e, E>(&self, executor: E, entity: &EntityRef) -> Result<Vec<Note>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_notes(executor, entity.entity_type, entity.entity_id).await
    }

    pub async fn update_note<'e, A>(
        &self,
        conn: A,
        member: &TeamMember,
        id: Uuid,
        payload: &UpdateNotePayload,
    ) -> Result<Note, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let note = found(self.repo.find_note(&mut *conn, id).await?, "note")?;
        if !can_moderate_note(&note, member) {
            return Err(AppError::Forbidden("notes:moderate"));
        }

        found(
            self.repo
                .update_note(&mut *conn, id, payload.body.as_deref().map(str::trim), payload.is_pinned)
                .await?,
            "note",
        )
    }

    pub async fn delete_note<'e, A>(&self, conn: A, member: &TeamMember, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let note = found(self.repo.find_note(&mut *conn, id).await?, "note")?;
        if !can_moderate_note(&note, member) {
            return Err(AppError::Forbidden("notes:moderate"));
        }

        if !self.repo.soft_delete_note(&mut *conn, id).await? {
            return Err(AppError::NotFound("note"));
        }
        Ok(())
    }

    // =========================================================================
    //  COMUNICAÇÕES
    // =========================================================================

    /// Registra o contato. Lead ainda `new` passa a `contacted`.
    pub async fn log_communication<'e, A>(
        &self,
        conn: A,
        member: &TeamMember,
        payload: &CreateCommunicationPayload,
    ) -> Result<Communication, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        self.ensure_entity(&mut *tx, payload.entity_type, payload.entity_id).await?;

        let communication = self
            .repo
            .create_communication(
                &mut *tx,
                payload.entity_type,
                payload.entity_id,
                member.id,
                payload.channel,
                payload.direction,
                payload.summary.trim(),
                payload.occurred_at,
            )
            .await?;

        if payload.entity_type == EntityKind::Lead {
            let advanced = self
                .lead_repo
                .advance_status(&mut *tx, payload.entity_id, &[LeadStatus::New], LeadStatus::Contacted)
                .await?;
            if advanced {
                tracing::info!(lead_id = %payload.entity_id, "Lead marcado como contatado");
            }
        }

        tx.commit().await?;
        Ok(communication)
    }

    pub async fn list_communications<'e, E>(&self, executor: E, entity: &EntityRef) -> Result<Vec<Communication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_communications(executor, entity.entity_type, entity.entity_id).await
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn create_task<'e, A>(&self, conn: A, creator: &TeamMember, payload: &CreateTaskPayload) -> Result<Task, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // entityType e entityId andam juntos
        let entity = match (payload.entity_type, payload.entity_id) {
            (Some(kind), Some(id)) => Some((kind, id)),
            (None, None) => None,
            _ => return Err(AppError::field("entityId", "entity_ref_incomplete")),
        };

        let mut tx = conn.begin().await?;

        if let Some((kind, id)) = entity {
            self.ensure_entity(&mut *tx, kind, id).await?;
        }

        let assigned_to = payload.assigned_to.unwrap_or(creator.id);
        let task = self
            .repo
            .create_task(
                &mut *tx,
                &NewTask {
                    title: payload.title.trim().to_string(),
                    description: payload.description.clone(),
                    assigned_to,
                    created_by: Some(creator.id),
                    entity_type: payload.entity_type,
                    entity_id: payload.entity_id,
                    due_at: payload.due_at,
                    priority: payload.priority.unwrap_or(TaskPriority::Normal),
                },
            )
            .await?;

        if assigned_to != creator.id {
            self.notify_task(&mut *tx, &task).await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    pub async fn list_tasks<'e, A>(&self, conn: A, filter: &TaskFilter, page: &PageParams) -> Result<Paginated<Task>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (tasks, total) = self.repo.list_tasks(conn, filter, page).await?;
        Ok(Paginated::new(tasks, page, total))
    }

    pub async fn get_task<'e, E>(&self, executor: E, id: Uuid) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        found(self.repo.find_task(executor, id).await?, "task")
    }

    pub async fn update_task<'e, A>(
        &self,
        conn: A,
        by: &TeamMember,
        id: Uuid,
        payload: &UpdateTaskPayload,
    ) -> Result<Task, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut tx = conn.begin().await?;

        let current = found(self.repo.find_task(&mut *tx, id).await?, "task")?;

        let changes = TaskChanges {
            title: payload.title.as_deref().map(|t| t.trim().to_string()),
            description: payload.description.clone(),
            assigned_to: payload.assigned_to,
            due_at: payload.due_at,
            priority: payload.priority,
        };
        let task = found(self.repo.update_task(&mut *tx, id, &changes).await?, "task")?;

        // Reatribuição avisa o novo responsável
        if task.assigned_to != current.assigned_to && task.assigned_to != by.id {
            self.notify_task(&mut *tx, &task).await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    pub async fn change_task_status<'e, A>(&self, conn: A, id: Uuid, to: TaskStatus) -> Result<Task, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let current = found(self.repo.find_task(&mut *conn, id).await?, "task")?;
        if !current.status.can_transition_to(to) {
            return Err(AppError::transition("task", current.status, to));
        }

        self.repo
            .set_task_status(&mut *conn, id, current.status, to)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))
    }

    pub async fn delete_task<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.soft_delete_task(executor, id).await? {
            return Err(AppError::NotFound("task"));
        }
        Ok(())
    }

    async fn notify_task(&self, conn: &mut sqlx::PgConnection, task: &Task) -> Result<(), AppError> {
        let mut notification = NewNotification::new(
            task.assigned_to,
            NotificationKind::TaskAssigned,
            "Nova tarefa",
            task.title.clone(),
        );
        if let (Some(kind), Some(id)) = (task.entity_type, task.entity_id) {
            notification = notification.about(kind, id);
        }
        self.notification_service.notify(conn, notification).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::team::Role;

    fn member(role: Role) -> TeamMember {
        TeamMember {
            id: Uuid::new_v4(),
            full_name: "Carla Mendes".into(),
            email: "carla@imobiliaria.com".into(),
            phone: None,
            password_hash: String::new(),
            role,
            is_active: true,
            coin_balance: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn note_by(author_id: Uuid) -> Note {
        Note {
            id: Uuid::new_v4(),
            entity_type: EntityKind::Lead,
            entity_id: Uuid::new_v4(),
            author_id,
            body: "Prefere andar alto".into(),
            is_pinned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_author_or_admin_moderates_notes() {
        let author = member(Role::BuyerAgent);
        let other = member(Role::ListingAgent);
        let admin = member(Role::Admin);
        let note = note_by(author.id);

        assert!(can_moderate_note(&note, &author));
        assert!(can_moderate_note(&note, &admin));
        assert!(!can_moderate_note(&note, &other));
    }
}
