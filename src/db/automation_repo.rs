// src/db/automation_repo.rs

use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::automation::{AutomationAction, AutomationEvent, AutomationRule},
};

#[derive(Clone, Default)]
pub struct AutomationRepository;

impl AutomationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        event: AutomationEvent,
        action: AutomationAction,
        config: &Value,
        is_active: bool,
        created_by: Uuid,
    ) -> Result<AutomationRule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, AutomationRule>(
            r#"
            INSERT INTO automation_rules (name, event, action, config, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(event)
        .bind(action)
        .bind(config)
        .bind(is_active)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(rule)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<AutomationRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, AutomationRule>("SELECT * FROM automation_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(rule)
    }

    pub async fn list<'e, E>(&self, executor: E, event: Option<AutomationEvent>) -> Result<Vec<AutomationRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rules = sqlx::query_as::<_, AutomationRule>(
            r#"
            SELECT * FROM automation_rules
            WHERE ($1::automation_event IS NULL OR event = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(event)
        .fetch_all(executor)
        .await?;
        Ok(rules)
    }

    pub async fn list_active_for_event<'e, E>(&self, executor: E, event: AutomationEvent) -> Result<Vec<AutomationRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rules = sqlx::query_as::<_, AutomationRule>(
            "SELECT * FROM automation_rules WHERE event = $1 AND is_active ORDER BY created_at ASC",
        )
        .bind(event)
        .fetch_all(executor)
        .await?;
        Ok(rules)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        config: Option<&Value>,
        is_active: Option<bool>,
    ) -> Result<Option<AutomationRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rule = sqlx::query_as::<_, AutomationRule>(
            r#"
            UPDATE automation_rules SET
                name = COALESCE($2, name),
                config = COALESCE($3, config),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(config)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(rule)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM automation_rules WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
