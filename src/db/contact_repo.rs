// src/db/contact_repo.rs

use serde_json::Value;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::unique_violation_as, error::AppError, pagination::PageParams},
    models::contact::Contact,
};

#[derive(Clone, Default)]
pub struct ContactRepository;

impl ContactRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
        alternate_phone: Option<&str>,
        preferences: &Value,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (full_name, phone, email, alternate_phone, preferences)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .bind(alternate_phone)
        .bind(preferences)
        .fetch_one(executor)
        .await
        .map_err(unique_violation_as("contact_phone_taken"))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Contact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(contact)
    }

    /// O telefone já chega normalizado.
    pub async fn find_by_phone<'e, E>(&self, executor: E, phone: &str) -> Result<Option<Contact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE phone = $1 AND deleted_at IS NULL",
        )
        .bind(phone)
        .fetch_optional(executor)
        .await?;
        Ok(contact)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        full_name: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
        alternate_phone: Option<&str>,
        preferences: Option<&Value>,
    ) -> Result<Option<Contact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                alternate_phone = COALESCE($5, alternate_phone),
                preferences = COALESCE($6, preferences),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .bind(alternate_phone)
        .bind(preferences)
        .fetch_optional(executor)
        .await
        .map_err(unique_violation_as("contact_phone_taken"))
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE contacts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        search: Option<&str>,
        page: &PageParams,
    ) -> Result<(Vec<Contact>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM contacts WHERE deleted_at IS NULL",
        );
        push_search(&mut count, pattern.as_deref());
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM contacts WHERE deleted_at IS NULL");
        push_search(&mut query, pattern.as_deref());
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let contacts = query.build_query_as::<Contact>().fetch_all(&mut *conn).await?;

        Ok((contacts, total))
    }
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        qb.push(" AND (full_name ILIKE ")
            .push_bind(pattern.to_string())
            .push(" OR phone ILIKE ")
            .push_bind(pattern.to_string())
            .push(" OR email ILIKE ")
            .push_bind(pattern.to_string())
            .push(")");
    }
}
