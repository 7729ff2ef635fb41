// src/db/team_repo.rs

use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::unique_violation_as, error::AppError, pagination::PageParams},
    models::team::{Role, TeamFilter, TeamMember},
};

// Repositório da equipe (tabela 'team_members')
#[derive(Clone, Default)]
pub struct TeamRepository;

impl TeamRepository {
    pub fn new() -> Self {
        Self
    }

    // Busca um membro pelo e-mail (login)
    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(member)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: &str,
        phone: Option<&str>,
        role: Role,
        password_hash: &str,
    ) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (full_name, email, phone, role, password_hash)
            VALUES ($1, lower($2), $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(role)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(unique_violation_as("member_email_taken"))
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        full_name: Option<&str>,
        phone: Option<&str>,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(phone)
        .bind(role)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn update_password<'e, E>(&self, executor: E, id: Uuid, password_hash: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE team_members SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        filter: &TeamFilter,
        page: &PageParams,
    ) -> Result<(Vec<TeamMember>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM team_members WHERE TRUE");
        push_team_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM team_members WHERE TRUE");
        push_team_filters(&mut query, filter);
        query
            .push(" ORDER BY full_name ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let members = query.build_query_as::<TeamMember>().fetch_all(&mut *conn).await?;

        Ok((members, total))
    }

    pub async fn list_active_by_role<'e, E>(&self, executor: E, role: Role) -> Result<Vec<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE role = $1 AND is_active ORDER BY full_name",
        )
        .bind(role)
        .fetch_all(executor)
        .await?;
        Ok(members)
    }

    pub async fn count_admins<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM team_members WHERE role = 'admin'",
        )
        .fetch_one(executor)
        .await?;
        Ok(count)
    }
}

fn push_team_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TeamFilter) {
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
