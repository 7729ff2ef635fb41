// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::lead::{Lead, LeadFilter, LeadSource, LeadStatus, LeadSummary},
};

const SUMMARY_SELECT: &str = r#"
    SELECT l.*, c.full_name AS contact_name, c.phone AS contact_phone
    FROM leads l
    JOIN contacts c ON c.id = l.contact_id
    WHERE l.deleted_at IS NULL
"#;

/// Dados de criação de um lead (o contato já foi resolvido)
#[derive(Debug, Clone)]
pub struct NewLead {
    pub contact_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub source: LeadSource,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub requirements: Value,
    pub next_follow_up_at: Option<DateTime<Utc>>,
}

/// Campos editáveis de um lead; `None` mantém o valor atual
#[derive(Debug, Clone, Default)]
pub struct LeadChanges {
    pub source: Option<LeadSource>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub requirements: Option<Value>,
    pub next_follow_up_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct LeadRepository;

impl LeadRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewLead) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                contact_id, assigned_to, source, budget_min, budget_max,
                requirements, next_follow_up_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.contact_id)
        .bind(new.assigned_to)
        .bind(new.source)
        .bind(new.budget_min)
        .bind(new.budget_max)
        .bind(&new.requirements)
        .bind(new.next_follow_up_at)
        .fetch_one(executor)
        .await?;
        Ok(lead)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(lead)
    }

    /// Trava a linha até o fim da transação
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            "SELECT * FROM leads WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    pub async fn find_summary<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<LeadSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} AND l.id = $1", SUMMARY_SELECT);
        let lead = sqlx::query_as::<_, LeadSummary>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(lead)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        filter: &LeadFilter,
        page: &PageParams,
    ) -> Result<(Vec<LeadSummary>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM leads l JOIN contacts c ON c.id = l.contact_id WHERE l.deleted_at IS NULL",
        );
        push_lead_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_lead_filters(&mut query, filter);
        query
            .push(" ORDER BY l.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let leads = query.build_query_as::<LeadSummary>().fetch_all(&mut *conn).await?;

        Ok((leads, total))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, changes: &LeadChanges) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                source = COALESCE($2, source),
                budget_min = COALESCE($3, budget_min),
                budget_max = COALESCE($4, budget_max),
                requirements = COALESCE($5, requirements),
                next_follow_up_at = COALESCE($6, next_follow_up_at),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.source)
        .bind(changes.budget_min)
        .bind(changes.budget_max)
        .bind(changes.requirements.as_ref())
        .bind(changes.next_follow_up_at)
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    /// Grava o novo status. `lost_reason` é limpo ao sair de `lost`.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: LeadStatus,
        lost_reason: Option<&str>,
    ) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                status = $2,
                lost_reason = CASE WHEN $2 = 'lost'::lead_status THEN $3 ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(lost_reason)
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    /// Avança o lead somente se ele estiver em um dos status de origem.
    /// Usado pelos fluxos de visita/proposta/comunicação.
    pub async fn advance_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: &[LeadStatus],
        to: LeadStatus,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE leads SET status = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL AND status = ANY($2)
            "#,
        )
        .bind(id)
        .bind(from.to_vec())
        .bind(to)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn assign<'e, E>(&self, executor: E, id: Uuid, member_id: Option<Uuid>) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET assigned_to = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(member_id)
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE leads SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_lead_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeadFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND l.status = ").push_bind(status);
    }
    if let Some(source) = filter.source {
        qb.push(" AND l.source = ").push_bind(source);
    }
    if let Some(assigned_to) = filter.assigned_to {
        qb.push(" AND l.assigned_to = ").push_bind(assigned_to);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (c.full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.phone ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
