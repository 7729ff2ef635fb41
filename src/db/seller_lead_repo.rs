// src/db/seller_lead_repo.rs

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::lead::{LeadSource, PropertyType, SellerLead, SellerLeadFilter, SellerLeadStatus},
};

#[derive(Debug, Clone)]
pub struct NewSellerLead {
    pub contact_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub source: LeadSource,
    pub property_address: String,
    pub locality: Option<String>,
    pub expected_price: Option<Decimal>,
    pub property_type: PropertyType,
    pub details: Value,
}

#[derive(Debug, Clone, Default)]
pub struct SellerLeadChanges {
    pub assigned_to: Option<Uuid>,
    pub property_address: Option<String>,
    pub locality: Option<String>,
    pub expected_price: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub details: Option<Value>,
}

#[derive(Clone, Default)]
pub struct SellerLeadRepository;

impl SellerLeadRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewSellerLead) -> Result<SellerLead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, SellerLead>(
            r#"
            INSERT INTO seller_leads (
                contact_id, assigned_to, source, property_address, locality,
                expected_price, property_type, details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.contact_id)
        .bind(new.assigned_to)
        .bind(new.source)
        .bind(&new.property_address)
        .bind(new.locality.as_deref())
        .bind(new.expected_price)
        .bind(new.property_type)
        .bind(&new.details)
        .fetch_one(executor)
        .await?;
        Ok(lead)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<SellerLead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, SellerLead>(
            "SELECT * FROM seller_leads WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<SellerLead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, SellerLead>(
            "SELECT * FROM seller_leads WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        filter: &SellerLeadFilter,
        page: &PageParams,
    ) -> Result<(Vec<SellerLead>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM seller_leads s JOIN contacts c ON c.id = s.contact_id WHERE s.deleted_at IS NULL",
        );
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT s.* FROM seller_leads s JOIN contacts c ON c.id = s.contact_id WHERE s.deleted_at IS NULL",
        );
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY s.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let leads = query.build_query_as::<SellerLead>().fetch_all(&mut *conn).await?;

        Ok((leads, total))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &SellerLeadChanges,
    ) -> Result<Option<SellerLead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, SellerLead>(
            r#"
            UPDATE seller_leads SET
                assigned_to = COALESCE($2, assigned_to),
                property_address = COALESCE($3, property_address),
                locality = COALESCE($4, locality),
                expected_price = COALESCE($5, expected_price),
                property_type = COALESCE($6, property_type),
                details = COALESCE($7, details),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.assigned_to)
        .bind(changes.property_address.as_deref())
        .bind(changes.locality.as_deref())
        .bind(changes.expected_price)
        .bind(changes.property_type)
        .bind(changes.details.as_ref())
        .fetch_optional(executor)
        .await?;
        Ok(lead)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: SellerLeadStatus,
        lost_reason: Option<&str>,
    ) -> Result<Option<SellerLead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, SellerLead>(
            r#"
            UPDATE seller_leads SET
                status = $2,
                lost_reason = CASE WHEN $2 = 'lost'::seller_lead_status THEN $3 ELSE NULL END,
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

    /// Conversão em anúncio: status `listed` + vínculo com o anúncio criado.
    pub async fn mark_listed<'e, E>(&self, executor: E, id: Uuid, listing_id: Uuid) -> Result<SellerLead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, SellerLead>(
            r#"
            UPDATE seller_leads SET status = 'listed', listing_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(listing_id)
        .fetch_one(executor)
        .await?;
        Ok(lead)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE seller_leads SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &SellerLeadFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND s.status = ").push_bind(status);
    }
    if let Some(assigned_to) = filter.assigned_to {
        qb.push(" AND s.assigned_to = ").push_bind(assigned_to);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (c.full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.phone ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.property_address ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
