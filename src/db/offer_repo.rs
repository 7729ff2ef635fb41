// src/db/offer_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::offer::{Offer, OfferFilter, OfferStatus},
};

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub listing_id: Uuid,
    pub lead_id: Uuid,
    pub buyer_agent_id: Option<Uuid>,
    pub amount: Decimal,
    pub conditions: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct OfferRepository;

impl OfferRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewOffer) -> Result<Offer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (listing_id, lead_id, buyer_agent_id, amount, conditions, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.listing_id)
        .bind(new.lead_id)
        .bind(new.buyer_agent_id)
        .bind(new.amount)
        .bind(new.conditions.as_deref())
        .bind(new.expires_at)
        .fetch_one(executor)
        .await?;
        Ok(offer)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(offer)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(offer)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        filter: &OfferFilter,
        page: &PageParams,
    ) -> Result<(Vec<Offer>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offers WHERE TRUE");
        push_offer_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM offers WHERE TRUE");
        push_offer_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let offers = query.build_query_as::<Offer>().fetch_all(&mut *conn).await?;

        Ok((offers, total))
    }

    /// Contraproposta do vendedor (submitted -> countered)
    pub async fn counter<'e, E>(&self, executor: E, id: Uuid, counter_amount: Decimal) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET
                status = 'countered',
                counter_amount = $2,
                responded_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'submitted'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(counter_amount)
        .fetch_optional(executor)
        .await?;
        Ok(offer)
    }

    /// Comprador revisa o valor depois de uma contraproposta (countered -> submitted)
    pub async fn revise<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        amount: Decimal,
        conditions: Option<&str>,
    ) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET
                status = 'submitted',
                amount = $2,
                conditions = COALESCE($3, conditions),
                counter_amount = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'countered'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(conditions)
        .fetch_optional(executor)
        .await?;
        Ok(offer)
    }

    /// Fecha a proposta (accepted / rejected / withdrawn / expired) se ainda estiver aberta.
    pub async fn close<'e, E>(&self, executor: E, id: Uuid, to: OfferStatus) -> Result<Option<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET status = $2, responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status IN ('submitted', 'countered')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to)
        .fetch_optional(executor)
        .await?;
        Ok(offer)
    }

    /// Rejeita as demais propostas abertas do anúncio. Retorna as afetadas.
    pub async fn reject_other_open<'e, E>(&self, executor: E, listing_id: Uuid, except: Uuid) -> Result<Vec<Offer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET status = 'rejected', responded_at = NOW(), updated_at = NOW()
            WHERE listing_id = $1 AND id <> $2 AND status IN ('submitted', 'countered')
            RETURNING *
            "#,
        )
        .bind(listing_id)
        .bind(except)
        .fetch_all(executor)
        .await?;
        Ok(offers)
    }
}

fn push_offer_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &OfferFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(listing_id) = filter.listing_id {
        qb.push(" AND listing_id = ").push_bind(listing_id);
    }
    if let Some(lead_id) = filter.lead_id {
        qb.push(" AND lead_id = ").push_bind(lead_id);
    }
    if let Some(agent) = filter.buyer_agent_id {
        qb.push(" AND buyer_agent_id = ").push_bind(agent);
    }
}
