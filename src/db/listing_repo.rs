// src/db/listing_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::listing::{Listing, ListingFilter, ListingStatus, MediaItem, NewMedia},
};

#[derive(Debug, Clone)]
pub struct NewListing {
    pub unit_id: Uuid,
    pub seller_lead_id: Option<Uuid>,
    pub listing_agent_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub price_negotiable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub price_negotiable: Option<bool>,
    pub listing_agent_id: Option<Uuid>,
}

#[derive(Clone, Default)]
pub struct ListingRepository;

impl ListingRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ANÚNCIOS
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, new: &NewListing) -> Result<Listing, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                unit_id, seller_lead_id, listing_agent_id, title, description,
                price, price_negotiable
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.unit_id)
        .bind(new.seller_lead_id)
        .bind(new.listing_agent_id)
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(new.price)
        .bind(new.price_negotiable)
        .fetch_one(executor)
        .await?;
        Ok(listing)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(listing)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            "SELECT * FROM listings WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(listing)
    }

    pub async fn list<'e, A>(
        &self,
        conn: A,
        filter: &ListingFilter,
        page: &PageParams,
    ) -> Result<(Vec<Listing>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        let from = r#"
            FROM listings l
            JOIN units u ON u.id = l.unit_id
            JOIN buildings b ON b.id = u.building_id
            WHERE l.deleted_at IS NULL
        "#;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) ");
        count.push(from);
        push_listing_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT l.* ");
        query.push(from);
        push_listing_filters(&mut query, filter);
        query
            .push(" ORDER BY l.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let listings = query.build_query_as::<Listing>().fetch_all(&mut *conn).await?;

        Ok((listings, total))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, changes: &ListingChanges) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                price_negotiable = COALESCE($5, price_negotiable),
                listing_agent_id = COALESCE($6, listing_agent_id),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.price_negotiable)
        .bind(changes.listing_agent_id)
        .fetch_optional(executor)
        .await?;
        Ok(listing)
    }

    /// Troca de status condicionada ao status atual (`from`).
    /// `None` quando outra requisição mudou o anúncio antes.
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings SET
                status = $3,
                published_at = CASE WHEN $3 = 'active'::listing_status AND published_at IS NULL
                                    THEN NOW() ELSE published_at END,
                sold_at = CASE WHEN $3 = 'sold'::listing_status THEN NOW() ELSE sold_at END,
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
        Ok(listing)
    }

    pub async fn approve<'e, E>(&self, executor: E, id: Uuid, admin_id: Uuid) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings SET
                status = 'active',
                approved_by = $2,
                approved_at = NOW(),
                published_at = COALESCE(published_at, NOW()),
                rejection_reason = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending_approval' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .fetch_optional(executor)
        .await?;
        Ok(listing)
    }

    pub async fn reject<'e, E>(&self, executor: E, id: Uuid, reason: &str) -> Result<Option<Listing>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings SET
                status = 'draft',
                rejection_reason = $2,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending_approval' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(executor)
        .await?;
        Ok(listing)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE listings SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  MÍDIAS
    // =========================================================================

    pub async fn add_media<'e, E>(&self, executor: E, listing_id: Uuid, media: &NewMedia) -> Result<MediaItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, MediaItem>(
            r#"
            INSERT INTO media_items (listing_id, kind, url, caption, position, is_cover)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(listing_id)
        .bind(media.kind)
        .bind(&media.url)
        .bind(media.caption.as_deref())
        .bind(media.position)
        .bind(media.is_cover)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_media<'e, E>(&self, executor: E, listing_id: Uuid) -> Result<Vec<MediaItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, MediaItem>(
            r#"
            SELECT * FROM media_items
            WHERE listing_id = $1 AND deleted_at IS NULL
            ORDER BY is_cover DESC, position ASC, created_at ASC
            "#,
        )
        .bind(listing_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn count_media<'e, E>(&self, executor: E, listing_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM media_items WHERE listing_id = $1 AND deleted_at IS NULL",
        )
        .bind(listing_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Remove a marca de capa atual do anúncio (antes de definir outra).
    pub async fn clear_cover<'e, E>(&self, executor: E, listing_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE media_items SET is_cover = FALSE WHERE listing_id = $1 AND is_cover AND deleted_at IS NULL",
        )
        .bind(listing_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_cover<'e, E>(&self, executor: E, listing_id: Uuid, media_id: Uuid) -> Result<Option<MediaItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, MediaItem>(
            r#"
            UPDATE media_items SET is_cover = TRUE
            WHERE id = $2 AND listing_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(listing_id)
        .bind(media_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn delete_media<'e, E>(&self, executor: E, listing_id: Uuid, media_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE media_items SET deleted_at = NOW(), is_cover = FALSE
            WHERE id = $2 AND listing_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(listing_id)
        .bind(media_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_listing_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND l.status = ").push_bind(status);
    }
    if let Some(agent) = filter.listing_agent_id {
        qb.push(" AND l.listing_agent_id = ").push_bind(agent);
    }
    if let Some(building) = filter.building_id {
        qb.push(" AND u.building_id = ").push_bind(building);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND l.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND l.price <= ").push_bind(max);
    }
    if let Some(bedrooms) = filter.min_bedrooms {
        qb.push(" AND u.bedrooms >= ").push_bind(bedrooms);
    }
    if let Some(locality) = filter.locality.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND b.locality ILIKE ").push_bind(locality.to_string());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (l.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
