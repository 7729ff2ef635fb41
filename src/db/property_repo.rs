// src/db/property_repo.rs

use serde_json::Value;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::unique_violation_as, error::AppError, pagination::PageParams},
    models::{
        listing::NewUnit,
        property::{Building, BuildingFilter, Furnishing, Unit},
    },
};

#[derive(Debug, Clone)]
pub struct BuildingData {
    pub name: String,
    pub address: String,
    pub locality: String,
    pub city: String,
    pub developer: Option<String>,
    pub total_floors: Option<i32>,
    pub amenities: Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct UnitChanges {
    pub unit_number: Option<String>,
    pub floor: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub attributes: Option<Value>,
}

#[derive(Clone, Default)]
pub struct PropertyRepository;

impl PropertyRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  EMPREENDIMENTOS
    // =========================================================================

    pub async fn create_building<'e, E>(&self, executor: E, data: &BuildingData) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(
            r#"
            INSERT INTO buildings (
                name, address, locality, city, developer, total_floors,
                amenities, latitude, longitude
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.locality)
        .bind(&data.city)
        .bind(data.developer.as_deref())
        .bind(data.total_floors)
        .bind(&data.amenities)
        .bind(data.latitude)
        .bind(data.longitude)
        .fetch_one(executor)
        .await?;
        Ok(building)
    }

    pub async fn update_building<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data: &BuildingData,
    ) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(
            r#"
            UPDATE buildings SET
                name = $2, address = $3, locality = $4, city = $5, developer = $6,
                total_floors = $7, amenities = $8, latitude = $9, longitude = $10,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.locality)
        .bind(&data.city)
        .bind(data.developer.as_deref())
        .bind(data.total_floors)
        .bind(&data.amenities)
        .bind(data.latitude)
        .bind(data.longitude)
        .fetch_optional(executor)
        .await?;
        Ok(building)
    }

    pub async fn find_building<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = sqlx::query_as::<_, Building>(
            "SELECT * FROM buildings WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(building)
    }

    pub async fn list_buildings<'e, A>(
        &self,
        conn: A,
        filter: &BuildingFilter,
        page: &PageParams,
    ) -> Result<(Vec<Building>, i64), AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM buildings WHERE deleted_at IS NULL");
        push_building_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM buildings WHERE deleted_at IS NULL");
        push_building_filters(&mut query, filter);
        query
            .push(" ORDER BY name ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let buildings = query.build_query_as::<Building>().fetch_all(&mut *conn).await?;

        Ok((buildings, total))
    }

    pub async fn soft_delete_building<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE buildings SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  UNIDADES
    // =========================================================================

    pub async fn create_unit<'e, E>(&self, executor: E, unit: &NewUnit) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Unit>(
            r#"
            INSERT INTO units (
                building_id, unit_number, floor, bedrooms, bathrooms, area_sqft,
                facing, furnishing, attributes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'unfurnished'::furnishing), COALESCE($9, '{}'::jsonb))
            RETURNING *
            "#,
        )
        .bind(unit.building_id)
        .bind(&unit.unit_number)
        .bind(unit.floor)
        .bind(unit.bedrooms)
        .bind(unit.bathrooms)
        .bind(unit.area_sqft)
        .bind(unit.facing.as_deref())
        .bind(unit.furnishing)
        .bind(unit.attributes.as_ref())
        .fetch_one(executor)
        .await
        .map_err(unique_violation_as("unit_number_taken"))
    }

    pub async fn update_unit<'e, E>(&self, executor: E, id: Uuid, changes: &UnitChanges) -> Result<Option<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Unit>(
            r#"
            UPDATE units SET
                unit_number = COALESCE($2, unit_number),
                floor = COALESCE($3, floor),
                bedrooms = COALESCE($4, bedrooms),
                bathrooms = COALESCE($5, bathrooms),
                area_sqft = COALESCE($6, area_sqft),
                facing = COALESCE($7, facing),
                furnishing = COALESCE($8, furnishing),
                attributes = COALESCE($9, attributes),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.unit_number.as_deref())
        .bind(changes.floor)
        .bind(changes.bedrooms)
        .bind(changes.bathrooms)
        .bind(changes.area_sqft)
        .bind(changes.facing.as_deref())
        .bind(changes.furnishing)
        .bind(changes.attributes.as_ref())
        .fetch_optional(executor)
        .await
        .map_err(unique_violation_as("unit_number_taken"))
    }

    pub async fn find_unit<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let unit = sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(unit)
    }

    pub async fn list_units<'e, E>(&self, executor: E, building_id: Uuid) -> Result<Vec<Unit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let units = sqlx::query_as::<_, Unit>(
            r#"
            SELECT * FROM units
            WHERE building_id = $1 AND deleted_at IS NULL
            ORDER BY floor NULLS LAST, unit_number
            "#,
        )
        .bind(building_id)
        .fetch_all(executor)
        .await?;
        Ok(units)
    }

    pub async fn soft_delete_unit<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE units SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_building_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BuildingFilter) {
    if let Some(city) = filter.city.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND city ILIKE ").push_bind(city.to_string());
    }
    if let Some(locality) = filter.locality.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND locality ILIKE ").push_bind(locality.to_string());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR address ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
