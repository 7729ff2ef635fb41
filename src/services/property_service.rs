// src/services/property_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::{
        property_repo::{BuildingData, UnitChanges},
        PropertyRepository,
    },
    models::{
        listing::NewUnit,
        property::{Building, BuildingFilter, BuildingPayload, Unit, UnitPayload, UpdateUnitPayload},
    },
};

impl From<&BuildingPayload> for BuildingData {
    fn from(payload: &BuildingPayload) -> Self {
        Self {
            name: payload.name.trim().to_string(),
            address: payload.address.trim().to_string(),
            locality: payload.locality.trim().to_string(),
            city: payload.city.trim().to_string(),
            developer: payload.developer.clone(),
            total_floors: payload.total_floors,
            amenities: payload.amenities.clone().unwrap_or_else(|| json!([])),
            latitude: payload.latitude,
            longitude: payload.longitude,
        }
    }
}

#[derive(Clone)]
pub struct PropertyService {
    repo: PropertyRepository,
}

impl PropertyService {
    pub fn new(repo: PropertyRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  EMPREENDIMENTOS
    // =========================================================================

    pub async fn create_building<'e, E>(&self, executor: E, payload: &BuildingPayload) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let building = self.repo.create_building(executor, &BuildingData::from(payload)).await?;
        tracing::info!(building_id = %building.id, "Empreendimento cadastrado: {}", building.name);
        Ok(building)
    }

    pub async fn update_building<'e, E>(&self, executor: E, id: Uuid, payload: &BuildingPayload) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        found(
            self.repo.update_building(executor, id, &BuildingData::from(payload)).await?,
            "building",
        )
    }

    pub async fn get_building<'e, E>(&self, executor: E, id: Uuid) -> Result<Building, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        found(self.repo.find_building(executor, id).await?, "building")
    }

    pub async fn list_buildings<'e, A>(
        &self,
        conn: A,
        filter: &BuildingFilter,
        page: &PageParams,
    ) -> Result<Paginated<Building>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let (buildings, total) = self.repo.list_buildings(conn, filter, page).await?;
        Ok(Paginated::new(buildings, page, total))
    }

    pub async fn delete_building<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.soft_delete_building(executor, id).await? {
            return Err(AppError::NotFound("building"));
        }
        Ok(())
    }

    // =========================================================================
    //  UNIDADES
    // =========================================================================

    pub async fn create_unit<'e, A>(&self, conn: A, building_id: Uuid, payload: &UnitPayload) -> Result<Unit, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;

        found(self.repo.find_building(&mut *conn, building_id).await?, "building")?;

        let unit = NewUnit {
            building_id,
            unit_number: payload.unit_number.trim().to_string(),
            floor: payload.floor,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            area_sqft: payload.area_sqft,
            facing: payload.facing.clone(),
            furnishing: payload.furnishing,
            attributes: payload.attributes.clone(),
        };
        self.repo.create_unit(&mut *conn, &unit).await
    }

    pub async fn list_units<'e, A>(&self, conn: A, building_id: Uuid) -> Result<Vec<Unit>, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        let mut conn = conn.acquire().await?;
        found(self.repo.find_building(&mut *conn, building_id).await?, "building")?;
        self.repo.list_units(&mut *conn, building_id).await
    }

    pub async fn get_unit<'e, E>(&self, executor: E, id: Uuid) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        found(self.repo.find_unit(executor, id).await?, "unit")
    }

    pub async fn update_unit<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateUnitPayload) -> Result<Unit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let changes = UnitChanges {
            unit_number: payload.unit_number.as_deref().map(|n| n.trim().to_string()),
            floor: payload.floor,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            area_sqft: payload.area_sqft,
            facing: payload.facing.clone(),
            furnishing: payload.furnishing,
            attributes: payload.attributes.clone(),
        };
        found(self.repo.update_unit(executor, id, &changes).await?, "unit")
    }

    pub async fn delete_unit<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.soft_delete_unit(executor, id).await? {
            return Err(AppError::NotFound("unit"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_data_defaults_amenities_to_empty_list() {
        let payload: BuildingPayload = serde_json::from_value(json!({
            "name": "  Residencial Aurora ",
            "address": "Rua das Flores, 100",
            "locality": "Centro",
            "city": "Curitiba"
        }))
        .unwrap();

        let data = BuildingData::from(&payload);
        assert_eq!(data.name, "Residencial Aurora");
        assert_eq!(data.amenities, json!([]));
        assert!(data.latitude.is_none());
    }
}
