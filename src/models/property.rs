// src/models/property.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "furnishing", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Furnishing {
    Unfurnished,
    SemiFurnished,
    Furnished,
}

// Empreendimento / prédio
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    #[schema(example = "Edifício Jardim das Flores")]
    pub name: String,
    pub address: String,
    #[schema(example = "Pinheiros")]
    pub locality: String,
    #[schema(example = "São Paulo")]
    pub city: String,
    pub developer: Option<String>,
    pub total_floors: Option<i32>,
    // Lista de amenidades (JSONB): ["piscina", "academia"]
    pub amenities: Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub building_id: Uuid,
    #[schema(example = "42B")]
    pub unit_number: String,
    pub floor: Option<i32>,
    #[schema(example = 3)]
    pub bedrooms: i32,
    #[schema(example = 2)]
    pub bathrooms: i32,
    #[schema(example = 1150)]
    pub area_sqft: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Furnishing,
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BuildingFilter {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPayload {
    #[validate(length(min = 2, max = 160, message = "invalid_length"))]
    pub name: String,
    #[validate(length(min = 5, max = 300, message = "invalid_length"))]
    pub address: String,
    #[validate(length(min = 2, max = 120, message = "invalid_length"))]
    pub locality: String,
    #[validate(length(min = 2, max = 120, message = "invalid_length"))]
    pub city: String,
    pub developer: Option<String>,
    #[validate(range(min = 1, max = 300, message = "invalid_range"))]
    pub total_floors: Option<i32>,
    pub amenities: Option<Value>,
    #[validate(range(min = -90.0, max = 90.0, message = "invalid_latitude"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "invalid_longitude"))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitPayload {
    #[validate(length(min = 1, max = 20, message = "invalid_length"))]
    pub unit_number: String,
    pub floor: Option<i32>,
    #[validate(range(min = 0, max = 20, message = "invalid_range"))]
    pub bedrooms: i32,
    #[validate(range(min = 0, max = 20, message = "invalid_range"))]
    pub bathrooms: i32,
    #[validate(range(min = 1, message = "invalid_range"))]
    pub area_sqft: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub attributes: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitPayload {
    #[validate(length(min = 1, max = 20, message = "invalid_length"))]
    pub unit_number: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 0, max = 20, message = "invalid_range"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 20, message = "invalid_range"))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 1, message = "invalid_range"))]
    pub area_sqft: Option<i32>,
    pub facing: Option<String>,
    pub furnishing: Option<Furnishing>,
    pub attributes: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        let payload: BuildingPayload = serde_json::from_value(serde_json::json!({
            "name": "Edifício Aurora",
            "address": "Rua das Flores, 100",
            "locality": "Centro",
            "city": "Curitiba",
            "latitude": 91.0,
            "longitude": -181.0
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["latitude"][0].code, "range");
        assert_eq!(fields["latitude"][0].message.as_deref(), Some("invalid_latitude"));
        assert_eq!(fields["longitude"][0].message.as_deref(), Some("invalid_longitude"));
    }
}
