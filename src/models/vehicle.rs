//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD.
//! Los campos serializan con los nombres camelCase históricos del
//! almacenamiento local.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Vehículo de la flota. Los contadores `current_km` y `current_horimetro`
/// solo avanzan al aceptar un checklist con lecturas mayores o iguales.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub prefix: String,
    pub plate: String,
    #[serde(rename = "currentKm")]
    pub current_km: u32,
    #[serde(rename = "currentHorimetro")]
    pub current_horimetro: u32,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// Request para registrar un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 20))]
    pub prefix: String,

    #[validate(length(min = 5, max = 10))]
    pub plate: String,

    pub current_km: u32,

    pub current_horimetro: u32,
}
