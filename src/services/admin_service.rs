//! Servicio de administración
//!
//! Altas y bajas de vehículos, usuarios y criterios de inspección.
//! Solo el panel de administración llega hasta acá; los entries ya
//! registrados nunca se tocan desde este módulo.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::models::criterion::{next_criterion_id, ChecklistItem, CreateCriterionRequest};
use crate::models::user::{CreateUserRequest, User, UserRole};
use crate::models::vehicle::{CreateVehicleRequest, Vehicle};
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppResult};

/// Registra un vehículo nuevo. El prefijo es clave de búsqueda y no se
/// repite dentro de la flota.
pub fn add_vehicle(vehicles: &mut Vec<Vehicle>, request: CreateVehicleRequest) -> AppResult<Vehicle> {
    request.validate()?;

    if vehicles
        .iter()
        .any(|v| v.prefix.eq_ignore_ascii_case(&request.prefix))
    {
        return Err(conflict_error("Veículo", "prefixo", &request.prefix));
    }

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        prefix: request.prefix,
        plate: request.plate,
        current_km: request.current_km,
        current_horimetro: request.current_horimetro,
        last_updated: Utc::now(),
    };
    log::info!("🚛 Vehículo registrado: {}", vehicle.prefix);
    vehicles.push(vehicle.clone());
    Ok(vehicle)
}

pub fn remove_vehicle(vehicles: &mut Vec<Vehicle>, id: Uuid) -> AppResult<()> {
    let before = vehicles.len();
    vehicles.retain(|v| v.id != id);
    if vehicles.len() == before {
        return Err(not_found_error("Veículo", &id.to_string()));
    }
    Ok(())
}

/// Crea un usuario. La matrícula es obligatoria únicamente para
/// operadores, porque es su credencial de acceso.
pub fn add_user(users: &mut Vec<User>, request: CreateUserRequest) -> AppResult<User> {
    request.validate()?;

    if request.role == UserRole::Operador
        && request.matricula.as_deref().map_or(true, |m| m.trim().is_empty())
    {
        return Err(validation_error("matricula", "Matrícula é obrigatória para operadores."));
    }

    if users
        .iter()
        .any(|u| u.username.eq_ignore_ascii_case(&request.username))
    {
        return Err(conflict_error("Usuário", "username", &request.username));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: request.name,
        username: request.username,
        role: request.role,
        // Los demás roles entran sin credencial; no se guarda matrícula
        matricula: if request.role == UserRole::Operador {
            request.matricula
        } else {
            None
        },
    };
    log::info!("👤 Usuario creado: {} ({})", user.username, user.role.label());
    users.push(user.clone());
    Ok(user)
}

pub fn remove_user(users: &mut Vec<User>, id: Uuid) -> AppResult<()> {
    let before = users.len();
    users.retain(|u| u.id != id);
    if users.len() == before {
        return Err(not_found_error("Usuário", &id.to_string()));
    }
    Ok(())
}

/// Agrega un criterio a la plantilla con id monotónico. Los entries
/// existentes conservan su snapshot y no ven el criterio nuevo.
pub fn add_criterion(
    criteria: &mut Vec<ChecklistItem>,
    request: CreateCriterionRequest,
) -> AppResult<ChecklistItem> {
    request.validate()?;

    let criterion = ChecklistItem {
        id: next_criterion_id(criteria),
        label: request.label,
        category: request.category,
    };
    criteria.push(criterion.clone());
    Ok(criterion)
}

pub fn remove_criterion(criteria: &mut Vec<ChecklistItem>, id: u32) -> AppResult<()> {
    let before = criteria.len();
    criteria.retain(|c| c.id != id);
    if criteria.len() == before {
        return Err(not_found_error("Critério", &id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_request(prefix: &str) -> CreateVehicleRequest {
        CreateVehicleRequest {
            prefix: prefix.to_string(),
            plate: "ABC1D23".to_string(),
            current_km: 50_000,
            current_horimetro: 1_200,
        }
    }

    #[test]
    fn test_add_vehicle_rejects_duplicate_prefix() {
        let mut vehicles = Vec::new();
        add_vehicle(&mut vehicles, vehicle_request("SOL-01")).unwrap();

        let result = add_vehicle(&mut vehicles, vehicle_request("sol-01"));
        assert!(result.is_err());
        assert_eq!(vehicles.len(), 1);
    }

    #[test]
    fn test_remove_vehicle_unknown_id_is_not_found() {
        let mut vehicles = Vec::new();
        let vehicle = add_vehicle(&mut vehicles, vehicle_request("SOL-01")).unwrap();

        assert!(remove_vehicle(&mut vehicles, Uuid::new_v4()).is_err());
        assert!(remove_vehicle(&mut vehicles, vehicle.id).is_ok());
        assert!(vehicles.is_empty());
    }

    #[test]
    fn test_add_operador_requires_matricula() {
        let mut users = Vec::new();
        let request = CreateUserRequest {
            name: "João da Silva".to_string(),
            username: "joao".to_string(),
            role: UserRole::Operador,
            matricula: None,
        };
        assert!(add_user(&mut users, request).is_err());

        let request = CreateUserRequest {
            name: "João da Silva".to_string(),
            username: "joao".to_string(),
            role: UserRole::Operador,
            matricula: Some("4411".to_string()),
        };
        let user = add_user(&mut users, request).unwrap();
        assert_eq!(user.matricula.as_deref(), Some("4411"));
    }

    #[test]
    fn test_add_reviewer_discards_matricula() {
        let mut users = Vec::new();
        let request = CreateUserRequest {
            name: "Carlos Mecânico".to_string(),
            username: "carlos".to_string(),
            role: UserRole::Manutencao,
            matricula: Some("1234".to_string()),
        };
        let user = add_user(&mut users, request).unwrap();
        assert!(user.matricula.is_none());
    }

    #[test]
    fn test_criterion_ids_stay_monotonic_after_removal() {
        let mut criteria = Vec::new();
        let first = add_criterion(
            &mut criteria,
            CreateCriterionRequest { label: "Pneus".to_string(), category: "MECÂNICA".to_string() },
        )
        .unwrap();
        let second = add_criterion(
            &mut criteria,
            CreateCriterionRequest { label: "Freios".to_string(), category: "MECÂNICA".to_string() },
        )
        .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        remove_criterion(&mut criteria, first.id).unwrap();
        let third = add_criterion(
            &mut criteria,
            CreateCriterionRequest { label: "Buzina".to_string(), category: "SEGURANÇA".to_string() },
        )
        .unwrap();
        // El hueco que dejó el id 1 no se rellena
        assert_eq!(third.id, 3);
    }
}
