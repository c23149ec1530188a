//! Modelo de User
//!
//! Este módulo contiene el struct User y los roles de la operación.
//! La matrícula solo existe para operadores y funciona como credencial.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Rol del usuario - serializado con las etiquetas históricas en mayúsculas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Operador,
    Manutencao,
    Operacao,
}

impl UserRole {
    /// Etiqueta tal como se muestra en pantalla
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Operador => "OPERADOR",
            UserRole::Manutencao => "MANUTENCAO",
            UserRole::Operacao => "OPERACAO",
        }
    }
}

/// Cola de revisión sobre la que actúa un aprobador
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewRole {
    Manutencao,
    Operacao,
}

impl ReviewRole {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewRole::Manutencao => "Manutenção",
            ReviewRole::Operacao => "Operação",
        }
    }
}

/// Usuario del sistema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
}

/// Request para crear un nuevo usuario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 2, max = 50))]
    pub username: String,

    pub role: UserRole,

    #[validate(length(min = 1, max = 20))]
    pub matricula: Option<String>,
}
