//! Servicio de autenticación
//!
//! Autenticación simple contra la tabla local de usuarios: el login
//! acepta username o nombre completo (sin distinguir mayúsculas) y solo
//! los operadores presentan credencial, su matrícula. El login literal
//! `admin` crea al administrador inicial la primera vez que se usa.

use uuid::Uuid;

use crate::models::user::{User, UserRole};
use crate::utils::errors::{AppError, AppResult};

/// Autentica contra la colección de usuarios. Puede insertar el
/// administrador inicial; el llamador decide cuándo persistir.
pub fn authenticate(users: &mut Vec<User>, login_input: &str, password_input: &str) -> AppResult<User> {
    let login = login_input.trim().to_lowercase();
    let password = password_input.trim();

    let mut found = users
        .iter()
        .find(|user| user.username.to_lowercase() == login || user.name.to_lowercase() == login)
        .cloned();

    if found.is_none() && login == "admin" {
        let admin = bootstrap_admin();
        if !users.iter().any(|user| user.username == "admin") {
            log::info!("👤 Creando administrador inicial");
            users.push(admin.clone());
        }
        found = Some(admin);
    }

    let user = found.ok_or_else(|| {
        AppError::Unauthorized("Usuário ou Nome não encontrado.".to_string())
    })?;

    if user.role == UserRole::Operador && user.matricula.as_deref() != Some(password) {
        return Err(AppError::Unauthorized(
            "Matrícula incorreta para este operador.".to_string(),
        ));
    }

    log::info!("✅ Sesión iniciada: {} ({})", user.name, user.role.label());
    Ok(user)
}

fn bootstrap_admin() -> User {
    User {
        id: Uuid::new_v4(),
        name: "Administrador Principal".to_string(),
        username: "admin".to_string(),
        role: UserRole::Admin,
        matricula: None,
    }
}
