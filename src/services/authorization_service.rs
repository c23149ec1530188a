//! Política de capacidades
//!
//! Punto único de verdad para decidir qué puede hacer cada rol. Tanto la
//! máquina de aprobación como el agregador del panel consumen estas
//! funciones; ninguna pantalla repite comparaciones de rol por su cuenta.

use crate::models::checklist::ChecklistEntry;
use crate::models::user::{ReviewRole, User, UserRole};

/// Verifica si un usuario puede firmar la cola de revisión indicada.
/// Cualquier ADMIN puede actuar sobre ambas colas.
pub fn can_approve(user: &User, role: ReviewRole) -> bool {
    match role {
        ReviewRole::Manutencao => matches!(user.role, UserRole::Manutencao | UserRole::Admin),
        ReviewRole::Operacao => matches!(user.role, UserRole::Operacao | UserRole::Admin),
    }
}

/// Verifica si un entry está dentro del alcance visible del usuario.
/// El operador solo ve lo que él mismo registró.
pub fn is_scoped_to(user: &User, entry: &ChecklistEntry) -> bool {
    match user.role {
        UserRole::Operador => entry.user_id == user.id,
        _ => true,
    }
}

/// Verifica si un usuario puede registrar una vistoria nueva
pub fn can_file_checklist(user: &User) -> bool {
    matches!(user.role, UserRole::Operador | UserRole::Admin)
}

/// Verifica si un usuario puede administrar flota, usuarios y criterios
pub fn can_manage_fleet(user: &User) -> bool {
    matches!(user.role, UserRole::Admin)
}
