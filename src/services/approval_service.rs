//! Máquina de estados de aprobación
//!
//! Cada entry lleva dos colas independientes (Manutenção y Operação) con
//! tres estados: NotApplicable (sin averías), Pending (avería sin visto)
//! y Approved (visto firmado, terminal). La única transición es
//! Pending → Approved y gana la primera firma; todo lo demás es un no-op
//! silencioso, igual que la interfaz que directamente no muestra el botón.

use chrono::Utc;

use crate::models::checklist::{Approval, ChecklistEntry};
use crate::models::user::{ReviewRole, User};
use crate::services::authorization_service::can_approve;

/// Estado de una cola de revisión para un entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    NotApplicable,
    Pending,
    Approved,
}

/// Visto registrado para la cola indicada, si existe
pub fn approval_for(entry: &ChecklistEntry, role: ReviewRole) -> Option<&Approval> {
    match role {
        ReviewRole::Manutencao => entry.maintenance_approval.as_ref(),
        ReviewRole::Operacao => entry.operation_approval.as_ref(),
    }
}

/// Estado actual de la cola indicada
pub fn approval_state(entry: &ChecklistEntry, role: ReviewRole) -> ApprovalState {
    if !entry.has_issues {
        return ApprovalState::NotApplicable;
    }
    match approval_for(entry, role) {
        Some(_) => ApprovalState::Approved,
        None => ApprovalState::Pending,
    }
}

/// Un entry espera el visto de la cola indicada
pub fn needs_approval(entry: &ChecklistEntry, role: ReviewRole) -> bool {
    approval_state(entry, role) == ApprovalState::Pending
}

/// Aplica el visto del revisor sobre la cola indicada. Devuelve `true`
/// solo cuando la transición ocurrió; el rechazo (rol sin capacidad,
/// entry sin averías, visto ya firmado) es silencioso.
pub fn approve(entry: &mut ChecklistEntry, role: ReviewRole, approver: &User) -> bool {
    if !can_approve(approver, role) {
        log::warn!(
            "🔒 Visto de {} rechazado: usuario '{}' sin capacidad",
            role.label(),
            approver.username
        );
        return false;
    }

    if !entry.has_issues {
        return false;
    }

    let slot = match role {
        ReviewRole::Manutencao => &mut entry.maintenance_approval,
        ReviewRole::Operacao => &mut entry.operation_approval,
    };
    if slot.is_some() {
        // Gana la primera firma; los vistos no se reasignan
        return false;
    }

    *slot = Some(Approval {
        user_id: approver.id,
        user_name: approver.name.clone(),
        timestamp: Utc::now(),
        observation: None,
    });
    true
}
