//! Motor de reglas del checklist
//!
//! Valida un borrador antes de volverse durable y calcula los campos
//! derivados. La validación evalúa TODAS las reglas y devuelve la lista
//! completa de pendencias: el operador tiene que ver todos los problemas
//! de una vez, no uno por uno.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::models::checklist::{
    ChecklistDraft, ChecklistEntry, DraftIssue, ItemScore,
};
use crate::models::criterion::ChecklistItem;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

/// Valida un borrador contra el vehículo elegido y la plantilla vigente.
/// Lista vacía ⇒ borrador válido.
pub fn validate_draft(
    draft: &ChecklistDraft,
    vehicle: Option<&Vehicle>,
    criteria: &[ChecklistItem],
) -> Vec<DraftIssue> {
    let mut issues = Vec::new();

    let has_manual_prefix = draft
        .prefix
        .as_deref()
        .map_or(false, |p| !p.trim().is_empty());
    if draft.vehicle_id.is_none() && !has_manual_prefix {
        issues.push(DraftIssue::MissingVehicle);
    }

    if draft.driver_name.trim().is_empty() {
        issues.push(DraftIssue::MissingDriverName);
    }

    match vehicle {
        Some(vehicle) => {
            // Lecturas monotónicas por vehículo: nunca retroceden
            if draft.km.unwrap_or(0) < vehicle.current_km {
                issues.push(DraftIssue::KmBelowCurrent(vehicle.current_km));
            }
            if draft.horimetro.unwrap_or(0) < vehicle.current_horimetro {
                issues.push(DraftIssue::HorimetroBelowCurrent(vehicle.current_horimetro));
            }
        }
        None => {
            // Vehículo sin registro: alcanza con que las lecturas existan
            if draft.km.unwrap_or(0) == 0 || draft.horimetro.unwrap_or(0) == 0 {
                issues.push(DraftIssue::MissingReadings);
            }
        }
    }

    let all_scored = criteria
        .iter()
        .all(|item| draft.items.get(&item.id).map_or(false, |s| s.status.is_some()));
    if !all_scored {
        issues.push(DraftIssue::UnscoredItems);
    }

    if draft.signature.is_none() {
        issues.push(DraftIssue::MissingSignature);
    }

    issues
}

/// `has_issues` es verdadero sii algún criterio evaluado quedó en
/// FALTA o DEFEITUOSO.
pub fn compute_has_issues(items: &HashMap<u32, ItemScore>, criteria: &[ChecklistItem]) -> bool {
    criteria
        .iter()
        .filter_map(|item| items.get(&item.id))
        .any(|score| score.status.is_issue())
}

/// Convierte un borrador válido en un entry durable: estampa id,
/// `created_at`, prefijo resuelto desde el vehículo, firma y el flag
/// `has_issues` congelado. No es invocable sobre un borrador inválido.
pub fn finalize_entry(
    draft: ChecklistDraft,
    vehicle: Option<&Vehicle>,
    criteria: &[ChecklistItem],
) -> AppResult<ChecklistEntry> {
    let issues = validate_draft(&draft, vehicle, criteria);
    if !issues.is_empty() {
        return Err(AppError::Draft(issues));
    }

    // Snapshot de los ids evaluados; los que quedaron sin estado (solo
    // posible fuera de la plantilla vigente) no se arrastran.
    let items: HashMap<u32, ItemScore> = draft
        .items
        .into_iter()
        .filter_map(|(id, score)| {
            score.status.map(|status| {
                (id, ItemScore { status, vistoria: score.vistoria, obs: score.obs })
            })
        })
        .collect();

    let has_issues = compute_has_issues(&items, criteria);

    Ok(ChecklistEntry {
        id: Uuid::new_v4(),
        date: draft.date,
        shift: draft.shift,
        checklist_type: draft.checklist_type,
        driver_name: draft.driver_name.trim().to_string(),
        prefix: vehicle
            .map(|v| v.prefix.clone())
            .or(draft.prefix)
            .unwrap_or_default(),
        vehicle_id: vehicle.map(|v| v.id).or(draft.vehicle_id),
        km: draft.km.unwrap_or(0),
        horimetro: draft.horimetro.unwrap_or(0),
        items,
        general_observations: draft.general_observations,
        created_at: Utc::now(),
        user_id: draft.user_id,
        operator_signature: draft.signature,
        maintenance_approval: None,
        operation_approval: None,
        has_issues,
    })
}
