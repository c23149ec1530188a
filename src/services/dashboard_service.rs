//! Agregador del panel de control
//!
//! Proyecciones puras sobre el log plano de entries: vehículos en
//! operación, historial filtrado por rol y estadísticas de flota.
//! Nada acá muta el estado; las mismas entradas producen siempre la
//! misma lista ordenada.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::checklist::{ChecklistEntry, ChecklistType, ItemStatus};
use crate::models::user::{ReviewRole, User, UserRole};
use crate::services::approval_service::needs_approval;
use crate::services::authorization_service::is_scoped_to;

/// Filtro de estado del historial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Avaria,
    Falta,
    Ok,
}

impl StatusFilter {
    pub const ALL_OPTIONS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Avaria,
        StatusFilter::Falta,
        StatusFilter::Ok,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "Tudo",
            StatusFilter::Avaria => "Avarias",
            StatusFilter::Falta => "Faltantes",
            StatusFilter::Ok => "Tudo OK",
        }
    }
}

/// Filtros del historial para roles de gestión
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilters {
    pub date: Option<NaiveDate>,
    pub status: StatusFilter,
}

/// Estadísticas agregadas para el panel de reportes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetStats {
    pub total: usize,
    pub with_issues: usize,
    pub pending_manutencao: usize,
    pub pending_operacao: usize,
}

/// Vehículos actualmente en campo: para cada prefijo, el entry más
/// reciente por `created_at`; queda en el resultado solo si es una
/// Saída sin Retorno posterior. Salida ordenada por prefijo para que la
/// proyección sea determinista.
pub fn open_vehicles(entries: &[ChecklistEntry]) -> Vec<&ChecklistEntry> {
    let mut ordered: Vec<&ChecklistEntry> = entries.iter().collect();
    // Orden estable ascendente: con timestamps iguales gana la última
    // escritura en orden de iteración
    ordered.sort_by_key(|entry| entry.created_at);

    let mut latest_by_prefix: BTreeMap<&str, &ChecklistEntry> = BTreeMap::new();
    for entry in ordered {
        latest_by_prefix.insert(entry.prefix.as_str(), entry);
    }

    latest_by_prefix
        .into_values()
        .filter(|entry| entry.checklist_type == ChecklistType::Saida)
        .collect()
}

/// Historial con alcance por rol. El operador ve solo sus registros en
/// orden cronológico inverso; los roles de gestión filtran por día y
/// estado, y los revisores ven su cola pendiente primero.
pub fn history_view<'a>(
    entries: &'a [ChecklistEntry],
    user: &User,
    filters: &HistoryFilters,
) -> Vec<&'a ChecklistEntry> {
    let mut list: Vec<&ChecklistEntry> = if user.role == UserRole::Operador {
        entries.iter().filter(|entry| is_scoped_to(user, entry)).collect()
    } else {
        entries
            .iter()
            .filter(|entry| filters.date.map_or(true, |date| entry.date == date))
            .filter(|entry| match filters.status {
                StatusFilter::All => true,
                StatusFilter::Avaria => entry.has_issues,
                StatusFilter::Falta => entry
                    .items
                    .values()
                    .any(|score| score.status == ItemStatus::Falta),
                StatusFilter::Ok => !entry.has_issues,
            })
            .collect()
    };

    match user.role {
        UserRole::Manutencao => sort_pending_first(&mut list, ReviewRole::Manutencao),
        UserRole::Operacao => sort_pending_first(&mut list, ReviewRole::Operacao),
        _ => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    list
}

/// La cola pendiente del revisor arriba; dentro de cada grupo, orden
/// cronológico inverso. `sort_by` es estable, los empates no se mezclan.
fn sort_pending_first(list: &mut [&ChecklistEntry], role: ReviewRole) {
    list.sort_by(|a, b| {
        let a_needs = needs_approval(a, role);
        let b_needs = needs_approval(b, role);
        b_needs
            .cmp(&a_needs)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Totales del panel de reportes del administrador
pub fn fleet_stats(entries: &[ChecklistEntry]) -> FleetStats {
    FleetStats {
        total: entries.len(),
        with_issues: entries.iter().filter(|e| e.has_issues).count(),
        pending_manutencao: entries
            .iter()
            .filter(|e| needs_approval(e, ReviewRole::Manutencao))
            .count(),
        pending_operacao: entries
            .iter()
            .filter(|e| needs_approval(e, ReviewRole::Operacao))
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    use crate::models::checklist::{ItemScore, Shift};

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Teste".to_string(),
            username: "teste".to_string(),
            role,
            matricula: None,
        }
    }

    fn entry(prefix: &str, kind: ChecklistType, minutes_ago: i64) -> ChecklistEntry {
        ChecklistEntry {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            shift: Shift::Diurno,
            checklist_type: kind,
            driver_name: "Motorista".to_string(),
            prefix: prefix.to_string(),
            vehicle_id: None,
            km: 1,
            horimetro: 1,
            items: HashMap::new(),
            general_observations: String::new(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            user_id: Uuid::new_v4(),
            operator_signature: None,
            maintenance_approval: None,
            operation_approval: None,
            has_issues: false,
        }
    }

    fn with_falta(mut entry: ChecklistEntry) -> ChecklistEntry {
        entry.items.insert(
            1,
            ItemScore { status: ItemStatus::Falta, vistoria: true, obs: None },
        );
        entry.has_issues = true;
        entry
    }

    #[test]
    fn test_open_vehicles_excludes_returned_vehicle() {
        // Saída y después Retorno del mismo prefijo: el vehículo volvió
        let entries = vec![
            entry("SOL-01", ChecklistType::Saida, 120),
            entry("SOL-01", ChecklistType::Retorno, 30),
        ];
        assert!(open_vehicles(&entries).is_empty());
    }

    #[test]
    fn test_open_vehicles_includes_lone_departure() {
        let entries = vec![
            entry("SOL-01", ChecklistType::Saida, 120),
            entry("SOL-01", ChecklistType::Retorno, 90),
            entry("SOL-02", ChecklistType::Saida, 60),
        ];
        let open = open_vehicles(&entries);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].prefix, "SOL-02");
    }

    #[test]
    fn test_open_vehicles_is_pure_and_order_stable() {
        let entries = vec![
            entry("SOL-03", ChecklistType::Saida, 10),
            entry("SOL-01", ChecklistType::Saida, 20),
            entry("SOL-02", ChecklistType::Retorno, 5),
        ];
        let first: Vec<Uuid> = open_vehicles(&entries).iter().map(|e| e.id).collect();
        let second: Vec<Uuid> = open_vehicles(&entries).iter().map(|e| e.id).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_operador_sees_only_own_entries_in_reverse_chronological_order() {
        let operador = user(UserRole::Operador);
        let mut own_old = entry("SOL-01", ChecklistType::Saida, 300);
        own_old.user_id = operador.id;
        let mut own_new = entry("SOL-02", ChecklistType::Saida, 10);
        own_new.user_id = operador.id;
        let other = entry("SOL-03", ChecklistType::Saida, 5);

        let entries = vec![own_old.clone(), other, own_new.clone()];
        let view = history_view(&entries, &operador, &HistoryFilters::default());

        let ids: Vec<Uuid> = view.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![own_new.id, own_old.id]);
    }

    #[test]
    fn test_manager_date_and_status_filters() {
        let gestor = user(UserRole::Admin);
        let ok = entry("SOL-01", ChecklistType::Saida, 50);
        let avaria = with_falta(entry("SOL-02", ChecklistType::Saida, 40));
        let mut outro_dia = entry("SOL-03", ChecklistType::Saida, 30);
        outro_dia.date = outro_dia.date.pred_opt().unwrap();

        let entries = vec![ok.clone(), avaria.clone(), outro_dia];

        let hoy = HistoryFilters { date: Some(ok.date), status: StatusFilter::All };
        assert_eq!(history_view(&entries, &gestor, &hoy).len(), 2);

        let averias = HistoryFilters { date: None, status: StatusFilter::Avaria };
        let view = history_view(&entries, &gestor, &averias);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, avaria.id);

        let faltantes = HistoryFilters { date: None, status: StatusFilter::Falta };
        assert_eq!(history_view(&entries, &gestor, &faltantes).len(), 1);

        let tudo_ok = HistoryFilters { date: None, status: StatusFilter::Ok };
        assert_eq!(history_view(&entries, &gestor, &tudo_ok).len(), 2);
    }

    #[test]
    fn test_maintenance_queue_sorts_pending_first() {
        let revisor = user(UserRole::Manutencao);
        let recente_ok = entry("SOL-01", ChecklistType::Saida, 5);
        let pendente_velho = with_falta(entry("SOL-02", ChecklistType::Saida, 500));

        let entries = vec![recente_ok.clone(), pendente_velho.clone()];
        let view = history_view(&entries, &revisor, &HistoryFilters::default());

        assert_eq!(view[0].id, pendente_velho.id);
        assert_eq!(view[1].id, recente_ok.id);
    }

    #[test]
    fn test_approved_entry_leaves_reviewer_queue_but_not_the_other() {
        let manutencao = user(UserRole::Manutencao);
        let operacao = user(UserRole::Operacao);

        let recente = entry("SOL-01", ChecklistType::Saida, 5);
        let mut aprovado = with_falta(entry("SOL-02", ChecklistType::Saida, 500));
        aprovado.maintenance_approval = Some(crate::models::checklist::Approval {
            user_id: manutencao.id,
            user_name: manutencao.name.clone(),
            timestamp: Utc::now(),
            observation: None,
        });

        let entries = vec![recente.clone(), aprovado.clone()];

        // Cola de manutención: ya sin pendencia, manda el orden cronológico
        let view = history_view(&entries, &manutencao, &HistoryFilters::default());
        assert_eq!(view[0].id, recente.id);

        // Cola de operación: sigue pendiente y arriba
        let view = history_view(&entries, &operacao, &HistoryFilters::default());
        assert_eq!(view[0].id, aprovado.id);
    }

    #[test]
    fn test_fleet_stats_totals() {
        let ok = entry("SOL-01", ChecklistType::Saida, 50);
        let mut aprovado = with_falta(entry("SOL-02", ChecklistType::Saida, 40));
        aprovado.maintenance_approval = Some(crate::models::checklist::Approval {
            user_id: Uuid::new_v4(),
            user_name: "Carlos".to_string(),
            timestamp: Utc::now(),
            observation: None,
        });
        let pendente = with_falta(entry("SOL-03", ChecklistType::Saida, 30));

        let stats = fleet_stats(&[ok, aprovado, pendente]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.with_issues, 2);
        assert_eq!(stats.pending_manutencao, 1);
        assert_eq!(stats.pending_operacao, 2);
    }
}
