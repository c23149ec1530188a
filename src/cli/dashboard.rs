//! Painel de controle
//!
//! Banner de vehículos en operación, historial con filtros y detalle
//! del registro con las acciones de liberación.

use anyhow::Result;
use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select};
use tabled::{Table, Tabled};
use uuid::Uuid;

use crate::models::checklist::ChecklistEntry;
use crate::models::criterion::categories;
use crate::models::user::{ReviewRole, User, UserRole};
use crate::services::approval_service::{approval_state, needs_approval, ApprovalState};
use crate::services::authorization_service::can_approve;
use crate::services::dashboard_service::{
    history_view, open_vehicles, HistoryFilters, StatusFilter,
};
use crate::state::AppState;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Data")]
    date: String,
    #[tabled(rename = "Tipo")]
    kind: String,
    #[tabled(rename = "Prefixo")]
    prefix: String,
    #[tabled(rename = "Motorista")]
    driver: String,
    #[tabled(rename = "Avaria")]
    issues: String,
    #[tabled(rename = "Manut.")]
    maintenance: String,
    #[tabled(rename = "Oper.")]
    operation: String,
}

pub fn show(state: &mut AppState, user: &User) -> Result<()> {
    if user.role != UserRole::Operador {
        let open = open_vehicles(&state.entries);
        if !open.is_empty() {
            println!();
            println!("🕑 Veículos em operação ({} aguardando retorno):", open.len());
            for entry in &open {
                println!(
                    "   {} · {} · saída às {}",
                    entry.prefix,
                    first_name(&entry.driver_name),
                    entry.created_at.format("%H:%M")
                );
            }
        }
    }

    let filters = if user.role == UserRole::Operador {
        HistoryFilters::default()
    } else {
        ask_filters()?
    };

    let ids: Vec<Uuid> = {
        let view = history_view(&state.entries, user, &filters);
        if view.is_empty() {
            println!("Nenhum checklist encontrado para este filtro.");
            return Ok(());
        }

        let rows: Vec<EntryRow> = view
            .iter()
            .enumerate()
            .map(|(position, entry)| EntryRow {
                index: position + 1,
                date: entry.date.format("%d/%m/%Y").to_string(),
                kind: entry.checklist_type.to_string(),
                prefix: entry.prefix.clone(),
                driver: entry.driver_name.clone(),
                issues: if entry.has_issues { "AVARIA" } else { "-" }.to_string(),
                maintenance: status_cell(entry, ReviewRole::Manutencao),
                operation: status_cell(entry, ReviewRole::Operacao),
            })
            .collect();
        println!("{}", Table::new(rows));

        view.iter().map(|entry| entry.id).collect()
    };

    let position: usize = Input::new()
        .with_prompt("Número do registro para abrir (0 volta)")
        .default(0)
        .interact_text()?;
    if position == 0 || position > ids.len() {
        return Ok(());
    }

    detail(state, user, ids[position - 1])
}

fn status_cell(entry: &ChecklistEntry, role: ReviewRole) -> String {
    match approval_state(entry, role) {
        ApprovalState::NotApplicable => "-".to_string(),
        ApprovalState::Pending => "PENDENTE".to_string(),
        ApprovalState::Approved => "OK".to_string(),
    }
}

fn ask_filters() -> Result<HistoryFilters> {
    let raw: String = Input::new()
        .with_prompt("Filtrar por data (AAAA-MM-DD, vazio = todas)")
        .allow_empty(true)
        .interact_text()?;
    let date = match raw.trim() {
        "" => None,
        value => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                println!("⚠️ Data inválida, filtro ignorado.");
                None
            }
        },
    };

    let labels: Vec<&str> = StatusFilter::ALL_OPTIONS.iter().map(|f| f.label()).collect();
    let choice = Select::new()
        .with_prompt("Status")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(HistoryFilters { date, status: StatusFilter::ALL_OPTIONS[choice] })
}

/// Detalle del registro. La copia local es transitoria: toda mutación
/// pasa por el estado y se vuelve a leer después.
fn detail(state: &mut AppState, user: &User, entry_id: Uuid) -> Result<()> {
    let Some(entry) = state.entry_by_id(entry_id).cloned() else {
        return Ok(());
    };
    print_detail(&entry, state);

    for role in [ReviewRole::Manutencao, ReviewRole::Operacao] {
        if needs_approval(&entry, role) && can_approve(user, role) {
            let prompt = format!("Liberar {}?", role.label());
            if Confirm::new().with_prompt(prompt).default(false).interact()?
                && state.approve_entry(entry_id, role, user)?
            {
                println!("✅ Visto de {} registrado.", role.label());
            }
        }
    }
    Ok(())
}

fn print_detail(entry: &ChecklistEntry, state: &AppState) {
    let protocol: String = entry.id.to_string().chars().take(8).collect();
    println!();
    println!("VISTORIA DE VEÍCULO OPERACIONAL · PROTOCOLO #{}", protocol.to_uppercase());
    println!(
        "   {} · {} · Turno {} · Prefixo {} · KM {} · Horímetro {}h",
        entry.date.format("%d/%m/%Y"),
        entry.checklist_type,
        entry.shift,
        entry.prefix,
        entry.km,
        entry.horimetro
    );
    println!("   Motorista: {}", entry.driver_name);

    for category in categories(&state.criteria) {
        println!("   — {}", category);
        for item in state.criteria.iter().filter(|i| i.category == category) {
            match entry.items.get(&item.id) {
                Some(score) => println!(
                    "     {:<40} {:<11} vistoria: {} {}",
                    item.label,
                    score.status.to_string(),
                    if score.vistoria { "SIM" } else { "NÃO" },
                    score.obs.as_deref().unwrap_or("-")
                ),
                None => println!("     {:<40} n/a", item.label),
            }
        }
    }

    if entry.general_observations.trim().is_empty() {
        println!("   Observações: nenhuma ocorrência registrada pelo condutor.");
    } else {
        println!("   Observações: \"{}\"", entry.general_observations);
    }

    for (label, approval, role) in [
        ("Visto Manutenção", &entry.maintenance_approval, ReviewRole::Manutencao),
        ("Visto Operação", &entry.operation_approval, ReviewRole::Operacao),
    ] {
        match approval {
            Some(approval) => println!(
                "   {}: OK ({} em {})",
                label,
                approval.user_name,
                approval.timestamp.format("%d/%m/%Y %H:%M")
            ),
            None => match approval_state(entry, role) {
                ApprovalState::Pending => println!("   {}: AGUARDANDO", label),
                _ => println!("   {}: sem pendência", label),
            },
        }
    }
}

fn first_name(full: &str) -> &str {
    full.split_whitespace().next().unwrap_or(full)
}
