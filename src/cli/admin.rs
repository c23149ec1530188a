//! Panel de administración
//!
//! Pestañas de vehículos, usuarios, criterios y reportes, como el panel
//! original. Solo accesible para administradores.

use anyhow::Result;
use chrono::Utc;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;
use tabled::{Table, Tabled};

use crate::models::criterion::{categories, CreateCriterionRequest};
use crate::models::user::{CreateUserRequest, User, UserRole};
use crate::models::vehicle::CreateVehicleRequest;
use crate::services::authorization_service::can_manage_fleet;
use crate::services::dashboard_service::fleet_stats;
use crate::services::export_service::{default_file_name, write_csv};
use crate::state::AppState;

#[derive(Tabled)]
struct VehicleRow {
    #[tabled(rename = "Prefixo")]
    prefix: String,
    #[tabled(rename = "Placa")]
    plate: String,
    #[tabled(rename = "KM")]
    km: u32,
    #[tabled(rename = "Horímetro")]
    horimetro: u32,
}

pub fn panel(state: &mut AppState, user: &User) -> Result<()> {
    if !can_manage_fleet(user) {
        println!("❌ Apenas administradores acessam este painel.");
        return Ok(());
    }

    loop {
        let tabs = ["Veículos", "Usuários", "Critérios", "Relatórios", "Voltar"];
        let choice = Select::new()
            .with_prompt("Administração")
            .items(&tabs)
            .default(0)
            .interact()?;
        match choice {
            0 => vehicles_tab(state)?,
            1 => users_tab(state)?,
            2 => criteria_tab(state)?,
            3 => reports_tab(state)?,
            _ => return Ok(()),
        }
    }
}

fn vehicles_tab(state: &mut AppState) -> Result<()> {
    if state.vehicles.is_empty() {
        println!("Nenhum veículo cadastrado.");
    } else {
        let rows: Vec<VehicleRow> = state
            .vehicles
            .iter()
            .map(|v| VehicleRow {
                prefix: v.prefix.clone(),
                plate: v.plate.clone(),
                km: v.current_km,
                horimetro: v.current_horimetro,
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    let actions = ["Cadastrar novo veículo", "Remover veículo", "Voltar"];
    match Select::new().items(&actions).default(0).interact()? {
        0 => {
            let request = CreateVehicleRequest {
                prefix: Input::new().with_prompt("Prefixo").interact_text()?,
                plate: Input::new().with_prompt("Placa").interact_text()?,
                current_km: Input::new().with_prompt("KM inicial").interact_text()?,
                current_horimetro: Input::new().with_prompt("Horímetro inicial").interact_text()?,
            };
            match state.add_vehicle(request) {
                Ok(vehicle) => println!("✅ Veículo {} cadastrado.", vehicle.prefix),
                Err(error) => println!("❌ {}", error),
            }
        }
        1 => {
            let Some(id) = pick(state.vehicles.iter().map(|v| (v.id, v.prefix.clone())))? else {
                return Ok(());
            };
            state.remove_vehicle(id)?;
            println!("✅ Veículo removido.");
        }
        _ => {}
    }
    Ok(())
}

fn users_tab(state: &mut AppState) -> Result<()> {
    for user in &state.users {
        let matricula = user
            .matricula
            .as_deref()
            .map(|m| format!(" · Matrícula: {}", m))
            .unwrap_or_default();
        println!("  {} · @{} · {}{}", user.name, user.username, user.role.label(), matricula);
    }

    let actions = ["Cadastrar novo usuário", "Remover usuário", "Voltar"];
    match Select::new().items(&actions).default(0).interact()? {
        0 => {
            let roles = [
                ("Operador (Motorista)", UserRole::Operador),
                ("Visto Manutenção", UserRole::Manutencao),
                ("Visto Operação", UserRole::Operacao),
                ("Administrador", UserRole::Admin),
            ];
            let labels: Vec<&str> = roles.iter().map(|(label, _)| *label).collect();
            let role = roles[Select::new()
                .with_prompt("Cargo")
                .items(&labels)
                .default(0)
                .interact()?]
            .1;

            let matricula = if role == UserRole::Operador {
                Some(Input::new().with_prompt("Matrícula").interact_text()?)
            } else {
                None
            };

            let request = CreateUserRequest {
                name: Input::new().with_prompt("Nome completo").interact_text()?,
                username: Input::new().with_prompt("Login (usuário)").interact_text()?,
                role,
                matricula,
            };
            match state.add_user(request) {
                Ok(user) => println!("✅ Usuário {} cadastrado.", user.username),
                Err(error) => println!("❌ {}", error),
            }
        }
        1 => {
            let Some(id) = pick(state.users.iter().map(|u| (u.id, u.name.clone())))? else {
                return Ok(());
            };
            state.remove_user(id)?;
            println!("✅ Usuário removido.");
        }
        _ => {}
    }
    Ok(())
}

fn criteria_tab(state: &mut AppState) -> Result<()> {
    for category in categories(&state.criteria) {
        println!("— {}", category);
        for item in state.criteria.iter().filter(|i| i.category == category) {
            println!("    {:>3}. {}", item.id, item.label);
        }
    }

    let actions = ["Novo critério de inspeção", "Remover critério", "Voltar"];
    match Select::new().items(&actions).default(0).interact()? {
        0 => {
            let request = CreateCriterionRequest {
                label: Input::new().with_prompt("Descrição").interact_text()?,
                category: Input::new().with_prompt("Categoria").interact_text()?,
            };
            match state.add_criterion(request) {
                Ok(criterion) => println!("✅ Critério #{} adicionado.", criterion.id),
                Err(error) => println!("❌ {}", error),
            }
        }
        1 => {
            let labels: Vec<String> = state
                .criteria
                .iter()
                .map(|c| format!("[{}] {}", c.category, c.label))
                .collect();
            if labels.is_empty() {
                return Ok(());
            }
            let mut options = labels.clone();
            options.push("Cancelar".to_string());
            let choice = Select::new().items(&options).default(0).interact()?;
            if choice < labels.len() {
                let id = state.criteria[choice].id;
                state.remove_criterion(id)?;
                println!("✅ Critério removido.");
            }
        }
        _ => {}
    }
    Ok(())
}

fn reports_tab(state: &mut AppState) -> Result<()> {
    let stats = fleet_stats(&state.entries);
    println!();
    println!("  Total de vistorias:  {}", stats.total);
    println!("  Com avaria:          {}", stats.with_issues);
    println!("  Pend. Manutenção:    {}", stats.pending_manutencao);
    println!("  Pend. Operação:      {}", stats.pending_operacao);

    if state.entries.is_empty() {
        println!("Nenhum dado para exportar.");
        return Ok(());
    }

    if Confirm::new()
        .with_prompt("Exportar planilha completa (.csv)?")
        .default(false)
        .interact()?
    {
        let file_name = default_file_name(Utc::now().date_naive());
        write_csv(Path::new(&file_name), &state.entries, &state.criteria)?;
        println!("✅ Planilha gerada: {}", file_name);
    }
    Ok(())
}

/// Selección por nombre con opción de cancelar; devuelve el id elegido
fn pick<I>(items: I) -> Result<Option<uuid::Uuid>>
where
    I: Iterator<Item = (uuid::Uuid, String)>,
{
    let (ids, mut labels): (Vec<_>, Vec<_>) = items.unzip();
    if ids.is_empty() {
        return Ok(None);
    }
    labels.push("Cancelar".to_string());
    let choice = Select::new().items(&labels).default(0).interact()?;
    Ok(ids.get(choice).copied())
}
