//! Formulario de vistoria
//!
//! Asistente de tres pasos, igual que el formulario original: datos del
//! vehículo, vistoria ítem por ítem y validación final con firma. El
//! envío pasa por el motor de reglas; si quedan pendencias se muestran
//! todas juntas.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

use crate::models::checklist::{ChecklistDraft, ChecklistType, ItemStatus, Shift, Signature};
use crate::models::criterion::categories;
use crate::models::user::User;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn new_checklist(state: &mut AppState, user: &User) -> Result<()> {
    println!();
    println!("📝 Novo checklist · Passo 1/3 · Informações do veículo");

    let mut draft = ChecklistDraft::new(user, &state.criteria);

    let kinds = ["Saída do veículo", "Retorno do veículo"];
    draft.checklist_type = match Select::new()
        .with_prompt("Operação")
        .items(&kinds)
        .default(0)
        .interact()?
    {
        0 => ChecklistType::Saida,
        _ => ChecklistType::Retorno,
    };

    let shifts = ["Diurno", "Noturno"];
    draft.shift = match Select::new()
        .with_prompt("Turno")
        .items(&shifts)
        .default(0)
        .interact()?
    {
        0 => Shift::Diurno,
        _ => Shift::Noturno,
    };

    let mut vehicle_labels: Vec<String> = state
        .vehicles
        .iter()
        .map(|v| format!("{} - {}", v.prefix, v.plate))
        .collect();
    vehicle_labels.push("Outro prefixo (veículo não cadastrado)".to_string());
    let choice = Select::new()
        .with_prompt("Selecione o veículo")
        .items(&vehicle_labels)
        .default(0)
        .interact()?;

    match state.vehicles.get(choice) {
        Some(vehicle) => {
            draft.vehicle_id = Some(vehicle.id);
            println!(
                "   KM atual: {} · Horímetro atual: {}h",
                vehicle.current_km, vehicle.current_horimetro
            );
        }
        None => {
            let prefix: String = Input::new().with_prompt("Prefixo").interact_text()?;
            draft.prefix = Some(prefix);
        }
    }

    draft.driver_name = Input::new()
        .with_prompt("Nome do condutor")
        .default(user.name.clone())
        .interact_text()?;
    draft.km = Some(Input::new().with_prompt("KM").interact_text()?);
    draft.horimetro = Some(Input::new().with_prompt("Horímetro").interact_text()?);

    println!();
    println!("🔧 Passo 2/3 · Vistoria dos itens");
    let criteria = state.criteria.clone();
    let statuses: Vec<String> = ItemStatus::ALL.iter().map(|s| s.to_string()).collect();
    for category in categories(&criteria) {
        println!("— {}", category);
        for item in criteria.iter().filter(|i| i.category == category) {
            let choice = Select::new()
                .with_prompt(&item.label)
                .items(&statuses)
                .default(0)
                .interact()?;
            let status = ItemStatus::ALL[choice];
            draft.score_item(item.id, status);

            if status.is_issue() {
                let obs: String = Input::new()
                    .with_prompt("Observação do item")
                    .allow_empty(true)
                    .interact_text()?;
                draft.set_item_obs(item.id, obs);
                let vistoria = Confirm::new()
                    .with_prompt("Item vistoriado visualmente?")
                    .default(true)
                    .interact()?;
                draft.set_vistoria(item.id, vistoria);
            }
        }
    }

    println!();
    println!("✍️ Passo 3/3 · Validação final");
    draft.general_observations = Input::new()
        .with_prompt("Observações gerais (ocorrências, avarias etc.)")
        .allow_empty(true)
        .interact_text()?;

    let modes = ["Assinar digitando o nome", "Usar arquivo PNG com a assinatura"];
    match Select::new()
        .with_prompt("Assinatura do motorista")
        .items(&modes)
        .default(0)
        .interact()?
    {
        0 => {
            let text: String = Input::new()
                .with_prompt("Assinatura (nome completo)")
                .interact_text()?;
            draft.signature = Some(Signature::from_text(&text));
        }
        _ => {
            let path: String = Input::new()
                .with_prompt("Caminho do arquivo PNG")
                .interact_text()?;
            match std::fs::read(path.trim()) {
                Ok(bytes) => draft.signature = Some(Signature::from_png_bytes(&bytes)),
                Err(error) => println!("⚠️ Não foi possível ler o arquivo: {}", error),
            }
        }
    }

    match state.submit_draft(draft) {
        Ok(entry) => {
            let protocol: String = entry.id.to_string().chars().take(8).collect();
            println!("✅ Checklist registrado · protocolo #{}", protocol.to_uppercase());
            if entry.has_issues {
                println!("⚠️ Avaria registrada: aguardando vistos de Manutenção e Operação.");
            }
        }
        Err(AppError::Draft(issues)) => {
            println!("❌ Erro ao enviar:");
            for issue in issues {
                println!("   - {}", issue);
            }
        }
        Err(error) => println!("❌ {}", error),
    }
    Ok(())
}
