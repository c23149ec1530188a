//! Capa de presentación y sesión
//!
//! Terminal interactiva de usuario único. Las pantallas solo arman
//! prompts y delegan todas las decisiones en los servicios: acá no se
//! evalúa ninguna regla de negocio.

mod admin;
mod dashboard;
mod form;

use anyhow::Result;
use dialoguer::{Input, Password, Select};

use crate::services::authorization_service::{can_file_checklist, can_manage_fleet};
use crate::state::AppState;

/// Bucle principal de la sesión interactiva
pub fn run(state: &mut AppState) -> Result<()> {
    loop {
        let Some(user) = state.current_user().cloned() else {
            if !login_screen(state)? {
                return Ok(());
            }
            continue;
        };

        println!();
        println!("👤 {} · {}", user.name, user.role.label());

        let mut options: Vec<&str> = vec!["Painel de controle"];
        if can_file_checklist(&user) {
            options.push("Nova vistoria");
        }
        if can_manage_fleet(&user) {
            options.push("Administração");
        }
        options.push("Trocar de usuário");
        options.push("Encerrar");

        let choice = Select::new()
            .with_prompt("Menu")
            .items(&options)
            .default(0)
            .interact()?;

        match options[choice] {
            "Painel de controle" => dashboard::show(state, &user)?,
            "Nova vistoria" => form::new_checklist(state, &user)?,
            "Administração" => admin::panel(state, &user)?,
            "Trocar de usuário" => state.logout()?,
            _ => return Ok(()),
        }
    }
}

/// Pantalla de acceso. Devuelve `false` cuando el usuario decide salir
/// de la aplicación.
fn login_screen(state: &mut AppState) -> Result<bool> {
    println!();
    println!("🚛 EcoCheck Solurb · Gestão Digital de Frota");

    let options = ["Acessar sistema", "Sair do aplicativo"];
    let choice = Select::new().items(&options).default(0).interact()?;
    if choice == 1 {
        return Ok(false);
    }

    let login: String = Input::new()
        .with_prompt("Usuário ou Nome Completo")
        .interact_text()?;
    let password = Password::new()
        .with_prompt("Senha ou Matrícula (obrigatória para operadores)")
        .allow_empty_password(true)
        .interact()?;

    match state.login(&login, &password) {
        Ok(user) => println!("✅ Bem-vindo, {}!", user.name),
        Err(error) => println!("❌ {}", error),
    }
    Ok(true)
}
