use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{info, warn};

use fleet_checklist::cli;
use fleet_checklist::config::environment::EnvironmentConfig;
use fleet_checklist::services::export_service::{default_file_name, write_csv};
use fleet_checklist::state::AppState;

#[derive(Parser)]
#[command(name = "fleet-checklist", about = "EcoCheck Solurb - Gestão Digital de Frota", version)]
struct Cli {
    /// Directorio de datos (por defecto `data/` o CHECKLIST_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Exporta todos los checklists a una planilla CSV
    Export {
        /// Archivo de salida (por defecto, nombre fechado en el cwd)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🚛 EcoCheck Solurb - Gestão Digital de Frota");
    info!("============================================");

    let args = Cli::parse();
    let mut config = EnvironmentConfig::from_env();
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    if !config.backup_enabled() {
        warn!("⚠️ Credenciales de Supabase ausentes; la aplicación opera en modo solo-local");
    }

    let mut state = AppState::load(&config)?;
    info!(
        "📦 Estado cargado: {} entries, {} vehículos, {} usuarios, {} criterios",
        state.entries.len(),
        state.vehicles.len(),
        state.users.len(),
        state.criteria.len()
    );

    // El guardado local ya es autoritativo: una falla remota solo se
    // registra y la sesión continúa
    match state.sync_remote().await {
        Ok(added) if added > 0 => info!("☁️ {} checklists recuperados del respaldo remoto", added),
        Ok(_) => {}
        Err(error) => warn!("☁️ Respaldo remoto inaccesible: {}", error),
    }

    match args.command {
        Some(Command::Export { output }) => {
            let path = output
                .unwrap_or_else(|| PathBuf::from(default_file_name(Utc::now().date_naive())));
            write_csv(&path, &state.entries, &state.criteria)?;
            info!("📄 Exportación lista: {}", path.display());
        }
        None => cli::run(&mut state)?,
    }

    info!("👋 Sesión terminada");
    Ok(())
}
