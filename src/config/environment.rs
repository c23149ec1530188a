//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Las credenciales de Supabase son opcionales: sin ellas la aplicación
//! opera en modo solo-local.

use std::env;
use std::path::PathBuf;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub data_dir: PathBuf,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

impl EnvironmentConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("CHECKLIST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            supabase_url: env::var("SUPABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Verificar si el respaldo remoto está configurado
    pub fn backup_enabled(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}
