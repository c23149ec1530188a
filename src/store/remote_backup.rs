//! Respaldo remoto de checklists
//!
//! Tabla REST estilo Supabase con una fila por entry: `id` como clave,
//! el entry completo como payload opaco y su `created_at`. El respaldo
//! es siempre secundario: el guardado local ya es autoritativo antes de
//! que cualquier llamada remota resuelva, y toda falla remota se
//! registra y deja la aplicación en modo solo-local.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::checklist::ChecklistEntry;
use crate::utils::errors::{AppError, AppResult};

const TABLE: &str = "checklist_entries";

/// Fila de la tabla remota
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupRow {
    pub id: Uuid,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Contrato del respaldo remoto: upsert por id y lectura completa
#[async_trait]
pub trait BackupClient: Send + Sync {
    async fn upsert_entry(&self, entry: &ChecklistEntry) -> AppResult<()>;
    async fn fetch_entries(&self) -> AppResult<Vec<ChecklistEntry>>;
}

/// Cliente REST contra Supabase (PostgREST)
pub struct SupabaseBackup {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseBackup {
    /// Construye el cliente solo si ambas credenciales están presentes;
    /// sin configuración la aplicación queda en modo solo-local.
    pub fn from_config(config: &EnvironmentConfig) -> Option<Self> {
        let base_url = config.supabase_url.clone()?;
        let api_key = config.supabase_anon_key.clone()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Some(Self { client, base_url, api_key })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), TABLE)
    }
}

#[async_trait]
impl BackupClient for SupabaseBackup {
    async fn upsert_entry(&self, entry: &ChecklistEntry) -> AppResult<()> {
        let row = BackupRow {
            id: entry.id,
            payload: serde_json::to_value(entry)?,
            created_at: Some(entry.created_at),
        };

        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[row])
            .send()
            .await
            .map_err(|e| AppError::Backup(format!("Error enviando respaldo: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backup(format!(
                "Upsert rechazado con status {}: {}",
                status, body
            )));
        }

        log::debug!("☁️ Entry {} respaldado", entry.id);
        Ok(())
    }

    async fn fetch_entries(&self) -> AppResult<Vec<ChecklistEntry>> {
        let url = format!("{}?select=id,payload,created_at", self.table_url());
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Backup(format!("Error consultando respaldo: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backup(format!(
                "Lectura rechazada con status {}: {}",
                status, body
            )));
        }

        let rows: Vec<BackupRow> = response
            .json()
            .await
            .map_err(|e| AppError::Backup(format!("Respuesta ilegible: {}", e)))?;

        // Filas con payload ilegible se saltan: el resto del respaldo
        // sigue siendo utilizable
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<ChecklistEntry>(row.payload) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    log::warn!("⚠️ Payload remoto ilegible para {}: {}", row.id, error);
                }
            }
        }
        Ok(entries)
    }
}

/// Unión por id de los entries locales y remotos: lo local se preserva
/// siempre, lo remoto desconocido se suma. Ante el mismo id con
/// contenido divergente gana la copia local; no hay resolución por
/// timestamp. Resultado en convención nuevo-primero.
pub fn merge_entries(
    local: Vec<ChecklistEntry>,
    remote: Vec<ChecklistEntry>,
) -> Vec<ChecklistEntry> {
    let known: HashMap<Uuid, &ChecklistEntry> =
        local.iter().map(|entry| (entry.id, entry)).collect();

    let mut incoming = Vec::new();
    for entry in remote {
        match known.get(&entry.id) {
            None => incoming.push(entry),
            Some(ours) if **ours != entry => {
                log::warn!(
                    "⚠️ Entry {} divergente entre local y remoto; se conserva la copia local",
                    entry.id
                );
            }
            Some(_) => {}
        }
    }

    let mut merged = local;
    merged.extend(incoming);
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap as ItemMap;

    use crate::models::checklist::{ChecklistType, Shift};

    fn entry(minutes_ago: i64) -> ChecklistEntry {
        ChecklistEntry {
            id: Uuid::new_v4(),
            date: Utc::now().date_naive(),
            shift: Shift::Diurno,
            checklist_type: ChecklistType::Saida,
            driver_name: "Motorista".to_string(),
            prefix: "SOL-01".to_string(),
            vehicle_id: None,
            km: 1,
            horimetro: 1,
            items: ItemMap::new(),
            general_observations: String::new(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            user_id: Uuid::new_v4(),
            operator_signature: None,
            maintenance_approval: None,
            operation_approval: None,
            has_issues: false,
        }
    }

    #[test]
    fn test_merge_is_union_keyed_by_id() {
        let solo_local = entry(30);
        let compartido = entry(20);
        let solo_remoto = entry(10);

        let merged = merge_entries(
            vec![solo_local.clone(), compartido.clone()],
            vec![compartido.clone(), solo_remoto.clone()],
        );

        assert_eq!(merged.len(), 3);
        // Convención nuevo-primero
        assert_eq!(merged[0].id, solo_remoto.id);
        assert_eq!(merged[2].id, solo_local.id);
    }

    #[test]
    fn test_merge_keeps_local_copy_on_divergent_content() {
        let local = entry(20);
        let mut remote = local.clone();
        remote.general_observations = "editado en otro lado".to_string();

        let merged = merge_entries(vec![local.clone()], vec![remote]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].general_observations, "");
    }

    #[test]
    fn test_merge_of_empty_local_adopts_remote() {
        let remoto = entry(5);
        let merged = merge_entries(Vec::new(), vec![remoto.clone()]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, remoto.id);
    }

    #[test]
    fn test_backup_disabled_without_credentials() {
        let config = EnvironmentConfig {
            data_dir: std::path::PathBuf::from("data"),
            supabase_url: None,
            supabase_anon_key: None,
        };
        assert!(SupabaseBackup::from_config(&config).is_none());
    }
}
