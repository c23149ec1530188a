//! Shared application state
//!
//! Este módulo define el estado explícito de la aplicación: las
//! colecciones en memoria, la sesión vigente y la persistencia. Se
//! construye en `main` y se pasa como argumento; no hay singletons
//! ambientales. El estado es el único dueño de los datos durables: la
//! capa de presentación solo mantiene copias transitorias.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::checklist::{ChecklistDraft, ChecklistEntry};
use crate::models::criterion::{ChecklistItem, CreateCriterionRequest, DEFAULT_CRITERIA};
use crate::models::user::{CreateUserRequest, ReviewRole, User};
use crate::models::vehicle::{CreateVehicleRequest, Vehicle};
use crate::services::{admin_service, approval_service, auth_service, checklist_rules};
use crate::store::local_store::LocalStore;
use crate::store::remote_backup::{merge_entries, BackupClient, SupabaseBackup};
use crate::utils::errors::{not_found_error, AppResult};

pub struct AppState {
    store: LocalStore,
    backup: Option<Arc<SupabaseBackup>>,
    pub vehicles: Vec<Vehicle>,
    pub users: Vec<User>,
    pub criteria: Vec<ChecklistItem>,
    /// Convención nuevo-primero
    pub entries: Vec<ChecklistEntry>,
    session: Option<User>,
}

impl AppState {
    /// Carga todas las colecciones del almacenamiento local. La
    /// plantilla de criterios se siembra en el primer arranque.
    pub fn load(config: &EnvironmentConfig) -> AppResult<Self> {
        let store = LocalStore::new(config.data_dir.clone())?;

        let mut criteria = store.load_criteria();
        if criteria.is_empty() {
            criteria = DEFAULT_CRITERIA.clone();
            store.save_criteria(&criteria)?;
            log::info!("📋 Plantilla inicial sembrada: {} criterios", criteria.len());
        }

        Ok(Self {
            vehicles: store.load_vehicles(),
            users: store.load_users(),
            entries: store.load_entries(),
            session: store.load_session(),
            backup: SupabaseBackup::from_config(config).map(Arc::new),
            criteria,
            store,
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn vehicle_by_id(&self, id: Uuid) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    pub fn entry_by_id(&self, id: Uuid) -> Option<&ChecklistEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    // --- sesión -----------------------------------------------------------

    pub fn login(&mut self, login_input: &str, password_input: &str) -> AppResult<User> {
        let user = auth_service::authenticate(&mut self.users, login_input, password_input)?;
        self.store.save_users(&self.users)?;
        self.session = Some(user.clone());
        self.store.save_session(self.session.as_ref())?;
        Ok(user)
    }

    pub fn logout(&mut self) -> AppResult<()> {
        self.session = None;
        self.store.save_session(None)
    }

    // --- checklists -------------------------------------------------------

    /// Finaliza el borrador con el motor de reglas y lo vuelve durable.
    /// El guardado local es autoritativo; el respaldo remoto se dispara
    /// después y sin esperar su resultado.
    pub fn submit_draft(&mut self, draft: ChecklistDraft) -> AppResult<ChecklistEntry> {
        let vehicle = draft
            .vehicle_id
            .and_then(|id| self.vehicle_by_id(id))
            .cloned();
        let entry = checklist_rules::finalize_entry(draft, vehicle.as_ref(), &self.criteria)?;
        self.save_entry(entry.clone())?;
        Ok(entry)
    }

    /// Inserta el entry al frente del log y avanza los contadores del
    /// vehículo hasta las lecturas aceptadas.
    pub fn save_entry(&mut self, entry: ChecklistEntry) -> AppResult<()> {
        self.entries.insert(0, entry.clone());

        if let Some(vehicle_id) = entry.vehicle_id {
            if let Some(vehicle) = self.vehicles.iter_mut().find(|v| v.id == vehicle_id) {
                vehicle.current_km = entry.km;
                vehicle.current_horimetro = entry.horimetro;
                vehicle.last_updated = Utc::now();
            }
        }

        self.store.save_entries(&self.entries)?;
        self.store.save_vehicles(&self.vehicles)?;
        self.push_backup(entry);
        Ok(())
    }

    /// Aplica el visto del revisor. Devuelve `true` solo si la
    /// transición ocurrió; el rechazo es silencioso y no persiste nada.
    pub fn approve_entry(
        &mut self,
        entry_id: Uuid,
        role: ReviewRole,
        approver: &User,
    ) -> AppResult<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| not_found_error("Checklist", &entry_id.to_string()))?;

        let applied = approval_service::approve(entry, role, approver);
        if applied {
            let entry = entry.clone();
            self.store.save_entries(&self.entries)?;
            self.push_backup(entry);
        }
        Ok(applied)
    }

    /// Upsert remoto de mejor esfuerzo, desacoplado del guardado local
    fn push_backup(&self, entry: ChecklistEntry) {
        let Some(backup) = &self.backup else { return };
        let backup = Arc::clone(backup);
        tokio::spawn(async move {
            if let Err(error) = backup.upsert_entry(&entry).await {
                log::warn!("☁️ Respaldo remoto falló para {}: {}", entry.id, error);
            }
        });
    }

    /// Sincroniza con el respaldo remoto: trae lo desconocido, conserva
    /// lo local y reenvía lo que el servidor todavía no tiene. Devuelve
    /// cuántos entries llegaron del servidor.
    pub async fn sync_remote(&mut self) -> AppResult<usize> {
        let Some(backup) = self.backup.clone() else { return Ok(0) };

        let remote = backup.fetch_entries().await?;
        let remote_ids: HashSet<Uuid> = remote.iter().map(|entry| entry.id).collect();

        let local = std::mem::take(&mut self.entries);
        let before = local.len();
        self.entries = merge_entries(local, remote);
        let added = self.entries.len() - before;

        if added > 0 {
            self.store.save_entries(&self.entries)?;
        }

        // Backfill de lo que el servidor no conoce, también sin bloquear
        let missing: Vec<ChecklistEntry> = self
            .entries
            .iter()
            .filter(|entry| !remote_ids.contains(&entry.id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            log::info!("☁️ Reenviando {} entries al respaldo remoto", missing.len());
            tokio::spawn(async move {
                let results = join_all(missing.iter().map(|entry| backup.upsert_entry(entry))).await;
                for (entry, result) in missing.iter().zip(results) {
                    if let Err(error) = result {
                        log::warn!("☁️ Reenvío falló para {}: {}", entry.id, error);
                    }
                }
            });
        }

        Ok(added)
    }

    // --- administración ---------------------------------------------------

    pub fn add_vehicle(&mut self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        let vehicle = admin_service::add_vehicle(&mut self.vehicles, request)?;
        self.store.save_vehicles(&self.vehicles)?;
        Ok(vehicle)
    }

    pub fn remove_vehicle(&mut self, id: Uuid) -> AppResult<()> {
        admin_service::remove_vehicle(&mut self.vehicles, id)?;
        self.store.save_vehicles(&self.vehicles)
    }

    pub fn add_user(&mut self, request: CreateUserRequest) -> AppResult<User> {
        let user = admin_service::add_user(&mut self.users, request)?;
        self.store.save_users(&self.users)?;
        Ok(user)
    }

    pub fn remove_user(&mut self, id: Uuid) -> AppResult<()> {
        admin_service::remove_user(&mut self.users, id)?;
        self.store.save_users(&self.users)
    }

    pub fn add_criterion(&mut self, request: CreateCriterionRequest) -> AppResult<ChecklistItem> {
        let criterion = admin_service::add_criterion(&mut self.criteria, request)?;
        self.store.save_criteria(&self.criteria)?;
        Ok(criterion)
    }

    pub fn remove_criterion(&mut self, id: u32) -> AppResult<()> {
        admin_service::remove_criterion(&mut self.criteria, id)?;
        self.store.save_criteria(&self.criteria)
    }
}
