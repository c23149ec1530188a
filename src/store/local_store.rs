//! Almacenamiento local
//!
//! Una colección por archivo JSON dentro del directorio de datos. La
//! carga es resiliente por colección: un archivo ausente o corrupto se
//! registra y la colección vuelve a su valor por defecto, la aplicación
//! nunca se cae por datos locales ilegibles.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::checklist::ChecklistEntry;
use crate::models::criterion::ChecklistItem;
use crate::models::user::User;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::AppResult;

const ENTRIES_FILE: &str = "entries.json";
const VEHICLES_FILE: &str = "vehicles.json";
const USERS_FILE: &str = "users.json";
const CRITERIA_FILE: &str = "criteria.json";
const SESSION_FILE: &str = "session.json";

/// Capa clave-valor local: el dueño de todo el estado durable
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: PathBuf) -> AppResult<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Entries en convención nuevo-primero
    pub fn load_entries(&self) -> Vec<ChecklistEntry> {
        self.load_collection(ENTRIES_FILE)
    }

    pub fn save_entries(&self, entries: &[ChecklistEntry]) -> AppResult<()> {
        self.save_collection(ENTRIES_FILE, &entries)
    }

    pub fn load_vehicles(&self) -> Vec<Vehicle> {
        self.load_collection(VEHICLES_FILE)
    }

    pub fn save_vehicles(&self, vehicles: &[Vehicle]) -> AppResult<()> {
        self.save_collection(VEHICLES_FILE, &vehicles)
    }

    pub fn load_users(&self) -> Vec<User> {
        self.load_collection(USERS_FILE)
    }

    pub fn save_users(&self, users: &[User]) -> AppResult<()> {
        self.save_collection(USERS_FILE, &users)
    }

    pub fn load_criteria(&self) -> Vec<ChecklistItem> {
        self.load_collection(CRITERIA_FILE)
    }

    pub fn save_criteria(&self, criteria: &[ChecklistItem]) -> AppResult<()> {
        self.save_collection(CRITERIA_FILE, &criteria)
    }

    /// Usuario con sesión abierta, si quedó uno persistido
    pub fn load_session(&self) -> Option<User> {
        self.load_collection(SESSION_FILE)
    }

    pub fn save_session(&self, session: Option<&User>) -> AppResult<()> {
        match session {
            Some(user) => self.save_collection(SESSION_FILE, user),
            None => {
                let path = self.dir.join(SESSION_FILE);
                if path.exists() {
                    fs::remove_file(path)?;
                }
                Ok(())
            }
        }
    }

    fn load_collection<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        if !path.exists() {
            return T::default();
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) => {
                log::warn!("⚠️ No se pudo leer {}: {}", path.display(), error);
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                log::warn!(
                    "⚠️ Colección {} corrupta, se reinicia vacía: {}",
                    path.display(),
                    error
                );
                T::default()
            }
        }
    }

    fn save_collection<T: Serialize>(&self, file: &str, value: &T) -> AppResult<()> {
        let path = self.dir.join(file);
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(path, raw)?;
        Ok(())
    }
}
