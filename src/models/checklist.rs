//! Modelo de ChecklistEntry
//!
//! Este módulo contiene el registro de vistoria (entry), su borrador en
//! curso (draft), la firma del operador y los vistos de aprobación.
//! La serialización conserva los nombres camelCase y las etiquetas
//! acentuadas históricas ("Saída", "Retorno", "Diurno", "Noturno").

use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::criterion::ChecklistItem;
use crate::models::user::User;

/// Turno de la operación
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Shift {
    Diurno,
    Noturno,
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Diurno => write!(f, "Diurno"),
            Shift::Noturno => write!(f, "Noturno"),
        }
    }
}

/// Tipo de vistoria: salida a campo o retorno a la base
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChecklistType {
    #[serde(rename = "Saída")]
    Saida,
    Retorno,
}

impl fmt::Display for ChecklistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistType::Saida => write!(f, "Saída"),
            ChecklistType::Retorno => write!(f, "Retorno"),
        }
    }
}

/// Estado asignado a un ítem inspeccionado
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemStatus {
    Ok,
    Falta,
    Defeituoso,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Ok, ItemStatus::Falta, ItemStatus::Defeituoso];

    /// Un ítem FALTA o DEFEITUOSO constituye una avería
    pub fn is_issue(&self) -> bool {
        matches!(self, ItemStatus::Falta | ItemStatus::Defeituoso)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Ok => write!(f, "OK"),
            ItemStatus::Falta => write!(f, "FALTA"),
            ItemStatus::Defeituoso => write!(f, "DEFEITUOSO"),
        }
    }
}

/// Puntuación definitiva de un ítem dentro de un entry guardado
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemScore {
    pub status: ItemStatus,
    pub vistoria: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
}

/// Puntuación parcial dentro de un borrador: el estado puede faltar
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItemScore {
    pub status: Option<ItemStatus>,
    pub vistoria: bool,
    pub obs: Option<String>,
}

impl Default for DraftItemScore {
    fn default() -> Self {
        // El formulario arranca con la vistoria visual marcada en SIM
        Self { status: None, vistoria: true, obs: None }
    }
}

/// Error al interpretar una firma capturada
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("firma sin prefijo data-URL")]
    MissingPrefix,
    #[error("payload base64 inválido: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// Firma del operador: blob opaco en formato data-URL base64, tal como
/// la producía el pad de firma original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Acepta un data-URL ya capturado, verificando que el payload
    /// base64 decodifique.
    pub fn from_data_url(raw: &str) -> Result<Self, SignatureError> {
        let payload = raw
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or(SignatureError::MissingPrefix)?;
        BASE64.decode(payload)?;
        Ok(Self(raw.to_string()))
    }

    /// Codifica una imagen PNG capturada fuera de la aplicación
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
    }

    /// Firma tipeada (rúbrica textual) para sesiones sin captura gráfica
    pub fn from_text(text: &str) -> Self {
        Self(format!("data:text/plain;base64,{}", BASE64.encode(text.trim())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Visto de un revisor. `user_name` es una copia deliberada del nombre
/// en el momento del visto: es un registro de auditoría, no una
/// referencia viva al usuario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Approval {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

/// Registro de vistoria guardado. Los campos centrales son inmutables;
/// solo los vistos de aprobación se agregan después, y nunca se borran.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub shift: Shift,
    #[serde(rename = "type")]
    pub checklist_type: ChecklistType,
    #[serde(rename = "driverName")]
    pub driver_name: String,
    pub prefix: String,
    #[serde(rename = "vehicleId", skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    pub km: u32,
    pub horimetro: u32,
    /// Snapshot de los ids de criterio evaluados: cambios posteriores en
    /// la plantilla no alteran entries existentes.
    pub items: HashMap<u32, ItemScore>,
    #[serde(rename = "generalObservations")]
    pub general_observations: String,
    /// Clave de ordenación autoritativa
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "operatorSignature", skip_serializing_if = "Option::is_none")]
    pub operator_signature: Option<Signature>,
    #[serde(rename = "maintenanceApproval", skip_serializing_if = "Option::is_none")]
    pub maintenance_approval: Option<Approval>,
    #[serde(rename = "operationApproval", skip_serializing_if = "Option::is_none")]
    pub operation_approval: Option<Approval>,
    /// Derivado al guardar y congelado: nunca se recalcula
    #[serde(rename = "hasIssues")]
    pub has_issues: bool,
}

/// Pendencia de un borrador, con el texto que ve el operador
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftIssue {
    #[error("Selecione um veículo.")]
    MissingVehicle,
    #[error("Informe o nome do motorista.")]
    MissingDriverName,
    #[error("KM não pode ser inferior a {0}.")]
    KmBelowCurrent(u32),
    #[error("Horímetro não pode ser inferior a {0}.")]
    HorimetroBelowCurrent(u32),
    #[error("Informe KM e Horímetro.")]
    MissingReadings,
    #[error("Avalie todos os itens da vistoria.")]
    UnscoredItems,
    #[error("Rubrica/Assinatura é obrigatória.")]
    MissingSignature,
}

/// Borrador en curso de una vistoria. Vive solo en la capa de
/// presentación hasta que el motor de reglas lo finaliza.
#[derive(Debug, Clone)]
pub struct ChecklistDraft {
    pub date: NaiveDate,
    pub shift: Shift,
    pub checklist_type: ChecklistType,
    pub driver_name: String,
    pub vehicle_id: Option<Uuid>,
    /// Prefijo manual cuando el vehículo aún no está registrado
    pub prefix: Option<String>,
    pub km: Option<u32>,
    pub horimetro: Option<u32>,
    pub items: HashMap<u32, DraftItemScore>,
    pub general_observations: String,
    pub user_id: Uuid,
    pub signature: Option<Signature>,
}

impl ChecklistDraft {
    /// Borrador inicial para un operador: fecha de hoy, turno diurno,
    /// salida, y todos los criterios pre-sembrados con vistoria en SIM.
    pub fn new(user: &User, criteria: &[ChecklistItem]) -> Self {
        let items = criteria
            .iter()
            .map(|item| (item.id, DraftItemScore::default()))
            .collect();
        Self {
            date: Utc::now().date_naive(),
            shift: Shift::Diurno,
            checklist_type: ChecklistType::Saida,
            driver_name: String::new(),
            vehicle_id: None,
            prefix: None,
            km: None,
            horimetro: None,
            items,
            general_observations: String::new(),
            user_id: user.id,
            signature: None,
        }
    }

    pub fn score_item(&mut self, item_id: u32, status: ItemStatus) {
        self.items.entry(item_id).or_default().status = Some(status);
    }

    pub fn set_vistoria(&mut self, item_id: u32, vistoria: bool) {
        self.items.entry(item_id).or_default().vistoria = vistoria;
    }

    pub fn set_item_obs(&mut self, item_id: u32, obs: impl Into<String>) {
        let obs = obs.into();
        self.items.entry(item_id).or_default().obs =
            if obs.trim().is_empty() { None } else { Some(obs) };
    }
}
