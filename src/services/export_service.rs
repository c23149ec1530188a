//! Exportación a planilla
//!
//! Una fila por entry con los metadatos y, por cada criterio de la
//! plantilla, un par de columnas estado/observación. El archivo sale en
//! CSV (RFC 4180) con el nombre fechado de siempre.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::models::checklist::ChecklistEntry;
use crate::models::criterion::ChecklistItem;
use crate::utils::errors::AppResult;

/// Nombre de archivo con la fecha del día
pub fn default_file_name(today: NaiveDate) -> String {
    format!("Checklists_Solurb_{}.csv", today.format("%Y-%m-%d"))
}

/// Cabecera: metadatos fijos más un par de columnas por criterio
pub fn export_headers(criteria: &[ChecklistItem]) -> Vec<String> {
    let mut headers = vec![
        "ID Protocolo".to_string(),
        "Data".to_string(),
        "Tipo".to_string(),
        "Prefixo".to_string(),
        "Motorista".to_string(),
        "KM".to_string(),
        "Horímetro".to_string(),
        "Tem Avaria?".to_string(),
        "Visto Manutenção".to_string(),
        "Visto Operação".to_string(),
        "Obs. Gerais".to_string(),
    ];
    for criterion in criteria {
        headers.push(format!("[{}] {} - Status", criterion.category, criterion.label));
        headers.push(format!("[{}] {} - Obs", criterion.category, criterion.label));
    }
    headers
}

/// Fila de un entry, alineada con `export_headers`
pub fn entry_row(entry: &ChecklistEntry, criteria: &[ChecklistItem]) -> Vec<String> {
    let mut row = vec![
        entry.id.to_string(),
        entry.date.format("%Y-%m-%d").to_string(),
        entry.checklist_type.to_string(),
        entry.prefix.clone(),
        entry.driver_name.clone(),
        entry.km.to_string(),
        entry.horimetro.to_string(),
        if entry.has_issues { "SIM" } else { "NÃO" }.to_string(),
        sign_off(entry.maintenance_approval.as_ref()),
        sign_off(entry.operation_approval.as_ref()),
        entry.general_observations.clone(),
    ];
    for criterion in criteria {
        let score = entry.items.get(&criterion.id);
        row.push(
            score
                .map(|s| s.status.to_string().to_lowercase())
                .unwrap_or_else(|| "n/a".to_string()),
        );
        row.push(
            score
                .and_then(|s| s.obs.clone())
                .unwrap_or_default(),
        );
    }
    row
}

fn sign_off(approval: Option<&crate::models::checklist::Approval>) -> String {
    match approval {
        Some(approval) => format!("OK ({})", approval.user_name),
        None => "PENDENTE".to_string(),
    }
}

/// Todas las filas, en el orden en que llegan los entries
pub fn export_rows(entries: &[ChecklistEntry], criteria: &[ChecklistItem]) -> Vec<Vec<String>> {
    entries.iter().map(|entry| entry_row(entry, criteria)).collect()
}

/// Escribe el CSV completo en disco
pub fn write_csv(
    path: &Path,
    entries: &[ChecklistEntry],
    criteria: &[ChecklistItem],
) -> AppResult<()> {
    let mut out = String::new();
    out.push_str(&render_line(&export_headers(criteria)));
    for row in export_rows(entries, criteria) {
        out.push_str(&render_line(&row));
    }
    fs::write(path, out)?;
    log::info!("📄 Planilla exportada: {} ({} registros)", path.display(), entries.len());
    Ok(())
}

fn render_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|field| csv_escape(field))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
