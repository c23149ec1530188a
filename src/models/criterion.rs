//! Modelo de criterio de inspección
//!
//! Cada criterio es un ítem de la plantilla del checklist, agrupado por
//! categoría. La categoría no es una entidad propia: se deriva por
//! unicidad sobre los criterios existentes.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ítem de la plantilla de inspección
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: u32,
    pub label: String,
    pub category: String,
}

/// Request para crear un nuevo criterio
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCriterionRequest {
    #[validate(length(min = 2, max = 100))]
    pub label: String,

    #[validate(length(min = 2, max = 50))]
    pub category: String,
}

/// Siguiente id monotónico para un criterio nuevo
pub fn next_criterion_id(criteria: &[ChecklistItem]) -> u32 {
    criteria.iter().map(|c| c.id).max().map_or(1, |max| max + 1)
}

/// Categorías únicas en orden de aparición
pub fn categories(criteria: &[ChecklistItem]) -> Vec<&str> {
    let mut seen = Vec::new();
    for item in criteria {
        if !seen.contains(&item.category.as_str()) {
            seen.push(item.category.as_str());
        }
    }
    seen
}

lazy_static! {
    /// Plantilla inicial de inspección. Solo se usa para sembrar la
    /// colección de criterios en el primer arranque; después el admin
    /// la edita libremente.
    pub static ref DEFAULT_CRITERIA: Vec<ChecklistItem> = {
        let template = [
            ("MECÂNICA", "Pneus e calibragem"),
            ("MECÂNICA", "Freios de serviço e estacionamento"),
            ("MECÂNICA", "Nível de óleo do motor"),
            ("MECÂNICA", "Nível de água do radiador"),
            ("MECÂNICA", "Vazamentos visíveis"),
            ("ELÉTRICA", "Faróis e lanternas"),
            ("ELÉTRICA", "Setas e pisca-alerta"),
            ("ELÉTRICA", "Luz de ré e alarme sonoro"),
            ("ELÉTRICA", "Painel de instrumentos"),
            ("SEGURANÇA", "Cinto de segurança"),
            ("SEGURANÇA", "Extintor de incêndio"),
            ("SEGURANÇA", "Triângulo, macaco e chave de roda"),
            ("SEGURANÇA", "Retrovisores e para-brisa"),
            ("SEGURANÇA", "Buzina"),
            ("CONSERVAÇÃO", "Limpeza da cabine"),
            ("CONSERVAÇÃO", "Lataria e pintura"),
            ("CONSERVAÇÃO", "Compartimento de carga"),
        ];
        template
            .iter()
            .enumerate()
            .map(|(index, (category, label))| ChecklistItem {
                id: index as u32 + 1,
                label: (*label).to_string(),
                category: (*category).to_string(),
            })
            .collect()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_criterion_id_is_monotonic() {
        assert_eq!(next_criterion_id(&[]), 1);

        let criteria = vec![
            ChecklistItem { id: 3, label: "Buzina".to_string(), category: "SEGURANÇA".to_string() },
            ChecklistItem { id: 7, label: "Freios".to_string(), category: "MECÂNICA".to_string() },
        ];
        assert_eq!(next_criterion_id(&criteria), 8);
    }

    #[test]
    fn test_categories_preserve_first_appearance_order() {
        let cats = categories(&DEFAULT_CRITERIA);
        assert_eq!(cats, vec!["MECÂNICA", "ELÉTRICA", "SEGURANÇA", "CONSERVAÇÃO"]);
    }

    #[test]
    fn test_default_template_ids_are_unique() {
        let mut ids: Vec<u32> = DEFAULT_CRITERIA.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DEFAULT_CRITERIA.len());
    }
}
