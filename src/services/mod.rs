//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el motor
//! de reglas del checklist, la máquina de aprobación, la política de
//! capacidades, el agregador del panel y los servicios de sesión,
//! administración y exportación.

pub mod admin_service;
pub mod approval_service;
pub mod auth_service;
pub mod authorization_service;
pub mod checklist_rules;
pub mod dashboard_service;
pub mod export_service;
