//! EcoCheck · checklist de frota
//!
//! Núcleo de la aplicación de vistorias: modelos, motor de reglas,
//! máquina de aprobación, agregador del panel, persistencia local y
//! respaldo remoto opcional, más la capa de presentación en terminal.

pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;
