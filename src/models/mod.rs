//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos de la aplicación,
//! serializados con el layout JSON histórico del almacenamiento local.

pub mod checklist;
pub mod criterion;
pub mod user;
pub mod vehicle;
