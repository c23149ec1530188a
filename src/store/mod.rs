//! Capa de persistencia
//!
//! El almacenamiento local es el autoritativo; el respaldo remoto es
//! opcional y de mejor esfuerzo.

pub mod local_store;
pub mod remote_backup;
