//! Tipos compartilhados do Noema.

pub mod config;
pub mod errors;
