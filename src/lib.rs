//! # Noema
//!
//! Motor cognitivo de conhecimento: um AtomSpace tipado em memória com
//! reconhecimento de patterns, raciocínio multi-estratégia e aprendizado
//! que ajusta o comportamento a partir de feedback.
//!
//! ## Módulos
//!
//! - [`atoms`] - Atoms, AtomStore e export/import
//! - [`patterns`] - Reconhecimento de patterns (código, estrutura, comportamento, atoms)
//! - [`reasoning`] - Estratégias de raciocínio e fold híbrido
//! - [`learning`] - Aprendizado, adaptação, comportamento e personalização
//! - [`engine`] - Fachada `CognitiveEngine` dona dos quatro subsistemas
//! - [`cache`] - Cache LRU dos detectores de código
//! - [`hooks`] - Sistema de hooks para customização
//! - [`mcp`] - Servidor MCP (Model Context Protocol)
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Configuração e erros

pub mod atoms;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod hooks;
pub mod learning;
pub mod mcp;
pub mod patterns;
pub mod reasoning;
pub mod types;

pub use engine::CognitiveEngine;
pub use types::config::Config;
pub use types::errors::{NoemaError, NoemaResult};
