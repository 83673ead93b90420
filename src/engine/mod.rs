//! Fachada do motor cognitivo.
//!
//! [`CognitiveEngine`] é o único dono do AtomStore e dos três motores, e
//! expõe o conjunto de operações consumido pelo servidor MCP e pela CLI.

mod cognitive;

pub use cognitive::{CognitiveEngine, EngineStatus, PATTERNS_DOMAIN, REASONING_DOMAIN};
