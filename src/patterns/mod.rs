//! Reconhecimento de patterns.
//!
//! ## Detectores
//!
//! - **code**: catálogo de regex sobre texto
//! - **structural**: progressões, repetição e aninhamento em arrays
//! - **behavioral**: ritmo de interação e perfil de uso em objetos
//! - **atom_set**: clusters de tipo e convenções de nome em atoms
//!
//! Todos os resultados passam pelo mesmo pós-processamento
//! (reescore por escopo e instâncias, filtragem, ranking).

mod atom_set;
mod behavioral;
mod code;
mod engine;
mod structural;
mod types;

pub use atom_set::is_atom_shaped;
pub(crate) use atom_set::split_identifier;
pub use code::{catalog, detect_code_patterns, CodeDetector};
pub use engine::{post_process, PatternEngine};
pub use types::{
    AffixPosition, CodeCategory, Pattern, PatternDescriptor, PatternMetadata, PatternType,
    RecognitionOptions, Scope,
};
