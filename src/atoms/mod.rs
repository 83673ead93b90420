//! AtomSpace - armazenamento tipado do grafo de conhecimento.
//!
//! ## Componentes
//!
//! - **Atom**: nó/aresta tipado com anotações de verdade e atenção
//! - **AtomStore**: dono exclusivo dos atoms, com consulta por padrão
//! - **Export/Import**: blob JSON plano, importação tudo-ou-nada

mod atom;
mod export;
mod store;

pub use atom::{clamp_unit, Atom, AtomPattern, AtomType, AtomUpdate, AttentionValue, TruthValue};
pub use export::parse_blob;
pub use store::AtomStore;
