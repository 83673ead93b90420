//! Export/Import do AtomStore.
//!
//! O formato é um array JSON plano de atoms, sem cabeçalho de versão.
//! Campos aceitos: id, type, name, truthValue, attentionValue, outgoing,
//! incoming, metadata. Qualquer outro formato é erro de parse.

use std::collections::HashSet;
use std::path::Path;

use crate::{NoemaError, NoemaResult};

use super::atom::Atom;
use super::store::{generate_atom_id, AtomStore};

impl AtomStore {
    /// Serializa todos os atoms, em ordem de inserção.
    pub fn export_all(&self) -> NoemaResult<String> {
        let atoms: Vec<&Atom> = self.iter().collect();
        Ok(serde_json::to_string(&atoms)?)
    }

    /// Substitui todo o conteúdo pelo blob.
    ///
    /// O blob é parseado e validado por completo antes de qualquer
    /// mutação: em caso de erro o store permanece intacto.
    pub fn import_all(&mut self, blob: &str) -> NoemaResult<usize> {
        let atoms = parse_blob(blob)?;
        let count = atoms.len();
        self.replace_all(atoms);

        tracing::info!(atoms = count, "Atoms imported");
        Ok(count)
    }

    /// Exporta para arquivo JSON.
    pub fn export_to_file(&self, path: &Path) -> NoemaResult<()> {
        let blob = self.export_all()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, blob)?;

        tracing::info!(
            path = %path.display(),
            atoms = self.size(),
            "AtomStore exported"
        );

        Ok(())
    }

    /// Importa de arquivo JSON, substituindo o conteúdo atual.
    pub fn import_from_file(&mut self, path: &Path) -> NoemaResult<usize> {
        let blob = std::fs::read_to_string(path)?;
        self.import_all(&blob)
    }
}

/// Parseia e valida um blob de exportação sem tocar no store.
pub fn parse_blob(blob: &str) -> NoemaResult<Vec<Atom>> {
    let mut atoms: Vec<Atom> =
        serde_json::from_str(blob).map_err(|e| NoemaError::import(e.to_string()))?;

    let mut seen = HashSet::new();
    for (index, atom) in atoms.iter_mut().enumerate() {
        if !atom.has_valid_truth() {
            return Err(NoemaError::import(format!(
                "atom {} possui truthValue fora de [0, 1]",
                index
            )));
        }

        let id = match atom.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_atom_id(),
        };

        if !seen.insert(id.clone()) {
            return Err(NoemaError::import(format!("id duplicado: {}", id)));
        }
        atom.id = Some(id);
    }

    Ok(atoms)
}
