//! AtomStore - dono exclusivo de todos os Atoms.
//!
//! Mantém os atoms em um HashMap indexado por id, com um vetor auxiliar
//! que preserva a ordem de inserção para iteração estável.

use std::collections::HashMap;

use uuid::Uuid;

use super::atom::{Atom, AtomPattern, AtomUpdate};

/// Armazenamento em memória dos atoms.
#[derive(Debug, Default)]
pub struct AtomStore {
    atoms: HashMap<String, Atom>,
    order: Vec<String>,
}

impl AtomStore {
    /// Cria um store vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere um atom e retorna seu id.
    ///
    /// Atribui um id novo se nenhum for fornecido. Um id já existente é
    /// sobrescrito (upsert), mantendo a posição original na ordem de
    /// inserção.
    pub fn add(&mut self, mut atom: Atom) -> String {
        let id = match atom.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_atom_id(),
        };
        atom.id = Some(id.clone());

        if self.atoms.insert(id.clone(), atom).is_none() {
            self.order.push(id.clone());
        } else {
            tracing::debug!(atom_id = %id, "Atom overwritten");
        }

        id
    }

    /// Busca um atom por id.
    pub fn get(&self, id: &str) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retorna os atoms que casam com o padrão, em ordem de inserção.
    pub fn query(&self, pattern: &AtomPattern) -> Vec<Atom> {
        self.iter().filter(|a| pattern.matches(a)).cloned().collect()
    }

    /// Remove um atom. Retorna `true` se ele existia.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.atoms.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
            true
        } else {
            false
        }
    }

    /// Mescla campos parciais sobre um atom existente.
    ///
    /// O id nunca muda. Retorna `false` se o id é desconhecido.
    pub fn update(&mut self, id: &str, update: AtomUpdate) -> bool {
        match self.atoms.get_mut(id) {
            Some(atom) => {
                update.apply_to(atom);
                true
            }
            None => false,
        }
    }

    /// Número de atoms armazenados.
    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Remove todos os atoms.
    pub fn clear(&mut self) {
        self.atoms.clear();
        self.order.clear();
    }

    /// Itera sobre os atoms em ordem de inserção.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.order.iter().filter_map(|id| self.atoms.get(id))
    }

    /// Ids em ordem de inserção.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Substitui todo o conteúdo por atoms já validados.
    pub(crate) fn replace_all(&mut self, atoms: Vec<Atom>) {
        self.clear();
        for atom in atoms {
            self.add(atom);
        }
    }
}

/// Gera um id opaco para atoms.
pub(crate) fn generate_atom_id() -> String {
    format!("atom-{}", Uuid::new_v4().simple())
}
