//! Detectores sobre conjuntos de atoms.
//!
//! Trabalham sobre `Value` em vez de `Atom` para aceitar também objetos
//! com campos extras vindos de clientes externos.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::types::{AffixPosition, Pattern, PatternDescriptor};

/// Tamanho mínimo de um afixo de nome.
const MIN_AFFIX_LEN: usize = 3;

const NAMING_WEIGHT: f64 = 0.9;

/// Um elemento é "atom-shaped" se for objeto com `type` string.
pub fn is_atom_shaped(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|o| o.get("type"))
        .map(Value::is_string)
        .unwrap_or(false)
}

/// Executa os detectores de conjunto de atoms.
pub fn detect_atom_set_patterns(atoms: &[Value]) -> Vec<Pattern> {
    if atoms.is_empty() {
        return Vec::new();
    }

    let mut patterns = type_clusters(atoms);
    patterns.extend(naming_conventions(atoms));
    patterns
}

/// Um pattern por tipo compartilhado por ≥2 atoms.
fn type_clusters(atoms: &[Value]) -> Vec<Pattern> {
    let mut groups: Vec<(String, Vec<&Value>)> = Vec::new();
    for atom in atoms {
        let Some(atom_type) = atom.get("type").and_then(Value::as_str) else {
            continue;
        };
        match groups.iter().position(|(t, _)| t == atom_type) {
            Some(index) => groups[index].1.push(atom),
            None => groups.push((atom_type.to_string(), vec![atom])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(atom_type, members)| {
            let share = members.len() as f64 / atoms.len() as f64;
            Pattern::new(
                PatternDescriptor::TypeCluster { atom_type },
                share,
                members.into_iter().cloned().collect(),
            )
        })
        .collect()
}

/// Afixos (prefixo ou radical) compartilhados por ≥2 nomes.
fn naming_conventions(atoms: &[Value]) -> Vec<Pattern> {
    let names: Vec<&str> = atoms
        .iter()
        .filter_map(|a| a.get("name").and_then(Value::as_str))
        .collect();
    if names.len() < 2 {
        return Vec::new();
    }

    // (afixo, posição) -> nomes, em ordem de primeira ocorrência
    let mut order: Vec<(String, AffixPosition)> = Vec::new();
    let mut holders: HashMap<(String, AffixPosition), Vec<&str>> = HashMap::new();

    for name in &names {
        let tokens = split_identifier(name);
        for (index, token) in tokens.iter().enumerate() {
            if token.chars().count() < MIN_AFFIX_LEN {
                continue;
            }
            let position = if index == 0 {
                AffixPosition::Prefix
            } else {
                AffixPosition::Stem
            };
            let key = (token.clone(), position);
            let entry = holders.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            if !entry.contains(name) {
                entry.push(*name);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let members = holders.remove(&key)?;
            if members.len() < 2 {
                return None;
            }
            let share = members.len() as f64 / names.len() as f64;
            let (affix, position) = key;
            Some(Pattern::new(
                PatternDescriptor::NamingConvention { affix, position },
                share * NAMING_WEIGHT,
                members.into_iter().map(|n| json!(n)).collect(),
            ))
        })
        .collect()
}

/// Quebra camelCase, PascalCase e snake_case em tokens minúsculos.
pub(crate) fn split_identifier(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
            current.extend(c.to_lowercase());
        } else {
            current.extend(c.to_lowercase());
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
