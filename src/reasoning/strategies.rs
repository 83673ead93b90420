//! Estratégias lógicas: dedução, indução e abdução.
//!
//! Cada estratégia tem sua própria política de confiança, refletindo a
//! ordem epistêmica: deduzido > induzido > abduzido.

use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::atoms::{Atom, AtomType};
use crate::patterns::Pattern;
use crate::NoemaResult;

use super::types::{mean, ReasoningQuery, ReasoningResult};

/// Multiplicadores de confiança por estratégia.
const DEDUCTIVE_FACTOR: f64 = 0.9;
const INDUCTIVE_FACTOR: f64 = 0.7;
const ABDUCTIVE_FACTOR: f64 = 0.5;

/// Força mínima de um antecedente para modus ponens.
const MIN_ANTECEDENT_STRENGTH: f64 = 0.5;

/// Entrada comum das estratégias.
pub struct StrategyInput<'a> {
    pub query: &'a ReasoningQuery,
    /// Atoms da consulta seguidos de todos os atoms do store.
    pub premises: &'a [Atom],
    /// Patterns detectados no código do contexto.
    pub patterns: &'a [Pattern],
    pub max_completions: usize,
}

/// Trait para estratégias de raciocínio.
pub trait ReasoningStrategy: Send + Sync {
    /// Nome da estratégia (igual ao tipo de consulta que atende).
    fn name(&self) -> &str;

    /// Executa a estratégia.
    ///
    /// Erros e panics são isolados pelo ReasoningEngine.
    fn reason(&self, input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Dedução
// ═══════════════════════════════════════════════════════════════════════════

/// Modus ponens sobre ImplicationLink e um passo transitivo sobre
/// InheritanceLink.
#[derive(Debug, Clone, Default)]
pub struct DeductiveStrategy;

impl ReasoningStrategy for DeductiveStrategy {
    fn name(&self) -> &str {
        "deductive"
    }

    fn reason(&self, input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
        let derived = deduce(input.premises);

        if derived.conclusions.is_empty() {
            return Ok(ReasoningResult::new(
                Vec::new(),
                0.0,
                "No deductive conclusions follow from the premises",
            )
            .with_meta("strategy", json!(self.name())));
        }

        let confidence = DEDUCTIVE_FACTOR * mean(derived.conclusions.iter().map(Atom::confidence));
        let explanation = format!(
            "Deduced {} conclusion(s): {} by modus ponens, {} by transitivity",
            derived.conclusions.len(),
            derived.modus_ponens,
            derived.transitive
        );

        Ok(ReasoningResult::new(derived.conclusions, confidence, explanation)
            .with_meta("strategy", json!(self.name()))
            .with_meta("modusPonens", json!(derived.modus_ponens))
            .with_meta("transitive", json!(derived.transitive)))
    }
}

/// Conclusões de um passo dedutivo.
pub(crate) struct Deduction {
    pub conclusions: Vec<Atom>,
    pub modus_ponens: usize,
    pub transitive: usize,
}

/// Um passo dedutivo sobre as premissas.
///
/// Força da conclusão = produto das forças; confiança = mínimo.
/// Proposições já conhecidas não são re-deduzidas.
pub(crate) fn deduce(premises: &[Atom]) -> Deduction {
    let known: HashMap<String, &Atom> = premises.iter().fold(HashMap::new(), |mut acc, atom| {
        acc.entry(atom.key()).or_insert(atom);
        acc
    });

    let mut seen: HashSet<String> = known.keys().cloned().collect();
    let mut result = Deduction {
        conclusions: Vec::new(),
        modus_ponens: 0,
        transitive: 0,
    };

    for link in premises.iter().filter(|a| a.atom_type == AtomType::ImplicationLink) {
        let [antecedent, consequent] = link.outgoing_atoms() else {
            continue;
        };
        let Some(fact) = known.get(&antecedent.key()) else {
            continue;
        };
        if fact.strength() < MIN_ANTECEDENT_STRENGTH || !seen.insert(consequent.key()) {
            continue;
        }

        result.conclusions.push(derive(
            consequent,
            fact.strength() * link.strength(),
            fact.confidence().min(link.confidence()),
            "modus-ponens",
        ));
        result.modus_ponens += 1;
    }

    let inheritance: Vec<&Atom> = premises
        .iter()
        .filter(|a| a.atom_type == AtomType::InheritanceLink && a.outgoing_atoms().len() == 2)
        .collect();

    for first in &inheritance {
        let (a, b) = (&first.outgoing_atoms()[0], &first.outgoing_atoms()[1]);
        for second in &inheritance {
            let (b2, c) = (&second.outgoing_atoms()[0], &second.outgoing_atoms()[1]);
            if b.key() != b2.key() || a.key() == c.key() {
                continue;
            }

            let link = Atom::link(AtomType::InheritanceLink, vec![a.clone(), c.clone()]);
            if !seen.insert(link.key()) {
                continue;
            }

            result.conclusions.push(derive(
                &link,
                first.strength() * second.strength(),
                first.confidence().min(second.confidence()),
                "transitivity",
            ));
            result.transitive += 1;
        }
    }

    result
}

/// Cria um atom derivado, sem id, anotado com a regra aplicada.
fn derive(template: &Atom, strength: f64, confidence: f64, rule: &str) -> Atom {
    let mut atom = template.clone();
    atom.id = None;
    atom.with_truth(strength, confidence)
        .with_metadata("derivation", json!(rule))
}

// ═══════════════════════════════════════════════════════════════════════════
// Indução
// ═══════════════════════════════════════════════════════════════════════════

/// Generaliza propriedades compartilhadas pelos membros de uma classe.
#[derive(Debug, Clone, Default)]
pub struct InductiveStrategy;

impl ReasoningStrategy for InductiveStrategy {
    fn name(&self) -> &str {
        "inductive"
    }

    fn reason(&self, input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
        let mut conclusions = induce_rules(input.premises);
        let method = if conclusions.is_empty() {
            conclusions = generalize_type_clusters(input.premises);
            "type-cluster"
        } else {
            "shared-property"
        };

        if conclusions.is_empty() {
            return Ok(ReasoningResult::new(
                Vec::new(),
                0.0,
                "Not enough instances to generalize",
            )
            .with_meta("strategy", json!(self.name())));
        }

        let confidence = INDUCTIVE_FACTOR * mean(conclusions.iter().map(Atom::confidence));
        let explanation = format!(
            "Induced {} generalization(s) by {}",
            conclusions.len(),
            method
        );

        Ok(ReasoningResult::new(conclusions, confidence, explanation)
            .with_meta("strategy", json!(self.name()))
            .with_meta("method", json!(method)))
    }
}

/// `MemberLink/InheritanceLink[x, C]` + `EvaluationLink[P, x]` para ≥2
/// membros de C ⇒ `ImplicationLink[C, P]`.
fn induce_rules(premises: &[Atom]) -> Vec<Atom> {
    // classe -> (atom da classe, chaves dos membros)
    let mut classes: Vec<(String, &Atom, Vec<String>)> = Vec::new();
    // predicado -> (atom do predicado, chaves dos sujeitos)
    let mut predicates: Vec<(String, &Atom, HashSet<String>)> = Vec::new();

    for atom in premises {
        let [first, second] = atom.outgoing_atoms() else {
            continue;
        };
        match atom.atom_type {
            AtomType::MemberLink | AtomType::InheritanceLink => {
                let class_key = second.key();
                let member_key = first.key();
                match classes.iter().position(|(k, _, _)| *k == class_key) {
                    Some(i) => {
                        if !classes[i].2.contains(&member_key) {
                            classes[i].2.push(member_key);
                        }
                    }
                    None => classes.push((class_key, second, vec![member_key])),
                }
            }
            AtomType::EvaluationLink => {
                let predicate_key = first.key();
                match predicates.iter().position(|(k, _, _)| *k == predicate_key) {
                    Some(i) => {
                        predicates[i].2.insert(second.key());
                    }
                    None => predicates.push((
                        predicate_key,
                        first,
                        HashSet::from([second.key()]),
                    )),
                }
            }
            _ => {}
        }
    }

    let mut rules = Vec::new();
    for (_, class, members) in classes.iter().filter(|(_, _, m)| m.len() >= 2) {
        for (_, predicate, subjects) in &predicates {
            let support = members.iter().filter(|m| subjects.contains(*m)).count();
            if support < 2 {
                continue;
            }

            let n = support as f64;
            rules.push(
                Atom::link(
                    AtomType::ImplicationLink,
                    vec![(*class).clone(), (*predicate).clone()],
                )
                .with_truth(n / members.len() as f64, n / (n + 1.0))
                .with_metadata("derivation", json!("induction"))
                .with_metadata("support", json!(support)),
            );
        }
    }

    rules
}

/// Fallback: cada tipo de nó com ≥2 instâncias vira um conceito geral.
fn generalize_type_clusters(premises: &[Atom]) -> Vec<Atom> {
    let nodes: Vec<&Atom> = premises.iter().filter(|a| !a.atom_type.is_link()).collect();
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<(AtomType, Vec<&Atom>)> = Vec::new();
    for node in &nodes {
        match groups.iter().position(|(t, _)| *t == node.atom_type) {
            Some(i) => groups[i].1.push(*node),
            None => groups.push((node.atom_type.clone(), vec![*node])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(atom_type, members)| {
            let n = members.len() as f64;
            let names: Vec<&str> = members.iter().filter_map(|a| a.name.as_deref()).collect();
            Atom::node(AtomType::ConceptNode, atom_type.as_str())
                .with_truth(n / nodes.len() as f64, n / (n + 1.0))
                .with_metadata("derivation", json!("type-cluster"))
                .with_metadata("members", json!(names))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Abdução
// ═══════════════════════════════════════════════════════════════════════════

/// Hipotetiza antecedentes plausíveis para as observações da consulta.
#[derive(Debug, Clone, Default)]
pub struct AbductiveStrategy;

impl ReasoningStrategy for AbductiveStrategy {
    fn name(&self) -> &str {
        "abductive"
    }

    fn reason(&self, input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
        let observations = &input.query.atoms;
        let mut seen = HashSet::new();
        let mut hypotheses = Vec::new();

        for link in input
            .premises
            .iter()
            .filter(|a| a.atom_type == AtomType::ImplicationLink)
        {
            let [antecedent, consequent] = link.outgoing_atoms() else {
                continue;
            };
            let consequent_key = consequent.key();

            for observation in observations.iter().filter(|o| o.key() == consequent_key) {
                if !seen.insert(antecedent.key()) {
                    continue;
                }
                hypotheses.push(derive(
                    antecedent,
                    link.strength() * 0.5,
                    link.confidence().min(observation.confidence()),
                    "abduction",
                ));
            }
        }

        if hypotheses.is_empty() {
            return Ok(ReasoningResult::new(
                Vec::new(),
                0.0,
                "No rule explains the observations",
            )
            .with_meta("strategy", json!(self.name())));
        }

        let confidence = ABDUCTIVE_FACTOR * mean(hypotheses.iter().map(Atom::confidence));
        let explanation = format!(
            "Abduced {} plausible hypothesis(es) for {} observation(s)",
            hypotheses.len(),
            observations.len()
        );

        Ok(ReasoningResult::new(hypotheses, confidence, explanation)
            .with_meta("strategy", json!(self.name())))
    }
}
