//! ReasoningEngine - registro de estratégias e despacho por tipo.
//!
//! Nenhum erro escapa de `reason()`: falhas e panics de uma estratégia
//! viram um resultado de confiança 0 com `metadata.error = true`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::json;

use crate::atoms::{clamp_unit, Atom, AtomStore};
use crate::patterns::Pattern;
use crate::types::config::ReasoningConfig;

use super::code::{CodeAnalysisStrategy, CodeCompletionStrategy};
use super::strategies::{
    AbductiveStrategy, DeductiveStrategy, InductiveStrategy, ReasoningStrategy, StrategyInput,
};
use super::types::{mean, ReasoningQuery, ReasoningResult, ReasoningType};

/// Cria o registro padrão, na ordem usada pelo modo híbrido.
pub fn default_strategies() -> Vec<Box<dyn ReasoningStrategy>> {
    vec![
        Box::new(DeductiveStrategy),
        Box::new(InductiveStrategy),
        Box::new(AbductiveStrategy),
        Box::new(CodeAnalysisStrategy),
        Box::new(CodeCompletionStrategy),
    ]
}

/// Motor de raciocínio.
pub struct ReasoningEngine {
    config: ReasoningConfig,
    strategies: Vec<Box<dyn ReasoningStrategy>>,
}

impl Default for ReasoningEngine {
    fn default() -> Self {
        Self::new(ReasoningConfig::default())
    }
}

impl ReasoningEngine {
    pub fn new(config: ReasoningConfig) -> Self {
        Self {
            config,
            strategies: default_strategies(),
        }
    }

    /// Registra uma estratégia, substituindo outra de mesmo nome.
    pub fn register(&mut self, strategy: Box<dyn ReasoningStrategy>) {
        match self.strategies.iter().position(|s| s.name() == strategy.name()) {
            Some(index) => self.strategies[index] = strategy,
            None => self.strategies.push(strategy),
        }
    }

    /// Nomes das estratégias registradas.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Executa uma consulta.
    ///
    /// Premissas = atoms da consulta seguidos dos atoms do store.
    /// `confidence_weight` (1.0 = neutro) escala a confiança final.
    pub fn reason(
        &self,
        query: &ReasoningQuery,
        store: &AtomStore,
        patterns: &[Pattern],
        confidence_weight: f64,
    ) -> ReasoningResult {
        let premises: Vec<Atom> = query.atoms.iter().chain(store.iter()).cloned().collect();

        let max_completions = query
            .parameters
            .get("maxCompletions")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(self.config.max_completions);

        let input = StrategyInput {
            query,
            premises: &premises,
            patterns,
            max_completions,
        };

        let reasoning_type = query.effective_type();
        let mut result = match &reasoning_type {
            ReasoningType::Hybrid => self.hybrid(&input),
            ReasoningType::Unknown(name) => {
                tracing::warn!(reasoning_type = %name, "Unsupported reasoning type");
                ReasoningResult::failure(format!("Unsupported reasoning type: {}", name))
                    .with_meta("unsupported_type", json!(name))
            }
            known => match self.find(known.as_str()) {
                Some(strategy) => run_isolated(strategy, &input),
                None => ReasoningResult::failure(format!(
                    "No strategy registered for {}",
                    known.as_str()
                )),
            },
        };

        result.confidence = clamp_unit(result.confidence * confidence_weight);
        result
            .metadata
            .insert("reasoningType".to_string(), json!(reasoning_type.as_str()));

        tracing::debug!(
            reasoning_type = %reasoning_type,
            conclusions = result.conclusion.len(),
            confidence = result.confidence,
            "Reasoning completed"
        );

        result
    }

    fn find(&self, name: &str) -> Option<&dyn ReasoningStrategy> {
        self.strategies
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Fold sobre todas as estratégias registradas.
    ///
    /// Contribuem as que não falham e produzem ao menos uma conclusão.
    fn hybrid(&self, input: &StrategyInput<'_>) -> ReasoningResult {
        let mut contributors = Vec::new();
        let mut failed = Vec::new();
        let mut conclusions = Vec::new();
        let mut confidences = Vec::new();
        let mut explanations = Vec::new();

        for strategy in &self.strategies {
            let result = run_isolated(strategy.as_ref(), input);
            if result.is_error() {
                failed.push(strategy.name().to_string());
                continue;
            }
            if result.conclusion.is_empty() {
                continue;
            }

            contributors.push(strategy.name().to_string());
            confidences.push(result.confidence);
            explanations.push(result.explanation);
            conclusions.extend(result.conclusion);
        }

        if contributors.is_empty() {
            return ReasoningResult::new(
                Vec::new(),
                0.0,
                "No reasoning engine produced results",
            )
            .with_meta("strategies", json!(contributors))
            .with_meta("failed", json!(failed));
        }

        ReasoningResult::new(
            conclusions,
            mean(confidences),
            explanations.join(self.config.explanation_separator.as_str()),
        )
        .with_meta("strategies", json!(contributors))
        .with_meta("failed", json!(failed))
    }
}

/// Executa uma estratégia convertendo erros e panics em falha.
fn run_isolated(strategy: &dyn ReasoningStrategy, input: &StrategyInput<'_>) -> ReasoningResult {
    let name = strategy.name();

    match catch_unwind(AssertUnwindSafe(|| strategy.reason(input))) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::debug!(strategy = name, error = %e, "Reasoning strategy failed");
            ReasoningResult::failure(format!("{} reasoning failed: {}", name, e))
                .with_meta("strategy", json!(name))
        }
        Err(_) => {
            tracing::error!(strategy = name, "Reasoning strategy panicked");
            ReasoningResult::failure(format!("{} reasoning panicked", name))
                .with_meta("strategy", json!(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::AtomType;
    use crate::{NoemaError, NoemaResult};

    struct PanickingStrategy;

    impl ReasoningStrategy for PanickingStrategy {
        fn name(&self) -> &str {
            "deductive"
        }

        fn reason(&self, _input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
            panic!("strategy exploded");
        }
    }

    struct FailingStrategy;

    impl ReasoningStrategy for FailingStrategy {
        fn name(&self) -> &str {
            "flaky"
        }

        fn reason(&self, _input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
            Err(NoemaError::reasoning("unavailable"))
        }
    }

    fn store_with_rule() -> AtomStore {
        let mut store = AtomStore::new();
        store.add(Atom::node(AtomType::ConceptNode, "rain").with_truth(0.9, 0.9));
        store.add(
            Atom::link(
                AtomType::ImplicationLink,
                vec![
                    Atom::node(AtomType::ConceptNode, "rain"),
                    Atom::node(AtomType::ConceptNode, "wet"),
                ],
            )
            .with_truth(0.9, 0.9),
        );
        store.add(Atom::node(AtomType::ConceptNode, "cold").with_truth(0.9, 0.9));
        store.add(
            Atom::link(
                AtomType::ImplicationLink,
                vec![
                    Atom::node(AtomType::ConceptNode, "cold"),
                    Atom::node(AtomType::ConceptNode, "ice"),
                ],
            )
            .with_truth(0.9, 0.9),
        );
        store
    }

    #[test]
    fn test_unknown_type_never_fails() {
        let engine = ReasoningEngine::default();
        let query = ReasoningQuery::new("telepathic");
        let result = engine.reason(&query, &AtomStore::new(), &[], 1.0);

        assert_eq!(result.confidence, 0.0);
        assert!(result.is_error());
        assert!(!result.explanation.is_empty());
        assert_eq!(result.metadata["unsupported_type"], "telepathic");
    }

    #[test]
    fn test_dispatch_to_deductive() {
        let engine = ReasoningEngine::default();
        let result = engine.reason(
            &ReasoningQuery::new("deductive"),
            &store_with_rule(),
            &[],
            1.0,
        );

        assert_eq!(result.conclusion[0].name.as_deref(), Some("wet"));
        assert_eq!(result.metadata["reasoningType"], "deductive");
    }

    #[test]
    fn test_strategy_error_becomes_result() {
        let engine = ReasoningEngine::default();
        let result = engine.reason(
            &ReasoningQuery::new("code-analysis"),
            &AtomStore::new(),
            &[],
            1.0,
        );
        assert!(result.is_error());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_panic_is_isolated() {
        let mut engine = ReasoningEngine::default();
        engine.register(Box::new(PanickingStrategy));

        let result = engine.reason(
            &ReasoningQuery::new("deductive"),
            &store_with_rule(),
            &[],
            1.0,
        );
        assert!(result.is_error());
        assert!(result.explanation.contains("panicked"));
    }

    #[test]
    fn test_hybrid_combines_contributors() {
        let mut engine = ReasoningEngine::default();
        engine.register(Box::new(FailingStrategy));

        let query = ReasoningQuery::hybrid()
            .with_atoms(vec![Atom::node(AtomType::ConceptNode, "wet")])
            .with_code("function check() { return wet; }");
        let result = engine.reason(&query, &store_with_rule(), &[], 1.0);

        let contributors: Vec<&str> = result.metadata["strategies"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(contributors.contains(&"deductive"));
        assert!(contributors.contains(&"abductive"));
        assert!(contributors.contains(&"code-analysis"));
        assert_eq!(result.metadata["failed"], json!(["flaky"]));
        assert!(result.explanation.contains(" | "));
        assert!(!result.is_error());
    }

    #[test]
    fn test_hybrid_with_nothing_to_say() {
        let engine = ReasoningEngine::default();
        let result = engine.reason(&ReasoningQuery::hybrid(), &AtomStore::new(), &[], 1.0);

        assert_eq!(result.confidence, 0.0);
        assert!(result.explanation.contains("No reasoning engine produced results"));
    }

    #[test]
    fn test_confidence_weight_applied_and_clamped() {
        let engine = ReasoningEngine::default();
        let query = ReasoningQuery::new("deductive");

        let neutral = engine.reason(&query, &store_with_rule(), &[], 1.0);
        let boosted = engine.reason(&query, &store_with_rule(), &[], 5.0);
        let damped = engine.reason(&query, &store_with_rule(), &[], 0.5);

        assert_eq!(boosted.confidence, 1.0);
        assert!((damped.confidence - neutral.confidence * 0.5).abs() < 1e-9);
    }
}
