//! Estratégias sobre código: análise de qualidade e completion.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;

use crate::atoms::{clamp_unit, Atom, AtomType};
use crate::patterns::{detect_code_patterns, Pattern, PatternDescriptor};
use crate::{NoemaError, NoemaResult};

use super::strategies::{deduce, ReasoningStrategy, StrategyInput};
use super::types::{mean, ReasoningResult};

const LONG_LINE: usize = 120;
const DEEP_NESTING: usize = 4;
const COMPLETION_CONFIDENCE_CAP: f64 = 0.9;
const DOMINANT_CONCEPTS: usize = 5;

static TODO_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(TODO|FIXME|XXX|HACK)\b").ok());

static TRAILING_IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_$][\w$]*$").ok());

// ═══════════════════════════════════════════════════════════════════════════
// Análise
// ═══════════════════════════════════════════════════════════════════════════

/// Métricas estruturais de um trecho de código.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    pub lines: usize,
    pub non_empty_lines: usize,
    pub comment_ratio: f64,
    pub max_nesting: usize,
    pub long_lines: usize,
    pub functions: usize,
    pub todos: usize,
}

impl CodeMetrics {
    /// Mede o código.
    pub fn measure(code: &str) -> Self {
        let lines: Vec<&str> = code.lines().collect();
        let non_empty: Vec<&str> = lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        let comments = non_empty
            .iter()
            .filter(|l| {
                l.starts_with("//")
                    || l.starts_with('#')
                    || l.starts_with("/*")
                    || l.starts_with('*')
                    || l.starts_with("--")
            })
            .count();

        let mut depth = 0usize;
        let mut max_nesting = 0usize;
        for c in code.chars() {
            match c {
                '{' => {
                    depth += 1;
                    max_nesting = max_nesting.max(depth);
                }
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        let functions = detect_code_patterns(code)
            .iter()
            .filter_map(|p| match &p.pattern {
                PatternDescriptor::Code {
                    detector, matches, ..
                } if detector == "function-declaration" || detector == "arrow-function" => {
                    Some(*matches)
                }
                _ => None,
            })
            .sum();

        let todos = TODO_MARKER
            .as_ref()
            .map(|re| re.find_iter(code).count())
            .unwrap_or(0);

        Self {
            lines: lines.len(),
            non_empty_lines: non_empty.len(),
            comment_ratio: if non_empty.is_empty() {
                0.0
            } else {
                comments as f64 / non_empty.len() as f64
            },
            max_nesting,
            long_lines: lines
                .iter()
                .filter(|l| l.chars().count() > LONG_LINE)
                .count(),
            functions,
            todos,
        }
    }

    /// Score de qualidade em [0, 1] e sugestões correspondentes.
    pub fn assess(&self) -> (f64, Vec<String>) {
        let mut quality: f64 = 1.0;
        let mut suggestions = Vec::new();

        if self.max_nesting > DEEP_NESTING {
            quality -= (0.1 * (self.max_nesting - DEEP_NESTING) as f64).min(0.3);
            suggestions.push(format!(
                "Reduce nesting depth ({} levels); extract inner blocks into functions",
                self.max_nesting
            ));
        }

        if self.long_lines > 0 {
            quality -= (0.02 * self.long_lines as f64).min(0.2);
            suggestions.push(format!(
                "Wrap {} line(s) longer than {} characters",
                self.long_lines, LONG_LINE
            ));
        }

        if self.non_empty_lines > 20 && self.comment_ratio < 0.05 {
            quality -= 0.1;
            suggestions.push("Document non-obvious logic; comment ratio is below 5%".to_string());
        }

        if self.todos > 0 {
            quality -= (0.05 * self.todos as f64).min(0.15);
            suggestions.push(format!("Resolve {} pending TODO/FIXME marker(s)", self.todos));
        }

        if self.functions > 0 && self.non_empty_lines / self.functions > 50 {
            quality -= 0.1;
            suggestions.push("Split long functions into smaller units".to_string());
        } else if self.functions == 0 && self.non_empty_lines > 50 {
            quality -= 0.1;
            suggestions.push("Organize top-level code into functions".to_string());
        }

        (clamp_unit(quality), suggestions)
    }
}

/// Heurísticas de qualidade sobre `context.code`.
#[derive(Debug, Clone, Default)]
pub struct CodeAnalysisStrategy;

impl ReasoningStrategy for CodeAnalysisStrategy {
    fn name(&self) -> &str {
        "code-analysis"
    }

    fn reason(&self, input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
        let code = input
            .query
            .context
            .code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| NoemaError::reasoning("code analysis requires context.code"))?;

        let metrics = CodeMetrics::measure(code);
        let (quality, suggestions) = metrics.assess();
        let confidence = 0.6 + 0.3 * (metrics.non_empty_lines as f64 / 50.0).min(1.0);

        let assessment = Atom::node(AtomType::ConceptNode, "code-quality")
            .with_truth(quality, confidence)
            .with_metadata("metrics", json!(metrics))
            .with_metadata("suggestions", json!(suggestions));

        let explanation = format!(
            "Code quality {:.2} over {} non-empty line(s), {} suggestion(s)",
            quality,
            metrics.non_empty_lines,
            suggestions.len()
        );

        Ok(ReasoningResult::new(vec![assessment], confidence, explanation)
            .with_meta("strategy", json!(self.name()))
            .with_meta("quality", json!(quality))
            .with_meta("metrics", json!(metrics))
            .with_meta("suggestions", json!(suggestions)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Completion
// ═══════════════════════════════════════════════════════════════════════════

/// Snippets sugeridos por detector.
const SNIPPETS: &[(&str, &str)] = &[
    ("function-declaration", "return "),
    ("arrow-function", "() => {}"),
    ("class-declaration", "constructor() {}"),
    ("async-await", "await "),
    ("promise-chain", ".then((result) => {})"),
    ("dependency-injection", "@Inject()"),
    ("singleton-registration", ".inSingletonScope()"),
    ("observable", ".pipe()"),
];

/// Resumo do contexto de completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub scope: String,
    pub symbols: Vec<String>,
    pub recent_patterns: Vec<String>,
    pub dominant_concepts: Vec<String>,
}

impl ContextSummary {
    pub fn build(input: &StrategyInput<'_>) -> Self {
        let context = &input.query.context;

        let mut symbols = context.symbols.clone();
        for atom in input.premises {
            let is_symbol = matches!(
                atom.atom_type,
                AtomType::FunctionNode
                    | AtomType::ClassNode
                    | AtomType::VariableNode
                    | AtomType::ModuleNode
            );
            if !is_symbol {
                continue;
            }
            if let Some(name) = atom.name.as_ref().filter(|n| !symbols.contains(n)) {
                symbols.push(name.clone());
            }
        }

        let recent_patterns = input.patterns.iter().map(|p| p.name().to_string()).collect();

        Self {
            scope: context.scope.clone().unwrap_or_else(|| "global".to_string()),
            symbols,
            recent_patterns,
            dominant_concepts: dominant_concepts(input.premises),
        }
    }
}

/// Nomes mais frequentes entre premissas e seus filhos.
fn dominant_concepts(premises: &[Atom]) -> Vec<String> {
    fn visit<'a>(atom: &'a Atom, counts: &mut HashMap<&'a str, usize>, order: &mut Vec<&'a str>) {
        if let Some(name) = atom.name.as_deref() {
            let count = counts.entry(name).or_insert_with(|| {
                order.push(name);
                0
            });
            *count += 1;
        }
        for child in atom.outgoing_atoms() {
            visit(child, counts, order);
        }
    }

    let mut counts = HashMap::new();
    let mut order = Vec::new();
    for atom in premises {
        visit(atom, &mut counts, &mut order);
    }

    // sort estável: empates mantêm a ordem de primeira ocorrência
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(DOMINANT_CONCEPTS)
        .map(str::to_string)
        .collect()
}

struct Candidate {
    text: String,
    source: &'static str,
    strength: f64,
    confidence: f64,
    relevance: f64,
}

impl Candidate {
    fn score(&self) -> f64 {
        self.strength + 0.3 * self.confidence + 0.2 * self.relevance
    }

    fn into_atom(self) -> Atom {
        let score = self.score();
        Atom::node(AtomType::ConceptNode, self.text)
            .with_truth(self.strength, self.confidence)
            .with_metadata("source", json!(self.source))
            .with_metadata("score", json!(score))
            .with_metadata("relevance", json!(self.relevance))
    }
}

/// Completion a partir de patterns, símbolos e dedução.
#[derive(Debug, Clone, Default)]
pub struct CodeCompletionStrategy;

impl ReasoningStrategy for CodeCompletionStrategy {
    fn name(&self) -> &str {
        "code-completion"
    }

    fn reason(&self, input: &StrategyInput<'_>) -> NoemaResult<ReasoningResult> {
        let summary = ContextSummary::build(input);
        let prefix = completion_prefix(input);

        let mut candidates = Vec::new();

        for pattern in input.patterns {
            let Some((_, snippet)) = SNIPPETS.iter().find(|(name, _)| *name == pattern.name()) else {
                continue;
            };
            candidates.push(Candidate {
                text: snippet.to_string(),
                source: "pattern",
                strength: pattern.confidence,
                confidence: 0.6,
                relevance: 0.5,
            });
        }

        if let Some(prefix) = prefix.as_deref() {
            let lowered = prefix.to_lowercase();
            for symbol in &summary.symbols {
                let candidate = symbol.to_lowercase();
                if candidate.starts_with(&lowered) && candidate != lowered {
                    candidates.push(Candidate {
                        text: symbol.clone(),
                        source: "symbol",
                        strength: 0.8,
                        confidence: 0.7,
                        relevance: prefix.chars().count() as f64 / symbol.chars().count() as f64,
                    });
                }
            }
        }

        for conclusion in deduce(input.premises).conclusions {
            let Some(name) = conclusion.name.clone() else {
                continue;
            };
            let relevance = if summary.dominant_concepts.contains(&name) {
                1.0
            } else {
                0.3
            };
            candidates.push(Candidate {
                text: name,
                source: "deduction",
                strength: conclusion.strength(),
                confidence: conclusion.confidence(),
                relevance,
            });
        }

        // Mesmo texto vindo de fontes diferentes: fica a cópia de maior score
        candidates.sort_by(|a, b| b.score().total_cmp(&a.score()));
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.text.clone()));
        candidates.truncate(input.max_completions);

        let summary_json = json!(summary);
        if candidates.is_empty() {
            return Ok(
                ReasoningResult::new(Vec::new(), 0.0, "No completion candidates in context")
                    .with_meta("strategy", json!(self.name()))
                    .with_meta("contextSummary", summary_json),
            );
        }

        let confidence =
            (mean(candidates.iter().map(|c| c.confidence)) * 0.9).min(COMPLETION_CONFIDENCE_CAP);
        let explanation = format!(
            "Ranked {} completion candidate(s) in {} scope",
            candidates.len(),
            summary.scope
        );
        let completions: Vec<Atom> = candidates.into_iter().map(Candidate::into_atom).collect();

        Ok(ReasoningResult::new(completions, confidence, explanation)
            .with_meta("strategy", json!(self.name()))
            .with_meta("contextSummary", summary_json))
    }
}

/// Prefixo explícito, ou o identificador no fim do código.
fn completion_prefix(input: &StrategyInput<'_>) -> Option<String> {
    let context = &input.query.context;
    if let Some(prefix) = context.prefix.as_ref().filter(|p| !p.is_empty()) {
        return Some(prefix.clone());
    }

    let code = context.code.as_deref()?;
    let re = TRAILING_IDENTIFIER.as_ref()?;
    re.find(code.trim_end()).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::ReasoningQuery;

    fn input<'a>(
        query: &'a ReasoningQuery,
        premises: &'a [Atom],
        patterns: &'a [Pattern],
    ) -> StrategyInput<'a> {
        StrategyInput {
            query,
            premises,
            patterns,
            max_completions: 10,
        }
    }

    #[test]
    fn test_metrics() {
        let code = "// loader\nfunction load() {\n  if (x) {\n    return 1; // TODO cache\n  }\n}\n\n";
        let metrics = CodeMetrics::measure(code);

        assert_eq!(metrics.lines, 7);
        assert_eq!(metrics.non_empty_lines, 6);
        assert_eq!(metrics.max_nesting, 2);
        assert_eq!(metrics.functions, 1);
        assert_eq!(metrics.todos, 1);
        assert_eq!(metrics.long_lines, 0);
    }

    #[test]
    fn test_deep_nesting_lowers_quality() {
        let flat = CodeMetrics::measure("function a() { return 1; }");
        let deep = CodeMetrics::measure("function a() { { { { { { return 1; } } } } } }");

        let (flat_quality, flat_suggestions) = flat.assess();
        let (deep_quality, deep_suggestions) = deep.assess();

        assert_eq!(flat_quality, 1.0);
        assert!(flat_suggestions.is_empty());
        assert!(deep_quality < flat_quality);
        assert!(deep_suggestions.iter().any(|s| s.contains("nesting")));
    }

    #[test]
    fn test_analysis_requires_code() {
        let query = ReasoningQuery::new("code-analysis");
        let result = CodeAnalysisStrategy.reason(&input(&query, &[], &[]));
        assert!(matches!(result, Err(NoemaError::Reasoning(_))));
    }

    #[test]
    fn test_analysis_confidence_grows_with_size() {
        let query = ReasoningQuery::new("code-analysis").with_code("function f() { return 1; }");
        let result = CodeAnalysisStrategy.reason(&input(&query, &[], &[])).unwrap();

        assert!((result.confidence - (0.6 + 0.3 / 50.0)).abs() < 1e-9);
        assert_eq!(result.conclusion[0].name.as_deref(), Some("code-quality"));
        assert!(result.metadata.contains_key("suggestions"));
    }

    #[test]
    fn test_completion_ranks_symbols_by_prefix() {
        let premises = vec![
            Atom::node(AtomType::FunctionNode, "getUserData"),
            Atom::node(AtomType::FunctionNode, "getUserName"),
            Atom::node(AtomType::FunctionNode, "deleteUser"),
        ];
        let query = ReasoningQuery::new("code-completion").with_code("const value = getUser");
        let result = CodeCompletionStrategy
            .reason(&input(&query, &premises, &[]))
            .unwrap();

        let names: Vec<_> = result
            .conclusion
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"getUserData"));
        assert!(!names.contains(&"deleteUser"));
        assert!(result.confidence <= 0.9);
        assert!((result.confidence - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_completion_uses_patterns_and_deduction() {
        let code = "async function load() { await fetch(url); }";
        let patterns = detect_code_patterns(code);
        let premises = vec![
            Atom::node(AtomType::ConceptNode, "loading"),
            Atom::link(
                AtomType::ImplicationLink,
                vec![
                    Atom::node(AtomType::ConceptNode, "loading"),
                    Atom::node(AtomType::ConceptNode, "showSpinner"),
                ],
            ),
        ];
        let query = ReasoningQuery::new("code-completion").with_code(code);
        let result = CodeCompletionStrategy
            .reason(&input(&query, &premises, &patterns))
            .unwrap();

        let sources: Vec<_> = result
            .conclusion
            .iter()
            .filter_map(|a| a.metadata.as_ref()?.get("source")?.as_str())
            .collect();
        assert!(sources.contains(&"pattern"));
        assert!(sources.contains(&"deduction"));

        let scores: Vec<f64> = result
            .conclusion
            .iter()
            .filter_map(|a| a.metadata.as_ref()?.get("score")?.as_f64())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_completion_truncates() {
        let premises: Vec<Atom> = (0..20)
            .map(|i| Atom::node(AtomType::VariableNode, format!("item{}", i)))
            .collect();
        let query = ReasoningQuery::new("code-completion").with_code("item");
        let mut strategy_input = input(&query, &premises, &[]);
        strategy_input.max_completions = 3;

        let result = CodeCompletionStrategy.reason(&strategy_input).unwrap();
        assert_eq!(result.conclusion.len(), 3);
    }

    #[test]
    fn test_dominant_concepts() {
        let cat = || Atom::node(AtomType::ConceptNode, "cat");
        let premises = vec![
            cat(),
            Atom::link(
                AtomType::InheritanceLink,
                vec![cat(), Atom::node(AtomType::ConceptNode, "animal")],
            ),
        ];
        assert_eq!(dominant_concepts(&premises), vec!["cat", "animal"]);
    }
}
