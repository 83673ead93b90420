//! Catálogo de detectores de patterns de código.
//!
//! Cada detector é uma entrada de tabela (nome, regex, categoria).
//! Novos detectores são novas linhas na tabela, não novos ramos.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::{CodeCategory, Pattern, PatternDescriptor};

/// Tabela de detectores: (nome, regex, categoria).
const DETECTOR_TABLE: &[(&str, &str, CodeCategory)] = &[
    (
        "function-declaration",
        r"\bfunction\s*\*?\s*[A-Za-z_$][\w$]*\s*\(",
        CodeCategory::Syntax,
    ),
    (
        "arrow-function",
        r"(?:\([^()]*\)|\b[A-Za-z_$][\w$]*)\s*=>",
        CodeCategory::Syntax,
    ),
    (
        "class-declaration",
        r"\bclass\s+[A-Za-z_$][\w$]*",
        CodeCategory::Structural,
    ),
    ("async-await", r"\basync\b|\bawait\b", CodeCategory::Async),
    (
        "promise-chain",
        r"\.then\s*\(|\.catch\s*\(|\.finally\s*\(|\bnew\s+Promise\b",
        CodeCategory::Async,
    ),
    (
        "dependency-injection",
        r"@[Ii]njectable\s*\(|@[Ii]nject\s*\(",
        CodeCategory::DesignPattern,
    ),
    (
        "singleton-registration",
        r"\.inSingletonScope\s*\(|\.getInstance\s*\(|\bstatic\s+instance\b",
        CodeCategory::DesignPattern,
    ),
    (
        "observable",
        r"\bObservable\b|\bSubject\b|\.subscribe\s*\(|\.pipe\s*\(",
        CodeCategory::Reactive,
    ),
];

/// Um detector compilado.
pub struct CodeDetector {
    pub name: &'static str,
    pub category: CodeCategory,
    regex: Regex,
}

impl CodeDetector {
    /// Aplica o detector ao texto.
    ///
    /// Retorna `None` quando não há matches. A confiança é
    /// `min(densidade × peso, 1)`, com densidade = matches por 100
    /// caracteres, limitada a 1.
    pub fn detect(&self, text: &str) -> Option<Pattern> {
        let matches: Vec<Value> = self
            .regex
            .find_iter(text)
            .map(|m| Value::String(m.as_str().trim().to_string()))
            .collect();

        if matches.is_empty() {
            return None;
        }

        let density = density_factor(matches.len(), text.chars().count());
        let confidence = (density * self.category.weight()).min(1.0);

        Some(Pattern::new(
            PatternDescriptor::Code {
                detector: self.name.to_string(),
                category: self.category,
                matches: matches.len(),
            },
            confidence,
            matches,
        ))
    }
}

static CATALOG: LazyLock<Vec<CodeDetector>> = LazyLock::new(|| {
    DETECTOR_TABLE
        .iter()
        .filter_map(|(name, pattern, category)| match Regex::new(pattern) {
            Ok(regex) => Some(CodeDetector {
                name,
                category: *category,
                regex,
            }),
            Err(e) => {
                tracing::error!(detector = name, error = %e, "Invalid detector regex");
                None
            }
        })
        .collect()
});

/// Detectores compilados, na ordem da tabela.
pub fn catalog() -> &'static [CodeDetector] {
    &CATALOG
}

/// Executa todo o catálogo sobre o texto.
pub fn detect_code_patterns(text: &str) -> Vec<Pattern> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    catalog().iter().filter_map(|d| d.detect(text)).collect()
}

/// Matches por 100 caracteres, limitado a 1.
fn density_factor(matches: usize, length: usize) -> f64 {
    if length == 0 {
        return 0.0;
    }
    let per_hundred = length as f64 / 100.0;
    (matches as f64 / per_hundred).min(1.0)
}
