//! Tipos de consulta e resultado do raciocínio.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::atoms::Atom;

/// Tipo de raciocínio pedido.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReasoningType {
    Deductive,
    Inductive,
    Abductive,
    CodeAnalysis,
    CodeCompletion,
    /// Combina todas as estratégias registradas.
    Hybrid,
    /// Tipo não suportado; o resultado é sempre confiança 0.
    Unknown(String),
}

impl ReasoningType {
    pub fn as_str(&self) -> &str {
        match self {
            ReasoningType::Deductive => "deductive",
            ReasoningType::Inductive => "inductive",
            ReasoningType::Abductive => "abductive",
            ReasoningType::CodeAnalysis => "code-analysis",
            ReasoningType::CodeCompletion => "code-completion",
            ReasoningType::Hybrid => "hybrid",
            ReasoningType::Unknown(name) => name,
        }
    }
}

impl From<String> for ReasoningType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "deductive" => ReasoningType::Deductive,
            "inductive" => ReasoningType::Inductive,
            "abductive" => ReasoningType::Abductive,
            "code-analysis" => ReasoningType::CodeAnalysis,
            "code-completion" => ReasoningType::CodeCompletion,
            "hybrid" | "mixed" => ReasoningType::Hybrid,
            _ => ReasoningType::Unknown(s),
        }
    }
}

impl From<&str> for ReasoningType {
    fn from(s: &str) -> Self {
        ReasoningType::from(s.to_string())
    }
}

impl From<ReasoningType> for String {
    fn from(t: ReasoningType) -> Self {
        match t {
            ReasoningType::Unknown(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ReasoningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contexto de uma consulta.
///
/// Campos desconhecidos são preservados em `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasoningContext {
    /// Código-fonte sob análise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Símbolos disponíveis no ponto de completion.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,

    /// Texto já digitado antes do cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Consulta de raciocínio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasoningQuery {
    /// Ausente = híbrido.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub reasoning_type: Option<ReasoningType>,

    pub atoms: Vec<Atom>,

    pub context: ReasoningContext,

    pub parameters: Map<String, Value>,
}

impl ReasoningQuery {
    pub fn new(reasoning_type: impl Into<ReasoningType>) -> Self {
        Self {
            reasoning_type: Some(reasoning_type.into()),
            ..Self::default()
        }
    }

    /// Consulta híbrida (sem tipo).
    pub fn hybrid() -> Self {
        Self::default()
    }

    pub fn with_atoms(mut self, atoms: Vec<Atom>) -> Self {
        self.atoms = atoms;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.context.code = Some(code.into());
        self
    }

    pub fn with_context(mut self, context: ReasoningContext) -> Self {
        self.context = context;
        self
    }

    /// Tipo efetivo da consulta.
    pub fn effective_type(&self) -> ReasoningType {
        self.reasoning_type.clone().unwrap_or(ReasoningType::Hybrid)
    }
}

/// Resultado de raciocínio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningResult {
    pub conclusion: Vec<Atom>,
    /// Sempre em [0, 1].
    pub confidence: f64,
    pub explanation: String,
    pub metadata: Map<String, Value>,
}

impl ReasoningResult {
    /// Resultado bem-sucedido; a confiança é limitada a [0, 1].
    pub fn new(conclusion: Vec<Atom>, confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            conclusion,
            confidence: crate::atoms::clamp_unit(confidence),
            explanation: explanation.into(),
            metadata: Map::new(),
        }
    }

    /// Resultado de falha: confiança 0 e `metadata.error = true`.
    pub fn failure(explanation: impl Into<String>) -> Self {
        let mut result = Self::new(Vec::new(), 0.0, explanation);
        result.metadata.insert("error".to_string(), json!(true));
        result
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Verifica a flag de erro.
    pub fn is_error(&self) -> bool {
        self.metadata
            .get("error")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Média aritmética; 0 para lista vazia.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
