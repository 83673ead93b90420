//! Tipos do reconhecimento de patterns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::config::PatternsConfig;

/// Família de um pattern reconhecido.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatternType {
    /// Detectores estruturais sobre texto de código.
    Code,
    /// Regularidades em sequências.
    Structural,
    /// Ritmo e perfil de uso.
    Behavioral,
    /// Regularidades em conjuntos de atoms.
    AtomSet,
    Custom(String),
}

impl PatternType {
    pub fn as_str(&self) -> &str {
        match self {
            PatternType::Code => "code",
            PatternType::Structural => "structural",
            PatternType::Behavioral => "behavioral",
            PatternType::AtomSet => "atom-set",
            PatternType::Custom(name) => name,
        }
    }
}

impl From<String> for PatternType {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "code" => PatternType::Code,
            "structural" => PatternType::Structural,
            "behavioral" | "behavioural" => PatternType::Behavioral,
            "atom-set" | "atom_set" | "atoms" => PatternType::AtomSet,
            _ => PatternType::Custom(s),
        }
    }
}

impl From<&str> for PatternType {
    fn from(s: &str) -> Self {
        PatternType::from(s.to_string())
    }
}

impl From<PatternType> for String {
    fn from(t: PatternType) -> Self {
        match t {
            PatternType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categoria de um detector de código.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeCategory {
    DesignPattern,
    Async,
    Reactive,
    Structural,
    Syntax,
}

impl CodeCategory {
    /// Multiplicador fixo por categoria, aplicado à densidade de matches.
    pub fn weight(self) -> f64 {
        match self {
            CodeCategory::DesignPattern => 1.2,
            CodeCategory::Async => 1.1,
            CodeCategory::Reactive => 1.15,
            CodeCategory::Structural => 1.0,
            CodeCategory::Syntax => 0.8,
        }
    }
}

/// Posição de um afixo comum em nomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffixPosition {
    Prefix,
    Stem,
}

/// Descrição tagueada de um pattern: nome + parâmetros estruturais.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PatternDescriptor {
    Code {
        detector: String,
        category: CodeCategory,
        matches: usize,
    },
    ArithmeticSequence {
        common_difference: f64,
    },
    GeometricSequence {
        common_ratio: f64,
    },
    Repetition {
        frequency: f64,
        distinct_repeated: usize,
    },
    HierarchicalNesting {
        depth: usize,
    },
    InteractionRhythm {
        mean_interval: f64,
        consistency: f64,
    },
    UsageProfile {
        frequency: f64,
        duration: f64,
        features: Vec<String>,
        efficiency: f64,
    },
    TypeCluster {
        atom_type: String,
    },
    NamingConvention {
        affix: String,
        position: AffixPosition,
    },
}

impl PatternDescriptor {
    /// Nome legível do pattern (para código, o nome do detector).
    pub fn label(&self) -> &str {
        match self {
            PatternDescriptor::Code { detector, .. } => detector,
            PatternDescriptor::ArithmeticSequence { .. } => "arithmetic-sequence",
            PatternDescriptor::GeometricSequence { .. } => "geometric-sequence",
            PatternDescriptor::Repetition { .. } => "repetition",
            PatternDescriptor::HierarchicalNesting { .. } => "hierarchical-nesting",
            PatternDescriptor::InteractionRhythm { .. } => "interaction-rhythm",
            PatternDescriptor::UsageProfile { .. } => "usage-profile",
            PatternDescriptor::TypeCluster { .. } => "type-cluster",
            PatternDescriptor::NamingConvention { .. } => "naming-convention",
        }
    }

    /// Família do pattern.
    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternDescriptor::Code { .. } => PatternType::Code,
            PatternDescriptor::ArithmeticSequence { .. }
            | PatternDescriptor::GeometricSequence { .. }
            | PatternDescriptor::Repetition { .. }
            | PatternDescriptor::HierarchicalNesting { .. } => PatternType::Structural,
            PatternDescriptor::InteractionRhythm { .. }
            | PatternDescriptor::UsageProfile { .. } => PatternType::Behavioral,
            PatternDescriptor::TypeCluster { .. } | PatternDescriptor::NamingConvention { .. } => {
                PatternType::AtomSet
            }
        }
    }
}

/// Tags do pattern usadas na filtragem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMetadata {
    pub pattern_type: PatternType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CodeCategory>,

    /// Confiança antes do reescore.
    pub base_confidence: f64,
}

/// Resultado de reconhecimento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern: PatternDescriptor,
    /// Sempre em [0, 1].
    pub confidence: f64,
    pub instances: Vec<Value>,
    pub metadata: PatternMetadata,
}

impl Pattern {
    /// Cria um pattern; a confiança é limitada a [0, 1].
    pub fn new(pattern: PatternDescriptor, confidence: f64, instances: Vec<Value>) -> Self {
        let confidence = crate::atoms::clamp_unit(confidence);
        let category = match &pattern {
            PatternDescriptor::Code { category, .. } => Some(*category),
            _ => None,
        };

        Self {
            metadata: PatternMetadata {
                pattern_type: pattern.pattern_type(),
                category,
                base_confidence: confidence,
            },
            pattern,
            confidence,
            instances,
        }
    }

    pub fn name(&self) -> &str {
        self.pattern.label()
    }
}

/// Escopo da análise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    Global,
    Local,
    Other(String),
}

impl Scope {
    /// Multiplicador de confiança do escopo.
    pub fn multiplier(&self) -> f64 {
        match self {
            Scope::Global => 1.2,
            Scope::Local => 0.9,
            Scope::Other(_) => 1.0,
        }
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        match s.as_str() {
            "global" => Scope::Global,
            "local" => Scope::Local,
            _ => Scope::Other(s),
        }
    }
}

impl From<Scope> for String {
    fn from(s: Scope) -> Self {
        match s {
            Scope::Global => "global".to_string(),
            Scope::Local => "local".to_string(),
            Scope::Other(other) => other,
        }
    }
}

/// Opções de reconhecimento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognitionOptions {
    pub scope: Option<Scope>,
    pub min_confidence: f64,
    pub include_low_confidence: bool,
    /// Se presente, mantém apenas estes tipos.
    pub pattern_types: Option<Vec<PatternType>>,
    pub max_results: usize,
    /// Peso derivado do aprendizado (1.0 = neutro).
    pub confidence_weight: f64,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self::from_config(&PatternsConfig::default())
    }
}

impl RecognitionOptions {
    /// Opções padrão a partir da configuração.
    pub fn from_config(config: &PatternsConfig) -> Self {
        Self {
            scope: None,
            min_confidence: config.min_confidence,
            include_low_confidence: config.include_low_confidence,
            pattern_types: None,
            max_results: config.max_results,
            confidence_weight: 1.0,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_pattern_types(mut self, types: Vec<PatternType>) -> Self {
        self.pattern_types = Some(types);
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn include_low_confidence(mut self) -> Self {
        self.include_low_confidence = true;
        self
    }
}
