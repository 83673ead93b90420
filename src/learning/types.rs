//! Tipos do aprendizado: registros, modelos, estratégias e padrões.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Tipo de evento de aprendizado.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LearningType {
    Supervised,
    Unsupervised,
    Reinforcement,
    Personalization,
    Behavioral,
    Adaptive,
    /// Tipo fora do catálogo; apenas registrado no histórico.
    Custom(String),
}

impl LearningType {
    pub fn as_str(&self) -> &str {
        match self {
            LearningType::Supervised => "supervised",
            LearningType::Unsupervised => "unsupervised",
            LearningType::Reinforcement => "reinforcement",
            LearningType::Personalization => "personalization",
            LearningType::Behavioral => "behavioral",
            LearningType::Adaptive => "adaptive",
            LearningType::Custom(name) => name,
        }
    }
}

impl From<String> for LearningType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "supervised" => LearningType::Supervised,
            "unsupervised" => LearningType::Unsupervised,
            "reinforcement" => LearningType::Reinforcement,
            "personalization" => LearningType::Personalization,
            "behavioral" => LearningType::Behavioral,
            "adaptive" => LearningType::Adaptive,
            _ => LearningType::Custom(s),
        }
    }
}

impl From<&str> for LearningType {
    fn from(s: &str) -> Self {
        LearningType::from(s.to_string())
    }
}

impl From<LearningType> for String {
    fn from(t: LearningType) -> Self {
        match t {
            LearningType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for LearningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destino de uma sugestão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Rejected,
    Modified,
    Ignored,
}

impl Outcome {
    /// Recompensa usada no aprendizado por reforço.
    pub fn reward(self) -> f64 {
        match self {
            Outcome::Accepted => 1.0,
            Outcome::Modified => 0.5,
            Outcome::Ignored => -0.25,
            Outcome::Rejected => -1.0,
        }
    }
}

/// Prioridade derivada de um feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Feedback do usuário sobre uma sugestão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    /// Nota de 1 a 5; fora disso a desserialização falha.
    #[serde(deserialize_with = "deserialize_rating")]
    pub rating: u8,
    pub helpful: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,

    /// Tempo gasto, em segundos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl UserFeedback {
    pub fn new(rating: u8, helpful: bool) -> Self {
        Self {
            rating: rating.clamp(1, 5),
            helpful,
            comment: None,
            action_taken: None,
            time_spent: None,
            outcome: None,
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action_taken = Some(action.into());
        self
    }

    /// Nota limitada a [1, 5].
    pub fn bounded_rating(&self) -> u8 {
        self.rating.clamp(1, 5)
    }

    /// Nota ≤ 2 ou não útil → alta; nota 3 → média; resto → baixa.
    pub fn priority(&self) -> Priority {
        let rating = self.bounded_rating();
        if rating <= 2 || !self.helpful {
            Priority::High
        } else if rating == 3 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// Recompensa: pelo outcome, ou `(nota - 3) / 2`.
    pub fn reward(&self) -> f64 {
        match self.outcome {
            Some(outcome) => outcome.reward(),
            None => (self.bounded_rating() as f64 - 3.0) / 2.0,
        }
    }
}

fn deserialize_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = u8::deserialize(deserializer)?;
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(de::Error::custom(format!(
            "rating must be between 1 and 5, got {}",
            rating
        )))
    }
}

/// Contexto de um evento de aprendizado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub preferences: Map<String, Value>,

    /// Demais chaves (comparadas na predição de ações).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LearningContext {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_experience(mut self, level: impl Into<String>) -> Self {
        self.experience_level = Some(level.into());
        self
    }
}

/// Um evento de aprendizado. Uma vez registrado, nunca muda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningData {
    #[serde(rename = "type")]
    pub learning_type: LearningType,

    #[serde(default)]
    pub input: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<UserFeedback>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<LearningContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl LearningData {
    pub fn new(learning_type: impl Into<LearningType>, input: Value) -> Self {
        Self {
            learning_type: learning_type.into(),
            input,
            expected_output: None,
            feedback: None,
            context: None,
            timestamp: None,
            session_id: None,
            priority: None,
        }
    }

    pub fn with_feedback(mut self, feedback: UserFeedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn with_context(mut self, context: LearningContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_expected(mut self, expected: Value) -> Self {
        self.expected_output = Some(expected);
        self
    }

    /// Usuário do contexto, se houver.
    pub fn user_id(&self) -> Option<&str> {
        self.context.as_ref()?.user_id.as_deref()
    }

    /// Tarefa do contexto, se houver.
    pub fn task(&self) -> Option<&str> {
        self.context.as_ref()?.task.as_deref()
    }
}

/// Recibo de um `learn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningReceipt {
    pub session_id: String,
    pub learning_type: LearningType,
    /// Estruturas derivadas atualizadas pelo processador.
    pub effects: Vec<String>,
}

/// Modelo treinável.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningModel {
    pub id: String,

    #[serde(rename = "type")]
    pub model_type: String,

    /// Incrementa em todo retreino.
    pub version: u32,

    pub accuracy: Option<f64>,
    pub confidence: Option<f64>,

    /// Apenas cresce.
    pub training_data: Vec<LearningData>,

    pub parameters: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Estratégia de adaptação por (usuário, domínio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationStrategy {
    pub user_id: String,
    pub domain: String,
    pub parameters: Map<String, Value>,
    /// Sempre em [0, 1].
    pub effectiveness: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ação recorrente de um usuário.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBehaviorPattern {
    pub user_id: String,
    /// Nome da ação.
    pub pattern: String,
    pub frequency: u64,
    pub confidence: f64,
    pub last_seen: DateTime<Utc>,
    /// Contexto da ocorrência mais recente.
    pub context: Map<String, Value>,
}

/// Ação prevista.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPrediction {
    pub action: String,
    pub confidence: f64,
}

/// Preferências de um usuário.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personalization {
    pub preferences: Map<String, Value>,
    pub last_updated: DateTime<Utc>,
}

/// Desempenho supervisionado por tarefa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPerformance {
    pub positive: u64,
    pub total: u64,
}

impl TaskPerformance {
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.positive as f64 / self.total as f64
        }
    }
}

/// Agregados do aprendizado.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_records: usize,
    pub model_accuracy: BTreeMap<String, Option<f64>>,
    pub adaptation_strategies: usize,
    pub behavior_patterns: usize,
    pub personalized_users: usize,
    pub task_performance: BTreeMap<String, TaskPerformance>,
    pub reinforcement_entries: usize,
}
