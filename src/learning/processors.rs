//! Processadores por tipo de aprendizado.
//!
//! Cada processador atualiza apenas as estruturas derivadas do seu tipo e
//! retorna os rótulos do que mudou. O registro já está no histórico
//! quando o processador roda.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;

use crate::atoms::clamp_unit;

use super::engine::{LearningEngine, ANONYMOUS_USER, GENERAL_DOMAIN};
use super::types::{LearningData, LearningType, UserBehaviorPattern};

/// Taxa de aprendizado da atualização de valor por reforço.
const LEARNING_RATE: f64 = 0.1;

/// Confiança de um padrão de comportamento recém-criado.
const INITIAL_BEHAVIOR_CONFIDENCE: f64 = 0.5;

impl LearningEngine {
    pub(super) fn process(&mut self, data: &LearningData) -> Vec<String> {
        match &data.learning_type {
            LearningType::Supervised => self.process_supervised(data),
            LearningType::Unsupervised => self.process_unsupervised(data),
            LearningType::Reinforcement => self.process_reinforcement(data),
            LearningType::Personalization => self.process_personalization(data),
            LearningType::Behavioral => self.process_behavioral(data),
            LearningType::Adaptive => self.process_adaptive(data),
            LearningType::Custom(name) => {
                tracing::debug!(learning_type = %name, "Custom learning type recorded only");
                Vec::new()
            }
        }
    }

    /// Positivo quando o feedback é útil ou a entrada bate com a saída
    /// esperada.
    fn process_supervised(&mut self, data: &LearningData) -> Vec<String> {
        let task = data.task().unwrap_or(GENERAL_DOMAIN).to_string();

        let positive = match (&data.feedback, &data.expected_output) {
            (Some(feedback), _) => feedback.helpful,
            (None, Some(expected)) => *expected == data.input,
            (None, None) => return Vec::new(),
        };

        let performance = self.task_performance.entry(task.clone()).or_default();
        performance.total += 1;
        if positive {
            performance.positive += 1;
        }

        vec![format!("task:{}", task)]
    }

    fn process_unsupervised(&mut self, data: &LearningData) -> Vec<String> {
        let features = extract_features(&data.input);
        if features.is_empty() {
            return Vec::new();
        }

        for feature in &features {
            *self.feature_frequencies.entry(feature.clone()).or_insert(0) += 1;
        }
        vec![format!("features:{}", features.len())]
    }

    /// `q ← q + α · (r − q)` para o par (tarefa, ação).
    fn process_reinforcement(&mut self, data: &LearningData) -> Vec<String> {
        let Some(action) = reinforcement_action(data) else {
            return Vec::new();
        };
        let Some(reward) = reinforcement_reward(data) else {
            return Vec::new();
        };

        let task = data.task().unwrap_or(GENERAL_DOMAIN).to_string();
        let value = self
            .q_values
            .entry((task.clone(), action.clone()))
            .or_insert(0.0);
        *value += LEARNING_RATE * (reward - *value);

        vec![format!("value:{}/{}", task, action)]
    }

    fn process_personalization(&mut self, data: &LearningData) -> Vec<String> {
        let Value::Object(preferences) = &data.input else {
            return Vec::new();
        };
        let user = data.user_id().unwrap_or(ANONYMOUS_USER).to_string();

        self.personalize(&user, preferences.clone());
        vec![format!("personalization:{}", user)]
    }

    fn process_behavioral(&mut self, data: &LearningData) -> Vec<String> {
        let Some(action) = behavioral_action(&data.input) else {
            return Vec::new();
        };
        let user = data.user_id().unwrap_or(ANONYMOUS_USER).to_string();
        let context = data
            .context
            .as_ref()
            .map(|c| c.extra.clone())
            .unwrap_or_default();
        let now = Utc::now();
        let step = self.config.behavior_confidence_step;

        let patterns = self.behaviors.entry(user.clone()).or_insert_with(HashMap::new);
        match patterns.get_mut(&action) {
            Some(pattern) => {
                pattern.frequency += 1;
                pattern.confidence = clamp_unit(pattern.confidence + step);
                pattern.last_seen = now;
                pattern.context = context;
            }
            None => {
                patterns.insert(
                    action.clone(),
                    UserBehaviorPattern {
                        user_id: user.clone(),
                        pattern: action.clone(),
                        frequency: 1,
                        confidence: INITIAL_BEHAVIOR_CONFIDENCE,
                        last_seen: now,
                        context,
                    },
                );
            }
        }

        vec![format!("behavior:{}/{}", user, action)]
    }

    fn process_adaptive(&mut self, data: &LearningData) -> Vec<String> {
        let user = data.user_id().unwrap_or(ANONYMOUS_USER).to_string();
        let domain = data.task().unwrap_or(GENERAL_DOMAIN).to_string();

        self.adapt_to_user(&user, &domain, Some(&data.input));
        vec![format!("strategy:{}/{}", user, domain)]
    }
}

/// Features de uma entrada não supervisionada.
///
/// Objeto: `key:<chave>`; array: `kind:<tipo>` por elemento;
/// texto: `token:<palavra>` em minúsculas.
fn extract_features(input: &Value) -> Vec<String> {
    match input {
        Value::Object(map) => map.keys().map(|k| format!("key:{}", k)).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| format!("kind:{}", value_kind(item)))
            .collect(),
        Value::String(text) => text
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|t| !t.is_empty())
            .map(|t| format!("token:{}", t.to_lowercase()))
            .collect(),
        _ => Vec::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn reinforcement_action(data: &LearningData) -> Option<String> {
    data.feedback
        .as_ref()
        .and_then(|f| f.action_taken.clone())
        .or_else(|| behavioral_action(&data.input))
}

fn reinforcement_reward(data: &LearningData) -> Option<f64> {
    data.feedback
        .as_ref()
        .map(|f| f.reward())
        .or_else(|| data.input.get("reward").and_then(Value::as_f64))
}

/// Ação de `input.action` ou da própria entrada textual.
fn behavioral_action(input: &Value) -> Option<String> {
    match input {
        Value::String(action) if !action.is_empty() => Some(action.clone()),
        Value::Object(map) => map
            .get("action")
            .and_then(Value::as_str)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
