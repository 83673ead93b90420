//! LearningEngine - histórico append-only e estruturas derivadas.
//!
//! Dono exclusivo de modelos, estratégias de adaptação, padrões de
//! comportamento e preferências. Cada operação pública roda até o fim
//! sob `&mut self`, então a nudge de feedback e o registro que a originou
//! são observados juntos.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::atoms::clamp_unit;
use crate::types::config::LearningConfig;
use crate::{NoemaError, NoemaResult};

use super::types::{
    ActionPrediction, AdaptationStrategy, LearningContext, LearningData, LearningModel,
    LearningReceipt, LearningStats, LearningType, Personalization, TaskPerformance,
    UserBehaviorPattern, UserFeedback,
};

/// Usuário atribuído a eventos sem `userId`.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Domínio padrão de adaptação.
pub const GENERAL_DOMAIN: &str = "general";

const INITIAL_EFFECTIVENESS: f64 = 0.5;
const BASE_RECOMMENDATION_CONFIDENCE: f64 = 0.5;

/// Motor de aprendizado.
pub struct LearningEngine {
    pub(super) config: LearningConfig,
    pub(super) history: Vec<LearningData>,
    models: HashMap<String, LearningModel>,
    model_order: Vec<String>,
    next_model_id: u64,
    strategies: HashMap<(String, String), AdaptationStrategy>,
    /// usuário -> ação -> padrão
    pub(super) behaviors: HashMap<String, HashMap<String, UserBehaviorPattern>>,
    personalization: HashMap<String, Personalization>,
    pub(super) task_performance: HashMap<String, TaskPerformance>,
    pub(super) feature_frequencies: HashMap<String, u64>,
    /// (tarefa, ação) -> estimativa de valor
    pub(super) q_values: HashMap<(String, String), f64>,
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new(LearningConfig::default())
    }
}

impl LearningEngine {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
            models: HashMap::new(),
            model_order: Vec::new(),
            next_model_id: 1,
            strategies: HashMap::new(),
            behaviors: HashMap::new(),
            personalization: HashMap::new(),
            task_performance: HashMap::new(),
            feature_frequencies: HashMap::new(),
            q_values: HashMap::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registro
    // ═══════════════════════════════════════════════════════════════════════

    /// Registra um evento e despacha para o processador do seu tipo.
    ///
    /// Preenche `timestamp` e `sessionId` quando ausentes.
    pub fn learn(&mut self, mut data: LearningData) -> LearningReceipt {
        if data.timestamp.is_none() {
            data.timestamp = Some(Utc::now());
        }
        let session_id = data
            .session_id
            .get_or_insert_with(generate_session_id)
            .clone();

        self.history.push(data.clone());
        let effects = self.process(&data);

        tracing::debug!(
            session_id = %session_id,
            learning_type = %data.learning_type,
            effects = effects.len(),
            "Learning event recorded"
        );

        LearningReceipt {
            session_id,
            learning_type: data.learning_type,
            effects,
        }
    }

    /// Registra feedback como evento supervisionado e ajusta a
    /// efetividade da estratégia (usuário, tarefa|"general").
    pub fn learn_from_feedback(
        &mut self,
        feedback: UserFeedback,
        context: LearningContext,
    ) -> LearningReceipt {
        let user = context
            .user_id
            .clone()
            .unwrap_or_else(|| ANONYMOUS_USER.to_string());
        let domain = context
            .task
            .clone()
            .unwrap_or_else(|| GENERAL_DOMAIN.to_string());
        let helpful = feedback.helpful;

        let mut data = LearningData::new(LearningType::Supervised, json!(&feedback))
            .with_feedback(feedback)
            .with_context(context);
        data.priority = data.feedback.as_ref().map(UserFeedback::priority);

        let mut receipt = self.learn(data);

        let step = if helpful {
            self.config.effectiveness_step
        } else {
            -self.config.effectiveness_step
        };
        let strategy = self.strategy_entry(&user, &domain);
        strategy.effectiveness = clamp_unit(strategy.effectiveness + step);
        strategy.updated_at = Utc::now();

        receipt.effects.push(format!("strategy:{}/{}", user, domain));
        receipt
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Adaptação
    // ═══════════════════════════════════════════════════════════════════════

    /// Busca ou cria a estratégia de (usuário, domínio) e incorpora as
    /// recomendações derivadas do histórico do usuário.
    pub fn adapt_to_user(
        &mut self,
        user_id: &str,
        domain: &str,
        data: Option<&Value>,
    ) -> AdaptationStrategy {
        let (recommendations, confidence) = self.recommendations(user_id);

        let strategy = self.strategy_entry(user_id, domain);
        if let Some(Value::Object(params)) = data {
            for (key, value) in params {
                strategy.parameters.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in recommendations {
            strategy.parameters.insert(key, value);
        }
        strategy.effectiveness = clamp_unit(0.8 * strategy.effectiveness + 0.2 * confidence);
        strategy.updated_at = Utc::now();

        tracing::debug!(
            user_id = %user_id,
            domain = %domain,
            effectiveness = strategy.effectiveness,
            "Adaptation strategy updated"
        );

        strategy.clone()
    }

    pub fn get_adaptation_strategy(&self, user_id: &str, domain: &str) -> Option<&AdaptationStrategy> {
        self.strategies
            .get(&(user_id.to_string(), domain.to_string()))
    }

    fn strategy_entry(&mut self, user_id: &str, domain: &str) -> &mut AdaptationStrategy {
        self.strategies
            .entry((user_id.to_string(), domain.to_string()))
            .or_insert_with(|| {
                let now = Utc::now();
                AdaptationStrategy {
                    user_id: user_id.to_string(),
                    domain: domain.to_string(),
                    parameters: Map::new(),
                    effectiveness: INITIAL_EFFECTIVENESS,
                    created_at: now,
                    updated_at: now,
                }
            })
    }

    /// Recomendações a partir do histórico completo do usuário.
    ///
    /// Com menos registros que o mínimo configurado, o conjunto é vazio
    /// e a confiança é 0.5.
    fn recommendations(&self, user_id: &str) -> (Map<String, Value>, f64) {
        let records: Vec<&LearningData> = self
            .history
            .iter()
            .filter(|d| d.user_id() == Some(user_id))
            .collect();

        let mut recommendations = Map::new();
        if records.len() < self.config.min_history_for_recommendations {
            return (recommendations, BASE_RECOMMENDATION_CONFIDENCE);
        }

        let feedback: Vec<&UserFeedback> =
            records.iter().filter_map(|d| d.feedback.as_ref()).collect();
        if !feedback.is_empty() {
            let n = feedback.len() as f64;
            let helpful_rate = feedback.iter().filter(|f| f.helpful).count() as f64 / n;
            let average_rating =
                feedback.iter().map(|f| f.bounded_rating() as f64).sum::<f64>() / n;

            if helpful_rate < 0.5 {
                recommendations.insert("explanation_depth".to_string(), json!("detailed"));
            }
            if average_rating >= 4.0 {
                recommendations.insert("suggestion_style".to_string(), json!("proactive"));
            }
        }

        if let Some(action) = self.top_behavior(user_id) {
            recommendations.insert("preferred_action".to_string(), json!(action));
        }

        let levels = records
            .iter()
            .filter_map(|d| d.context.as_ref()?.experience_level.as_deref());
        if let Some(level) = most_common(levels) {
            recommendations.insert("experience_level".to_string(), json!(level));
        }

        if let Some(task) = most_common(records.iter().filter_map(|d| d.task())) {
            recommendations.insert("focus_task".to_string(), json!(task));
        }

        let confidence = (0.5 + records.len() as f64 / 100.0).min(0.95);
        (recommendations, confidence)
    }

    fn top_behavior(&self, user_id: &str) -> Option<&str> {
        self.behaviors
            .get(user_id)?
            .values()
            .max_by(|a, b| {
                a.frequency
                    .cmp(&b.frequency)
                    .then_with(|| b.pattern.cmp(&a.pattern))
            })
            .map(|p| p.pattern.as_str())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Comportamento
    // ═══════════════════════════════════════════════════════════════════════

    /// Registra uma ação do usuário e retorna o padrão atualizado.
    pub fn learn_user_behavior(
        &mut self,
        user_id: &str,
        action: &str,
        context: Map<String, Value>,
    ) -> UserBehaviorPattern {
        let learning_context = LearningContext {
            user_id: Some(user_id.to_string()),
            extra: context,
            ..LearningContext::default()
        };
        let data = LearningData::new(LearningType::Behavioral, json!({ "action": action }))
            .with_context(learning_context);
        self.learn(data);

        self.behaviors
            .get(user_id)
            .and_then(|patterns| patterns.get(action))
            .cloned()
            .unwrap_or_else(|| UserBehaviorPattern {
                user_id: user_id.to_string(),
                pattern: action.to_string(),
                frequency: 0,
                confidence: 0.0,
                last_seen: Utc::now(),
                context: Map::new(),
            })
    }

    /// Padrões do usuário, mais frequentes primeiro.
    pub fn get_user_behavior_patterns(&self, user_id: &str) -> Vec<UserBehaviorPattern> {
        let mut patterns: Vec<UserBehaviorPattern> = self
            .behaviors
            .get(user_id)
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default();

        patterns.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.pattern.cmp(&b.pattern))
        });
        patterns
    }

    /// Prevê ações pela similaridade entre o contexto dado e o contexto
    /// armazenado de cada padrão.
    pub fn predict_user_action(
        &self,
        user_id: &str,
        context: &Map<String, Value>,
    ) -> Vec<ActionPrediction> {
        let mut predictions: Vec<ActionPrediction> = self
            .get_user_behavior_patterns(user_id)
            .into_iter()
            .filter_map(|pattern| {
                let similarity = context_similarity(&pattern.context, context);
                (similarity > self.config.prediction_threshold).then(|| ActionPrediction {
                    action: pattern.pattern,
                    confidence: clamp_unit(similarity * pattern.confidence),
                })
            })
            .collect();

        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        predictions.truncate(self.config.max_predictions);
        predictions
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Modelos
    // ═══════════════════════════════════════════════════════════════════════

    /// Cria um modelo com id monotônico e versão 1.
    pub fn create_learning_model(
        &mut self,
        model_type: &str,
        parameters: Map<String, Value>,
    ) -> LearningModel {
        let id = format!("model-{}", self.next_model_id);
        self.next_model_id += 1;

        let now = Utc::now();
        let model = LearningModel {
            id: id.clone(),
            model_type: model_type.to_string(),
            version: 1,
            accuracy: None,
            confidence: None,
            training_data: Vec::new(),
            parameters,
            created_at: now,
            updated_at: now,
        };

        self.models.insert(id.clone(), model.clone());
        self.model_order.push(id.clone());

        tracing::info!(model_id = %id, model_type = %model_type, "Learning model created");
        model
    }

    /// Retreina um modelo com novos dados.
    ///
    /// A acurácia é a fração de registros adicionados com feedback útil;
    /// sem nenhum feedback, fica em 0.5 e `accuracy_basis = "default"`.
    pub fn update_learning_model(
        &mut self,
        id: &str,
        training_data: Vec<LearningData>,
    ) -> NoemaResult<LearningModel> {
        let model = self
            .models
            .get_mut(id)
            .ok_or_else(|| NoemaError::ModelNotFound(id.to_string()))?;

        let with_feedback: Vec<&UserFeedback> = training_data
            .iter()
            .filter_map(|d| d.feedback.as_ref())
            .collect();

        let (accuracy, basis) = if with_feedback.is_empty() {
            (0.5, "default")
        } else {
            let helpful = with_feedback.iter().filter(|f| f.helpful).count();
            (helpful as f64 / with_feedback.len() as f64, "feedback")
        };

        model.training_data.extend(training_data);
        model.version += 1;
        model.accuracy = Some(clamp_unit(accuracy));
        model.confidence = Some((accuracy + 0.1).min(0.9));
        model
            .parameters
            .insert("accuracy_basis".to_string(), json!(basis));
        model.updated_at = Utc::now();

        tracing::info!(
            model_id = %id,
            version = model.version,
            accuracy = accuracy,
            "Learning model retrained"
        );

        Ok(model.clone())
    }

    pub fn get_learning_model(&self, id: &str) -> Option<&LearningModel> {
        self.models.get(id)
    }

    /// Modelos em ordem de criação.
    pub fn list_learning_models(&self) -> Vec<&LearningModel> {
        self.model_order
            .iter()
            .filter_map(|id| self.models.get(id))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Personalização
    // ═══════════════════════════════════════════════════════════════════════

    /// Mescla (shallow) as preferências do usuário.
    pub fn personalize(&mut self, user_id: &str, preferences: Map<String, Value>) -> Personalization {
        let now = Utc::now();
        let entry = self
            .personalization
            .entry(user_id.to_string())
            .or_insert_with(|| Personalization {
                preferences: Map::new(),
                last_updated: now,
            });

        for (key, value) in preferences {
            entry.preferences.insert(key, value);
        }
        entry.last_updated = now;
        entry.clone()
    }

    pub fn get_personalization(&self, user_id: &str) -> Option<&Personalization> {
        self.personalization.get(user_id)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Estatísticas
    // ═══════════════════════════════════════════════════════════════════════

    pub fn get_learning_stats(&self) -> LearningStats {
        LearningStats {
            total_records: self.history.len(),
            model_accuracy: self
                .models
                .values()
                .map(|m| (m.id.clone(), m.accuracy))
                .collect(),
            adaptation_strategies: self.strategies.len(),
            behavior_patterns: self.behaviors.values().map(HashMap::len).sum(),
            personalized_users: self.personalization.len(),
            task_performance: self
                .task_performance
                .iter()
                .map(|(task, perf)| (task.clone(), *perf))
                .collect::<BTreeMap<_, _>>(),
            reinforcement_entries: self.q_values.len(),
        }
    }

    /// Histórico completo, em ordem de registro.
    pub fn history(&self) -> &[LearningData] {
        &self.history
    }

    /// Estimativa de valor de uma ação em uma tarefa.
    pub fn action_value(&self, task: &str, action: &str) -> Option<f64> {
        self.q_values
            .get(&(task.to_string(), action.to_string()))
            .copied()
    }

    /// Frequência acumulada de uma feature não supervisionada.
    pub fn feature_frequency(&self, feature: &str) -> u64 {
        self.feature_frequencies.get(feature).copied().unwrap_or(0)
    }
}

/// `session-<unix_ms>-<uuid v4>`; o sufixo vem do CSPRNG do sistema.
fn generate_session_id() -> String {
    format!(
        "session-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// |chaves iguais nos dois| / |união das chaves|; 0 se ambos vazios.
pub fn context_similarity(stored: &Map<String, Value>, query: &Map<String, Value>) -> f64 {
    let union = stored
        .keys()
        .chain(query.keys().filter(|k| !stored.contains_key(*k)))
        .count();
    if union == 0 {
        return 0.0;
    }

    let equal = stored
        .iter()
        .filter(|(key, value)| query.get(*key) == Some(*value))
        .count();
    equal as f64 / union as f64
}

/// Valor mais frequente; empates ficam com a primeira ocorrência.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value)
}
