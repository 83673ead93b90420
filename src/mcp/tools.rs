//! Handlers das ferramentas MCP do Noema.
//!
//! Cada ferramenta mapeia uma operação do motor cognitivo:
//!
//! - atoms: `noema_add_atom`, `noema_query_atoms`, `noema_update_atom`,
//!   `noema_remove_atom`, `noema_atom_count`, `noema_clear_atoms`,
//!   `noema_export_atoms`, `noema_import_atoms`
//! - patterns: `noema_recognize_patterns`
//! - raciocínio: `noema_reason`
//! - aprendizado: `noema_learn`, `noema_feedback`, `noema_adapt_to_user`,
//!   `noema_get_adaptation_strategy`, `noema_learn_behavior`,
//!   `noema_get_behavior_patterns`, `noema_predict_action`,
//!   `noema_create_model`, `noema_update_model`, `noema_get_model`,
//!   `noema_list_models`, `noema_personalize`, `noema_get_personalization`,
//!   `noema_learning_stats`
//! - `noema_status`

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::atoms::{Atom, AtomPattern, AtomUpdate};
use crate::engine::CognitiveEngine;
use crate::hooks::{HookResult, HookSystem, MetricsHook};
use crate::learning::{LearningContext, LearningData, UserFeedback};
use crate::learning::GENERAL_DOMAIN;
use crate::patterns::RecognitionOptions;
use crate::reasoning::{ReasoningQuery, ReasoningResult};
use crate::types::config::Config;
use crate::NoemaResult;

use super::protocol::{ToolDescription, ToolResult};

// ═══════════════════════════════════════════════════════════════════════════
// Parâmetros das ferramentas
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct AddAtomParams {
    atom: Atom,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryAtomsParams {
    pattern: AtomPattern,
}

#[derive(Debug, Deserialize)]
struct UpdateAtomParams {
    id: String,
    update: AtomUpdate,
}

#[derive(Debug, Deserialize)]
struct IdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ImportParams {
    blob: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RecognizeParams {
    input: Value,
    /// Quando presente, reconhece sobre os atoms do store que casam.
    atom_pattern: Option<AtomPattern>,
    options: Option<RecognitionOptions>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedbackParams {
    feedback: UserFeedback,
    #[serde(default)]
    context: LearningContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdaptParams {
    user_id: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDomainParams {
    user_id: String,
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BehaviorParams {
    user_id: String,
    action: String,
    #[serde(default)]
    context: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserParams {
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictParams {
    user_id: String,
    #[serde(default)]
    context: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CreateModelParams {
    #[serde(rename = "type")]
    model_type: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateModelParams {
    id: String,
    #[serde(default)]
    training_data: Vec<LearningData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonalizeParams {
    user_id: String,
    preferences: Map<String, Value>,
}

/// Converte os argumentos ou devolve o erro já formatado.
fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolResult> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolResult::error(format!("Invalid parameters: {}", e)))
}

// ═══════════════════════════════════════════════════════════════════════════
// Schemas
// ═══════════════════════════════════════════════════════════════════════════

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> ToolDescription {
    ToolDescription::new(name, description, schema(properties, required))
}

fn user_id_schema() -> Value {
    json!({ "type": "string", "description": "Identificador do usuário" })
}

// ═══════════════════════════════════════════════════════════════════════════
// Handler de ferramentas
// ═══════════════════════════════════════════════════════════════════════════

/// Handler das ferramentas MCP do Noema.
pub struct ToolHandler {
    engine: Arc<Mutex<CognitiveEngine>>,
    hooks: HookSystem,
    metrics: Arc<MetricsHook>,
}

impl ToolHandler {
    /// Cria o handler abrindo o motor (e seu snapshot) a partir da config.
    pub fn new(config: Config) -> NoemaResult<Self> {
        Ok(Self::with_engine(CognitiveEngine::open(config)?))
    }

    /// Cria o handler sobre um motor já construído.
    pub fn with_engine(engine: CognitiveEngine) -> Self {
        let metrics = Arc::new(MetricsHook::new());
        let mut hooks = HookSystem::with_defaults();
        hooks.register(Box::new(metrics.clone()));

        Self {
            engine: Arc::new(Mutex::new(engine)),
            hooks,
            metrics,
        }
    }

    /// Registra hooks adicionais.
    pub fn hooks_mut(&mut self) -> &mut HookSystem {
        &mut self.hooks
    }

    /// Motor compartilhado.
    pub fn engine(&self) -> Arc<Mutex<CognitiveEngine>> {
        Arc::clone(&self.engine)
    }

    /// Lista todas as ferramentas disponíveis.
    pub fn list_tools() -> Vec<ToolDescription> {
        vec![
            tool(
                "noema_add_atom",
                "Adiciona um atom ao grafo de conhecimento. Retorna o id atribuído.",
                json!({ "atom": { "type": "object", "description": "Atom com type, name, truthValue, outgoing..." } }),
                &["atom"],
            ),
            tool(
                "noema_query_atoms",
                "Busca atoms por tipo, nome e limiares de verdade/atenção.",
                json!({ "pattern": { "type": "object", "description": "type, name, minStrength, minConfidence, minSti" } }),
                &[],
            ),
            tool(
                "noema_update_atom",
                "Atualiza campos de um atom existente. O id nunca muda.",
                json!({
                    "id": { "type": "string" },
                    "update": { "type": "object" }
                }),
                &["id", "update"],
            ),
            tool(
                "noema_remove_atom",
                "Remove um atom pelo id.",
                json!({ "id": { "type": "string" } }),
                &["id"],
            ),
            tool("noema_atom_count", "Número de atoms no store.", json!({}), &[]),
            tool("noema_clear_atoms", "Remove todos os atoms.", json!({}), &[]),
            tool(
                "noema_export_atoms",
                "Exporta todos os atoms como array JSON.",
                json!({}),
                &[],
            ),
            tool(
                "noema_import_atoms",
                "Substitui todos os atoms pelo array JSON dado. Blob inválido não altera nada.",
                json!({ "blob": { "type": "string", "description": "Array JSON de atoms" } }),
                &["blob"],
            ),
            tool(
                "noema_recognize_patterns",
                "Reconhece patterns em código, sequências, registros de comportamento ou atoms do store.",
                json!({
                    "input": { "description": "Texto, array ou objeto" },
                    "atomPattern": { "type": "object", "description": "Reconhece sobre os atoms que casam" },
                    "options": { "type": "object" },
                    "userId": user_id_schema()
                }),
                &[],
            ),
            tool(
                "noema_reason",
                "Executa raciocínio dedutivo, indutivo, abdutivo, análise ou completion de código, ou híbrido.",
                json!({
                    "type": {
                        "type": "string",
                        "enum": ["deductive", "inductive", "abductive", "code-analysis", "code-completion", "hybrid"]
                    },
                    "atoms": { "type": "array" },
                    "context": { "type": "object" },
                    "parameters": { "type": "object" }
                }),
                &[],
            ),
            tool(
                "noema_learn",
                "Registra um evento de aprendizado (supervised, unsupervised, reinforcement, personalization, behavioral, adaptive).",
                json!({
                    "type": { "type": "string" },
                    "input": {},
                    "expectedOutput": {},
                    "feedback": { "type": "object" },
                    "context": { "type": "object" }
                }),
                &["type"],
            ),
            tool(
                "noema_feedback",
                "Registra feedback do usuário e ajusta a estratégia de adaptação.",
                json!({
                    "feedback": { "type": "object", "description": "rating (1-5), helpful, outcome..." },
                    "context": { "type": "object", "description": "userId, task..." }
                }),
                &["feedback"],
            ),
            tool(
                "noema_adapt_to_user",
                "Atualiza a estratégia de adaptação de um usuário para um domínio.",
                json!({
                    "userId": user_id_schema(),
                    "domain": { "type": "string" },
                    "data": { "type": "object" }
                }),
                &["userId"],
            ),
            tool(
                "noema_get_adaptation_strategy",
                "Retorna a estratégia de adaptação de (usuário, domínio).",
                json!({ "userId": user_id_schema(), "domain": { "type": "string" } }),
                &["userId"],
            ),
            tool(
                "noema_learn_behavior",
                "Registra uma ação do usuário.",
                json!({
                    "userId": user_id_schema(),
                    "action": { "type": "string" },
                    "context": { "type": "object" }
                }),
                &["userId", "action"],
            ),
            tool(
                "noema_get_behavior_patterns",
                "Lista os padrões de comportamento de um usuário.",
                json!({ "userId": user_id_schema() }),
                &["userId"],
            ),
            tool(
                "noema_predict_action",
                "Prevê as próximas ações do usuário para um contexto.",
                json!({ "userId": user_id_schema(), "context": { "type": "object" } }),
                &["userId"],
            ),
            tool(
                "noema_create_model",
                "Cria um modelo de aprendizado.",
                json!({ "type": { "type": "string" }, "parameters": { "type": "object" } }),
                &["type"],
            ),
            tool(
                "noema_update_model",
                "Retreina um modelo com novos registros.",
                json!({ "id": { "type": "string" }, "trainingData": { "type": "array" } }),
                &["id"],
            ),
            tool(
                "noema_get_model",
                "Retorna um modelo pelo id.",
                json!({ "id": { "type": "string" } }),
                &["id"],
            ),
            tool("noema_list_models", "Lista os modelos de aprendizado.", json!({}), &[]),
            tool(
                "noema_personalize",
                "Mescla preferências do usuário.",
                json!({ "userId": user_id_schema(), "preferences": { "type": "object" } }),
                &["userId", "preferences"],
            ),
            tool(
                "noema_get_personalization",
                "Retorna as preferências do usuário.",
                json!({ "userId": user_id_schema() }),
                &["userId"],
            ),
            tool(
                "noema_learning_stats",
                "Estatísticas agregadas do aprendizado.",
                json!({}),
                &[],
            ),
            tool(
                "noema_status",
                "Status do motor: atoms, estratégias, cache, aprendizado e métricas.",
                json!({}),
                &[],
            ),
        ]
    }

    /// Processa uma chamada de ferramenta.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> ToolResult {
        tracing::info!(tool = name, "Processing tool call");

        let outcome = match name {
            "noema_add_atom" => self.add_atom(arguments).await,
            "noema_query_atoms" => self.query_atoms(arguments).await,
            "noema_update_atom" => self.update_atom(arguments).await,
            "noema_remove_atom" => self.remove_atom(arguments).await,
            "noema_atom_count" => self.atom_count().await,
            "noema_clear_atoms" => self.clear_atoms().await,
            "noema_export_atoms" => self.export_atoms().await,
            "noema_import_atoms" => self.import_atoms(arguments).await,
            "noema_recognize_patterns" => self.recognize_patterns(arguments).await,
            "noema_reason" => self.reason(arguments).await,
            "noema_learn" => self.learn(arguments).await,
            "noema_feedback" => self.feedback(arguments).await,
            "noema_adapt_to_user" => self.adapt_to_user(arguments).await,
            "noema_get_adaptation_strategy" => self.get_adaptation_strategy(arguments).await,
            "noema_learn_behavior" => self.learn_behavior(arguments).await,
            "noema_get_behavior_patterns" => self.get_behavior_patterns(arguments).await,
            "noema_predict_action" => self.predict_action(arguments).await,
            "noema_create_model" => self.create_model(arguments).await,
            "noema_update_model" => self.update_model(arguments).await,
            "noema_get_model" => self.get_model(arguments).await,
            "noema_list_models" => self.list_models().await,
            "noema_personalize" => self.personalize(arguments).await,
            "noema_get_personalization" => self.get_personalization(arguments).await,
            "noema_learning_stats" => self.learning_stats().await,
            "noema_status" => self.status().await,
            _ => Err(ToolResult::error(format!("Unknown tool: {}", name))),
        };

        outcome.unwrap_or_else(|error| error)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Atoms
    // ═══════════════════════════════════════════════════════════════════════

    async fn add_atom(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: AddAtomParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;

        let id = engine.add_atom(params.atom);
        persist(&engine);

        Ok(ToolResult::json(&json!({ "id": id, "size": engine.atom_count() })))
    }

    async fn query_atoms(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: QueryAtomsParams = parse(arguments)?;
        let engine = self.engine.lock().await;

        let atoms = engine.query_atoms(&params.pattern);
        Ok(ToolResult::json(&json!({ "count": atoms.len(), "atoms": atoms })))
    }

    async fn update_atom(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: UpdateAtomParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;

        let updated = engine.update_atom(&params.id, params.update);
        if updated {
            persist(&engine);
        }
        Ok(ToolResult::json(&json!({ "id": params.id, "updated": updated })))
    }

    async fn remove_atom(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: IdParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;

        let removed = engine.remove_atom(&params.id);
        if removed {
            persist(&engine);
        }
        Ok(ToolResult::json(&json!({ "id": params.id, "removed": removed })))
    }

    async fn atom_count(&self) -> Result<ToolResult, ToolResult> {
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(&json!({ "size": engine.atom_count() })))
    }

    async fn clear_atoms(&self) -> Result<ToolResult, ToolResult> {
        let mut engine = self.engine.lock().await;

        let cleared = engine.atom_count();
        engine.clear_atoms();
        persist(&engine);

        Ok(ToolResult::json(&json!({ "cleared": cleared })))
    }

    async fn export_atoms(&self) -> Result<ToolResult, ToolResult> {
        let engine = self.engine.lock().await;
        engine
            .export_atoms()
            .map(ToolResult::success)
            .map_err(|e| ToolResult::error(format!("Export failed: {}", e)))
    }

    async fn import_atoms(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: ImportParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;

        let imported = engine
            .import_atoms(&params.blob)
            .map_err(|e| ToolResult::error(format!("Import failed: {}", e)))?;
        persist(&engine);

        Ok(ToolResult::json(&json!({ "imported": imported })))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Patterns e raciocínio
    // ═══════════════════════════════════════════════════════════════════════

    async fn recognize_patterns(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: RecognizeParams = parse(arguments)?;

        let patterns = {
            let mut engine = self.engine.lock().await;
            let user = params.user_id.as_deref();
            match &params.atom_pattern {
                Some(pattern) => engine.recognize_atom_patterns(pattern, user),
                None => engine.recognize_patterns(&params.input, params.options, user),
            }
        };

        self.hooks
            .run_on_patterns(&patterns)
            .await
            .map_err(|e| ToolResult::error(format!("Hook failed: {}", e)))?;

        Ok(ToolResult::json(&json!({ "count": patterns.len(), "patterns": patterns })))
    }

    async fn reason(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let query: ReasoningQuery = parse(arguments)?;

        let hook_result = self
            .hooks
            .run_pre_reason(&query)
            .await
            .map_err(|e| ToolResult::error(format!("Hook failed: {}", e)))?;

        let query = match hook_result {
            HookResult::Skip => {
                let skipped = ReasoningResult::new(Vec::new(), 0.0, "Skipped by hook");
                return Ok(ToolResult::json(&skipped));
            }
            HookResult::ModifyQuery(modified) => {
                tracing::info!("Query modified by pre_reason hook");
                modified
            }
            HookResult::Continue => query,
        };

        let result = {
            let mut engine = self.engine.lock().await;
            engine.reason(&query)
        };

        self.hooks
            .run_post_reason(&query, &result)
            .await
            .map_err(|e| ToolResult::error(format!("Hook failed: {}", e)))?;

        Ok(ToolResult::json(&result))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Aprendizado
    // ═══════════════════════════════════════════════════════════════════════

    async fn learn(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let data: LearningData = parse(arguments)?;
        let mut engine = self.engine.lock().await;
        Ok(ToolResult::json(&engine.learning_mut().learn(data)))
    }

    async fn feedback(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: FeedbackParams = parse(arguments)?;
        let feedback = params.feedback.clone();

        let receipt = {
            let mut engine = self.engine.lock().await;
            engine.learn_from_feedback(params.feedback, params.context)
        };

        self.hooks
            .run_on_feedback(&feedback, &receipt)
            .await
            .map_err(|e| ToolResult::error(format!("Hook failed: {}", e)))?;

        Ok(ToolResult::json(&receipt))
    }

    async fn adapt_to_user(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: AdaptParams = parse(arguments)?;
        let domain = params.domain.as_deref().unwrap_or(GENERAL_DOMAIN);
        let mut engine = self.engine.lock().await;

        let strategy = engine
            .learning_mut()
            .adapt_to_user(&params.user_id, domain, params.data.as_ref());
        Ok(ToolResult::json(&strategy))
    }

    async fn get_adaptation_strategy(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: UserDomainParams = parse(arguments)?;
        let domain = params.domain.as_deref().unwrap_or(GENERAL_DOMAIN);
        let engine = self.engine.lock().await;

        Ok(ToolResult::json(
            &engine.learning().get_adaptation_strategy(&params.user_id, domain),
        ))
    }

    async fn learn_behavior(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: BehaviorParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;

        let pattern =
            engine
                .learning_mut()
                .learn_user_behavior(&params.user_id, &params.action, params.context);
        Ok(ToolResult::json(&pattern))
    }

    async fn get_behavior_patterns(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: UserParams = parse(arguments)?;
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(
            &engine.learning().get_user_behavior_patterns(&params.user_id),
        ))
    }

    async fn predict_action(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: PredictParams = parse(arguments)?;
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(
            &engine
                .learning()
                .predict_user_action(&params.user_id, &params.context),
        ))
    }

    async fn create_model(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: CreateModelParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;
        Ok(ToolResult::json(
            &engine
                .learning_mut()
                .create_learning_model(&params.model_type, params.parameters),
        ))
    }

    async fn update_model(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: UpdateModelParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;

        engine
            .learning_mut()
            .update_learning_model(&params.id, params.training_data)
            .map(|model| ToolResult::json(&model))
            .map_err(|e| ToolResult::error(e.to_string()))
    }

    async fn get_model(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: IdParams = parse(arguments)?;
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(&engine.learning().get_learning_model(&params.id)))
    }

    async fn list_models(&self) -> Result<ToolResult, ToolResult> {
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(&engine.learning().list_learning_models()))
    }

    async fn personalize(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: PersonalizeParams = parse(arguments)?;
        let mut engine = self.engine.lock().await;
        Ok(ToolResult::json(
            &engine
                .learning_mut()
                .personalize(&params.user_id, params.preferences),
        ))
    }

    async fn get_personalization(&self, arguments: Value) -> Result<ToolResult, ToolResult> {
        let params: UserParams = parse(arguments)?;
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(
            &engine.learning().get_personalization(&params.user_id),
        ))
    }

    async fn learning_stats(&self) -> Result<ToolResult, ToolResult> {
        let engine = self.engine.lock().await;
        Ok(ToolResult::json(&engine.learning().get_learning_stats()))
    }

    async fn status(&self) -> Result<ToolResult, ToolResult> {
        let status = {
            let engine = self.engine.lock().await;
            engine.status()
        };

        Ok(ToolResult::json(&json!({
            "engine": status,
            "hooks": self.hooks.count(),
            "metrics": self.metrics.metrics(),
        })))
    }
}

/// Grava o snapshot após uma mutação; falhas só são logadas.
fn persist(engine: &CognitiveEngine) {
    if let Err(e) = engine.persist() {
        tracing::warn!(error = %e, "Failed to write atom snapshot");
    }
}
