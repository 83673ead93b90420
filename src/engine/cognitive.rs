//! CognitiveEngine - fachada dona dos quatro subsistemas.
//!
//! Fluxo: AtomStore (conhecimento) → PatternEngine (sinais) →
//! ReasoningEngine (conclusão) → LearningEngine (feedback). O aprendizado
//! volta como peso de confiança para patterns e raciocínio, sem mudar a
//! interface desses motores.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::atoms::{Atom, AtomPattern, AtomStore, AtomUpdate};
use crate::cache::CacheStats;
use crate::learning::{LearningContext, LearningEngine, LearningReceipt, LearningStats, UserFeedback};
use crate::patterns::{Pattern, PatternEngine, RecognitionOptions};
use crate::reasoning::{ReasoningEngine, ReasoningQuery, ReasoningResult};
use crate::types::config::Config;
use crate::NoemaResult;

/// Domínio de adaptação que pondera o reconhecimento de patterns.
pub const PATTERNS_DOMAIN: &str = "patterns";

/// Domínio de adaptação que pondera o raciocínio.
pub const REASONING_DOMAIN: &str = "reasoning";

/// Visão geral do estado do motor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub atoms: usize,
    pub strategies: Vec<String>,
    pub learning: LearningStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

/// Motor cognitivo.
///
/// Pensado para um único dono lógico: nenhuma operação trava
/// internamente. Quem compartilha entre tasks envolve o motor inteiro
/// em um mutex.
pub struct CognitiveEngine {
    config: Config,
    store: AtomStore,
    patterns: PatternEngine,
    reasoning: ReasoningEngine,
    learning: LearningEngine,
    /// Destino do snapshot quando `store.autosave` está ativo.
    snapshot: Option<PathBuf>,
}

impl Default for CognitiveEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl CognitiveEngine {
    /// Cria um motor vazio, sem persistência.
    pub fn new(config: Config) -> Self {
        Self {
            patterns: PatternEngine::new(&config.patterns, &config.cache),
            reasoning: ReasoningEngine::new(config.reasoning.clone()),
            learning: LearningEngine::new(config.learning.clone()),
            store: AtomStore::new(),
            snapshot: None,
            config,
        }
    }

    /// Cria um motor carregando o snapshot configurado, se existir.
    ///
    /// Com `autosave`, `persist()` passa a gravar no mesmo caminho.
    pub fn open(config: Config) -> NoemaResult<Self> {
        let path = config.store.snapshot_path.clone();
        let autosave = config.store.autosave;
        let mut engine = Self::new(config);

        if path.exists() {
            let count = engine.store.import_from_file(&path)?;
            tracing::info!(path = %path.display(), atoms = count, "Snapshot loaded");
        }
        if autosave {
            engine.snapshot = Some(path);
        }

        Ok(engine)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Grava o snapshot quando a persistência está ativa.
    ///
    /// Retorna `true` se algo foi gravado.
    pub fn persist(&self) -> NoemaResult<bool> {
        match &self.snapshot {
            Some(path) => {
                self.store.export_to_file(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Atoms
    // ═══════════════════════════════════════════════════════════════════════

    pub fn store(&self) -> &AtomStore {
        &self.store
    }

    pub fn add_atom(&mut self, atom: Atom) -> String {
        self.store.add(atom)
    }

    pub fn get_atom(&self, id: &str) -> Option<&Atom> {
        self.store.get(id)
    }

    pub fn query_atoms(&self, pattern: &AtomPattern) -> Vec<Atom> {
        self.store.query(pattern)
    }

    pub fn update_atom(&mut self, id: &str, update: AtomUpdate) -> bool {
        self.store.update(id, update)
    }

    pub fn remove_atom(&mut self, id: &str) -> bool {
        self.store.remove(id)
    }

    pub fn atom_count(&self) -> usize {
        self.store.size()
    }

    pub fn clear_atoms(&mut self) {
        self.store.clear();
    }

    pub fn export_atoms(&self) -> NoemaResult<String> {
        self.store.export_all()
    }

    /// Substitui todos os atoms. Em caso de erro nada muda.
    pub fn import_atoms(&mut self, blob: &str) -> NoemaResult<usize> {
        self.store.import_all(blob)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Patterns
    // ═══════════════════════════════════════════════════════════════════════

    /// Opções padrão da configuração.
    pub fn default_recognition_options(&self) -> RecognitionOptions {
        self.patterns.default_options().clone()
    }

    /// Reconhece patterns ponderando pela estratégia "patterns" do usuário.
    pub fn recognize_patterns(
        &mut self,
        input: &Value,
        options: Option<RecognitionOptions>,
        user_id: Option<&str>,
    ) -> Vec<Pattern> {
        let mut options = options.unwrap_or_else(|| self.default_recognition_options());
        options.confidence_weight *= self.confidence_weight(user_id, PATTERNS_DOMAIN);
        self.patterns.recognize(input, &options)
    }

    /// Reconhece patterns sobre os atoms que casam com o padrão.
    pub fn recognize_atom_patterns(
        &mut self,
        pattern: &AtomPattern,
        user_id: Option<&str>,
    ) -> Vec<Pattern> {
        let atoms = self.store.query(pattern);
        let mut options = self.default_recognition_options();
        options.confidence_weight *= self.confidence_weight(user_id, PATTERNS_DOMAIN);
        self.patterns.recognize_atoms(&atoms, &options)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Raciocínio
    // ═══════════════════════════════════════════════════════════════════════

    pub fn reasoning(&self) -> &ReasoningEngine {
        &self.reasoning
    }

    pub fn reasoning_mut(&mut self) -> &mut ReasoningEngine {
        &mut self.reasoning
    }

    /// Executa uma consulta sobre o store.
    ///
    /// Quando a consulta traz código, os patterns dele são reconhecidos
    /// antes e entregues às estratégias.
    pub fn reason(&mut self, query: &ReasoningQuery) -> ReasoningResult {
        let patterns = match query.context.code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                let options = self.default_recognition_options().include_low_confidence();
                self.patterns.recognize(&Value::String(code.to_string()), &options)
            }
            _ => Vec::new(),
        };

        let weight = self.confidence_weight(query.context.user_id.as_deref(), REASONING_DOMAIN);
        self.reasoning.reason(query, &self.store, &patterns, weight)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Aprendizado
    // ═══════════════════════════════════════════════════════════════════════

    pub fn learning(&self) -> &LearningEngine {
        &self.learning
    }

    pub fn learning_mut(&mut self) -> &mut LearningEngine {
        &mut self.learning
    }

    /// Atalho para `LearningEngine::learn_from_feedback`.
    pub fn learn_from_feedback(
        &mut self,
        feedback: UserFeedback,
        context: LearningContext,
    ) -> LearningReceipt {
        self.learning.learn_from_feedback(feedback, context)
    }

    /// `0.5 + efetividade` da estratégia (usuário, domínio); 1.0 sem ela.
    pub fn confidence_weight(&self, user_id: Option<&str>, domain: &str) -> f64 {
        user_id
            .and_then(|user| self.learning.get_adaptation_strategy(user, domain))
            .map(|strategy| 0.5 + strategy.effectiveness)
            .unwrap_or(1.0)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Status
    // ═══════════════════════════════════════════════════════════════════════

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            atoms: self.store.size(),
            strategies: self
                .reasoning
                .strategy_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            learning: self.learning.get_learning_stats(),
            cache: self.patterns.cache_stats(),
            snapshot: self.snapshot.clone(),
        }
    }
}
