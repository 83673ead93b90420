//! Sistema de hooks do Noema.
//!
//! Hooks permitem observar e customizar o motor em pontos específicos:
//!
//! - `pre_reason`: antes de executar uma consulta de raciocínio
//! - `post_reason`: após o resultado do raciocínio
//! - `on_patterns`: quando patterns são reconhecidos
//! - `on_feedback`: quando feedback do usuário é registrado

mod builtin;

pub use builtin::{LoggingHook, Metrics, MetricsHook};

use async_trait::async_trait;

use crate::learning::{LearningReceipt, UserFeedback};
use crate::patterns::Pattern;
use crate::reasoning::{ReasoningQuery, ReasoningResult};
use crate::NoemaResult;

// ═══════════════════════════════════════════════════════════════════════════
// Tipos de eventos
// ═══════════════════════════════════════════════════════════════════════════

/// Evento que dispara um hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// Antes do raciocínio.
    PreReason,

    /// Após o raciocínio.
    PostReason,

    /// Patterns reconhecidos.
    OnPatterns,

    /// Feedback registrado.
    OnFeedback,
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::PreReason => write!(f, "pre_reason"),
            HookEvent::PostReason => write!(f, "post_reason"),
            HookEvent::OnPatterns => write!(f, "on_patterns"),
            HookEvent::OnFeedback => write!(f, "on_feedback"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Contexto de hooks
// ═══════════════════════════════════════════════════════════════════════════

/// Contexto passado para hooks.
pub enum HookContext<'a> {
    PreReason {
        query: &'a ReasoningQuery,
    },

    PostReason {
        query: &'a ReasoningQuery,
        result: &'a ReasoningResult,
    },

    OnPatterns {
        patterns: &'a [Pattern],
    },

    OnFeedback {
        feedback: &'a UserFeedback,
        receipt: &'a LearningReceipt,
    },
}

impl<'a> HookContext<'a> {
    /// Retorna o evento correspondente ao contexto.
    pub fn event(&self) -> HookEvent {
        match self {
            HookContext::PreReason { .. } => HookEvent::PreReason,
            HookContext::PostReason { .. } => HookEvent::PostReason,
            HookContext::OnPatterns { .. } => HookEvent::OnPatterns,
            HookContext::OnFeedback { .. } => HookEvent::OnFeedback,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Resultado de hooks
// ═══════════════════════════════════════════════════════════════════════════

/// Resultado da execução de um hook.
#[derive(Debug, Clone, Default)]
pub enum HookResult {
    /// Continua normalmente.
    #[default]
    Continue,

    /// Pula o raciocínio (apenas válido para pre_reason).
    Skip,

    /// Substitui a consulta (apenas válido para pre_reason).
    ModifyQuery(ReasoningQuery),
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait Hook
// ═══════════════════════════════════════════════════════════════════════════

/// Trait para hooks customizáveis.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Nome do hook.
    fn name(&self) -> &str;

    /// Evento que dispara este hook.
    fn event(&self) -> HookEvent;

    /// Executa o hook.
    async fn execute(&self, context: &HookContext<'_>) -> NoemaResult<HookResult>;
}

/// Permite registrar um hook e manter uma referência para consultá-lo
/// (ex.: métricas).
#[async_trait]
impl<H: Hook> Hook for std::sync::Arc<H> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn event(&self) -> HookEvent {
        self.as_ref().event()
    }

    async fn execute(&self, context: &HookContext<'_>) -> NoemaResult<HookResult> {
        self.as_ref().execute(context).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sistema de hooks
// ═══════════════════════════════════════════════════════════════════════════

/// Gerenciador de hooks.
#[derive(Default)]
pub struct HookSystem {
    pre_reason: Vec<Box<dyn Hook>>,
    post_reason: Vec<Box<dyn Hook>>,
    on_patterns: Vec<Box<dyn Hook>>,
    on_feedback: Vec<Box<dyn Hook>>,
}

impl HookSystem {
    /// Cria um sistema de hooks vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria um sistema com hooks padrão (logging).
    pub fn with_defaults() -> Self {
        let mut system = Self::new();
        system.register(Box::new(LoggingHook));
        system
    }

    /// Registra um hook.
    pub fn register(&mut self, hook: Box<dyn Hook>) {
        let event = hook.event();
        tracing::debug!(
            hook_name = hook.name(),
            event = %event,
            "Registering hook"
        );

        match event {
            HookEvent::PreReason => self.pre_reason.push(hook),
            HookEvent::PostReason => self.post_reason.push(hook),
            HookEvent::OnPatterns => self.on_patterns.push(hook),
            HookEvent::OnFeedback => self.on_feedback.push(hook),
        }
    }

    /// Executa hooks de pre_reason.
    ///
    /// O primeiro `Skip` ou `ModifyQuery` encerra a cadeia.
    pub async fn run_pre_reason(&self, query: &ReasoningQuery) -> NoemaResult<HookResult> {
        let context = HookContext::PreReason { query };

        for hook in &self.pre_reason {
            match hook.execute(&context).await? {
                HookResult::Continue => continue,
                decisive => return Ok(decisive),
            }
        }

        Ok(HookResult::Continue)
    }

    pub async fn run_post_reason(
        &self,
        query: &ReasoningQuery,
        result: &ReasoningResult,
    ) -> NoemaResult<()> {
        let context = HookContext::PostReason { query, result };
        self.run_all(&self.post_reason, &context).await
    }

    pub async fn run_on_patterns(&self, patterns: &[Pattern]) -> NoemaResult<()> {
        let context = HookContext::OnPatterns { patterns };
        self.run_all(&self.on_patterns, &context).await
    }

    pub async fn run_on_feedback(
        &self,
        feedback: &UserFeedback,
        receipt: &LearningReceipt,
    ) -> NoemaResult<()> {
        let context = HookContext::OnFeedback { feedback, receipt };
        self.run_all(&self.on_feedback, &context).await
    }

    async fn run_all(&self, hooks: &[Box<dyn Hook>], context: &HookContext<'_>) -> NoemaResult<()> {
        for hook in hooks {
            hook.execute(context).await?;
        }
        Ok(())
    }

    /// Retorna o número total de hooks registrados.
    pub fn count(&self) -> usize {
        self.pre_reason.len()
            + self.post_reason.len()
            + self.on_patterns.len()
            + self.on_feedback.len()
    }

    /// Retorna o número de hooks para um evento específico.
    pub fn count_for_event(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::PreReason => self.pre_reason.len(),
            HookEvent::PostReason => self.post_reason.len(),
            HookEvent::OnPatterns => self.on_patterns.len(),
            HookEvent::OnFeedback => self.on_feedback.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::LearningType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Hook de teste que conta execuções
    struct CountingHook {
        name: String,
        event: HookEvent,
        count: Arc<AtomicUsize>,
    }

    impl CountingHook {
        fn new(name: &str, event: HookEvent, count: Arc<AtomicUsize>) -> Self {
            Self {
                name: name.to_string(),
                event,
                count,
            }
        }
    }

    #[async_trait]
    impl Hook for CountingHook {
        fn name(&self) -> &str {
            &self.name
        }

        fn event(&self) -> HookEvent {
            self.event
        }

        async fn execute(&self, _context: &HookContext<'_>) -> NoemaResult<HookResult> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(HookResult::Continue)
        }
    }

    // Força todas as consultas para dedução
    struct ForceDeductiveHook;

    #[async_trait]
    impl Hook for ForceDeductiveHook {
        fn name(&self) -> &str {
            "force-deductive"
        }

        fn event(&self) -> HookEvent {
            HookEvent::PreReason
        }

        async fn execute(&self, context: &HookContext<'_>) -> NoemaResult<HookResult> {
            match context {
                HookContext::PreReason { query } => {
                    let mut modified = (*query).clone();
                    modified.reasoning_type = Some("deductive".into());
                    Ok(HookResult::ModifyQuery(modified))
                }
                _ => Ok(HookResult::Continue),
            }
        }
    }

    fn counting(event: HookEvent) -> (HookSystem, Arc<AtomicUsize>) {
        let mut system = HookSystem::new();
        let count = Arc::new(AtomicUsize::new(0));
        system.register(Box::new(CountingHook::new("test", event, count.clone())));
        (system, count)
    }

    #[test]
    fn test_hook_system_new() {
        assert_eq!(HookSystem::new().count(), 0);
        assert!(HookSystem::with_defaults().count() > 0);
    }

    #[test]
    fn test_hook_registration() {
        let (system, _) = counting(HookEvent::OnPatterns);
        assert_eq!(system.count_for_event(HookEvent::OnPatterns), 1);
        assert_eq!(system.count_for_event(HookEvent::PreReason), 0);
    }

    #[tokio::test]
    async fn test_pre_reason_continue() {
        let (system, count) = counting(HookEvent::PreReason);
        let result = system.run_pre_reason(&ReasoningQuery::hybrid()).await.unwrap();

        assert!(matches!(result, HookResult::Continue));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pre_reason_modify_stops_chain() {
        let mut system = HookSystem::new();
        let count = Arc::new(AtomicUsize::new(0));
        system.register(Box::new(ForceDeductiveHook));
        system.register(Box::new(CountingHook::new(
            "after",
            HookEvent::PreReason,
            count.clone(),
        )));

        let result = system.run_pre_reason(&ReasoningQuery::hybrid()).await.unwrap();
        match result {
            HookResult::ModifyQuery(query) => {
                assert_eq!(query.reasoning_type, Some("deductive".into()))
            }
            other => panic!("unexpected hook result: {:?}", other),
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_post_reason_and_patterns_hooks() {
        let (system, count) = counting(HookEvent::PostReason);
        let query = ReasoningQuery::hybrid();
        let result = ReasoningResult::new(Vec::new(), 0.0, "nothing");
        system.run_post_reason(&query, &result).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let (system, count) = counting(HookEvent::OnPatterns);
        system.run_on_patterns(&[]).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_on_feedback_hook() {
        let (system, count) = counting(HookEvent::OnFeedback);
        let feedback = UserFeedback::new(4, true);
        let receipt = LearningReceipt {
            session_id: "session-1".to_string(),
            learning_type: LearningType::Supervised,
            effects: Vec::new(),
        };

        system.run_on_feedback(&feedback, &receipt).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_event_display() {
        assert_eq!(HookEvent::PreReason.to_string(), "pre_reason");
        assert_eq!(HookEvent::PostReason.to_string(), "post_reason");
        assert_eq!(HookEvent::OnPatterns.to_string(), "on_patterns");
        assert_eq!(HookEvent::OnFeedback.to_string(), "on_feedback");
    }

    #[test]
    fn test_hook_context_event() {
        let query = ReasoningQuery::hybrid();
        assert_eq!(HookContext::PreReason { query: &query }.event(), HookEvent::PreReason);
        assert_eq!(HookContext::OnPatterns { patterns: &[] }.event(), HookEvent::OnPatterns);
    }
}
