//! Raciocínio multi-estratégia.
//!
//! ## Estratégias
//!
//! - **deductive**: modus ponens e transitividade (confiança alta)
//! - **inductive**: generalização a partir de membros (confiança média)
//! - **abductive**: hipóteses para observações (confiança baixa)
//! - **code-analysis**: métricas e score de qualidade
//! - **code-completion**: candidatos ranqueados por contexto
//! - **hybrid**: fold sobre todas as estratégias registradas

mod code;
mod engine;
mod strategies;
mod types;

pub use code::{CodeAnalysisStrategy, CodeCompletionStrategy, CodeMetrics, ContextSummary};
pub use engine::{default_strategies, ReasoningEngine};
pub use strategies::{
    AbductiveStrategy, DeductiveStrategy, InductiveStrategy, ReasoningStrategy, StrategyInput,
};
pub use types::{ReasoningContext, ReasoningQuery, ReasoningResult, ReasoningType};
