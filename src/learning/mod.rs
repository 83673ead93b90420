//! Aprendizado contínuo a partir de feedback e comportamento.
//!
//! Todo evento entra em um histórico append-only e é despachado para o
//! processador do seu tipo:
//!
//! - **supervised**: desempenho por tarefa
//! - **unsupervised**: frequência de features
//! - **reinforcement**: valor estimado por (tarefa, ação)
//! - **personalization**: preferências do usuário
//! - **behavioral**: padrões de ação do usuário
//! - **adaptive**: estratégia de adaptação por domínio

mod engine;
mod processors;
mod types;

pub use engine::{context_similarity, LearningEngine, ANONYMOUS_USER, GENERAL_DOMAIN};
pub use types::{
    ActionPrediction, AdaptationStrategy, LearningContext, LearningData, LearningModel,
    LearningReceipt, LearningStats, LearningType, Outcome, Personalization, Priority,
    TaskPerformance, UserBehaviorPattern, UserFeedback,
};
