//! Hooks padrão do Noema.
//!
//! - `LoggingHook`: registra cada raciocínio no log
//! - `MetricsHook`: coleta métricas de raciocínio

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use crate::NoemaResult;

use super::{Hook, HookContext, HookEvent, HookResult};

/// Escala usada para acumular confianças em inteiro.
const CONFIDENCE_SCALE: f64 = 1000.0;

// ═══════════════════════════════════════════════════════════════════════════
// LoggingHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook que registra raciocínios no log (post_reason).
#[derive(Debug, Default)]
pub struct LoggingHook;

impl LoggingHook {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Hook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    fn event(&self) -> HookEvent {
        HookEvent::PostReason
    }

    async fn execute(&self, context: &HookContext<'_>) -> NoemaResult<HookResult> {
        if let HookContext::PostReason { query, result } = context {
            tracing::info!(
                reasoning_type = %query.effective_type(),
                premises = query.atoms.len(),
                conclusions = result.conclusion.len(),
                confidence = result.confidence,
                "Reasoning completed"
            );

            if result.is_error() {
                tracing::warn!(
                    explanation = %result.explanation,
                    "Reasoning returned an error result"
                );
            }
        }

        Ok(HookResult::Continue)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MetricsHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook que coleta métricas de raciocínio.
///
/// Conta consultas, resultados de erro e resultados sem conclusão, e
/// acumula a confiança para a média.
#[derive(Debug, Default)]
pub struct MetricsHook {
    reasonings: AtomicU64,
    errors: AtomicU64,
    empty: AtomicU64,
    /// Soma das confianças × 1000.
    confidence_sum: AtomicU64,
}

impl MetricsHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_reasonings(&self) -> u64 {
        self.reasonings.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn total_empty(&self) -> u64 {
        self.empty.load(Ordering::Relaxed)
    }

    /// Fração de consultas que terminaram em erro.
    pub fn error_rate(&self) -> f64 {
        let total = self.total_reasonings();
        if total == 0 {
            0.0
        } else {
            self.total_errors() as f64 / total as f64
        }
    }

    pub fn average_confidence(&self) -> f64 {
        let total = self.total_reasonings();
        if total == 0 {
            0.0
        } else {
            self.confidence_sum.load(Ordering::Relaxed) as f64 / CONFIDENCE_SCALE / total as f64
        }
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            total_reasonings: self.total_reasonings(),
            errors: self.total_errors(),
            empty_results: self.total_empty(),
            error_rate: self.error_rate(),
            average_confidence: self.average_confidence(),
        }
    }
}

/// Métricas coletadas pelo MetricsHook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_reasonings: u64,
    pub errors: u64,
    pub empty_results: u64,
    pub error_rate: f64,
    pub average_confidence: f64,
}

#[async_trait]
impl Hook for MetricsHook {
    fn name(&self) -> &str {
        "metrics"
    }

    fn event(&self) -> HookEvent {
        HookEvent::PostReason
    }

    async fn execute(&self, context: &HookContext<'_>) -> NoemaResult<HookResult> {
        if let HookContext::PostReason { result, .. } = context {
            self.reasonings.fetch_add(1, Ordering::Relaxed);

            if result.is_error() {
                self.errors.fetch_add(1, Ordering::Relaxed);
            } else if result.conclusion.is_empty() {
                self.empty.fetch_add(1, Ordering::Relaxed);
            }

            let scaled = (result.confidence * CONFIDENCE_SCALE).round() as u64;
            self.confidence_sum.fetch_add(scaled, Ordering::Relaxed);
        }

        Ok(HookResult::Continue)
    }
}
