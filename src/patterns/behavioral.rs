//! Detectores comportamentais sobre registros estruturados.
//!
//! Formato aceito:
//!
//! ```json
//! {
//!   "actions": [{"timestamp": 1000, "action": "open_file"}],
//!   "usage": {"frequency": 12, "duration": 340, "features": ["search"],
//!             "tasksCompleted": 8, "timeSpent": 4}
//! }
//! ```

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::types::{Pattern, PatternDescriptor};

const USAGE_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Deserialize)]
struct TimedAction {
    timestamp: f64,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UsageRecord {
    frequency: f64,
    duration: f64,
    features: Vec<String>,
    tasks_completed: f64,
    time_spent: f64,
}

/// Executa os detectores comportamentais sobre um objeto.
pub fn detect_behavioral_patterns(record: &Map<String, Value>) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    if let Some(actions) = record.get("actions") {
        patterns.extend(interaction_rhythm(actions));
    }
    if let Some(usage) = record.get("usage") {
        patterns.extend(usage_profile(usage));
    }

    patterns
}

/// Intervalo médio entre eventos e consistência `max(0, 1 - desvio/média)`.
fn interaction_rhythm(actions: &Value) -> Option<Pattern> {
    let actions: Vec<TimedAction> = serde_json::from_value(actions.clone()).ok()?;
    if actions.len() < 3 {
        return None;
    }

    let mut timestamps: Vec<f64> = actions.iter().map(|a| a.timestamp).collect();
    timestamps.sort_by(|a, b| a.total_cmp(b));

    let intervals: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    if !mean.is_finite() || mean <= 0.0 {
        return None;
    }

    let variance =
        intervals.iter().map(|i| (i - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
    let consistency = (1.0 - variance.sqrt() / mean).max(0.0);

    let instances = actions
        .iter()
        .map(|a| json!({"timestamp": a.timestamp, "action": a.action}))
        .collect();

    Some(Pattern::new(
        PatternDescriptor::InteractionRhythm {
            mean_interval: mean,
            consistency,
        },
        consistency,
        instances,
    ))
}

/// Perfil de uso com eficiência = tarefas / tempo.
fn usage_profile(usage: &Value) -> Option<Pattern> {
    let usage: UsageRecord = serde_json::from_value(usage.clone()).ok()?;

    let efficiency = if usage.time_spent > 0.0 {
        usage.tasks_completed / usage.time_spent
    } else {
        0.0
    };

    let instances = usage.features.iter().map(|f| json!(f)).collect();

    Some(Pattern::new(
        PatternDescriptor::UsageProfile {
            frequency: usage.frequency,
            duration: usage.duration,
            features: usage.features,
            efficiency,
        },
        USAGE_CONFIDENCE,
        instances,
    ))
}
