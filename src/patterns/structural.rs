//! Detectores estruturais sobre sequências.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::types::{Pattern, PatternDescriptor};

/// Número máximo de elementos examinados pelos detectores de progressão.
const SEQUENCE_WINDOW: usize = 10;

/// Tolerância da razão geométrica.
const RATIO_TOLERANCE: f64 = 0.01;

const PROGRESSION_CONFIDENCE: f64 = 0.9;

/// Executa todos os detectores estruturais.
pub fn detect_structural_patterns(items: &[Value]) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    if let Some(numbers) = numeric_window(items) {
        patterns.extend(arithmetic_sequence(&numbers));
        patterns.extend(geometric_sequence(&numbers));
    }
    patterns.extend(repetition(items));
    patterns.extend(hierarchical_nesting(items));

    patterns
}

/// Primeiros elementos, se todos forem numéricos e houver pelo menos 3.
fn numeric_window(items: &[Value]) -> Option<Vec<f64>> {
    let window: Option<Vec<f64>> = items
        .iter()
        .take(SEQUENCE_WINDOW)
        .map(Value::as_f64)
        .collect();

    window.filter(|numbers| numbers.len() >= 3 && numbers.iter().all(|n| n.is_finite()))
}

fn arithmetic_sequence(numbers: &[f64]) -> Option<Pattern> {
    let difference = numbers[1] - numbers[0];
    let constant = numbers
        .windows(2)
        .all(|w| ((w[1] - w[0]) - difference).abs() < 1e-9);

    constant.then(|| {
        Pattern::new(
            PatternDescriptor::ArithmeticSequence {
                common_difference: difference,
            },
            PROGRESSION_CONFIDENCE,
            numbers.iter().map(|n| json!(n)).collect(),
        )
    })
}

fn geometric_sequence(numbers: &[f64]) -> Option<Pattern> {
    if numbers.iter().any(|n| *n == 0.0) {
        return None;
    }

    let ratio = numbers[1] / numbers[0];
    let constant = numbers
        .windows(2)
        .all(|w| ((w[1] / w[0]) - ratio).abs() <= RATIO_TOLERANCE);

    constant.then(|| {
        Pattern::new(
            PatternDescriptor::GeometricSequence {
                common_ratio: ratio,
            },
            PROGRESSION_CONFIDENCE,
            numbers.iter().map(|n| json!(n)).collect(),
        )
    })
}

/// Elementos que aparecem mais de uma vez.
///
/// frequency = ocorrências repetidas / tamanho.
fn repetition(items: &[Value]) -> Option<Pattern> {
    if items.is_empty() {
        return None;
    }

    // Value não implementa Hash: a forma serializada é a chave
    let mut counts: HashMap<String, (usize, &Value)> = HashMap::new();
    let mut first_seen = Vec::new();
    for item in items {
        let key = item.to_string();
        let entry = counts.entry(key.clone()).or_insert_with(|| {
            first_seen.push(key);
            (0, item)
        });
        entry.0 += 1;
    }

    let repeated: Vec<(usize, &Value)> = first_seen
        .iter()
        .filter_map(|key| counts.get(key).copied())
        .filter(|(count, _)| *count > 1)
        .collect();

    if repeated.is_empty() {
        return None;
    }

    let occurrences: usize = repeated.iter().map(|(count, _)| count).sum();
    let frequency = occurrences as f64 / items.len() as f64;

    Some(Pattern::new(
        PatternDescriptor::Repetition {
            frequency,
            distinct_repeated: repeated.len(),
        },
        frequency,
        repeated.into_iter().map(|(_, value)| value.clone()).collect(),
    ))
}

/// Profundidade máxima de containers aninhados; só reporta acima de 2.
fn hierarchical_nesting(items: &[Value]) -> Option<Pattern> {
    let depth = 1 + items.iter().map(nesting_depth).max().unwrap_or(0);
    if depth <= 2 {
        return None;
    }

    let confidence = (0.4 + 0.1 * depth as f64).min(1.0);
    Some(Pattern::new(
        PatternDescriptor::HierarchicalNesting { depth },
        confidence,
        vec![json!(depth)],
    ))
}

fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: Value) -> Vec<Value> {
        raw.as_array().cloned().unwrap_or_default()
    }

    fn named<'a>(patterns: &'a [Pattern], name: &str) -> Option<&'a Pattern> {
        patterns.iter().find(|p| p.name() == name)
    }

    #[test]
    fn test_arithmetic_sequence() {
        let patterns = detect_structural_patterns(&values(json!([1, 3, 5, 7, 9, 11])));
        let p = named(&patterns, "arithmetic-sequence").unwrap();

        assert_eq!(
            p.pattern,
            PatternDescriptor::ArithmeticSequence {
                common_difference: 2.0
            }
        );
        assert!(p.confidence > 0.5);
        assert!(named(&patterns, "geometric-sequence").is_none());
    }

    #[test]
    fn test_geometric_sequence() {
        let patterns = detect_structural_patterns(&values(json!([2, 6, 18, 54])));
        let p = named(&patterns, "geometric-sequence").unwrap();
        assert_eq!(p.pattern, PatternDescriptor::GeometricSequence { common_ratio: 3.0 });
        assert!(named(&patterns, "arithmetic-sequence").is_none());
    }

    #[test]
    fn test_irregular_numbers_have_no_progression() {
        let patterns = detect_structural_patterns(&values(json!([4, 1, 9, 2, 7])));
        assert!(named(&patterns, "arithmetic-sequence").is_none());
        assert!(named(&patterns, "geometric-sequence").is_none());
    }

    #[test]
    fn test_short_sequence_ignored() {
        let patterns = detect_structural_patterns(&values(json!([1, 2])));
        assert!(named(&patterns, "arithmetic-sequence").is_none());
    }

    #[test]
    fn test_repetition_frequency() {
        let patterns = detect_structural_patterns(&values(json!(["a", "b", "a", "c", "b", "d"])));
        let p = named(&patterns, "repetition").unwrap();

        match &p.pattern {
            PatternDescriptor::Repetition {
                frequency,
                distinct_repeated,
            } => {
                assert!((frequency - 4.0 / 6.0).abs() < 1e-9);
                assert_eq!(*distinct_repeated, 2);
            }
            other => panic!("unexpected descriptor: {:?}", other),
        }
        assert_eq!(p.instances, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_nesting_reported_only_above_two() {
        let shallow = detect_structural_patterns(&values(json!([[1], [2]])));
        assert!(named(&shallow, "hierarchical-nesting").is_none());

        let deep = detect_structural_patterns(&values(json!([[[[1]]]])));
        let p = named(&deep, "hierarchical-nesting").unwrap();
        assert_eq!(p.pattern, PatternDescriptor::HierarchicalNesting { depth: 4 });
        assert!((p.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sequence() {
        assert!(detect_structural_patterns(&[]).is_empty());
    }
}
