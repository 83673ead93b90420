//! PatternEngine - despacho por forma da entrada e pós-processamento.

use serde_json::Value;

use crate::atoms::{clamp_unit, Atom};
use crate::cache::{CacheStats, RecognitionCache};
use crate::types::config::{CacheConfig, PatternsConfig};

use super::atom_set::{detect_atom_set_patterns, is_atom_shaped};
use super::behavioral::detect_behavioral_patterns;
use super::code::detect_code_patterns;
use super::structural::detect_structural_patterns;
use super::types::{Pattern, RecognitionOptions};

/// Reconhecedor de patterns.
pub struct PatternEngine {
    cache: Option<RecognitionCache>,
    defaults: RecognitionOptions,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(&PatternsConfig::default(), &CacheConfig::default())
    }
}

impl PatternEngine {
    pub fn new(patterns: &PatternsConfig, cache: &CacheConfig) -> Self {
        Self {
            cache: RecognitionCache::from_config(cache),
            defaults: RecognitionOptions::from_config(patterns),
        }
    }

    /// Opções padrão configuradas.
    pub fn default_options(&self) -> &RecognitionOptions {
        &self.defaults
    }

    /// Reconhece patterns na entrada.
    ///
    /// Ordem de despacho: texto → código; array → estrutural (e
    /// conjunto de atoms, se todo elemento tiver forma de atom);
    /// objeto → comportamental. Outras entradas produzem lista vazia.
    pub fn recognize(&mut self, input: &Value, options: &RecognitionOptions) -> Vec<Pattern> {
        let raw = match input {
            Value::String(text) => self.code_patterns(text),
            Value::Array(items) => {
                let mut patterns = detect_structural_patterns(items);
                if !items.is_empty() && items.iter().all(is_atom_shaped) {
                    patterns.extend(detect_atom_set_patterns(items));
                }
                patterns
            }
            Value::Object(record) => detect_behavioral_patterns(record),
            _ => Vec::new(),
        };

        let detected = raw.len();
        let patterns = post_process(raw, options);

        tracing::debug!(
            detected = detected,
            reported = patterns.len(),
            "Patterns recognized"
        );

        patterns
    }

    /// Reconhece patterns sobre um conjunto de atoms.
    pub fn recognize_atoms(&mut self, atoms: &[Atom], options: &RecognitionOptions) -> Vec<Pattern> {
        let values: Vec<Value> = atoms
            .iter()
            .filter_map(|a| serde_json::to_value(a).ok())
            .collect();
        self.recognize(&Value::Array(values), options)
    }

    /// Estatísticas do cache, se habilitado.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(RecognitionCache::stats)
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    fn code_patterns(&mut self, text: &str) -> Vec<Pattern> {
        let Some(cache) = self.cache.as_mut() else {
            return detect_code_patterns(text);
        };

        let key = RecognitionCache::cache_key(text);
        if let Some(cached) = cache.get(&key) {
            tracing::trace!(key = %key, "Recognition cache hit");
            return cached;
        }

        let patterns = detect_code_patterns(text);
        cache.insert(key, patterns.clone());
        patterns
    }
}

/// Reescore, filtragem e ranking.
///
/// Aplicado sobre os resultados brutos a cada chamada, inclusive os
/// vindos do cache.
pub fn post_process(patterns: Vec<Pattern>, options: &RecognitionOptions) -> Vec<Pattern> {
    let scope_multiplier = options.scope.as_ref().map(|s| s.multiplier()).unwrap_or(1.0);

    let mut ranked: Vec<Pattern> = patterns
        .into_iter()
        .map(|mut pattern| {
            let mut confidence = pattern.confidence * scope_multiplier;
            if pattern.instances.len() > 5 {
                confidence *= 1.1;
            } else if pattern.instances.len() < 2 {
                confidence *= 0.8;
            }
            confidence *= options.confidence_weight;
            pattern.confidence = clamp_unit(confidence);
            pattern
        })
        .filter(|p| options.include_low_confidence || p.confidence >= options.min_confidence)
        .filter(|p| match &options.pattern_types {
            Some(types) => types.contains(&p.metadata.pattern_type),
            None => true,
        })
        .collect();

    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(options.max_results);
    ranked
}
