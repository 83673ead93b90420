//! Cache LRU para resultados dos detectores de código.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::patterns::Pattern;
use crate::types::config::CacheConfig;

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(cap) => cap,
    None => NonZeroUsize::MIN,
};

/// Patterns em cache, antes do pós-processamento.
#[derive(Debug, Clone)]
pub struct CachedPatterns {
    pub patterns: Vec<Pattern>,

    /// Momento em que foi cacheado.
    pub cached_at: DateTime<Utc>,
}

impl CachedPatterns {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self {
            patterns,
            cached_at: Utc::now(),
        }
    }

    /// Verifica se a entrada expirou.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        elapsed >= ttl
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache LRU + TTL indexado pelo SHA-256 do texto.
pub struct RecognitionCache {
    cache: LruCache<String, CachedPatterns>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RecognitionCache {
    /// Cria um novo cache.
    ///
    /// # Argumentos
    /// - `capacity`: Número máximo de entradas (0 usa o fallback de 100)
    /// - `ttl`: Tempo de vida das entradas
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY);
        Self {
            cache: LruCache::new(cap),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cria o cache a partir da configuração, ou `None` se desabilitado.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.capacity, Duration::from_secs(config.ttl_secs)))
    }

    /// Chave de cache: SHA-256 hex do texto exato.
    ///
    /// A densidade dos detectores depende do comprimento bruto, então
    /// textos que diferem só em whitespace precisam de chaves distintas.
    pub fn cache_key(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Busca no cache. Entradas expiradas contam como miss e são removidas.
    pub fn get(&mut self, key: &str) -> Option<Vec<Pattern>> {
        let is_expired = self.cache.peek(key).map(|c| c.is_expired(self.ttl));

        match is_expired {
            Some(true) => {
                self.cache.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.cache.get(key).map(|c| c.patterns.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&mut self, key: String, patterns: Vec<Pattern>) {
        self.cache.put(key, CachedPatterns::new(patterns));
    }

    /// Busca por texto, calculando a chave.
    pub fn get_by_text(&mut self, text: &str) -> Option<Vec<Pattern>> {
        let key = Self::cache_key(text);
        self.get(&key)
    }

    pub fn invalidate(&mut self, key: &str) {
        self.cache.pop(key);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
