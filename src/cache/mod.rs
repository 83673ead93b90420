//! Cache LRU para resultados de reconhecimento.
//!
//! Os detectores de código são a parte cara do reconhecimento; o mesmo
//! texto (a menos de whitespace) reaproveita os patterns brutos.

mod lru;

pub use lru::{CacheStats, CachedPatterns, RecognitionCache};
