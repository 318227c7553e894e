use serde::{Deserialize, Serialize};

use crate::encoder::sparse::Index;
use crate::error::{EncoderError, Result};

pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Encoder settings.
///
/// Deserializes from camelCase keys; every field is optional.
///
/// ```
/// use intent_vectorizer::EncoderConfig;
/// let config: EncoderConfig = serde_json::from_str(r#"{ "unknownIndex": -1, "cacheSize": 5 }"#).unwrap();
/// assert_eq!(config.unknown_index, Some(-1));
/// assert!(config.use_cache);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncoderConfig {
    /// index substituted for unseen features; `None` drops them
    pub unknown_index: Option<Index>,
    pub use_cache: bool,
    pub cache_size: usize,
    /// tokenize corpus texts on the rayon pool before resolving them
    pub parallel_tokenize: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            unknown_index: None,
            use_cache: true,
            cache_size: DEFAULT_CACHE_SIZE,
            parallel_tokenize: false,
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_index(mut self, index: Index) -> Self {
        self.unknown_index = Some(index);
        self
    }

    pub fn with_cache(mut self, cache_size: usize) -> Self {
        self.use_cache = true;
        self.cache_size = cache_size;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn with_parallel_tokenize(mut self, enabled: bool) -> Self {
        self.parallel_tokenize = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.use_cache && self.cache_size == 0 {
            return Err(EncoderError::invalid_config("cache enabled with cacheSize 0"));
        }
        Ok(())
    }
}
