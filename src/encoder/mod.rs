pub mod cache;
pub mod config;
pub mod corpus;
pub mod processor;
pub mod serde;
pub mod sparse;
pub mod vocab;

use std::borrow::Cow;
use std::fmt;
use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::encoder::cache::{CacheStats, LruTextCache, TextCache};
use crate::encoder::config::EncoderConfig;
use crate::encoder::processor::{DefaultProcessor, Processor};
use crate::encoder::sparse::{EncodedExample, Index, SparseVector};
use crate::encoder::vocab::VocabularyBuilder;
use crate::error::Result;

/// Encoder
/// テキストと intent を multi-hot のスパースベクトルに変換する
///
/// `Encoder<P, C>` のジェネリクス
/// - `P`: テキストをトークン列に変換する Processor
/// - `C`: 入力ベクトルのキャッシュ
///
/// 語彙とキャッシュはこのインスタンスが排他的に所有します。
/// 内部ロックは持たないため、変更系の操作は全て `&mut self` を要求します。
pub struct Encoder<P = DefaultProcessor, C = LruTextCache>
where
    P: Processor,
    C: TextCache,
{
    processor: P,
    vocab: VocabularyBuilder,
    config: EncoderConfig,
    /// `config.use_cache` が false の場合は None
    cache: Option<C>,
    stats: CacheStats,
}

impl Encoder {
    /// Encoder with the default processor and default settings.
    pub fn new() -> Self {
        Self {
            processor: DefaultProcessor,
            vocab: VocabularyBuilder::new(),
            config: EncoderConfig::default(),
            cache: NonZeroUsize::new(config::DEFAULT_CACHE_SIZE).map(LruTextCache::with_capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn with_config(config: EncoderConfig) -> Result<Self> {
        Self::with_processor(DefaultProcessor, config)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, C> Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    /// Create an encoder with a custom processor
    ///
    /// # Errors
    /// `InvalidConfig` when the cache is enabled with a zero capacity.
    pub fn with_processor(processor: P, config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let cache = Self::build_cache(&config);
        Ok(Self {
            processor,
            vocab: VocabularyBuilder::new(),
            config,
            cache,
            stats: CacheStats::default(),
        })
    }

    pub(crate) fn build_cache(config: &EncoderConfig) -> Option<C> {
        if !config.use_cache {
            return None;
        }
        NonZeroUsize::new(config.cache_size).map(C::with_capacity)
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn unknown_index(&self) -> Option<Index> {
        self.config.unknown_index
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    /// Entries currently held by the cache, 0 when caching is disabled.
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }
}

/// 語彙の追加、参照の実装
impl<P, C> Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    /// featureを追加する
    /// 新しい feature の場合、キャッシュを全て破棄します
    /// (既存のキャッシュは未知語として処理された結果を含みうるため)
    pub fn add_feature(&mut self, feature: &str) {
        if self.vocab.add_feature(feature) {
            trace!(feature, index = self.vocab.features.len() - 1, "new feature");
            self.invalidate_cache();
        }
    }

    /// intentを追加する
    /// intent の index は入力ベクトルに影響しないためキャッシュはそのまま
    pub fn add_intent(&mut self, intent: &str) {
        if self.vocab.add_intent(intent) {
            trace!(intent, index = self.vocab.intents.len() - 1, "new intent");
        }
    }

    pub fn add_feature_intent(&mut self, feature: &str, intent: &str) {
        self.add_feature(feature);
        self.add_intent(intent);
    }

    /// featureの index を取得する
    ///
    /// # Returns
    /// * 語彙にあればその index
    /// * 語彙になければ設定された unknown index (未設定なら None)
    #[inline]
    pub fn get_feature_index(&self, feature: &str) -> Option<Index> {
        match self.vocab.feature_index(feature) {
            Some(index) => Some(index as Index),
            None => self.config.unknown_index,
        }
    }

    /// intentの index を取得する
    /// intent には unknown index のフォールバックはありません
    #[inline]
    pub fn get_intent_index(&self, intent: &str) -> Option<usize> {
        self.vocab.intent_index(intent)
    }

    /// Feature at `index`.
    ///
    /// # Panics
    /// If `index` was never assigned.
    pub fn feature(&self, index: usize) -> &str {
        match self.vocab.features.get(index) {
            Some(feature) => feature,
            None => panic!(
                "feature index {index} out of range (vocabulary has {} features)",
                self.vocab.features.len()
            ),
        }
    }

    /// Intent at `index`.
    ///
    /// # Panics
    /// If `index` was never assigned.
    pub fn intent(&self, index: usize) -> &str {
        match self.vocab.intents.get(index) {
            Some(intent) => intent,
            None => panic!(
                "intent index {index} out of range (vocabulary has {} intents)",
                self.vocab.intents.len()
            ),
        }
    }

    pub fn get_feature(&self, index: usize) -> Option<&str> {
        self.vocab.features.get(index)
    }

    pub fn get_intent(&self, index: usize) -> Option<&str> {
        self.vocab.intents.get(index)
    }

    pub fn feature_count(&self) -> usize {
        self.vocab.features.len()
    }

    pub fn intent_count(&self) -> usize {
        self.vocab.intents.len()
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.vocab.features.iter()
    }

    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.vocab.intents.iter()
    }

    fn invalidate_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            if !cache.is_empty() {
                debug!(entries = cache.len(), "vocabulary grew, clearing encoding cache");
                cache.clear();
            }
            self.stats.invalidations += 1;
        }
    }
}

/// エンコード処理の実装
impl<P, C> Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    /// テキストを入力ベクトルに変換する
    ///
    /// # Arguments
    /// * `text` - 入力テキスト
    /// * `intent` - learn 時に語彙へ追加する intent
    /// * `learn` - true の場合、未知の token を語彙に追加する
    /// * `full` - true の場合、重複した token も `keys` に全て記録する
    ///
    /// キャッシュが有効で `text` がキャッシュにある場合、
    /// `learn` / `full` に関わらずキャッシュされたベクトルをそのまま返します。
    pub fn process_text(&mut self, text: &str, intent: Option<&str>, learn: bool, full: bool) -> SparseVector {
        self.process_prepared(text, None, intent, learn, full)
    }

    /// intent を one-hot ベクトルに変換する
    /// 未知の intent は空のベクトル
    pub fn process_intent(&self, intent: &str) -> SparseVector {
        match self.get_intent_index(intent) {
            Some(index) => SparseVector::one_hot(index as Index),
            None => SparseVector::new(),
        }
    }

    /// Encode a text and its intent.
    /// `output` is never cached and reflects the current intent vocabulary.
    pub fn encode(&mut self, text: &str, intent: Option<&str>, learn: bool, full: bool) -> EncodedExample {
        let input = self.process_text(text, intent, learn, full);
        let output = intent.map(|intent| self.process_intent(intent)).unwrap_or_default();
        EncodedExample { input, output }
    }

    /// `tokens` が与えられた場合は Processor を呼ばずにそれを使う
    pub(crate) fn process_prepared(
        &mut self,
        text: &str,
        tokens: Option<&[String]>,
        intent: Option<&str>,
        learn: bool,
        full: bool,
    ) -> SparseVector {
        if let Some(hit) = self.cached(text) {
            return hit;
        }
        let tokens = match tokens {
            Some(tokens) => Cow::Borrowed(tokens),
            None => Cow::Owned(self.processor.process(text)),
        };

        let mut result = SparseVector::new();
        for token in tokens.iter() {
            if learn {
                self.add_feature(token);
                if let Some(intent) = intent {
                    self.add_intent(intent);
                }
            }
            // 未知語かつ unknown index 未設定なら無視
            if let Some(index) = self.get_feature_index(token) {
                result.push(index, full);
            }
        }

        if let Some(cache) = self.cache.as_mut() {
            cache.put(text.to_string(), result.clone());
        }
        result
    }

    fn cached(&mut self, text: &str) -> Option<SparseVector> {
        let cache = self.cache.as_mut()?;
        match cache.get(text) {
            Some(hit) => {
                self.stats.hits += 1;
                trace!(text, "encoding cache hit");
                Some(hit)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }
}

impl<P, C> fmt::Debug for Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("features", &self.vocab.features.len())
            .field("intents", &self.vocab.intents.len())
            .field("config", &self.config)
            .field("cached", &self.cache_len())
            .field("stats", &self.stats)
            .finish()
    }
}
