use serde::{ser::SerializeStruct, Deserialize, Serialize};
use tracing::debug;

use crate::encoder::cache::{CacheStats, LruTextCache, TextCache};
use crate::encoder::config::EncoderConfig;
use crate::encoder::processor::Processor;
use crate::encoder::sparse::Index;
use crate::encoder::vocab::{Vocabulary, VocabularyBuilder};
use crate::encoder::Encoder;
use crate::error::{EncoderError, Result};

/// Encoderのシリアライズ用のデータ構造
/// 語彙は index 順のリストとして保持します (index は位置で表現)
/// Processor とキャッシュの中身は含まれません
///
/// ```json
/// { "features": ["this", "is"], "intents": ["greet"], "unknownIndex": null, "useCache": true, "cacheSize": 1000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub features: Vec<String>,
    pub intents: Vec<String>,
    /// `null` と欠落はどちらも未設定として扱う
    #[serde(default)]
    pub unknown_index: Option<Index>,
    pub use_cache: bool,
    pub cache_size: usize,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// `Snapshot`から`Encoder`に変換します。
    /// `processor`は復元後の Encoder が使う Processor です。
    pub fn into_encoder<P: Processor>(self, processor: P) -> Result<Encoder<P, LruTextCache>> {
        Encoder::from_snapshot(processor, self)
    }

    /// 語彙を再構築する前の整合性チェック
    fn validate(&self) -> Result<()> {
        if let Some(token) = Vocabulary::first_duplicate(&self.features) {
            return Err(EncoderError::malformed_snapshot(format!("duplicate feature {token:?}")));
        }
        if let Some(token) = Vocabulary::first_duplicate(&self.intents) {
            return Err(EncoderError::malformed_snapshot(format!("duplicate intent {token:?}")));
        }
        if self.use_cache && self.cache_size == 0 {
            return Err(EncoderError::malformed_snapshot("useCache is set with cacheSize 0"));
        }
        Ok(())
    }
}

/// スナップショットの書き出し、読み込みの実装
impl<P, C> Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    pub fn export(&self) -> Snapshot {
        debug!(
            features = self.vocab.features.len(),
            intents = self.vocab.intents.len(),
            "exporting encoder snapshot"
        );
        Snapshot {
            features: self.vocab.features.to_vec(),
            intents: self.vocab.intents.to_vec(),
            unknown_index: self.config.unknown_index,
            use_cache: self.config.use_cache,
            cache_size: self.config.cache_size,
        }
    }

    /// スナップショットから状態を復元する
    /// 語彙・キャッシュは全て作り直され、語彙は保存された順に再追加されるため
    /// index は書き出し前と一致します
    ///
    /// # Errors
    /// `MalformedSnapshot` の場合、Encoder は変更されません
    pub fn import(&mut self, snapshot: Snapshot) -> Result<()> {
        snapshot.validate()?;

        let mut vocab = VocabularyBuilder::new();
        for feature in &snapshot.features {
            vocab.add_feature(feature);
        }
        for intent in &snapshot.intents {
            vocab.add_intent(intent);
        }

        self.config.unknown_index = snapshot.unknown_index;
        self.config.use_cache = snapshot.use_cache;
        self.config.cache_size = snapshot.cache_size;
        self.vocab = vocab;
        self.cache = Self::build_cache(&self.config);
        self.stats = CacheStats::default();
        debug!(
            features = self.vocab.features.len(),
            intents = self.vocab.intents.len(),
            use_cache = self.config.use_cache,
            "imported encoder snapshot"
        );
        Ok(())
    }

    pub fn from_snapshot(processor: P, snapshot: Snapshot) -> Result<Self> {
        // キャッシュは import で snapshot の設定から作られる
        let mut encoder = Self::with_processor(processor, EncoderConfig::default().without_cache())?;
        encoder.import(snapshot)?;
        Ok(encoder)
    }

    pub fn to_json(&self) -> Result<String> {
        self.export().to_json()
    }

    pub fn import_json(&mut self, json: &str) -> Result<()> {
        self.import(Snapshot::from_json(json)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        self.export().to_cbor()
    }

    pub fn import_cbor(&mut self, bytes: &[u8]) -> Result<()> {
        self.import(Snapshot::from_cbor(bytes)?)
    }
}

impl<P, C> Serialize for Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    /// Encoderをシリアライズします
    /// 出力は`Snapshot`と同じ形式です。復元には`Snapshot`を使用してください。
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Encoder", 5)?;
        state.serialize_field("features", &self.vocab.features.to_vec())?;
        state.serialize_field("intents", &self.vocab.intents.to_vec())?;
        state.serialize_field("unknownIndex", &self.config.unknown_index)?;
        state.serialize_field("useCache", &self.config.use_cache)?;
        state.serialize_field("cacheSize", &self.config.cache_size)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::corpus::CorpusEntry;
    use crate::encoder::processor::DefaultProcessor;

    fn corpus() -> Vec<CorpusEntry> {
        vec![
            CorpusEntry::new("greet")
                .with_utterances(&["Hello there", "Good morning"])
                .with_tests(&["hello friend"]),
            CorpusEntry::new("bye")
                .with_utterances(&["Goodbye", "See you later"])
                .with_tests(&["see you tomorrow"]),
        ]
    }

    fn trained(config: EncoderConfig) -> Encoder {
        let mut encoder = Encoder::with_config(config).unwrap();
        encoder.encode_corpus(&corpus());
        encoder
    }

    #[test]
    fn export_lists_vocabularies_in_index_order() {
        let encoder = trained(EncoderConfig::default());
        let snapshot = encoder.export();
        assert_eq!(
            snapshot.features,
            vec!["hello", "there", "good", "morning", "goodbye", "see", "you", "later"]
        );
        assert_eq!(snapshot.intents, vec!["greet", "bye"]);
        assert_eq!(snapshot.unknown_index, None);
        assert!(snapshot.use_cache);
        assert_eq!(snapshot.cache_size, 1000);
    }

    #[test]
    fn snapshot_json_shape() {
        let mut encoder = Encoder::with_config(EncoderConfig::new().with_unknown_index(-1).with_cache(5)).unwrap();
        encoder.add_feature_intent("hi", "greet");
        let value = serde_json::to_value(encoder.export()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "features": ["hi"],
                "intents": ["greet"],
                "unknownIndex": -1,
                "useCache": true,
                "cacheSize": 5
            })
        );
        // Serialize for Encoder matches the snapshot form
        assert_eq!(serde_json::to_value(&encoder).unwrap(), value);
    }

    #[test]
    fn import_export_round_trip_keeps_indices() {
        let original = trained(EncoderConfig::default());
        let mut restored = Encoder::new();
        restored.import(original.export()).unwrap();

        for feature in original.features() {
            assert_eq!(restored.get_feature_index(feature), original.get_feature_index(feature));
        }
        for intent in original.intents() {
            assert_eq!(restored.get_intent_index(intent), original.get_intent_index(intent));
        }
        assert_eq!(restored.export(), original.export());
    }

    #[test]
    fn restored_encoder_reproduces_dataset() {
        let mut original = Encoder::new();
        let expected = original.encode_corpus(&corpus());

        let json = original.to_json().unwrap();
        let mut restored = Encoder::new();
        restored.import_json(&json).unwrap();
        assert_eq!(restored.encode_corpus(&corpus()), expected);

        let mut snapshot = original.export();
        snapshot.use_cache = false;
        let mut uncached = Encoder::new();
        uncached.import(snapshot).unwrap();
        assert_eq!(uncached.cache_len(), 0);
        assert!(!uncached.config().use_cache);
        assert_eq!(uncached.encode_corpus(&corpus()), expected);
    }

    #[test]
    fn cbor_round_trip() {
        let original = trained(EncoderConfig::new().with_unknown_index(-1));
        let bytes = original.to_cbor().unwrap();
        let mut restored = Encoder::new();
        restored.import_cbor(&bytes).unwrap();
        assert_eq!(restored.export(), original.export());
        assert_eq!(restored.unknown_index(), Some(-1));
    }

    #[test]
    fn import_resets_previous_state() {
        let mut encoder = trained(EncoderConfig::default());
        encoder.import(Snapshot {
            features: vec!["x".to_string()],
            intents: vec![],
            unknown_index: None,
            use_cache: true,
            cache_size: 3,
        })
        .unwrap();
        assert_eq!(encoder.feature_count(), 1);
        assert_eq!(encoder.intent_count(), 0);
        assert_eq!(encoder.get_feature_index("hello"), None);
        assert_eq!(encoder.cache_len(), 0);
        assert_eq!(encoder.config().cache_size, 3);
    }

    #[test]
    fn missing_unknown_index_is_unset() {
        let snapshot = Snapshot::from_json(
            r#"{ "features": ["a"], "intents": [], "useCache": false, "cacheSize": 1000 }"#,
        )
        .unwrap();
        assert_eq!(snapshot.unknown_index, None);
    }

    #[test]
    fn missing_required_field_fails() {
        let result = Snapshot::from_json(r#"{ "features": ["a"], "useCache": true, "cacheSize": 10 }"#);
        assert!(matches!(result, Err(EncoderError::Json(_))));

        let mut encoder = Encoder::new();
        assert!(encoder.import_json(r#"{ "intents": [] }"#).is_err());
    }

    #[test]
    fn duplicate_tokens_are_rejected_without_mutation() {
        let mut encoder = trained(EncoderConfig::default());
        let before = encoder.export();
        let result = encoder.import(Snapshot {
            features: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            intents: vec![],
            unknown_index: None,
            use_cache: true,
            cache_size: 10,
        });
        assert!(matches!(result, Err(EncoderError::MalformedSnapshot(_))));
        assert_eq!(encoder.export(), before);
    }

    #[test]
    fn zero_cache_size_with_cache_is_rejected() {
        let mut snapshot = Encoder::new().export();
        snapshot.cache_size = 0;
        assert!(matches!(
            Encoder::new().import(snapshot.clone()),
            Err(EncoderError::MalformedSnapshot(_))
        ));
        snapshot.use_cache = false;
        assert!(Encoder::new().import(snapshot).is_ok());
    }

    #[test]
    fn into_encoder_with_processor() {
        let snapshot = trained(EncoderConfig::default()).export();
        let encoder = snapshot.clone().into_encoder(DefaultProcessor).unwrap();
        assert_eq!(encoder.export(), snapshot);
        assert_eq!(encoder.get_feature_index("morning"), Some(3));
    }
}
