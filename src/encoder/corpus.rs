use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::cache::TextCache;
use crate::encoder::processor::Processor;
use crate::encoder::sparse::EncodedExample;
use crate::encoder::Encoder;

/// One intent of a training corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub intent: String,
    /// training utterances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utterances: Option<Vec<String>>,
    /// validation texts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<String>>,
}

impl CorpusEntry {
    pub fn new(intent: &str) -> Self {
        Self {
            intent: intent.to_string(),
            ..Default::default()
        }
    }

    pub fn with_utterances<T: AsRef<str>>(mut self, utterances: &[T]) -> Self {
        self.utterances = Some(utterances.iter().map(|u| u.as_ref().to_string()).collect());
        self
    }

    pub fn with_tests<T: AsRef<str>>(mut self, tests: &[T]) -> Self {
        self.tests = Some(tests.iter().map(|t| t.as_ref().to_string()).collect());
        self
    }
}

/// Encoded corpus.
/// `train` は語彙を成長させながら、`validation` は語彙を固定してエンコードされたもの
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub train: Vec<EncodedExample>,
    pub validation: Vec<EncodedExample>,
}

/// コーパス単位のエンコードの実装
impl<P, C> Encoder<P, C>
where
    P: Processor,
    C: TextCache,
{
    pub fn encode_corpus(&mut self, corpus: &[CorpusEntry]) -> Dataset {
        self.encode_corpus_with(corpus, |_, _, _| {})
    }

    /// コーパスをエンコードする
    ///
    /// 全エントリの utterances を先に (learn = true)、その後に全エントリの tests を
    /// (learn = false) 処理します。エントリごとに交互には処理しません。
    ///
    /// # Arguments
    /// * `corpus` - コーパス
    /// * `observer` - 学習用の例が 1 つエンコードされるごとに
    ///   `(utterance, intent, example)` で呼ばれる
    pub fn encode_corpus_with<F>(&mut self, corpus: &[CorpusEntry], mut observer: F) -> Dataset
    where
        F: FnMut(&str, &str, &EncodedExample),
    {
        let train_texts: Vec<(&str, &str)> = corpus
            .iter()
            .flat_map(|entry| {
                entry
                    .utterances
                    .iter()
                    .flatten()
                    .map(move |utterance| (utterance.as_str(), entry.intent.as_str()))
            })
            .collect();
        let validation_texts: Vec<(&str, &str)> = corpus
            .iter()
            .flat_map(|entry| {
                entry
                    .tests
                    .iter()
                    .flatten()
                    .map(move |test| (test.as_str(), entry.intent.as_str()))
            })
            .collect();
        debug!(
            entries = corpus.len(),
            train = train_texts.len(),
            validation = validation_texts.len(),
            "encoding corpus"
        );

        let mut dataset = Dataset {
            train: Vec::with_capacity(train_texts.len()),
            validation: Vec::with_capacity(validation_texts.len()),
        };

        let tokens = self.pretokenize(&train_texts);
        for (i, (utterance, intent)) in train_texts.iter().copied().enumerate() {
            let prepared = tokens.as_ref().map(|tokens| tokens[i].as_slice());
            let example = self.encode_prepared(utterance, prepared, intent, true);
            observer(utterance, intent, &example);
            dataset.train.push(example);
        }

        // ここからは語彙を固定
        let tokens = self.pretokenize(&validation_texts);
        for (i, (test, intent)) in validation_texts.iter().copied().enumerate() {
            let prepared = tokens.as_ref().map(|tokens| tokens[i].as_slice());
            let example = self.encode_prepared(test, prepared, intent, false);
            dataset.validation.push(example);
        }

        debug!(
            features = self.feature_count(),
            intents = self.intent_count(),
            "corpus encoded"
        );
        dataset
    }

    fn encode_prepared(&mut self, text: &str, tokens: Option<&[String]>, intent: &str, learn: bool) -> EncodedExample {
        let input = self.process_prepared(text, tokens, Some(intent), learn, false);
        let output = self.process_intent(intent);
        EncodedExample { input, output }
    }

    /// Processor は純粋なので、トークン化だけ先に並列で済ませておく
    /// 語彙の解決は出現順に逐次行う
    fn pretokenize(&self, texts: &[(&str, &str)]) -> Option<Vec<Vec<String>>> {
        if !self.config.parallel_tokenize {
            return None;
        }
        let processor = &self.processor;
        Some(texts.par_iter().map(|(text, _)| processor.process(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::config::EncoderConfig;
    use crate::encoder::sparse::SparseVector;

    fn corpus() -> Vec<CorpusEntry> {
        vec![
            CorpusEntry::new("greet")
                .with_utterances(&["hello there", "good morning"])
                .with_tests(&["hello friend"]),
            CorpusEntry::new("bye")
                .with_utterances(&["goodbye", "see you later"])
                .with_tests(&["see you tomorrow", "goodbye friend"]),
            CorpusEntry::new("thanks").with_utterances(&["thank you"]),
        ]
    }

    fn keys(vec: &SparseVector) -> Vec<i64> {
        vec.keys.clone()
    }

    #[test]
    fn utterances_only_gives_empty_validation() {
        let mut encoder = Encoder::new();
        let small = vec![CorpusEntry::new("intent").with_utterances(&["This is a utterance"])];
        let actual = encoder.encode_corpus(&small);
        assert_eq!(actual.train.len(), 1);
        assert_eq!(keys(&actual.train[0].input), vec![0, 1, 2, 3]);
        assert_eq!(actual.train[0].output, SparseVector::one_hot(0));
        assert!(actual.validation.is_empty());
    }

    #[test]
    fn training_phase_precedes_validation_phase() {
        let mut encoder = Encoder::new();
        let dataset = encoder.encode_corpus(&corpus());

        assert_eq!(dataset.train.len(), 5);
        assert_eq!(dataset.validation.len(), 3);
        // hello there good morning goodbye see you later thank you
        assert_eq!(encoder.feature_count(), 9);
        assert_eq!(keys(&dataset.train[2].input), vec![4]);
        assert_eq!(keys(&dataset.train[3].input), vec![5, 6, 7]);
        assert_eq!(dataset.train[3].output, SparseVector::one_hot(1));

        // "friend" / "tomorrow" never learned
        assert_eq!(keys(&dataset.validation[0].input), vec![0]);
        assert_eq!(dataset.validation[0].output, SparseVector::one_hot(0));
        assert_eq!(keys(&dataset.validation[1].input), vec![5, 6]);
        assert_eq!(keys(&dataset.validation[2].input), vec![4]);
        assert_eq!(encoder.get_feature_index("friend"), None);
    }

    #[test]
    fn observer_fires_once_per_utterance_in_order() {
        let mut encoder = Encoder::new();
        let mut seen: Vec<(String, String, EncodedExample)> = Vec::new();
        let dataset = encoder.encode_corpus_with(&corpus(), |utterance, intent, example| {
            seen.push((utterance.to_string(), intent.to_string(), example.clone()));
        });
        let utterances: Vec<&str> = seen.iter().map(|(u, _, _)| u.as_str()).collect();
        assert_eq!(
            utterances,
            vec!["hello there", "good morning", "goodbye", "see you later", "thank you"]
        );
        assert_eq!(seen[4].1, "thanks");
        let examples: Vec<EncodedExample> = seen.into_iter().map(|(_, _, e)| e).collect();
        assert_eq!(examples, dataset.train);
    }

    #[test]
    fn cache_settings_do_not_change_results() {
        let expected = Encoder::new().encode_corpus(&corpus());
        let configs = [
            EncoderConfig::new().without_cache(),
            EncoderConfig::new().with_cache(2),
            EncoderConfig::new().with_parallel_tokenize(true),
            EncoderConfig::new().without_cache().with_parallel_tokenize(true),
        ];
        for config in configs {
            let mut encoder = Encoder::with_config(config.clone()).unwrap();
            assert_eq!(encoder.encode_corpus(&corpus()), expected, "config {config:?}");
        }
    }

    #[test]
    fn corpus_entries_deserialize_with_missing_lists() {
        let json = serde_json::json!([
            { "intent": "greet", "utterances": ["hi"] },
            { "intent": "bye", "tests": ["bye"] },
        ]);
        let entries: Vec<CorpusEntry> = serde_json::from_value(json).unwrap();
        assert_eq!(entries[0].tests, None);
        assert_eq!(entries[1].utterances, None);

        let mut encoder = Encoder::new();
        let dataset = encoder.encode_corpus(&entries);
        assert_eq!(dataset.train.len(), 1);
        assert_eq!(dataset.validation.len(), 1);
        // "bye" was never learned as an intent
        assert!(dataset.validation[0].output.is_empty());
    }
}
