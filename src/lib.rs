/// This crate turns utterances and their intent labels into sparse multi-hot
/// vectors for training an intent classifier.
pub mod encoder;
pub mod error;
pub mod utils;

/// Encoder
/// The top-level struct of this crate.
/// It grows a feature vocabulary (tokens of the text) and an intent vocabulary
/// (labels) and encodes text / intent pairs against them.
///
/// Internally, it holds:
/// - The feature vocabulary
/// - The intent vocabulary
/// - An LRU cache of input vectors keyed by raw text
/// - The text processor
///
/// `Encoder<P, C>` has the following generic parameters:
/// - `P`: Text processor (e.g., `DefaultProcessor`, or any `Fn(&str) -> Vec<String>`)
/// - `C`: Input vector cache (e.g., `LruTextCache`)
///
/// Indices are assigned in first-seen order and never change.
/// Adding a new feature clears the cache, adding an intent does not.
///
/// # Serialization
/// Supported.
/// Only the vocabularies and settings are written, in the `Snapshot` form.
///
/// # Deserialization
/// Through `Snapshot` (`Encoder::import`, `Snapshot::into_encoder`).
pub use encoder::Encoder;

/// Encoder settings
/// Unknown-index fallback, cache switch and capacity, parallel tokenization.
pub use encoder::config::EncoderConfig;

/// Encoder Data Structure for Serialization
/// `{ features, intents, unknownIndex, useCache, cacheSize }`.
/// Vocabularies are stored as plain lists; the index of a token is its position.
/// Importing replays the lists in order so every index is reproduced.
pub use encoder::serde::Snapshot;

/// Sparse multi-hot vectors and encoded examples
/// - `SparseVector`: index -> weight (always 1) plus the indices in observed order
/// - `EncodedExample`: input vector from the text, one-hot output vector from the intent
pub use encoder::sparse::{EncodedExample, SparseVector};

/// Corpus input and dataset output
/// - `CorpusEntry`: `{ intent, utterances?, tests? }`
/// - `Dataset`: `{ train, validation }`
pub use encoder::corpus::{CorpusEntry, Dataset};

/// Text Processor Trait
/// Maps a text to an ordered list of tokens.
/// `DefaultProcessor` strips accents, lowercases and splits on whitespace and punctuation.
pub use encoder::processor::{DefaultProcessor, Processor};

/// Input vector cache
/// `TextCache` is the capacity-bounded store the encoder consults before
/// tokenizing; `LruTextCache` evicts the least recently used entry.
pub use encoder::cache::{CacheStats, LruTextCache, TextCache};

pub use error::{EncoderError, Result};
