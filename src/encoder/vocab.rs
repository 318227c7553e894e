use indexmap::IndexSet;

/// Vocabulary
/// token と index の全単射
///
/// index は初出順に 0 から振られ、一度振られた index は変わらず、再利用もされません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: IndexSet<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// tokenを追加する
    ///
    /// # Returns
    /// * `bool` - 新しく追加された場合 true
    #[inline]
    pub fn insert(&mut self, token: &str) -> bool {
        if self.tokens.contains(token) {
            return false;
        }
        self.tokens.insert(token.to_string())
    }

    #[inline]
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.tokens.get_index_of(token)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get_index(index).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tokens.iter().cloned().collect()
    }

    /// Returns the first token that occurs more than once, if any.
    pub(crate) fn first_duplicate<T: AsRef<str>>(tokens: &[T]) -> Option<&str> {
        let mut seen = IndexSet::with_capacity(tokens.len());
        tokens
            .iter()
            .map(AsRef::as_ref)
            .find(|token| !seen.insert(*token))
    }
}

/// Feature and intent vocabularies of one encoder.
///
/// Insertion reports whether the vocabulary grew so the owner can react
/// (the encoder clears its cache when a feature is new).
#[derive(Debug, Clone, Default)]
pub struct VocabularyBuilder {
    pub features: Vocabulary,
    pub intents: Vocabulary,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_feature(&mut self, feature: &str) -> bool {
        self.features.insert(feature)
    }

    #[inline]
    pub fn add_intent(&mut self, intent: &str) -> bool {
        self.intents.insert(intent)
    }

    #[inline]
    pub fn feature_index(&self, feature: &str) -> Option<usize> {
        self.features.index_of(feature)
    }

    #[inline]
    pub fn intent_index(&self, intent: &str) -> Option<usize> {
        self.intents.index_of(intent)
    }
}
