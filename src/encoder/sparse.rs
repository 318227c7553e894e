use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Feature / intent index inside a sparse vector.
/// Signed so that a negative unknown index can be represented.
pub type Index = i64;

/// Weight of every present index. Encoding is multi-hot, never a count.
pub const WEIGHT: u8 = 1;

/// SparseVector
/// multi-hot なスパースベクトル
///
/// - `data`: index -> weight (常に 1)
/// - `keys`: 出現順の index 列
///
/// `keys` は通常 `data` と同じ要素数ですが、full モードでは
/// 重複した出現も全て記録するため `data` より長くなります。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseVector {
    pub data: IndexMap<Index, u8>,
    pub keys: Vec<Index>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vector holding exactly one index.
    pub fn one_hot(index: Index) -> Self {
        let mut vec = Self::new();
        vec.push(index, false);
        vec
    }

    /// indexを追加する
    ///
    /// # Arguments
    /// * `index` - 追加する index
    /// * `full` - true の場合は既出の index も `keys` に追加する
    #[inline]
    pub fn push(&mut self, index: Index, full: bool) {
        let seen = self.data.insert(index, WEIGHT).is_some();
        if full || !seen {
            self.keys.push(index);
        }
    }

    #[inline]
    pub fn contains(&self, index: Index) -> bool {
        self.data.contains_key(&index)
    }

    /// Number of distinct indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One encoded utterance: text features in, intent out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedExample {
    pub input: SparseVector,
    pub output: SparseVector,
}
