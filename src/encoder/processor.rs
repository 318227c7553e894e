use crate::utils::normalizer::{normalize, stem, tokenize};

/// Text processor trait
/// テキストを順序付きのトークン列に変換する
///
/// 実装は純粋かつ決定的である必要があります。
/// キャッシュは生テキストをキーにしているため、同じ入力に対して
/// 異なるトークン列を返すとキャッシュの内容が不正になります。
pub trait Processor: Send + Sync {
    fn process(&self, text: &str) -> Vec<String>;
}

/// デフォルトのProcessor
/// 正規化(アクセント除去 + 小文字化)の後、空白・句読点で分割します
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProcessor;

impl DefaultProcessor {
    pub fn new() -> Self {
        DefaultProcessor
    }
}

impl Processor for DefaultProcessor {
    #[inline]
    fn process(&self, text: &str) -> Vec<String> {
        stem(tokenize(&normalize(text)))
    }
}

impl<F> Processor for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    #[inline]
    fn process(&self, text: &str) -> Vec<String> {
        self(text)
    }
}
