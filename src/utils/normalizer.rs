use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// トークン区切り
/// 空白と句読点・括弧類の連続
const SEPARATOR_PATTERN: &str = r#"[\s,.!?;:(\[\]'"¡¿)/]+"#;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(SEPARATOR_PATTERN).expect("separator pattern is a valid regex"))
}

#[inline]
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// テキストの正規化
/// NFD分解後に結合文字(U+0300..U+036F)を取り除き、小文字化します
///
/// # Arguments
/// * `text` - 正規化するテキスト
///
/// # Returns
/// * `String` - 正規化済みのテキスト
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.to_lowercase()
}

/// テキストをトークンに分割します
/// 大文字小文字はそのまま、空のトークンは除外されます
///
/// # Arguments
/// * `text` - 分割するテキスト
///
/// # Returns
/// * `Vec<String>` - 出現順のトークン
pub fn tokenize(text: &str) -> Vec<String> {
    separator()
        .split(text)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Identity stemmer.
/// Processors that need real stemming compose their own step after `tokenize`.
#[inline]
pub fn stem(tokens: Vec<String>) -> Vec<String> {
    tokens
}
