use indexmap::IndexSet;

/// 归一化后的词集合 (保序去重)
pub type TokenSet = IndexSet<String>;

/// 停用词: 冠词、介词以及工程清单里常见的套话
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "onto", "upon", "over", "under", "all",
    "any", "are", "was", "per", "each", "including", "include", "includes", "inclusive",
    "supply", "supplying", "install", "installation", "installing", "complete", "completed",
    "provide", "providing", "fix", "fixing", "work", "works", "item", "items", "etc",
    "required", "necessary", "approved", "specified", "as", "to", "of", "in", "on", "at",
    "by", "an", "a",
];

/// 文本 → 词集合
///
/// 小写、去掉非单词字符、按空白切分, 丢弃长度 <= 2 的词和停用词。
pub fn tokenize(text: &str) -> TokenSet {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// 关键词列表 → 词集合; 先按逗号拆分, 避免 "brick,wall" 粘成一个词
pub fn tokenize_keywords(keywords: &str) -> TokenSet {
    keywords.split(',').flat_map(tokenize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("Brick Masonry Walls");
        let expected: Vec<&str> = vec!["brick", "masonry", "walls"];
        assert_eq!(tokens.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_tokenize_strips_punctuation_and_stop_words() {
        let tokens = tokenize("Supply & install 20mm PVC conduit, complete (per m)");
        assert!(tokens.contains("20mm"));
        assert!(tokens.contains("pvc"));
        assert!(tokens.contains("conduit"));
        assert!(!tokens.contains("supply"));
        assert!(!tokens.contains("install"));
        assert!(!tokens.contains("complete"));
        assert!(!tokens.contains("per"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        let tokens = tokenize("RC slab 15 mm to be cast");
        assert!(tokens.contains("slab"));
        assert!(tokens.contains("cast"));
        assert!(!tokens.contains("rc"));
        assert!(!tokens.contains("15"));
        assert!(!tokens.contains("be"));
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
        assert!(tokenize("a an of").is_empty());
    }

    #[test]
    fn test_tokenize_idempotent_and_case_insensitive() {
        let text = "Reinforced Concrete Columns, Grade C30";
        assert_eq!(tokenize(text), tokenize(text));
        assert_eq!(tokenize(text), tokenize(&text.to_uppercase()));
    }

    #[test]
    fn test_tokenize_keywords_splits_commas() {
        let tokens = tokenize_keywords("brick,wall, masonry blockwork");
        assert!(tokens.contains("brick"));
        assert!(tokens.contains("wall"));
        assert!(tokens.contains("masonry"));
        assert!(tokens.contains("blockwork"));
        assert_eq!(tokens.len(), 4);
    }
}
