use crate::models::RateRecord;
use crate::service::tokenizer::{tokenize, tokenize_keywords, TokenSet};

/// 名称命中权重
const NAME_WEIGHT: usize = 2;
/// 关键词命中权重
const KEYWORD_WEIGHT: usize = 1;

/// 单价库匹配结果
#[derive(Debug, Clone, PartialEq)]
pub struct RateMatch<'a> {
    pub record: &'a RateRecord,
    pub score: usize,
}

/// 计算单条候选的得分: 2 × 名称重合词数 + 1 × 关键词重合词数
pub fn score_candidate(tokens: &TokenSet, record: &RateRecord) -> usize {
    let name_tokens = tokenize(&record.item_name);
    let keyword_tokens = tokenize_keywords(&record.keywords);

    let name_hits = tokens.iter().filter(|t| name_tokens.contains(*t)).count();
    let keyword_hits = tokens.iter().filter(|t| keyword_tokens.contains(*t)).count();

    NAME_WEIGHT * name_hits + KEYWORD_WEIGHT * keyword_hits
}

/// 在单价库中查找最佳匹配
///
/// 只考虑单位相同 (忽略大小写) 的记录; 取得分严格最高者, 同分保留先出现的。
/// 最高分为 0 或没有同单位记录时返回 `None`。
pub fn find_best_match<'a>(
    tokens: &TokenSet,
    unit: &str,
    catalog: &'a [RateRecord],
) -> Option<RateMatch<'a>> {
    let mut best: Option<RateMatch<'a>> = None;

    for record in catalog.iter().filter(|r| r.unit_matches(unit)) {
        let score = score_candidate(tokens, record);
        if score == 0 {
            continue;
        }

        let is_better = match &best {
            None => true,
            Some(current) => score > current.score,
        };

        if is_better {
            best = Some(RateMatch { record, score });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn record(name: &str, unit: &str, rate: &str, keywords: &str) -> RateRecord {
        RateRecord::new(name, unit, BigDecimal::from_str(rate).unwrap(), keywords)
    }

    fn catalog() -> Vec<RateRecord> {
        vec![
            record("Brickwork", "m²", "45.50", "brick wall masonry"),
            record("Plastering", "m²", "12.00", "plaster render wall"),
            record("Concrete Columns", "m³", "180.00", "concrete column reinforced"),
        ]
    }

    #[test]
    fn test_brickwork_match() {
        let catalog = catalog();
        let tokens = tokenize("Brick Masonry Walls");
        let m = find_best_match(&tokens, "m²", &catalog).unwrap();
        assert_eq!(m.record.item_name, "Brickwork");
        assert_eq!(m.score, 2); // brick + masonry 命中关键词
    }

    #[test]
    fn test_name_hits_weigh_double() {
        let catalog = catalog();
        let tokens = tokenize("Reinforced concrete columns");
        let m = find_best_match(&tokens, "m³", &catalog).unwrap();
        // concrete, columns 命中名称 (2×2), reinforced, concrete 命中关键词 (2×1)
        assert_eq!(m.score, 6);
    }

    #[test]
    fn test_unit_filter_is_case_insensitive() {
        let catalog = vec![record("Excavation", "M3", "8.00", "excavate earth")];
        let tokens = tokenize("Excavation in earth");
        assert!(find_best_match(&tokens, "m3", &catalog).is_some());
        assert!(find_best_match(&tokens, "m2", &catalog).is_none());
    }

    #[test]
    fn test_zero_score_is_no_match() {
        let catalog = catalog();
        let tokens = tokenize("Install solar panel array");
        assert!(find_best_match(&tokens, "m²", &catalog).is_none());
        assert!(find_best_match(&TokenSet::new(), "m²", &catalog).is_none());
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let catalog = vec![
            record("Wall Tiling", "m²", "30.00", ""),
            record("Wall Painting", "m²", "8.00", ""),
        ];
        let tokens = tokenize("wall");
        let m = find_best_match(&tokens, "m²", &catalog).unwrap();
        assert_eq!(m.record.item_name, "Wall Tiling");
    }

    #[test]
    fn test_match_is_deterministic() {
        let catalog = catalog();
        let tokens = tokenize("Plaster to brick wall");
        let first = find_best_match(&tokens, "m²", &catalog).unwrap();
        for _ in 0..10 {
            let again = find_best_match(&tokens, "m²", &catalog).unwrap();
            assert_eq!(again.record.item_name, first.record.item_name);
            assert_eq!(again.score, first.score);
        }
    }
}
