use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 单价库记录 (rate_records)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RateRecord {
    pub item_name: String,
    pub unit: String,
    pub rate_value: BigDecimal, // 单价, >= 0
    pub keywords: String,       // 逗号或空格分隔, NULL 读作空串
}

impl RateRecord {
    pub fn new(
        item_name: impl Into<String>,
        unit: impl Into<String>,
        rate_value: BigDecimal,
        keywords: impl Into<String>,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            unit: unit.into(),
            rate_value,
            keywords: keywords.into(),
        }
    }

    /// 单位比较: 忽略大小写和首尾空白
    pub fn unit_matches(&self, unit: &str) -> bool {
        self.unit.trim().to_lowercase() == unit.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_matches_ignores_case_and_padding() {
        let record = RateRecord::new("Brickwork", "m²", BigDecimal::from(45), "brick");
        assert!(record.unit_matches("M²"));
        assert!(record.unit_matches(" m² "));
        assert!(!record.unit_matches("m³"));
    }
}
