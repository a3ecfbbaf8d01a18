use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 上传表格中的一行 (只在一次上传内存在)
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub row_number: usize, // 表格中的行号, 从 1 开始
    pub item_no: String,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
}

/// 单价来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    #[serde(rename = "Database")]
    Database,
    #[serde(rename = "AI Estimate")]
    AiEstimate,
    #[serde(rename = "Manual")]
    Manual,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "Database"),
            Self::AiEstimate => write!(f, "AI Estimate"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

/// 计价后的清单项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedItem {
    pub item_no: String,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub rate: Option<BigDecimal>,
    pub total: Option<BigDecimal>,
    pub is_ai_suggestion: bool,
    pub source: RateSource,
}

impl PricedItem {
    /// 按来源构造; total = rate * quantity
    pub fn priced(row: &SourceRow, rate: Option<BigDecimal>, source: RateSource) -> Self {
        let (rate, source) = match rate {
            Some(r) => (Some(r), source),
            None => (None, RateSource::Manual),
        };
        let total = rate.as_ref().map(|r| r * &row.quantity);

        Self {
            item_no: row.item_no.clone(),
            description: row.description.clone(),
            quantity: row.quantity.clone(),
            unit: row.unit.clone(),
            rate,
            total,
            is_ai_suggestion: source == RateSource::AiEstimate,
            source,
        }
    }
}

/// 被跳过的输入行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDiagnostic {
    pub row_number: usize,
    pub reason: String,
}

/// 一次估价的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    pub items: Vec<PricedItem>,
    pub project_total: BigDecimal,
    pub skipped_rows: Vec<RowDiagnostic>,
}

impl EstimationResult {
    pub fn new(skipped_rows: Vec<RowDiagnostic>) -> Self {
        Self {
            items: Vec::new(),
            project_total: BigDecimal::zero(),
            skipped_rows,
        }
    }

    /// 追加一项并累加总价 (null 计 0)
    pub fn push(&mut self, item: PricedItem) {
        if let Some(total) = &item.total {
            self.project_total += total;
        }
        self.items.push(item);
    }

    pub fn count_by_source(&self, source: RateSource) -> usize {
        self.items.iter().filter(|i| i.source == source).count()
    }
}
