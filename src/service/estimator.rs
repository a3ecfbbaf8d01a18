use crate::db::BoqStore;
use crate::error::Result;
use crate::models::{EstimationResult, PricedItem, RateRecord, RateSource, RowDiagnostic, SourceRow};
use crate::service::advisor::{RateAdvisor, Suggestion};
use crate::service::matcher::find_best_match;
use crate::service::queue::RateLimitedQueue;
use crate::service::tokenizer::tokenize;
use crate::service::workbook;
use std::sync::Arc;

/// 估价服务: 解析 → 逐行匹配 → (必要时) 排队请求外部估价 → 汇总 → 持久化
pub struct EstimationService {
    store: Arc<dyn BoqStore>,
    advisor: Arc<dyn RateAdvisor>,
    queue: Arc<RateLimitedQueue>,
    api_key: Option<String>,
}

impl EstimationService {
    pub fn new(
        store: Arc<dyn BoqStore>,
        advisor: Arc<dyn RateAdvisor>,
        queue: Arc<RateLimitedQueue>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            store,
            advisor,
            queue,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// 处理一次上传: 解析、估价、替换项目清单
    ///
    /// 持久化失败时整体报错, 计算结果不返回。
    pub async fn process_upload(&self, project_id: i64, bytes: &[u8]) -> Result<EstimationResult> {
        let parsed = workbook::read_source_rows_blocking(bytes.to_vec()).await?;
        let catalog = self.store.load_catalog().await?;
        tracing::info!(
            "Project {}: {} rows to price against {} catalog entries",
            project_id, parsed.rows.len(), catalog.len()
        );

        let result = self.estimate(&parsed.rows, &catalog, parsed.skipped).await;
        self.persist(project_id, &result).await?;

        Ok(result)
    }

    /// 计算阶段: 按表格顺序逐行计价, 不并行
    pub async fn estimate(
        &self,
        rows: &[SourceRow],
        catalog: &[RateRecord],
        skipped_rows: Vec<RowDiagnostic>,
    ) -> EstimationResult {
        let mut result = EstimationResult::new(skipped_rows);
        let total_rows = rows.len();

        for (idx, row) in rows.iter().enumerate() {
            let item = self.price_row(row, catalog).await;
            result.push(item);

            let current_idx = idx + 1;
            if current_idx % 50 == 0 || current_idx == total_rows {
                tracing::debug!("计价进度: {}/{}", current_idx, total_rows);
            }
        }

        tracing::info!(
            "估价完成: Database: {}, AI Estimate: {}, Manual: {}, 跳过: {}, 总价: {}",
            result.count_by_source(RateSource::Database),
            result.count_by_source(RateSource::AiEstimate),
            result.count_by_source(RateSource::Manual),
            result.skipped_rows.len(),
            result.project_total
        );
        result
    }

    /// 持久化阶段
    pub async fn persist(&self, project_id: i64, result: &EstimationResult) -> Result<()> {
        self.store.replace_items(project_id, &result.items).await.map_err(|e| {
            tracing::error!("Project {}: persisting {} items failed: {}", project_id, result.items.len(), e);
            e
        })
    }

    async fn price_row(&self, row: &SourceRow, catalog: &[RateRecord]) -> PricedItem {
        let tokens = tokenize(&row.description);

        if let Some(m) = find_best_match(&tokens, &row.unit, catalog) {
            tracing::debug!(
                "Row {}: \"{}\" → \"{}\" (score {})",
                row.row_number, row.description, m.record.item_name, m.score
            );
            return PricedItem::priced(row, Some(m.record.rate_value.clone()), RateSource::Database);
        }

        let suggestion = self.suggest(row).await;
        if let Suggestion::Failed(reason) = &suggestion {
            tracing::warn!("Row {}: no AI rate for \"{}\": {}", row.row_number, row.description, reason);
        }
        PricedItem::priced(row, suggestion.rate(), RateSource::AiEstimate)
    }

    /// 单价库未命中时经限流队列请求外部估价
    async fn suggest(&self, row: &SourceRow) -> Suggestion {
        // 没有密钥时不占用队列
        let Some(api_key) = self.api_key.clone() else {
            return Suggestion::Unavailable;
        };

        let advisor = Arc::clone(&self.advisor);
        let description = row.description.clone();
        let unit = row.unit.clone();

        tracing::debug!(
            "Row {}: catalog miss, queueing advisor request ({} pending)",
            row.row_number,
            self.queue.pending()
        );

        self.queue
            .enqueue(async move { advisor.suggest(&description, &unit, Some(api_key.as_str())).await })
            .await
            .unwrap_or_else(|e| Suggestion::Failed(e.to_string()))
    }
}
