use crate::error::{BoqError, Result};
use crate::models::{PricedItem, RateRecord};
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::time::{Duration, Instant};

/// 单条语句超时
const STATEMENT_TIMEOUT: Duration = Duration::from_secs(30);
/// 每条 INSERT 的最大行数
const INSERT_CHUNK: usize = 1000;

/// 读取单价库 (按 id 排序, 保证匹配时同分取先者稳定)
pub async fn load_catalog(pool: &PgPool) -> std::result::Result<Vec<RateRecord>, sqlx::Error> {
    sqlx::query_as::<_, RateRecord>(
        r#"
        SELECT item_name,
               unit,
               rate_value,
               COALESCE(keywords, '') as keywords
        FROM rate_records
        ORDER BY id
        "#
    )
    .fetch_all(pool)
    .await
}

/// 用新一批清单项替换项目原有清单 (单事务, 全部成功或全部回滚)
///
/// DELETE、每个 INSERT 分块以及 COMMIT 各自限时 `STATEMENT_TIMEOUT`。
pub async fn replace_items(
    pool: &PgPool,
    project_id: i64,
    items: &[PricedItem],
) -> Result<()> {
    let start_time = Instant::now();
    let mut tx = pool.begin().await?;

    let deleted = bounded(
        "DELETE",
        sqlx::query("DELETE FROM boq_items WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx),
    )
    .await?;
    tracing::debug!("项目 {} 删除旧清单 {} 行", project_id, deleted.rows_affected());

    for (chunk_idx, chunk) in items.chunks(INSERT_CHUNK).enumerate() {
        insert_chunk(&mut tx, project_id, chunk_idx * INSERT_CHUNK, chunk).await?;
    }

    // tx 在错误返回时被丢弃, 自动回滚
    bounded("COMMIT", tx.commit()).await?;

    tracing::info!(
        "✓ 项目 {} 清单已替换, 写入 {} 行, 耗时: {:?}",
        project_id, items.len(), start_time.elapsed()
    );
    Ok(())
}

async fn insert_chunk(
    tx: &mut Transaction<'_, Postgres>,
    project_id: i64,
    offset: usize,
    items: &[PricedItem],
) -> Result<()> {
    let priced_at = Utc::now();

    let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
        "INSERT INTO boq_items (
            project_id, line_no, item_no, description,
            quantity, unit, rate, total, priced_at
        ) "
    );

    query_builder.push_values(items.iter().enumerate(), |mut b, (idx, item)| {
        b.push_bind(project_id)
            .push_bind((offset + idx + 1) as i32)
            .push_bind(&item.item_no)
            .push_bind(&item.description)
            .push_bind(item.quantity.clone())
            .push_bind(&item.unit)
            .push_bind(item.rate.clone())
            .push_bind(item.total.clone())
            .push_bind(priced_at);
    });

    let result = bounded("INSERT", query_builder.build().execute(&mut **tx)).await?;
    tracing::debug!("INSERT 影响 {} 行 (起始行 {})", result.rows_affected(), offset + 1);
    Ok(())
}

/// 给单条语句加超时; 超时或出错都会让调用方丢弃事务
async fn bounded<F, T>(statement: &str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let execute_start = Instant::now();

    match tokio::time::timeout(STATEMENT_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!("✗ {}执行失败, 耗时: {:?}, 错误: {:?}", statement, execute_start.elapsed(), e);
            Err(BoqError::Database(e))
        }
        Err(_) => {
            tracing::error!("✗ {}操作超时 (>{:?})!", statement, STATEMENT_TIMEOUT);
            Err(BoqError::PersistTimeout(STATEMENT_TIMEOUT))
        }
    }
}
