use crate::db::queries;
use crate::error::Result;
use crate::models::{PricedItem, RateRecord};
use async_trait::async_trait;
use sqlx::PgPool;

/// 估价服务使用的存储接口: 读单价库, 整体替换清单
#[async_trait]
pub trait BoqStore: Send + Sync {
    async fn load_catalog(&self) -> Result<Vec<RateRecord>>;

    async fn replace_items(&self, project_id: i64, items: &[PricedItem]) -> Result<()>;
}

/// Postgres 实现
pub struct PgBoqStore {
    pool: PgPool,
}

impl PgBoqStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoqStore for PgBoqStore {
    async fn load_catalog(&self) -> Result<Vec<RateRecord>> {
        Ok(queries::load_catalog(&self.pool).await?)
    }

    async fn replace_items(&self, project_id: i64, items: &[PricedItem]) -> Result<()> {
        queries::replace_items(&self.pool, project_id, items).await
    }
}
