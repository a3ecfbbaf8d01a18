use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;

/// 创建数据库连接池, 并确认数据库可达
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let started = Instant::now();

    // 超过阈值的语句记 warn
    let connect_options = PgConnectOptions::from_str(&config.url)?.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_millis(config.slow_statement_ms),
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            tracing::error!("✗ 连接数据库失败 ({}): {}", redact_url(&config.url), e);
            e
        })?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::info!(
        "✓ 数据库已连接: {} (最大连接数 {}, 耗时: {:?})",
        redact_url(&config.url),
        config.max_connections,
        started.elapsed()
    );
    Ok(pool)
}

/// 隐藏连接串中的密码
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}
