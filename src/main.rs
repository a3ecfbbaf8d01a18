use boq_estimator::{
    build_router, create_pool, AppConfig, EstimationService, GeminiAdvisor, PgBoqStore,
    RateLimitedQueue,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);
    if config.advisor.api_key.is_none() {
        info!("No GEMINI_API_KEY configured, catalog misses will be left for manual pricing");
    }

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;

    // 进程级共享的限流队列, 所有上传共用
    let queue = Arc::new(RateLimitedQueue::new(config.queue.cooldown()));
    let advisor = Arc::new(GeminiAdvisor::new(&config.advisor)?);
    let store = Arc::new(PgBoqStore::new(pool));

    let service = Arc::new(EstimationService::new(
        store,
        advisor,
        queue,
        config.advisor.api_key.clone(),
    ));

    let app = build_router(service, config.server.max_upload_bytes);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /health");
    info!("  POST /api/projects/:project_id/boq/upload  - multipart field `file`");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
