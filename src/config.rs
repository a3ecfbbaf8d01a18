use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub advisor: AdvisorConfig,
    pub queue: QueueConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub slow_statement_ms: u64,
}

/// 外部估价服务配置
#[derive(Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub currency: String,
    pub timeout_secs: u64,
}

// 不打印密钥
impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("currency", &self.currency)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub cooldown_ms: u64,
}

impl QueueConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/boq_estimator".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                slow_statement_ms: 5000,
            },
            advisor: AdvisorConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-2.0-flash".to_string(),
                currency: "USD".to_string(),
                timeout_secs: 30,
            },
            queue: QueueConfig { cooldown_ms: 4500 },
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    ///
    /// 优先级 (低 → 高): 默认值, `boq-estimator.toml`, `BOQ__*` 环境变量,
    /// 以及 `DATABASE_URL` / `GEMINI_API_KEY`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.max_upload_bytes", defaults.server.max_upload_bytes as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("database.acquire_timeout_secs", defaults.database.acquire_timeout_secs as i64)?
            .set_default("database.slow_statement_ms", defaults.database.slow_statement_ms as i64)?
            .set_default("advisor.base_url", defaults.advisor.base_url)?
            .set_default("advisor.model", defaults.advisor.model)?
            .set_default("advisor.currency", defaults.advisor.currency)?
            .set_default("advisor.timeout_secs", defaults.advisor.timeout_secs as i64)?
            .set_default("queue.cooldown_ms", defaults.queue.cooldown_ms as i64)?
            .add_source(File::with_name("boq-estimator").required(false))
            .add_source(Environment::with_prefix("BOQ").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("advisor.api_key", std::env::var("GEMINI_API_KEY").ok())?
            .build()?
            .try_deserialize()
    }
}
