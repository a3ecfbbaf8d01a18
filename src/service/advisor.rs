//! 外部估价服务适配器
//!
//! 单价库没有命中时, 向 Gemini `generateContent` 询问单一市场单价。
//! 任何失败都降级为 `Suggestion::Failed`, 只记录日志, 不向上抛出。

use crate::config::AdvisorConfig;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// 外部估价结果
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    /// 得到合法单价
    Rate(BigDecimal),
    /// 未配置密钥, 没有发起调用
    Unavailable,
    /// 调用或解析失败
    Failed(String),
}

impl Suggestion {
    pub fn rate(self) -> Option<BigDecimal> {
        match self {
            Self::Rate(r) => Some(r),
            _ => None,
        }
    }
}

#[async_trait]
pub trait RateAdvisor: Send + Sync {
    async fn suggest(&self, description: &str, unit: &str, api_key: Option<&str>) -> Suggestion;
}

/// Gemini 请求体
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini 响应体
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiAdvisor {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    currency: String,
}

impl GeminiAdvisor {
    pub fn new(config: &AdvisorConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            currency: config.currency.clone(),
        })
    }

    async fn call(&self, prompt: String, api_key: &str) -> Result<String, String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("network error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("API error {}: {}", status.as_u16(), body));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {}", e))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| "empty response".to_string())
    }
}

#[async_trait]
impl RateAdvisor for GeminiAdvisor {
    async fn suggest(&self, description: &str, unit: &str, api_key: Option<&str>) -> Suggestion {
        let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
            tracing::debug!("No advisor API key configured, skipping \"{}\"", description);
            return Suggestion::Unavailable;
        };

        let prompt = build_rate_prompt(description, unit, &self.currency);
        let started = std::time::Instant::now();

        let reply = match self.call(prompt, api_key).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Rate advisor call failed for \"{}\": {}", description, e);
                return Suggestion::Failed(e);
            }
        };

        match parse_rate_reply(&reply) {
            Ok(rate) => {
                tracing::info!(
                    "AI rate for \"{}\" ({}): {} {}, 耗时: {:?}",
                    description, unit, rate, self.currency, started.elapsed()
                );
                Suggestion::Rate(rate)
            }
            Err(e) => {
                tracing::warn!("Rate advisor reply unusable for \"{}\": {} ({:?})", description, e, reply);
                Suggestion::Failed(e)
            }
        }
    }
}

/// 构建估价提示词
pub fn build_rate_prompt(description: &str, unit: &str, currency: &str) -> String {
    format!(
        "You are a construction cost estimator. Estimate the current market unit rate in {currency} \
         per {unit} for the following bill of quantities item:\n\n\
         \"{description}\"\n\n\
         The rate must cover labour, materials and plant for one {unit}. \
         Respond with JSON only, exactly in the form {{\"rate\": <number>}}, with no other text."
    )
}

/// 取回复中的 JSON 对象: 第一个 `{` 到最后一个 `}`
///
/// 代码块标记 (```json / ```JSON) 以及前后的说明文字都落在这个范围之外。
fn extract_json_object(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => reply.trim(),
    }
}

/// 解析 `{"rate": <number>}` 回复; rate 必须是 JSON 数字且 >= 0
pub fn parse_rate_reply(reply: &str) -> Result<BigDecimal, String> {
    let json = extract_json_object(reply);
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("JSON parse error: {}", e))?;

    let rate = match value.get("rate") {
        Some(serde_json::Value::Number(n)) => n,
        Some(other) => return Err(format!("rate is not a number: {}", other)),
        None => return Err("missing rate field".to_string()),
    };

    // 用 JSON 原文转换, 避免 f64 精度噪声
    let rate = BigDecimal::from_str(&rate.to_string())
        .map_err(|e| format!("rate not representable: {}", e))?;

    if rate < BigDecimal::from(0) {
        return Err(format!("negative rate: {}", rate));
    }

    Ok(rate)
}
