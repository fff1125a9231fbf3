/// 题目后端 API 客户端
///
/// 封装题目创建接口，带瞬时错误重试
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ResolvedConfig;
use crate::error::{ApiError, ConfigError};
use crate::models::dto::QuestionDto;

/// 错误响应体最多保留的字符数
const ERROR_BODY_LIMIT: usize = 500;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含首次）
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次（从 0 开始）失败后的等待时间：`base * 2^attempt + jitter`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exp = base_ms.saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        let jitter_cap = self.max_jitter.as_millis() as u64;
        let jitter = rand::random_range(0..=jitter_cap);
        Duration::from_millis(exp.saturating_add(jitter))
    }
}

/// 后端客户端
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    policy: RetryPolicy,
}

impl BackendClient {
    /// 创建后端客户端（超时取自配置）
    pub fn new(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
            api_key: config.api_key.clone(),
            policy: RetryPolicy::default(),
        })
    }

    /// 替换重试策略
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 创建题目
    ///
    /// # 参数
    /// - `dto`: 规范化后的题目
    ///
    /// # 返回
    /// 后端响应 JSON；响应体不是 JSON 时包装为 `{"_raw": text}`
    pub async fn create_question(&self, dto: &QuestionDto) -> Result<Value, ApiError> {
        let url = format!("{}/questions", self.base_url);
        self.post_json(&url, dto).await
    }

    /// POST JSON，网络错误与 429/5xx 按策略重试
    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Value, ApiError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let is_last = attempt + 1 >= max_attempts;

            let mut request = self.http.post(url).json(body);
            if let Some(key) = &self.api_key {
                request = request.header("X-API-KEY", key);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if !is_last => {
                    warn!("⚠️ 请求失败（第 {} 次），准备重试: {}", attempt + 1, e);
                    tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                    continue;
                }
                Err(source) => {
                    return Err(ApiError::RequestFailed {
                        endpoint: url.to_string(),
                        source,
                    });
                }
            };

            let status = response.status().as_u16();
            if (status == 429 || status >= 500) && !is_last {
                warn!("⚠️ 后端返回 {}（第 {} 次），准备重试", status, attempt + 1);
                tokio::time::sleep(self.policy.delay_for(attempt)).await;
                attempt += 1;
                continue;
            }

            // 响应体读取中断同样属于网络层失败
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) if !is_last => {
                    warn!("⚠️ 读取响应体失败（第 {} 次），准备重试: {}", attempt + 1, e);
                    tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                    continue;
                }
                Err(source) => {
                    return Err(ApiError::RequestFailed {
                        endpoint: url.to_string(),
                        source,
                    });
                }
            };

            if status >= 400 {
                return Err(ApiError::BadResponse {
                    status,
                    endpoint: url.to_string(),
                    body: truncate_chars(&text, ERROR_BODY_LIMIT),
                });
            }

            debug!("POST {} -> {}", url, status);
            return Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "_raw": text })));
        }
    }
}

/// 从响应中取出新建题目的 `data.id`
pub fn extract_created_id(response: &Value) -> Option<Value> {
    response
        .get("data")
        .filter(|data| data.is_object())
        .and_then(|data| data.get("id"))
        .filter(|id| !id.is_null())
        .cloned()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
