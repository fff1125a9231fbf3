use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::question::RawQuestion;

/// 抽取器输出的输入文档
#[derive(Debug, Clone)]
pub struct InputDocument {
    /// 规范化后的绝对路径
    pub path: PathBuf,
    /// 原始 JSON（改写输出时以它为底本）
    pub payload: Value,
}

impl InputDocument {
    /// 校验顶层 `questions` 数组
    pub fn from_value(path: PathBuf, payload: Value) -> Result<Self, ConfigError> {
        if !payload.get("questions").is_some_and(Value::is_array) {
            return Err(ConfigError::MissingQuestions);
        }
        Ok(Self { path, payload })
    }

    pub fn questions(&self) -> &[Value] {
        self.payload
            .get("questions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 相对图片路径的解析基准
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// 来源标签：顶层 metadata.source，其次第一题的 metadata.source，否则 "Unknown"
    pub fn source_label(&self) -> String {
        let top_level = self
            .payload
            .get("metadata")
            .and_then(|m| m.get("source"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|s| !s.is_empty());

        let source = top_level
            .or_else(|| {
                self.questions()
                    .first()
                    .and_then(RawQuestion::from_value)
                    .and_then(|q| q.source())
            })
            .unwrap_or_default();

        let source = source.trim();
        if source.is_empty() {
            "Unknown".to_string()
        } else {
            source.to_string()
        }
    }
}

/// 从磁盘加载输入 JSON
pub async fn load_input_document(path: &Path) -> AppResult<InputDocument> {
    let resolved = match fs::canonicalize(path).await {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::InputNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(source) => {
            return Err(FileError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }
            .into());
        }
    };

    let content = fs::read_to_string(&resolved)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: resolved.clone(),
            source,
        })?;

    let payload: Value =
        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidJson {
            path: resolved.clone(),
            source,
        })?;

    tracing::info!("成功加载输入文件: {}", resolved.display());

    InputDocument::from_value(resolved, payload).map_err(AppError::from)
}
