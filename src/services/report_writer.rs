//! 运行产物写盘
//!
//! 报告与改写后的输入文档都写在输入文件旁边。

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::FileError;

const REPORT_SUFFIX: &str = ".ingest-report.json";
const UPDATED_SUFFIX: &str = ".s3.json";

/// `{input}.ingest-report.json`
pub fn report_path(input: &Path) -> PathBuf {
    with_suffix(input, REPORT_SUFFIX)
}

/// `{input}.s3.json`
pub fn updated_json_path(input: &Path) -> PathBuf {
    with_suffix(input, UPDATED_SUFFIX)
}

/// 在完整文件名后追加后缀（不替换原扩展名）
fn with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let mut os = input.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// 写入两空格缩进的 JSON，末尾带换行
pub async fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), FileError> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    fs::write(path, content)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// 改写图片地址后的输入文档
///
/// 以原始 JSON 为底本，只替换成功解析的 `images[i].path`。
#[derive(Debug, Clone)]
pub struct UpdatedDocument {
    payload: Value,
}

impl UpdatedDocument {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// 把 `questions[q].images[i].path` 改为公开地址
    ///
    /// 路径不存在或条目不是对象时静默跳过。
    pub fn set_image_url(&mut self, question_index: usize, image_index: usize, url: &str) {
        let image = self
            .payload
            .get_mut("questions")
            .and_then(|qs| qs.get_mut(question_index))
            .and_then(|q| q.get_mut("images"))
            .and_then(|imgs| imgs.get_mut(image_index))
            .and_then(Value::as_object_mut);

        if let Some(image) = image {
            image.insert("path".to_string(), Value::String(url.to_string()));
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}
