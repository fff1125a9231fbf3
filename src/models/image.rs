use serde::{Deserialize, Serialize};

/// 图片处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// 本次运行上传
    Uploaded,
    /// 存储中已存在，跳过上传
    Exists,
    /// 演练模式，未访问存储
    DryRun,
    Error,
}

/// 按内容哈希去重后的图片
///
/// 同一哈希在一次运行中只对应一个实例，引用同一内容的路径累积到
/// `source_paths` 中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub hash: String,
    pub key: String,
    pub url: String,
    pub status: ImageStatus,
    pub skipped_upload: bool,
    pub error: Option<String>,
    pub source_paths: Vec<String>,
}

impl UploadedImage {
    /// 还没算出哈希就失败的图片（文件不存在、data URI 无效等）
    pub fn failed(error: impl Into<String>, source_paths: Vec<String>) -> Self {
        Self {
            hash: String::new(),
            key: String::new(),
            url: String::new(),
            status: ImageStatus::Error,
            skipped_upload: true,
            error: Some(error.into()),
            source_paths,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ImageStatus::Error
    }

    /// 追加来源路径（已存在则忽略）
    pub fn add_source_path(&mut self, path: &str) {
        if !self.source_paths.iter().any(|p| p == path) {
            self.source_paths.push(path.to_string());
        }
    }
}
