//! 对象存储 - 基础设施层
//!
//! 持有唯一的 S3 客户端，只暴露"是否存在 / 上传"的能力。
//! 公开地址是确定性推导的，不向存储查询。

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::debug;

use crate::error::StorageError;

/// 对象存储能力
///
/// 职责：
/// - 检查键是否存在
/// - 上传文件或字节
/// - 不认识 Question / 报告
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 键是否已存在
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// 上传本地文件（流式读取）
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError>;

    /// 上传内存中的字节
    async fn put_bytes(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError>;
}

/// 静态凭证（来自 S3_ACCESS_KEY_ID / S3_SECRET_ACCESS_KEY）
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// 基于 S3 的对象存储
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: Option<String>,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

impl S3ObjectStore {
    /// 创建 S3 客户端
    ///
    /// 未指定 region 时沿用 AWS 默认链（环境变量、profile 等）。
    pub async fn connect(
        bucket: impl Into<String>,
        region: Option<&str>,
        credentials: Option<StaticCredentials>,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(creds) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                None,
                None,
                "question-ingest-env",
            ));
        }

        let sdk_config = loader.load().await;
        let region = sdk_config.region().map(|r| r.to_string());

        Self {
            client: Client::new(&sdk_config),
            bucket: bucket.into(),
            region,
        }
    }

    /// SDK 最终解析出的 region
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        debug!("HeadObject s3://{}/{}", self.bucket, key);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                // 只有 404 表示不存在，其余（403、超时等）都是错误
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.raw().status().as_u16() == 404 {
                        return Ok(false);
                    }
                }
                Err(StorageError::Head {
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })
            }
        }
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Body {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        debug!("PutObject s3://{}/{} <- {}", self.bucket, key, path.display());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn put_bytes(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError> {
        debug!("PutObject s3://{}/{} ({} bytes)", self.bucket, key, data.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| StorageError::Put {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
