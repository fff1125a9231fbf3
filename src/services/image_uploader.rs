//! 图片去重上传 - 业务能力层
//!
//! 只负责"把一张图片变成公开地址"：哈希 → 推导键 → 检查存在 → 上传。
//! 同一哈希在一次运行内最多检查/上传一次，失败结果同样缓存。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ResolvedConfig;
use crate::error::StorageError;
use crate::infrastructure::ObjectStore;
use crate::models::image::{ImageStatus, UploadedImage};
use crate::models::question::ImageRef;
use crate::models::report::RunReport;
use crate::services::hasher::{sha256_bytes, sha256_file};
use crate::services::storage_key::{
    build_key, content_type_for_ext, ext_for_mime, public_url, CACHE_CONTROL, DEFAULT_EXT,
};

/// 上传模式
#[derive(Clone)]
pub enum UploadMode {
    /// 只计算键和地址，不访问存储
    DryRun,
    Live(Arc<dyn ObjectStore>),
}

/// 待上传内容
enum UploadBody<'a> {
    File(&'a Path),
    Bytes(Vec<u8>),
}

/// 图片去重上传服务
///
/// 缓存归本次运行独占，运行结束随之丢弃。
pub struct ImageUploader {
    mode: UploadMode,
    prefix: String,
    public_base_url: String,
    base_dir: PathBuf,
    cache: HashMap<String, UploadedImage>,
}

impl ImageUploader {
    /// 创建上传服务
    ///
    /// # 参数
    /// - `config`: 解析后的配置（前缀、公开地址）
    /// - `base_dir`: 相对路径的解析基准（输入 JSON 所在目录）
    /// - `mode`: 演练或实际上传
    pub fn new(config: &ResolvedConfig, base_dir: PathBuf, mode: UploadMode) -> Self {
        Self {
            mode,
            prefix: config.prefix.clone(),
            public_base_url: config.public_base_url.clone(),
            base_dir,
            cache: HashMap::new(),
        }
    }

    /// 已缓存的不同图片数量
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// 处理一个图片引用
    ///
    /// 所有失败都以 `ImageStatus::Error` 返回，不向上抛出。
    pub async fn resolve(
        &mut self,
        image: &ImageRef,
        index: usize,
        report: &mut RunReport,
    ) -> UploadedImage {
        match image {
            ImageRef::Path(raw) => self.ensure_from_path(raw, report).await,
            ImageRef::DataUri(uri) => self.ensure_from_data_uri(uri, report).await,
            ImageRef::Missing => {
                UploadedImage::failed("Image missing both 'path' and base64 'data'", Vec::new())
            }
            ImageRef::Invalid => UploadedImage::failed(
                format!("Invalid image entry at index {} (expected object)", index),
                Vec::new(),
            ),
        }
    }

    /// 处理本地文件
    pub async fn ensure_from_path(&mut self, raw: &str, report: &mut RunReport) -> UploadedImage {
        let resolved = self.resolve_path(raw);
        match tokio::fs::try_exists(&resolved).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("⚠️ 图片文件不存在: {}", resolved.display());
                return UploadedImage::failed(
                    format!("Image file not found: {}", resolved.display()),
                    vec![raw.to_string()],
                );
            }
            Err(e) => {
                warn!("⚠️ 无法访问图片文件 {}: {}", resolved.display(), e);
                return UploadedImage::failed(
                    format!("Failed to access image {}: {}", resolved.display(), e),
                    vec![raw.to_string()],
                );
            }
        }

        let ext = resolved
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_else(|| DEFAULT_EXT.to_string());
        let content_type = content_type_for_ext(&ext);

        let hash = match sha256_file(&resolved).await {
            Ok(hash) => hash,
            Err(e) => {
                warn!("⚠️ 读取图片失败 {}: {}", resolved.display(), e);
                return UploadedImage::failed(
                    format!("Failed to read image {}: {}", resolved.display(), e),
                    vec![raw.to_string()],
                );
            }
        };

        if let Some(cached) = self.cache.get_mut(&hash) {
            debug!("命中缓存 {} <- {}", &hash[..12.min(hash.len())], raw);
            cached.add_source_path(raw);
            report.record_image(cached);
            return cached.clone();
        }

        let key = build_key(&self.prefix, &hash, &ext);
        let url = public_url(&self.public_base_url, &key);

        self.upload_new(
            hash,
            key,
            url,
            UploadBody::File(&resolved),
            content_type,
            vec![raw.to_string()],
            report,
        )
        .await
    }

    /// 处理 `data:<mime>;base64,...` 内联图片
    pub async fn ensure_from_data_uri(&mut self, uri: &str, report: &mut RunReport) -> UploadedImage {
        let (mime, data) = match parse_data_uri(uri) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("⚠️ data URI 无效: {}", e);
                return UploadedImage::failed(format!("Invalid data URI: {}", e), Vec::new());
            }
        };

        let ext = ext_for_mime(&mime);
        let hash = sha256_bytes(&data);

        if let Some(cached) = self.cache.get(&hash) {
            return cached.clone();
        }

        let key = build_key(&self.prefix, &hash, ext);
        let url = public_url(&self.public_base_url, &key);

        self.upload_new(
            hash,
            key,
            url,
            UploadBody::Bytes(data),
            &mime,
            Vec::new(),
            report,
        )
        .await
    }

    /// 首次遇到的哈希：演练直接生成结果，否则检查存在后上传
    #[allow(clippy::too_many_arguments)]
    async fn upload_new(
        &mut self,
        hash: String,
        key: String,
        url: String,
        body: UploadBody<'_>,
        content_type: &str,
        source_paths: Vec<String>,
        report: &mut RunReport,
    ) -> UploadedImage {
        let (status, skipped_upload, error) = match &self.mode {
            UploadMode::DryRun => (ImageStatus::DryRun, true, None),
            UploadMode::Live(store) => {
                match check_and_put(store.as_ref(), &key, body, content_type).await {
                    Ok(true) => {
                        info!("✓ 已存在，跳过上传: {}", key);
                        report.totals.images_skipped_existing += 1;
                        (ImageStatus::Exists, true, None)
                    }
                    Ok(false) => {
                        info!("📤 已上传: {}", key);
                        report.totals.images_uploaded += 1;
                        (ImageStatus::Uploaded, false, None)
                    }
                    Err(e) => {
                        warn!("⚠️ 图片上传失败 {}: {}", key, e);
                        (ImageStatus::Error, true, Some(e.to_string()))
                    }
                }
            }
        };

        let img = UploadedImage {
            hash: hash.clone(),
            key,
            url,
            status,
            skipped_upload,
            error,
            source_paths,
        };

        self.cache.insert(hash, img.clone());
        report.record_image(&img);
        img
    }

    /// 相对路径以输入文档所在目录为基准
    fn resolve_path(&self, raw: &str) -> PathBuf {
        let p = Path::new(raw);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

/// 检查存在，不存在则上传；返回是否原本就存在
async fn check_and_put(
    store: &dyn ObjectStore,
    key: &str,
    body: UploadBody<'_>,
    content_type: &str,
) -> Result<bool, StorageError> {
    if store.exists(key).await? {
        return Ok(true);
    }
    match body {
        UploadBody::File(path) => store.put_file(key, path, content_type, CACHE_CONTROL).await?,
        UploadBody::Bytes(data) => store.put_bytes(key, data, content_type, CACHE_CONTROL).await?,
    }
    Ok(false)
}

/// 解析 `data:<mime>;base64,<payload>`
///
/// 返回 (mime, 字节)；只支持 base64 编码。
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>), String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "Not a data URI".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "Invalid data URI format".to_string())?;
    if !header.contains(";base64") {
        return Err("Only base64 data URIs are supported".to_string());
    }

    let mime = header.split(';').next().unwrap_or_default().trim();
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let data = STANDARD.decode(payload).map_err(|e| e.to_string())?;

    Ok((mime.to_string(), data))
}
