//! 运行报告
//!
//! 每次运行创建一份，逐题累积，运行结束时一次性写盘。

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::ResolvedConfig;
use crate::models::dto::QuestionDto;
use crate::models::exam::ExamType;
use crate::models::image::{ImageStatus, UploadedImage};
use crate::models::subject::Subject;

/// 汇总计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub questions: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 演练模式下未提交的题目
    pub skipped: usize,
    pub images_referenced: usize,
    pub images_uploaded: usize,
    pub images_skipped_existing: usize,
}

/// 图片台账条目（每个哈希一条）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub hash: String,
    pub key: String,
    pub url: String,
    pub status: ImageStatus,
    pub skipped_upload: bool,
    pub error: Option<String>,
    pub source_paths: Vec<String>,
}

impl From<&UploadedImage> for ImageEntry {
    fn from(img: &UploadedImage) -> Self {
        Self {
            hash: img.hash.clone(),
            key: img.key.clone(),
            url: img.url.clone(),
            status: img.status,
            skipped_upload: img.skipped_upload,
            error: img.error.clone(),
            source_paths: img.source_paths.clone(),
        }
    }
}

/// 题目结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Success,
    Error,
    DryRun,
}

/// 单张图片在题目中的处理明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetail {
    pub index: usize,
    pub status: ImageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_upload: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub path: Option<String>,
    pub hash: String,
    pub key: String,
    pub url: String,
}

impl ImageDetail {
    pub fn new(index: usize, path: Option<&str>, img: &UploadedImage) -> Self {
        let (skipped_upload, error) = if img.is_error() {
            (None, img.error.clone())
        } else {
            (Some(img.skipped_upload), None)
        };
        Self {
            index,
            status: img.status,
            skipped_upload,
            error,
            path: path.map(str::to_string),
            hash: img.hash.clone(),
            key: img.key.clone(),
            url: img.url.clone(),
        }
    }
}

/// 题目台账条目（每题一条，按输入顺序）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_question_id: Option<String>,
    pub index: usize,
    pub status: QuestionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dto: Option<QuestionDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageDetail>>,
}

impl QuestionEntry {
    /// 条目本身不是对象
    pub fn invalid(index: usize, error: impl Into<String>) -> Self {
        Self {
            script_question_id: None,
            index,
            status: QuestionStatus::Error,
            error: Some(error.into()),
            created_id: None,
            dto: None,
            images: None,
        }
    }

    pub fn failed(
        index: usize,
        script_question_id: String,
        error: impl Into<String>,
        images: Option<Vec<ImageDetail>>,
    ) -> Self {
        Self {
            script_question_id: Some(script_question_id),
            index,
            status: QuestionStatus::Error,
            error: Some(error.into()),
            created_id: None,
            dto: None,
            images,
        }
    }

    pub fn dry_run(
        index: usize,
        script_question_id: String,
        dto: QuestionDto,
        images: Vec<ImageDetail>,
    ) -> Self {
        Self {
            script_question_id: Some(script_question_id),
            index,
            status: QuestionStatus::DryRun,
            error: None,
            created_id: None,
            dto: Some(dto),
            images: Some(images),
        }
    }

    pub fn success(
        index: usize,
        script_question_id: String,
        created_id: Option<Value>,
        images: Vec<ImageDetail>,
    ) -> Self {
        Self {
            script_question_id: Some(script_question_id),
            index,
            status: QuestionStatus::Success,
            error: None,
            // 成功条目总是带 createdId，后端没返回时为 null
            created_id: Some(created_id.unwrap_or(Value::Null)),
            dto: None,
            images: Some(images),
        }
    }
}

/// 运行报告
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub started_at: String,
    pub finished_at: Option<String>,
    pub input_json: String,
    pub source: String,
    pub bucket: String,
    pub prefix: String,
    pub region: Option<String>,
    pub public_base_url: String,
    pub backend_url: String,
    pub exam_type: ExamType,
    pub default_subject: Option<Subject>,
    pub year: Option<i32>,
    pub dry_run: bool,
    pub totals: Totals,
    pub images: Vec<ImageEntry>,
    pub questions: Vec<QuestionEntry>,
    /// hash -> images 下标
    #[serde(skip)]
    image_index: HashMap<String, usize>,
}

impl RunReport {
    pub fn new(config: &ResolvedConfig, question_count: usize) -> Self {
        Self {
            started_at: now_iso(),
            finished_at: None,
            input_json: config.input_path.display().to_string(),
            source: config.source.clone(),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
            region: config.region.clone(),
            public_base_url: config.public_base_url.clone(),
            backend_url: config.backend_url.clone(),
            exam_type: config.exam_type,
            default_subject: config.default_subject,
            year: config.year,
            dry_run: config.dry_run,
            totals: Totals {
                questions: question_count,
                ..Default::default()
            },
            images: Vec::new(),
            questions: Vec::new(),
            image_index: HashMap::new(),
        }
    }

    /// 记录图片；同一哈希只保留一条，来源路径合并
    pub fn record_image(&mut self, img: &UploadedImage) {
        if let Some(&idx) = self.image_index.get(&img.hash) {
            let existing = &mut self.images[idx];
            for path in &img.source_paths {
                if !existing.source_paths.contains(path) {
                    existing.source_paths.push(path.clone());
                }
            }
            return;
        }
        self.image_index.insert(img.hash.clone(), self.images.len());
        self.images.push(ImageEntry::from(img));
    }

    /// 追加题目结果并更新计数
    pub fn record_question(&mut self, entry: QuestionEntry) {
        match entry.status {
            QuestionStatus::Success => self.totals.succeeded += 1,
            QuestionStatus::Error => self.totals.failed += 1,
            QuestionStatus::DryRun => self.totals.skipped += 1,
        }
        self.questions.push(entry);
    }

    /// 结束运行，写入完成时间
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(now_iso());
        self
    }
}

fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::resolved_config;

    fn uploaded(hash: &str, path: &str) -> UploadedImage {
        UploadedImage {
            hash: hash.to_string(),
            key: format!("question-images/{}/{}.png", &hash[..2], hash),
            url: format!("https://cdn.example.com/{}.png", hash),
            status: ImageStatus::Uploaded,
            skipped_upload: false,
            error: None,
            source_paths: vec![path.to_string()],
        }
    }

    #[test]
    fn test_record_image_merges_source_paths() {
        let mut report = RunReport::new(&resolved_config(), 2);
        report.record_image(&uploaded("abcd", "a.png"));
        report.record_image(&uploaded("abcd", "b.png"));
        report.record_image(&uploaded("abcd", "a.png"));

        assert_eq!(report.images.len(), 1);
        assert_eq!(report.images[0].source_paths, vec!["a.png", "b.png"]);
        assert_eq!(report.image_index.get("abcd"), Some(&0));
        assert!(!report.image_index.contains_key("ffff"));
    }

    #[test]
    fn test_record_question_updates_totals() {
        let mut report = RunReport::new(&resolved_config(), 3);
        report.record_question(QuestionEntry::invalid(0, "Invalid question entry (expected object)"));
        report.record_question(QuestionEntry::success(1, "q1".to_string(), None, vec![]));
        report.record_question(QuestionEntry::failed(2, "q2".to_string(), "Missing question text", None));

        assert_eq!(report.totals.questions, 3);
        assert_eq!(report.totals.succeeded, 1);
        assert_eq!(report.totals.failed, 2);
        assert_eq!(report.totals.skipped, 0);
        assert_eq!(report.questions.len(), 3);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut report = RunReport::new(&resolved_config(), 0);
        report.record_image(&uploaded("abcd", "a.png"));
        let report = report.finish();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["finishedAt"].is_string());
        assert_eq!(json["examType"], "JEE_MAIN");
        assert_eq!(json["totals"]["imagesSkippedExisting"], 0);
        assert_eq!(json["images"][0]["skippedUpload"], false);
        assert_eq!(json["images"][0]["sourcePaths"][0], "a.png");
        assert!(json.get("imageIndex").is_none());
    }

    #[test]
    fn test_image_detail_for_error_omits_skipped_flag() {
        let img = UploadedImage::failed("Image file not found: /x.png", vec!["x.png".to_string()]);
        let detail = ImageDetail::new(0, Some("x.png"), &img);
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("skippedUpload").is_none());
        assert_eq!(json["error"], "Image file not found: /x.png");
    }
}
