//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验并映射题干、学科、选项
//! 2. 按顺序解析图片（遇到第一个失败即停止）
//! 3. 组装 DTO
//! 4. 演练模式记录 DTO，否则提交到后端

use serde_json::Value;
use tracing::{info, warn};

use crate::clients::{extract_created_id, BackendClient};
use crate::error::MappingError;
use crate::models::question::{ImageRef, RawQuestion};
use crate::models::report::{ImageDetail, QuestionEntry, RunReport};
use crate::services::{ImageUploader, QuestionMapper, UpdatedDocument};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 提交模式
pub enum SubmitMode {
    /// 不调用后端，只记录 DTO
    DryRun,
    Backend(BackendClient),
}

/// 题目处理流程
///
/// - 编排一道题从原始 JSON 到报告条目的全过程
/// - 不持有运行状态（缓存、报告由编排层传入）
/// - 任何失败都收敛为一条 `QuestionEntry`，不向上抛出
pub struct QuestionFlow {
    mapper: QuestionMapper,
    submit: SubmitMode,
}

impl QuestionFlow {
    pub fn new(mapper: QuestionMapper, submit: SubmitMode) -> Self {
        Self { mapper, submit }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.submit, SubmitMode::DryRun)
    }

    /// 处理一道题
    ///
    /// # 参数
    /// - `value`: `questions` 数组中的原始条目
    /// - `ctx`: 题目上下文
    /// - `uploader`: 本次运行的图片去重服务
    /// - `report`: 本次运行的报告（图片台账与计数）
    /// - `updated`: 需要输出改写 JSON 时传入
    ///
    /// # 返回
    /// 该题的报告条目（尚未写入报告）
    pub async fn run(
        &self,
        value: &Value,
        ctx: &QuestionCtx,
        uploader: &mut ImageUploader,
        report: &mut RunReport,
        mut updated: Option<&mut UpdatedDocument>,
    ) -> QuestionEntry {
        let Some(raw) = RawQuestion::from_value(value) else {
            warn!("{} ⚠️ 条目不是对象，跳过", ctx);
            return QuestionEntry::invalid(ctx.index, MappingError::NotAnObject.to_string());
        };
        let script_qid = raw.id();

        let draft = match self.mapper.map(&raw) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("{} ⚠️ 映射失败: {}", ctx, e);
                return QuestionEntry::failed(ctx.index, script_qid, e.to_string(), None);
            }
        };
        self.log_stem(ctx, &draft.question_text);

        // ========== 图片 ==========
        let mut resolved = Vec::new();
        let mut details = Vec::new();

        for (i, image_ref) in raw.images().iter().enumerate() {
            report.totals.images_referenced += 1;
            let img = uploader.resolve(image_ref, i, report).await;

            if img.is_error() {
                let reason = img
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown image upload error".to_string());
                if *image_ref != ImageRef::Invalid {
                    details.push(ImageDetail::new(i, image_ref.path(), &img));
                }
                warn!("{} ⚠️ 第 {} 张图片失败: {}", ctx, i + 1, reason);
                return QuestionEntry::failed(
                    ctx.index,
                    script_qid,
                    format!("Image upload failed: {}", reason),
                    Some(details),
                );
            }

            details.push(ImageDetail::new(i, image_ref.path(), &img));
            if let Some(doc) = updated.as_mut() {
                doc.set_image_url(ctx.index, i, &img.url);
            }
            resolved.push(img);
        }

        let dto = self.mapper.build_dto(draft, &resolved);

        // ========== 提交 ==========
        match &self.submit {
            SubmitMode::DryRun => QuestionEntry::dry_run(ctx.index, script_qid, dto, details),
            SubmitMode::Backend(client) => {
                info!("{} 📤 正在提交题目到后端...", ctx);
                match client.create_question(&dto).await {
                    Ok(response) => {
                        let created_id = extract_created_id(&response);
                        info!("{} ✓ 提交成功 (id: {:?})", ctx, created_id);
                        QuestionEntry::success(ctx.index, script_qid, created_id, details)
                    }
                    Err(e) => {
                        warn!("{} ❌ 提交失败: {}", ctx, e);
                        QuestionEntry::failed(ctx.index, script_qid, e.to_string(), Some(details))
                    }
                }
            }
        }
    }

    // ========== 日志辅助函数 ==========

    fn log_stem(&self, ctx: &QuestionCtx, stem: &str) {
        tracing::debug!("{} 题干: {}", ctx, truncate_text(stem, 60));
    }
}
