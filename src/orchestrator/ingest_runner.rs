//! 导入运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次导入运行的资源与状态管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载输入、解析配置、创建 S3 与后端客户端
//! 2. **逐题处理**：按输入顺序委托 `QuestionFlow`，一题完成再处理下一题
//! 3. **状态所有者**：独占图片去重缓存与运行报告
//! 4. **产物输出**：写报告，按需写改写后的 JSON
//! 5. **全局统计**：输出最终计数

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::BackendClient;
use crate::config::{Config, ProcessEnv, ResolvedConfig};
use crate::error::AppResult;
use crate::infrastructure::S3ObjectStore;
use crate::models::loaders::{load_input_document, InputDocument};
use crate::models::report::{QuestionStatus, RunReport};
use crate::services::report_writer::{report_path, updated_json_path, write_json_pretty};
use crate::services::{ImageUploader, QuestionMapper, UpdatedDocument, UploadMode};
use crate::utils::logging::{log_progress, log_startup, print_final_stats};
use crate::workflow::{QuestionCtx, QuestionFlow, SubmitMode};

/// 一次运行的产物
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub report_path: PathBuf,
    /// 未要求改写输入时为 None
    pub updated_json_path: Option<PathBuf>,
}

/// 应用主结构
pub struct IngestRunner {
    config: ResolvedConfig,
    document: InputDocument,
    flow: QuestionFlow,
    uploader: ImageUploader,
}

impl IngestRunner {
    /// 初始化应用
    ///
    /// 所有致命错误（输入、配置、客户端）都在这里返回，处理开始后不再中止。
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let document = load_input_document(&config.json_path).await?;
        let source = document.source_label();
        let mut resolved = config.resolve(document.path.clone(), &source, &ProcessEnv)?;

        let (upload_mode, submit_mode) = if resolved.dry_run {
            (UploadMode::DryRun, SubmitMode::DryRun)
        } else {
            let store = S3ObjectStore::connect(
                resolved.bucket.clone(),
                resolved.region.as_deref(),
                resolved.s3_credentials.clone(),
            )
            .await;

            // 未显式指定时记录 SDK 解析出的 region
            if resolved.region.is_none() {
                resolved.region = store.region().map(str::to_string);
            }

            let backend = BackendClient::new(&resolved)?;
            (
                UploadMode::Live(Arc::new(store)),
                SubmitMode::Backend(backend),
            )
        };

        Ok(Self::from_parts(resolved, document, upload_mode, submit_mode))
    }

    /// 用现成的组件组装（测试中注入假存储与本地后端）
    pub fn from_parts(
        config: ResolvedConfig,
        document: InputDocument,
        upload_mode: UploadMode,
        submit_mode: SubmitMode,
    ) -> Self {
        let uploader = ImageUploader::new(&config, document.base_dir(), upload_mode);
        let flow = QuestionFlow::new(QuestionMapper::from_config(&config), submit_mode);
        Self {
            config,
            document,
            flow,
            uploader,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> Result<RunOutcome> {
        let Self {
            config,
            document,
            flow,
            mut uploader,
        } = self;

        log_startup(&config);

        let questions = document.questions();
        let total = questions.len();
        if total == 0 {
            warn!("⚠️ 输入文件中没有题目");
        }

        let mut report = RunReport::new(&config, total);
        let mut updated = config
            .write_updated_json
            .then(|| UpdatedDocument::new(document.payload.clone()));

        for (index, value) in questions.iter().enumerate() {
            let ctx = QuestionCtx::new(index, total);
            let entry = flow
                .run(value, &ctx, &mut uploader, &mut report, updated.as_mut())
                .await;

            if entry.status == QuestionStatus::DryRun {
                info!("{} ✓ 演练完成", ctx);
            }
            report.record_question(entry);
            log_progress(ctx.number(), total, flow.is_dry_run());
        }

        let report = report.finish();

        let report_path = report_path(&config.input_path);
        write_json_pretty(&report_path, &report)
            .await
            .with_context(|| format!("写入报告失败: {}", report_path.display()))?;

        let updated_json_path = match updated {
            Some(doc) => {
                let path = updated_json_path(&config.input_path);
                write_json_pretty(&path, doc.payload())
                    .await
                    .with_context(|| format!("写入改写后的 JSON 失败: {}", path.display()))?;
                info!("✓ 已写入改写后的 JSON: {}", path.display());
                Some(path)
            }
            None => None,
        };

        info!("共 {} 张不同图片", uploader.len());
        print_final_stats(&report.totals, &report_path);

        Ok(RunOutcome {
            report,
            report_path,
            updated_json_path,
        })
    }
}
