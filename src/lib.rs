//! # Question Ingest
//!
//! 把抽取好的题目 JSON 导入题库：图片按内容去重上传到对象存储，
//! 题目规范化后提交到后端，并生成运行报告。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 S3 客户端，只暴露能力
//! - `ObjectStore` - 存在检查 / 上传
//!
//! ### ② 业务能力层（Services / Clients）
//! - `services/` - 描述"我能做什么"，只处理单个题目或单张图片
//! - `ImageUploader` - 哈希去重上传
//! - `QuestionMapper` - 字段规范化与 DTO 组装
//! - `clients/BackendClient` - 带重试的题目提交
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `QuestionFlow` - 映射 → 图片 → DTO → 提交
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/ingest_runner` - 加载输入、逐题处理、写报告
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, ResolvedConfig};
pub use error::{AppError, AppResult};
pub use infrastructure::{ObjectStore, S3ObjectStore};
pub use models::report::RunReport;
pub use orchestrator::{IngestRunner, RunOutcome};
pub use workflow::{QuestionCtx, QuestionFlow, SubmitMode};
