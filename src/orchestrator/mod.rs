//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次导入运行的调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! ingest_runner (处理 Vec<Question>，持有缓存与报告)
//!     ↓
//! workflow::QuestionFlow (处理单个 Question)
//!     ↓
//! services (能力层：映射 / 图片去重 / 写盘)   clients (后端 API)
//!     ↓
//! infrastructure (基础设施：ObjectStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **顺序执行**：一题完全处理完再处理下一题
//! 2. **状态显式传递**：缓存与报告以 `&mut` 传给流程层，没有全局状态
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod ingest_runner;

pub use ingest_runner::{IngestRunner, RunOutcome};
