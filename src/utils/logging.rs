/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ResolvedConfig;
use crate::models::report::Totals;

/// 每处理多少题输出一次进度
pub const PROGRESS_INTERVAL: usize = 10;

/// 初始化日志（默认 info，可用 RUST_LOG 覆盖）
///
/// 重复调用时忽略。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 解析后的配置
pub fn log_startup(config: &ResolvedConfig) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始上传图片并导入题目");
    info!("📄 输入文件: {}", config.input_path.display());
    info!("🏷️ 来源: {}", config.source);
    info!("🪣 存储桶: {} (前缀: {})", config.bucket, config.prefix);
    info!("🌐 公开地址: {}", config.public_base_url);
    info!("🔗 后端: {}", config.backend_url);
    info!("📝 考试类型: {}", config.exam_type);
    if let Some(subject) = config.default_subject {
        info!("📚 默认学科: {}", subject);
    }
    if let Some(year) = config.year {
        info!("📅 年份: {}", year);
    }
    if config.dry_run {
        info!("💡 演练模式：不上传图片，不提交题目");
    }
    info!("{}", "=".repeat(60));
}

/// 记录处理进度
///
/// # 参数
/// - `done`: 已处理题数
/// - `total`: 题目总数
/// - `dry_run`: 是否演练模式
pub fn log_progress(done: usize, total: usize, dry_run: bool) {
    if done % PROGRESS_INTERVAL != 0 {
        return;
    }
    if dry_run {
        info!("📊 已处理 {}/{} 题（演练）", done, total);
    } else {
        info!("📊 已处理 {}/{} 题", done, total);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `totals`: 汇总计数
/// - `report_path`: 报告文件路径
pub fn print_final_stats(totals: &Totals, report_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("题目总数: {}", totals.questions);
    info!("✅ 成功: {}", totals.succeeded);
    info!("❌ 失败: {}", totals.failed);
    info!("⏭️ 跳过: {}", totals.skipped);
    info!("🖼️ 引用图片: {}", totals.images_referenced);
    info!("📤 已上传: {}", totals.images_uploaded);
    info!("✓ 已存在: {}", totals.images_skipped_existing);
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
