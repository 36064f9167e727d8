/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::analysis::LectureAnalysisResult;
use crate::orchestrator::app::RunStats;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；否则默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 配置
/// - `model_name`: 模型名称
pub fn log_startup(config: &Config, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", model_name);
    info!(
        "📝 默认生成: {} 道{} (难度: {})",
        config.default_question_count,
        config.default_question_type.label(),
        config.default_difficulty
    );
    info!("📦 文件大小上限: {} KB", config.max_upload_bytes / 1024);
    info!("{}", "=".repeat(60));
}

/// 记录分析结果
pub fn log_analysis(analysis: &LectureAnalysisResult) {
    info!("\n{}", "─".repeat(60));
    info!("🔑 关键概念: {}", analysis.key_concepts.join(", "));
    info!("🏷️ 主题: {}", analysis.themes.join(", "));
    info!("📄 摘要: {}", truncate_text(&analysis.summary, 120));
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn log_run_summary(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📁 文件: 成功 {}/{}",
        stats.files_total - stats.files_failed,
        stats.files_total
    );
    info!("✅ 生成题目: {}", stats.questions_generated);
    if stats.questions_dropped > 0 {
        info!("🗑️ 丢弃题目: {}", stats.questions_dropped);
    }
    info!("{}", "=".repeat(60));
    if let Some(path) = &stats.export_path {
        info!("\n题目已保存至: {}", path.display());
    }
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
