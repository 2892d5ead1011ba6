/// 日志工具模块
///
/// 提供启动、单次导出、最终统计的日志输出
use tracing::{info, warn};

use crate::config::Config;
use crate::workflow::ExportReport;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 页面导出模式");
    info!("📡 页面来源: {:?}", config.page_source);
    info!("📂 输出目录: {}", config.output_dir);
    if config.max_concurrent_fetches > 1 {
        info!("📊 图片并发数: {}", config.max_concurrent_fetches);
    }
    info!("{}", "=".repeat(60));
}

/// 记录单次导出开始
///
/// # 参数
/// - `index`: 导出序号（从 1 开始）
/// - `total`: 导出总数
/// - `target`: 目标地址，None 表示当前页面
pub fn log_export_start(index: usize, total: usize, target: Option<&str>) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📦 开始导出 {}/{}: {}",
        index,
        total,
        truncate_text(target.unwrap_or("当前页面"), 80)
    );
    info!("{}", "─".repeat(60));
}

/// 记录单次导出完成
pub fn log_export_complete(report: &ExportReport) {
    info!(
        "✓ {} → {} (图片 {}/{})",
        truncate_text(&report.title, 40),
        report.archive_path.display(),
        report.fetched_images,
        report.total_images
    );
    for url in &report.failed_urls {
        warn!("  未下载: {}", url);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
pub fn print_final_stats(success: usize, failed: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部导出完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("页面导出工具", 2), "页面...");
    }
}
