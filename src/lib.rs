//! # Page2Zip
//!
//! 把网页导出为 Markdown + 本地图片，并打包成 ZIP 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page / HTTP 客户端），只暴露能力
//! - `PageSource` - 页面来源，抓取原始 HTML、标题和基准地址
//! - `FetchWorker` - 图片获取工作端，按请求 / 应答消息工作
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理一件事
//! - `PageExtractor` - HTML → Markdown，收集图片地址
//! - `ImageFetcher` - 下载单张图片，推断扩展名
//! - `rewrite_image_links` - 把 Markdown 中的远程图片改为本地路径
//! - `build_archive` / `Downloader` - 打包 ZIP 并保存
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次导出"的完整流程
//! - `ExportSession` - 导出状态机与状态显示
//! - `ExportFlow` - 流程编排（提取 → 下载图片 → 改写 → 打包 → 保存）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/export_app` - 管理资源，依次导出所有目标
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::{Config, PageSourceKind};
pub use error::{ExportError, FetchError, Result};
pub use infrastructure::{FetchHandle, FetchWorker, JsExecutor, PageSource};
pub use models::{ExportArchive, FetchedImage, PageSnapshot, RawPage};
pub use orchestrator::{App, ExportStats};
pub use workflow::{ExportFlow, ExportReport, ExportSession, ExportState};
