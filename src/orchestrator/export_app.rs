//! 导出应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责页面来源、图片获取工作端和导出会话的生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：按配置连接 / 启动浏览器，或准备 HTTP 客户端
//! 2. **工作端**：启动图片获取工作端，流程层只拿到请求句柄
//! 3. **逐个导出**：多个目标依次导出，同一时间只有一次导出
//! 4. **错误兜底**：致命错误在这里捕获，渲染为失败状态后继续下一个目标
//! 5. **全局统计**：汇总所有导出的结果

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::{Config, PageSourceKind};
use crate::infrastructure::{FetchWorker, JsExecutor, PageSource};
use crate::services::ImageFetcher;
use crate::utils::logging::{log_export_complete, log_export_start, log_startup, print_final_stats};
use crate::workflow::{ExportFlow, ExportSession, StatusSink, TracingStatusSink};

/// 应用主结构
pub struct App<S: StatusSink = TracingStatusSink> {
    config: Config,
    // 浏览器句柄需要与页面同生命周期
    _browser: Option<Browser>,
    source: PageSource,
    flow: ExportFlow,
    session: ExportSession<S>,
}

/// 导出统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App<TracingStatusSink> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, source) = match config.page_source {
            PageSourceKind::Browser => {
                let (browser, page) =
                    browser::connect_to_browser_and_page(config.browser_debug_port).await?;
                (Some(browser), PageSource::Browser(JsExecutor::new(page)))
            }
            PageSourceKind::Headless => {
                let (browser, page) =
                    browser::launch_headless_browser(config.chrome_executable.as_deref()).await?;
                (Some(browser), PageSource::Browser(JsExecutor::new(page)))
            }
            PageSourceKind::Http => {
                let client = reqwest::Client::builder()
                    .user_agent(&config.user_agent)
                    .build()
                    .context("无法创建 HTTP 客户端")?;
                (None, PageSource::Http(client))
            }
        };

        Self::with_source(config, browser, source, TracingStatusSink)
    }
}

impl<S: StatusSink> App<S> {
    /// 使用已准备好的页面来源和渲染端创建应用
    pub fn with_source(
        config: Config,
        browser: Option<Browser>,
        source: PageSource,
        sink: S,
    ) -> Result<Self> {
        let fetcher = ImageFetcher::new(&config.user_agent).context("无法创建图片下载客户端")?;
        let handle = FetchWorker::spawn(fetcher);
        let flow = ExportFlow::new(&config, handle);
        let session = ExportSession::new(sink, Duration::from_millis(config.reenable_delay_ms));

        Ok(Self {
            config,
            _browser: browser,
            source,
            flow,
            session,
        })
    }

    pub fn session(&self) -> &ExportSession<S> {
        &self.session
    }

    /// 运行应用主逻辑：依次导出所有目标
    pub async fn run(&mut self) -> Result<ExportStats> {
        let targets: Vec<Option<String>> = if self.config.target_urls.is_empty() {
            if self.config.page_source == PageSourceKind::Http {
                warn!("⚠️ HTTP 模式没有指定页面地址，程序结束");
                return Ok(ExportStats::default());
            }
            vec![None]
        } else {
            self.config.target_urls.iter().cloned().map(Some).collect()
        };

        let mut stats = ExportStats {
            total: targets.len(),
            ..Default::default()
        };

        for (idx, target) in targets.iter().enumerate() {
            log_export_start(idx + 1, stats.total, target.as_deref());

            if self.export_one(target.as_deref()).await {
                stats.success += 1;
            } else {
                stats.failed += 1;
            }
        }

        print_final_stats(stats.success, stats.failed, stats.total);
        Ok(stats)
    }

    /// 导出单个目标，返回是否成功
    ///
    /// 致命错误在这里渲染为失败状态；结束后等待会话回到空闲
    pub async fn export_one(&mut self, target: Option<&str>) -> bool {
        if !self.session.trigger_enabled() {
            warn!("⚠️ 上一次导出尚未结束，忽略本次触发");
            return false;
        }

        let succeeded = match self.flow.run(&self.source, target, &mut self.session).await {
            Ok(report) => {
                log_export_complete(&report);
                true
            }
            Err(e) => {
                error!("导出失败: {}", e);
                self.session.fail(e.to_string());
                false
            }
        };

        self.session.settle().await;
        info!("🔁 可以开始下一次导出");
        succeeded
    }
}
