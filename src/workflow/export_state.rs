//! 导出状态机
//!
//! `Idle → Extracting → FetchingImages → Packaging → Downloading → Done`，
//! 任何进行中的状态都可以进入 `Failed`。状态变化通过 `StatusSink` 渲染，
//! 触发入口只在 `Idle` 时可用。

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::error::{ExportError, Result};

/// 导出状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Extracting,
    /// `current` 为正在下载的图片序号（从 1 开始，0 表示尚未开始）
    FetchingImages { current: usize, total: usize },
    Packaging,
    Downloading,
    Done { path: PathBuf },
    Failed { message: String },
}

impl ExportState {
    /// 是否正在导出（触发入口不可用）
    pub fn is_busy(&self) -> bool {
        !matches!(self, ExportState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportState::Done { .. } | ExportState::Failed { .. })
    }

    /// 是否允许从当前状态转到 `next`
    pub fn can_transition_to(&self, next: &ExportState) -> bool {
        use ExportState::*;
        match (self, next) {
            (Idle, Extracting) => true,
            (Extracting, FetchingImages { .. }) => true,
            (FetchingImages { .. }, FetchingImages { .. }) => true,
            (FetchingImages { .. }, Packaging) => true,
            (Packaging, Downloading) => true,
            (Downloading, Done { .. }) => true,
            (Extracting | FetchingImages { .. } | Packaging | Downloading, Failed { .. }) => true,
            (Done { .. } | Failed { .. }, Idle) => true,
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExportState::Idle => "Idle",
            ExportState::Extracting => "Extracting",
            ExportState::FetchingImages { .. } => "FetchingImages",
            ExportState::Packaging => "Packaging",
            ExportState::Downloading => "Downloading",
            ExportState::Done { .. } => "Done",
            ExportState::Failed { .. } => "Failed",
        }
    }
}

impl Display for ExportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportState::Idle => write!(f, "就绪"),
            ExportState::Extracting => write!(f, "正在提取页面内容..."),
            ExportState::FetchingImages { current: 0, total } => {
                write!(f, "找到 {} 张图片，开始下载...", total)
            }
            ExportState::FetchingImages { current, total } => {
                write!(f, "正在下载图片 {}/{}...", current, total)
            }
            ExportState::Packaging => write!(f, "正在生成 ZIP 文件..."),
            ExportState::Downloading => write!(f, "正在保存..."),
            ExportState::Done { path } => write!(f, "导出完成: {}", path.display()),
            ExportState::Failed { message } => write!(f, "错误: {}", message),
        }
    }
}

/// 状态渲染
pub trait StatusSink: Send + Sync {
    fn render(&self, state: &ExportState);
}

/// 默认渲染：写日志
#[derive(Debug, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn render(&self, state: &ExportState) {
        match state {
            ExportState::Failed { .. } => error!("❌ {}", state),
            ExportState::Done { .. } => info!("✅ {}", state),
            _ => info!("⏳ {}", state),
        }
    }
}

/// 记录所有渲染过的状态，测试使用
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    states: Mutex<Vec<ExportState>>,
}

impl RecordingStatusSink {
    pub fn states(&self) -> Vec<ExportState> {
        self.states.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl StatusSink for RecordingStatusSink {
    fn render(&self, state: &ExportState) {
        if let Ok(mut states) = self.states.lock() {
            states.push(state.clone());
        }
    }
}

/// 导出会话：持有当前状态与渲染端
pub struct ExportSession<S: StatusSink> {
    state: ExportState,
    sink: S,
    reenable_delay: Duration,
}

impl<S: StatusSink> ExportSession<S> {
    pub fn new(sink: S, reenable_delay: Duration) -> Self {
        Self {
            state: ExportState::Idle,
            sink,
            reenable_delay,
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 触发入口是否可用
    pub fn trigger_enabled(&self) -> bool {
        !self.state.is_busy()
    }

    /// 转到下一个状态并渲染
    pub fn advance(&mut self, next: ExportState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(ExportError::InvalidTransition {
                from: self.state.name().to_string(),
                to: next.name().to_string(),
            });
        }
        self.state = next;
        self.sink.render(&self.state);
        Ok(())
    }

    /// 进入失败状态；已处于终态或空闲时忽略
    pub fn fail(&mut self, message: impl Into<String>) {
        let failed = ExportState::Failed {
            message: message.into(),
        };
        if self.state.can_transition_to(&failed) {
            self.state = failed;
            self.sink.render(&self.state);
        }
    }

    /// 终态保持一段时间后回到 `Idle`，重新允许触发
    pub async fn settle(&mut self) {
        if !self.state.is_terminal() {
            return;
        }
        sleep(self.reenable_delay).await;
        self.state = ExportState::Idle;
        self.sink.render(&self.state);
    }
}
