//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责应用生命周期与导出调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (处理 Vec<目标地址>)
//!     ↓
//! workflow::ExportFlow (处理单次导出)
//!     ↓
//! services (能力层：提取 / 下载图片 / 改写 / 打包 / 保存)
//!     ↓
//! infrastructure (基础设施：PageSource / FetchWorker)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser 和图片获取工作端
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度、兜底和统计

pub mod export_app;

pub use export_app::{App, ExportStats};
