//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航"和"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{ExportError, Result};

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 goto() / eval() 能力
/// - 不认识 Markdown / 图片
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定地址并等待加载完成
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("页面导航: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| ExportError::Browser(format!("导航到 {} 失败: {}", url, e)))?;
        info!("已导航到: {}", url);
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let js_code: String = js_code.into();
        let result = self.page.evaluate(js_code).await?;
        let json_value = result
            .into_value()
            .map_err(|e| ExportError::Browser(format!("脚本结果无法读取: {}", e)))?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value)
            .map_err(|e| ExportError::Browser(format!("脚本结果格式错误: {}", e)))
    }
}
