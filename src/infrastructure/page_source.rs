//! 页面来源 - 基础设施层
//!
//! 浏览器模式下在页面上下文中执行脚本取回 body；HTTP 模式下直接获取静态 HTML。
//! 两者都交回 `RawPage`，之后的提取逻辑完全相同。

use reqwest::header::ACCEPT;
use tracing::{debug, info};
use url::Url;

use super::js_executor::JsExecutor;
use crate::error::{ExportError, Result};
use crate::models::RawPage;
use crate::services::page_extractor::{document_title, effective_base_url};

/// 页面上下文中执行的脚本
///
/// 克隆 body 后去掉 script / style / noscript，不改动真实页面；
/// 脚本内部异常通过 `error` 字段交回
const CAPTURE_SCRIPT: &str = r#"
(() => {
    try {
        const body = document.body ? document.body.cloneNode(true) : null;
        if (body) {
            body.querySelectorAll('script, style, noscript').forEach(el => el.remove());
        }
        return {
            title: document.title || '',
            html: body ? body.outerHTML : '',
            baseUrl: document.baseURI || window.location.href,
            error: null
        };
    } catch (err) {
        return {
            title: '',
            html: '',
            baseUrl: '',
            error: String((err && err.message) || err)
        };
    }
})()
"#;

/// 页面来源
pub enum PageSource {
    /// 浏览器页面（连接或无头启动）
    Browser(JsExecutor),
    /// 静态 HTTP 获取
    Http(reqwest::Client),
}

impl PageSource {
    /// 取回页面内容
    ///
    /// 浏览器模式下 `target` 为空时使用当前页面；HTTP 模式必须给出地址。
    /// 这里的错误表示页面没有返回任何结果，整次导出随之失败
    pub async fn capture(&self, target: Option<&str>) -> Result<RawPage> {
        match self {
            PageSource::Browser(executor) => {
                if let Some(url) = target {
                    executor.goto(url).await?;
                }
                let raw: RawPage = executor
                    .eval_as(CAPTURE_SCRIPT)
                    .await
                    .map_err(|e| ExportError::Extraction(format!("页面脚本未返回结果: {}", e)))?;
                debug!("页面脚本返回 {} 字节 HTML", raw.html.len());
                Ok(raw)
            }
            PageSource::Http(client) => {
                let url = target.ok_or_else(|| {
                    ExportError::Config("HTTP 模式需要指定页面地址".to_string())
                })?;
                fetch_static_page(client, url).await
            }
        }
    }
}

async fn fetch_static_page(client: &reqwest::Client, url: &str) -> Result<RawPage> {
    info!("🌐 获取页面: {}", url);
    let extraction = |e: reqwest::Error| ExportError::Extraction(format!("获取页面失败 {}: {}", url, e));

    let response = client
        .get(url)
        .header(ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await
        .map_err(extraction)?
        .error_for_status()
        .map_err(extraction)?;

    // 以重定向后的地址作为文档地址
    let document_url: Url = response.url().clone();
    let html = response.text().await.map_err(extraction)?;

    Ok(RawPage {
        title: document_title(&html),
        base_url: effective_base_url(&html, &document_url).to_string(),
        html,
        error: None,
    })
}
