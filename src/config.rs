use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::error::ExportError;

/// 页面来源
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSourceKind {
    /// 连接已运行的浏览器（调试端口）
    Browser,
    /// 启动无头浏览器
    Headless,
    /// 直接 HTTP 获取静态 HTML，不执行 JS
    Http,
}

impl FromStr for PageSourceKind {
    type Err = ExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "headless" => Ok(Self::Headless),
            "http" => Ok(Self::Http),
            other => Err(ExportError::Config(format!(
                "未知的页面来源 '{}'，可选: browser / headless / http",
                other
            ))),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待导出的页面，为空时导出浏览器当前页面
    pub target_urls: Vec<String>,
    /// 页面来源
    pub page_source: PageSourceKind,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 无头模式下的浏览器可执行文件，为空时自动查找
    pub chrome_executable: Option<String>,
    /// ZIP 输出目录
    pub output_dir: String,
    /// 同时下载的图片数量，1 表示逐张顺序下载
    pub max_concurrent_fetches: usize,
    /// 导出结束后重新允许触发的延迟（毫秒）
    pub reenable_delay_ms: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 下载失败的图片记录文件
    pub failure_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_urls: Vec::new(),
            page_source: PageSourceKind::Browser,
            browser_debug_port: 9222,
            chrome_executable: None,
            output_dir: "exports".to_string(),
            max_concurrent_fetches: 1,
            reenable_delay_ms: 2000,
            user_agent: concat!("page2zip/", env!("CARGO_PKG_VERSION")).to_string(),
            verbose_logging: false,
            failure_log_file: "failed_images.txt".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → `PAGE2ZIP_CONFIG` 指向的 TOML 文件 → 环境变量
    pub fn load() -> Result<Self> {
        let base = match std::env::var("PAGE2ZIP_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_env()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env(self) -> Result<Self> {
        let page_source = match std::env::var("PAGE_SOURCE") {
            Ok(v) => v.parse()?,
            Err(_) => self.page_source,
        };

        Ok(Self {
            target_urls: std::env::var("TARGET_URLS")
                .map(|v| split_urls(&v))
                .unwrap_or(self.target_urls),
            page_source,
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").unwrap_or(self.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(self.chrome_executable),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            max_concurrent_fetches: env_parse("MAX_CONCURRENT_FETCHES").unwrap_or(self.max_concurrent_fetches),
            reenable_delay_ms: env_parse("REENABLE_DELAY_MS").unwrap_or(self.reenable_delay_ms),
            user_agent: std::env::var("USER_AGENT").unwrap_or(self.user_agent),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(self.failure_log_file),
        })
    }
}

/// 读取并解析环境变量；未设置时返回 None，无法解析时警告后返回 None
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    parse_env_value(name, &value)
}

fn parse_env_value<T: FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(
                "⚠️ 环境变量 {}={:?} 无法解析为 {}，使用原有配置",
                name,
                value,
                std::any::type_name::<T>()
            );
            None
        }
    }
}

fn split_urls(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sequential() {
        let config = Config::default();
        assert_eq!(config.max_concurrent_fetches, 1);
        assert_eq!(config.reenable_delay_ms, 2000);
        assert_eq!(config.page_source, PageSourceKind::Browser);
    }

    #[test]
    fn test_toml_partial_override() {
        let config = Config::from_toml_str(
            r#"
            target_urls = ["https://example.com/a"]
            page_source = "http"
            output_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.target_urls, vec!["https://example.com/a"]);
        assert_eq!(config.page_source, PageSourceKind::Http);
        assert_eq!(config.output_dir, "out");
        // 未写的字段保持默认
        assert_eq!(config.browser_debug_port, 9222);
    }

    #[test]
    fn test_page_source_parse() {
        assert_eq!("HTTP".parse::<PageSourceKind>().unwrap(), PageSourceKind::Http);
        assert_eq!(" headless ".parse::<PageSourceKind>().unwrap(), PageSourceKind::Headless);
        assert!("firefox".parse::<PageSourceKind>().is_err());
    }

    #[test]
    fn test_split_urls() {
        assert_eq!(
            split_urls("https://a.com, ,https://b.com/x "),
            vec!["https://a.com", "https://b.com/x"]
        );
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        assert_eq!(parse_env_value::<usize>("MAX_CONCURRENT_FETCHES", "abc"), None);
        assert_eq!(parse_env_value::<bool>("VERBOSE_LOGGING", "1"), None);
        assert_eq!(parse_env_value::<usize>("MAX_CONCURRENT_FETCHES", " 4 "), Some(4));
        assert_eq!(parse_env_value::<bool>("VERBOSE_LOGGING", "true"), Some(true));
    }
}
