use thiserror::Error;

/// 导出流程错误
///
/// 除 `ImageFetch` 外都是致命错误：由编排层统一捕获，渲染为 `Failed` 状态
#[derive(Debug, Error)]
pub enum ExportError {
    /// 页面脚本未返回结果 / 页面无法获取
    #[error("页面提取失败: {0}")]
    Extraction(String),

    /// 单张图片下载失败（非致命，只记录并跳过）
    #[error("图片下载失败 ({url}): {reason}")]
    ImageFetch { url: String, reason: String },

    /// 打包 ZIP 失败
    #[error("打包失败: {0}")]
    Packaging(String),

    /// 保存归档失败
    #[error("保存归档失败 ({path}): {source}")]
    Download {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 非法状态转换
    #[error("非法状态转换: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

/// 图片获取内部错误，只在 fetcher 内部使用，出边界前转成 `FetchResponse`
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        ExportError::Packaging(err.to_string())
    }
}

impl From<regex::Error> for ExportError {
    fn from(err: regex::Error) -> Self {
        ExportError::Packaging(format!("图片链接改写失败: {}", err))
    }
}

impl From<chromiumoxide::error::CdpError> for ExportError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ExportError::Browser(err.to_string())
    }
}

/// 导出结果类型
pub type Result<T> = std::result::Result<T, ExportError>;
