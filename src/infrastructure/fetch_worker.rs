//! 图片获取工作端 - 基础设施层
//!
//! 单独的 tokio 任务持有 `ImageFetcher`，编排层只能通过请求/响应通道与它通信。
//! 每个请求带一个 oneshot 回信通道；没有超时，卡住的请求会一直等待。

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::{ExportError, Result};
use crate::models::{FetchRequest, FetchResponse};
use crate::services::ImageFetcher;

type Envelope = (FetchRequest, oneshot::Sender<FetchResponse>);

/// 请求端句柄，可克隆
#[derive(Clone)]
pub struct FetchHandle {
    sender: mpsc::Sender<Envelope>,
}

/// 图片获取工作端
pub struct FetchWorker;

impl FetchWorker {
    /// 启动工作任务，返回请求句柄
    ///
    /// 所有句柄被丢弃后任务自动退出
    pub fn spawn(fetcher: ImageFetcher) -> FetchHandle {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(32);

        tokio::spawn(async move {
            while let Some((request, reply)) = receiver.recv().await {
                let fetcher = fetcher.clone();
                // 每个请求独立处理，同时在途的数量由请求端控制
                tokio::spawn(async move {
                    let response = match &request {
                        FetchRequest::FetchImage { url } => fetcher.fetch(url).await,
                    };
                    if reply.send(response).is_err() {
                        debug!("请求端已放弃等待: {}", request.url());
                    }
                });
            }
            debug!("图片获取工作端退出");
        });

        FetchHandle { sender }
    }
}

impl FetchHandle {
    /// 发送请求并等待响应
    pub async fn send(&self, request: FetchRequest) -> Result<FetchResponse> {
        let url = request.url().to_string();
        let (reply_tx, reply_rx) = oneshot::channel();

        self.sender.send((request, reply_tx)).await.map_err(|_| {
            error!("图片获取工作端已关闭");
            ExportError::ImageFetch {
                url: url.clone(),
                reason: "图片获取工作端已关闭".to_string(),
            }
        })?;

        reply_rx.await.map_err(|_| ExportError::ImageFetch {
            url,
            reason: "图片获取工作端未返回响应".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_url_returns_failure_response() {
        let handle = FetchWorker::spawn(ImageFetcher::new("test").unwrap());
        let response = handle
            .send(FetchRequest::FetchImage {
                url: "http://127.0.0.1:1/missing.png".to_string(),
            })
            .await
            .unwrap();

        assert!(!response.success);
        assert!(response.error.is_some());
        assert!(response.content.is_none());
    }

    #[tokio::test]
    async fn test_invalid_url_returns_failure_response() {
        let handle = FetchWorker::spawn(ImageFetcher::new("test").unwrap());
        let response = handle
            .send(FetchRequest::FetchImage {
                url: "::not a url::".to_string(),
            })
            .await
            .unwrap();
        assert!(!response.success);
    }
}
