//! Fetch Stream - 流式推理请求
//!
//! 发送一次 POST（JSON body），增量读取响应体并按分帧规则回调：
//! - 截止时间同时约束等待响应头和每次等待下一个数据块
//! - 非 2xx / 网络错误 / 分帧异常 → on_error
//! - 超时 → on_timeout；正常结束 → on_done
//! - CancellationToken 取消后立即释放连接，不再触发任何回调

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::framing::{Framing, MessageFramer, DEFAULT_MAX_BUFFER_BYTES};
use crate::application::ports::{StreamError, StreamHandler, StreamOutcome};

/// 流式请求配置
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// 等待响应头 / 下一个数据块的截止时间
    pub timeout: Duration,
    pub framing: Framing,
    pub max_buffer_bytes: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            framing: Framing::Lines,
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
        }
    }
}

impl StreamOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }
}

/// 中断原因（内部）
enum Interrupt {
    Failed(StreamError),
    Timeout,
    Cancelled,
}

/// 单次流式请求
///
/// 每个实例只对应一次网络交换，run/start 消费 self
#[derive(Debug)]
pub struct FetchStream {
    client: Client,
    url: String,
    body: Value,
    headers: HeaderMap,
    options: StreamOptions,
    cancel: CancellationToken,
}

impl FetchStream {
    pub fn new(client: Client, url: impl Into<String>, body: Value) -> Self {
        Self {
            client,
            url: url.into(),
            body,
            headers: HeaderMap::new(),
            options: StreamOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// 附加请求头（在默认 Content-Type 之外）
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// 使用调用方提供的取消令牌
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// 当前请求的取消令牌（克隆后可在其他任务中取消）
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 在后台任务中执行（fire-and-forget），返回最终结果句柄
    pub fn start<H>(self, handler: H) -> JoinHandle<StreamOutcome>
    where
        H: StreamHandler + Send + 'static,
    {
        tokio::spawn(self.run(handler))
    }

    /// 执行请求并驱动回调，返回最终结果
    pub async fn run<H: StreamHandler>(self, mut handler: H) -> StreamOutcome {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("fetch_stream", request_id = %request_id, url = %self.url);

        async move {
            let result = self.drive(&mut handler).await;

            match result {
                Ok(batches) => {
                    tracing::debug!(batches, "Stream completed");
                    handler.on_done();
                    StreamOutcome::Done
                }
                Err(Interrupt::Failed(error)) => {
                    tracing::debug!(error = %error, "Stream failed");
                    handler.on_error(error.clone());
                    StreamOutcome::Error(error)
                }
                Err(Interrupt::Timeout) => {
                    tracing::debug!(timeout_ms = self.options.timeout.as_millis() as u64, "Stream timed out");
                    handler.on_timeout();
                    StreamOutcome::Timeout
                }
                Err(Interrupt::Cancelled) => {
                    tracing::debug!("Stream cancelled by caller");
                    StreamOutcome::Cancelled
                }
            }
        }
        .instrument(span)
        .await
    }

    /// 返回已投递的批次数
    async fn drive<H: StreamHandler>(&self, handler: &mut H) -> Result<usize, Interrupt> {
        let request = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream, application/x-ndjson, text/plain, */*")
            .json(&self.body);

        tracing::debug!("Sending stream request");

        let response = self
            .guarded(request.send())
            .await?
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = self
                .guarded(response.text())
                .await?
                .unwrap_or_default();
            return Err(Interrupt::Failed(StreamError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let mut chunks = Box::pin(response.bytes_stream());
        let mut framer = MessageFramer::with_capacity(self.options.framing, self.options.max_buffer_bytes);
        let mut index = 0usize;

        while let Some(chunk) = self.guarded(chunks.next()).await? {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            let messages = framer.push(&chunk).map_err(Interrupt::Failed)?;
            deliver(handler, messages, &mut index);
        }

        let rest = framer.finish().map_err(Interrupt::Failed)?;
        deliver(handler, rest, &mut index);

        Ok(index)
    }

    /// 同时等待取消与截止时间；取消优先
    async fn guarded<F: Future>(&self, fut: F) -> Result<F::Output, Interrupt> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupt::Cancelled),
            result = tokio::time::timeout(self.options.timeout, fut) => {
                result.map_err(|_| Interrupt::Timeout)
            }
        }
    }

    fn classify(&self, error: reqwest::Error) -> Interrupt {
        if error.is_timeout() {
            Interrupt::Timeout
        } else if error.is_connect() {
            Interrupt::Failed(StreamError::Transport(format!(
                "Cannot connect to {}: {}",
                self.url, error
            )))
        } else {
            Interrupt::Failed(StreamError::Transport(error.to_string()))
        }
    }
}

fn deliver<H: StreamHandler>(handler: &mut H, messages: Vec<String>, index: &mut usize) {
    if messages.is_empty() {
        return;
    }
    handler.on_message(messages, *index);
    *index += 1;
}
