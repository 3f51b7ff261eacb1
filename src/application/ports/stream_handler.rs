//! Stream Handler Port - 流式响应回调
//!
//! 流式推理的消费端接口：
//! - on_message: 每批完整消息触发一次，index 从 0 开始逐一递增
//! - on_done / on_error / on_timeout: 终止回调，消费 self，保证至多触发一次
//!   且之后不可能再收到消息

use thiserror::Error;

/// 流式请求错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// HTTP 状态码非 2xx（保留原始响应状态与内容）
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 网络/传输错误
    #[error("Transport error: {0}")]
    Transport(String),

    /// 消息分帧异常（非法 UTF-8、缓冲区溢出等）
    #[error("Malformed stream: {0}")]
    Malformed(String),
}

impl StreamError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 流式请求的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Done,
    Error(StreamError),
    Timeout,
    /// 调用方主动取消，不触发任何终止回调
    Cancelled,
}

impl StreamOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, StreamOutcome::Done)
    }
}

/// 流式响应处理器
pub trait StreamHandler: Sized {
    /// 收到一批完整消息
    fn on_message(&mut self, messages: Vec<String>, index: usize);

    /// 流正常结束
    fn on_done(self) {
        tracing::debug!("Stream finished");
    }

    /// 请求失败或响应异常
    fn on_error(self, error: StreamError) {
        tracing::warn!(error = %error, "Stream failed without error handler");
    }

    /// 超过截止时间未收到数据
    fn on_timeout(self) {
        tracing::warn!("Stream timed out without timeout handler");
    }
}

type DoneFn = Box<dyn FnOnce() + Send>;
type ErrorFn = Box<dyn FnOnce(StreamError) + Send>;
type TimeoutFn = Box<dyn FnOnce() + Send>;

/// 基于闭包的处理器
///
/// on_message 必填，其余回调可选；未设置的终止回调回落到日志
pub struct CallbackHandler<M> {
    on_message: M,
    on_done: Option<DoneFn>,
    on_error: Option<ErrorFn>,
    on_timeout: Option<TimeoutFn>,
}

impl<M> CallbackHandler<M>
where
    M: FnMut(Vec<String>, usize),
{
    pub fn new(on_message: M) -> Self {
        Self {
            on_message,
            on_done: None,
            on_error: None,
            on_timeout: None,
        }
    }

    pub fn when_done(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    pub fn when_error(mut self, f: impl FnOnce(StreamError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn when_timeout(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_timeout = Some(Box::new(f));
        self
    }
}

impl<M> StreamHandler for CallbackHandler<M>
where
    M: FnMut(Vec<String>, usize),
{
    fn on_message(&mut self, messages: Vec<String>, index: usize) {
        (self.on_message)(messages, index);
    }

    fn on_done(self) {
        match self.on_done {
            Some(f) => f(),
            None => tracing::debug!("Stream finished"),
        }
    }

    fn on_error(self, error: StreamError) {
        match self.on_error {
            Some(f) => f(error),
            None => tracing::warn!(error = %error, "Stream failed without error handler"),
        }
    }

    fn on_timeout(self) {
        match self.on_timeout {
            Some(f) => f(),
            None => tracing::warn!("Stream timed out without timeout handler"),
        }
    }
}
