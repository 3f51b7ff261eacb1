//! 应用层错误定义
//!
//! 所有请求/响应型接口的统一错误类型

use thiserror::Error;

/// 接口调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络错误（连接失败、连接中断等）
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 请求超时
    #[error("Request timeout")]
    Timeout,

    /// HTTP 状态码非 2xx
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 业务错误（响应 code 不是成功码）
    #[error("Business error [{code}]: {msg}")]
    Business { code: String, msg: String },

    /// 响应无法解析
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 请求参数无效
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// 创建业务错误
    pub fn business(code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Business {
            code: code.into(),
            msg: msg.into(),
        }
    }

    /// 创建响应解析错误
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// 创建请求参数错误
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// 是否为网络层面的失败（可由调用方决定是否重试）
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::Timeout)
    }
}
