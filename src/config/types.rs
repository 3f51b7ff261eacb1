//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::HashMap;

use crate::application::api::ROLE_INFERENCE_PATH;
use crate::infrastructure::stream::{Framing, DEFAULT_MAX_BUFFER_BYTES};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 后端接口配置
    #[serde(default)]
    pub api: ApiConfig,

    /// 流式推理配置
    #[serde(default)]
    pub stream: StreamConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 后端接口配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 后端基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 普通请求超时时间（秒）
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// 建立连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// 视为成功的响应 code
    #[serde(default = "default_success_codes")]
    pub success_codes: Vec<String>,

    /// 每个请求附带的请求头（如鉴权 token）
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_success_codes() -> Vec<String> {
    vec!["200".to_string(), "0".to_string()]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            success_codes: default_success_codes(),
            headers: HashMap::new(),
        }
    }
}

/// 流式推理配置
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// 等待响应头 / 下一个数据块的截止时间（秒）
    #[serde(default = "default_stream_timeout")]
    pub timeout_secs: u64,

    /// 消息分帧方式：lines | sse
    #[serde(default)]
    pub framing: Framing,

    /// 未完成消息的最大缓冲字节数
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: usize,

    /// 角色推理接口路径
    #[serde(default = "default_role_inference_path")]
    pub role_inference_path: String,
}

fn default_stream_timeout() -> u64 {
    60
}

fn default_max_buffer_bytes() -> usize {
    DEFAULT_MAX_BUFFER_BYTES
}

fn default_role_inference_path() -> String {
    ROLE_INFERENCE_PATH.to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_stream_timeout(),
            framing: Framing::default(),
            max_buffer_bytes: default_max_buffer_bytes(),
            role_inference_path: default_role_inference_path(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
