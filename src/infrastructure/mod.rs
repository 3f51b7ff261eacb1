//! Infrastructure Layer - 基础设施层
//!
//! 提供端口的具体实现：
//! - http: 后端 JSON / 表单 / 二进制接口
//! - stream: 流式推理请求与消息分帧

pub mod http;
pub mod stream;

pub use http::{HttpApiClient, HttpApiClientConfig};
pub use stream::{FetchStream, Framing, StreamOptions};
