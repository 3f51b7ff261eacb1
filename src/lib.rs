//! Drama Client - 图文有声剧后端客户端
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 项目、章节、台词行、角色、分页等与后端约定的数据结构
//!
//! 应用层 (application/):
//! - Ports: ApiTransport（传输）、StreamHandler（流式回调）
//! - Api: ImageProjectApi、ImageDramaApi 接口绑定
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: reqwest 实现的 ApiTransport
//! - Stream: 流式推理请求、截止时间、取消、消息分帧

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;

pub use application::ports::{CallbackHandler, StreamError, StreamHandler, StreamOutcome};
pub use application::{ApiError, ImageDramaApi, ImageProjectApi};
pub use config::{load_config, AppConfig};
pub use infrastructure::{FetchStream, HttpApiClient};
