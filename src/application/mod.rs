//! Application Layer - 应用层
//!
//! - Ports: 传输与流式回调的抽象接口
//! - Api: 按后端模块划分的接口绑定

pub mod api;
pub mod error;
pub mod ports;

pub use api::{ImageDramaApi, ImageProjectApi};
pub use error::ApiError;
