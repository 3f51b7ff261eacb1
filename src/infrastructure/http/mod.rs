//! HTTP Layer - 后端接口客户端
//!
//! reqwest 实现的 ApiTransport

mod client;
mod envelope;

pub use client::{HttpApiClient, HttpApiClientConfig};
pub use envelope::ApiEnvelope;
