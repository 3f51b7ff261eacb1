//! API Facades - 后端接口绑定
//!
//! 每个方法对应一个固定路径：序列化参数 → POST → 解析 data

mod drama_api;
mod project_api;

pub use drama_api::{ImageDramaApi, ROLE_INFERENCE_PATH};
pub use project_api::ImageProjectApi;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::application::ports::ApiTransport;
use crate::application::ApiError;

fn to_body<P: Serialize + ?Sized>(params: &P) -> Result<Option<Value>, ApiError> {
    Ok(Some(serde_json::to_value(params)?))
}

fn decode<T: DeserializeOwned>(path: &str, data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data)
        .map_err(|e| ApiError::invalid_response(format!("{}: {}", path, e)))
}

async fn call<T: DeserializeOwned>(
    transport: &dyn ApiTransport,
    path: &str,
    body: Option<Value>,
) -> Result<T, ApiError> {
    let data = transport.post_json(path, body).await?;
    decode(path, data)
}

/// 列表接口：data 为 null 时视为空列表
async fn call_list<T: DeserializeOwned>(
    transport: &dyn ApiTransport,
    path: &str,
    body: Option<Value>,
) -> Result<Vec<T>, ApiError> {
    match transport.post_json(path, body).await? {
        Value::Null => Ok(Vec::new()),
        data => decode(path, data),
    }
}

/// 无返回值接口：忽略 data
async fn call_unit(
    transport: &dyn ApiTransport,
    path: &str,
    body: Option<Value>,
) -> Result<(), ApiError> {
    transport.post_json(path, body).await.map(|_| ())
}
