//! HTTP API Client - 调用图文后端
//!
//! 实现 ApiTransport trait：
//! - JSON 接口：POST JSON，解析 {code, msg, data} 包裹
//! - 表单接口：multipart
//! - 二进制接口：直接返回响应体，后端返回 JSON 包裹时按业务错误处理
//! - 流式接口：构造 FetchStream（不设总超时，由截止时间控制）

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::envelope::ApiEnvelope;
use crate::application::ports::{ApiTransport, UploadForm};
use crate::application::ApiError;
use crate::config::AppConfig;
use crate::infrastructure::stream::{FetchStream, StreamOptions};

/// HTTP API 客户端配置
#[derive(Debug, Clone)]
pub struct HttpApiClientConfig {
    /// 后端基础 URL
    pub base_url: String,
    /// 普通请求总超时（秒）
    pub timeout_secs: u64,
    /// 建立连接超时（秒）
    pub connect_timeout_secs: u64,
    /// 每个请求附带的请求头
    pub headers: HashMap<String, String>,
    pub success_codes: Vec<String>,
    pub stream: StreamOptions,
}

impl Default for HttpApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            headers: HashMap::new(),
            success_codes: vec!["200".to_string(), "0".to_string()],
            stream: StreamOptions::default(),
        }
    }
}

impl HttpApiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_stream(mut self, stream: StreamOptions) -> Self {
        self.stream = stream;
        self
    }
}

/// HTTP API 客户端
///
/// Send + Sync，以 Arc<dyn ApiTransport> 在各接口间共享
pub struct HttpApiClient {
    client: Client,
    stream_client: Client,
    headers: HeaderMap,
    config: HttpApiClientConfig,
}

impl HttpApiClient {
    /// 创建新的客户端
    pub fn new(config: HttpApiClientConfig) -> Result<Self, ApiError> {
        let headers = build_headers(&config.headers)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        // 流式请求的时长不可预知，只限制建立连接
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            stream_client,
            headers,
            config,
        })
    }

    /// 从应用配置创建
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let stream = StreamOptions {
            timeout: Duration::from_secs(config.stream.timeout_secs),
            framing: config.stream.framing,
            max_buffer_bytes: config.stream.max_buffer_bytes,
        };

        Self::new(HttpApiClientConfig {
            base_url: config.api.base_url.clone(),
            timeout_secs: config.api.timeout_secs,
            connect_timeout_secs: config.api.connect_timeout_secs,
            headers: config.api.headers.clone(),
            success_codes: config.api.success_codes.clone(),
            stream,
        })
    }

    pub fn config(&self) -> &HttpApiClientConfig {
        &self.config
    }

    /// 绝对地址原样使用，其余拼接到 base_url
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).headers(self.headers.clone())
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| map_send_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), "Request failed");
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn read_body(response: Response) -> Result<Bytes, ApiError> {
        response
            .bytes()
            .await
            .map_err(|e| ApiError::invalid_response(format!("Failed to read body: {}", e)))
    }

    async fn unwrap_envelope(&self, response: Response) -> Result<Value, ApiError> {
        let body = Self::read_body(response).await?;
        ApiEnvelope::parse(&body)?.into_data(&self.config.success_codes)
    }
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, ApiError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::invalid_request(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::invalid_request(format!("Invalid header value for {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn map_send_error(error: reqwest::Error, url: &str) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else if error.is_connect() {
        ApiError::NetworkError(format!("Cannot connect to {}: {}", url, error))
    } else {
        ApiError::NetworkError(error.to_string())
    }
}

fn to_multipart(form: UploadForm) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    for file in form.files {
        let part = Part::bytes(file.content)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|e| ApiError::invalid_request(format!("Invalid mime type: {}", e)))?;
        multipart = multipart.part(file.field, part);
    }
    Ok(multipart)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

#[async_trait]
impl ApiTransport for HttpApiClient {
    async fn post_json(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, has_body = body.is_some(), "Sending API request");

        let mut request = self.post(&url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = self.send(request, &url).await?;
        self.unwrap_envelope(response).await
    }

    async fn post_form(&self, path: &str, form: UploadForm) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(
            url = %url,
            fields = form.fields.len(),
            files = form.files.len(),
            "Sending form request"
        );

        let request = self.post(&url).multipart(to_multipart(form)?);
        let response = self.send(request, &url).await?;
        self.unwrap_envelope(response).await
    }

    async fn post_blob(&self, path: &str, body: Value) -> Result<Bytes, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Sending blob request");

        let response = self.send(self.post(&url).json(&body), &url).await?;
        let json = is_json(&response);
        let bytes = Self::read_body(response).await?;

        if json {
            ApiEnvelope::parse(&bytes)?.into_data(&self.config.success_codes)?;
        }

        tracing::debug!(url = %url, size = bytes.len(), "Blob received");
        Ok(bytes)
    }

    fn fetch_stream(&self, url: &str, body: Value) -> FetchStream {
        FetchStream::new(self.stream_client.clone(), self.url(url), body)
            .with_headers(self.headers.clone())
            .with_options(self.config.stream.clone())
    }
}
