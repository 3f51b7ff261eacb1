//! 测试辅助：本地 HTTP 服务、记录型传输、流式事件记录器

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ApiTransport, StreamError, StreamHandler, UploadForm};
use crate::application::ApiError;
use crate::infrastructure::stream::FetchStream;

/// 在随机端口启动服务，返回 base url
pub(crate) async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TraceEvent {
    Message(Vec<String>, usize),
    Done,
    Error(StreamError),
    Timeout,
}

/// 按顺序记录所有回调
pub(crate) struct TraceHandler {
    events: Arc<Mutex<Vec<TraceEvent>>>,
    cancel_on_first: Option<CancellationToken>,
}

impl TraceHandler {
    pub(crate) fn new(events: Arc<Mutex<Vec<TraceEvent>>>) -> Self {
        Self {
            events,
            cancel_on_first: None,
        }
    }

    pub(crate) fn cancel_on_first_message(mut self, token: CancellationToken) -> Self {
        self.cancel_on_first = Some(token);
        self
    }

    fn push(&self, event: TraceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl StreamHandler for TraceHandler {
    fn on_message(&mut self, messages: Vec<String>, index: usize) {
        self.push(TraceEvent::Message(messages, index));
        if let Some(token) = self.cancel_on_first.take() {
            token.cancel();
        }
    }

    fn on_done(self) {
        self.push(TraceEvent::Done);
    }

    fn on_error(self, error: StreamError) {
        self.push(TraceEvent::Error(error));
    }

    fn on_timeout(self) {
        self.push(TraceEvent::Timeout);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub path: String,
    pub body: Option<Value>,
}

/// 记录请求并返回预设 data 的传输实现
///
/// 未预设的路径返回 Value::Null / 空 Bytes；fail 预设的错误只生效一次
#[derive(Default)]
pub(crate) struct RecordingTransport {
    responses: Mutex<HashMap<String, Value>>,
    blobs: Mutex<HashMap<String, Bytes>>,
    failures: Mutex<HashMap<String, ApiError>>,
    calls: Mutex<Vec<RecordedCall>>,
    forms: Mutex<Vec<(String, UploadForm)>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, data: Value) {
        self.responses.lock().unwrap().insert(path.to_string(), data);
    }

    pub(crate) fn respond_blob(&self, path: &str, data: Bytes) {
        self.blobs.lock().unwrap().insert(path.to_string(), data);
    }

    pub(crate) fn fail(&self, path: &str, error: ApiError) {
        self.failures.lock().unwrap().insert(path.to_string(), error);
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn forms(&self) -> Vec<(String, UploadForm)> {
        self.forms.lock().unwrap().clone()
    }

    fn take_failure(&self, path: &str) -> Result<(), ApiError> {
        match self.failures.lock().unwrap().remove(path) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn response(&self, path: &str) -> Value {
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ApiTransport for RecordingTransport {
    async fn post_json(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            body,
        });
        self.take_failure(path)?;
        Ok(self.response(path))
    }

    async fn post_form(&self, path: &str, form: UploadForm) -> Result<Value, ApiError> {
        self.forms.lock().unwrap().push((path.to_string(), form));
        self.take_failure(path)?;
        Ok(self.response(path))
    }

    async fn post_blob(&self, path: &str, body: Value) -> Result<Bytes, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            body: Some(body),
        });
        self.take_failure(path)?;
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_stream(&self, url: &str, body: Value) -> FetchStream {
        FetchStream::new(reqwest::Client::new(), url, body)
    }
}
