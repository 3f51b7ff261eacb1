//! API Transport Port - 后端接口传输抽象
//!
//! 所有接口都是 POST；具体实现在 infrastructure/http 层，
//! 测试中可替换为记录请求的假实现

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::application::ApiError;
use crate::infrastructure::stream::FetchStream;

/// 上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime: String,
}

/// 表单请求体（对应前端 FormData）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadFile>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).to_string();
        self.files.push(UploadFile {
            field: field.into(),
            file_name,
            content: content.into(),
            mime,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" => "text/plain",
        "json" => "application/json",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// 后端接口传输
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// JSON 请求，返回响应包裹中的 data
    async fn post_json(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError>;

    /// multipart 表单请求，返回响应包裹中的 data
    async fn post_form(&self, path: &str, form: UploadForm) -> Result<Value, ApiError>;

    /// 二进制响应（音频等），不经过响应包裹
    async fn post_blob(&self, path: &str, body: Value) -> Result<Bytes, ApiError>;

    /// 构造流式请求（不发送）
    fn fetch_stream(&self, url: &str, body: Value) -> FetchStream;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_form_builder() {
        let form = UploadForm::new()
            .text("projectName", "三国")
            .file("file", "book.TXT", "第一章".as_bytes().to_vec());

        assert_eq!(form.field("projectName"), Some("三国"));
        assert_eq!(form.field("missing"), None);
        assert_eq!(form.files[0].mime, "text/plain");
        assert_eq!(form.files[0].field, "file");
    }

    #[test]
    fn test_guess_mime_fallback() {
        assert_eq!(guess_mime("voice.wav"), "audio/wav");
        assert_eq!(guess_mime("noext"), "application/octet-stream");
    }
}
