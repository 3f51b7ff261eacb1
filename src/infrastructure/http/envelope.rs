//! 响应包裹 {code, msg, data}

use serde::Deserialize;
use serde_json::Value;

use crate::application::ApiError;

/// code 可能是字符串或数字
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum EnvelopeCode {
    Text(String),
    Number(i64),
}

impl EnvelopeCode {
    fn to_code_string(&self) -> String {
        match self {
            EnvelopeCode::Text(code) => code.clone(),
            EnvelopeCode::Number(code) => code.to_string(),
        }
    }
}

/// 后端统一响应
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    code: EnvelopeCode,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Value,
}

impl ApiEnvelope {
    pub fn code(&self) -> String {
        self.code.to_code_string()
    }

    pub fn is_success(&self, success_codes: &[String]) -> bool {
        let code = self.code();
        success_codes.iter().any(|c| *c == code)
    }

    /// 成功码返回 data，否则返回业务错误
    pub fn into_data(self, success_codes: &[String]) -> Result<Value, ApiError> {
        if self.is_success(success_codes) {
            Ok(self.data)
        } else {
            Err(ApiError::business(self.code(), self.msg.unwrap_or_default()))
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::invalid_response(format!("Malformed response envelope: {}", e)))
    }
}
