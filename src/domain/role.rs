//! Role Types - 角色与音色模型
//!
//! 章节角色、公共角色、角色推理结果

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::chapter::ChapterParam;
use super::common::null_as_default;

/// 角色基本信息（台词行和角色共用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioRoleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

/// 音色模型定位键
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioModelInfoKey {
    /// 模型类型（如 gpt-sovits / edge-tts）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_config_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_audio_id: Option<String>,
}

/// 音色模型信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioModelInfo {
    #[serde(flatten)]
    pub key: AudioModelInfoKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_config_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_audio_name: Option<String>,
}

/// 文本角色
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRole {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub project_id: String,
    /// 公共角色没有章节
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub role_count: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_common_role: bool,
    #[serde(flatten)]
    pub role_info: AudioRoleInfo,
    #[serde(flatten)]
    pub model_info: AudioModelInfo,
}

impl TextRole {
    pub fn is_common(&self) -> bool {
        self.chapter_id.is_none()
    }
}

/// 批量修改音色模型
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateModelInfo {
    #[serde(flatten)]
    pub chapter: ChapterParam,
    #[serde(flatten)]
    pub model: AudioModelInfoKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<i64>>,
}

/// 合并角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCombine {
    pub project_id: String,
    pub chapter_id: String,
    pub from_role_name: String,
    pub to_role_name: String,
}

/// 修改台词所属角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRoleChange {
    pub project_id: String,
    pub chapter_id: String,
    pub chapter_info_ids: Vec<i64>,
    /// 后端字段名即为 formRoleName
    #[serde(rename = "formRoleName")]
    pub from_role_name: String,
    pub from_role_type: String,
    pub change_model: bool,
}

/// 单行角色推理结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRoleInference {
    #[serde(deserialize_with = "null_as_default")]
    pub text_index: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mood: String,
}

/// 角色推理缓存快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleInferenceData {
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lines: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text_role_inferences: Vec<TextRoleInference>,
}

impl RoleInferenceData {
    /// 按 textIndex 查找推理结果
    pub fn find(&self, text_index: &str) -> Option<&TextRoleInference> {
        self.text_role_inferences
            .iter()
            .find(|inference| inference.text_index == text_index)
    }
}

/// 角色推理流式请求参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInferenceParams {
    pub project_id: String,
    pub chapter_id: String,
    /// 其他透传参数
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoleInferenceParams {
    pub fn new(project_id: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            chapter_id: chapter_id.into(),
            extra: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
