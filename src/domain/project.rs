//! Project Types - 图文项目

use serde::{Deserialize, Serialize};

use super::chapter::ChapterInfo;
use super::common::{null_as_default, TextProjectType};

/// 图文项目
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProject {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub chapter_count: u32,
}

impl ImageProject {
    /// 解析项目类型，未知类型返回 None
    pub fn text_project_type(&self) -> Option<TextProjectType> {
        serde_json::from_value(serde_json::Value::String(self.project_type.clone())).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParam {
    pub project_id: String,
}

impl ProjectParam {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

/// 以格式化文本创建项目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormatImageProject {
    pub project_name: String,
    pub project_type: TextProjectType,
    pub chapter_infos: Vec<ChapterInfo>,
}

/// 章节切分参数（正则）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSplitParams {
    pub project_id: String,
    pub chapter_pattern: String,
    pub dialogue_pattern: String,
}
