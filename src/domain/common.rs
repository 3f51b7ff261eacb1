//! Common Types - 通用类型
//!
//! 分页、音频任务状态、事件类型、项目类型

use serde::{Deserialize, Deserializer, Serialize};

/// 后端未赋值的列可能以 null 下发，按类型默认值处理
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// 分页请求参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 当前页（从 1 开始）
    pub current: u32,
    /// 每页条数
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
}

impl Pagination {
    pub fn new(current: u32, page_size: u32) -> Self {
        Self {
            current,
            page_size,
            total: None,
            pages: None,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// 分页响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResp<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: u64,
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub records: Vec<T>,
}

impl<T> PaginationResp<T> {
    /// 是否还有下一页
    pub fn has_next(&self) -> bool {
        u64::from(self.current) < self.pages
    }
}

/// 音频生成任务状态
///
/// 后端以数字传输：0..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AudioTaskState {
    #[default]
    Init,
    Process,
    Modified,
    Created,
    Combined,
}

impl AudioTaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioTaskState::Init => "init",
            AudioTaskState::Process => "process",
            AudioTaskState::Modified => "modified",
            AudioTaskState::Created => "created",
            AudioTaskState::Combined => "combined",
        }
    }

    /// 音频是否已生成（含合并完成）
    pub fn has_audio(&self) -> bool {
        matches!(self, AudioTaskState::Created | AudioTaskState::Combined)
    }
}

impl TryFrom<u8> for AudioTaskState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AudioTaskState::Init),
            1 => Ok(AudioTaskState::Process),
            2 => Ok(AudioTaskState::Modified),
            3 => Ok(AudioTaskState::Created),
            4 => Ok(AudioTaskState::Combined),
            other => Err(format!("unknown audio task state: {}", other)),
        }
    }
}

impl From<AudioTaskState> for u8 {
    fn from(state: AudioTaskState) -> Self {
        match state {
            AudioTaskState::Init => 0,
            AudioTaskState::Process => 1,
            AudioTaskState::Modified => 2,
            AudioTaskState::Created => 3,
            AudioTaskState::Combined => 4,
        }
    }
}

/// 服务端推送事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ChapterRefresh,
    ChapterTitleRefresh,
    ChapterInfoRefresh,
    ChapterRoleRefresh,
    AudioGenerateResult,
    AudioGenerateSummary,
    ImageGenerateStart,
    ImageGenerateProgress,
    ImageGenerateResult,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ChapterRefresh => "chapter_refresh",
            EventType::ChapterTitleRefresh => "chapter_title_refresh",
            EventType::ChapterInfoRefresh => "chapter_info_refresh",
            EventType::ChapterRoleRefresh => "chapter_role_refresh",
            EventType::AudioGenerateResult => "audio_generate_result",
            EventType::AudioGenerateSummary => "audio_generate_summary",
            EventType::ImageGenerateStart => "image_generate_start",
            EventType::ImageGenerateProgress => "image_generate_progress",
            EventType::ImageGenerateResult => "image_generate_result",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "chapter_refresh" => Some(EventType::ChapterRefresh),
            "chapter_title_refresh" => Some(EventType::ChapterTitleRefresh),
            "chapter_info_refresh" => Some(EventType::ChapterInfoRefresh),
            "chapter_role_refresh" => Some(EventType::ChapterRoleRefresh),
            "audio_generate_result" => Some(EventType::AudioGenerateResult),
            "audio_generate_summary" => Some(EventType::AudioGenerateSummary),
            "image_generate_start" => Some(EventType::ImageGenerateStart),
            "image_generate_progress" => Some(EventType::ImageGenerateProgress),
            "image_generate_result" => Some(EventType::ImageGenerateResult),
            _ => None,
        }
    }

    /// 需要刷新章节视图的事件
    pub fn is_chapter_refresh(&self) -> bool {
        matches!(
            self,
            EventType::ChapterRefresh
                | EventType::ChapterTitleRefresh
                | EventType::ChapterInfoRefresh
                | EventType::ChapterRoleRefresh
        )
    }
}

/// 文本项目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextProjectType {
    #[default]
    LongText,
    ShortText,
    FormatText,
}

impl TextProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextProjectType::LongText => "long_text",
            TextProjectType::ShortText => "short_text",
            TextProjectType::FormatText => "format_text",
        }
    }
}

impl std::fmt::Display for TextProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
