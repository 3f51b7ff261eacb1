//! Chapter Types - 章节与台词行
//!
//! ImageDrama 为章节，ChapterInfo 为章节中的最小文本单元（句/段）

use serde::{Deserialize, Serialize};

use super::common::{null_as_default, AudioTaskState, Pagination};
use super::role::AudioRoleInfo;

/// 章节定位参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterParam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
}

impl ChapterParam {
    pub fn new(project_id: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            chapter_id: Some(chapter_id.into()),
        }
    }

    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            chapter_id: None,
        }
    }
}

/// 章节
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageDrama {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub chapter_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub chapter_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dialogue_pattern: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sort_order: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub word_num: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub text_num: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub dialogue_num: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub role_num: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub image_task_state: i32,
}

/// 章节分页查询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChapterPage {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub project_id: String,
}

impl TextChapterPage {
    pub fn new(project_id: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            pagination,
            project_id: project_id.into(),
        }
    }
}

/// 多音字标注
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolyphonicInfo {
    /// 字符在文本中的位置
    #[serde(deserialize_with = "null_as_default")]
    pub index: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub markup: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextMarkupInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub polyphonic_infos: Vec<PolyphonicInfo>,
}

/// 台词行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    /// 段落-句子 索引，如 "3-1"
    #[serde(deserialize_with = "null_as_default")]
    pub index: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub chapter_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub para_index: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub sent_index: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub text_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text_lang: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text_sort: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub dialogue_flag: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_volume: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_speed: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_interval: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_length: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_task_state: AudioTaskState,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_files: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text_markup_info: TextMarkupInfo,
    #[serde(flatten)]
    pub role_info: AudioRoleInfo,
}

impl ChapterInfo {
    /// 生成的音频文件列表（逗号分隔）
    pub fn audio_file_list(&self) -> Vec<&str> {
        self.audio_files
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect()
    }
}

/// 多音字编辑参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyphonicEdit {
    #[serde(flatten)]
    pub info: PolyphonicInfo,
    pub chapter_info_id: i64,
}

/// 批量调整音量/语速/间隔
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateControls {
    pub project_id: String,
    pub chapter_id: String,
    pub chapter_info_ids: Vec<i64>,
    pub enable_volume: bool,
    pub volume: f64,
    pub enable_speed: bool,
    pub speed: f64,
    pub enable_interval: bool,
    pub interval: i64,
}

/// 开始批量生成音频
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCreateAudio {
    pub project_id: String,
    pub chapter_id: String,
    /// 如 "all" / "modified"，由后端解释
    pub action_type: String,
    pub chapter_info_ids: Vec<i64>,
}

/// 导出章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterExpose {
    pub project_id: String,
    pub chapter_id: String,
    pub chapter_info_ids: Vec<i64>,
    pub combine_audio: bool,
    pub subtitle: bool,
}

/// 字幕条目（毫秒）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subtitle {
    #[serde(deserialize_with = "null_as_default")]
    pub start_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub end_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
}

impl Subtitle {
    pub fn duration_ms(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// 批量操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOperatorType {
    DialogueMarkup,
    Delete,
}

/// 台词行批量操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterBatchOperator {
    #[serde(flatten)]
    pub chapter: ChapterParam,
    pub chapter_info_ids: Vec<i64>,
    pub operator_type: BatchOperatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
}

impl ChapterBatchOperator {
    /// 标记/取消标记为对白
    pub fn dialogue_markup(chapter: ChapterParam, ids: Vec<i64>, dialogue: bool) -> Self {
        Self {
            chapter,
            chapter_info_ids: ids,
            operator_type: BatchOperatorType::DialogueMarkup,
            boolean_value: Some(dialogue),
        }
    }

    pub fn delete(chapter: ChapterParam, ids: Vec<i64>) -> Self {
        Self {
            chapter,
            chapter_info_ids: ids,
            operator_type: BatchOperatorType::Delete,
            boolean_value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chapter_info_decodes_partial_payload() {
        let info: ChapterInfo = serde_json::from_value(json!({
            "id": 12,
            "index": "3-1",
            "text": "“你好。”",
            "dialogueFlag": true,
            "audioTaskState": 3,
            "audioFiles": "a.wav, b.wav,",
            "role": "甲",
            "textMarkupInfo": {"polyphonicInfos": [{"index": 2, "markup": "hao3"}]}
        }))
        .unwrap();

        assert_eq!(info.index, "3-1");
        assert!(info.dialogue_flag);
        assert_eq!(info.audio_task_state, AudioTaskState::Created);
        assert_eq!(info.audio_file_list(), vec!["a.wav", "b.wav"]);
        assert_eq!(info.role_info.role.as_deref(), Some("甲"));
        assert_eq!(info.text_markup_info.polyphonic_infos[0].markup, "hao3");
    }

    #[test]
    fn test_chapter_info_null_columns_decode_as_defaults() {
        let info: ChapterInfo = serde_json::from_value(json!({
            "id": 1,
            "textLang": null,
            "audioVolume": null,
            "audioTaskState": null,
            "textMarkupInfo": null,
            "audioFiles": null,
            "role": null
        }))
        .unwrap();

        assert_eq!(info.id, 1);
        assert!(info.text_lang.is_empty());
        assert_eq!(info.audio_volume, 0.0);
        assert_eq!(info.audio_task_state, AudioTaskState::Init);
        assert!(info.text_markup_info.polyphonic_infos.is_empty());
        assert!(info.audio_file_list().is_empty());
        assert_eq!(info.role_info.role, None);
    }

    #[test]
    fn test_image_drama_null_columns_decode_as_defaults() {
        let chapters: Vec<ImageDrama> = serde_json::from_value(json!([
            {"chapterId": "c1", "dialoguePattern": null, "wordNum": null},
            {"chapterId": "c2", "chapterName": "第二章"}
        ]))
        .unwrap();

        assert_eq!(chapters.len(), 2);
        assert!(chapters[0].dialogue_pattern.is_empty());
        assert_eq!(chapters[0].word_num, 0);
        assert_eq!(chapters[1].chapter_name, "第二章");
    }

    #[test]
    fn test_chapter_page_flattens_pagination() {
        let page = TextChapterPage::new("p1", Pagination::new(1, 50));
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"current": 1, "pageSize": 50, "projectId": "p1"})
        );
    }

    #[test]
    fn test_batch_operator_wire_format() {
        let op = ChapterBatchOperator::dialogue_markup(ChapterParam::new("p1", "c1"), vec![1], false);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "projectId": "p1",
                "chapterId": "c1",
                "chapterInfoIds": [1],
                "operatorType": "dialogue_markup",
                "booleanValue": false
            })
        );

        let del = ChapterBatchOperator::delete(ChapterParam::new("p1", "c1"), vec![2, 3]);
        let json = serde_json::to_value(&del).unwrap();
        assert_eq!(json["operatorType"], "delete");
        assert!(json.get("booleanValue").is_none());
    }

    #[test]
    fn test_polyphonic_edit_flattens_info() {
        let edit = PolyphonicEdit {
            info: PolyphonicInfo {
                index: 4,
                markup: "zhong4".to_string(),
            },
            chapter_info_id: 99,
        };
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({"index": 4, "markup": "zhong4", "chapterInfoId": 99})
        );
    }

    #[test]
    fn test_chapter_param_skips_missing_ids() {
        assert_eq!(
            serde_json::to_value(ChapterParam::project("p1")).unwrap(),
            json!({"projectId": "p1"})
        );
    }

    #[test]
    fn test_subtitle_duration() {
        let sub = Subtitle {
            start_time: 1000,
            end_time: 2500,
            text: "x".to_string(),
        };
        assert_eq!(sub.duration_ms(), 1500);
    }
}
