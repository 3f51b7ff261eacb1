//! Image Drama API - /api/imageDrama
//!
//! 章节、台词行、角色、音频生成与导出；
//! role_inference 为流式接口，query_role_inference_cache 为其快照读取

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use super::{call, call_list, call_unit, to_body};
use crate::application::ports::{ApiTransport, UploadForm};
use crate::application::ApiError;
use crate::domain::{
    ChapterBatchOperator, ChapterExpose, ChapterInfo, ChapterParam, ImageDrama, PaginationResp,
    PolyphonicEdit, ProjectParam, RoleCombine, RoleInferenceData, StartCreateAudio, Subtitle,
    TextChapterPage, TextRole, TextRoleChange, UpdateControls, UpdateModelInfo,
};
use crate::infrastructure::stream::FetchStream;

const BASE: &str = "/api/imageDrama";

/// 默认的流式角色推理路径
pub const ROLE_INFERENCE_PATH: &str = "/api/imageDrama/roleInference";

fn path(name: &str) -> String {
    format!("{}/{}", BASE, name)
}

/// 图文章节接口
#[derive(Clone)]
pub struct ImageDramaApi {
    transport: Arc<dyn ApiTransport>,
}

impl ImageDramaApi {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    fn transport(&self) -> &dyn ApiTransport {
        self.transport.as_ref()
    }

    async fn unit<P: Serialize + ?Sized>(&self, name: &str, params: &P) -> Result<(), ApiError> {
        call_unit(self.transport(), &path(name), to_body(params)?).await
    }

    async fn list<T, P>(&self, name: &str, params: &P) -> Result<Vec<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
        P: Serialize + ?Sized,
    {
        call_list(self.transport(), &path(name), to_body(params)?).await
    }

    // ========================================================================
    // 章节
    // ========================================================================

    pub async fn page_chapters(
        &self,
        params: &TextChapterPage,
    ) -> Result<PaginationResp<ImageDrama>, ApiError> {
        call(self.transport(), &path("pageChapters"), to_body(params)?).await
    }

    /// 排序用的章节列表
    pub async fn chapters_for_sort(&self, project_id: &str) -> Result<Vec<ImageDrama>, ApiError> {
        self.list("chapters4Sort", &ProjectParam::new(project_id)).await
    }

    pub async fn delete_chapter(&self, chapter: &ImageDrama) -> Result<(), ApiError> {
        tracing::info!(
            project_id = %chapter.project_id,
            chapter_id = %chapter.chapter_id,
            "Deleting chapter"
        );
        self.unit("deleteChapter", chapter).await
    }

    pub async fn get_text_chapter(&self, params: &ChapterParam) -> Result<ImageDrama, ApiError> {
        call(self.transport(), &path("getTextChapter"), to_body(params)?).await
    }

    /// 按对白规则预解析（不落库）
    pub async fn tmp_dialogue_parse(
        &self,
        chapter: &ImageDrama,
    ) -> Result<Vec<ChapterInfo>, ApiError> {
        self.list("tmpDialogueParse", chapter).await
    }

    pub async fn chapter_edit(&self, chapter: &ImageDrama) -> Result<(), ApiError> {
        self.unit("chapterEdit", chapter).await
    }

    /// 上传新章节（multipart）
    pub async fn chapter_add(&self, form: UploadForm) -> Result<(), ApiError> {
        self.transport
            .post_form(&path("chapterAdd"), form)
            .await
            .map(|_| ())
    }

    pub async fn chapter_sort(&self, chapters: &[ImageDrama]) -> Result<(), ApiError> {
        self.unit("chapterSort", chapters).await
    }

    // ========================================================================
    // 台词行
    // ========================================================================

    pub async fn chapter_infos(
        &self,
        project_id: &str,
        chapter_id: &str,
    ) -> Result<Vec<ChapterInfo>, ApiError> {
        self.list("chapterInfos", &ChapterParam::new(project_id, chapter_id))
            .await
    }

    pub async fn chapter_condition(
        &self,
        params: &ChapterParam,
    ) -> Result<Vec<ChapterInfo>, ApiError> {
        self.list("chapterCondition", params).await
    }

    pub async fn update_chapter_text(&self, info: &ChapterInfo) -> Result<(), ApiError> {
        self.unit("updateChapterText", info).await
    }

    pub async fn delete_chapter_info(&self, info: &ChapterInfo) -> Result<(), ApiError> {
        self.unit("deleteChapterInfo", info).await
    }

    pub async fn add_chapter_info(&self, info: &ChapterInfo) -> Result<(), ApiError> {
        self.unit("addChapterInfo", info).await
    }

    pub async fn chapter_info_sort(&self, infos: &[ChapterInfo]) -> Result<(), ApiError> {
        self.unit("chapterInfoSort", infos).await
    }

    pub async fn add_polyphonic_info(&self, edit: &PolyphonicEdit) -> Result<(), ApiError> {
        self.unit("addPolyphonicInfo", edit).await
    }

    pub async fn remove_polyphonic_info(&self, edit: &PolyphonicEdit) -> Result<(), ApiError> {
        self.unit("removePolyphonicInfo", edit).await
    }

    pub async fn batch_operator(&self, op: &ChapterBatchOperator) -> Result<(), ApiError> {
        self.unit("batchOperator", op).await
    }

    // ========================================================================
    // 角色
    // ========================================================================

    pub async fn roles(&self, project_id: &str, chapter_id: &str) -> Result<Vec<TextRole>, ApiError> {
        self.list("roles", &ChapterParam::new(project_id, chapter_id))
            .await
    }

    pub async fn update_role(&self, role: &TextRole) -> Result<(), ApiError> {
        self.unit("updateRole", role).await
    }

    pub async fn update_role_model(&self, info: &UpdateModelInfo) -> Result<(), ApiError> {
        self.unit("updateRoleModel", info).await
    }

    pub async fn role_combine(&self, params: &RoleCombine) -> Result<(), ApiError> {
        self.unit("roleCombine", params).await
    }

    pub async fn text_role_change(&self, params: &TextRoleChange) -> Result<(), ApiError> {
        self.unit("textRoleChange", params).await
    }

    /// 将章节角色提升为项目公共角色
    pub async fn save_to_common_role(&self, role: &TextRole) -> Result<(), ApiError> {
        self.unit("saveToCommonRole", role).await
    }

    pub async fn common_roles(&self, project_id: &str) -> Result<Vec<TextRole>, ApiError> {
        self.list("commonRoles", &ProjectParam::new(project_id)).await
    }

    pub async fn create_common_role(&self, role: &TextRole) -> Result<(), ApiError> {
        self.unit("createCommonRole", role).await
    }

    pub async fn update_common_role(&self, info: &UpdateModelInfo) -> Result<(), ApiError> {
        self.unit("updateCommonRole", info).await
    }

    pub async fn delete_common_role(&self, role: &TextRole) -> Result<(), ApiError> {
        self.unit("deleteCommonRole", role).await
    }

    /// 构造角色推理流式请求
    ///
    /// url 为空时使用 ROLE_INFERENCE_PATH；返回的 FetchStream 需由调用方 run/start
    pub fn role_inference<P: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
    ) -> Result<FetchStream, ApiError> {
        let url = if url.trim().is_empty() {
            ROLE_INFERENCE_PATH
        } else {
            url
        };
        let body = serde_json::to_value(params)?;
        Ok(self.transport.fetch_stream(url, body))
    }

    /// 角色推理结果快照（流结束后刷新页面时使用）
    pub async fn query_role_inference_cache(
        &self,
        project_id: &str,
        chapter_id: &str,
    ) -> Result<RoleInferenceData, ApiError> {
        let params = ChapterParam::new(project_id, chapter_id);
        call(
            self.transport(),
            &path("queryRoleInferenceCache"),
            to_body(&params)?,
        )
        .await
    }

    // ========================================================================
    // 音频参数
    // ========================================================================

    pub async fn audio_model_change(&self, info: &UpdateModelInfo) -> Result<(), ApiError> {
        self.unit("audioModelChange", info).await
    }

    pub async fn update_volume(&self, info: &ChapterInfo) -> Result<(), ApiError> {
        self.unit("updateVolume", info).await
    }

    pub async fn update_speed(&self, info: &ChapterInfo) -> Result<(), ApiError> {
        self.unit("updateSpeed", info).await
    }

    pub async fn update_interval(&self, info: &ChapterInfo) -> Result<(), ApiError> {
        self.unit("updateInterval", info).await
    }

    pub async fn update_controls(&self, params: &UpdateControls) -> Result<(), ApiError> {
        self.unit("updateControls", params).await
    }

    // ========================================================================
    // 音频生成与导出
    // ========================================================================

    /// 生成单行音频，返回音频文件列表
    pub async fn create_audio(&self, info: &ChapterInfo) -> Result<Vec<String>, ApiError> {
        self.list("createAudio", info).await
    }

    pub async fn start_create_audio(
        &self,
        params: &StartCreateAudio,
    ) -> Result<Vec<String>, ApiError> {
        tracing::info!(
            project_id = %params.project_id,
            chapter_id = %params.chapter_id,
            lines = params.chapter_info_ids.len(),
            "Starting audio generation"
        );
        self.list("startCreateAudio", params).await
    }

    pub async fn stop_create_audio(&self) -> Result<(), ApiError> {
        call_unit(self.transport(), &path("stopCreateAudio"), None).await
    }

    pub async fn chapter_expose(&self, params: &ChapterExpose) -> Result<ChapterInfo, ApiError> {
        call(self.transport(), &path("chapterExpose"), to_body(params)?).await
    }

    /// 单行音频（二进制）
    pub async fn play_audio(&self, info: &ChapterInfo) -> Result<Bytes, ApiError> {
        let body = serde_json::to_value(info)?;
        self.transport.post_blob(&path("playAudio"), body).await
    }

    /// 章节合成音频（二进制）
    pub async fn get_chapter_audio(&self, params: &ChapterParam) -> Result<Bytes, ApiError> {
        let body = serde_json::to_value(params)?;
        self.transport.post_blob(&path("getChapterAudio"), body).await
    }

    pub async fn get_chapter_subtitle(
        &self,
        params: &ChapterParam,
    ) -> Result<Vec<Subtitle>, ApiError> {
        self.list("getChapterSubtitle", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioModelInfoKey, Pagination, RoleInferenceParams};
    use crate::test_support::RecordingTransport;
    use serde_json::json;

    fn api() -> (Arc<RecordingTransport>, ImageDramaApi) {
        let transport = Arc::new(RecordingTransport::new());
        (transport.clone(), ImageDramaApi::new(transport))
    }

    #[tokio::test]
    async fn test_page_chapters() {
        let (transport, api) = api();
        transport.respond(
            "/api/imageDrama/pageChapters",
            json!({
                "current": 1,
                "pageSize": 10,
                "total": 11,
                "pages": 2,
                "records": [{"chapterId": "c1", "chapterName": "第一章", "wordNum": 3000}]
            }),
        );

        let page = api
            .page_chapters(&TextChapterPage::new("p1", Pagination::new(1, 10)))
            .await
            .unwrap();

        assert_eq!(page.total, 11);
        assert!(page.has_next());
        assert_eq!(page.records[0].word_num, 3000);
        assert_eq!(
            transport.calls()[0].body,
            Some(json!({"current": 1, "pageSize": 10, "projectId": "p1"}))
        );
    }

    #[tokio::test]
    async fn test_chapter_infos_and_roles_use_chapter_key() {
        let (transport, api) = api();
        transport.respond(
            "/api/imageDrama/chapterInfos",
            json!([{"id": 1, "index": "0-0", "text": "旁白"}]),
        );

        let infos = api.chapter_infos("p1", "c1").await.unwrap();
        assert_eq!(infos[0].index, "0-0");
        assert!(api.roles("p1", "c1").await.unwrap().is_empty());

        let calls = transport.calls();
        assert_eq!(calls[1].path, "/api/imageDrama/roles");
        for call in &calls {
            assert_eq!(call.body, Some(json!({"projectId": "p1", "chapterId": "c1"})));
        }
    }

    #[tokio::test]
    async fn test_paths_for_unit_operations() {
        let (transport, api) = api();
        let info = ChapterInfo::default();
        let role = TextRole::default();
        let model = UpdateModelInfo {
            chapter: ChapterParam::new("p1", "c1"),
            model: AudioModelInfoKey::default(),
            ids: None,
        };

        api.update_volume(&info).await.unwrap();
        api.update_speed(&info).await.unwrap();
        api.update_interval(&info).await.unwrap();
        api.update_role(&role).await.unwrap();
        api.update_common_role(&model).await.unwrap();
        api.audio_model_change(&model).await.unwrap();
        api.stop_create_audio().await.unwrap();

        let paths: Vec<String> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            vec![
                "/api/imageDrama/updateVolume",
                "/api/imageDrama/updateSpeed",
                "/api/imageDrama/updateInterval",
                "/api/imageDrama/updateRole",
                "/api/imageDrama/updateCommonRole",
                "/api/imageDrama/audioModelChange",
                "/api/imageDrama/stopCreateAudio",
            ]
        );
        assert_eq!(transport.calls().last().unwrap().body, None);
    }

    #[tokio::test]
    async fn test_chapter_sort_sends_array() {
        let (transport, api) = api();
        let chapters = vec![
            ImageDrama {
                chapter_id: "c2".to_string(),
                sort_order: 1,
                ..Default::default()
            },
            ImageDrama {
                chapter_id: "c1".to_string(),
                sort_order: 2,
                ..Default::default()
            },
        ];
        api.chapter_sort(&chapters).await.unwrap();

        let body = transport.calls()[0].body.clone().unwrap();
        assert_eq!(body[0]["chapterId"], "c2");
        assert_eq!(body[1]["sortOrder"], 2);
    }

    #[tokio::test]
    async fn test_role_inference_builds_stream_request() {
        let (_transport, api) = api();
        let params = RoleInferenceParams::new("p1", "c1");

        let stream = api.role_inference("", &params).unwrap();
        assert_eq!(stream.url(), ROLE_INFERENCE_PATH);
        assert_eq!(stream.body(), &json!({"projectId": "p1", "chapterId": "c1"}));

        let custom = api
            .role_inference("/api/imageDrama/roleInferenceV2", &params)
            .unwrap();
        assert_eq!(custom.url(), "/api/imageDrama/roleInferenceV2");
    }

    #[tokio::test]
    async fn test_query_role_inference_cache() {
        let (transport, api) = api();
        transport.respond(
            "/api/imageDrama/queryRoleInferenceCache",
            json!({
                "content": "raw",
                "lines": "0-0,0-1",
                "textRoleInferences": [
                    {"textIndex": "0-1", "role": "乙", "gender": "男", "age": "中年", "mood": "愤怒"}
                ]
            }),
        );

        let data = api.query_role_inference_cache("p1", "c1").await.unwrap();
        assert_eq!(data.find("0-1").unwrap().mood, "愤怒");
    }

    #[tokio::test]
    async fn test_start_create_audio_returns_files() {
        let (transport, api) = api();
        transport.respond("/api/imageDrama/startCreateAudio", json!(["a.wav", "b.wav"]));

        let files = api
            .start_create_audio(&StartCreateAudio {
                project_id: "p1".to_string(),
                chapter_id: "c1".to_string(),
                action_type: "all".to_string(),
                chapter_info_ids: vec![1, 2],
            })
            .await
            .unwrap();
        assert_eq!(files, vec!["a.wav", "b.wav"]);
        assert_eq!(transport.calls()[0].body.as_ref().unwrap()["actionType"], "all");
    }

    #[tokio::test]
    async fn test_chapter_expose_returns_info() {
        let (transport, api) = api();
        transport.respond("/api/imageDrama/chapterExpose", json!({"audioFiles": "out.wav"}));

        let info = api
            .chapter_expose(&ChapterExpose {
                project_id: "p1".to_string(),
                chapter_id: "c1".to_string(),
                chapter_info_ids: vec![],
                combine_audio: true,
                subtitle: true,
            })
            .await
            .unwrap();
        assert_eq!(info.audio_file_list(), vec!["out.wav"]);
        assert_eq!(transport.calls()[0].body.as_ref().unwrap()["combineAudio"], true);
    }

    #[tokio::test]
    async fn test_blob_endpoints() {
        let (transport, api) = api();
        transport.respond_blob("/api/imageDrama/getChapterAudio", Bytes::from_static(b"RIFF"));

        let audio = api
            .get_chapter_audio(&ChapterParam::new("p1", "c1"))
            .await
            .unwrap();
        assert_eq!(&audio[..], b"RIFF");

        let calls = transport.calls();
        assert_eq!(calls[0].path, "/api/imageDrama/getChapterAudio");
        assert_eq!(calls[0].body, Some(json!({"projectId": "p1", "chapterId": "c1"})));
    }

    #[tokio::test]
    async fn test_chapter_add_uses_form() {
        let (transport, api) = api();
        let form = UploadForm::new()
            .text("projectId", "p1")
            .file("file", "chapter.txt", b"...".to_vec());
        api.chapter_add(form).await.unwrap();

        let forms = transport.forms();
        assert_eq!(forms[0].0, "/api/imageDrama/chapterAdd");
        assert_eq!(forms[0].1.field("projectId"), Some("p1"));
    }

    #[tokio::test]
    async fn test_subtitles() {
        let (transport, api) = api();
        transport.respond(
            "/api/imageDrama/getChapterSubtitle",
            json!([{"startTime": 0, "endTime": 1200, "text": "你好"}]),
        );
        let subs = api
            .get_chapter_subtitle(&ChapterParam::new("p1", "c1"))
            .await
            .unwrap();
        assert_eq!(subs[0].duration_ms(), 1200);
    }
}
