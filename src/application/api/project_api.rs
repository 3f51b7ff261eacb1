//! Image Project API - /api/imageProject

use std::sync::Arc;

use super::{call, call_list, call_unit, to_body};
use crate::application::ports::{ApiTransport, UploadForm};
use crate::application::ApiError;
use crate::domain::{
    ChapterSplitParams, CreateFormatImageProject, ImageProject, ProjectParam,
};

const BASE: &str = "/api/imageProject";

fn path(name: &str) -> String {
    format!("{}/{}", BASE, name)
}

/// 图文项目接口
#[derive(Clone)]
pub struct ImageProjectApi {
    transport: Arc<dyn ApiTransport>,
}

impl ImageProjectApi {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    fn transport(&self) -> &dyn ApiTransport {
        self.transport.as_ref()
    }

    /// 上传文本创建项目（multipart）
    pub async fn create_project(&self, form: UploadForm) -> Result<(), ApiError> {
        self.transport
            .post_form(&path("createProject"), form)
            .await
            .map(|_| ())
    }

    pub async fn create_format_image_project(
        &self,
        params: &CreateFormatImageProject,
    ) -> Result<(), ApiError> {
        call_unit(
            self.transport(),
            &path("createFormatImageProject"),
            to_body(params)?,
        )
        .await
    }

    pub async fn project_list(&self) -> Result<Vec<ImageProject>, ApiError> {
        call_list(self.transport(), &path("projectList"), None).await
    }

    pub async fn get_image_project(&self, project_id: &str) -> Result<ImageProject, ApiError> {
        let params = ProjectParam::new(project_id);
        call(self.transport(), &path("getImageProject"), to_body(&params)?).await
    }

    /// 预览切分结果（不落库），返回章节标题
    pub async fn tmp_chapter_split(
        &self,
        params: &ChapterSplitParams,
    ) -> Result<Vec<String>, ApiError> {
        call_list(self.transport(), &path("tmpChapterSplit"), to_body(params)?).await
    }

    pub async fn chapter_split(&self, params: &ChapterSplitParams) -> Result<(), ApiError> {
        call_unit(self.transport(), &path("chapterSplit"), to_body(params)?).await
    }

    pub async fn delete_project(&self, project: &ImageProject) -> Result<(), ApiError> {
        tracing::info!(project_id = %project.project_id, "Deleting image project");
        call_unit(self.transport(), &path("deleteProject"), to_body(project)?).await
    }
}
