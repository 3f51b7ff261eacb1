//! Domain Layer - 领域类型
//!
//! 与后端约定的请求/响应结构（JSON 字段为 camelCase）：
//! - project: 图文项目
//! - chapter: 章节、台词行、字幕、批量操作
//! - role: 角色、音色模型、角色推理
//! - common: 分页、任务状态、事件类型

pub mod chapter;
pub mod common;
pub mod project;
pub mod role;

pub use chapter::{
    BatchOperatorType, ChapterBatchOperator, ChapterExpose, ChapterInfo, ChapterParam,
    ImageDrama, PolyphonicEdit, PolyphonicInfo, StartCreateAudio, Subtitle, TextChapterPage,
    TextMarkupInfo, UpdateControls,
};
pub use common::{AudioTaskState, EventType, Pagination, PaginationResp, TextProjectType};
pub use project::{ChapterSplitParams, CreateFormatImageProject, ImageProject, ProjectParam};
pub use role::{
    AudioModelInfo, AudioModelInfoKey, AudioRoleInfo, RoleCombine, RoleInferenceData,
    RoleInferenceParams, TextRole, TextRoleChange, TextRoleInference, UpdateModelInfo,
};
