//! Drama Client - 图文有声剧命令行客户端
//!
//! 加载配置 → 初始化日志 → 构造 HttpApiClient → 执行子命令，结果以 JSON 输出到 stdout

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use drama_client::application::ports::{ApiTransport, CallbackHandler, StreamOutcome};
use drama_client::config::{load_config_with_overrides, print_config, AppConfig};
use drama_client::domain::{
    ChapterExpose, ChapterParam, Pagination, RoleInferenceParams, TextChapterPage,
};
use drama_client::{HttpApiClient, ImageDramaApi, ImageProjectApi};

#[derive(Debug, Parser)]
#[command(name = "drama-client", version, about = "图文有声剧后端命令行客户端")]
struct Cli {
    /// 配置文件路径（默认搜索 config.toml / config.local.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的后端地址
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 项目列表
    Projects,
    /// 项目详情
    Project { project_id: String },
    /// 章节分页列表
    Chapters {
        project_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// 章节台词行
    ChapterInfos { project_id: String, chapter_id: String },
    /// 章节角色
    Roles {
        project_id: String,
        chapter_id: String,
        /// 同时列出项目公共角色
        #[arg(long)]
        common: bool,
    },
    /// 流式角色推理，Ctrl-C 取消
    Infer {
        project_id: String,
        chapter_id: String,
        /// 覆盖推理接口地址
        #[arg(long)]
        url: Option<String>,
        /// 覆盖截止时间（秒）
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// 角色推理结果快照
    InferenceCache { project_id: String, chapter_id: String },
    /// 导出章节
    Export {
        project_id: String,
        chapter_id: String,
        /// 台词行 id，逗号分隔；为空表示全部
        #[arg(long, value_delimiter = ',')]
        lines: Vec<i64>,
        #[arg(long)]
        combine_audio: bool,
        #[arg(long)]
        subtitle: bool,
    },
    /// 下载章节合成音频
    ChapterAudio {
        project_id: String,
        chapter_id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// 章节字幕
    Subtitles { project_id: String, chapter_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let overrides: Vec<(&str, String)> = cli
        .base_url
        .iter()
        .map(|url| ("api.base_url", url.clone()))
        .collect();
    let config = load_config_with_overrides(cli.config.as_deref(), &overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    let transport: Arc<dyn ApiTransport> = Arc::new(
        HttpApiClient::from_config(&config).context("Failed to create API client")?,
    );
    let projects = ImageProjectApi::new(transport.clone());
    let drama = ImageDramaApi::new(transport);

    match cli.command {
        Command::Projects => print_json(&projects.project_list().await?)?,
        Command::Project { project_id } => {
            print_json(&projects.get_image_project(&project_id).await?)?
        }
        Command::Chapters {
            project_id,
            page,
            page_size,
        } => {
            let params = TextChapterPage::new(project_id, Pagination::new(page, page_size));
            print_json(&drama.page_chapters(&params).await?)?
        }
        Command::ChapterInfos {
            project_id,
            chapter_id,
        } => print_json(&drama.chapter_infos(&project_id, &chapter_id).await?)?,
        Command::Roles {
            project_id,
            chapter_id,
            common,
        } => {
            print_json(&drama.roles(&project_id, &chapter_id).await?)?;
            if common {
                print_json(&drama.common_roles(&project_id).await?)?;
            }
        }
        Command::Infer {
            project_id,
            chapter_id,
            url,
            timeout,
        } => {
            let url = url.unwrap_or_else(|| config.stream.role_inference_path.clone());
            infer(&drama, &url, project_id, chapter_id, timeout).await?
        }
        Command::InferenceCache {
            project_id,
            chapter_id,
        } => print_json(
            &drama
                .query_role_inference_cache(&project_id, &chapter_id)
                .await?,
        )?,
        Command::Export {
            project_id,
            chapter_id,
            lines,
            combine_audio,
            subtitle,
        } => {
            let params = ChapterExpose {
                project_id,
                chapter_id,
                chapter_info_ids: lines,
                combine_audio,
                subtitle,
            };
            print_json(&drama.chapter_expose(&params).await?)?
        }
        Command::ChapterAudio {
            project_id,
            chapter_id,
            output,
        } => {
            let audio = drama
                .get_chapter_audio(&ChapterParam::new(project_id, chapter_id))
                .await?;
            tokio::fs::write(&output, &audio)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!(path = %output.display(), size = audio.len(), "Chapter audio saved");
        }
        Command::Subtitles {
            project_id,
            chapter_id,
        } => print_json(
            &drama
                .get_chapter_subtitle(&ChapterParam::new(project_id, chapter_id))
                .await?,
        )?,
    }

    Ok(())
}

/// 初始化日志（输出到 stderr，stdout 留给命令结果）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},drama_client={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 流式角色推理：每批消息逐行输出，Ctrl-C 取消
async fn infer(
    drama: &ImageDramaApi,
    url: &str,
    project_id: String,
    chapter_id: String,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let params = RoleInferenceParams::new(project_id, chapter_id);
    let mut stream = drama.role_inference(url, &params)?;
    if let Some(secs) = timeout {
        let options = stream.options().clone().with_timeout(Duration::from_secs(secs));
        stream = stream.with_options(options);
    }

    let token = stream.cancellation_token();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received interrupt, cancelling role inference");
            token.cancel();
        }
    });

    let handler = CallbackHandler::new(|messages: Vec<String>, index: usize| {
        for message in messages {
            println!("[{}] {}", index, message);
        }
    })
    .when_done(|| tracing::info!("Role inference finished"));

    let outcome = stream.run(handler).await;
    watcher.abort();

    match outcome {
        StreamOutcome::Done | StreamOutcome::Cancelled => Ok(()),
        StreamOutcome::Error(error) => Err(anyhow::anyhow!("Role inference failed: {}", error)),
        StreamOutcome::Timeout => Err(anyhow::anyhow!("Role inference timed out")),
    }
}
