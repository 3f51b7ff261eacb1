//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行覆盖项
//! 2. 环境变量
//! 3. 配置文件（config.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::infrastructure::stream::DEFAULT_MAX_BUFFER_BYTES;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `DRAMA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `DRAMA_API__BASE_URL=http://backend:8080`
/// - `DRAMA_API__SUCCESS_CODES=200,0`
/// - `DRAMA_STREAM__TIMEOUT_SECS=120`
/// - `DRAMA_STREAM__FRAMING=sse`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with_overrides(config_path, &[])
}

/// 加载配置并应用命令行覆盖项
///
/// 覆盖项优先级高于环境变量，合并后同样经过校验
///
/// # 参数
/// - `overrides` - (键, 值) 列表，键为点分路径，如 `api.base_url`
pub fn load_config_with_overrides(
    config_path: Option<&Path>,
    overrides: &[(&str, String)],
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("api.base_url", "http://localhost:8080")?
        .set_default("api.timeout_secs", 30)?
        .set_default("api.connect_timeout_secs", 10)?
        .set_default("stream.timeout_secs", 60)?
        .set_default("stream.framing", "lines")?
        .set_default("stream.max_buffer_bytes", DEFAULT_MAX_BUFFER_BYTES as i64)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量
    // 例如: DRAMA_API__BASE_URL=http://backend:8080
    // success_codes 以逗号分隔
    builder = builder.add_source(
        Environment::with_prefix("DRAMA")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("api.success_codes")
            .try_parsing(true),
    );

    // 4. 命令行覆盖项
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let base_url = &config.api.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "API base URL must be http(s), got {:?}",
            base_url
        )));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "API timeout cannot be 0".to_string(),
        ));
    }

    if config.api.success_codes.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one success code is required".to_string(),
        ));
    }

    if config.stream.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Stream timeout cannot be 0".to_string(),
        ));
    }

    if config.stream.max_buffer_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Stream buffer size cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("API Base URL: {}", config.api.base_url);
    tracing::info!("API Timeout: {}s", config.api.timeout_secs);
    tracing::info!("Success Codes: {:?}", config.api.success_codes);
    // 只打印请求头名称，值可能含有凭据
    let mut header_names: Vec<&String> = config.api.headers.keys().collect();
    header_names.sort();
    tracing::info!("Default Headers: {:?}", header_names);
    tracing::info!("Stream Timeout: {}s", config.stream.timeout_secs);
    tracing::info!("Stream Framing: {}", config.stream.framing.as_str());
    tracing::info!("Role Inference Path: {}", config.stream.role_inference_path);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::stream::Framing;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validation_passes_for_default_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validation_error_for_bad_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = "backend:8080".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_timeouts() {
        let mut config = AppConfig::default();
        config.stream.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_success_codes() {
        let mut config = AppConfig::default();
        config.api.success_codes.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[api]
base_url = "http://backend:9000"
success_codes = ["0"]

[api.headers]
Authorization = "Bearer abc"

[stream]
timeout_secs = 5
framing = "sse"

[log]
json = true
"#,
        );

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.success_codes, vec!["0"]);
        assert_eq!(config.stream.timeout_secs, 5);
        assert_eq!(config.stream.framing, Framing::Sse);
        assert_eq!(config.stream.max_buffer_bytes, DEFAULT_MAX_BUFFER_BYTES);
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
        assert!(!config.api.headers.is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let file = write_config(
            r#"
[stream]
timeout_secs = 0
"#,
        );
        assert!(matches!(
            load_config_from_path(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_override_replaces_file_value() {
        let file = write_config(
            r#"
[api]
base_url = "http://backend:9000"
"#,
        );
        let overrides = [("api.base_url", "https://other:8443".to_string())];

        let config = load_config_with_overrides(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.api.base_url, "https://other:8443");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let file = write_config("");
        let overrides = [("api.base_url", "backend:8080".to_string())];

        assert!(matches!(
            load_config_with_overrides(Some(file.path()), &overrides),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = load_config_from_path(Some(Path::new("/nonexistent/drama.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
