use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "GUARDIAN_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "guardian.toml";
const ENV_PREFIX: &str = "GUARDIAN";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SOURCE: &str = "NC Medicaid Dental Fee Schedule";
const DEFAULT_EFFECTIVE_DATE: &str = "2022-02-10";
const DEFAULT_MAX_BATCH_SIZE: usize = 50;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 费率表数据源；路径为空时使用内置数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub fee_schedule_path: Option<PathBuf>,
    #[serde(default)]
    pub zip_areas_path: Option<PathBuf>,
    pub source: String,
    pub effective_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub max_batch_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            schedule: ScheduleConfig {
                fee_schedule_path: None,
                zip_areas_path: None,
                source: DEFAULT_SOURCE.to_string(),
                effective_date: DEFAULT_EFFECTIVE_DATE.to_string(),
            },
            audit: AuditConfig {
                max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            },
        }
    }
}

impl AppConfig {
    /// 分层加载: 默认值 < 配置文件 < GUARDIAN_* 环境变量 < SERVER_HOST/SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Self::defaults()?
            .add_source(File::with_name(&file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?
            .try_deserialize()
    }

    /// 从 TOML 文本加载 (缺省项取默认值)
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("schedule.source", DEFAULT_SOURCE)?
            .set_default("schedule.effective_date", DEFAULT_EFFECTIVE_DATE)?
            .set_default("audit.max_batch_size", DEFAULT_MAX_BATCH_SIZE as i64)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.schedule.effective_date, "2022-02-10");
        assert_eq!(config.schedule.fee_schedule_path, None);
        assert_eq!(config.audit.max_batch_size, 50);
    }

    #[test]
    fn file_overrides_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [schedule]
            fee_schedule_path = "/etc/guardian/fees.csv"
            effective_date = "2024-01-01"

            [audit]
            max_batch_size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(
            config.schedule.fee_schedule_path,
            Some(PathBuf::from("/etc/guardian/fees.csv"))
        );
        assert_eq!(config.schedule.source, "NC Medicaid Dental Fee Schedule");
        assert_eq!(config.schedule.effective_date, "2024-01-01");
        assert_eq!(config.audit.max_batch_size, 5);
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(AppConfig::from_toml("[server]\nport = \"not-a-port\"\n").is_err());
    }

    #[test]
    fn default_matches_layered_defaults() {
        let layered = AppConfig::from_toml("").unwrap();
        let default = AppConfig::default();
        assert_eq!(layered.bind_addr(), default.bind_addr());
        assert_eq!(layered.schedule.source, default.schedule.source);
        assert_eq!(layered.audit.max_batch_size, default.audit.max_batch_size);
    }
}
