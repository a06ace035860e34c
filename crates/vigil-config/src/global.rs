use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::thresholds::Thresholds;
use vigil_notify::{EmailConfig, WebhookConfig};

/// 全局配置
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GlobalConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    /// SMTP 配置缺失时邮件投递退化为本地回显，属正常路径
    #[serde(default)]
    pub email: Option<EmailConfig>,

    #[serde(default)]
    pub webhook: Option<WebhookConfig>,

    #[serde(default)]
    pub ui: UiConfig,
}

/// 记录存储配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("log.db"),
            table: "system_log".to_string(),
        }
    }
}

/// 界面配置：dark_mode 纯展示用，核心流水线不读取
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub dark_mode: bool,
}
