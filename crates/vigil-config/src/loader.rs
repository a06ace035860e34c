use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};

use crate::GlobalConfig;

/// 配置加载器
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// 加载全局配置
    pub fn load(&self) -> Result<GlobalConfig> {
        if !self.config_path.exists() {
            // 配置文件不存在时返回默认配置
            return Ok(GlobalConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                self.config_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        let global: GlobalConfig = config.try_deserialize()?;
        self.validate(&global)?;
        Ok(global)
    }

    /// 校验配置
    fn validate(&self, config: &GlobalConfig) -> Result<()> {
        config
            .thresholds
            .validate()
            .map_err(|e| anyhow!(e.to_string()))?;

        if config.store.table.is_empty() {
            return Err(anyhow!("store.table must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new("/nonexistent/vigil.toml");
        let config = loader.load().unwrap();
        assert_eq!(config.thresholds.cpu, 80.0);
        assert_eq!(config.store.table, "system_log");
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[store]
path = "telemetry.db"
table = "host_log"

[thresholds]
cpu = 75.0
memory = 85.0
disk = 90.0

[ui]
dark_mode = true
"#
        )
        .unwrap();

        let loader = ConfigLoader::new(file.path());
        let config = loader.load().unwrap();
        assert_eq!(config.store.table, "host_log");
        assert_eq!(config.thresholds.cpu, 75.0);
        assert!(config.ui.dark_mode);
        assert!(config.email.is_none());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[thresholds]
cpu = 150.0
memory = 85.0
disk = 90.0
"#
        )
        .unwrap();

        let loader = ConfigLoader::new(file.path());
        assert!(loader.load().is_err());
    }
}
