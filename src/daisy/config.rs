//! 读取器配置模块
//!
//! 提供读取器的配置管理功能，支持从YAML文件加载配置。

use crate::daisy::document::Format;
use crate::daisy::error::{DaisyError, Result};
use crate::daisy::logging::Verbosity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 默认配置文件名
pub const DEFAULT_CONFIG_PATH: &str = "daisyforge.yaml";

/// 读取器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// 日志详细程度
    #[serde(default)]
    pub verbosity: Verbosity,
    /// 加载时使用的格式，`auto` 表示根据文件名识别
    #[serde(default)]
    pub format: Format,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl ReaderConfig {
    /// 获取默认配置
    pub fn default_config() -> Self {
        Self {
            verbosity: Verbosity::Info,
            format: Format::Auto,
        }
    }

    /// 从指定的YAML文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DaisyError::Config(format!("无法读取配置文件: {}", e)))?;

        serde_yml::from_str(&content)
            .map_err(|e| DaisyError::Config(format!("配置文件格式错误: {}", e)))
    }

    /// 生成默认配置文件
    ///
    /// # 参数
    /// * `path` - 写入的配置文件路径
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yml::to_string(&Self::default_config())
            .map_err(|e| DaisyError::Config(format!("序列化配置失败: {}", e)))?;

        let content_with_header = format!(
            "# daisyforge 配置文件\n# verbosity: none | verbose | info | warning | error | critical\n# format: auto | ncc | ncx\n\n{}",
            yaml_content
        );

        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| DaisyError::Config(format!("写入配置文件失败: {}", e)))
    }

    /// 尝试从文件加载配置，文件不存在时使用默认配置
    ///
    /// 文件存在但内容有误时返回错误。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default_config())
        }
    }
}
