use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaisyError>;

/// Daisy有声读物相关的错误类型
#[derive(Error, Debug)]
pub enum DaisyError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("XML解析错误: {0}")]
    Xml(#[from] quick_xml::Error),

    /// 文档缺少无法继续解析的必要元素或属性
    #[error("{file} 结构错误: {reason}")]
    StructuralViolation { file: String, reason: String },

    #[error("不支持的有声读物格式: {0}")]
    UnsupportedFormat(String),

    /// 定位目标超出了脊柱范围
    #[error("{what} 超出范围: {target}")]
    OutOfRange { what: &'static str, target: u64 },

    #[error("尚未加载任何有声读物")]
    NotLoaded,

    #[error("当前没有段落可读取")]
    NoPassage,

    #[error("配置文件错误: {0}")]
    Config(String),
}

impl DaisyError {
    /// 创建结构错误
    pub fn structural(file: impl Into<String>, reason: impl Into<String>) -> Self {
        DaisyError::StructuralViolation {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// 是否为导航越界错误
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, DaisyError::OutOfRange { .. })
    }
}
