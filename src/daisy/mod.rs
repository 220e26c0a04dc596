pub mod check;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod ncc;
pub mod reader;
pub mod smil;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_fixtures;

// 重新导出错误处理
pub use error::{DaisyError, Result};

// 重新导出配置与日志
pub use config::{ReaderConfig, DEFAULT_CONFIG_PATH};
pub use logging::{LogHandle, Verbosity};

// 重新导出读取器和文档
pub use document::{Document, Format};
pub use navigation::HeadingPath;
pub use reader::Daisy;

// 重新导出数据模型
pub use model::{BookInfo, Chapter, ChapterKind, HeadingLevel, Passage, Spine, SpineEntry};

// 重新导出解析结果
pub use ncc::NccOutcome;
pub use smil::SmilOutcome;
