pub mod daisy;

// === 核心API重新导出 ===

/// 有声读物读取器（主要接口）
pub use daisy::Daisy;

/// 错误处理
pub use daisy::{DaisyError, Result};

// === 数据结构 ===

/// 已加载的文档和格式
pub use daisy::{Document, Format};

/// 书籍基本信息
pub use daisy::BookInfo;

/// 章节、段落和标题路径
pub use daisy::{Chapter, ChapterKind, HeadingLevel, HeadingPath, Passage};

// === 配置与日志 ===

pub use daisy::{LogHandle, ReaderConfig, Verbosity};

// === 底层组件（高级用法） ===

/// 脊柱
pub use daisy::{Spine, SpineEntry};

/// 解析结果
pub use daisy::{NccOutcome, SmilOutcome};

// === 库信息 ===

/// DaisyForge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// DaisyForge库的描述
pub const DESCRIPTION: &str = "一个用于解析和导航Daisy 2.02有声读物的库";

// === 便捷函数 ===

/// 快速打开有声读物
///
/// 使用默认配置创建 [`Daisy`]，并根据文件名识别格式后加载。
///
/// # 参数
/// * `path` - `ncc.html` 的路径
///
/// # 返回值
/// * `Result<Daisy>` - 已加载的读取器
///
/// # 示例
///
/// ```no_run
/// let mut daisy = daisyforge::open("book/ncc.html")?;
/// println!("书名: {:?}", daisy.book_info()?.title());
/// daisy.seek(Some(2), Some(1))?;
/// println!("音频: {:?}", daisy.passage()?.audio_uri);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Daisy> {
    let mut daisy = Daisy::default();
    daisy.load(path, Format::Auto)?;
    Ok(daisy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::test_fixtures::{book_files, write_book};

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        println!("DaisyForge version: {}", VERSION);
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_open() {
        let dir = write_book(&book_files());
        let daisy = open(dir.path().join("ncc.html")).unwrap();
        assert!(daisy.is_loaded());
        assert_eq!(daisy.chapter_count().unwrap(), 5);
    }

    #[test]
    fn test_open_unknown_format() {
        let dir = write_book(&book_files());
        let err = open(dir.path().join("chap1.smil")).unwrap_err();
        assert!(matches!(err, DaisyError::UnsupportedFormat(_)));
    }
}
