//! 读取器模块
//!
//! [`Daisy`] 句柄持有配置和至多一个已加载的文档，对外提供加载、卸载、导航和字段读取。

use crate::daisy::config::ReaderConfig;
use crate::daisy::document::{Document, Format};
use crate::daisy::error::{DaisyError, Result};
use crate::daisy::logging::{LogHandle, Verbosity};
use crate::daisy::model::{BookInfo, Chapter, Passage, SpineEntry};
use crate::daisy::navigation::HeadingPath;
use std::path::Path;
use tracing::info;

/// Daisy有声读物读取器
#[derive(Debug)]
pub struct Daisy {
    config: ReaderConfig,
    log: Option<LogHandle>,
    document: Option<Document>,
}

impl Default for Daisy {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

impl Daisy {
    /// 创建读取器，尚未加载任何文档
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            log: None,
            document: None,
        }
    }

    /// 关联已安装的日志订阅者，之后的 [`Daisy::set_verbosity`] 会同步修改它
    pub fn with_log_handle(mut self, handle: LogHandle) -> Self {
        self.log = Some(handle);
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// 加载有声读物，先丢弃之前的文档
    ///
    /// # 参数
    /// * `path` - `ncc.html` 的路径
    /// * `format` - 文档格式，`Auto` 时使用配置中的格式
    pub fn load<P: AsRef<Path>>(&mut self, path: P, format: Format) -> Result<()> {
        self.unload();
        let format = match format {
            Format::Auto => self.config.format,
            explicit => explicit,
        };
        self.document = Some(Document::load(path, format)?);
        Ok(())
    }

    /// 卸载当前文档
    pub fn unload(&mut self) {
        if self.document.take().is_some() {
            info!("已卸载有声读物");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// 当前文档
    pub fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(DaisyError::NotLoaded)
    }

    fn document_mut(&mut self) -> Result<&mut Document> {
        self.document.as_mut().ok_or(DaisyError::NotLoaded)
    }

    /// 解析过程中是否出现过一致性诊断
    pub fn is_degraded(&self) -> Result<bool> {
        Ok(self.document()?.is_degraded())
    }

    pub fn book_info(&self) -> Result<&BookInfo> {
        Ok(self.document()?.book_info())
    }

    pub fn chapter_count(&self) -> Result<usize> {
        Ok(self.document()?.chapter_count())
    }

    /// 当前章节，文档没有任何章节时返回 [`DaisyError::OutOfRange`]
    pub fn chapter(&self) -> Result<&Chapter> {
        self.document()?
            .current_chapter()
            .ok_or(DaisyError::OutOfRange { what: "chapter", target: 0 })
    }

    pub fn chapter_id(&self) -> Result<usize> {
        Ok(self.chapter()?.id())
    }

    /// 当前段落，还没有定位到任何段落时返回 [`DaisyError::NoPassage`]
    pub fn passage(&self) -> Result<&Passage> {
        self.document()?.current_passage().ok_or(DaisyError::NoPassage)
    }

    pub fn passage_id(&self) -> Result<usize> {
        Ok(self.passage()?.id())
    }

    /// 当前章节的标题路径
    pub fn heading_path(&self) -> Result<HeadingPath> {
        Ok(self.document()?.heading_path())
    }

    /// 定位到指定章节和段落，见 [`Document::seek`]
    pub fn seek(&mut self, chapter: Option<usize>, passage: Option<usize>) -> Result<()> {
        self.document_mut()?.seek(chapter, passage)
    }

    /// 按播放时间定位段落，见 [`Document::seek_by_time`]
    pub fn seek_by_time(&mut self, chapter: Option<usize>, timestamp_ms: u64) -> Result<usize> {
        self.document_mut()?.seek_by_time(chapter, timestamp_ms)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.config.verbosity
    }

    /// 修改日志级别
    pub fn set_verbosity(&mut self, verbosity: Verbosity) -> Result<()> {
        self.config.verbosity = verbosity;
        match &self.log {
            Some(handle) => handle.set_verbosity(verbosity),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::test_fixtures::{book_files, write_book, FULL_NCC_HEAD, ncc_document};

    #[test]
    fn test_accessors_before_load() {
        let mut daisy = Daisy::default();
        assert!(!daisy.is_loaded());
        assert!(matches!(daisy.chapter_count(), Err(DaisyError::NotLoaded)));
        assert!(matches!(daisy.chapter(), Err(DaisyError::NotLoaded)));
        assert!(matches!(daisy.book_info(), Err(DaisyError::NotLoaded)));
        assert!(matches!(daisy.seek(Some(1), None), Err(DaisyError::NotLoaded)));
    }

    #[test]
    fn test_debug_output() {
        let daisy = Daisy::default();
        let text = format!("{:?}", daisy);
        assert!(text.starts_with("Daisy"));
        assert!(text.contains("document: None"));
    }

    #[test]
    fn test_load_and_navigate() {
        let dir = write_book(&book_files());
        let mut daisy = Daisy::default();
        daisy.load(dir.path().join("ncc.html"), Format::Auto).unwrap();

        assert_eq!(daisy.chapter_count().unwrap(), 5);
        assert_eq!(daisy.chapter_id().unwrap(), 1);
        assert!(matches!(daisy.passage(), Err(DaisyError::NoPassage)));
        assert_eq!(daisy.book_info().unwrap().narrator(), Some("John Reader"));

        daisy.seek(Some(2), Some(1)).unwrap();
        assert_eq!(daisy.chapter().unwrap().header.as_deref(), Some("One point one"));
        assert_eq!(daisy.passage_id().unwrap(), 1);
        assert_eq!(daisy.heading_path().unwrap().to_string(), "1.1");

        assert_eq!(daisy.seek_by_time(Some(1), 1500).unwrap(), 2);
        assert_eq!(daisy.passage().unwrap().audio_uri.as_deref(), Some("book.mp3"));
    }

    #[test]
    fn test_reload_replaces_document() {
        let dir = write_book(&book_files());
        let mut daisy = Daisy::default();
        daisy.load(dir.path().join("ncc.html"), Format::Auto).unwrap();
        daisy.seek(Some(3), None).unwrap();

        daisy.load(dir.path().join("ncc.html"), Format::Auto).unwrap();
        assert_eq!(daisy.chapter_id().unwrap(), 1);

        daisy.unload();
        assert!(matches!(daisy.document(), Err(DaisyError::NotLoaded)));
    }

    #[test]
    fn test_failed_load_leaves_nothing() {
        let body = r#"<h1><a>broken</a></h1>"#;
        let dir = write_book(&[("ncc.html", ncc_document(FULL_NCC_HEAD, body))]);
        let mut daisy = Daisy::default();
        let err = daisy.load(dir.path().join("ncc.html"), Format::Auto).unwrap_err();
        assert!(matches!(err, DaisyError::StructuralViolation { .. }));
        assert!(!daisy.is_loaded());
    }

    #[test]
    fn test_set_verbosity_without_subscriber() {
        let mut daisy = Daisy::default();
        daisy.set_verbosity(Verbosity::Warning).unwrap();
        assert_eq!(daisy.verbosity(), Verbosity::Warning);
    }
}
