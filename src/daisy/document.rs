//! 文档模块
//!
//! 一本已加载的有声读物：章节脊柱、常驻的段落脊柱、书籍信息和完整性标记。

use crate::daisy::error::{DaisyError, Result};
use crate::daisy::model::{BookInfo, Chapter, Passage, Spine};
use crate::daisy::ncc;
use crate::daisy::smil::{self, SmilOutcome};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 有声读物格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// 根据文件名识别
    #[default]
    Auto,
    /// Daisy 2.02 的 `ncc.html`
    Ncc,
    /// Daisy 3 的 `.ncx`，尚未支持
    Ncx,
}

impl Format {
    /// 根据路径后缀识别格式（不区分大小写）
    ///
    /// # 参数
    /// * `path` - 导航文件路径
    ///
    /// # 返回值
    /// * `Result<Format>` - 无法识别时返回 [`DaisyError::UnsupportedFormat`]
    pub fn detect(path: &Path) -> Result<Format> {
        let name = path.to_string_lossy().to_ascii_lowercase();
        if name.ends_with("ncc.html") {
            Ok(Format::Ncc)
        } else if name.ends_with(".ncx") {
            Ok(Format::Ncx)
        } else {
            Err(DaisyError::UnsupportedFormat(path.display().to_string()))
        }
    }

    /// `Auto` 时根据路径识别，否则原样返回
    pub fn resolve(self, path: &Path) -> Result<Format> {
        match self {
            Format::Auto => Format::detect(path),
            other => Ok(other),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Auto => "auto",
            Format::Ncc => "ncc",
            Format::Ncx => "ncx",
        };
        f.write_str(name)
    }
}

/// 已加载的有声读物
#[derive(Debug, Clone)]
pub struct Document {
    dir: PathBuf,
    format: Format,
    pub(crate) chapters: Spine<Chapter>,
    /// 只保存当前章节的段落
    pub(crate) passages: Option<Spine<Passage>>,
    book_info: BookInfo,
    pub(crate) degraded: bool,
}

impl Document {
    /// 加载有声读物
    ///
    /// # 参数
    /// * `path` - `ncc.html` 的路径
    /// * `format` - 文档格式，`Auto` 表示根据文件名识别
    ///
    /// # 返回值
    /// * `Result<Document>` - 结构错误会中止加载，一致性问题只设置完整性标记
    pub fn load<P: AsRef<Path>>(path: P, format: Format) -> Result<Document> {
        let path = path.as_ref();
        let format = format.resolve(path)?;
        if format != Format::Ncc {
            warn!("{} 格式尚未支持", format);
            return Err(DaisyError::UnsupportedFormat(format.to_string()));
        }

        let outcome = ncc::parse_file(path)?;
        let degraded = outcome.is_degraded();
        let document = Document {
            dir: directory_of(path),
            format,
            chapters: outcome.chapters,
            passages: None,
            degraded,
            book_info: outcome.book_info,
        };
        info!(
            "已加载 {}：{} 个章节{}",
            path.display(),
            document.chapter_count(),
            if document.degraded { "，文档不完全符合规范" } else { "" }
        );
        Ok(document)
    }

    /// 有声读物所在目录
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn book_info(&self) -> &BookInfo {
        &self.book_info
    }

    /// 解析过程中是否出现过一致性诊断
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn chapters(&self) -> &Spine<Chapter> {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// 当前章节
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapters.current()
    }

    /// 常驻的段落脊柱
    pub fn passages(&self) -> Option<&Spine<Passage>> {
        self.passages.as_ref()
    }

    /// 当前段落
    pub fn current_passage(&self) -> Option<&Passage> {
        self.passages.as_ref().and_then(Spine::current)
    }

    /// 丢弃常驻的段落脊柱
    pub fn flush_passages(&mut self) {
        if self.passages.take().is_some() {
            debug!("丢弃常驻的段落");
        }
    }

    /// 解析指定位置章节的SMIL文件，不修改文档
    pub(crate) fn parse_passages(&self, chapter_index: usize) -> Result<SmilOutcome> {
        let chapter = self.chapters.get(chapter_index + 1).ok_or(DaisyError::OutOfRange {
            what: "chapter",
            target: chapter_index as u64 + 1,
        })?;
        smil::parse_file(&self.dir, chapter)
    }

    /// 定位成功后提交解析结果：写入章节时长、记录诊断，返回段落脊柱
    pub(crate) fn commit_passages(&mut self, chapter_index: usize, outcome: SmilOutcome) -> Spine<Passage> {
        if let Some(chapter) = self.chapters.at_mut(chapter_index) {
            outcome.apply_to(chapter);
        }
        if outcome.is_degraded() {
            self.degraded = true;
        }
        outcome.passages
    }
}

/// NCC文件所在目录，没有上级目录时为当前目录
fn directory_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("./"),
    }
}
