//! 章节模块
//!
//! 定义NCC中的章节条目（标题、页码、块）。

use crate::daisy::model::spine::SpineEntry;

/// 标题级别（1-6）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// 最大标题级别
    pub const MAX: u8 = 6;

    /// 创建标题级别，超出1-6时返回None
    pub fn new(level: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// 从标签名（h1-h6）解析级别
    pub fn from_tag(tag: &str) -> Option<Self> {
        let bytes = tag.as_bytes();
        if bytes.len() != 2 || !bytes[0].eq_ignore_ascii_case(&b'h') {
            return None;
        }
        (bytes[1] as char).to_digit(10).and_then(|d| Self::new(d as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// 章节分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterKind {
    /// 标题（h1-h6）
    Heading(HeadingLevel),
    /// 页码（span）
    Page,
    /// 块（div）
    Block,
}

/// 章节（章节脊柱中的元素）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// 章节编号，追加到脊柱时分配
    pub id: usize,
    pub kind: ChapterKind,
    /// NCC元素自身的id属性
    pub element_id: Option<String>,
    /// 目标SMIL文件名
    pub anchor: String,
    /// SMIL文件中的片段标识符
    pub fragment: Option<String>,
    /// 标题文本
    pub header: Option<String>,
    /// SMIL中声明的本章时长
    pub duration: Option<String>,
    /// SMIL中声明的已播放时长
    pub elapsed_time: Option<String>,
}

impl Chapter {
    /// 创建新的章节，编号在追加到脊柱时分配
    pub fn new(kind: ChapterKind, anchor: String, fragment: Option<String>) -> Self {
        Self {
            id: 0,
            kind,
            element_id: None,
            anchor,
            fragment,
            header: None,
            duration: None,
            elapsed_time: None,
        }
    }

    /// 标题级别，非标题章节返回None
    pub fn level(&self) -> Option<u8> {
        match self.kind {
            ChapterKind::Heading(level) => Some(level.get()),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, ChapterKind::Heading(_))
    }
}

impl SpineEntry for Chapter {
    fn id(&self) -> usize {
        self.id
    }

    fn assign_id(&mut self, id: usize) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_from_tag() {
        assert_eq!(HeadingLevel::from_tag("h1").map(HeadingLevel::get), Some(1));
        assert_eq!(HeadingLevel::from_tag("H6").map(HeadingLevel::get), Some(6));
        assert!(HeadingLevel::from_tag("h7").is_none());
        assert!(HeadingLevel::from_tag("h0").is_none());
        assert!(HeadingLevel::from_tag("span").is_none());
    }

    #[test]
    fn test_level() {
        let heading = Chapter::new(
            ChapterKind::Heading(HeadingLevel::new(3).unwrap()),
            "a.smil".to_string(),
            None,
        );
        assert_eq!(heading.level(), Some(3));
        assert!(heading.is_heading());

        let page = Chapter::new(ChapterKind::Page, "a.smil".to_string(), None);
        assert_eq!(page.level(), None);
    }
}
