//! 文档数据模型
//!
//! 章节脊柱、段落脊柱以及书籍元数据。

mod book_info;
mod chapter;
mod passage;
mod spine;

pub use book_info::BookInfo;
pub use chapter::{Chapter, ChapterKind, HeadingLevel};
pub use passage::Passage;
pub use spine::{Spine, SpineEntry};

/// 按第一个 `#` 把引用拆分为文件名和片段标识符
///
/// 片段为空时视为没有片段。
pub fn split_reference(reference: &str) -> (String, Option<String>) {
    match reference.split_once('#') {
        Some((file, fragment)) => {
            let fragment = (!fragment.is_empty()).then(|| fragment.to_string());
            (file.to_string(), fragment)
        }
        None => (reference.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_reference() {
        assert_eq!(
            split_reference("file.smil#frag7"),
            ("file.smil".to_string(), Some("frag7".to_string()))
        );
        assert_eq!(split_reference("file.smil"), ("file.smil".to_string(), None));
        assert_eq!(split_reference("file.smil#"), ("file.smil".to_string(), None));
        assert_eq!(
            split_reference("a.html#b#c"),
            ("a.html".to_string(), Some("b#c".to_string()))
        );
    }
}
