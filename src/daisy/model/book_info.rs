//! 书籍元数据模块

use tracing::debug;

/// 书籍基本信息
///
/// 每个字段只接受第一次写入，之后的写入会被忽略。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInfo {
    title: Option<String>,
    author: Option<String>,
    narrator: Option<String>,
    total_time: Option<String>,
}

/// 第一次写入生效
fn set_once(field: &mut Option<String>, name: &str, value: &str) -> bool {
    if let Some(existing) = field {
        debug!("{} 已经是 \"{}\"，忽略 \"{}\"", name, existing, value);
        return false;
    }
    *field = Some(value.to_string());
    true
}

impl BookInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn narrator(&self) -> Option<&str> {
        self.narrator.as_deref()
    }

    /// 总时长（h:mm:ss 格式的原始字符串）
    pub fn total_time(&self) -> Option<&str> {
        self.total_time.as_deref()
    }

    /// 总时长的秒数，格式无法识别时返回None
    pub fn total_time_seconds(&self) -> Option<u64> {
        self.total_time.as_deref().and_then(parse_hms)
    }

    pub fn set_title(&mut self, value: &str) -> bool {
        set_once(&mut self.title, "title", value)
    }

    pub fn set_author(&mut self, value: &str) -> bool {
        set_once(&mut self.author, "author", value)
    }

    pub fn set_narrator(&mut self, value: &str) -> bool {
        set_once(&mut self.narrator, "narrator", value)
    }

    pub fn set_total_time(&mut self, value: &str) -> bool {
        set_once(&mut self.total_time, "total time", value)
    }
}

/// 解析 `h:mm:ss`，秒的小数部分被舍去
fn parse_hms(value: &str) -> Option<u64> {
    let mut parts = value.trim().split(':');
    let h: u64 = parts.next()?.trim().parse().ok()?;
    let m: u64 = parts.next()?.trim().parse().ok()?;
    let s = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    let s: u64 = s.split('.').next()?.parse().ok()?;
    Some(h * 3600 + m * 60 + s)
}
