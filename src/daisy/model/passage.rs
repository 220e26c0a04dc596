//! 段落模块
//!
//! 段落是SMIL文件中的一个音频与文本同步单元。

use crate::daisy::model::spine::SpineEntry;

/// 段落（段落脊柱中的元素）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passage {
    /// 段落编号，只在当前加载的章节内有效
    pub id: usize,
    /// 音频文件URI
    pub audio_uri: Option<String>,
    /// 音频起始位置（毫秒）
    pub start_ms: u64,
    /// 音频结束位置（毫秒，不包含）
    pub stop_ms: u64,
    /// 文本文件名
    pub text_file: Option<String>,
    /// 文本文件中的片段标识符
    pub text_fragment: Option<String>,
}

impl Passage {
    /// 时间戳是否落在 [start, stop) 区间内
    pub fn contains(&self, timestamp_ms: u64) -> bool {
        self.start_ms <= timestamp_ms && timestamp_ms < self.stop_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.stop_ms.saturating_sub(self.start_ms)
    }

    /// 两个段落内容是否一致（忽略编号）
    pub fn same_content(&self, other: &Passage) -> bool {
        self.audio_uri == other.audio_uri
            && self.start_ms == other.start_ms
            && self.stop_ms == other.stop_ms
            && self.text_file == other.text_file
            && self.text_fragment == other.text_fragment
    }
}

impl SpineEntry for Passage {
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
    fn test_contains_is_half_open() {
        let passage = Passage {
            start_ms: 1000,
            stop_ms: 2500,
            ..Default::default()
        };
        assert!(!passage.contains(999));
        assert!(passage.contains(1000));
        assert!(passage.contains(2499));
        assert!(!passage.contains(2500));
        assert_eq!(passage.duration_ms(), 1500);
    }
}
