//! 导航模块
//!
//! 在章节脊柱和段落脊柱上按编号或播放时间定位，并计算当前章节的标题路径。
//! 定位要么完全成功，要么不移动任何游标。

use crate::daisy::document::Document;
use crate::daisy::error::{DaisyError, Result};
use crate::daisy::model::{HeadingLevel, Passage, Spine};
use std::fmt;
use tracing::{debug, trace};

const LEVELS: usize = HeadingLevel::MAX as usize;

/// 各级标题的计数（h1-h6）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadingPath([u32; LEVELS]);

impl HeadingPath {
    /// 全部六级计数
    pub fn levels(&self) -> [u32; LEVELS] {
        self.0
    }

    /// 指定级别（1-6）的计数
    pub fn level(&self, level: u8) -> Option<u32> {
        HeadingLevel::new(level).map(|level| self.0[usize::from(level.get()) - 1])
    }

    /// 最深的非零级别，全为零时为0
    pub fn depth(&self) -> usize {
        self.0.iter().rposition(|&count| count > 0).map_or(0, |index| index + 1)
    }
}

impl fmt::Display for HeadingPath {
    /// 以点号连接到最深的非零级别，例如 `2.0.1`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = self.depth().max(1);
        let parts: Vec<String> = self.0[..depth].iter().map(u32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

impl Document {
    /// 定位到指定章节和段落
    ///
    /// 章节为None时留在当前章节；段落为None时只移动章节，切换章节会丢弃常驻的段落。
    /// 请求段落时按需解析目标章节的SMIL文件。
    ///
    /// # 参数
    /// * `chapter` - 目标章节编号
    /// * `passage` - 目标段落编号
    ///
    /// # 返回值
    /// * `Result<()>` - 任何目标越界时返回 [`DaisyError::OutOfRange`]，游标保持不变
    pub fn seek(&mut self, chapter: Option<usize>, passage: Option<usize>) -> Result<()> {
        let current = self.chapters.cursor_index().ok_or(DaisyError::OutOfRange {
            what: "chapter",
            target: chapter.unwrap_or(0) as u64,
        })?;
        let target = match chapter {
            Some(id) => self.chapters.walk_to(id).ok_or(DaisyError::OutOfRange {
                what: "chapter",
                target: id as u64,
            })?,
            None => current,
        };
        let switching = target != current;

        let Some(passage_id) = passage else {
            if switching {
                self.chapters.set_cursor(target);
                self.flush_passages();
                trace!("移动到章节 {:?}", self.chapters.cursor_id());
            }
            return Ok(());
        };

        // 切换章节或没有常驻段落时解析目标章节，成功定位之前不修改文档
        let fresh = if switching || self.passages.is_none() {
            Some(self.parse_passages(target)?)
        } else {
            None
        };
        let spine: &Spine<Passage> = fresh
            .as_ref()
            .map(|outcome| &outcome.passages)
            .or(self.passages.as_ref())
            .ok_or(DaisyError::NoPassage)?;
        let index = spine.walk_to(passage_id).ok_or(DaisyError::OutOfRange {
            what: "passage",
            target: passage_id as u64,
        })?;

        if let Some(outcome) = fresh {
            self.passages = Some(self.commit_passages(target, outcome));
        }
        self.chapters.set_cursor(target);
        if let Some(spine) = self.passages.as_mut() {
            spine.set_cursor(index);
        }
        trace!("移动到章节 {:?} 段落 {}", self.chapters.cursor_id(), passage_id);
        Ok(())
    }

    /// 在章节中定位包含指定时间的段落
    ///
    /// 从第一个段落开始逐个检查 `[start, stop)` 区间，与之前的游标位置无关。
    ///
    /// # 参数
    /// * `chapter` - 目标章节编号，None表示当前章节
    /// * `timestamp_ms` - 章节内的播放时间（毫秒）
    ///
    /// # 返回值
    /// * `Result<usize>` - 找到的段落编号；没有段落包含该时间时游标保持不变
    pub fn seek_by_time(&mut self, chapter: Option<usize>, timestamp_ms: u64) -> Result<usize> {
        let saved_chapters = self.chapters.clone();
        let saved_passages = self.passages.clone();
        let saved_degraded = self.degraded;

        let mut passage_id = 1;
        loop {
            if let Err(err) = self.seek(chapter, Some(passage_id)) {
                self.chapters = saved_chapters;
                self.passages = saved_passages;
                self.degraded = saved_degraded;
                return Err(match err {
                    DaisyError::OutOfRange { .. } => DaisyError::OutOfRange {
                        what: "timestamp",
                        target: timestamp_ms,
                    },
                    other => other,
                });
            }
            if self.current_passage().is_some_and(|p| p.contains(timestamp_ms)) {
                debug!("{} ms 位于段落 {}", timestamp_ms, passage_id);
                return Ok(passage_id);
            }
            passage_id += 1;
        }
    }

    /// 从第一个章节到当前章节累计各级标题的计数
    ///
    /// 遇到第n级标题时第n级计数加一，更深的级别清零。
    pub fn heading_path(&self) -> HeadingPath {
        let mut counters = [0u32; LEVELS];
        for chapter in self.chapters.up_to_cursor() {
            if let Some(level) = chapter.level() {
                let index = usize::from(level) - 1;
                counters[index] = counters[index].saturating_add(1);
                counters[index + 1..].fill(0);
            }
        }
        HeadingPath(counters)
    }
}
