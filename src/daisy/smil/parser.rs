//! SMIL解析器模块
//!
//! 为单个章节解析其SMIL文件并生成段落脊柱。同步块先按结构读取，
//! 只有在片段定位器确认之后才解码音频片段和文本引用并追加到脊柱，未确认的块直接丢弃。

use crate::daisy::check::{find_rule, find_rule_exact, report, report_unknown_tag, Checker, TagRule};
use crate::daisy::error::{DaisyError, Result};
use crate::daisy::model::{split_reference, Chapter, Passage, Spine};
use crate::daisy::smil::clock::parse_clock_ms;
use crate::daisy::smil::resolver::FragmentResolver;
use crate::daisy::smil::tables::{
    HeadTag, ParTag, RootTag, SeqTag, SmilMetaField, BODY_RULES, HEAD_RULES, LAYOUT_RULES, MAINSEQ_RULES,
    META_RULES, PAR_RULES, ROOT_RULES,
};
use crate::daisy::xml::{read_document, TokenKind, XmlTokens};
use std::path::Path;
use tracing::{debug, info, trace, warn};

const SCOPE_ROOT: &str = "root";
const SCOPE_HEAD: &str = "head";
const SCOPE_LAYOUT: &str = "layout";
const SCOPE_BODY: &str = "body";
const SCOPE_MAINSEQ: &str = "mainseq";
const SCOPE_PAR: &str = "par";
const SCOPE_META: &str = "meta";

/// SMIL解析结果
#[derive(Debug, Clone)]
pub struct SmilOutcome {
    /// 本章节的段落
    pub passages: Spine<Passage>,
    /// 一致性诊断条数
    pub conformance_warnings: usize,
    /// SMIL中声明的本章时长
    pub duration: Option<String>,
    /// SMIL中声明的已播放时长
    pub elapsed_time: Option<String>,
}

impl SmilOutcome {
    pub fn is_degraded(&self) -> bool {
        self.conformance_warnings > 0
    }

    /// 把声明的时长写入章节，章节已有的值保持不变
    pub fn apply_to(&self, chapter: &mut Chapter) {
        if chapter.duration.is_none() {
            chapter.duration = self.duration.clone();
        }
        if chapter.elapsed_time.is_none() {
            chapter.elapsed_time = self.elapsed_time.clone();
        }
    }
}

/// 读取并解析章节指向的SMIL文件
///
/// 解析不修改章节，SMIL中声明的时长通过 [`SmilOutcome::apply_to`] 写入。
///
/// # 参数
/// * `dir` - 有声读物所在目录
/// * `chapter` - 目标章节
///
/// # 返回值
/// * `Result<SmilOutcome>` - 段落脊柱和诊断条数
pub fn parse_file(dir: &Path, chapter: &Chapter) -> Result<SmilOutcome> {
    let path = dir.join(&chapter.anchor);
    let content = read_document(&path)?;
    let outcome = parse_str(&content, &path.display().to_string(), chapter)?;
    info!(
        "{} 解析完成：章节 {} 有 {} 个段落",
        path.display(),
        chapter.id,
        outcome.passages.len()
    );
    Ok(outcome)
}

/// 解析SMIL文档内容
///
/// # 参数
/// * `content` - SMIL文档内容
/// * `source` - 文档名称，用于错误信息
/// * `chapter` - 目标章节，提供片段标识符
pub fn parse_str(content: &str, source: &str, chapter: &Chapter) -> Result<SmilOutcome> {
    let mut parser = SmilParser {
        tokens: XmlTokens::from_str(content, source),
        checker: Checker::with_scopes(&[
            SCOPE_ROOT,
            SCOPE_HEAD,
            SCOPE_LAYOUT,
            SCOPE_BODY,
            SCOPE_MAINSEQ,
            SCOPE_PAR,
            SCOPE_META,
        ]),
        resolver: FragmentResolver::new(chapter.fragment.as_deref()),
        passages: Spine::new(),
        duration: None,
        elapsed_time: None,
        warnings: 0,
        text_reported: false,
    };
    parser.parse_root()?;

    if !parser.resolver.is_found() {
        warn!(
            "{} 中没有找到片段 {}",
            source,
            chapter.fragment.as_deref().unwrap_or_default()
        );
    }

    Ok(SmilOutcome {
        passages: parser.passages,
        conformance_warnings: parser.warnings,
        duration: parser.duration,
        elapsed_time: parser.elapsed_time,
    })
}

/// 尚未解码的 `<audio>` 属性
#[derive(Debug, Clone, Default)]
struct RawClip {
    src: Option<String>,
    begin: Option<String>,
    end: Option<String>,
}

/// 结构解析得到的同步块，确认后才生成段落
#[derive(Debug, Default)]
struct PendingBlock {
    confirmed: bool,
    /// `<text>` 出现时为 Some，内层是它的 src
    text: Option<Option<String>>,
    clips: Vec<RawClip>,
    nested: Vec<PendingBlock>,
}

struct SmilParser<'a> {
    tokens: XmlTokens<'a>,
    checker: Checker,
    resolver: FragmentResolver,
    passages: Spine<Passage>,
    duration: Option<String>,
    elapsed_time: Option<String>,
    warnings: usize,
    text_reported: bool,
}

impl SmilParser<'_> {
    fn parse_root(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(ROOT_RULES, &name) {
                        Some((slot, rule)) => {
                            self.checker.record(SCOPE_ROOT, slot);
                            match rule.handler {
                                RootTag::Smil => {}
                                RootTag::Head => self.parse_head()?,
                                RootTag::Body => self.parse_body()?,
                            }
                        }
                        None => report_unknown_tag(SCOPE_ROOT, &name),
                    }
                }
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => break,
            }
        }
        self.close(SCOPE_ROOT, ROOT_RULES);
        Ok(())
    }

    fn parse_head(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(HEAD_RULES, &name) {
                        Some((slot, rule)) => {
                            self.checker.record(SCOPE_HEAD, slot);
                            match rule.handler {
                                HeadTag::Layout => self.parse_layout()?,
                                HeadTag::Meta => {
                                    self.parse_meta();
                                    self.tokens.skip_element()?;
                                }
                            }
                        }
                        None => {
                            report_unknown_tag(SCOPE_HEAD, &name);
                            self.tokens.skip_element()?;
                        }
                    }
                }
                TokenKind::End if self.tokens.is_end("head") => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("head")),
            }
        }
        self.close(SCOPE_META, META_RULES);
        self.close(SCOPE_HEAD, HEAD_RULES);
        Ok(())
    }

    fn parse_layout(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(LAYOUT_RULES, &name) {
                        Some((slot, _)) => {
                            self.checker.record(SCOPE_LAYOUT, slot);
                        }
                        None => report_unknown_tag(SCOPE_LAYOUT, &name),
                    }
                    self.tokens.skip_element()?;
                }
                TokenKind::End if self.tokens.is_end("layout") => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("layout")),
            }
        }
        self.close(SCOPE_LAYOUT, LAYOUT_RULES);
        Ok(())
    }

    fn parse_meta(&mut self) {
        let Some(name) = self.tokens.attribute("name") else {
            return;
        };
        let Some((row, alias, rule)) = find_rule_exact(META_RULES, name) else {
            debug!("未知的SMIL元数据 {}", name);
            return;
        };
        self.checker.record(SCOPE_META, row);
        if alias > 0 {
            warn!("<meta name=\"{}\"> should be rewritten to {}", name, rule.canonical());
        }

        let (Some(field), Some(content)) = (rule.handler, self.tokens.attribute("content")) else {
            return;
        };
        let slot = match field {
            SmilMetaField::Duration => &mut self.duration,
            SmilMetaField::ElapsedTime => &mut self.elapsed_time,
        };
        if slot.is_none() {
            *slot = Some(content.to_string());
        }
    }

    fn parse_body(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(BODY_RULES, &name) {
                        Some((slot, _)) => {
                            self.checker.record(SCOPE_BODY, slot);
                            self.parse_main_seq()?;
                        }
                        None => {
                            report_unknown_tag(SCOPE_BODY, &name);
                            self.tokens.skip_element()?;
                        }
                    }
                }
                TokenKind::End if self.tokens.is_end("body") => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("body")),
            }
        }
        self.close(SCOPE_BODY, BODY_RULES);
        Ok(())
    }

    fn parse_main_seq(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(MAINSEQ_RULES, &name) {
                        Some((slot, rule)) => {
                            self.checker.record(SCOPE_MAINSEQ, slot);
                            match rule.handler {
                                SeqTag::Par => {
                                    let block = self.parse_par(0)?;
                                    self.commit(block)?;
                                }
                                SeqTag::Seq => self.parse_inner_seq()?,
                            }
                        }
                        None => {
                            report_unknown_tag(SCOPE_MAINSEQ, &name);
                            self.tokens.skip_element()?;
                        }
                    }
                }
                TokenKind::End if self.tokens.is_end("seq") => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("seq")),
            }
        }
        self.close(SCOPE_MAINSEQ, MAINSEQ_RULES);
        Ok(())
    }

    /// 主序列中嵌套的序列，只包含同步块
    fn parse_inner_seq(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start if self.tokens.is_start("par") => {
                    let block = self.parse_par(0)?;
                    self.commit(block)?;
                }
                TokenKind::Start => {
                    report_unknown_tag("seq", self.tokens.name());
                    self.tokens.skip_element()?;
                }
                TokenKind::End if self.tokens.is_end("seq") => return Ok(()),
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("seq")),
            }
        }
    }

    /// 结构解析一个同步块，嵌套的同步块使用各自深度的检查作用域
    fn parse_par(&mut self, depth: usize) -> Result<PendingBlock> {
        let scope = if depth == 0 {
            SCOPE_PAR.to_string()
        } else {
            format!("{}.{}", SCOPE_PAR, depth)
        };
        self.checker.register(&scope);

        let mut block = PendingBlock {
            confirmed: self.resolver.inspect(self.tokens.attribute("id")),
            ..PendingBlock::default()
        };

        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(PAR_RULES, &name) {
                        Some((slot, rule)) => {
                            self.checker.record(&scope, slot);
                            match rule.handler {
                                ParTag::Text => {
                                    block.confirmed |= self.resolver.inspect(self.tokens.attribute("id"));
                                    block.text = Some(self.tokens.attribute("src").map(str::to_string));
                                    self.tokens.skip_element()?;
                                }
                                ParTag::Audio => {
                                    block.clips.push(self.raw_clip());
                                    self.tokens.skip_element()?;
                                }
                                ParTag::Seq => self.parse_par_seq(depth, &mut block)?,
                            }
                        }
                        None => {
                            report_unknown_tag(SCOPE_PAR, &name);
                            self.tokens.skip_element()?;
                        }
                    }
                }
                TokenKind::End if self.tokens.is_end("par") => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("par")),
            }
        }
        self.close(&scope, PAR_RULES);
        Ok(block)
    }

    /// 同步块中的序列：额外的音频片段和嵌套的同步块
    fn parse_par_seq(&mut self, depth: usize, block: &mut PendingBlock) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start if self.tokens.is_start("audio") => {
                    block.clips.push(self.raw_clip());
                    self.tokens.skip_element()?;
                }
                TokenKind::Start if self.tokens.is_start("par") => {
                    let nested = self.parse_par(depth + 1)?;
                    block.nested.push(nested);
                }
                TokenKind::Start => {
                    report_unknown_tag("seq", self.tokens.name());
                    self.tokens.skip_element()?;
                }
                TokenKind::End if self.tokens.is_end("seq") => return Ok(()),
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unclosed("seq")),
            }
        }
    }

    fn raw_clip(&self) -> RawClip {
        RawClip {
            src: self.tokens.attribute("src").map(str::to_string),
            begin: self.tokens.attribute("clip-begin").map(str::to_string),
            end: self.tokens.attribute("clip-end").map(str::to_string),
        }
    }

    /// 把确认过的同步块转换为段落，随后处理嵌套的块
    fn commit(&mut self, block: PendingBlock) -> Result<()> {
        if block.confirmed {
            let (text_file, text_fragment) = match block.text {
                Some(Some(src)) => {
                    self.report_text_unsupported();
                    let (file, fragment) = split_reference(&src);
                    (Some(file), fragment)
                }
                Some(None) => return Err(self.tokens.structural("<text> 缺少 src 属性")),
                None => (None, None),
            };

            if block.clips.is_empty() {
                let id = self.passages.push(Passage {
                    text_file,
                    text_fragment,
                    ..Passage::default()
                });
                trace!("段落 {} 没有音频", id);
            } else {
                for clip in &block.clips {
                    let (audio_uri, start_ms, stop_ms) = self.decode_clip(clip)?;
                    let id = self.passages.push(Passage {
                        id: 0,
                        audio_uri: Some(audio_uri),
                        start_ms,
                        stop_ms,
                        text_file: text_file.clone(),
                        text_fragment: text_fragment.clone(),
                    });
                    trace!("段落 {}: [{}, {}) ms", id, start_ms, stop_ms);
                }
            }
        }

        for nested in block.nested {
            self.commit(nested)?;
        }
        Ok(())
    }

    fn decode_clip(&self, clip: &RawClip) -> Result<(String, u64, u64)> {
        let src = clip
            .src
            .clone()
            .ok_or_else(|| self.tokens.structural("<audio> 缺少 src 属性"))?;

        let start_ms = match &clip.begin {
            Some(value) => self.clock(value)?,
            None => 0,
        };
        let stop_ms = match (&clip.begin, &clip.end) {
            (_, Some(value)) => self.clock(value)?,
            (Some(_), None) => return Err(self.tokens.structural("<audio> 有 clip-begin 但缺少 clip-end")),
            (None, None) => 0,
        };
        Ok((src, start_ms, stop_ms))
    }

    fn clock(&self, value: &str) -> Result<u64> {
        parse_clock_ms(value).ok_or_else(|| self.tokens.structural(format!("无法解析的时钟值 \"{}\"", value)))
    }

    fn report_text_unsupported(&mut self) {
        if !self.text_reported {
            warn!("{}: 文本段落提取尚未实现", self.tokens.source());
            self.text_reported = true;
        }
    }

    fn unclosed(&self, tag: &str) -> DaisyError {
        self.tokens.structural(format!("<{}> 在文件结束前没有闭合", tag))
    }

    fn close<H>(&mut self, scope: &str, rules: &[TagRule<H>]) {
        self.warnings += report(&self.checker.close_scope(scope, rules));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::model::{ChapterKind, SpineEntry};
    use crate::daisy::test_fixtures::{fragment_blocks, par, smil_document, three_passages, FULL_SMIL_HEAD};

    fn chapter(fragment: Option<&str>) -> Chapter {
        Chapter::new(ChapterKind::Page, "chap.smil".to_string(), fragment.map(str::to_string))
    }

    fn parse(blocks: &str, fragment: Option<&str>) -> Result<SmilOutcome> {
        parse_str(&smil_document(FULL_SMIL_HEAD, blocks), "chap.smil", &chapter(fragment))
    }

    #[test]
    fn test_passages_in_order() {
        let outcome = parse(&three_passages(), None).unwrap();
        assert!(!outcome.is_degraded());

        let spans: Vec<(usize, u64, u64)> = outcome
            .passages
            .iter()
            .map(|p| (p.id(), p.start_ms, p.stop_ms))
            .collect();
        assert_eq!(spans, vec![(1, 0, 1000), (2, 1000, 2500), (3, 2500, 4000)]);

        let first = outcome.passages.head().unwrap();
        assert_eq!(first.audio_uri.as_deref(), Some("book.mp3"));
        assert_eq!(first.text_file.as_deref(), Some("book.html"));
        assert_eq!(first.text_fragment.as_deref(), Some("p1_txt"));
    }

    #[test]
    fn test_fragment_skips_earlier_blocks() {
        let outcome = parse(&fragment_blocks(), Some("frag7")).unwrap();
        assert_eq!(outcome.passages.len(), 2);
        let first = outcome.passages.head().unwrap();
        assert_eq!(first.id(), 1);
        assert_eq!(first.start_ms, 2000);
        assert_eq!(first.text_fragment.as_deref(), Some("frag7_txt"));
    }

    #[test]
    fn test_fragment_matches_text_id() {
        let outcome = parse(&fragment_blocks(), Some("frag6_txt")).unwrap();
        assert_eq!(outcome.passages.len(), 3);
        assert_eq!(outcome.passages.head().unwrap().start_ms, 1000);
    }

    #[test]
    fn test_unknown_fragment_yields_nothing() {
        let outcome = parse(&fragment_blocks(), Some("missing")).unwrap();
        assert!(outcome.passages.is_empty());
    }

    #[test]
    fn test_meta_is_applied_on_request() {
        let mut target = chapter(None);
        let outcome =
            parse_str(&smil_document(FULL_SMIL_HEAD, &three_passages()), "chap.smil", &target).unwrap();
        assert_eq!(outcome.duration.as_deref(), Some("0:00:04"));
        assert!(target.duration.is_none());

        outcome.apply_to(&mut target);
        assert_eq!(target.duration.as_deref(), Some("0:00:04"));
        assert_eq!(target.elapsed_time.as_deref(), Some("0:00:00"));
    }

    #[test]
    fn test_audio_without_src_aborts() {
        let block = r#"<par id="b"><text src="t.html#a" /><audio clip-begin="npt=0s" clip-end="npt=1s" /></par>"#;
        let err = parse(block, None).unwrap_err();
        assert!(matches!(err, DaisyError::StructuralViolation { .. }));
    }

    #[test]
    fn test_clip_begin_without_end_aborts() {
        let block = r#"<par id="b"><text src="t.html#a" /><audio src="a.mp3" clip-begin="npt=0s" /></par>"#;
        assert!(parse(block, None).is_err());
    }

    #[test]
    fn test_text_without_src_aborts() {
        let block = r#"<par id="b"><text id="t" /><audio src="a.mp3" clip-begin="npt=0s" clip-end="npt=1s" /></par>"#;
        assert!(matches!(parse(block, None), Err(DaisyError::StructuralViolation { .. })));
    }

    #[test]
    fn test_skipped_blocks_are_not_decoded() {
        let broken = r#"<par id="early"><text src="t.html#a" /><audio clip-begin="bogus" /></par>"#;
        let blocks = format!("{}{}", broken, par("target", "0s", "1s"));
        let outcome = parse(&blocks, Some("target")).unwrap();
        assert_eq!(outcome.passages.len(), 1);
    }

    #[test]
    fn test_audio_before_text() {
        let block = r#"<par id="b"><audio src="a.mp3" clip-begin="npt=1s" clip-end="npt=2s" /><text src="t.html#x" /></par>"#;
        let outcome = parse(block, None).unwrap();
        let passage = outcome.passages.head().unwrap();
        assert_eq!((passage.start_ms, passage.stop_ms), (1000, 2000));
        assert_eq!(passage.text_fragment.as_deref(), Some("x"));
    }

    #[test]
    fn test_inner_seq_clips_share_text() {
        let block = r#"<par id="b"><text src="t.html#x" />
            <seq>
              <audio src="a.mp3" clip-begin="npt=0s" clip-end="npt=1s" />
              <audio src="a.mp3" clip-begin="npt=1s" clip-end="npt=3s" />
            </seq></par>"#;
        let outcome = parse(block, None).unwrap();
        assert_eq!(outcome.passages.len(), 2);
        assert!(outcome.passages.iter().all(|p| p.text_fragment.as_deref() == Some("x")));
        assert_eq!(outcome.passages.tail().unwrap().stop_ms, 3000);
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_block_without_audio() {
        let outcome = parse(r#"<par id="b"><text src="t.html#x" /></par>"#, None).unwrap();
        let passage = outcome.passages.head().unwrap();
        assert_eq!(passage.audio_uri, None);
        assert_eq!(passage.duration_ms(), 0);
    }

    #[test]
    fn test_empty_sequence_is_degraded() {
        let outcome = parse("", None).unwrap();
        assert!(outcome.passages.is_empty());
        assert!(outcome.is_degraded());
    }

    #[test]
    fn test_missing_format_meta_is_degraded() {
        let head = FULL_SMIL_HEAD.replace(r#"<meta name="dc:format" content="Daisy 2.02" />"#, "");
        let outcome = parse_str(&smil_document(&head, &three_passages()), "chap.smil", &chapter(None)).unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.passages.len(), 3);
    }
}
