//! NCC解析器模块
//!
//! 按 root、head、body 三层作用域遍历NCC文档，生成章节脊柱和书籍信息，
//! 并在每个作用域结束时用检查器核对标签数量。

use crate::daisy::check::{find_rule, report, report_unknown_tag, Checker, TagRule};
use crate::daisy::error::Result;
use crate::daisy::model::{split_reference, BookInfo, Chapter, ChapterKind, HeadingLevel, Spine};
use crate::daisy::ncc::tables::{
    lookup_meta, BodyTag, HeadTag, MetaField, RootTag, BODY_RULES, HEAD_RULES, HTTP_EQUIV_ROW, META_RULES,
    ROOT_RULES,
};
use crate::daisy::xml::{read_document, TokenKind, XmlTokens};
use std::path::Path;
use tracing::{debug, info, trace, warn};

const SCOPE_ROOT: &str = "root";
const SCOPE_HEAD: &str = "head";
const SCOPE_BODY: &str = "body";
const SCOPE_META: &str = "meta";

/// NCC解析结果
#[derive(Debug, Clone)]
pub struct NccOutcome {
    /// 按文档顺序排列的章节
    pub chapters: Spine<Chapter>,
    /// 书籍信息
    pub book_info: BookInfo,
    /// 一致性诊断条数
    pub conformance_warnings: usize,
}

impl NccOutcome {
    /// 解析过程中是否出现过一致性诊断
    pub fn is_degraded(&self) -> bool {
        self.conformance_warnings > 0
    }
}

/// 读取并解析NCC文件
///
/// # 参数
/// * `path` - NCC文件路径
///
/// # 返回值
/// * `Result<NccOutcome>` - 章节脊柱、书籍信息和诊断条数
pub fn parse_file(path: &Path) -> Result<NccOutcome> {
    let content = read_document(path)?;
    let outcome = parse_str(&content, &path.display().to_string())?;
    info!(
        "{} 解析完成：{} 个章节，{} 条一致性诊断",
        path.display(),
        outcome.chapters.len(),
        outcome.conformance_warnings
    );
    Ok(outcome)
}

/// 解析NCC文档内容
///
/// # 参数
/// * `content` - NCC文档内容
/// * `source` - 文档名称，用于错误信息
pub fn parse_str(content: &str, source: &str) -> Result<NccOutcome> {
    let mut parser = NccParser {
        tokens: XmlTokens::from_str(content, source),
        checker: Checker::with_scopes(&[SCOPE_ROOT, SCOPE_HEAD, SCOPE_BODY, SCOPE_META]),
        chapters: Spine::new(),
        book_info: BookInfo::new(),
        warnings: 0,
    };
    parser.parse_root()?;

    Ok(NccOutcome {
        chapters: parser.chapters,
        book_info: parser.book_info,
        conformance_warnings: parser.warnings,
    })
}

struct NccParser<'a> {
    tokens: XmlTokens<'a>,
    checker: Checker,
    chapters: Spine<Chapter>,
    book_info: BookInfo,
    warnings: usize,
}

impl NccParser<'_> {
    fn parse_root(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(ROOT_RULES, &name) {
                        Some((slot, rule)) => {
                            self.checker.record(SCOPE_ROOT, slot);
                            match rule.handler {
                                RootTag::Html => {}
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
                                HeadTag::Title => {
                                    let title = self.tokens.element_text()?;
                                    if !title.is_empty() {
                                        self.book_info.set_title(&title);
                                    }
                                }
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
                TokenKind::End if self.tokens.is_end(SCOPE_HEAD) => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.tokens.structural("<head> 在文件结束前没有闭合")),
            }
        }
        self.close(SCOPE_META, META_RULES);
        self.close(SCOPE_HEAD, HEAD_RULES);
        Ok(())
    }

    fn parse_meta(&mut self) {
        let Some(name) = self.tokens.attribute("name") else {
            if self.tokens.attribute("http-equiv").is_some() {
                self.checker.record(SCOPE_META, HTTP_EQUIV_ROW);
            }
            return;
        };

        let Some((row, alias)) = lookup_meta(name) else {
            debug!("未知的元数据 {}", name);
            return;
        };
        self.checker.record(SCOPE_META, row);

        let rule = &META_RULES[row];
        if alias > 0 {
            warn!("<meta name=\"{}\"> should be rewritten to {}", name, rule.canonical());
        }

        let (Some(field), Some(content)) = (rule.handler, self.tokens.attribute("content")) else {
            return;
        };
        trace!("meta {} = {}", name, content);
        match field {
            MetaField::Author => self.book_info.set_author(content),
            MetaField::Title => self.book_info.set_title(content),
            MetaField::Narrator => self.book_info.set_narrator(content),
            MetaField::TotalTime => self.book_info.set_total_time(content),
        };
    }

    fn parse_body(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                TokenKind::Start => {
                    let name = self.tokens.name().to_string();
                    match find_rule(BODY_RULES, &name) {
                        Some((slot, rule)) => {
                            self.checker.record(SCOPE_BODY, slot);
                            let kind = match rule.handler {
                                BodyTag::Heading => HeadingLevel::from_tag(&name)
                                    .map(ChapterKind::Heading)
                                    .ok_or_else(|| self.tokens.structural(format!("无法识别的标题级别 <{}>", name)))?,
                                BodyTag::Page => ChapterKind::Page,
                                BodyTag::Block => ChapterKind::Block,
                            };
                            self.parse_entry(kind)?;
                        }
                        None => report_unknown_tag(SCOPE_BODY, &name),
                    }
                }
                TokenKind::End if self.tokens.is_end(SCOPE_BODY) => break,
                TokenKind::End | TokenKind::Text => {}
                TokenKind::Eof => return Err(self.tokens.structural("<body> 在文件结束前没有闭合")),
            }
        }
        self.close(SCOPE_BODY, BODY_RULES);
        Ok(())
    }

    /// 解析一个章节条目（h1-h6、span、div），它的第一个子元素必须是 `<a href>`
    fn parse_entry(&mut self, kind: ChapterKind) -> Result<()> {
        let tag = self.tokens.name().to_string();
        let element_id = self.tokens.attribute("id").map(str::to_string);

        let href = loop {
            match self.tokens.next()? {
                TokenKind::Text => continue,
                TokenKind::Start if self.tokens.is_start("a") => {
                    break self
                        .tokens
                        .attribute("href")
                        .map(str::to_string)
                        .ok_or_else(|| self.tokens.structural(format!("<{}> 中的 <a> 缺少 href 属性", tag)))?;
                }
                TokenKind::Start | TokenKind::End => {
                    return Err(self.tokens.structural(format!("<{}> 中没有 <a> 链接", tag)));
                }
                TokenKind::Eof => return Err(self.tokens.structural(format!("<{}> 在文件结束前没有闭合", tag))),
            }
        };
        let header = self.tokens.element_text()?;

        // 跳过 </a> 之后直到条目结束的内容
        let mut depth = 1usize;
        while depth > 0 {
            match self.tokens.next()? {
                TokenKind::Start => depth += 1,
                TokenKind::End => depth -= 1,
                TokenKind::Text => {}
                TokenKind::Eof => return Err(self.tokens.structural(format!("<{}> 在文件结束前没有闭合", tag))),
            }
        }

        let (anchor, fragment) = split_reference(&href);
        let mut chapter = Chapter::new(kind, anchor, fragment);
        chapter.element_id = element_id;
        chapter.header = (!header.is_empty()).then_some(header);

        let id = self.chapters.push(chapter);
        trace!("<{}> -> 章节 {} ({})", tag, id, href);
        Ok(())
    }

    fn close<H>(&mut self, scope: &str, rules: &[TagRule<H>]) {
        self.warnings += report(&self.checker.close_scope(scope, rules));
    }
}
