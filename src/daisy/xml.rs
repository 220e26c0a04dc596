//! 流式XML标记源
//!
//! 对 `quick_xml::Reader` 的轻量包装，按顺序给出开始标签、结束标签、文本和文件结束四种标记，
//! 并提供当前标签名、属性查找和文本值等查询。NCC与SMIL解析器都只通过它读取文档。

use crate::daisy::error::{DaisyError, Result};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::debug;

/// 当前标记的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// 元素开始标签（空元素会被展开为开始+结束）
    Start,
    /// 元素结束标签
    End,
    /// 非空白文本
    Text,
    /// 文件结束
    Eof,
}

/// 流式XML标记读取器
pub struct XmlTokens<'a> {
    reader: Reader<&'a [u8]>,
    source: String,
    kind: TokenKind,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
}

impl<'a> XmlTokens<'a> {
    /// 从XML文本创建标记读取器
    ///
    /// # 参数
    /// * `content` - 文档内容
    /// * `source` - 文档名称，仅用于错误信息
    pub fn from_str(content: &'a str, source: impl Into<String>) -> Self {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        Self {
            reader,
            source: source.into(),
            kind: TokenKind::Eof,
            name: String::new(),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    /// 前进到下一个标记
    ///
    /// 注释、处理指令、CDATA和DOCTYPE会被跳过。
    pub fn next(&mut self) -> Result<TokenKind> {
        loop {
            match self.reader.read_event()? {
                Event::Start(ref e) => {
                    self.set_start(e)?;
                    return Ok(TokenKind::Start);
                }
                Event::Empty(ref e) => {
                    // 打开 expand_empty_elements 后不会出现
                    self.set_start(e)?;
                    return Ok(TokenKind::Start);
                }
                Event::End(ref e) => {
                    self.kind = TokenKind::End;
                    self.name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.attributes.clear();
                    self.text.clear();
                    return Ok(TokenKind::End);
                }
                Event::Text(ref e) => {
                    let text = decode_text(e);
                    if text.trim().is_empty() {
                        continue;
                    }
                    self.kind = TokenKind::Text;
                    self.name.clear();
                    self.attributes.clear();
                    self.text = text.trim().to_string();
                    return Ok(TokenKind::Text);
                }
                Event::Eof => {
                    self.kind = TokenKind::Eof;
                    self.name.clear();
                    self.attributes.clear();
                    self.text.clear();
                    return Ok(TokenKind::Eof);
                }
                _ => continue,
            }
        }
    }

    fn set_start(&mut self, e: &BytesStart) -> Result<()> {
        self.kind = TokenKind::Start;
        self.name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        self.text.clear();
        self.attributes.clear();

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| DaisyError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            self.attributes.push((key, value));
        }
        Ok(())
    }

    /// 当前标记的类型
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// 当前标签名（文本和文件结束时为空）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 当前文本值（仅文本标记有值）
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 文档名称
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 按名称查找当前开始标签的属性值
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// 当前标记是否为指定名称的开始标签
    pub fn is_start(&self, name: &str) -> bool {
        self.kind == TokenKind::Start && self.name.eq_ignore_ascii_case(name)
    }

    /// 当前标记是否为指定名称的结束标签
    pub fn is_end(&self, name: &str) -> bool {
        self.kind == TokenKind::End && self.name.eq_ignore_ascii_case(name)
    }

    /// 从当前开始标签跳到与之匹配的结束标签
    pub fn skip_element(&mut self) -> Result<()> {
        if self.kind != TokenKind::Start {
            return Ok(());
        }
        let name = self.name.clone();
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                TokenKind::Start => depth += 1,
                TokenKind::End => depth -= 1,
                TokenKind::Text => {}
                TokenKind::Eof => return Err(self.unexpected_eof(&name)),
            }
        }
        Ok(())
    }

    /// 读取当前元素内的全部文本，停在与之匹配的结束标签上
    ///
    /// 嵌套元素中的文本以空格连接。
    pub fn element_text(&mut self) -> Result<String> {
        if self.kind != TokenKind::Start {
            return Ok(String::new());
        }
        let name = self.name.clone();
        let mut parts: Vec<String> = Vec::new();
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                TokenKind::Start => depth += 1,
                TokenKind::End => depth -= 1,
                TokenKind::Text => parts.push(self.text.clone()),
                TokenKind::Eof => return Err(self.unexpected_eof(&name)),
            }
        }
        Ok(parts.join(" "))
    }

    /// 构造本文档的结构错误
    pub fn structural(&self, reason: impl Into<String>) -> DaisyError {
        DaisyError::structural(self.source.clone(), reason)
    }

    fn unexpected_eof(&self, name: &str) -> DaisyError {
        self.structural(format!("<{}> 在文件结束前没有闭合", name))
    }
}

/// 读取文档文件并解码为文本
///
/// 旧版有声读物常用 ISO-8859-1 等单字节编码，不能假定文件是UTF-8。
///
/// # 参数
/// * `path` - 文档路径
///
/// # 返回值
/// * `Result<String>` - 解码后的文档内容
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_document(&bytes).into_owned())
}

/// 按 UTF-8（含BOM）、XML声明的编码、Windows-1252 的顺序解码文档字节
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(encoding) = declared_encoding(bytes).and_then(Encoding::for_label) {
        debug!("按声明的编码 {} 解码文档", encoding.name());
        return encoding.decode(bytes).0;
    }

    debug!("文档不是合法的UTF-8，按 windows-1252 解码");
    WINDOWS_1252.decode(bytes).0
}

/// 取出 `<?xml ... encoding="..."?>` 中的编码标签
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    let start = bytes.windows(5).position(|w| w == b"<?xml")?;
    let rest = &bytes[start..];
    let decl = &rest[..rest.windows(2).position(|w| w == b"?>")?];
    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let value = decl[at + 8..].trim_ascii_start().strip_prefix(b"=")?.trim_ascii_start();
    let (&quote, value) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = value.iter().position(|&b| b == quote)?;
    Some(&value[..end])
}

/// 解码文本，XML预定义实体和字符引用之外再识别常见的HTML实体，失败时退回原始文本
fn decode_text(e: &BytesText) -> String {
    match e.unescape_with(|entity| resolve_predefined_entity(entity).or_else(|| html_entity(entity))) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(e).into_owned(),
    }
}

fn html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "hellip" => Some("\u{2026}"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_sequence() {
        let xml = r#"<?xml version="1.0"?>
<!-- comment -->
<html><head><meta name="dc:title" content="Book"/></head>
<body><h1 id="c1"><a href="a.smil#x">Chapter &amp; One</a></h1></body></html>"#;
        let mut tokens = XmlTokens::from_str(xml, "ncc.html");

        assert_eq!(tokens.next().unwrap(), TokenKind::Start);
        assert!(tokens.is_start("HTML"));
        assert_eq!(tokens.next().unwrap(), TokenKind::Start);
        assert_eq!(tokens.next().unwrap(), TokenKind::Start);
        assert!(tokens.is_start("meta"));
        assert_eq!(tokens.attribute("name"), Some("dc:title"));
        assert_eq!(tokens.attribute("content"), Some("Book"));
        assert_eq!(tokens.next().unwrap(), TokenKind::End);
        assert!(tokens.is_end("meta"));
        assert_eq!(tokens.next().unwrap(), TokenKind::End);
        assert!(tokens.is_end("head"));

        tokens.next().unwrap();
        tokens.next().unwrap();
        assert!(tokens.is_start("h1"));
        assert_eq!(tokens.attribute("id"), Some("c1"));
        tokens.next().unwrap();
        assert!(tokens.is_start("a"));
        assert_eq!(tokens.next().unwrap(), TokenKind::Text);
        assert_eq!(tokens.text(), "Chapter & One");
    }

    #[test]
    fn test_skip_element() {
        let xml = "<seq><par><text src='a'/><seq><audio src='b'/></seq></par><par id='p2'/></seq>";
        let mut tokens = XmlTokens::from_str(xml, "a.smil");
        tokens.next().unwrap();
        tokens.next().unwrap();
        assert!(tokens.is_start("par"));
        tokens.skip_element().unwrap();
        assert!(tokens.is_end("par"));
        tokens.next().unwrap();
        assert!(tokens.is_start("par"));
        assert_eq!(tokens.attribute("id"), Some("p2"));
    }

    #[test]
    fn test_element_text_with_html_entity() {
        let xml = "<title>  Tom&nbsp;Sawyer <span>Vol 1</span> </title>";
        let mut tokens = XmlTokens::from_str(xml, "ncc.html");
        tokens.next().unwrap();
        let text = tokens.element_text().unwrap();
        assert_eq!(text, "Tom\u{a0}Sawyer Vol 1");
        assert!(tokens.is_end("title"));
    }

    #[test]
    fn test_mixed_entities() {
        let xml = "<h1>R&amp;D &lt;1&gt; Caf&#233;&nbsp;&#x2014;</h1>";
        let mut tokens = XmlTokens::from_str(xml, "ncc.html");
        tokens.next().unwrap();
        assert_eq!(tokens.element_text().unwrap(), "R&D <1> Caf\u{e9}\u{a0}\u{2014}");
    }

    #[test]
    fn test_decode_declared_latin1() {
        let mut bytes = b"<?xml version=\"1.0\" encoding='ISO-8859-1'?><title>Caf".to_vec();
        bytes.push(0xe9);
        bytes.extend_from_slice(b"</title>");
        let text = decode_document(&bytes);
        assert!(text.ends_with("<title>Caf\u{e9}</title>"));
    }

    #[test]
    fn test_decode_without_declaration_falls_back_to_windows_1252() {
        let bytes = b"<title>\x93quoted\x94 na\xefve</title>";
        assert_eq!(decode_document(bytes), "<title>\u{201c}quoted\u{201d} na\u{ef}ve</title>");
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let bytes = "\u{feff}<title>Caf\u{e9}</title>".as_bytes();
        assert_eq!(decode_document(bytes), "<title>Caf\u{e9}</title>");
        assert!(matches!(decode_document(b"<a/>"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_declared_encoding() {
        assert_eq!(
            declared_encoding(b"<?xml version=\"1.0\" encoding = \"windows-1252\"?><a/>"),
            Some(&b"windows-1252"[..])
        );
        assert_eq!(declared_encoding(b"<?xml version=\"1.0\"?><a encoding='x'/>"), None);
        assert_eq!(declared_encoding(b"<a/>"), None);
    }

    #[test]
    fn test_unclosed_element_is_error() {
        let xml = "<par><text src='a'/>";
        let mut tokens = XmlTokens::from_str(xml, "a.smil");
        tokens.next().unwrap();
        assert!(tokens.skip_element().is_err());
    }
}
