//! NCC规则表
//!
//! 每个作用域一张表，行的顺序就是检查器中的计数序号。

use crate::daisy::check::{Cardinality, Occurs, TagRule};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use Cardinality::{Mandatory, Optional, Recommended};
use Occurs::{Many, Once};

/// 根作用域中的标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootTag {
    Html,
    Head,
    Body,
}

/// head作用域中的标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTag {
    Title,
    Meta,
}

/// body作用域中的标签，决定章节分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    Heading,
    Page,
    Block,
}

/// 写入书籍信息的元数据字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Author,
    Title,
    Narrator,
    TotalTime,
}

const fn rule<H>(names: &'static [&'static str], cardinality: Cardinality, occurs: Occurs, handler: H) -> TagRule<H> {
    TagRule { names, cardinality, occurs, handler }
}

pub const ROOT_RULES: &[TagRule<RootTag>] = &[
    rule(&["html"], Mandatory, Many, RootTag::Html),
    rule(&["head"], Mandatory, Once, RootTag::Head),
    rule(&["body"], Mandatory, Once, RootTag::Body),
];

pub const HEAD_RULES: &[TagRule<HeadTag>] = &[
    rule(&["title"], Mandatory, Once, HeadTag::Title),
    rule(&["meta"], Mandatory, Many, HeadTag::Meta),
];

pub const BODY_RULES: &[TagRule<BodyTag>] = &[
    rule(&["h1"], Mandatory, Many, BodyTag::Heading),
    rule(&["h2"], Optional, Many, BodyTag::Heading),
    rule(&["h3"], Optional, Many, BodyTag::Heading),
    rule(&["h4"], Optional, Many, BodyTag::Heading),
    rule(&["h5"], Optional, Many, BodyTag::Heading),
    rule(&["h6"], Optional, Many, BodyTag::Heading),
    rule(&["span"], Optional, Many, BodyTag::Page),
    rule(&["div"], Optional, Many, BodyTag::Block),
];

// ncc:footnotes、ncc:prodNotes、ncc:setInfo、ncc:sidebars 在书中出现对应内容时才是必须的
pub const META_RULES: &[TagRule<Option<MetaField>>] = &[
    rule(&["dc:contributor"], Optional, Once, None),
    rule(&["dc:creator"], Mandatory, Once, Some(MetaField::Author)),
    rule(&["dc:coverage"], Optional, Once, None),
    rule(&["dc:date"], Mandatory, Once, None),
    rule(&["dc:description"], Optional, Once, None),
    rule(&["dc:format", "ncc:format"], Mandatory, Once, None),
    rule(&["dc:identifier", "ncc:identifier"], Mandatory, Once, None),
    rule(&["dc:language"], Mandatory, Once, None),
    rule(&["dc:publisher"], Mandatory, Once, None),
    rule(&["dc:relation"], Optional, Once, None),
    rule(&["dc:rights"], Optional, Once, None),
    rule(&["dc:source"], Recommended, Once, None),
    rule(&["dc:subject"], Recommended, Once, None),
    rule(&["dc:title"], Mandatory, Once, Some(MetaField::Title)),
    rule(&["dc:type"], Optional, Once, None),
    rule(&["ncc:charset"], Mandatory, Once, None),
    rule(&["ncc:depth"], Recommended, Once, None),
    rule(&["ncc:files"], Recommended, Once, None),
    rule(&["ncc:footnotes"], Optional, Once, None),
    rule(&["ncc:generator"], Optional, Once, None),
    rule(&["ncc:kByteSize"], Optional, Once, None),
    rule(&["ncc:maxPageNormal"], Recommended, Once, None),
    rule(&["ncc:multimediaType"], Recommended, Once, None),
    rule(&["ncc:narrator"], Recommended, Once, Some(MetaField::Narrator)),
    rule(&["ncc:pageFront"], Mandatory, Once, None),
    rule(&["ncc:pageNormal"], Mandatory, Once, None),
    rule(&["ncc:prodNotes"], Optional, Once, None),
    rule(&["ncc:producer"], Optional, Once, None),
    rule(&["ncc:producedDate"], Optional, Once, None),
    rule(&["ncc:revision"], Optional, Once, None),
    rule(&["ncc:revisionDate"], Optional, Once, None),
    rule(&["ncc:setInfo"], Recommended, Once, None),
    rule(&["ncc:sidebars"], Recommended, Once, None),
    rule(&["ncc:sourceDate"], Recommended, Once, None),
    rule(&["ncc:sourceEdition"], Recommended, Once, None),
    rule(&["ncc:sourcePublisher"], Recommended, Once, None),
    rule(&["ncc:sourceRights"], Optional, Once, None),
    rule(&["ncc:tocItems", "ncc:tocitems", "ncc:TOCitems"], Mandatory, Once, None),
    rule(&["ncc:totalTime", "ncc:totaltime"], Mandatory, Once, Some(MetaField::TotalTime)),
    rule(&["http-equiv"], Optional, Once, None),
];

/// `http-equiv` 行的序号
pub const HTTP_EQUIV_ROW: usize = META_RULES.len() - 1;

/// 元数据名称到 (行号, 别名序号) 的索引
static META_INDEX: Lazy<HashMap<&'static str, (usize, usize)>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (row, rule) in META_RULES.iter().enumerate() {
        for (alias, name) in rule.names.iter().enumerate() {
            index.insert(*name, (row, alias));
        }
    }
    index
});

/// 按名称精确查找元数据行
pub fn lookup_meta(name: &str) -> Option<(usize, usize)> {
    META_INDEX.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daisy::check::SLOT_LIMIT;

    #[test]
    fn test_tables_fit_checker() {
        assert!(META_RULES.len() <= SLOT_LIMIT);
        assert!(BODY_RULES.len() <= SLOT_LIMIT);
    }

    #[test]
    fn test_lookup_meta() {
        let (row, alias) = lookup_meta("ncc:TOCitems").unwrap();
        assert_eq!(META_RULES[row].canonical(), "ncc:tocItems");
        assert_eq!(alias, 2);
        assert_eq!(lookup_meta("dc:title").map(|(_, a)| a), Some(0));
        assert!(lookup_meta("DC:TITLE").is_none());
        assert_eq!(META_RULES[HTTP_EQUIV_ROW].canonical(), "http-equiv");
    }
}
