//! SMIL规则表

use crate::daisy::check::{Cardinality, Occurs, TagRule};

use Cardinality::{Mandatory, Optional, Recommended};
use Occurs::{Many, Once};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootTag {
    Smil,
    Head,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTag {
    Layout,
    Meta,
}

/// 主序列中的元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqTag {
    Par,
    Seq,
}

/// 同步块中的元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParTag {
    Text,
    Audio,
    Seq,
}

/// 写入章节的SMIL元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmilMetaField {
    Duration,
    ElapsedTime,
}

const fn rule<H>(names: &'static [&'static str], cardinality: Cardinality, occurs: Occurs, handler: H) -> TagRule<H> {
    TagRule { names, cardinality, occurs, handler }
}

pub const ROOT_RULES: &[TagRule<RootTag>] = &[
    rule(&["smil"], Mandatory, Many, RootTag::Smil),
    rule(&["head"], Mandatory, Once, RootTag::Head),
    rule(&["body"], Mandatory, Once, RootTag::Body),
];

pub const HEAD_RULES: &[TagRule<HeadTag>] = &[
    rule(&["layout"], Optional, Once, HeadTag::Layout),
    rule(&["meta"], Mandatory, Many, HeadTag::Meta),
];

pub const LAYOUT_RULES: &[TagRule<()>] = &[rule(&["region"], Mandatory, Once, ())];

pub const BODY_RULES: &[TagRule<()>] = &[rule(&["seq"], Mandatory, Once, ())];

pub const MAINSEQ_RULES: &[TagRule<SeqTag>] = &[
    rule(&["par"], Mandatory, Many, SeqTag::Par),
    rule(&["seq"], Optional, Many, SeqTag::Seq),
];

pub const PAR_RULES: &[TagRule<ParTag>] = &[
    rule(&["text"], Mandatory, Once, ParTag::Text),
    rule(&["audio"], Optional, Once, ParTag::Audio),
    rule(&["seq"], Optional, Many, ParTag::Seq),
];

pub const META_RULES: &[TagRule<Option<SmilMetaField>>] = &[
    rule(&["dc:format", "format"], Mandatory, Once, None),
    rule(&["dc:identifier"], Recommended, Once, None),
    rule(&["dc:title"], Optional, Once, None),
    rule(&["ncc:generator"], Optional, Once, None),
    rule(
        &["ncc:timeInThisSmil", "time-in-this-smil"],
        Recommended,
        Once,
        Some(SmilMetaField::Duration),
    ),
    rule(
        &["ncc:totalElapsedTime", "total-elapsed-time"],
        Recommended,
        Once,
        Some(SmilMetaField::ElapsedTime),
    ),
    rule(&["title"], Optional, Once, None),
];
