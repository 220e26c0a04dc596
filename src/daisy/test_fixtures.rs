//! 测试用的NCC与SMIL文档

use std::fs;
use tempfile::TempDir;

/// 包含全部必须与推荐元数据的NCC头部
pub const FULL_NCC_HEAD: &str = r#"
    <title>A Test Book</title>
    <meta http-equiv="Content-type" content="text/html; charset=utf-8" />
    <meta name="dc:creator" content="Jane Writer" />
    <meta name="dc:date" content="2001-01-01" />
    <meta name="dc:format" content="Daisy 2.02" />
    <meta name="dc:identifier" content="TEST-0001" />
    <meta name="dc:language" content="en" />
    <meta name="dc:publisher" content="Test Press" />
    <meta name="dc:source" content="ISBN 0000000000" />
    <meta name="dc:subject" content="Testing" />
    <meta name="dc:title" content="A Test Book" />
    <meta name="ncc:charset" content="utf-8" />
    <meta name="ncc:depth" content="2" />
    <meta name="ncc:files" content="5" />
    <meta name="ncc:maxPageNormal" content="1" />
    <meta name="ncc:multimediaType" content="audioNcc" />
    <meta name="ncc:narrator" content="John Reader" />
    <meta name="ncc:pageFront" content="0" />
    <meta name="ncc:pageNormal" content="1" />
    <meta name="ncc:setInfo" content="1 of 1" />
    <meta name="ncc:sidebars" content="0" />
    <meta name="ncc:sourceDate" content="2000" />
    <meta name="ncc:sourceEdition" content="1st" />
    <meta name="ncc:sourcePublisher" content="Source Press" />
    <meta name="ncc:tocItems" content="4" />
    <meta name="ncc:totalTime" content="0:01:10" />
"#;

/// 去掉指定元数据后的NCC头部
pub fn ncc_without_meta(name: &str) -> String {
    let needle = format!("name=\"{}\"", name);
    FULL_NCC_HEAD
        .lines()
        .filter(|line| !line.contains(&needle))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 组装完整的NCC文档
pub fn ncc_document(head: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>{}</head>
<body>{}</body>
</html>"#,
        head, body
    )
}

/// 包含全部必须与推荐元素的SMIL头部
pub const FULL_SMIL_HEAD: &str = r#"
    <meta name="dc:format" content="Daisy 2.02" />
    <meta name="dc:identifier" content="TEST-0001" />
    <meta name="ncc:timeInThisSmil" content="0:00:04" />
    <meta name="ncc:totalElapsedTime" content="0:00:00" />
    <layout><region id="txtView" /></layout>
"#;

/// 组装完整的SMIL文档，`blocks` 放在主序列中
pub fn smil_document(head: &str, blocks: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE smil PUBLIC "-//W3C//DTD SMIL 1.0//EN" "http://www.w3.org/TR/REC-smil/SMIL10.dtd">
<smil>
<head>{}</head>
<body><seq dur="4.0s">{}</seq></body>
</smil>"#,
        head, blocks
    )
}

/// 一个带单个音频片段的同步块
pub fn par(id: &str, begin: &str, end: &str) -> String {
    format!(
        r#"<par endsync="last" id="{id}">
  <text src="book.html#{id}_txt" id="{id}_txt" />
  <audio src="book.mp3" clip-begin="npt={begin}" clip-end="npt={end}" id="{id}_aud" />
</par>"#
    )
}

/// 三个首尾相接的段落：[0,1000)、[1000,2500)、[2500,4000)
pub fn three_passages() -> String {
    [par("p1", "0.000s", "1.000s"), par("p2", "1.000s", "2.500s"), par("p3", "2.500s", "4.000s")].concat()
}

/// 包含 `frag7` 片段的SMIL同步块序列
pub fn fragment_blocks() -> String {
    [
        par("frag5", "0.000s", "1.000s"),
        par("frag6", "1.000s", "2.000s"),
        par("frag7", "2.000s", "3.000s"),
        par("frag8", "3.000s", "4.000s"),
    ]
    .concat()
}

/// 测试用的完整有声读物：
/// 章节 h1(chap1) h2(chap2) h1(chap3#frag7) h3(chap1) span(empty)
pub fn book_files() -> Vec<(&'static str, String)> {
    let body = r##"
        <h1 id="c1"><a href="chap1.smil">One</a></h1>
        <h2 id="c2"><a href="chap2.smil">One point one</a></h2>
        <h1 id="c3"><a href="chap3.smil#frag7">Two</a></h1>
        <h3 id="c4"><a href="chap1.smil#p2">Two sub</a></h3>
        <span id="c5" class="page-normal"><a href="empty.smil">1</a></span>
    "##;
    vec![
        ("ncc.html", ncc_document(FULL_NCC_HEAD, body)),
        ("chap1.smil", smil_document(FULL_SMIL_HEAD, &three_passages())),
        ("chap2.smil", smil_document(FULL_SMIL_HEAD, &par("q1", "0s", "2s"))),
        ("chap3.smil", smil_document(FULL_SMIL_HEAD, &fragment_blocks())),
        ("empty.smil", smil_document(FULL_SMIL_HEAD, "")),
    ]
}

/// 把文件写入临时目录
pub fn write_book(files: &[(&str, String)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}
