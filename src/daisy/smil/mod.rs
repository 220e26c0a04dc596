//! SMIL（同步多媒体）模块
//!
//! 按需解析单个章节的SMIL文件，生成该章节的段落脊柱。

mod clock;
mod parser;
mod resolver;
mod tables;

pub use clock::parse_clock_ms;
pub use parser::{parse_file, parse_str, SmilOutcome};
pub use resolver::{FragmentResolver, ResolverState};
