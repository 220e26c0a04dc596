//! NCC（导航控制中心）模块
//!
//! 解析Daisy 2.02的 `ncc.html`，生成章节脊柱和书籍信息。

mod parser;
mod tables;

pub use parser::{parse_file, parse_str, NccOutcome};
pub use tables::{lookup_meta, MetaField, META_RULES};
