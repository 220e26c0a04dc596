//! Daisy 2.02 规范一致性检查
//!
//! 检查器按作用域（如 `head`、`body`、`meta`）记录每个标签出现的次数，
//! 在作用域结束时根据规则表给出缺失或重复的诊断。它只产生诊断，从不影响解析出的文档结构。

use tracing::{debug, warn};

/// 每个作用域可记录的规则行数上限
pub const SLOT_LIMIT: usize = 64;

/// 标签在规范中的要求程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// 必须出现
    Mandatory,
    /// 可选
    Optional,
    /// 推荐出现
    Recommended,
}

/// 标签允许出现的次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    /// 至多一次
    Once,
    /// 不限次数
    Many,
}

/// 规则表中的一行：别名集合、要求程度、出现次数和对应的处理方式
#[derive(Debug, Clone, Copy)]
pub struct TagRule<H> {
    /// 第一个名称为规范名称，其余为兼容的别名
    pub names: &'static [&'static str],
    pub cardinality: Cardinality,
    pub occurs: Occurs,
    pub handler: H,
}

impl<H> TagRule<H> {
    /// 规范名称
    pub fn canonical(&self) -> &'static str {
        self.names.first().copied().unwrap_or("")
    }
}

/// 在规则表中按标签名查找（不区分大小写）
///
/// # 返回值
/// * `Option<(usize, &TagRule<H>)>` - 规则行号及规则
pub fn find_rule<'r, H>(rules: &'r [TagRule<H>], name: &str) -> Option<(usize, &'r TagRule<H>)> {
    rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.names.iter().any(|alias| alias.eq_ignore_ascii_case(name)))
}

/// 按名称精确查找（区分大小写），同时返回命中的别名序号
pub fn find_rule_exact<'r, H>(rules: &'r [TagRule<H>], name: &str) -> Option<(usize, usize, &'r TagRule<H>)> {
    rules.iter().enumerate().find_map(|(row, rule)| {
        rule.names
            .iter()
            .position(|alias| *alias == name)
            .map(|alias| (row, alias, rule))
    })
}

/// 诊断类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// 必须的标签没有出现
    MissingMandatory,
    /// 推荐的标签没有出现
    MissingRecommended,
    /// 只允许出现一次的标签出现了多次
    Duplicate(u8),
}

/// 一条一致性诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub scope: String,
    pub tag: &'static str,
    pub kind: FindingKind,
}

impl Finding {
    /// 输出到日志
    pub fn log(&self) {
        match self.kind {
            FindingKind::MissingMandatory => {
                warn!("[check] {} : {} mandatory but unavailable", self.scope, self.tag)
            }
            FindingKind::MissingRecommended => {
                debug!("[check] {} : {} is recommended", self.scope, self.tag)
            }
            FindingKind::Duplicate(count) => warn!(
                "[check] {} : {} exists {} times but only one is specified",
                self.scope, self.tag, count
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct ScopeCounters {
    name: String,
    slots: [u8; SLOT_LIMIT],
}

/// 按作用域计数的检查器
#[derive(Debug, Clone, Default)]
pub struct Checker {
    scopes: Vec<ScopeCounters>,
}

impl Checker {
    /// 创建空的检查器
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// 创建并注册一组作用域
    pub fn with_scopes(names: &[&str]) -> Self {
        let mut checker = Self::new();
        for name in names {
            checker.register(name);
        }
        checker
    }

    /// 注册作用域，已存在时不做任何事
    pub fn register(&mut self, scope: &str) {
        if self.find(scope).is_some() {
            return;
        }
        self.scopes.push(ScopeCounters {
            name: scope.to_string(),
            slots: [0; SLOT_LIMIT],
        });
    }

    fn find(&self, scope: &str) -> Option<&ScopeCounters> {
        self.scopes.iter().find(|s| s.name.eq_ignore_ascii_case(scope))
    }

    /// 记录一次标签出现
    ///
    /// # 返回值
    /// * `bool` - 作用域未注册或序号超过上限时返回 false
    pub fn record(&mut self, scope: &str, slot: usize) -> bool {
        if slot >= SLOT_LIMIT {
            return false;
        }
        match self.scopes.iter_mut().find(|s| s.name.eq_ignore_ascii_case(scope)) {
            Some(counters) => {
                counters.slots[slot] = counters.slots[slot].saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// 读取某个标签的出现次数
    pub fn count(&self, scope: &str, slot: usize) -> u8 {
        if slot >= SLOT_LIMIT {
            return 0;
        }
        self.find(scope).map(|s| s.slots[slot]).unwrap_or(0)
    }

    /// 清零一个作用域的计数
    pub fn flush(&mut self, scope: &str) {
        if let Some(counters) = self.scopes.iter_mut().find(|s| s.name.eq_ignore_ascii_case(scope)) {
            counters.slots = [0; SLOT_LIMIT];
        }
    }

    /// 清零全部作用域的计数
    pub fn flush_all(&mut self) {
        for counters in &mut self.scopes {
            counters.slots = [0; SLOT_LIMIT];
        }
    }

    /// 按规则表检查一个作用域
    pub fn validate<H>(&self, scope: &str, rules: &[TagRule<H>]) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (slot, rule) in rules.iter().enumerate() {
            let count = self.count(scope, slot);
            let kind = match (count, rule.cardinality, rule.occurs) {
                (0, Cardinality::Mandatory, _) => Some(FindingKind::MissingMandatory),
                (0, Cardinality::Recommended, _) => Some(FindingKind::MissingRecommended),
                (n, _, Occurs::Once) if n > 1 => Some(FindingKind::Duplicate(n)),
                _ => None,
            };
            if let Some(kind) = kind {
                findings.push(Finding {
                    scope: scope.to_string(),
                    tag: rule.canonical(),
                    kind,
                });
            }
        }
        findings
    }

    /// 检查作用域后清零其计数
    pub fn close_scope<H>(&mut self, scope: &str, rules: &[TagRule<H>]) -> Vec<Finding> {
        let findings = self.validate(scope, rules);
        self.flush(scope);
        findings
    }
}

/// 输出全部诊断
///
/// # 返回值
/// * `usize` - 诊断条数
pub fn report(findings: &[Finding]) -> usize {
    for finding in findings {
        finding.log();
    }
    findings.len()
}

/// 输出不属于规范的标签警告
pub fn report_unknown_tag(scope: &str, name: &str) {
    warn!("the tag <{}> in <{}> is not part of Daisy 2.02 specifications", name, scope);
}
