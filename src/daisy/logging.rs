//! 日志输出模块
//!
//! 基于 `tracing` 输出解析诊断信息。日志级别由 [`Verbosity`] 描述，
//! 安装订阅者后通过 [`LogHandle`] 在运行时调整，不依赖进程级的可变全局变量。

use crate::daisy::error::{DaisyError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

/// 日志详细程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// 不输出任何信息
    None,
    /// 调试用的超详细输出
    Verbose,
    /// 正常的处理过程
    #[default]
    Info,
    /// 无害的失败
    Warning,
    /// 可能导致异常行为的错误
    Error,
    /// 导致库无法工作的错误
    Critical,
}

impl Verbosity {
    /// 转换为 `tracing` 的级别过滤器
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::None => LevelFilter::OFF,
            Verbosity::Verbose => LevelFilter::TRACE,
            Verbosity::Info => LevelFilter::INFO,
            Verbosity::Warning => LevelFilter::WARN,
            Verbosity::Error | Verbosity::Critical => LevelFilter::ERROR,
        }
    }
}

/// 已安装的日志订阅者句柄，用于运行时修改日志级别
#[derive(Debug, Clone)]
pub struct LogHandle {
    handle: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    /// 修改全局日志级别
    pub fn set_verbosity(&self, verbosity: Verbosity) -> Result<()> {
        self.handle
            .modify(|filter| *filter = verbosity.level_filter())
            .map_err(|e| DaisyError::Config(format!("无法修改日志级别: {}", e)))
    }

    /// 当前生效的日志级别
    pub fn current(&self) -> Option<LevelFilter> {
        self.handle.clone_current()
    }
}

/// 安装输出到标准错误的日志订阅者
///
/// 设置了 `RUST_LOG` 时按其中的规则进一步筛选。
/// 每个进程只能成功安装一次，重复调用会返回 [`DaisyError::Config`]。
pub fn init(verbosity: Verbosity) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(verbosity.level_filter());
    let env_filter = EnvFilter::try_from_default_env().ok();

    tracing_subscriber::registry()
        .with(filter)
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| DaisyError::Config(format!("无法安装日志订阅者: {}", e)))?;

    Ok(LogHandle { handle })
}
