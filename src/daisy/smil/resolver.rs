//! 片段定位
//!
//! 在SMIL文件中寻找章节片段标识符所指的同步块。

/// 定位状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// 尚未遇到目标片段
    Seeking,
    /// 已经找到目标片段，之后保持不变
    Found,
}

/// 片段定位器
#[derive(Debug, Clone)]
pub struct FragmentResolver {
    target: Option<String>,
    state: ResolverState,
}

impl FragmentResolver {
    /// 创建定位器，没有目标片段时直接处于 `Found`
    pub fn new(target: Option<&str>) -> Self {
        let state = match target {
            Some(_) => ResolverState::Seeking,
            None => ResolverState::Found,
        };
        Self {
            target: target.map(str::to_string),
            state,
        }
    }

    /// 检查一个元素的id
    ///
    /// # 返回值
    /// * `bool` - 检查之后是否处于 `Found`
    pub fn inspect(&mut self, id: Option<&str>) -> bool {
        if self.state == ResolverState::Seeking && id.is_some() && id == self.target.as_deref() {
            self.state = ResolverState::Found;
        }
        self.is_found()
    }

    pub fn is_found(&self) -> bool {
        self.state == ResolverState::Found
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }
}
