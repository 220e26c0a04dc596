//! 脊柱模块
//!
//! 章节和段落都按阅读顺序存放在一个以编号寻址的数组中：编号从1开始连续分配，
//! 元素的前后邻居就是数组中的相邻位置。脊柱另外维护一个可移动的游标。

/// 可放入脊柱的元素，编号在追加时分配
pub trait SpineEntry {
    /// 元素编号（从1开始）
    fn id(&self) -> usize;
    /// 由脊柱在追加时调用
    fn assign_id(&mut self, id: usize);
}

/// 带游标的有序元素序列
#[derive(Debug, Clone)]
pub struct Spine<T> {
    items: Vec<T>,
    cursor: Option<usize>,
}

impl<T: SpineEntry> Default for Spine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SpineEntry> Spine<T> {
    /// 创建空脊柱
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }

    /// 在尾部追加元素并分配编号
    ///
    /// 第一个元素追加时游标指向它。
    ///
    /// # 返回值
    /// * `usize` - 新元素的编号
    pub fn push(&mut self, mut item: T) -> usize {
        let id = self.items.len() + 1;
        item.assign_id(id);
        self.items.push(item);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
        id
    }

    /// 清空脊柱，游标随之失效
    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn head(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn tail(&self) -> Option<&T> {
        self.items.last()
    }

    /// 游标所在的元素
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|index| self.items.get(index))
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        match self.cursor {
            Some(index) => self.items.get_mut(index),
            None => None,
        }
    }

    /// 游标所在元素的编号
    pub fn cursor_id(&self) -> Option<usize> {
        self.current().map(SpineEntry::id)
    }

    /// 按编号获取元素
    pub fn get(&self, id: usize) -> Option<&T> {
        id.checked_sub(1).and_then(|index| self.items.get(index))
    }

    /// 按数组位置获取可变元素（位置由 [`Spine::walk_to`] 得到）
    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// 从头部到游标（包含）的元素
    pub fn up_to_cursor(&self) -> &[T] {
        match self.cursor {
            Some(index) => &self.items[..=index],
            None => &[],
        }
    }

    /// 从游标出发逐个邻居地走向目标编号，不移动游标
    ///
    /// 目标编号大于当前编号时向后走，否则向前走，走出脊柱即失败。
    ///
    /// # 返回值
    /// * `Option<usize>` - 目标元素在数组中的位置
    pub fn walk_to(&self, target: usize) -> Option<usize> {
        let mut index = self.cursor?;
        let forward = target > self.items[index].id();

        while self.items[index].id() != target {
            index = if forward {
                let next = index + 1;
                if next >= self.items.len() {
                    return None;
                }
                next
            } else {
                index.checked_sub(1)?
            };
        }
        Some(index)
    }

    /// 把游标移到指定位置（由 [`Spine::walk_to`] 得到）
    pub fn set_cursor(&mut self, index: usize) {
        if index < self.items.len() {
            self.cursor = Some(index);
        }
    }

    /// 游标所在的数组位置
    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Item {
        id: usize,
    }

    impl SpineEntry for Item {
        fn id(&self) -> usize {
            self.id
        }
        fn assign_id(&mut self, id: usize) {
            self.id = id;
        }
    }

    fn spine_of(n: usize) -> Spine<Item> {
        let mut spine = Spine::new();
        for _ in 0..n {
            spine.push(Item::default());
        }
        spine
    }

    #[test]
    fn test_ids_are_dense() {
        let spine = spine_of(5);
        let ids: Vec<_> = spine.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(spine.cursor_id(), Some(1));
        assert_eq!(spine.tail().map(|i| i.id), Some(5));
    }

    #[test]
    fn test_walk_both_directions() {
        let mut spine = spine_of(5);
        let index = spine.walk_to(4).unwrap();
        spine.set_cursor(index);
        assert_eq!(spine.cursor_id(), Some(4));

        let index = spine.walk_to(2).unwrap();
        spine.set_cursor(index);
        assert_eq!(spine.cursor_id(), Some(2));
        assert_eq!(spine.up_to_cursor().len(), 2);
    }

    #[test]
    fn test_walk_out_of_bounds() {
        let spine = spine_of(3);
        assert!(spine.walk_to(4).is_none());
        assert!(spine.walk_to(0).is_none());
        assert_eq!(spine.cursor_id(), Some(1));
        assert!(Spine::<Item>::new().walk_to(1).is_none());
    }

    #[test]
    fn test_clear() {
        let mut spine = spine_of(3);
        spine.clear();
        assert!(spine.is_empty());
        assert!(spine.current().is_none());
        assert_eq!(spine.push(Item::default()), 1);
    }
}
