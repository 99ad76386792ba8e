//! 链环（Link）契约
//!
//! 每条层栈是一条单向链：若干层环环相扣，底部以终端适配器收尾。
//! 层默认把未覆写的操作原样转发给下一环；终端适配器没有"下一环"
//! 的概念，它的转发永远抵达被装饰对象的真实实现。
//!
//! 每个能力的层 trait 自带 `bind_next` / `next_link` 两个链接方法；
//! 宏展开（或手写一行委派）再把注册表面向的 [`Link`] 契约实现到
//! 该能力的 trait 对象上，装配折叠由此对任意能力通用。

use std::sync::Arc;

use crate::error::{StackError, StackResult};

/// 注册表面向的链接契约
///
/// `S` 是某个能力的层 trait 对象类型（例如 `dyn NoteLayer`）。
/// 该契约由每个能力为自己的 `dyn` 类型委派实现一次，装配折叠
/// 据此把新层绑到当前头环上。链环只有两个状态：未绑定 → 已绑定；
/// 装配完成之前不得转发。
pub trait Link<S: ?Sized> {
    /// 绑定下一环（未绑定 → 已绑定）
    fn bind_next(&mut self, next: Box<S>);

    /// 取下一环的引用
    ///
    /// # Panics
    ///
    /// 在未绑定的非终端层上调用会 panic——链必须装配完毕才能使用，
    /// 这是编程错误而非可恢复条件。
    fn next_link(&self) -> &S;
}

/// 每个具体层内嵌的下一环存储
///
/// 具体层把它放进一个字段，再用 [`link_methods!`](crate::link_methods)
/// 在层 trait 实现里展开两个链接方法。
pub struct NextSlot<S: ?Sized> {
    slot: Option<Box<S>>,
}

impl<S: ?Sized> NextSlot<S> {
    /// 未绑定的空槽
    pub const fn unbound() -> Self {
        Self { slot: None }
    }

    /// 绑定下一环
    pub fn bind(&mut self, next: Box<S>) {
        self.slot = Some(next);
    }

    /// 是否已绑定
    pub fn is_bound(&self) -> bool {
        self.slot.is_some()
    }

    /// 取下一环；未绑定时返回 [`StackError::NoNextLink`]
    pub fn try_get(&self) -> StackResult<&S> {
        self.slot.as_deref().ok_or(StackError::NoNextLink)
    }

    /// 取下一环；未绑定时 panic（默认转发路径使用）
    pub fn get(&self) -> &S {
        match self.try_get() {
            Ok(next) => next,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<S: ?Sized> Default for NextSlot<S> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<S: ?Sized> std::fmt::Debug for NextSlot<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextSlot")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// 终端适配器——每条层栈的底端
///
/// 持有被装饰对象的引用，仅作为最终委派目标，绝不用于链遍历。
/// 把操作转发给它意味着调用对象的真实（未装饰）实现，而不是继续
/// 沿链前进；按构造它不可能以 `NoNextLink` 失败。
///
/// 每个能力的宏展开（或手写的专属包装）负责为 `Terminal<T>` 实现
/// 该能力的层 trait：`bind_next` 是无操作（终端没有下一环的概念），
/// 每个操作调用 `self.target()` 上的真实方法。
pub struct Terminal<T> {
    target: Arc<T>,
}

impl<T> Terminal<T> {
    /// 包装被装饰对象
    pub fn new(target: Arc<T>) -> Self {
        Self { target }
    }

    /// 真实实现的访问入口
    pub fn target(&self) -> &T {
        &self.target
    }
}
