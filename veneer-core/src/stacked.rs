//! 可叠栈对象
//!
//! 被装饰类型经 [`Stacked`] 包装后，所有被拦截操作都改道经过层栈
//! 头环。链在首次需要分发时惰性装配，随对象存续期复用，绝不跨
//! 对象共享。

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::StackResult;
use crate::facts::TypeFacts;
use crate::link::Link;
use crate::registry::LayerRegistry;

/// 可叠栈类型的声明
///
/// 每个被装饰的具体类型实现一次：指明自己的层表面（该能力的层
/// trait 对象类型）、静态事实表，以及终端适配器的构造方式。
/// `terminal` 通常返回泛型 [`Terminal`](crate::link::Terminal)；
/// 需要在抵达真实实现前做对象专属参数整形时，返回一个手写的
/// 专属包装即可，它优先于泛型适配器。
pub trait Stackable: Send + Sync + Sized + 'static {
    /// 本类型被拦截操作所属的层 trait 对象类型
    type Surface: ?Sized + Link<Self::Surface> + Send + Sync + 'static;

    /// 本类型的声明事实（匹配规则据此查表）
    fn facts() -> &'static TypeFacts;

    /// 构造链底的终端适配器
    fn terminal(target: Arc<Self>) -> Box<Self::Surface>;
}

/// 被装饰对象：内部目标 + 注册表句柄 + 惰性装配的层栈
///
/// 对象独占自己的链引用；链的终端独占指回对象的引用，仅用于
/// 抵达真实实现。同一对象并发触发两次装配只是浪费一次工作，
/// 不会不安全；装配结果按对象记忆化。
pub struct Stacked<T: Stackable> {
    inner: Arc<T>,
    registry: Arc<LayerRegistry<T::Surface>>,
    stack: OnceCell<Box<T::Surface>>,
}

impl<T: Stackable> Stacked<T> {
    /// 包装一个对象
    pub fn new(inner: T, registry: Arc<LayerRegistry<T::Surface>>) -> Self {
        Self::from_arc(Arc::new(inner), registry)
    }

    /// 包装一个已在 `Arc` 里的对象
    pub fn from_arc(inner: Arc<T>, registry: Arc<LayerRegistry<T::Surface>>) -> Self {
        Self {
            inner,
            registry,
            stack: OnceCell::new(),
        }
    }

    /// 原始对象（绕过层栈）
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// 层栈头环；首次调用时装配
    ///
    /// # Panics
    ///
    /// 装配失败说明注册配置有缺陷；错误原样携带在 panic 信息里。
    /// 需要以值的形式拿到失败时用 [`try_stack`](Self::try_stack)。
    pub fn stack(&self) -> &T::Surface {
        match self.try_stack() {
            Ok(head) => head,
            Err(err) => panic!(
                "could not assemble layer stack for `{}`: {err}",
                T::facts().name()
            ),
        }
    }

    /// 层栈头环的可失败形式
    pub fn try_stack(&self) -> StackResult<&T::Surface> {
        self.stack
            .get_or_try_init(|| self.registry.stack_for(&self.inner))
            .map(|head| head.as_ref())
    }
}
