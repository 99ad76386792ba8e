//! 层规格（LayerSpec）与实例化策略
//!
//! 一条注册携带三种形态之一的层规格：
//! - 已登记的层类型名——每条链按默认构造器取一个全新实例
//! - 零参工厂——每条链调用一次工厂
//! - 原型——每条链从模板复制出一份独立的新实例
//!
//! 无论哪种形态，产出值都必须是该能力的层 trait 对象；
//! 这一点由类型系统在编译期保证。

use std::sync::Arc;

use crate::error::StackResult;

/// 零参可失败工厂
pub type LayerFactory<S> = Arc<dyn Fn() -> StackResult<Box<S>> + Send + Sync>;

/// 原型来源：从持有的模板产出一份独立的新层
///
/// 这是对隐式浅拷贝语义的显式替代——复制行为由实现者写明，
/// 产出值保留模板当时的字段值，且与模板、与其他副本互不共享。
pub trait PrototypeSource<S: ?Sized>: Send + Sync {
    fn duplicate(&self) -> Box<S>;
}

/// 现成的原型实现：模板 + 物化函数
///
/// 物化函数在调用点写成 `|t| Box::new(t.clone())` 即可，
/// 装箱处的强制转换由编译器完成。
pub struct Prototype<T, S: ?Sized> {
    template: T,
    materialize: fn(&T) -> Box<S>,
}

impl<T, S: ?Sized> Prototype<T, S> {
    pub fn new(template: T, materialize: fn(&T) -> Box<S>) -> Self {
        Self {
            template,
            materialize,
        }
    }

    /// 模板的只读访问
    pub fn template(&self) -> &T {
        &self.template
    }
}

impl<T: Send + Sync, S: ?Sized> PrototypeSource<S> for Prototype<T, S> {
    fn duplicate(&self) -> Box<S> {
        (self.materialize)(&self.template)
    }
}

/// 层规格：一条注册如何产出层实例
pub enum LayerSpec<S: ?Sized> {
    /// 已登记的层类型名；装配时经注册表目录默认构造
    Named(String),
    /// 零参工厂；装配时调用
    ///
    /// 注册期会探测调用一次以校验工厂（见
    /// [`LayerRegistry::add`](crate::registry::LayerRegistry::add)），
    /// 工厂必须容忍这次额外调用。
    Factory(LayerFactory<S>),
    /// 原型；装配时复制
    Prototype(Arc<dyn PrototypeSource<S>>),
}

impl<S: ?Sized + 'static> LayerSpec<S> {
    /// 按已登记的类型名引用层
    pub fn named(name: impl Into<String>) -> Self {
        LayerSpec::Named(name.into())
    }

    /// 由零参工厂产出层
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> StackResult<Box<S>> + Send + Sync + 'static,
    {
        LayerSpec::Factory(Arc::new(factory))
    }

    /// 由原型来源复制层
    pub fn prototype_source(source: impl PrototypeSource<S> + 'static) -> Self {
        LayerSpec::Prototype(Arc::new(source))
    }

    /// 由模板 + 物化函数复制层
    pub fn prototype<T: Send + Sync + 'static>(
        template: T,
        materialize: fn(&T) -> Box<S>,
    ) -> Self {
        Self::prototype_source(Prototype::new(template, materialize))
    }

    /// 规格形态的描述（日志与错误信息用）
    pub fn describe(&self) -> String {
        match self {
            LayerSpec::Named(name) => format!("named layer `{name}`"),
            LayerSpec::Factory(_) => "layer factory".to_string(),
            LayerSpec::Prototype(_) => "layer prototype".to_string(),
        }
    }
}

impl<S: ?Sized> Clone for LayerSpec<S> {
    fn clone(&self) -> Self {
        match self {
            LayerSpec::Named(name) => LayerSpec::Named(name.clone()),
            LayerSpec::Factory(factory) => LayerSpec::Factory(Arc::clone(factory)),
            LayerSpec::Prototype(source) => LayerSpec::Prototype(Arc::clone(source)),
        }
    }
}

impl<S: ?Sized + 'static> From<&str> for LayerSpec<S> {
    fn from(name: &str) -> Self {
        LayerSpec::named(name)
    }
}

impl<S: ?Sized + 'static> From<String> for LayerSpec<S> {
    fn from(name: String) -> Self {
        LayerSpec::named(name)
    }
}

impl<S: ?Sized> std::fmt::Debug for LayerSpec<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
            LayerSpec::Factory(_) => f.write_str("Factory(..)"),
            LayerSpec::Prototype(_) => f.write_str("Prototype(..)"),
        }
    }
}
