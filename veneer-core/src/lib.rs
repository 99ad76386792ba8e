// veneer-core: 层栈注册与链装配引擎
//
// 在不改动目标类型源码的前提下，给选定对象的选定操作挂接横切行为
// （日志、缓存、校验、度量）。注册一次、全局生效：每条注册把一个
// 层规格绑到一条类型匹配规则上；调用期为具体对象解析适用的层、
// 确定性排序、装配成一条以终端适配器收尾的活链。
//
// - 未覆写的操作默认原样转发给下一环
// - 终端适配器抵达对象的真实（未装饰）实现
// - 解析结果按具体类型缓存，任何新注册整表失效
// - 校验快速失败：配置错误在注册时暴露，不拖到首次分发

pub mod error;
pub mod facts;
pub mod link;
pub mod logging;
pub mod matching;
pub mod registry;
pub mod spec;
pub mod stacked;

// 重新导出常用类型
pub use error::{StackError, StackResult};
pub use facts::TypeFacts;
pub use link::{Link, NextSlot, Terminal};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use matching::{MatchExpr, MatchKind, MatchTargets};
pub use registry::{CatalogEntry, LayerRegistry, Registration};
pub use spec::{LayerFactory, LayerSpec, Prototype, PrototypeSource};
pub use stacked::{Stackable, Stacked};

// 导出 inventory 与 once_cell，供宏展开使用
pub use inventory;
pub use once_cell;

/// 预导入模块
pub mod prelude {
    pub use crate::error::{StackError, StackResult};
    pub use crate::facts::TypeFacts;
    pub use crate::link::{Link, NextSlot, Terminal};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::matching::{MatchExpr, MatchKind, MatchTargets};
    pub use crate::registry::{CatalogEntry, LayerRegistry, Registration};
    pub use crate::spec::{LayerSpec, Prototype, PrototypeSource};
    pub use crate::stacked::{Stackable, Stacked};
    pub use crate::{link_methods, link_surface};
}

/// 在层 trait 实现里展开两个链接方法
///
/// 具体层把下一环存进一个 [`NextSlot`] 字段，再用本宏补齐链接契约：
///
/// ```ignore
/// use veneer_core::{link_methods, NextSlot};
///
/// #[derive(Default)]
/// struct Shout {
///     next: NextSlot<dyn NoteLayer>,
/// }
///
/// impl NoteLayer for Shout {
///     link_methods!(dyn NoteLayer, next);
///
///     fn body(&self, times: usize) -> String {
///         self.next_link().body(times).to_uppercase()
///     }
/// }
/// ```
#[macro_export]
macro_rules! link_methods {
    (dyn $layer:ident, $field:ident) => {
        fn bind_next(&mut self, next: ::std::boxed::Box<dyn $layer>) {
            self.$field.bind(next);
        }

        fn next_link(&self) -> &(dyn $layer + 'static) {
            self.$field.get()
        }
    };
}

/// 把注册表面向的 [`Link`] 契约委派到某个能力的层 trait 对象上
///
/// `#[layered]` 的展开会自动生成这一实现；手写能力展开时自己
/// 调用一次即可：
///
/// ```ignore
/// veneer_core::link_surface!(NoteLayer);
/// ```
#[macro_export]
macro_rules! link_surface {
    ($layer:ident) => {
        impl $crate::Link<dyn $layer> for dyn $layer {
            fn bind_next(&mut self, next: ::std::boxed::Box<dyn $layer>) {
                $layer::bind_next(self, next)
            }

            fn next_link(&self) -> &(dyn $layer + 'static) {
                $layer::next_link(self)
            }
        }
    };
}

// 测试里会编译 #[layered] 的展开产物，它按外部调用方的路径引用本 crate
#[cfg(test)]
extern crate self as veneer_core;
