//! Veneer 过程宏
//!
//! 提供 `#[layered]` 属性宏：标注在能力 trait 上，生成该能力的
//! 三件转发制品——层 trait（默认方法转发给下一环）、终端适配器
//! 实现（抵达真实实现）、被装饰对象实现（改道经过层栈头环），
//! 外加目录装载胶水。

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemTrait};

mod expand;
mod utils;

/// `#[layered]` 属性宏
///
/// 标注在能力 trait 上。对 trait `Foo` 生成：
///
/// - `trait FooLayer` —— 层 trait，逐个操作给出"转发给下一环"的
///   默认方法体；具体层只覆写自己关心的操作
/// - `impl FooLayer for Terminal<T> where T: Foo` —— 终端适配器：
///   每个操作调用目标的真实实现
/// - `impl Foo for Stacked<T>` —— 被装饰对象：每个操作带原始参数
///   转发给层栈头环上的同名操作
/// - `struct FooLayerEntry` + `load_foo_layers` —— 经 `inventory`
///   收集按名称可构造的层类型并灌入注册表目录
///
/// 使用示例：
/// ```ignore
/// use veneer_macros::layered;
///
/// #[layered]
/// pub trait Note: Send + Sync + 'static {
///     fn body(&self, times: usize) -> String;
///     fn label(&self) -> String;
/// }
/// ```
///
/// 约束：trait 不得有泛型参数；成员只能是接收 `&self` 的非泛型、
/// 非 `async` 方法。
#[proc_macro_attribute]
pub fn layered(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_trait = parse_macro_input!(item as ItemTrait);
    expand::expand_layered(item_trait)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
