//! 层注册表
//!
//! 负责保存全部注册条目、为具体类型解析适用的有序子集（带缓存）、
//! 以及为单个对象装配活链。注册表不做全局单例：显式构造、显式传递，
//! 测试各自建一个实例即可隔离。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{StackError, StackResult};
use crate::facts::TypeFacts;
use crate::link::Link;
use crate::matching::{MatchExpr, MatchTargets};
use crate::spec::LayerSpec;
use crate::stacked::Stackable;

/// 目录条目：一个按名称可默认构造的层类型
///
/// 供 `inventory::submit!` 做编译时收集；每个能力的宏展开会生成
/// 自己的收集类型与加载函数，把条目灌进注册表目录。
pub struct CatalogEntry<S: ?Sized + 'static> {
    /// 层类型名
    pub name: &'static str,
    /// 默认构造器
    pub create: fn() -> Box<S>,
}

/// 一条不可变的注册条目
///
/// `index` 由注册表按严格递减计数器分配（从 `i64::MAX` 起），
/// 因此同优先级下越晚注册的条目 index 越小。
pub struct Registration<S: ?Sized> {
    spec: LayerSpec<S>,
    rule: MatchExpr,
    priority: i32,
    index: i64,
}

impl<S: ?Sized> Registration<S> {
    pub fn spec(&self) -> &LayerSpec<S> {
        &self.spec
    }

    pub fn rule(&self) -> &MatchExpr {
        &self.rule
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn index(&self) -> i64 {
        self.index
    }
}

impl<S: ?Sized> Clone for Registration<S> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            rule: self.rule.clone(),
            priority: self.priority,
            index: self.index,
        }
    }
}

struct RegistryInner<S: ?Sized> {
    /// 全部注册条目，按注册先后排列
    entries: Vec<Registration<S>>,
    /// 具体类型名 → 已解析排序的条目序列
    cache: HashMap<&'static str, Arc<Vec<Registration<S>>>>,
    /// 层类型目录：名称 → 默认构造器
    catalog: HashMap<String, fn() -> Box<S>>,
    /// 已声明的目标类型（名称校验用）
    targets: HashMap<&'static str, &'static TypeFacts>,
    /// 严格递减的插入计数器
    next_index: i64,
}

impl<S: ?Sized> RegistryInner<S> {
    fn fresh() -> Self {
        Self {
            entries: Vec::new(),
            cache: HashMap::new(),
            catalog: HashMap::new(),
            targets: HashMap::new(),
            next_index: i64::MAX,
        }
    }
}

/// 层注册表
///
/// 注册与解析共享同一把读写锁：解析读不会观察到写到一半的条目表
/// 或缓存。链一旦装配完成即为对象私有，遍历无需任何同步。
pub struct LayerRegistry<S: ?Sized + 'static> {
    inner: RwLock<RegistryInner<S>>,
}

impl<S: ?Sized + 'static> LayerRegistry<S> {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::fresh()),
        }
    }

    /// 按默认优先级（0）注册层
    ///
    /// `targets` 是一条或多条匹配表达式：单条文本、逗号分隔的文本、
    /// 或表达式序列。任一表达式非法、或规格未通过校验时整条注册
    /// 失败，不追加任何条目。
    pub fn add(
        &self,
        spec: impl Into<LayerSpec<S>>,
        targets: impl MatchTargets,
    ) -> StackResult<()> {
        self.add_with_priority(spec, targets, 0)
    }

    /// 按显式优先级注册层
    ///
    /// 校验是快速失败的：配置错误在注册时就暴露，绝不推迟到
    /// 首次装配链时。工厂形态的规格会在这里被探测调用一次，
    /// 纯粹为了校验其产出——工厂必须容忍这次额外调用。
    pub fn add_with_priority(
        &self,
        spec: impl Into<LayerSpec<S>>,
        targets: impl MatchTargets,
        priority: i32,
    ) -> StackResult<()> {
        let spec = spec.into();
        let exprs = targets.match_exprs()?;
        self.validate_spec(&spec)?;

        let mut inner = self.inner.write();
        for rule in exprs {
            let index = inner.next_index;
            inner.next_index -= 1;
            tracing::debug!(
                spec = %spec.describe(),
                rule = %rule,
                priority,
                "registering layer"
            );
            inner.entries.push(Registration {
                spec: spec.clone(),
                rule,
                priority,
                index,
            });
        }
        // 保守策略：一条新注册可能影响许多类型的链，整表失效
        inner.cache.clear();
        Ok(())
    }

    /// 登记一个按名称可默认构造的层类型
    pub fn register_layer(&self, name: impl Into<String>, create: fn() -> Box<S>) {
        let name = name.into();
        tracing::debug!(layer = %name, "cataloging layer type");
        self.inner.write().catalog.insert(name, create);
    }

    /// 声明一个可叠栈的目标类型
    ///
    /// 之后把该类型名当作层规格注册会得到
    /// [`StackError::InvalidLayerType`] 而非 `UnknownLayerType`。
    pub fn declare_target(&self, facts: &'static TypeFacts) {
        tracing::debug!(ty = facts.name(), "declaring target type");
        self.inner.write().targets.insert(facts.name(), facts);
    }

    /// 为具体类型解析适用条目的有序序列
    ///
    /// 排序：优先级降序，再按插入 index 降序——同优先级下早注册的
    /// 排前，晚注册的排后；配合装配折叠（排序靠后者居外层），
    /// 最近注册的层包在最外面。对固定的注册集与类型，结果确定且
    /// 在多次解析间稳定。
    pub fn resolve(&self, facts: &TypeFacts) -> Arc<Vec<Registration<S>>> {
        if let Some(hit) = self.inner.read().cache.get(facts.name()) {
            tracing::trace!(ty = facts.name(), "layer plan cache hit");
            return Arc::clone(hit);
        }

        let mut inner = self.inner.write();
        // 双检：拿写锁期间可能已有并发填充
        if let Some(hit) = inner.cache.get(facts.name()) {
            return Arc::clone(hit);
        }

        let mut plan: Vec<Registration<S>> = inner
            .entries
            .iter()
            .filter(|entry| entry.rule.applies_to(facts))
            .cloned()
            .collect();
        plan.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.index.cmp(&a.index))
        });

        let plan = Arc::new(plan);
        inner.cache.insert(facts.name(), Arc::clone(&plan));
        tracing::debug!(ty = facts.name(), layers = plan.len(), "resolved layer plan");
        plan
    }

    /// 为一个对象装配活链，返回头环
    ///
    /// 从终端适配器起步，按解析顺序逐条物化层实例：每个新层把当前
    /// 头环绑定为自己的下一环，然后成为新的头环。没有适用条目时
    /// 链就是终端本身——零开销直通，不是错误。
    pub fn stack_for<T>(&self, target: &Arc<T>) -> StackResult<Box<S>>
    where
        T: Stackable<Surface = S>,
        S: Link<S>,
    {
        let facts = T::facts();
        let plan = self.resolve(facts);
        let mut head: Box<S> = T::terminal(Arc::clone(target));
        if plan.is_empty() {
            tracing::trace!(ty = facts.name(), "no applicable layers; passthrough stack");
            return Ok(head);
        }

        for entry in plan.iter() {
            let mut layer = self.materialize(entry.spec())?;
            layer.bind_next(head);
            head = layer;
        }
        tracing::debug!(ty = facts.name(), layers = plan.len(), "assembled layer stack");
        Ok(head)
    }

    /// 清空全部注册条目与缓存（测试隔离/引导重置用）
    ///
    /// 层类型目录与目标声明保留——它们是符合性声明而非注册。
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.cache.clear();
        inner.next_index = i64::MAX;
        tracing::debug!("layer registry reset");
    }

    /// 注册条目数量
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// 是否没有任何注册条目
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    fn validate_spec(&self, spec: &LayerSpec<S>) -> StackResult<()> {
        match spec {
            LayerSpec::Named(name) => {
                let inner = self.inner.read();
                if inner.catalog.contains_key(name.as_str()) {
                    Ok(())
                } else if inner.targets.contains_key(name.as_str()) {
                    Err(StackError::InvalidLayerType(name.clone()))
                } else {
                    Err(StackError::UnknownLayerType(name.clone()))
                }
            }
            LayerSpec::Factory(factory) => {
                // 探测调用：只做类型检查，产出即弃
                factory()
                    .map(|_| ())
                    .map_err(|err| StackError::InvalidLayerFactory(err.to_string()))
            }
            // 原型对链环能力的符合性由类型系统在编译期保证
            LayerSpec::Prototype(_) => Ok(()),
        }
    }

    fn materialize(&self, spec: &LayerSpec<S>) -> StackResult<Box<S>> {
        match spec {
            LayerSpec::Named(name) => {
                let create = self
                    .inner
                    .read()
                    .catalog
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| {
                        StackError::LayerCreationFailed(format!(
                            "layer type `{name}` is not in the catalog"
                        ))
                    })?;
                Ok(create())
            }
            LayerSpec::Factory(factory) => {
                factory().map_err(|err| StackError::LayerCreationFailed(err.to_string()))
            }
            LayerSpec::Prototype(source) => Ok(source.duplicate()),
        }
    }
}

impl<S: ?Sized + 'static> Default for LayerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
