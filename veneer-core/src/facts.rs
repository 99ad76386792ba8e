//! 类型事实表
//!
//! 匹配规则需要知道一个具体类型叫什么、继承自谁、声明了哪些能力、
//! 混入了哪些可复用行为单元。这里不做任何运行时内省：每个可叠栈
//! 类型在声明处给出一张静态事实表，匹配就是一次查表。

/// 一个具体类型的声明事实
///
/// `extends` 会把祖先的名字、基类链、能力与混入一并合并进来，
/// 因此"直接或经由祖先声明了 X"在查询时是一次平坦集合查找。
#[derive(Debug, Clone)]
pub struct TypeFacts {
    name: &'static str,
    bases: Vec<&'static str>,
    capabilities: Vec<&'static str>,
    mixins: Vec<&'static str>,
}

impl TypeFacts {
    /// 声明一个叶子类型
    pub fn of(name: &'static str) -> Self {
        Self {
            name,
            bases: Vec::new(),
            capabilities: Vec::new(),
            mixins: Vec::new(),
        }
    }

    /// 声明继承自一个已有事实表的祖先，合并其全部事实
    pub fn extends(mut self, ancestor: &TypeFacts) -> Self {
        push_unique(&mut self.bases, ancestor.name);
        for base in &ancestor.bases {
            push_unique(&mut self.bases, base);
        }
        for capability in &ancestor.capabilities {
            push_unique(&mut self.capabilities, capability);
        }
        for mixin in &ancestor.mixins {
            push_unique(&mut self.mixins, mixin);
        }
        self
    }

    /// 声明一个没有自有事实表的基类型（只登记名字）
    pub fn extends_name(mut self, base: &'static str) -> Self {
        push_unique(&mut self.bases, base);
        self
    }

    /// 声明实现某个能力/接口
    pub fn implements(mut self, capability: &'static str) -> Self {
        push_unique(&mut self.capabilities, capability);
        self
    }

    /// 声明混入某个可复用行为单元
    pub fn uses(mut self, mixin: &'static str) -> Self {
        push_unique(&mut self.mixins, mixin);
        self
    }

    /// 具体类型名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 基类链（最近的祖先在前）
    pub fn bases(&self) -> &[&'static str] {
        &self.bases
    }

    /// 是否派生自指定基类型
    pub fn derives_from(&self, base: &str) -> bool {
        self.bases.iter().any(|b| *b == base)
    }

    /// 本类型或任一祖先是否声明了指定能力
    pub fn declares(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| *c == capability)
    }

    /// 本类型或任一祖先是否混入了指定行为单元
    pub fn mixes_in(&self, mixin: &str) -> bool {
        self.mixins.iter().any(|m| *m == mixin)
    }
}

fn push_unique(set: &mut Vec<&'static str>, item: &'static str) {
    if !set.contains(&item) {
        set.push(item);
    }
}
