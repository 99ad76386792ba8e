//! 匹配规则
//!
//! 一条注册以一个或多个匹配表达式声明它套用到哪些目标类型上。
//! 文本形式为 `"<kind>:<target>"`，裸目标名等价于 `class:<target>`。

use std::fmt;

use crate::error::{StackError, StackResult};
use crate::facts::TypeFacts;

/// 四种受认可的匹配类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// 具体类型名精确相等（`class:`）
    Exact,
    /// 本类型或任一祖先声明了该能力（`implements:`）
    Implements,
    /// 本类型等于或派生自该基类型（`extends:`）
    Extends,
    /// 本类型或任一祖先混入了该行为单元（`uses:`）
    Uses,
}

impl MatchKind {
    fn token(self) -> &'static str {
        match self {
            MatchKind::Exact => "class",
            MatchKind::Implements => "implements",
            MatchKind::Extends => "extends",
            MatchKind::Uses => "uses",
        }
    }
}

/// 单条匹配表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchExpr {
    kind: MatchKind,
    target: String,
}

impl MatchExpr {
    pub fn new(kind: MatchKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }

    /// 解析文本形式
    ///
    /// 认可的标记：`class`、`implements`、`extends`、`uses`；
    /// 不带冒号的裸标识符按 `class` 处理。其余一律
    /// [`StackError::InvalidMatchType`]。
    pub fn parse(text: &str) -> StackResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StackError::InvalidMatchType(text.to_string()));
        }

        let Some((kind, target)) = text.split_once(':') else {
            return Ok(Self::new(MatchKind::Exact, text));
        };

        let target = target.trim();
        if target.is_empty() {
            return Err(StackError::InvalidMatchType(text.to_string()));
        }

        let kind = match kind.trim() {
            "class" => MatchKind::Exact,
            "implements" => MatchKind::Implements,
            "extends" => MatchKind::Extends,
            "uses" => MatchKind::Uses,
            _ => return Err(StackError::InvalidMatchType(text.to_string())),
        };

        Ok(Self::new(kind, target))
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// 本表达式是否套用到给定事实表的类型上
    pub fn applies_to(&self, facts: &TypeFacts) -> bool {
        match self.kind {
            MatchKind::Exact => facts.name() == self.target,
            MatchKind::Implements => facts.declares(&self.target),
            MatchKind::Extends => facts.name() == self.target || facts.derives_from(&self.target),
            MatchKind::Uses => facts.mixes_in(&self.target),
        }
    }
}

impl fmt::Display for MatchExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.token(), self.target)
    }
}

/// `add` 接受的目标参数形态
///
/// 单条表达式、逗号分隔的字符串，或表达式/字符串的序列。
pub trait MatchTargets {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>>;
}

impl MatchTargets for str {
    /// 逗号分隔的一条或多条表达式；空白段被忽略，整串为空视为非法
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        let mut exprs = Vec::new();
        for part in self.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            exprs.push(MatchExpr::parse(part)?);
        }
        if exprs.is_empty() {
            return Err(StackError::InvalidMatchType(self.to_string()));
        }
        Ok(exprs)
    }
}

impl MatchTargets for &str {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        (**self).match_exprs()
    }
}

impl MatchTargets for String {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        self.as_str().match_exprs()
    }
}

impl MatchTargets for MatchExpr {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        Ok(vec![self.clone()])
    }
}

impl MatchTargets for [MatchExpr] {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        Ok(self.to_vec())
    }
}

impl MatchTargets for Vec<MatchExpr> {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        Ok(self.clone())
    }
}

impl MatchTargets for [&str] {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        self.iter().map(|text| MatchExpr::parse(text)).collect()
    }
}

impl<const N: usize> MatchTargets for [&str; N] {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        self.as_slice().match_exprs()
    }
}

impl MatchTargets for Vec<&str> {
    fn match_exprs(&self) -> StackResult<Vec<MatchExpr>> {
        self.as_slice().match_exprs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier_means_exact_match() {
        let expr = MatchExpr::parse("Note").unwrap();
        assert_eq!(expr.kind(), MatchKind::Exact);
        assert_eq!(expr.target(), "Note");
    }

    #[test]
    fn prefixed_forms_parse() {
        assert_eq!(
            MatchExpr::parse("implements:Renderable").unwrap().kind(),
            MatchKind::Implements
        );
        assert_eq!(
            MatchExpr::parse("extends:Document").unwrap().kind(),
            MatchKind::Extends
        );
        assert_eq!(
            MatchExpr::parse(" uses:Timestamped ").unwrap().kind(),
            MatchKind::Uses
        );
        assert_eq!(
            MatchExpr::parse("class:Note").unwrap().kind(),
            MatchKind::Exact
        );
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert!(matches!(
            MatchExpr::parse("subclasses:Note"),
            Err(StackError::InvalidMatchType(_))
        ));
    }

    #[test]
    fn empty_forms_are_rejected() {
        assert!(MatchExpr::parse("").is_err());
        assert!(MatchExpr::parse("class:").is_err());
        assert!(MatchExpr::parse("   ").is_err());
    }

    #[test]
    fn delimited_string_yields_every_expression() {
        let exprs = "class:Note, implements:Renderable".match_exprs().unwrap();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0].kind(), MatchKind::Exact);
        assert_eq!(exprs[1].kind(), MatchKind::Implements);
    }

    #[test]
    fn blank_string_is_not_a_match_set() {
        assert!("  ".match_exprs().is_err());
    }

    #[test]
    fn exact_match_ignores_derived_types() {
        let base = TypeFacts::of("Document");
        let note = TypeFacts::of("Note").extends(&base);
        let expr = MatchExpr::parse("Document").unwrap();

        assert!(expr.applies_to(&base));
        assert!(!expr.applies_to(&note));
    }

    #[test]
    fn extends_matches_type_and_descendants() {
        let base = TypeFacts::of("Document");
        let note = TypeFacts::of("Note").extends(&base);
        let other = TypeFacts::of("Invoice");
        let expr = MatchExpr::parse("extends:Document").unwrap();

        assert!(expr.applies_to(&base));
        assert!(expr.applies_to(&note));
        assert!(!expr.applies_to(&other));
    }

    #[test]
    fn implements_matches_inherited_capability() {
        let base = TypeFacts::of("Document").implements("Renderable");
        let note = TypeFacts::of("Note").extends(&base);
        let plain = TypeFacts::of("Blob");
        let expr = MatchExpr::parse("implements:Renderable").unwrap();

        assert!(expr.applies_to(&base));
        assert!(expr.applies_to(&note));
        assert!(!expr.applies_to(&plain));
    }

    #[test]
    fn uses_matches_inherited_mixin() {
        let base = TypeFacts::of("Document").uses("Timestamped");
        let note = TypeFacts::of("Note").extends(&base);
        let expr = MatchExpr::parse("uses:Timestamped").unwrap();

        assert!(expr.applies_to(&note));
        assert!(!expr.applies_to(&TypeFacts::of("Blob")));
    }
}
