// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use crate::binding::CompiledBinding;
use arcstr::ArcStr;
use funcscript_var::{Span, Var};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// An executable expression node. Nodes are immutable once built; composite nodes hold their
/// children behind `Arc` so that lazily evaluated collections, lists and closures can keep a
/// handle on the sub-tree they will evaluate later.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant, or a function value resolved from the parse scope (operators, `case`, ...).
    Literal { value: Var, span: Span },
    /// A name looked up in the evaluation scope. With `from_parent` set the lookup starts one
    /// level up, skipping the collection the reference appears in.
    Reference {
        name: ArcStr,
        from_parent: bool,
        span: Span,
    },
    /// `function(args...)`. Operators, member access and templates all lower to this.
    Call {
        function: Box<Expr>,
        args: Arc<[Expr]>,
        span: Span,
    },
    List { items: Arc<[Expr]>, span: Span },
    Kvc(Arc<KvcExpr>),
    /// `source{selector}`
    Selector {
        source: Box<Expr>,
        selector: Arc<KvcExpr>,
        span: Span,
    },
    /// A lambda literal. It becomes a function value bound to the scope it is evaluated in.
    Lambda(Arc<LambdaExpr>),
    LanguageBinding {
        language: ArcStr,
        code: ArcStr,
        handle: BindingHandle,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Reference { span, .. }
            | Expr::Call { span, .. }
            | Expr::List { span, .. }
            | Expr::Selector { span, .. }
            | Expr::LanguageBinding { span, .. } => *span,
            Expr::Kvc(kvc) => kvc.span,
            Expr::Lambda(lambda) => lambda.span,
        }
    }

    /// The same node re-anchored at `span`. Used when parentheses or a `return` clause widen
    /// the source range of the expression they wrap.
    pub fn with_span(self, span: Span) -> Self {
        match self {
            Expr::Literal { value, .. } => Expr::Literal { value, span },
            Expr::Reference {
                name, from_parent, ..
            } => Expr::Reference {
                name,
                from_parent,
                span,
            },
            Expr::Call { function, args, .. } => Expr::Call {
                function,
                args,
                span,
            },
            Expr::List { items, .. } => Expr::List { items, span },
            Expr::Selector {
                source, selector, ..
            } => Expr::Selector {
                source,
                selector,
                span,
            },
            Expr::LanguageBinding {
                language,
                code,
                handle,
                ..
            } => Expr::LanguageBinding {
                language,
                code,
                handle,
                span,
            },
            Expr::Kvc(kvc) => {
                let mut kvc = Arc::unwrap_or_clone(kvc);
                kvc.span = span;
                Expr::Kvc(Arc::new(kvc))
            }
            Expr::Lambda(lambda) => {
                let mut lambda = Arc::unwrap_or_clone(lambda);
                lambda.span = span;
                Expr::Lambda(Arc::new(lambda))
            }
        }
    }

    pub fn literal(value: Var, span: Span) -> Self {
        Expr::Literal { value, span }
    }

    pub fn reference(name: &str, from_parent: bool, span: Span) -> Self {
        Expr::Reference {
            name: ArcStr::from(name),
            from_parent,
            span,
        }
    }

    pub fn call(function: Expr, args: Vec<Expr>, span: Span) -> Self {
        Expr::Call {
            function: Box::new(function),
            args: args.into(),
            span,
        }
    }
}

/// One `key: value` member of a collection literal.
#[derive(Debug, Clone, PartialEq)]
pub struct KvcItem {
    pub key: ArcStr,
    pub value: Expr,
}

/// A collection literal: ordered members plus an optional `return`/`eval` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct KvcExpr {
    items: Vec<KvcItem>,
    pub ret: Option<Expr>,
    /// The clause was spelled `eval` rather than `return`.
    pub eval_mode: bool,
    pub span: Span,
}

impl KvcExpr {
    /// Keys compare case-insensitively. A key seen twice keeps its first position but takes the
    /// value of its last definition.
    pub fn new(items: Vec<KvcItem>, ret: Option<Expr>, eval_mode: bool, span: Span) -> Self {
        let mut merged: Vec<KvcItem> = Vec::with_capacity(items.len());
        for item in items {
            match merged
                .iter_mut()
                .find(|existing| existing.key.eq_ignore_ascii_case(&item.key))
            {
                Some(existing) => existing.value = item.value,
                None => merged.push(item),
            }
        }
        Self {
            items: merged,
            ret,
            eval_mode,
            span,
        }
    }

    pub fn items(&self) -> &[KvcItem] {
        &self.items
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.key.eq_ignore_ascii_case(key))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<ArcStr>,
    pub body: Expr,
    pub span: Span,
}

impl LambdaExpr {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|param| param.eq_ignore_ascii_case(name))
    }
}

/// A compiled foreign-language block. Two handles are equal only if they are the same handle.
#[derive(Clone)]
pub struct BindingHandle(pub Arc<dyn CompiledBinding>);

impl BindingHandle {
    pub fn binding(&self) -> &Arc<dyn CompiledBinding> {
        &self.0
    }
}

impl Debug for BindingHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BindingHandle({:?})", self.0)
    }
}

impl PartialEq for BindingHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funcscript_var::v_int;

    fn item(key: &str, value: i64) -> KvcItem {
        KvcItem {
            key: ArcStr::from(key),
            value: Expr::literal(v_int(value), Span::new(0, 1)),
        }
    }

    #[test]
    fn test_duplicate_key_last_writer_wins() {
        let kvc = KvcExpr::new(
            vec![item("a", 1), item("b", 2), item("A", 3)],
            None,
            false,
            Span::new(0, 10),
        );
        assert_eq!(kvc.len(), 2);
        assert_eq!(kvc.index_of("a"), Some(0));
        assert_eq!(kvc.items()[0].value, Expr::literal(v_int(3), Span::new(0, 1)));
    }

    #[test]
    fn test_with_span_keeps_content() {
        let e = Expr::reference("x", false, Span::new(1, 1)).with_span(Span::new(0, 3));
        assert_eq!(e, Expr::reference("x", false, Span::new(0, 3)));
    }
}
