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

use crate::eval::EvalContext;
use arcstr::ArcStr;
use funcscript_compiler::{Expr, KvcExpr};
use funcscript_var::{
    E_DEFAULT, FsList, KeyValueCollection, ParameterList, Scope, SharedParameters, Var, v_err,
    v_none,
};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Weak};

/// Read-through cache for one lazily computed value.
///
/// The cell is not locked while `compute` runs: a member whose definition refers back to itself
/// recurses until the depth guard stops it, instead of deadlocking. If two computations race,
/// the first value stored is the one every reader sees.
pub(crate) fn memoize<F>(cell: &OnceCell<Var>, compute: F) -> Var
where
    F: FnOnce() -> Var,
{
    if let Some(value) = cell.get() {
        return value.clone();
    }
    match cell.try_insert(compute()) {
        Ok(value) => value.clone(),
        Err((existing, _)) => existing.clone(),
    }
}

fn cells(len: usize) -> Box<[OnceCell<Var>]> {
    (0..len).map(|_| OnceCell::new()).collect()
}

/// The value of a collection literal. Each member is evaluated on first read, with the
/// collection itself as the scope so members can refer to their siblings. Computing a member
/// counts as one level of evaluation depth, which is what stops a member defined in terms of
/// itself.
pub struct LazyKvc {
    ctx: Arc<EvalContext>,
    expr: Arc<KvcExpr>,
    parent: Scope,
    values: Box<[OnceCell<Var>]>,
    this: Weak<LazyKvc>,
}

impl LazyKvc {
    pub fn new(ctx: Arc<EvalContext>, expr: Arc<KvcExpr>, parent: Scope) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            values: cells(expr.len()),
            ctx,
            expr,
            parent,
            this: this.clone(),
        })
    }

    fn member(&self, index: usize) -> Var {
        memoize(&self.values[index], || {
            let Some(this) = self.this.upgrade() else {
                return v_err(E_DEFAULT.msg("collection was dropped during evaluation"));
            };
            let scope: Scope = this;
            let value = &self.expr.items()[index].value;
            self.ctx
                .nested(value.span(), || self.ctx.evaluate(value, &scope))
        })
    }
}

impl KeyValueCollection for LazyKvc {
    fn get_local(&self, key: &str) -> Option<Var> {
        let index = self.expr.index_of(key)?;
        Some(self.member(index))
    }

    fn contains_local(&self, key: &str) -> bool {
        self.expr.index_of(key).is_some()
    }

    fn keys(&self) -> Vec<ArcStr> {
        self.expr
            .items()
            .iter()
            .map(|item| item.key.clone())
            .collect()
    }

    fn parent(&self) -> Option<&Scope> {
        Some(&self.parent)
    }
}

/// A sequence of expressions evaluated on demand in a fixed scope. It is both the value of a
/// list literal and the argument list handed to functions, so an argument a function never
/// reads is never evaluated. Clones share the cache.
#[derive(Clone)]
pub struct LazyList {
    ctx: Arc<EvalContext>,
    items: Arc<[Expr]>,
    scope: Scope,
    values: Arc<[OnceCell<Var>]>,
}

impl LazyList {
    pub fn new(ctx: Arc<EvalContext>, items: Arc<[Expr]>, scope: Scope) -> Self {
        Self {
            values: cells(items.len()).into(),
            ctx,
            items,
            scope,
        }
    }

    pub fn into_var(self) -> Var {
        Var::mk_list_of(Arc::new(self))
    }

    fn item(&self, index: usize) -> Option<Var> {
        let expr = self.items.get(index)?;
        Some(memoize(&self.values[index], || {
            self.ctx.evaluate(expr, &self.scope)
        }))
    }
}

impl FsList for LazyList {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<Var> {
        self.item(index)
    }
}

impl ParameterList for LazyList {
    fn count(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Var {
        self.item(index).unwrap_or_else(v_none)
    }

    fn share(&self) -> Option<SharedParameters> {
        Some(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalOptions;
    use funcscript_compiler::KvcItem;
    use funcscript_var::{SimpleKvc, Span, v_int};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memoize_computes_once() {
        let cell = OnceCell::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let v = memoize(&cell, || {
                calls.fetch_add(1, Ordering::SeqCst);
                v_int(7)
            });
            assert_eq!(v, v_int(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lazy_kvc_sees_siblings_and_parent() {
        let ctx = EvalContext::new(EvalOptions::default());
        let parent: Scope = Arc::new(SimpleKvc::new(None).with("outer", v_int(10)));
        let items = vec![
            KvcItem {
                key: "a".into(),
                value: Expr::reference("outer", false, Span::new(0, 1)),
            },
            KvcItem {
                key: "b".into(),
                value: Expr::reference("A", false, Span::new(2, 1)),
            },
        ];
        let expr = Arc::new(KvcExpr::new(items, None, false, Span::new(0, 3)));
        let kvc = LazyKvc::new(ctx, expr, parent);
        assert_eq!(kvc.get("b"), Some(v_int(10)));
        assert!(kvc.contains_local("B"));
        assert_eq!(kvc.get_local("outer"), None);
        assert_eq!(kvc.keys(), vec![ArcStr::from("a"), ArcStr::from("b")]);
    }

    #[test]
    fn test_argument_past_end_is_null() {
        let ctx = EvalContext::new(EvalOptions::default());
        let scope: Scope = Arc::new(SimpleKvc::new(None));
        let args = LazyList::new(
            ctx,
            vec![Expr::literal(v_int(1), Span::new(0, 1))].into(),
            scope,
        );
        assert_eq!(ParameterList::get(&args, 0), v_int(1));
        assert!(ParameterList::get(&args, 3).is_none());
        assert_eq!(args.count(), 1);
    }

    #[test]
    fn test_shared_arguments_keep_their_cache() {
        let ctx = EvalContext::new(EvalOptions::default());
        let scope: Scope = Arc::new(SimpleKvc::new(None));
        let args = LazyList::new(
            ctx,
            vec![Expr::literal(v_int(5), Span::new(0, 1))].into(),
            scope,
        );
        let shared = args.share().unwrap();
        assert!(args.values[0].get().is_none());
        assert_eq!(shared.get(0), v_int(5));
        assert_eq!(args.values[0].get(), Some(&v_int(5)));
    }
}
