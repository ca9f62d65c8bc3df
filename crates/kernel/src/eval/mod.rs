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

//! Tree-walking evaluation of compiled expressions.
//!
//! Evaluation is lazy: collection members, list items and call arguments are expressions bound
//! to the scope they appear in, and are evaluated at most once, on first read. Failures are
//! values. Nothing in here returns `Result`; an error produced anywhere travels outward as an
//! [`Error`](funcscript_var::Error) value tagged with the span of the expression that made it.

mod closure;
mod lazy;
mod selector;

pub use closure::Closure;
pub use lazy::{LazyKvc, LazyList};

use crate::config::EvalOptions;
use funcscript_compiler::{CompiledBinding, Expr, KvcExpr};
use funcscript_var::{
    E_DEFAULT, E_DEPTH_OVERFLOW, E_TYPE_MISMATCH, E_UNDEFINED, Scope, Span, Var, Variant, v_err,
    v_fn, v_kvc, v_none,
};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{trace, warn};

pub type EntryHook = Box<dyn Fn(Span) -> u64 + Send + Sync>;
pub type ExitHook = Box<dyn Fn(&Var, Span, u64) + Send + Sync>;

/// Callbacks around each expression evaluation. The entry hook returns a handle that is passed
/// back to the matching exit hook, so a host can pair them up (timers, trace trees).
#[derive(Default)]
pub struct TraceHooks {
    on_entry: Option<EntryHook>,
    on_exit: Option<ExitHook>,
}

impl TraceHooks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_entry<F>(mut self, f: F) -> Self
    where
        F: Fn(Span) -> u64 + Send + Sync + 'static,
    {
        self.on_entry = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&Var, Span, u64) + Send + Sync + 'static,
    {
        self.on_exit = Some(Box::new(f));
        self
    }

    fn enter(&self, span: Span) -> u64 {
        self.on_entry.as_ref().map_or(0, |hook| hook(span))
    }

    fn exit(&self, value: &Var, span: Span, handle: u64) {
        if let Some(hook) = &self.on_exit {
            hook(value, span, handle);
        }
    }
}

/// State shared by every value produced during one evaluation: the options, the depth counter
/// and the trace hooks. Lazy values and closures hold on to it, so it outlives the top-level
/// `evaluate` call for as long as any of its results are alive.
pub struct EvalContext {
    options: EvalOptions,
    depth: AtomicUsize,
    hooks: TraceHooks,
}

impl EvalContext {
    pub fn new(options: EvalOptions) -> Arc<Self> {
        Self::with_trace_hooks(options, TraceHooks::default())
    }

    pub fn with_trace_hooks(options: EvalOptions, hooks: TraceHooks) -> Arc<Self> {
        Arc::new(Self {
            options,
            depth: AtomicUsize::new(0),
            hooks,
        })
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// How many lambda bodies and collection members are being computed right now.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Evaluate `expr` with names resolved through `scope`.
    pub fn evaluate(self: &Arc<Self>, expr: &Expr, scope: &Scope) -> Var {
        let span = expr.span();
        let handle = self.hooks.enter(span);
        let value = locate(self.evaluate_node(expr, scope), span);
        self.hooks.exit(&value, span, handle);
        value
    }

    /// Run `f` one level deeper. Lambda bodies and collection members are the levels counted:
    /// every unbounded recursion passes through one of them, while operators and literals
    /// nested inside a single definition do not use up the limit.
    pub(crate) fn nested<F>(&self, span: Span, f: F) -> Var
    where
        F: FnOnce() -> Var,
    {
        let Some(_guard) = DepthGuard::enter(self) else {
            return self.depth_overflow(span);
        };
        f()
    }

    fn evaluate_node(self: &Arc<Self>, expr: &Expr, scope: &Scope) -> Var {
        match expr {
            Expr::Literal { value, .. } => value.clone(),
            Expr::Reference {
                name,
                from_parent,
                span,
            } => resolve(scope, name, *from_parent, *span),
            Expr::Call {
                function,
                args,
                span,
            } => {
                let target = self.evaluate(function, scope);
                self.call(target, args, scope, *span)
            }
            Expr::List { items, .. } => LazyList::new(self.clone(), items.clone(), scope.clone())
                .into_var(),
            Expr::Kvc(kvc) => self.evaluate_kvc(kvc, scope.clone()),
            Expr::Selector {
                source, selector, ..
            } => {
                let source = self.evaluate(source, scope);
                selector::select(self, source, selector, scope)
            }
            Expr::Lambda(lambda) => v_fn(Arc::new(Closure::new(
                self.clone(),
                lambda.clone(),
                scope.clone(),
            ))),
            Expr::LanguageBinding {
                language,
                handle,
                span,
                ..
            } => self.guard_host(language, *span, || handle.binding().evaluate(scope)),
        }
    }

    /// A collection literal over `parent`. With a `return`/`eval` clause the result is that
    /// expression, evaluated with the collection's members in scope.
    pub(crate) fn evaluate_kvc(self: &Arc<Self>, kvc: &Arc<KvcExpr>, parent: Scope) -> Var {
        let collection = LazyKvc::new(self.clone(), kvc.clone(), parent);
        match &kvc.ret {
            Some(ret) => {
                let scope: Scope = collection;
                self.evaluate(ret, &scope)
            }
            None => v_kvc(collection),
        }
    }

    fn call(self: &Arc<Self>, target: Var, args: &Arc<[Expr]>, scope: &Scope, span: Span) -> Var {
        if target.is_err() {
            return target;
        }
        match target.variant() {
            Variant::Function(function) => {
                let params = LazyList::new(self.clone(), args.clone(), scope.clone());
                trace!(symbol = function.symbol(), args = args.len(), "call");
                self.guard_host(function.symbol(), span, || function.call(&params))
            }
            Variant::List(list) => {
                let index = self.first_argument(args, scope);
                if index.is_err() {
                    return index;
                }
                match index.as_integer() {
                    Some(i) if i >= 0 => list.get(i as usize).unwrap_or_else(v_none),
                    Some(_) => v_none(),
                    None => v_err(E_TYPE_MISMATCH.with_msg(|| {
                        format!("List index must be an integer, not {}", index.type_code())
                    })),
                }
            }
            Variant::Kvc(kvc) => {
                let key = self.first_argument(args, scope);
                if key.is_err() {
                    return key;
                }
                match key.as_str() {
                    Some(key) => kvc.get_local(key).unwrap_or_else(v_none),
                    None => v_err(E_TYPE_MISMATCH.with_msg(|| {
                        format!("Collection key must be a string, not {}", key.type_code())
                    })),
                }
            }
            _ => v_err(E_TYPE_MISMATCH.with_msg(|| {
                format!("{} can't be called as a function", target.type_code())
            })),
        }
    }

    fn first_argument(self: &Arc<Self>, args: &[Expr], scope: &Scope) -> Var {
        match args.first() {
            Some(arg) => self.evaluate(arg, scope),
            None => v_none(),
        }
    }

    /// Run host code, turning a panic into an error value unless the options say otherwise.
    fn guard_host<F>(&self, symbol: &str, span: Span, f: F) -> Var
    where
        F: FnOnce() -> Var,
    {
        if !self.options.catch_host_faults {
            return f();
        }
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => value,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(symbol, %span, fault = %message, "host fault during evaluation");
                v_err(E_DEFAULT.msg(message).located(span))
            }
        }
    }

    fn depth_overflow(&self, span: Span) -> Var {
        let max_depth = self.options.max_depth;
        warn!(max_depth, %span, "evaluation depth exceeded");
        v_err(
            E_DEPTH_OVERFLOW
                .msg(format!("maximum evaluation depth of {max_depth} exceeded"))
                .located(span),
        )
    }
}

/// Evaluate `expr` against `scope` with default options.
pub fn evaluate(expr: &Expr, scope: &Scope) -> Var {
    EvalContext::new(EvalOptions::default()).evaluate(expr, scope)
}

fn resolve(scope: &Scope, name: &str, from_parent: bool, span: Span) -> Var {
    let found = if from_parent {
        scope.parent().and_then(|parent| parent.get(name))
    } else {
        scope.get(name)
    };
    found.unwrap_or_else(|| {
        v_err(
            E_UNDEFINED
                .with_msg(|| format!("'{name}' is not defined"))
                .located(span),
        )
    })
}

/// Tag an unlocated error with the span of the expression that returned it.
fn locate(value: Var, span: Span) -> Var {
    if let Some(error) = value.as_error()
        && error.span.is_none()
    {
        return v_err(error.clone().located(span));
    }
    value
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "host function panicked".to_string()
}

/// Counts one level of evaluation for as long as it is held.
struct DepthGuard<'a> {
    depth: &'a AtomicUsize,
}

impl<'a> DepthGuard<'a> {
    fn enter(ctx: &'a EvalContext) -> Option<Self> {
        let depth = ctx.depth.fetch_add(1, Ordering::Relaxed);
        if depth >= ctx.options.max_depth {
            ctx.depth.fetch_sub(1, Ordering::Relaxed);
            return None;
        }
        Some(Self { depth: &ctx.depth })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }
}
