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

//! Evaluation of FuncScript expressions: the lazy tree-walking evaluator, the builtin function
//! library and value formatting.

pub use crate::builtins::{BuiltinRegistry, builtin_provider};
pub use crate::config::{ConfigError, DEFAULT_MAX_DEPTH, EvalOptions, MAX_SUPPORTED_DEPTH};
pub use crate::eval::{
    Closure, EntryHook, EvalContext, ExitHook, LazyKvc, LazyList, TraceHooks, evaluate,
};
pub use crate::format::{format_value, format_value_pretty, to_text};

use funcscript_compiler::{CompileError, CompileOptions, compile};
use funcscript_var::{Scope, SimpleKvc, Var};
use std::sync::Arc;

mod builtins;
pub mod config;
mod eval;
pub mod format;

/// An empty scope for host values, with the builtins as its parent.
pub fn default_scope() -> SimpleKvc {
    SimpleKvc::new(Some(builtin_provider()))
}

/// Parse `source` and evaluate it against `scope`, with default options. Operators and
/// keywords are resolved through `scope`, so it should chain to [`builtin_provider`].
pub fn evaluate_source(source: &str, scope: &Scope) -> Result<Var, CompileError> {
    evaluate_source_with(
        source,
        scope,
        &CompileOptions::default(),
        &EvalContext::new(EvalOptions::default()),
    )
}

pub fn evaluate_source_with(
    source: &str,
    scope: &Scope,
    compile_options: &CompileOptions,
    ctx: &Arc<EvalContext>,
) -> Result<Var, CompileError> {
    let expr = compile(scope.as_ref(), source, compile_options)?;
    Ok(ctx.evaluate(&expr, scope))
}
