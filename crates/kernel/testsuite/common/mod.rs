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
//! Shared helpers for the kernel test suites.

#![allow(dead_code)]

use funcscript_kernel::{default_scope, evaluate_source, format_value};
use funcscript_var::{Function, HostFunction, Scope, Var, v_fn};
use std::sync::Arc;

/// A scope over the builtins with nothing else defined.
pub fn scope() -> Scope {
    Arc::new(default_scope())
}

/// A scope over the builtins with `functions` bound under their own symbols and `values` under
/// their keys.
pub fn host_scope(functions: Vec<HostFunction>, values: &[(&str, Var)]) -> Scope {
    let mut kvc = default_scope();
    for function in functions {
        let name = function.symbol().to_string();
        kvc.insert(name, v_fn(Arc::new(function)));
    }
    for (key, value) in values {
        kvc.insert(*key, value.clone());
    }
    Arc::new(kvc)
}

pub fn eval(source: &str) -> Var {
    eval_in(&scope(), source)
}

pub fn eval_in(scope: &Scope, source: &str) -> Var {
    evaluate_source(source, scope).unwrap_or_else(|e| panic!("{source:?} failed to compile: {e}"))
}

/// The literal text of the result of `source`.
pub fn eval_text(source: &str) -> String {
    format_value(&eval(source))
}

/// Run `f` on a thread with a stack large enough for deep evaluations in debug builds.
pub fn with_big_stack<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(f)
        .unwrap();
    handle.join().unwrap()
}
