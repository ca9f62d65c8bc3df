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
use funcscript_compiler::LambdaExpr;
use funcscript_var::{
    Function, KeyValueCollection, ParameterList, Scope, SharedParameters, SimpleKvc, Var,
};
use itertools::Itertools;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::trace;

/// A lambda bound to the scope it was evaluated in.
///
/// Each call runs the body in a fresh frame whose parent is the captured scope, so two closures
/// made by separate calls of the same outer function never share parameter values. An argument
/// is only evaluated when the body first reads its name.
pub struct Closure {
    ctx: Arc<EvalContext>,
    lambda: Arc<LambdaExpr>,
    scope: Scope,
}

impl Closure {
    pub fn new(ctx: Arc<EvalContext>, lambda: Arc<LambdaExpr>, scope: Scope) -> Self {
        Self { ctx, lambda, scope }
    }

    pub fn arity(&self) -> usize {
        self.lambda.arity()
    }

    fn frame(&self, args: &dyn ParameterList) -> Scope {
        match args.share() {
            Some(args) => Arc::new(ArgumentFrame {
                lambda: self.lambda.clone(),
                args,
                parent: self.scope.clone(),
            }),
            None => {
                let bound = self
                    .lambda
                    .params
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), args.get(i)));
                Arc::new(SimpleKvc::from_pairs(Some(self.scope.clone()), bound))
            }
        }
    }
}

impl Debug for Closure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Closure({})", self.lambda.params.iter().join(", "))
    }
}

impl Function for Closure {
    fn symbol(&self) -> &str {
        "lambda"
    }

    fn call(&self, args: &dyn ParameterList) -> Var {
        trace!(arity = self.arity(), supplied = args.count(), "enter lambda");
        let frame = self.frame(args);
        let body = &self.lambda.body;
        self.ctx
            .nested(body.span(), || self.ctx.evaluate(body, &frame))
    }
}

/// The parameters of one call, read through to the caller's arguments by position.
struct ArgumentFrame {
    lambda: Arc<LambdaExpr>,
    args: SharedParameters,
    parent: Scope,
}

impl ArgumentFrame {
    fn position(&self, key: &str) -> Option<usize> {
        self.lambda
            .params
            .iter()
            .position(|name| name.eq_ignore_ascii_case(key))
    }
}

impl KeyValueCollection for ArgumentFrame {
    fn get_local(&self, key: &str) -> Option<Var> {
        self.position(key).map(|i| self.args.get(i))
    }

    fn contains_local(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    fn keys(&self) -> Vec<ArcStr> {
        self.lambda.params.to_vec()
    }

    fn parent(&self) -> Option<&Scope> {
        Some(&self.parent)
    }
}
