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

//! The builtin function library, and the provider collection that exposes it to the parser and
//! the evaluator.

use crate::builtins::bf_list_sets::register_bf_list_sets;
use crate::builtins::bf_logic::register_bf_logic;
use crate::builtins::bf_num::{MATH_MEMBERS, register_bf_num};
use crate::builtins::bf_strings::register_bf_strings;
use crate::builtins::bf_values::register_bf_values;
use funcscript_var::{
    CallType, E_PARAMETER_COUNT, E_TYPE_MISMATCH, Error, Function, KeyValueCollection,
    ParameterList, Scope, SimpleKvc, Var, v_err, v_fn, v_kvc,
};
use lazy_static::lazy_static;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

mod bf_list_sets;
mod bf_logic;
mod bf_num;
mod bf_strings;
mod bf_values;
mod numeric;

lazy_static! {
    static ref BUILTINS: Scope = {
        let registry = BuiltinRegistry::new();
        debug!(
            functions = registry.builtins.len(),
            constants = registry.constants.len(),
            "builtin registry constructed"
        );
        Arc::new(registry.provider())
    };
}

/// The process-wide collection of builtin functions and constants. Built on first use and
/// never modified afterwards; host scopes normally chain to it as their outermost parent.
pub fn builtin_provider() -> Scope {
    BUILTINS.clone()
}

#[derive(Clone, Copy)]
pub(crate) struct Builtin {
    name: &'static str,
    call_type: CallType,
    function: BuiltinFunction,
}

/// The bundle of builtins, gathered from each family's `register_bf_*`.
pub struct BuiltinRegistry {
    builtins: Vec<Builtin>,
    constants: Vec<(&'static str, Var)>,
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        let mut builtins = BuiltinRegistry {
            builtins: vec![],
            constants: vec![],
        };
        register_bf_num(&mut builtins);
        register_bf_values(&mut builtins);
        register_bf_logic(&mut builtins);
        register_bf_strings(&mut builtins);
        register_bf_list_sets(&mut builtins);
        builtins
    }

    /// A function called as `name(args)`.
    pub(crate) fn register(&mut self, name: &'static str, function: BuiltinFunction) {
        self.register_operator(name, CallType::Prefix, function);
    }

    pub(crate) fn register_operator(
        &mut self,
        name: &'static str,
        call_type: CallType,
        function: BuiltinFunction,
    ) {
        self.builtins.push(Builtin {
            name,
            call_type,
            function,
        });
    }

    pub(crate) fn register_constant(&mut self, name: &'static str, value: Var) {
        self.constants.push((name, value));
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins
            .iter()
            .map(|b| b.name)
            .chain(self.constants.iter().map(|(name, _)| *name))
    }

    /// Every builtin as a named value, plus the `math` collection.
    pub fn provider(&self) -> SimpleKvc {
        let mut provider = SimpleKvc::new(None);
        for builtin in &self.builtins {
            provider.insert(builtin.name, v_fn(Arc::new(BuiltinFn(*builtin))));
        }
        for (name, value) in &self.constants {
            provider.insert(*name, value.clone());
        }
        let math = SimpleKvc::from_pairs(
            None,
            MATH_MEMBERS
                .iter()
                .filter_map(|name| provider.get_local(name).map(|v| (*name, v))),
        );
        provider.insert("math", v_kvc(Arc::new(math)));
        provider
    }
}

/// A registered builtin as a callable value.
struct BuiltinFn(Builtin);

impl Function for BuiltinFn {
    fn symbol(&self) -> &str {
        self.0.name
    }

    fn call_type(&self) -> CallType {
        self.0.call_type
    }

    fn call(&self, args: &dyn ParameterList) -> Var {
        let mut bf_args = BfCallState {
            name: self.0.name,
            args,
        };
        match (self.0.function)(&mut bf_args) {
            Ok(value) => value,
            Err(e) => e.into_var(),
        }
    }
}

/// The arguments and other state passed to a built-in function.
pub(crate) struct BfCallState<'a> {
    /// The name of the invoked function.
    pub(crate) name: &'static str,
    /// Arguments passed to the function. Each one is evaluated the first time it is read.
    pub(crate) args: &'a dyn ParameterList,
}

impl BfCallState<'_> {
    pub fn arg_count(&self) -> usize {
        self.args.count()
    }

    /// The argument at `index`. An error value ends the call with that error as its result.
    pub fn arg(&self, index: usize) -> Result<Var, BfErr> {
        let value = self.args.get(index);
        if value.is_err() {
            return Err(BfErr::Raise(value));
        }
        Ok(value)
    }

    /// The argument at `index` as-is, error values included.
    pub fn raw_arg(&self, index: usize) -> Var {
        self.args.get(index)
    }

    /// Every argument, in order, stopping at the first error.
    pub fn all_args(&self) -> Result<Vec<Var>, BfErr> {
        (0..self.arg_count()).map(|i| self.arg(i)).collect()
    }

    /// Fail with a parameter-count error unless `min <= count <= max`.
    pub fn check_arg_count(&self, min: usize, max: Option<usize>) -> Result<(), BfErr> {
        let count = self.arg_count();
        if count < min || max.is_some_and(|max| count > max) {
            let expected = match max {
                Some(max) if max == min => format!("{min}"),
                Some(max) => format!("{min} to {max}"),
                None => format!("at least {min}"),
            };
            return Err(BfErr::ErrValue(E_PARAMETER_COUNT.msg(format!(
                "{}: expected {expected} parameters, got {count}",
                self.name
            ))));
        }
        Ok(())
    }

    pub fn type_error(&self, what: &str, got: &Var) -> BfErr {
        BfErr::ErrValue(E_TYPE_MISMATCH.msg(format!(
            "{}: {what} expected, got {}",
            self.name,
            got.type_code()
        )))
    }
}

pub(crate) type BuiltinFunction = fn(&mut BfCallState<'_>) -> Result<Var, BfErr>;

#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum BfErr {
    #[error("Error in built-in function: {0}")]
    ErrValue(Error),
    /// An operand was already an error; it becomes the result unchanged.
    #[error("Raised error: {0:?}")]
    Raise(Var),
}

impl BfErr {
    fn into_var(self) -> Var {
        match self {
            BfErr::ErrValue(e) => v_err(e),
            BfErr::Raise(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_exposes_operators_and_math() {
        let provider = builtin_provider();
        let plus = provider.get("+").and_then(|v| v.as_function().cloned());
        assert!(matches!(plus.map(|f| f.call_type()), Some(CallType::Infix)));
        let in_fn = provider.get("IN").and_then(|v| v.as_function().cloned());
        assert!(matches!(in_fn.map(|f| f.call_type()), Some(CallType::Dual)));
        let math = provider.get("math").and_then(|v| v.as_kvc().cloned());
        let Some(math) = math else {
            panic!("math collection missing");
        };
        assert!(math.get("sqrt").is_some());
        assert!(math.get("pi").is_some());
    }

    #[test]
    fn test_registry_names_are_unique() {
        let registry = BuiltinRegistry::new();
        let mut names: Vec<_> = registry.names().map(|n| n.to_lowercase()).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
