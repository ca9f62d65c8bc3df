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

use crate::{Var, v_none};
use arcstr::ArcStr;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// How a function may be spelled at a call site.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CallType {
    /// `f(a, b)`
    Prefix,
    /// Operator symbols: `a + b`.
    Infix,
    /// Named functions that may also be written between their operands: `a in b`, `a f b ~ c`.
    Dual,
}

pub type SharedParameters = Arc<dyn ParameterList + Send + Sync>;

/// Arguments handed to a function. Implementations are free to compute an argument only when
/// `get` is first called for its index; the same index always yields the same value.
pub trait ParameterList {
    fn count(&self) -> usize;

    /// Argument at `index`, or null past the end.
    fn get(&self, index: usize) -> Var;

    /// An owned handle on these same arguments, for a callee that reads them after `call`
    /// returns. Arguments already computed stay computed. `None` means the callee has to read
    /// what it needs up front.
    fn share(&self) -> Option<SharedParameters> {
        None
    }
}

impl ParameterList for Vec<Var> {
    fn count(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Var {
        self.as_slice().get(index).cloned().unwrap_or_else(v_none)
    }

    fn share(&self) -> Option<SharedParameters> {
        Some(Arc::new(self.clone()))
    }
}

pub trait Function: Send + Sync {
    fn symbol(&self) -> &str;

    fn call_type(&self) -> CallType {
        CallType::Prefix
    }

    fn call(&self, args: &dyn ParameterList) -> Var;
}

type HostBody = Box<dyn Fn(&dyn ParameterList) -> Var + Send + Sync>;

/// A function supplied by the embedding application as a Rust closure.
pub struct HostFunction {
    symbol: ArcStr,
    call_type: CallType,
    body: HostBody,
}

impl HostFunction {
    pub fn new<F>(symbol: &str, body: F) -> Self
    where
        F: Fn(&dyn ParameterList) -> Var + Send + Sync + 'static,
    {
        Self {
            symbol: ArcStr::from(symbol),
            call_type: CallType::Prefix,
            body: Box::new(body),
        }
    }

    #[must_use]
    pub fn with_call_type(mut self, call_type: CallType) -> Self {
        self.call_type = call_type;
        self
    }
}

impl Debug for HostFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HostFunction({})", self.symbol)
    }
}

impl Function for HostFunction {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn call_type(&self) -> CallType {
        self.call_type
    }

    fn call(&self, args: &dyn ParameterList) -> Var {
        (self.body)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v_int;

    #[test]
    fn test_host_function_sees_arguments() {
        let sum = HostFunction::new("sum", |args| {
            let total = (0..args.count())
                .filter_map(|i| args.get(i).as_integer())
                .sum::<i64>();
            v_int(total)
        });
        assert_eq!(sum.call(&vec![v_int(2), v_int(3)]), v_int(5));
        assert_eq!(sum.call_type(), CallType::Prefix);
    }

    #[test]
    fn test_missing_argument_is_null() {
        let args = vec![v_int(1)];
        assert!(args.get(4).is_none());
    }
}
