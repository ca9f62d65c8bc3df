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

//! Builtin functions for boolean logic and conditional selection. All of them read their
//! arguments lazily, so a branch that isn't taken is never evaluated.

use crate::builtins::{BfCallState, BfErr, BuiltinRegistry};
use funcscript_var::{CallType, Var, Variant, v_bool, v_none};

fn condition(bf_args: &BfCallState<'_>, index: usize) -> Result<bool, BfErr> {
    let value = bf_args.arg(index)?;
    match value.variant() {
        Variant::Bool(b) => Ok(*b),
        Variant::None => Ok(false),
        _ => Err(bf_args.type_error("boolean", &value)),
    }
}

/// Usage: `a and b [and ...]`
/// False as soon as an operand is false; the remaining operands are not evaluated.
fn bf_and(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, None)?;
    for i in 0..bf_args.arg_count() {
        if !condition(bf_args, i)? {
            return Ok(v_bool(false));
        }
    }
    Ok(v_bool(true))
}

/// Usage: `a or b [or ...]`
/// True as soon as an operand is true; the remaining operands are not evaluated.
fn bf_or(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, None)?;
    for i in 0..bf_args.arg_count() {
        if condition(bf_args, i)? {
            return Ok(v_bool(true));
        }
    }
    Ok(v_bool(false))
}

/// Usage: `not x`, `!x`
fn bf_not(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let value = bf_args.arg(0)?;
    match value.as_bool() {
        Some(b) => Ok(v_bool(!b)),
        None => Err(bf_args.type_error("boolean", &value)),
    }
}

/// Usage: `if(cond, then [, else])`, `if cond then a else b`
/// Null counts as false. Without an else branch a false condition gives null.
fn bf_if(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(3))?;
    if condition(bf_args, 0)? {
        Ok(bf_args.raw_arg(1))
    } else if bf_args.arg_count() > 2 {
        Ok(bf_args.raw_arg(2))
    } else {
        Ok(v_none())
    }
}

/// Usage: `case(cond1, value1, [cond2, value2, ...] [default])`
/// The value paired with the first true condition. An odd trailing argument is the default.
fn bf_case(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, None)?;
    let count = bf_args.arg_count();
    let mut i = 0;
    while i + 1 < count {
        if condition(bf_args, i)? {
            return Ok(bf_args.raw_arg(i + 1));
        }
        i += 2;
    }
    if i < count {
        return Ok(bf_args.raw_arg(i));
    }
    Ok(v_none())
}

/// Usage: `switch(selector, match1, result1, [match2, result2, ...] [default])`
/// The result paired with the first match equal to the selector. An odd trailing argument is
/// the default.
fn bf_switch(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, None)?;
    let selector = bf_args.arg(0)?;
    let count = bf_args.arg_count();
    let mut i = 1;
    while i + 1 < count {
        let candidate = bf_args.arg(i)?;
        if candidate.loose_eq(&selector) {
            return Ok(bf_args.raw_arg(i + 1));
        }
        i += 2;
    }
    if i < count {
        return Ok(bf_args.raw_arg(i));
    }
    Ok(v_none())
}

/// Usage: `a ?? b [?? ...]`
/// The first operand that is neither null nor an error, else null.
fn bf_replace_if_null(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    for i in 0..bf_args.arg_count() {
        let value = bf_args.raw_arg(i);
        if !value.is_none() && !value.is_err() {
            return Ok(value);
        }
    }
    Ok(v_none())
}

/// Usage: `a ?! b`
/// Null when a is null, otherwise b. b is only evaluated for a non-null a.
fn bf_evaluate_if_not_null(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let value = bf_args.arg(0)?;
    if value.is_none() {
        return Ok(v_none());
    }
    Ok(bf_args.raw_arg(1))
}

pub(crate) fn register_bf_logic(builtins: &mut BuiltinRegistry) {
    builtins.register_operator("and", CallType::Infix, bf_and);
    builtins.register_operator("or", CallType::Infix, bf_or);
    builtins.register("not", bf_not);
    builtins.register("!", bf_not);
    builtins.register("if", bf_if);
    builtins.register("case", bf_case);
    builtins.register("switch", bf_switch);
    builtins.register_operator("??", CallType::Infix, bf_replace_if_null);
    builtins.register_operator("?!", CallType::Infix, bf_evaluate_if_not_null);
}
