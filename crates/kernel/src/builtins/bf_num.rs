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

//! Builtin functions for arithmetic operators and mathematical functions.

use crate::builtins::numeric::Number;
use crate::builtins::{BfCallState, BfErr, BuiltinRegistry};
use crate::format::to_text;
use funcscript_var::{
    ArrayList, CallType, ConcatList, E_INVALID_PARAMETER, E_TYPE_MISMATCH, Error, FsList, Var,
    Variant, merge_kvc, v_float, v_none, v_string,
};
use std::cmp::Ordering;
use std::sync::Arc;

/// The names also reachable as members of the `math` collection.
pub(crate) const MATH_MEMBERS: &[&str] = &[
    "abs", "floor", "ceil", "round", "sqrt", "min", "max", "pi", "e",
];

/// Usage: `a + b [+ ...]`
/// Adds its operands left to right. Numbers add; a string on either side concatenates with the
/// text form of the other; lists concatenate, and a non-list operand joins a list as a single
/// item; two collections merge, the right-hand side winning. Null operands are skipped.
fn bf_add(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    let mut total: Option<Var> = None;
    for i in 0..bf_args.arg_count() {
        let value = bf_args.arg(i)?;
        if value.is_none() {
            continue;
        }
        total = Some(match total {
            None => value,
            Some(left) => add_pair(bf_args, left, value)?,
        });
    }
    Ok(total.unwrap_or_else(v_none))
}

fn add_pair(bf_args: &BfCallState<'_>, left: Var, right: Var) -> Result<Var, BfErr> {
    match (left.variant(), right.variant()) {
        (Variant::Kvc(l), Variant::Kvc(r)) => Ok(merge_kvc(l.clone(), r.clone())),
        (Variant::Kvc(_), _) | (_, Variant::Kvc(_)) => Err(mismatch(bf_args, &left, &right)),
        (Variant::List(l), Variant::List(r)) => Ok(concat(l.clone(), r.clone())),
        (Variant::List(l), _) => Ok(concat(l.clone(), single(right.clone()))),
        (_, Variant::List(r)) => Ok(concat(single(left.clone()), r.clone())),
        (Variant::Str(_), _) | (_, Variant::Str(_)) => {
            Ok(v_string(to_text(&left) + &to_text(&right)))
        }
        _ => match (Number::from_var(&left), Number::from_var(&right)) {
            (Some(l), Some(r)) => Ok(l.add(r).into_var()),
            _ => Err(mismatch(bf_args, &left, &right)),
        },
    }
}

fn single(value: Var) -> Arc<dyn FsList> {
    Arc::new(ArrayList::from(vec![value]))
}

fn concat(left: Arc<dyn FsList>, right: Arc<dyn FsList>) -> Var {
    Var::mk_list_of(Arc::new(ConcatList::new(vec![left, right])))
}

fn mismatch(bf_args: &BfCallState<'_>, left: &Var, right: &Var) -> BfErr {
    BfErr::ErrValue(E_TYPE_MISMATCH.msg(format!(
        "{}: can't combine {} with {}",
        bf_args.name,
        left.type_code(),
        right.type_code()
    )))
}

type NumberOp = fn(Number, Number) -> Result<Number, Error>;

/// Left fold of a numeric operator over every operand. A null operand makes the result null.
fn fold_numbers(bf_args: &BfCallState<'_>, op: NumberOp) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, None)?;
    let mut total: Option<Number> = None;
    for i in 0..bf_args.arg_count() {
        let value = bf_args.arg(i)?;
        if value.is_none() {
            return Ok(v_none());
        }
        let Some(n) = Number::from_var(&value) else {
            return Err(bf_args.type_error("number", &value));
        };
        total = Some(match total {
            None => n,
            Some(t) => op(t, n).map_err(BfErr::ErrValue)?,
        });
    }
    Ok(total.map_or_else(v_none, Number::into_var))
}

/// Usage: `a - b [- ...]`
fn bf_subtract(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    fold_numbers(bf_args, |a, b| Ok(a.sub(b)))
}

/// Usage: `a * b [* ...]`
fn bf_multiply(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    fold_numbers(bf_args, |a, b| Ok(a.mul(b)))
}

/// Usage: `a / b [/ ...]`
/// Integer operands that divide exactly give an integer; otherwise the result is a float.
/// Integer division by zero is E_INVALID_PARAMETER.
fn bf_divide(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    fold_numbers(bf_args, Number::div)
}

/// Usage: `a div b`
/// Integer quotient, truncated toward zero.
fn bf_int_divide(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    fold_numbers(bf_args, Number::int_div)
}

/// Usage: `a % b`
fn bf_modulo(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    fold_numbers(bf_args, Number::rem)
}

/// Usage: `a ^ b`
/// Raises a to the power b. A non-negative integer exponent on an integer base stays exact.
fn bf_power(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    fold_numbers(bf_args, Number::pow)
}

/// Usage: `-x`, `negate(x)`
fn bf_negate(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let value = bf_args.arg(0)?;
    if value.is_none() {
        return Ok(v_none());
    }
    match Number::from_var(&value) {
        Some(n) => Ok(n.neg().into_var()),
        None => Err(bf_args.type_error("number", &value)),
    }
}

fn number_arg(bf_args: &BfCallState<'_>, index: usize) -> Result<Number, BfErr> {
    let value = bf_args.arg(index)?;
    Number::from_var(&value).ok_or_else(|| bf_args.type_error("number", &value))
}

/// Usage: `num abs(num x)`
/// Returns the absolute value of x, of the same numeric type.
fn bf_abs(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    Ok(number_arg(bf_args, 0)?.abs().into_var())
}

/// Usage: `num floor(num x)`
fn bf_floor(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    match number_arg(bf_args, 0)? {
        Number::Float(f) => Ok(v_float(f.floor())),
        n => Ok(n.into_var()),
    }
}

/// Usage: `num ceil(num x)`
fn bf_ceil(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    match number_arg(bf_args, 0)? {
        Number::Float(f) => Ok(v_float(f.ceil())),
        n => Ok(n.into_var()),
    }
}

/// Usage: `num round(num x [, int digits])`
/// Rounds half away from zero to the given number of fractional digits (default 0).
fn bf_round(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(2))?;
    let x = number_arg(bf_args, 0)?;
    let digits = if bf_args.arg_count() > 1 {
        let d = bf_args.arg(1)?;
        d.as_integer()
            .ok_or_else(|| bf_args.type_error("integer digit count", &d))?
    } else {
        0
    };
    match x {
        Number::Float(f) => {
            let scale = 10f64.powi(digits.clamp(-300, 300) as i32);
            Ok(v_float((f * scale).round() / scale))
        }
        n => Ok(n.into_var()),
    }
}

/// Usage: `float sqrt(num x)`
fn bf_sqrt(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let x = number_arg(bf_args, 0)?.to_f64();
    if x < 0.0 {
        return Err(BfErr::ErrValue(
            E_INVALID_PARAMETER.msg("sqrt: negative argument"),
        ));
    }
    Ok(v_float(x.sqrt()))
}

/// The operands of `min`/`max`: either the arguments themselves or the items of a single list.
fn extremum(bf_args: &BfCallState<'_>, keep: Ordering) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, None)?;
    let mut values = bf_args.all_args()?;
    if values.len() == 1
        && let Some(list) = values[0].as_list()
    {
        values = list.to_vec();
    }
    let mut best: Option<Var> = None;
    for value in values {
        if value.is_err() {
            return Err(BfErr::Raise(value));
        }
        best = Some(match best {
            None => value,
            Some(current) => match value.compare(&current) {
                Some(ordering) if ordering == keep => value,
                Some(_) => current,
                None => return Err(mismatch(bf_args, &current, &value)),
            },
        });
    }
    Ok(best.unwrap_or_else(v_none))
}

/// Usage: `min(x, ...)`, `min(list)`
/// Returns the smallest of its arguments, or of the items of a single list argument.
fn bf_min(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    extremum(bf_args, Ordering::Less)
}

/// Usage: `max(x, ...)`, `max(list)`
fn bf_max(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    extremum(bf_args, Ordering::Greater)
}

pub(crate) fn register_bf_num(builtins: &mut BuiltinRegistry) {
    builtins.register_operator("+", CallType::Infix, bf_add);
    builtins.register_operator("-", CallType::Infix, bf_subtract);
    builtins.register_operator("*", CallType::Infix, bf_multiply);
    builtins.register_operator("/", CallType::Infix, bf_divide);
    builtins.register_operator("div", CallType::Infix, bf_int_divide);
    builtins.register_operator("%", CallType::Infix, bf_modulo);
    builtins.register_operator("^", CallType::Infix, bf_power);
    builtins.register("negate", bf_negate);
    builtins.register("abs", bf_abs);
    builtins.register("floor", bf_floor);
    builtins.register("ceil", bf_ceil);
    builtins.register("round", bf_round);
    builtins.register("sqrt", bf_sqrt);
    builtins.register("min", bf_min);
    builtins.register("max", bf_max);
    builtins.register_constant("pi", v_float(std::f64::consts::PI));
    builtins.register_constant("e", v_float(std::f64::consts::E));
}
