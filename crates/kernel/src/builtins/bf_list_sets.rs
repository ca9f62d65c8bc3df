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

//! Builtin functions for lists: sizing, generation, higher-order transforms and ordering.

use crate::builtins::{BfCallState, BfErr, BuiltinRegistry};
use funcscript_var::{
    E_INVALID_PARAMETER, E_TYPE_MISMATCH, FsList, Function, Var, Variant, v_bool, v_empty_list,
    v_int, v_list_iter, v_none,
};
use std::cmp::Ordering;
use std::sync::Arc;

/// `range(start, count)` without materializing the items.
struct RangeList {
    start: i64,
    count: usize,
}

impl FsList for RangeList {
    fn len(&self) -> usize {
        self.count
    }

    fn get(&self, index: usize) -> Option<Var> {
        if index >= self.count {
            return None;
        }
        Some(v_int(self.start + index as i64))
    }
}

/// The list argument at `index`, `None` for null, or a type mismatch.
fn list_arg(bf_args: &BfCallState<'_>, index: usize) -> Result<Option<Arc<dyn FsList>>, BfErr> {
    let value = bf_args.arg(index)?;
    match value.variant() {
        Variant::None => Ok(None),
        Variant::List(list) => Ok(Some(list.clone())),
        _ => Err(bf_args.type_error("list", &value)),
    }
}

fn function_arg(bf_args: &BfCallState<'_>, index: usize) -> Result<Arc<dyn Function>, BfErr> {
    let value = bf_args.arg(index)?;
    match value.as_function() {
        Some(f) => Ok(f.clone()),
        None => Err(bf_args.type_error("function", &value)),
    }
}

fn count_arg(bf_args: &BfCallState<'_>, index: usize) -> Result<usize, BfErr> {
    let value = bf_args.arg(index)?;
    match value.as_integer() {
        Some(n) => Ok(n.max(0) as usize),
        None => Err(bf_args.type_error("integer", &value)),
    }
}

/// Apply a predicate; anything but `true` is false, and an error result ends the call.
fn predicate_holds(f: &Arc<dyn Function>, args: Vec<Var>) -> Result<bool, BfErr> {
    let result = f.call(&args);
    if result.is_err() {
        return Err(BfErr::Raise(result));
    }
    Ok(result.as_bool() == Some(true))
}

/// Usage: `int len(list|str|kvc value)`
/// Item count of a list or collection, character count of a string; null has length 0.
fn bf_len(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let value = bf_args.arg(0)?;
    if value.is_none() {
        return Ok(v_int(0));
    }
    match value.len() {
        Ok(len) => Ok(v_int(len as i64)),
        Err(e) => Err(BfErr::ErrValue(e)),
    }
}

/// Usage: `list range(int start, int count)`
/// The integers start, start+1, ... count of them.
fn bf_range(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let start = bf_args.arg(0)?;
    let Some(start) = start.as_integer() else {
        return Err(bf_args.type_error("integer start", &start));
    };
    let count = count_arg(bf_args, 1)?;
    if start.checked_add(count as i64).is_none() {
        return Err(BfErr::ErrValue(
            E_INVALID_PARAMETER.msg("range: the range overflows"),
        ));
    }
    Ok(Var::mk_list_of(Arc::new(RangeList { start, count })))
}

/// Usage: `list map(list items, fn f)`
/// `f(item, index)` for every item.
fn bf_map(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let f = function_arg(bf_args, 1)?;
    Ok(v_list_iter(
        list.iter()
            .enumerate()
            .map(|(i, item)| f.call(&vec![item, v_int(i as i64)])),
    ))
}

/// Usage: `list filter(list items, fn predicate)`
/// The items for which `predicate(item, index)` is true.
fn bf_filter(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let f = function_arg(bf_args, 1)?;
    let mut kept = vec![];
    for (i, item) in list.iter().enumerate() {
        if predicate_holds(&f, vec![item.clone(), v_int(i as i64)])? {
            kept.push(item);
        }
    }
    Ok(v_list_iter(kept))
}

/// Usage: `any reduce(list items, fn f [, any initial])`
/// Folds the list: `total = f(item, total, index)`, starting from `initial` (default null).
fn bf_reduce(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(3))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let f = function_arg(bf_args, 1)?;
    let mut total = if bf_args.arg_count() > 2 {
        bf_args.arg(2)?
    } else {
        v_none()
    };
    for (i, item) in list.iter().enumerate() {
        total = f.call(&vec![item, total, v_int(i as i64)]);
        if total.is_err() {
            return Err(BfErr::Raise(total));
        }
    }
    Ok(total)
}

/// Usage: `any first(list items, fn predicate)`
/// The first item for which `predicate(item, index)` is true, or null.
fn bf_first(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let f = function_arg(bf_args, 1)?;
    for (i, item) in list.iter().enumerate() {
        if predicate_holds(&f, vec![item.clone(), v_int(i as i64)])? {
            return Ok(item);
        }
    }
    Ok(v_none())
}

/// Usage: `bool any(list items, fn predicate)`
fn bf_any(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_bool(false));
    };
    let f = function_arg(bf_args, 1)?;
    for (i, item) in list.iter().enumerate() {
        if predicate_holds(&f, vec![item, v_int(i as i64)])? {
            return Ok(v_bool(true));
        }
    }
    Ok(v_bool(false))
}

/// Usage: `bool contains(list|str container, any value)`
/// For a list, whether an item equals value; for a string, whether value occurs in it.
fn bf_contains(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let container = bf_args.arg(0)?;
    let value = bf_args.arg(1)?;
    match container.variant() {
        Variant::None => Ok(v_bool(false)),
        Variant::List(list) => Ok(v_bool(list.iter().any(|item| item.loose_eq(&value)))),
        Variant::Str(s) => match value.as_str() {
            Some(needle) => Ok(v_bool(s.contains(needle))),
            None => Err(bf_args.type_error("string", &value)),
        },
        _ => Err(bf_args.type_error("list or string", &container)),
    }
}

/// Usage: `list distinct(list items)`
/// The items with later duplicates removed.
fn bf_distinct(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let mut seen: Vec<Var> = vec![];
    for item in list.iter() {
        if !seen.iter().any(|s| s.loose_eq(&item)) {
            seen.push(item);
        }
    }
    Ok(v_list_iter(seen))
}

/// Usage: `list sort(list items [, fn compare])`
/// Stable sort. Without a comparer items are ordered naturally and must be comparable; a
/// comparer `compare(a, b)` returns a negative, zero or positive integer.
fn bf_sort(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let comparer = if bf_args.arg_count() > 1 {
        Some(function_arg(bf_args, 1)?)
    } else {
        None
    };
    let mut items = list.to_vec();
    let mut failure: Option<BfErr> = None;
    items.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        let ordering = match &comparer {
            None => a.compare(b).ok_or_else(|| {
                BfErr::ErrValue(E_TYPE_MISMATCH.msg(format!(
                    "sort: can't compare {} with {}",
                    a.type_code(),
                    b.type_code()
                )))
            }),
            Some(f) => {
                let result = f.call(&vec![a.clone(), b.clone()]);
                match result.as_integer() {
                    Some(n) => Ok(n.cmp(&0)),
                    None if result.is_err() => Err(BfErr::Raise(result)),
                    None => Err(BfErr::ErrValue(E_TYPE_MISMATCH.msg(
                        "sort: the sorting function must return an integer",
                    ))),
                }
            }
        };
        ordering.unwrap_or_else(|e| {
            failure = Some(e);
            Ordering::Equal
        })
    });
    if let Some(failure) = failure {
        return Err(failure);
    }
    Ok(v_list_iter(items))
}

/// Usage: `list reverse(list items)`
fn bf_reverse(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let mut items = list.to_vec();
    items.reverse();
    Ok(v_list_iter(items))
}

/// Usage: `list skip(list items, int n)`
/// The items after the first n.
fn bf_skip(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let n = count_arg(bf_args, 1)?;
    if n >= list.len() {
        return Ok(v_empty_list());
    }
    Ok(v_list_iter(list.iter().skip(n)))
}

/// Usage: `list take(list items, int n)`
/// At most the first n items.
fn bf_take(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let Some(list) = list_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let n = count_arg(bf_args, 1)?;
    Ok(v_list_iter(list.iter().take(n)))
}

pub(crate) fn register_bf_list_sets(builtins: &mut BuiltinRegistry) {
    builtins.register("len", bf_len);
    builtins.register("range", bf_range);
    builtins.register("map", bf_map);
    builtins.register("filter", bf_filter);
    builtins.register("reduce", bf_reduce);
    builtins.register("first", bf_first);
    builtins.register("any", bf_any);
    builtins.register("contains", bf_contains);
    builtins.register("distinct", bf_distinct);
    builtins.register("sort", bf_sort);
    builtins.register("reverse", bf_reverse);
    builtins.register("skip", bf_skip);
    builtins.register("take", bf_take);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_list_is_lazy_and_bounded() {
        let r = RangeList {
            start: 5,
            count: 3,
        };
        assert_eq!(r.len(), 3);
        assert_eq!(r.get(2), Some(v_int(7)));
        assert_eq!(r.get(3), None);
    }
}
