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

//! Builtin functions for comparing and inspecting values: equality and ordering operators,
//! member access, error construction, identifiers, dates and type names.

use crate::builtins::{BfCallState, BfErr, BuiltinRegistry};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use funcscript_var::{
    CallType, E_INVALID_PARAMETER, E_TYPE_MISMATCH, Error, ErrorCode, Function,
    KeyValueCollection, Var, Variant, v_bool, v_datetime, v_err, v_guid, v_none, v_str, v_string,
};
use std::cmp::Ordering;
use uuid::Uuid;

/// .NET ticks (100ns units since 0001-01-01) at the Unix epoch.
const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Usage: `a = b`, `a == b`
/// True when the operands are equal. Numbers compare by value across integer and float.
fn bf_equals(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let left = bf_args.arg(0)?;
    let right = bf_args.arg(1)?;
    Ok(v_bool(left.loose_eq(&right)))
}

/// Usage: `a != b`
fn bf_not_equals(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let left = bf_args.arg(0)?;
    let right = bf_args.arg(1)?;
    Ok(v_bool(!left.loose_eq(&right)))
}

/// Ordering of the two operands, or null if either is null. Values with no common ordering
/// (a string and a number, say) are a type mismatch.
fn compare_args(bf_args: &BfCallState<'_>, accept: fn(Ordering) -> bool) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let left = bf_args.arg(0)?;
    let right = bf_args.arg(1)?;
    if left.is_none() || right.is_none() {
        return Ok(v_none());
    }
    match left.compare(&right) {
        Some(ordering) => Ok(v_bool(accept(ordering))),
        None => Err(BfErr::ErrValue(E_TYPE_MISMATCH.msg(format!(
            "{}: can't compare {} with {}",
            bf_args.name,
            left.type_code(),
            right.type_code()
        )))),
    }
}

/// Usage: `a < b`
fn bf_less_than(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    compare_args(bf_args, Ordering::is_lt)
}

/// Usage: `a <= b`
fn bf_less_or_equal(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    compare_args(bf_args, Ordering::is_le)
}

/// Usage: `a > b`
fn bf_greater_than(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    compare_args(bf_args, Ordering::is_gt)
}

/// Usage: `a >= b`
fn bf_greater_or_equal(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    compare_args(bf_args, Ordering::is_ge)
}

/// Usage: `x in list`, `in(x, list)`
/// True when some item of the list equals x.
fn bf_in(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let needle = bf_args.arg(0)?;
    let haystack = bf_args.arg(1)?;
    if haystack.is_none() {
        return Ok(v_none());
    }
    let Some(list) = haystack.as_list() else {
        return Err(bf_args.type_error("list", &haystack));
    };
    Ok(v_bool(list.iter().any(|item| item.loose_eq(&needle))))
}

fn member(bf_args: &BfCallState<'_>, target: &Var, key: &Var) -> Result<Var, BfErr> {
    let Some(name) = key.as_str() else {
        return Err(bf_args.type_error("member name string", key));
    };
    match target.variant() {
        Variant::None => Err(BfErr::ErrValue(E_TYPE_MISMATCH.msg(format!(
            "Can't get member {name} from null data"
        )))),
        Variant::Kvc(kvc) => Ok(kvc.get_local(name).unwrap_or_else(v_none)),
        Variant::Function(f) => Ok(f.call(&vec![key.clone()])),
        _ => Err(BfErr::ErrValue(E_TYPE_MISMATCH.msg(format!(
            "Can't get member {name} from a {}",
            target.type_code()
        )))),
    }
}

/// Usage: `target.name`
/// The member `name` of a collection, or null when it has no such member. A null target is a
/// type mismatch.
fn bf_member(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let target = bf_args.arg(0)?;
    let key = bf_args.arg(1)?;
    member(bf_args, &target, &key)
}

/// Usage: `target?.name`
/// Like `.`, but a null target gives null.
fn bf_safe_member(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    let target = bf_args.arg(0)?;
    if target.is_none() {
        return Ok(v_none());
    }
    let key = bf_args.arg(1)?;
    member(bf_args, &target, &key)
}

/// Usage: `error(str message [, str type])`
/// Builds an error value. Without a type the error is of the default kind.
fn bf_error(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(2))?;
    let message = bf_args.arg(0)?;
    let Some(message) = message.as_str() else {
        return Err(bf_args.type_error("message string", &message));
    };
    let code = if bf_args.arg_count() > 1 {
        let kind = bf_args.arg(1)?;
        match kind.variant() {
            Variant::None => None,
            Variant::Str(s) => ErrorCode::parse_str(s),
            _ => return Err(bf_args.type_error("error type string", &kind)),
        }
    } else {
        None
    };
    let code = code.unwrap_or(ErrorCode::E_DEFAULT);
    Ok(v_err(Error::new(code, Some(message.to_string()), None)))
}

/// Usage: `guid guid([str text])`
/// A new random identifier, or the identifier spelled by `text`.
fn bf_guid(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(0, Some(1))?;
    if bf_args.arg_count() == 0 {
        return Ok(v_guid(Uuid::new_v4()));
    }
    let text = bf_args.arg(0)?;
    let Some(s) = text.as_str() else {
        return Err(bf_args.type_error("string", &text));
    };
    match Uuid::parse_str(s) {
        Ok(g) => Ok(v_guid(g)),
        Err(_) => Err(BfErr::ErrValue(
            E_INVALID_PARAMETER.msg(format!("guid: '{s}' is not a valid identifier")),
        )),
    }
}

fn parse_date(text: &str, format: Option<&str>) -> Option<DateTime<Utc>> {
    if let Some(format) = format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
        let date = NaiveDate::parse_from_str(text, format).ok()?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Usage: `datetime date(str text [, str format])`
/// Parses a date. Without a format, RFC 3339 and `YYYY-MM-DD[ HH:MM[:SS]]` are accepted; a
/// format uses strftime syntax. Times without an offset are taken as UTC.
fn bf_date(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(2))?;
    let text = bf_args.arg(0)?;
    if text.is_none() {
        return Ok(v_none());
    }
    let Some(s) = text.as_str() else {
        return Err(bf_args.type_error("string", &text));
    };
    let format = if bf_args.arg_count() > 1 {
        let format = bf_args.arg(1)?;
        match format.variant() {
            Variant::None => None,
            Variant::Str(f) => Some(f.to_string()),
            _ => return Err(bf_args.type_error("format string", &format)),
        }
    } else {
        None
    };
    match parse_date(s, format.as_deref()) {
        Some(dt) => Ok(v_datetime(dt)),
        None => Err(BfErr::ErrValue(E_INVALID_PARAMETER.msg(match &format {
            Some(f) => format!("date: '{s}' can't be converted to date with format '{f}'"),
            None => format!("date: '{s}' can't be converted to date"),
        }))),
    }
}

/// Usage: `datetime ticksToDate(int ticks)`
/// Converts a count of 100-nanosecond ticks since 0001-01-01 UTC into a date.
fn bf_ticks_to_date(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    let ticks = bf_args.arg(0)?;
    if ticks.is_none() {
        return Ok(v_none());
    }
    let Some(ticks) = ticks.as_integer() else {
        return Err(bf_args.type_error("integer", &ticks));
    };
    let date = ticks.checked_sub(TICKS_AT_UNIX_EPOCH).and_then(|since_epoch| {
        let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
        let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(secs, nanos)
    });
    match date {
        Some(dt) => Ok(v_datetime(dt)),
        None => Err(BfErr::ErrValue(
            E_INVALID_PARAMETER.msg("ticksToDate: ticks out of range"),
        )),
    }
}

/// Usage: `str type(any value)`
/// The type name of its argument. Unlike most functions it accepts an error value, for which it
/// answers `Error`.
fn bf_type(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    Ok(v_string(bf_args.raw_arg(0).type_code().to_string()))
}

/// Usage: `str errorType(error e)`
/// The stable code of an error value, or null for anything else.
fn bf_error_type(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    match bf_args.raw_arg(0).as_error() {
        Some(e) => Ok(v_str(e.err_type.as_str())),
        None => Ok(v_none()),
    }
}

pub(crate) fn register_bf_values(builtins: &mut BuiltinRegistry) {
    builtins.register_operator("=", CallType::Infix, bf_equals);
    builtins.register_operator("==", CallType::Infix, bf_equals);
    builtins.register_operator("!=", CallType::Infix, bf_not_equals);
    builtins.register_operator("<", CallType::Infix, bf_less_than);
    builtins.register_operator("<=", CallType::Infix, bf_less_or_equal);
    builtins.register_operator(">", CallType::Infix, bf_greater_than);
    builtins.register_operator(">=", CallType::Infix, bf_greater_or_equal);
    builtins.register_operator("in", CallType::Dual, bf_in);
    builtins.register_operator(".", CallType::Infix, bf_member);
    builtins.register_operator("?.", CallType::Infix, bf_safe_member);
    builtins.register("error", bf_error);
    builtins.register("errorType", bf_error_type);
    builtins.register("guid", bf_guid);
    builtins.register("date", bf_date);
    builtins.register("ticksToDate", bf_ticks_to_date);
    builtins.register("type", bf_type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date_formats() {
        let d = parse_date("2024-02-29", None).map(|d| (d.year(), d.month(), d.day()));
        assert_eq!(d, Some((2024, 2, 29)));
        assert!(parse_date("2024-01-02T03:04:05Z", None).is_some());
        assert!(parse_date("02/01/2024", Some("%d/%m/%Y")).is_some());
        assert!(parse_date("not a date", None).is_none());
    }

    #[test]
    fn test_ticks_at_epoch() {
        let secs = (TICKS_AT_UNIX_EPOCH - TICKS_AT_UNIX_EPOCH) / TICKS_PER_SECOND;
        assert_eq!(DateTime::from_timestamp(secs, 0).map(|d| d.year()), Some(1970));
    }
}
