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

//! Builtin functions for string manipulation and text formatting.

use crate::builtins::{BfCallState, BfErr, BuiltinRegistry};
use crate::format::{format_value, to_text};
use funcscript_var::{E_INVALID_PARAMETER, Var, Variant, v_bool, v_int, v_none, v_string};
use regex::RegexBuilder;

/// The string argument at `index`, `None` for null, or a type mismatch.
fn str_arg(bf_args: &BfCallState<'_>, index: usize) -> Result<Option<String>, BfErr> {
    let value = bf_args.arg(index)?;
    match value.variant() {
        Variant::None => Ok(None),
        Variant::Str(s) => Ok(Some(s.to_string())),
        _ => Err(bf_args.type_error("string", &value)),
    }
}

fn int_arg(bf_args: &BfCallState<'_>, index: usize, default: i64) -> Result<i64, BfErr> {
    if index >= bf_args.arg_count() {
        return Ok(default);
    }
    let value = bf_args.arg(index)?;
    match value.variant() {
        Variant::None => Ok(default),
        Variant::Int(i) => Ok(*i),
        _ => Err(bf_args.type_error("integer", &value)),
    }
}

/// Decimal places requested by a `0.00`-style number pattern.
fn fixed_decimals(pattern: &str) -> Option<usize> {
    let (whole, frac) = pattern.split_once('.').unwrap_or((pattern, ""));
    if whole.is_empty() || !whole.chars().all(|c| c == '0' || c == '#') {
        return None;
    }
    if !frac.chars().all(|c| c == '0') {
        return None;
    }
    Some(frac.len())
}

/// Usage: `str format(any value [, str format])`
/// The text form of a value: strings as themselves, anything else as literal text. The format
/// `"json"` quotes strings too; a `0.00` pattern fixes the decimals of a number.
fn bf_format(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(2))?;
    let value = bf_args.arg(0)?;
    let format = if bf_args.arg_count() > 1 {
        str_arg(bf_args, 1)?
    } else {
        None
    };
    let Some(format) = format else {
        return Ok(v_string(to_text(&value)));
    };
    if format.eq_ignore_ascii_case("json") {
        return Ok(v_string(format_value(&value)));
    }
    match (fixed_decimals(&format), value.as_f64()) {
        (Some(decimals), Some(f)) => Ok(v_string(format!("{f:.decimals$}"))),
        _ => Ok(v_string(to_text(&value))),
    }
}

/// Usage: `str _templatemerge(str part, ...)`
/// Concatenates the parts of a string template. Any part that is an error becomes the result.
fn bf_template_merge(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    let mut out = String::new();
    for part in bf_args.all_args()? {
        out.push_str(&to_text(&part));
    }
    Ok(v_string(out))
}

/// Usage: `str upper(str s)`
fn bf_upper(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    Ok(str_arg(bf_args, 0)?.map_or_else(v_none, |s| v_string(s.to_uppercase())))
}

/// Usage: `str lower(str s)`
fn bf_lower(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    Ok(str_arg(bf_args, 0)?.map_or_else(v_none, |s| v_string(s.to_lowercase())))
}

fn substring_chars(s: &str, start: i64, count: Option<i64>) -> String {
    let len = s.chars().count() as i64;
    if start < 0 || start >= len {
        return String::new();
    }
    let available = len - start;
    let take = count.map_or(available, |c| c.clamp(0, available));
    s.chars().skip(start as usize).take(take as usize).collect()
}

/// Usage: `str substring(str s, int start [, int count])`
/// Characters of s from `start`, at most `count` of them. A start outside the string gives "".
fn bf_substring(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(3))?;
    let Some(s) = str_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let start = int_arg(bf_args, 1, 0)?;
    let count = if bf_args.arg_count() > 2 {
        Some(int_arg(bf_args, 2, i64::MAX)?)
    } else {
        None
    };
    Ok(v_string(substring_chars(&s, start, count)))
}

/// Usage: `bool isBlank(str s)`
/// True for null, the empty string, or whitespace only.
fn bf_is_blank(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(1))?;
    Ok(v_bool(
        str_arg(bf_args, 0)?.is_none_or(|s| s.trim().is_empty()),
    ))
}

/// Usage: `str join(list items [, str separator])`
/// The text forms of the items, separated by `separator` (default none). Null items are
/// skipped.
fn bf_join(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(1, Some(2))?;
    let items = bf_args.arg(0)?;
    if items.is_none() {
        return Ok(v_none());
    }
    let Some(list) = items.as_list() else {
        return Err(bf_args.type_error("list", &items));
    };
    let separator = if bf_args.arg_count() > 1 {
        str_arg(bf_args, 1)?.unwrap_or_default()
    } else {
        String::new()
    };
    let mut parts = Vec::with_capacity(list.len());
    for item in list.iter() {
        if item.is_err() {
            return Err(BfErr::Raise(item));
        }
        if !item.is_none() {
            parts.push(to_text(&item));
        }
    }
    Ok(v_string(parts.join(&separator)))
}

/// Usage: `bool endswith(str s, str suffix)`
fn bf_ends_with(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    match (str_arg(bf_args, 0)?, str_arg(bf_args, 1)?) {
        (Some(s), Some(suffix)) => Ok(v_bool(s.ends_with(&suffix))),
        _ => Ok(v_bool(false)),
    }
}

/// Usage: `bool startswith(str s, str prefix)`
fn bf_starts_with(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(2))?;
    match (str_arg(bf_args, 0)?, str_arg(bf_args, 1)?) {
        (Some(s), Some(prefix)) => Ok(v_bool(s.starts_with(&prefix))),
        _ => Ok(v_bool(false)),
    }
}

fn find_chars(s: &str, needle: &str, start: usize) -> Option<usize> {
    let haystack: Vec<char> = s.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if start > haystack.len() || needle.len() > haystack.len() - start {
        return None;
    }
    (start..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == needle[..])
}

/// Usage: `int find(str s, str needle [, int start])`
/// Character index of the first occurrence of needle at or after `start`, or -1.
fn bf_find(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(3))?;
    let (Some(s), Some(needle)) = (str_arg(bf_args, 0)?, str_arg(bf_args, 1)?) else {
        return Ok(v_int(-1));
    };
    let start = int_arg(bf_args, 2, 0)?.max(0) as usize;
    Ok(v_int(
        find_chars(&s, &needle, start).map_or(-1, |i| i as i64),
    ))
}

/// Flags as in `regex(text, pattern, "im")`. Whitespace, `,` and `|` between flags are ignored.
fn regex_builder(pattern: &str, flags: &str) -> Result<RegexBuilder, char> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        if flag.is_whitespace() || flag == ',' || flag == '|' {
            continue;
        }
        match flag.to_ascii_lowercase() {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            _ => return Err(flag),
        };
    }
    Ok(builder)
}

/// Usage: `bool regex(str text, str pattern [, str flags])`
/// True when pattern matches somewhere in text. Flags: `i` ignore case, `m` multi-line, `s`
/// dot matches newline, `x` ignore pattern whitespace.
fn bf_regex(bf_args: &mut BfCallState<'_>) -> Result<Var, BfErr> {
    bf_args.check_arg_count(2, Some(3))?;
    let Some(text) = str_arg(bf_args, 0)? else {
        return Ok(v_none());
    };
    let Some(pattern) = str_arg(bf_args, 1)? else {
        return Err(bf_args.type_error("pattern string", &bf_args.raw_arg(1)));
    };
    let flags = if bf_args.arg_count() > 2 {
        str_arg(bf_args, 2)?.unwrap_or_default()
    } else {
        String::new()
    };
    let builder = regex_builder(&pattern, &flags).map_err(|flag| {
        BfErr::ErrValue(E_INVALID_PARAMETER.msg(format!("regex: unsupported regex option '{flag}'")))
    })?;
    match builder.build() {
        Ok(re) => Ok(v_bool(re.is_match(&text))),
        Err(e) => Err(BfErr::ErrValue(
            E_INVALID_PARAMETER.msg(format!("regex: invalid pattern: {e}")),
        )),
    }
}

pub(crate) fn register_bf_strings(builtins: &mut BuiltinRegistry) {
    builtins.register("format", bf_format);
    builtins.register("_templatemerge", bf_template_merge);
    builtins.register("upper", bf_upper);
    builtins.register("lower", bf_lower);
    builtins.register("substring", bf_substring);
    builtins.register("isBlank", bf_is_blank);
    builtins.register("join", bf_join);
    builtins.register("endswith", bf_ends_with);
    builtins.register("startswith", bf_starts_with);
    builtins.register("find", bf_find);
    builtins.register("regex", bf_regex);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_chars() {
        assert_eq!(substring_chars("héllo", 1, Some(3)), "éll");
        assert_eq!(substring_chars("abc", 1, None), "bc");
        assert_eq!(substring_chars("abc", 5, None), "");
        assert_eq!(substring_chars("abc", 1, Some(10)), "bc");
    }

    #[test]
    fn test_fixed_decimals() {
        assert_eq!(fixed_decimals("0.00"), Some(2));
        assert_eq!(fixed_decimals("#0"), Some(0));
        assert_eq!(fixed_decimals("yyyy"), None);
    }

    #[test]
    fn test_regex_flags() {
        let re = regex_builder("^abc$", "i, m").map(|b| b.build());
        assert!(matches!(re, Ok(Ok(re)) if re.is_match("x\nABC")));
        assert!(matches!(regex_builder("a", "q"), Err('q')));
    }

    #[test]
    fn test_find_chars() {
        assert_eq!(find_chars("héllo", "l", 0), Some(2));
        assert_eq!(find_chars("héllo", "l", 3), Some(3));
        assert_eq!(find_chars("abc", "", 3), Some(3));
        assert_eq!(find_chars("abc", "d", 0), None);
        assert_eq!(find_chars("abc", "a", 4), None);
    }
}
