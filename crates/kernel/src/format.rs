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

//! Rendering values as FuncScript literal text.
//!
//! Rendering walks every member of collections and lists, so it forces whatever was still
//! lazy. Strings are quoted, collections print as `{key:value,...}` and lists as `[a,b]`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use funcscript_var::{KeyValueCollection, Var, Variant};
use std::fmt::Write;

const INDENT: &str = "  ";

/// Compact literal text for `value`.
pub fn format_value(value: &Var) -> String {
    let mut out = String::new();
    write_value(&mut out, value, None);
    out
}

/// Literal text with one member or item per line, indented by nesting level.
pub fn format_value_pretty(value: &Var) -> String {
    let mut out = String::new();
    write_value(&mut out, value, Some(0));
    out
}

/// The text a value contributes to a string: strings as themselves, anything else as its
/// literal form.
pub fn to_text(value: &Var) -> String {
    match value.variant() {
        Variant::Str(s) => s.to_string(),
        _ => format_value(value),
    }
}

fn write_value(out: &mut String, value: &Var, level: Option<usize>) {
    match value.variant() {
        Variant::None => out.push_str("null"),
        Variant::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Variant::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Variant::BigInt(i) => {
            let _ = write!(out, "{i}");
        }
        Variant::Float(f) => out.push_str(&float_text(*f)),
        Variant::DateTime(d) => quote_into(out, &d.to_rfc3339()),
        Variant::Guid(g) => quote_into(out, &g.to_string()),
        Variant::Str(s) => quote_into(out, s),
        Variant::Bytes(b) => quote_into(out, &STANDARD.encode(b)),
        Variant::List(list) => {
            let items = list.to_vec();
            write_sequence(out, '[', ']', level, items.len(), |out, i, level| {
                write_value(out, &items[i], level)
            });
        }
        Variant::Kvc(kvc) => write_kvc(out, kvc.as_ref(), level),
        Variant::Function(f) => {
            let _ = write!(out, "[function {}]", f.symbol());
        }
        Variant::Err(e) => {
            out.push_str("error(");
            quote_into(out, &e.message());
            out.push_str(", ");
            quote_into(out, e.err_type.as_str());
            out.push(')');
        }
    }
}

fn write_kvc(out: &mut String, kvc: &dyn KeyValueCollection, level: Option<usize>) {
    let pairs = kvc.get_all();
    write_sequence(out, '{', '}', level, pairs.len(), |out, i, level| {
        let (key, value) = &pairs[i];
        if is_plain_key(key) {
            out.push_str(key);
        } else {
            quote_into(out, key);
        }
        out.push(':');
        if level.is_some() {
            out.push(' ');
        }
        write_value(out, value, level);
    });
}

fn write_sequence<F>(
    out: &mut String,
    open: char,
    close: char,
    level: Option<usize>,
    len: usize,
    mut item: F,
) where
    F: FnMut(&mut String, usize, Option<usize>),
{
    out.push(open);
    if len == 0 {
        out.push(close);
        return;
    }
    match level {
        None => {
            for i in 0..len {
                if i > 0 {
                    out.push(',');
                }
                item(out, i, None);
            }
        }
        Some(level) => {
            for i in 0..len {
                out.push('\n');
                out.push_str(&INDENT.repeat(level + 1));
                item(out, i, Some(level + 1));
                if i + 1 < len {
                    out.push(',');
                }
            }
            out.push('\n');
            out.push_str(&INDENT.repeat(level));
        }
    }
    out.push(close);
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn float_text(f: f64) -> String {
    let text = f.to_string();
    if f.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{text}.0")
    } else {
        text
    }
}

fn quote_into(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use funcscript_var::{v_bool, v_float, v_int, v_kvc_pairs, v_list, v_none, v_str};
    use pretty_assertions::assert_eq;
    use unindent::unindent;

    #[test]
    fn test_scalars() {
        assert_eq!(format_value(&v_none()), "null");
        assert_eq!(format_value(&v_bool(true)), "true");
        assert_eq!(format_value(&v_int(-3)), "-3");
        assert_eq!(format_value(&v_float(2.0)), "2.0");
        assert_eq!(format_value(&v_float(0.25)), "0.25");
        assert_eq!(format_value(&v_str("a\"b\n")), r#""a\"b\n""#);
    }

    #[test]
    fn test_collections() {
        let v = v_kvc_pairs(&[
            ("a", v_list(&[v_int(1), v_str("x")])),
            ("b c", v_kvc_pairs(&[])),
        ]);
        assert_eq!(format_value(&v), r#"{a:[1,"x"],"b c":{}}"#);
    }

    #[test]
    fn test_pretty() {
        let v = v_kvc_pairs(&[("a", v_list(&[v_int(1), v_int(2)])), ("b", v_int(3))]);
        let expected = unindent(
            "
            {
              a: [
                1,
                2
              ],
              b: 3
            }",
        );
        assert_eq!(format_value_pretty(&v), expected);
    }

    #[test]
    fn test_text_form() {
        assert_eq!(to_text(&v_str("plain")), "plain");
        assert_eq!(to_text(&v_int(4)), "4");
    }
}
