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

//! Lexical primitives. There is no token stream: grammar rules call these inline at the byte
//! offset they are looking at. Nothing here skips leading whitespace; see `Scratch` in the
//! parse module for the space-skipping, node-recording wrappers.

use crate::errors::SyntaxError;
use crate::parse_node::{ParseNode, ParseNodeType};
use funcscript_var::{Span, Var};
use num_bigint::BigInt;

/// Words that can never be identifiers.
pub const KEYWORDS: &[&str] = &["return", "eval", "fault", "case", "switch", "then", "else"];

pub fn is_identifier_first(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

pub fn is_identifier_other(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn byte_at(src: &str, index: usize) -> Option<u8> {
    src.as_bytes().get(index).copied()
}

/// Case-insensitive match of `literal` at `index`.
pub fn match_literal(src: &str, index: usize, literal: &str) -> Option<usize> {
    let end = index + literal.len();
    let candidate = src.as_bytes().get(index..end)?;
    candidate
        .eq_ignore_ascii_case(literal.as_bytes())
        .then_some(end)
}

/// The longest of `candidates` matching at `index`. A candidate ending in a word character must
/// not run on into more word characters, so `or` does not match the start of `order`.
pub fn match_token<'c>(
    src: &str,
    index: usize,
    candidates: &[&'c str],
) -> Option<(usize, &'c str)> {
    let mut best: Option<(usize, &'c str)> = None;
    for candidate in candidates {
        let Some(end) = match_literal(src, index, candidate) else {
            continue;
        };
        let word_like = candidate
            .as_bytes()
            .last()
            .is_some_and(|c| is_identifier_other(*c));
        if word_like && byte_at(src, end).is_some_and(is_identifier_other) {
            continue;
        }
        if best.is_none_or(|(best_end, _)| end > best_end) {
            best = Some((end, candidate));
        }
    }
    best
}

/// A keyword: exact (case-insensitive) match plus a negative lookahead on word characters.
pub fn get_keyword(src: &str, index: usize, keyword: &str) -> Option<usize> {
    let end = match_literal(src, index, keyword)?;
    if byte_at(src, end).is_some_and(is_identifier_other) {
        return None;
    }
    Some(end)
}

/// Whitespace, `// line` and `/* block */` comments starting at `index`.
pub fn skip_space(src: &str, index: usize) -> (usize, Vec<ParseNode>) {
    let mut nodes = vec![];
    let mut i = index;
    loop {
        let ws_end = i + src[i..]
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(at, _)| at)
            .unwrap_or(src.len() - i);
        if ws_end > i {
            nodes.push(ParseNode::leaf(
                ParseNodeType::WhiteSpace,
                Span::between(i, ws_end),
            ));
            i = ws_end;
            continue;
        }
        if let Some(after) = match_literal(src, i, "//") {
            let end = src[after..]
                .find('\n')
                .map(|at| after + at)
                .unwrap_or(src.len());
            nodes.push(ParseNode::leaf(ParseNodeType::Comment, Span::between(i, end)));
            i = end;
            continue;
        }
        if let Some(after) = match_literal(src, i, "/*") {
            let end = src[after..]
                .find("*/")
                .map(|at| after + at + 2)
                .unwrap_or(src.len());
            nodes.push(ParseNode::leaf(ParseNodeType::Comment, Span::between(i, end)));
            i = end;
            continue;
        }
        return (i, nodes);
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding [`KEYWORDS`].
pub fn get_identifier(src: &str, index: usize) -> Option<Span> {
    if !byte_at(src, index).is_some_and(is_identifier_first) {
        return None;
    }
    let mut end = index + 1;
    while byte_at(src, end).is_some_and(is_identifier_other) {
        end += 1;
    }
    let name = &src[index..end];
    if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name)) {
        return None;
    }
    Some(Span::between(index, end))
}

/// Digits with optional `_` separators between them. Returns the end offset.
fn scan_digits(bytes: &[u8], mut i: usize) -> Option<usize> {
    if !bytes.get(i).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    while let Some(c) = bytes.get(i) {
        if c.is_ascii_digit() {
            i += 1;
        } else if *c == b'_' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            i += 1;
        } else {
            break;
        }
    }
    Some(i)
}

/// An integer, long (`l` suffix), big integer (when it overflows 64 bits) or float (fraction
/// and/or exponent). Signs are not part of the literal; `-` is a prefix operator.
pub fn get_number(
    src: &str,
    index: usize,
) -> Result<Option<(usize, Var, ParseNodeType)>, SyntaxError> {
    let bytes = src.as_bytes();
    let Some(mut end) = scan_digits(bytes, index) else {
        return Ok(None);
    };
    let mut is_float = false;
    if bytes.get(end) == Some(&b'.') {
        if let Some(frac_end) = scan_digits(bytes, end + 1) {
            end = frac_end;
            is_float = true;
        }
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if let Some(exp_end) = scan_digits(bytes, exp) {
            end = exp_end;
            is_float = true;
        }
    }
    let text: String = src[index..end].chars().filter(|c| *c != '_').collect();

    if is_float {
        return match text.parse::<f64>() {
            Ok(f) => Ok(Some((end, Var::mk_float(f), ParseNodeType::LiteralFloat))),
            Err(_) => Err(SyntaxError::new(index, end - index, "Invalid number")),
        };
    }

    let long_suffix = matches!(bytes.get(end), Some(b'l' | b'L'))
        && !byte_at(src, end + 1).is_some_and(is_identifier_other);
    if long_suffix {
        return match text.parse::<i64>() {
            Ok(i) => Ok(Some((end + 1, Var::mk_integer(i), ParseNodeType::LiteralLong))),
            Err(_) => Err(SyntaxError::new(
                index,
                end + 1 - index,
                format!("Value {text} is out of range for a long integer"),
            )),
        };
    }

    if let Ok(i) = text.parse::<i64>() {
        return Ok(Some((end, Var::mk_integer(i), ParseNodeType::LiteralInteger)));
    }
    match BigInt::parse_bytes(text.as_bytes(), 10) {
        Some(big) => Ok(Some((end, Var::mk_bigint(big), ParseNodeType::LiteralInteger))),
        None => Err(SyntaxError::new(index, end - index, "Invalid number")),
    }
}

/// Decode the escape sequence starting at the backslash at `index`. `delimiter` is the quote
/// in effect; `template` additionally admits `\{` and `\}`. Returns the text the sequence stands
/// for and the offset after it.
pub fn read_escape(src: &str, index: usize, delimiter: &str, template: bool) -> (usize, String) {
    let after = index + 1;
    let next = byte_at(src, after);
    match next {
        Some(b'n') => (after + 1, "\n".to_string()),
        Some(b't') => (after + 1, "\t".to_string()),
        Some(b'\\') => (after + 1, "\\".to_string()),
        Some(b'{') if template => (after + 1, "{".to_string()),
        Some(b'}') if template => (after + 1, "}".to_string()),
        Some(b'u') => {
            let decoded = src
                .get(after + 1..after + 5)
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .and_then(char::from_u32);
            match decoded {
                Some(c) => (after + 5, c.to_string()),
                None => (after, "\\".to_string()),
            }
        }
        _ => {
            if let Some(end) = match_literal(src, after, delimiter) {
                return (end, delimiter.to_string());
            }
            // A lone quote character escapes within a triple-quoted string too.
            if let Some(quote) = delimiter.chars().next() {
                if let Some(end) = match_literal(src, after, &quote.to_string()) {
                    return (end, quote.to_string());
                }
            }
            (after, "\\".to_string())
        }
    }
}

/// `"..."`, `'...'` or `"""..."""` at `index`. Returns the decoded text and the offset after
/// the closing delimiter.
pub fn get_simple_string(src: &str, index: usize) -> Result<Option<(usize, String)>, SyntaxError> {
    for delimiter in ["\"\"\"", "\"", "'"] {
        if let Some(start) = match_literal(src, index, delimiter) {
            return read_string_body(src, start, delimiter).map(Some);
        }
    }
    Ok(None)
}

fn read_string_body(src: &str, start: usize, delimiter: &str) -> Result<(usize, String), SyntaxError> {
    let mut text = String::new();
    let mut i = start;
    while i < src.len() {
        if let Some(end) = match_literal(src, i, delimiter) {
            return Ok((end, text));
        }
        if byte_at(src, i) == Some(b'\\') {
            let (next, decoded) = read_escape(src, i, delimiter, false);
            text.push_str(&decoded);
            i = next;
            continue;
        }
        let Some(c) = src[i..].chars().next() else {
            break;
        };
        text.push(c);
        i += c.len_utf8();
    }
    Err(SyntaxError::new(src.len(), 0, format!("'{delimiter}' expected")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use funcscript_var::{v_float, v_int};
    use test_case::test_case;

    #[test_case("12", v_int(12), ParseNodeType::LiteralInteger ; "integer")]
    #[test_case("1_000_000", v_int(1_000_000), ParseNodeType::LiteralInteger ; "separators")]
    #[test_case("12l", v_int(12), ParseNodeType::LiteralLong ; "long suffix")]
    #[test_case("1.5", v_float(1.5), ParseNodeType::LiteralFloat ; "fraction")]
    #[test_case("2e3", v_float(2000.0), ParseNodeType::LiteralFloat ; "exponent")]
    #[test_case("1.5E-1", v_float(0.15), ParseNodeType::LiteralFloat ; "signed exponent")]
    fn test_numbers(src: &str, expected: Var, kind: ParseNodeType) {
        let (end, value, node_kind) = get_number(src, 0).unwrap().unwrap();
        assert_eq!(end, src.len());
        assert_eq!(value, expected);
        assert_eq!(node_kind, kind);
    }

    #[test]
    fn test_big_integer() {
        let (_, value, _) = get_number("99999999999999999999", 0).unwrap().unwrap();
        assert_eq!(value.type_code(), funcscript_var::VarType::BigInteger);
    }

    #[test]
    fn test_number_does_not_eat_member_dot() {
        let (end, value, _) = get_number("3.x", 0).unwrap().unwrap();
        assert_eq!(end, 1);
        assert_eq!(value, v_int(3));
    }

    #[test]
    fn test_long_out_of_range() {
        let err = get_number("99999999999999999999l", 0).unwrap_err();
        assert!(err.message.contains("out of range"));
    }

    #[test_case(r#""a\nb""#, "a\nb" ; "newline escape")]
    #[test_case(r#"'it\'s'"#, "it's" ; "delimiter escape")]
    #[test_case(r#""\u0041\t""#, "A\t" ; "unicode escape")]
    #[test_case(r#""\d+""#, "\\d+" ; "unknown escape kept")]
    #[test_case("\"\"\"two\nlines \"quoted\" ok\"\"\"", "two\nlines \"quoted\" ok" ; "triple quoted")]
    fn test_strings(src: &str, expected: &str) {
        let (end, text) = get_simple_string(src, 0).unwrap().unwrap();
        assert_eq!(text, expected);
        assert!(end <= src.len());
    }

    #[test]
    fn test_unterminated_string() {
        let err = get_simple_string("'abc", 0).unwrap_err();
        assert_eq!(err.message, "''' expected");
        assert_eq!(err.span, Span::new(4, 0));
    }

    #[test]
    fn test_identifier_rejects_keywords() {
        assert_eq!(get_identifier("total1 ", 0), Some(Span::new(0, 6)));
        assert_eq!(get_identifier("then", 0), None);
        assert_eq!(get_identifier("Return", 0), None);
        assert_eq!(get_identifier("1abc", 0), None);
    }

    #[test]
    fn test_keyword_lookahead() {
        assert_eq!(get_keyword("null,", 0, "null"), Some(4));
        assert_eq!(get_keyword("nullable", 0, "null"), None);
    }

    #[test]
    fn test_token_longest_first() {
        assert_eq!(match_token(">= 1", 0, &[">", ">="]), Some((2, ">=")));
        assert_eq!(match_token("order", 0, &["or", "and"]), None);
        assert_eq!(match_token("OR x", 0, &["or", "and"]), Some((2, "or")));
    }

    #[test]
    fn test_skip_space_records_comments() {
        let src = "  // note\n /* block */x";
        let (end, nodes) = skip_space(src, 0);
        assert_eq!(&src[end..], "x");
        let kinds: Vec<_> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParseNodeType::WhiteSpace,
                ParseNodeType::Comment,
                ParseNodeType::WhiteSpace,
                ParseNodeType::Comment
            ]
        );
    }
}
